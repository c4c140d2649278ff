pub mod config;
pub mod indicator;
pub mod report;
pub mod scoring;

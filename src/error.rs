use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MqaError {
    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("catalog session could not be opened: {0}")]
    Session(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("invalid rubric: {0}")]
    Rubric(String),

    #[error("conformance validation failed: {0}")]
    Conformance(String),

    #[error("vocabulary {}: {source}", path.display())]
    Vocabulary {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MqaError>;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const EVALUATE_EXIT_CODES: &str = "\
Exit codes:
  0  every scheduled indicator was evaluated
  1  some indicator was not evaluated; DCAT-AP compliance is not evaluated
     unless both a catalog snapshot and a shapes file are configured
  2  total points below [evaluation] min_points
  3  runtime failure";

#[derive(Parser)]
#[command(
    name = "mqa",
    version,
    about = "Metadata quality assessment for DCAT-AP data catalogs"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a catalog endpoint against the rubric
    #[command(after_help = EVALUATE_EXIT_CODES)]
    Evaluate(EvaluateCommand),
    /// Print the indicators of a rubric
    Rubric(RubricCommand),
    /// Check a value against a vocabulary file
    Vocab(VocabCommand),
    /// Check whether URLs are reachable
    Probe(ProbeCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Table,
    Md,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RubricFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QueryErrorMode {
    Abort,
    Skip,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VocabMode {
    Exact,
    TermInValue,
    ValueInTerm,
}

#[derive(Args)]
pub struct EvaluateCommand {
    /// Directory holding mqa.toml and .mqa/local.toml
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
    /// SPARQL endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long, requires = "user")]
    pub password: Option<String>,
    /// Catalog snapshot for DCAT-AP conformance
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// SHACL shapes for DCAT-AP conformance
    #[arg(long)]
    pub shapes: Option<PathBuf>,
    #[arg(long)]
    pub rubric: Option<PathBuf>,
    /// Run the URL reachability indicators
    #[arg(long)]
    pub probe_urls: bool,
    #[arg(long, value_enum)]
    pub on_query_error: Option<QueryErrorMode>,
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: ReportFormat,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RubricCommand {
    #[arg(long)]
    pub rubric: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: RubricFormat,
}

#[derive(Args)]
pub struct VocabCommand {
    pub file: PathBuf,
    #[arg(long)]
    pub value: String,
    /// 0-based column holding the terms
    #[arg(long, default_value_t = 0)]
    pub field: usize,
    #[arg(long, value_enum, default_value = "exact")]
    pub mode: VocabMode,
}

#[derive(Args)]
pub struct ProbeCommand {
    #[arg(required = true)]
    pub urls: Vec<String>,
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

mod cli;
mod config;
mod conformance;
mod error;
mod evaluate;
mod query;
mod reachability;
mod report;
mod rubric;
mod session;
#[cfg(test)]
mod test_support;
mod types;
mod vocabulary;

use crate::conformance::{CommandValidator, GraphSource};
use crate::error::{MqaError, Result};
use crate::evaluate::{ConformanceCheck, Evaluator};
use crate::query::sparql::SparqlExecutor;
use crate::reachability::{HttpProber, ProbeOutcome, Prober, ReachabilityChecker};
use crate::rubric::Rubric;
use crate::session::CatalogSession;
use crate::types::config::{EndpointSettings, OnQueryError, ProbeSettings};
use crate::types::indicator::MatchMode;
use crate::vocabulary::Vocabulary;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const BELOW_THRESHOLD: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mqa={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Evaluate(cmd) => evaluate(&cmd),
        cli::Commands::Rubric(cmd) => {
            let rubric = match &cmd.rubric {
                Some(path) => Rubric::load(path)?,
                None => Rubric::builtin()?,
            };
            match cmd.format {
                cli::RubricFormat::Json => println!("{}", serde_json::to_string_pretty(&rubric)?),
                cli::RubricFormat::Table => {
                    println!("# {} {}", rubric.name, rubric.version);
                    for indicator in &rubric.indicators {
                        println!(
                            "{}\t{}\t{}\t{}\t{}\t{}{}",
                            indicator.id,
                            indicator.dimension,
                            indicator.entity,
                            indicator.property.map_or("-", |property| property.compact()),
                            indicator.kind.as_str(),
                            indicator.weight,
                            if indicator.enabled { "" } else { "\tdisabled" }
                        );
                    }
                }
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Vocab(cmd) => {
            if !cmd.file.exists() {
                return Err(MqaError::PathNotFound(cmd.file.display().to_string()));
            }
            let vocabulary = Vocabulary::load(&cmd.file, cmd.field)?;
            let mode = match cmd.mode {
                cli::VocabMode::Exact => MatchMode::Exact,
                cli::VocabMode::TermInValue => MatchMode::TermInValue,
                cli::VocabMode::ValueInTerm => MatchMode::ValueInTerm,
            };
            if mode.matches(&vocabulary, &cmd.value) {
                println!("match: {} ({} terms)", cmd.value, vocabulary.len());
                Ok(exit_code::SUCCESS)
            } else {
                println!("no match: {} ({} terms)", cmd.value, vocabulary.len());
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::Probe(cmd) => {
            let prober = HttpProber::new(&ProbeSettings {
                timeout: Duration::from_secs(cmd.timeout_secs.max(1)),
                ..ProbeSettings::default()
            })?;
            let mut all_reachable = true;
            for url in &cmd.urls {
                match prober.probe(url) {
                    ProbeOutcome::Success { status } => println!("{url}\tok {status}"),
                    ProbeOutcome::Failure(reason) => {
                        all_reachable = false;
                        println!("{url}\tfailed: {reason}");
                    }
                }
            }
            Ok(if all_reachable {
                exit_code::SUCCESS
            } else {
                exit_code::WARNINGS
            })
        }
    }
}

fn evaluate(cmd: &cli::EvaluateCommand) -> Result<i32> {
    if !cmd.config_dir.exists() {
        return Err(MqaError::PathNotFound(cmd.config_dir.display().to_string()));
    }
    let root = cmd.config_dir.as_path();
    let cfg = config::load_config(root)?;

    let endpoint = resolve_endpoint(cmd, cfg.endpoint_settings())?;
    let mut settings = cfg.evaluation_settings();
    settings.vocabulary_dir = config::resolve_path(root, &settings.vocabulary_dir);
    settings.failure_log_dir = config::resolve_path(root, &settings.failure_log_dir);
    if cmd.probe_urls {
        settings.probe_urls = true;
    }
    if let Some(mode) = cmd.on_query_error {
        settings.on_query_error = match mode {
            cli::QueryErrorMode::Abort => OnQueryError::Abort,
            cli::QueryErrorMode::Skip => OnQueryError::Skip,
        };
    }

    let rubric_path = cmd
        .rubric
        .clone()
        .or_else(|| cfg.rubric_path().map(|path| config::resolve_path(root, &path)));
    let rubric = match rubric_path {
        Some(path) => Rubric::load(&path)?,
        None => Rubric::builtin()?,
    };

    let session = CatalogSession::open(Box::new(SparqlExecutor::new(&endpoint)?))?;

    let catalog = cmd
        .catalog
        .clone()
        .or_else(|| cfg.catalog_snapshot().map(|path| config::resolve_path(root, &path)));
    let shapes = cmd
        .shapes
        .clone()
        .or_else(|| cfg.shapes().map(|path| config::resolve_path(root, &path)));
    let (validator, options) = CommandValidator::from_settings(&cfg.conformance_settings());

    let min_points = settings.min_points;
    let mut evaluator =
        Evaluator::new(&session, settings.clone()).with_conformance(ConformanceCheck {
            validator: Box::new(validator),
            options,
            data: GraphSource::available(catalog.as_deref()),
            shapes: GraphSource::available(shapes.as_deref()),
        });
    if settings.probe_urls {
        let probe = cfg.probe_settings();
        let checker = ReachabilityChecker::new(
            Box::new(HttpProber::new(&probe)?),
            settings.failure_log_dir.clone(),
            probe.workers,
        )?;
        evaluator = evaluator.with_reachability(checker);
    }

    let report = evaluator.run(&rubric)?;
    let format = match cmd.format {
        cli::ReportFormat::Table => report::OutputFormat::Table,
        cli::ReportFormat::Md => report::OutputFormat::Md,
        cli::ReportFormat::Json => report::OutputFormat::Json,
    };
    let rendered = report::render(&report, format)?;
    write_output(cmd.output.as_deref(), &rendered)?;

    let not_evaluated = report.not_evaluated().count();
    if report.total_points < min_points {
        eprintln!(
            "error: total points {:.2} below threshold {:.2}",
            report.total_points, min_points
        );
        Ok(exit_code::BELOW_THRESHOLD)
    } else if not_evaluated > 0 {
        eprintln!("warning: {not_evaluated} indicator(s) not evaluated");
        Ok(exit_code::WARNINGS)
    } else {
        Ok(exit_code::SUCCESS)
    }
}

fn resolve_endpoint(
    cmd: &cli::EvaluateCommand,
    configured: Option<EndpointSettings>,
) -> Result<EndpointSettings> {
    let mut endpoint = match (&cmd.endpoint, configured) {
        (Some(url), _) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            return Err(MqaError::ConfigInvalid(format!(
                "endpoint must be an http(s) URL: {url}"
            )))
        }
        (Some(url), Some(configured)) => EndpointSettings {
            url: url.clone(),
            ..configured
        },
        (Some(url), None) => EndpointSettings {
            url: url.clone(),
            credentials: None,
            timeout: Duration::from_secs(types::config::MqaConfig::DEFAULT_ENDPOINT_TIMEOUT_SECS),
        },
        (None, Some(configured)) => configured,
        (None, None) => {
            return Err(MqaError::ConfigInvalid(
                "no SPARQL endpoint: pass --endpoint or set endpoint.url".to_string(),
            ))
        }
    };
    if let Some(user) = &cmd.user {
        endpoint.credentials = Some((user.clone(), cmd.password.clone().unwrap_or_default()));
    }
    Ok(endpoint)
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}

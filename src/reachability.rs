//! URL reachability probing with a per-property failure log.

use crate::error::{MqaError, Result};
use crate::query::GroupedValue;
use crate::types::config::ProbeSettings;
use crate::types::indicator::Property;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Status(u16),
    Timeout,
    Connect(String),
    Redirect(String),
    InvalidUrl(String),
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "status {status}"),
            Self::Timeout => f.write_str("timed out"),
            Self::Connect(detail) => write!(f, "connection failed: {detail}"),
            Self::Redirect(detail) => write!(f, "redirect error: {detail}"),
            Self::InvalidUrl(detail) => write!(f, "invalid url: {detail}"),
            Self::Other(detail) => f.write_str(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { status: u16 },
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    /// Any status in `[200, 400)` counts as reachable.
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Self::Success { status }
        } else {
            Self::Failure(ProbeFailure::Status(status))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

pub trait Prober: Send + Sync {
    fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Single GET per URL with a fixed timeout and no retries.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(settings: &ProbeSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .redirect(Policy::limited(settings.max_redirects))
            .user_agent(concat!("mqa/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Prober for HttpProber {
    fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.get(url).send() {
            Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
            Err(err) => ProbeOutcome::Failure(classify_error(&err)),
        }
    }
}

fn classify_error(err: &reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::Timeout
    } else if err.is_redirect() {
        ProbeFailure::Redirect(err.to_string())
    } else if err.is_builder() {
        ProbeFailure::InvalidUrl(err.to_string())
    } else if err.is_connect() {
        ProbeFailure::Connect(err.to_string())
    } else {
        ProbeFailure::Other(err.to_string())
    }
}

/// `errors_<property>.txt`, with every non-alphanumeric character replaced by `_`.
pub fn failure_log_name(property: Property) -> String {
    let sanitized: String = property
        .compact()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("errors_{sanitized}.txt")
}

/// Append-only `url<TAB>count` log, truncated when created.
pub struct FailureLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FailureLog {
    pub fn create(dir: &Path, property: Property) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(failure_log_name(property));
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn append(&self, url: &str, count: u64) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| MqaError::Io(std::io::Error::other("failure log lock poisoned")))?;
        writeln!(writer, "{url}\t{count}")?;
        Ok(())
    }

    pub fn finish(self) -> Result<PathBuf> {
        let mut writer = self
            .writer
            .into_inner()
            .map_err(|_| MqaError::Io(std::io::Error::other("failure log lock poisoned")))?;
        writer.flush()?;
        Ok(self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlOutcome {
    pub url: String,
    pub count: u64,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone)]
pub struct ReachabilitySummary {
    pub success_count: u64,
    pub outcomes: Vec<UrlOutcome>,
    pub failure_log: PathBuf,
}

impl ReachabilitySummary {
    pub fn failures(&self) -> impl Iterator<Item = &UrlOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.outcome.is_success())
    }
}

pub struct ReachabilityChecker {
    prober: Box<dyn Prober>,
    log_dir: PathBuf,
    pool: ThreadPool,
}

impl ReachabilityChecker {
    pub fn new(
        prober: Box<dyn Prober>,
        log_dir: impl Into<PathBuf>,
        workers: usize,
    ) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|index| format!("mqa-probe-{index}"))
            .build()
            .map_err(|err| MqaError::ConfigInvalid(format!("probe worker pool: {err}")))?;
        Ok(Self {
            prober,
            log_dir: log_dir.into(),
            pool,
        })
    }

    /// Probes every distinct URL and sums the occurrence counts of reachable ones.
    ///
    /// Unreachable URLs go to the property's failure log; they never fail the check.
    pub fn check(
        &self,
        property: Property,
        grouped: &[GroupedValue],
    ) -> Result<ReachabilitySummary> {
        let log = FailureLog::create(&self.log_dir, property)?;
        let prober = self.prober.as_ref();

        let outcomes = self.pool.install(|| {
            grouped
                .par_iter()
                .map(|entry| -> Result<UrlOutcome> {
                    let outcome = prober.probe(&entry.value);
                    match &outcome {
                        ProbeOutcome::Success { status } => {
                            tracing::debug!(url = %entry.value, status, "reachable");
                        }
                        ProbeOutcome::Failure(reason) => {
                            tracing::warn!(
                                url = %entry.value,
                                count = entry.count,
                                %reason,
                                "unreachable"
                            );
                            log.append(&entry.value, entry.count)?;
                        }
                    }
                    Ok(UrlOutcome {
                        url: entry.value.clone(),
                        count: entry.count,
                        outcome,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let success_count = outcomes
            .iter()
            .filter(|outcome| outcome.outcome.is_success())
            .map(|outcome| outcome.count)
            .sum();
        let failure_log = log.finish()?;

        Ok(ReachabilitySummary {
            success_count,
            outcomes,
            failure_log,
        })
    }
}

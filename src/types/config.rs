use crate::error::MqaError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MqaConfig {
    pub endpoint: Option<EndpointConfig>,
    pub catalog: Option<CatalogConfig>,
    pub conformance: Option<ConformanceConfig>,
    pub probe: Option<ProbeConfig>,
    pub paths: Option<PathsConfig>,
    pub evaluation: Option<EvaluationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    pub snapshot: Option<PathBuf>,
    pub shapes: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inference {
    None,
    Rdfs,
    Owlrl,
}

impl Inference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rdfs => "rdfs",
            Self::Owlrl => "owlrl",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConformanceConfig {
    pub command: Option<String>,
    pub inference: Option<Inference>,
    pub abort_on_first_error: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeConfig {
    pub timeout_secs: Option<u64>,
    pub workers: Option<usize>,
    pub max_redirects: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    pub vocabulary_dir: Option<PathBuf>,
    pub failure_log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnQueryError {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationConfig {
    pub rubric: Option<PathBuf>,
    pub probe_urls: Option<bool>,
    pub on_query_error: Option<OnQueryError>,
    pub min_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSettings {
    pub url: String,
    pub credentials: Option<(String, String)>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub workers: usize,
    pub max_redirects: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            workers: 4,
            max_redirects: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceSettings {
    pub command: String,
    pub inference: Inference,
    pub abort_on_first_error: bool,
}

impl Default for ConformanceSettings {
    fn default() -> Self {
        Self {
            command: "pyshacl".to_string(),
            inference: Inference::Rdfs,
            abort_on_first_error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub probe_urls: bool,
    pub on_query_error: OnQueryError,
    pub min_points: f64,
    pub vocabulary_dir: PathBuf,
    pub failure_log_dir: PathBuf,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            probe_urls: false,
            on_query_error: OnQueryError::Abort,
            min_points: 0.0,
            vocabulary_dir: PathBuf::from("vocabularies"),
            failure_log_dir: PathBuf::from("."),
        }
    }
}

impl MqaConfig {
    pub const DEFAULT_ENDPOINT_TIMEOUT_SECS: u64 = 60;

    pub fn endpoint_settings(&self) -> Option<EndpointSettings> {
        let endpoint = self.endpoint.as_ref()?;
        let url = endpoint.url.clone()?;
        let credentials = endpoint
            .user
            .clone()
            .map(|user| (user, endpoint.password.clone().unwrap_or_default()));
        Some(EndpointSettings {
            url,
            credentials,
            timeout: Duration::from_secs(
                endpoint
                    .timeout_secs
                    .unwrap_or(Self::DEFAULT_ENDPOINT_TIMEOUT_SECS),
            ),
        })
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        let defaults = ProbeSettings::default();
        match &self.probe {
            Some(probe) => ProbeSettings {
                timeout: probe
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
                workers: probe.workers.unwrap_or(defaults.workers),
                max_redirects: probe.max_redirects.unwrap_or(defaults.max_redirects),
            },
            None => defaults,
        }
    }

    pub fn conformance_settings(&self) -> ConformanceSettings {
        let defaults = ConformanceSettings::default();
        match &self.conformance {
            Some(conformance) => ConformanceSettings {
                command: conformance.command.clone().unwrap_or(defaults.command),
                inference: conformance.inference.unwrap_or(defaults.inference),
                abort_on_first_error: conformance
                    .abort_on_first_error
                    .unwrap_or(defaults.abort_on_first_error),
            },
            None => defaults,
        }
    }

    pub fn evaluation_settings(&self) -> EvaluationSettings {
        let defaults = EvaluationSettings::default();
        let evaluation = self.evaluation.as_ref();
        let paths = self.paths.as_ref();
        EvaluationSettings {
            probe_urls: evaluation
                .and_then(|value| value.probe_urls)
                .unwrap_or(defaults.probe_urls),
            on_query_error: evaluation
                .and_then(|value| value.on_query_error)
                .unwrap_or(defaults.on_query_error),
            min_points: evaluation
                .and_then(|value| value.min_points)
                .unwrap_or(defaults.min_points),
            vocabulary_dir: paths
                .and_then(|value| value.vocabulary_dir.clone())
                .unwrap_or(defaults.vocabulary_dir),
            failure_log_dir: paths
                .and_then(|value| value.failure_log_dir.clone())
                .unwrap_or(defaults.failure_log_dir),
        }
    }

    pub fn rubric_path(&self) -> Option<PathBuf> {
        self.evaluation.as_ref().and_then(|value| value.rubric.clone())
    }

    pub fn catalog_snapshot(&self) -> Option<PathBuf> {
        self.catalog.as_ref().and_then(|value| value.snapshot.clone())
    }

    pub fn shapes(&self) -> Option<PathBuf> {
        self.catalog.as_ref().and_then(|value| value.shapes.clone())
    }

    pub fn validate(&self) -> Result<(), MqaError> {
        if let Some(endpoint) = &self.endpoint {
            if let Some(url) = &endpoint.url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(MqaError::ConfigInvalid(format!(
                        "endpoint.url must be an http(s) URL: {url}"
                    )));
                }
            }
            if endpoint.password.is_some() && endpoint.user.is_none() {
                return Err(MqaError::ConfigInvalid(
                    "endpoint.password requires endpoint.user".to_string(),
                ));
            }
            if endpoint.timeout_secs == Some(0) {
                return Err(MqaError::ConfigInvalid(
                    "endpoint.timeout_secs must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(probe) = &self.probe {
            if probe.timeout_secs == Some(0) {
                return Err(MqaError::ConfigInvalid(
                    "probe.timeout_secs must be greater than 0".to_string(),
                ));
            }
            if probe.workers == Some(0) {
                return Err(MqaError::ConfigInvalid(
                    "probe.workers must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(conformance) = &self.conformance {
            if conformance
                .command
                .as_ref()
                .is_some_and(|command| command.trim().is_empty())
            {
                return Err(MqaError::ConfigInvalid(
                    "conformance.command cannot be empty".to_string(),
                ));
            }
        }

        if let Some(min_points) = self.evaluation.as_ref().and_then(|value| value.min_points) {
            if !min_points.is_finite() || min_points < 0.0 {
                return Err(MqaError::ConfigInvalid(
                    "evaluation.min_points must be a non-negative number".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let cfg: MqaConfig = toml::from_str("").expect("empty config should parse");
        assert!(cfg.endpoint_settings().is_none());
        assert_eq!(cfg.probe_settings(), ProbeSettings::default());
        assert_eq!(cfg.evaluation_settings(), EvaluationSettings::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[endpoint]
url = "https://datosgob.iaaa.es/db/query"
user = "admin"
password = "secret"
timeout_secs = 30

[catalog]
snapshot = "datosgobes20190612.rdf"
shapes = "dcat-ap.shapes.ttl"

[conformance]
command = "/usr/local/bin/pyshacl"
inference = "none"
abort_on_first_error = false

[probe]
timeout_secs = 2
workers = 8

[paths]
vocabulary_dir = "vocab"
failure_log_dir = "logs"

[evaluation]
probe_urls = true
on_query_error = "skip"
min_points = 150.0
"#;
        let cfg: MqaConfig = toml::from_str(toml_str).expect("full config should parse");

        let endpoint = cfg.endpoint_settings().expect("endpoint should resolve");
        assert_eq!(endpoint.url, "https://datosgob.iaaa.es/db/query");
        assert_eq!(
            endpoint.credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );
        assert_eq!(endpoint.timeout, Duration::from_secs(30));

        let probe = cfg.probe_settings();
        assert_eq!(probe.timeout, Duration::from_secs(2));
        assert_eq!(probe.workers, 8);
        assert_eq!(probe.max_redirects, 10);

        let conformance = cfg.conformance_settings();
        assert_eq!(conformance.inference, Inference::None);
        assert!(!conformance.abort_on_first_error);

        let evaluation = cfg.evaluation_settings();
        assert!(evaluation.probe_urls);
        assert_eq!(evaluation.on_query_error, OnQueryError::Skip);
        assert_eq!(evaluation.vocabulary_dir, PathBuf::from("vocab"));
        assert_eq!(
            cfg.catalog_snapshot(),
            Some(PathBuf::from("datosgobes20190612.rdf"))
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let cfg: MqaConfig = toml::from_str("[probe]\nworkers = 0\n").expect("config should parse");
        assert!(matches!(cfg.validate(), Err(MqaError::ConfigInvalid(_))));
    }

    #[test]
    fn validate_rejects_password_without_user() {
        let cfg: MqaConfig = toml::from_str(
            r#"
[endpoint]
url = "http://localhost:8890/sparql"
password = "secret"
"#,
        )
        .expect("config should parse");
        assert!(matches!(cfg.validate(), Err(MqaError::ConfigInvalid(_))));
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let cfg: MqaConfig =
            toml::from_str("[endpoint]\nurl = \"ftp://example.org/sparql\"\n").expect("parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_on_query_error_value_fails_to_parse() {
        let parsed = toml::from_str::<MqaConfig>("[evaluation]\non_query_error = \"retry\"\n");
        assert!(parsed.is_err());
    }
}

use crate::error::{MqaError, Result};
use crate::types::config::{ConformanceSettings, Inference};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    Xml,
    JsonLd,
    NTriples,
}

impl RdfFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "ttl" | "turtle" => Self::Turtle,
            "jsonld" | "json" => Self::JsonLd,
            "nt" => Self::NTriples,
            _ => Self::Xml,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Turtle => "turtle",
            Self::Xml => "xml",
            Self::JsonLd => "json-ld",
            Self::NTriples => "nt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSource {
    pub path: PathBuf,
    pub format: RdfFormat,
}

impl GraphSource {
    /// `None` when the path is unset or does not exist.
    pub fn available(path: Option<&Path>) -> Option<Self> {
        let path = path?;
        if !path.is_file() {
            tracing::info!(path = %path.display(), "graph source not found");
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            format: RdfFormat::from_path(path),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub inference: Inference,
    pub abort_on_first_error: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            inference: Inference::Rdfs,
            abort_on_first_error: true,
        }
    }
}

pub trait ConformanceValidator: Send + Sync {
    /// Whether `data` satisfies every shape in `shapes`.
    fn validate(
        &self,
        data: &GraphSource,
        shapes: &GraphSource,
        options: &ValidationOptions,
    ) -> Result<bool>;
}

/// Delegates to a SHACL command line validator with pyshacl's interface.
///
/// The command may carry leading arguments (`python3 -m pyshacl`). Exit
/// status 0 means conforming, 1 non-conforming; anything else is an error.
pub struct CommandValidator {
    program: String,
    leading_args: Vec<String>,
}

impl CommandValidator {
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        Self {
            program: parts.next().unwrap_or_default(),
            leading_args: parts.collect(),
        }
    }

    pub fn from_settings(settings: &ConformanceSettings) -> (Self, ValidationOptions) {
        (
            Self::new(&settings.command),
            ValidationOptions {
                inference: settings.inference,
                abort_on_first_error: settings.abort_on_first_error,
            },
        )
    }

    fn arguments(
        data: &GraphSource,
        shapes: &GraphSource,
        options: &ValidationOptions,
    ) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            shapes.path.display().to_string(),
            "-sf".to_string(),
            shapes.format.as_str().to_string(),
            "-df".to_string(),
            data.format.as_str().to_string(),
            "-i".to_string(),
            options.inference.as_str().to_string(),
        ];
        if options.abort_on_first_error {
            args.push("--abort".to_string());
        }
        args.push(data.path.display().to_string());
        args
    }
}

impl ConformanceValidator for CommandValidator {
    fn validate(
        &self,
        data: &GraphSource,
        shapes: &GraphSource,
        options: &ValidationOptions,
    ) -> Result<bool> {
        let args = Self::arguments(data, shapes, options);
        tracing::debug!(program = %self.program, ?args, "running shacl validator");
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(&args)
            .output()
            .map_err(|err| MqaError::Conformance(format!("{}: {err}", self.program)))?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => {
                tracing::info!(
                    report = %String::from_utf8_lossy(&output.stdout).trim(),
                    "catalog does not conform"
                );
                Ok(false)
            }
            code => Err(MqaError::Conformance(format!(
                "{} exited with {}: {}",
                self.program,
                code.map_or_else(|| "signal".to_string(), |code| code.to_string()),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn format_follows_extension() {
        assert_eq!(RdfFormat::from_path(Path::new("dcat-ap.shapes.ttl")), RdfFormat::Turtle);
        assert_eq!(RdfFormat::from_path(Path::new("catalog.RDF")), RdfFormat::Xml);
        assert_eq!(RdfFormat::from_path(Path::new("catalog.jsonld")), RdfFormat::JsonLd);
        assert_eq!(RdfFormat::from_path(Path::new("dump.nt")), RdfFormat::NTriples);
    }

    #[test]
    fn graph_source_requires_existing_file() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("catalog.rdf");
        assert!(GraphSource::available(None).is_none());
        assert!(GraphSource::available(Some(&path)).is_none());

        fs::write(&path, "<rdf:RDF/>").expect("catalog should write");
        let source = GraphSource::available(Some(&path)).expect("source should exist");
        assert_eq!(source.format, RdfFormat::Xml);
    }

    #[test]
    fn arguments_pass_inference_and_abort() {
        let data = GraphSource {
            path: PathBuf::from("catalog.rdf"),
            format: RdfFormat::Xml,
        };
        let shapes = GraphSource {
            path: PathBuf::from("shapes.ttl"),
            format: RdfFormat::Turtle,
        };
        let args = CommandValidator::arguments(&data, &shapes, &ValidationOptions::default());
        assert_eq!(
            args,
            [
                "-s", "shapes.ttl", "-sf", "turtle", "-df", "xml", "-i", "rdfs", "--abort",
                "catalog.rdf"
            ]
        );
    }

    #[test]
    fn missing_program_is_a_conformance_error() {
        let validator = CommandValidator::new("mqa-no-such-validator");
        let source = GraphSource {
            path: PathBuf::from("catalog.rdf"),
            format: RdfFormat::Xml,
        };
        let result = validator.validate(&source, &source, &ValidationOptions::default());
        assert!(matches!(result, Err(MqaError::Conformance(_))));
    }

    #[cfg(unix)]
    fn stub_validator(dir: &Path, exit_code: i32) -> PathBuf {
        let script = dir.join("validator.sh");
        fs::write(&script, format!("echo \"$@\" > \"$0.args\"\nexit {exit_code}\n"))
            .expect("stub should write");
        script
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_maps_to_conformance() {
        let dir = TempDir::new().expect("temp dir should be created");
        let data = GraphSource {
            path: dir.path().join("catalog.rdf"),
            format: RdfFormat::Xml,
        };
        let shapes = GraphSource {
            path: dir.path().join("shapes.ttl"),
            format: RdfFormat::Turtle,
        };
        let options = ValidationOptions::default();

        for (code, expected) in [(0, Some(true)), (1, Some(false)), (2, None)] {
            let script = stub_validator(dir.path(), code);
            let validator = CommandValidator::new(&format!("sh {}", script.display()));
            let result = validator.validate(&data, &shapes, &options);
            match expected {
                Some(conforms) => assert_eq!(result.expect("validator should run"), conforms),
                None => assert!(matches!(result, Err(MqaError::Conformance(_)))),
            }
        }

        let args = fs::read_to_string(dir.path().join("validator.sh.args")).expect("args log");
        assert!(args.contains("-i rdfs --abort"));
    }
}

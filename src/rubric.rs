//! Versioned indicator tables.
//!
//! The built-in rubric is compiled from `rubric/mqa-2020.toml`; any other
//! TOML file with the same layout can replace it at run time.

use crate::error::{MqaError, Result};
use crate::types::indicator::{EntityType, Indicator, IndicatorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const BUILTIN_RUBRIC: &str = include_str!("../rubric/mqa-2020.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    pub name: String,
    pub version: String,
    #[serde(rename = "indicator", default)]
    pub indicators: Vec<Indicator>,
}

impl Rubric {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_RUBRIC)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| MqaError::PathNotFound(path.display().to_string()))?;
        Self::parse(&content).map_err(|err| match err {
            MqaError::Rubric(detail) => MqaError::Rubric(format!("{}: {detail}", path.display())),
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let rubric: Rubric =
            toml::from_str(content).map_err(|err| MqaError::Rubric(err.to_string()))?;
        rubric.validate()?;
        Ok(rubric)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for indicator in &self.indicators {
            let id = indicator.id.trim();
            if id.is_empty() {
                return Err(MqaError::Rubric("indicator id cannot be empty".to_string()));
            }
            if !seen.insert(id) {
                return Err(MqaError::Rubric(format!("duplicate indicator id: {id}")));
            }
            if !indicator.weight.is_finite() || indicator.weight <= 0.0 {
                return Err(MqaError::Rubric(format!(
                    "{id}: weight must be a positive number"
                )));
            }

            match indicator.kind {
                IndicatorKind::Presence | IndicatorKind::Reachability
                    if indicator.property.is_none() =>
                {
                    return Err(MqaError::Rubric(format!("{id}: property is required")));
                }
                IndicatorKind::Reachability if indicator.entity != EntityType::Distribution => {
                    return Err(MqaError::Rubric(format!(
                        "{id}: reachability indicators apply to distributions"
                    )));
                }
                IndicatorKind::Vocabulary => {
                    if indicator.property.is_none()
                        || indicator.vocabulary.is_none()
                        || indicator.match_mode.is_none()
                    {
                        return Err(MqaError::Rubric(format!(
                            "{id}: vocabulary indicators need property, vocabulary and match_mode"
                        )));
                    }
                }
                IndicatorKind::Conformance if indicator.entity != EntityType::Dataset => {
                    return Err(MqaError::Rubric(format!(
                        "{id}: conformance indicators apply to datasets"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Enabled indicators in run order: grouped by dimension, declared order within.
    pub fn schedule(&self, probe_urls: bool) -> Vec<&Indicator> {
        let mut scheduled = self
            .indicators
            .iter()
            .filter(|indicator| indicator.enabled)
            .filter(|indicator| probe_urls || indicator.kind != IndicatorKind::Reachability)
            .collect::<Vec<_>>();
        scheduled.sort_by_key(|indicator| indicator.dimension);
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::indicator::{Dimension, MatchMode, Property};

    #[test]
    fn builtin_rubric_parses_and_validates() {
        let rubric = Rubric::builtin().expect("builtin rubric should parse");
        assert_eq!(rubric.indicators.len(), 23);

        let keywords = &rubric.indicators[0];
        assert_eq!(keywords.id, "findability_keywords_available");
        assert_eq!(keywords.property, Some(Property::Keyword));
        assert_eq!(keywords.weight, 30.0);

        let access_rights = rubric
            .indicators
            .iter()
            .find(|indicator| indicator.id == "reusability_accessRights_from_vocabulary")
            .expect("access rights indicator should exist");
        assert_eq!(access_rights.match_mode, Some(MatchMode::ValueInTerm));
        assert_eq!(access_rights.vocabulary.as_ref().map(|v| v.field), Some(1));
    }

    #[test]
    fn schedule_skips_reachability_unless_probing() {
        let rubric = Rubric::builtin().expect("builtin rubric should parse");
        let without = rubric.schedule(false);
        assert!(without
            .iter()
            .all(|indicator| indicator.kind != IndicatorKind::Reachability));
        assert_eq!(without.len(), 21);
        assert_eq!(rubric.schedule(true).len(), 23);
    }

    #[test]
    fn schedule_groups_by_dimension_stably() {
        let rubric = Rubric::parse(
            r#"
name = "custom"
version = "1"

[[indicator]]
id = "reuse_license"
dimension = "reusability"
entity = "distribution"
property = "dct:license"
kind = "presence"
weight = 20

[[indicator]]
id = "find_keywords"
dimension = "findability"
entity = "dataset"
property = "dcat:keyword"
kind = "presence"
weight = 30

[[indicator]]
id = "find_theme"
dimension = "findability"
entity = "dataset"
property = "dcat:theme"
kind = "presence"
weight = 30
"#,
        )
        .expect("rubric should parse");

        let order = rubric
            .schedule(false)
            .iter()
            .map(|indicator| (indicator.dimension, indicator.id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                (Dimension::Findability, "find_keywords"),
                (Dimension::Findability, "find_theme"),
                (Dimension::Reusability, "reuse_license"),
            ]
        );
    }

    #[test]
    fn validate_rejects_non_positive_weight() {
        let result = Rubric::parse(
            r#"
name = "bad"
version = "1"

[[indicator]]
id = "find_keywords"
dimension = "findability"
entity = "dataset"
property = "dcat:keyword"
kind = "presence"
weight = 0
"#,
        );
        assert!(matches!(result, Err(MqaError::Rubric(_))));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let indicator = r#"
[[indicator]]
id = "find_keywords"
dimension = "findability"
entity = "dataset"
property = "dcat:keyword"
kind = "presence"
weight = 30
"#;
        let result = Rubric::parse(&format!(
            "name = \"dup\"\nversion = \"1\"\n{indicator}{indicator}"
        ));
        assert!(result
            .expect_err("duplicates should fail")
            .to_string()
            .contains("duplicate indicator id"));
    }

    #[test]
    fn validate_rejects_vocabulary_without_match_mode() {
        let result = Rubric::parse(
            r#"
name = "bad"
version = "1"

[[indicator]]
id = "license_vocab"
dimension = "reusability"
entity = "distribution"
property = "dct:license"
kind = "vocabulary"
vocabulary = { file = "licenses.csv" }
weight = 10
"#,
        );
        assert!(matches!(result, Err(MqaError::Rubric(_))));
    }

    #[test]
    fn validate_rejects_conformance_over_distributions() {
        let result = Rubric::parse(
            r#"
name = "bad"
version = "1"

[[indicator]]
id = "shacl"
dimension = "interoperability"
entity = "distribution"
kind = "conformance"
weight = 30
"#,
        );
        assert!(matches!(result, Err(MqaError::Rubric(_))));
    }

    #[test]
    fn parse_rejects_unknown_property_paths() {
        let result = Rubric::parse(
            r#"
name = "bad"
version = "1"

[[indicator]]
id = "title"
dimension = "findability"
entity = "dataset"
property = "dct:title"
kind = "presence"
weight = 10
"#,
        );
        assert!(result.is_err());
    }
}

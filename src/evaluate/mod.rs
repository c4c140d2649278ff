pub mod aggregator;

use crate::conformance::{ConformanceValidator, GraphSource, ValidationOptions};
use crate::error::{MqaError, Result};
use crate::reachability::ReachabilityChecker;
use crate::rubric::Rubric;
use crate::session::CatalogSession;
use crate::types::config::{EvaluationSettings, OnQueryError};
use crate::types::indicator::{Indicator, IndicatorKind, Property, VocabularyRef};
use crate::types::report::ScoreReport;
use crate::types::scoring::{Count, EvaluationResult};
use crate::vocabulary::Vocabulary;
use aggregator::ScoringAggregator;
use std::collections::HashMap;
use std::path::Path;

/// Validator plus the two graphs it needs; either graph may be unavailable.
pub struct ConformanceCheck {
    pub validator: Box<dyn ConformanceValidator>,
    pub options: ValidationOptions,
    pub data: Option<GraphSource>,
    pub shapes: Option<GraphSource>,
}

pub struct Evaluator<'s> {
    session: &'s CatalogSession,
    settings: EvaluationSettings,
    reachability: Option<ReachabilityChecker>,
    conformance: Option<ConformanceCheck>,
    vocabularies: HashMap<(String, usize), Vocabulary>,
    aggregator: ScoringAggregator,
}

impl<'s> Evaluator<'s> {
    pub fn new(session: &'s CatalogSession, settings: EvaluationSettings) -> Self {
        Self {
            session,
            settings,
            reachability: None,
            conformance: None,
            vocabularies: HashMap::new(),
            aggregator: ScoringAggregator::new(),
        }
    }

    pub fn with_reachability(mut self, checker: ReachabilityChecker) -> Self {
        self.reachability = Some(checker);
        self
    }

    pub fn with_conformance(mut self, check: ConformanceCheck) -> Self {
        self.conformance = Some(check);
        self
    }

    pub fn aggregator(&self) -> &ScoringAggregator {
        &self.aggregator
    }

    /// Evaluates every scheduled indicator of `rubric` and builds the report.
    pub fn run(mut self, rubric: &Rubric) -> Result<ScoreReport> {
        for indicator in rubric.schedule(self.settings.probe_urls) {
            self.evaluate(indicator)?;
        }
        tracing::info!(total_points = self.aggregator.total_points(), "evaluation finished");
        Ok(self.aggregator.into_report(
            rubric,
            self.session.executor().describe(),
            self.session.populations(),
        ))
    }

    /// Evaluates one indicator and folds the result into the running total.
    pub fn evaluate(&mut self, indicator: &Indicator) -> Result<EvaluationResult> {
        let population = self.session.population(indicator.entity);
        let count = match self.count(indicator, population) {
            Ok(count) => count,
            Err(err) if self.settings.on_query_error == OnQueryError::Skip => {
                tracing::warn!(indicator = %indicator.id, error = %err, "indicator skipped");
                Count::NotEvaluated
            }
            Err(err) => return Err(err),
        };

        let result = EvaluationResult::score(indicator, count, population);
        tracing::info!(
            indicator = %result.id,
            count = result.count.as_reported(),
            population,
            points = result.points,
            "indicator evaluated"
        );
        self.aggregator.record(result.clone());
        Ok(result)
    }

    fn count(&mut self, indicator: &Indicator, population: u64) -> Result<Count> {
        let session = self.session;
        let executor = session.executor();
        match indicator.kind {
            IndicatorKind::Presence => {
                let property = required_property(indicator)?;
                executor
                    .count_with_property(indicator.entity, property)
                    .map(Count::Evaluated)
            }
            IndicatorKind::Vocabulary => {
                let property = required_property(indicator)?;
                let (reference, mode) = match (&indicator.vocabulary, indicator.match_mode) {
                    (Some(reference), Some(mode)) => (reference, mode),
                    _ => {
                        return Err(MqaError::Rubric(format!(
                            "{}: vocabulary indicator without vocabulary or match_mode",
                            indicator.id
                        )))
                    }
                };
                let vocabulary = cached_vocabulary(
                    &mut self.vocabularies,
                    &self.settings.vocabulary_dir,
                    reference,
                )?;
                let matched = executor
                    .grouped_values(indicator.entity, property)?
                    .into_iter()
                    .filter(|grouped| mode.matches(vocabulary, &grouped.value))
                    .map(|grouped| grouped.count)
                    .sum();
                Ok(Count::Evaluated(matched))
            }
            IndicatorKind::Reachability => {
                let property = required_property(indicator)?;
                let Some(checker) = &self.reachability else {
                    tracing::info!(indicator = %indicator.id, "no reachability checker configured");
                    return Ok(Count::NotEvaluated);
                };
                let grouped = executor.grouped_values(indicator.entity, property)?;
                let summary = checker.check(property, &grouped)?;
                let failed = summary.failures().count();
                if failed > 0 {
                    tracing::warn!(
                        indicator = %indicator.id,
                        failed,
                        log = %summary.failure_log.display(),
                        "unreachable urls logged"
                    );
                }
                Ok(Count::Evaluated(summary.success_count))
            }
            IndicatorKind::Conformance => {
                let Some(check) = &self.conformance else {
                    tracing::info!(
                        indicator = %indicator.id,
                        "no conformance validator configured"
                    );
                    return Ok(Count::NotEvaluated);
                };
                let (Some(data), Some(shapes)) = (&check.data, &check.shapes) else {
                    tracing::info!(
                        indicator = %indicator.id,
                        "catalog snapshot or shapes unavailable"
                    );
                    return Ok(Count::NotEvaluated);
                };
                let conforms = check.validator.validate(data, shapes, &check.options)?;
                Ok(Count::Evaluated(if conforms { population } else { 0 }))
            }
        }
    }
}

fn required_property(indicator: &Indicator) -> Result<Property> {
    indicator
        .property
        .ok_or_else(|| MqaError::Rubric(format!("{}: property is required", indicator.id)))
}

fn cached_vocabulary<'c>(
    cache: &'c mut HashMap<(String, usize), Vocabulary>,
    dir: &Path,
    reference: &VocabularyRef,
) -> Result<&'c Vocabulary> {
    let key = (reference.file.clone(), reference.field);
    if !cache.contains_key(&key) {
        let path = dir.join(&reference.file);
        let vocabulary = Vocabulary::load(&path, reference.field).map_err(|err| match err {
            MqaError::Io(_) => MqaError::PathNotFound(path.display().to_string()),
            other => other,
        })?;
        tracing::debug!(path = %path.display(), terms = vocabulary.len(), "vocabulary loaded");
        cache.insert(key.clone(), vocabulary);
    }
    cache
        .get(&key)
        .ok_or_else(|| MqaError::PathNotFound(reference.file.clone()))
}

use crate::rubric::Rubric;
use crate::types::report::{Populations, ScoreReport};
use crate::types::scoring::{EvaluationResult, Points};
use chrono::Utc;

/// Running total of indicator points plus the rows in evaluation order.
#[derive(Debug, Default)]
pub struct ScoringAggregator {
    rows: Vec<EvaluationResult>,
    total_points: Points,
}

impl ScoringAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: EvaluationResult) {
        self.total_points += result.points;
        self.rows.push(result);
    }

    pub fn total_points(&self) -> Points {
        self.total_points
    }

    pub fn rows(&self) -> &[EvaluationResult] {
        &self.rows
    }

    /// Sum of the weights of every recorded indicator.
    pub fn max_points(&self) -> Points {
        self.rows.iter().map(|row| row.weight).sum()
    }

    pub fn into_report(
        self,
        rubric: &Rubric,
        endpoint: String,
        populations: Populations,
    ) -> ScoreReport {
        let max_points = self.max_points();
        ScoreReport {
            rubric: rubric.name.clone(),
            rubric_version: rubric.version.clone(),
            endpoint,
            generated_at: Utc::now().to_rfc3339(),
            populations,
            rows: self.rows,
            total_points: self.total_points,
            max_points,
        }
    }
}

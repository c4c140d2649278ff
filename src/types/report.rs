use crate::types::scoring::{Count, EvaluationResult, Points};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Populations {
    pub datasets: u64,
    pub distributions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub rubric: String,
    pub rubric_version: String,
    pub endpoint: String,
    pub generated_at: String,
    pub populations: Populations,
    pub rows: Vec<EvaluationResult>,
    pub total_points: Points,
    pub max_points: Points,
}

impl ScoreReport {
    pub fn not_evaluated(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.rows
            .iter()
            .filter(|row| matches!(row.count, Count::NotEvaluated))
    }
}

use crate::types::indicator::{Dimension, Indicator};
use serde::{Serialize, Serializer};

pub type Points = f64;

/// Indicator count, or the `-1` sentinel when the indicator could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Evaluated(u64),
    NotEvaluated,
}

impl Count {
    pub fn as_reported(self) -> i64 {
        match self {
            Self::Evaluated(count) => i64::try_from(count).unwrap_or(i64::MAX),
            Self::NotEvaluated => -1,
        }
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_reported())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub id: String,
    pub dimension: Dimension,
    pub label: String,
    pub count: Count,
    pub population: u64,
    pub percentage: Option<f64>,
    pub weight: f64,
    pub points: Points,
}

impl EvaluationResult {
    /// Normalizes `count` against `population` and weights it.
    ///
    /// An empty population or a `NotEvaluated` count yields no percentage and
    /// zero points.
    pub fn score(indicator: &Indicator, count: Count, population: u64) -> Self {
        let percentage = match count {
            Count::Evaluated(n) if population > 0 => Some(n as f64 / population as f64),
            _ => None,
        };
        let points = match (count, percentage) {
            (Count::Evaluated(n), Some(percentage)) if n > 0 => percentage * indicator.weight,
            _ => 0.0,
        };
        Self {
            id: indicator.id.clone(),
            dimension: indicator.dimension,
            label: indicator.display_label(),
            count,
            population,
            percentage,
            weight: indicator.weight,
            points,
        }
    }
}

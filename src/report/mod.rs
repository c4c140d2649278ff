pub mod json;
pub mod md;
pub mod table;

use crate::error::MqaError;
use crate::types::report::ScoreReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Table,
    Md,
    Json,
}

pub fn render(report: &ScoreReport, format: OutputFormat) -> Result<String, MqaError> {
    match format {
        OutputFormat::Table => Ok(table::to_table(report)),
        OutputFormat::Md => Ok(md::to_markdown(report)),
        OutputFormat::Json => json::to_json(report).map_err(MqaError::Json),
    }
}

pub(crate) fn format_percentage(percentage: Option<f64>) -> String {
    percentage.map_or_else(|| "-".to_string(), |value| format!("{value:.4}"))
}

use super::format_percentage;
use crate::types::report::ScoreReport;

pub fn to_markdown(report: &ScoreReport) -> String {
    let mut output = String::new();
    output.push_str("# Metadata Quality Report\n\n");
    output.push_str(&format!(
        "- endpoint: {}\n- rubric: {} {}\n- datasets: {}\n- distributions: {}\n\n",
        report.endpoint,
        report.rubric,
        report.rubric_version,
        report.populations.datasets,
        report.populations.distributions
    ));
    output.push_str(&format!(
        "Total points: {:.2} / {:.2}\n\n",
        report.total_points, report.max_points
    ));

    output.push_str("## Indicators\n\n");
    output.push_str("| Dimension | Indicator | Count | Population | Percentage | Points |\n");
    output.push_str("|---|---|---:|---:|---:|---:|\n");
    for row in &report.rows {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.2} |\n",
            row.dimension,
            row.label,
            row.count.as_reported(),
            row.population,
            format_percentage(row.percentage),
            row.points
        ));
    }

    let skipped = report.not_evaluated().collect::<Vec<_>>();
    if !skipped.is_empty() {
        output.push_str("\n## Not Evaluated\n\n");
        for row in skipped {
            output.push_str(&format!("- {} ({})\n", row.label, row.id));
        }
    }

    output
}

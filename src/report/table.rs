use super::format_percentage;
use crate::types::report::ScoreReport;

/// Tab-separated rows followed by the `Total points` line.
pub fn to_table(report: &ScoreReport) -> String {
    let mut output =
        String::from("Dimension\tIndicator/property\tCount\tPopulation\tPercentage\tPoints\n");
    for row in &report.rows {
        output.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{:.2}\n",
            row.dimension,
            row.label,
            row.count.as_reported(),
            row.population,
            format_percentage(row.percentage),
            row.points
        ));
    }
    output.push_str(&format!("Total points\t{:.2}\n", report.total_points));
    output
}

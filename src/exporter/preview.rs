use crate::model::AnalysisReport;
use std::fmt::Write;

/// Short plain-text view of a report: header line plus the first `max_rows` rows.
pub fn render_preview(report: &AnalysisReport, max_rows: usize) -> String {
    let table = &report.table;
    let mut out = String::new();

    let span = match (table.rows.first(), table.rows.last()) {
        (Some(first), Some(last)) => format!(
            "{} .. {}",
            first.date.format("%Y-%m-%d"),
            last.date.format("%Y-%m-%d")
        ),
        _ => "no rows".to_string(),
    };
    let _ = writeln!(
        out,
        "STL decomposition: {} | period {} | {} rows | {}",
        report.keyword,
        report.period,
        table.len(),
        span
    );
    let _ = writeln!(
        out,
        "{:<12} {:>10} {:>10} {:>10} {:>10}",
        "date", "original", "trend", "seasonal", "remainder"
    );
    for row in table.rows.iter().take(max_rows) {
        let _ = writeln!(
            out,
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.date.format("%Y-%m-%d").to_string(),
            row.original,
            row.trend,
            row.seasonal,
            row.remainder
        );
    }
    if table.len() > max_rows {
        let _ = writeln!(out, "... {} more rows", table.len() - max_rows);
    }
    out
}

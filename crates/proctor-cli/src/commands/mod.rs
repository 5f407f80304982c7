pub mod compare;
pub mod history;
pub mod init;
pub mod patterns;
pub mod score;
pub mod take;
pub mod validate;

use comfy_table::{Cell, Table};

use proctor_core::scoring::ScoreReport;

/// Render a score report as summary and per-subject tables.
pub fn score_tables(report: &ScoreReport) -> (Table, Table) {
    let mut summary = Table::new();
    summary.set_header(vec![
        "Score",
        "Percentage",
        "Correct",
        "Wrong",
        "Unattempted",
        "Time Spent",
    ]);
    summary.add_row(vec![
        Cell::new(format!("{} / {}", report.score, report.max_score)),
        Cell::new(format!("{:.1}% ({})", report.percentage, report.band)),
        Cell::new(report.correct),
        Cell::new(report.wrong),
        Cell::new(report.unattempted),
        Cell::new(report.time_spent),
    ]);

    let mut subjects = Table::new();
    subjects.set_header(vec!["Subject", "Score", "Percentage", "Correct", "Wrong", "Unattempted"]);
    for s in &report.subjects {
        subjects.add_row(vec![
            Cell::new(s.subject),
            Cell::new(format!("{} / {}", s.score, s.max_score)),
            Cell::new(format!("{:.1}%", s.percentage)),
            Cell::new(s.correct),
            Cell::new(s.wrong),
            Cell::new(s.unattempted),
        ]);
    }

    (summary, subjects)
}

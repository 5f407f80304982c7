//! The `proctor history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use proctor_core::catalog::ExamKind;
use proctor_core::statistics::{history_totals, summarize_history};
use proctor_providers::config::load_config_from;
use proctor_providers::load_history;

pub fn execute(
    file: Option<PathBuf>,
    exam: Option<String>,
    format: String,
    config: Option<PathBuf>,
) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => load_config_from(config.as_deref())?.history_path().to_path_buf(),
    };

    let mut records = load_history(&path)?;
    if let Some(exam) = &exam {
        // Accept either the catalog key or its aliases ("jeemain", "JEE Main").
        let key = exam
            .parse::<ExamKind>()
            .map(|k| k.to_string())
            .unwrap_or_else(|_| exam.clone());
        records.retain(|r| r.exam.eq_ignore_ascii_case(&key));
    }

    let stats = summarize_history(&records);
    let totals = history_totals(&records);

    if format == "json" {
        let json = serde_json::json!({
            "records": records,
            "exams": stats,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No attempts recorded in {}", path.display());
        return Ok(());
    }

    let mut attempts = Table::new();
    attempts.set_header(vec!["Date", "Exam", "Score", "Percentage", "Rank"]);
    for r in &records {
        attempts.add_row(vec![
            r.date.to_string(),
            r.exam.clone(),
            r.score.to_string(),
            format!("{:.1}%", r.percentage),
            r.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
        ]);
    }
    println!("{attempts}");

    let mut summary = Table::new();
    summary.set_header(vec![
        "Exam",
        "Attempts",
        "Best Score",
        "Best %",
        "Average %",
        "Best Rank",
        "Latest",
    ]);
    for s in &stats {
        summary.add_row(vec![
            s.exam.clone(),
            s.attempts.to_string(),
            s.best_score.to_string(),
            format!("{:.1}%", s.best_percentage),
            format!("{:.1}%", s.average_percentage),
            s.best_rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
            s.latest_date.to_string(),
        ]);
    }
    println!("{summary}");

    println!(
        "\n{} attempt(s) across {} exam(s), average {:.1}%",
        totals.attempts, totals.exams, totals.average_percentage
    );

    Ok(())
}

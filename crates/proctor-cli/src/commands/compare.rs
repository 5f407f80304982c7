//! The `proctor compare` command.

use std::path::PathBuf;

use anyhow::Result;

use proctor_core::report::AttemptReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = AttemptReport::load_json(&baseline_path)?;
    let current = AttemptReport::load_json(&current_path)?;

    if baseline.exam.name != current.exam.name {
        tracing::warn!(
            baseline = %baseline.exam.name,
            current = %current.exam.name,
            "comparing attempts of different exams"
        );
    }

    let comparison = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", comparison.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            println!(
                "Overall: {:.1}% -> {:.1}% ({:+.1})",
                comparison.baseline_percentage,
                comparison.current_percentage,
                comparison.overall_delta()
            );
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                comparison.regressions.len(),
                comparison.improvements.len(),
                comparison.unchanged
            );

            for (title, changes) in [
                ("Regressions", &comparison.regressions),
                ("Improvements", &comparison.improvements),
            ] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        c.subject, c.baseline_percentage, c.current_percentage, c.delta
                    );
                }
            }

            if comparison.new_subjects > 0 {
                println!("\n{} new subject(s)", comparison.new_subjects);
            }
            if comparison.removed_subjects > 0 {
                println!("{} removed subject(s)", comparison.removed_subjects);
            }
        }
    }

    if fail_on_regression && comparison.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

//! The `proctor patterns` command.

use anyhow::Result;
use comfy_table::Table;

use proctor_core::catalog::ExamKind;
use proctor_core::timer::format_clock;

pub fn execute(exam: Option<String>) -> Result<()> {
    match exam {
        Some(name) => {
            let kind: ExamKind = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let pattern = kind.pattern();
            println!(
                "{} ({kind}): {} | +{} / -{} marking",
                pattern.name,
                format_clock(pattern.duration_secs),
                pattern.marking.correct,
                pattern.marking.wrong_penalty
            );

            let mut table = Table::new();
            table.set_header(vec!["Section", "Subject", "Questions", "Max Marks"]);
            for (i, section) in pattern.sections.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    section.subject.to_string(),
                    section.question_count.to_string(),
                    (section.question_count as f64 * pattern.marking.correct).to_string(),
                ]);
            }
            println!("{table}");
        }
        None => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Exam", "Duration", "Questions", "Marking"]);
            for kind in ExamKind::ALL {
                let pattern = kind.pattern();
                table.add_row(vec![
                    kind.to_string(),
                    pattern.name.clone(),
                    format_clock(pattern.duration_secs),
                    pattern.total_questions().to_string(),
                    format!(
                        "+{} / -{}",
                        pattern.marking.correct, pattern.marking.wrong_penalty
                    ),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

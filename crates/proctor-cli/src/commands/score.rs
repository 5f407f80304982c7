//! The `proctor score` command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use proctor_core::bank::ExamPaper;
use proctor_core::parser;
use proctor_core::report::AttemptReport;
use proctor_core::scoring::score_attempt;
use proctor_report::html::generate_html;

use super::score_tables;

pub fn execute(
    file: PathBuf,
    answers_path: PathBuf,
    elapsed_secs: u64,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let exam = parser::parse_exam_file(&file)?;
    let paper = exam.paper()?;
    let answers = read_answers(&answers_path, &paper)?;

    let elapsed_secs = elapsed_secs.min(paper.pattern.duration_secs);
    let score = score_attempt(&paper, &answers, elapsed_secs);

    match format.as_str() {
        "json" => {
            let report = AttemptReport::new(&paper, answers, score);
            emit(&serde_json::to_string_pretty(&report)?, output.as_deref())?;
        }
        "html" => {
            let report = AttemptReport::new(&paper, answers, score);
            emit(&generate_html(&report), output.as_deref())?;
        }
        _ => {
            let (summary, subjects) = score_tables(&score);
            println!("{}\n{summary}\n{subjects}", paper.pattern.name);
        }
    }

    Ok(())
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Report saved to: {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Read an answers file: a JSON object mapping question numbers to an option
/// index (0-3) or letter ("A"-"D"). Entries that do not fit the paper are
/// dropped with a warning.
fn read_answers(path: &Path, paper: &ExamPaper) -> Result<BTreeMap<u32, usize>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers from {}", path.display()))?;
    let raw: BTreeMap<String, Value> =
        serde_json::from_str(&content).context("answers must be a JSON object")?;
    Ok(parse_answers(raw, paper))
}

fn parse_answers(raw: BTreeMap<String, Value>, paper: &ExamPaper) -> BTreeMap<u32, usize> {
    let mut answers = BTreeMap::new();
    for (key, value) in raw {
        let Ok(id) = key.trim().parse::<u32>() else {
            tracing::warn!(key = %key, "ignoring answer with a non-numeric question number");
            continue;
        };
        let option = match &value {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => option_from_letter(s),
            _ => None,
        };
        let valid = option.filter(|&o| paper.question(id).is_some_and(|q| o < q.options.len()));
        match valid {
            Some(option) => {
                answers.insert(id, option);
            }
            None => tracing::warn!(question = id, answer = %value, "ignoring invalid answer"),
        }
    }
    answers
}

fn option_from_letter(s: &str) -> Option<usize> {
    let mut chars = s.trim().chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !c.is_ascii_uppercase() {
        return None;
    }
    Some((c as u8 - b'A') as usize)
}

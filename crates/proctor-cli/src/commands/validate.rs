//! The `proctor validate` command.

use std::path::PathBuf;

use anyhow::Result;

use proctor_core::parser;

pub fn execute(path: PathBuf) -> Result<()> {
    let files = if path.is_dir() {
        parser::load_exam_directory(&path)?
    } else {
        vec![parser::parse_exam_file(&path)?]
    };

    let mut total_warnings = 0;

    for file in &files {
        println!(
            "Exam: {} ({} questions, {} in bank)",
            file.pattern.name,
            file.pattern.total_questions(),
            file.bank.len()
        );

        let warnings = parser::validate_exam_file(file);
        for w in &warnings {
            let prefix = w
                .subject
                .map(|s| format!("  [{s}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exam files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

//! TOML exam file parser.
//!
//! Loads exam patterns and question banks from TOML files and directories,
//! and validates them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::{assemble, ExamPaper, QuestionBank};
use crate::catalog::ExamKind;
use crate::model::{ExamPattern, MarkingScheme, QuestionTemplate, Section, Subject};

/// Intermediate TOML structure for parsing exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    duration_minutes: Option<u64>,
    #[serde(default)]
    duration_secs: Option<u64>,
    #[serde(default)]
    marking: Option<MarkingScheme>,
    #[serde(default)]
    sections: Vec<TomlSection>,
}

#[derive(Debug, Deserialize)]
struct TomlSection {
    subject: String,
    questions: u32,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    subject: String,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// A parsed exam file: the pattern to sit and the questions to draw from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamFile {
    pub pattern: ExamPattern,
    /// Catalog exam the pattern was derived from, if any.
    pub kind: Option<ExamKind>,
    pub bank: QuestionBank,
    pub source: PathBuf,
}

impl ExamFile {
    /// Assemble a paper from this file's pattern and bank.
    pub fn paper(&self) -> Result<ExamPaper> {
        assemble(&self.pattern, &self.bank)
            .with_context(|| format!("cannot assemble paper from {}", self.source.display()))
    }

    /// Key used to tag results: the catalog key when there is one, else the
    /// exam name.
    pub fn exam_key(&self) -> String {
        match self.kind {
            Some(kind) => kind.to_string(),
            None => self.pattern.name.clone(),
        }
    }
}

fn parse_subject(s: &str) -> Result<Subject> {
    s.parse().map_err(|e: String| anyhow::anyhow!(e))
}

/// Parse a single TOML file into an `ExamFile`.
pub fn parse_exam_file(path: &Path) -> Result<ExamFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path)
}

/// Parse a TOML string into an `ExamFile` (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<ExamFile> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    let header = parsed.exam;

    let kind = header
        .kind
        .as_deref()
        .map(|k| k.parse::<ExamKind>().map_err(|e: String| anyhow::anyhow!(e)))
        .transpose()?;

    let mut pattern = match kind {
        Some(kind) => kind.pattern(),
        None => {
            let name = header
                .name
                .clone()
                .context("exam needs a `name` when no `kind` is given")?;
            if header.duration_minutes.is_none() && header.duration_secs.is_none() {
                anyhow::bail!("exam '{name}' needs `duration_minutes` or `duration_secs`");
            }
            if header.sections.is_empty() {
                anyhow::bail!("exam '{name}' declares no sections");
            }
            ExamPattern {
                name,
                duration_secs: 0,
                sections: Vec::new(),
                marking: MarkingScheme::default(),
            }
        }
    };

    if let Some(name) = header.name {
        pattern.name = name;
    }
    if let Some(secs) = header.duration_secs {
        pattern.duration_secs = secs;
    } else if let Some(minutes) = header.duration_minutes {
        pattern.duration_secs = minutes.checked_mul(60).with_context(|| {
            format!("exam '{}': duration_minutes = {minutes} is too large", pattern.name)
        })?;
    }
    if let Some(marking) = header.marking {
        pattern.marking = marking;
    }
    if !header.sections.is_empty() {
        pattern.sections = header
            .sections
            .iter()
            .map(|s| {
                Ok(Section {
                    subject: parse_subject(&s.subject)?,
                    question_count: s.questions,
                })
            })
            .collect::<Result<Vec<_>>>()?;
    }

    let mut bank = QuestionBank::new();
    for (i, q) in parsed.questions.into_iter().enumerate() {
        let subject = parse_subject(&q.subject)
            .with_context(|| format!("question {} in {}", i + 1, source_path.display()))?;
        bank.add(
            subject,
            QuestionTemplate {
                prompt: q.prompt,
                options: q.options,
                correct_option: q.correct,
                topic: q.topic,
                explanation: q.explanation,
            },
        );
    }

    Ok(ExamFile {
        pattern,
        kind,
        bank,
        source: source_path.to_path_buf(),
    })
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<ExamFile>> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            files.extend(load_exam_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam_file(&path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(files)
}

/// A warning from exam file validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The subject concerned (if applicable).
    pub subject: Option<Subject>,
    /// Warning message.
    pub message: String,
}

/// Validate an exam file for common issues.
pub fn validate_exam_file(file: &ExamFile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Err(e) = assemble(&file.pattern, &file.bank) {
        warnings.push(ValidationWarning {
            subject: None,
            message: format!("paper cannot be assembled: {e}"),
        });
    }

    // Pools smaller than their section repeat questions
    for section in &file.pattern.sections {
        let available = file.bank.pool(section.subject).len();
        if available > 0 && (available as u32) < section.question_count {
            warnings.push(ValidationWarning {
                subject: Some(section.subject),
                message: format!(
                    "only {available} questions for a section of {}; questions will repeat",
                    section.question_count
                ),
            });
        }
    }

    for subject in file.bank.subjects() {
        // Bank subjects the pattern never asks for
        if file.pattern.section_count(subject).is_none() {
            warnings.push(ValidationWarning {
                subject: Some(subject),
                message: "questions present but no section uses this subject".into(),
            });
        }

        let mut seen = HashSet::new();
        for template in file.bank.pool(subject) {
            let prompt = template.prompt.trim();
            if prompt.is_empty() {
                warnings.push(ValidationWarning {
                    subject: Some(subject),
                    message: "question prompt is empty".into(),
                });
            } else if !seen.insert(prompt) {
                warnings.push(ValidationWarning {
                    subject: Some(subject),
                    message: format!("duplicate prompt: {prompt}"),
                });
            }
        }
    }

    warnings
}

//! Question banks and paper assembly.
//!
//! A bank holds per-subject pools of question templates. Assembly walks the
//! exam pattern's sections in order and draws from each pool round-robin, so
//! a pool smaller than its section repeats rather than erroring.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{
    ExamPattern, Question, QuestionTemplate, Subject, MAX_QUESTIONS, OPTIONS_PER_QUESTION,
};

/// Per-subject pools of question templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pools: BTreeMap<Subject, Vec<QuestionTemplate>>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one template to a subject's pool.
    pub fn add(&mut self, subject: Subject, template: QuestionTemplate) {
        self.pools.entry(subject).or_default().push(template);
    }

    /// Builder-style variant of [`QuestionBank::add`] for a whole pool.
    pub fn with_pool(mut self, subject: Subject, templates: Vec<QuestionTemplate>) -> Self {
        self.pools.entry(subject).or_default().extend(templates);
        self
    }

    /// The templates available for a subject (empty if none).
    pub fn pool(&self, subject: Subject) -> &[QuestionTemplate] {
        self.pools.get(&subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Subjects with at least one template.
    pub fn subjects(&self) -> impl Iterator<Item = Subject> + '_ {
        self.pools
            .iter()
            .filter(|(_, pool)| !pool.is_empty())
            .map(|(subject, _)| *subject)
    }

    /// Total number of templates across all pools.
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge another bank's pools into this one.
    pub fn extend(&mut self, other: QuestionBank) {
        for (subject, templates) in other.pools {
            self.pools.entry(subject).or_default().extend(templates);
        }
    }
}

/// A fully assembled, read-only question paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPaper {
    pub pattern: ExamPattern,
    pub questions: Vec<Question>,
}

impl ExamPaper {
    pub fn total_questions(&self) -> u32 {
        self.questions.len() as u32
    }

    /// Sum of marks for answering every question correctly.
    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.points_correct).sum()
    }

    /// Look up a question by its 1-based id.
    pub fn question(&self, id: u32) -> Option<&Question> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.questions.get(index)
    }
}

/// Check a pattern for problems that would make an attempt meaningless.
pub fn validate_pattern(pattern: &ExamPattern) -> Result<(), ConfigError> {
    if pattern.sections.is_empty() || pattern.total_questions() == 0 {
        return Err(ConfigError::EmptyPattern(pattern.name.clone()));
    }
    let requested: u64 = pattern.sections.iter().map(|s| u64::from(s.question_count)).sum();
    if requested > MAX_QUESTIONS {
        return Err(ConfigError::TooManyQuestions {
            name: pattern.name.clone(),
            requested,
            limit: MAX_QUESTIONS,
        });
    }
    if pattern.duration_secs == 0 {
        return Err(ConfigError::ZeroDuration(pattern.name.clone()));
    }

    let mut seen = HashSet::new();
    for section in &pattern.sections {
        if !seen.insert(section.subject) {
            return Err(ConfigError::DuplicateSection(section.subject));
        }
    }

    let marking = pattern.marking;
    let valid = |v: f64| v.is_finite() && v >= 0.0;
    if !valid(marking.correct) || !valid(marking.wrong_penalty) {
        return Err(ConfigError::InvalidMarking {
            correct: marking.correct,
            wrong_penalty: marking.wrong_penalty,
        });
    }

    Ok(())
}

/// Check a single template; `index` is its position within the subject pool.
pub fn validate_template(
    subject: Subject,
    index: usize,
    template: &QuestionTemplate,
) -> Result<(), ConfigError> {
    if template.options.len() != OPTIONS_PER_QUESTION {
        return Err(ConfigError::OptionCount {
            subject,
            index,
            found: template.options.len(),
            expected: OPTIONS_PER_QUESTION,
        });
    }
    if template.correct_option >= template.options.len() {
        return Err(ConfigError::CorrectOutOfRange {
            subject,
            index,
            correct: template.correct_option,
            options: template.options.len(),
        });
    }
    Ok(())
}

/// Materialize a paper from a pattern and a bank.
pub fn assemble(pattern: &ExamPattern, bank: &QuestionBank) -> Result<ExamPaper, ConfigError> {
    validate_pattern(pattern)?;

    let mut questions = Vec::with_capacity(pattern.total_questions() as usize);
    let mut next_id = 1u32;

    for section in &pattern.sections {
        let pool = bank.pool(section.subject);
        if pool.is_empty() {
            return Err(ConfigError::EmptyPool(section.subject));
        }
        for (index, template) in pool.iter().enumerate() {
            validate_template(section.subject, index, template)?;
        }
        if (pool.len() as u32) < section.question_count {
            tracing::debug!(
                subject = %section.subject,
                pool = pool.len(),
                needed = section.question_count,
                "question pool smaller than section, repeating"
            );
        }

        for i in 0..section.question_count as usize {
            let template = &pool[i % pool.len()];
            questions.push(Question::from_template(
                next_id,
                section.subject,
                template,
                pattern.marking,
            ));
            next_id += 1;
        }
    }

    Ok(ExamPaper {
        pattern: pattern.clone(),
        questions,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::model::{MarkingScheme, Section};

    pub fn template(prompt: &str, correct: usize) -> QuestionTemplate {
        QuestionTemplate {
            prompt: prompt.into(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option: correct,
            topic: None,
            explanation: None,
        }
    }

    pub fn pattern(
        duration_secs: u64,
        sections: &[(Subject, u32)],
        marking: MarkingScheme,
    ) -> ExamPattern {
        ExamPattern {
            name: "Test Exam".into(),
            duration_secs,
            sections: sections
                .iter()
                .map(|&(subject, question_count)| Section {
                    subject,
                    question_count,
                })
                .collect(),
            marking,
        }
    }

    /// A paper whose every question has option 0 as the correct answer.
    pub fn paper(
        duration_secs: u64,
        sections: &[(Subject, u32)],
        marking: MarkingScheme,
    ) -> ExamPaper {
        let pattern = pattern(duration_secs, sections, marking);
        let mut bank = QuestionBank::new();
        for &(subject, _) in sections {
            bank.add(subject, template(&format!("{subject} question"), 0));
        }
        assemble(&pattern, &bank).unwrap()
    }
}

//! Core data model types for proctor.
//!
//! Subjects, exam patterns, marking schemes and materialized questions. The
//! built-in exam catalog lives in [`crate::catalog`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of candidate answers every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Upper bound on the questions a single paper may hold.
pub const MAX_QUESTIONS: u64 = 1_000;

/// A subject (section) an exam question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Physics,
    Chemistry,
    Mathematics,
    Biology,
    GeneralTest,
    English,
    EnglishLanguage,
    QuantitativeAptitude,
    QuantitativeTechniques,
    LogicalReasoning,
    LegalReasoning,
    CurrentAffairs,
    CreativeThinking,
    AnalyticalSkills,
    CommunicationStyle,
}

impl Subject {
    /// Every subject, in declaration order.
    pub const ALL: [Subject; 15] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Mathematics,
        Subject::Biology,
        Subject::GeneralTest,
        Subject::English,
        Subject::EnglishLanguage,
        Subject::QuantitativeAptitude,
        Subject::QuantitativeTechniques,
        Subject::LogicalReasoning,
        Subject::LegalReasoning,
        Subject::CurrentAffairs,
        Subject::CreativeThinking,
        Subject::AnalyticalSkills,
        Subject::CommunicationStyle,
    ];

    /// Human-readable label, e.g. "Quantitative Aptitude".
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Mathematics => "Mathematics",
            Subject::Biology => "Biology",
            Subject::GeneralTest => "General Test",
            Subject::English => "English",
            Subject::EnglishLanguage => "English Language",
            Subject::QuantitativeAptitude => "Quantitative Aptitude",
            Subject::QuantitativeTechniques => "Quantitative Techniques",
            Subject::LogicalReasoning => "Logical Reasoning",
            Subject::LegalReasoning => "Legal Reasoning",
            Subject::CurrentAffairs => "Current Affairs",
            Subject::CreativeThinking => "Creative Thinking",
            Subject::AnalyticalSkills => "Analytical Skills",
            Subject::CommunicationStyle => "Communication Style",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Mathematics => "mathematics",
            Subject::Biology => "biology",
            Subject::GeneralTest => "general_test",
            Subject::English => "english",
            Subject::EnglishLanguage => "english_language",
            Subject::QuantitativeAptitude => "quantitative_aptitude",
            Subject::QuantitativeTechniques => "quantitative_techniques",
            Subject::LogicalReasoning => "logical_reasoning",
            Subject::LegalReasoning => "legal_reasoning",
            Subject::CurrentAffairs => "current_affairs",
            Subject::CreativeThinking => "creative_thinking",
            Subject::AnalyticalSkills => "analytical_skills",
            Subject::CommunicationStyle => "communication_style",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Subject {
    type Err = String;

    /// Accepts both the snake_case key ("general_test") and the label
    /// ("General Test"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Subject::ALL
            .iter()
            .copied()
            .find(|subject| subject.key() == normalized)
            .ok_or_else(|| format!("unknown subject: {s}"))
    }
}

/// Marks awarded for a correct answer and deducted for a wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkingScheme {
    pub correct: f64,
    #[serde(default)]
    pub wrong_penalty: f64,
}

impl MarkingScheme {
    pub const fn new(correct: f64, wrong_penalty: f64) -> Self {
        Self {
            correct,
            wrong_penalty,
        }
    }
}

impl Default for MarkingScheme {
    fn default() -> Self {
        Self::new(4.0, 1.0)
    }
}

/// One section of an exam pattern: a subject and how many questions it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub subject: Subject,
    #[serde(rename = "questions")]
    pub question_count: u32,
}

/// The shape of an exam: duration, sections and marking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPattern {
    /// Display name (e.g. "JEE Main").
    pub name: String,
    /// Total time allowed, in seconds.
    pub duration_secs: u64,
    /// Ordered sections; questions are numbered in this order.
    pub sections: Vec<Section>,
    /// Marking applied to every question of the exam.
    #[serde(default)]
    pub marking: MarkingScheme,
}

impl ExamPattern {
    /// Build a pattern with a duration given in minutes.
    pub fn with_minutes(
        name: impl Into<String>,
        minutes: u64,
        sections: Vec<Section>,
        marking: MarkingScheme,
    ) -> Self {
        Self {
            name: name.into(),
            duration_secs: minutes.saturating_mul(60),
            sections,
            marking,
        }
    }

    /// Total number of questions the pattern materializes. Saturates at
    /// `u32::MAX`; `validate_pattern` rejects anything over `MAX_QUESTIONS`.
    pub fn total_questions(&self) -> u32 {
        self.sections
            .iter()
            .fold(0u32, |total, s| total.saturating_add(s.question_count))
    }

    /// Question count declared for a subject, if the pattern has that section.
    pub fn section_count(&self, subject: Subject) -> Option<u32> {
        self.sections
            .iter()
            .find(|s| s.subject == subject)
            .map(|s| s.question_count)
    }
}

/// A question as held by a question bank, before it is placed in a paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correct")]
    pub correct_option: usize,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A question materialized into an assembled paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position within the paper.
    pub id: u32,
    pub subject: Subject,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    pub points_correct: f64,
    pub points_wrong_penalty: f64,
}

impl Question {
    pub(crate) fn from_template(
        id: u32,
        subject: Subject,
        template: &QuestionTemplate,
        marking: MarkingScheme,
    ) -> Self {
        Self {
            id,
            subject,
            prompt: template.prompt.clone(),
            options: template.options.clone(),
            correct_option: template.correct_option,
            topic: template.topic.clone(),
            explanation: template.explanation.clone(),
            points_correct: marking.correct,
            points_wrong_penalty: marking.wrong_penalty,
        }
    }

    /// Whether `option` is the correct choice for this question.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

/// Letter label for an option index ("A" for 0).
pub fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

//! Configuration error types.
//!
//! These are raised while assembling a paper, before an attempt starts, so a
//! broken question bank fails loudly at setup instead of mid-test.

use thiserror::Error;

use crate::model::Subject;

/// Errors that make an exam pattern or question bank unusable.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The pattern declares no sections or zero questions in total.
    #[error("exam pattern '{0}' has no questions")]
    EmptyPattern(String),

    /// The pattern has a zero duration.
    #[error("exam pattern '{0}' has a zero duration")]
    ZeroDuration(String),

    /// The pattern asks for more questions than a paper may hold.
    #[error("exam pattern '{name}' asks for {requested} questions, the limit is {limit}")]
    TooManyQuestions {
        name: String,
        requested: u64,
        limit: u64,
    },

    /// The same subject appears in more than one section.
    #[error("subject {0} appears in more than one section")]
    DuplicateSection(Subject),

    /// Marks must be finite and non-negative.
    #[error("invalid marking scheme: correct={correct}, wrong_penalty={wrong_penalty}")]
    InvalidMarking { correct: f64, wrong_penalty: f64 },

    /// A declared section has no questions to draw from.
    #[error("no questions available for subject {0}")]
    EmptyPool(Subject),

    /// A question does not carry the expected number of options.
    #[error("question {index} of {subject} has {found} options, expected {expected}")]
    OptionCount {
        subject: Subject,
        index: usize,
        found: usize,
        expected: usize,
    },

    /// The correct option index points outside the options.
    #[error("question {index} of {subject} marks option {correct} correct, but has only {options} options")]
    CorrectOutOfRange {
        subject: Subject,
        index: usize,
        correct: usize,
        options: usize,
    },
}

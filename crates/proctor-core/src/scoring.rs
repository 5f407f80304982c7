//! Score computation for a finished attempt.
//!
//! Negative marking is bounded per subject: each subject's net score is
//! floored at zero independently, so losses in one section are never offset
//! against gains in another before clamping. The global score and percentage
//! are clamped again on their own.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bank::ExamPaper;
use crate::model::Subject;

/// Per-subject breakdown of a score report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject: Subject,
    /// Questions of this subject in the paper.
    pub total: u32,
    pub attempted: u32,
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
    /// Net marks before clamping; may be negative.
    pub raw_score: f64,
    /// Net marks floored at zero.
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

impl SubjectScore {
    fn empty(subject: Subject) -> Self {
        Self {
            subject,
            total: 0,
            attempted: 0,
            correct: 0,
            wrong: 0,
            unattempted: 0,
            raw_score: 0.0,
            score: 0.0,
            max_score: 0.0,
            percentage: 0.0,
        }
    }
}

/// Time spent on an attempt, split into whole minutes and leftover seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpent {
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeSpent {
    pub fn from_secs(total: u64) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    pub fn as_secs(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for TimeSpent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m {}s", self.minutes, self.seconds)
    }
}

/// Coarse performance label derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Strong,
    Moderate,
    Weak,
}

impl PerformanceBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            PerformanceBand::Strong
        } else if percentage >= 60.0 {
            PerformanceBand::Moderate
        } else {
            PerformanceBand::Weak
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceBand::Strong => write!(f, "strong"),
            PerformanceBand::Moderate => write!(f, "moderate"),
            PerformanceBand::Weak => write!(f, "weak"),
        }
    }
}

/// Immutable result of scoring one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub total_questions: u32,
    pub correct: u32,
    pub wrong: u32,
    pub unattempted: u32,
    /// Net marks before clamping; may be negative.
    pub raw_score: f64,
    /// `max(0, raw_score)`.
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub band: PerformanceBand,
    /// One entry per section, in paper order.
    pub subjects: Vec<SubjectScore>,
    pub time_spent: TimeSpent,
}

impl ScoreReport {
    /// Breakdown for a single subject.
    pub fn subject(&self, subject: Subject) -> Option<&SubjectScore> {
        self.subjects.iter().find(|s| s.subject == subject)
    }

    pub fn attempted(&self) -> u32 {
        self.correct + self.wrong
    }
}

/// Score a set of answers against a paper.
///
/// `answers` maps 1-based question ids to the selected option index; ids
/// missing from the map count as unattempted. `elapsed_secs` is the time
/// consumed by the attempt.
pub fn score_attempt(
    paper: &ExamPaper,
    answers: &BTreeMap<u32, usize>,
    elapsed_secs: u64,
) -> ScoreReport {
    let mut correct = 0u32;
    let mut wrong = 0u32;
    let mut unattempted = 0u32;
    let mut raw_score = 0.0f64;

    let mut order: Vec<Subject> = paper.pattern.sections.iter().map(|s| s.subject).collect();
    let mut per_subject: BTreeMap<Subject, SubjectScore> = order
        .iter()
        .map(|&subject| (subject, SubjectScore::empty(subject)))
        .collect();

    for question in &paper.questions {
        let entry = per_subject.entry(question.subject).or_insert_with(|| {
            order.push(question.subject);
            SubjectScore::empty(question.subject)
        });
        entry.total += 1;
        entry.max_score += question.points_correct;

        match answers.get(&question.id) {
            None => {
                unattempted += 1;
                entry.unattempted += 1;
            }
            Some(&selected) => {
                entry.attempted += 1;
                if question.is_correct(selected) {
                    correct += 1;
                    entry.correct += 1;
                    raw_score += question.points_correct;
                    entry.raw_score += question.points_correct;
                } else {
                    wrong += 1;
                    entry.wrong += 1;
                    raw_score -= question.points_wrong_penalty;
                    entry.raw_score -= question.points_wrong_penalty;
                }
            }
        }
    }

    for entry in per_subject.values_mut() {
        entry.score = entry.raw_score.max(0.0);
        entry.percentage = percentage_of(entry.score, entry.max_score);
    }

    let max_score = paper.max_score();
    let score = raw_score.max(0.0);
    let percentage = percentage_of(score, max_score).max(0.0);

    let subjects = order
        .iter()
        .filter_map(|subject| per_subject.remove(subject))
        .collect();

    ScoreReport {
        total_questions: paper.total_questions(),
        correct,
        wrong,
        unattempted,
        raw_score,
        score,
        max_score,
        percentage,
        band: PerformanceBand::from_percentage(percentage),
        subjects,
        time_spent: TimeSpent::from_secs(elapsed_secs),
    }
}

fn percentage_of(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        score / max * 100.0
    } else {
        0.0
    }
}

//! The assessment engine: attempt lifecycle, answer state, and countdown.
//!
//! The engine is a plain state machine with no clock of its own; whoever owns
//! it calls [`AssessmentEngine::tick`] once per second while the attempt is
//! in progress (see [`crate::session::ExamSession`]). Every operation is a
//! silent no-op in a phase where it does not apply, so a stale callback that
//! fires after submission cannot disturb a finished attempt.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bank::ExamPaper;
use crate::report::AttemptReport;
use crate::scoring::{score_attempt, ScoreReport};
use crate::timer::TimeBand;

/// Lifecycle phase of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

/// Navigation request from the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    /// Jump to a 1-based question number; clamped to the paper.
    To(u32),
}

/// What a call to [`AssessmentEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The attempt is not in progress; nothing changed.
    Idle,
    /// One second elapsed and time remains.
    Running { remaining_secs: u64 },
    /// Time ran out and the attempt was submitted.
    Expired,
}

/// Mutable state of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptState {
    pub answers: BTreeMap<u32, usize>,
    pub current_question: u32,
    pub remaining_secs: u64,
    pub phase: Phase,
}

impl AttemptState {
    fn fresh(duration_secs: u64) -> Self {
        Self {
            answers: BTreeMap::new(),
            current_question: 1,
            remaining_secs: duration_secs,
            phase: Phase::NotStarted,
        }
    }
}

/// Read-only view of an attempt for the render layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSnapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub time_band: TimeBand,
    pub current_question: u32,
    pub total_questions: u32,
    pub answers: BTreeMap<u32, usize>,
}

impl AttemptSnapshot {
    pub fn answered(&self) -> usize {
        self.answers.len()
    }
}

/// Owns one paper and the state of a single attempt at it.
#[derive(Debug, Clone)]
pub struct AssessmentEngine {
    paper: Arc<ExamPaper>,
    state: AttemptState,
    report: Option<ScoreReport>,
}

impl AssessmentEngine {
    pub fn new(paper: impl Into<Arc<ExamPaper>>) -> Self {
        let paper = paper.into();
        let state = AttemptState::fresh(paper.pattern.duration_secs);
        Self {
            paper,
            state,
            report: None,
        }
    }

    pub fn paper(&self) -> &ExamPaper {
        &self.paper
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn current_question(&self) -> u32 {
        self.state.current_question
    }

    pub fn answers(&self) -> &BTreeMap<u32, usize> {
        &self.state.answers
    }

    /// The frozen score report, once the attempt is completed.
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    pub fn snapshot(&self) -> AttemptSnapshot {
        AttemptSnapshot {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            time_band: TimeBand::classify(
                self.state.remaining_secs,
                self.paper.pattern.duration_secs,
            ),
            current_question: self.state.current_question,
            total_questions: self.paper.total_questions(),
            answers: self.state.answers.clone(),
        }
    }

    /// Begin the attempt. Returns `true` if the phase changed.
    pub fn start(&mut self) -> bool {
        if self.state.phase != Phase::NotStarted {
            tracing::debug!(phase = ?self.state.phase, "start ignored");
            return false;
        }
        self.state = AttemptState::fresh(self.paper.pattern.duration_secs);
        self.state.phase = Phase::InProgress;
        tracing::info!(
            exam = %self.paper.pattern.name,
            questions = self.paper.total_questions(),
            duration_secs = self.state.remaining_secs,
            "attempt started"
        );
        true
    }

    /// Advance the countdown by one second, submitting when it reaches zero.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        if self.state.remaining_secs == 0 {
            tracing::info!(exam = %self.paper.pattern.name, "time expired, auto-submitting");
            self.submit();
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining_secs: self.state.remaining_secs,
        }
    }

    /// Record `option` as the answer to `question_id`; the last write wins.
    ///
    /// Returns `false` (and changes nothing) outside `InProgress` or for an
    /// unknown question or option.
    pub fn select_answer(&mut self, question_id: u32, option: usize) -> bool {
        if self.state.phase != Phase::InProgress {
            tracing::debug!(question_id, phase = ?self.state.phase, "answer ignored");
            return false;
        }
        let Some(question) = self.paper.question(question_id) else {
            tracing::debug!(question_id, "answer for unknown question ignored");
            return false;
        };
        if option >= question.options.len() {
            tracing::debug!(question_id, option, "answer with unknown option ignored");
            return false;
        }
        self.state.answers.insert(question_id, option);
        true
    }

    /// Answer the question currently on screen.
    pub fn answer_current(&mut self, option: usize) -> bool {
        self.select_answer(self.state.current_question, option)
    }

    /// Move between questions, clamped to `[1, total]`. Returns the current
    /// question after the move.
    pub fn navigate(&mut self, navigation: Navigation) -> u32 {
        if self.state.phase != Phase::InProgress {
            return self.state.current_question;
        }
        let total = self.paper.total_questions().max(1);
        let current = self.state.current_question;
        let target = match navigation {
            Navigation::Next => current.saturating_add(1),
            Navigation::Previous => current.saturating_sub(1),
            Navigation::To(n) => n,
        };
        self.state.current_question = target.clamp(1, total);
        self.state.current_question
    }

    /// Finish the attempt and freeze its score.
    ///
    /// Returns `true` only for the call that performed the transition; later
    /// calls leave the existing report untouched.
    pub fn submit(&mut self) -> bool {
        if self.state.phase != Phase::InProgress {
            tracing::debug!(phase = ?self.state.phase, "submit ignored");
            return false;
        }
        let elapsed = self
            .paper
            .pattern
            .duration_secs
            .saturating_sub(self.state.remaining_secs);
        let report = score_attempt(&self.paper, &self.state.answers, elapsed);
        tracing::info!(
            exam = %self.paper.pattern.name,
            score = report.score,
            percentage = report.percentage,
            "attempt submitted"
        );
        self.report = Some(report);
        self.state.phase = Phase::Completed;
        true
    }

    /// Abandon the current attempt, from any phase, and reset to `NotStarted`.
    pub fn restart(&mut self) {
        self.state = AttemptState::fresh(self.paper.pattern.duration_secs);
        self.report = None;
    }

    /// A persistable report of the completed attempt.
    pub fn attempt_report(&self) -> Option<AttemptReport> {
        let score = self.report.clone()?;
        Some(AttemptReport::new(
            &self.paper,
            self.state.answers.clone(),
            score,
        ))
    }
}

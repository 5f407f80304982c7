//! Session driver: binds an engine to a countdown ticker and a result sink.
//!
//! All engine mutation happens on the task that owns the [`ExamSession`].
//! The ticker runs as its own task and is cancelled the moment the attempt
//! leaves `InProgress`; persistence runs in spawned tasks and never blocks
//! ticking or input handling.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;

use crate::engine::{AssessmentEngine, AttemptSnapshot, Navigation, Phase, TickOutcome};
use crate::report::AttemptReport;
use crate::scoring::ScoreReport;
use crate::timer::{Ticker, DEFAULT_TICK_PERIOD};
use crate::traits::{ResultRecord, ResultSink};

/// Callbacks for rendering progress of an attempt.
pub trait AttemptObserver: Send + Sync {
    fn on_started(&self, snapshot: &AttemptSnapshot);
    fn on_tick(&self, remaining_secs: u64);
    fn on_completed(&self, report: &ScoreReport, timed_out: bool);
    fn on_persist_failed(&self, error: &str);
}

/// No-op observer.
pub struct NoopObserver;

impl AttemptObserver for NoopObserver {
    fn on_started(&self, _: &AttemptSnapshot) {}
    fn on_tick(&self, _: u64) {}
    fn on_completed(&self, _: &ScoreReport, _: bool) {}
    fn on_persist_failed(&self, _: &str) {}
}

/// What [`ExamSession::next_event`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// One second elapsed.
    Tick { remaining_secs: u64 },
    /// Time ran out; the attempt was submitted with this report.
    Expired(ScoreReport),
    /// No countdown is running.
    Idle,
}

/// A single attempt wired to its clock and persistence.
pub struct ExamSession {
    engine: AssessmentEngine,
    exam: String,
    sink: Arc<dyn ResultSink>,
    observer: Arc<dyn AttemptObserver>,
    tick_period: Duration,
    ticker: Option<Ticker>,
    pending: Vec<JoinHandle<()>>,
}

impl ExamSession {
    /// Records are tagged with the paper's pattern name unless
    /// [`ExamSession::with_exam`] overrides it.
    pub fn new(engine: AssessmentEngine, sink: Arc<dyn ResultSink>) -> Self {
        let exam = engine.paper().pattern.name.clone();
        Self {
            engine,
            exam,
            sink,
            observer: Arc::new(NoopObserver),
            tick_period: DEFAULT_TICK_PERIOD,
            ticker: None,
            pending: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AttemptObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_exam(mut self, exam: impl Into<String>) -> Self {
        self.exam = exam.into();
        self
    }

    /// Override the countdown resolution. One engine second is consumed per
    /// period regardless of its length.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn engine(&self) -> &AssessmentEngine {
        &self.engine
    }

    pub fn exam(&self) -> &str {
        &self.exam
    }

    pub fn snapshot(&self) -> AttemptSnapshot {
        self.engine.snapshot()
    }

    pub fn report(&self) -> Option<&ScoreReport> {
        self.engine.report()
    }

    pub fn attempt_report(&self) -> Option<AttemptReport> {
        self.engine.attempt_report()
    }

    #[cfg(test)]
    fn ticker_task(&self) -> Option<tokio::task::AbortHandle> {
        self.ticker.as_ref().map(Ticker::task)
    }

    /// Begin the attempt and its countdown. Must be called within a tokio
    /// runtime. Returns `false` if the attempt was not in `NotStarted`.
    pub fn start(&mut self) -> bool {
        if !self.engine.start() {
            return false;
        }
        self.ticker = Some(Ticker::start(self.tick_period));
        self.observer.on_started(&self.engine.snapshot());

        let sink = Arc::clone(&self.sink);
        let exam = self.exam.clone();
        self.pending.push(tokio::spawn(async move {
            if let Err(e) = sink.record_start(&exam).await {
                tracing::debug!(sink = sink.name(), error = %e, "start notification failed");
            }
        }));
        true
    }

    /// Wait for the next countdown tick and apply it.
    ///
    /// Cancel-safe: may be raced against input in `tokio::select!`. Returns
    /// [`SessionEvent::Idle`] immediately when no countdown is running.
    pub async fn next_event(&mut self) -> SessionEvent {
        let Some(ticker) = self.ticker.as_mut() else {
            return SessionEvent::Idle;
        };
        if !ticker.tick().await {
            self.ticker = None;
            return SessionEvent::Idle;
        }

        match self.engine.tick() {
            TickOutcome::Running { remaining_secs } => {
                self.observer.on_tick(remaining_secs);
                SessionEvent::Tick { remaining_secs }
            }
            TickOutcome::Expired => {
                self.finish(true);
                match self.engine.report() {
                    Some(report) => SessionEvent::Expired(report.clone()),
                    None => SessionEvent::Idle,
                }
            }
            TickOutcome::Idle => {
                self.stop_ticker();
                SessionEvent::Idle
            }
        }
    }

    pub fn select_answer(&mut self, question_id: u32, option: usize) -> bool {
        self.engine.select_answer(question_id, option)
    }

    pub fn answer_current(&mut self, option: usize) -> bool {
        self.engine.answer_current(option)
    }

    pub fn navigate(&mut self, navigation: Navigation) -> u32 {
        self.engine.navigate(navigation)
    }

    /// Submit manually. Returns `true` only for the submitting call.
    pub fn submit(&mut self) -> bool {
        if !self.engine.submit() {
            return false;
        }
        self.finish(false);
        true
    }

    /// Abandon the attempt and reset to `NotStarted`. Persistence already in
    /// flight is not cancelled.
    pub fn restart(&mut self) {
        self.stop_ticker();
        self.engine.restart();
    }

    /// Wait for every spawned persistence task to finish.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "persistence task panicked");
            }
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn finish(&mut self, timed_out: bool) {
        self.stop_ticker();
        debug_assert_eq!(self.engine.phase(), Phase::Completed);
        let Some(report) = self.engine.report() else {
            return;
        };
        self.observer.on_completed(report, timed_out);

        let record = ResultRecord {
            exam: self.exam.clone(),
            score: report.score,
            percentage: report.percentage,
            rank: None,
            date: Local::now().date_naive(),
        };
        let sink = Arc::clone(&self.sink);
        let observer = Arc::clone(&self.observer);
        self.pending.push(tokio::spawn(async move {
            match sink.record_result(&record).await {
                Ok(()) => {
                    tracing::debug!(sink = sink.name(), exam = %record.exam, "result persisted")
                }
                Err(e) => {
                    tracing::warn!(sink = sink.name(), error = %e, "failed to persist result");
                    observer.on_persist_failed(&format!("{e:#}"));
                }
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::bank::test_support::paper;
    use crate::model::{MarkingScheme, Subject};

    #[derive(Default)]
    struct RecordingSink {
        starts: AtomicUsize,
        records: Mutex<Vec<ResultRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl ResultSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn record_start(&self, _exam: &str) -> anyhow::Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn record_result(&self, record: &ResultRecord) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("backend unavailable");
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        ticks: AtomicUsize,
        completed: AtomicUsize,
        timed_out: AtomicUsize,
        persist_failures: AtomicUsize,
    }

    impl AttemptObserver for CountingObserver {
        fn on_started(&self, _: &AttemptSnapshot) {}
        fn on_tick(&self, _: u64) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
        fn on_completed(&self, _: &ScoreReport, timed_out: bool) {
            self.completed.fetch_add(1, Ordering::SeqCst);
            if timed_out {
                self.timed_out.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn on_persist_failed(&self, _: &str) {
            self.persist_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session(duration_secs: u64, sink: Arc<RecordingSink>) -> ExamSession {
        let paper = paper(
            duration_secs,
            &[(Subject::Physics, 3)],
            MarkingScheme::new(4.0, 1.0),
        );
        ExamSession::new(AssessmentEngine::new(paper), sink).with_exam("jee_main")
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_submits_exactly_once() {
        let sink = Arc::new(RecordingSink::default());
        let observer = Arc::new(CountingObserver::default());
        let mut session = session(3, Arc::clone(&sink)).with_observer(observer.clone());

        assert!(session.start());
        session.select_answer(1, 0);
        assert_eq!(session.next_event().await, SessionEvent::Tick { remaining_secs: 2 });
        assert_eq!(session.next_event().await, SessionEvent::Tick { remaining_secs: 1 });
        let SessionEvent::Expired(report) = session.next_event().await else {
            panic!("expected expiry");
        };
        assert_eq!(report.correct, 1);
        assert_eq!(report.unattempted, 2);

        assert!(!session.submit());
        assert_eq!(session.next_event().await, SessionEvent::Idle);
        session.flush().await;

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exam, "jee_main");
        assert_eq!(records[0].score, 4.0);
        assert_eq!(sink.starts.load(Ordering::SeqCst), 1);
        assert_eq!(observer.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(observer.completed.load(Ordering::SeqCst), 1);
        assert_eq!(observer.timed_out.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_submit_stops_countdown() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = session(60, Arc::clone(&sink));

        session.start();
        assert_eq!(session.next_event().await, SessionEvent::Tick { remaining_secs: 59 });
        assert!(session.submit());
        assert!(!session.submit());

        assert_eq!(session.next_event().await, SessionEvent::Idle);
        assert_eq!(session.snapshot().remaining_secs, 59);
        assert_eq!(session.report().unwrap().time_spent.as_secs(), 1);

        session.flush().await;
        assert_eq!(sink.records.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_failure_keeps_report() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let observer = Arc::new(CountingObserver::default());
        let mut session = session(60, sink).with_observer(observer.clone());

        session.start();
        session.select_answer(2, 0);
        assert!(session.submit());
        session.flush().await;

        assert_eq!(observer.persist_failures.load(Ordering::SeqCst), 1);
        assert_eq!(session.report().unwrap().correct, 1);
        assert!(session.attempt_report().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_countdown() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = session(60, Arc::clone(&sink));

        session.start();
        session.next_event().await;
        session.restart();
        assert_eq!(session.engine().phase(), Phase::NotStarted);
        assert_eq!(session.next_event().await, SessionEvent::Idle);

        assert!(session.start());
        assert_eq!(session.next_event().await, SessionEvent::Tick { remaining_secs: 59 });
        session.flush().await;
        assert_eq!(sink.starts.load(Ordering::SeqCst), 2);
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_stops_the_countdown() {
        let sink = Arc::new(RecordingSink::default());
        let mut session = session(60, Arc::clone(&sink));

        session.start();
        assert_eq!(session.next_event().await, SessionEvent::Tick { remaining_secs: 59 });
        let task = session.ticker_task().unwrap();
        assert!(!task.is_finished());

        drop(session);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(task.is_finished());
        assert!(sink.records.lock().unwrap().is_empty());
    }
}

//! Mock providers and sinks for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use proctor_core::bank::QuestionBank;
use proctor_core::model::ExamPattern;
use proctor_core::traits::{QuestionProvider, ResultRecord, ResultSink};

/// A mock question provider serving a fixed bank.
pub struct MockQuestionProvider {
    bank: QuestionBank,
    fail: bool,
    call_count: AtomicU32,
}

impl MockQuestionProvider {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            fail: false,
            call_count: AtomicU32::new(0),
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            bank: QuestionBank::new(),
            fail: true,
            call_count: AtomicU32::new(0),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionProvider for MockQuestionProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn question_bank(&self, _pattern: &ExamPattern) -> anyhow::Result<QuestionBank> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            anyhow::bail!("mock provider configured to fail");
        }
        Ok(self.bank.clone())
    }
}

/// A mock result sink that keeps everything in memory.
#[derive(Default)]
pub struct MockResultSink {
    fail: bool,
    starts: Mutex<Vec<String>>,
    records: Mutex<Vec<ResultRecord>>,
}

impl MockResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `record_result` always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Exams whose start was recorded, in order.
    pub fn starts(&self) -> Vec<String> {
        self.starts.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Results recorded so far, in order.
    pub fn records(&self) -> Vec<ResultRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ResultSink for MockResultSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn record_start(&self, exam: &str) -> anyhow::Result<()> {
        if let Ok(mut starts) = self.starts.lock() {
            starts.push(exam.to_string());
        }
        Ok(())
    }

    async fn record_result(&self, record: &ResultRecord) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("mock sink configured to fail");
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
        Ok(())
    }
}

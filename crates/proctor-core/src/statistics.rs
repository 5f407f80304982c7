//! Aggregate statistics over an attempt history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::traits::ResultRecord;

/// Statistics for a single exam across all recorded attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamStats {
    /// Exam name or catalog key.
    pub exam: String,
    /// Number of recorded attempts.
    pub attempts: usize,
    pub best_score: f64,
    pub best_percentage: f64,
    pub average_percentage: f64,
    /// Lowest (best) rank among attempts that carry one.
    pub best_rank: Option<u32>,
    pub latest_date: NaiveDate,
}

/// Summarize a history, one entry per exam, ordered by exam name.
pub fn summarize_history(records: &[ResultRecord]) -> Vec<ExamStats> {
    let mut grouped: BTreeMap<&str, Vec<&ResultRecord>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.exam.as_str()).or_default().push(r);
    }

    grouped
        .into_iter()
        .filter_map(|(exam, group)| {
            let latest_date = group.iter().map(|r| r.date).max()?;
            let n = group.len() as f64;
            Some(ExamStats {
                exam: exam.to_string(),
                attempts: group.len(),
                best_score: group.iter().map(|r| r.score).fold(f64::MIN, f64::max),
                best_percentage: group.iter().map(|r| r.percentage).fold(f64::MIN, f64::max),
                average_percentage: group.iter().map(|r| r.percentage).sum::<f64>() / n,
                best_rank: group.iter().filter_map(|r| r.rank).min(),
                latest_date,
            })
        })
        .collect()
}

/// Overall totals across every exam in a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTotals {
    pub attempts: usize,
    pub exams: usize,
    pub average_percentage: f64,
}

pub fn history_totals(records: &[ResultRecord]) -> HistoryTotals {
    let exams = records
        .iter()
        .map(|r| r.exam.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let average_percentage = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.percentage).sum::<f64>() / records.len() as f64
    };
    HistoryTotals {
        attempts: records.len(),
        exams,
        average_percentage,
    }
}

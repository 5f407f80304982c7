//! Collaborator traits for question sources and result persistence.
//!
//! These async traits are implemented by the `proctor-providers` crate.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bank::{assemble, ExamPaper, QuestionBank};
use crate::model::ExamPattern;

// ---------------------------------------------------------------------------
// Question provider trait
// ---------------------------------------------------------------------------

/// A source of question templates for an exam pattern.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Produce per-subject pools covering the pattern's sections.
    async fn question_bank(&self, pattern: &ExamPattern) -> anyhow::Result<QuestionBank>;
}

/// Fetch a bank from `provider` and assemble a paper from it.
pub async fn load_paper(
    provider: &dyn QuestionProvider,
    pattern: &ExamPattern,
) -> anyhow::Result<ExamPaper> {
    let bank = provider.question_bank(pattern).await?;
    tracing::debug!(
        provider = provider.name(),
        templates = bank.len(),
        "question bank loaded"
    );
    Ok(assemble(pattern, &bank)?)
}

// ---------------------------------------------------------------------------
// Result sink trait
// ---------------------------------------------------------------------------

/// Destination for attempt outcomes.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Human-readable sink name (e.g. "http").
    fn name(&self) -> &str;

    /// Note that an attempt at `exam` has started.
    async fn record_start(&self, exam: &str) -> anyhow::Result<()> {
        let _ = exam;
        Ok(())
    }

    /// Persist the outcome of a completed attempt.
    async fn record_result(&self, record: &ResultRecord) -> anyhow::Result<()>;
}

/// One persisted attempt outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Exam name or catalog key.
    pub exam: String,
    pub score: f64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Extract the outermost JSON object from an LLM reply.
///
/// Handles:
/// - ```json``` or generic fenced blocks
/// - Prose before or after the object
/// - A bare object (returned as-is)
///
/// Returns `None` when no `{ ... }` span is present.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let body = fenced_block(response).unwrap_or(response);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

fn fenced_block(response: &str) -> Option<&str> {
    let open = response.find("```")?;
    let after_fence = &response[open + 3..];
    // Skip the info string ("json", "JSON", ...) up to the end of the line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    // A truncated reply may never close the fence.
    let end = body.find("```").unwrap_or(body.len());
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_fenced_json() {
        let input = "Here you go:\n\n```json\n{\"questions\": []}\n```\n\nGood luck!";
        assert_eq!(extract_json_object(input), Some("{\"questions\": []}"));
    }

    #[test]
    fn extract_generic_fence() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(input), Some("{\"a\": 1}"));
    }

    #[test]
    fn extract_bare_object_with_prose() {
        let input = "Sure! {\"a\": {\"b\": 2}} Hope this helps.";
        assert_eq!(extract_json_object(input), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn extract_truncated_fence() {
        let input = "```json\n{\"questions\": [1, 2]}";
        assert_eq!(extract_json_object(input), Some("{\"questions\": [1, 2]}"));
    }

    #[test]
    fn extract_none_without_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn result_record_defaults() {
        let record: ResultRecord =
            serde_json::from_str(r#"{"exam":"neet","score":120.0,"date":"2026-03-01"}"#).unwrap();
        assert_eq!(record.percentage, 0.0);
        assert_eq!(record.rank, None);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("rank"));
    }
}

//! Result sink that posts attempts to a results backend over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use proctor_core::catalog::ExamKind;
use proctor_core::traits::{ResultRecord, ResultSink};

use crate::error::{check_status, ProviderError};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Posts results to `{base}/api/results/add` and start notifications to
/// `{base}/api/{exam-slug}/test-completed`.
pub struct HttpResultSink {
    base_url: String,
    client: reqwest::Client,
}

impl HttpResultSink {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post(&self, url: String, record: Option<&ResultRecord>) -> Result<(), ProviderError> {
        let mut request = self.client.post(url);
        if let Some(record) = record {
            request = request.json(record);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, DEFAULT_TIMEOUT_SECS))?;
        check_status(response).await?;
        Ok(())
    }
}

/// URL segment for an exam: the catalog slug when the name is a known exam,
/// otherwise the lowercase alphanumerics of the name.
fn exam_slug(exam: &str) -> String {
    match exam.parse::<ExamKind>() {
        Ok(kind) => kind.slug().to_string(),
        Err(_) => exam
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect(),
    }
}

#[async_trait]
impl ResultSink for HttpResultSink {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn record_start(&self, exam: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/{}/test-completed", self.base_url, exam_slug(exam));
        self.post(url, None).await?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(exam = %record.exam))]
    async fn record_result(&self, record: &ResultRecord) -> anyhow::Result<()> {
        let url = format!("{}/api/results/add", self.base_url);
        self.post(url, Some(record)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> ResultRecord {
        ResultRecord {
            exam: "jee_main".into(),
            score: 180.0,
            percentage: 60.0,
            rank: None,
            date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
        }
    }

    #[test]
    fn slugs() {
        assert_eq!(exam_slug("jee_main"), "jeemain");
        assert_eq!(exam_slug("JEE Main"), "jeemain");
        assert_eq!(exam_slug("My Custom Mock 2"), "mycustommock2");
    }

    #[tokio::test]
    async fn posts_result_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/results/add"))
            .and(body_json(serde_json::json!({
                "exam": "jee_main",
                "score": 180.0,
                "percentage": 60.0,
                "date": "2026-04-02"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpResultSink::new(&format!("{}/", server.uri())).unwrap();
        sink.record_result(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn posts_start_notification() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/neet/test-completed"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpResultSink::new(&server.uri()).unwrap();
        sink.record_start("neet").await.unwrap();
    }

    #[tokio::test]
    async fn server_error_maps_to_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/results/add"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
            .mount(&server)
            .await;

        let sink = HttpResultSink::new(&server.uri()).unwrap();
        let err = sink.record_result(&record()).await.unwrap_err();
        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert!(matches!(
            provider_err,
            ProviderError::ApiError { status: 503, .. }
        ));
    }
}

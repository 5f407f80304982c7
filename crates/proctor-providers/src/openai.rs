//! OpenAI-compatible question generator.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use proctor_core::bank::{validate_template, QuestionBank};
use proctor_core::model::{ExamPattern, QuestionTemplate, Subject};
use proctor_core::traits::{extract_json_object, QuestionProvider};

use crate::error::{check_status, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_POOL_SIZE: u32 = 10;
const SYSTEM_PROMPT: &str = "You write multiple-choice questions for competitive entrance exam practice. Every question has exactly four options and exactly one correct answer. Respond ONLY with a JSON object of the form {\"questions\": [{\"question\": string, \"options\": [string, string, string, string], \"correct\": index 0-3, \"topic\": string, \"explanation\": string}]}.";

/// Generates question pools through an OpenAI-compatible chat completions API.
///
/// Each subject is requested concurrently; pools smaller than their section
/// are repeated at assembly time.
pub struct OpenAiQuestionGenerator {
    api_key: String,
    base_url: String,
    model: String,
    pool_size: u32,
    fallback: Option<QuestionBank>,
    client: reqwest::Client,
}

impl OpenAiQuestionGenerator {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            pool_size: DEFAULT_POOL_SIZE,
            fallback: None,
            client,
        })
    }

    /// Upper bound on questions requested per subject.
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Bank to draw a subject's pool from when its generation fails.
    pub fn with_fallback(mut self, bank: QuestionBank) -> Self {
        self.fallback = Some(bank);
        self
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn generate_subject(
        &self,
        exam: &str,
        subject: Subject,
        count: u32,
    ) -> anyhow::Result<Vec<QuestionTemplate>> {
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: 0.7,
            response_format: ResponseFormat {
                kind: "json_object".into(),
            },
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: format!(
                        "Generate {count} questions for the {subject} section of the {exam} exam."
                    ),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, DEFAULT_TIMEOUT_SECS))?;
        let response = check_status(response).await?;

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("failed to parse response: {e}"))
        })?;
        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        let templates = parse_generated(subject, content)?;
        tracing::debug!(%subject, generated = templates.len(), "questions generated");
        Ok(templates)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct GeneratedQuestions {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Deserialize)]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    correct: usize,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Turn a model reply into templates, dropping malformed entries.
fn parse_generated(
    subject: Subject,
    content: &str,
) -> Result<Vec<QuestionTemplate>, ProviderError> {
    let json = extract_json_object(content)
        .ok_or_else(|| ProviderError::MalformedResponse("no JSON object in reply".into()))?;
    let parsed: GeneratedQuestions = serde_json::from_str(json)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid question JSON: {e}")))?;

    let templates: Vec<QuestionTemplate> = parsed
        .questions
        .into_iter()
        .enumerate()
        .filter_map(|(index, q)| {
            let template = QuestionTemplate {
                prompt: q.question.trim().to_string(),
                options: q.options,
                correct_option: q.correct,
                topic: q.topic,
                explanation: q.explanation,
            };
            if template.prompt.is_empty() {
                tracing::debug!(%subject, index, "discarding question with empty prompt");
                return None;
            }
            match validate_template(subject, index, &template) {
                Ok(()) => Some(template),
                Err(e) => {
                    tracing::debug!(%subject, index, error = %e, "discarding malformed question");
                    None
                }
            }
        })
        .collect();

    if templates.is_empty() {
        return Err(ProviderError::MalformedResponse(format!(
            "no usable {subject} questions in reply"
        )));
    }
    Ok(templates)
}

#[async_trait]
impl QuestionProvider for OpenAiQuestionGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn question_bank(&self, pattern: &ExamPattern) -> anyhow::Result<QuestionBank> {
        let requests = pattern.sections.iter().map(|section| {
            let count = section.question_count.min(self.pool_size);
            async move {
                let result = self.generate_subject(&pattern.name, section.subject, count).await;
                (section.subject, result)
            }
        });

        let mut bank = QuestionBank::new();
        for (subject, result) in join_all(requests).await {
            match result {
                Ok(templates) => bank = bank.with_pool(subject, templates),
                Err(e) => {
                    let fallback = self
                        .fallback
                        .as_ref()
                        .map(|b| b.pool(subject))
                        .filter(|pool| !pool.is_empty());
                    let Some(pool) = fallback else {
                        return Err(e)
                            .with_context(|| format!("failed to generate {subject} questions"));
                    };
                    tracing::warn!(%subject, error = %e, "generation failed, using fallback bank");
                    bank = bank.with_pool(subject, pool.to_vec());
                }
            }
        }
        Ok(bank)
    }
}

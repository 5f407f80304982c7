//! Configuration and factories for generators and sinks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use proctor_core::bank::QuestionBank;
use proctor_core::traits::{QuestionProvider, ResultSink};

use crate::file_sink::JsonlResultSink;
use crate::http_sink::HttpResultSink;
use crate::openai::OpenAiQuestionGenerator;

/// Configuration for an AI question generator.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeneratorConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        pool_size: Option<u32>,
    },
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorConfig::OpenAI {
                api_key: _,
                base_url,
                model,
                pool_size,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .field("pool_size", pool_size)
                .finish(),
        }
    }
}

/// Where completed attempts are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Http { base_url: String },
    Jsonl { path: PathBuf },
}

/// Top-level proctor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctorConfig {
    /// AI question generator; exams use their static bank when unset.
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
    /// Result sink; defaults to a JSON-lines file at `history_file`.
    #[serde(default)]
    pub sink: Option<SinkConfig>,
    /// Exam taken when none is named on the command line.
    #[serde(default = "default_exam")]
    pub default_exam: String,
    /// Directory of exam files used as the static question bank.
    #[serde(default = "default_bank_dir")]
    pub bank_dir: PathBuf,
    /// Output directory for attempt reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Local attempt history (JSON lines).
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Countdown resolution in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_exam() -> String {
    "jee_main".to_string()
}
fn default_bank_dir() -> PathBuf {
    PathBuf::from("./banks")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./proctor-results")
}
fn default_history_file() -> PathBuf {
    PathBuf::from("./proctor-results/history.jsonl")
}
fn default_tick_interval() -> u64 {
    1000
}

impl Default for ProctorConfig {
    fn default() -> Self {
        Self {
            generator: None,
            sink: None,
            default_exam: default_exam(),
            bank_dir: default_bank_dir(),
            output_dir: default_output_dir(),
            history_file: default_history_file(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl ProctorConfig {
    /// The JSON-lines file local history is read from.
    pub fn history_path(&self) -> &Path {
        match &self.sink {
            Some(SinkConfig::Jsonl { path }) => path.as_path(),
            _ => self.history_file.as_path(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_generator_config(config: &GeneratorConfig) -> GeneratorConfig {
    match config {
        GeneratorConfig::OpenAI {
            api_key,
            base_url,
            model,
            pool_size,
        } => GeneratorConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.as_ref().map(|m| resolve_env_vars(m)),
            pool_size: *pool_size,
        },
    }
}

fn resolve_sink_config(config: &SinkConfig) -> SinkConfig {
    match config {
        SinkConfig::Http { base_url } => SinkConfig::Http {
            base_url: resolve_env_vars(base_url),
        },
        SinkConfig::Jsonl { path } => SinkConfig::Jsonl { path: path.clone() },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `proctor.toml` in the current directory
/// 2. `~/.config/proctor/config.toml`
///
/// Environment variable overrides: `PROCTOR_OPENAI_KEY`, `PROCTOR_RESULTS_URL`.
pub fn load_config() -> Result<ProctorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ProctorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("proctor.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ProctorConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ProctorConfig::default(),
    };

    apply_env_overrides(&mut config);

    config.generator = config.generator.as_ref().map(resolve_generator_config);
    config.sink = config.sink.as_ref().map(resolve_sink_config);

    Ok(config)
}

fn apply_env_overrides(config: &mut ProctorConfig) {
    if let Ok(key) = std::env::var("PROCTOR_OPENAI_KEY") {
        match &mut config.generator {
            Some(GeneratorConfig::OpenAI { api_key, .. }) => *api_key = key,
            None => {
                config.generator = Some(GeneratorConfig::OpenAI {
                    api_key: key,
                    base_url: None,
                    model: None,
                    pool_size: None,
                })
            }
        }
    }

    if let Ok(url) = std::env::var("PROCTOR_RESULTS_URL") {
        config.sink = Some(SinkConfig::Http { base_url: url });
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("proctor"))
}

/// Create a question generator from its configuration.
pub fn create_generator(
    config: &GeneratorConfig,
    fallback: Option<QuestionBank>,
) -> Result<Box<dyn QuestionProvider>> {
    match config {
        GeneratorConfig::OpenAI {
            api_key,
            base_url,
            model,
            pool_size,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("OpenAI generator configured without an API key");
            }
            let mut generator =
                OpenAiQuestionGenerator::new(api_key, base_url.clone(), model.clone())?;
            if let Some(size) = pool_size {
                generator = generator.with_pool_size(*size);
            }
            if let Some(bank) = fallback {
                generator = generator.with_fallback(bank);
            }
            Ok(Box::new(generator))
        }
    }
}

/// Create the configured result sink.
pub fn create_sink(config: &ProctorConfig) -> Result<Arc<dyn ResultSink>> {
    match &config.sink {
        Some(SinkConfig::Http { base_url }) => Ok(Arc::new(HttpResultSink::new(base_url)?)),
        Some(SinkConfig::Jsonl { path }) => Ok(Arc::new(JsonlResultSink::new(path))),
        None => Ok(Arc::new(JsonlResultSink::new(&config.history_file))),
    }
}

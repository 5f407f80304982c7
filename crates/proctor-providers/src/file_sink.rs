//! Result sink that appends attempts to a JSON-lines history file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use proctor_core::traits::{ResultRecord, ResultSink};

/// Appends one JSON object per line; parent directories are created on
/// first write.
pub struct JsonlResultSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonlResultSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn record_result(&self, record: &ResultRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("failed to serialize result")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open history file {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Read a JSON-lines history file. A missing file is an empty history;
/// unparsable lines are skipped with a warning.
pub fn load_history(path: &Path) -> Result<Vec<ResultRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read history from {}", path.display()))?;

    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ResultRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("skipping {} line {}: {}", path.display(), i + 1, e),
        }
    }
    Ok(records)
}

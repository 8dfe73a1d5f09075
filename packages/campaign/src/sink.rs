//! Per-engine transcript sinks.
//!
//! The transcripts are the campaign's deliverable: one append-only plain-text
//! file per engine, with stable names across runs, so one engine's failure
//! can never suppress another engine's log.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{CampaignError, Result};
use crate::traits::LogSink;
use crate::types::SearchEngine;

/// File-backed sink writing `newsletter_{engine}.log` under one directory.
pub struct FileLogSink {
    dir: PathBuf,
}

impl FileLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stable path of one engine's transcript.
    pub fn log_path(&self, engine: SearchEngine) -> PathBuf {
        self.dir.join(format!("newsletter_{engine}.log"))
    }

    async fn ensure_dir(&self) -> Result<()> {
        if !Path::new(&self.dir).exists() {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(CampaignError::Sink)?;
        }
        Ok(())
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    async fn append(&self, engine: SearchEngine, line: &str) -> Result<()> {
        self.ensure_dir().await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(engine))
            .await
            .map_err(CampaignError::Sink)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(CampaignError::Sink)?;
        file.write_all(b"\n").await.map_err(CampaignError::Sink)?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemoryLogSink {
    lines: Mutex<HashMap<SearchEngine, Vec<String>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, engine: SearchEngine) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .get(&engine)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn append(&self, engine: SearchEngine, line: &str) -> Result<()> {
        self.lines
            .lock()
            .unwrap()
            .entry(engine)
            .or_default()
            .push(line.to_string());
        Ok(())
    }
}

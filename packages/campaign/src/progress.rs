//! Processed-URL tracking.
//!
//! A campaign may run daily against similar first-page results; the progress
//! store lets a re-run skip URLs that were already visited, and keeps a
//! separate record of URLs whose submission was confirmed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{CampaignError, Result};
use crate::traits::ProgressStore;

const PROCESSED_FILE: &str = "processed_urls.txt";
const COMPLETED_FILE: &str = "completed_urls.txt";

/// File-backed store: one URL per line, append-only.
pub struct FileProgressStore {
    state_dir: PathBuf,
}

impl FileProgressStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    fn processed_path(&self) -> PathBuf {
        self.state_dir.join(PROCESSED_FILE)
    }

    fn completed_path(&self) -> PathBuf {
        self.state_dir.join(COMPLETED_FILE)
    }

    async fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        if !self.state_dir.exists() {
            tokio::fs::create_dir_all(&self.state_dir)
                .await
                .map_err(CampaignError::Progress)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(CampaignError::Progress)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(CampaignError::Progress)?;
        file.write_all(b"\n").await.map_err(CampaignError::Progress)?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for FileProgressStore {
    async fn is_processed(&self, url: &Url) -> Result<bool> {
        match tokio::fs::read_to_string(self.processed_path()).await {
            Ok(content) => Ok(content.lines().any(|line| line == url.as_str())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CampaignError::Progress(e)),
        }
    }

    async fn mark_processed(&self, url: &Url) -> Result<()> {
        self.append_line(&self.processed_path(), url.as_str()).await
    }

    async fn mark_completed(&self, url: &Url) -> Result<()> {
        self.append_line(&self.completed_path(), url.as_str()).await
    }
}

/// In-memory store for tests and skip-nothing runs.
#[derive(Default)]
pub struct MemoryProgressStore {
    processed: Mutex<HashSet<String>>,
    completed: Mutex<HashSet<String>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_urls(&self) -> Vec<String> {
        let mut urls: Vec<_> = self.completed.lock().unwrap().iter().cloned().collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn is_processed(&self, url: &Url) -> Result<bool> {
        Ok(self.processed.lock().unwrap().contains(url.as_str()))
    }

    async fn mark_processed(&self, url: &Url) -> Result<()> {
        self.processed.lock().unwrap().insert(url.as_str().to_string());
        Ok(())
    }

    async fn mark_completed(&self, url: &Url) -> Result<()> {
        self.completed.lock().unwrap().insert(url.as_str().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_processed_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProgressStore::new(dir.path());
        let url: Url = "https://example.com/signup".parse().unwrap();

        assert!(!store.is_processed(&url).await.unwrap());
        store.mark_processed(&url).await.unwrap();
        assert!(store.is_processed(&url).await.unwrap());

        // Completed is tracked separately from processed.
        let other: Url = "https://other.example.com".parse().unwrap();
        store.mark_completed(&other).await.unwrap();
        assert!(!store.is_processed(&other).await.unwrap());
    }
}

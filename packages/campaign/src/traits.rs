use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::types::{RegistrationAttempt, RegistrationPayload, SearchEngine};

// ============================================================================
// SEARCH: first-page result enumeration (delegated to the browser agent)
// ============================================================================

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Issue `query` on `engine` and return first-page result URLs in page
    /// order. Never reorders or deduplicates.
    async fn search(&self, engine: SearchEngine, query: &str) -> Result<Vec<Url>>;
}

// ============================================================================
// REGISTRATION: form detection + fill + submit (swappable heuristics)
// ============================================================================

#[async_trait]
pub trait RegistrationAgent: Send + Sync {
    /// Navigate to `url`, look for a plausible newsletter-signup form, fill it
    /// with `payload`, submit, and wait (time-boxed) for a confirmation
    /// signal. Returns the classified attempt; a clean "no form on this page"
    /// is an `Ok` with `no-form-found`, not an error.
    async fn attempt_registration(
        &self,
        url: &Url,
        payload: &RegistrationPayload,
    ) -> Result<RegistrationAttempt>;
}

// ============================================================================
// LOG SINK: per-engine append-only transcripts (the run's deliverable)
// ============================================================================

#[async_trait]
pub trait LogSink: Send + Sync {
    /// Append one line to the transcript of `engine`. Each engine's transcript
    /// is its own sink, never shared across engines.
    async fn append(&self, engine: SearchEngine, line: &str) -> Result<()>;
}

// ============================================================================
// PROGRESS: processed-URL tracking so re-runs skip visited results
// ============================================================================

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn is_processed(&self, url: &Url) -> Result<bool>;

    async fn mark_processed(&self, url: &Url) -> Result<()>;

    /// Record a URL whose submission was confirmed.
    async fn mark_completed(&self, url: &Url) -> Result<()>;
}

//! Typed errors for the campaign library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Failures are contained
//! at the smallest granularity that can absorb them: a result-level error
//! becomes a recorded outcome, an engine-level error aborts only that engine's
//! run, and only environment unavailability is allowed to escape a campaign.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CampaignError>;

#[derive(Debug, Error)]
pub enum CampaignError {
    /// Query execution on a search engine failed. Aborts that engine run only.
    #[error("search on {engine} failed: {source}")]
    Search {
        engine: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A result URL could not be reached. Recorded as `submission-failed`.
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Form interaction errored. Recorded as `submission-failed`.
    #[error("submission on {url} failed: {source}")]
    Submission {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No confirmation signal within the time box. Recorded as
    /// `confirmation-not-detected`.
    #[error("no confirmation within {seconds}s for {url}")]
    ConfirmationTimeout { url: String, seconds: u64 },

    /// Transcript sink could not be written.
    #[error("log sink error: {0}")]
    Sink(#[source] std::io::Error),

    /// Progress store could not be read or written.
    #[error("progress store error: {0}")]
    Progress(#[source] std::io::Error),

    /// Engine name not recognized when parsing configuration.
    #[error("unknown search engine: {0}")]
    UnknownEngine(String),

    /// The agent runner itself failed.
    #[error("agent runner error: {0}")]
    Agent(#[from] agent_client::AgentError),

    /// The campaign was cancelled externally.
    #[error("campaign cancelled")]
    Cancelled,
}

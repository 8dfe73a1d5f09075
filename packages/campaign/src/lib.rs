//! Newsletter Signup Campaign Orchestration
//!
//! A sequencing and aggregation layer over an external browser-automation
//! agent: issue a search per engine, visit every first-page result, have the
//! agent detect and submit newsletter-signup forms, classify each attempt,
//! and write one append-only transcript per engine.
//!
//! # Design
//!
//! - Capability seams, not prompt strings: search, registration, log sinks,
//!   and progress tracking are traits, so the heuristics behind them are
//!   swappable and mockable.
//! - Failure containment: result > engine > campaign. A failed visit is one
//!   recorded outcome, a failed search aborts one engine run, and only
//!   environment failures escape.
//! - Sequential on purpose: visits submit real forms on third-party sites;
//!   concurrency risks duplicate submissions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use campaign::{run_campaign, CampaignConfig, FileLogSink, FileProgressStore, RunnerAgent};
//! use agent_client::AgentClient;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = CampaignConfig::from_env()?;
//! let client = AgentClient::new(config.agent_base_url.clone(), config.agent_token.clone());
//! let agent = RunnerAgent::new(client, config.run_options.clone());
//! let logs = FileLogSink::new(&config.log_dir);
//! let progress = FileProgressStore::new(&config.state_dir);
//!
//! let report = run_campaign(
//!     &config.definitions(),
//!     &config.identity,
//!     &agent,
//!     &logs,
//!     &progress,
//!     CancellationToken::new(),
//! )
//! .await?;
//! println!("{} submissions confirmed", report.submitted_count());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability seams (SearchProvider, RegistrationAgent, LogSink, ProgressStore)
//! - [`types`] - Campaign data model
//! - [`orchestrator`] - The sequential campaign loop
//! - [`agent`] - Production capabilities backed by the browser-agent runner
//! - [`classify`] - Transcript keyword classification
//! - [`testing`] - Mock implementations for testing

pub mod agent;
pub mod classify;
pub mod config;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
pub mod sink;
pub mod summary;
pub mod testing;
pub mod traits;
pub mod types;

// Re-exports for clean API
pub use agent::{RunnerAgent, TaskRunner};
pub use config::{CampaignConfig, RunOptions};
pub use error::{CampaignError, Result};
pub use identity::IdentityConfig;
pub use orchestrator::run_campaign;
pub use progress::{FileProgressStore, MemoryProgressStore};
pub use sink::{FileLogSink, MemoryLogSink};
pub use summary::{render_summary, OutcomeCounts};
pub use traits::{LogSink, ProgressStore, RegistrationAgent, SearchProvider};
pub use types::{
    CampaignDefinition, CampaignReport, EngineRun, EngineRunState, RegistrationAttempt,
    RegistrationPayload, ResultOutcome, SearchEngine, SubmissionStatus,
};

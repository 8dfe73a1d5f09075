use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::CampaignError;

/// Search engine targeted by a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    Google,
    Bing,
    Yahoo,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 3] = [SearchEngine::Google, SearchEngine::Bing, SearchEngine::Yahoo];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::Bing => "bing",
            SearchEngine::Yahoo => "yahoo",
        }
    }

    /// Landing page the browser session starts on when searching this engine.
    pub fn homepage(&self) -> &'static str {
        match self {
            SearchEngine::Google => "https://www.google.com",
            SearchEngine::Bing => "https://www.bing.com",
            SearchEngine::Yahoo => "https://search.yahoo.com",
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchEngine {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SearchEngine::Google),
            "bing" => Ok(SearchEngine::Bing),
            "yahoo" => Ok(SearchEngine::Yahoo),
            other => Err(CampaignError::UnknownEngine(other.to_string())),
        }
    }
}

/// One engine's slice of a campaign: which engine to search and with what.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDefinition {
    pub engine: SearchEngine,
    pub query: String,
}

impl CampaignDefinition {
    pub fn new(engine: SearchEngine, query: impl Into<String>) -> Self {
        Self {
            engine,
            query: query.into(),
        }
    }
}

/// Identity data submitted into every detected form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl RegistrationPayload {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Classification of one registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    Submitted,
    NoFormFound,
    SubmissionFailed,
    ConfirmationNotDetected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::NoFormFound => "no-form-found",
            SubmissionStatus::SubmissionFailed => "submission-failed",
            SubmissionStatus::ConfirmationNotDetected => "confirmation-not-detected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the agent reported back for one registration attempt, before the
/// orchestrator stamps it with the URL and timing.
#[derive(Debug, Clone)]
pub struct RegistrationAttempt {
    pub form_found: bool,
    pub status: SubmissionStatus,
    pub confirmation: Option<String>,
    /// Error text when the attempt failed short of a confirmation.
    pub error: Option<String>,
    /// The agent ran into a captcha during this attempt.
    pub captcha: bool,
}

/// The recorded result of visiting one search result. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultOutcome {
    pub url: Url,
    pub form_found: bool,
    pub status: SubmissionStatus,
    pub confirmation: Option<String>,
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
    /// Wall-clock time the visit took, in seconds.
    pub processing_secs: f64,
}

impl ResultOutcome {
    pub fn from_attempt(url: Url, attempt: RegistrationAttempt, processing_secs: f64) -> Self {
        Self {
            url,
            form_found: attempt.form_found,
            status: attempt.status,
            confirmation: attempt.confirmation,
            error: attempt.error,
            recorded_at: Utc::now(),
            processing_secs,
        }
    }
}

/// Lifecycle of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineRunState {
    Pending,
    Searching,
    Visiting,
    Summarizing,
    Done,
    Aborted,
}

/// One search-engine execution within a campaign. Outcomes are appended in
/// first-page result order and never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRun {
    pub engine: SearchEngine,
    pub query: String,
    pub state: EngineRunState,
    pub outcomes: Vec<ResultOutcome>,
    pub summary: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl EngineRun {
    pub fn new(engine: SearchEngine, query: impl Into<String>) -> Self {
        Self {
            engine,
            query: query.into(),
            state: EngineRunState::Pending,
            outcomes: Vec::new(),
            summary: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: ResultOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self, state: EngineRunState, summary: String) {
        self.state = state;
        self.summary = Some(summary);
        self.finished_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, EngineRunState::Done | EngineRunState::Aborted)
    }
}

/// Everything one campaign produced, one entry per configured engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub runs: Vec<EngineRun>,
}

impl CampaignReport {
    pub fn submitted_count(&self) -> usize {
        self.runs
            .iter()
            .flat_map(|run| run.outcomes.iter())
            .filter(|o| o.status == SubmissionStatus::Submitted)
            .count()
    }

    pub fn visited_count(&self) -> usize {
        self.runs.iter().map(|run| run.outcomes.len()).sum()
    }
}

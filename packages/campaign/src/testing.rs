//! Testing utilities including mock capability implementations.
//!
//! Useful for exercising the orchestrator without a browser-agent runner:
//! script search results and registration attempts per URL, then assert on
//! the calls the orchestrator made.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use url::Url;

use crate::error::{CampaignError, Result};
use crate::traits::{RegistrationAgent, SearchProvider};
use crate::types::{RegistrationAttempt, RegistrationPayload, SearchEngine, SubmissionStatus};

/// Record of a call made to the mock agent.
#[derive(Debug, Clone)]
pub enum MockAgentCall {
    Search { engine: SearchEngine, query: String },
    Attempt { url: String, email: String },
}

/// A mock browser agent with scripted, per-engine and per-URL responses.
#[derive(Default)]
pub struct MockAgent {
    /// Scripted search responses, popped one per call.
    searches: Mutex<HashMap<SearchEngine, VecDeque<Result<Vec<Url>>>>>,

    /// Scripted registration responses by URL, popped one per call.
    attempts: Mutex<HashMap<String, VecDeque<Result<RegistrationAttempt>>>>,

    /// Call tracking for assertions.
    calls: Arc<RwLock<Vec<MockAgentCall>>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script first-page results for one engine.
    pub fn with_search(self, engine: SearchEngine, urls: &[&str]) -> Self {
        let parsed = urls.iter().map(|u| Url::parse(u).unwrap()).collect();
        self.searches
            .lock()
            .unwrap()
            .entry(engine)
            .or_default()
            .push_back(Ok(parsed));
        self
    }

    /// Script a search failure for one engine.
    pub fn with_search_failure(self, engine: SearchEngine, message: &str) -> Self {
        self.searches
            .lock()
            .unwrap()
            .entry(engine)
            .or_default()
            .push_back(Err(CampaignError::Search {
                engine: engine.to_string(),
                source: message.to_string().into(),
            }));
        self
    }

    /// Script the attempt returned for one URL.
    pub fn with_attempt(self, url: &str, attempt: RegistrationAttempt) -> Self {
        self.attempts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(Ok(attempt));
        self
    }

    /// Script an attempt that errors for one URL.
    pub fn with_attempt_failure(self, url: &str, message: &str) -> Self {
        self.with_attempt_error(
            url,
            CampaignError::Submission {
                url: url.to_string(),
                source: message.to_string().into(),
            },
        )
    }

    /// Script an attempt that errors for one URL with a specific error.
    pub fn with_attempt_error(self, url: &str, error: CampaignError) -> Self {
        self.attempts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<MockAgentCall> {
        self.calls.read().unwrap().clone()
    }

    /// Emails the mock saw, in attempt order.
    pub fn attempted_emails(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockAgentCall::Attempt { email, .. } => Some(email),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for MockAgent {
    async fn search(&self, engine: SearchEngine, query: &str) -> Result<Vec<Url>> {
        self.calls.write().unwrap().push(MockAgentCall::Search {
            engine,
            query: query.to_string(),
        });
        self.searches
            .lock()
            .unwrap()
            .get_mut(&engine)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl RegistrationAgent for MockAgent {
    async fn attempt_registration(
        &self,
        url: &Url,
        payload: &RegistrationPayload,
    ) -> Result<RegistrationAttempt> {
        self.calls.write().unwrap().push(MockAgentCall::Attempt {
            url: url.to_string(),
            email: payload.email.clone(),
        });
        self.attempts
            .lock()
            .unwrap()
            .get_mut(url.as_str())
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(no_form()))
    }
}

/// A confirmed submission carrying `message` as the confirmation signal.
pub fn submitted(message: &str) -> RegistrationAttempt {
    RegistrationAttempt {
        form_found: true,
        status: SubmissionStatus::Submitted,
        confirmation: Some(message.to_string()),
        error: None,
        captcha: false,
    }
}

/// A page with no signup form.
pub fn no_form() -> RegistrationAttempt {
    RegistrationAttempt {
        form_found: false,
        status: SubmissionStatus::NoFormFound,
        confirmation: None,
        error: None,
        captcha: false,
    }
}

/// A submitted form whose confirmation never showed up.
pub fn confirmation_not_detected() -> RegistrationAttempt {
    RegistrationAttempt {
        form_found: true,
        status: SubmissionStatus::ConfirmationNotDetected,
        confirmation: None,
        error: None,
        captcha: false,
    }
}

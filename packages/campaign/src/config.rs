use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::identity::IdentityConfig;
use crate::types::{CampaignDefinition, SearchEngine};

/// Execution limits for one agent task run, plus the policies the distilled
/// behavior left undocumented (confirmation timeout, navigation retries,
/// captcha tolerance). All values are overridable.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Upper bound on agent steps per task.
    pub max_steps: u32,
    /// Wall-clock budget per registration attempt; also the confirmation
    /// time box. On elapse the outcome is `confirmation-not-detected`.
    pub task_timeout: Duration,
    /// Budget for a single browser action.
    pub action_timeout: Duration,
    /// After this many captcha-blocked attempts, the agent is told to skip
    /// captcha-protected pages instead of fighting them.
    pub captcha_failure_limit: u32,
    /// Extra attempts on transport-level navigation errors. Zero by default:
    /// a retried visit risks a duplicate submission.
    pub navigation_retries: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_steps: 50,
            task_timeout: Duration::from_secs(900),
            action_timeout: Duration::from_secs(20),
            captcha_failure_limit: 5,
            navigation_retries: 0,
        }
    }
}

impl RunOptions {
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn with_captcha_failure_limit(mut self, limit: u32) -> Self {
        self.captcha_failure_limit = limit;
        self
    }

    pub fn with_navigation_retries(mut self, retries: u32) -> Self {
        self.navigation_retries = retries;
        self
    }
}

/// Campaign configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub identity: IdentityConfig,
    pub query: String,
    pub engines: Vec<SearchEngine>,
    pub agent_base_url: String,
    pub agent_token: String,
    /// Directory holding the per-engine transcript files.
    pub log_dir: PathBuf,
    /// Directory holding processed/completed URL state.
    pub state_dir: PathBuf,
    pub run_options: RunOptions,
}

impl CampaignConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let engines = match env::var("CAMPAIGN_ENGINES") {
            Ok(raw) => parse_engines(&raw)?,
            Err(_) => SearchEngine::ALL.to_vec(),
        };

        let mut run_options = RunOptions::default();
        if let Ok(raw) = env::var("CAMPAIGN_TASK_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .context("CAMPAIGN_TASK_TIMEOUT_SECS must be a number of seconds")?;
            run_options.task_timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            identity: IdentityConfig::new(
                env::var("SIGNUP_FIRST_NAME").context("SIGNUP_FIRST_NAME must be set")?,
                env::var("SIGNUP_LAST_NAME").context("SIGNUP_LAST_NAME must be set")?,
                env::var("SIGNUP_EMAIL_TEMPLATE").context("SIGNUP_EMAIL_TEMPLATE must be set")?,
            ),
            query: env::var("CAMPAIGN_QUERY").context("CAMPAIGN_QUERY must be set")?,
            engines,
            agent_base_url: env::var("AGENT_BASE_URL").context("AGENT_BASE_URL must be set")?,
            agent_token: env::var("AGENT_API_TOKEN").context("AGENT_API_TOKEN must be set")?,
            log_dir: env::var("CAMPAIGN_LOG_DIR")
                .unwrap_or_else(|_| "logs".to_string())
                .into(),
            state_dir: env::var("CAMPAIGN_STATE_DIR")
                .unwrap_or_else(|_| "state".to_string())
                .into(),
            run_options,
        })
    }

    /// The ordered (engine, query) pairs this campaign will execute.
    pub fn definitions(&self) -> Vec<CampaignDefinition> {
        self.engines
            .iter()
            .map(|engine| CampaignDefinition::new(*engine, self.query.clone()))
            .collect()
    }
}

fn parse_engines(raw: &str) -> Result<Vec<SearchEngine>> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.parse::<SearchEngine>()
                .with_context(|| format!("CAMPAIGN_ENGINES entry {part:?} is not a known engine"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_list_parses_in_order() {
        let engines = parse_engines("yahoo, google").unwrap();
        assert_eq!(engines, vec![SearchEngine::Yahoo, SearchEngine::Google]);
    }

    #[test]
    fn unknown_engine_is_rejected() {
        assert!(parse_engines("google,altavista").is_err());
    }

    #[test]
    fn run_options_builders_override_defaults() {
        let options = RunOptions::default()
            .with_task_timeout(Duration::from_secs(30))
            .with_navigation_retries(2);
        assert_eq!(options.task_timeout, Duration::from_secs(30));
        assert_eq!(options.navigation_retries, 2);
        assert_eq!(options.max_steps, 50);
    }
}

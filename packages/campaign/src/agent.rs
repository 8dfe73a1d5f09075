//! Production capability implementation backed by the browser-agent runner.
//!
//! `RunnerAgent` turns the capability contracts (`SearchProvider`,
//! `RegistrationAgent`) into runner task runs: build the instruction, submit,
//! poll to completion, classify the transcript. Every run is time-boxed; a
//! registration attempt whose confirmation wait outlives the box is
//! classified `confirmation-not-detected`, never left pending.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::time::timeout;
use url::Url;

use agent_client::{AgentClient, AgentError, TaskRequest, Transcript};

use crate::classify;
use crate::config::RunOptions;
use crate::error::{CampaignError, Result};
use crate::prompt;
use crate::traits::{RegistrationAgent, SearchProvider};
use crate::types::{RegistrationAttempt, RegistrationPayload, SearchEngine, SubmissionStatus};

/// Seam over the runner service (to allow mocking).
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run_task(&self, request: TaskRequest) -> agent_client::Result<Transcript>;
}

#[async_trait]
impl TaskRunner for AgentClient {
    async fn run_task(&self, request: TaskRequest) -> agent_client::Result<Transcript> {
        AgentClient::run_task(self, request).await
    }
}

pub struct RunnerAgent<R: TaskRunner> {
    runner: R,
    options: RunOptions,
    /// Captcha-blocked attempts seen so far in this session; past the
    /// configured limit the instruction tells the agent to skip captchas.
    captcha_failures: AtomicU32,
}

impl<R: TaskRunner> RunnerAgent<R> {
    pub fn new(runner: R, options: RunOptions) -> Self {
        Self {
            runner,
            options,
            captcha_failures: AtomicU32::new(0),
        }
    }

    pub fn captcha_failures(&self) -> u32 {
        self.captcha_failures.load(Ordering::Relaxed)
    }

    fn request(&self, task: String, homepage: Option<&str>) -> TaskRequest {
        let mut request = TaskRequest::new(task).with_limits(
            self.options.max_steps,
            self.options.task_timeout.as_secs(),
            self.options.action_timeout.as_secs(),
        );
        if let Some(homepage) = homepage {
            request = request.with_homepage(homepage);
        }
        request
    }
}

/// Transport-level failures worth one more try when navigation retries are
/// configured. Anything the target site answered deliberately is not.
fn is_transient(error: &AgentError) -> bool {
    match error {
        AgentError::Http(_) => true,
        AgentError::Api { status, .. } => *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl<R: TaskRunner> SearchProvider for RunnerAgent<R> {
    async fn search(&self, engine: SearchEngine, query: &str) -> Result<Vec<Url>> {
        let instruction = prompt::search_instruction(engine, query);
        let request = self.request(instruction, Some(engine.homepage()));

        let transcript = match timeout(self.options.task_timeout, self.runner.run_task(request)).await
        {
            Err(_) => {
                return Err(CampaignError::Search {
                    engine: engine.to_string(),
                    source: "search task timed out".into(),
                })
            }
            Ok(Err(e)) => {
                return Err(CampaignError::Search {
                    engine: engine.to_string(),
                    source: Box::new(e),
                })
            }
            Ok(Ok(transcript)) => transcript,
        };

        let urls = classify::extract_result_urls(&transcript.text);
        tracing::info!(engine = %engine, results = urls.len(), "Search completed");
        Ok(urls)
    }
}

#[async_trait]
impl<R: TaskRunner> RegistrationAgent for RunnerAgent<R> {
    async fn attempt_registration(
        &self,
        url: &Url,
        payload: &RegistrationPayload,
    ) -> Result<RegistrationAttempt> {
        let mut attempts_left = self.options.navigation_retries + 1;

        loop {
            attempts_left -= 1;

            let failures = self.captcha_failures();
            let instruction = prompt::registration_instruction(
                url,
                payload,
                failures,
                self.options.captcha_failure_limit,
            );
            let request = self.request(instruction, None);

            let transcript: Transcript =
                match timeout(self.options.task_timeout, self.runner.run_task(request)).await {
                    Err(_) => {
                        tracing::warn!(url = %url, "No confirmation within the time box");
                        return Ok(RegistrationAttempt {
                            form_found: false,
                            status: SubmissionStatus::ConfirmationNotDetected,
                            confirmation: None,
                            error: Some(format!(
                                "no confirmation within {}s",
                                self.options.task_timeout.as_secs()
                            )),
                            captcha: false,
                        });
                    }
                    Ok(Err(e)) if is_transient(&e) && attempts_left > 0 => {
                        tracing::warn!(url = %url, error = %e, "Transient navigation error, retrying");
                        continue;
                    }
                    Ok(Err(e @ AgentError::Http(_))) | Ok(Err(e @ AgentError::Api { .. })) => {
                        return Err(CampaignError::Navigation {
                            url: url.to_string(),
                            source: Box::new(e),
                        });
                    }
                    Ok(Err(e)) => {
                        return Err(CampaignError::Submission {
                            url: url.to_string(),
                            source: Box::new(e),
                        });
                    }
                    Ok(Ok(transcript)) => transcript,
                };

            let attempt = classify::classify_transcript(&transcript.text, transcript.complete);
            if attempt.captcha && attempt.status != SubmissionStatus::Submitted {
                self.captcha_failures.fetch_add(1, Ordering::Relaxed);
            }
            tracing::debug!(
                url = %url,
                status = attempt.status.as_str(),
                form_found = attempt.form_found,
                "Registration attempt classified"
            );
            return Ok(attempt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted runner: pops one response per task, records instructions.
    struct MockRunner {
        responses: Mutex<VecDeque<agent_client::Result<Transcript>>>,
        instructions: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl MockRunner {
        fn new(responses: Vec<agent_client::Result<Transcript>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                instructions: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    fn transcript(text: &str) -> Transcript {
        Transcript {
            run_id: "run_1".to_string(),
            complete: true,
            text: text.to_string(),
        }
    }

    #[async_trait]
    impl TaskRunner for MockRunner {
        async fn run_task(&self, request: TaskRequest) -> agent_client::Result<Transcript> {
            self.instructions.lock().unwrap().push(request.task);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock runner ran out of responses")
        }
    }

    fn payload() -> RegistrationPayload {
        RegistrationPayload {
            first_name: "Max".to_string(),
            last_name: "Mustermann".to_string(),
            email: "news@example.news".to_string(),
        }
    }

    #[tokio::test]
    async fn confirmation_wait_timeout_is_classified_not_pending() {
        let runner = MockRunner::new(vec![Ok(transcript("unused"))])
            .slow(Duration::from_millis(200));
        let agent = RunnerAgent::new(
            runner,
            RunOptions::default().with_task_timeout(Duration::from_millis(10)),
        );

        let url: Url = "https://slow.example.com".parse().unwrap();
        let attempt = agent.attempt_registration(&url, &payload()).await.unwrap();
        assert_eq!(attempt.status, SubmissionStatus::ConfirmationNotDetected);
        assert!(attempt.error.unwrap().contains("no confirmation"));
    }

    #[tokio::test]
    async fn transient_errors_retry_up_to_the_configured_budget() {
        let runner = MockRunner::new(vec![
            Err(AgentError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            Ok(transcript("Thank you for subscribing")),
        ]);
        let agent = RunnerAgent::new(runner, RunOptions::default().with_navigation_retries(1));

        let url: Url = "https://flaky.example.com".parse().unwrap();
        let attempt = agent.attempt_registration(&url, &payload()).await.unwrap();
        assert_eq!(attempt.status, SubmissionStatus::Submitted);
    }

    #[tokio::test]
    async fn exhausted_transient_errors_surface_as_navigation_failures() {
        let runner = MockRunner::new(vec![Err(AgentError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })]);
        let agent = RunnerAgent::new(runner, RunOptions::default());

        let url: Url = "https://down.example.com".parse().unwrap();
        let err = agent.attempt_registration(&url, &payload()).await.unwrap_err();
        assert!(matches!(err, CampaignError::Navigation { .. }));
    }

    #[tokio::test]
    async fn captcha_failures_flip_the_instruction_past_the_limit() {
        let blocked = "A captcha blocked the subscribe form";
        let runner = MockRunner::new(vec![
            Ok(transcript(blocked)),
            Ok(transcript(blocked)),
            Ok(transcript(blocked)),
        ]);
        let agent = RunnerAgent::new(
            runner,
            RunOptions::default().with_captcha_failure_limit(2),
        );

        let url: Url = "https://captcha.example.com".parse().unwrap();
        for _ in 0..3 {
            agent.attempt_registration(&url, &payload()).await.unwrap();
        }
        assert_eq!(agent.captcha_failures(), 3);

        let instructions = agent.runner.instructions.lock().unwrap();
        assert!(instructions[0].contains("attempt it once"));
        assert!(instructions[2].contains("do NOT attempt to solve it"));
    }

    #[tokio::test]
    async fn search_failures_carry_the_engine() {
        let runner = MockRunner::new(vec![Err(AgentError::RunFailed("FAILED".to_string()))]);
        let agent = RunnerAgent::new(runner, RunOptions::default());

        let err = agent
            .search(SearchEngine::Bing, "newsletter")
            .await
            .unwrap_err();
        match err {
            CampaignError::Search { engine, .. } => assert_eq!(engine, "bing"),
            other => panic!("expected search error, got {other:?}"),
        }
    }
}

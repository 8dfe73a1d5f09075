//! Pure REST client for the browser-agent runner service.
//!
//! A minimal client for the runner's task API. Supports submitting task runs,
//! polling for completion, and fetching the resulting transcript.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_client::{AgentClient, TaskRequest};
//!
//! let client = AgentClient::new("https://runner.internal".into(), "api-token".into());
//!
//! let transcript = client
//!     .run_task(TaskRequest::new("Visit https://example.com and describe the page"))
//!     .await?;
//! println!("{}", transcript.text);
//! ```

pub mod error;
pub mod types;

pub use error::{AgentError, Result};
pub use types::{RunData, RunStatus, TaskRequest, Transcript};

use types::ApiResponse;

pub struct AgentClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl AgentClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Submit a task run. Returns immediately with run metadata.
    pub async fn submit_task(&self, request: &TaskRequest) -> Result<RunData> {
        let url = format!("{}/v1/tasks", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run reaches a terminal state. Uses `waitForFinish=60`
    /// for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!(
                "{}/v1/task-runs/{}?waitForFinish=60",
                self.base_url, run_id
            );
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(AgentError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status {
                RunStatus::Succeeded => return Ok(api_resp.data),
                RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut => {
                    return Err(AgentError::RunFailed(
                        api_resp.data.status.as_str().to_string(),
                    ));
                }
                _ => {
                    tracing::debug!(run_id, status = api_resp.data.status.as_str(), "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch the transcript of a completed run.
    pub async fn fetch_transcript(&self, run_id: &str) -> Result<Transcript> {
        let url = format!("{}/v1/task-runs/{}/transcript", self.base_url, run_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(AgentError::MissingTranscript(run_id.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<Transcript> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Run a task end-to-end: submit, poll, fetch transcript.
    pub async fn run_task(&self, request: TaskRequest) -> Result<Transcript> {
        tracing::info!(max_steps = request.max_steps, "Submitting agent task");

        let run = self.submit_task(&request).await?;
        tracing::info!(run_id = %run.id, "Task run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            steps_taken = completed.steps_taken,
            "Run completed, fetching transcript"
        );

        let transcript = self.fetch_transcript(&completed.id).await?;
        tracing::debug!(
            run_id = %transcript.run_id,
            complete = transcript.complete,
            chars = transcript.text.len(),
            "Fetched transcript"
        );

        Ok(transcript)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope used by every runner API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// A task submitted to the runner: one natural-language instruction plus
/// the execution limits for the browser session that will carry it out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// Full multi-step instruction for the agent.
    pub task: String,

    /// Page the browser session starts on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Upper bound on agent steps before the run is cut off.
    pub max_steps: u32,

    /// Wall-clock budget for the whole task, in seconds.
    pub task_timeout: u64,

    /// Budget for a single browser action, in seconds.
    pub action_timeout: u64,
}

impl TaskRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            homepage: None,
            max_steps: 50,
            task_timeout: 900,
            action_timeout: 20,
        }
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    pub fn with_limits(mut self, max_steps: u32, task_timeout: u64, action_timeout: u64) -> Self {
        self.max_steps = max_steps;
        self.task_timeout = task_timeout;
        self.action_timeout = action_timeout;
        self
    }
}

/// Lifecycle state of a task run on the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Aborted,
    TimedOut,
}

impl RunStatus {
    /// Whether the run can no longer make progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "QUEUED",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::Aborted => "ABORTED",
            RunStatus::TimedOut => "TIMED_OUT",
        }
    }
}

/// Metadata for one task run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunData {
    pub id: String,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Steps the agent has taken so far.
    #[serde(default)]
    pub steps_taken: u32,
}

/// The text the agent produced while working through a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub run_id: String,
    /// False when the run was cut off before the agent reported a final status.
    pub complete: bool,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_terminal_states() {
        assert!(RunStatus::Succeeded.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::TimedOut.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
    }

    #[test]
    fn run_data_deserializes_runner_payload() {
        let json = r#"{
            "id": "run_abc123",
            "status": "SUCCEEDED",
            "startedAt": "2025-03-01T06:00:00Z",
            "finishedAt": "2025-03-01T06:04:12Z",
            "stepsTaken": 17
        }"#;

        let run: RunData = serde_json::from_str(json).unwrap();
        assert_eq!(run.id, "run_abc123");
        assert_eq!(run.status, RunStatus::Succeeded);
        assert_eq!(run.steps_taken, 17);
    }

    #[test]
    fn task_request_serializes_camel_case() {
        let req = TaskRequest::new("visit https://example.com")
            .with_homepage("https://www.google.com")
            .with_limits(30, 600, 15);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["maxSteps"], 30);
        assert_eq!(json["taskTimeout"], 600);
        assert_eq!(json["homepage"], "https://www.google.com");
    }
}

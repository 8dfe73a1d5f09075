use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors returned by the browser-agent runner API.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport-level failure (connection, TLS, body decoding).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The runner answered with a non-success status code.
    #[error("agent API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The task run reached a terminal state other than success.
    #[error("task run finished as {0}")]
    RunFailed(String),

    /// The run succeeded but the runner returned no transcript for it.
    #[error("no transcript available for run {0}")]
    MissingTranscript(String),
}

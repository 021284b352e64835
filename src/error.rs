use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsError {
    #[error("Authentication failed. Check credentials.")]
    AuthFailed,

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Jenkins request timed out.")]
    Timeout,

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing Jenkins authentication: provide either JENKINS_BEARER_TOKEN or both (JENKINS_USER + JENKINS_API_TOKEN)")]
    MissingCredentials,

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unexpected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable, machine-readable classification of a [`JenkinsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    AuthFailed,
    JobNotFound,
    ArtifactNotFound,
    Timeout,
    Config,
    ToolNotFound,
    InvalidInput,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthFailed => "AUTH_FAILED",
            Self::JobNotFound => "JOB_NOT_FOUND",
            Self::ArtifactNotFound => "ARTIFACT_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::Config => "CONFIG",
            Self::ToolNotFound => "TOOL_NOT_FOUND",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Unexpected => "UNEXPECTED",
        }
    }
}

impl JenkinsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthFailed => ErrorKind::AuthFailed,
            Self::JobNotFound(_) => ErrorKind::JobNotFound,
            Self::ArtifactNotFound(_) => ErrorKind::ArtifactNotFound,
            Self::Timeout => ErrorKind::Timeout,
            Self::Config(_) | Self::MissingCredentials => ErrorKind::Config,
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Http { .. } | Self::Unexpected(_) | Self::Network(_) | Self::Json(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// HTTP-like status a host can attach to its failure report.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AuthFailed => 401,
            Self::JobNotFound(_) | Self::ArtifactNotFound(_) | Self::ToolNotFound(_) => 404,
            Self::Timeout => 504,
            Self::InvalidInput(_) => 400,
            Self::Http { status, .. } => *status,
            _ => 500,
        }
    }

    /// Replaces an HTTP 404 with a domain error. Anything else is returned unchanged.
    pub fn map_not_found<F>(self, domain: F) -> Self
    where
        F: FnOnce() -> JenkinsError,
    {
        if self.http_status() == Some(404) {
            domain()
        } else {
            self
        }
    }

    /// Status of the remote response that caused this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Failure report shape handed back to the tool caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorKind,
}

impl From<&JenkinsError> for ErrorResponse {
    fn from(err: &JenkinsError) -> Self {
        Self {
            error: err.to_string(),
            code: err.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JenkinsError>;

use std::fmt;

use crate::Plan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub source_url: String,
    pub plan: Plan,
}

impl SubmissionRequest {
    pub fn new(source_url: impl Into<String>, plan: Plan) -> Self {
        Self {
            source_url: source_url.into(),
            plan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisMeta {
    pub timestamp: String,
    pub language: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub download_link: String,
    pub filename: Option<String>,
    pub message: Option<String>,
    pub meta: Option<AnalysisMeta>,
}

impl SubmissionResult {
    pub fn new(download_link: impl Into<String>) -> Self {
        Self {
            download_link: download_link.into(),
            filename: None,
            message: None,
            meta: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Source URL rejected before any IO.
    Validation { input: String },
    /// No response reached us.
    Transport { message: String },
    /// Non-2xx status, with the server-supplied detail when present.
    Server { status: u16, message: Option<String> },
    /// 2xx but the body lacks `download.link` or is not JSON.
    MalformedResponse { message: String },
    /// A submission is already in flight.
    AlreadySubmitting,
}

impl SubmitError {
    pub fn title(&self) -> &'static str {
        match self {
            SubmitError::Validation { .. } => "Invalid YouTube URL",
            SubmitError::AlreadySubmitting => "Analysis In Progress",
            _ => "Analysis Failed",
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Validation { .. } => write!(f, "Please enter a valid YouTube video URL"),
            SubmitError::Transport { message } => write!(f, "network error: {message}"),
            SubmitError::Server {
                status,
                message: Some(message),
            } => write!(f, "server error {status}: {message}"),
            SubmitError::Server {
                status,
                message: None,
            } => write!(f, "server error {status}"),
            SubmitError::MalformedResponse { message } => {
                write!(f, "malformed response: {message}")
            }
            SubmitError::AlreadySubmitting => {
                write!(f, "a submission is already in progress")
            }
        }
    }
}

impl std::error::Error for SubmitError {}

use crate::{SubmissionId, SubmissionRequest, SubmissionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartSubmission {
        submission_id: SubmissionId,
        request: SubmissionRequest,
    },
    RecordHistory {
        request: SubmissionRequest,
        result: SubmissionResult,
    },
    OpenDownload {
        link: String,
        filename: Option<String>,
    },
    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// User-visible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

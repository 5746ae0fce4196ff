use std::path::PathBuf;

use moodscan_core::{SubmissionId, SubmissionResult, SubmitError};

use crate::DownloadError;

#[derive(Debug)]
pub enum EngineEvent {
    /// Cosmetic progress increment for an in-flight submission.
    Progress {
        submission_id: SubmissionId,
        increment: u8,
    },
    Settled {
        submission_id: SubmissionId,
        outcome: Result<SubmissionResult, SubmitError>,
    },
    DownloadCompleted {
        link: String,
        outcome: Result<PathBuf, DownloadError>,
    },
}

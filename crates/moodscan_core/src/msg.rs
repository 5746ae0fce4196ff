use crate::{Plan, SubmissionId, SubmissionResult, SubmitError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the source URL input.
    SourceUrlChanged(String),
    /// User picked a plan.
    PlanSelected(Plan),
    /// User submitted the form.
    SubmitClicked,
    /// Cosmetic progress timer fired for a submission.
    ProgressTick {
        submission_id: SubmissionId,
        increment: u8,
    },
    /// The remote call for a submission resolved.
    SubmissionSettled {
        submission_id: SubmissionId,
        outcome: Result<SubmissionResult, SubmitError>,
    },
    /// User asked for the result artifact.
    DownloadClicked,
    /// Artifact download finished; `Ok` carries where it was saved.
    DownloadFinished { outcome: Result<String, String> },
    /// User clicked "New analysis" on the result or error view.
    NewAnalysisClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}

use crate::{Phase, Plan, SubmissionResult, SubmitError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub source_url: String,
    pub plan: Plan,
    pub model_name: &'static str,
    /// Cosmetic percentage; does not reflect server-side work.
    pub progress: u8,
    pub result: Option<SubmissionResult>,
    pub error: Option<SubmitError>,
    pub can_submit: bool,
    pub dirty: bool,
}

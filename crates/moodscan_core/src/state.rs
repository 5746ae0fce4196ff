use crate::view_model::AppViewModel;
use crate::{Plan, SubmissionRequest, SubmissionResult, SubmitError};

pub type SubmissionId = u64;

/// Upper bound for the simulated progress while a request is in flight.
pub const PROGRESS_CEILING: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    id: SubmissionId,
    request: SubmissionRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    source_url: String,
    plan: Plan,
    phase: Phase,
    progress: u8,
    in_flight: Option<InFlight>,
    result: Option<SubmissionResult>,
    error: Option<SubmitError>,
    next_submission_id: SubmissionId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            source_url: self.source_url.clone(),
            plan: self.plan,
            model_name: self.plan.model_name(),
            progress: self.progress,
            result: self.result.clone(),
            error: self.error.clone(),
            can_submit: self.phase == Phase::Idle,
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn in_flight_id(&self) -> Option<SubmissionId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Returns true once if anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn source_url(&self) -> &str {
        &self.source_url
    }

    pub(crate) fn set_source_url(&mut self, url: String) {
        if self.source_url != url {
            self.source_url = url;
            self.dirty = true;
        }
    }

    pub(crate) fn set_plan(&mut self, plan: Plan) {
        if self.plan != plan {
            self.plan = plan;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_submission(&mut self) -> (SubmissionId, SubmissionRequest) {
        self.next_submission_id += 1;
        let id = self.next_submission_id;
        let request = SubmissionRequest::new(self.source_url.trim(), self.plan);
        self.phase = Phase::Submitting;
        self.progress = 0;
        self.result = None;
        self.error = None;
        self.in_flight = Some(InFlight {
            id,
            request: request.clone(),
        });
        self.dirty = true;
        (id, request)
    }

    pub(crate) fn advance_progress(&mut self, submission_id: SubmissionId, increment: u8) {
        if self.in_flight_id() != Some(submission_id) {
            return;
        }
        let next = self.progress.saturating_add(increment).min(PROGRESS_CEILING);
        if next != self.progress {
            self.progress = next;
            self.dirty = true;
        }
    }

    /// Takes the in-flight request when `submission_id` matches it.
    pub(crate) fn take_in_flight(&mut self, submission_id: SubmissionId) -> Option<SubmissionRequest> {
        if self.in_flight_id() != Some(submission_id) {
            return None;
        }
        self.in_flight.take().map(|f| f.request)
    }

    pub(crate) fn succeed(&mut self, result: SubmissionResult) {
        self.phase = Phase::Succeeded;
        self.progress = 100;
        self.result = Some(result);
        self.error = None;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, error: SubmitError) {
        self.phase = Phase::Failed;
        self.progress = 0;
        self.result = None;
        self.error = Some(error);
        self.dirty = true;
    }

    pub(crate) fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.progress = 0;
        self.result = None;
        self.error = None;
        self.dirty = true;
    }
}

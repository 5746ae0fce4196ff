use crate::{
    is_valid_source_url, AppState, Effect, Msg, Notification, Phase, SubmitError,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SourceUrlChanged(url) => {
            // Input is locked while a request is in flight.
            if state.phase() != Phase::Submitting {
                state.set_source_url(url);
            }
            Vec::new()
        }
        Msg::PlanSelected(plan) => {
            if state.phase() != Phase::Submitting {
                state.set_plan(plan);
            }
            Vec::new()
        }
        Msg::SubmitClicked => match state.phase() {
            Phase::Submitting => vec![notify_error(&SubmitError::AlreadySubmitting)],
            Phase::Succeeded | Phase::Failed => Vec::new(),
            Phase::Idle => {
                let candidate = state.source_url();
                if !is_valid_source_url(candidate) {
                    let err = SubmitError::Validation {
                        input: candidate.to_string(),
                    };
                    return (state, vec![notify_error(&err)]);
                }
                let (submission_id, request) = state.begin_submission();
                vec![Effect::StartSubmission {
                    submission_id,
                    request,
                }]
            }
        },
        Msg::ProgressTick {
            submission_id,
            increment,
        } => {
            state.advance_progress(submission_id, increment);
            Vec::new()
        }
        Msg::SubmissionSettled {
            submission_id,
            outcome,
        } => match state.take_in_flight(submission_id) {
            None => Vec::new(),
            Some(request) => match outcome {
                Ok(result) => {
                    state.succeed(result.clone());
                    vec![
                        Effect::RecordHistory { request, result },
                        Effect::Notify(Notification::info(
                            "Analysis Complete",
                            "Your emotion analysis is ready to download",
                        )),
                    ]
                }
                Err(err) => {
                    let effect = notify_error(&err);
                    state.fail(err);
                    vec![effect]
                }
            },
        },
        Msg::DownloadClicked => match state.result() {
            Some(result) if state.phase() == Phase::Succeeded => vec![Effect::OpenDownload {
                link: result.download_link.clone(),
                filename: result.filename.clone(),
            }],
            _ => Vec::new(),
        },
        Msg::DownloadFinished { outcome } => match outcome {
            Ok(saved_to) => vec![Effect::Notify(Notification::info(
                "Download Complete",
                format!("Saved to {saved_to}"),
            ))],
            Err(reason) => vec![Effect::Notify(Notification::error(
                "Download Failed",
                reason,
            ))],
        },
        Msg::NewAnalysisClicked => {
            if matches!(state.phase(), Phase::Succeeded | Phase::Failed) {
                state.reset();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn notify_error(err: &SubmitError) -> Effect {
    Effect::Notify(Notification::error(err.title(), err.to_string()))
}

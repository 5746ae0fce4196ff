//! Moodscan core: pure submission state machine, domain types and view-model helpers.
mod effect;
mod msg;
mod plan;
mod state;
mod submission;
mod update;
mod validate;
mod view_model;

pub use effect::{Effect, Notification, NotificationLevel};
pub use msg::Msg;
pub use plan::{Plan, PlanParseError};
pub use state::{AppState, Phase, SubmissionId, PROGRESS_CEILING};
pub use submission::{AnalysisMeta, SubmissionRequest, SubmissionResult, SubmitError};
pub use update::update;
pub use validate::is_valid_source_url;
pub use view_model::AppViewModel;

//! Moodscan engine: HTTP submission, progress ticking, artifact download and
//! history persistence.
mod client;
mod download;
mod engine;
mod filename;
mod history;
mod persist;
mod ticker;
mod types;

pub use client::{
    ClientSettings, ReqwestSubmissionClient, SubmissionClient, DEFAULT_ANALYSIS_PATH,
    DEFAULT_BASE_URL, PLAN_HEADER,
};
pub use download::{ArtifactDownloader, DownloadError, DownloadSettings};
pub use engine::{EngineError, EngineHandle, EngineSettings};
pub use filename::artifact_filename;
pub use history::{
    export_csv, export_csv_file, export_filename, paginate, HistoryEntry, HistoryError,
    HistoryRecorder, HistoryStore, JsonFileStore, MemoryStore, Page, DEFAULT_PAGE_SIZE,
    HISTORY_FILENAME, HISTORY_LIMIT,
};
pub use persist::{replace_file, PersistError};
pub use ticker::{
    run_submission, ChannelProgressSink, ProgressSink, ProgressTicker, TickerSettings,
};
pub use types::EngineEvent;

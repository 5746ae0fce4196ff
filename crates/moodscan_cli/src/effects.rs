use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use moodscan_core::{Effect, Msg};
use moodscan_engine::{EngineEvent, EngineHandle, HistoryEntry, HistoryRecorder, HistoryStore};
use moodscan_logging::{moodscan_error, moodscan_info};

use crate::render::{notification_line, result_lines, ProgressRenderer};

/// Executes core effects against the engine, the history store and the terminal.
pub struct EffectRunner<'a, S: HistoryStore, W: Write> {
    engine: &'a EngineHandle,
    recorder: &'a HistoryRecorder<S>,
    renderer: &'a mut ProgressRenderer<W>,
    download_dir: Option<PathBuf>,
    pending_downloads: usize,
}

impl<'a, S: HistoryStore, W: Write> EffectRunner<'a, S, W> {
    pub fn new(
        engine: &'a EngineHandle,
        recorder: &'a HistoryRecorder<S>,
        renderer: &'a mut ProgressRenderer<W>,
        download_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            engine,
            recorder,
            renderer,
            download_dir,
            pending_downloads: 0,
        }
    }

    pub fn renderer(&mut self) -> &mut ProgressRenderer<W> {
        &mut *self.renderer
    }

    pub fn downloads_enabled(&self) -> bool {
        self.download_dir.is_some()
    }

    pub fn pending_downloads(&self) -> usize {
        self.pending_downloads
    }

    /// Runs `effects` in order and returns any messages they produce immediately.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_up = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartSubmission {
                    submission_id,
                    request,
                } => {
                    moodscan_info!(
                        "StartSubmission id={} plan={} url={}",
                        submission_id,
                        request.plan,
                        request.source_url
                    );
                    if let Err(err) = self.engine.submit(submission_id, request) {
                        follow_up.push(Msg::SubmissionSettled {
                            submission_id,
                            outcome: Err(err),
                        });
                    }
                }
                Effect::RecordHistory { request, result } => {
                    for line in result_lines(&result) {
                        self.print(&line);
                    }
                    let entry = HistoryEntry::from_submission(&request, &result, Utc::now());
                    if let Err(err) = self.recorder.record(entry) {
                        moodscan_error!("Failed to record history: {}", err);
                        self.print(&format!("[warn] history not updated: {err}"));
                    }
                }
                Effect::OpenDownload { link, filename } => match &self.download_dir {
                    Some(dir) => {
                        self.pending_downloads += 1;
                        self.engine.download(link, filename, dir.clone());
                    }
                    None => self.print(&format!("Open {link} to retrieve the result")),
                },
                Effect::Notify(notification) => {
                    self.print(&notification_line(&notification));
                }
            }
        }
        follow_up
    }

    /// Translates an engine event into a core message.
    pub fn on_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::Progress {
                submission_id,
                increment,
            } => Msg::ProgressTick {
                submission_id,
                increment,
            },
            EngineEvent::Settled {
                submission_id,
                outcome,
            } => Msg::SubmissionSettled {
                submission_id,
                outcome,
            },
            EngineEvent::DownloadCompleted { link, outcome } => {
                self.pending_downloads = self.pending_downloads.saturating_sub(1);
                Msg::DownloadFinished {
                    outcome: outcome
                        .map(|path| path.display().to_string())
                        .map_err(|err| format!("{link}: {err}")),
                }
            }
        }
    }

    fn print(&mut self, line: &str) {
        if let Err(err) = self.renderer.line(line) {
            moodscan_error!("Failed to write to terminal: {}", err);
        }
    }
}

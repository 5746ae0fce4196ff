use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use moodscan_core::{SubmissionId, SubmissionRequest, SubmitError};
use moodscan_logging::{moodscan_info, moodscan_warn};
use thiserror::Error;

use crate::ticker::{run_submission, ChannelProgressSink, ProgressSink, TickerSettings};
use crate::{
    ArtifactDownloader, ClientSettings, DownloadError, DownloadSettings, EngineEvent,
    ReqwestSubmissionClient, SubmissionClient,
};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub ticker: TickerSettings,
    pub download: DownloadSettings,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] SubmitError),
    #[error("failed to build download client: {0}")]
    Download(#[from] DownloadError),
}

enum EngineCommand {
    Submit {
        submission_id: SubmissionId,
        request: SubmissionRequest,
    },
    Download {
        link: String,
        filename: Option<String>,
        dest_dir: PathBuf,
    },
}

/// Clears the in-flight flag when the submission task ends, however it ends.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs submissions and downloads on a background tokio runtime and reports
/// back through [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    in_flight: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestSubmissionClient::new(settings.client)?);
        let downloader = Arc::new(ArtifactDownloader::new(settings.download)?);
        Self::with_client(client, settings.ticker, downloader)
    }

    pub fn with_client(
        client: Arc<dyn SubmissionClient>,
        ticker: TickerSettings,
        downloader: Arc<ArtifactDownloader>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let in_flight = Arc::new(AtomicBool::new(false));
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let worker_flag = in_flight.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let event_tx = event_tx.clone();
                match command {
                    EngineCommand::Submit {
                        submission_id,
                        request,
                    } => {
                        let client = client.clone();
                        let ticker = ticker.clone();
                        let guard = InFlightGuard(worker_flag.clone());
                        runtime.spawn(async move {
                            let sink: Arc<dyn ProgressSink> =
                                Arc::new(ChannelProgressSink::new(event_tx.clone()));
                            let outcome = run_submission(
                                client.as_ref(),
                                submission_id,
                                &request,
                                &ticker,
                                sink,
                            )
                            .await;
                            match &outcome {
                                Ok(_) => moodscan_info!("Submission {} succeeded", submission_id),
                                Err(err) => {
                                    moodscan_warn!("Submission {} failed: {}", submission_id, err)
                                }
                            }
                            drop(guard);
                            let _ = event_tx.send(EngineEvent::Settled {
                                submission_id,
                                outcome,
                            });
                        });
                    }
                    EngineCommand::Download {
                        link,
                        filename,
                        dest_dir,
                    } => {
                        let downloader = downloader.clone();
                        runtime.spawn(async move {
                            let outcome = downloader
                                .download(&link, filename.as_deref(), &dest_dir)
                                .await;
                            let _ = event_tx.send(EngineEvent::DownloadCompleted { link, outcome });
                        });
                    }
                }
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            in_flight,
        })
    }

    /// Starts a submission unless one is already in flight.
    pub fn submit(
        &self,
        submission_id: SubmissionId,
        request: SubmissionRequest,
    ) -> Result<(), SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::AlreadySubmitting);
        }
        let sent = self.cmd_tx.send(EngineCommand::Submit {
            submission_id,
            request,
        });
        if sent.is_err() {
            self.in_flight.store(false, Ordering::Release);
            return Err(SubmitError::Transport {
                message: "engine stopped".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn download(&self, link: impl Into<String>, filename: Option<String>, dest_dir: PathBuf) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            link: link.into(),
            filename,
            dest_dir,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use moodscan_core::{update, AppState, Msg, Phase, Plan};
use moodscan_engine::{
    ClientSettings, EngineHandle, EngineSettings, HistoryRecorder, HistoryStore, JsonFileStore,
};
use moodscan_logging::moodscan_error;

use crate::cli::SubmitArgs;
use crate::config::AppConfig;
use crate::effects::EffectRunner;
use crate::render::ProgressRenderer;

const EVENT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// Rejected locally before any request was made.
    Rejected,
}

pub fn run_submit(config: &AppConfig, args: SubmitArgs) -> anyhow::Result<SubmitOutcome> {
    let settings = EngineSettings {
        client: ClientSettings {
            base_url: config.base_url.clone(),
            feature_flags: args.flags.into_iter().collect(),
            ..ClientSettings::default()
        },
        ..EngineSettings::default()
    };
    let engine = EngineHandle::new(settings).context("starting submission engine")?;
    let recorder = HistoryRecorder::new(JsonFileStore::new(config.data_dir.clone()));
    let mut renderer = ProgressRenderer::new(io::stderr());
    let runner = EffectRunner::new(&engine, &recorder, &mut renderer, args.download_to);
    Ok(drive(&engine, runner, args.url, args.plan))
}

/// Feeds one submission through `update` until it settles and any requested
/// download has finished.
fn drive<S: HistoryStore, W: Write>(
    engine: &EngineHandle,
    mut runner: EffectRunner<'_, S, W>,
    url: String,
    plan: Plan,
) -> SubmitOutcome {
    let mut state = AppState::new();
    let mut inbox: VecDeque<Msg> = VecDeque::from([
        Msg::SourceUrlChanged(url),
        Msg::PlanSelected(plan),
        Msg::SubmitClicked,
    ]);
    let mut download_requested = false;

    loop {
        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            if state.consume_dirty() {
                if let Err(err) = runner.renderer().render(&state.view()) {
                    moodscan_error!("Failed to render progress: {}", err);
                }
            }
            inbox.extend(runner.run(effects));
        }

        match state.phase() {
            Phase::Idle => return SubmitOutcome::Rejected,
            Phase::Failed => return SubmitOutcome::Failed,
            Phase::Succeeded => {
                if runner.downloads_enabled() && !download_requested {
                    download_requested = true;
                    inbox.push_back(Msg::DownloadClicked);
                    continue;
                }
                if runner.pending_downloads() == 0 {
                    return SubmitOutcome::Succeeded;
                }
            }
            Phase::Submitting => {}
        }

        if let Some(event) = engine.recv_timeout(EVENT_POLL) {
            inbox.push_back(runner.on_event(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    use moodscan_core::{Effect, SubmissionRequest, SubmissionResult, SubmitError};
    use moodscan_engine::{
        ArtifactDownloader, DownloadSettings, EngineEvent, MemoryStore, SubmissionClient,
        TickerSettings,
    };

    use super::*;

    const VALID_URL: &str = "https://www.youtube.com/watch?v=abc";

    struct FixedClient {
        outcome: Result<SubmissionResult, SubmitError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FixedClient {
        fn new(outcome: Result<SubmissionResult, SubmitError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl SubmissionClient for FixedClient {
        async fn submit(
            &self,
            _request: &SubmissionRequest,
        ) -> Result<SubmissionResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    fn engine(client: Arc<FixedClient>) -> EngineHandle {
        let downloader = Arc::new(ArtifactDownloader::new(DownloadSettings::default()).unwrap());
        EngineHandle::with_client(
            client,
            TickerSettings {
                interval: Duration::from_millis(10),
                max_increment: 5,
            },
            downloader,
        )
        .unwrap()
    }

    fn run(
        client: Arc<FixedClient>,
        url: &str,
        download_to: Option<std::path::PathBuf>,
    ) -> (SubmitOutcome, HistoryRecorder<MemoryStore>, String) {
        moodscan_logging::initialize_for_tests();
        let engine = engine(client);
        let recorder = HistoryRecorder::new(MemoryStore::new());
        let mut out = Vec::new();
        let outcome = {
            let mut renderer = ProgressRenderer::new(&mut out);
            let runner = EffectRunner::new(&engine, &recorder, &mut renderer, download_to);
            drive(&engine, runner, url.to_string(), Plan::Plus)
        };
        (outcome, recorder, String::from_utf8(out).unwrap())
    }

    #[test]
    fn success_records_exactly_one_entry() {
        let client = FixedClient::new(Ok(SubmissionResult::new("https://x/y.csv")));
        let (outcome, recorder, out) = run(client.clone(), VALID_URL, None);

        assert_eq!(outcome, SubmitOutcome::Succeeded);
        let entries = recorder.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].download_link, "https://x/y.csv");
        assert_eq!(entries[0].plan_id, "plus");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert!(out.contains("[ok] Analysis Complete"));
    }

    #[test]
    fn failure_records_nothing() {
        let client = FixedClient::new(Err(SubmitError::Server {
            status: 500,
            message: Some("boom".into()),
        }));
        let (outcome, recorder, out) = run(client, VALID_URL, None);

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert!(recorder.list().unwrap().is_empty());
        assert!(out.contains("[error] Analysis Failed: server error 500: boom"));
    }

    #[test]
    fn invalid_url_is_rejected_without_a_request() {
        let client = FixedClient::new(Ok(SubmissionResult::new("https://x/y.csv")));
        let (outcome, recorder, out) = run(client.clone(), "vimeo.com/123", None);

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert!(recorder.list().unwrap().is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert!(out.contains("Invalid YouTube URL"));
    }

    #[test]
    fn requested_download_is_awaited_before_exit() {
        let dir = tempfile::tempdir().unwrap();
        let client = FixedClient::new(Ok(SubmissionResult::new("ftp://x/y.csv")));
        let (outcome, recorder, out) = run(client, VALID_URL, Some(dir.path().to_path_buf()));

        assert_eq!(outcome, SubmitOutcome::Succeeded);
        assert_eq!(recorder.list().unwrap().len(), 1);
        assert!(out.contains("[error] Download Failed: ftp://x/y.csv"));
    }

    #[test]
    fn busy_engine_settles_the_start_as_already_submitting() {
        moodscan_logging::initialize_for_tests();
        let client = Arc::new(FixedClient {
            outcome: Ok(SubmissionResult::new("https://x/y.csv")),
            delay: Duration::from_millis(200),
            calls: AtomicUsize::new(0),
        });
        let engine = engine(client);
        let recorder = HistoryRecorder::new(MemoryStore::new());
        let mut out = Vec::new();
        let mut renderer = ProgressRenderer::new(&mut out);
        let mut runner = EffectRunner::new(&engine, &recorder, &mut renderer, None);

        engine
            .submit(1, SubmissionRequest::new(VALID_URL, Plan::Basic))
            .unwrap();
        let follow_up = runner.run(vec![Effect::StartSubmission {
            submission_id: 2,
            request: SubmissionRequest::new(VALID_URL, Plan::Basic),
        }]);

        assert_eq!(
            follow_up,
            vec![Msg::SubmissionSettled {
                submission_id: 2,
                outcome: Err(SubmitError::AlreadySubmitting),
            }]
        );
    }

    #[test]
    fn download_events_clear_pending_count() {
        moodscan_logging::initialize_for_tests();
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(FixedClient::new(Ok(SubmissionResult::new("https://x/y.csv"))));
        let recorder = HistoryRecorder::new(MemoryStore::new());
        let mut out = Vec::new();
        let mut renderer = ProgressRenderer::new(&mut out);
        let mut runner =
            EffectRunner::new(&engine, &recorder, &mut renderer, Some(dir.path().to_path_buf()));

        runner.run(vec![Effect::OpenDownload {
            link: "not a link".into(),
            filename: None,
        }]);
        assert_eq!(runner.pending_downloads(), 1);

        let deadline = Instant::now() + Duration::from_secs(5);
        let event = loop {
            assert!(Instant::now() < deadline, "download did not complete");
            if let Some(event @ EngineEvent::DownloadCompleted { .. }) =
                engine.recv_timeout(Duration::from_millis(50))
            {
                break event;
            }
        };
        assert!(matches!(
            runner.on_event(event),
            Msg::DownloadFinished { outcome: Err(_) }
        ));
        assert_eq!(runner.pending_downloads(), 0);
    }
}

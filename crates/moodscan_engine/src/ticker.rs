use std::sync::Arc;
use std::time::Duration;

use moodscan_core::{SubmissionId, SubmissionRequest, SubmissionResult, SubmitError};
use moodscan_logging::moodscan_trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{EngineEvent, SubmissionClient};

#[derive(Debug, Clone)]
pub struct TickerSettings {
    pub interval: Duration,
    /// Upper bound (inclusive) of the random increment per tick.
    pub max_increment: u8,
}

impl Default for TickerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(800),
            max_increment: 15,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Periodic cosmetic progress for one submission.
///
/// The timer task lives exactly as long as this guard: dropping it aborts the
/// task, so no tick is emitted after the owning submission settles.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Must be called from within a tokio runtime.
    pub fn start(
        submission_id: SubmissionId,
        settings: &TickerSettings,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let period = settings.interval;
        let max_increment = settings.max_increment;
        let handle = tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let increment = rng.gen_range(0..=max_increment);
                moodscan_trace!("progress tick submission={} +{}", submission_id, increment);
                sink.emit(EngineEvent::Progress {
                    submission_id,
                    increment,
                });
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Runs one submission with a progress ticker scoped to the remote call.
pub async fn run_submission(
    client: &dyn SubmissionClient,
    submission_id: SubmissionId,
    request: &SubmissionRequest,
    ticker: &TickerSettings,
    sink: Arc<dyn ProgressSink>,
) -> Result<SubmissionResult, SubmitError> {
    let _ticker = ProgressTicker::start(submission_id, ticker, sink);
    client.submit(request).await
}

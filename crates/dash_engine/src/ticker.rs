use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink};

/// Emits `EngineEvent::Tick` every `period` until cancelled. The first tick
/// fires one period after start.
pub(crate) async fn run_ticker(
    period: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = interval.tick() => sink.emit(EngineEvent::Tick { now: unix_now() }),
        }
    }
}

pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

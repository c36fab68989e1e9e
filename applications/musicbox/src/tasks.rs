/// Periodic control loop tasks
use std::time::Duration;
use sugoi_playback::{InputLoop, MonitorLoop, MonitorTick};
use tokio::time::MissedTickBehavior;

/// Poll the buttons every `period` until the task is aborted
pub async fn input_task(input: InputLoop, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!("Input loop started ({} ms)", period.as_millis());

    loop {
        let now = ticker.tick().await;
        if let Err(e) = input.tick(now.into_std()) {
            tracing::warn!("Input tick skipped: {}", e);
        }
    }
}

/// Watch the engine every `period` until the task is aborted
pub async fn monitor_task(monitor: MonitorLoop, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!("Monitor loop started ({} ms)", period.as_millis());

    loop {
        ticker.tick().await;
        match monitor.tick() {
            Ok(MonitorTick::Ended(outcome)) => tracing::trace!("End of track: {:?}", outcome),
            Ok(MonitorTick::Animated) => {}
            Err(e) => tracing::warn!("Monitor tick skipped: {}", e),
        }
    }
}

/// Music box wiring and lifecycle
use crate::config::MusicBoxConfig;
use crate::error::Result;
use crate::tasks;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use sugoi_core::{AudioEngine, DigitalIo};
use sugoi_playback::{
    IndicatorReconciler, InputLoop, InputSampler, MonitorLoop, PlaybackController,
};

/// A fully configured music box, ready to run
pub struct MusicBox {
    controller: Arc<PlaybackController>,
    indicators: Arc<IndicatorReconciler>,
    engine: Arc<dyn AudioEngine>,
    input: InputLoop,
    monitor: MonitorLoop,
    input_period: Duration,
    monitor_period: Duration,
}

impl MusicBox {
    /// Validate the configuration, configure every pin, push the initial
    /// volume and render the indicators once
    pub fn build(
        config: &MusicBoxConfig,
        tracks: Vec<PathBuf>,
        io: Arc<dyn DigitalIo>,
        engine: Arc<dyn AudioEngine>,
    ) -> Result<Self> {
        config.validate()?;

        let controller = Arc::new(PlaybackController::new(
            tracks,
            Arc::clone(&engine),
            &config.playback_config()?,
        )?);

        let sampler = InputSampler::new(config.input_bindings()?, Arc::clone(&io))?;
        sampler.configure()?;

        let indicators = Arc::new(IndicatorReconciler::new(
            config.indicators.clone(),
            Arc::clone(&io),
        )?);
        indicators.configure()?;

        controller.apply_volume()?;
        indicators.reconcile(&controller.state())?;

        let input = InputLoop::new(sampler, Arc::clone(&controller), Arc::clone(&indicators));
        let monitor = MonitorLoop::new(
            Arc::clone(&controller),
            Arc::clone(&engine),
            Arc::clone(&indicators),
        );

        tracing::info!(
            "Music box ready: {} tracks, {} inputs",
            controller.tracks().len(),
            input.sampler().bindings().len()
        );

        Ok(Self {
            controller,
            indicators,
            engine,
            input,
            monitor,
            input_period: config.input_period(),
            monitor_period: config.monitor_period(),
        })
    }

    /// Playback controller shared by both loops
    pub fn controller(&self) -> Arc<PlaybackController> {
        Arc::clone(&self.controller)
    }

    /// Indicator reconciler shared by both loops
    pub fn indicators(&self) -> Arc<IndicatorReconciler> {
        Arc::clone(&self.indicators)
    }

    /// Run both loops until `shutdown` resolves, then stop playback and turn
    /// every indicator off
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Self {
            controller,
            indicators,
            engine,
            input,
            monitor,
            input_period,
            monitor_period,
        } = self;

        let input_handle = tokio::spawn(tasks::input_task(input, input_period));
        let monitor_handle = tokio::spawn(tasks::monitor_task(monitor, monitor_period));

        shutdown.await;
        tracing::info!("Shutting down");

        input_handle.abort();
        monitor_handle.abort();
        // Both loops must be gone before the final writes
        let _ = input_handle.await;
        let _ = monitor_handle.await;

        // LEDs go dark even when the engine refuses to stop
        let stopped = engine.stop();
        if let Err(e) = &stopped {
            tracing::warn!("Failed to stop engine: {}", e);
        }
        let cleared = indicators.clear();
        if let Err(e) = &cleared {
            tracing::warn!("Failed to clear indicators: {}", e);
        }
        stopped?;
        cleared?;
        tracing::info!(
            "Stopped on track {} of {}",
            controller.state().current_index + 1,
            controller.tracks().len()
        );
        Ok(())
    }
}

impl std::fmt::Debug for MusicBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicBox")
            .field("controller", &self.controller)
            .field("input_period", &self.input_period)
            .field("monitor_period", &self.monitor_period)
            .finish_non_exhaustive()
    }
}

//! Playback controller - the transport state machine
//!
//! Owns the playback state, the debounce records and the shuffle picker, and
//! turns button actions and end-of-track events into engine commands.
//!
//! Every transition runs under one lock: the new state is computed on a copy,
//! the engine command is issued, and the copy is committed only when the
//! command succeeded. Engine queries (busy flag, position) happen before the
//! lock is taken.

use crate::{
    debounce::Debouncer,
    error::{PlaybackError, Result},
    shuffle::ShufflePicker,
    types::{Action, PlaybackConfig, PlaybackState},
    volume::Volume,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use sugoi_core::{AudioEngine, EngineStatus, RepeatMode};

/// Outcome of an end-of-track check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAdvance {
    /// Track still running, or nothing is supposed to be playing
    NotDue,
    /// A previous advance has not been picked up by the engine yet
    Pending,
    /// Repeat One restarted the current track
    Restarted(usize),
    /// Playback moved on to the given index
    Advanced(usize),
    /// Repeat Off at the end of the list (or shuffling): nothing started
    Held,
}

#[derive(Debug, Clone)]
struct Machine {
    current_index: usize,
    is_playing: bool,
    volume: Volume,
    shuffle: bool,
    repeat: RepeatMode,
    picker: ShufflePicker,
    advance_pending: bool,
    holding: bool,
}

impl Machine {
    fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            current_index: self.current_index,
            is_playing: self.is_playing,
            volume: self.volume.value(),
            muted: self.volume.is_muted(),
            shuffle: self.shuffle,
            repeat_mode: self.repeat,
        }
    }

    fn next_index(&mut self, len: usize) -> usize {
        if self.shuffle {
            self.picker.pick(len)
        } else {
            (self.current_index + 1) % len
        }
    }

    fn previous_index(&mut self, len: usize) -> usize {
        if self.shuffle {
            self.picker.pick(len)
        } else {
            (self.current_index + len - 1) % len
        }
    }
}

/// Transport state machine shared by the input and monitor loops
pub struct PlaybackController {
    tracks: Vec<PathBuf>,
    engine: Arc<dyn AudioEngine>,
    debouncer: Debouncer,
    restart_threshold_ms: i64,
    machine: Mutex<Machine>,
}

impl PlaybackController {
    /// Create a controller over a fixed track list
    ///
    /// Starts stopped on the first track.
    ///
    /// # Errors
    /// [`PlaybackError::EmptyTrackList`] for an empty track list,
    /// [`PlaybackError::InvalidDebounceInterval`] for a zero debounce interval
    pub fn new(
        tracks: Vec<PathBuf>,
        engine: Arc<dyn AudioEngine>,
        config: &PlaybackConfig,
    ) -> Result<Self> {
        if tracks.is_empty() {
            return Err(PlaybackError::EmptyTrackList);
        }
        let debouncer = Debouncer::new(config.debounce_interval)?;
        let restart_threshold_ms =
            i64::try_from(config.restart_threshold.as_millis()).unwrap_or(i64::MAX);

        let machine = Machine {
            current_index: 0,
            is_playing: false,
            volume: Volume::new(config.volume, config.volume_steps),
            shuffle: config.shuffle,
            repeat: config.repeat,
            picker: ShufflePicker::new(config.seed),
            advance_pending: false,
            holding: false,
        };

        Ok(Self {
            tracks,
            engine,
            debouncer,
            restart_threshold_ms,
            machine: Mutex::new(machine),
        })
    }

    /// Copy of the current playback state
    pub fn state(&self) -> PlaybackState {
        self.machine.lock().snapshot()
    }

    /// Track list
    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    /// Track at the current index
    pub fn current_track(&self) -> &Path {
        let index = self.machine.lock().current_index;
        &self.tracks[index]
    }

    /// Whether the last automatic advance has not been followed by a monitor
    /// sample yet
    pub fn is_advance_pending(&self) -> bool {
        self.machine.lock().advance_pending
    }

    /// Debounce records consulted by [`PlaybackController::handle_input`]
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Push the current output volume to the engine
    pub fn apply_volume(&self) -> Result<()> {
        let machine = self.machine.lock();
        self.engine.set_volume(machine.volume.gain())?;
        Ok(())
    }

    /// Debounce a button press and dispatch it
    ///
    /// Returns `None` when the press was suppressed by the debouncer.
    pub fn handle_input(&self, action: Action, now: Instant) -> Result<Option<PlaybackState>> {
        if !self.debouncer.accept(action, now) {
            tracing::trace!("Suppressed {} (debounce)", action);
            return Ok(None);
        }
        tracing::debug!("Accepted {}", action);
        self.dispatch(action).map(Some)
    }

    /// Run the transition bound to `action`, without debouncing
    pub fn dispatch(&self, action: Action) -> Result<PlaybackState> {
        match action {
            Action::Backward => self.backward(),
            Action::Forward => self.forward(),
            Action::PlayPause => self.play_pause(),
            Action::Stop => self.stop(),
            Action::RepeatCycle => self.cycle_repeat_mode(),
            Action::Shuffle => self.toggle_shuffle(),
            Action::VolumeUp => self.volume_up(),
            Action::VolumeDown => self.volume_down(),
            Action::Mute => self.toggle_mute(),
        }
    }

    /// Start playback when the engine is idle, otherwise toggle pause/resume
    pub fn play_pause(&self) -> Result<PlaybackState> {
        let busy = self.engine.is_busy()?;
        self.update("play_pause", |m| {
            if !busy {
                let index = m.current_index;
                self.start(m, index)
            } else if m.is_playing {
                self.engine.pause()?;
                m.is_playing = false;
                Ok(())
            } else {
                self.engine.resume()?;
                m.is_playing = true;
                Ok(())
            }
        })
    }

    /// Stop playback
    pub fn stop(&self) -> Result<PlaybackState> {
        self.update("stop", |m| {
            self.engine.stop()?;
            m.is_playing = false;
            m.advance_pending = false;
            Ok(())
        })
    }

    /// Play the next track (random when shuffling)
    pub fn forward(&self) -> Result<PlaybackState> {
        let len = self.tracks.len();
        self.update("forward", |m| {
            let index = m.next_index(len);
            self.start(m, index)
        })
    }

    /// Restart the current track when past the restart threshold, otherwise
    /// play the previous one (random when shuffling)
    pub fn backward(&self) -> Result<PlaybackState> {
        let position = self.engine.elapsed_position()?;
        let len = self.tracks.len();
        self.update("backward", |m| {
            let index = if position > self.restart_threshold_ms {
                m.current_index
            } else {
                m.previous_index(len)
            };
            self.start(m, index)
        })
    }

    /// One volume step up
    pub fn volume_up(&self) -> Result<PlaybackState> {
        self.update("volume_up", |m| {
            if m.volume.step_up() {
                self.engine.set_volume(m.volume.gain())?;
            }
            Ok(())
        })
    }

    /// One volume step down
    pub fn volume_down(&self) -> Result<PlaybackState> {
        self.update("volume_down", |m| {
            if m.volume.step_down() {
                self.engine.set_volume(m.volume.gain())?;
            }
            Ok(())
        })
    }

    /// Toggle mute; the stored volume survives
    pub fn toggle_mute(&self) -> Result<PlaybackState> {
        self.update("mute", |m| {
            m.volume.toggle_mute();
            self.engine.set_volume(m.volume.gain())?;
            Ok(())
        })
    }

    /// Toggle shuffle without changing the current track
    pub fn toggle_shuffle(&self) -> Result<PlaybackState> {
        self.update("shuffle", |m| {
            m.shuffle = !m.shuffle;
            Ok(())
        })
    }

    /// Off -> All -> One -> Off
    pub fn cycle_repeat_mode(&self) -> Result<PlaybackState> {
        self.update("repeat_cycle", |m| {
            m.repeat = m.repeat.next();
            Ok(())
        })
    }

    /// React to an engine status sampled by the monitor loop
    ///
    /// Only acts on end-of-track while playing. An advance marks itself
    /// pending, and the pending flag absorbs exactly one further end-of-track
    /// sample, so a track that ends before the next sample is still followed
    /// by another advance.
    pub fn auto_advance(&self, status: EngineStatus) -> Result<AutoAdvance> {
        if !status.is_ended() {
            return Ok(AutoAdvance::NotDue);
        }
        let len = self.tracks.len();
        let ((outcome, first_hold), _) = self.transition("auto_advance", |m| {
            if !m.is_playing {
                return Ok((AutoAdvance::NotDue, false));
            }
            if std::mem::take(&mut m.advance_pending) {
                return Ok((AutoAdvance::Pending, false));
            }

            let outcome = match m.repeat {
                RepeatMode::One => AutoAdvance::Restarted(m.current_index),
                RepeatMode::All => AutoAdvance::Advanced(m.next_index(len)),
                RepeatMode::Off if !m.shuffle && m.current_index + 1 < len => {
                    AutoAdvance::Advanced(m.current_index + 1)
                }
                RepeatMode::Off => AutoAdvance::Held,
            };

            if let AutoAdvance::Restarted(index) | AutoAdvance::Advanced(index) = outcome {
                self.start(m, index)?;
                m.advance_pending = true;
            }
            let first_hold =
                outcome == AutoAdvance::Held && !std::mem::replace(&mut m.holding, true);
            Ok((outcome, first_hold))
        })?;

        match outcome {
            AutoAdvance::Restarted(index) => tracing::info!("Repeating track {}", index),
            AutoAdvance::Advanced(index) => tracing::info!("Advancing to track {}", index),
            AutoAdvance::Held if first_hold => tracing::debug!("End of list reached, holding"),
            AutoAdvance::Held | AutoAdvance::NotDue | AutoAdvance::Pending => {}
        }
        Ok(outcome)
    }

    /// Clear the pending-advance flag once the engine reports a running track
    ///
    /// Returns whether the flag was cleared.
    pub fn observe_engine(&self, status: EngineStatus) -> bool {
        if status.is_ended() {
            return false;
        }
        let mut machine = self.machine.lock();
        let cleared = std::mem::take(&mut machine.advance_pending);
        if cleared {
            tracing::debug!("Engine picked up track {}", machine.current_index);
        }
        cleared
    }

    /// Whether the end of the list has been reached and nothing was started
    pub fn is_holding(&self) -> bool {
        self.machine.lock().holding
    }

    fn start(&self, m: &mut Machine, index: usize) -> Result<()> {
        self.engine.load_and_play(&self.tracks[index])?;
        m.current_index = index;
        m.is_playing = true;
        m.advance_pending = false;
        m.holding = false;
        Ok(())
    }

    fn update<F>(&self, label: &'static str, apply: F) -> Result<PlaybackState>
    where
        F: FnOnce(&mut Machine) -> Result<()>,
    {
        self.transition(label, apply).map(|((), state)| state)
    }

    fn transition<T, F>(&self, label: &'static str, apply: F) -> Result<(T, PlaybackState)>
    where
        F: FnOnce(&mut Machine) -> Result<T>,
    {
        let mut machine = self.machine.lock();
        let mut next = machine.clone();
        match apply(&mut next) {
            Ok(value) => {
                *machine = next;
                let state = machine.snapshot();
                tracing::debug!(
                    "{}: track {} playing={} volume={:.2} muted={} shuffle={} repeat={}",
                    label,
                    state.current_index,
                    state.is_playing,
                    state.volume,
                    state.muted,
                    state.shuffle,
                    state.repeat_mode
                );
                Ok((value, state))
            }
            Err(e) => {
                tracing::debug!("{} rejected, state unchanged: {}", label, e);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("tracks", &self.tracks.len())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

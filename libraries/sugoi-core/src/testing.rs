//! Scripted audio engine for tests
//!
//! The engine's busy flag and position are set by the test, and every command
//! it receives is recorded so tests can assert exactly what the playback core
//! asked for.

use crate::error::{DeviceError, Result};
use crate::traits::AudioEngine;
use crate::types::EngineStatus;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Command received by a [`ScriptedEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// `load_and_play(track)`
    LoadAndPlay(PathBuf),
    /// `pause()`
    Pause,
    /// `resume()`
    Resume,
    /// `stop()`
    Stop,
    /// `set_volume(volume)`
    SetVolume(f32),
}

#[derive(Debug)]
struct Script {
    status: EngineStatus,
    commands: Vec<EngineCommand>,
    fail_next: bool,
}

/// Audio engine double with test-controlled status
#[derive(Debug)]
pub struct ScriptedEngine {
    script: Mutex<Script>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// Create an idle engine (not busy, ended sentinel position)
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                status: EngineStatus::ENDED,
                commands: Vec::new(),
                fail_next: false,
            }),
        }
    }

    /// Set what `is_busy` and `elapsed_position` report
    pub fn set_status(&self, status: EngineStatus) {
        self.script.lock().status = status;
    }

    /// Report a track playing at `position_ms`
    pub fn set_playing_at(&self, position_ms: i64) {
        self.set_status(EngineStatus::playing_at(position_ms));
    }

    /// Report the end-of-track sentinel
    pub fn set_ended(&self) {
        self.set_status(EngineStatus::ENDED);
    }

    /// Make the next command or query fail once
    pub fn fail_next(&self) {
        self.script.lock().fail_next = true;
    }

    /// Commands received so far
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.script.lock().commands.clone()
    }

    /// Drain the commands received so far
    pub fn take_commands(&self) -> Vec<EngineCommand> {
        std::mem::take(&mut self.script.lock().commands)
    }

    /// Tracks started with `load_and_play`, in order
    pub fn started_tracks(&self) -> Vec<PathBuf> {
        self.script
            .lock()
            .commands
            .iter()
            .filter_map(|command| match command {
                EngineCommand::LoadAndPlay(track) => Some(track.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last volume sent to the engine
    pub fn last_volume(&self) -> Option<f32> {
        self.script
            .lock()
            .commands
            .iter()
            .rev()
            .find_map(|command| match command {
                EngineCommand::SetVolume(volume) => Some(*volume),
                _ => None,
            })
    }

    fn record(&self, command: EngineCommand) -> Result<()> {
        let mut script = self.script.lock();
        if std::mem::take(&mut script.fail_next) {
            return Err(DeviceError::engine("scripted failure"));
        }
        match &command {
            EngineCommand::LoadAndPlay(_) => script.status = EngineStatus::playing_at(0),
            EngineCommand::Stop => script.status = EngineStatus::ENDED,
            _ => {}
        }
        script.commands.push(command);
        Ok(())
    }

    fn query(&self) -> Result<EngineStatus> {
        let mut script = self.script.lock();
        if std::mem::take(&mut script.fail_next) {
            return Err(DeviceError::engine("scripted failure"));
        }
        Ok(script.status)
    }
}

impl AudioEngine for ScriptedEngine {
    fn load_and_play(&self, track: &Path) -> Result<()> {
        self.record(EngineCommand::LoadAndPlay(track.to_path_buf()))
    }

    fn pause(&self) -> Result<()> {
        self.record(EngineCommand::Pause)
    }

    fn resume(&self) -> Result<()> {
        self.record(EngineCommand::Resume)
    }

    fn stop(&self) -> Result<()> {
        self.record(EngineCommand::Stop)
    }

    fn is_busy(&self) -> Result<bool> {
        Ok(self.query()?.busy)
    }

    fn elapsed_position(&self) -> Result<i64> {
        self.query().map(|status| status.position_ms)
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.record(EngineCommand::SetVolume(volume))
    }

    fn status(&self) -> Result<EngineStatus> {
        self.query()
    }
}

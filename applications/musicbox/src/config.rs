/// Music box configuration
use crate::error::{MusicBoxError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sugoi_core::{ActiveLevel, Pin, Pull, RepeatMode};
use sugoi_playback::{Action, IndicatorLayout, InputBinding, PlaybackConfig};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "musicbox.toml";

/// Prefix of environment overrides (`SUGOI__TIMING__INPUT_PERIOD_MS=20`)
pub const ENV_PREFIX: &str = "SUGOI";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MusicBoxConfig {
    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_timing")]
    pub timing: TimingSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    /// Action name -> button wiring
    #[serde(default = "default_inputs")]
    pub inputs: BTreeMap<String, InputPinSettings>,

    #[serde(default = "default_indicators")]
    pub indicators: IndicatorLayout,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LibrarySettings {
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimingSettings {
    #[serde(default = "default_input_period_ms")]
    pub input_period_ms: u64,

    #[serde(default = "default_monitor_period_ms")]
    pub monitor_period_ms: u64,

    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: f64,

    #[serde(default = "default_restart_threshold_ms")]
    pub restart_threshold_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_volume_steps")]
    pub volume_steps: u8,

    #[serde(default)]
    pub shuffle: bool,

    #[serde(default)]
    pub repeat: RepeatMode,

    /// Fixed shuffle seed, random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct InputPinSettings {
    pub pin: Pin,

    #[serde(default)]
    pub active: ActiveLevel,

    #[serde(default)]
    pub pull: Pull,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Length of every track played by the simulated engine
    #[serde(default = "default_track_length_secs")]
    pub track_length_secs: u64,
}

impl MusicBoxConfig {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path, `musicbox.toml` in the working directory is
    /// read when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (SUGOI__SECTION__KEY)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Parse configuration from a TOML string, without environment overrides
    pub fn from_toml(source: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library.extensions.is_empty() {
            return Err(MusicBoxError::Config(
                "library.extensions must list at least one extension".to_string(),
            ));
        }

        if self.timing.input_period_ms == 0 {
            return Err(MusicBoxError::Config(
                "timing.input_period_ms must be positive".to_string(),
            ));
        }
        if self.timing.monitor_period_ms == 0 {
            return Err(MusicBoxError::Config(
                "timing.monitor_period_ms must be positive".to_string(),
            ));
        }
        if !self.timing.debounce_secs.is_finite() || self.timing.debounce_secs <= 0.0 {
            return Err(MusicBoxError::Config(format!(
                "timing.debounce_secs must be positive, got {}",
                self.timing.debounce_secs
            )));
        }

        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(MusicBoxError::Config(format!(
                "playback.volume must be between 0 and 1, got {}",
                self.playback.volume
            )));
        }
        if self.playback.volume_steps == 0 {
            return Err(MusicBoxError::Config(
                "playback.volume_steps must be at least 1".to_string(),
            ));
        }

        if self.simulation.track_length_secs == 0 {
            return Err(MusicBoxError::Config(
                "simulation.track_length_secs must be positive".to_string(),
            ));
        }

        if self.inputs.is_empty() {
            return Err(MusicBoxError::Config("no inputs configured".to_string()));
        }
        let bindings = self.input_bindings()?;
        if let Some(pair) = bindings.windows(2).find(|pair| pair[0].action == pair[1].action) {
            return Err(MusicBoxError::Config(format!(
                "action {} is bound more than once",
                pair[0].action
            )));
        }
        self.indicators.validate()?;

        // Every pin drives exactly one button or indicator
        let mut owners: HashMap<Pin, String> = HashMap::new();
        for (name, pin) in self.pin_map()? {
            if let Some(previous) = owners.insert(pin, name.clone()) {
                return Err(MusicBoxError::Config(format!(
                    "{pin} is assigned to both {previous} and {name}"
                )));
            }
        }

        Ok(())
    }

    /// Playback settings for the controller
    pub fn playback_config(&self) -> Result<PlaybackConfig> {
        let debounce_interval = Duration::try_from_secs_f64(self.timing.debounce_secs)
            .map_err(|e| {
                MusicBoxError::Config(format!(
                    "timing.debounce_secs {}: {}",
                    self.timing.debounce_secs, e
                ))
            })?;

        Ok(PlaybackConfig {
            volume: self.playback.volume,
            volume_steps: self.playback.volume_steps,
            shuffle: self.playback.shuffle,
            repeat: self.playback.repeat,
            debounce_interval,
            restart_threshold: Duration::from_millis(self.timing.restart_threshold_ms),
            seed: self.playback.seed,
        })
    }

    /// Button bindings, in priority order
    pub fn input_bindings(&self) -> Result<Vec<InputBinding>> {
        let mut bindings = self
            .inputs
            .iter()
            .map(|(name, settings)| {
                let action = name
                    .parse::<Action>()
                    .map_err(|e| MusicBoxError::Config(format!("inputs.{name}: {e}")))?;
                Ok(InputBinding {
                    action,
                    pin: settings.pin,
                    active: settings.active,
                    pull: settings.pull,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        bindings.sort_by_key(|binding| binding.action);
        Ok(bindings)
    }

    /// Every configured pin with the button or indicator it belongs to
    pub fn pin_map(&self) -> Result<Vec<(String, Pin)>> {
        let mut pins: Vec<(String, Pin)> = self
            .input_bindings()?
            .into_iter()
            .map(|binding| (format!("button:{}", binding.action), binding.pin))
            .collect();
        pins.extend(
            self.indicators
                .named_pins()
                .into_iter()
                .map(|(name, pin)| (format!("led:{name}"), pin)),
        );
        Ok(pins)
    }

    pub fn input_period(&self) -> Duration {
        Duration::from_millis(self.timing.input_period_ms)
    }

    pub fn monitor_period(&self) -> Duration {
        Duration::from_millis(self.timing.monitor_period_ms)
    }

    pub fn track_length(&self) -> Duration {
        Duration::from_secs(self.simulation.track_length_secs)
    }
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        music_dir: default_music_dir(),
        extensions: default_extensions(),
    }
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("./music")
}

fn default_extensions() -> Vec<String> {
    ["wav", "mp3", "ogg", "flac"]
        .iter()
        .map(|ext| (*ext).to_string())
        .collect()
}

fn default_timing() -> TimingSettings {
    TimingSettings {
        input_period_ms: default_input_period_ms(),
        monitor_period_ms: default_monitor_period_ms(),
        debounce_secs: default_debounce_secs(),
        restart_threshold_ms: default_restart_threshold_ms(),
    }
}

fn default_input_period_ms() -> u64 {
    50
}

fn default_monitor_period_ms() -> u64 {
    1000
}

fn default_debounce_secs() -> f64 {
    0.3
}

fn default_restart_threshold_ms() -> u64 {
    2000
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        volume_steps: default_volume_steps(),
        shuffle: false,
        repeat: RepeatMode::Off,
        seed: None,
    }
}

fn default_volume() -> f32 {
    0.5
}

fn default_volume_steps() -> u8 {
    10
}

// Buttons wired to ground with the internal pull-ups enabled
fn default_inputs() -> BTreeMap<String, InputPinSettings> {
    [
        (Action::Backward, 5),
        (Action::Forward, 6),
        (Action::PlayPause, 13),
        (Action::Stop, 19),
        (Action::RepeatCycle, 26),
        (Action::Shuffle, 16),
        (Action::VolumeUp, 20),
        (Action::VolumeDown, 21),
        (Action::Mute, 12),
    ]
    .into_iter()
    .map(|(action, pin)| {
        (
            action.as_str().to_string(),
            InputPinSettings {
                pin: Pin(pin),
                active: ActiveLevel::Low,
                pull: Pull::Up,
            },
        )
    })
    .collect()
}

fn default_indicators() -> IndicatorLayout {
    IndicatorLayout {
        volume_bar: vec![Pin(2), Pin(3), Pin(4), Pin(17), Pin(27)],
        repeat: [Pin(22), Pin(10)],
        shuffle: Pin(9),
        mute: Pin(11),
        playing: vec![Pin(14), Pin(15), Pin(18), Pin(23), Pin(24), Pin(25)],
    }
}

fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        track_length_secs: default_track_length_secs(),
    }
}

fn default_track_length_secs() -> u64 {
    180
}

impl Default for MusicBoxConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            timing: default_timing(),
            playback: default_playback(),
            inputs: default_inputs(),
            indicators: default_indicators(),
            simulation: default_simulation(),
        }
    }
}

//! Configuration loading and validation tests

use std::io::Write;
use std::time::Duration;
use sugoi_core::{ActiveLevel, Pin, Pull, RepeatMode};
use sugoi_musicbox::{MusicBoxConfig, MusicBoxError};
use sugoi_playback::Action;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn defaults_are_valid() {
    let config = MusicBoxConfig::default();
    config.validate().unwrap();

    assert_eq!(config.input_period(), Duration::from_millis(50));
    assert_eq!(config.monitor_period(), Duration::from_secs(1));
    assert_eq!(config.timing.restart_threshold_ms, 2000);
    assert_eq!(config.input_bindings().unwrap().len(), Action::COUNT);
    assert_eq!(
        config.library.extensions,
        vec!["wav", "mp3", "ogg", "flac"]
    );
}

#[test]
fn empty_file_yields_defaults() {
    let config = MusicBoxConfig::from_toml("").unwrap();
    assert_eq!(config, MusicBoxConfig::default());
}

#[test]
fn file_values_override_defaults() {
    let config = MusicBoxConfig::from_toml(
        r#"
        [library]
        music_dir = "/srv/music"

        [timing]
        debounce_secs = 0.15
        restart_threshold_ms = 3000

        [playback]
        volume = 0.8
        repeat = "all"
        shuffle = true
        seed = 99

        [inputs.forward]
        pin = 6

        [inputs.play_pause]
        pin = 13
        active = "high"
        pull = "down"
        "#,
    )
    .unwrap();
    config.validate().unwrap();

    assert_eq!(config.library.music_dir, std::path::PathBuf::from("/srv/music"));
    // Untouched keys keep their defaults
    assert_eq!(config.timing.input_period_ms, 50);

    let playback = config.playback_config().unwrap();
    assert_eq!(playback.debounce_interval, Duration::from_millis(150));
    assert_eq!(playback.restart_threshold, Duration::from_secs(3));
    assert_eq!(playback.volume, 0.8);
    assert_eq!(playback.repeat, RepeatMode::All);
    assert!(playback.shuffle);
    assert_eq!(playback.seed, Some(99));

    let bindings = config.input_bindings().unwrap();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].action, Action::Forward);
    assert_eq!(bindings[0].active, ActiveLevel::Low);
    assert_eq!(bindings[0].pull, Pull::Up);
    assert_eq!(bindings[1].action, Action::PlayPause);
    assert_eq!(bindings[1].pin, Pin(13));
    assert_eq!(bindings[1].active, ActiveLevel::High);
    assert_eq!(bindings[1].pull, Pull::Down);
}

#[test]
fn load_reads_explicit_file() {
    let file = write_config(
        r#"
        [simulation]
        track_length_secs = 5
        "#,
    );
    let config = MusicBoxConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.track_length(), Duration::from_secs(5));
}

#[test]
fn load_fails_for_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        MusicBoxConfig::load(Some(&missing)),
        Err(MusicBoxError::Config(_))
    ));
}

#[test]
fn zero_debounce_is_rejected() {
    let config = MusicBoxConfig::from_toml("[timing]\ndebounce_secs = 0.0\n").unwrap();
    assert!(matches!(config.validate(), Err(MusicBoxError::Config(_))));

    let config = MusicBoxConfig::from_toml("[timing]\ndebounce_secs = -1.0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn out_of_range_values_are_rejected() {
    for source in [
        "[playback]\nvolume = 1.5\n",
        "[playback]\nvolume_steps = 0\n",
        "[timing]\ninput_period_ms = 0\n",
        "[timing]\nmonitor_period_ms = 0\n",
        "[simulation]\ntrack_length_secs = 0\n",
        "[library]\nextensions = []\n",
    ] {
        let config = MusicBoxConfig::from_toml(source).unwrap();
        assert!(config.validate().is_err(), "accepted: {source}");
    }
}

#[test]
fn unknown_action_is_rejected() {
    let config = MusicBoxConfig::from_toml("[inputs.eject]\npin = 6\n").unwrap();
    assert!(matches!(config.validate(), Err(MusicBoxError::Config(_))));
}

#[test]
fn action_bound_twice_through_alias_is_rejected() {
    let config = MusicBoxConfig::from_toml(
        "[inputs.forward]\npin = 6\n\n[inputs.next]\npin = 7\n",
    )
    .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn pin_shared_by_button_and_led_is_rejected() {
    // GPIO2 is the first default volume segment
    let config = MusicBoxConfig::from_toml("[inputs.forward]\npin = 2\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("GPIO2"), "{err}");
}

#[test]
fn malformed_indicator_layout_is_rejected() {
    let config = MusicBoxConfig::from_toml(
        r#"
        [indicators]
        volume_bar = []
        repeat = [22, 10]
        shuffle = 9
        mute = 11
        playing = [14]
        "#,
    )
    .unwrap();
    assert!(matches!(config.validate(), Err(MusicBoxError::Playback(_))));
}

#[test]
fn effective_config_renders_as_toml() {
    let config = MusicBoxConfig::default();
    let rendered = config.to_toml().unwrap();

    assert!(rendered.contains("[timing]"));
    assert!(rendered.contains("input_period_ms = 50"));
}

#[test]
fn pin_map_lists_buttons_and_leds() {
    let config = MusicBoxConfig::default();
    let pins = config.pin_map().unwrap();

    assert!(pins.contains(&("button:forward".to_string(), Pin(6))));
    assert!(pins.contains(&("led:shuffle".to_string(), Pin(9))));
    assert!(pins.contains(&("led:repeat_1".to_string(), Pin(10))));
    assert_eq!(pins.len(), 9 + 5 + 2 + 1 + 1 + 6);
}

#[test]
fn example_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("musicbox.example.toml");
    let config = MusicBoxConfig::load(Some(&path)).unwrap();
    config.validate().unwrap();
    assert_eq!(config, MusicBoxConfig::default());
}

//! End-to-end tests for the input and monitor loops
//!
//! Buttons are pressed on an in-memory pin bank, the loops are stepped by
//! hand with explicit timestamps, and the engine is scripted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sugoi_core::sim::PinBank;
use sugoi_core::testing::{EngineCommand, ScriptedEngine};
use sugoi_core::{ActiveLevel, Pin, Pull, RepeatMode};
use sugoi_playback::{
    Action, AutoAdvance, IndicatorLayout, IndicatorReconciler, InputBinding, InputLoop,
    InputSampler, InputTick, MonitorLoop, MonitorTick, PlaybackConfig, PlaybackController,
};

// ===== Test Helpers =====

const BUTTONS: [(Action, u8); 9] = [
    (Action::Backward, 5),
    (Action::Forward, 6),
    (Action::PlayPause, 13),
    (Action::Stop, 19),
    (Action::RepeatCycle, 26),
    (Action::Shuffle, 16),
    (Action::VolumeUp, 20),
    (Action::VolumeDown, 21),
    (Action::Mute, 12),
];

fn pin(action: Action) -> Pin {
    BUTTONS
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, p)| Pin(*p))
        .unwrap()
}

fn layout() -> IndicatorLayout {
    IndicatorLayout {
        volume_bar: vec![Pin(2), Pin(3), Pin(4), Pin(17), Pin(27)],
        repeat: [Pin(22), Pin(10)],
        shuffle: Pin(9),
        mute: Pin(11),
        playing: vec![Pin(14), Pin(15), Pin(18)],
    }
}

struct Rig {
    bank: Arc<PinBank>,
    engine: Arc<ScriptedEngine>,
    controller: Arc<PlaybackController>,
    indicators: Arc<IndicatorReconciler>,
    input: InputLoop,
    monitor: MonitorLoop,
    t0: Instant,
}

impl Rig {
    fn new(config: PlaybackConfig) -> Self {
        let bank = Arc::new(PinBank::new());
        let engine = Arc::new(ScriptedEngine::new());
        let tracks = ["a.wav", "b.wav", "c.wav"]
            .iter()
            .map(|name| PathBuf::from("/music").join(name))
            .collect();
        let controller =
            Arc::new(PlaybackController::new(tracks, engine.clone(), &config).unwrap());

        let bindings = BUTTONS
            .iter()
            .map(|(action, p)| InputBinding {
                action: *action,
                pin: Pin(*p),
                active: ActiveLevel::Low,
                pull: Pull::Up,
            })
            .collect();
        let sampler = InputSampler::new(bindings, bank.clone()).unwrap();
        sampler.configure().unwrap();

        let indicators = Arc::new(IndicatorReconciler::new(layout(), bank.clone()).unwrap());
        indicators.configure().unwrap();

        let input = InputLoop::new(sampler, controller.clone(), indicators.clone());
        let monitor = MonitorLoop::new(controller.clone(), engine.clone(), indicators.clone());

        Self {
            bank,
            engine,
            controller,
            indicators,
            input,
            monitor,
            t0: Instant::now(),
        }
    }

    fn press(&self, action: Action) {
        self.bank.press(pin(action), ActiveLevel::Low);
    }

    fn release(&self, action: Action) {
        self.bank.release(pin(action), ActiveLevel::Low);
    }

    fn tick_at(&self, ms: u64) -> InputTick {
        self.input.tick(self.t0 + Duration::from_millis(ms)).unwrap()
    }
}

// ===== Input Loop =====

#[test]
fn idle_tick_dispatches_nothing_but_reconciles() {
    let rig = Rig::new(PlaybackConfig::default());

    assert_eq!(rig.tick_at(0), InputTick::Idle);
    assert!(rig.engine.commands().is_empty());
    // Volume 0.5 over 5 segments lights 3 (round(2.5) = 3)
    assert_eq!(rig.bank.level(Pin(2)), Some(true));
    assert_eq!(rig.bank.level(Pin(4)), Some(true));
    assert_eq!(rig.bank.level(Pin(17)), Some(false));
}

#[test]
fn simultaneous_forward_and_stop_dispatches_forward_only() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::Forward);
    rig.press(Action::Stop);

    assert_eq!(rig.tick_at(0), InputTick::Dispatched(Action::Forward));
    assert_eq!(
        rig.engine.commands(),
        vec![EngineCommand::LoadAndPlay(PathBuf::from("/music/b.wav"))]
    );
    assert!(rig.controller.state().is_playing);
}

#[test]
fn priority_order_is_respected() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::Mute);
    rig.press(Action::VolumeDown);
    rig.press(Action::RepeatCycle);
    rig.press(Action::Shuffle);

    assert_eq!(rig.tick_at(0), InputTick::Dispatched(Action::RepeatCycle));
    assert_eq!(rig.controller.state().repeat_mode, RepeatMode::All);
    assert!(!rig.controller.state().shuffle);
    assert!(!rig.controller.state().muted);
}

#[test]
fn held_button_fires_once_per_debounce_interval() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::Forward);

    assert_eq!(rig.tick_at(0), InputTick::Dispatched(Action::Forward));
    assert_eq!(rig.tick_at(50), InputTick::Suppressed(Action::Forward));
    assert_eq!(rig.tick_at(250), InputTick::Suppressed(Action::Forward));
    assert_eq!(rig.tick_at(300), InputTick::Dispatched(Action::Forward));

    assert_eq!(rig.controller.state().current_index, 2);
    assert_eq!(rig.engine.started_tracks().len(), 2);
}

#[test]
fn suppressed_press_blocks_lower_priority_in_same_tick() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::Forward);
    assert_eq!(rig.tick_at(0), InputTick::Dispatched(Action::Forward));

    rig.press(Action::VolumeUp);
    assert_eq!(rig.tick_at(50), InputTick::Suppressed(Action::Forward));
    assert_eq!(rig.controller.state().volume, 0.5);

    rig.release(Action::Forward);
    assert_eq!(rig.tick_at(100), InputTick::Dispatched(Action::VolumeUp));
    assert_eq!(rig.controller.state().volume, 0.6);
}

#[test]
fn indicators_follow_transitions() {
    let rig = Rig::new(PlaybackConfig::default());

    rig.press(Action::Shuffle);
    rig.tick_at(0);
    rig.release(Action::Shuffle);
    assert_eq!(rig.bank.level(Pin(9)), Some(true));

    rig.press(Action::RepeatCycle);
    rig.tick_at(10);
    rig.tick_at(400);
    rig.release(Action::RepeatCycle);
    // Repeat One = 10: bit 0 off, bit 1 on
    assert_eq!(rig.bank.level(Pin(22)), Some(false));
    assert_eq!(rig.bank.level(Pin(10)), Some(true));

    rig.press(Action::Mute);
    rig.tick_at(500);
    assert_eq!(rig.bank.level(Pin(11)), Some(true));
}

#[test]
fn read_fault_skips_tick() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::PlayPause);
    rig.bank.inject_fault(pin(Action::Mute));

    let err = rig.input.tick(rig.t0).unwrap_err();
    assert!(err.is_transient());
    assert!(rig.engine.commands().is_empty());
    assert_eq!(rig.controller.debouncer().last_accepted(Action::PlayPause), None);

    assert_eq!(rig.tick_at(50), InputTick::Dispatched(Action::PlayPause));
}

#[test]
fn engine_fault_leaves_state_and_next_tick_recovers() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::Forward);
    rig.engine.fail_next();

    assert!(rig.input.tick(rig.t0).is_err());
    assert_eq!(rig.controller.state().current_index, 0);

    assert_eq!(rig.tick_at(300), InputTick::Dispatched(Action::Forward));
    assert_eq!(rig.controller.state().current_index, 1);
}

// ===== Monitor Loop =====

#[test]
fn monitor_advances_on_end_of_track() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.press(Action::PlayPause);
    rig.tick_at(0);
    rig.release(Action::PlayPause);

    rig.engine.set_ended();
    assert_eq!(
        rig.monitor.tick().unwrap(),
        MonitorTick::Ended(AutoAdvance::Advanced(1))
    );

    // Engine picked the track up: pending flag cleared, animation runs
    assert_eq!(rig.monitor.tick().unwrap(), MonitorTick::Animated);
    assert!(!rig.controller.is_advance_pending());
    assert_eq!(rig.indicators.phase(), 1);
}

#[test]
fn monitor_does_not_double_advance() {
    let rig = Rig::new(PlaybackConfig {
        repeat: RepeatMode::All,
        ..PlaybackConfig::default()
    });
    rig.controller.play_pause().unwrap();

    rig.engine.set_ended();
    assert_eq!(
        rig.monitor.tick().unwrap(),
        MonitorTick::Ended(AutoAdvance::Advanced(1))
    );

    // Engine still reports the old track ended
    rig.engine.set_ended();
    assert_eq!(
        rig.monitor.tick().unwrap(),
        MonitorTick::Ended(AutoAdvance::Pending)
    );
    assert_eq!(rig.engine.started_tracks().len(), 2);
}

#[test]
fn monitor_keeps_advancing_through_short_tracks() {
    let rig = Rig::new(PlaybackConfig {
        repeat: RepeatMode::All,
        ..PlaybackConfig::default()
    });
    rig.controller.play_pause().unwrap();

    let mut outcomes = Vec::new();
    for _ in 0..5 {
        rig.engine.set_ended();
        outcomes.push(rig.monitor.tick().unwrap());
    }

    assert_eq!(
        outcomes,
        vec![
            MonitorTick::Ended(AutoAdvance::Advanced(1)),
            MonitorTick::Ended(AutoAdvance::Pending),
            MonitorTick::Ended(AutoAdvance::Advanced(2)),
            MonitorTick::Ended(AutoAdvance::Pending),
            MonitorTick::Ended(AutoAdvance::Advanced(0)),
        ]
    );
    assert_eq!(rig.engine.started_tracks().len(), 4);
}

#[test]
fn monitor_holds_at_end_of_list() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.controller.backward().unwrap(); // last track

    rig.engine.set_ended();
    assert_eq!(
        rig.monitor.tick().unwrap(),
        MonitorTick::Ended(AutoAdvance::Held)
    );
    assert!(rig.controller.state().is_playing);
    assert_eq!(rig.controller.state().current_index, 2);
}

#[test]
fn animation_only_runs_while_playing() {
    let rig = Rig::new(PlaybackConfig::default());

    rig.engine.set_playing_at(1000);
    rig.monitor.tick().unwrap();
    assert_eq!(rig.indicators.phase(), 0);

    rig.controller.play_pause().unwrap();
    rig.monitor.tick().unwrap();
    rig.monitor.tick().unwrap();
    assert_eq!(rig.indicators.phase(), 2);
    assert_eq!(rig.bank.level(Pin(18)), Some(true));
    assert_eq!(rig.bank.level(Pin(14)), Some(false));

    rig.controller.stop().unwrap();
    rig.monitor.tick().unwrap();
    assert_eq!(rig.indicators.phase(), 0);
    assert_eq!(rig.bank.level(Pin(18)), Some(false));
}

#[test]
fn monitor_engine_fault_is_transient() {
    let rig = Rig::new(PlaybackConfig::default());
    rig.engine.fail_next();
    assert!(rig.monitor.tick().unwrap_err().is_transient());
    assert!(rig.monitor.tick().is_ok());
}

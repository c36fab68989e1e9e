//! Console simulation backend
//!
//! Buttons are "pressed" by typing their key followed by Enter; LED changes
//! are logged.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use sugoi_core::sim::PinBank;
use sugoi_core::{DigitalIo, Pin, Pull};
use sugoi_playback::{Action, InputBinding};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

/// Keyboard key bound to an action in the console simulation
pub fn key_for(action: Action) -> char {
    match action {
        Action::Backward => 'b',
        Action::Forward => 'f',
        Action::PlayPause => 'p',
        Action::Stop => 's',
        Action::RepeatCycle => 'r',
        Action::Shuffle => 'z',
        Action::VolumeUp => '+',
        Action::VolumeDown => '-',
        Action::Mute => 'm',
    }
}

/// Pin bank that logs indicator changes
pub struct ConsoleIo {
    bank: PinBank,
    labels: BTreeMap<Pin, String>,
    lit: Mutex<BTreeMap<Pin, bool>>,
}

impl ConsoleIo {
    /// Create a console backend; `labels` names the output pins in log lines
    pub fn new(labels: impl IntoIterator<Item = (String, Pin)>) -> Self {
        Self {
            bank: PinBank::new(),
            labels: labels.into_iter().map(|(name, pin)| (pin, name)).collect(),
            lit: Mutex::new(BTreeMap::new()),
        }
    }

    /// Underlying pin bank
    pub fn bank(&self) -> &PinBank {
        &self.bank
    }

    /// Hold the button for `binding` down for `hold`
    pub async fn tap(&self, binding: &InputBinding, hold: Duration) {
        self.bank.press(binding.pin, binding.active);
        tokio::time::sleep(hold).await;
        self.bank.release(binding.pin, binding.active);
    }

    /// Print the key map to stdout
    pub fn print_keymap(bindings: &[InputBinding]) {
        println!("Keys (press Enter after each):");
        for binding in bindings {
            println!("  {}  {}", key_for(binding.action), binding.action);
        }
    }
}

impl DigitalIo for ConsoleIo {
    fn configure_input(&self, pin: Pin, pull: Pull) -> sugoi_core::Result<()> {
        self.bank.configure_input(pin, pull)
    }

    fn configure_output(&self, pin: Pin, initial: bool) -> sugoi_core::Result<()> {
        self.lit.lock().insert(pin, initial);
        self.bank.configure_output(pin, initial)
    }

    fn read(&self, pin: Pin) -> sugoi_core::Result<bool> {
        self.bank.read(pin)
    }

    fn write(&self, pin: Pin, level: bool) -> sugoi_core::Result<()> {
        self.bank.write(pin, level)?;
        let previous = self.lit.lock().insert(pin, level);
        if previous != Some(level) {
            let label = self.labels.get(&pin).map_or("led", String::as_str);
            tracing::info!("{} ({}) {}", label, pin, if level { "on" } else { "off" });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleIo")
            .field("outputs", &self.labels.len())
            .finish_non_exhaustive()
    }
}

/// Read keys from stdin and tap the bound buttons
///
/// Each key is held for `hold`, which must outlast one input poll period.
pub fn spawn_keyboard(
    io: Arc<ConsoleIo>,
    bindings: Vec<InputBinding>,
    hold: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let keymap: BTreeMap<char, InputBinding> = bindings
            .into_iter()
            .map(|binding| (key_for(binding.action), binding))
            .collect();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    for key in line.chars().filter(|c| !c.is_whitespace()) {
                        match keymap.get(&key) {
                            Some(binding) => {
                                tracing::debug!("Key {} -> {}", key, binding.action);
                                io.tap(binding, hold).await;
                            }
                            None => tracing::warn!("Unbound key {:?}", key),
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("Console input closed");
                    return;
                }
                Err(e) => {
                    tracing::error!("Failed to read console input: {}", e);
                    return;
                }
            }
        }
    })
}

mod engine;
mod pin;
mod playback_state;

pub use engine::{EngineStatus, ENDED_POSITION};
pub use pin::{ActiveLevel, Pin, Pull};
pub use playback_state::RepeatMode;

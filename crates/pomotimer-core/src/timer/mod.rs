mod countdown;
mod engine;
mod guard;
mod session;
mod ticker;

pub use countdown::{Countdown, Tick};
pub use engine::{SessionMachine, LONG_BREAK_INTERVAL};
pub use guard::CompletionGuard;
pub use session::{PresetConfig, SessionType, MAX_PRESET_MINUTES, MIN_PRESET_MINUTES};
pub use ticker::{TickSignal, Ticker, TICK_PERIOD};

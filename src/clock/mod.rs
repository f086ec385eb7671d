//! Clock module: virtual-time primitives for animation.
//!
//! - [`TimerQueue`]: owned, cancellable one-shot timers
//! - [`RevealClock`]: per-grapheme reveal timing

mod reveal;
mod timer;

pub use reveal::{RevealClock, DEFAULT_MS_PER_GRAPHEME};
pub use timer::{TimerId, TimerQueue};

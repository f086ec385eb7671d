//! Session configuration.

use crate::prompt::DEFAULT_BLINK_INTERVAL;
use crate::render::Palette;
use std::time::Duration;

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the input thread waits for an event before re-checking shutdown.
    pub input_poll_timeout: Duration,
    /// Longest the loop sleeps when no timer is pending.
    pub idle_wait: Duration,
    /// Caret blink half-period. Zero gives a steady caret.
    pub blink_interval: Duration,
    /// Label drawn before the input line.
    pub prompt_label: String,
    /// Whether to use the alternate screen buffer.
    pub alternate_screen: bool,
    /// Colours.
    pub palette: Palette,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_poll_timeout: Duration::from_millis(10),
            idle_wait: Duration::from_millis(250),
            blink_interval: DEFAULT_BLINK_INTERVAL,
            prompt_label: String::from("$ "),
            alternate_screen: true,
            palette: Palette::default(),
        }
    }
}

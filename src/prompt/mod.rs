//! Prompt module: the command line under the transcript.
//!
//! - [`TextInput`]: host widget owning the text and native selection
//! - [`CaretTracker`]: mirrors selection and focus from the widget
//! - [`segment`]: splits the line into plain and highlighted runs
//! - [`Prompt`]: ties them together and drives the caret blink

mod caret;
mod input;
mod segment;

pub use caret::{CaretTracker, SelectionState};
pub use input::{InputNotice, TextInput};
pub use segment::{reconstruct, segment, Segment, CARET_PADDING};

use crate::actor::{InputEvent, KeyCode};
use crate::clock::TimerQueue;
use std::time::Duration;
use tracing::debug;

/// Default caret blink half-period.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// How highlighted segments should be painted right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaretMode {
    /// Focused, blink phase on: filled highlight.
    Solid,
    /// Focused, blink phase off: paint as plain text.
    Hidden,
    /// Unfocused: outlined highlight, never blinks.
    Outline,
}

/// Result of feeding an event to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// The event was not for the prompt.
    Ignored,
    /// Text, selection or focus changed.
    Changed,
    /// Enter was pressed; the line was taken from the input.
    Submitted(String),
}

/// Input line with a blinking block caret.
#[derive(Debug)]
pub struct Prompt {
    input: TextInput,
    tracker: CaretTracker,
    /// Blink half-period; zero disables blinking.
    blink_interval: Duration,
    blink_on: bool,
    blink_timers: TimerQueue<()>,
}

impl Prompt {
    /// Create an empty, focused prompt whose caret blinks every `blink_interval`.
    pub fn new(blink_interval: Duration, now: Duration) -> Self {
        let mut input = TextInput::new();
        let tracker = CaretTracker::attach(&mut input);
        let mut prompt = Self {
            input,
            tracker,
            blink_interval,
            blink_on: true,
            blink_timers: TimerQueue::new(),
        };
        prompt.restart_blink(now);
        prompt
    }

    /// The host input widget.
    pub const fn input(&self) -> &TextInput {
        &self.input
    }

    /// Current selection and focus.
    pub const fn selection(&self) -> SelectionState {
        self.tracker.state()
    }

    /// Current line text.
    pub fn text(&self) -> &str {
        self.input.content()
    }

    /// Segments of the current line.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        self.tracker.segments(self.input.content())
    }

    /// How the caret should be painted.
    pub const fn caret_mode(&self) -> CaretMode {
        match (self.tracker.state().focused, self.blink_on) {
            (false, _) => CaretMode::Outline,
            (true, true) => CaretMode::Solid,
            (true, false) => CaretMode::Hidden,
        }
    }

    /// Feed an input event at virtual time `now`.
    pub fn handle_input(&mut self, event: &InputEvent, now: Duration) -> PromptAction {
        if let InputEvent::Key {
            code: KeyCode::Enter,
            ..
        } = event
        {
            if !self.input.is_focused() {
                return PromptAction::Ignored;
            }
            let command = self.input.take_content();
            debug!(%command, "command submitted");
            self.sync(now);
            return PromptAction::Submitted(command);
        }

        if !self.input.handle_input(event) {
            return PromptAction::Ignored;
        }
        self.sync(now);
        PromptAction::Changed
    }

    /// Set focus directly, as a window focus change would.
    pub fn set_focused(&mut self, focused: bool, now: Duration) {
        self.input.set_focused(focused);
        self.sync(now);
    }

    /// Process blink timers due at `now`. Returns `true` if the caret toggled.
    pub fn advance(&mut self, now: Duration) -> bool {
        let mut toggled = false;
        while let Some((at, ())) = self.blink_timers.pop_due(now) {
            self.blink_on = !self.blink_on;
            self.blink_timers.schedule(at + self.blink_interval, ());
            toggled = !toggled;
        }
        toggled
    }

    /// Earliest pending blink toggle.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.blink_timers.next_due()
    }

    /// Stop blinking and stop listening to the widget.
    pub fn teardown(&mut self) {
        self.blink_timers.clear();
        self.tracker.detach();
    }

    /// Pull widget notices into the tracker; any change shows the caret.
    fn sync(&mut self, now: Duration) {
        if self.tracker.sync() {
            self.restart_blink(now);
        }
    }

    fn restart_blink(&mut self, now: Duration) {
        self.blink_on = true;
        self.blink_timers.clear();
        if self.tracker.state().focused && !self.blink_interval.is_zero() {
            self.blink_timers.schedule(now + self.blink_interval, ());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn type_str(prompt: &mut Prompt, text: &str, now: Duration) {
        for c in text.chars() {
            prompt.handle_input(&InputEvent::key(KeyCode::Char(c)), now);
        }
    }

    #[test]
    fn test_segments_follow_typing() {
        let mut prompt = Prompt::new(DEFAULT_BLINK_INTERVAL, Duration::ZERO);
        assert_eq!(prompt.segments(), [Segment::padding()]);

        type_str(&mut prompt, "hello", ms(10));
        assert_eq!(prompt.segments(), [Segment::plain("hello"), Segment::padding()]);

        prompt.handle_input(&InputEvent::key(KeyCode::Home), ms(20));
        assert_eq!(
            prompt.segments(),
            [Segment::highlighted("h"), Segment::plain("ello")]
        );
    }

    #[test]
    fn test_submit_takes_line() {
        let mut prompt = Prompt::new(DEFAULT_BLINK_INTERVAL, Duration::ZERO);
        type_str(&mut prompt, "ls -la", ms(10));

        let action = prompt.handle_input(&InputEvent::key(KeyCode::Enter), ms(20));
        assert_eq!(action, PromptAction::Submitted("ls -la".to_string()));
        assert_eq!(prompt.text(), "");
        assert_eq!(prompt.selection().start, 0);
    }

    #[test]
    fn test_blink_cycle_and_reset() {
        let mut prompt = Prompt::new(ms(500), Duration::ZERO);
        assert_eq!(prompt.caret_mode(), CaretMode::Solid);

        assert!(prompt.advance(ms(500)));
        assert_eq!(prompt.caret_mode(), CaretMode::Hidden);
        assert!(prompt.advance(ms(1000)));
        assert_eq!(prompt.caret_mode(), CaretMode::Solid);
        assert!(prompt.advance(ms(1500)));
        assert_eq!(prompt.caret_mode(), CaretMode::Hidden);

        // Typing shows the caret and restarts the period.
        type_str(&mut prompt, "x", ms(1600));
        assert_eq!(prompt.caret_mode(), CaretMode::Solid);
        assert_eq!(prompt.next_deadline(), Some(ms(2100)));
    }

    #[test]
    fn test_unfocused_caret_is_steady_outline() {
        let mut prompt = Prompt::new(ms(500), Duration::ZERO);
        prompt.set_focused(false, ms(100));
        assert_eq!(prompt.caret_mode(), CaretMode::Outline);
        assert_eq!(prompt.next_deadline(), None);
        assert!(!prompt.advance(ms(5000)));

        prompt.handle_input(&InputEvent::FocusGained, ms(6000));
        assert_eq!(prompt.caret_mode(), CaretMode::Solid);
        assert_eq!(prompt.next_deadline(), Some(ms(6500)));
    }

    #[test]
    fn test_zero_interval_never_blinks() {
        let prompt = Prompt::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(prompt.next_deadline(), None);
        assert_eq!(prompt.caret_mode(), CaretMode::Solid);
    }

    #[test]
    fn test_teardown_stops_tracking() {
        let mut prompt = Prompt::new(ms(500), Duration::ZERO);
        prompt.teardown();
        assert_eq!(prompt.next_deadline(), None);
        prompt.handle_input(&InputEvent::FocusLost, ms(10));
        assert!(prompt.selection().focused);
    }
}

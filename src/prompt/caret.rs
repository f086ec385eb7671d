//! Caret Tracker: mirrors the input widget's selection and focus.

use super::input::{InputNotice, TextInput};
use super::segment::{segment, Segment};
use crossbeam_channel::Receiver;
use tracing::trace;

/// Selection range and focus of the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    /// Selection start (grapheme index).
    pub start: usize,
    /// Selection end (grapheme index).
    pub end: usize,
    /// Whether the input has focus.
    pub focused: bool,
}

impl SelectionState {
    /// Check if the selection is a bare caret.
    pub const fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Tracks [`SelectionState`] from a widget's change notices.
///
/// The tracker trusts the bounds it is given; [`segment`] clamps them when
/// they are stale relative to the text.
#[derive(Debug)]
pub struct CaretTracker {
    state: SelectionState,
    /// Subscription to the widget; `None` once detached.
    notices: Option<Receiver<InputNotice>>,
}

impl CaretTracker {
    /// Create a tracker not attached to any widget.
    pub const fn new(state: SelectionState) -> Self {
        Self {
            state,
            notices: None,
        }
    }

    /// Subscribe to `input` and take its current selection and focus.
    pub fn attach(input: &mut TextInput) -> Self {
        let (start, end) = input.selection();
        Self {
            state: SelectionState {
                start,
                end,
                focused: input.is_focused(),
            },
            notices: Some(input.subscribe()),
        }
    }

    /// Drop the subscription. The tracker never changes state again.
    pub fn detach(&mut self) {
        self.notices = None;
    }

    /// Check if still subscribed to a widget.
    pub const fn is_attached(&self) -> bool {
        self.notices.is_some()
    }

    /// Drain pending notices. Returns `true` if the state changed.
    pub fn sync(&mut self) -> bool {
        let Some(notices) = &self.notices else {
            return false;
        };
        let pending: Vec<InputNotice> = notices.try_iter().collect();

        let before = self.state;
        for notice in pending {
            self.apply(notice);
        }
        self.state != before
    }

    /// Apply one notice.
    ///
    /// Missing selection bounds default to 0. Both bounds are replaced
    /// together.
    pub fn apply(&mut self, notice: InputNotice) {
        match notice {
            InputNotice::Selection { start, end } => {
                let start = start.unwrap_or(0);
                let end = end.unwrap_or(0);
                trace!(start, end, "selection changed");
                self.state = SelectionState {
                    start,
                    end,
                    ..self.state
                };
            }
            InputNotice::Focus(focused) => {
                trace!(focused, "focus changed");
                self.state.focused = focused;
            }
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    /// Segments of `text` under the current selection.
    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        segment(text, self.state.start, self.state.end)
    }
}

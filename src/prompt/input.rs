//! Text Input: the host single-line input widget.
//!
//! The widget owns the command text and its native selection (an anchor and
//! an extent, both grapheme indices). It does not paint anything itself.
//! Selection and focus changes are published to subscribers, which is how a
//! [`CaretTracker`](super::CaretTracker) learns about them.

use crate::actor::{InputEvent, KeyCode};
use crossbeam_channel::{unbounded, Receiver, Sender};
use unicode_segmentation::UnicodeSegmentation;

/// Change notices published by [`TextInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputNotice {
    /// The selection changed. Bounds are ordered grapheme indices; `None`
    /// when the widget cannot report a selection.
    Selection {
        /// Selection start.
        start: Option<usize>,
        /// Selection end.
        end: Option<usize>,
    },
    /// The widget gained or lost focus.
    Focus(bool),
}

/// A single-line text input with a native selection.
#[derive(Debug)]
pub struct TextInput {
    /// Current text content.
    content: String,
    /// Fixed end of the selection.
    anchor: usize,
    /// Moving end of the selection (the caret).
    extent: usize,
    /// Whether this widget has focus.
    focused: bool,
    /// Notice subscribers; disconnected ones are pruned on publish.
    subscribers: Vec<Sender<InputNotice>>,
}

impl TextInput {
    /// Create an empty, focused input.
    pub const fn new() -> Self {
        Self {
            content: String::new(),
            anchor: 0,
            extent: 0,
            focused: true,
            subscribers: Vec::new(),
        }
    }

    /// Get the current text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content in graphemes.
    pub fn len(&self) -> usize {
        self.content.graphemes(true).count()
    }

    /// Check if the input is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Ordered selection bounds.
    pub fn selection(&self) -> (usize, usize) {
        (self.anchor.min(self.extent), self.anchor.max(self.extent))
    }

    /// Check if focused.
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Register for selection and focus notices.
    ///
    /// Dropping the receiver unregisters it.
    pub fn subscribe(&mut self) -> Receiver<InputNotice> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Set the content, moving the caret to the end.
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        let end = self.len();
        self.select(end, end);
    }

    /// Clear the content and return what it held.
    pub fn take_content(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.select(0, 0);
        content
    }

    /// Set focus state.
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            self.focused = focused;
            self.publish(InputNotice::Focus(focused));
        }
    }

    /// Set the selection. Bounds are clamped to the content.
    pub fn select(&mut self, anchor: usize, extent: usize) {
        let len = self.len();
        self.anchor = anchor.min(len);
        self.extent = extent.min(len);
        let (start, end) = self.selection();
        self.publish(InputNotice::Selection {
            start: Some(start),
            end: Some(end),
        });
    }

    /// Handle an input event.
    ///
    /// Returns `true` if the event was consumed. Enter is not consumed; it
    /// belongs to whoever handles submitted commands.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::FocusGained => {
                self.set_focused(true);
                true
            }
            InputEvent::FocusLost => {
                self.set_focused(false);
                true
            }
            InputEvent::Paste(text) if self.focused => {
                self.insert(&single_line(text));
                true
            }
            InputEvent::Key { code, modifiers } if self.focused => {
                let extend = modifiers.shift;
                match code {
                    KeyCode::Char(c) if !modifiers.control && !modifiers.alt => {
                        self.insert(c.encode_utf8(&mut [0; 4]));
                    }
                    KeyCode::Char('a') if modifiers.control => self.select(0, self.len()),
                    KeyCode::Backspace => self.backspace(),
                    KeyCode::Delete => self.delete(),
                    KeyCode::Left => self.move_caret(self.extent.saturating_sub(1), extend),
                    KeyCode::Right => self.move_caret(self.extent + 1, extend),
                    KeyCode::Home => self.move_caret(0, extend),
                    KeyCode::End => self.move_caret(self.len(), extend),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    /// Byte offset of a grapheme index.
    fn byte_offset(&self, index: usize) -> usize {
        self.content
            .grapheme_indices(true)
            .nth(index)
            .map_or(self.content.len(), |(offset, _)| offset)
    }

    /// Replace the selection with `text`.
    fn insert(&mut self, text: &str) {
        let (start, end) = self.selection();
        let range = self.byte_offset(start)..self.byte_offset(end);
        let before = self.len();
        self.content.replace_range(range, text);
        // Graphemes can merge with their neighbours, so measure the result.
        let caret = (end + self.len()).saturating_sub(before);
        self.select(caret, caret);
    }

    /// Delete the selection, or the grapheme before the caret.
    fn backspace(&mut self) {
        let (start, end) = self.selection();
        if start != end {
            self.remove(start, end);
        } else if start > 0 {
            self.remove(start - 1, start);
        }
    }

    /// Delete the selection, or the grapheme under the caret.
    fn delete(&mut self) {
        let (start, end) = self.selection();
        if start != end {
            self.remove(start, end);
        } else if start < self.len() {
            self.remove(start, start + 1);
        }
    }

    fn remove(&mut self, start: usize, end: usize) {
        let range = self.byte_offset(start)..self.byte_offset(end);
        self.content.replace_range(range, "");
        self.select(start, start);
    }

    /// Move the caret, extending the selection or collapsing it.
    fn move_caret(&mut self, to: usize, extend: bool) {
        let (start, end) = self.selection();
        let to = match (extend, start == end) {
            (true, _) | (false, true) => to,
            // Collapsing a range lands on the side being moved towards.
            (false, false) if to < self.extent => start,
            (false, false) => end,
        };
        let anchor = if extend { self.anchor } else { to };
        self.select(anchor, to);
    }

    fn publish(&mut self, notice: InputNotice) {
        self.subscribers.retain(|tx| tx.send(notice).is_ok());
    }
}

/// Strip line breaks and other control characters from pasted text.
fn single_line(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

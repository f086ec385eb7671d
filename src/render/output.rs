//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.

use super::line::Line;
use super::style::{Modifiers, Rgb, Style};
use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// A whole frame is accumulated here, then flushed in a single `write()`
/// so the terminal never shows a half-painted transcript.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check if buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move cursor to (x, y) position (1-indexed for ANSI).
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        let _ = write!(self.data, "\x1b[{};{}H", y + 1, x + 1);
    }

    /// Clear from the cursor to the end of the line.
    #[inline]
    pub fn clear_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Set foreground color (true color).
    #[inline]
    pub fn set_fg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Set background color (true color).
    #[inline]
    pub fn set_bg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Apply a span style from a clean attribute state.
    pub fn set_style(&mut self, style: Style) {
        self.reset_attrs();
        if let Some(fg) = style.fg {
            self.set_fg(fg);
        }
        if let Some(bg) = style.bg {
            self.set_bg(bg);
        }
        for (modifier, code) in [
            (Modifiers::BOLD, "1"),
            (Modifiers::DIM, "2"),
            (Modifiers::UNDERLINE, "4"),
            (Modifiers::REVERSED, "7"),
        ] {
            if style.modifiers.contains(modifier) {
                let _ = write!(self.data, "\x1b[{code}m");
            }
        }
    }

    /// Write a styled line at the cursor, leaving attributes reset.
    pub fn write_line(&mut self, line: &Line) {
        for span in &line.spans {
            self.set_style(span.style);
            self.write_str(&span.text);
        }
        self.reset_attrs();
    }

    /// Paint `rows` top to bottom starting at row `top`, clearing each row first.
    pub fn paint_rows(&mut self, top: u16, rows: &[Line]) {
        for (row, line) in (top..).zip(rows) {
            self.cursor_move(0, row);
            self.clear_line();
            self.write_line(line);
        }
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

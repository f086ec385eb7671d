//! Styled lines: what the terminal painter draws.
//!
//! Output frames and prompt segments are turned into [`Line`]s here. Widths
//! are measured in terminal columns with `unicode-width`.

use super::style::{Palette, Style};
use crate::output::{OutputFrame, TYPING_GLYPH};
use crate::prompt::{CaretMode, Segment};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Gutter drawn left of a finished block.
const GUTTER_DONE: &str = "▎ ";
/// Gutter drawn left of a block still animating.
const GUTTER_PENDING: &str = "  ";

/// A run of text in one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Text of the run.
    pub text: String,
    /// Style of the run.
    pub style: Style,
}

impl Span {
    /// Create a span.
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        UnicodeWidthStr::width(self.text.as_str())
    }
}

/// One terminal row of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// Spans, left to right.
    pub spans: Vec<Span>,
}

impl Line {
    /// Create an empty line.
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Append a span, skipping empty text.
    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span { text, style });
        }
    }

    /// Display width in columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Plain text of the line, without styles.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Cut the line to at most `width` columns, never splitting a grapheme.
    pub fn truncate(&mut self, width: usize) {
        let mut used = 0;
        let mut keep = 0;
        for span in &mut self.spans {
            if used >= width {
                break;
            }
            keep += 1;
            let span_width = span.width();
            if used + span_width <= width {
                used += span_width;
                continue;
            }

            let mut end = 0;
            for (offset, grapheme) in span.text.grapheme_indices(true) {
                let w = UnicodeWidthStr::width(grapheme);
                if used + w > width {
                    break;
                }
                used += w;
                end = offset + grapheme.len();
            }
            span.text.truncate(end);
            break;
        }
        self.spans.truncate(keep);
        self.spans.retain(|span| !span.text.is_empty());
    }

    /// Drop the first `columns` columns, never splitting a grapheme.
    ///
    /// A wide grapheme straddling the cut is dropped whole.
    pub fn skip_columns(&mut self, columns: usize) {
        let mut skipped = 0;
        for span in &mut self.spans {
            if skipped >= columns {
                break;
            }
            let mut cut = span.text.len();
            for (offset, grapheme) in span.text.grapheme_indices(true) {
                if skipped >= columns {
                    cut = offset;
                    break;
                }
                skipped += UnicodeWidthStr::width(grapheme);
            }
            span.text.drain(..cut);
        }
        self.spans.retain(|span| !span.text.is_empty());
    }

    /// Break the line into rows of at most `width` columns.
    pub fn wrap(&self, width: usize) -> Vec<Self> {
        self.wrap_first(width, width)
    }

    /// Like [`Line::wrap`], with a narrower (or wider) first row.
    ///
    /// Breaks fall between graphemes. A grapheme wider than a whole row still
    /// gets a row of its own. Always returns at least one row.
    pub fn wrap_first(&self, first: usize, rest: usize) -> Vec<Self> {
        let mut rows = Vec::new();
        let mut row = Self::new();
        let mut limit = first;
        let mut used = 0;

        for span in &self.spans {
            let mut piece = String::new();
            for grapheme in span.text.graphemes(true) {
                let w = UnicodeWidthStr::width(grapheme);
                if used > 0 && used + w > limit {
                    row.push(std::mem::take(&mut piece), span.style);
                    rows.push(std::mem::take(&mut row));
                    limit = rest;
                    used = 0;
                }
                piece.push_str(grapheme);
                used += w;
            }
            row.push(piece, span.style);
        }
        rows.push(row);
        rows
    }
}

/// Lines for one output block.
///
/// Text is split at newlines and wrapped to `width`, with the gutter on
/// every row. The first row carries the timestamp right-aligned when there
/// is room for it; the last row carries the typing glyph and the ellipsis.
pub fn output_lines(frame: &OutputFrame<'_>, palette: &Palette, width: usize) -> Vec<Line> {
    let style = palette.output(frame.theme);
    let gutter = if frame.gutter { GUTTER_DONE } else { GUTTER_PENDING };
    let text_width = width.saturating_sub(UnicodeWidthStr::width(gutter));

    // Room kept free on the first row for the timestamp, if it takes at most half.
    let reserved = frame
        .timestamp
        .map(|stamp| UnicodeWidthStr::width(stamp) + 1)
        .filter(|&needed| needed * 2 <= text_width)
        .unwrap_or(0);

    let rows: Vec<&str> = frame.revealed.split('\n').collect();
    let last = rows.len() - 1;

    let mut lines = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let mut content = Line::new();
        content.push(row, style);
        if i == last {
            if frame.typing {
                content.push(TYPING_GLYPH, style);
            }
            content.push(frame.ellipsis, style);
        }

        let first = if i == 0 { text_width - reserved } else { text_width };
        for wrapped in content.wrap_first(first, text_width) {
            let mut line = Line::new();
            line.push(gutter, palette.prompt());
            line.spans.extend(wrapped.spans);
            lines.push(line);
        }
    }

    if let (Some(stamp), Some(first)) = (frame.timestamp, lines.first_mut()) {
        let stamp_width = UnicodeWidthStr::width(stamp);
        let used = first.width();
        if used + stamp_width + 1 <= width {
            first.push(" ".repeat(width - used - stamp_width), Style::DEFAULT);
            first.push(stamp, palette.timestamp());
        }
    }

    for line in &mut lines {
        line.truncate(width);
    }
    lines
}

/// The input row: prompt label followed by the caret-highlighted segments.
///
/// When the command is wider than the screen, it scrolls left so the end
/// of the last highlighted segment stays visible. The label never scrolls.
pub fn prompt_line(
    label: &str,
    segments: &[Segment<'_>],
    caret: CaretMode,
    palette: &Palette,
    width: usize,
) -> Line {
    let mut content = Line::new();
    let mut caret_end = 0;
    for segment in segments {
        content.push(segment.content, palette.segment(segment.highlighted, caret));
        if segment.highlighted {
            caret_end = content.width();
        }
    }

    let room = width.saturating_sub(UnicodeWidthStr::width(label));
    if caret_end > room {
        content.skip_columns(caret_end - room);
    }

    let mut line = Line::new();
    line.push(label, palette.prompt());
    line.spans.extend(content.spans);
    line.truncate(width);
    line
}

//! Line segmentation for block-caret rendering.
//!
//! A terminal caret is drawn as a highlighted cell rather than a thin bar.
//! With a collapsed selection the grapheme *under* the caret is highlighted,
//! and at the end of the line a synthetic space stands in for it.

use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

/// The padding shown when the caret sits past the last grapheme.
pub const CARET_PADDING: &str = " ";

/// A run of text with a single highlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment<'a> {
    /// Text of the run.
    pub content: &'a str,
    /// Whether the run is under the caret or selection.
    pub highlighted: bool,
    /// Whether the run is padding with no backing text.
    pub synthetic: bool,
}

impl<'a> Segment<'a> {
    /// Unhighlighted text.
    pub const fn plain(content: &'a str) -> Self {
        Self {
            content,
            highlighted: false,
            synthetic: false,
        }
    }

    /// Highlighted text.
    pub const fn highlighted(content: &'a str) -> Self {
        Self {
            content,
            highlighted: true,
            synthetic: false,
        }
    }

    /// The end-of-line caret cell.
    pub const fn padding() -> Segment<'static> {
        Segment {
            content: CARET_PADDING,
            highlighted: true,
            synthetic: true,
        }
    }
}

/// Split `text` into plain and highlighted runs for a selection.
///
/// `start` and `end` are grapheme indices. Out-of-range bounds are clamped
/// to the text and reversed bounds are swapped. Empty runs are omitted.
///
/// ```rust
/// use typeout::prompt::{segment, Segment};
///
/// assert_eq!(
///     segment("hello", 2, 2),
///     [Segment::plain("he"), Segment::highlighted("l"), Segment::plain("lo")],
/// );
/// assert_eq!(
///     segment("hello", 1, 4),
///     [Segment::plain("h"), Segment::highlighted("ell"), Segment::plain("o")],
/// );
/// ```
pub fn segment(text: &str, start: usize, end: usize) -> Vec<Segment<'_>> {
    let boundaries: Vec<usize> = text
        .grapheme_indices(true)
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = boundaries.len() - 1;

    let (lo, hi) = (start.min(end), start.max(end));
    let (start, end) = (lo.min(len), hi.min(len));
    if (start, end) != (lo, hi) {
        trace!(len, lo, hi, "selection clamped to text");
    }

    let byte = |index: usize| boundaries[index];
    let mut segments = Vec::with_capacity(4);

    if start == end {
        let caret_end = (start + 1).min(len);
        segments.push(Segment::plain(&text[..byte(start)]));
        segments.push(Segment::highlighted(&text[byte(start)..byte(caret_end)]));
        segments.push(Segment::plain(&text[byte(caret_end)..]));
        if start == len {
            segments.push(Segment::padding());
        }
    } else {
        segments.push(Segment::plain(&text[..byte(start)]));
        segments.push(Segment::highlighted(&text[byte(start)..byte(end)]));
        segments.push(Segment::plain(&text[byte(end)..]));
    }

    segments.retain(|segment| !segment.content.is_empty());
    segments
}

/// Rebuild the original text from segments, skipping padding.
pub fn reconstruct(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .filter(|segment| !segment.synthetic)
        .map(|segment| segment.content)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_caret_mid_text() {
        let segments = segment("hello", 2, 2);
        assert_eq!(
            segments,
            [Segment::plain("he"), Segment::highlighted("l"), Segment::plain("lo")]
        );
        assert_eq!(reconstruct(&segments), "hello");
    }

    #[test]
    fn test_collapsed_caret_at_end_pads() {
        let segments = segment("hello", 5, 5);
        assert_eq!(segments, [Segment::plain("hello"), Segment::padding()]);
        assert_eq!(segments[1].content, " ");
        assert!(segments[1].highlighted);
        assert_eq!(reconstruct(&segments), "hello");
    }

    #[test]
    fn test_collapsed_caret_at_start() {
        assert_eq!(
            segment("hello", 0, 0),
            [Segment::highlighted("h"), Segment::plain("ello")]
        );
    }

    #[test]
    fn test_collapsed_caret_on_last_grapheme() {
        assert_eq!(
            segment("hello", 4, 4),
            [Segment::plain("hell"), Segment::highlighted("o")]
        );
    }

    #[test]
    fn test_empty_text_is_just_padding() {
        assert_eq!(segment("", 0, 0), [Segment::padding()]);
    }

    #[test]
    fn test_range_selection() {
        let segments = segment("hello", 1, 4);
        assert_eq!(
            segments,
            [Segment::plain("h"), Segment::highlighted("ell"), Segment::plain("o")]
        );
        assert_eq!(reconstruct(&segments), "hello");
    }

    #[test]
    fn test_range_selection_to_end_has_no_padding() {
        assert_eq!(
            segment("hello", 3, 5),
            [Segment::plain("hel"), Segment::highlighted("lo")]
        );
        assert_eq!(segment("hello", 0, 5), [Segment::highlighted("hello")]);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        // Stale selection against shortened text.
        assert_eq!(segment("hi", 7, 7), [Segment::plain("hi"), Segment::padding()]);
        assert_eq!(segment("hello", 2, 99), [Segment::plain("he"), Segment::highlighted("llo")]);
        assert_eq!(segment("hello", 4, 1), segment("hello", 1, 4));
    }

    #[test]
    fn test_graphemes_are_one_cell() {
        let text = "ab\u{1F469}\u{200D}\u{1F4BB}c";
        let segments = segment(text, 2, 2);
        assert_eq!(segments[1], Segment::highlighted("\u{1F469}\u{200D}\u{1F4BB}"));
        assert_eq!(reconstruct(&segments), text);
    }
}

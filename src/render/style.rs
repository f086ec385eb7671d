//! Colours, text modifiers and the palette used to paint a transcript.

use crate::prompt::CaretMode;
use crate::script::Theme;
use bitflags::bitflags;

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

bitflags! {
    /// Text style modifiers.
    ///
    /// ```
    /// use typeout::render::Modifiers;
    /// let style = Modifiers::BOLD | Modifiers::UNDERLINE;
    /// assert!(style.contains(Modifiers::BOLD));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Underlined text
        const UNDERLINE = 0b0000_0100;
        /// Reversed colors (fg/bg swapped)
        const REVERSED = 0b0000_1000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Foreground, background and modifiers of a span.
///
/// `None` colours leave the terminal default in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground colour.
    pub fg: Option<Rgb>,
    /// Background colour.
    pub bg: Option<Rgb>,
    /// Modifiers.
    pub modifiers: Modifiers,
}

impl Style {
    /// Terminal default style.
    pub const DEFAULT: Self = Self {
        fg: None,
        bg: None,
        modifiers: Modifiers::empty(),
    };

    /// Style with a foreground colour.
    #[must_use]
    pub const fn fg(mut self, fg: Rgb) -> Self {
        self.fg = Some(fg);
        self
    }

    /// Style with a background colour.
    #[must_use]
    pub const fn bg(mut self, bg: Rgb) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Style with extra modifiers.
    #[must_use]
    pub fn with(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }
}

/// Colours for every element of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Default text colour.
    pub text: Rgb,
    /// Accent colour (prompt label, caret).
    pub accent: Rgb,
    /// Foreground under a filled caret.
    pub caret_text: Rgb,
    /// Dimmed text.
    pub muted: Rgb,
    /// Error text.
    pub error: Rgb,
    /// Timestamp column.
    pub timestamp: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text: Rgb::new(230, 230, 230),
            accent: Rgb::from_u32(0x7D_D3_FC),
            caret_text: Rgb::BLACK,
            muted: Rgb::new(120, 113, 108),
            error: Rgb::from_u32(0xF8_71_71),
            timestamp: Rgb::new(168, 162, 158),
        }
    }
}

impl Palette {
    /// Text style of an output block.
    pub fn output(&self, theme: Theme) -> Style {
        match theme {
            Theme::Light => Style::DEFAULT.fg(self.text),
            Theme::Dark => Style::DEFAULT.fg(self.muted),
            Theme::Primary => Style::DEFAULT.fg(self.accent),
            Theme::Error => Style::DEFAULT.fg(self.error).with(Modifiers::BOLD),
        }
    }

    /// Style of the prompt label.
    pub fn prompt(&self) -> Style {
        Style::DEFAULT.fg(self.accent)
    }

    /// Style of the timestamp column.
    pub fn timestamp(&self) -> Style {
        Style::DEFAULT.fg(self.timestamp).with(Modifiers::DIM)
    }

    /// Style of a prompt segment.
    pub fn segment(&self, highlighted: bool, caret: CaretMode) -> Style {
        if !highlighted {
            return Style::DEFAULT.fg(self.text);
        }
        match caret {
            CaretMode::Solid => Style::DEFAULT.fg(self.caret_text).bg(self.accent),
            CaretMode::Hidden => Style::DEFAULT.fg(self.text),
            CaretMode::Outline => Style::DEFAULT.fg(self.accent).with(Modifiers::UNDERLINE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_u32(0xFF_55_00), Rgb::new(255, 85, 0));
        assert_eq!(format!("{:?}", Rgb::new(1, 2, 255)), "#0102ff");
    }

    #[test]
    fn test_segment_styles_by_caret_mode() {
        let palette = Palette::default();
        let solid = palette.segment(true, CaretMode::Solid);
        assert_eq!(solid.bg, Some(palette.accent));

        let outline = palette.segment(true, CaretMode::Outline);
        assert_eq!(outline.bg, None);
        assert!(outline.modifiers.contains(Modifiers::UNDERLINE));

        assert_eq!(palette.segment(true, CaretMode::Hidden), palette.segment(false, CaretMode::Solid));
        assert_eq!(palette.segment(false, CaretMode::Outline), Style::DEFAULT.fg(palette.text));
    }
}

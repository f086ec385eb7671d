//! Transcript scripts: the block definitions an output chain plays.
//!
//! A script is authored as JSON, either a bare array of blocks or an object
//! with a `blocks` field:
//!
//! ```json
//! [
//!   { "text": "booting...", "waitAfterRounds": 2 },
//!   { "text": "ready.", "waitBefore": 300, "children": [{ "text": "$ help" }] }
//! ]
//! ```
//!
//! Field names are snake_case; the camelCase spellings above are accepted
//! as aliases.

use crate::clock::RevealClock;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Colour theme of an output block. Decoration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light text on the terminal background.
    #[default]
    Light,
    /// Dimmed text.
    Dark,
    /// Accent coloured text.
    Primary,
    /// Error coloured text.
    Error,
}

/// Configuration of a single output block.
///
/// Blocks are immutable once handed to an animator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputBlock {
    /// Text to reveal. `None` makes a pass-through block that is ready at once.
    pub text: Option<String>,
    /// Delay before the reveal starts, in milliseconds.
    #[serde(alias = "waitBefore", alias = "waitBeforeMs")]
    pub wait_before_ms: u64,
    /// Number of 1600ms rounds to hold after the reveal before the block is ready.
    #[serde(alias = "waitAfterRounds")]
    pub wait_after_rounds: u32,
    /// Total reveal time in milliseconds. Defaults to 50ms per grapheme.
    #[serde(alias = "speedInv", alias = "revealBudgetMs")]
    pub reveal_budget_ms: Option<u64>,
    /// Blocks played, in order, once this one is ready.
    #[serde(alias = "nextOutputs")]
    pub children: Vec<OutputBlock>,
    /// Colour theme.
    pub theme: Theme,
    /// Whether to show the timestamp column.
    #[serde(alias = "showTimestamp")]
    pub show_timestamp: bool,
    /// Pre-formatted timestamp label.
    pub timestamp: Option<String>,
}

impl Default for OutputBlock {
    fn default() -> Self {
        Self {
            text: None,
            wait_before_ms: 0,
            wait_after_rounds: 0,
            reveal_budget_ms: None,
            children: Vec::new(),
            theme: Theme::default(),
            show_timestamp: true,
            timestamp: None,
        }
    }
}

impl OutputBlock {
    /// Create a block revealing `text` at the default speed.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a pass-through block with no text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the delay before the reveal starts.
    #[must_use]
    pub const fn wait_before(mut self, ms: u64) -> Self {
        self.wait_before_ms = ms;
        self
    }

    /// Set the number of hold rounds after the reveal.
    #[must_use]
    pub const fn wait_after_rounds(mut self, rounds: u32) -> Self {
        self.wait_after_rounds = rounds;
        self
    }

    /// Set the total reveal budget.
    #[must_use]
    pub const fn reveal_budget(mut self, ms: u64) -> Self {
        self.reveal_budget_ms = Some(ms);
        self
    }

    /// Set the theme.
    #[must_use]
    pub const fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the timestamp label.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Append a follow-up block.
    #[must_use]
    pub fn then(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Length of the text in graphemes, or `None` for a pass-through block.
    pub fn text_len(&self) -> Option<usize> {
        self.text.as_deref().map(|text| text.graphemes(true).count())
    }

    /// Reveal timing for this block, or `None` for a pass-through block.
    pub fn reveal_clock(&self) -> Option<RevealClock> {
        let len = self.text_len()?;
        Some(match self.reveal_budget_ms {
            Some(ms) => RevealClock::new(len, Duration::from_millis(ms)),
            None => RevealClock::with_default_budget(len),
        })
    }

    /// Copy of this block without its children.
    pub fn detached(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }

    /// Flatten blocks into play order: each block, then its children,
    /// then its later siblings.
    pub fn flatten(blocks: &[Self]) -> Vec<Self> {
        fn visit(block: &OutputBlock, out: &mut Vec<OutputBlock>) {
            out.push(block.detached());
            for child in &block.children {
                visit(child, out);
            }
        }

        let mut out = Vec::new();
        for block in blocks {
            visit(block, &mut out);
        }
        out
    }
}

/// A transcript script: the top-level list of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Top-level blocks, played in order.
    pub blocks: Vec<OutputBlock>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptRepr {
    List(Vec<OutputBlock>),
    Object { blocks: Vec<OutputBlock> },
}

impl Script {
    /// Create a script from blocks.
    pub const fn new(blocks: Vec<OutputBlock>) -> Self {
        Self { blocks }
    }

    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let blocks = match serde_json::from_str::<ScriptRepr>(json)? {
            ScriptRepr::List(blocks) | ScriptRepr::Object { blocks } => blocks,
        };
        tracing::debug!(blocks = blocks.len(), "parsed transcript script");
        Ok(Self { blocks })
    }

    /// Read and parse a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Blocks in play order.
    pub fn play_order(&self) -> Vec<OutputBlock> {
        OutputBlock::flatten(&self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_aliases() {
        let script = Script::from_json(
            r#"[
                { "text": "boot", "waitBefore": 100, "waitAfterRounds": 2, "speedInv": 400 },
                { "theme": "error", "showTimestamp": false }
            ]"#,
        )
        .unwrap();

        assert_eq!(script.blocks.len(), 2);
        let boot = &script.blocks[0];
        assert_eq!(boot.text.as_deref(), Some("boot"));
        assert_eq!(boot.wait_before_ms, 100);
        assert_eq!(boot.wait_after_rounds, 2);
        assert_eq!(boot.reveal_budget_ms, Some(400));
        assert!(boot.show_timestamp);

        let empty = &script.blocks[1];
        assert_eq!(empty.text, None);
        assert_eq!(empty.theme, Theme::Error);
        assert!(!empty.show_timestamp);
    }

    #[test]
    fn test_parse_object_form() {
        let script =
            Script::from_json(r#"{ "blocks": [{ "text": "a", "children": [{ "text": "b" }] }] }"#)
                .unwrap();
        assert_eq!(script.blocks[0].children[0].text.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_error() {
        assert!(Script::from_json("{ not json").is_err());
    }

    #[test]
    fn test_flatten_pre_order() {
        let blocks = vec![
            OutputBlock::text("a")
                .then(OutputBlock::text("a1").then(OutputBlock::text("a1x")))
                .then(OutputBlock::text("a2")),
            OutputBlock::text("b"),
        ];

        let order: Vec<_> = OutputBlock::flatten(&blocks)
            .into_iter()
            .map(|block| block.text.unwrap())
            .collect();
        assert_eq!(order, ["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn test_text_len_counts_graphemes() {
        assert_eq!(OutputBlock::text("héllo").text_len(), Some(5));
        assert_eq!(OutputBlock::text("👨‍👩‍👧").text_len(), Some(1));
        assert_eq!(OutputBlock::empty().text_len(), None);
    }

    #[test]
    fn test_reveal_clock_budget() {
        let block = OutputBlock::text("abcd");
        assert_eq!(block.reveal_clock().unwrap().budget(), Duration::from_millis(200));

        let block = block.reveal_budget(1000);
        assert_eq!(block.reveal_clock().unwrap().budget(), Duration::from_millis(1000));
        assert!(OutputBlock::empty().reveal_clock().is_none());
    }
}

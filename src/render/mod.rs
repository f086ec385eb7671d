//! Render module: turns transcript state into terminal output.
//!
//! - [`Palette`], [`Style`], [`Rgb`], [`Modifiers`]: colours and attributes
//! - [`Line`], [`Span`]: styled rows built from frames and segments
//! - [`OutputBuffer`]: single-write ANSI output

mod line;
mod output;
mod style;

pub use line::{output_lines, prompt_line, Line, Span};
pub use output::OutputBuffer;
pub use style::{Modifiers, Palette, Rgb, Style};

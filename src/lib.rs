//! # Typeout
//!
//! A typewriter transcript for terminal UIs.
//!
//! Output blocks are revealed one grapheme at a time on a virtual clock,
//! optionally hold with a loading ellipsis, then hand over to the next block.
//! Below the transcript sits a command prompt whose block caret mirrors the
//! native selection of the input widget.
//!
//! ## Core Concepts
//!
//! - **Virtual time**: animators are advanced with a `Duration` from an
//!   origin the host chooses, so playback is deterministic under test
//! - **Owned timers**: every animator owns its [`clock::TimerQueue`];
//!   dropping or clearing it is the cancellation
//! - **Sequential chains**: block `i + 1` starts at the instant block `i`
//!   became ready
//! - **Caret segments**: the prompt line is split into plain and highlighted
//!   runs around the selection
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use typeout::{segment, OutputAnimator, OutputBlock, Phase, Segment};
//!
//! let mut animator = OutputAnimator::new(OutputBlock::text("hello").reveal_budget(500));
//! animator.start(Duration::ZERO);
//! animator.advance(Duration::from_millis(500));
//! assert_eq!(animator.phase(), Phase::Ready);
//!
//! assert_eq!(
//!     segment("hello", 1, 3),
//!     [Segment::plain("h"), Segment::highlighted("el"), Segment::plain("lo")]
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod clock;
pub mod config;
pub mod error;
pub mod output;
pub mod prompt;
pub mod render;
pub mod script;
pub mod session;

// Re-exports for convenience
pub use actor::{InputEvent, KeyCode, KeyModifiers};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use output::{OutputAnimator, OutputChain, OutputFrame, Phase};
pub use prompt::{segment, CaretMode, CaretTracker, Prompt, Segment, SelectionState, TextInput};
pub use render::{Palette, Rgb};
pub use script::{OutputBlock, Script, Theme};
pub use session::{CommandHandler, Flow, Session, Transcript};

//! Output module: typewriter reveal of transcript blocks.
//!
//! - [`OutputAnimator`]: reveal / hold / ready state machine for one block
//! - [`OutputChain`]: plays blocks strictly in sequence
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use typeout::{OutputBlock, OutputChain};
//!
//! let blocks = [
//!     OutputBlock::text("connecting").wait_after_rounds(1),
//!     OutputBlock::text("connected."),
//! ];
//! let mut chain = OutputChain::new(&blocks);
//! chain.start(Duration::ZERO);
//! chain.advance(Duration::from_secs(10));
//! assert!(chain.is_finished());
//! ```

mod animator;
mod chain;

pub use animator::{
    AnimationState, OutputAnimator, OutputFrame, Phase, DOT_INTERVAL, HOLD_ROUND, TYPING_GLYPH,
};
pub use chain::OutputChain;

//! Actor Model: terminal input on its own thread.
//!
//! Crossterm's event reader blocks, so it runs in the input actor and the
//! session loop receives converted events over a crossbeam channel. The
//! loop owns all transcript state; the actor owns none.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     InputEvent      ┌──────────────┐
//! │ Input Thread │ ─────────────────▶  │ Session Loop │
//! └──────────────┘                     └──────────────┘
//! ```

mod input;
mod messages;

pub use input::{convert_event, InputActor};
pub use messages::{InputEvent, KeyCode, KeyModifiers};

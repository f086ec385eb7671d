//! Output Animator: typewriter reveal state machine for one block.
//!
//! # Lifecycle
//!
//! ```text
//!  Idle ──wait_before──▶ Revealing ──last grapheme──┬──────────────▶ Ready
//!   │                                               │ rounds > 0
//!   │ no text                                       ▼
//!   └──────────────▶ Ready        HoldingAfterReveal ──rounds × 1600ms──▶ Ready
//! ```
//!
//! The animator owns every timer it schedules. The host calls
//! [`OutputAnimator::advance`] with the current virtual time and all due
//! timers are processed in order. [`OutputAnimator::teardown`] and
//! [`OutputAnimator::reconfigure`] drop the pending timers synchronously, so
//! a replaced or destroyed configuration can never touch state again.

use crate::clock::{RevealClock, TimerQueue};
use crate::script::{OutputBlock, Theme};
use std::time::Duration;
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

/// Period of the loading-dots indicator.
pub const DOT_INTERVAL: Duration = Duration::from_millis(400);

/// Length of one post-reveal hold round (four dot cycles).
pub const HOLD_ROUND: Duration = Duration::from_millis(1600);

/// Glyph shown after the revealed prefix while still typing.
pub const TYPING_GLYPH: char = '█';

const ELLIPSIS: &str = "...";

/// Animation phase of an output block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Waiting to start, or waiting out `wait_before`.
    #[default]
    Idle,
    /// Revealing one grapheme per tick.
    Revealing,
    /// Fully revealed, holding before signalling ready.
    HoldingAfterReveal,
    /// Done. Chained blocks may start.
    Ready,
}

/// Mutable animation state of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationState {
    /// Graphemes revealed so far.
    pub revealed: usize,
    /// Current phase.
    pub phase: Phase,
    /// Loading-dots position, `0..=3`.
    pub dot_phase: u8,
}

/// Internal timer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    BeginReveal,
    RevealTick,
    DotTick,
    HoldElapsed,
}

/// What a renderer should paint for a block right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFrame<'a> {
    /// Revealed prefix of the text.
    pub revealed: &'a str,
    /// Whether the typing glyph follows the prefix.
    pub typing: bool,
    /// Loading indicator, `""` to `"..."`.
    pub ellipsis: &'static str,
    /// Block theme.
    pub theme: Theme,
    /// Timestamp label, if shown.
    pub timestamp: Option<&'a str>,
    /// Whether the block is ready.
    pub ready: bool,
    /// Whether to draw the finished-block gutter (ready with timestamps on).
    pub gutter: bool,
}

/// Drives the reveal of a single [`OutputBlock`].
#[derive(Debug, Clone)]
pub struct OutputAnimator {
    /// Block configuration.
    block: OutputBlock,
    /// Byte offset of the end of each grapheme.
    boundaries: Vec<usize>,
    /// Reveal timing; `None` for a pass-through block.
    clock: Option<RevealClock>,
    /// Current state.
    state: AnimationState,
    /// Pending timers.
    timers: TimerQueue<Signal>,
    /// Virtual time the reveal began.
    reveal_origin: Duration,
    /// Virtual time the block became ready.
    ready_at: Option<Duration>,
    /// Whether readiness was reported to the owner.
    ready_reported: bool,
    /// Whether `start` was called.
    started: bool,
    /// Set by `teardown`; the instance is inert afterwards.
    torn_down: bool,
}

impl OutputAnimator {
    /// Create an animator for `block`.
    ///
    /// A block without text is ready immediately.
    pub fn new(block: OutputBlock) -> Self {
        let boundaries = block
            .text
            .as_deref()
            .map(|text| {
                text.grapheme_indices(true)
                    .map(|(start, grapheme)| start + grapheme.len())
                    .collect()
            })
            .unwrap_or_default();
        let clock = block.reveal_clock();
        let phase = if clock.is_none() { Phase::Ready } else { Phase::Idle };

        Self {
            block,
            boundaries,
            clock,
            state: AnimationState {
                phase,
                ..AnimationState::default()
            },
            timers: TimerQueue::new(),
            reveal_origin: Duration::ZERO,
            ready_at: None,
            ready_reported: false,
            started: false,
            torn_down: false,
        }
    }

    /// Start the animation at virtual time `now`.
    ///
    /// Calling `start` twice, or after teardown, does nothing.
    pub fn start(&mut self, now: Duration) {
        if self.started || self.torn_down {
            return;
        }
        self.started = true;

        if self.clock.is_none() {
            debug!("pass-through block ready");
            self.ready_at = Some(now);
            return;
        }

        let begin = now.saturating_add(Duration::from_millis(self.block.wait_before_ms));
        self.timers.schedule(begin, Signal::BeginReveal);
    }

    /// Process every timer due at or before `now`.
    ///
    /// Returns the virtual time the block became ready, exactly once.
    pub fn advance(&mut self, now: Duration) -> Option<Duration> {
        if self.torn_down {
            return None;
        }

        while let Some((at, signal)) = self.timers.pop_due(now) {
            self.handle(at, signal);
        }

        if self.ready_reported {
            return None;
        }
        let at = self.ready_at?;
        self.ready_reported = true;
        Some(at)
    }

    /// Replace the configuration.
    ///
    /// A different block cancels every pending timer and restarts from idle
    /// at `now` if the old configuration had been started. An identical block
    /// is a no-op.
    pub fn reconfigure(&mut self, block: OutputBlock, now: Duration) {
        if self.torn_down || block == self.block {
            return;
        }
        let dropped = self.timers.clear();
        debug!(dropped, "reconfiguring output animator");

        let was_started = self.started;
        *self = Self::new(block);
        if was_started {
            self.start(now);
        }
    }

    /// Cancel all timers. The animator never changes state again.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let dropped = self.timers.clear();
        trace!(dropped, "output animator torn down");
        self.torn_down = true;
    }

    /// Earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.torn_down {
            return None;
        }
        self.timers.next_due()
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> AnimationState {
        self.state
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Check if the block reached its terminal phase.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state.phase == Phase::Ready
    }

    /// Check if the animator was torn down.
    #[inline]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// The block being animated.
    #[inline]
    pub const fn block(&self) -> &OutputBlock {
        &self.block
    }

    /// Paintable snapshot, or `None` for a pass-through block.
    pub fn frame(&self) -> Option<OutputFrame<'_>> {
        let text = self.block.text.as_deref()?;
        let revealed = match self.state.revealed {
            0 => 0,
            n => self.boundaries[n - 1],
        };

        let ellipsis = if self.block.wait_after_rounds == 0 {
            ""
        } else if self.is_ready() {
            ELLIPSIS
        } else {
            &ELLIPSIS[..usize::from(self.state.dot_phase)]
        };

        Some(OutputFrame {
            revealed: &text[..revealed],
            typing: self.state.revealed < self.boundaries.len(),
            ellipsis,
            theme: self.block.theme,
            timestamp: if self.block.show_timestamp {
                self.block.timestamp.as_deref()
            } else {
                None
            },
            ready: self.is_ready(),
            gutter: self.block.show_timestamp && self.is_ready(),
        })
    }

    fn handle(&mut self, at: Duration, signal: Signal) {
        let Some(clock) = self.clock else {
            return;
        };

        match signal {
            Signal::BeginReveal => {
                debug!(len = clock.len(), budget = ?clock.budget(), "reveal started");
                self.reveal_origin = at;
                self.state.phase = Phase::Revealing;
                self.schedule_reveal_tick(clock);
            }
            Signal::RevealTick => {
                self.state.revealed = (self.state.revealed + 1).min(clock.len());
                trace!(revealed = self.state.revealed, "reveal tick");
                self.schedule_reveal_tick(clock);
            }
            Signal::DotTick => {
                if self.state.phase == Phase::HoldingAfterReveal {
                    self.state.dot_phase = (self.state.dot_phase + 1) % 4;
                    self.timers.schedule(at + DOT_INTERVAL, Signal::DotTick);
                }
            }
            Signal::HoldElapsed => self.become_ready(at),
        }
    }

    /// Schedule the next reveal tick, or finish the reveal if complete.
    fn schedule_reveal_tick(&mut self, clock: RevealClock) {
        let revealed = self.state.revealed;
        if revealed >= clock.len() {
            self.finish_reveal(self.reveal_origin + clock.offset(revealed));
            return;
        }
        let due = self.reveal_origin + clock.offset(revealed + 1);
        self.timers.schedule(due, Signal::RevealTick);
    }

    fn finish_reveal(&mut self, at: Duration) {
        let rounds = self.block.wait_after_rounds;
        if rounds == 0 {
            self.become_ready(at);
            return;
        }

        debug!(rounds, "reveal complete, holding");
        self.state.phase = Phase::HoldingAfterReveal;
        self.timers.schedule(at + DOT_INTERVAL, Signal::DotTick);
        self.timers
            .schedule(at + HOLD_ROUND.saturating_mul(rounds), Signal::HoldElapsed);
    }

    fn become_ready(&mut self, at: Duration) {
        self.timers.clear();
        self.state.phase = Phase::Ready;
        self.ready_at = Some(at);
        debug!(at = ?at, "output block ready");
    }
}

impl Drop for OutputAnimator {
    fn drop(&mut self) {
        self.teardown();
    }
}

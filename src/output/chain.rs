//! Output Chain: plays blocks strictly one after another.
//!
//! The block tree is flattened into an ordered plan up front. The chain keeps
//! an index into that plan instead of nesting chains inside chains, so
//! teardown walks a flat list.

use super::animator::{OutputAnimator, OutputFrame};
use crate::script::OutputBlock;
use std::time::Duration;
use tracing::debug;

/// Sequential composition of [`OutputAnimator`]s.
///
/// Block `i + 1` is mounted and started at the exact virtual time block `i`
/// became ready. Only the last mounted animator is ever active; earlier ones
/// are ready and own no timers.
#[derive(Debug)]
pub struct OutputChain {
    /// Blocks in play order.
    plan: Vec<OutputBlock>,
    /// Mounted animators, one per started block.
    mounted: Vec<OutputAnimator>,
    /// Whether `start` was called.
    started: bool,
    /// Set by `teardown`.
    torn_down: bool,
}

impl OutputChain {
    /// Create a chain for `blocks` (children are played after their parent).
    pub fn new(blocks: &[OutputBlock]) -> Self {
        Self::with_plan(OutputBlock::flatten(blocks))
    }

    const fn with_plan(plan: Vec<OutputBlock>) -> Self {
        Self {
            plan,
            mounted: Vec::new(),
            started: false,
            torn_down: false,
        }
    }

    /// Mount and start the first block at `now`.
    pub fn start(&mut self, now: Duration) {
        if self.started || self.torn_down {
            return;
        }
        self.started = true;
        if self.mount_next(now) {
            self.advance(now);
        }
    }

    /// Advance the active block to `now`, mounting successors as blocks
    /// become ready.
    ///
    /// Returns the number of blocks that became ready.
    pub fn advance(&mut self, now: Duration) -> usize {
        if !self.started || self.torn_down {
            return 0;
        }

        let mut finished = 0;
        loop {
            let Some(active) = self.mounted.last_mut() else {
                break;
            };
            let Some(ready_at) = active.advance(now) else {
                break;
            };
            finished += 1;
            if !self.mount_next(ready_at) {
                break;
            }
        }
        finished
    }

    /// Append blocks to the end of the plan.
    ///
    /// If the chain had already played everything, the first new block starts
    /// at `now`.
    pub fn extend(&mut self, blocks: &[OutputBlock], now: Duration) {
        if self.torn_down {
            return;
        }
        let idle = self.started && self.is_finished();
        self.plan.extend(OutputBlock::flatten(blocks));
        if idle && self.mount_next(now) {
            self.advance(now);
        }
    }

    /// Replace the plan, tearing down everything mounted.
    ///
    /// An identical plan is a no-op.
    pub fn reconfigure(&mut self, blocks: &[OutputBlock], now: Duration) {
        let plan = OutputBlock::flatten(blocks);
        if self.torn_down || plan == self.plan {
            return;
        }
        let was_started = self.started;
        self.teardown();
        debug!(blocks = plan.len(), "output chain reconfigured");

        *self = Self::with_plan(plan);
        if was_started {
            self.start(now);
        }
    }

    /// Tear down the active animator and every mounted block.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        for animator in &mut self.mounted {
            animator.teardown();
        }
        self.torn_down = true;
    }

    /// Whether the current head block is ready.
    pub fn is_head_ready(&self) -> bool {
        self.mounted.last().is_some_and(OutputAnimator::is_ready)
    }

    /// Whether every planned block has been played to ready.
    pub fn is_finished(&self) -> bool {
        self.mounted.len() == self.plan.len() && self.mounted.iter().all(OutputAnimator::is_ready)
    }

    /// Earliest pending timer of the active block.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.torn_down {
            return None;
        }
        self.mounted.last().and_then(OutputAnimator::next_deadline)
    }

    /// The active (most recently mounted) animator.
    pub fn head(&self) -> Option<&OutputAnimator> {
        self.mounted.last()
    }

    /// Number of mounted blocks.
    pub fn mounted_len(&self) -> usize {
        self.mounted.len()
    }

    /// Number of planned blocks.
    pub fn plan_len(&self) -> usize {
        self.plan.len()
    }

    /// Frames of every mounted block that has text, in play order.
    ///
    /// Iterate with `.rev()` to lay out only the newest blocks.
    pub fn frames(&self) -> impl DoubleEndedIterator<Item = OutputFrame<'_>> {
        self.mounted.iter().filter_map(OutputAnimator::frame)
    }

    /// Mount the next planned block and start it at `at`.
    ///
    /// Returns `false` when the plan is exhausted.
    fn mount_next(&mut self, at: Duration) -> bool {
        let Some(block) = self.plan.get(self.mounted.len()) else {
            return false;
        };
        debug!(index = self.mounted.len(), at = ?at, "mounting output block");
        let mut animator = OutputAnimator::new(block.clone());
        animator.start(at);
        self.mounted.push(animator);
        true
    }
}

impl Drop for OutputChain {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Phase;

    const fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn abc() -> Vec<OutputBlock> {
        vec![
            OutputBlock::text("aa").reveal_budget(100),
            OutputBlock::text("bb").reveal_budget(100).wait_after_rounds(1),
            OutputBlock::text("cc").reveal_budget(100),
        ]
    }

    #[test]
    fn test_blocks_never_overlap() {
        let mut chain = OutputChain::new(&abc());
        chain.start(Duration::ZERO);

        let mut ready_times = Vec::new();
        let mut first_reveal = Vec::new();
        for t in 0..=2000 {
            chain.advance(ms(t));
            for (i, animator) in chain.mounted.iter().enumerate() {
                if animator.state().revealed > 0 && first_reveal.len() == i {
                    first_reveal.push(t);
                }
                if animator.is_ready() && ready_times.len() == i {
                    ready_times.push(t);
                }
            }
            // Only the last mounted block may still be animating.
            let active = chain.mounted.len().saturating_sub(1);
            assert!(chain.mounted[..active].iter().all(OutputAnimator::is_ready));
        }

        assert_eq!(ready_times, [100, 1800, 1900]);
        assert_eq!(first_reveal, [50, 150, 1850]);
        assert!(first_reveal[1] > ready_times[0]);
        assert!(first_reveal[2] > ready_times[1]);
        assert!(chain.is_finished());
    }

    #[test]
    fn test_head_ready_and_mount() {
        let mut chain = OutputChain::new(&abc());
        chain.start(Duration::ZERO);
        assert_eq!(chain.mounted_len(), 1);
        assert!(!chain.is_head_ready());

        assert_eq!(chain.advance(ms(100)), 1);
        assert_eq!(chain.mounted_len(), 2);
        // The successor starts on the same instant and begins revealing.
        assert_eq!(chain.head().unwrap().phase(), Phase::Revealing);
        assert_eq!(chain.next_deadline(), Some(ms(150)));
    }

    #[test]
    fn test_catch_up_preserves_timing() {
        let mut chain = OutputChain::new(&abc());
        chain.start(Duration::ZERO);
        assert_eq!(chain.advance(ms(5000)), 3);
        assert!(chain.is_finished());
        assert_eq!(chain.next_deadline(), None);

        let texts: Vec<_> = chain.frames().map(|frame| frame.revealed).collect();
        assert_eq!(texts, ["aa", "bb", "cc"]);
    }

    #[test]
    fn test_pass_through_blocks_chain_immediately() {
        let blocks = vec![
            OutputBlock::empty(),
            OutputBlock::empty().then(OutputBlock::text("x").reveal_budget(10)),
        ];
        let mut chain = OutputChain::new(&blocks);
        chain.start(Duration::ZERO);

        assert_eq!(chain.mounted_len(), 3);
        assert_eq!(chain.frames().count(), 1);
        chain.advance(ms(10));
        assert!(chain.is_finished());
    }

    #[test]
    fn test_children_play_before_siblings() {
        let blocks = vec![
            OutputBlock::text("a").reveal_budget(10).then(OutputBlock::text("child").reveal_budget(0)),
            OutputBlock::text("b").reveal_budget(0),
        ];
        let mut chain = OutputChain::new(&blocks);
        chain.start(Duration::ZERO);
        chain.advance(ms(10));

        let texts: Vec<_> = chain.frames().map(|frame| frame.revealed).collect();
        assert_eq!(texts, ["a", "child", "b"]);
    }

    #[test]
    fn test_extend_after_finish_starts_now() {
        let mut chain = OutputChain::new(&[OutputBlock::text("a").reveal_budget(10)]);
        chain.start(Duration::ZERO);
        chain.advance(ms(10));
        assert!(chain.is_finished());

        chain.extend(&[OutputBlock::text("echo").reveal_budget(400)], ms(1000));
        assert!(!chain.is_finished());
        assert_eq!(chain.next_deadline(), Some(ms(1100)));
        chain.advance(ms(1400));
        assert!(chain.is_finished());
    }

    #[test]
    fn test_extend_while_playing_queues() {
        let mut chain = OutputChain::new(&[OutputBlock::text("ab").reveal_budget(100)]);
        chain.start(Duration::ZERO);
        chain.extend(&[OutputBlock::text("c").reveal_budget(100)], ms(10));
        assert_eq!(chain.mounted_len(), 1);

        chain.advance(ms(150));
        assert_eq!(chain.mounted_len(), 2);
        assert_eq!(chain.head().unwrap().state().revealed, 0);
        chain.advance(ms(200));
        assert!(chain.is_finished());
    }

    #[test]
    fn test_teardown_is_silent() {
        let mut chain = OutputChain::new(&abc());
        chain.start(Duration::ZERO);
        chain.advance(ms(120));
        let mounted = chain.mounted_len();
        let head = chain.head().unwrap().state();

        chain.teardown();
        assert_eq!(chain.advance(ms(10_000)), 0);
        assert_eq!(chain.mounted_len(), mounted);
        assert_eq!(chain.head().unwrap().state(), head);
        assert!(chain.mounted.iter().all(OutputAnimator::is_torn_down));
        assert_eq!(chain.next_deadline(), None);
    }

    #[test]
    fn test_reconfigure_restarts() {
        let mut chain = OutputChain::new(&abc());
        chain.start(Duration::ZERO);
        chain.advance(ms(500));

        chain.reconfigure(&[OutputBlock::text("new").reveal_budget(300)], ms(500));
        assert_eq!(chain.mounted_len(), 1);
        assert_eq!(chain.plan_len(), 1);
        chain.advance(ms(700));
        assert_eq!(chain.frames().next().unwrap().revealed, "ne");
    }
}

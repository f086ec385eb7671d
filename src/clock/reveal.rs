//! Reveal clock: spreads a reveal budget evenly over a text.

use std::time::Duration;

/// Default reveal speed when a block gives no explicit budget.
pub const DEFAULT_MS_PER_GRAPHEME: u64 = 50;

/// Timing for a typewriter reveal of `len` graphemes over `budget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealClock {
    len: usize,
    budget: Duration,
}

impl RevealClock {
    /// Create a clock for `len` graphemes revealed over `budget`.
    pub const fn new(len: usize, budget: Duration) -> Self {
        Self { len, budget }
    }

    /// Clock using the default budget of 50ms per grapheme.
    pub fn with_default_budget(len: usize) -> Self {
        let per = Duration::from_millis(DEFAULT_MS_PER_GRAPHEME);
        Self::new(len, per.saturating_mul(u32::try_from(len).unwrap_or(u32::MAX)))
    }

    /// Delay between two reveal ticks, in milliseconds.
    ///
    /// An empty text is already revealed and never ticks; it reports `0.0`
    /// instead of dividing by zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn interval_ms(len: usize, budget_ms: u64) -> f64 {
        if len == 0 {
            return 0.0;
        }
        budget_ms as f64 / len as f64
    }

    /// Number of graphemes this clock reveals.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if there is nothing to reveal.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total reveal budget.
    #[inline]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Offset of the `n`-th reveal tick from the start of the reveal.
    ///
    /// Computed as `budget * n / len` in whole nanoseconds so the final tick
    /// lands exactly on the budget.
    pub fn offset(&self, n: usize) -> Duration {
        if self.len == 0 {
            return Duration::ZERO;
        }
        let n = n.min(self.len) as u128;
        let nanos = self.budget.as_nanos() * n / self.len as u128;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

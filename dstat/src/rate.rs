//! Differencing of monotonic counters.

/// Tracks the previous value of a monotonic counter.
///
/// The previous value starts at zero, so the first delta is the first
/// observed counter value.
#[derive(Debug, Clone, Default)]
pub struct RateTracker {
    previous: u64,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` and return how far the counter moved since the last
    /// call. A counter that went backwards (reset) yields zero.
    pub fn sample(&mut self, current: u64) -> u64 {
        let delta = current.saturating_sub(self.previous);
        self.previous = current;
        delta
    }

    /// Value recorded by the last call to [`sample`](Self::sample).
    pub fn previous(&self) -> u64 {
        self.previous
    }
}

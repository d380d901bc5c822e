//! Tick-driven debouncing.
//!
//! The event loop is single threaded and already ticks at a fixed rate, so a
//! debouncer is just a pending value with a deadline. Every new value resets
//! the deadline; polling after the quiet period hands the last value out
//! exactly once.

use std::time::{Duration, Instant};

/// Default quiet period before a debounced value is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// A last-writer-wins debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// The quiet period.
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Queue a value, replacing any pending one and restarting the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Take the pending value immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_commits_once_with_last_value() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(1000));

        for (i, q) in ["s", "st", "ste", "stee", "steel"].iter().enumerate() {
            d.push(q.to_string(), start + Duration::from_millis(100 * i as u64));
            assert_eq!(d.poll(start + Duration::from_millis(100 * i as u64 + 50)), None);
        }

        let commits: Vec<String> = (0..30)
            .filter_map(|t| d.poll(start + Duration::from_millis(100 * t)))
            .collect();
        assert_eq!(commits, vec!["steel".to_string()]);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_not_committed_before_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.push(1, start);
        assert_eq!(d.poll(start + Duration::from_millis(499)), None);
        assert_eq!(d.poll(start + Duration::from_millis(500)), Some(1));
        assert_eq!(d.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_cancel_and_flush() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.push("a", start);
        d.cancel();
        assert_eq!(d.poll(start + Duration::from_secs(5)), None);

        d.push("b", start);
        assert_eq!(d.flush(), Some("b"));
        assert!(!d.is_pending());
    }
}

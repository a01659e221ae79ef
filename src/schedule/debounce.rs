//! Debouncing and stale-pass detection

/// Coalesces a burst of triggers into one pass.
///
/// Each trigger restarts the quiet period; `ready` reports true once
/// `interval_ms` has elapsed since the last one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval_ms: u64,
    last_trigger: Option<u64>,
}

impl Debouncer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_trigger: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Record a trigger at `now`
    pub fn touch(&mut self, now: u64) {
        self.last_trigger = Some(now);
    }

    /// Whether a trigger is waiting
    pub fn is_armed(&self) -> bool {
        self.last_trigger.is_some()
    }

    /// Whether the quiet period after the last trigger has passed
    pub fn ready(&self, now: u64) -> bool {
        match self.last_trigger {
            Some(last) => now.saturating_sub(last) >= self.interval_ms,
            None => false,
        }
    }

    /// Disarm after the pass ran
    pub fn reset(&mut self) {
        self.last_trigger = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(200)
    }
}

/// Monotonic counter bumped on every invalidation.
///
/// A pass remembers the generation it started at; if the counter moved by
/// the time it finishes, its result describes an outdated store or viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationCounter(u64);

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new generation
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn current(&self) -> u64 {
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_debouncer_never_ready() {
        let d = Debouncer::new(200);
        assert!(!d.is_armed());
        assert!(!d.ready(10_000));
    }

    #[test]
    fn test_burst_coalesces() {
        let mut d = Debouncer::new(200);
        d.touch(1_000);
        d.touch(1_150);
        d.touch(1_300);
        assert!(!d.ready(1_450));
        assert!(d.ready(1_500));

        d.reset();
        assert!(!d.ready(5_000));
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut d = Debouncer::new(200);
        d.touch(1_000);
        assert!(!d.ready(900));
    }

    #[test]
    fn test_generation() {
        let mut g = GenerationCounter::new();
        let started = g.current();
        assert!(g.is_current(started));
        assert_eq!(g.bump(), 1);
        assert!(!g.is_current(started));
    }
}

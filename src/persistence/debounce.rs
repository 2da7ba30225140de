//! Trailing-edge save debounce
//!
//! Every change pushes the deadline back; the save fires once the document
//! has been quiet for the whole delay. Time comes from a [`Clock`] so the
//! host's event loop (or a test) decides when "now" is.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source, as an offset from an arbitrary start
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record a change at `now`, restarting the quiet period
    pub fn touch(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    /// `true` exactly once when the quiet period has elapsed
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Drop a pending save without firing it
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_once_after_quiet_period() {
        let mut d = Debouncer::new(ms(500));
        d.touch(ms(0));
        assert!(!d.poll(ms(499)));
        assert!(d.poll(ms(500)));
        assert!(!d.poll(ms(1000)));
    }

    #[test]
    fn test_touch_pushes_deadline_back() {
        let mut d = Debouncer::new(ms(500));
        d.touch(ms(0));
        d.touch(ms(100));
        d.touch(ms(200));
        assert!(!d.poll(ms(600)));
        assert_eq!(d.deadline(), Some(ms(700)));
        assert!(d.poll(ms(700)));
    }

    #[test]
    fn test_idle_never_fires() {
        let mut d = Debouncer::new(ms(500));
        assert!(!d.poll(ms(10_000)));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(ms(250));
        assert_eq!(other.now(), ms(250));
    }
}

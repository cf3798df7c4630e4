//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Manually driven clock.
///
/// Lets tests step through window boundaries and block expiries without
/// sleeping.
///
/// # Examples
///
/// ```
/// use abuse_guard::infrastructure::mocks::MockClock;
/// use abuse_guard::application::ports::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
/// assert_eq!(clock.now(), start);
///
/// clock.advance(Duration::from_secs(61));
/// assert_eq!(clock.elapsed(), Duration::from_secs(61));
/// ```
///
/// All clones share the same underlying time value, so advancing one clone
/// advances every gate component holding another.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time += duration;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = instant;
    }

    /// Time advanced since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.now().saturating_duration_since(self.start)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let start = Instant::now();
        let clock = MockClock::new(start);

        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_millis(300_000));
        assert_eq!(clock.now(), start + Duration::from_secs(300));

        let new_time = start + Duration::from_secs(3600);
        clock.set(new_time);
        assert_eq!(clock.elapsed(), Duration::from_secs(3600));
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::default();
        let clone = clock.clone();

        std::thread::spawn(move || clone.advance(Duration::from_secs(5)))
            .join()
            .unwrap();

        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }
}

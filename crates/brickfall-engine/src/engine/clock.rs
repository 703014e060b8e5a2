use std::time::Duration;

/// Deterministic gravity timer.
///
/// The clock does not read the system time: the caller feeds it the elapsed
/// time with [`Self::advance`]. At most one tick is reported per call and any
/// time beyond the due tick is dropped, so a stalled caller never replays a
/// burst of missed ticks.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use brickfall_engine::GravityClock;
///
/// let mut clock = GravityClock::new(Duration::from_millis(500));
/// assert!(!clock.advance(Duration::from_millis(300)));
/// assert!(clock.advance(Duration::from_millis(300)));
///
/// // Only one tick, however long the gap was.
/// assert!(clock.advance(Duration::from_secs(10)));
/// assert!(!clock.advance(Duration::from_millis(100)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GravityClock {
    interval: Duration,
    remaining: Duration,
    suspended: bool,
}

impl GravityClock {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            remaining: interval,
            suspended: false,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Cancels the pending tick and schedules a new one a full `interval` away.
    pub const fn rearm(&mut self, interval: Duration) {
        self.interval = interval;
        self.remaining = interval;
    }

    pub const fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Lifts a suspension. The next [`Self::advance`] ticks right away.
    pub const fn resume(&mut self) {
        self.suspended = false;
        self.remaining = Duration::ZERO;
    }

    /// Feeds `elapsed` time and reports whether a gravity tick is due.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if self.suspended {
            return false;
        }
        if elapsed >= self.remaining {
            self.remaining = self.interval;
            return true;
        }
        self.remaining -= elapsed;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_ticks_once_per_interval() {
        let mut clock = GravityClock::new(100 * MS);
        let ticks = (0..50).filter(|_| clock.advance(10 * MS)).count();
        assert_eq!(ticks, 5);
    }

    #[test]
    fn test_no_catch_up() {
        let mut clock = GravityClock::new(100 * MS);
        assert!(clock.advance(1000 * MS));
        assert_eq!(clock.remaining(), 100 * MS);
        assert!(!clock.advance(99 * MS));
        assert!(clock.advance(MS));
    }

    #[test]
    fn test_suspended_clock_never_ticks() {
        let mut clock = GravityClock::new(100 * MS);
        clock.suspend();
        assert!(clock.is_suspended());
        assert!(!clock.advance(1000 * MS));

        clock.resume();
        assert!(!clock.is_suspended());
        assert!(clock.advance(Duration::ZERO));
        assert_eq!(clock.remaining(), 100 * MS);
    }

    #[test]
    fn test_rearm_restarts_countdown() {
        let mut clock = GravityClock::new(100 * MS);
        assert!(!clock.advance(90 * MS));
        clock.rearm(50 * MS);
        assert_eq!(clock.interval(), 50 * MS);
        assert!(!clock.advance(40 * MS));
        assert!(clock.advance(10 * MS));
    }

    #[test]
    fn test_rearm_keeps_suspension() {
        let mut clock = GravityClock::new(100 * MS);
        clock.suspend();
        clock.rearm(50 * MS);
        assert!(!clock.advance(100 * MS));
    }
}

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Schedule for periodic raid refreshes.
///
/// Ticks are spaced `period` apart. A tick that is handled late does not
/// cause a burst of catch-up ticks; the next one is scheduled a full
/// period after the late one.
#[derive(Debug, Clone)]
pub struct RefreshTimer {
    period: Duration,
    next_due: Instant,
}

impl RefreshTimer {
    /// A timer whose first tick is one period from now, or `None` for a
    /// zero period.
    pub fn new(period: Duration) -> Option<Self> {
        if period.is_zero() {
            return None;
        }
        Some(Self {
            period,
            next_due: Instant::now() + period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Wait for the next tick and schedule the one after it
    pub async fn tick(&mut self) {
        sleep_until(self.next_due).await;
        self.advance(Instant::now());
    }

    /// Mark the current tick as handled at `now`
    pub fn advance(&mut self, now: Instant) {
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_period() {
        assert!(RefreshTimer::new(Duration::ZERO).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_a_period_apart() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(Duration::from_secs(60)).unwrap();
        assert!(!timer.is_due(start));

        timer.tick().await;
        assert_eq!(Instant::now() - start, Duration::from_secs(60));
        timer.tick().await;
        assert_eq!(Instant::now() - start, Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_tick_does_not_burst() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(Duration::from_secs(10)).unwrap();

        tokio::time::advance(Duration::from_secs(35)).await;
        assert!(timer.is_due(Instant::now()));

        timer.advance(Instant::now());
        assert_eq!(timer.next_due() - start, Duration::from_secs(45));
        assert!(!timer.is_due(Instant::now()));
    }
}

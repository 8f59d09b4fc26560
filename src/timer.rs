//! Fixed-rate loop pacing.

use crate::{Error, Result};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Seconds since the UNIX epoch, as stamped on records and log frames
#[must_use]
pub fn wall_clock_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Sleeps away whatever is left of each tick budget.
///
/// Overruns are not compensated: a slow tick is followed by a full-length one.
#[derive(Debug)]
pub struct FrequencyTimer {
    period: Duration,
    loop_start: Option<Instant>,
}

impl FrequencyTimer {
    /// # Errors
    ///
    /// Returns `Config` if `frequency_hz` is not a positive finite number
    pub fn new(frequency_hz: f64) -> Result<Self> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(Error::Config(format!(
                "Timer frequency must be positive, got {frequency_hz}"
            )));
        }
        Ok(Self {
            period: Duration::from_secs_f64(1.0 / frequency_hz),
            loop_start: None,
        })
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start_loop(&mut self) {
        self.loop_start = Some(Instant::now());
    }

    /// Time left in the current tick, zero once the budget is spent
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.loop_start
            .map_or(Duration::ZERO, |start| self.period.saturating_sub(start.elapsed()))
    }

    /// Sleep for the rest of the tick budget
    pub fn end_loop(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.loop_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period() {
        let timer = FrequencyTimer::new(50.0).unwrap();
        assert_eq!(timer.period(), Duration::from_millis(20));
    }

    #[test]
    fn test_invalid_frequency() {
        assert!(FrequencyTimer::new(0.0).is_err());
        assert!(FrequencyTimer::new(-5.0).is_err());
        assert!(FrequencyTimer::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_end_loop_fills_the_budget() {
        let mut timer = FrequencyTimer::new(100.0).unwrap();
        let start = Instant::now();
        timer.start_loop();
        timer.end_loop();
        assert!(start.elapsed() >= Duration::from_millis(9));
    }

    #[test]
    fn test_no_catch_up_after_overrun() {
        let mut timer = FrequencyTimer::new(1000.0).unwrap();
        timer.start_loop();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.remaining(), Duration::ZERO);
        timer.end_loop();
    }

    #[test]
    fn test_end_without_start_does_not_sleep() {
        let mut timer = FrequencyTimer::new(1.0).unwrap();
        let start = Instant::now();
        timer.end_loop();
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}

use std::time::{Duration, Instant};

/// A scoped timer measuring the cost of a computation.
///
/// The elapsed time is written to the borrowed duration when the timer is dropped, so it is recorded on every exit path of the scope, including early returns and panics.
///
/// ```rust
/// # use std::time::Duration;
/// use zarrs_serve::cache::CostTimer;
/// let mut cost = Duration::ZERO;
/// {
///     let _timer = CostTimer::start(&mut cost);
///     std::thread::sleep(Duration::from_millis(1));
/// }
/// assert!(cost >= Duration::from_millis(1));
/// ```
#[derive(Debug)]
#[must_use = "the cost is recorded when the timer is dropped"]
pub struct CostTimer<'a> {
    start: Instant,
    cost: &'a mut Duration,
}

impl<'a> CostTimer<'a> {
    /// Start a timer that records its elapsed time in `cost` when dropped.
    pub fn start(cost: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            cost,
        }
    }

    /// Return the time elapsed since the timer was started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for CostTimer<'_> {
    fn drop(&mut self) {
        *self.cost = self.start.elapsed();
    }
}

/// Call `f` and return its output with the time it took.
pub fn measure<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let mut cost = Duration::ZERO;
    let output = {
        let _timer = CostTimer::start(&mut cost);
        f()
    };
    (output, cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallible(fail: bool, cost: &mut Duration) -> Result<u8, &'static str> {
        let _timer = CostTimer::start(cost);
        std::thread::sleep(Duration::from_millis(2));
        if fail {
            return Err("failed");
        }
        Ok(1)
    }

    #[test]
    fn cost_timer_records_on_every_exit() {
        let mut cost = Duration::ZERO;
        assert_eq!(fallible(false, &mut cost), Ok(1));
        assert!(cost >= Duration::from_millis(2));

        let mut cost = Duration::ZERO;
        assert!(fallible(true, &mut cost).is_err());
        assert!(cost >= Duration::from_millis(2));
    }

    #[test]
    fn cost_timer_records_on_panic() {
        let mut cost = Duration::ZERO;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _timer = CostTimer::start(&mut cost);
            std::thread::sleep(Duration::from_millis(2));
            panic!("compute failed");
        }));
        assert!(result.is_err());
        assert!(cost >= Duration::from_millis(2));
    }

    #[test]
    fn cost_timer_measure() {
        let (output, cost) = measure(|| {
            std::thread::sleep(Duration::from_millis(2));
            "chunk"
        });
        assert_eq!(output, "chunk");
        assert!(cost >= Duration::from_millis(2));
    }
}

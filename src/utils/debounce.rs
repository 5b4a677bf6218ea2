// ABOUTME: Time-window suppression for repetitive calls.
// ABOUTME: Used to keep connection warnings from flooding the log.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Lets a call through at most once per `window`.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    last: Mutex<Option<Instant>>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: Mutex::new(None),
        }
    }

    /// Run `f` unless it already ran within the window. Returns whether it ran.
    pub fn call(&self, f: impl FnOnce()) -> bool {
        let now = Instant::now();
        {
            let mut last = self.last.lock();
            if last.is_some_and(|at| now.duration_since(at) < self.window) {
                return false;
            }
            *last = Some(now);
        }
        f();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppresses_calls_inside_window() {
        let debounce = Debounce::new(Duration::from_secs(60));
        let mut count = 0;
        assert!(debounce.call(|| count += 1));
        assert!(!debounce.call(|| count += 1));
        assert_eq!(count, 1);
    }

    #[test]
    fn zero_window_never_suppresses() {
        let debounce = Debounce::new(Duration::ZERO);
        assert!(debounce.call(|| {}));
        assert!(debounce.call(|| {}));
    }
}

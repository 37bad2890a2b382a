use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed-window counter, one window per key. No external crate for this:
/// the teacher's own config/env layer favors hand-rolled over
/// dependency-for-a-one-liner, and a rate limiter this small is the same
/// call. Good enough for per-IP read limits and a single global trigger
/// limit; not meant to survive a process restart.
pub struct RateLimiter {
    capacity: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> RateLimiter {
        RateLimiter {
            capacity,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if `key` is still under its limit for the current
    /// window, and consumes one unit of capacity if so. A `capacity` of 0
    /// always denies.
    pub fn check(&self, key: &str) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        if entry.1 >= self.capacity {
            false
        } else {
            entry.1 += 1;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_capacity_then_denies() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a"));
        assert!(limiter.check("b"));
        assert!(!limiter.check("a"));
    }

    #[test]
    fn zero_capacity_always_denies() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert!(!limiter.check("a"));
    }
}

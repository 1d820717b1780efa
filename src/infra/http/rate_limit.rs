use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Fixed-window request limiter keyed by client identity. The per-key window
/// resets on rollover; counter updates happen under the map's entry lock.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    windows: DashMap<String, Window>,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of a single admission check, with the header values the response
/// must carry either way.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: DashMap::new(),
        }
    }

    pub fn check(&self, key: &str) -> Decision {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        let reset_secs = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs()
            .max(1);

        if entry.count >= self.max_requests {
            return Decision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_secs,
            };
        }

        entry.count += 1;
        Decision {
            allowed: true,
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            reset_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforces_capacity_within_a_window() {
        let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 2);

        let first = limiter.check("10.0.0.1");
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = limiter.check("10.0.0.1");
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check("10.0.0.1");
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
    }

    #[test]
    fn keys_are_tracked_independently() {
        let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check("10.0.0.1").allowed);
        assert!(limiter.check("10.0.0.2").allowed);
        assert!(!limiter.check("10.0.0.1").allowed);
    }

    #[test]
    fn window_rollover_resets_the_counter() {
        let limiter = FixedWindowLimiter::new(Duration::from_millis(20), 1);
        assert!(limiter.check("10.0.0.1").allowed);
        assert!(!limiter.check("10.0.0.1").allowed);

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("10.0.0.1").allowed);
    }
}

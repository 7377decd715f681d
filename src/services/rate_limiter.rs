//! Per-client token buckets.
//!
//! Each client IP gets a bucket holding up to `burst` tokens, refilled
//! continuously at `requests_per_minute / 60` tokens per second. A request
//! spends one token; an empty bucket means the request is rejected.
//! Buckets are created on first sight and live for the process lifetime.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    buckets: Arc<Mutex<HashMap<IpAddr, Bucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            capacity: f64::from(config.burst.max(1)),
            refill_per_sec: f64::from(config.requests_per_minute.max(1)) / 60.0,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn allow(&self, addr: IpAddr) -> bool {
        self.allow_at(addr, Instant::now())
    }

    /// Refill, then try to spend one token. The lock covers the whole step.
    pub fn allow_at(&self, addr: IpAddr, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(addr).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        self.refill(bucket, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until `addr` has a whole token again. Zero for unseen clients.
    pub fn retry_after(&self, addr: IpAddr) -> Duration {
        self.retry_after_at(addr, Instant::now())
    }

    pub fn retry_after_at(&self, addr: IpAddr, now: Instant) -> Duration {
        let mut buckets = self.buckets.lock();
        let Some(bucket) = buckets.get_mut(&addr) else {
            return Duration::ZERO;
        };
        self.refill(bucket, now);

        let missing = (1.0 - bucket.tokens).max(0.0);
        Duration::from_secs_f64(missing / self.refill_per_sec)
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        // a `now` older than the last refill adds nothing
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if !elapsed.is_zero() {
            bucket.tokens =
                (bucket.tokens + elapsed.as_secs_f64() * self.refill_per_sec).min(self.capacity);
            bucket.last_refill = now;
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn burst_is_allowed_then_the_next_request_is_limited() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 100,
            burst: 100,
        });
        let t0 = Instant::now();

        for n in 0..100 {
            assert!(limiter.allow_at(ip(1), t0), "request {n} should pass");
        }
        assert!(!limiter.allow_at(ip(1), t0));
    }

    #[test]
    fn tokens_come_back_over_time() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 60,
            burst: 2,
        });
        let t0 = Instant::now();

        assert!(limiter.allow_at(ip(1), t0));
        assert!(limiter.allow_at(ip(1), t0));
        assert!(!limiter.allow_at(ip(1), t0));

        // one token per second
        assert!(!limiter.allow_at(ip(1), t0 + Duration::from_millis(500)));
        assert!(limiter.allow_at(ip(1), t0 + Duration::from_millis(1_100)));
    }

    #[test]
    fn refill_never_exceeds_burst() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 600,
            burst: 3,
        });
        let t0 = Instant::now();
        assert!(limiter.allow_at(ip(1), t0));

        let later = t0 + Duration::from_secs(3_600);
        for _ in 0..3 {
            assert!(limiter.allow_at(ip(1), later));
        }
        assert!(!limiter.allow_at(ip(1), later));
    }

    #[test]
    fn clients_do_not_share_buckets() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 1,
            burst: 1,
        });
        let t0 = Instant::now();
        assert!(limiter.allow_at(ip(1), t0));
        assert!(!limiter.allow_at(ip(1), t0));
        assert!(limiter.allow_at(ip(2), t0));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn retry_after_is_the_time_until_the_next_token() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 30,
            burst: 1,
        });
        let t0 = Instant::now();
        assert_eq!(limiter.retry_after_at(ip(1), t0), Duration::ZERO);
        assert!(limiter.allow_at(ip(1), t0));
        assert!(!limiter.allow_at(ip(1), t0));

        let wait = limiter.retry_after_at(ip(1), t0);
        assert!(wait > Duration::from_millis(1_900));
        assert!(wait <= Duration::from_secs(2));

        let wait = limiter.retry_after_at(ip(1), t0 + Duration::from_secs(1));
        assert!(wait <= Duration::from_secs(1));
    }

    #[test]
    fn concurrent_callers_never_overspend() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: 1,
            burst: 50,
        });
        let t0 = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..20).filter(|_| limiter.allow_at(ip(1), t0)).count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}

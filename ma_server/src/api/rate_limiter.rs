//! Rate limiting for authentication endpoints.
//!
//! Prevents credential stuffing by limiting the number of login attempts per
//! email within specific time windows.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Maximum number of requests allowed in the time window
    /// * `window` - Time window duration
    ///
    /// # Example
    ///
    /// ```
    /// use ma_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 requests per second
    /// let limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Create a rate limiter for login attempts (5 per minute)
    pub fn login() -> Self {
        Self::new(5, Duration::from_secs(60))
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    ///
    /// # Example
    ///
    /// ```
    /// # use ma_server::api::rate_limiter::RateLimiter;
    /// # use std::time::Duration;
    /// let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
    ///
    /// // First 5 requests allowed
    /// for _ in 0..5 {
    ///     assert!(limiter.check());
    /// }
    ///
    /// // 6th request blocked
    /// assert!(!limiter.check());
    /// ```
    pub fn check(&mut self) -> bool {
        let now = Instant::now();

        // Remove timestamps outside the window
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        // Check if limit exceeded
        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        // Record this request
        self.timestamps.push_back(now);
        true
    }

    /// Get the number of requests in the current window
    pub fn current_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether every recorded request has aged out of the window
    fn is_idle(&self, now: Instant) -> bool {
        self.timestamps
            .back()
            .is_none_or(|newest| now.duration_since(*newest) > self.window)
    }

    /// Reset the rate limiter (clear all timestamps)
    pub fn reset(&mut self) {
        self.timestamps.clear();
    }
}

/// Per-email login limiter shared across handlers
pub type SharedLoginLimiter = Arc<Mutex<LoginRateLimiter>>;

/// Create the shared login limiter used in the application state
pub fn shared_login_limiter() -> SharedLoginLimiter {
    Arc::new(Mutex::new(LoginRateLimiter::default()))
}

/// Sliding-window limiters keyed by (lowercased) email.
///
/// Entries for idle emails are dropped once their window has fully elapsed,
/// so the map stays bounded by recent activity.
#[derive(Debug, Default)]
pub struct LoginRateLimiter {
    limiters: HashMap<String, RateLimiter>,
}

impl LoginRateLimiter {
    /// Check whether a login attempt for this email is allowed
    pub fn check(&mut self, email: &str) -> bool {
        let now = Instant::now();
        self.limiters.retain(|_, limiter| !limiter.is_idle(now));

        self.limiters
            .entry(email.to_lowercase())
            .or_insert_with(RateLimiter::login)
            .check()
    }
}

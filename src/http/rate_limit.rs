//! Rate limiting implementation
//!
//! Tracks the server-reported request quota and enforces one of three
//! policies: fail fast (`throw`), sleep-and-retry on 429 (`wait`), or
//! spread requests evenly over the window (`pace`).
//!
//! The state is plain data owned by one client. Concurrent callers sharing
//! a client must serialize their calls.

use crate::error::{Error, Result};
use crate::types::RateLimitMethod;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{debug, warn};

const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_RESET: &str = "x-ratelimit-reset";
const HEADER_DATE: &str = "date";

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Policy applied before and after each call
    pub method: RateLimitMethod,
    /// Divides pacing sleeps; above 1.0 sleeps less than strictly needed
    pub pace_factor: f64,
    /// Upper bound for any single sleep
    pub max_wait: Duration,
    /// Upper bound for consecutive 429 retries, `None` for unbounded
    pub max_retries: Option<u32>,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            method: RateLimitMethod::Wait,
            pace_factor: 1.1,
            max_wait: Duration::from_secs(5 * 60),
            max_retries: None,
        }
    }
}

impl RateLimiterConfig {
    pub fn new(method: RateLimitMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn pace_factor(mut self, factor: f64) -> Self {
        self.pace_factor = factor;
        self
    }

    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// Quota as last reported by the server
#[derive(Debug, Clone, PartialEq)]
pub struct RateState {
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window ends, on the local clock
    pub reset: DateTime<Utc>,
    /// When the last rate-limited response arrived
    pub last_call: DateTime<Utc>,
}

impl RateState {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            limit: 300,
            remaining: 300,
            reset: now,
            last_call: now,
        }
    }
}

/// Header-driven rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: RateState,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            state: RateState::fresh(Utc::now()),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    pub fn method(&self) -> RateLimitMethod {
        self.config.method
    }

    pub fn state(&self) -> &RateState {
        &self.state
    }

    /// Overwrite the tracked quota
    pub fn set_state(&mut self, state: RateState) {
        self.state = state;
    }

    /// How long to hold a request back before sending it
    ///
    /// Under `throw`, an exhausted quota whose window has not yet reset is
    /// an error. Under `pace`, the delay spaces the remaining requests
    /// evenly across the rest of the window.
    pub fn pre_call_delay(&self, now: DateTime<Utc>) -> Result<Option<Duration>> {
        let to_reset = seconds_between(now, self.state.reset);
        match self.config.method {
            RateLimitMethod::Wait => Ok(None),
            RateLimitMethod::Throw => {
                if self.state.remaining == 0 && to_reset > 0.0 {
                    return Err(Error::rate_limit("Hit rate limit."));
                }
                Ok(None)
            }
            RateLimitMethod::Pace => {
                if self.state.remaining == 0 {
                    return Ok(self.clamp(to_reset));
                }
                let waited = seconds_between(self.state.last_call, now);
                let spacing = to_reset / f64::from(self.state.remaining);
                let remaining_wait = spacing - waited;
                if remaining_wait <= 0.0 {
                    return Ok(None);
                }
                Ok(self.clamp(remaining_wait / self.config.pace_factor))
            }
        }
    }

    /// Pre-call hook: sleep or fail according to the policy
    pub async fn before_request(&self) -> Result<()> {
        if let Some(delay) = self.pre_call_delay(Utc::now())? {
            debug!("Pacing request, sleeping {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Delay before retrying a request the server rejected with 429
    ///
    /// `None` when the tracked reset time has already passed.
    pub fn retry_delay(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.clamp(seconds_between(now, self.state.reset))
    }

    /// Sleep until the tracked window resets, returning the slept duration
    pub async fn wait_for_reset(&self) -> Option<Duration> {
        let delay = self.retry_delay(Utc::now())?;
        warn!("Rate limited, waiting {:?} for the window to reset", delay);
        tokio::time::sleep(delay).await;
        Some(delay)
    }

    /// Absorb the rate-limit headers of a response
    ///
    /// Returns `false` when the response carries no rate-limit headers. The
    /// reset time is shifted by the skew between the local clock and the
    /// server's `Date` header.
    pub fn update_from_headers(&mut self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<bool> {
        let Some(remaining) = header_str(headers, HEADER_REMAINING) else {
            return Ok(false);
        };

        self.state.remaining = remaining.trim().parse().map_err(|e| {
            Error::rate_limit(format!("Invalid rate limit remaining '{remaining}': {e}"))
        })?;
        if let Some(limit) = header_str(headers, HEADER_LIMIT) {
            self.state.limit = limit.trim().parse().map_err(|e| {
                Error::rate_limit(format!("Invalid rate limit '{limit}': {e}"))
            })?;
        }

        let reset = header_str(headers, HEADER_RESET)
            .ok_or_else(|| Error::rate_limit("Rate limit time calculations failed: no reset"))?;
        let mut reset = parse_reset(reset).ok_or_else(|| {
            Error::rate_limit(format!(
                "Rate limit time calculations failed: bad reset '{reset}'"
            ))
        })?;

        if let Some(date) = header_str(headers, HEADER_DATE) {
            let server_now = DateTime::parse_from_rfc2822(date.trim()).map_err(|e| {
                Error::rate_limit(format!(
                    "Rate limit time calculations failed: bad date '{date}': {e}"
                ))
            })?;
            reset += now - server_now.with_timezone(&Utc);
        }

        self.state.reset = reset;
        self.state.last_call = now;
        debug!(
            remaining = self.state.remaining,
            limit = self.state.limit,
            reset = %self.state.reset,
            "Rate limit state updated"
        );
        Ok(true)
    }

    fn clamp(&self, seconds: f64) -> Option<Duration> {
        if seconds <= 0.0 || !seconds.is_finite() {
            return None;
        }
        Some(Duration::from_secs_f64(seconds).min(self.config.max_wait))
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Reset times come as ISO 8601 timestamps or as epoch seconds
fn parse_reset(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0) as i64))
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use reqwest::header::HeaderValue;

    fn limiter(method: RateLimitMethod, remaining: u32, reset_in: i64) -> (RateLimiter, DateTime<Utc>) {
        let now = Utc::now();
        let mut limiter = RateLimiter::new(RateLimiterConfig::new(method));
        limiter.set_state(RateState {
            limit: 300,
            remaining,
            reset: now + ChronoDuration::seconds(reset_in),
            last_call: now,
        });
        (limiter, now)
    }

    #[test]
    fn test_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.method, RateLimitMethod::Wait);
        assert!((config.pace_factor - 1.1).abs() < f64::EPSILON);
        assert_eq!(config.max_wait, Duration::from_secs(300));
        assert_eq!(config.max_retries, None);
    }

    #[test]
    fn test_throw_fails_when_exhausted() {
        let (limiter, now) = limiter(RateLimitMethod::Throw, 0, 120);
        assert!(matches!(
            limiter.pre_call_delay(now),
            Err(Error::RateLimit { .. })
        ));
    }

    #[test]
    fn test_throw_passes_after_window_reset() {
        let (limiter, now) = limiter(RateLimitMethod::Throw, 0, -5);
        assert_eq!(limiter.pre_call_delay(now).unwrap(), None);
    }

    #[test]
    fn test_wait_never_sleeps_before_call() {
        let (limiter, now) = limiter(RateLimitMethod::Wait, 0, 120);
        assert_eq!(limiter.pre_call_delay(now).unwrap(), None);
    }

    #[test]
    fn test_retry_delay_until_reset() {
        let (limiter, now) = limiter(RateLimitMethod::Wait, 0, 120);
        assert_eq!(limiter.retry_delay(now), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_retry_delay_clamped_to_max_wait() {
        let (limiter, now) = limiter(RateLimitMethod::Wait, 0, 3600);
        assert_eq!(limiter.retry_delay(now), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_retry_delay_none_once_reset_passed() {
        let (limiter, now) = limiter(RateLimitMethod::Wait, 0, -1);
        assert_eq!(limiter.retry_delay(now), None);
    }

    #[test]
    fn test_pace_spreads_requests() {
        // 100s left, 10 requests left, last call just now: 10s spacing / 1.1
        let (limiter, now) = limiter(RateLimitMethod::Pace, 10, 100);
        let delay = limiter.pre_call_delay(now).unwrap().unwrap();
        let expected = 10.0 / 1.1;
        assert!((delay.as_secs_f64() - expected).abs() < 0.01);
    }

    #[test]
    fn test_pace_subtracts_elapsed_time() {
        let (limiter, now) = limiter(RateLimitMethod::Pace, 10, 100);
        let later = now + ChronoDuration::seconds(20);
        // spacing is (80 / 10) = 8s, 20s already passed since the last call
        assert_eq!(limiter.pre_call_delay(later).unwrap(), None);
    }

    #[test]
    fn test_pace_exhausted_sleeps_until_reset() {
        let (limiter, now) = limiter(RateLimitMethod::Pace, 0, 42);
        assert_eq!(
            limiter.pre_call_delay(now).unwrap(),
            Some(Duration::from_secs(42))
        );
    }

    #[test]
    fn test_update_from_headers_corrects_skew() {
        let mut limiter = RateLimiter::new(RateLimiterConfig::default());
        let now = Utc::now();
        // Server clock runs 10 minutes behind ours.
        let server_now = now - ChronoDuration::minutes(10);
        let server_reset = server_now + ChronoDuration::seconds(60);

        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REMAINING, HeaderValue::from_static("12"));
        headers.insert(HEADER_LIMIT, HeaderValue::from_static("300"));
        headers.insert(
            HEADER_RESET,
            HeaderValue::from_str(&server_reset.to_rfc3339()).unwrap(),
        );
        headers.insert(
            HEADER_DATE,
            HeaderValue::from_str(&server_now.to_rfc2822()).unwrap(),
        );

        assert!(limiter.update_from_headers(&headers, now).unwrap());
        let state = limiter.state();
        assert_eq!(state.remaining, 12);
        assert_eq!(state.limit, 300);
        let offset = (state.reset - now).num_seconds();
        assert!((59..=61).contains(&offset), "offset was {offset}");
    }

    #[test]
    fn test_update_without_headers_is_noop() {
        let mut limiter = RateLimiter::new(RateLimiterConfig::default());
        let before = limiter.state().clone();
        assert!(!limiter.update_from_headers(&HeaderMap::new(), Utc::now()).unwrap());
        assert_eq!(limiter.state(), &before);
    }

    #[test]
    fn test_bad_reset_is_rate_limit_error() {
        let mut limiter = RateLimiter::new(RateLimiterConfig::default());
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REMAINING, HeaderValue::from_static("1"));
        headers.insert(HEADER_RESET, HeaderValue::from_static("soon"));

        let err = limiter.update_from_headers(&headers, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::RateLimit { .. }));
        assert!(err.to_string().contains("time calculations failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_reset_sleeps_until_reset() {
        let (limiter, _) = limiter(RateLimitMethod::Wait, 0, 120);
        let start = tokio::time::Instant::now();
        let slept = limiter.wait_for_reset().await.unwrap();
        let elapsed = start.elapsed();

        assert!(slept <= Duration::from_secs(120));
        assert!(slept > Duration::from_secs(119));
        assert!(elapsed >= slept);
    }
}

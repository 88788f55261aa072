//! Sliding-window input rate check for tap events.
use std::collections::VecDeque;

use crate::config::RateLimitConfig;
use crate::constants::{CLICK_WINDOW_MS, MAX_CLICKS_PER_WINDOW};

/// Rejects taps arriving faster than `cap` per `window_ms`.
///
/// Only admitted taps are recorded, so a burst of rejected taps does not
/// extend the lockout.
#[derive(Debug, Clone)]
pub struct ClickRateGuard {
    cap: usize,
    window_ms: u64,
    admitted: VecDeque<u64>,
}

impl Default for ClickRateGuard {
    fn default() -> Self {
        Self::with_limits(MAX_CLICKS_PER_WINDOW, CLICK_WINDOW_MS)
    }
}

impl ClickRateGuard {
    #[must_use]
    pub fn with_limits(cap: usize, window_ms: u64) -> Self {
        Self {
            cap,
            window_ms,
            admitted: VecDeque::with_capacity(cap),
        }
    }

    #[must_use]
    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::with_limits(cfg.max_clicks, cfg.window_ms)
    }

    /// Decide whether a tap at `now_millis` may proceed.
    pub fn admit(&mut self, now_millis: u64) -> bool {
        while let Some(&oldest) = self.admitted.front() {
            if now_millis.saturating_sub(oldest) < self.window_ms {
                break;
            }
            self.admitted.pop_front();
        }

        if self.admitted.len() >= self.cap {
            log::warn!(
                "click rate too high: {} taps within {} ms, rejecting",
                self.admitted.len(),
                self.window_ms
            );
            return false;
        }

        self.admitted.push_back(now_millis);
        true
    }

    /// Number of admitted taps still inside the window as of the last call.
    #[must_use]
    pub fn len(&self) -> usize {
        self.admitted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }

    pub fn clear(&mut self) {
        self.admitted.clear();
    }

    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }
}

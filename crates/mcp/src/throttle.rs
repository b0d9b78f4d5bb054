//! Local write throttle.
//!
//! A sliding window over the timestamps of admitted writes. It is stricter
//! than Harvest's own limits and rejects before any request is made.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default number of writes admitted per window.
pub const DEFAULT_MAX_WRITES: usize = 30;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// A write was rejected because the window is full.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Rate limit exceeded: at most {max_writes} write operations per {window_secs} seconds. \
     Please wait before trying again."
)]
pub struct ThrottleError {
    pub max_writes: usize,
    pub window_secs: u64,
}

/// Sliding-window counter shared by all mutating tools.
#[derive(Debug)]
pub struct WriteThrottle {
    max_writes: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl WriteThrottle {
    pub fn new(max_writes: usize, window: Duration) -> Self {
        Self {
            max_writes,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_writes)),
        }
    }

    /// Admit a write now, or reject it.
    pub fn check(&self) -> Result<(), ThrottleError> {
        self.check_at(Instant::now())
    }

    /// Admit a write at `now`, or reject it.
    ///
    /// Pruning, the count check and recording the admission happen under one
    /// lock, so concurrent callers cannot both take the last slot.
    pub fn check_at(&self, now: Instant) -> Result<(), ThrottleError> {
        let mut admitted = self.admitted.lock().unwrap_or_else(|e| e.into_inner());

        while let Some(&oldest) = admitted.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() >= self.max_writes {
            return Err(ThrottleError {
                max_writes: self.max_writes,
                window_secs: self.window.as_secs(),
            });
        }

        admitted.push_back(now);
        Ok(())
    }

    /// Writes admitted within the current window.
    pub fn in_window(&self) -> usize {
        let now = Instant::now();
        let admitted = self.admitted.lock().unwrap_or_else(|e| e.into_inner());
        admitted
            .iter()
            .filter(|&&ts| now.saturating_duration_since(ts) < self.window)
            .count()
    }

    pub fn max_writes(&self) -> usize {
        self.max_writes
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for WriteThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WRITES, DEFAULT_WINDOW)
    }
}

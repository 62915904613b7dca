//! Minimum-interval request pacing for rate-limited providers

use std::time::{Duration, Instant};

/// Blocks callers so that consecutive `pace()` calls are at least
/// `interval` apart.
///
/// The first call returns immediately; the interval is measured from the
/// moment the previous call returned, so time spent on the request itself
/// counts towards the gap.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Time `pace()` would block if called now.
    pub fn remaining(&self) -> Duration {
        match self.last {
            Some(last) => self.interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Wait out the rest of the interval, then mark a new slot as taken.
    pub fn pace(&mut self) {
        let wait = self.remaining();
        if !wait.is_zero() {
            log::trace!("pacing: sleeping {wait:?}");
            std::thread::sleep(wait);
        }
        self.last = Some(Instant::now());
    }
}

//! Fixed-interval request pacing.
//!
//! The game-metadata API enforces a request-rate ceiling. [`Pacer`] owns the
//! minimum interval between request starts and the timestamp of the last
//! start, and sleeps for whatever remains of the interval before the next
//! request. Time is read through a [`Clock`] and waited out through a
//! [`Sleeper`] so tests can drive both deterministically.

use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Suspends the caller for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration` to pass.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Enforces a minimum interval between the starts of consecutive requests.
///
/// There is no cancellation: once [`Pacer::wait`] decides to sleep, the
/// sleep runs to completion.
#[derive(Debug)]
pub struct Pacer<C = SystemClock, Z = TokioSleeper> {
    min_interval: Duration,
    last_start: Option<Instant>,
    clock: C,
    sleeper: Z,
}

impl Pacer {
    /// Creates a pacer on the wall clock and the tokio timer.
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(min_interval, SystemClock, TokioSleeper)
    }
}

impl<C: Clock, Z: Sleeper> Pacer<C, Z> {
    /// Creates a pacer with an explicit clock and sleeper.
    pub fn with_clock(min_interval: Duration, clock: C, sleeper: Z) -> Self {
        Self {
            min_interval,
            last_start: None,
            clock,
            sleeper,
        }
    }

    /// Minimum interval between request starts.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Start time of the most recent request, if any.
    pub fn last_start(&self) -> Option<Instant> {
        self.last_start
    }

    /// Current time according to the pacer's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Time still to wait before the next request may start.
    pub fn remaining(&self) -> Duration {
        match self.last_start {
            Some(last) => self
                .min_interval
                .saturating_sub(self.clock.now().saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Waits out the remaining interval, then marks a request start.
    ///
    /// Returns the instant the request is allowed to start. The first call
    /// never sleeps.
    pub async fn wait(&mut self) -> Instant {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            log::trace!("Pacing: sleeping {:?} before next request", remaining);
            self.sleeper.sleep(remaining).await;
        }
        let start = self.clock.now();
        self.last_start = Some(start);
        start
    }
}

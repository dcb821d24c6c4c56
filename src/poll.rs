//! Fixed-interval polling with an overall deadline.

use std::{future::Future, time::Duration};

use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;

/// How often and how long to poll a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Poll {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Waiting for a freshly created CRD to become established.
    pub const fn crd_established() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(60))
    }

    /// Waiting for the controller to process an instance.
    pub const fn instance_processed() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(20))
    }

    /// Runs `check` every interval until it yields a value.
    ///
    /// The first check runs immediately. Errors from `check` abort the poll.
    /// Returns `Ok(None)` when the timeout elapses first. A zero interval polls
    /// every millisecond.
    pub async fn until<T, F, Fut>(&self, mut check: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let mut ticker = time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome: Result<Result<T>, _> = time::timeout(self.timeout, async {
            loop {
                ticker.tick().await;
                if let Some(done) = check().await? {
                    return Ok(done);
                }
            }
        })
        .await;

        match outcome {
            Ok(done) => done.map(Some),
            Err(_elapsed) => Ok(None),
        }
    }
}

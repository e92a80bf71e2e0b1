//! Virtual-time environment.
//!
//! Time only moves when a test calls [`SimEnv::advance`], so grace delays,
//! exit windows and ticks are reproducible regardless of host speed.
//! Instants are offsets from the start of the simulation.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::sync::Notify;
use webshell_core::Environment;

#[derive(Debug, Default)]
struct Clock {
    now: Mutex<Duration>,
    advanced: Notify,
}

impl Clock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Simulation environment with a shared virtual clock.
///
/// Clones share the clock: advancing one advances all of them.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    clock: Arc<Clock>,
}

impl SimEnv {
    /// Create an environment at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward and wake every sleeper whose deadline passed.
    pub fn advance(&self, by: Duration) {
        {
            let mut now = self.clock.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now += by;
        }
        self.clock.advanced.notify_waiters();
    }

    /// Time elapsed since the simulation started.
    pub fn elapsed(&self) -> Duration {
        self.clock.now()
    }
}

impl Environment for SimEnv {
    type Instant = Duration;

    fn now(&self) -> Self::Instant {
        self.clock.now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let clock = Arc::clone(&self.clock);
        async move {
            let deadline = clock.now() + duration;
            loop {
                // Register before checking so an advance in between is not lost.
                let advanced = clock.advanced.notified();
                if clock.now() >= deadline {
                    return;
                }
                advanced.await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let other = env.clone();
        env.advance(Duration::from_millis(250));
        assert_eq!(other.now(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn sleep_waits_for_advance() {
        let env = SimEnv::new();
        let sleeper = env.clone();
        let (done_tx, mut done_rx) = tokio::sync::oneshot::channel();

        let waiter = async move {
            sleeper.sleep(Duration::from_secs(1)).await;
            let _ = done_tx.send(());
        };
        let driver = async {
            tokio::task::yield_now().await;
            assert!(done_rx.try_recv().is_err());
            env.advance(Duration::from_millis(600));
            tokio::task::yield_now().await;
            assert!(done_rx.try_recv().is_err());
            env.advance(Duration::from_millis(400));
        };
        tokio::join!(waiter, driver);
        assert!(done_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn zero_sleep_returns_immediately() {
        SimEnv::new().sleep(Duration::ZERO).await;
    }
}

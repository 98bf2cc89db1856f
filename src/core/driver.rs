//! Real-time driver: one owned clock ticking a shared session

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::core::notify::{dispatch, Notifier};
use crate::core::session::Session;

/// Default driver period; finer than the score tick so no tick is late
/// by more than half a period
pub const DRIVER_PERIOD_MS: u64 = 50;

/// Monotonic session clock in milliseconds
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Background task advancing a session. Aborted on [`Driver::stop`] or drop.
#[derive(Debug)]
pub struct Driver {
    handle: Option<JoinHandle<()>>,
}

impl Driver {
    /// Spawn the tick loop. Each tick re-arms before doing any work, so a
    /// slow tick delays at most itself.
    pub fn spawn(
        session: Arc<Mutex<Session>>,
        clock: SessionClock,
        mut notifier: Box<dyn Notifier>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let events = {
                    let mut session = session.lock().await;
                    session.advance(clock.now_ms())
                };
                if !events.is_empty() {
                    dispatch(notifier.as_mut(), &events);
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Idempotent
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("driver stopped");
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::notify::TracingNotifier;
    use crate::types::SessionState;

    #[tokio::test(start_paused = true)]
    async fn test_driver_runs_session_to_finish() {
        let clock = SessionClock::new();
        let mut config = GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        };
        config.session.duration_secs = 3;
        let session = Arc::new(Mutex::new(Session::new(config)));
        session.lock().await.start(clock.now_ms()).unwrap();

        let mut driver = Driver::spawn(
            session.clone(),
            clock,
            Box::new(TracingNotifier),
            Duration::from_millis(DRIVER_PERIOD_MS),
        );
        tokio::time::sleep(Duration::from_millis(3_100)).await;

        assert_eq!(session.lock().await.state(), SessionState::Finished);
        driver.stop();
        driver.stop();
        assert!(!driver.is_running());
    }
}

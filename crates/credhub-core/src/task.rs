//! Cancellable periodic background tasks.
//!
//! Both the abuse-tracker sweep and the lifecycle scheduler run on this
//! helper instead of ambient timers, so tests can drive ticks with tokio's
//! paused clock.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A named background task that runs a closure on a fixed interval until
/// cancelled.
#[derive(Debug)]
pub struct PeriodicTask {
    name: String,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawns a periodic task. The first tick fires immediately; later
    /// ticks wait out the full period. Ticks never overlap: the next tick
    /// is not armed until the previous closure future completes.
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let name = name.into();
        let task_name = name.clone();
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // Biased select: once cancel() has been called, no further
                // tick fires even if one is already due.
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = interval.tick() => tick().await,
                }
            }

            tracing::debug!(task = %task_name, "Periodic task stopped");
        });

        tracing::debug!(task = %name, period_secs = period.as_secs(), "Periodic task started");

        Self {
            name,
            cancel,
            handle,
        }
    }

    /// Requests cancellation. No tick starts after this returns; a tick
    /// already in progress runs to completion (cooperative, not forced).
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
        tracing::debug!(task = %self.name, "Periodic task cancellation requested");
    }

    /// Cancels and waits for the task to finish, including any in-flight
    /// tick.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// The task's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

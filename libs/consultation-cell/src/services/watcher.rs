use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::services::consultation::ConsultationSession;

/// Background queue refresh on a fixed interval (default 10 s). The fetch
/// runs outside the session lock; the snapshot is installed through
/// `apply_poll`, so a tick that raced a manual refresh or a commit reload is
/// discarded instead of overwriting fresher state.
pub struct QueueWatcher {
    handle: JoinHandle<()>,
}

impl QueueWatcher {
    pub fn spawn(session: Arc<Mutex<ConsultationSession>>, config: &AppConfig) -> Self {
        Self::spawn_with_interval(
            session,
            Duration::from_secs(config.queue_poll_interval_secs),
        )
    }

    pub fn spawn_with_interval(
        session: Arc<Mutex<ConsultationSession>>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let ctx = session.lock().await.poll_context();
                match ctx
                    .gateway
                    .list_appointments(&ctx.query, ctx.token.as_deref())
                    .await
                {
                    Ok(rows) => {
                        let applied = session.lock().await.apply_poll(ctx.version, rows);
                        if !applied {
                            debug!("Poll snapshot superseded before it landed");
                        }
                    }
                    Err(err) => {
                        // A failed poll is not surfaced to the doctor; the
                        // next tick retries.
                        warn!("Queue poll failed: {}", err);
                    }
                }
            }
        });

        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for QueueWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

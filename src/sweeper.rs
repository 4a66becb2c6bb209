//! Background eviction of idle buckets.
//!
//! The sweep runs as a tokio task on its own timer, off the admission path.
//! Each tick it calls [`BucketRegistry::evict_idle`] with the configured TTL.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::EvictionConfig;
use crate::error::ConfigResult;
use crate::registry::BucketRegistry;

/// Handle to a running sweep task.
///
/// Dropping the handle stops the task at its next wake-up; call
/// [`shutdown`](Self::shutdown) to stop it and wait for it to finish.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

/// Starts sweeping `registry` every `config.sweep_interval`.
///
/// Must be called from within a tokio runtime. The first sweep happens
/// immediately.
///
/// # Errors
/// Returns the [`EvictionConfig::validate`] error when the settings do not fit
/// the registry's bucket shape, such as an idle TTL shorter than a full refill.
pub fn spawn_sweeper<C>(
    registry: Arc<BucketRegistry<C>>,
    config: EvictionConfig,
) -> ConfigResult<Sweeper>
where
    C: Clock + 'static,
{
    config.validate(registry.config())?;

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            idle_ttl = ?config.idle_ttl,
            sweep_interval = ?config.sweep_interval,
            "Bucket sweeper started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,

                _ = ticker.tick() => {
                    let evicted = registry.evict_idle(config.idle_ttl);
                    if evicted > 0 {
                        info!(evicted, remaining = registry.len(), "Evicted idle buckets");
                    }
                }
            }
        }

        debug!("Bucket sweeper stopped");
    });

    Ok(Sweeper {
        shutdown_tx: Some(shutdown_tx),
        handle,
    })
}

impl Sweeper {
    /// Signals the task to stop and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            warn!(error = %e, "Bucket sweeper task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

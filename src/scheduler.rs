use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::ReplacePolicy;
use crate::error::{FetchError, StoreError};
use crate::fetcher::Fetcher;
use crate::store::Store;

/// What one ingestion cycle did.
#[derive(Debug)]
pub struct CycleOutcome {
    /// Articles persisted into the new snapshot.
    pub stored: usize,
    /// Endpoints that failed this cycle. Each one was logged and skipped;
    /// the next cycle will try it again from scratch.
    pub failures: Vec<FetchError>,
}

/// Drives the fetch-normalize-persist loop over the configured source set.
///
/// `run_cycle` is the single-cycle operation, used directly by tests to run
/// a bounded number of cycles without wall-clock sleeps; `start` wraps it in
/// a cancellable periodic task.
pub struct Scheduler {
    store: Arc<Store>,
    fetcher: Fetcher,
    endpoints: Vec<String>,
    interval: Duration,
    policy: ReplacePolicy,
}

impl Scheduler {
    pub fn new(
        store: Arc<Store>,
        fetcher: Fetcher,
        endpoints: Vec<String>,
        interval: Duration,
        policy: ReplacePolicy,
    ) -> Self {
        Self {
            store,
            fetcher,
            endpoints,
            interval,
            policy,
        }
    }

    /// Run exactly one ingestion cycle.
    ///
    /// Endpoints are fetched sequentially; a failing endpoint is logged,
    /// recorded in the outcome, and never aborts the rest of the cycle. A
    /// store failure does abort the cycle's write step and propagates.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, StoreError> {
        info!(
            "Starting ingestion cycle over {} endpoints",
            self.endpoints.len()
        );

        let mut failures = Vec::new();
        let mut stored = 0usize;

        match self.policy {
            ReplacePolicy::ClearFirst => {
                let removed = self.store.clear().await?;
                info!("Cleared {} articles from the previous snapshot", removed);

                for endpoint in &self.endpoints {
                    match self.fetcher.fetch(endpoint).await {
                        Ok(articles) => {
                            self.store.insert_batch(&articles).await?;
                            stored += articles.len();
                        }
                        Err(e) => {
                            warn!("Endpoint failed, skipping: {}", e);
                            failures.push(e);
                        }
                    }
                }
            }
            ReplacePolicy::StageAndSwap => {
                let mut staged = Vec::new();
                for endpoint in &self.endpoints {
                    match self.fetcher.fetch(endpoint).await {
                        Ok(mut articles) => staged.append(&mut articles),
                        Err(e) => {
                            warn!("Endpoint failed, skipping: {}", e);
                            failures.push(e);
                        }
                    }
                }
                stored = staged.len();
                self.store.replace_all(&staged).await?;
            }
        }

        info!(
            "Ingestion cycle finished: {} articles stored, {} endpoints failed",
            stored,
            failures.len()
        );
        Ok(CycleOutcome { stored, failures })
    }

    /// Spawn the periodic ingestion task.
    ///
    /// The first cycle runs immediately; subsequent cycles run every
    /// `interval`. Cycles never overlap: if one runs longer than the
    /// interval, the next tick is deferred until it finishes. A store
    /// failure abandons that cycle and the loop waits for the next tick.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cycle().await {
                            error!("Cycle abandoned, will retry next tick: {}", e);
                        }
                    }
                    // Also fires when the handle is dropped.
                    _ = shutdown_rx.changed() => {
                        info!("Scheduler stopping");
                        break;
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the task to stop after the current cycle, if one is in flight.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Wait for the task to finish after a `stop`.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    models::{GlobalStats, Snapshot},
    services::stats_aggregator::StatsAggregator,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Polling { account: String },
}

struct PollTask {
    account: String,
    handle: JoinHandle<()>,
}

/// Polling Scheduler - Owns the current snapshot and refreshes it on a fixed cadence
///
/// A connection runs its cycles one after another inside a single task.
/// Disconnecting, switching accounts or shutting down aborts that task, and
/// the generation counter stops a superseded cycle from ever publishing.
pub struct PollingScheduler {
    aggregator: Arc<StatsAggregator>,
    interval: Duration,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    generation: Arc<AtomicU64>,
    task: Mutex<Option<PollTask>>,
}

impl PollingScheduler {
    pub fn new(aggregator: Arc<StatsAggregator>, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::unavailable()));
        Self {
            aggregator,
            interval,
            snapshot_tx,
            generation: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        }
    }

    // Internal helper that tolerates a poisoned task slot.
    fn task_slot(&self) -> MutexGuard<'_, Option<PollTask>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts polling for `account`: one cycle immediately, then every interval.
    ///
    /// Connecting the account that is already being polled is a no-op.
    pub fn connect(&self, account: String) {
        let mut slot = self.task_slot();
        if let Some(task) = slot.as_ref() {
            if task.account == account && !task.handle.is_finished() {
                tracing::debug!("Already polling {}", account);
                return;
            }
            tracing::info!("Account changed from {} to {}", task.account, account);
        }

        // Global stats do not depend on the account; carry them across a switch.
        let seed = self.snapshot_tx.borrow().global_stats.clone();

        if let Some(previous) = Self::stop_locked(&mut slot, &self.generation) {
            tracing::info!("Stopped polling for {}", previous);
            self.snapshot_tx.send_replace(Arc::new(Snapshot::unavailable()));
        }

        let my_generation = self.generation.load(Ordering::SeqCst);
        let handle = tokio::spawn(run_polling(
            self.aggregator.clone(),
            account.clone(),
            self.interval,
            self.snapshot_tx.clone(),
            self.generation.clone(),
            my_generation,
            seed,
        ));
        tracing::info!(
            "Polling {} every {}s",
            account,
            self.interval.as_secs()
        );
        *slot = Some(PollTask { account, handle });
    }

    /// Cancels polling and publishes an `unavailable` snapshot.
    pub fn disconnect(&self) {
        let mut slot = self.task_slot();
        let stopped = Self::stop_locked(&mut slot, &self.generation);
        self.snapshot_tx.send_replace(Arc::new(Snapshot::unavailable()));
        if let Some(account) = stopped {
            tracing::info!("Disconnected {}; polling stopped", account);
        }
    }

    /// Releases the periodic trigger when the hosting process is torn down.
    pub fn shutdown(&self) {
        let mut slot = self.task_slot();
        if let Some(account) = Self::stop_locked(&mut slot, &self.generation) {
            tracing::info!("Scheduler shut down while polling {}", account);
        }
    }

    pub fn state(&self) -> SchedulerState {
        match self.task_slot().as_ref() {
            Some(task) => SchedulerState::Polling {
                account: task.account.clone(),
            },
            None => SchedulerState::Idle,
        }
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.state(), SchedulerState::Polling { .. })
    }

    /// Read-only handle on the latest published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    // Internal helper that aborts the running task and invalidates its generation.
    fn stop_locked(slot: &mut Option<PollTask>, generation: &AtomicU64) -> Option<String> {
        let task = slot.take()?;
        generation.fetch_add(1, Ordering::SeqCst);
        task.handle.abort();
        Some(task.account)
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        let mut slot = self.task_slot();
        Self::stop_locked(&mut slot, &self.generation);
    }
}

async fn run_polling(
    aggregator: Arc<StatsAggregator>,
    account: String,
    period: Duration,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    generation: Arc<AtomicU64>,
    my_generation: u64,
    seed: GlobalStats,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut previous = seed;

    loop {
        ticker.tick().await;

        let snapshot = aggregator.collect(Some(&account), Some(&previous)).await;
        previous = snapshot.global_stats.clone();

        let published = snapshot_tx.send_if_modified(|current| {
            if generation.load(Ordering::SeqCst) != my_generation {
                return false;
            }
            *current = Arc::new(snapshot);
            true
        });
        if !published {
            tracing::debug!("Discarded stale cycle for {}", account);
            return;
        }
    }
}

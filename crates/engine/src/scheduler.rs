//! Periodic driver for the cluster.
//!
//! Two timers: the monitor tick (default 3 s) and the route refresh (default
//! 5 s). Missed ticks are skipped, never bunched, and the cluster lock is
//! held only for the synchronous call, so ticks never overlap.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cluster::Cluster;
use crate::config::ScheduleConfig;

/// Counters accumulated over one scheduler run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub ticks: u64,
    pub rebalances: u64,
    pub route_refreshes: u64,
    pub failures: u64,
}

pub struct Scheduler {
    cluster: Arc<Mutex<Cluster>>,
    config: ScheduleConfig,
    max_ticks: Option<u64>,
}

/// Handle to a spawned scheduler.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<SchedulerStats>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the loop to finish its current step.
    pub async fn shutdown(self) -> SchedulerStats {
        let _ = self.shutdown.send(true);
        self.join().await
    }

    /// Wait for the loop to stop on its own (tick limit reached).
    pub async fn join(self) -> SchedulerStats {
        match self.task.await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "scheduler task failed");
                SchedulerStats::default()
            }
        }
    }
}

impl Scheduler {
    pub fn new(cluster: Arc<Mutex<Cluster>>, config: ScheduleConfig) -> Self {
        Self {
            cluster,
            config,
            max_ticks: None,
        }
    }

    /// Stop after `ticks` monitor ticks.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(self.run(rx));
        SchedulerHandle { shutdown, task }
    }

    /// Drive the cluster until shutdown is signalled or the tick limit is hit.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> SchedulerStats {
        let mut stats = SchedulerStats::default();
        let mut tick_timer = interval(self.config.tick_interval());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut route_timer = interval(self.config.route_interval());
        route_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_ms = self.config.tick_ms,
            route_ms = self.config.route_refresh_ms,
            "scheduler started"
        );
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("scheduler shutting down");
                        break;
                    }
                }
                _ = tick_timer.tick() => {
                    let outcome = self.cluster.lock().tick();
                    stats.ticks += 1;
                    match outcome {
                        Ok(outcome) => {
                            if outcome.rebalance.is_some() {
                                stats.rebalances += 1;
                            }
                        }
                        Err(err) => {
                            stats.failures += 1;
                            warn!(error = %err, "scheduled tick failed");
                        }
                    }
                    if self.max_ticks.is_some_and(|max| stats.ticks >= max) {
                        break;
                    }
                }
                _ = route_timer.tick() => {
                    let refreshed = self.cluster.lock().refresh_route();
                    match refreshed {
                        Ok(Some(plan)) => {
                            stats.route_refreshes += 1;
                            debug!(order = %plan.order_id, total = %plan.total_cost, "route refreshed");
                        }
                        Ok(None) => {}
                        Err(err) => {
                            stats.failures += 1;
                            warn!(kind = err.kind(), error = %err, "route refresh failed");
                        }
                    }
                }
            }
        }
        info!(ticks = stats.ticks, rebalances = stats.rebalances, "scheduler stopped");
        stats
    }
}

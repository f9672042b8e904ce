//! Subcommands and their execution against a freshly seeded cluster.

use std::sync::Arc;

use clap::Subcommand;
use corelib::Node;
use engine::{handle, ApiRequest, ApiResponse, Cluster, EngineConfig, ScheduleConfig, Scheduler, SchedulerStats};
use parking_lot::Mutex;
use routing::RouteRequest;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List warehouses with status, metrics and ring position.
    Nodes,

    /// Show the ring snapshot.
    Ring,

    /// Show the key range owned by each warehouse.
    Ownership,

    /// Resolve a key (order id, SKU) to its owning warehouse.
    Locate {
        key: String,
    },

    /// Optimize a route.
    Route {
        /// Source warehouse id or name.
        #[arg(long)]
        source: String,

        /// Destination warehouse or city.
        #[arg(long)]
        destination: String,

        /// dijkstra, astar or greedy.
        #[arg(long, default_value = "dijkstra")]
        algorithm: String,
    },

    /// Force a status reshuffle and rebalance the ring.
    Rebalance,

    /// Advance the fleet monitor.
    Tick {
        #[arg(long, default_value = "1")]
        count: u32,
    },

    /// Run the periodic scheduler.
    Run {
        /// Stop after this many ticks; runs until ctrl-c otherwise.
        #[arg(long)]
        ticks: Option<u64>,

        #[arg(long)]
        tick_ms: Option<u64>,

        #[arg(long)]
        route_ms: Option<u64>,
    },
}

/// What a command prints.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    Response(ApiResponse),
    Responses(Vec<ApiResponse>),
    #[serde(rename_all = "camelCase")]
    Run {
        stats: SchedulerStats,
        nodes: Vec<Node>,
    },
}

impl CommandResult {
    /// First error message carried by the result, if any.
    pub fn error(&self) -> Option<String> {
        let message = |response: &ApiResponse| match response {
            ApiResponse::Error { kind, message, .. } => Some(format!("{kind}: {message}")),
            _ => None,
        };
        match self {
            CommandResult::Response(response) => message(response),
            CommandResult::Responses(responses) => responses.iter().find_map(message),
            CommandResult::Run { .. } => None,
        }
    }
}

impl Command {
    pub fn execute(self, mut cluster: Cluster, config: &EngineConfig) -> anyhow::Result<CommandResult> {
        let request = match self {
            Command::Nodes => ApiRequest::Nodes,
            Command::Ring => ApiRequest::Ring,
            Command::Ownership => ApiRequest::Ownership,
            Command::Locate { key } => ApiRequest::Locate { key },
            Command::Route {
                source,
                destination,
                algorithm,
            } => ApiRequest::OptimizeRoute(RouteRequest::new(source, destination, algorithm)),
            Command::Rebalance => ApiRequest::Rebalance,
            Command::Tick { count } => {
                let responses = (0..count.max(1))
                    .map(|_| handle(&mut cluster, ApiRequest::Tick))
                    .collect();
                return Ok(CommandResult::Responses(responses));
            }
            Command::Run {
                ticks,
                tick_ms,
                route_ms,
            } => {
                let mut schedule = config.schedule.clone();
                schedule.tick_ms = tick_ms.unwrap_or(schedule.tick_ms).max(1);
                schedule.route_refresh_ms = route_ms.unwrap_or(schedule.route_refresh_ms).max(1);
                return run_scheduler(cluster, schedule, ticks);
            }
        };
        Ok(CommandResult::Response(handle(&mut cluster, request)))
    }
}

fn run_scheduler(cluster: Cluster, schedule: ScheduleConfig, ticks: Option<u64>) -> anyhow::Result<CommandResult> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let cluster = Arc::new(Mutex::new(cluster));

    let stats = runtime.block_on(async {
        let mut scheduler = Scheduler::new(Arc::clone(&cluster), schedule);
        if let Some(ticks) = ticks {
            scheduler = scheduler.with_max_ticks(ticks);
        }
        let handle = scheduler.spawn();
        match ticks {
            Some(_) => handle.join().await,
            None => {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!(error = %err, "cannot listen for ctrl-c, stopping");
                }
                info!("interrupt received");
                handle.shutdown().await
            }
        }
    });

    let nodes = cluster.lock().nodes();
    Ok(CommandResult::Run { stats, nodes })
}

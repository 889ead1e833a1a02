//! Command-line surface, mirroring the node crate's `cli` module shape: a small
//! `clap`-derive enum dispatched from `bin/main.rs`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::{ClusterConfig, Configuration, MaliciousMode, NodeConfig, Optimisations};
use crate::metrics::MetricsSink;
use crate::process::{Process, DEFAULT_IDLE_TIMEOUT};
use crate::transport::SimulatedTransport;

#[derive(Debug, Parser)]
#[command(name = "bft-broadcast", about = "Layered Byzantine-tolerant broadcast simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a scenario file and run the simulated cluster to quiescence.
    Run {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },
    /// Write a default scenario config to disk.
    Init {
        #[arg(long)]
        out: PathBuf,
    },
}

/// Runs a full N-process simulation described by `cluster`, all within this process
/// using the in-memory [`SimulatedTransport`] (§1.1): one tokio task per simulated
/// process, communicating over unbounded channels.
pub async fn run_cluster(cluster: ClusterConfig, metrics_out: Option<PathBuf>) -> anyhow::Result<()> {
    cluster.validate()?;
    let ids: Vec<_> = (0..cluster.n).collect();
    let (transport, mut receivers) = SimulatedTransport::new(&ids);
    let transport = Arc::new(transport);

    let starters = cluster.starter_nodes.clone();
    let schedule = cluster.broadcast_schedule.clone();
    let node_configs = cluster.node_configs();

    let mut handles = Vec::new();
    for node in node_configs {
        let id = node.id;
        let inbound = receivers
            .remove(&id)
            .expect("SimulatedTransport::new returns a receiver per configured id");
        let configuration = Configuration {
            cluster: cluster.clone(),
            node,
        };
        let metrics = match &metrics_out {
            Some(path) => MetricsSink::new(Some(path.clone())),
            None => MetricsSink::disabled(),
        };
        let mut process = Process::new(&configuration, transport.clone(), metrics);
        let count = schedule.get(&id).copied().unwrap_or(0);
        let is_starter = starters.contains(&id);

        handles.push(tokio::spawn(async move {
            if is_starter && count > 0 {
                process.run_schedule(count).await;
            }
            process.run(inbound, DEFAULT_IDLE_TIMEOUT).await;
            process
        }));
    }

    drop(transport);
    for handle in handles {
        handle.await?;
    }
    Ok(())
}

pub fn default_scenario() -> ClusterConfig {
    ClusterConfig {
        n: 4,
        f: 1,
        starter_nodes: vec![0],
        broadcast_schedule: HashMap::from([(0, 1)]),
        causal_chain: HashMap::new(),
        optimisations: Optimisations::default(),
        malicious: HashMap::new(),
    }
}

#[allow(dead_code)]
fn default_node() -> NodeConfig {
    NodeConfig {
        id: 0,
        peers: vec![1, 2, 3],
        malicious_mode: MaliciousMode::Off,
    }
}

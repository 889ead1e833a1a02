use std::path::PathBuf;

use anyhow::Context;
use bft_broadcast::cli::{default_scenario, run_cluster, Cli, Command};
use bft_broadcast::logging::init_logging;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, metrics_out } => {
            let contents = std::fs::read_to_string(&config)
                .with_context(|| format!("reading scenario file {}", config.display()))?;
            let cluster: bft_broadcast::ClusterConfig = toml::from_str(&contents)
                .with_context(|| format!("parsing scenario file {}", config.display()))?;
            run_cluster(cluster, metrics_out).await?;
        }
        Command::Init { out } => {
            write_scenario(&out)?;
        }
    }

    Ok(())
}

fn write_scenario(out: &PathBuf) -> anyhow::Result<()> {
    let scenario = default_scenario();
    let serialized = toml::to_string(&scenario).context("serializing default scenario")?;
    std::fs::write(out, serialized).with_context(|| format!("writing {}", out.display()))?;
    log::info!("wrote default scenario to {}", out.display());
    Ok(())
}

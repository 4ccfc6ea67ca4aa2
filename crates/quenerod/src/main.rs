//! Quenero node entry point
//!
//! Selects the network from the command line, validates the compiled-in
//! parameter table, and wires the node's subsystems. The node refuses to
//! start if any part of the table is inconsistent.

use std::sync::Arc;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use quenero_core::{BlockchainObjects, LifecycleJournal};
use quenero_params::p2p::P2pDefaults;
use quenero_params::{ConsensusParams, ForkParams, HardForkVersion, NetworkConfig, NetworkType};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quenerod")]
#[command(about = "Quenero network node", long_about = None)]
#[command(group(ArgGroup::new("network").args(["testnet", "devnet", "fakechain"])))]
struct Cli {
    /// Run on testnet
    #[arg(long)]
    testnet: bool,

    /// Run on devnet
    #[arg(long)]
    devnet: bool,

    /// Run a local fake chain (regtest)
    #[arg(long, alias = "regtest")]
    fakechain: bool,

    /// Hard-fork version to resolve parameters for (defaults to the latest)
    #[arg(long, value_name = "VERSION")]
    hard_fork: Option<u8>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn network(&self) -> NetworkType {
        if self.testnet {
            NetworkType::Testnet
        } else if self.devnet {
            NetworkType::Devnet
        } else if self.fakechain {
            NetworkType::Fakechain
        } else {
            NetworkType::Mainnet
        }
    }

    fn hard_fork(&self) -> HardForkVersion {
        self.hard_fork
            .map(HardForkVersion::new)
            .unwrap_or(HardForkVersion::LATEST)
    }
}

/// Resolved configuration as printed by `--print-config`
#[derive(Serialize)]
struct ConfigReport<'a> {
    network: &'a NetworkConfig,
    hard_fork: u8,
    codename: Option<&'static str>,
    fork_params: &'a ForkParams,
    governance_wallet: &'static str,
    difficulty_blocks_count: u64,
    estimated_height: u64,
    p2p: &'static P2pDefaults,
}

impl<'a> ConfigReport<'a> {
    fn new(params: &'a ConsensusParams, version: HardForkVersion) -> Self {
        Self {
            network: params.network,
            hard_fork: version.get(),
            codename: version.codename(),
            fork_params: params.fork_params(version),
            governance_wallet: params.governance_wallet_address(version),
            difficulty_blocks_count: params.difficulty_blocks_count(version),
            estimated_height: params.estimate_current_height(),
            p2p: params.network.p2p_defaults(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let network = cli.network();
    let version = cli.hard_fork();

    let params = ConsensusParams::load(network)
        .with_context(|| format!("refusing to start: {} parameters are invalid", network))?;

    if cli.print_config {
        let report = ConfigReport::new(&params, version);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let objects = BlockchainObjects::with_genesis_version(
        Arc::new(params),
        LifecycleJournal::new(),
        version,
    );

    let params = objects.params();
    info!(
        "Node ready on {} (p2p {}, rpc {}), hard fork {}",
        network,
        params.network.ports.p2p,
        params.network.ports.rpc,
        objects.blockchain().hard_fork_version()
    );
    info!(
        "Estimated network height {}, governance payouts every {} blocks",
        params.estimate_current_height(),
        params.network.governance_reward_interval
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_mainnet() {
        let cli = Cli::try_parse_from(["quenerod"]).unwrap();
        assert_eq!(cli.network(), NetworkType::Mainnet);
        assert_eq!(cli.hard_fork(), HardForkVersion::LATEST);
        assert!(!cli.print_config);
    }

    #[test]
    fn test_network_flags() {
        let cli = Cli::try_parse_from(["quenerod", "--testnet"]).unwrap();
        assert_eq!(cli.network(), NetworkType::Testnet);

        let cli = Cli::try_parse_from(["quenerod", "--devnet"]).unwrap();
        assert_eq!(cli.network(), NetworkType::Devnet);

        let cli = Cli::try_parse_from(["quenerod", "--regtest"]).unwrap();
        assert_eq!(cli.network(), NetworkType::Fakechain);
    }

    #[test]
    fn test_network_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["quenerod", "--testnet", "--devnet"]).is_err());
        assert!(Cli::try_parse_from(["quenerod", "--fakechain", "--testnet"]).is_err());
    }

    #[test]
    fn test_hard_fork_flag() {
        let cli = Cli::try_parse_from(["quenerod", "--hard-fork", "16"]).unwrap();
        assert_eq!(cli.hard_fork(), HardForkVersion::V16_PULSE);
        assert!(Cli::try_parse_from(["quenerod", "--hard-fork", "300"]).is_err());
    }

    #[test]
    fn test_config_report_serializes() {
        let params = ConsensusParams::load(NetworkType::Fakechain).unwrap();
        let report = ConfigReport::new(&params, HardForkVersion::V18);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["hard_fork"], 18);
        assert_eq!(json["difficulty_blocks_count"], 60);
        assert_eq!(json["fork_params"]["min_outputs"], 2);
        assert_eq!(json["network"]["network_type"], "fakechain");
    }
}

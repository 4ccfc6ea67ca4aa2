//! Startup consistency checks
//!
//! A corrupted table would let this node accept blocks the rest of the
//! network rejects, so every check here is fatal.

use tracing::{debug, info};

use crate::derived::blocks_expected_in_years;
use crate::network::{NetworkConfig, NetworkType};
use crate::{Error, Result};

fn invariant(network: NetworkType, detail: impl Into<String>) -> Error {
    Error::Invariant {
        network,
        detail: detail.into(),
    }
}

/// Check the invariants of a single record
pub fn validate_config(config: &NetworkConfig) -> Result<()> {
    let network = config.network_type;

    if !config.address_prefixes.are_distinct() {
        return Err(invariant(
            network,
            format!("address prefixes collide: {:?}", config.address_prefixes),
        ));
    }

    if !config.ports.are_distinct() {
        return Err(invariant(
            network,
            format!("default ports collide: {:?}", config.ports),
        ));
    }

    config.genesis()?;

    let interval = config.governance_reward_interval;
    let max_interval = blocks_expected_in_years(1);
    if interval == 0 || interval > max_interval {
        return Err(invariant(
            network,
            format!(
                "governance interval {} outside 1..={} blocks",
                interval, max_interval
            ),
        ));
    }

    validate_governance_wallets(config)?;

    if !config.uptime_proof.is_consistent() {
        return Err(invariant(
            network,
            format!("uptime proof timing inconsistent: {:?}", config.uptime_proof),
        ));
    }

    debug!("{} configuration passed validation", network);
    Ok(())
}

fn validate_governance_wallets(config: &NetworkConfig) -> Result<()> {
    let network = config.network_type;
    let wallets = config.governance_wallets;

    if wallets.is_empty() {
        return Err(invariant(network, "no governance wallet configured"));
    }

    if let Some(blank) = wallets.iter().find(|wallet| wallet.address.trim().is_empty()) {
        return Err(invariant(
            network,
            format!("blank governance wallet from {}", blank.activation),
        ));
    }

    for pair in wallets.windows(2) {
        if pair[1].activation <= pair[0].activation {
            return Err(invariant(
                network,
                format!(
                    "governance wallets not ascending: {} follows {}",
                    pair[1].activation, pair[0].activation
                ),
            ));
        }
    }

    Ok(())
}

/// Check every record and the invariants that span records
pub fn validate_configs(configs: &[&NetworkConfig]) -> Result<()> {
    for config in configs {
        validate_config(config)?;
    }

    for (i, first) in configs.iter().enumerate() {
        for second in &configs[i + 1..] {
            if first.network_id == second.network_id {
                return Err(Error::DuplicateNetworkId {
                    id: first.network_id,
                    first: first.network_type,
                    second: second.network_type,
                });
            }
        }
    }

    Ok(())
}

/// Check the compiled-in table for all four networks
pub fn validate_network_table() -> Result<()> {
    validate_configs(&NetworkConfig::all())?;
    info!("Network parameter table validated ({} networks)", NetworkType::ALL.len());
    Ok(())
}

//! Masternode registry
//!
//! Tracks registered masternodes and their uptime proofs, and works out which
//! governance address is owed a payout as blocks arrive.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use quenero_params::consensus::{MAX_NUMBER_OF_CONTRIBUTORS, MIN_PORTIONS, STAKING_PORTIONS};
use quenero_params::ConsensusParams;
use tracing::{debug, info, warn};

use crate::blockchain::ChainTip;
use crate::lifecycle::{LifecycleEvent, LifecycleJournal, Subsystem};
use crate::objects::Siblings;
use crate::{Error, Result};

/// Governance payouts kept for inspection, newest last
pub const RETAINED_GOVERNANCE_PAYOUTS: usize = 16;

/// Registered masternode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasternodeEntry {
    /// Chain height at registration
    pub registration_height: u64,
    /// Staking portions per contributor, operator first
    pub contributions: Vec<u64>,
    /// Timestamp of the last accepted uptime proof
    pub last_uptime_proof: Option<i64>,
}

impl MasternodeEntry {
    fn is_active(&self, now: i64, validity_secs: u64) -> bool {
        self.last_uptime_proof
            .is_some_and(|last| now >= last && now.abs_diff(last) <= validity_secs)
    }
}

/// Governance payout observed at a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernancePayout {
    /// Block height
    pub height: u64,
    /// Receiving address
    pub address: &'static str,
}

/// Masternode registry
#[derive(Debug)]
pub struct MasternodeList {
    siblings: Siblings,
    params: Arc<ConsensusParams>,
    journal: LifecycleJournal,
    nodes: RwLock<HashMap<String, MasternodeEntry>>,
    payouts: RwLock<VecDeque<GovernancePayout>>,
}

impl MasternodeList {
    pub(crate) fn new(
        siblings: Siblings,
        params: Arc<ConsensusParams>,
        journal: LifecycleJournal,
    ) -> Self {
        journal.record(LifecycleEvent::Constructed {
            subsystem: Subsystem::MasternodeList,
            siblings_reachable: siblings.is_reachable(),
        });

        Self {
            siblings,
            params,
            journal,
            nodes: RwLock::new(HashMap::new()),
            payouts: RwLock::new(VecDeque::with_capacity(RETAINED_GOVERNANCE_PAYOUTS)),
        }
    }

    /// Handle to the sibling subsystems
    pub fn siblings(&self) -> &Siblings {
        &self.siblings
    }

    /// Register `pubkey` at the current chain height
    ///
    /// `contributions` are staking portions, operator first. There may be at
    /// most [`MAX_NUMBER_OF_CONTRIBUTORS`], each at least [`MIN_PORTIONS`]
    /// except the last, and together they must fill [`STAKING_PORTIONS`].
    pub fn register(&self, pubkey: &str, contributions: &[u64]) -> Result<()> {
        let objects = self.siblings.get()?;
        check_contributions(contributions)?;

        let height = objects.blockchain().height();
        let mut nodes = self.nodes.write();
        if nodes.contains_key(pubkey) {
            return Err(Error::DuplicateMasternode(pubkey.to_string()));
        }

        info!("Registered masternode {} at height {}", pubkey, height);
        nodes.insert(
            pubkey.to_string(),
            MasternodeEntry {
                registration_height: height,
                contributions: contributions.to_vec(),
                last_uptime_proof: None,
            },
        );
        Ok(())
    }

    /// Accept an uptime proof stamped `timestamp`, received at `now`
    pub fn record_uptime_proof(&self, pubkey: &str, timestamp: i64, now: i64) -> Result<()> {
        let timing = self.params.network.uptime_proof;

        if timestamp.abs_diff(now) > timing.tolerance.as_secs() {
            warn!(
                "Uptime proof from {} is {}s off local time",
                pubkey,
                timestamp.abs_diff(now)
            );
            return Err(Error::UptimeProofRejected(format!(
                "timestamp {} outside {}s of {}",
                timestamp,
                timing.tolerance.as_secs(),
                now
            )));
        }

        let mut nodes = self.nodes.write();
        let entry = nodes
            .get_mut(pubkey)
            .ok_or_else(|| Error::UnknownMasternode(pubkey.to_string()))?;

        if let Some(last) = entry.last_uptime_proof {
            let spacing = timestamp.saturating_sub(last);
            let min_interval = timing.min_proof_interval().as_secs();
            if spacing < 0 || spacing.unsigned_abs() < min_interval {
                return Err(Error::UptimeProofRejected(format!(
                    "proof {}s after the previous one",
                    spacing
                )));
            }
        }

        debug!("Uptime proof from {} at {}", pubkey, timestamp);
        entry.last_uptime_proof = Some(timestamp);
        Ok(())
    }

    /// Check if `pubkey` has a proof still valid at `now`
    pub fn is_active(&self, pubkey: &str, now: i64) -> bool {
        let validity = self.params.network.uptime_proof.validity.as_secs();
        self.nodes
            .read()
            .get(pubkey)
            .is_some_and(|entry| entry.is_active(now, validity))
    }

    /// Number of masternodes with a valid proof at `now`
    pub fn active_count(&self, now: i64) -> usize {
        let validity = self.params.network.uptime_proof.validity.as_secs();
        self.nodes
            .read()
            .values()
            .filter(|entry| entry.is_active(now, validity))
            .count()
    }

    /// Registered entry for `pubkey`
    pub fn get(&self, pubkey: &str) -> Option<MasternodeEntry> {
        self.nodes.read().get(pubkey).cloned()
    }

    /// Number of registered masternodes
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Check if no masternode is registered
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Governance address owed a payout at `height`, if any
    ///
    /// Uses the chain's current hard-fork version to pick the address.
    pub fn governance_payout(&self, height: u64) -> Result<Option<&'static str>> {
        let objects = self.siblings.get()?;
        if !self.params.is_governance_reward_height(height) {
            return Ok(None);
        }
        let version = objects.blockchain().hard_fork_version();
        Ok(Some(self.params.governance_wallet_address(version)))
    }

    /// Most recent payouts (at most [`RETAINED_GOVERNANCE_PAYOUTS`]), oldest first
    pub fn governance_payouts(&self) -> Vec<GovernancePayout> {
        self.payouts.read().iter().copied().collect()
    }

    pub(crate) fn on_block_added(&self, tip: &ChainTip) {
        if !self.params.is_governance_reward_height(tip.height) {
            return;
        }

        let address = self.params.governance_wallet_address(tip.version);
        info!("Governance payout due at height {} to {}", tip.height, address);
        let mut payouts = self.payouts.write();
        if payouts.len() == RETAINED_GOVERNANCE_PAYOUTS {
            payouts.pop_front();
        }
        payouts.push_back(GovernancePayout {
            height: tip.height,
            address,
        });
    }
}

impl Drop for MasternodeList {
    fn drop(&mut self) {
        self.journal
            .record(LifecycleEvent::Dropped(Subsystem::MasternodeList));
    }
}

fn check_contributions(contributions: &[u64]) -> Result<()> {
    let Some((last, leading)) = contributions.split_last() else {
        return Err(Error::InvalidStake("no contributors".to_string()));
    };
    if contributions.len() as u64 > MAX_NUMBER_OF_CONTRIBUTORS {
        return Err(Error::InvalidStake(format!(
            "{} contributors, at most {} allowed",
            contributions.len(),
            MAX_NUMBER_OF_CONTRIBUTORS
        )));
    }

    if let Some(small) = leading.iter().find(|portions| **portions < MIN_PORTIONS) {
        return Err(Error::InvalidStake(format!(
            "contribution of {} portions below minimum {}",
            small, MIN_PORTIONS
        )));
    }

    let total = leading
        .iter()
        .try_fold(*last, |total, portions| total.checked_add(*portions));
    if total != Some(STAKING_PORTIONS) {
        return Err(Error::InvalidStake(
            "contributions do not fill the stake".to_string(),
        ));
    }

    Ok(())
}

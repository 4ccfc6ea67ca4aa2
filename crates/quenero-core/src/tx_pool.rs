//! Transaction pool
//!
//! Admission is checked against the parameters in force at the chain tip,
//! which the pool reads through its sibling handle. When a block moves the
//! chain to a new version, entries that no longer qualify are evicted.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use quenero_params::consensus::CRYPTONOTE_MEMPOOL_TX_LIVETIME;
use quenero_params::{ConsensusParams, ForkParams, HardForkVersion};
use tracing::{debug, info, warn};

use crate::blockchain::ChainTip;
use crate::fees::FeeCalculator;
use crate::lifecycle::{LifecycleEvent, LifecycleJournal, Subsystem};
use crate::objects::Siblings;
use crate::{Error, Result};

/// Transaction awaiting inclusion in a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTransaction {
    /// Transaction hash (hex)
    pub hash: String,
    /// Weight in bytes
    pub weight: u64,
    /// Number of outputs
    pub outputs: usize,
    /// Fee paid
    pub fee: u64,
    /// Unix time the pool received it
    pub received_at: i64,
}

/// Transaction pool
#[derive(Debug)]
pub struct TxPool {
    siblings: Siblings,
    params: Arc<ConsensusParams>,
    journal: LifecycleJournal,
    transactions: RwLock<HashMap<String, PoolTransaction>>,
}

impl TxPool {
    pub(crate) fn new(
        siblings: Siblings,
        params: Arc<ConsensusParams>,
        journal: LifecycleJournal,
    ) -> Self {
        journal.record(LifecycleEvent::Constructed {
            subsystem: Subsystem::TxPool,
            siblings_reachable: siblings.is_reachable(),
        });

        Self {
            siblings,
            params,
            journal,
            transactions: RwLock::new(HashMap::new()),
        }
    }

    /// Handle to the sibling subsystems
    pub fn siblings(&self) -> &Siblings {
        &self.siblings
    }

    /// Admit `tx` if it satisfies the parameters at the chain tip
    pub fn add_tx(&self, tx: PoolTransaction) -> Result<()> {
        let objects = self.siblings.get()?;

        // The tip is read under the pool lock so that a concurrent fork
        // cannot slip in between the check and the insert.
        let mut transactions = self.transactions.write();
        let version = objects.blockchain().hard_fork_version();

        if let Err(e) = check_policy(&self.params, version, &tx) {
            warn!("Rejecting transaction {}: {}", tx.hash, e);
            return Err(e);
        }

        if transactions.contains_key(&tx.hash) {
            return Err(Error::DuplicateTransaction(tx.hash));
        }

        debug!("Added transaction {} ({} bytes)", tx.hash, tx.weight);
        transactions.insert(tx.hash.clone(), tx);
        Ok(())
    }

    /// Check if `hash` is in the pool
    pub fn contains(&self, hash: &str) -> bool {
        self.transactions.read().contains_key(hash)
    }

    /// Number of pooled transactions
    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }

    /// Total weight of pooled transactions
    pub fn total_weight(&self) -> u64 {
        self.transactions.read().values().map(|tx| tx.weight).sum()
    }

    /// Drop entries that have outlived the mempool lifetime as of `now`
    ///
    /// Returns the number of entries removed.
    pub fn prune_expired(&self, now: i64) -> usize {
        let lifetime =
            i64::try_from(CRYPTONOTE_MEMPOOL_TX_LIVETIME.as_secs()).unwrap_or(i64::MAX);

        let mut transactions = self.transactions.write();
        let before = transactions.len();
        transactions.retain(|_, tx| now.saturating_sub(tx.received_at) <= lifetime);
        let pruned = before - transactions.len();

        if pruned > 0 {
            info!("Pruned {} expired transactions from the pool", pruned);
        }
        pruned
    }

    pub(crate) fn on_block_added(&self, tip: &ChainTip) {
        let mut transactions = self.transactions.write();
        let before = transactions.len();
        transactions.retain(|_, tx| check_policy(&self.params, tip.version, tx).is_ok());
        let evicted = before - transactions.len();

        if evicted > 0 {
            info!(
                "Evicted {} transactions no longer valid at {} (height {})",
                evicted, tip.version, tip.height
            );
        }
    }
}

impl Drop for TxPool {
    fn drop(&mut self) {
        self.journal.record(LifecycleEvent::Dropped(Subsystem::TxPool));
    }
}

fn check_policy(
    params: &ConsensusParams,
    version: HardForkVersion,
    tx: &PoolTransaction,
) -> Result<()> {
    let fork: &ForkParams = params.fork_params(version);

    if tx.outputs < fork.min_outputs || tx.outputs > fork.max_outputs {
        return Err(Error::OutputCount {
            outputs: tx.outputs,
            min: fork.min_outputs,
            max: fork.max_outputs,
        });
    }

    FeeCalculator::from_schedule(fork.fee, version).validate_fee(
        tx.fee,
        tx.weight,
        tx.outputs,
    )
}

//! Chain state

use std::sync::Arc;

use parking_lot::RwLock;
use quenero_params::{ConsensusParams, ForkParams, HardForkVersion};
use tracing::{debug, warn};

use crate::lifecycle::{LifecycleEvent, LifecycleJournal, Subsystem};
use crate::objects::Siblings;
use crate::{Error, Result};

/// Top of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTip {
    /// Height of the top block (genesis is 0)
    pub height: u64,
    /// Hard-fork version of the top block
    pub version: HardForkVersion,
    /// Unix timestamp of the top block
    pub timestamp: i64,
}

/// Chain state
#[derive(Debug)]
pub struct Blockchain {
    siblings: Siblings,
    params: Arc<ConsensusParams>,
    journal: LifecycleJournal,
    tip: RwLock<ChainTip>,
}

impl Blockchain {
    pub(crate) fn new(
        siblings: Siblings,
        params: Arc<ConsensusParams>,
        journal: LifecycleJournal,
        genesis_version: HardForkVersion,
    ) -> Self {
        journal.record(LifecycleEvent::Constructed {
            subsystem: Subsystem::Blockchain,
            siblings_reachable: siblings.is_reachable(),
        });

        Self {
            siblings,
            params,
            journal,
            tip: RwLock::new(ChainTip {
                height: 0,
                version: genesis_version,
                timestamp: 0,
            }),
        }
    }

    /// Handle to the sibling subsystems
    pub fn siblings(&self) -> &Siblings {
        &self.siblings
    }

    /// Current tip
    pub fn tip(&self) -> ChainTip {
        *self.tip.read()
    }

    /// Height of the top block
    pub fn height(&self) -> u64 {
        self.tip.read().height
    }

    /// Hard-fork version of the top block
    pub fn hard_fork_version(&self) -> HardForkVersion {
        self.tip.read().version
    }

    /// Parameters in force at the tip
    pub fn fork_params(&self) -> ForkParams {
        *self.params.fork_params(self.hard_fork_version())
    }

    /// Append a block and notify the pool and the masternode list
    ///
    /// Returns the new height.
    pub fn add_block(&self, version: HardForkVersion, timestamp: i64) -> Result<u64> {
        let objects = self.siblings.get()?;

        let tip = {
            let mut tip = self.tip.write();
            if version < tip.version {
                warn!(
                    "Rejecting block at height {}: version {} below tip {}",
                    tip.height + 1,
                    version,
                    tip.version
                );
                return Err(Error::HardForkRegression {
                    current: tip.version,
                    requested: version,
                });
            }
            if version > tip.version {
                debug!("Hard fork to {} at height {}", version, tip.height + 1);
            }

            *tip = ChainTip {
                height: tip.height + 1,
                version,
                timestamp,
            };
            *tip
        };

        // Siblings read the tip back, so the write lock must be released first
        objects.masternode_list().on_block_added(&tip);
        objects.tx_pool().on_block_added(&tip);

        Ok(tip.height)
    }
}

impl Drop for Blockchain {
    fn drop(&mut self) {
        self.journal
            .record(LifecycleEvent::Dropped(Subsystem::Blockchain));
    }
}

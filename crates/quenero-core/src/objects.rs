//! Composition root
//!
//! [`BlockchainObjects`] owns the chain state, the transaction pool and the
//! masternode registry as plain fields. The three need each other at runtime,
//! so construction is two-phase: inside [`Arc::new_cyclic`] every subsystem
//! receives a [`Siblings`] handle pointing at the aggregate that is still
//! being built. The handle cannot be resolved until the aggregate is
//! published, which makes it impossible for a constructor to call into a
//! sibling that does not exist yet.

use std::sync::{Arc, Weak};

use quenero_params::{ConsensusParams, HardForkVersion};
use tracing::{debug, info};

use crate::blockchain::Blockchain;
use crate::lifecycle::{LifecycleEvent, LifecycleJournal, Subsystem};
use crate::masternode_list::MasternodeList;
use crate::tx_pool::TxPool;
use crate::{Error, Result};

/// Order in which subsystems are constructed
///
/// Teardown runs in the reverse order.
pub const CONSTRUCTION_ORDER: [Subsystem; 3] = [
    Subsystem::Blockchain,
    Subsystem::TxPool,
    Subsystem::MasternodeList,
];

/// Handle a subsystem uses to reach its siblings
#[derive(Debug, Clone)]
pub struct Siblings {
    owner: Subsystem,
    objects: Weak<BlockchainObjects>,
}

impl Siblings {
    fn new(owner: Subsystem, objects: &Weak<BlockchainObjects>) -> Self {
        Self {
            owner,
            objects: objects.clone(),
        }
    }

    /// Resolve the aggregate
    ///
    /// Fails with [`Error::NotWired`] before publication and once teardown
    /// has started.
    pub fn get(&self) -> Result<Arc<BlockchainObjects>> {
        self.objects.upgrade().ok_or(Error::NotWired(self.owner))
    }

    /// Check if the aggregate can currently be resolved
    pub fn is_reachable(&self) -> bool {
        self.objects.strong_count() > 0
    }

    /// Subsystem holding this handle
    pub fn owner(&self) -> Subsystem {
        self.owner
    }
}

/// The node's long-lived subsystems
#[derive(Debug)]
pub struct BlockchainObjects {
    // Fields drop in declaration order: keep this the reverse of CONSTRUCTION_ORDER.
    masternode_list: MasternodeList,
    tx_pool: TxPool,
    blockchain: Blockchain,
    params: Arc<ConsensusParams>,
    journal: LifecycleJournal,
}

impl BlockchainObjects {
    /// Build and publish the subsystems for `params`
    pub fn new(params: Arc<ConsensusParams>) -> Arc<Self> {
        Self::with_journal(params, LifecycleJournal::new())
    }

    /// Like [`new`](Self::new), recording lifecycle events into `journal`
    pub fn with_journal(params: Arc<ConsensusParams>, journal: LifecycleJournal) -> Arc<Self> {
        Self::build(params, journal, HardForkVersion::EARLIEST)
    }

    /// Build with the chain starting at `genesis_version`
    pub fn with_genesis_version(
        params: Arc<ConsensusParams>,
        journal: LifecycleJournal,
        genesis_version: HardForkVersion,
    ) -> Arc<Self> {
        Self::build(params, journal, genesis_version)
    }

    fn build(
        params: Arc<ConsensusParams>,
        journal: LifecycleJournal,
        genesis_version: HardForkVersion,
    ) -> Arc<Self> {
        debug!(
            "Constructing subsystems for {} in order {:?}",
            params.network_type(),
            CONSTRUCTION_ORDER
        );

        let objects = Arc::new_cyclic(|this| {
            let blockchain = Blockchain::new(
                Siblings::new(Subsystem::Blockchain, this),
                Arc::clone(&params),
                journal.clone(),
                genesis_version,
            );
            let tx_pool = TxPool::new(
                Siblings::new(Subsystem::TxPool, this),
                Arc::clone(&params),
                journal.clone(),
            );
            let masternode_list = MasternodeList::new(
                Siblings::new(Subsystem::MasternodeList, this),
                Arc::clone(&params),
                journal.clone(),
            );

            Self {
                masternode_list,
                tx_pool,
                blockchain,
                params,
                journal,
            }
        });

        objects.journal.record(LifecycleEvent::Published);
        info!(
            "Blockchain objects published for {} at {}",
            objects.params.network_type(),
            genesis_version
        );

        objects
    }

    /// Chain state
    pub fn blockchain(&self) -> &Blockchain {
        &self.blockchain
    }

    /// Transaction pool
    pub fn tx_pool(&self) -> &TxPool {
        &self.tx_pool
    }

    /// Masternode registry
    pub fn masternode_list(&self) -> &MasternodeList {
        &self.masternode_list
    }

    /// Shared configuration
    pub fn params(&self) -> &Arc<ConsensusParams> {
        &self.params
    }

    /// Lifecycle journal
    pub fn journal(&self) -> &LifecycleJournal {
        &self.journal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quenero_params::NetworkType;

    fn fakechain() -> Arc<ConsensusParams> {
        Arc::new(ConsensusParams::load(NetworkType::Fakechain).unwrap())
    }

    #[test]
    fn test_construction_follows_declared_order() {
        let journal = LifecycleJournal::new();
        let _objects = BlockchainObjects::with_journal(fakechain(), journal.clone());

        assert_eq!(journal.construction_order(), CONSTRUCTION_ORDER.to_vec());
        assert_eq!(journal.events().last(), Some(&LifecycleEvent::Published));
    }

    #[test]
    fn test_siblings_resolve_after_publication() {
        let objects = BlockchainObjects::new(fakechain());

        let via_pool = objects.tx_pool().siblings().get().unwrap();
        assert!(Arc::ptr_eq(&via_pool, &objects));
        assert_eq!(
            objects.masternode_list().siblings().owner(),
            Subsystem::MasternodeList
        );
    }

    #[test]
    fn test_unpublished_handle_is_not_wired() {
        let siblings = Siblings::new(Subsystem::TxPool, &Weak::new());

        assert!(!siblings.is_reachable());
        assert!(matches!(
            siblings.get(),
            Err(Error::NotWired(Subsystem::TxPool))
        ));
    }

    #[test]
    fn test_genesis_version() {
        let objects = BlockchainObjects::with_genesis_version(
            fakechain(),
            LifecycleJournal::new(),
            HardForkVersion::V16_PULSE,
        );
        assert_eq!(
            objects.blockchain().hard_fork_version(),
            HardForkVersion::V16_PULSE
        );
    }
}

//! Quenero node core
//!
//! This crate wires the node's long-lived subsystems (chain state, transaction
//! pool, masternode registry) around one validated [`ConsensusParams`] and
//! lets them reach each other once the whole set has been built.
//!
//! [`ConsensusParams`]: quenero_params::ConsensusParams

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod blockchain;
pub mod error;
pub mod fees;
pub mod lifecycle;
pub mod masternode_list;
pub mod objects;
pub mod tx_pool;

pub use blockchain::{Blockchain, ChainTip};
pub use error::{Error, ErrorCategory, Result};
pub use fees::{FeeCalculator, SIMPLE_SEND_OUTPUTS};
pub use lifecycle::{LifecycleEvent, LifecycleJournal, Subsystem};
pub use masternode_list::{
    GovernancePayout, MasternodeEntry, MasternodeList, RETAINED_GOVERNANCE_PAYOUTS,
};
pub use objects::{BlockchainObjects, Siblings, CONSTRUCTION_ORDER};
pub use tx_pool::{PoolTransaction, TxPool};

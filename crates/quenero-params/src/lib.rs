//! Quenero network parameters and hard-fork policy
//!
//! This crate provides the per-network configuration table, the hard-fork
//! version ladder with its gated parameter sets, the derived time/block
//! functions, and the startup validation that every node runs before it
//! joins a network. Everything here is immutable once built and safe to share
//! across threads without locking.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anchor;
pub mod consensus;
pub mod derived;
pub mod genesis;
pub mod hardfork;
pub mod network;
pub mod p2p;
pub mod validation;

pub use anchor::HeightAnchor;
pub use consensus::ConsensusParams;
pub use genesis::{GenesisError, GenesisTransaction};
pub use hardfork::{
    Feature, FeeSchedule, ForkEntry, ForkParams, ForkSchedule, HardForkVersion,
    RingSignatureScheme,
};
pub use network::{
    get_config, AddressPrefixes, DefaultPorts, GovernanceWallet, NetworkConfig, NetworkType,
    UptimeProofTiming,
};

/// Error types for parameter operations
///
/// None of these are recoverable: each one means the node must refuse to start.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Genesis transaction literal does not have the expected shape
    #[error("Malformed genesis transaction for {network}: {source}")]
    Genesis {
        /// Network whose genesis literal failed to parse
        network: NetworkType,
        /// Underlying parse failure
        #[source]
        source: GenesisError,
    },

    /// Hard-fork schedule has no entries
    #[error("Hard-fork schedule is empty")]
    EmptySchedule,

    /// Hard-fork activation versions are not strictly ascending
    #[error("Hard-fork schedule is not strictly ascending: {next} follows {previous}")]
    NonMonotonicSchedule {
        /// Activation version of the earlier entry
        previous: HardForkVersion,
        /// Activation version of the offending entry
        next: HardForkVersion,
    },

    /// Two network records share a network identifier
    #[error("Network id {id} is shared by {first} and {second}")]
    DuplicateNetworkId {
        /// The shared identifier
        id: uuid::Uuid,
        /// First network carrying it
        first: NetworkType,
        /// Second network carrying it
        second: NetworkType,
    },

    /// A per-network invariant does not hold
    #[error("Configuration invariant violated on {network}: {detail}")]
    Invariant {
        /// Network whose record is inconsistent
        network: NetworkType,
        /// What failed
        detail: String,
    },
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;

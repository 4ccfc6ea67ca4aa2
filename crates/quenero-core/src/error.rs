//! Error types for Quenero Core
//!
//! Configuration and wiring errors are fatal at startup. Everything else is a
//! rejected input that the caller reports and moves past.

use std::fmt;

use quenero_params::HardForkVersion;

use crate::lifecycle::Subsystem;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Quenero Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parameter table failed validation
    #[error("Configuration error: {0}")]
    Params(#[from] quenero_params::Error),

    /// Sibling subsystems are not reachable yet (or any more)
    #[error("{0} is not wired to its sibling subsystems")]
    NotWired(Subsystem),

    /// Block would lower the hard-fork version
    #[error("Hard-fork regression: chain is at {current}, block claims {requested}")]
    HardForkRegression {
        /// Version of the current tip
        current: HardForkVersion,
        /// Version of the rejected block
        requested: HardForkVersion,
    },

    /// Transaction already in pool
    #[error("Transaction already in pool: {0}")]
    DuplicateTransaction(String),

    /// Output count outside the active policy
    #[error("Invalid output count {outputs}: allowed {min}..={max}")]
    OutputCount {
        /// Outputs in the transaction
        outputs: usize,
        /// Minimum allowed
        min: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Fee too low
    #[error("Fee too low: {fee} < {required}")]
    FeeTooLow {
        /// Fee paid
        fee: u64,
        /// Minimum fee at the active version
        required: u64,
    },

    /// Fee calculation error
    #[error("Fee calculation error: {0}")]
    FeeCalculation(String),

    /// Masternode already registered
    #[error("Masternode already registered: {0}")]
    DuplicateMasternode(String),

    /// Masternode not registered
    #[error("Unknown masternode: {0}")]
    UnknownMasternode(String),

    /// Contributions do not add up to a valid stake
    #[error("Invalid stake: {0}")]
    InvalidStake(String),

    /// Uptime proof rejected
    #[error("Uptime proof rejected: {0}")]
    UptimeProofRejected(String),
}

impl Error {
    /// Check if the error must stop the node from starting
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Params(_) | Error::NotWired(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Params(_) => ErrorCategory::Configuration,
            Error::NotWired(_) => ErrorCategory::Wiring,
            Error::HardForkRegression { .. } => ErrorCategory::Chain,
            Error::FeeTooLow { .. } | Error::FeeCalculation(_) => ErrorCategory::Fee,
            Error::DuplicateTransaction(_) | Error::OutputCount { .. } => ErrorCategory::Pool,
            Error::DuplicateMasternode(_)
            | Error::UnknownMasternode(_)
            | Error::InvalidStake(_)
            | Error::UptimeProofRejected(_) => ErrorCategory::Masternode,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Parameter table errors
    Configuration,
    /// Composition root errors
    Wiring,
    /// Chain state errors
    Chain,
    /// Fee errors
    Fee,
    /// Transaction pool errors
    Pool,
    /// Masternode registry errors
    Masternode,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "Configuration"),
            ErrorCategory::Wiring => write!(f, "Wiring"),
            ErrorCategory::Chain => write!(f, "Chain"),
            ErrorCategory::Fee => write!(f, "Fee"),
            ErrorCategory::Pool => write!(f, "Pool"),
            ErrorCategory::Masternode => write!(f, "Masternode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_detection() {
        assert!(Error::NotWired(Subsystem::TxPool).is_fatal());
        assert!(Error::Params(quenero_params::Error::EmptySchedule).is_fatal());
        assert!(!Error::DuplicateTransaction("abc".to_string()).is_fatal());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            Error::NotWired(Subsystem::Blockchain).category(),
            ErrorCategory::Wiring
        );
        assert_eq!(
            Error::FeeTooLow {
                fee: 1,
                required: 2
            }
            .category(),
            ErrorCategory::Fee
        );
        assert_eq!(
            Error::HardForkRegression {
                current: HardForkVersion::V16_PULSE,
                requested: HardForkVersion::V15_ONS,
            }
            .category(),
            ErrorCategory::Chain
        );
        assert_eq!(
            Error::UptimeProofRejected("late".to_string()).category(),
            ErrorCategory::Masternode
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::NotWired(Subsystem::MasternodeList).to_string(),
            "masternode list is not wired to its sibling subsystems"
        );
        assert_eq!(ErrorCategory::Pool.to_string(), "Pool");
    }
}

//! Transaction fee calculation
//!
//! Fees follow the schedule in force at the chain's hard-fork version: a
//! per-kilobyte fee before v10, then a per-byte fee plus (from v13) a
//! per-output fee.

use quenero_params::{ConsensusParams, FeeSchedule, HardForkVersion};

use crate::{Error, Result};

/// Outputs in a simple send (recipient and change)
pub const SIMPLE_SEND_OUTPUTS: usize = 2;

/// Fee calculator for one hard-fork version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeCalculator {
    schedule: FeeSchedule,
    version: HardForkVersion,
}

impl FeeCalculator {
    /// Calculator for the schedule active at `version`
    pub fn new(params: &ConsensusParams, version: HardForkVersion) -> Self {
        Self::from_schedule(params.fork_params(version).fee, version)
    }

    /// Calculator over an explicit schedule
    pub fn from_schedule(schedule: FeeSchedule, version: HardForkVersion) -> Self {
        Self { schedule, version }
    }

    /// Schedule in use
    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Version the schedule was resolved for
    pub fn version(&self) -> HardForkVersion {
        self.version
    }

    /// Minimum fee for a transaction of `weight` bytes with `outputs` outputs
    pub fn minimum_fee(&self, weight: u64, outputs: usize) -> Result<u64> {
        let fee = u64::try_from(outputs)
            .ok()
            .and_then(|outputs| self.schedule.minimum_fee(weight, outputs))
            .ok_or_else(|| {
                Error::FeeCalculation(format!(
                    "fee for weight {} with {} outputs overflows at {}",
                    weight, outputs, self.version
                ))
            })?;

        tracing::debug!(
            "Minimum fee at {}: {} (weight {}, {} outputs)",
            self.version,
            fee,
            weight,
            outputs
        );

        Ok(fee)
    }

    /// Minimum fee for a two-output send of `weight` bytes
    pub fn simple_send_fee(&self, weight: u64) -> Result<u64> {
        self.minimum_fee(weight, SIMPLE_SEND_OUTPUTS)
    }

    /// Check that `fee` covers the minimum
    pub fn validate_fee(&self, fee: u64, weight: u64, outputs: usize) -> Result<()> {
        let required = self.minimum_fee(weight, outputs)?;
        if fee < required {
            return Err(Error::FeeTooLow { fee, required });
        }
        Ok(())
    }
}

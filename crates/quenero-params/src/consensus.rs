//! Consensus parameters for Quenero
//!
//! Chain-wide constants shared by every network, and [`ConsensusParams`], the
//! validated configuration object handed to every subsystem at startup.

use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::derived;
use crate::hardfork::{ForkParams, ForkSchedule, HardForkVersion};
use crate::network::{get_config, NetworkConfig, NetworkType};
use crate::validation;
use crate::Result;

/// Coin name, used for data directory and file naming
pub const CRYPTONOTE_NAME: &str = "quenero";

/// Highest block height accepted
pub const CRYPTONOTE_MAX_BLOCK_NUMBER: u64 = 500_000_000;
/// Maximum serialized transaction size (bytes)
pub const CRYPTONOTE_MAX_TX_SIZE: u64 = 1_000_000;
/// Maximum transactions per block
pub const CRYPTONOTE_MAX_TX_PER_BLOCK: u64 = 0x1000_0000;
/// Blocks before a coinbase output unlocks
pub const CRYPTONOTE_MINED_MONEY_UNLOCK_WINDOW: u64 = 60;
/// How far ahead of local time a block timestamp may be
pub const CRYPTONOTE_BLOCK_FUTURE_TIME_LIMIT: Duration = Duration::from_secs(60 * 10);
/// Default minimum output age (blocks)
pub const CRYPTONOTE_DEFAULT_TX_SPENDABLE_AGE: u64 = 10;
/// Default ring size minus one
pub const CRYPTONOTE_DEFAULT_TX_MIXIN: usize = 9;
/// Blocks used for the median timestamp check
pub const BLOCKCHAIN_TIMESTAMP_CHECK_WINDOW: usize = 11;
/// Blocks used for the reward median
pub const CRYPTONOTE_REWARD_BLOCKS_WINDOW: u64 = 100;
/// Block size (bytes) under which the full reward is granted
pub const CRYPTONOTE_BLOCK_GRANTED_FULL_REWARD_ZONE_V5: u64 = 300_000;
/// Long-term block weight median window (blocks)
pub const CRYPTONOTE_LONG_TERM_BLOCK_WEIGHT_WINDOW_SIZE: u64 = 100_000;
/// Short-term block weight surge factor
pub const CRYPTONOTE_SHORT_TERM_BLOCK_WEIGHT_SURGE_FACTOR: u64 = 50;
/// Bytes reserved in the coinbase blob
pub const CRYPTONOTE_COINBASE_BLOB_RESERVED_SIZE: u64 = 600;
/// Decimal places of one coin
pub const CRYPTONOTE_DISPLAY_DECIMAL_POINT: u32 = 9;

/// Target time between blocks
pub const TARGET_BLOCK_TIME: Duration = Duration::from_secs(2 * 60);
/// Difficulty adjustment window (blocks)
pub const DIFFICULTY_WINDOW: u64 = 59;
/// Blocks a time-locked transaction may unlock early by
pub const CRYPTONOTE_LOCKED_TX_ALLOWED_DELTA_BLOCKS: u64 = 1;

/// Legacy per-kilobyte base fee
pub const DYNAMIC_FEE_PER_KB_BASE_FEE_V5: u64 = 400_000_000;
/// Base block reward used for dynamic fee scaling
pub const DYNAMIC_FEE_PER_KB_BASE_BLOCK_REWARD: u64 = 10_000_000_000_000;
/// Reference transaction weight for dynamic fees
pub const DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT: u64 = 3_000;
/// Reference transaction weight for v12 only
pub const DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT_V12: u64 = 240_000;
/// Decimal places per-kB fees are quantized to
pub const PER_KB_FEE_QUANTIZATION_DECIMALS: u32 = 8;
/// Outputs smaller than this are dust
pub const DEFAULT_DUST_THRESHOLD: u64 = 2_000_000_000;
/// Base reward clamp threshold
pub const BASE_REWARD_CLAMP_THRESHOLD: u64 = 100_000_000;
/// Maximum outputs a bulletproof can cover
pub const BULLETPROOF_MAX_OUTPUTS: usize = 16;

/// How long a transaction may sit in the pool
pub const CRYPTONOTE_MEMPOOL_TX_LIVETIME: Duration = Duration::from_secs(86_400 * 3);
/// How long a transaction from an alternative block may sit in the pool
pub const CRYPTONOTE_MEMPOOL_TX_FROM_ALT_BLOCK_LIVETIME: Duration = Duration::from_secs(86_400 * 7);
/// Lifetime of non-standard pool transactions
pub const MEMPOOL_PRUNE_NON_STANDARD_TX_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);
/// Default maximum pool weight (bytes), 3 days at 300 kB
pub const DEFAULT_TXPOOL_MAX_WEIGHT: u64 = 648_000_000;

/// Portions representing a full masternode stake
pub const STAKING_PORTIONS: u64 = 0xffff_ffff_ffff_fffc;
/// Maximum contributors to one masternode
pub const MAX_NUMBER_OF_CONTRIBUTORS: u64 = 6;
/// Smallest contribution, in portions
pub const MIN_PORTIONS: u64 = STAKING_PORTIONS / MAX_NUMBER_OF_CONTRIBUTORS;
/// Extra blocks a stake stays locked past its requirement
pub const STAKING_REQUIREMENT_LOCK_BLOCKS_EXCESS: u64 = 20;
/// How long a registration authorization stays valid
pub const STAKING_AUTHORIZATION_EXPIRATION_WINDOW: Duration =
    Duration::from_secs(60 * 60 * 24 * 7 * 2);
/// Over-contribution allowance as `(numerator, denominator)`
pub const MAXIMUM_ACCEPTABLE_STAKE: (u64, u64) = (101, 100);
/// How long without storage-server test failures before a node is considered passing
pub const SS_MAX_FAILURE_VALIDITY: Duration = Duration::from_secs(10 * 60);

// Portions must split evenly between two, three or four contributors.
const _: () = assert!(STAKING_PORTIONS % 12 == 0);

/// Largest contribution accepted into `room` atomic units of open stake
///
/// Allows a small over-contribution so that competing stakes submitted at the
/// same time do not bounce.
pub const fn max_acceptable_contribution(room: u64) -> u64 {
    let (num, den) = MAXIMUM_ACCEPTABLE_STAKE;
    let scaled = room as u128 * num as u128 / den as u128;
    if scaled > u64::MAX as u128 {
        u64::MAX
    } else {
        scaled as u64
    }
}

/// Validated configuration for the running network
///
/// Built once at startup and passed by reference to every consumer.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
    /// Network configuration
    pub network: &'static NetworkConfig,
    /// Hard-fork gated parameter table
    pub forks: ForkSchedule,
    /// Target block time
    pub target_block_time: Duration,
}

impl ConsensusParams {
    /// Validate the full network table and return params for `network_type`
    ///
    /// Any failure here is fatal: the node must not start.
    pub fn load(network_type: NetworkType) -> Result<Self> {
        Self::with_schedule(network_type, ForkSchedule::standard())
    }

    /// Like [`load`](Self::load) with a caller-supplied fork schedule
    pub fn with_schedule(network_type: NetworkType, forks: ForkSchedule) -> Result<Self> {
        validation::validate_network_table()?;
        forks.validate()?;

        let network = get_config(network_type);
        info!(
            "Loaded {} parameters (network id {}, {} fork entries)",
            network_type,
            network.network_id,
            forks.entries().len()
        );

        Ok(Self {
            network,
            forks,
            target_block_time: TARGET_BLOCK_TIME,
        })
    }

    /// Network this configuration was loaded for
    pub fn network_type(&self) -> NetworkType {
        self.network.network_type
    }

    /// Parameters in force at `version`
    pub fn fork_params(&self, version: HardForkVersion) -> &ForkParams {
        self.forks.resolve(version)
    }

    /// Blocks expected in `hours` hours
    pub fn blocks_in_hours(&self, hours: u64) -> u64 {
        derived::blocks_expected_in_hours_at(self.target_block_time, hours)
    }

    /// Blocks expected in `days` days
    pub fn blocks_in_days(&self, days: u64) -> u64 {
        derived::blocks_expected_in_days_at(self.target_block_time, days)
    }

    /// Blocks expected in `years` years
    pub fn blocks_in_years(&self, years: u64) -> u64 {
        derived::blocks_expected_in_years_at(self.target_block_time, years)
    }

    /// Estimated chain height at unix time `now`
    pub fn estimate_height(&self, now: i64) -> u64 {
        self.network
            .height_anchor
            .estimate_height_at_unix(now, self.target_block_time)
    }

    /// Estimated chain height right now
    pub fn estimate_current_height(&self) -> u64 {
        self.network
            .height_anchor
            .estimate_height_at(Utc::now(), self.target_block_time)
    }

    /// Governance payout address at `version`
    pub fn governance_wallet_address(&self, version: HardForkVersion) -> &'static str {
        self.network.governance_wallet_address(version)
    }

    /// Check if a governance payout is due at `height`
    pub fn is_governance_reward_height(&self, height: u64) -> bool {
        height > 0 && height % self.network.governance_reward_interval == 0
    }

    /// Number of blocks fed to the difficulty algorithm at `version`
    pub fn difficulty_blocks_count(&self, version: HardForkVersion) -> u64 {
        derived::difficulty_blocks_count(version)
    }
}

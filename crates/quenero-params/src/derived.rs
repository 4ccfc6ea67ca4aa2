//! Block counts and height estimates derived from the target block time
//!
//! Integer arithmetic only. Divisions truncate so that an estimate never
//! runs ahead of the real chain: anything gated on "enough time has passed"
//! fires late rather than early.

use std::time::Duration;

use crate::anchor::HeightAnchor;
use crate::consensus::{
    CRYPTONOTE_LOCKED_TX_ALLOWED_DELTA_BLOCKS, DIFFICULTY_WINDOW, TARGET_BLOCK_TIME,
};
use crate::hardfork::{Feature, HardForkVersion};

const NANOS_PER_HOUR: u128 = 60 * 60 * 1_000_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

const fn mul_blocks(blocks: u64, periods: u64) -> u64 {
    match blocks.checked_mul(periods) {
        Some(total) => total,
        None => panic!("block count overflows u64"),
    }
}

/// Whole blocks produced per hour at `target_block_time`
///
/// # Panics
/// If `target_block_time` is zero.
pub const fn blocks_per_hour_at(target_block_time: Duration) -> u64 {
    saturate(NANOS_PER_HOUR / target_block_time.as_nanos())
}

/// Blocks expected in `hours` hours at `target_block_time`
///
/// # Panics
/// If `target_block_time` is zero, or the count does not fit in a `u64`.
/// The check is the same in debug and release builds.
pub const fn blocks_expected_in_hours_at(target_block_time: Duration, hours: u64) -> u64 {
    mul_blocks(blocks_per_hour_at(target_block_time), hours)
}

/// Blocks expected in `days` days at `target_block_time`
///
/// Always exactly `blocks_expected_in_hours_at(target, 24) * days`. Panics as
/// [`blocks_expected_in_hours_at`] does.
pub const fn blocks_expected_in_days_at(target_block_time: Duration, days: u64) -> u64 {
    mul_blocks(blocks_expected_in_hours_at(target_block_time, 24), days)
}

/// Blocks expected in `years` 365-day years at `target_block_time`
///
/// Panics as [`blocks_expected_in_hours_at`] does.
pub const fn blocks_expected_in_years_at(target_block_time: Duration, years: u64) -> u64 {
    mul_blocks(blocks_expected_in_days_at(target_block_time, 365), years)
}

/// Blocks expected in `hours` hours at [`TARGET_BLOCK_TIME`]
pub const fn blocks_expected_in_hours(hours: u64) -> u64 {
    blocks_expected_in_hours_at(TARGET_BLOCK_TIME, hours)
}

/// Blocks expected in `days` days at [`TARGET_BLOCK_TIME`]
pub const fn blocks_expected_in_days(days: u64) -> u64 {
    blocks_expected_in_days_at(TARGET_BLOCK_TIME, days)
}

/// Blocks expected in `years` years at [`TARGET_BLOCK_TIME`]
pub const fn blocks_expected_in_years(years: u64) -> u64 {
    blocks_expected_in_years_at(TARGET_BLOCK_TIME, years)
}

/// Approximate chain height at unix time `now` from a fixed anchor
///
/// After the anchor, only fully elapsed block intervals count. Before it,
/// partial intervals are counted as whole ones and the result saturates at
/// zero. Either way the estimate is never above what the real chain could
/// have reached at `avg_block_time`, which is used at full nanosecond
/// precision. A zero interval is treated as one second.
pub const fn estimate_height(
    anchor: HeightAnchor,
    now: i64,
    avg_block_time: Duration,
) -> u64 {
    let per_block = match avg_block_time.as_nanos() {
        0 => NANOS_PER_SEC,
        nanos => nanos,
    };
    let distance = now.abs_diff(anchor.timestamp) as u128 * NANOS_PER_SEC;

    if now >= anchor.timestamp {
        anchor.height.saturating_add(saturate(distance / per_block))
    } else {
        anchor.height.saturating_sub(saturate(distance.div_ceil(per_block)))
    }
}

const fn saturate(blocks: u128) -> u64 {
    if blocks > u64::MAX as u128 {
        u64::MAX
    } else {
        blocks as u64
    }
}

/// Number of recent blocks fed to the difficulty algorithm
///
/// Before pulse the newest block was trimmed, so two extra blocks were
/// loaded; from pulse on only one extra is needed.
pub const fn difficulty_blocks_count(version: HardForkVersion) -> u64 {
    if Feature::Pulse.is_active(version) {
        DIFFICULTY_WINDOW + 1
    } else {
        DIFFICULTY_WINDOW + 2
    }
}

/// How far into the future a time-locked transaction may unlock and still be
/// treated as unlocked
pub const fn locked_tx_allowed_delta() -> Duration {
    let secs = TARGET_BLOCK_TIME.as_secs() * CRYPTONOTE_LOCKED_TX_ALLOWED_DELTA_BLOCKS;
    Duration::from_secs(secs)
}

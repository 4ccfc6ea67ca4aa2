//! Hard-fork version ladder and gated parameter sets
//!
//! Consensus policy that changes at a hard fork is kept as data: an ascending
//! table of `(activation version, parameter set)` entries. Resolving a version
//! picks the entry with the greatest activation version that is not above it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consensus::{
    BULLETPROOF_MAX_OUTPUTS, CRYPTONOTE_DEFAULT_TX_SPENDABLE_AGE,
    DYNAMIC_FEE_PER_KB_BASE_FEE_V5, DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT,
    DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT_V12,
};
use crate::{Error, Result};

/// Protocol version of a block, as reported by the consensus engine
///
/// Backed by the raw version byte so that versions newer than this build
/// knows about still compare and resolve correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardForkVersion(u8);

impl HardForkVersion {
    /// Initial CryptoNote rules
    pub const V7: Self = Self(7);
    /// Second legacy version
    pub const V8: Self = Self(8);
    /// Proof of stake with masternodes
    pub const V9_MASTERNODES: Self = Self(9);
    /// Bulletproofs, grace registration period, batched governance
    pub const V10_BULLETPROOFS: Self = Self(10);
    /// Infinite staking
    pub const V11_INFINITE_STAKING: Self = Self(11);
    /// Checkpointing and relaxed deregistration
    pub const V12_CHECKPOINTING: Self = Self(12);
    /// Checkpoints become binding
    pub const V13_ENFORCE_CHECKPOINTS: Self = Self(13);
    /// Blink instant transactions
    pub const V14_BLINK: Self = Self(14);
    /// Name service
    pub const V15_ONS: Self = Self(15);
    /// Pulse block production
    pub const V16_PULSE: Self = Self(16);
    /// Reserved
    pub const V17: Self = Self(17);
    /// Reserved
    pub const V18: Self = Self(18);

    /// Lowest version this build knows about
    pub const EARLIEST: Self = Self::V7;
    /// Highest version this build knows about
    pub const LATEST: Self = Self::V18;

    /// Every known version in ascending order
    pub const KNOWN: [Self; 12] = [
        Self::V7,
        Self::V8,
        Self::V9_MASTERNODES,
        Self::V10_BULLETPROOFS,
        Self::V11_INFINITE_STAKING,
        Self::V12_CHECKPOINTING,
        Self::V13_ENFORCE_CHECKPOINTS,
        Self::V14_BLINK,
        Self::V15_ONS,
        Self::V16_PULSE,
        Self::V17,
        Self::V18,
    ];

    /// Wrap a raw version byte
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw version byte
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether this build has a name for the version
    pub const fn is_known(self) -> bool {
        self.0 >= Self::EARLIEST.0 && self.0 <= Self::LATEST.0
    }

    /// Short codename, if the version has one
    pub const fn codename(self) -> Option<&'static str> {
        match self.0 {
            9 => Some("masternodes"),
            10 => Some("bulletproofs"),
            11 => Some("infinite staking"),
            12 => Some("checkpointing"),
            13 => Some("enforce checkpoints"),
            14 => Some("blink"),
            15 => Some("ons"),
            16 => Some("pulse"),
            _ => None,
        }
    }
}

impl From<u8> for HardForkVersion {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<HardForkVersion> for u8 {
    fn from(version: HardForkVersion) -> Self {
        version.0
    }
}

impl fmt::Display for HardForkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.codename() {
            Some(name) => write!(f, "v{} ({})", self.0, name),
            None => write!(f, "v{}", self.0),
        }
    }
}

/// Named protocol feature gated on a hard-fork version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Fees charged per byte instead of per kilobyte
    PerByteFee,
    /// Smaller bulletproof encoding
    SmallerBulletproofs,
    /// Long-term block weight median
    LongTermBlockWeight,
    /// Temporary per-byte fee increase
    IncreaseFee,
    /// CLSAG ring signatures
    Clsag,
    /// Additional fee per transaction output
    PerOutputFee,
    /// Ed25519 masternode keys
    Ed25519Key,
    /// Part of the fee may be burned
    FeeBurning,
    /// Blink instant transactions
    Blink,
    /// Transactions need at least two outputs
    Min2Outputs,
    /// Coinbase transactions may not carry signatures
    RejectSigsInCoinbase,
    /// Minimum output age is enforced
    EnforceMinAge,
    /// Effective short-term median used in the block size penalty
    EffectiveShortTermMedianInPenalty,
    /// Pulse block production
    Pulse,
    /// BT-encoded proofs
    ProofBtEnc,
}

impl Feature {
    /// Every feature gate
    pub const ALL: [Feature; 15] = [
        Feature::PerByteFee,
        Feature::SmallerBulletproofs,
        Feature::LongTermBlockWeight,
        Feature::IncreaseFee,
        Feature::Clsag,
        Feature::PerOutputFee,
        Feature::Ed25519Key,
        Feature::FeeBurning,
        Feature::Blink,
        Feature::Min2Outputs,
        Feature::RejectSigsInCoinbase,
        Feature::EnforceMinAge,
        Feature::EffectiveShortTermMedianInPenalty,
        Feature::Pulse,
        Feature::ProofBtEnc,
    ];

    /// First version at which the feature is active
    pub const fn activation(self) -> HardForkVersion {
        match self {
            Feature::PerByteFee => HardForkVersion::V10_BULLETPROOFS,
            Feature::SmallerBulletproofs | Feature::LongTermBlockWeight => {
                HardForkVersion::V11_INFINITE_STAKING
            }
            Feature::IncreaseFee | Feature::Clsag => HardForkVersion::V12_CHECKPOINTING,
            Feature::PerOutputFee | Feature::Ed25519Key => {
                HardForkVersion::V13_ENFORCE_CHECKPOINTS
            }
            Feature::FeeBurning | Feature::Blink => HardForkVersion::V14_BLINK,
            Feature::Min2Outputs
            | Feature::RejectSigsInCoinbase
            | Feature::EnforceMinAge
            | Feature::EffectiveShortTermMedianInPenalty
            | Feature::Pulse => HardForkVersion::V16_PULSE,
            Feature::ProofBtEnc => HardForkVersion::V18,
        }
    }

    /// Check if the feature is active at the given version
    pub const fn is_active(self, version: HardForkVersion) -> bool {
        version.0 >= self.activation().0
    }
}

/// Ring signature scheme required for transaction inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingSignatureScheme {
    /// Multilayered linkable spontaneous anonymous group signatures
    Mlsag,
    /// Concise linkable spontaneous anonymous group signatures
    Clsag,
}

/// Fee schedule in atomic units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee per started kilobyte (legacy, zero once per-byte fees apply)
    pub per_kb: u64,
    /// Fee per byte of transaction weight
    pub per_byte: u64,
    /// Fee per transaction output
    pub per_output: u64,
    /// Weight of the reference transaction used for dynamic fee scaling
    pub reference_tx_weight: u64,
    /// Whether a transaction may burn part of its fee
    pub burning_allowed: bool,
}

impl FeeSchedule {
    /// Minimum fee for a transaction of `weight` bytes with `outputs` outputs
    ///
    /// Returns `None` on overflow.
    pub fn minimum_fee(&self, weight: u64, outputs: u64) -> Option<u64> {
        let kb_fee = weight.div_ceil(1024).checked_mul(self.per_kb)?;
        let byte_fee = weight.checked_mul(self.per_byte)?;
        let output_fee = outputs.checked_mul(self.per_output)?;
        kb_fee.checked_add(byte_fee)?.checked_add(output_fee)
    }
}

/// Everything that a hard fork may change about transaction policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkParams {
    /// Fee schedule
    pub fee: FeeSchedule,
    /// Maximum number of outputs per transaction
    pub max_outputs: usize,
    /// Minimum number of outputs per transaction
    pub min_outputs: usize,
    /// Minimum age (in blocks) before an output may be spent; zero when not enforced
    pub min_spendable_age: u64,
    /// Ring signature scheme
    pub ring_signature: RingSignatureScheme,
}

/// A parameter set and the version that activates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkEntry {
    /// First version using `params`
    pub activation: HardForkVersion,
    /// Parameters in force from `activation` until the next entry
    pub params: ForkParams,
}

/// Parameters in force before the first scheduled activation
pub const PRE_ACTIVATION_PARAMS: ForkParams = ForkParams {
    fee: FeeSchedule {
        per_kb: DYNAMIC_FEE_PER_KB_BASE_FEE_V5,
        per_byte: 0,
        per_output: 0,
        reference_tx_weight: DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT,
        burning_allowed: false,
    },
    max_outputs: BULLETPROOF_MAX_OUTPUTS,
    min_outputs: 1,
    min_spendable_age: 0,
    ring_signature: RingSignatureScheme::Mlsag,
};

const V10_PARAMS: ForkParams = ForkParams {
    fee: FeeSchedule {
        per_kb: 0,
        per_byte: FEE_PER_BYTE_V13,
        ..PRE_ACTIVATION_PARAMS.fee
    },
    ..PRE_ACTIVATION_PARAMS
};

const V12_PARAMS: ForkParams = ForkParams {
    fee: FeeSchedule {
        per_byte: FEE_PER_BYTE_V12,
        reference_tx_weight: DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT_V12,
        ..V10_PARAMS.fee
    },
    ring_signature: RingSignatureScheme::Clsag,
    ..V10_PARAMS
};

const V13_PARAMS: ForkParams = ForkParams {
    fee: FeeSchedule {
        per_byte: FEE_PER_BYTE_V13,
        per_output: FEE_PER_OUTPUT_V13,
        reference_tx_weight: DYNAMIC_FEE_REFERENCE_TRANSACTION_WEIGHT,
        ..V12_PARAMS.fee
    },
    ..V12_PARAMS
};

const V14_PARAMS: ForkParams = ForkParams {
    fee: FeeSchedule {
        burning_allowed: true,
        ..V13_PARAMS.fee
    },
    ..V13_PARAMS
};

const V16_PARAMS: ForkParams = ForkParams {
    min_outputs: 2,
    min_spendable_age: CRYPTONOTE_DEFAULT_TX_SPENDABLE_AGE,
    ..V14_PARAMS
};

const V18_PARAMS: ForkParams = ForkParams {
    fee: FeeSchedule {
        per_output: FEE_PER_OUTPUT_V18,
        ..V16_PARAMS.fee
    },
    ..V16_PARAMS
};

/// Per-byte fee from v12 (v13 switches back)
pub const FEE_PER_BYTE_V12: u64 = 17_200;
/// Per-byte fee from v10 and again from v13
pub const FEE_PER_BYTE_V13: u64 = 215;
/// Per-output fee from v13
pub const FEE_PER_OUTPUT_V13: u64 = 20_000_000;
/// Per-output fee from v18
pub const FEE_PER_OUTPUT_V18: u64 = 5_000_000;

/// Activation table shipped with this build, ascending
pub const STANDARD_FORK_ENTRIES: [ForkEntry; 6] = [
    ForkEntry {
        activation: HardForkVersion::V10_BULLETPROOFS,
        params: V10_PARAMS,
    },
    ForkEntry {
        activation: HardForkVersion::V12_CHECKPOINTING,
        params: V12_PARAMS,
    },
    ForkEntry {
        activation: HardForkVersion::V13_ENFORCE_CHECKPOINTS,
        params: V13_PARAMS,
    },
    ForkEntry {
        activation: HardForkVersion::V14_BLINK,
        params: V14_PARAMS,
    },
    ForkEntry {
        activation: HardForkVersion::V16_PULSE,
        params: V16_PARAMS,
    },
    ForkEntry {
        activation: HardForkVersion::V18,
        params: V18_PARAMS,
    },
];

/// Ascending table of gated parameter sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkSchedule {
    pre_activation: ForkParams,
    entries: Vec<ForkEntry>,
}

impl ForkSchedule {
    /// Build a schedule, rejecting empty or non-ascending tables
    pub fn new(pre_activation: ForkParams, entries: Vec<ForkEntry>) -> Result<Self> {
        let schedule = Self {
            pre_activation,
            entries,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// The schedule shipped with this build
    pub fn standard() -> Self {
        Self {
            pre_activation: PRE_ACTIVATION_PARAMS,
            entries: STANDARD_FORK_ENTRIES.to_vec(),
        }
    }

    /// Check that activation versions are strictly ascending
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::EmptySchedule);
        }

        for pair in self.entries.windows(2) {
            if pair[1].activation <= pair[0].activation {
                return Err(Error::NonMonotonicSchedule {
                    previous: pair[0].activation,
                    next: pair[1].activation,
                });
            }
        }

        Ok(())
    }

    /// Number of entries whose activation is at or below `version`
    fn floor_len(&self, version: HardForkVersion) -> usize {
        self.entries.partition_point(|entry| entry.activation <= version)
    }

    /// Parameters in force at `version`
    ///
    /// Versions below the first activation get the pre-activation set;
    /// versions above the last activation keep the last entry's set.
    pub fn resolve(&self, version: HardForkVersion) -> &ForkParams {
        match self.floor_len(version) {
            0 => &self.pre_activation,
            n => &self.entries[n - 1].params,
        }
    }

    /// Activation version of the entry [`resolve`](Self::resolve) would use,
    /// or `None` for the pre-activation set
    pub fn resolve_activation(&self, version: HardForkVersion) -> Option<HardForkVersion> {
        match self.floor_len(version) {
            0 => None,
            n => Some(self.entries[n - 1].activation),
        }
    }

    /// Parameters used below the first activation
    pub fn pre_activation(&self) -> &ForkParams {
        &self.pre_activation
    }

    /// All scheduled entries
    pub fn entries(&self) -> &[ForkEntry] {
        &self.entries
    }

    /// Highest scheduled activation
    pub fn latest_activation(&self) -> Option<HardForkVersion> {
        self.entries.last().map(|entry| entry.activation)
    }
}

impl Default for ForkSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schedule_is_valid() {
        assert!(ForkSchedule::standard().validate().is_ok());
    }

    #[test]
    fn test_pre_activation_below_first_entry() {
        let schedule = ForkSchedule::standard();

        for version in [
            HardForkVersion::V7,
            HardForkVersion::V8,
            HardForkVersion::V9_MASTERNODES,
        ] {
            assert_eq!(schedule.resolve(version), &PRE_ACTIVATION_PARAMS);
            assert_eq!(schedule.resolve_activation(version), None);
        }
        assert_eq!(schedule.resolve(HardForkVersion::new(0)), &PRE_ACTIVATION_PARAMS);
    }

    #[test]
    fn test_floor_lookup_between_entries() {
        let schedule = ForkSchedule::standard();

        // v11 has no entry of its own, so v10's set applies
        assert_eq!(
            schedule.resolve_activation(HardForkVersion::V11_INFINITE_STAKING),
            Some(HardForkVersion::V10_BULLETPROOFS)
        );
        assert_eq!(
            schedule.resolve(HardForkVersion::V15_ONS),
            schedule.resolve(HardForkVersion::V14_BLINK)
        );
        assert_eq!(
            schedule.resolve(HardForkVersion::V17),
            schedule.resolve(HardForkVersion::V16_PULSE)
        );
    }

    #[test]
    fn test_fee_history() {
        let schedule = ForkSchedule::standard();

        assert_eq!(schedule.resolve(HardForkVersion::V10_BULLETPROOFS).fee.per_byte, 215);
        assert_eq!(
            schedule.resolve(HardForkVersion::V12_CHECKPOINTING).fee.per_byte,
            17_200
        );
        assert_eq!(
            schedule.resolve(HardForkVersion::V13_ENFORCE_CHECKPOINTS).fee.per_byte,
            215
        );
        assert_eq!(
            schedule.resolve(HardForkVersion::V13_ENFORCE_CHECKPOINTS).fee.per_output,
            20_000_000
        );
        assert_eq!(schedule.resolve(HardForkVersion::V18).fee.per_output, 5_000_000);
    }

    #[test]
    fn test_future_version_uses_latest_entry() {
        let schedule = ForkSchedule::standard();
        let future = HardForkVersion::new(42);

        assert!(!future.is_known());
        assert_eq!(schedule.resolve(future), schedule.resolve(HardForkVersion::LATEST));
        assert_eq!(schedule.resolve_activation(future), Some(HardForkVersion::V18));
    }

    #[test]
    fn test_rejects_unordered_schedule() {
        let mut entries = STANDARD_FORK_ENTRIES.to_vec();
        entries.swap(1, 2);

        let err = ForkSchedule::new(PRE_ACTIVATION_PARAMS, entries).unwrap_err();
        assert!(matches!(
            err,
            Error::NonMonotonicSchedule {
                previous: HardForkVersion::V13_ENFORCE_CHECKPOINTS,
                next: HardForkVersion::V12_CHECKPOINTING,
            }
        ));
    }

    #[test]
    fn test_rejects_duplicate_activation() {
        let mut entries = STANDARD_FORK_ENTRIES.to_vec();
        entries[1].activation = entries[0].activation;

        assert!(matches!(
            ForkSchedule::new(PRE_ACTIVATION_PARAMS, entries),
            Err(Error::NonMonotonicSchedule { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_schedule() {
        assert!(matches!(
            ForkSchedule::new(PRE_ACTIVATION_PARAMS, Vec::new()),
            Err(Error::EmptySchedule)
        ));
    }

    #[test]
    fn test_parameter_sets_agree_with_feature_gates() {
        let schedule = ForkSchedule::standard();

        for raw in 0..=24u8 {
            let version = HardForkVersion::new(raw);
            let params = schedule.resolve(version);

            assert_eq!(
                Feature::Clsag.is_active(version),
                params.ring_signature == RingSignatureScheme::Clsag,
                "clsag at {version}"
            );
            assert_eq!(
                Feature::PerOutputFee.is_active(version),
                params.fee.per_output > 0,
                "per-output fee at {version}"
            );
            assert_eq!(
                Feature::PerByteFee.is_active(version),
                params.fee.per_kb == 0,
                "per-byte fee at {version}"
            );
            assert_eq!(Feature::FeeBurning.is_active(version), params.fee.burning_allowed);
            assert_eq!(Feature::Min2Outputs.is_active(version), params.min_outputs == 2);
            assert_eq!(
                Feature::EnforceMinAge.is_active(version),
                params.min_spendable_age > 0
            );
        }
    }

    #[test]
    fn test_minimum_fee() {
        let schedule = ForkSchedule::standard();

        let legacy = schedule.resolve(HardForkVersion::V9_MASTERNODES).fee;
        assert_eq!(legacy.minimum_fee(1_500, 2), Some(2 * 400_000_000));

        let pulse = schedule.resolve(HardForkVersion::V16_PULSE).fee;
        assert_eq!(pulse.minimum_fee(1_500, 2), Some(1_500 * 215 + 2 * 20_000_000));

        assert_eq!(pulse.minimum_fee(u64::MAX, 1), None);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(HardForkVersion::V16_PULSE.to_string(), "v16 (pulse)");
        assert_eq!(HardForkVersion::V17.to_string(), "v17");
        assert!(HardForkVersion::V9_MASTERNODES < HardForkVersion::V10_BULLETPROOFS);
    }
}

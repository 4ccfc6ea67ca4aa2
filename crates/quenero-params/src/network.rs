//! Quenero network definitions
//!
//! One immutable [`NetworkConfig`] per [`NetworkType`]. The records are
//! `'static` and read-only, so any number of threads may read them without
//! synchronization.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchor::HeightAnchor;
use crate::derived::blocks_expected_in_days;
use crate::genesis::{self, GenesisTransaction};
use crate::hardfork::HardForkVersion;
use crate::p2p::{P2pDefaults, P2P_DEFAULTS};
use crate::{Error, Result};

/// Network type enumeration
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum NetworkType {
    /// Mainnet
    #[default]
    Mainnet = 0,
    /// Testnet
    Testnet = 1,
    /// Devnet
    Devnet = 2,
    /// Local hand-crafted network
    Fakechain = 3,
}

impl NetworkType {
    /// Every network type
    pub const ALL: [NetworkType; 4] = [
        NetworkType::Mainnet,
        NetworkType::Testnet,
        NetworkType::Devnet,
        NetworkType::Fakechain,
    ];

    /// Stable numeric id
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Lowercase name as accepted by [`FromStr`]
    pub const fn as_str(self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Devnet => "devnet",
            NetworkType::Fakechain => "fakechain",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkType::Mainnet => "Mainnet",
            NetworkType::Testnet => "Testnet",
            NetworkType::Devnet => "Devnet",
            NetworkType::Fakechain => "Fakenet",
        };
        f.write_str(name)
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkType::Mainnet),
            "testnet" => Ok(NetworkType::Testnet),
            "devnet" => Ok(NetworkType::Devnet),
            "fakechain" | "fakenet" | "regtest" => Ok(NetworkType::Fakechain),
            _ => Err(Error::InvalidNetwork(s.to_string())),
        }
    }
}

impl TryFrom<u8> for NetworkType {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self> {
        NetworkType::ALL
            .into_iter()
            .find(|network| network.id() == raw)
            .ok_or_else(|| Error::InvalidNetwork(format!("network type id {}", raw)))
    }
}

/// Base58 address prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPrefixes {
    /// Standard address
    pub standard: u64,
    /// Integrated address (embeds a payment id)
    pub integrated: u64,
    /// Sub-address
    pub subaddress: u64,
}

impl AddressPrefixes {
    /// Prefixes in declaration order
    pub const fn to_array(&self) -> [u64; 3] {
        [self.standard, self.integrated, self.subaddress]
    }

    /// Check that no two prefixes collide
    pub fn are_distinct(&self) -> bool {
        all_distinct(&self.to_array())
    }
}

/// Default listening ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPorts {
    /// Peer-to-peer
    pub p2p: u16,
    /// JSON RPC
    pub rpc: u16,
    /// ZMQ event stream
    pub zmq_rpc: u16,
    /// Masternode quorum network
    pub qnet: u16,
}

impl DefaultPorts {
    /// Ports in declaration order
    pub const fn to_array(&self) -> [u16; 4] {
        [self.p2p, self.rpc, self.zmq_rpc, self.qnet]
    }

    /// Check that no two ports collide
    pub fn are_distinct(&self) -> bool {
        all_distinct(&self.to_array())
    }
}

/// Masternode uptime proof timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeProofTiming {
    /// How far a proof timestamp may deviate from local time before it is refused
    pub tolerance: Duration,
    /// Delay after startup before the first proof is broadcast
    pub startup_delay: Duration,
    /// How often to check whether a proof is due
    pub check_interval: Duration,
    /// How often to send proofs after the last successful one
    pub frequency: Duration,
    /// How long a proof keeps a masternode counted as up
    pub validity: Duration,
}

impl UptimeProofTiming {
    /// Check `validity > frequency > check_interval` and `tolerance < frequency`
    pub fn is_consistent(&self) -> bool {
        self.validity > self.frequency
            && self.frequency > self.check_interval
            && self.tolerance < self.frequency
    }

    /// Minimum accepted spacing between two proofs from the same node
    pub fn min_proof_interval(&self) -> Duration {
        self.frequency / 2
    }
}

/// Governance payout address and the version from which it applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GovernanceWallet {
    /// First version paying to `address`
    pub activation: HardForkVersion,
    /// Base58 wallet address
    pub address: &'static str,
}

/// Network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// Anchor for estimating the current height
    pub height_anchor: HeightAnchor,
    /// Base58 address prefixes
    pub address_prefixes: AddressPrefixes,
    /// Default ports
    pub ports: DefaultPorts,
    /// Identifier exchanged in the peer handshake
    pub network_id: Uuid,
    /// Genesis transaction (hex)
    pub genesis_tx: &'static str,
    /// Genesis block nonce
    pub genesis_nonce: u32,
    /// Blocks between governance payouts
    pub governance_reward_interval: u64,
    /// Governance payout addresses, ascending by activation
    pub governance_wallets: &'static [GovernanceWallet],
    /// Uptime proof timing
    pub uptime_proof: UptimeProofTiming,
}

const MAINNET_PREFIXES: AddressPrefixes = AddressPrefixes {
    standard: 18,
    integrated: 19,
    subaddress: 42,
};

const MAINNET_PORTS: DefaultPorts = DefaultPorts {
    p2p: 19990,
    rpc: 19991,
    zmq_rpc: 19992,
    qnet: 19993,
};

const MAINNET_ANCHOR: HeightAnchor = HeightAnchor::new(582_088, 1_595_359_932);

const MAINNET_GENESIS_TX: &str = "013c01ff0001ffffffffffff03029b2e4c0281c0b02e7c53291a94d1d0cbff8883f8024f5142ee494ffbbd08807121017767aafcde9be00dcfd098715ebcf7f410daebc582fda69d24a28e9d0bc890d1";

const MAINNET_GOVERNANCE_WALLETS: &[GovernanceWallet] = &[GovernanceWallet {
    activation: HardForkVersion::EARLIEST,
    address: "49MA1WacHE3XBpq1wVJvHBiAGN2xVTpur4EmLKp8FPaFguMguarpupkNzMrBbN1UyA34HC2doj8q88soaDiVUhGhCbkMNMe",
}];

const UPTIME_PROOF_TOLERANCE: Duration = Duration::from_secs(5 * 60);
const UPTIME_PROOF_STARTUP_DELAY: Duration = Duration::from_secs(30);
const UPTIME_PROOF_CHECK_INTERVAL: Duration = Duration::from_secs(30);

const MAINNET_UPTIME_PROOF: UptimeProofTiming = UptimeProofTiming {
    tolerance: UPTIME_PROOF_TOLERANCE,
    startup_delay: UPTIME_PROOF_STARTUP_DELAY,
    check_interval: UPTIME_PROOF_CHECK_INTERVAL,
    frequency: Duration::from_secs(60 * 60),
    validity: Duration::from_secs(2 * 60 * 60 + 5 * 60),
};

// Testnet and devnet proofs run 6x faster than mainnet.
const TESTNET_UPTIME_PROOF: UptimeProofTiming = UptimeProofTiming {
    frequency: Duration::from_secs(10 * 60),
    validity: Duration::from_secs(21 * 60),
    ..MAINNET_UPTIME_PROOF
};

// Fakechain proofs run 60x faster than mainnet.
const FAKECHAIN_UPTIME_PROOF: UptimeProofTiming = UptimeProofTiming {
    tolerance: Duration::from_secs(30),
    startup_delay: Duration::from_secs(5),
    check_interval: Duration::from_secs(5),
    frequency: Duration::from_secs(60),
    validity: Duration::from_secs(2 * 60 + 5),
};

static MAINNET_CONFIG: NetworkConfig = NetworkConfig {
    network_type: NetworkType::Mainnet,
    height_anchor: MAINNET_ANCHOR,
    address_prefixes: MAINNET_PREFIXES,
    ports: MAINNET_PORTS,
    network_id: Uuid::from_bytes([
        0x01, 0x80, 0xF1, 0x21, 0x11, 0x04, 0x69, 0x08, 0x27, 0x55, 0x71, 0x46, 0x76, 0x35, 0xA1,
        0x61,
    ]),
    genesis_tx: MAINNET_GENESIS_TX,
    genesis_nonce: 70,
    governance_reward_interval: blocks_expected_in_days(2),
    governance_wallets: MAINNET_GOVERNANCE_WALLETS,
    uptime_proof: MAINNET_UPTIME_PROOF,
};

static TESTNET_CONFIG: NetworkConfig = NetworkConfig {
    network_type: NetworkType::Testnet,
    height_anchor: HeightAnchor::new(100, 1_595_360_006),
    address_prefixes: AddressPrefixes {
        standard: 53,
        integrated: 54,
        subaddress: 63,
    },
    ports: DefaultPorts {
        p2p: 29990,
        rpc: 29991,
        zmq_rpc: 29992,
        qnet: 29993,
    },
    network_id: Uuid::from_bytes([
        0x12, 0x30, 0x77, 0x06, 0x61, 0x34, 0x51, 0x81, 0x66, 0x31, 0x00, 0x82, 0x16, 0xA1, 0xA1,
        0x55,
    ]),
    genesis_tx: MAINNET_GENESIS_TX,
    genesis_nonce: 10001,
    governance_reward_interval: 1000,
    governance_wallets: &[GovernanceWallet {
        activation: HardForkVersion::EARLIEST,
        address: "9ywuvoheH7eGFekGjv5H1w6kNqMeWPGUEGB5rso6NWEkhvmZwM1rXk1PJAq6BswnLuc5tKWwW3iwe5rRLa2D8GWiUZLf8Se",
    }],
    uptime_proof: TESTNET_UPTIME_PROOF,
};

static DEVNET_CONFIG: NetworkConfig = NetworkConfig {
    network_type: NetworkType::Devnet,
    height_anchor: HeightAnchor::new(0, 1_597_170_000),
    address_prefixes: AddressPrefixes {
        standard: 24,   // dV1 .. dV3
        integrated: 25, // dVA .. dVC
        subaddress: 36, // dVa .. dVc
    },
    ports: DefaultPorts {
        p2p: 39990,
        rpc: 39991,
        zmq_rpc: 39992,
        qnet: 39993,
    },
    network_id: Uuid::from_bytes([
        0xBB, 0x37, 0x9B, 0x22, 0x0A, 0x66, 0x69, 0x1E, 0x09, 0xB2, 0x97, 0x8A, 0xCC, 0xA1, 0xDF,
        0x9C,
    ]),
    genesis_tx: "013c01ff0001ffffffffffff0302df5d56da0c7d643ddd1ce61901c7bdc5fb1738bfe39fbe69c28a3a7032729c0f2101168d0c4ca86fb55a4cf6a36d31431be1c53a3bd7411bb24e8832410289fa6f3b",
    genesis_nonce: 12345,
    governance_reward_interval: blocks_expected_in_days(7),
    governance_wallets: &[GovernanceWallet {
        activation: HardForkVersion::EARLIEST,
        address: "58dkEjHePSCT6z7MXt8KNSjV2hRc9qPc83ZbCbd3EmaJXEQSBF6PGtP2R1NSqPNdG65M8txBEd4DkiK54dnPF3dj9JKVotp",
    }],
    uptime_proof: TESTNET_UPTIME_PROOF,
};

static FAKECHAIN_CONFIG: NetworkConfig = NetworkConfig {
    network_type: NetworkType::Fakechain,
    height_anchor: MAINNET_ANCHOR,
    address_prefixes: MAINNET_PREFIXES,
    ports: MAINNET_PORTS,
    // "Fakechain" followed by a serial, so a local net never handshakes with mainnet
    network_id: Uuid::from_bytes([
        0x46, 0x61, 0x6B, 0x65, 0x63, 0x68, 0x61, 0x69, 0x6E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x01,
    ]),
    genesis_tx: MAINNET_GENESIS_TX,
    genesis_nonce: 70,
    governance_reward_interval: 100,
    governance_wallets: MAINNET_GOVERNANCE_WALLETS,
    uptime_proof: FAKECHAIN_UPTIME_PROOF,
};

/// Get the configuration record for `network_type`
pub fn get_config(network_type: NetworkType) -> &'static NetworkConfig {
    match network_type {
        NetworkType::Mainnet => &MAINNET_CONFIG,
        NetworkType::Testnet => &TESTNET_CONFIG,
        NetworkType::Devnet => &DEVNET_CONFIG,
        NetworkType::Fakechain => &FAKECHAIN_CONFIG,
    }
}

impl NetworkConfig {
    /// Get mainnet parameters
    pub fn mainnet() -> &'static Self {
        &MAINNET_CONFIG
    }

    /// Get testnet parameters
    pub fn testnet() -> &'static Self {
        &TESTNET_CONFIG
    }

    /// Get devnet parameters
    pub fn devnet() -> &'static Self {
        &DEVNET_CONFIG
    }

    /// Get fakechain parameters
    pub fn fakechain() -> &'static Self {
        &FAKECHAIN_CONFIG
    }

    /// Get every configuration record
    pub fn all() -> [&'static Self; 4] {
        NetworkType::ALL.map(get_config)
    }

    /// Look up a record by raw network type id
    ///
    /// Unknown ids are an error; no default network is substituted.
    pub fn from_raw(raw: u8) -> Result<&'static Self> {
        NetworkType::try_from(raw).map(get_config)
    }

    /// Governance payout address in force at `version`
    ///
    /// The address table is resolved the same way as fork parameters: the
    /// entry with the greatest activation not above `version` wins, and the
    /// first entry covers anything older.
    pub fn governance_wallet_address(&self, version: HardForkVersion) -> &'static str {
        let applicable = self
            .governance_wallets
            .partition_point(|wallet| wallet.activation <= version);
        self.governance_wallets
            .get(applicable.saturating_sub(1))
            .map_or("", |wallet| wallet.address)
    }

    /// Check if a peer advertising `network_id` belongs to this network
    pub fn accepts_peer(&self, network_id: &Uuid) -> bool {
        self.network_id == *network_id
    }

    /// Peer-list limits, connection counts and timeouts
    pub fn p2p_defaults(&self) -> &'static P2pDefaults {
        &P2P_DEFAULTS
    }

    /// Parse the genesis transaction literal
    pub fn genesis(&self) -> Result<GenesisTransaction> {
        genesis::parse_genesis_tx(self.genesis_tx).map_err(|source| Error::Genesis {
            network: self.network_type,
            source,
        })
    }
}

fn all_distinct<T: PartialEq>(values: &[T]) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(i, value)| !values[i + 1..].contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_params() {
        let net = NetworkConfig::mainnet();
        assert_eq!(net.network_type, NetworkType::Mainnet);
        assert_eq!(net.address_prefixes.standard, 18);
        assert_eq!(net.ports.p2p, 19990);
        assert_eq!(net.governance_reward_interval, 1_440);
        assert_eq!(net.genesis_nonce, 70);
    }

    #[test]
    fn test_network_from_type() {
        for network in NetworkType::ALL {
            assert_eq!(get_config(network).network_type, network);
        }
        assert_eq!(NetworkType::default(), NetworkType::Mainnet);
    }

    #[test]
    fn test_from_raw_rejects_unknown() {
        assert_eq!(
            NetworkConfig::from_raw(2).unwrap().network_type,
            NetworkType::Devnet
        );
        assert!(matches!(NetworkConfig::from_raw(4), Err(Error::InvalidNetwork(_))));
        assert!(matches!(NetworkConfig::from_raw(255), Err(Error::InvalidNetwork(_))));
    }

    #[test]
    fn test_network_type_parsing() {
        assert_eq!("mainnet".parse::<NetworkType>().unwrap(), NetworkType::Mainnet);
        assert_eq!("TESTNET".parse::<NetworkType>().unwrap(), NetworkType::Testnet);
        assert_eq!("regtest".parse::<NetworkType>().unwrap(), NetworkType::Fakechain);
        assert!("stagenet".parse::<NetworkType>().is_err());
        assert_eq!(NetworkType::Fakechain.to_string(), "Fakenet");
    }

    #[test]
    fn test_prefixes_and_ports_distinct() {
        for config in NetworkConfig::all() {
            assert!(config.address_prefixes.are_distinct(), "{}", config.network_type);
            assert!(config.ports.are_distinct(), "{}", config.network_type);
        }
    }

    #[test]
    fn test_network_ids_unique() {
        let configs = NetworkConfig::all();
        for (i, a) in configs.iter().enumerate() {
            for b in &configs[i + 1..] {
                assert_ne!(a.network_id, b.network_id);
            }
        }
    }

    #[test]
    fn test_uptime_timing_consistent() {
        for config in NetworkConfig::all() {
            assert!(config.uptime_proof.is_consistent(), "{}", config.network_type);
        }
        assert_eq!(
            NetworkConfig::mainnet().uptime_proof.min_proof_interval(),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn test_inconsistent_timing_detected() {
        let timing = UptimeProofTiming {
            tolerance: Duration::from_secs(5 * 60),
            ..NetworkConfig::fakechain().uptime_proof
        };
        assert!(!timing.is_consistent());
    }

    #[test]
    fn test_governance_wallet_address() {
        let net = NetworkConfig::mainnet();
        let address = net.governance_wallet_address(HardForkVersion::V16_PULSE);

        assert!(address.starts_with("49MA1W"));
        assert_eq!(net.governance_wallet_address(HardForkVersion::new(0)), address);
        assert_eq!(net.governance_wallet_address(HardForkVersion::new(99)), address);
    }

    #[test]
    fn test_accepts_peer() {
        let mainnet = NetworkConfig::mainnet();
        assert!(mainnet.accepts_peer(&mainnet.network_id));
        assert!(!mainnet.accepts_peer(&NetworkConfig::testnet().network_id));
        assert!(!mainnet.accepts_peer(&NetworkConfig::fakechain().network_id));
    }

    #[test]
    fn test_config_serializes() {
        let json = serde_json::to_value(NetworkConfig::testnet()).unwrap();
        assert_eq!(json["network_type"], "testnet");
        assert_eq!(json["ports"]["rpc"], 29991);
        assert_eq!(json["network_id"], "12307706-6134-5181-6631-008216a1a155");
    }
}

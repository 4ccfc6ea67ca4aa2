//! Genesis transaction parsing
//!
//! The genesis transaction is compiled in as a hex literal. At startup we
//! decode it and check it is a plain coinbase transaction. We only check its
//! shape here. Hashing it into a genesis block happens elsewhere.

use crate::consensus::CRYPTONOTE_MINED_MONEY_UNLOCK_WINDOW;

const TXIN_GEN_TAG: u8 = 0xff;
const TXOUT_TO_KEY_TAG: u8 = 0x02;
const TX_EXTRA_PUBKEY_TAG: u8 = 0x01;
const EXPECTED_TX_VERSION: u64 = 1;
const MAX_VARINT_BYTES: usize = 10;

/// Why a genesis literal was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenesisError {
    /// Literal is not valid hex
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Blob ended early
    #[error("unexpected end of data while reading {0}")]
    UnexpectedEof(&'static str),

    /// Varint longer than a u64
    #[error("varint overflow while reading {0}")]
    VarintOverflow(&'static str),

    /// Unsupported transaction version
    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u64),

    /// Unlock time is not the mined-money unlock window
    #[error("unlock time {found} does not match unlock window {expected}")]
    UnlockTime {
        /// Value in the blob
        found: u64,
        /// Value required
        expected: u64,
    },

    /// Input list is not a single coinbase input
    #[error("expected exactly one input, found {0}")]
    InputCount(u64),

    /// Input is not a coinbase input
    #[error("unexpected input tag {0:#04x}")]
    InputTag(u8),

    /// Coinbase input is not at height zero
    #[error("genesis input claims height {0}")]
    InputHeight(u64),

    /// Transaction has no outputs
    #[error("transaction has no outputs")]
    NoOutputs,

    /// Output is not a to-key output
    #[error("unexpected output tag {0:#04x}")]
    OutputTag(u8),

    /// Extra field is not a single transaction public key
    #[error("malformed extra field")]
    MalformedExtra,

    /// Bytes remain after the transaction
    #[error("{0} trailing bytes")]
    TrailingBytes(usize),
}

/// Output of the genesis transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisOutput {
    /// Amount in atomic units
    pub amount: u64,
    /// One-time output key
    pub key: [u8; 32],
}

/// Decoded genesis transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisTransaction {
    /// Transaction version
    pub version: u64,
    /// Unlock time (blocks)
    pub unlock_time: u64,
    /// Outputs
    pub outputs: Vec<GenesisOutput>,
    /// Transaction public key from the extra field
    pub tx_pubkey: [u8; 32],
}

impl GenesisTransaction {
    /// Total amount emitted
    pub fn total_amount(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |sum, output| sum.checked_add(output.amount))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn byte(&mut self, what: &'static str) -> Result<u8, GenesisError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(GenesisError::UnexpectedEof(what))?;
        self.pos += 1;
        Ok(byte)
    }

    fn bytes<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], GenesisError> {
        let end = self.pos + N;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(GenesisError::UnexpectedEof(what))?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Little-endian base-128 varint
    fn varint(&mut self, what: &'static str) -> Result<u64, GenesisError> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.byte(what)?;
            let bits = u64::from(byte & 0x7f);
            let shift = 7 * i as u32;
            if shift >= 64 || (shift > 0 && bits >> (64 - shift) != 0) {
                return Err(GenesisError::VarintOverflow(what));
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(GenesisError::VarintOverflow(what))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Decode a genesis transaction literal and check its shape
pub fn parse_genesis_tx(hex_blob: &str) -> Result<GenesisTransaction, GenesisError> {
    let blob = hex::decode(hex_blob)?;
    let mut reader = Reader::new(&blob);

    let version = reader.varint("version")?;
    if version != EXPECTED_TX_VERSION {
        return Err(GenesisError::UnsupportedVersion(version));
    }

    let unlock_time = reader.varint("unlock time")?;
    if unlock_time != CRYPTONOTE_MINED_MONEY_UNLOCK_WINDOW {
        return Err(GenesisError::UnlockTime {
            found: unlock_time,
            expected: CRYPTONOTE_MINED_MONEY_UNLOCK_WINDOW,
        });
    }

    let inputs = reader.varint("input count")?;
    if inputs != 1 {
        return Err(GenesisError::InputCount(inputs));
    }
    let tag = reader.byte("input tag")?;
    if tag != TXIN_GEN_TAG {
        return Err(GenesisError::InputTag(tag));
    }
    let height = reader.varint("input height")?;
    if height != 0 {
        return Err(GenesisError::InputHeight(height));
    }

    let output_count = reader.varint("output count")?;
    if output_count == 0 {
        return Err(GenesisError::NoOutputs);
    }
    let mut outputs = Vec::new();
    for _ in 0..output_count {
        let amount = reader.varint("output amount")?;
        let tag = reader.byte("output tag")?;
        if tag != TXOUT_TO_KEY_TAG {
            return Err(GenesisError::OutputTag(tag));
        }
        let key = reader.bytes::<32>("output key")?;
        outputs.push(GenesisOutput { amount, key });
    }

    let extra_len = reader.varint("extra length")?;
    if extra_len != 33 {
        return Err(GenesisError::MalformedExtra);
    }
    if reader.byte("extra tag")? != TX_EXTRA_PUBKEY_TAG {
        return Err(GenesisError::MalformedExtra);
    }
    let tx_pubkey = reader.bytes::<32>("tx public key")?;

    if reader.remaining() != 0 {
        return Err(GenesisError::TrailingBytes(reader.remaining()));
    }

    Ok(GenesisTransaction {
        version,
        unlock_time,
        outputs,
        tx_pubkey,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkConfig;

    #[test]
    fn test_all_genesis_literals_parse() {
        for config in NetworkConfig::all() {
            let tx = config.genesis().unwrap();
            assert_eq!(tx.version, 1);
            assert_eq!(tx.unlock_time, 60);
            assert_eq!(tx.outputs.len(), 1);
        }
    }

    #[test]
    fn test_mainnet_genesis_contents() {
        let tx = parse_genesis_tx(NetworkConfig::mainnet().genesis_tx).unwrap();

        // ff ff ff ff ff ff 03 => 2^44 - 1
        assert_eq!(tx.total_amount(), Some((1u64 << 44) - 1));
        assert_eq!(tx.outputs[0].key[..4], [0x9b, 0x2e, 0x4c, 0x02]);
        assert_eq!(tx.tx_pubkey[..4], [0x77, 0x67, 0xaa, 0xfc]);
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(matches!(parse_genesis_tx("01zz"), Err(GenesisError::InvalidHex(_))));
    }

    #[test]
    fn test_rejects_truncated_blob() {
        let full = NetworkConfig::mainnet().genesis_tx;
        let truncated = &full[..full.len() - 2];

        assert!(matches!(
            parse_genesis_tx(truncated),
            Err(GenesisError::UnexpectedEof("tx public key"))
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let padded = format!("{}00", NetworkConfig::mainnet().genesis_tx);
        assert_eq!(parse_genesis_tx(&padded), Err(GenesisError::TrailingBytes(1)));
    }

    #[test]
    fn test_rejects_wrong_version_and_unlock() {
        let full = NetworkConfig::mainnet().genesis_tx;

        let v2 = format!("02{}", &full[2..]);
        assert_eq!(parse_genesis_tx(&v2), Err(GenesisError::UnsupportedVersion(2)));

        let unlocked = format!("0100{}", &full[4..]);
        assert_eq!(
            parse_genesis_tx(&unlocked),
            Err(GenesisError::UnlockTime {
                found: 0,
                expected: 60
            })
        );
    }

    #[test]
    fn test_rejects_non_coinbase_input() {
        let full = NetworkConfig::mainnet().genesis_tx;
        // Replace the 0xff gen tag with 0x02 (to-key input)
        let spend = format!("{}02{}", &full[..6], &full[8..]);
        assert_eq!(parse_genesis_tx(&spend), Err(GenesisError::InputTag(0x02)));
    }

    #[test]
    fn test_varint_overflow() {
        let blob = [0xffu8; 11];
        let mut reader = Reader::new(&blob);
        assert_eq!(
            reader.varint("test"),
            Err(GenesisError::VarintOverflow("test"))
        );
    }
}

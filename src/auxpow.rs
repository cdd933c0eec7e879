//! Merge-mined block headers and AuxPoW verification
//!
//! An [`AuxPow`] owns the child block header and, when the header carries
//! [`AUXPOW_FLAG`](crate::constants::AUXPOW_FLAG), the decoded
//! [`AuxPowPayload`]. The header is decoded first and handed read-only to the
//! payload factory, so the payload never needs a reference back to its block.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coinbase::check_coinbase_script;
use crate::config::ConsensusConfig;
use crate::error::{ConsensusError, Result};
use crate::payload::AuxPowPayload;
use crate::serialization::{deserialize_header, ByteReader};
use crate::types::*;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxPow {
    header: BlockHeader,
    payload: Option<AuxPowPayload>,
}

impl AuxPow {
    pub fn new(header: BlockHeader, payload: Option<AuxPowPayload>) -> Self {
        AuxPow { header, payload }
    }

    /// Decode a child header at `offset`, followed by its payload when flagged
    pub fn decode(bytes: &[u8], offset: usize) -> Result<Self> {
        let mut reader = ByteReader::new(bytes, offset)?;
        let header = deserialize_header(&mut reader)?;
        let payload = AuxPowPayload::decode_for(&header, bytes, reader.position())?;
        Ok(AuxPow { header, payload })
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn payload(&self) -> Option<&AuxPowPayload> {
        self.payload.as_ref()
    }

    /// Chain ID encoded in an arbitrary version value
    pub fn chain_id(version: u32) -> u32 {
        version::chain_id(version)
    }

    /// Chain ID encoded in this block's own version
    pub fn own_chain_id(&self) -> u32 {
        version::chain_id(self.header.version)
    }

    pub fn is_valid(&self) -> bool {
        self.payload
            .as_ref()
            .is_some_and(AuxPowPayload::is_structurally_valid)
    }

    fn valid_payload(&self) -> Result<&AuxPowPayload> {
        match &self.payload {
            None => Err(ConsensusError::MalformedAuxPow(
                "block carries no AuxPoW payload".to_string(),
            )),
            Some(payload) if !payload.is_structurally_valid() => Err(ConsensusError::MalformedAuxPow(
                "parent coinbase has no inputs or a merkle branch is too long".to_string(),
            )),
            Some(payload) => Ok(payload),
        }
    }

    /// Identity hash of the parent block under the network's algorithm
    pub fn parent_block_hash(&self, config: &ConsensusConfig) -> Result<Hash> {
        let payload = self.payload.as_ref().ok_or_else(|| {
            ConsensusError::MalformedAuxPow("block carries no AuxPoW payload".to_string())
        })?;
        crate::pow::parent_block_hash(&payload.parent_block_header, config.pow_algorithm)
    }

    /// CheckAuxPow: 𝒜 × 𝒞 → {valid, invalid}
    ///
    /// For child header h with payload p under config c:
    /// 1. p must be present and structurally valid
    /// 2. ChainId(h.version) = c.aux_chain_id
    /// 3. ChainId(p.parent.version) ≠ c.aux_chain_id
    /// 4. The merge-mining marker appears at most once in p.coinbase.inputs[0].script_sig,
    ///    and if present that input spends the null outpoint
    /// 5. If c.require_merged_mining_header, the marker must be present
    ///
    /// Parent difficulty (hash vs. nBits) is not checked here.
    pub fn check_proof_of_work(&self, config: &ConsensusConfig) -> Result<()> {
        let payload = self.valid_payload()?;

        let own_chain_id = self.own_chain_id();
        if own_chain_id != config.aux_chain_id {
            warn!(
                actual = own_chain_id,
                expected = config.aux_chain_id,
                "merge-mined block has the wrong chain ID"
            );
            return Err(ConsensusError::WrongChainId {
                actual: own_chain_id,
                expected: config.aux_chain_id,
            });
        }

        let parent_chain_id = payload.parent_block_header.chain_id();
        if parent_chain_id == config.aux_chain_id {
            warn!(chain_id = parent_chain_id, "auxpow parent has our chain ID");
            return Err(ConsensusError::ParentSharesChainId {
                chain_id: parent_chain_id,
            });
        }

        let coinbase_input = payload.coinbase_input().ok_or_else(|| {
            ConsensusError::MalformedAuxPow("parent coinbase has no inputs".to_string())
        })?;
        let marker = check_coinbase_script(coinbase_input)?;
        if marker.is_none() && config.require_merged_mining_header {
            warn!("parent coinbase lacks a merged mining header");
            return Err(ConsensusError::MissingMergeMiningHeader);
        }

        debug!(
            chain_id = own_chain_id,
            base_version = version::base_version(self.header.version),
            parent_chain_id,
            marker_offset = ?marker,
            time = self.header.timestamp,
            "auxpow verified"
        );
        Ok(())
    }

    /// Merged-mining activation rules followed by [`AuxPow::check_proof_of_work`].
    ///
    /// Headers without the AuxPoW flag and without a payload pass untouched;
    /// their ordinary proof of work is checked elsewhere. A payload attached to
    /// an unflagged header is still verified.
    pub fn accept(&self, config: &ConsensusConfig) -> Result<()> {
        if !self.header.is_auxpow() && self.payload.is_none() {
            return Ok(());
        }

        if !config.merged_mining_enabled {
            warn!(time = self.header.timestamp, "auxpow block on a network without merged mining");
            return Err(ConsensusError::MergedMiningDisabled);
        }

        let time = u64::from(self.header.timestamp);
        if time < config.merged_mining_start_time {
            warn!(time, start = config.merged_mining_start_time, "auxpow block before merged mining start");
            return Err(ConsensusError::MergedMiningNotStarted {
                time,
                start: config.merged_mining_start_time,
            });
        }

        self.check_proof_of_work(config)
    }

    /// Returns the version of the block data structure
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Returns the nonce, an arbitrary value that exists only to make the hash of the block header
    /// fall below the difficulty target.
    pub fn nonce(&self) -> u32 {
        self.header.nonce
    }

    /// Seconds since the UNIX epoch at which the block was solved, per the solving node's clock
    pub fn time_seconds(&self) -> u32 {
        self.header.timestamp
    }

    pub fn time(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(i64::from(self.header.timestamp), 0).unwrap_or_default()
    }

    /// Offset just past the payload, 0 without one
    pub fn cursor(&self) -> usize {
        self.payload.as_ref().map_or(0, AuxPowPayload::cursor)
    }

    /// Bytes consumed by the payload, 0 without one
    pub fn message_size(&self) -> usize {
        self.payload.as_ref().map_or(0, AuxPowPayload::length)
    }
}

/// Two merge-mined blocks are equal when their timestamps are equal.
///
/// Nothing else is compared: distinct blocks solved in the same second are
/// equal. Compare [`AuxPow::header`] for structural equality.
impl PartialEq for AuxPow {
    fn eq(&self, other: &Self) -> bool {
        self.header.timestamp == other.header.timestamp
    }
}

impl Eq for AuxPow {}

impl fmt::Display for AuxPow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "      version: v{}", self.header.version)?;
        writeln!(f, "      time: [{}] {}", self.header.timestamp, self.time())?;
        writeln!(f, "      difficulty target (nBits): {}", self.header.bits)?;
        writeln!(f, "      nonce: {}", self.header.nonce)?;
        if let Some(payload) = &self.payload {
            writeln!(f)?;
            write!(f, "{}", payload)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PowAlgorithm;
    use crate::constants::*;

    fn child_header(chain_id: u32) -> BlockHeader {
        BlockHeader {
            version: version::make_version(chain_id, 0, true),
            prev_block_hash: [0; 32],
            merkle_root: [0; 32],
            timestamp: 1_400_000_000,
            bits: 0x1e0fffff,
            nonce: 0,
        }
    }

    fn payload(parent_chain_id: u32, script_sig: Vec<u8>, prevout: OutPoint) -> AuxPowPayload {
        let parent = BlockHeader {
            version: version::make_version(parent_chain_id, 2, false),
            prev_block_hash: [1; 32],
            merkle_root: [2; 32],
            timestamp: 1_399_999_990,
            bits: 0x1b0404cb,
            nonce: 7,
        };
        let coinbase = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout,
                script_sig,
                sequence: SEQUENCE_FINAL,
            }],
            outputs: vec![],
            lock_time: 0,
        };
        AuxPowPayload::new(parent, coinbase)
    }

    fn marker_script() -> Vec<u8> {
        vec![0x00, 0xfa, 0xbe, b'm', b'm', 0x01, 0x02]
    }

    #[test]
    fn test_valid_auxpow() {
        let aux = AuxPow::new(child_header(3), Some(payload(7, marker_script(), OutPoint::null())));
        let config = ConsensusConfig::new(3, PowAlgorithm::Scrypt);
        assert_eq!(aux.check_proof_of_work(&config), Ok(()));
    }

    #[test]
    fn test_missing_payload_short_circuits() {
        // Wrong chain ID too, but the malformed payload is reported first
        let aux = AuxPow::new(child_header(9), None);
        let config = ConsensusConfig::new(3, PowAlgorithm::Scrypt);
        assert!(matches!(
            aux.check_proof_of_work(&config),
            Err(ConsensusError::MalformedAuxPow(_))
        ));
        assert!(!aux.is_valid());
    }

    #[test]
    fn test_wrong_chain_id() {
        let aux = AuxPow::new(child_header(4), Some(payload(7, marker_script(), OutPoint::null())));
        let config = ConsensusConfig::new(3, PowAlgorithm::Default);
        assert_eq!(
            aux.check_proof_of_work(&config),
            Err(ConsensusError::WrongChainId { actual: 4, expected: 3 })
        );
    }

    #[test]
    fn test_missing_marker_lenient_and_strict() {
        let aux = AuxPow::new(child_header(3), Some(payload(7, vec![0x01, 0x02], OutPoint::null())));
        let lenient = ConsensusConfig::new(3, PowAlgorithm::Default);
        assert_eq!(aux.check_proof_of_work(&lenient), Ok(()));

        let strict = lenient.with_required_merged_mining_header();
        assert_eq!(
            aux.check_proof_of_work(&strict),
            Err(ConsensusError::MissingMergeMiningHeader)
        );
    }

    #[test]
    fn test_accept_activation_rules() {
        let aux = AuxPow::new(child_header(3), Some(payload(7, marker_script(), OutPoint::null())));
        let config = ConsensusConfig::new(3, PowAlgorithm::Default);

        assert_eq!(aux.accept(&config), Ok(()));
        assert_eq!(
            aux.accept(&config.clone().without_merged_mining()),
            Err(ConsensusError::MergedMiningDisabled)
        );
        assert_eq!(
            aux.accept(&config.with_merged_mining_start(1_500_000_000)),
            Err(ConsensusError::MergedMiningNotStarted {
                time: 1_400_000_000,
                start: 1_500_000_000
            })
        );
    }

    #[test]
    fn test_accept_ignores_unflagged_header() {
        let mut header = child_header(3);
        header.version = 2;
        let aux = AuxPow::new(header, None);
        let config = ConsensusConfig::new(3, PowAlgorithm::Default).without_merged_mining();
        assert_eq!(aux.accept(&config), Ok(()));
    }

    #[test]
    fn test_accept_verifies_payload_on_unflagged_header() {
        let mut header = child_header(3);
        header.version = version::make_version(3, 2, false);
        let forged = payload(
            3,
            [MERGED_MINING_HEADER, MERGED_MINING_HEADER].concat(),
            OutPoint { hash: [5; 32], index: 0 },
        );
        let aux = AuxPow::new(header, Some(forged));
        let config = ConsensusConfig::new(3, PowAlgorithm::Default);

        assert_eq!(
            aux.accept(&config),
            Err(ConsensusError::ParentSharesChainId { chain_id: 3 })
        );
        assert_eq!(
            aux.accept(&config.without_merged_mining()),
            Err(ConsensusError::MergedMiningDisabled)
        );
    }

    #[test]
    fn test_accept_rejects_flagged_header_without_payload() {
        let aux = AuxPow::new(child_header(3), None);
        let config = ConsensusConfig::new(3, PowAlgorithm::Default);
        assert!(matches!(
            aux.accept(&config),
            Err(ConsensusError::MalformedAuxPow(_))
        ));
    }

    #[test]
    fn test_accessors_without_payload() {
        let aux = AuxPow::new(child_header(3), None);
        assert_eq!(aux.cursor(), 0);
        assert_eq!(aux.message_size(), 0);
        assert_eq!(aux.version(), 3 * CHAIN_START + AUXPOW_FLAG);
        assert_eq!(aux.time().timestamp(), 1_400_000_000);
        assert!(aux.parent_block_hash(&ConsensusConfig::new(3, PowAlgorithm::Default)).is_err());
    }

    #[test]
    fn test_display_omits_missing_payload() {
        let bare = AuxPow::new(child_header(3), None).to_string();
        assert_eq!(bare.lines().count(), 4);
        assert!(bare.contains("version: v196864"));
        assert!(bare.contains("time: [1400000000] 2014-05-13 16:53:20 UTC"));

        let full = AuxPow::new(child_header(3), Some(payload(7, marker_script(), OutPoint::null())))
            .to_string();
        assert!(full.contains("parent block: "));
        assert!(full.contains("parent coinbase: "));
    }
}

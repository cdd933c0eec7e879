//! # AuxPoW-Proof
//!
//! Merged-mining (auxiliary proof-of-work) validation for lightweight clients.
//!
//! A block on an auxiliary chain may prove its work by pointing at a block
//! mined on a parent chain. This crate checks that evidence: the chain ID
//! packed in the block version, the parent's chain ID, the merge-mining
//! marker in the parent coinbase, and the hash identifying the parent block.
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: verification is deterministic and side-effect-free
//! 2. **Explicit Parameters**: network constants are a [`ConsensusConfig`] value passed in, never a global
//! 3. **Exact Version Pinning**: consensus-critical hashing dependencies are pinned to exact versions
//! 4. **Typed Failures**: every rejection is a [`ConsensusError`] variant carrying the offending values
//!
//! ## Usage
//!
//! ```rust
//! use auxpow_proof::*;
//!
//! let config = ConsensusConfig::new(3, PowAlgorithm::Scrypt);
//! let consensus = AuxPowConsensus::new(config);
//!
//! let header = BlockHeader {
//!     version: 3 * 65536 + 256,
//!     prev_block_hash: [0; 32],
//!     merkle_root: [0; 32],
//!     timestamp: 1400000000,
//!     bits: 0x1e0fffff,
//!     nonce: 0,
//! };
//! let parent = BlockHeader {
//!     version: 7 * 65536 + 2,
//!     prev_block_hash: [0; 32],
//!     merkle_root: [0; 32],
//!     timestamp: 1400000000,
//!     bits: 0x1b0404cb,
//!     nonce: 0,
//! };
//! let coinbase = Transaction {
//!     version: 1,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint::null(),
//!         script_sig: vec![0x00, 0xfa, 0xbe, b'm', b'm', 0x01, 0x02],
//!         sequence: 0xffffffff,
//!     }],
//!     outputs: vec![],
//!     lock_time: 0,
//! };
//!
//! let aux = AuxPow::new(header, Some(AuxPowPayload::new(parent, coinbase)));
//! assert!(consensus.check_proof_of_work(&aux).is_ok());
//! ```

pub mod types;
pub mod constants;
pub mod config;
pub mod version;
pub mod pow;
pub mod coinbase;
pub mod serialization;
pub mod payload;
pub mod auxpow;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use config::{ConsensusConfig, PowAlgorithm};
pub use payload::{AuxPowPayload, MerkleBranch};
pub use auxpow::AuxPow;
pub use error::{ConsensusError, DecodeError, Result};

/// Merged-mining validation bound to one network's parameters
///
/// # Examples
///
/// ```
/// use auxpow_proof::{AuxPowConsensus, ConsensusConfig, PowAlgorithm};
///
/// let consensus = AuxPowConsensus::new(ConsensusConfig::new(98, PowAlgorithm::Scrypt));
/// assert_eq!(consensus.config().aux_chain_id, 98);
/// ```
#[derive(Debug, Clone)]
pub struct AuxPowConsensus {
    config: ConsensusConfig,
}

impl AuxPowConsensus {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    /// Build from a JSON parameter document
    ///
    /// # Examples
    ///
    /// ```
    /// use auxpow_proof::{AuxPowConsensus, PowAlgorithm};
    ///
    /// let consensus = AuxPowConsensus::from_json(r#"{
    ///     "aux_chain_id": 98,
    ///     "merged_mining_enabled": true,
    ///     "merged_mining_start_time": 0,
    ///     "pow_algorithm": "sha256d"
    /// }"#).unwrap();
    /// assert_eq!(consensus.config().pow_algorithm, PowAlgorithm::Sha256d);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(ConsensusConfig::from_json(json)?))
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Extract the chain ID from a block version
    ///
    /// # Examples
    ///
    /// ```
    /// use auxpow_proof::{AuxPowConsensus, ConsensusConfig, PowAlgorithm};
    ///
    /// let consensus = AuxPowConsensus::new(ConsensusConfig::new(3, PowAlgorithm::Default));
    /// assert_eq!(consensus.chain_id(3 * 65536 + 256), 3);
    /// ```
    pub fn chain_id(&self, version: u32) -> u32 {
        version::chain_id(version)
    }

    /// Decode a child header at `offset`, followed by its AuxPoW payload when flagged
    pub fn decode_header(&self, bytes: &[u8], offset: usize) -> Result<AuxPow> {
        AuxPow::decode(bytes, offset)
    }

    /// Verify the block's merged-mining evidence
    pub fn check_proof_of_work(&self, aux: &AuxPow) -> Result<()> {
        aux.check_proof_of_work(&self.config)
    }

    /// Merged-mining activation rules, then [`AuxPowConsensus::check_proof_of_work`]
    pub fn accept_header(&self, aux: &AuxPow) -> Result<()> {
        aux.accept(&self.config)
    }

    /// Identity hash of the block's parent under this network's algorithm
    pub fn parent_block_hash(&self, aux: &AuxPow) -> Result<Hash> {
        aux.parent_block_hash(&self.config)
    }
}

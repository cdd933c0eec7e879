//! Per-network merged-mining parameters
//!
//! A [`ConsensusConfig`] is built once per network and passed by reference to
//! every verification call. Nothing in this crate keeps a process-wide copy.

use serde::{Deserialize, Serialize};

use crate::error::{ConsensusError, Result};

/// Hash function a network uses to identify its parent blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowAlgorithm {
    Scrypt,
    Sha256d,
    #[default]
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Our chain's identifier within the merged-mining scheme
    pub aux_chain_id: u32,
    pub merged_mining_enabled: bool,
    /// Seconds since the UNIX epoch from which AuxPoW blocks are accepted
    pub merged_mining_start_time: u64,
    pub pow_algorithm: PowAlgorithm,
    /// Reject parent coinbases that carry no merged-mining header at all
    #[serde(default)]
    pub require_merged_mining_header: bool,
}

impl ConsensusConfig {
    /// Merged mining enabled from the epoch, lenient about a missing coinbase marker
    pub fn new(aux_chain_id: u32, pow_algorithm: PowAlgorithm) -> Self {
        ConsensusConfig {
            aux_chain_id,
            merged_mining_enabled: true,
            merged_mining_start_time: 0,
            pow_algorithm,
            require_merged_mining_header: false,
        }
    }

    pub fn with_merged_mining_start(mut self, start_time: u64) -> Self {
        self.merged_mining_start_time = start_time;
        self
    }

    pub fn without_merged_mining(mut self) -> Self {
        self.merged_mining_enabled = false;
        self
    }

    pub fn with_required_merged_mining_header(mut self) -> Self {
        self.require_merged_mining_header = true;
        self
    }

    /// Load parameters from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConsensusError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConsensusError::Config(e.to_string()))
    }
}

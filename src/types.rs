//! Core block and transaction types consumed by the AuxPoW verifier

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::Result;

/// Hash type: 256-bit hash in internal byte order
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Reference to an output of a previous transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// The outpoint spent by every coinbase input
    pub fn null() -> Self {
        OutPoint {
            hash: [0u8; 32],
            index: COINBASE_PREVOUT_INDEX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash == [0u8; 32] && self.index == COINBASE_PREVOUT_INDEX
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

impl TransactionInput {
    /// A coinbase input has no real previous output: it spends the null outpoint
    pub fn is_coinbase_input(&self) -> bool {
        self.prevout.is_null()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: ByteString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Double SHA-256 of the legacy serialization
    pub fn txid(&self) -> Hash {
        crate::serialization::calculate_tx_id(self)
    }

    /// Check if transaction is coinbase
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase_input()
    }
}

/// Block header shared by the auxiliary chain and its parent chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block version; carries the AuxPoW flag and the chain ID
    pub version: u32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    /// Seconds since the UNIX epoch, as claimed by the miner
    pub timestamp: u32,
    /// Difficulty target in compact form (nBits)
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Whether an AuxPoW payload follows this header on the wire
    pub fn is_auxpow(&self) -> bool {
        crate::version::is_auxpow(self.version)
    }

    pub fn chain_id(&self) -> u32 {
        crate::version::chain_id(self.version)
    }

    /// Block identity: double SHA-256 of the 80-byte serialization
    pub fn block_hash(&self) -> Hash {
        crate::pow::double_sha256(&crate::serialization::serialize_header(self))
    }

    /// scrypt(N=1024, r=1, p=1) of the 80-byte serialization, salted with itself
    pub fn scrypt_hash(&self) -> Result<Hash> {
        crate::pow::scrypt_hash(&crate::serialization::serialize_header(self))
    }
}

/// Render a hash the way block explorers do: reversed byte order, lowercase hex
pub fn hash_to_hex(hash: &Hash) -> String {
    let reversed: Vec<u8> = hash.iter().rev().copied().collect();
    hex::encode(reversed)
}

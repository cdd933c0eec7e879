//! AuxPoW payload: the parent-chain evidence attached to a merge-mined header
//!
//! Wire layout, following the 80-byte child header:
//! 1. parent coinbase transaction (legacy serialization)
//! 2. parent block hash (32 bytes)
//! 3. coinbase merkle branch
//! 4. chain merkle branch
//! 5. parent block header (80 bytes)
//!
//! A merkle branch is a var-int count, that many 32-byte hashes, and a 4-byte
//! side mask. Branches are carried for callers; this crate does not fold them.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::*;
use crate::error::{DecodeError, Result};
use crate::serialization::{deserialize_header, deserialize_transaction, ByteReader};
use crate::types::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleBranch {
    pub hashes: Vec<Hash>,
    pub side_mask: u32,
}

impl MerkleBranch {
    fn decode(reader: &mut ByteReader<'_>) -> std::result::Result<Self, DecodeError> {
        let len = reader.read_length("merkle branch hash", MAX_MERKLE_BRANCH_LENGTH)?;
        let mut hashes = Vec::with_capacity(len);
        for _ in 0..len {
            hashes.push(reader.read_hash()?);
        }
        let side_mask = reader.read_u32_le()?;
        Ok(MerkleBranch { hashes, side_mask })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxPowPayload {
    pub parent_block_header: BlockHeader,
    pub parent_coinbase_tx: Transaction,
    /// Parent block hash as written by the miner; informational only
    pub parent_hash_field: Hash,
    pub coinbase_branch: MerkleBranch,
    pub chain_branch: MerkleBranch,
    cursor: usize,
    length: usize,
}

impl AuxPowPayload {
    /// Payload assembled in memory rather than decoded: cursor and length are 0
    pub fn new(parent_block_header: BlockHeader, parent_coinbase_tx: Transaction) -> Self {
        AuxPowPayload {
            parent_hash_field: parent_block_header.block_hash(),
            parent_block_header,
            parent_coinbase_tx,
            coinbase_branch: MerkleBranch::default(),
            chain_branch: MerkleBranch::default(),
            cursor: 0,
            length: 0,
        }
    }

    pub fn with_branches(mut self, coinbase_branch: MerkleBranch, chain_branch: MerkleBranch) -> Self {
        self.coinbase_branch = coinbase_branch;
        self.chain_branch = chain_branch;
        self
    }

    /// Decode the payload that follows `header` in `bytes`, starting at `cursor`.
    ///
    /// Returns `Ok(None)` without reading when the header lacks the AuxPoW flag.
    pub fn decode_for(header: &BlockHeader, bytes: &[u8], cursor: usize) -> Result<Option<Self>> {
        if !header.is_auxpow() {
            return Ok(None);
        }
        Ok(Some(Self::decode(bytes, cursor)?))
    }

    /// Decode a payload starting at `cursor`
    pub fn decode(bytes: &[u8], cursor: usize) -> Result<Self> {
        let mut reader = ByteReader::new(bytes, cursor)?;

        let parent_coinbase_tx = deserialize_transaction(&mut reader)?;
        trace!(pos = reader.position(), "decoded parent coinbase");
        let parent_hash_field = reader.read_hash()?;
        let coinbase_branch = MerkleBranch::decode(&mut reader)?;
        let chain_branch = MerkleBranch::decode(&mut reader)?;
        trace!(
            coinbase_branch = coinbase_branch.hashes.len(),
            chain_branch = chain_branch.hashes.len(),
            "decoded merkle branches"
        );
        let parent_block_header = deserialize_header(&mut reader)?;

        let end = reader.position();
        trace!(start = cursor, end, "decoded auxpow payload");

        Ok(AuxPowPayload {
            parent_block_header,
            parent_coinbase_tx,
            parent_hash_field,
            coinbase_branch,
            chain_branch,
            cursor: end,
            length: end - cursor,
        })
    }

    /// Offset just past this payload in the message it was decoded from
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bytes this payload consumed
    pub fn length(&self) -> usize {
        self.length
    }

    /// First input of the parent coinbase, the one scanned for the marker
    pub fn coinbase_input(&self) -> Option<&TransactionInput> {
        self.parent_coinbase_tx.inputs.first()
    }

    pub fn is_structurally_valid(&self) -> bool {
        self.coinbase_input().is_some()
            && self.coinbase_branch.hashes.len() <= MAX_MERKLE_BRANCH_LENGTH
            && self.chain_branch.hashes.len() <= MAX_MERKLE_BRANCH_LENGTH
    }
}

impl fmt::Display for AuxPowPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = &self.parent_block_header;
        writeln!(f, "   parent block: {}", hash_to_hex(&parent.block_hash()))?;
        writeln!(f, "      version: v{}", parent.version)?;
        writeln!(f, "      previous block: {}", hash_to_hex(&parent.prev_block_hash))?;
        writeln!(f, "      merkle root: {}", hash_to_hex(&parent.merkle_root))?;
        writeln!(f, "      time: [{}]", parent.timestamp)?;
        writeln!(f, "      difficulty target (nBits): {}", parent.bits)?;
        writeln!(f, "      nonce: {}", parent.nonce)?;
        writeln!(
            f,
            "   parent coinbase: {} ({} in, {} out)",
            hash_to_hex(&self.parent_coinbase_tx.txid()),
            self.parent_coinbase_tx.inputs.len(),
            self.parent_coinbase_tx.outputs.len()
        )?;
        writeln!(
            f,
            "   coinbase branch: {} hashes, side mask {:#x}",
            self.coinbase_branch.hashes.len(),
            self.coinbase_branch.side_mask
        )?;
        writeln!(
            f,
            "   chain branch: {} hashes, side mask {:#x}",
            self.chain_branch.hashes.len(),
            self.chain_branch.side_mask
        )
    }
}

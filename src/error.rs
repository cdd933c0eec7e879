//! Error types for merged-mining validation

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Merged-mine block does not have the correct chain ID, current ID: {actual} expected: {expected}")]
    WrongChainId { actual: u32, expected: u32 },

    #[error("Merged-mine block aux POW parent has our chain ID: {chain_id}")]
    ParentSharesChainId { chain_id: u32 },

    #[error("Multiple merged mining headers in coinbase: first at offset {first}, second at offset {second}")]
    DuplicateMergeMiningHeader { first: usize, second: usize },

    #[error("Parent coinbase transaction not an actual coinbase transaction (merged mining header at offset {offset})")]
    ParentCoinbaseNotCoinbase { offset: usize },

    #[error("Parent coinbase script does not contain a merged mining header")]
    MissingMergeMiningHeader,

    #[error("Malformed AuxPoW: {0}")]
    MalformedAuxPow(String),

    #[error("Merged mining is not enabled on this network")]
    MergedMiningDisabled,

    #[error("Merged-mine block at time {time} precedes merged mining start time {start}")]
    MergedMiningNotStarted { time: u64, start: u64 },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Structural failures while reading wire bytes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("non-canonical var-int at offset {offset}")]
    NonCanonicalVarInt { offset: usize },

    #[error("{what} count {count} exceeds maximum {max}")]
    OversizedCollection {
        what: &'static str,
        count: u64,
        max: usize,
    },

    #[error("cursor {cursor} is beyond message length {len}")]
    CursorOutOfRange { cursor: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

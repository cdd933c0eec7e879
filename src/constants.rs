//! Merged-mining protocol constants

/// Version bit set when a block header is followed by an AuxPoW payload
pub const AUXPOW_FLAG: u32 = 1 << 8;

/// Chain ID multiplier: the chain ID occupies the version bits above bit 16
pub const CHAIN_START: u32 = 1 << 16;

/// Marker locating the merged-mining commitment inside a parent coinbase script
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, b'm', b'm'];

/// Serialized length of (version, prev_block_hash, merkle_root, time, bits, nonce)
pub const BLOCK_HEADER_SIZE: usize = 4 + 32 + 32 + 4 + 4 + 4;

/// Output index of the null outpoint spent by a coinbase input
pub const COINBASE_PREVOUT_INDEX: u32 = 0xffffffff;

/// scrypt cost parameter as log2(N): N = 1024
pub const SCRYPT_LOG_N: u8 = 10;

/// scrypt block size parameter
pub const SCRYPT_R: u32 = 1;

/// scrypt parallelization parameter
pub const SCRYPT_P: u32 = 1;

/// scrypt output length in bytes
pub const SCRYPT_OUTPUT_LEN: usize = 32;

/// Maximum number of inputs accepted when decoding a transaction
pub const MAX_INPUTS: usize = 1000;

/// Maximum number of outputs accepted when decoding a transaction
pub const MAX_OUTPUTS: usize = 1000;

/// Maximum script length
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum number of hashes in an AuxPoW merkle branch
pub const MAX_MERKLE_BRANCH_LENGTH: usize = 30;

/// Sequence number for final transaction
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

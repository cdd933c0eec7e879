//! Proof-of-work hash functions and parent-block hash selection

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::config::PowAlgorithm;
use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::types::*;

/// DoubleSha256: 𝕊 → ℍ
pub fn double_sha256(input: &[u8]) -> Hash {
    let hash1 = Sha256::digest(input);
    let hash2 = Sha256::digest(hash1);

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hash2);
    hash
}

/// ScryptHash: 𝕊 → ℍ
///
/// scrypt with N=1024, r=1, p=1 and a 32-byte output, using the input as
/// its own salt (the Litecoin/Dogecoin proof-of-work function).
pub fn scrypt_hash(input: &[u8]) -> Result<Hash> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_OUTPUT_LEN)
        .map_err(|e| ConsensusError::Hashing(format!("invalid scrypt parameters: {}", e)))?;

    let mut output = [0u8; 32];
    scrypt::scrypt(input, input, &params, &mut output)
        .map_err(|e| ConsensusError::Hashing(format!("scrypt output: {}", e)))?;
    Ok(output)
}

/// ParentBlockHash: ℋ × 𝒜 → ℍ
///
/// Identity hash of a parent block header under the network's configured
/// algorithm:
/// 1. scrypt → scrypt hash of the header
/// 2. sha256d → double SHA-256 of the header
/// 3. default → double SHA-256 of the header
pub fn parent_block_hash(parent: &BlockHeader, algorithm: PowAlgorithm) -> Result<Hash> {
    trace!(?algorithm, "selecting parent block hash");
    match algorithm {
        PowAlgorithm::Scrypt => parent.scrypt_hash(),
        PowAlgorithm::Sha256d => Ok(parent.block_hash()),
        PowAlgorithm::Default => Ok(parent.block_hash()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn litecoin_genesis_header() -> BlockHeader {
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(
            &hex::decode("97ddfbbae6be97fd6cdf3e7ca13232a3afff2353e29badfab7f73011edd4ced9")
                .unwrap(),
        );
        merkle_root.reverse();

        BlockHeader {
            version: 1,
            prev_block_hash: [0; 32],
            merkle_root,
            timestamp: 1317972665,
            bits: 0x1e0ffff0,
            nonce: 2084524493,
        }
    }

    #[test]
    fn test_double_sha256_empty() {
        // sha256d("") = 5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456
        assert_eq!(
            hex::encode(double_sha256(&[])),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_scrypt_litecoin_genesis() {
        let hash = litecoin_genesis_header().scrypt_hash().unwrap();
        assert_eq!(
            hash_to_hex(&hash),
            "0000050c34a64b415b6b15b37f2216634b5b1669cb9a2e38d76f7213b0671e00"
        );
    }

    #[test]
    fn test_parent_block_hash_dispatch() {
        let header = litecoin_genesis_header();
        let scrypt = parent_block_hash(&header, PowAlgorithm::Scrypt).unwrap();
        let sha = parent_block_hash(&header, PowAlgorithm::Sha256d).unwrap();
        let default = parent_block_hash(&header, PowAlgorithm::Default).unwrap();

        assert_eq!(
            hash_to_hex(&sha),
            "12a765e31ffd4059bada1e25190f6e98c99d9714d334efa41a195a7e7e04bfe2"
        );
        assert_eq!(sha, default);
        assert_ne!(scrypt, sha);
    }
}

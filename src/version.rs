//! Chain-ID codec over block version numbers
//!
//! A merge-mined block version packs three things:
//! - bits 0-7: base protocol version
//! - bit 8: AuxPoW flag ([`AUXPOW_FLAG`])
//! - bits 16+: chain ID (`version / CHAIN_START`)

use crate::constants::*;

/// ChainId: version / 2^16, integer division
pub fn chain_id(version: u32) -> u32 {
    version / CHAIN_START
}

/// Whether the AuxPoW flag is set
pub fn is_auxpow(version: u32) -> bool {
    version & AUXPOW_FLAG != 0
}

/// Protocol version with the AuxPoW flag and chain ID stripped
pub fn base_version(version: u32) -> u32 {
    version % AUXPOW_FLAG
}

/// Build a version value for `chain_id` on top of `base`, optionally flagged as AuxPoW
pub fn make_version(chain_id: u32, base: u32, auxpow: bool) -> u32 {
    let mut version = chain_id.wrapping_mul(CHAIN_START) | (base % AUXPOW_FLAG);
    if auxpow {
        version |= AUXPOW_FLAG;
    }
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_extraction() {
        assert_eq!(chain_id(0), 0);
        assert_eq!(chain_id(CHAIN_START - 1), 0);
        assert_eq!(chain_id(CHAIN_START), 1);
        assert_eq!(chain_id(3 * 65536 + 256), 3);
        assert_eq!(chain_id(u32::MAX), 0xffff);
    }

    #[test]
    fn test_auxpow_flag() {
        assert!(is_auxpow(3 * 65536 + 256));
        assert!(!is_auxpow(3 * 65536 + 2));
        assert!(!is_auxpow(1));
    }

    #[test]
    fn test_make_version() {
        // Dogecoin-style: chain 0x62, base 2, AuxPoW
        let version = make_version(0x62, 2, true);
        assert_eq!(version, 0x0062_0102);
        assert_eq!(chain_id(version), 0x62);
        assert_eq!(base_version(version), 2);
        assert!(is_auxpow(version));
    }
}

//! Merged-mining marker scan over the parent coinbase script
//!
//! The parent chain's coinbase carries the auxiliary chain's commitment right
//! after the 4-byte [`MERGED_MINING_HEADER`]. The marker may appear at most
//! once, and the input carrying it must be a genuine coinbase input.

use tracing::{debug, warn};

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::types::*;

/// Offset of the first merged-mining marker in `script`
pub fn find_merged_mining_header(script: &[u8]) -> Option<usize> {
    find_marker(script, 0)
}

fn find_marker(script: &[u8], from: usize) -> Option<usize> {
    script
        .get(from..)?
        .windows(MERGED_MINING_HEADER.len())
        .position(|window| window == MERGED_MINING_HEADER)
        .map(|i| i + from)
}

/// ScanCoinbase: ℐ → {ok(offset?), duplicate, not-coinbase}
///
/// For parent coinbase input i with script s:
/// 1. Let h = first offset of the marker in s; if none, return ok(none)
/// 2. If |s| - h ≥ h and the marker occurs again in s[h..] past its start: duplicate
/// 3. If i does not spend the null outpoint: not-coinbase
/// 4. Return ok(h)
pub fn check_coinbase_script(input: &TransactionInput) -> Result<Option<usize>> {
    let script = &input.script_sig;

    let header_index = match find_merged_mining_header(script) {
        Some(h) => h,
        None => {
            debug!(script_len = script.len(), "no merged mining header in parent coinbase");
            return Ok(None);
        }
    };

    // Only a suffix at least as long as the consumed prefix is re-scanned
    if script.len() - header_index >= header_index {
        if let Some(second) = find_marker(script, header_index + 1) {
            warn!(first = header_index, second, "multiple merged mining headers in coinbase");
            return Err(ConsensusError::DuplicateMergeMiningHeader {
                first: header_index,
                second,
            });
        }
    }

    if !input.is_coinbase_input() {
        warn!(offset = header_index, "parent coinbase input spends a real outpoint");
        return Err(ConsensusError::ParentCoinbaseNotCoinbase {
            offset: header_index,
        });
    }

    Ok(Some(header_index))
}

//! Minimal wire codec for the structures an AuxPoW payload embeds
//!
//! Covers little-endian integers, CompactSize var-ints, the 80-byte block
//! header and legacy (non-witness) transactions. Nothing else of the wire
//! protocol lives here.

use bitcoin_hashes::{sha256d, Hash as BitcoinHash};

use crate::constants::*;
use crate::error::DecodeError;
use crate::types::*;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Forward-only cursor over a borrowed message
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading `bytes` at `cursor`
    pub fn new(bytes: &'a [u8], cursor: usize) -> DecodeResult<Self> {
        if cursor > bytes.len() {
            return Err(DecodeError::CursorOutOfRange {
                cursor,
                len: bytes.len(),
            });
        }
        Ok(ByteReader { bytes, pos: cursor })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_bytes(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEnd {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> DecodeResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> DecodeResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> DecodeResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_hash(&mut self) -> DecodeResult<Hash> {
        self.read_array()
    }

    /// CompactSize integer; non-minimal encodings are rejected
    pub fn read_var_int(&mut self) -> DecodeResult<u64> {
        let offset = self.pos;
        let value = match self.read_u8()? {
            0xff => {
                let v = self.read_u64_le()?;
                if v <= 0xffff_ffff {
                    return Err(DecodeError::NonCanonicalVarInt { offset });
                }
                v
            }
            0xfe => {
                let v = u64::from(self.read_u32_le()?);
                if v <= 0xffff {
                    return Err(DecodeError::NonCanonicalVarInt { offset });
                }
                v
            }
            0xfd => {
                let v = u64::from(self.read_u16_le()?);
                if v < 0xfd {
                    return Err(DecodeError::NonCanonicalVarInt { offset });
                }
                v
            }
            n => u64::from(n),
        };
        Ok(value)
    }

    /// Var-int length prefix checked against `max`
    pub fn read_length(&mut self, what: &'static str, max: usize) -> DecodeResult<usize> {
        let count = self.read_var_int()?;
        if count > max as u64 {
            return Err(DecodeError::OversizedCollection { what, count, max });
        }
        Ok(count as usize)
    }

    pub fn read_var_bytes(&mut self, what: &'static str, max: usize) -> DecodeResult<ByteString> {
        let len = self.read_length(what, max)?;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

pub fn write_var_int(buf: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => buf.push(value as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
}

fn write_var_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_var_int(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Serialize block header to its 80-byte wire form
pub fn serialize_header(header: &BlockHeader) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(BLOCK_HEADER_SIZE);

    bytes.extend_from_slice(&header.version.to_le_bytes());
    bytes.extend_from_slice(&header.prev_block_hash);
    bytes.extend_from_slice(&header.merkle_root);
    bytes.extend_from_slice(&header.timestamp.to_le_bytes());
    bytes.extend_from_slice(&header.bits.to_le_bytes());
    bytes.extend_from_slice(&header.nonce.to_le_bytes());

    bytes
}

pub fn deserialize_header(reader: &mut ByteReader<'_>) -> DecodeResult<BlockHeader> {
    Ok(BlockHeader {
        version: reader.read_u32_le()?,
        prev_block_hash: reader.read_hash()?,
        merkle_root: reader.read_hash()?,
        timestamp: reader.read_u32_le()?,
        bits: reader.read_u32_le()?,
        nonce: reader.read_u32_le()?,
    })
}

/// Legacy transaction serialization (no witness data)
pub fn serialize_transaction(tx: &Transaction) -> Vec<u8> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(&tx.version.to_le_bytes());

    write_var_int(&mut bytes, tx.inputs.len() as u64);
    for input in &tx.inputs {
        bytes.extend_from_slice(&input.prevout.hash);
        bytes.extend_from_slice(&input.prevout.index.to_le_bytes());
        write_var_bytes(&mut bytes, &input.script_sig);
        bytes.extend_from_slice(&input.sequence.to_le_bytes());
    }

    write_var_int(&mut bytes, tx.outputs.len() as u64);
    for output in &tx.outputs {
        bytes.extend_from_slice(&output.value.to_le_bytes());
        write_var_bytes(&mut bytes, &output.script_pubkey);
    }

    bytes.extend_from_slice(&tx.lock_time.to_le_bytes());
    bytes
}

pub fn deserialize_transaction(reader: &mut ByteReader<'_>) -> DecodeResult<Transaction> {
    let version = reader.read_i32_le()?;

    let input_count = reader.read_length("input", MAX_INPUTS)?;
    let mut inputs = Vec::with_capacity(input_count);
    for _ in 0..input_count {
        let hash = reader.read_hash()?;
        let index = reader.read_u32_le()?;
        let script_sig = reader.read_var_bytes("script_sig byte", MAX_SCRIPT_SIZE)?;
        let sequence = reader.read_u32_le()?;
        inputs.push(TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
        });
    }

    let output_count = reader.read_length("output", MAX_OUTPUTS)?;
    let mut outputs = Vec::with_capacity(output_count);
    for _ in 0..output_count {
        let value = reader.read_i64_le()?;
        let script_pubkey = reader.read_var_bytes("script_pubkey byte", MAX_SCRIPT_SIZE)?;
        outputs.push(TransactionOutput {
            value,
            script_pubkey,
        });
    }

    let lock_time = reader.read_u32_le()?;

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

/// Calculate transaction ID: SHA256(SHA256(serialized_tx))
pub fn calculate_tx_id(tx: &Transaction) -> Hash {
    sha256d::Hash::hash(&serialize_transaction(tx)).into_inner()
}

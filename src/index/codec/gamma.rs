//! Elias-gamma codec
//!
//! Record: `[termId:4B][bitLength:4B][ceil(bitLength / 8) bytes]`.
//!
//! Each gap N > 0 is written as `floor(log2 N)` one-bits, a zero-bit, then
//! the `floor(log2 N)` bits of N below its leading one. Gamma has no code for
//! zero, so the first gap (the smallest doc id, which may be 0) is stored as
//! `doc_ids[0] + 1`. Later gaps are at least 1 and are stored as-is.

use super::{CodecKind, PostingCodec, posting_gaps, write_record};
use crate::error::{IndexError, Result};
use crate::index::types::PostingList;
use crate::utils::{BitReader, BitWriter, gap_decode, read_header, read_payload};
use std::io::{Read, Write};

/// Largest unary prefix a valid record can hold: `u32::MAX + 1` has 33 bits.
const MAX_PREFIX_BITS: u32 = 32;

pub struct GammaCodec;

/// Append the gamma code of `value` (must be > 0)
pub fn encode_gamma(value: u64, bits: &mut BitWriter) {
    debug_assert!(value > 0, "gamma code is undefined for 0");
    let k = 63 - value.leading_zeros();
    bits.push_run(true, k);
    bits.push_bit(false);
    bits.push_bits(value, k);
}

/// Read one gamma code. Fails if the code runs past the reader's bit limit.
pub fn decode_gamma(bits: &mut BitReader<'_>) -> Result<u64> {
    let start = bits.position();
    let mut k = 0u32;
    loop {
        match bits.read_bit() {
            Some(true) => {
                k += 1;
                if k > MAX_PREFIX_BITS {
                    return Err(IndexError::decode(format!(
                        "gamma prefix at bit {} longer than {} bits",
                        start, MAX_PREFIX_BITS
                    )));
                }
            }
            Some(false) => break,
            None => {
                return Err(IndexError::decode(format!(
                    "gamma prefix at bit {} runs past the bit length",
                    start
                )));
            }
        }
    }

    let low = bits.read_bits(k).ok_or_else(|| {
        IndexError::decode(format!("gamma body at bit {} runs past the bit length", start))
    })?;
    Ok((1u64 << k) | low)
}

/// Gamma-code a gap list; returns (bytes, bit_len)
pub fn encode_gaps(gaps: &[u32]) -> (Vec<u8>, u64) {
    let mut bits = BitWriter::new();
    for (i, &gap) in gaps.iter().enumerate() {
        let value = if i == 0 { gap as u64 + 1 } else { gap as u64 };
        encode_gamma(value, &mut bits);
    }
    bits.into_parts()
}

/// Decode a gamma bitstream of exactly `bit_len` bits into gaps
pub fn decode_gaps(bytes: &[u8], bit_len: u64) -> Result<Vec<u32>> {
    let mut bits = BitReader::new(bytes, bit_len);
    let mut gaps = Vec::new();

    while !bits.is_exhausted() {
        let value = decode_gamma(&mut bits)?;
        let gap = if gaps.is_empty() { value - 1 } else { value };
        let gap = u32::try_from(gap)
            .map_err(|_| IndexError::decode(format!("gamma value {} overflows u32", gap)))?;
        gaps.push(gap);
    }

    Ok(gaps)
}

impl PostingCodec for GammaCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Gamma
    }

    fn write_posting(&self, out: &mut dyn Write, posting: &PostingList) -> Result<u64> {
        let gaps = posting_gaps(posting)?;
        let (payload, bit_len) = encode_gaps(&gaps);
        let total_bits = u32::try_from(bit_len).map_err(|_| IndexError::InvalidPosting {
            term_id: posting.term_id,
            reason: format!("bit length {} does not fit the header", bit_len),
        })?;
        write_record(out, posting.term_id, total_bits, &payload)
    }

    fn read_posting(&self, input: &mut dyn Read) -> Result<Option<PostingList>> {
        let Some((term_id, total_bits)) = read_header(input)? else {
            return Ok(None);
        };

        let byte_len = (total_bits as usize).div_ceil(8);
        let payload = read_payload(input, byte_len, term_id)?;
        let gaps = decode_gaps(&payload, total_bits as u64)
            .map_err(|e| IndexError::decode(format!("term {}: {}", term_id, e)))?;
        let doc_ids = gap_decode(&gaps)?;

        Ok(Some(PostingList::new(term_id, doc_ids)))
    }
}

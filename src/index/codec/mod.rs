//! Posting list codecs
//!
//! Every record starts with the same two big-endian integers,
//! `[termId:4B][n:4B]`, followed by a codec-specific payload:
//!
//! - [`BasicCodec`]: `n` = doc frequency, payload = `n` fixed-width doc ids
//! - [`VariableByteCodec`]: `n` = payload byte length, payload = vbyte gaps
//! - [`GammaCodec`]: `n` = payload bit length, payload = Elias-gamma gaps
//!
//! A run is a plain concatenation of records. Reading at the end of the stream
//! returns `Ok(None)`.

pub mod basic;
pub mod gamma;
pub mod vbyte;

pub use basic::BasicCodec;
pub use gamma::GammaCodec;
pub use vbyte::VariableByteCodec;

use crate::error::{IndexError, Result};
use crate::index::types::PostingList;
use crate::utils::{HEADER_BYTES, gap_encode, write_u32_be};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// Serializes posting lists to and from a byte stream
pub trait PostingCodec: Send + Sync {
    fn kind(&self) -> CodecKind;

    /// Append one record, returning the number of bytes written
    fn write_posting(&self, out: &mut dyn Write, posting: &PostingList) -> Result<u64>;

    /// Read the next record, or `None` at a clean end of stream
    fn read_posting(&self, input: &mut dyn Read) -> Result<Option<PostingList>>;
}

/// The closed set of available codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecKind {
    Basic,
    VariableByte,
    Gamma,
}

static BASIC: BasicCodec = BasicCodec;
static VARIABLE_BYTE: VariableByteCodec = VariableByteCodec;
static GAMMA: GammaCodec = GammaCodec;

impl CodecKind {
    pub const ALL: [CodecKind; 3] = [CodecKind::Basic, CodecKind::VariableByte, CodecKind::Gamma];

    /// The strategy object for this codec
    pub fn codec(self) -> &'static dyn PostingCodec {
        match self {
            CodecKind::Basic => &BASIC,
            CodecKind::VariableByte => &VARIABLE_BYTE,
            CodecKind::Gamma => &GAMMA,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Basic => "Basic",
            CodecKind::VariableByte => "VariableByte",
            CodecKind::Gamma => "Gamma",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(CodecKind::Basic),
            "variablebyte" | "variable-byte" | "vb" => Ok(CodecKind::VariableByte),
            "gamma" => Ok(CodecKind::Gamma),
            _ => Err(IndexError::config(format!(
                "unknown codec '{}' (expected Basic, VariableByte or Gamma)",
                s
            ))),
        }
    }
}

/// Gap-encode a posting's doc ids, rejecting unsorted input
fn posting_gaps(posting: &PostingList) -> Result<Vec<u32>> {
    gap_encode(&posting.doc_ids).ok_or_else(|| IndexError::InvalidPosting {
        term_id: posting.term_id,
        reason: "doc ids are not strictly increasing".to_string(),
    })
}

/// Write header plus payload in one call so a record is never half-written
/// into the buffer.
fn write_record(out: &mut dyn Write, term_id: u32, length: u32, payload: &[u8]) -> Result<u64> {
    let mut record = Vec::with_capacity(HEADER_BYTES + payload.len());
    write_u32_be(&mut record, term_id)?;
    write_u32_be(&mut record, length)?;
    record.extend_from_slice(payload);
    out.write_all(&record)?;
    Ok(record.len() as u64)
}

fn length_field(len: usize, term_id: u32) -> Result<u32> {
    u32::try_from(len).map_err(|_| IndexError::InvalidPosting {
        term_id,
        reason: format!("record length {} does not fit the header", len),
    })
}

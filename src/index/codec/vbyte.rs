use super::{CodecKind, PostingCodec, length_field, posting_gaps, write_record};
use crate::error::{IndexError, Result};
use crate::index::types::PostingList;
use crate::utils::{decode_vbyte, encode_vbyte, gap_decode, read_header, read_payload};
use std::io::{Read, Write};

/// Variable-byte codec: `[termId][byteLength][vbyte gaps]`
pub struct VariableByteCodec;

/// Encode gaps into a variable-byte stream
pub fn encode_gaps(gaps: &[u32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(gaps.len() * 2);
    for &gap in gaps {
        encode_vbyte(gap, &mut buf);
    }
    buf
}

/// Decode a whole variable-byte stream into gaps
pub fn decode_gaps(buf: &[u8]) -> Result<Vec<u32>> {
    let mut gaps = Vec::new();
    let mut pos = 0;

    while pos < buf.len() {
        let (gap, consumed) = decode_vbyte(&buf[pos..]).ok_or_else(|| {
            IndexError::decode(format!(
                "variable-byte integer at byte {} has no stop byte or overflows",
                pos
            ))
        })?;
        gaps.push(gap);
        pos += consumed;
    }

    Ok(gaps)
}

impl PostingCodec for VariableByteCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::VariableByte
    }

    fn write_posting(&self, out: &mut dyn Write, posting: &PostingList) -> Result<u64> {
        let gaps = posting_gaps(posting)?;
        let payload = encode_gaps(&gaps);
        let total_bytes = length_field(payload.len(), posting.term_id)?;
        write_record(out, posting.term_id, total_bytes, &payload)
    }

    fn read_posting(&self, input: &mut dyn Read) -> Result<Option<PostingList>> {
        let Some((term_id, total_bytes)) = read_header(input)? else {
            return Ok(None);
        };

        let payload = read_payload(input, total_bytes as usize, term_id)?;
        let gaps = decode_gaps(&payload)
            .map_err(|e| IndexError::decode(format!("term {}: {}", term_id, e)))?;
        let doc_ids = gap_decode(&gaps)?;

        Ok(Some(PostingList::new(term_id, doc_ids)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_known_gap_bytes() {
        assert_eq!(encode_gaps(&[5, 130]), vec![0x85, 0x01, 0x82]);
        assert_eq!(decode_gaps(&[0x85, 0x01, 0x82]).unwrap(), vec![5, 130]);
    }

    #[test]
    fn test_record_layout() {
        let mut buf = Vec::new();
        let n = VariableByteCodec
            .write_posting(&mut buf, &PostingList::new(9, vec![5, 135]))
            .unwrap();
        assert_eq!(n, 11);
        assert_eq!(buf, vec![0, 0, 0, 9, 0, 0, 0, 3, 0x85, 0x01, 0x82]);

        let decoded = VariableByteCodec.read_posting(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded, Some(PostingList::new(9, vec![5, 135])));
    }

    #[test]
    fn test_stream_without_stop_byte() {
        // length says 2 bytes, neither has the high bit set
        let bytes = vec![0, 0, 0, 1, 0, 0, 0, 2, 0x01, 0x02];
        let err = VariableByteCodec.read_posting(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_zero_gap_rejected() {
        let bytes = vec![0, 0, 0, 1, 0, 0, 0, 2, 0x83, 0x80];
        let err = VariableByteCodec.read_posting(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_first_doc_zero() {
        let mut buf = Vec::new();
        VariableByteCodec
            .write_posting(&mut buf, &PostingList::new(0, vec![0, 1]))
            .unwrap();
        assert_eq!(&buf[8..], &[0x80, 0x81]);
    }
}

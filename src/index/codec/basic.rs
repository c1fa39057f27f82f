use super::{CodecKind, PostingCodec, length_field, write_record};
use crate::error::{IndexError, Result};
use crate::index::types::PostingList;
use crate::utils::{INT_BYTES, read_header, read_payload};
use std::io::{Read, Write};

/// Fixed-width codec: `[termId][docFreq][docId]*`, absolute ids, big-endian
pub struct BasicCodec;

impl PostingCodec for BasicCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Basic
    }

    fn write_posting(&self, out: &mut dyn Write, posting: &PostingList) -> Result<u64> {
        if !posting.is_sorted() {
            return Err(IndexError::InvalidPosting {
                term_id: posting.term_id,
                reason: "doc ids are not strictly increasing".to_string(),
            });
        }

        let doc_freq = length_field(posting.doc_ids.len(), posting.term_id)?;
        let payload: Vec<u8> = posting
            .doc_ids
            .iter()
            .flat_map(|id| id.to_be_bytes())
            .collect();

        write_record(out, posting.term_id, doc_freq, &payload)
    }

    fn read_posting(&self, input: &mut dyn Read) -> Result<Option<PostingList>> {
        let Some((term_id, doc_freq)) = read_header(input)? else {
            return Ok(None);
        };

        let len = (doc_freq as usize)
            .checked_mul(INT_BYTES)
            .ok_or_else(|| IndexError::decode(format!("doc frequency {} too large", doc_freq)))?;
        let payload = read_payload(input, len, term_id)?;

        let doc_ids: Vec<u32> = payload
            .chunks_exact(INT_BYTES)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let posting = PostingList::new(term_id, doc_ids);
        if !posting.is_sorted() {
            return Err(IndexError::decode(format!(
                "doc ids of term {} are not strictly increasing",
                term_id
            )));
        }

        Ok(Some(posting))
    }
}

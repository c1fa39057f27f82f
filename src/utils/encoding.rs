use crate::error::{IndexError, Result};
use std::io::{self, Read, Write};

/// Size of one fixed-width integer on disk
pub const INT_BYTES: usize = 4;

/// Size of the `[termId][length]` header every record starts with
pub const HEADER_BYTES: usize = 2 * INT_BYTES;

/// Write a u32 in big-endian format
pub fn write_u32_be<W: Write + ?Sized>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_be_bytes())
}

/// Read a u32 in big-endian format
pub fn read_u32_be<R: Read + ?Sized>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Read the two-integer record header.
///
/// Returns `None` when the stream is exhausted exactly at a record boundary.
/// A stream that ends part way through the header is a decode error.
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<Option<(u32, u32)>> {
    let mut buf = [0u8; HEADER_BYTES];
    let mut filled = 0;

    while filled < HEADER_BYTES {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        HEADER_BYTES => {
            let mut fields = &buf[..];
            let first = read_u32_be(&mut fields)?;
            let second = read_u32_be(&mut fields)?;
            Ok(Some((first, second)))
        }
        n => Err(IndexError::decode(format!(
            "truncated record header: {} of {} bytes",
            n, HEADER_BYTES
        ))),
    }
}

/// Read exactly `len` payload bytes belonging to the record of `term_id`.
pub fn read_payload<R: Read + ?Sized>(reader: &mut R, len: usize, term_id: u32) -> Result<Vec<u8>> {
    // Grow as bytes arrive; a corrupt length must not trigger a huge allocation
    let mut payload = Vec::with_capacity(len.min(64 * 1024));
    (&mut *reader).take(len as u64).read_to_end(&mut payload)?;

    if payload.len() < len {
        return Err(IndexError::decode(format!(
            "truncated payload for term {}: expected {} bytes, found {}",
            term_id,
            len,
            payload.len()
        )));
    }
    Ok(payload)
}

/// Gap-encode a strictly increasing list of ids.
///
/// The first gap is the first id itself.
pub fn gap_encode(ids: &[u32]) -> Option<Vec<u32>> {
    let mut gaps = Vec::with_capacity(ids.len());
    let mut prev: Option<u32> = None;
    for &id in ids {
        let gap = match prev {
            None => id,
            Some(p) if id > p => id - p,
            Some(_) => return None,
        };
        gaps.push(gap);
        prev = Some(id);
    }
    Some(gaps)
}

/// Invert [`gap_encode`] by prefix sum.
pub fn gap_decode(gaps: &[u32]) -> Result<Vec<u32>> {
    let mut ids = Vec::with_capacity(gaps.len());
    let mut acc = 0u32;
    for (i, &gap) in gaps.iter().enumerate() {
        if i > 0 && gap == 0 {
            return Err(IndexError::decode(format!("zero gap at position {}", i)));
        }
        acc = acc
            .checked_add(gap)
            .ok_or_else(|| IndexError::decode("doc id overflows u32"))?;
        ids.push(acc);
    }
    Ok(ids)
}

/// Encode a u32 as variable bytes: 7-bit groups, most significant first,
/// high bit set on the final byte only.
pub fn encode_vbyte(value: u32, buf: &mut Vec<u8>) -> usize {
    let mut groups = [0u8; 5];
    let mut count = 0;
    let mut rest = value;
    loop {
        groups[count] = (rest & 0x7F) as u8;
        count += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }

    for i in (1..count).rev() {
        buf.push(groups[i]);
    }
    buf.push(groups[0] | 0x80);
    count
}

/// Decode one variable-byte integer from the front of a slice.
/// Returns (value, bytes_consumed), or `None` if the slice ends before the
/// stop byte or the value does not fit in a u32.
pub fn decode_vbyte(buf: &[u8]) -> Option<(u32, usize)> {
    let mut result: u64 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        result = (result << 7) | (byte & 0x7F) as u64;
        if result > u32::MAX as u64 {
            return None; // Overflow
        }

        if byte & 0x80 != 0 {
            return Some((result as u32, i + 1));
        }
    }

    None // Incomplete
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn test_vbyte_known_bytes() {
        let mut buf = Vec::new();
        encode_vbyte(5, &mut buf);
        encode_vbyte(130, &mut buf);
        assert_eq!(buf, vec![0x85, 0x01, 0x82]);

        let (a, used) = decode_vbyte(&buf).unwrap();
        assert_eq!((a, used), (5, 1));
        let (b, used) = decode_vbyte(&buf[1..]).unwrap();
        assert_eq!((b, used), (130, 2));
    }

    #[test]
    fn test_vbyte_roundtrip() {
        let values = [0, 1, 127, 128, 16383, 16384, u32::MAX];
        for value in values {
            let mut buf = Vec::new();
            let written = encode_vbyte(value, &mut buf);
            assert_eq!(written, buf.len());
            let (decoded, used) = decode_vbyte(&buf).unwrap();
            assert_eq!(value, decoded);
            assert_eq!(used, written);
        }
    }

    #[test]
    fn test_vbyte_missing_stop_byte() {
        assert_eq!(decode_vbyte(&[0x01, 0x02]), None);
        assert_eq!(decode_vbyte(&[]), None);
    }

    #[test]
    fn test_vbyte_overflow() {
        assert_eq!(decode_vbyte(&[0x7F, 0x7F, 0x7F, 0x7F, 0x7F, 0xFF]), None);
    }

    #[test]
    fn test_gap_encoding() {
        let values = vec![1, 5, 10, 15, 100, 1000];
        let gaps = gap_encode(&values).unwrap();
        assert_eq!(gaps, vec![1, 4, 5, 5, 85, 900]);
        assert_eq!(gap_decode(&gaps).unwrap(), values);
    }

    #[test]
    fn test_gap_encode_rejects_unsorted() {
        assert!(gap_encode(&[3, 3]).is_none());
        assert!(gap_encode(&[4, 2]).is_none());
        assert_eq!(gap_encode(&[]).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_gap_decode_rejects_duplicates_and_overflow() {
        assert!(gap_decode(&[7, 0]).unwrap_err().is_decode());
        assert!(gap_decode(&[u32::MAX, 1]).unwrap_err().is_decode());
        assert_eq!(gap_decode(&[0, 1]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_read_header_boundaries() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(read_header(&mut empty).unwrap().is_none());

        let mut partial = Cursor::new(vec![0u8, 0, 0]);
        assert!(read_header(&mut partial).unwrap_err().is_decode());

        let mut full = Cursor::new(vec![0, 0, 0, 7, 0, 0, 1, 0]);
        assert_eq!(read_header(&mut full).unwrap(), Some((7, 256)));
    }

    #[test]
    fn test_read_payload_truncated() {
        let mut cur = Cursor::new(vec![1u8, 2]);
        assert!(read_payload(&mut cur, 4, 9).unwrap_err().is_decode());
    }

    #[test]
    fn test_u32_be() {
        let mut buf = Vec::new();
        write_u32_be(&mut buf, 0x0102_0304).unwrap();
        assert_eq!(buf, vec![1, 2, 3, 4]);
        assert_eq!(read_u32_be(&mut Cursor::new(buf)).unwrap(), 0x0102_0304);
    }

    proptest! {
        #[test]
        fn prop_gap_decode_inverts_encode(ids in prop::collection::btree_set(any::<u32>(), 0..100)) {
            let ids: Vec<u32> = ids.into_iter().collect();
            let gaps = gap_encode(&ids).unwrap();
            prop_assert_eq!(gap_decode(&gaps).unwrap(), ids);
        }

        #[test]
        fn prop_vbyte_roundtrip(value in any::<u32>()) {
            let mut buf = Vec::new();
            let written = encode_vbyte(value, &mut buf);
            prop_assert_eq!(decode_vbyte(&buf), Some((value, written)));
        }
    }
}

//! MSB-first bit packing used by the gamma codec.
//!
//! Bits fill each byte from the high bit down. The final byte is padded with
//! zero bits; readers are bounded by an explicit bit length so padding is
//! never decoded.

/// Appends bits to an owned byte buffer
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single bit
    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        let offset = (self.bit_len % 8) as u8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }

    /// Append `count` copies of `bit`
    pub fn push_run(&mut self, bit: bool, count: u32) {
        for _ in 0..count {
            self.push_bit(bit);
        }
    }

    /// Append the low `num_bits` bits of `value`, most significant first
    pub fn push_bits(&mut self, value: u64, num_bits: u32) {
        debug_assert!(num_bits <= 64);
        for i in (0..num_bits).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    /// Finish and return (bytes, bit_len)
    pub fn into_parts(self) -> (Vec<u8>, u64) {
        (self.bytes, self.bit_len)
    }
}

/// Reads bits from a byte slice, stopping at a fixed bit length
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: u64,
    limit: u64,
}

impl<'a> BitReader<'a> {
    /// `limit` is clamped to the bits actually present in `data`
    pub fn new(data: &'a [u8], limit: u64) -> Self {
        let available = data.len() as u64 * 8;
        Self {
            data,
            pos: 0,
            limit: limit.min(available),
        }
    }

    /// Read one bit, or `None` at the limit
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.pos >= self.limit {
            return None;
        }
        let byte = self.data[(self.pos / 8) as usize];
        let bit = byte & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        Some(bit)
    }

    /// Read `num_bits` bits as an unsigned integer, most significant first
    pub fn read_bits(&mut self, num_bits: u32) -> Option<u64> {
        debug_assert!(num_bits <= 64);
        let mut value = 0u64;
        for _ in 0..num_bits {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Some(value)
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_layout() {
        let mut w = BitWriter::new();
        w.push_bits(0b101, 3);
        let (bytes, len) = w.into_parts();
        assert_eq!(len, 3);
        assert_eq!(bytes, vec![0b1010_0000]);
    }

    #[test]
    fn test_crosses_byte_boundary() {
        let mut w = BitWriter::new();
        w.push_run(true, 7);
        w.push_bit(false);
        w.push_bits(0b11, 2);
        let (bytes, len) = w.into_parts();
        assert_eq!(len, 10);
        assert_eq!(bytes, vec![0b1111_1110, 0b1100_0000]);

        let mut r = BitReader::new(&bytes, len);
        assert_eq!(r.read_bits(8), Some(0b1111_1110));
        assert_eq!(r.read_bits(2), Some(0b11));
        assert!(r.is_exhausted());
        assert_eq!(r.read_bit(), None);
    }

    #[test]
    fn test_reader_stops_at_limit_not_padding() {
        let bytes = [0b1000_0000];
        let mut r = BitReader::new(&bytes, 1);
        assert_eq!(r.read_bit(), Some(true));
        assert_eq!(r.read_bit(), None);
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn test_limit_clamped_to_data() {
        let bytes = [0xFF];
        let mut r = BitReader::new(&bytes, 64);
        assert_eq!(r.read_bits(8), Some(0xFF));
        assert_eq!(r.read_bit(), None);
    }
}

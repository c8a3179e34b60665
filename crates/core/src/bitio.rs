//! Bit-level I/O and the byte packing convention used at the wire boundary.
//!
//! `BitWriter` and `BitReader` operate MSB-first. A bit sequence crossing
//! into bytes is packed with [`pack_bits`]: one header byte recording how
//! many bits of the final byte are meaningful (1-8, where 8 means the
//! final byte is full or there is no payload at all), followed by the
//! payload bytes. [`unpack_bits`] recovers the exact bit count from that
//! header.
//!
//! # Example
//! ```
//! use codec_sim_core::bitio::{pack_bits, unpack_bits};
//!
//! let bits = [true, false, true, true, false];
//! let bytes = pack_bits(&bits);
//! assert_eq!(bytes, vec![5, 0b1011_0000]);
//! assert_eq!(unpack_bits(&bytes).unwrap(), bits);
//! ```

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `pending` holds `pending_len` bits (0-7), MSB-aligned
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    pending: u8,
    pending_len: u8,
}

impl BitWriter {
    /// Create a new BitWriter with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.pending |= 0x80 >> self.pending_len;
        }
        self.pending_len += 1;
        if self.pending_len == 8 {
            self.bytes.push(self.pending);
            self.pending = 0;
            self.pending_len = 0;
        }
    }

    /// Append the lowest `count` bits of `value`, MSB first.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    /// Append every bit of a slice in order.
    pub fn write_slice(&mut self, bits: &[bool]) {
        for &bit in bits {
            self.write_bit(bit);
        }
    }

    /// Total number of bits written.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.pending_len as usize
    }

    /// Finish writing, zero-filling the final partial byte.
    pub fn finish(mut self) -> Vec<u8> {
        if self.pending_len > 0 {
            self.bytes.push(self.pending);
        }
        self.bytes
    }
}

/// Reads bits MSB-first from a byte buffer, up to an explicit bit limit.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> BitReader<'a> {
    /// Reader over every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limit(data, data.len() * 8)
    }

    /// Reader over the first `limit` bits of `data` (clamped to the buffer).
    pub fn with_limit(data: &'a [u8], limit: usize) -> Self {
        Self {
            data,
            position: 0,
            limit: limit.min(data.len() * 8),
        }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` once the limit is reached.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.position >= self.limit {
            return Err(BitIoError::UnexpectedEof.into());
        }
        let byte = self.data[self.position / 8];
        let bit = byte & (0x80 >> (self.position % 8)) != 0;
        self.position += 1;
        Ok(bit)
    }

    /// Read up to 64 bits as an MSB-first integer.
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }

    /// Number of bits left before the limit.
    pub fn bits_remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Check if every bit up to the limit has been read.
    pub fn is_empty(&self) -> bool {
        self.position >= self.limit
    }
}

/// Pack bits into bytes MSB-first behind a 1-byte "meaningful bits in the
/// final byte" header.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let tail = bits.len() % 8;
    let header = if tail == 0 { 8 } else { tail as u8 };

    let mut writer = BitWriter::new();
    writer.write_slice(bits);

    let mut out = Vec::with_capacity(1 + bits.len().div_ceil(8));
    out.push(header);
    out.extend(writer.finish());
    out
}

/// Reverse of [`pack_bits`].
///
/// # Errors
/// - `BitIoError::UnexpectedEof` if the header byte is missing
/// - `BitIoError::InvalidPackingHeader` if the header is outside 1..=8, or
///   claims a partial final byte when there is no payload
pub fn unpack_bits(bytes: &[u8]) -> Result<Vec<bool>> {
    let (&header, payload) = bytes.split_first().ok_or(BitIoError::UnexpectedEof)?;
    if !(1..=8).contains(&header) || (payload.is_empty() && header != 8) {
        return Err(BitIoError::InvalidPackingHeader(header).into());
    }

    let bit_len = match payload.len() {
        0 => 0,
        len => (len - 1) * 8 + header as usize,
    };

    let mut reader = BitReader::with_limit(payload, bit_len);
    let mut bits = Vec::with_capacity(bit_len);
    while !reader.is_empty() {
        bits.push(reader.read_bit()?);
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bits;

    #[test]
    fn test_writer_partial_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        assert_eq!(writer.bit_len(), 5);
        assert_eq!(writer.finish(), vec![0b1011_1000]);
    }

    #[test]
    fn test_writer_rejects_wide_counts() {
        let mut writer = BitWriter::new();
        assert!(writer.write_bits(0, 65).is_err());
    }

    #[test]
    fn test_reader_limit() {
        let data = [0b1010_1010];
        let mut reader = BitReader::with_limit(&data, 3);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert!(reader.is_empty());
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_pack_full_final_byte() {
        let bits = parse_bits("1111000000001111").unwrap();
        let bytes = pack_bits(&bits);
        assert_eq!(bytes, vec![8, 0xF0, 0x0F]);
        assert_eq!(unpack_bits(&bytes).unwrap(), bits);
    }

    #[test]
    fn test_pack_partial_final_byte() {
        let bits = parse_bits("110000001").unwrap();
        let bytes = pack_bits(&bits);
        assert_eq!(bytes, vec![1, 0b1100_0000, 0b1000_0000]);
        assert_eq!(unpack_bits(&bytes).unwrap(), bits);
    }

    #[test]
    fn test_pack_empty() {
        let bytes = pack_bits(&[]);
        assert_eq!(bytes, vec![8]);
        assert!(unpack_bits(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_unpack_invalid_header() {
        assert!(unpack_bits(&[]).is_err());
        assert!(unpack_bits(&[0, 0xFF]).is_err());
        assert!(unpack_bits(&[9, 0xFF]).is_err());
        assert!(unpack_bits(&[3]).is_err());
    }
}

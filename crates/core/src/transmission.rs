//! Transmission frame: the codeword stream plus the side-channel metadata
//! the receiver cannot derive from the bits alone.
//!
//! # Frame Format
//!
//! ```text
//! +--------------------+
//! | Magic (4 bytes)    |  "SFHC"
//! +--------------------+
//! | version (1)        |  currently 1
//! | construction (1)   |  0 = canonical, 1 = random parity
//! | framing (1)        |  0 = whole message, 1 = per block
//! | k (1), n (1)       |  code dimensions
//! | table_len (2)      |  u16 LE, code table section length
//! | parity_len (2)     |  u16 LE, parity section length (0 for canonical)
//! | payload_len (4)    |  u32 LE, packed payload length
//! | crc32 (4)          |  u32 LE
//! +--------------------+
//! | code table         |  u16 entry count, then per entry:
//! |                    |  utf8_len u8, symbol, code_len u8, code bits
//! +--------------------+
//! | parity rows        |  k rows of ceil((n-k)/8) bytes, column 0 first
//! +--------------------+
//! | payload            |  codewords packed by `bitio::pack_bits`
//! +--------------------+
//! ```
//!
//! The CRC covers every header field after the magic plus all three
//! sections. Channel noise happens before framing; the CRC guards the
//! metadata in transit, not the noisy channel.

use crate::bitio::{pack_bits, unpack_bits, BitReader, BitWriter};
use crate::channel_encoder::FramingMode;
use crate::error::{Error, FrameError, Result};
use crate::gf2::BitMatrix;
use crate::linear_code::{Construction, LinearCode};
use crate::shannon_fano::CodeTable;

/// Magic number for transmission frames: "SFHC" (Shannon-Fano/Hamming Coded)
const MAGIC: [u8; 4] = *b"SFHC";

const VERSION: u8 = 1;

/// Size of the fixed header in bytes
const HEADER_SIZE: usize = 21;

/// Everything the receiver needs to recover the message.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    pub code_table: CodeTable,
    pub code: LinearCode,
    pub framing: FramingMode,
    /// Received (possibly noisy) codeword bits
    pub codewords: Vec<bool>,
}

impl Transmission {
    /// Serialize into a checksummed frame.
    ///
    /// # Errors
    /// `FrameError::InvalidField` if a section outgrows its length field or
    /// a code is longer than 255 bits.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let table = serialize_table(&self.code_table)?;
        let parity = match self.code.construction() {
            Construction::Canonical => Vec::new(),
            Construction::RandomParity => serialize_parity(self.code.parity()),
        };
        let payload = pack_bits(&self.codewords);

        let table_len = section_len::<u16>("table_len", table.len())?;
        let parity_len = section_len::<u16>("parity_len", parity.len())?;
        let payload_len = section_len::<u32>("payload_len", payload.len())?;

        let mut fields = Vec::with_capacity(HEADER_SIZE - 8);
        fields.push(VERSION);
        fields.push(match self.code.construction() {
            Construction::Canonical => 0,
            Construction::RandomParity => 1,
        });
        fields.push(match self.framing {
            FramingMode::WholeMessage => 0,
            FramingMode::PerBlock => 1,
        });
        // n <= 64 is enforced by LinearCode
        fields.push(self.code.k() as u8);
        fields.push(self.code.n() as u8);
        fields.extend_from_slice(&table_len.to_le_bytes());
        fields.extend_from_slice(&parity_len.to_le_bytes());
        fields.extend_from_slice(&payload_len.to_le_bytes());

        let crc32 = compute_crc(&fields, &table, &parity, &payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE + table.len() + parity.len() + payload.len());
        frame.extend_from_slice(&MAGIC);
        frame.extend_from_slice(&fields);
        frame.extend_from_slice(&crc32.to_le_bytes());
        frame.extend_from_slice(&table);
        frame.extend_from_slice(&parity);
        frame.extend_from_slice(&payload);

        tracing::debug!(
            frame_bytes = frame.len(),
            table_bytes = table.len(),
            parity_bytes = parity.len(),
            payload_bytes = payload.len(),
            "serialized transmission frame"
        );
        Ok(frame)
    }

    /// Parse and validate a frame.
    ///
    /// # Errors
    /// - `FrameError::*` for bad magic, version, sizes or field values
    /// - `Error::Crc` if the checksum does not match
    /// - `SourceError::MalformedCodeTable` if the table is not prefix-free
    /// - `CodeError::*` if the code parameters are invalid
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::FrameTooShort {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        }

        let mut header = Cursor::new(&bytes[..HEADER_SIZE]);
        let magic: [u8; 4] = header.array()?;
        if magic != MAGIC {
            return Err(FrameError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let version = header.u8()?;
        if version != VERSION {
            return Err(FrameError::UnsupportedVersion(version).into());
        }
        let construction = match header.u8()? {
            0 => Construction::Canonical,
            1 => Construction::RandomParity,
            other => return Err(invalid("construction", format!("unknown value {other}"))),
        };
        let framing = match header.u8()? {
            0 => FramingMode::WholeMessage,
            1 => FramingMode::PerBlock,
            other => return Err(invalid("framing", format!("unknown value {other}"))),
        };
        let k = header.u8()? as usize;
        let n = header.u8()? as usize;
        let table_len = u16::from_le_bytes(header.array()?) as usize;
        let parity_len = u16::from_le_bytes(header.array()?) as usize;
        let payload_len = u32::from_le_bytes(header.array()?) as usize;
        let crc32 = u32::from_le_bytes(header.array()?);

        let expected_size = HEADER_SIZE + table_len + parity_len + payload_len;
        if bytes.len() != expected_size {
            return Err(FrameError::FrameTooShort {
                required: expected_size,
                actual: bytes.len(),
            }
            .into());
        }

        let table_end = HEADER_SIZE + table_len;
        let parity_end = table_end + parity_len;
        let table = &bytes[HEADER_SIZE..table_end];
        let parity = &bytes[table_end..parity_end];
        let payload = &bytes[parity_end..];

        let computed_crc = compute_crc(&bytes[4..HEADER_SIZE - 4], table, parity, payload);
        if computed_crc != crc32 {
            return Err(Error::Crc {
                expected: crc32,
                actual: computed_crc,
            });
        }

        let code_table = parse_table(table)?;
        let code = match construction {
            Construction::Canonical => {
                if !parity.is_empty() {
                    return Err(invalid("parity_len", "canonical codes carry no parity rows"));
                }
                LinearCode::canonical(k, n)?
            }
            Construction::RandomParity => {
                if k == 0 || n <= k {
                    return Err(invalid("n", format!("({n}, {k}) is not a valid code")));
                }
                LinearCode::with_parity(k, n, parse_parity(parity, k, n - k)?)?
            }
        };
        let codewords = unpack_bits(payload)?;

        Ok(Self {
            code_table,
            code,
            framing,
            codewords,
        })
    }
}

/// Compute CRC32 over the protected header fields and sections.
fn compute_crc(fields: &[u8], table: &[u8], parity: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(fields);
    hasher.update(table);
    hasher.update(parity);
    hasher.update(payload);
    hasher.finalize()
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    FrameError::InvalidField {
        field,
        reason: reason.into(),
    }
    .into()
}

fn section_len<T: TryFrom<usize>>(field: &'static str, len: usize) -> Result<T> {
    T::try_from(len).map_err(|_| invalid(field, format!("section of {len} bytes is too long")))
}

fn serialize_table(table: &CodeTable) -> Result<Vec<u8>> {
    let count = section_len::<u16>("table entries", table.len())?;
    let mut out = count.to_le_bytes().to_vec();
    for (symbol, code) in table.entries() {
        let mut utf8 = [0u8; 4];
        let encoded = symbol.encode_utf8(&mut utf8);
        out.push(encoded.len() as u8);
        out.extend_from_slice(encoded.as_bytes());

        let code_len = section_len::<u8>("code length", code.len())?;
        out.push(code_len);
        let mut writer = BitWriter::new();
        writer.write_slice(code);
        out.extend(writer.finish());
    }
    Ok(out)
}

fn parse_table(bytes: &[u8]) -> Result<CodeTable> {
    let mut cursor = Cursor::new(bytes);
    let count = u16::from_le_bytes(cursor.array()?) as usize;
    let mut entries = Vec::with_capacity(count);

    for _ in 0..count {
        let utf8_len = cursor.u8()? as usize;
        let raw = cursor.take(utf8_len)?;
        let symbol = std::str::from_utf8(raw)
            .ok()
            .and_then(|s| {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            })
            .ok_or_else(|| invalid("code table", "symbol is not a single UTF-8 character"))?;

        let code_len = cursor.u8()? as usize;
        let packed = cursor.take(code_len.div_ceil(8))?;
        let mut reader = BitReader::with_limit(packed, code_len);
        let code = (0..code_len)
            .map(|_| reader.read_bit())
            .collect::<Result<Vec<bool>>>()?;
        entries.push((symbol, code));
    }

    if !cursor.is_empty() {
        return Err(invalid("code table", "trailing bytes after last entry"));
    }
    CodeTable::from_entries(entries)
}

fn serialize_parity(parity: &BitMatrix) -> Vec<u8> {
    let mut out = Vec::with_capacity(parity.rows() * parity.cols().div_ceil(8));
    for i in 0..parity.rows() {
        let mut writer = BitWriter::new();
        for j in 0..parity.cols() {
            writer.write_bit(parity.get(i, j));
        }
        out.extend(writer.finish());
    }
    out
}

fn parse_parity(bytes: &[u8], rows: usize, cols: usize) -> Result<BitMatrix> {
    let row_bytes = cols.div_ceil(8);
    if bytes.len() != rows * row_bytes {
        return Err(invalid(
            "parity_len",
            format!("expected {} bytes for a {rows}x{cols} matrix, got {}", rows * row_bytes, bytes.len()),
        ));
    }

    let mut packed = Vec::with_capacity(rows);
    for row in bytes.chunks(row_bytes) {
        let mut reader = BitReader::with_limit(row, cols);
        let mut value = 0u64;
        for j in 0..cols {
            if reader.read_bit()? {
                value |= 1 << j;
            }
        }
        packed.push(value);
    }
    BitMatrix::from_rows(cols, packed)
}

/// Bounds-checked reader over a byte slice.
struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position + len;
        if end > self.data.len() {
            return Err(FrameError::FrameTooShort {
                required: end,
                actual: self.data.len(),
            }
            .into());
        }
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_encoder::{channel_encode, EncoderConfig};
    use crate::error::SourceError;
    use crate::frequency::FrequencyTable;
    use crate::shannon_fano;
    use crate::source_coding::compress;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample(code: LinearCode, framing: FramingMode) -> Transmission {
        let message = "hello world";
        let code_table = shannon_fano::build(&FrequencyTable::from_message(message).unwrap());
        let bits = compress(message, &code_table).unwrap();
        let config = EncoderConfig::new(framing, Default::default());
        let codewords = channel_encode(&bits, &code, &config).unwrap();
        Transmission {
            code_table,
            code,
            framing,
            codewords,
        }
    }

    #[test]
    fn test_serialize_parse_canonical() {
        let original = sample(LinearCode::canonical(11, 15).unwrap(), FramingMode::PerBlock);
        let frame = original.serialize().unwrap();
        assert_eq!(&frame[..4], b"SFHC");
        let parsed = Transmission::parse(&frame).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_serialize_parse_random_parity() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let code = LinearCode::random_parity(11, 21, &mut rng).unwrap();
        let original = sample(code, FramingMode::WholeMessage);
        let parsed = Transmission::parse(&original.serialize().unwrap()).unwrap();
        assert_eq!(parsed.code.parity(), original.code.parity());
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_invalid_magic() {
        let mut frame = sample(LinearCode::canonical(4, 7).unwrap(), FramingMode::WholeMessage)
            .serialize()
            .unwrap();
        frame[0] = b'X';
        assert!(matches!(
            Transmission::parse(&frame),
            Err(Error::Frame(FrameError::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_frame_too_short() {
        assert!(matches!(
            Transmission::parse(&[0u8; 10]),
            Err(Error::Frame(FrameError::FrameTooShort { .. }))
        ));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut frame = sample(LinearCode::canonical(4, 7).unwrap(), FramingMode::WholeMessage)
            .serialize()
            .unwrap();
        let len = frame.len();
        frame[len - 1] ^= 0x01;
        assert!(matches!(Transmission::parse(&frame), Err(Error::Crc { .. })));
    }

    #[test]
    fn test_non_prefix_free_table_rejected() {
        // Hand-built table section: 'a' -> 1, 'b' -> 10
        let table = vec![2, 0, 1, b'a', 1, 0x80, 1, b'b', 2, 0x80];
        let payload = pack_bits(&[true; 7]);

        let mut fields = vec![VERSION, 0, 0, 4, 7];
        fields.extend_from_slice(&(table.len() as u16).to_le_bytes());
        fields.extend_from_slice(&0u16.to_le_bytes());
        fields.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        let crc = compute_crc(&fields, &table, &[], &payload);

        let mut frame = MAGIC.to_vec();
        frame.extend_from_slice(&fields);
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&table);
        frame.extend_from_slice(&payload);

        assert!(matches!(
            Transmission::parse(&frame),
            Err(Error::Source(SourceError::MalformedCodeTable(_)))
        ));
    }
}

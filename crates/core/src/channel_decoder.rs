//! Channel decoder: syndrome decoding and unframing.
//!
//! Every n-bit block goes through a small state machine:
//!
//! 1. compute the syndrome `H·wᵗ`
//! 2. zero syndrome -> [`BlockStatus::Clean`]
//! 3. canonical code: the syndrome names the flipped position; flip it ->
//!    [`BlockStatus::Corrected`]. A syndrome naming no position (shortened
//!    codes) -> [`BlockStatus::Uncorrectable`]
//! 4. other codes: look the word up in the [`CosetTable`]; a unique match
//!    is replaced by its codeword -> `Corrected`, anything else ->
//!    `Uncorrectable`
//!
//! Two or more errors in one block of a distance-3 code alias to a
//! single-error syndrome and are confidently miscorrected. That is a
//! property of the code, not of the decoder.
//!
//! Uncorrectable blocks do not abort decoding: their data bits pass through
//! as received and the block is counted. Only structural problems (empty
//! or misaligned input) are errors.

use crate::bits::{block_to_word, read_uint, word_to_block};
use crate::channel_encoder::{block_header_bits, block_payload_bits, FramingMode, LENGTH_HEADER_BITS};
use crate::coset::CosetTable;
use crate::error::{ChannelError, CodeError, Result};
use crate::linear_code::{Construction, LinearCode};
use std::borrow::Cow;

/// Terminal state of one decoded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Zero syndrome, accepted as received
    Clean,
    /// Non-zero syndrome resolved to a codeword
    Corrected,
    /// Non-zero syndrome with no trustworthy correction
    Uncorrectable,
}

/// Decoded bits plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// Recovered message bits (header and fill stripped)
    pub bits: Vec<bool>,
    /// Blocks with a non-zero syndrome
    pub errors_found: usize,
    /// Blocks brought back to a zero syndrome
    pub errors_corrected: usize,
    /// Per-block outcome, in block order
    pub blocks: Vec<BlockStatus>,
    /// False if a length header declared more bits than were available
    pub header_valid: bool,
}

impl DecodeReport {
    /// Blocks left in the `Uncorrectable` state.
    pub fn uncorrectable(&self) -> usize {
        self.blocks
            .iter()
            .filter(|&&s| s == BlockStatus::Uncorrectable)
            .count()
    }

    /// True if every block decoded and the framing header was consistent.
    pub fn is_clean(&self) -> bool {
        self.header_valid && self.uncorrectable() == 0
    }
}

/// Syndrome decoder bound to one code.
///
/// The coset table, when needed, is built once and reused for every block
/// and message decoded with this instance.
#[derive(Debug, Clone)]
pub struct ChannelDecoder<'a> {
    code: &'a LinearCode,
    cosets: Option<Cow<'a, CosetTable>>,
}

impl<'a> ChannelDecoder<'a> {
    /// Decoder for `code`, building a coset table if it has no locator.
    ///
    /// # Errors
    /// `CodeError::CosetTableTooLarge` for random-parity codes with large k.
    pub fn new(code: &'a LinearCode) -> Result<Self> {
        let cosets = match code.construction() {
            Construction::Canonical => None,
            Construction::RandomParity => Some(Cow::Owned(CosetTable::build(code)?)),
        };
        Ok(Self { code, cosets })
    }

    /// Decoder reusing a prebuilt coset table, for any construction.
    ///
    /// # Errors
    /// - `CodeError::DimensionMismatch` if the table belongs to another (k, n)
    /// - `CodeError::CosetTableMismatch` if it belongs to another code of
    ///   the same (k, n)
    pub fn with_cosets(code: &'a LinearCode, cosets: &'a CosetTable) -> Result<Self> {
        if (cosets.k(), cosets.n()) != (code.k(), code.n()) {
            return Err(CodeError::DimensionMismatch {
                expected_rows: code.k(),
                expected_cols: code.n(),
                rows: cosets.k(),
                cols: cosets.n(),
            }
            .into());
        }
        if !cosets.matches(code) {
            return Err(CodeError::CosetTableMismatch {
                k: code.k(),
                n: code.n(),
            }
            .into());
        }
        Ok(Self {
            code,
            cosets: Some(Cow::Borrowed(cosets)),
        })
    }

    pub fn code(&self) -> &LinearCode {
        self.code
    }

    /// Resolve one received n-bit word.
    pub fn decode_word(&self, word: u64) -> (u64, BlockStatus) {
        let syndrome = self.code.syndrome(word);
        if syndrome == 0 {
            return (word, BlockStatus::Clean);
        }

        let corrected = match &self.cosets {
            Some(table) => table.correct(syndrome, word),
            None => self.code.locate(syndrome).map(|pos| word ^ (1 << pos)),
        };

        match corrected {
            Some(fixed) if self.code.syndrome(fixed) == 0 => {
                tracing::trace!(syndrome, "corrected block");
                (fixed, BlockStatus::Corrected)
            }
            _ => (word, BlockStatus::Uncorrectable),
        }
    }

    /// Decode a codeword stream and strip the framing.
    ///
    /// `framing` must be the mode the encoder used.
    ///
    /// # Errors
    /// - `ChannelError::EmptyInput` for an empty stream
    /// - `ChannelError::LengthMismatch` if the length is not a multiple of n
    /// - `ChannelError::BlockTooSmall` for per-block framing with tiny k
    pub fn decode(&self, received: &[bool], framing: FramingMode) -> Result<DecodeReport> {
        let (k, n) = (self.code.k(), self.code.n());
        if received.is_empty() {
            return Err(ChannelError::EmptyInput.into());
        }
        if received.len() % n != 0 {
            return Err(ChannelError::LengthMismatch {
                len: received.len(),
                block_len: n,
            }
            .into());
        }

        let block_count = received.len() / n;
        let mut framed = Vec::with_capacity(block_count * k);
        let mut blocks = Vec::with_capacity(block_count);
        let mut errors_found = 0;
        let mut errors_corrected = 0;

        for (index, block) in received.chunks(n).enumerate() {
            let (word, status) = self.decode_word(block_to_word(block));
            match status {
                BlockStatus::Clean => {}
                BlockStatus::Corrected => {
                    errors_found += 1;
                    errors_corrected += 1;
                }
                BlockStatus::Uncorrectable => {
                    errors_found += 1;
                    tracing::warn!(block = index, "uncorrectable block");
                }
            }
            blocks.push(status);
            word_to_block(self.code.data_word(word), k, &mut framed);
        }

        let (bits, header_valid) = unframe(&framed, k, framing)?;
        if !header_valid {
            tracing::warn!(?framing, "length header exceeds decoded data");
        }

        tracing::debug!(
            blocks = block_count,
            errors_found,
            errors_corrected,
            message_bits = bits.len(),
            "channel decoded"
        );

        Ok(DecodeReport {
            bits,
            errors_found,
            errors_corrected,
            blocks,
            header_valid,
        })
    }
}

/// Strip headers and fill from the concatenated data blocks.
///
/// A header declaring more bits than are present is clamped to what is
/// available and reported through the returned flag.
fn unframe(framed: &[bool], k: usize, framing: FramingMode) -> Result<(Vec<bool>, bool)> {
    match framing {
        FramingMode::WholeMessage => {
            if framed.len() < LENGTH_HEADER_BITS {
                return Ok((Vec::new(), false));
            }
            let (header, body) = framed.split_at(LENGTH_HEADER_BITS);
            let declared = read_uint(header) as usize;
            let take = declared.min(body.len());
            Ok((body[..take].to_vec(), declared <= body.len()))
        }
        FramingMode::PerBlock => {
            let header = block_header_bits(k);
            let payload = block_payload_bits(k)?;
            let mut bits = Vec::with_capacity(framed.len());
            let mut valid = true;
            for block in framed.chunks(k) {
                let declared = read_uint(&block[..header]) as usize;
                if declared > payload {
                    valid = false;
                }
                let take = declared.min(payload);
                bits.extend_from_slice(&block[header..header + take]);
            }
            Ok((bits, valid))
        }
    }
}

/// Decode with a freshly built [`ChannelDecoder`].
pub fn channel_decode(received: &[bool], code: &LinearCode, framing: FramingMode) -> Result<DecodeReport> {
    ChannelDecoder::new(code)?.decode(received, framing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bits;
    use crate::channel_encoder::{channel_encode, EncoderConfig, PaddingPolicy};
    use crate::error::Error;
    use crate::gf2::BitMatrix;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hamming() -> LinearCode {
        LinearCode::canonical(11, 15).unwrap()
    }

    fn sample_bits() -> Vec<bool> {
        parse_bits("1011001110001011110000101011011100101").unwrap()
    }

    #[test]
    fn test_clean_round_trip_both_framings() {
        let code = hamming();
        let bits = sample_bits();
        for framing in [FramingMode::WholeMessage, FramingMode::PerBlock] {
            let config = EncoderConfig::new(framing, PaddingPolicy::Zero);
            let encoded = channel_encode(&bits, &code, &config).unwrap();
            let report = channel_decode(&encoded, &code, framing).unwrap();
            assert_eq!(report.bits, bits);
            assert_eq!(report.errors_found, 0);
            assert_eq!(report.errors_corrected, 0);
            assert!(report.is_clean());
        }
    }

    #[test]
    fn test_all_zero_block_single_flip() {
        let code = hamming();
        let decoder = ChannelDecoder::new(&code).unwrap();
        let mut received = vec![false; 15];
        received[7] = true;

        let (word, status) = decoder.decode_word(block_to_word(&received));
        assert_eq!(status, BlockStatus::Corrected);
        assert_eq!(word, 0);
        assert_eq!(code.data_word(word), 0);
    }

    #[test]
    fn test_single_flip_every_position() {
        let code = hamming();
        let bits = sample_bits();
        let config = EncoderConfig::default();
        let encoded = channel_encode(&bits, &code, &config).unwrap();

        for pos in 0..encoded.len() {
            let mut received = encoded.clone();
            received[pos] = !received[pos];
            let report = channel_decode(&received, &code, FramingMode::WholeMessage).unwrap();
            assert_eq!(report.errors_found, 1, "flip at {pos}");
            assert_eq!(report.errors_corrected, 1, "flip at {pos}");
            assert_eq!(report.bits, bits, "flip at {pos}");
        }
    }

    #[test]
    fn test_double_error_miscorrects() {
        let code = hamming();
        let decoder = ChannelDecoder::new(&code).unwrap();
        let received = 0b11u64;
        let (word, status) = decoder.decode_word(received);
        // Positions 0 and 1 have columns 3 and 5, syndrome 6 names position 2
        assert_eq!(status, BlockStatus::Corrected);
        assert_eq!(word, 0b111);
        assert_ne!(code.data_word(word), 0);
    }

    #[test]
    fn test_length_mismatch() {
        let code = hamming();
        let result = channel_decode(&[false; 16], &code, FramingMode::WholeMessage);
        assert!(matches!(
            result,
            Err(crate::error::Error::Channel(ChannelError::LengthMismatch { len: 16, block_len: 15 }))
        ));
        assert!(channel_decode(&[], &code, FramingMode::WholeMessage).is_err());
    }

    #[test]
    fn test_random_padding_does_not_leak() {
        let code = hamming();
        let bits = sample_bits();
        for framing in [FramingMode::WholeMessage, FramingMode::PerBlock] {
            for seed in 0..8 {
                let config = EncoderConfig::new(framing, PaddingPolicy::Random { seed });
                let encoded = channel_encode(&bits, &code, &config).unwrap();
                let report = channel_decode(&encoded, &code, framing).unwrap();
                assert_eq!(report.bits, bits);
            }
        }
    }

    #[test]
    fn test_corrupt_header_is_clamped() {
        let code = hamming();
        // Data word with header bits all set: declares 2^32 - 1 bits
        let received: Vec<bool> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                word_to_block(code.encode_word((1 << 11) - 1), 15, &mut out);
            }
            out
        };
        let report = channel_decode(&received, &code, FramingMode::WholeMessage).unwrap();
        assert!(!report.header_valid);
        assert_eq!(report.bits.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_random_parity_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let code = LinearCode::random_parity(8, 13, &mut rng).unwrap();
        let bits = sample_bits();
        let config = EncoderConfig::new(FramingMode::WholeMessage, PaddingPolicy::Random { seed: 1 });
        let encoded = channel_encode(&bits, &code, &config).unwrap();
        let report = channel_decode(&encoded, &code, FramingMode::WholeMessage).unwrap();
        assert_eq!(report.bits, bits);
        assert_eq!(report.errors_found, 0);
    }

    #[test]
    fn test_random_parity_uncorrectable_block() {
        // Columns of H: 01, 01, 10, 01, 10 (positions 0,1 and 3 share 01)
        let parity = BitMatrix::from_rows(2, vec![0b01, 0b01, 0b10]).unwrap();
        let code = LinearCode::with_parity(3, 5, parity).unwrap();
        let cosets = CosetTable::build(&code).unwrap();
        let decoder = ChannelDecoder::with_cosets(&code, &cosets).unwrap();

        // Syndrome 11 is not reachable by any single flip
        let received = 0b00101u64;
        assert_eq!(code.syndrome(received), 0b11);
        assert!(!cosets.has_syndrome(0b11));
        let (word, status) = decoder.decode_word(received);
        assert_eq!(status, BlockStatus::Uncorrectable);
        assert_eq!(word, received);

        let mut stream = Vec::new();
        word_to_block(received, 5, &mut stream);
        word_to_block(code.encode_word(0), 5, &mut stream);
        let report = decoder.decode(&stream, FramingMode::PerBlock).unwrap();
        assert_eq!(report.blocks, vec![BlockStatus::Uncorrectable, BlockStatus::Clean]);
        assert_eq!(report.errors_found, 1);
        assert_eq!(report.errors_corrected, 0);
        assert_eq!(report.uncorrectable(), 1);
    }

    #[test]
    fn test_coset_table_mismatch() {
        let code = hamming();
        let other = LinearCode::canonical(4, 7).unwrap();
        let cosets = CosetTable::build(&other).unwrap();
        assert!(matches!(
            ChannelDecoder::with_cosets(&code, &cosets),
            Err(Error::Code(CodeError::DimensionMismatch {
                expected_rows: 11,
                expected_cols: 15,
                rows: 4,
                cols: 7,
            }))
        ));
    }

    #[test]
    fn test_coset_table_from_other_code_same_dimensions() {
        let own = LinearCode::random_parity(8, 13, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let other = LinearCode::random_parity(8, 13, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        let foreign = CosetTable::build(&other).unwrap();
        assert!(matches!(
            ChannelDecoder::with_cosets(&own, &foreign),
            Err(Error::Code(CodeError::CosetTableMismatch { k: 8, n: 13 }))
        ));

        // The matching table resolves exactly what a freshly built decoder does
        let table = CosetTable::build(&own).unwrap();
        let shared = ChannelDecoder::with_cosets(&own, &table).unwrap();
        let fresh = ChannelDecoder::new(&own).unwrap();
        let codeword = own.encode_word(0b1011_0110);
        for pos in 0..13 {
            let received = codeword ^ (1 << pos);
            assert_eq!(shared.decode_word(received), fresh.decode_word(received));
        }
    }
}

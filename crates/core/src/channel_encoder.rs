//! Channel encoder: framing, padding and block encoding.
//!
//! # Framing modes
//!
//! ```text
//! WholeMessage:  | length (32 bits) | data bits ............ | fill |
//!                 \_____________ multiple of k bits _____________/
//!
//! PerBlock:      | count (h) | data (k-h) | count (h) | data | fill |
//!                 \_____ block of k _____/ \______ block of k ______/
//! ```
//!
//! - WholeMessage prepends the total original bit count and pads the whole
//!   sequence to a multiple of k.
//! - PerBlock gives every k-bit block an `h = bit_width(k)` header holding
//!   the number of data bits it carries; only the final block is short and
//!   padded.
//!
//! Headers are MSB-first. Fill bits are zeros or seeded random bits; the
//! decoder only ever trusts the header-declared lengths.

use crate::bits::{bit_width, block_to_word, push_uint, word_to_block};
use crate::error::{ChannelError, Result};
use crate::linear_code::LinearCode;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Width of the whole-message length header.
pub const LENGTH_HEADER_BITS: usize = 32;

/// How the original length is recorded inside the data blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingMode {
    /// One 32-bit total-length header for the whole message
    #[default]
    WholeMessage,
    /// A data-bit count header at the start of every block
    PerBlock,
}

/// Content of the fill bits after the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingPolicy {
    #[default]
    Zero,
    /// Bits drawn from a ChaCha8 stream seeded with `seed`
    Random { seed: u64 },
}

/// Encoder-side configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderConfig {
    pub framing: FramingMode,
    pub padding: PaddingPolicy,
}

impl EncoderConfig {
    pub fn new(framing: FramingMode, padding: PaddingPolicy) -> Self {
        Self { framing, padding }
    }
}

/// Header width used by per-block framing for block size `k`.
pub fn block_header_bits(k: usize) -> usize {
    bit_width(k)
}

/// Data bits carried by one per-block-framed block.
///
/// # Errors
/// `ChannelError::BlockTooSmall` if the header leaves no room for data.
pub fn block_payload_bits(k: usize) -> Result<usize> {
    let header = block_header_bits(k);
    if k <= header {
        return Err(ChannelError::BlockTooSmall { k, header }.into());
    }
    Ok(k - header)
}

struct Filler {
    rng: Option<ChaCha8Rng>,
}

impl Filler {
    fn new(policy: PaddingPolicy) -> Self {
        let rng = match policy {
            PaddingPolicy::Zero => None,
            PaddingPolicy::Random { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
        };
        Self { rng }
    }

    fn fill(&mut self, out: &mut Vec<bool>, count: usize) {
        match self.rng.as_mut() {
            None => out.extend(std::iter::repeat(false).take(count)),
            Some(rng) => out.extend((0..count).map(|_| rng.gen::<bool>())),
        }
    }
}

/// Add the framing headers and fill so the result is a multiple of `k` bits.
///
/// # Errors
/// - `ChannelError::EmptyInput` for a zero-length message
/// - `ChannelError::HeaderOverflow` if the message length does not fit the
///   32-bit whole-message header
/// - `ChannelError::BlockTooSmall` for per-block framing with tiny k
pub fn frame(bits: &[bool], k: usize, config: &EncoderConfig) -> Result<Vec<bool>> {
    if bits.is_empty() {
        return Err(ChannelError::EmptyInput.into());
    }

    let mut filler = Filler::new(config.padding);
    let mut framed = Vec::new();

    match config.framing {
        FramingMode::WholeMessage => {
            if bits.len() > u32::MAX as usize {
                return Err(ChannelError::HeaderOverflow {
                    value: bits.len(),
                    width: LENGTH_HEADER_BITS,
                }
                .into());
            }
            let len = LENGTH_HEADER_BITS + bits.len();
            framed.reserve(len.div_ceil(k) * k);
            push_uint(&mut framed, bits.len() as u64, LENGTH_HEADER_BITS);
            framed.extend_from_slice(bits);
            let fill = (k - framed.len() % k) % k;
            filler.fill(&mut framed, fill);
        }
        FramingMode::PerBlock => {
            let header = block_header_bits(k);
            let payload = block_payload_bits(k)?;
            framed.reserve(bits.len().div_ceil(payload) * k);
            for chunk in bits.chunks(payload) {
                push_uint(&mut framed, chunk.len() as u64, header);
                framed.extend_from_slice(chunk);
                filler.fill(&mut framed, payload - chunk.len());
            }
        }
    }

    debug_assert_eq!(framed.len() % k, 0);
    Ok(framed)
}

/// Frame `bits` and encode every k-bit block into an n-bit codeword.
///
/// Codewords are concatenated in block order.
pub fn channel_encode(bits: &[bool], code: &LinearCode, config: &EncoderConfig) -> Result<Vec<bool>> {
    let framed = frame(bits, code.k(), config)?;
    let blocks = framed.len() / code.k();

    let mut codewords = Vec::with_capacity(blocks * code.n());
    for block in framed.chunks(code.k()) {
        let word = code.encode_word(block_to_word(block));
        word_to_block(word, code.n(), &mut codewords);
    }

    tracing::debug!(
        message_bits = bits.len(),
        framed_bits = framed.len(),
        blocks,
        k = code.k(),
        n = code.n(),
        "channel encoded"
    );
    Ok(codewords)
}

/// Output of [`encode`]: the codeword stream plus the code that produced it.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub codewords: Vec<bool>,
    pub code: LinearCode,
}

impl Encoded {
    /// Number of n-bit blocks.
    pub fn blocks(&self) -> usize {
        self.codewords.len() / self.code.n()
    }
}

/// Build the canonical `(n, k)` code and encode `bits` with it.
pub fn encode(bits: &[bool], k: usize, n: usize, config: &EncoderConfig) -> Result<Encoded> {
    let code = LinearCode::canonical(k, n)?;
    let codewords = channel_encode(bits, &code, config)?;
    Ok(Encoded { codewords, code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{format_bits, parse_bits, read_uint};

    #[test]
    fn test_whole_message_frame_layout() {
        let bits = parse_bits("10110").unwrap();
        let framed = frame(&bits, 11, &EncoderConfig::default()).unwrap();
        // 32 + 5 = 37 -> 44
        assert_eq!(framed.len(), 44);
        assert_eq!(read_uint(&framed[..32]), 5);
        assert_eq!(format_bits(&framed[32..37]), "10110");
        assert!(framed[37..].iter().all(|&b| !b));
    }

    #[test]
    fn test_per_block_frame_layout() {
        // k = 11: 4-bit header, 7 data bits per block
        let bits = parse_bits("1111111101").unwrap();
        let config = EncoderConfig::new(FramingMode::PerBlock, PaddingPolicy::Zero);
        let framed = frame(&bits, 11, &config).unwrap();
        assert_eq!(framed.len(), 22);
        assert_eq!(format_bits(&framed[..11]), "01111111111");
        assert_eq!(format_bits(&framed[11..]), "00111010000");
    }

    #[test]
    fn test_random_padding_is_seeded() {
        let bits = parse_bits("1").unwrap();
        let config = EncoderConfig::new(FramingMode::WholeMessage, PaddingPolicy::Random { seed: 3 });
        let a = frame(&bits, 16, &config).unwrap();
        let b = frame(&bits, 16, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 48);
        assert_eq!(&a[..33], &frame(&bits, 16, &EncoderConfig::default()).unwrap()[..33]);
    }

    #[test]
    fn test_empty_input() {
        let code = LinearCode::canonical(11, 15).unwrap();
        let result = channel_encode(&[], &code, &EncoderConfig::default());
        assert!(matches!(
            result,
            Err(crate::error::Error::Channel(ChannelError::EmptyInput))
        ));
    }

    #[test]
    fn test_block_too_small() {
        let bits = parse_bits("1").unwrap();
        let config = EncoderConfig::new(FramingMode::PerBlock, PaddingPolicy::Zero);
        assert!(matches!(
            frame(&bits, 2, &config),
            Err(crate::error::Error::Channel(ChannelError::BlockTooSmall { k: 2, header: 2 }))
        ));
        assert!(frame(&bits, 3, &config).is_ok());
    }

    #[test]
    fn test_all_zero_block_encodes_to_zero_codeword() {
        let code = LinearCode::canonical(11, 15).unwrap();
        let config = EncoderConfig::new(FramingMode::PerBlock, PaddingPolicy::Zero);
        // header 0111 (7 bits), data all zero
        let encoded = channel_encode(&[false; 7], &code, &config).unwrap();
        assert_eq!(encoded.len(), 15);
        assert_eq!(format_bits(&encoded[..11]), "01110000000");
    }

    #[test]
    fn test_encode_builds_canonical_code() {
        let bits = parse_bits("1011").unwrap();
        let encoded = encode(&bits, 11, 15, &EncoderConfig::default()).unwrap();
        assert_eq!(encoded.blocks(), 4);
        assert_eq!(encoded.codewords.len(), 60);
        assert_eq!(encoded.code, LinearCode::canonical(11, 15).unwrap());
    }
}

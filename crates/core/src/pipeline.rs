//! End-to-end driver: message -> source coding -> channel coding -> noisy
//! channel -> transmission frame -> channel decoding -> source decoding.
//!
//! ```text
//!  message ─► FrequencyTable ─► CodeTable ─► compress ─► channel_encode
//!                                                            │
//!  decoded ◄── decompress ◄── ChannelDecoder ◄── parse ◄── serialize ◄── noise
//! ```
//!
//! The receiver side works only from the parsed [`Transmission`], never from
//! the sender's in-memory code or table.

use crate::channel_decoder::{ChannelDecoder, DecodeReport};
use crate::channel_encoder::{channel_encode, EncoderConfig, FramingMode, PaddingPolicy};
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::linear_code::{Construction, LinearCode};
use crate::metrics::PipelineMetrics;
use crate::noise::{ChannelSimulator, NoiseConfig};
use crate::shannon_fano::{self, CodeTable};
use crate::source_coding::{compress, decompress, decompress_lenient};
use crate::transmission::Transmission;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// What to do with unmatched bits left at the end of decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBitsPolicy {
    /// Fail the run with `SourceError::TrailingBits`
    Reject,
    /// Keep the decoded prefix and count the leftover bits
    #[default]
    Truncate,
}

/// Full configuration of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Data bits per block
    pub k: usize,
    /// Codeword bits per block
    pub n: usize,
    pub construction: Construction,
    /// Seed for the random-parity construction (unused for canonical codes)
    pub code_seed: u64,
    pub framing: FramingMode,
    pub padding: PaddingPolicy,
    pub noise: NoiseConfig,
    pub trailing_bits: TrailingBitsPolicy,
}

impl PipelineConfig {
    /// Canonical Hamming(15,11), whole-message framing, zero padding and a
    /// noiseless channel.
    pub fn hamming_15_11(seed: u64) -> Self {
        Self {
            k: 11,
            n: 15,
            construction: Construction::Canonical,
            code_seed: seed,
            framing: FramingMode::WholeMessage,
            padding: PaddingPolicy::Zero,
            noise: NoiseConfig::noiseless(seed),
            trailing_bits: TrailingBitsPolicy::Truncate,
        }
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig::new(self.framing, self.padding)
    }

    /// Build the channel code this configuration describes.
    pub fn build_code(&self) -> Result<LinearCode> {
        match self.construction {
            Construction::Canonical => LinearCode::canonical(self.k, self.n),
            Construction::RandomParity => {
                let mut rng = ChaCha8Rng::seed_from_u64(self.code_seed);
                LinearCode::random_parity(self.k, self.n, &mut rng)
            }
        }
    }
}

/// Every intermediate artifact of a run, plus diagnostics.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub frequencies: FrequencyTable,
    pub code_table: CodeTable,
    /// Output of the entropy coder
    pub compressed: Vec<bool>,
    pub code: LinearCode,
    /// Codewords as sent
    pub encoded: Vec<bool>,
    /// Codewords after the channel
    pub received: Vec<bool>,
    /// Positions the channel flipped, ascending
    pub flipped: Vec<usize>,
    /// Serialized transmission frame
    pub frame: Vec<u8>,
    pub decode: DecodeReport,
    pub decoded: String,
    pub metrics: PipelineMetrics,
}

impl PipelineReport {
    /// True if the decoded message equals the input.
    pub fn matched(&self) -> bool {
        self.metrics.message_matched
    }

    /// True if the channel decoder handed back the exact compressed bits.
    pub fn bits_recovered(&self) -> bool {
        self.decode.bits == self.compressed
    }
}

/// Send `message` through the whole system.
///
/// Uncorrectable blocks and miscorrections do not fail the run; they show
/// up in the report. Trailing bits fail it only under
/// [`TrailingBitsPolicy::Reject`].
///
/// # Errors
/// Structural failures from any stage: empty input, invalid code
/// parameters, invalid noise rate, frame corruption, or rejected trailing
/// bits.
pub fn run(message: &str, config: &PipelineConfig) -> Result<PipelineReport> {
    let mut metrics = PipelineMetrics::new();

    // Sender
    let frequencies = FrequencyTable::from_message(message)?;
    let code_table = shannon_fano::build(&frequencies);
    let compressed = compress(message, &code_table)?;

    metrics.input_symbols = frequencies.total() as u64;
    metrics.alphabet_size = frequencies.len() as u64;
    metrics.entropy = frequencies.entropy();
    metrics.average_code_length = code_table.average_length(&frequencies);
    metrics.compressed_bits = compressed.len() as u64;

    let code = config.build_code()?;
    let encoded = channel_encode(&compressed, &code, &config.encoder_config())?;

    metrics.k = code.k() as u64;
    metrics.n = code.n() as u64;
    metrics.encoded_bits = encoded.len() as u64;
    metrics.blocks = (encoded.len() / code.n()) as u64;

    // Channel
    let mut channel = ChannelSimulator::new(config.noise)?;
    let noisy = channel.transmit(&encoded);
    metrics.bits_flipped = noisy.flipped_count() as u64;

    let frame = Transmission {
        code_table: code_table.clone(),
        code: code.clone(),
        framing: config.framing,
        codewords: noisy.bits.clone(),
    }
    .serialize()?;
    metrics.frame_bytes = frame.len() as u64;

    // Receiver
    let transmission = Transmission::parse(&frame)?;
    let decoder = ChannelDecoder::new(&transmission.code)?;
    let decode = decoder.decode(&transmission.codewords, transmission.framing)?;

    metrics.errors_found = decode.errors_found as u64;
    metrics.errors_corrected = decode.errors_corrected as u64;
    metrics.blocks_uncorrectable = decode.uncorrectable() as u64;

    let decoded = match config.trailing_bits {
        TrailingBitsPolicy::Reject => decompress(&decode.bits, &transmission.code_table)?,
        TrailingBitsPolicy::Truncate => {
            let lenient = decompress_lenient(&decode.bits, &transmission.code_table);
            metrics.trailing_bits = lenient.trailing_bits as u64;
            lenient.message
        }
    };

    metrics.message_matched = decoded == message;
    metrics.complete();

    tracing::debug!(
        symbols = metrics.input_symbols,
        compressed_bits = metrics.compressed_bits,
        flipped = metrics.bits_flipped,
        corrected = metrics.errors_corrected,
        matched = metrics.message_matched,
        "pipeline finished"
    );
    if !metrics.message_matched {
        tracing::warn!(
            uncorrectable = metrics.blocks_uncorrectable,
            "decoded message differs from input"
        );
    }

    Ok(PipelineReport {
        frequencies,
        code_table,
        compressed,
        code,
        encoded,
        received: noisy.bits,
        flipped: noisy.flipped,
        frame,
        decode,
        decoded,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SourceError};

    #[test]
    fn test_noiseless_round_trip() {
        let report = run("hello world", &PipelineConfig::hamming_15_11(1)).unwrap();
        assert!(report.matched());
        assert!(report.bits_recovered());
        assert_eq!(report.decoded, "hello world");
        assert_eq!(report.metrics.compressed_bits, 32);
        assert_eq!(report.metrics.bits_flipped, 0);
        assert_eq!(report.metrics.errors_found, 0);
        // 32 header + 32 data = 64 -> 66 = 6 blocks of 11
        assert_eq!(report.metrics.blocks, 6);
        assert_eq!(report.encoded.len(), 90);
    }

    #[test]
    fn test_config_constructor() {
        let config = PipelineConfig::hamming_15_11(7);
        assert_eq!((config.k, config.n), (11, 15));
        assert_eq!(config.noise, NoiseConfig::noiseless(7));
        assert_eq!(config.encoder_config(), EncoderConfig::default());
    }

    #[test]
    fn test_random_parity_code_is_seeded() {
        let mut config = PipelineConfig::hamming_15_11(3);
        config.construction = Construction::RandomParity;
        let a = config.build_code().unwrap();
        let b = config.build_code().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.construction(), Construction::RandomParity);
    }

    #[test]
    fn test_random_parity_noiseless() {
        let mut config = PipelineConfig::hamming_15_11(11);
        config.construction = Construction::RandomParity;
        config.framing = FramingMode::PerBlock;
        config.padding = PaddingPolicy::Random { seed: 4 };
        let report = run("abracadabra", &config).unwrap();
        assert!(report.matched());
    }

    #[test]
    fn test_one_flip_per_block_is_corrected() {
        // 90 encoded bits at 1/90 flips exactly one bit
        let mut config = PipelineConfig::hamming_15_11(5);
        config.noise.rate = 1.0 / 90.0;
        let report = run("hello world", &config).unwrap();
        assert_eq!(report.metrics.bits_flipped, 1);
        assert_eq!(report.metrics.errors_found, 1);
        assert_eq!(report.metrics.errors_corrected, 1);
        assert!(report.matched());
    }

    #[test]
    fn test_empty_message() {
        let result = run("", &PipelineConfig::hamming_15_11(0));
        assert!(matches!(result, Err(Error::Source(SourceError::EmptyInput))));
    }

    #[test]
    fn test_invalid_parameters() {
        let mut config = PipelineConfig::hamming_15_11(0);
        config.n = config.k;
        assert!(run("abc", &config).is_err());
    }

    #[test]
    fn test_metrics_are_filled() {
        let report = run("aaab", &PipelineConfig::hamming_15_11(2)).unwrap();
        let metrics = &report.metrics;
        assert_eq!(metrics.input_symbols, 4);
        assert_eq!(metrics.alphabet_size, 2);
        assert!(metrics.entropy > 0.8 && metrics.entropy < 0.82);
        assert_eq!(metrics.average_code_length, 1.0);
        assert_eq!(metrics.frame_bytes, report.frame.len() as u64);
        assert!(metrics.end_time.is_some());
    }
}

//! codec-sim-core: Shannon-Fano source coding over a Hamming-style channel code
//!
//! This library provides the core components of a small digital
//! communication system that:
//! - Compresses a symbol stream with a Shannon-Fano prefix code
//! - Adds redundancy with a systematic binary linear block code over GF(2)
//! - Simulates a noisy binary channel with seeded bit flips
//! - Detects and corrects errors by syndrome decoding, then decompresses
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `frequency`, `shannon_fano`, `source_coding`: the entropy coder
//! - `gf2`, `linear_code`, `coset`: the channel code and its decoding tables
//! - `channel_encoder`, `channel_decoder`: framing and block coding
//! - `noise`: channel simulator with seeded randomness
//! - `bits`, `bitio`: bit sequences and MSB-first byte packing
//! - `transmission`: checksummed frame carrying the side-channel metadata
//! - `metrics`, `pipeline`: observable end-to-end runs
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Local failures stay local**: an uncorrectable block is counted, not fatal
//! - **Deterministic**: Seeded randomness makes runs reproducible
//! - **Observable**: Metrics and `tracing` events for every stage
//!
//! # Example
//!
//! ```
//! use codec_sim_core::{build_code_table, build_frequency_table, compress, decompress};
//! use codec_sim_core::{build_linear_code, channel_decode, channel_encode};
//! use codec_sim_core::channel_encoder::{EncoderConfig, FramingMode};
//!
//! let freqs = build_frequency_table("hello world").unwrap();
//! let table = build_code_table(&freqs);
//! let bits = compress("hello world", &table).unwrap();
//!
//! let code = build_linear_code(11, 15).unwrap();
//! let sent = channel_encode(&bits, &code, &EncoderConfig::default()).unwrap();
//! let report = channel_decode(&sent, &code, FramingMode::WholeMessage).unwrap();
//!
//! assert_eq!(report.errors_found, 0);
//! assert_eq!(decompress(&report.bits, &table).unwrap(), "hello world");
//! ```

pub mod bitio;
pub mod bits;
pub mod channel_decoder;
pub mod channel_encoder;
pub mod coset;
pub mod error;
pub mod frequency;
pub mod gf2;
pub mod linear_code;
pub mod metrics;
pub mod noise;
pub mod pipeline;
pub mod shannon_fano;
pub mod source_coding;
pub mod transmission;

// Re-export commonly used types
pub use channel_decoder::{channel_decode, BlockStatus, ChannelDecoder, DecodeReport};
pub use channel_encoder::channel_encode;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use linear_code::{build_linear_code, LinearCode};
pub use noise::apply_noise;
pub use shannon_fano::CodeTable;
pub use source_coding::{compress, decompress};

/// Count symbols of `message` into a probability-ordered table.
pub fn build_frequency_table(message: &str) -> Result<FrequencyTable> {
    FrequencyTable::from_message(message)
}

/// Build the Shannon-Fano code for `frequencies`.
pub fn build_code_table(frequencies: &FrequencyTable) -> CodeTable {
    shannon_fano::build(frequencies)
}

/// Shannon entropy of the table in bits per symbol.
pub fn entropy(frequencies: &FrequencyTable) -> f64 {
    frequencies.entropy()
}

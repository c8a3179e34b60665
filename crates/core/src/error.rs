//! Error types for the codec simulator.
//!
//! All operations return structured errors rather than panicking.
//! Structural failures (empty input, misaligned codeword streams, malformed
//! code tables) abort the operation that hit them. Per-block decoding
//! failures are not errors: they are reported through
//! [`BlockStatus`](crate::channel_decoder::BlockStatus) and the decode counters.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Source: frequency model, prefix code and entropy coder
/// - Code: linear block code construction and GF(2) algebra
/// - Channel: framing, block encoding and decoding
/// - Noise: channel simulator parameters
/// - Bit I/O: bit packing at the byte boundary
/// - Frame: transmission frame serialization/parsing
/// - CRC: transmission frame corruption
#[derive(Debug, Error)]
pub enum Error {
    /// Source coding error (e.g., unknown symbol, malformed table)
    #[error("source coding error: {0}")]
    Source(#[from] SourceError),

    /// Linear code construction error (e.g., invalid (k, n))
    #[error("linear code error: {0}")]
    Code(#[from] CodeError),

    /// Channel encode/decode error (e.g., length mismatch)
    #[error("channel coding error: {0}")]
    Channel(#[from] ChannelError),

    /// Channel simulator error
    #[error("noise error: {0}")]
    Noise(#[from] NoiseError),

    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Transmission frame error (e.g., invalid header)
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// CRC validation failed, indicating a corrupted transmission frame
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },
}

/// Frequency model, prefix code and entropy coder errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Empty message given to the frequency model or entropy coder
    #[error("empty input: cannot build a code for an empty message")]
    EmptyInput,

    /// Symbol has no entry in the supplied code table
    #[error("symbol {symbol:?} at position {position} has no code table entry")]
    UnknownSymbol { symbol: char, position: usize },

    /// Supplied code table is empty, has empty codes, or is not prefix-free
    #[error("malformed code table: {0}")]
    MalformedCodeTable(String),

    /// Input ended with bits that do not form a complete code
    #[error("{bits} trailing bits do not match any code")]
    TrailingBits { bits: usize },
}

/// Linear block code construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    /// (k, n) outside the supported range
    #[error("invalid code parameters (k={k}, n={n}): {reason}")]
    InvalidParameters { k: usize, n: usize, reason: String },

    /// Not enough parity bits to give every position a distinct syndrome
    #[error("({n}, {k}) code needs 2^(n-k) - 1 >= n for single-error correction")]
    InsufficientParity { k: usize, n: usize },

    /// Matrix shapes do not agree
    #[error("matrix dimension mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Coset table would enumerate too many codewords
    #[error("coset table for k={k} exceeds the maximum of k={max}")]
    CosetTableTooLarge { k: usize, max: usize },

    /// Coset table enumerates a different code of the same dimensions
    #[error("coset table was built for a different ({n}, {k}) code")]
    CosetTableMismatch { k: usize, n: usize },
}

/// Channel framing, encoding and decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// Zero-length message given to the encoder, or empty codeword stream
    #[error("empty input: nothing to encode or decode")]
    EmptyInput,

    /// Received bit count is not a multiple of the block length n
    #[error("received {len} bits, not a multiple of block length {block_len}")]
    LengthMismatch { len: usize, block_len: usize },

    /// Value does not fit in the framing header
    #[error("value {value} does not fit in a {width}-bit header")]
    HeaderOverflow { value: usize, width: usize },

    /// Block too small to carry a per-block header and any data
    #[error("block of {k} bits cannot hold a {header}-bit header plus data")]
    BlockTooSmall { k: usize, header: usize },
}

/// Channel simulator errors.
#[derive(Debug, Error, PartialEq)]
pub enum NoiseError {
    /// Rate outside [0, 1] (or NaN)
    #[error("noise rate {0} outside [0, 1]")]
    InvalidRate(f64),
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the buffer
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Invalid bit count (more than 64 bits at once)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),

    /// Packing header must be in 1..=8
    #[error("invalid packing header {0}: expected 1..=8 meaningful bits")]
    InvalidPackingHeader(u8),
}

/// Transmission frame errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Frame is too short for its header or declared sections
    #[error("frame too short: need at least {required} bytes, got {actual}")]
    FrameTooShort { required: usize, actual: usize },

    /// Frame written by an unknown format version
    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),

    /// A header or metadata field holds an out-of-range value
    #[error("invalid frame field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

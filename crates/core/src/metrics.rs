//! Metrics collection and reporting for a pipeline run.
//!
//! Tracks what each stage did to the message: how well the source coder
//! compressed it, how much redundancy the channel code added, how much
//! noise the channel injected, and how much of it the decoder repaired.
//!
//! # Thread Safety
//!
//! `PipelineMetrics` is plain data, filled in by the single-threaded
//! pipeline driver.

use std::time::{Duration, Instant};

/// Counters and measurements for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Source coding ===
    /// Symbols in the input message
    pub input_symbols: u64,

    /// Distinct symbols in the input message
    pub alphabet_size: u64,

    /// Shannon entropy of the message, bits per symbol
    pub entropy: f64,

    /// Expected code length, bits per symbol
    pub average_code_length: f64,

    /// Bits produced by the entropy coder
    pub compressed_bits: u64,

    // === Channel coding ===
    /// Data bits per block
    pub k: u64,

    /// Codeword bits per block
    pub n: u64,

    /// Codeword blocks sent
    pub blocks: u64,

    /// Bits produced by the channel encoder
    pub encoded_bits: u64,

    /// Size of the serialized transmission frame
    pub frame_bytes: u64,

    // === Channel ===
    /// Bits flipped by the simulator
    pub bits_flipped: u64,

    // === Decoding ===
    /// Blocks with a non-zero syndrome
    pub errors_found: u64,

    /// Blocks corrected back to a codeword
    pub errors_corrected: u64,

    /// Blocks left uncorrectable
    pub blocks_uncorrectable: u64,

    /// Unmatched bits at the end of decompression
    pub trailing_bits: u64,

    /// Decoded message equals the input
    pub message_matched: bool,
}

impl PipelineMetrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_symbols: 0,
            alphabet_size: 0,
            entropy: 0.0,
            average_code_length: 0.0,
            compressed_bits: 0,
            k: 0,
            n: 0,
            blocks: 0,
            encoded_bits: 0,
            frame_bytes: 0,
            bits_flipped: 0,
            errors_found: 0,
            errors_corrected: 0,
            blocks_uncorrectable: 0,
            trailing_bits: 0,
            message_matched: false,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Compressed size relative to 8 bits per symbol.
    ///
    /// Returns 0.0 if nothing was compressed.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_symbols == 0 {
            0.0
        } else {
            self.compressed_bits as f64 / (self.input_symbols * 8) as f64
        }
    }

    /// Entropy over average code length; 1.0 is an optimal code.
    pub fn coding_efficiency(&self) -> f64 {
        if self.average_code_length == 0.0 {
            0.0
        } else {
            self.entropy / self.average_code_length
        }
    }

    /// Channel code rate k/n.
    pub fn code_rate(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.k as f64 / self.n as f64
        }
    }

    /// Flipped bits over encoded bits.
    pub fn bit_error_rate(&self) -> f64 {
        if self.encoded_bits == 0 {
            0.0
        } else {
            self.bits_flipped as f64 / self.encoded_bits as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("=== Source Coding ===");
        println!("Symbols: {} ({} distinct)", self.input_symbols, self.alphabet_size);
        println!("Entropy: {:.4} bits/symbol", self.entropy);
        println!("Average code length: {:.4} bits/symbol", self.average_code_length);
        println!("Efficiency: {:.1}%", self.coding_efficiency() * 100.0);
        println!(
            "Compressed: {} bits ({:.1}% of 8-bit encoding)",
            self.compressed_bits,
            self.compression_ratio() * 100.0
        );
        println!();

        println!("=== Channel Coding ===");
        println!("Code: ({}, {}), rate {:.3}", self.n, self.k, self.code_rate());
        println!("Blocks: {}", self.blocks);
        println!("Encoded: {} bits", self.encoded_bits);
        println!("Frame: {} bytes", self.frame_bytes);
        println!();

        println!("=== Channel ===");
        println!(
            "Bits flipped: {} ({:.3}%)",
            self.bits_flipped,
            self.bit_error_rate() * 100.0
        );
        println!();

        println!("=== Decoding ===");
        println!("Errors found: {}", self.errors_found);
        println!("Errors corrected: {}", self.errors_corrected);
        println!("Uncorrectable blocks: {}", self.blocks_uncorrectable);
        println!("Trailing bits: {}", self.trailing_bits);
        println!();
    }

    /// Print just the final result (pass/fail).
    pub fn print_result(&self) {
        if self.message_matched {
            println!("✓ Message recovered exactly");
            println!(
                "  {} flipped bits, {} blocks corrected",
                self.bits_flipped, self.errors_corrected
            );
        } else if self.blocks_uncorrectable > 0 {
            println!("✗ Message damaged: {} uncorrectable blocks", self.blocks_uncorrectable);
        } else {
            println!("✗ Message damaged: miscorrected blocks (multiple errors in one block)");
        }
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_symbols={}\n\
             alphabet_size={}\n\
             entropy={:.4}\n\
             average_code_length={:.4}\n\
             compressed_bits={}\n\
             k={}\n\
             n={}\n\
             blocks={}\n\
             encoded_bits={}\n\
             frame_bytes={}\n\
             bits_flipped={}\n\
             errors_found={}\n\
             errors_corrected={}\n\
             blocks_uncorrectable={}\n\
             trailing_bits={}\n\
             message_matched={}\n",
            self.duration().as_millis(),
            self.input_symbols,
            self.alphabet_size,
            self.entropy,
            self.average_code_length,
            self.compressed_bits,
            self.k,
            self.n,
            self.blocks,
            self.encoded_bits,
            self.frame_bytes,
            self.bits_flipped,
            self.errors_found,
            self.errors_corrected,
            self.blocks_uncorrectable,
            self.trailing_bits,
            self.message_matched,
        )
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

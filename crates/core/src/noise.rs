//! Binary channel simulator.
//!
//! Flips exactly `round(len · rate)` bits of every sequence passed through
//! it, at distinct positions drawn uniformly without replacement. All
//! randomness comes from a seeded ChaCha8 RNG, so the same seed and inputs
//! give bit-identical corruption.

use crate::error::{NoiseError, Result};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Configuration for the channel simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    /// Fraction of bits to flip, in [0, 1]
    pub rate: f64,

    /// Random seed for determinism
    pub seed: u64,
}

impl NoiseConfig {
    /// A channel that never flips anything.
    pub fn noiseless(seed: u64) -> Self {
        Self { rate: 0.0, seed }
    }

    /// Check the rate is a number in [0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rate) {
            return Err(NoiseError::InvalidRate(self.rate).into());
        }
        Ok(())
    }
}

/// Output of one pass through the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoisyBits {
    pub bits: Vec<bool>,
    /// Flipped positions, ascending and distinct
    pub flipped: Vec<usize>,
}

impl NoisyBits {
    pub fn flipped_count(&self) -> usize {
        self.flipped.len()
    }
}

/// Stateful simulator; successive calls continue the same random stream.
///
/// # Thread Safety
/// Not thread-safe; use one instance per thread.
#[derive(Debug, Clone)]
pub struct ChannelSimulator {
    config: NoiseConfig,
    rng: ChaCha8Rng,
    bits_sent: u64,
    bits_flipped: u64,
}

impl ChannelSimulator {
    /// # Errors
    /// `NoiseError::InvalidRate` if the rate is outside [0, 1].
    pub fn new(config: NoiseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            bits_sent: 0,
            bits_flipped: 0,
        })
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Number of bits this simulator flips in a sequence of `len` bits.
    pub fn flip_count(&self, len: usize) -> usize {
        ((len as f64 * self.config.rate).round() as usize).min(len)
    }

    /// Pass `bits` through the channel.
    pub fn transmit(&mut self, bits: &[bool]) -> NoisyBits {
        let count = self.flip_count(bits.len());
        let mut flipped = index::sample(&mut self.rng, bits.len(), count).into_vec();
        flipped.sort_unstable();

        let bits = flip_positions(bits, &flipped);

        self.bits_sent += bits.len() as u64;
        self.bits_flipped += flipped.len() as u64;
        tracing::debug!(len = bits.len(), flipped = flipped.len(), "applied channel noise");

        NoisyBits { bits, flipped }
    }

    /// Get statistics about simulator behavior.
    pub fn stats(&self) -> NoiseStats {
        NoiseStats {
            bits_sent: self.bits_sent,
            bits_flipped: self.bits_flipped,
        }
    }
}

/// Statistics about simulator behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseStats {
    pub bits_sent: u64,
    pub bits_flipped: u64,
}

impl NoiseStats {
    /// Realized bit error rate.
    pub fn bit_error_rate(&self) -> f64 {
        if self.bits_sent == 0 {
            0.0
        } else {
            self.bits_flipped as f64 / self.bits_sent as f64
        }
    }
}

/// Copy of `bits` with every listed position inverted.
///
/// Out-of-range positions are ignored; a position listed twice flips back.
pub fn flip_positions(bits: &[bool], positions: &[usize]) -> Vec<bool> {
    let mut out = bits.to_vec();
    for &pos in positions {
        if let Some(bit) = out.get_mut(pos) {
            *bit = !*bit;
        }
    }
    out
}

/// One-shot noise: returns the corrupted bits and the number of distinct
/// positions flipped.
pub fn apply_noise(bits: &[bool], rate: f64, seed: u64) -> Result<(Vec<bool>, usize)> {
    let mut channel = ChannelSimulator::new(NoiseConfig { rate, seed })?;
    let noisy = channel.transmit(bits);
    let count = noisy.flipped_count();
    Ok((noisy.bits, count))
}

//! Sample message generation.
//!
//! When no message is given, we generate one with interesting compression
//! characteristics: a skewed letter distribution, so the Shannon-Fano code
//! gives frequent symbols short codes and rare ones long codes.
//!
//! # Design
//!
//! Generated text has:
//! - Words built from an English-like letter distribution
//! - Occasional runs of a repeated letter (highly compressible)
//! - Spaces between words and a final period
//!
//! This makes the compression behavior visible in metrics.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Letters with relative weights, most frequent first.
const LETTERS: [(char, u32); 16] = [
    ('e', 13),
    ('t', 9),
    ('a', 8),
    ('o', 8),
    ('i', 7),
    ('n', 7),
    ('s', 6),
    ('h', 6),
    ('r', 6),
    ('d', 4),
    ('l', 4),
    ('u', 3),
    ('c', 3),
    ('m', 2),
    ('w', 2),
    ('y', 1),
];

/// Generate a sample message of exactly `symbols` characters.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `symbols`: length of the message in characters
pub fn generate_sample_message(seed: u64, symbols: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let total: u32 = LETTERS.iter().map(|&(_, w)| w).sum();
    let mut message = String::with_capacity(symbols);
    let mut count = 0;

    while count < symbols {
        let word_len = rng.gen_range(1..=8);

        // 10% of words are a run of one letter
        if rng.gen_range(0..10) == 0 {
            let letter = pick(&mut rng, total);
            for _ in 0..word_len {
                message.push(letter);
            }
        } else {
            for _ in 0..word_len {
                message.push(pick(&mut rng, total));
            }
        }
        message.push(' ');
        count += word_len + 1;
    }

    let mut message: String = message.chars().take(symbols).collect();
    if symbols > 0 {
        message.pop();
        message.push('.');
    }
    message
}

/// Draw one letter from the weighted alphabet.
fn pick(rng: &mut ChaCha8Rng, total: u32) -> char {
    let mut roll = rng.gen_range(0..total);
    for &(letter, weight) in &LETTERS {
        if roll < weight {
            return letter;
        }
        roll -= weight;
    }
    LETTERS[0].0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_message() {
        let message = generate_sample_message(42, 200);
        assert_eq!(message.chars().count(), 200);
        assert!(message.ends_with('.'));
    }

    #[test]
    fn test_determinism() {
        let a = generate_sample_message(12345, 500);
        let b = generate_sample_message(12345, 500);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let a = generate_sample_message(1, 200);
        let b = generate_sample_message(2, 200);
        assert_ne!(a, b);
    }

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 2, 100, 1000] {
            let message = generate_sample_message(999, size);
            assert_eq!(message.chars().count(), size);
        }
    }

    #[test]
    fn test_alphabet() {
        let message = generate_sample_message(7, 1000);
        assert!(message
            .chars()
            .all(|c| c == ' ' || c == '.' || LETTERS.iter().any(|&(l, _)| l == c)));
    }
}

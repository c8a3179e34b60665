//! Configuration for the codec-sim application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! All defaults are printed so runs are reproducible.

use codec_sim_core::channel_encoder::{FramingMode, PaddingPolicy};
use codec_sim_core::coset::MAX_COSET_K;
use codec_sim_core::gf2::MAX_COLS;
use codec_sim_core::linear_code::Construction;
use codec_sim_core::noise::NoiseConfig;
use codec_sim_core::pipeline::{PipelineConfig, TrailingBitsPolicy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

/// Code dimensions drawn from when neither --k nor --n is given.
const HAMMING_SIZES: [(usize, usize); 4] = [(4, 7), (11, 15), (26, 31), (57, 63)];

/// Symbols in a generated sample message.
const SAMPLE_SYMBOLS: usize = 200;

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Input ===
    /// Message given on the command line
    pub message: Option<String>,

    /// Input file path (None with no message = generate sample)
    pub input_file: Option<PathBuf>,

    /// Run seed; every random default derives from it
    pub seed: u64,

    // === Pipeline ===
    pub pipeline: PipelineConfig,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,

    /// Log per-stage events at debug level
    pub verbose: bool,
}

/// Fetch the value following a flag.
fn value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires {}", flag, what))
}

/// Smallest parity count r with `2^r - 1 >= k + r`.
fn min_redundancy(k: usize) -> usize {
    (2..64).find(|&r| (1usize << r) - 1 >= k + r).unwrap_or(64)
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// If no arguments provided, generates randomized defaults using a time-based seed.
    /// If --seed is provided, uses that seed for all randomness (fully deterministic).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut message: Option<String> = None;
        let mut input_file: Option<PathBuf> = None;
        let mut seed: Option<u64> = None;
        let mut k: Option<usize> = None;
        let mut n: Option<usize> = None;
        let mut noise_rate: Option<f64> = None;
        let mut framing = FramingMode::WholeMessage;
        let mut random_padding = false;
        let mut construction = Construction::Canonical;
        let mut trailing_bits = TrailingBitsPolicy::Truncate;
        let mut print_config = false;
        let mut print_metrics = true;
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--message" | "-m" => {
                    message = Some(value(args, &mut i, "--message", "text")?.to_string());
                }
                "--in" => {
                    input_file = Some(PathBuf::from(value(args, &mut i, "--in", "a path")?));
                }
                "--seed" => {
                    let v = value(args, &mut i, "--seed", "a number")?;
                    seed = Some(v.parse().map_err(|_| format!("invalid seed: {}", v))?);
                }
                "--k" => {
                    let v = value(args, &mut i, "--k", "a number")?;
                    k = Some(v.parse().map_err(|_| format!("invalid k: {}", v))?);
                }
                "--n" => {
                    let v = value(args, &mut i, "--n", "a number")?;
                    n = Some(v.parse().map_err(|_| format!("invalid n: {}", v))?);
                }
                "--noise" => {
                    let v = value(args, &mut i, "--noise", "a rate")?;
                    let rate: f64 = v.parse().map_err(|_| format!("invalid noise rate: {}", v))?;
                    if !(0.0..=1.0).contains(&rate) {
                        return Err(format!("noise rate must be in [0, 1], got {}", rate));
                    }
                    noise_rate = Some(rate);
                }
                "--no-noise" => {
                    noise_rate = Some(0.0);
                }
                "--framing" => {
                    framing = match value(args, &mut i, "--framing", "whole or block")? {
                        "whole" => FramingMode::WholeMessage,
                        "block" => FramingMode::PerBlock,
                        other => return Err(format!("invalid framing: {}", other)),
                    };
                }
                "--padding" => {
                    random_padding = match value(args, &mut i, "--padding", "zero or random")? {
                        "zero" => false,
                        "random" => true,
                        other => return Err(format!("invalid padding: {}", other)),
                    };
                }
                "--random-parity" => {
                    construction = Construction::RandomParity;
                }
                "--strict" => {
                    trailing_bits = TrailingBitsPolicy::Reject;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--verbose" | "-v" => {
                    verbose = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        if message.is_some() && input_file.is_some() {
            return Err("--message and --in are mutually exclusive".to_string());
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        // Generate defaults using seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for (flag, dim) in [("--k", k), ("--n", n)] {
            if let Some(v) = dim {
                if v == 0 || v > MAX_COLS {
                    return Err(format!("{} must be in 1..={}, got {}", flag, MAX_COLS, v));
                }
            }
        }

        let (k, n) = match (k, n) {
            (Some(k), Some(n)) => (k, n),
            (Some(k), None) => (k, k + min_redundancy(k)),
            (None, Some(n)) => {
                let r = (2..n).find(|&r| (1usize << r) - 1 >= n).unwrap_or(n);
                (n - r, n)
            }
            (None, None) => {
                // Random parity decodes through a coset table, which caps k
                let sizes: Vec<(usize, usize)> = HAMMING_SIZES
                    .iter()
                    .copied()
                    .filter(|&(k, _)| construction == Construction::Canonical || k <= MAX_COSET_K)
                    .collect();
                sizes[rng.gen_range(0..sizes.len())]
            }
        };

        if construction == Construction::RandomParity && k > MAX_COSET_K {
            return Err(format!(
                "--random-parity decodes through a coset table and needs k <= {}, got k={}",
                MAX_COSET_K, k
            ));
        }

        let rate = noise_rate.unwrap_or_else(|| {
            // Bias toward low error rates
            let r: f64 = rng.gen();
            r * r * 0.02
        });

        let padding = if random_padding {
            PaddingPolicy::Random { seed }
        } else {
            PaddingPolicy::Zero
        };

        Ok(Config {
            message,
            input_file,
            seed,
            pipeline: PipelineConfig {
                k,
                n,
                construction,
                code_seed: seed,
                framing,
                padding,
                noise: NoiseConfig { rate, seed },
                trailing_bits,
            },
            print_config,
            print_metrics,
            verbose,
        })
    }

    /// Number of symbols to generate when no message is supplied.
    pub fn sample_symbols(&self) -> usize {
        SAMPLE_SYMBOLS
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        let source = match (&self.message, &self.input_file) {
            (Some(_), _) => "(command line)".to_string(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => "(generate sample)".to_string(),
        };
        let p = &self.pipeline;

        println!("=== Configuration ===");
        println!("Message: {}", source);
        println!("Seed: {}", self.seed);
        println!();
        println!("=== Channel Code ===");
        println!("Code: ({}, {})", p.n, p.k);
        println!("Construction: {:?}", p.construction);
        println!("Framing: {:?}", p.framing);
        println!("Padding: {:?}", p.padding);
        println!();
        println!("=== Channel ===");
        println!("Noise rate: {:.3}%", p.noise.rate * 100.0);
        println!("Trailing bits: {:?}", p.trailing_bits);
        println!();
    }
}

fn print_help() {
    println!("codec-sim: Shannon-Fano compression over a simulated noisy channel");
    println!();
    println!("USAGE:");
    println!("    codec-sim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --message, -m <TEXT>    Message to send (default: generate sample)");
    println!("    --in <PATH>             Read the message from a UTF-8 file");
    println!("    --seed <N>              Random seed for determinism");
    println!();
    println!("    --k <N>                 Data bits per block");
    println!("    --n <N>                 Codeword bits per block (default: random Hamming size)");
    println!("    --random-parity         Random parity matrix, decoded via coset table");
    println!("    --framing <whole|block> Length header per message or per block (default: whole)");
    println!("    --padding <zero|random> Fill bit content (default: zero)");
    println!();
    println!("    --noise <RATE>          Bit flip rate 0.0-1.0 (default: random 0-0.02)");
    println!("    --no-noise              Disable bit flips (same as --noise 0)");
    println!("    --strict                Fail on trailing bits instead of truncating");
    println!();
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print metrics summary");
    println!("    --verbose, -v           Log pipeline stages (or set RUST_LOG)");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    codec-sim                                   # Run with random defaults");
    println!("    codec-sim --seed 42                         # Deterministic run");
    println!("    codec-sim -m \"hello world\" --no-noise       # Noiseless round trip");
    println!("    codec-sim --k 11 --n 15 --noise 0.01        # Hamming(15,11), 1% flips");
    println!();
}

//! codec-sim: run a message through source coding, channel coding and a
//! noisy channel, then report what came out the other end.

mod config;
mod input_gen;

use codec_sim_core::bits::format_bits;
use codec_sim_core::pipeline::{self, PipelineReport};
use config::Config;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("run with --help for usage");
            std::process::exit(2);
        }
    };

    init_logging(config.verbose);

    if let Err(e) = run(&config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Install the fmt subscriber; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.print_config {
        config.print();
    }

    let message = match (&config.message, &config.input_file) {
        (Some(message), _) => message.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => input_gen::generate_sample_message(config.seed, config.sample_symbols()),
    };

    tracing::info!(symbols = message.chars().count(), seed = config.seed, "starting run");

    let report = pipeline::run(&message, &config.pipeline)?;

    print_tables(&report);
    println!("=== Message ===");
    println!("Sent:     {:?}", message);
    println!("Received: {:?}", report.decoded);
    println!();

    if config.print_metrics {
        report.metrics.print_summary();
    }
    report.metrics.print_result();

    Ok(())
}

fn print_tables(report: &PipelineReport) {
    println!("=== Frequency Table ===");
    for entry in report.frequencies.entries() {
        println!("{:?}  {:>6}  {:.4}", entry.symbol, entry.count, entry.probability);
    }
    println!("Entropy: {:.4} bits/symbol", report.frequencies.entropy());
    println!();

    println!("=== Code Table ===");
    for (symbol, code) in report.code_table.entries() {
        println!("{:?}  {}", symbol, format_bits(code));
    }
    println!();
}

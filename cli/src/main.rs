//! Shabda CLI - command-line interface for Sanskrit sandhi splitting and
//! grapheme-level BPE tokenization.
//!
//! This is the main entry point for the `shabda` command-line tool.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, PreprocessCommand, TrainCommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "shabda")]
#[command(about = "Sandhi-aware subword tokenizer for Sanskrit", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (-q, -qq)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand raw verses into sandhi-split training lines
    Preprocess(PreprocessCommand),
    /// Train a BPE model from preprocessed lines
    Train(TrainCommand),
    /// Encode text to token IDs
    Encode(EncodeCommand),
    /// Decode token IDs back to text
    Decode(DecodeCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Preprocess(cmd) => commands::preprocess::run(cmd)?,
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

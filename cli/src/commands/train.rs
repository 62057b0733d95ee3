//! Train command implementation.

use clap::Parser;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Preprocessed training lines
    pub input: PathBuf,

    /// Where to write the model JSON
    pub output: PathBuf,

    /// Target symbol set size
    #[arg(long, default_value_t = DEFAULT_TARGET_VOCAB)]
    pub vocab_size: usize,

    /// Stop once the best pair is rarer than this
    #[arg(long, default_value_t = DEFAULT_MIN_FREQUENCY)]
    pub min_frequency: u64,

    /// Hard cap on merges (default: 10 x vocab size)
    #[arg(long)]
    pub max_merges: Option<usize>,

    /// Count pairs on a single thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Never merge special tokens with the marker
    #[arg(long, default_value_t = false)]
    pub freeze_specials: bool,
}

use anyhow::{Context, Result as AnyhowResult};
use log::info;
use shabda_tokenizer::ModelSaver;
use shabda_training::training::trainer::{DEFAULT_MIN_FREQUENCY, DEFAULT_TARGET_VOCAB};
use shabda_training::{BpeVocabTrainer, TrainingConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let start = Instant::now();
    let data = fs::read_to_string(&cmd.input)
        .with_context(|| format!("reading {}", cmd.input.display()))?;
    info!("Read {} bytes in {:.2}s", data.len(), start.elapsed().as_secs_f64());

    let config = TrainingConfig::default()
        .with_target_vocab_size(cmd.vocab_size)
        .with_min_pair_frequency(cmd.min_frequency)
        .with_max_merges(cmd.max_merges)
        .with_parallel(!cmd.sequential)
        .with_frozen_special_tokens(cmd.freeze_specials);

    let start = Instant::now();
    let output = BpeVocabTrainer::new(config).train(data.lines())?;
    info!("Training completed in {:.2}s", start.elapsed().as_secs_f64());

    ModelSaver::new(&output.model).save(&cmd.output)?;

    let stats = &output.stats;
    println!("Stopped: {}", stats.stop_reason);
    println!("Merges learned: {}", stats.merges);
    println!(
        "Symbols: {} -> {} ({} word types)",
        stats.initial_symbols, stats.final_symbols, stats.word_types
    );
    println!("Vocabulary size: {}", output.model.vocab().len());
    println!("Model saved to {}", cmd.output.display());

    Ok(())
}

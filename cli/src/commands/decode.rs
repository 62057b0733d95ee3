//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained model JSON
    #[arg(short, long)]
    pub model: PathBuf,

    /// Token IDs to decode (comma- or space-separated)
    #[arg(short, long)]
    pub ids: String,
}

use anyhow::{Context, Result as AnyhowResult};
use shabda_tokenizer::BpeTokenizer;
use std::path::PathBuf;

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = BpeTokenizer::load(&cmd.model)?;

    let ids: Vec<u32> = cmd
        .ids
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().with_context(|| format!("invalid token id {:?}", s)))
        .collect::<AnyhowResult<Vec<_>>>()?;

    println!("{}", tokenizer.decode(&ids));

    Ok(())
}

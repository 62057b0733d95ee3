//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained model JSON
    #[arg(short, long)]
    pub model: PathBuf,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Fail on symbols missing from the vocabulary instead of using <UNK>
    #[arg(long, default_value_t = false)]
    pub reject_unknown: bool,

    /// Print symbols per word instead of ids
    #[arg(long, default_value_t = false)]
    pub symbols: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

use anyhow::Result as AnyhowResult;
use shabda_tokenizer::{BpeTokenizer, ModelLoader, UnknownPolicy};
use std::io::Read;
use std::path::PathBuf;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let policy = if cmd.reject_unknown {
        UnknownPolicy::Reject
    } else {
        UnknownPolicy::Substitute
    };
    let mut tokenizer = BpeTokenizer::builder()
        .model(ModelLoader::load(&cmd.model)?)
        .unknown_policy(policy)
        .build()?;

    // Read input text (from stdin if "-")
    let input_text = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.input
    };

    let output = if cmd.symbols {
        tokenizer
            .encode_symbols(&input_text)
            .iter()
            .map(|word| {
                word.iter()
                    .map(|symbol| symbol.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" | ")
    } else {
        let ids = tokenizer.encode(&input_text)?;
        ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" ")
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded to {}", path.display());
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}

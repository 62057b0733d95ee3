//! Preprocess command implementation.

use clap::Parser;

/// Preprocess command arguments.
#[derive(Parser)]
pub struct PreprocessCommand {
    /// Raw verses, one per line
    pub input: PathBuf,

    /// Where to write the expanded lines
    pub output: PathBuf,

    /// Cap on split combinations per verse segment
    #[arg(long)]
    pub max_combinations: Option<usize>,

    /// Separator placed between the halves of a split word
    #[arg(long, default_value = " ")]
    pub separator: String,
}

use anyhow::{Context, Result as AnyhowResult};
use log::info;
use shabda_sandhi::{PreprocessConfig, VersePreprocessor};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

pub fn run(cmd: PreprocessCommand) -> AnyhowResult<()> {
    let config = PreprocessConfig::default()
        .with_max_combinations(cmd.max_combinations)
        .with_separator(cmd.separator);
    let preprocessor = VersePreprocessor::from_config(&config);

    let reader = BufReader::new(
        File::open(&cmd.input).with_context(|| format!("opening {}", cmd.input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(&cmd.output).with_context(|| format!("creating {}", cmd.output.display()))?,
    );

    let start = Instant::now();
    let mut verses = 0usize;
    let mut written = 0usize;

    for line in reader.lines() {
        let line = line.with_context(|| format!("reading {}", cmd.input.display()))?;
        verses += 1;
        for expanded in preprocessor.process_line(&line) {
            writeln!(writer, "{}", expanded)?;
            written += 1;
        }
    }
    writer.flush()?;

    info!(
        "Expanded {} verses into {} lines in {:.2}s",
        verses,
        written,
        start.elapsed().as_secs_f64()
    );
    println!("Wrote {} lines to {}", written, cmd.output.display());

    Ok(())
}

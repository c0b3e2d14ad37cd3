// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line front end: read a tag registry and a hit stream, write the
//! hits belonging to confirmed runs.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::error;

use tagfilter::core::config::FilterParams;
use tagfilter::core::error::TagFilterResult;
use tagfilter::core::output::{CsvSink, JsonSink, RunSink, CSV_HEADER};
use tagfilter::core::registry::TagRegistry;
use tagfilter::core::run::StreamDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Filter coded VHF tag detections down to runs of confirmed tags.
#[derive(Debug, Parser)]
#[command(name = "tagfilter", version, about)]
struct Cli {
    /// Tag registry CSV listing the deployed tags and their burst intervals.
    tag_db: PathBuf,

    /// Hit stream to filter; reads standard input when omitted.
    hits: Option<PathBuf>,

    /// Allowed timing slop between consecutive bursts, in milliseconds.
    #[arg(long, default_value_t = 10.0)]
    burst_slop: f64,

    /// Widening of the slop window per skipped burst, in milliseconds.
    #[arg(long, default_value_t = 1.0)]
    burst_slop_expansion: f64,

    /// Hits required before a run's tag identity is confirmed.
    #[arg(long, default_value_t = 2)]
    hits_to_confirm: u32,

    /// Consecutive undetected bursts tolerated before a run ends.
    #[arg(long, default_value_t = 60)]
    max_skipped_bursts: u32,

    /// Suppress the CSV column header.
    #[arg(long)]
    no_header: bool,

    /// Print the CSV column header and exit.
    #[arg(long)]
    header_only: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Fail instead of warning when registered tags cannot be told apart.
    #[arg(long)]
    fail_on_ambiguity: bool,
}

fn run(cli: &Cli) -> TagFilterResult<()> {
    let params = FilterParams {
        max_skipped_bursts: cli.max_skipped_bursts,
        hits_to_confirm: cli.hits_to_confirm,
        fail_on_ambiguity: cli.fail_on_ambiguity,
        ..FilterParams::default()
    }
    .with_burst_slop_ms(cli.burst_slop)
    .with_slop_expansion_ms(cli.burst_slop_expansion);

    let registry = TagRegistry::from_path(&cli.tag_db)?;
    let mut driver = StreamDriver::new(&registry, &params)?;

    let stdout = io::stdout().lock();
    let mut sink: Box<dyn RunSink> = match cli.format {
        OutputFormat::Csv => Box::new(CsvSink::new(stdout, !cli.no_header)?),
        OutputFormat::Json => Box::new(JsonSink::new(stdout)),
    };

    match &cli.hits {
        Some(path) => driver.run(BufReader::new(File::open(path)?), sink.as_mut())?,
        None => driver.run(io::stdin().lock(), sink.as_mut())?,
    }
    driver.finish(sink.as_mut())?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.header_only {
        println!("{CSV_HEADER}");
        return ExitCode::SUCCESS;
    }
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, info};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod error;
mod logfile;
mod model;
mod render;
mod report;

use render::OutputFormat;
use report::{IncompletePolicy, Reporter};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "shuffle-timing")]
#[command(about = "Per-block and per-reducer shuffle timings from transfer logs", long_about = None)]
struct Cli {
    /// Log files to parse, in order.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Total number of reducers.
    #[arg(short = 'n', value_name = "NUM_REDUCERS")]
    num_reducers: usize,

    /// Restrict shuffle stats to this reducer and print per-block detail.
    /// Omit it, or pass -1, to report every reducer.
    #[arg(
        short = 'r',
        value_name = "REDUCER_ID",
        allow_negative_numbers = true,
        value_parser = parse_reducer_id
    )]
    reducer_id: Option<ReducerSelection>,

    /// Shuffle whose block ids are reconstructed.
    #[arg(long, default_value_t = 0)]
    shuffle_id: usize,

    /// Print a column header before per-block lines.
    #[arg(long)]
    header: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Warn and skip blocks whose message lifecycle is incomplete instead of failing.
    #[arg(long)]
    skip_incomplete: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReducerSelection {
    All,
    One(usize),
}

fn parse_reducer_id(s: &str) -> std::result::Result<ReducerSelection, String> {
    if s.trim() == "-1" {
        return Ok(ReducerSelection::All);
    }
    s.trim()
        .parse::<usize>()
        .map(ReducerSelection::One)
        .map_err(|_| format!("expected a reducer index or -1 for all reducers, got {:?}", s))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 1) Open every file, then parse them in order.
    let sources = logfile::open_log_files(&cli.files)?;
    let tables = logfile::parse_log_files(sources)?;
    info!(
        "parsed {} file(s): {} messages, {} blocks, {} fetched blocks",
        cli.files.len(),
        tables.message_count(),
        tables.block_count(),
        tables.fetched_block_count()
    );

    // 2) Report.
    let policy = if cli.skip_incomplete {
        IncompletePolicy::Skip
    } else {
        IncompletePolicy::Fail
    };
    let reporter = Reporter::new(&tables, policy);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.reducer_id.unwrap_or(ReducerSelection::All) {
        ReducerSelection::One(reducer_id) => {
            if cli.header {
                render::write_header(&mut out, cli.format)?;
            }
            let report = reporter.shuffle_stats(reducer_id, cli.num_reducers, cli.shuffle_id, true)?;
            render::write_report(&mut out, cli.format, &report)?;
        }
        ReducerSelection::All => {
            for reducer_id in 0..cli.num_reducers {
                let report =
                    reporter.shuffle_stats(reducer_id, cli.num_reducers, cli.shuffle_id, false)?;
                render::write_report(&mut out, cli.format, &report)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reducer_id_accepts_all_sentinel() {
        assert_eq!(parse_reducer_id("-1"), Ok(ReducerSelection::All));
        assert_eq!(parse_reducer_id("3"), Ok(ReducerSelection::One(3)));
        assert!(parse_reducer_id("-2").is_err());
        assert!(parse_reducer_id("two").is_err());
    }

    #[test]
    fn cli_parses_negative_reducer() {
        let cli = Cli::try_parse_from(["shuffle-timing", "a.log", "-n", "4", "-r", "-1"]).unwrap();
        assert_eq!(cli.reducer_id, Some(ReducerSelection::All));
        assert_eq!(cli.num_reducers, 4);
    }
}

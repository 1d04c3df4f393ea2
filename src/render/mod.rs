//! Output rendering for shuffle reports.

pub mod json;
pub mod text;

use crate::report::ShuffleReport;
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated block lines and space-separated reducer lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Column header for block lines. JSON records are self-describing, so only
/// the text format has one.
pub fn write_header<W: Write>(out: &mut W, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Text {
        writeln!(out, "{}", text::BLOCK_HEADER)?;
    }
    Ok(())
}

/// Block lines first (if any), then the reducer summary.
pub fn write_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &ShuffleReport,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for block in &report.blocks {
                writeln!(out, "{}", text::block_line(block))?;
            }
            writeln!(out, "{}", text::reducer_line(&report.reducer))?;
        }
        OutputFormat::Json => {
            for block in &report.blocks {
                serde_json::to_writer(&mut *out, &json::Record::from(block))?;
                writeln!(out)?;
            }
            serde_json::to_writer(&mut *out, &json::Record::from(&report.reducer))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

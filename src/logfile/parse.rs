use crate::logfile::classify::Classifier;
use crate::logfile::timestamp::timestamp_from_line;
use crate::model::ShuffleTables;
use anyhow::Context;
use log::{debug, trace};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// An opened log file waiting to be parsed. Dropping it closes the file.
#[derive(Debug)]
pub struct LogSource {
    path: PathBuf,
    reader: BufReader<File>,
}

impl LogSource {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Per-file counters, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub matched_lines: usize,
    pub events: usize,
}

/// Open every path before any parsing so an unreadable file fails the run
/// up front.
pub fn open_log_files(paths: &[PathBuf]) -> anyhow::Result<Vec<LogSource>> {
    paths
        .iter()
        .map(|path| {
            let file = File::open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Ok(LogSource {
                path: path.clone(),
                reader: BufReader::new(file),
            })
        })
        .collect()
}

/// Parse every source in order into one set of tables.
pub fn parse_log_files(sources: Vec<LogSource>) -> anyhow::Result<ShuffleTables> {
    let classifier = Classifier::new()?;
    let mut tables = ShuffleTables::new();

    for source in sources {
        let name = source.path().display().to_string();
        let stats = parse_lines(source.reader, &name, &classifier, &mut tables)?;
        debug!(
            "{}: {} lines, {} matched, {} events",
            name, stats.lines, stats.matched_lines, stats.events
        );
    }

    Ok(tables)
}

/// Classify each line of `reader` and record its events.
///
/// Expected line layout (first two fields are the timestamp):
/// 13/06/12 17:04:05.026490 INFO ConnectionManager: Handling buffer [Message id = 42, size = 1024]
///
/// Lines that match no pattern are skipped without looking at their timestamp.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_lines<R: BufRead>(
    mut reader: R,
    name: &str,
    classifier: &Classifier,
    tables: &mut ShuffleTables,
) -> anyhow::Result<ParseStats> {
    let mut stats = ParseStats::default();
    let mut buf = Vec::new();

    loop {
        let lno = stats.lines + 1;
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {}:{}", name, lno))?;
        if read == 0 {
            break;
        }
        stats.lines += 1;

        // Logs are not guaranteed to be UTF-8; bad bytes become U+FFFD.
        let raw = buf
            .strip_suffix(b"\n")
            .map(|b| b.strip_suffix(b"\r").unwrap_or(b))
            .unwrap_or(&buf[..]);
        let line = String::from_utf8_lossy(raw);

        let events = classifier
            .classify(&line)
            .with_context(|| format!("log parse error at {}:{}", name, lno))?;
        if events.is_empty() {
            continue;
        }

        let at = timestamp_from_line(&line)
            .with_context(|| format!("log parse error at {}:{}", name, lno))?;

        stats.matched_lines += 1;
        stats.events += events.len();
        for event in events {
            trace!("{}:{} {:?}", name, lno, event.pattern());
            tables.record(event, at);
        }
    }

    Ok(stats)
}

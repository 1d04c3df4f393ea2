//! Shuffle log files: line classification plus timestamps.

pub mod classify;
pub mod parse;
pub mod timestamp;

pub use classify::LineEvent;
pub use parse::{open_log_files, parse_log_files};
pub use timestamp::{Timestamp, format_seconds, format_timestamp, seconds_between};

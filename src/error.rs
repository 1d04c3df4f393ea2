//! Typed failures raised while classifying lines or correlating events.
//!
//! The binary carries these inside `anyhow::Error`; tests recover them with
//! `downcast_ref::<TimingError>()`.

use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimingError {
    #[error("line does not start with a date and a time field: {line:?}")]
    MissingTimestamp { line: String },

    #[error("malformed timestamp {text:?} (expected DD/MM/YY HH:MM:SS.ffffff)")]
    Timestamp {
        text: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("malformed fetch duration {text:?} (expected milliseconds)")]
    Duration {
        text: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("missing correlation data: no {table} recorded for {key}")]
    MissingCorrelation { table: &'static str, key: String },
}

impl TimingError {
    pub fn missing(table: &'static str, key: &str) -> Self {
        TimingError::MissingCorrelation {
            table,
            key: key.to_string(),
        }
    }

    pub fn is_missing_correlation(&self) -> bool {
        matches!(self, TimingError::MissingCorrelation { .. })
    }
}

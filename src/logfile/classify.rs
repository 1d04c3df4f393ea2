//! Line classification for shuffle transfer logs.
//!
//! Seven independent patterns are tried against every line, always in the order
//! of [`LinePattern::ALL`]. Patterns overlap on purpose (an ack-sent line can also
//! look like a request-sent line), so one line may yield several events.
//!
//! Example lines:
//! 13/06/12 17:04:05.026490 INFO ConnectionManager: Blocks in message 42 are shuffle_0_1_3,shuffle_0_2_3
//! 13/06/12 17:04:05.031002 INFO ConnectionManager: Finished sending [Message id = 42, size = 1024]
//! 13/06/12 17:04:05.180355 INFO BlockFetcherIterator: Got remote block shuffle_0_1_3 size 512 after  154ms

use crate::error::TimingError;
use regex::{Captures, Regex};

/// The recognized line shapes, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinePattern {
    Begin,
    Send,
    Receive,
    AckBegin,
    AckSent,
    Reply,
    GotRemoteBlock,
}

impl LinePattern {
    pub const ALL: [LinePattern; 7] = [
        LinePattern::Begin,
        LinePattern::Send,
        LinePattern::Receive,
        LinePattern::AckBegin,
        LinePattern::AckSent,
        LinePattern::Reply,
        LinePattern::GotRemoteBlock,
    ];

    fn regex_source(self) -> &'static str {
        match self {
            LinePattern::Begin => r"Blocks\sin\smessage\s(.*)\sare\s(.*)",
            // `[^a]id` keeps ack ids (`aid = ...`) out of the request patterns.
            LinePattern::Send => r"Finished\ssending.*[^a]id\s=\s(.*),\ssize",
            LinePattern::Receive => r"Handling\sbuffer.*[^a]id\s=\s(.*),\ssize",
            LinePattern::AckBegin => r"Response\sto.*aid\s=\s(.*),\sid",
            LinePattern::AckSent => r"Finished\ssending.*aid\s=\s(.*),\sid",
            LinePattern::Reply => r"Handling\sack\smessage.*aid\s=\s(.*),\sid",
            LinePattern::GotRemoteBlock => r"Got\sremote\sblock\s(.*)\ssize.*after\s\s(.*)ms",
        }
    }

    /// Build the event for a line this pattern matched.
    fn extract(self, caps: &Captures<'_>) -> Result<LineEvent, TimingError> {
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let event = match self {
            LinePattern::Begin => LineEvent::Begin {
                msg_id: group(1).to_string(),
                blocks: group(2).split(',').map(str::to_string).collect(),
            },
            LinePattern::Send => LineEvent::Send {
                msg_id: group(1).to_string(),
            },
            LinePattern::Receive => LineEvent::Receive {
                msg_id: group(1).to_string(),
            },
            LinePattern::AckBegin => LineEvent::AckBegin {
                msg_id: group(1).to_string(),
            },
            LinePattern::AckSent => LineEvent::AckSent {
                msg_id: group(1).to_string(),
            },
            LinePattern::Reply => LineEvent::Reply {
                msg_id: group(1).to_string(),
            },
            LinePattern::GotRemoteBlock => {
                let ms_text = group(2).trim();
                let ms: f64 = ms_text.parse().map_err(|source| TimingError::Duration {
                    text: ms_text.to_string(),
                    source,
                })?;
                LineEvent::GotRemoteBlock {
                    block_id: group(1).to_string(),
                    wall_secs: ms / 1000.0,
                }
            }
        };
        Ok(event)
    }
}

/// One recognized fact extracted from a line. The line's timestamp is attached
/// separately when the event is recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    Begin { msg_id: String, blocks: Vec<String> },
    Send { msg_id: String },
    Receive { msg_id: String },
    AckBegin { msg_id: String },
    AckSent { msg_id: String },
    Reply { msg_id: String },
    GotRemoteBlock { block_id: String, wall_secs: f64 },
}

impl LineEvent {
    pub fn pattern(&self) -> LinePattern {
        match self {
            LineEvent::Begin { .. } => LinePattern::Begin,
            LineEvent::Send { .. } => LinePattern::Send,
            LineEvent::Receive { .. } => LinePattern::Receive,
            LineEvent::AckBegin { .. } => LinePattern::AckBegin,
            LineEvent::AckSent { .. } => LinePattern::AckSent,
            LineEvent::Reply { .. } => LinePattern::Reply,
            LineEvent::GotRemoteBlock { .. } => LinePattern::GotRemoteBlock,
        }
    }
}

/// Compiled pattern set. Build once per run.
#[derive(Debug)]
pub struct Classifier {
    patterns: Vec<(LinePattern, Regex)>,
}

impl Classifier {
    pub fn new() -> anyhow::Result<Self> {
        let mut patterns = Vec::with_capacity(LinePattern::ALL.len());
        for pattern in LinePattern::ALL {
            patterns.push((pattern, Regex::new(pattern.regex_source())?));
        }
        Ok(Self { patterns })
    }

    /// Every event `line` carries, in pattern order. Empty means no match.
    pub fn classify(&self, line: &str) -> Result<Vec<LineEvent>, TimingError> {
        let mut events = Vec::new();
        for (pattern, re) in &self.patterns {
            if let Some(caps) = re.captures(line) {
                events.push(pattern.extract(&caps)?);
            }
        }
        Ok(events)
    }
}

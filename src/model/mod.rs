//! Correlation tables: every timestamp the logs reported, keyed by message id
//! or block id.

pub mod block_id;

pub use block_id::ShuffleBlockId;

use crate::error::TimingError;
use crate::logfile::{LineEvent, Timestamp};
use std::collections::BTreeMap;

/// Message-level events, one table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageEvent {
    Begin,
    Send,
    Receive,
    AckBegin,
    AckEnd,
    Reply,
}

impl MessageEvent {
    pub fn table_name(self) -> &'static str {
        match self {
            MessageEvent::Begin => "message begin time",
            MessageEvent::Send => "message send time",
            MessageEvent::Receive => "message receive time",
            MessageEvent::AckBegin => "ack begin time",
            MessageEvent::AckEnd => "ack end time",
            MessageEvent::Reply => "reply time",
        }
    }
}

/// All state for one run. Populated by [`ShuffleTables::record`], read by the
/// reporter through `Option`-returning accessors.
#[derive(Debug, Default)]
pub struct ShuffleTables {
    block_message: BTreeMap<String, String>,
    message_blocks: BTreeMap<String, Vec<String>>,

    begin: BTreeMap<String, Timestamp>,
    send: BTreeMap<String, Timestamp>,
    receive: BTreeMap<String, Timestamp>,
    ack_begin: BTreeMap<String, Timestamp>,
    ack_end: BTreeMap<String, Timestamp>,
    reply: BTreeMap<String, Timestamp>,

    block_finish: BTreeMap<String, Timestamp>,
    block_wall_secs: BTreeMap<String, f64>,
}

impl ShuffleTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one classified event stamped with its line's timestamp.
    /// Single-valued tables keep the last write.
    pub fn record(&mut self, event: LineEvent, at: Timestamp) {
        match event {
            LineEvent::Begin { msg_id, blocks } => {
                for block in &blocks {
                    self.block_message.insert(block.clone(), msg_id.clone());
                }
                self.message_blocks
                    .entry(msg_id.clone())
                    .or_default()
                    .extend(blocks);
                self.begin.insert(msg_id, at);
            }
            LineEvent::Send { msg_id } => {
                self.send.insert(msg_id, at);
            }
            LineEvent::Receive { msg_id } => {
                self.receive.insert(msg_id, at);
            }
            LineEvent::AckBegin { msg_id } => {
                self.ack_begin.insert(msg_id, at);
            }
            LineEvent::AckSent { msg_id } => {
                self.ack_end.insert(msg_id, at);
            }
            LineEvent::Reply { msg_id } => {
                self.reply.insert(msg_id, at);
            }
            LineEvent::GotRemoteBlock {
                block_id,
                wall_secs,
            } => {
                self.block_finish.insert(block_id.clone(), at);
                self.block_wall_secs.insert(block_id, wall_secs);
            }
        }
    }

    pub fn message_of(&self, block_id: &str) -> Option<&str> {
        self.block_message.get(block_id).map(String::as_str)
    }

    pub fn blocks_of(&self, msg_id: &str) -> Option<&[String]> {
        self.message_blocks.get(msg_id).map(Vec::as_slice)
    }

    fn message_table(&self, event: MessageEvent) -> &BTreeMap<String, Timestamp> {
        match event {
            MessageEvent::Begin => &self.begin,
            MessageEvent::Send => &self.send,
            MessageEvent::Receive => &self.receive,
            MessageEvent::AckBegin => &self.ack_begin,
            MessageEvent::AckEnd => &self.ack_end,
            MessageEvent::Reply => &self.reply,
        }
    }

    pub fn message_time(&self, event: MessageEvent, msg_id: &str) -> Option<Timestamp> {
        self.message_table(event).get(msg_id).copied()
    }

    /// Like [`Self::message_time`], but absence is a data-integrity failure.
    pub fn require_message_time(
        &self,
        event: MessageEvent,
        msg_id: &str,
    ) -> Result<Timestamp, TimingError> {
        self.message_time(event, msg_id)
            .ok_or_else(|| TimingError::missing(event.table_name(), msg_id))
    }

    pub fn block_finish_time(&self, block_id: &str) -> Option<Timestamp> {
        self.block_finish.get(block_id).copied()
    }

    pub fn block_wall_secs(&self, block_id: &str) -> Option<f64> {
        self.block_wall_secs.get(block_id).copied()
    }

    pub fn message_count(&self) -> usize {
        self.message_blocks.len()
    }

    pub fn block_count(&self) -> usize {
        self.block_message.len()
    }

    pub fn fetched_block_count(&self) -> usize {
        self.block_finish.len()
    }
}

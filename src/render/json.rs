//! JSON Lines rendering: one object per block or reducer record.

use crate::logfile::format_timestamp;
use crate::report::{BlockStats, ReducerStats};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record<'a> {
    Block {
        block_id: &'a str,
        message_id: &'a str,
        begin: String,
        send_request: f64,
        request_network: f64,
        build_reply: f64,
        send_reply: f64,
        parse_reply: f64,
        wall_time: f64,
    },
    Reducer {
        reducer_id: usize,
        start: String,
        end: String,
        delta: f64,
        matched_blocks: usize,
    },
}

impl<'a> From<&'a BlockStats> for Record<'a> {
    fn from(stats: &'a BlockStats) -> Self {
        Record::Block {
            block_id: &stats.block_id,
            message_id: &stats.message_id,
            begin: format_timestamp(&stats.begin),
            send_request: stats.send_request,
            request_network: stats.request_network,
            build_reply: stats.build_reply,
            send_reply: stats.send_reply,
            parse_reply: stats.parse_reply,
            wall_time: stats.wall_time,
        }
    }
}

impl From<&ReducerStats> for Record<'_> {
    fn from(stats: &ReducerStats) -> Self {
        Record::Reducer {
            reducer_id: stats.reducer_id,
            start: format_timestamp(&stats.start),
            end: format_timestamp(&stats.end),
            delta: stats.delta,
            matched_blocks: stats.matched_blocks,
        }
    }
}

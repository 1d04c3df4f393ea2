//! Reporting over the correlation tables: per-block latency breakdowns and
//! per-reducer start/end spans.

use crate::error::TimingError;
use crate::logfile::{Timestamp, seconds_between};
use crate::model::{MessageEvent, ShuffleBlockId, ShuffleTables};
use log::{debug, warn};

/// What to do when a message was received but its lifecycle is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncompletePolicy {
    /// Abort with `TimingError::MissingCorrelation`.
    #[default]
    Fail,
    /// Warn and leave the block out.
    Skip,
}

/// Latency breakdown of one fetched block. All durations are seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStats {
    pub block_id: String,
    pub message_id: String,
    pub begin: Timestamp,
    /// begin -> request sent
    pub send_request: f64,
    /// request sent -> request received
    pub request_network: f64,
    /// request received -> ack begun
    pub build_reply: f64,
    /// ack begun -> ack sent
    pub send_reply: f64,
    /// ack handled -> block delivered
    pub parse_reply: f64,
    pub wall_time: f64,
}

/// Span covered by all blocks one reducer fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducerStats {
    pub reducer_id: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub delta: f64,
    pub matched_blocks: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShuffleReport {
    /// Empty unless block stats were requested.
    pub blocks: Vec<BlockStats>,
    pub reducer: ReducerStats,
}

/// Message timestamps needed for a block breakdown, present once a message
/// has been received.
struct Lifecycle {
    begin: Timestamp,
    send: Timestamp,
    receive: Timestamp,
    ack_begin: Timestamp,
    ack_end: Timestamp,
    reply: Timestamp,
}

pub struct Reporter<'a> {
    tables: &'a ShuffleTables,
    policy: IncompletePolicy,
}

impl<'a> Reporter<'a> {
    pub fn new(tables: &'a ShuffleTables, policy: IncompletePolicy) -> Self {
        Self { tables, policy }
    }

    /// Breakdown for one block.
    ///
    /// `Ok(None)` when the block was never part of a message, its message was
    /// never received, or the fetch of the block itself was not logged.
    pub fn block_stats(&self, block_id: &str) -> Result<Option<BlockStats>, TimingError> {
        let Some(msg_id) = self.tables.message_of(block_id) else {
            return Ok(None);
        };
        let Some(receive) = self.tables.message_time(MessageEvent::Receive, msg_id) else {
            debug!("{}: message {} never received", block_id, msg_id);
            return Ok(None);
        };

        let Some(lifecycle) = self.tolerate(block_id, self.lifecycle(msg_id, receive))? else {
            return Ok(None);
        };

        let (Some(finish), Some(wall_time)) = (
            self.tables.block_finish_time(block_id),
            self.tables.block_wall_secs(block_id),
        ) else {
            debug!(
                "{}: no remote fetch logged (message {} carries {} blocks)",
                block_id,
                msg_id,
                self.tables.blocks_of(msg_id).map_or(0, <[String]>::len)
            );
            return Ok(None);
        };

        Ok(Some(BlockStats {
            block_id: block_id.to_string(),
            message_id: msg_id.to_string(),
            begin: lifecycle.begin,
            send_request: seconds_between(&lifecycle.begin, &lifecycle.send),
            request_network: seconds_between(&lifecycle.send, &lifecycle.receive),
            build_reply: seconds_between(&lifecycle.receive, &lifecycle.ack_begin),
            send_reply: seconds_between(&lifecycle.ack_begin, &lifecycle.ack_end),
            parse_reply: seconds_between(&lifecycle.reply, &finish),
            wall_time,
        }))
    }

    /// Fold every block destined for `reducer_id` into one start/end span.
    ///
    /// Source indices `0..num_reducers` are tried; ids never seen in a begin
    /// line are skipped. With no matching block the span keeps its sentinels
    /// (`start` = MAX, `end` = MIN) and `delta` comes out hugely negative.
    pub fn shuffle_stats(
        &self,
        reducer_id: usize,
        num_reducers: usize,
        shuffle_id: usize,
        print_block_stats: bool,
    ) -> Result<ShuffleReport, TimingError> {
        let mut start = Timestamp::MAX;
        let mut end = Timestamp::MIN;
        let mut blocks = Vec::new();
        let mut matched_blocks = 0usize;

        for source in 0..num_reducers {
            let block_id = ShuffleBlockId::new(shuffle_id, source, reducer_id).to_string();
            let Some(msg_id) = self.tables.message_of(&block_id) else {
                continue;
            };

            if print_block_stats {
                if let Some(stats) = self.block_stats(&block_id)? {
                    blocks.push(stats);
                }
            }

            let span = self
                .tables
                .require_message_time(MessageEvent::Begin, msg_id)
                .and_then(|begin| {
                    let reply = self.tables.require_message_time(MessageEvent::Reply, msg_id)?;
                    Ok((begin, reply))
                });
            let Some((begin, reply)) = self.tolerate(&block_id, span)? else {
                continue;
            };

            start = start.min(begin);
            end = end.max(reply);
            matched_blocks += 1;
        }

        Ok(ShuffleReport {
            blocks,
            reducer: ReducerStats {
                reducer_id,
                start,
                end,
                delta: seconds_between(&start, &end),
                matched_blocks,
            },
        })
    }

    fn lifecycle(&self, msg_id: &str, receive: Timestamp) -> Result<Lifecycle, TimingError> {
        let time = |event| self.tables.require_message_time(event, msg_id);
        Ok(Lifecycle {
            begin: time(MessageEvent::Begin)?,
            send: time(MessageEvent::Send)?,
            receive,
            ack_begin: time(MessageEvent::AckBegin)?,
            ack_end: time(MessageEvent::AckEnd)?,
            reply: time(MessageEvent::Reply)?,
        })
    }

    /// Apply the incomplete-data policy to a lookup for `block_id`.
    fn tolerate<T>(
        &self,
        block_id: &str,
        result: Result<T, TimingError>,
    ) -> Result<Option<T>, TimingError> {
        match (result, self.policy) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(err), IncompletePolicy::Skip) if err.is_missing_correlation() => {
                warn!("skipping {}: {}", block_id, err);
                Ok(None)
            }
            (Err(err), _) => Err(err),
        }
    }
}

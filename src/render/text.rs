use crate::logfile::{format_seconds, format_timestamp};
use crate::report::{BlockStats, ReducerStats};

pub const BLOCK_HEADER: &str =
    "block_id,begin,send_req,network,build_reply,send_reply,parse,wall_time";

/// `blockId,beginTs,d1,d2,d3,d4,d5,wallTimeSeconds`
pub fn block_line(stats: &BlockStats) -> String {
    [
        stats.block_id.clone(),
        format_timestamp(&stats.begin),
        format_seconds(stats.send_request),
        format_seconds(stats.request_network),
        format_seconds(stats.build_reply),
        format_seconds(stats.send_reply),
        format_seconds(stats.parse_reply),
        format_seconds(stats.wall_time),
    ]
    .join(",")
}

/// `shuffle {reducer} start {ts} end {ts} delta {secs}`
pub fn reducer_line(stats: &ReducerStats) -> String {
    format!(
        "shuffle {} start {} end {} delta {}",
        stats.reducer_id,
        format_timestamp(&stats.start),
        format_timestamp(&stats.end),
        format_seconds(stats.delta)
    )
}

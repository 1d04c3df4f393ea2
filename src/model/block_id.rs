//! Shuffle block ids as they appear in logs.
//!
//! Example: shuffle 0, map output of reducer 3 destined for reducer 7
//! => `shuffle_0_3_7`
//!
//! Logged ids stay opaque strings in the tables; this type only rebuilds the
//! id a reducer expects so it can be looked up.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShuffleBlockId {
    pub shuffle_id: usize,
    pub source: usize,
    pub dest: usize,
}

impl ShuffleBlockId {
    pub fn new(shuffle_id: usize, source: usize, dest: usize) -> Self {
        Self {
            shuffle_id,
            source,
            dest,
        }
    }
}

impl fmt::Display for ShuffleBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shuffle_{}_{}_{}", self.shuffle_id, self.source, self.dest)
    }
}

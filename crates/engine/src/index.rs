//! The in-memory index: key -> on-disk coordinates, insertion-ordered.

use crate::value::Value;
use block::BlockSize;
use indexmap::IndexMap;

/// The authoritative key index.
///
/// `IndexMap` gives hash-map lookups with stable insertion-order iteration:
/// re-inserting an existing key keeps its position, and removal via
/// `shift_remove` preserves the order of the remaining entries — exactly the
/// iteration contract the store exposes.
pub(crate) type Index = IndexMap<String, Slot>;

/// Where a live record sits on disk.
///
/// The coordinates are always present; `cached` carries the materialized
/// value when the store keeps values in memory, in which case reads never
/// touch the file.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    /// File offset of the containing block.
    pub offset: u64,
    /// Physical size class of the block.
    pub size: BlockSize,
    /// In-block offset of the value bytes.
    pub value_offset: u32,
    /// Value byte length.
    pub value_len: u32,
    /// The value itself, when in-memory caching is enabled.
    pub cached: Option<Value>,
}

impl Slot {
    /// Absolute file offset of the value bytes.
    pub fn value_position(&self) -> u64 {
        self.offset + u64::from(self.value_offset)
    }
}

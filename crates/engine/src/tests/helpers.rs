use crate::StoreOptions;

/// Options for a store that keeps only coordinates in memory.
pub fn uncached() -> StoreOptions {
    StoreOptions {
        buffer_values: false,
        in_memory_values: false,
    }
}

/// Options for a byte-valued store.
pub fn buffered() -> StoreOptions {
    StoreOptions {
        buffer_values: true,
        in_memory_values: true,
    }
}

/// The block size a fresh placement of `(key, value)` lands in: record
/// bytes, growth slack, ladder rounding.
pub fn placed_block_size(key: &str, value: &[u8]) -> u64 {
    let record = block::record_len(key.len(), value.len());
    block::BlockSize::for_payload(block::grow_for_placement(record))
        .unwrap()
        .bytes()
}

//! Error types for store operations.

use block::BlockError;
use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the store engine.
///
/// The engine performs no internal retries: every error propagates to the
/// caller of the operation that provoked it. An [`Io`] failure during a
/// mutation leaves the in-memory index out of sync with the file; the store
/// should be discarded and reopened.
///
/// [`Io`]: StoreError::Io
#[derive(Debug, Error)]
pub enum StoreError {
    /// A positioned read, positioned write, open, metadata, or truncate
    /// call failed in the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The sizing ladder was asked for a block beyond its top rung.
    #[error("block of {0} bytes exceeds the representable maximum")]
    BlockTooLarge(u64),

    /// A block read back from disk is inconsistent: its declared size runs
    /// past end-of-file, or its record overruns the block. Fatal when hit
    /// during the open-time scan.
    #[error("corrupt block at offset {offset}: {reason}")]
    CorruptBlock {
        /// File offset of the offending block.
        offset: u64,
        /// What the scan found wrong.
        reason: &'static str,
    },

    /// The key is empty or longer than the key length prefix can carry.
    #[error("key must be non-empty and at most {} bytes", block::MAX_KEY_BYTES)]
    InvalidKey,

    /// The value is longer than the value length prefix can carry.
    #[error("value of {0} bytes exceeds the representable maximum")]
    ValueTooLarge(usize),
}

impl From<BlockError> for StoreError {
    fn from(err: BlockError) -> Self {
        match err {
            BlockError::Io(e) => StoreError::Io(e),
            BlockError::TooLarge(n) => StoreError::BlockTooLarge(n),
            BlockError::KeyTooLong(_) => StoreError::InvalidKey,
            BlockError::ValueTooLong(n) => StoreError::ValueTooLarge(n),
        }
    }
}

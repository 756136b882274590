//! # Engine - CubbyKV Storage Engine
//!
//! A single-file embedded key-value store. Records live in size-classed
//! blocks inside one append-oriented file; an in-memory index maps each key
//! to its block, and a free-block registry recycles the holes left by
//! deletes and relocations.
//!
//! ## Architecture
//!
//! ```text
//! Caller
//!   |
//!   v
//! ┌─────────────────────────────────────────────────┐
//! │                    STORE                        │
//! │                                                 │
//! │ write.rs → encode block → place → write → index │
//! │              |                                  │
//! │              | placement:                       │
//! │              |   freelist hole of exact size?   │
//! │              |   else append at eof             │
//! │              v                                  │
//! │           pagefile (positioned I/O)             │
//! │                                                 │
//! │ read.rs  → index probe → cached value           │
//! │            (or one positioned read per key)     │
//! │                                                 │
//! │ load.rs  → full-file block scan at open         │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module     | Purpose                                            |
//! |------------|----------------------------------------------------|
//! | `lib.rs`   | `Store` struct, options, open, accessors, `Debug`  |
//! | `load`     | Open-time index rebuild: scan every block to eof   |
//! | `write`    | `set()`, `delete()`, `clear()`, placement policy   |
//! | `read`     | `contains()`, `get()`, insertion-order iteration   |
//! | `index`    | Key -> block coordinates (+ optional cached value) |
//! | `value`    | Text/bytes sum type and normalization              |
//! | `error`    | `StoreError` / `Result`                            |
//!
//! ## Concurrency
//!
//! The store is single-writer but may be shared across threads. Every
//! file-touching operation locks the disk state (page file + free-block
//! registry + scratch buffer) behind one mutex; callers queue there and
//! proceed one at a time. Index lookups that never touch the file
//! (`contains`, cached `get`, `len`, key iteration) take only the index
//! read lock and observe the state as of the last completed mutation — the
//! index is published after the corresponding block write, never before.
//!
//! Lock order is disk-then-index; no index lock is ever held while waiting
//! for the disk mutex.
//!
//! ## Durability
//!
//! The engine never calls fsync. Every mutation is a single whole-block
//! positioned write (relocation is a free-write then an insert-write inside
//! the same exclusive region), so readers never observe a torn record, but
//! durability across power loss is whatever the OS page cache provides.

mod error;
mod index;
mod load;
mod read;
mod value;
mod write;

pub use error::{Result, StoreError};
pub use value::Value;

use freelist::FreeList;
use index::Index;
use pagefile::PageFile;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};

/// Per-store configuration.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Values are raw bytes when `true`, UTF-8 strings when `false`.
    pub buffer_values: bool,
    /// When `true`, each index entry caches its value and `get` never
    /// touches the file. When `false`, the index holds only coordinates and
    /// every value read is a positioned read.
    pub in_memory_values: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            buffer_values: false,
            in_memory_values: true,
        }
    }
}

/// Everything a mutation needs exclusive access to: the file handle with
/// its eof cursor, the free-block registry, and the reusable block buffer.
/// The mutex around it is the write-serialization gate.
pub(crate) struct DiskState {
    pub file: PageFile,
    pub free: FreeList,
    /// Reusable block encode/read buffer, to avoid an allocation per
    /// operation.
    pub scratch: Vec<u8>,
}

/// A single-file embedded key-value store.
///
/// # Open & Recovery
///
/// [`Store::open`] opens (or creates) the database file and rebuilds the
/// index by scanning every block from offset 0 to end-of-file: free blocks
/// repopulate the registry, live blocks repopulate the index. A corrupt
/// block fails the open.
///
/// # Write Path
///
/// 1. Normalize the value to the configured kind and encode the record.
/// 2. If the key already has a block and the record fits it, rewrite in
///    place. Otherwise free the old block (if any), take a same-sized hole
///    from the registry or append at eof, and write the new block.
/// 3. Publish the index entry after the write completes.
///
/// # Read Path
///
/// With cached values, `get` clones from the index without touching the
/// file. Without, it issues one positioned read of exactly the value bytes.
pub struct Store {
    path: PathBuf,
    opts: StoreOptions,
    index: RwLock<Index>,
    disk: Mutex<DiskState>,
}

impl Store {
    /// Opens `path` with default options, creating the file if absent, and
    /// rebuilds the index from its contents.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Opens `path` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened or read, and
    /// [`StoreError::CorruptBlock`] if the scan finds a block whose declared
    /// size runs past end-of-file or whose record overruns its block.
    pub fn open_with<P: AsRef<Path>>(path: P, opts: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = PageFile::open(&path)?;
        let mut index = Index::new();
        let mut free = FreeList::new();
        let mut scratch = Vec::new();

        load::rebuild(&mut file, &opts, &mut index, &mut free, &mut scratch)?;

        Ok(Self {
            path,
            opts,
            index: RwLock::new(index),
            disk: Mutex::new(DiskState {
                file,
                free,
                scratch,
            }),
        })
    }

    /// The database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The options this store was opened with.
    #[must_use]
    pub fn options(&self) -> StoreOptions {
        self.opts
    }

    /// Number of live keys. Never touches the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// The offset past the last allocated block — the sum of the physical
    /// sizes of every block in the file.
    #[must_use]
    pub fn eof(&self) -> u64 {
        self.disk.lock().file.eof()
    }

    /// Number of blocks currently registered as reusable.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.disk.lock().free.len()
    }

    /// Whether a free block of `size` bytes is registered at `offset`.
    #[must_use]
    pub fn has_free_block(&self, size: u64, offset: u64) -> bool {
        self.disk.lock().free.contains(size, offset)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disk = self.disk.lock();
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("buffer_values", &self.opts.buffer_values)
            .field("in_memory_values", &self.opts.in_memory_values)
            .field("entries", &self.index.read().len())
            .field("free_blocks", &disk.free.len())
            .field("eof", &disk.file.eof())
            .finish()
    }
}

#[cfg(test)]
mod tests;

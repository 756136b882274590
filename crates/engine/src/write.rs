//! Write path: `set()`, `delete()`, and `clear()`.
//!
//! All mutations flow through this module and run under the disk mutex.
//! Each one boils down to whole-block positioned writes: an in-place
//! rewrite, a fresh placement, or a free-block stamp over an abandoned
//! location. The index entry is updated only after the block write lands.

use crate::error::{Result, StoreError};
use crate::index::Slot;
use crate::value::Value;
use crate::Store;
use block::BlockSize;
use tracing::trace;

impl Store {
    /// Inserts or updates a key.
    ///
    /// The value is normalized to the store's configured kind (text or
    /// bytes; UTF-8 in both directions). A new key gets a freshly sized
    /// block with ~20% growth slack. An existing key is rewritten in place
    /// when the new record fits its current block — shrinks simply re-pad
    /// with zeros — and relocated otherwise: the old block is stamped free
    /// and registered, then the replacement is placed like an insert.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidKey`] for an empty or over-long key,
    /// [`StoreError::ValueTooLarge`] / [`StoreError::BlockTooLarge`] for a
    /// value past the format's limits, [`StoreError::Io`] on write failure
    /// (after which the store should be discarded).
    pub fn set<V: Into<Value>>(&self, key: &str, value: V) -> Result<()> {
        if key.is_empty() || key.len() > block::MAX_KEY_BYTES {
            return Err(StoreError::InvalidKey);
        }
        let value = value.into().normalize(self.opts.buffer_values);
        if value.len() > block::MAX_VALUE_BYTES {
            return Err(StoreError::ValueTooLarge(value.len()));
        }
        let record = block::record_len(key.len(), value.len());

        let mut disk = self.disk.lock();
        let disk = &mut *disk;

        let existing = {
            let index = self.index.read();
            index.get(key).map(|slot| (slot.offset, slot.size))
        };

        let (offset, size) = match existing {
            // The new record fits the current block: rewrite in place,
            // keeping the block's size class.
            Some((offset, size)) if record <= size.bytes() => {
                block::encode_record(&mut disk.scratch, size, key.as_bytes(), value.as_bytes())?;
                disk.file.write_at(offset, &disk.scratch)?;
                (offset, size)
            }
            existing => {
                // Outgrown blocks are freed before the replacement is
                // placed; both writes happen inside this exclusive region.
                if let Some((old_offset, old_size)) = existing {
                    block::encode_free(&mut disk.scratch, old_size);
                    disk.file.write_at(old_offset, &disk.scratch)?;
                    disk.free.release(old_size.bytes(), old_offset);
                    trace!(key, old_offset, "relocating outgrown record");
                }

                let size = BlockSize::for_payload(block::grow_for_placement(record))?;
                block::encode_record(&mut disk.scratch, size, key.as_bytes(), value.as_bytes())?;

                let offset = match disk.free.take(size.bytes()) {
                    Some(offset) => {
                        trace!(key, offset, "reusing free block");
                        offset
                    }
                    None => disk.file.reserve(size.bytes()),
                };
                disk.file.write_at(offset, &disk.scratch)?;
                (offset, size)
            }
        };

        // Publish only after the block write has landed, so readers never
        // observe a key whose block does not exist yet.
        let slot = Slot {
            offset,
            size,
            value_offset: (block::header_len(key.len(), value.len()) + key.len()) as u32,
            value_len: value.len() as u32,
            cached: self.opts.in_memory_values.then_some(value),
        };
        self.index.write().insert(key.to_string(), slot);
        Ok(())
    }

    /// Deletes a key: stamps its block free, registers the hole, and drops
    /// the index entry. Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the free-block write fails.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut disk = self.disk.lock();
        let disk = &mut *disk;

        let slot = {
            let index = self.index.read();
            index.get(key).map(|slot| (slot.offset, slot.size))
        };
        let Some((offset, size)) = slot else {
            return Ok(());
        };

        block::encode_free(&mut disk.scratch, size);
        disk.file.write_at(offset, &disk.scratch)?;
        disk.free.release(size.bytes(), offset);

        self.index.write().shift_remove(key);
        trace!(key, offset, "deleted record");
        Ok(())
    }

    /// Empties the store: truncates the file, resets eof, forgets the
    /// free-block registry, and clears the index.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if truncation fails.
    pub fn clear(&self) -> Result<()> {
        let mut disk = self.disk.lock();
        disk.file.truncate()?;
        disk.free.clear();
        self.index.write().clear();
        trace!("cleared store");
        Ok(())
    }
}

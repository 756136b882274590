//! Open-time index rebuild.
//!
//! The file carries no header and no catalog; the only way to know what it
//! contains is to walk it. Starting at offset 0 and advancing by each
//! block's decoded size, every block is classified as free (back into the
//! registry) or live (into the index). The scan is fatal on inconsistency:
//! a block that runs past end-of-file means the file was truncated or
//! overwritten, and an index built from it would lie.

use crate::error::{Result, StoreError};
use crate::index::{Index, Slot};
use crate::value::Value;
use crate::StoreOptions;
use block::BlockSize;
use freelist::FreeList;
use pagefile::PageFile;
use tracing::debug;

/// Scans the whole file and repopulates `index` and `free`.
///
/// `scratch` is the store's reusable block buffer; it grows to the
/// ladder-rounded size of the largest record read, in jumps rather than
/// byte by byte, and is handed back to the store for later mutations.
pub(crate) fn rebuild(
    file: &mut PageFile,
    opts: &StoreOptions,
    index: &mut Index,
    free: &mut FreeList,
    scratch: &mut Vec<u8>,
) -> Result<()> {
    let eof = file.eof();
    let mut offset = 0u64;
    let mut live = 0usize;
    let mut freed = 0usize;
    let mut prefix = [0u8; block::PREFIX_BYTES];

    while offset < eof {
        if eof - offset < block::PREFIX_BYTES as u64 {
            // Even the smallest block is 16 bytes; a shorter remainder
            // cannot be one.
            return Err(StoreError::CorruptBlock {
                offset,
                reason: "truncated block header",
            });
        }
        file.read_at(offset, &mut prefix)?;
        let header = block::decode_prefix(&prefix)?;
        let size = header.size.bytes();

        if offset + size > eof {
            return Err(StoreError::CorruptBlock {
                offset,
                reason: "declared block size runs past end of file",
            });
        }

        if header.free {
            free.release(size, offset);
            freed += 1;
            offset += size;
            continue;
        }

        if header.record_len() > size {
            return Err(StoreError::CorruptBlock {
                offset,
                reason: "record overruns its block",
            });
        }

        // Read the key, and the value too when the store caches values.
        let needed = if opts.in_memory_values {
            header.value_offset() + header.value_len
        } else {
            header.value_offset()
        };
        grow_scratch(scratch, needed)?;
        file.read_at(offset, &mut scratch[..needed])?;

        let key_bytes = &scratch[header.header_len..header.header_len + header.key_len];
        let key = String::from_utf8_lossy(key_bytes).into_owned();

        let cached = if opts.in_memory_values {
            let start = header.value_offset();
            Some(Value::from_raw(
                scratch[start..start + header.value_len].to_vec(),
                opts.buffer_values,
            ))
        } else {
            None
        };

        index.insert(
            key,
            Slot {
                offset,
                size: header.size,
                value_offset: header.value_offset() as u32,
                value_len: header.value_len as u32,
                cached,
            },
        );
        live += 1;
        offset += size;
    }

    debug!(live, free = freed, eof, "index rebuilt from file scan");
    Ok(())
}

/// Grows the scratch buffer to the ladder-rounded size of `needed`, so
/// repeated loads of slightly different records reuse one allocation.
fn grow_scratch(scratch: &mut Vec<u8>, needed: usize) -> Result<()> {
    if scratch.len() < needed {
        let rounded = BlockSize::for_payload(needed as u64)?.bytes() as usize;
        scratch.resize(rounded, 0);
    }
    Ok(())
}

//! Read path: `contains()`, `get()`, and insertion-order iteration.
//!
//! Cached stores answer everything from the index without touching the
//! file. Uncached stores look up coordinates in the index and issue one
//! positioned read per value, serialized through the disk mutex like every
//! other file-touching operation.

use crate::error::Result;
use crate::value::Value;
use crate::{DiskState, Store};

impl Store {
    /// Whether `key` is live. A constant-time index probe that never
    /// touches the file.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.read().contains_key(key)
    }

    /// Looks up a key, returning `Ok(None)` when absent.
    ///
    /// With cached values this clones from the index. Without, it reads
    /// exactly the value bytes from the key's block under the disk mutex.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the positioned read fails.
    ///
    /// [`StoreError::Io`]: crate::StoreError::Io
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        // Fast path: cached value, index read lock only.
        {
            let index = self.index.read();
            let Some(slot) = index.get(key) else {
                return Ok(None);
            };
            if let Some(value) = &slot.cached {
                return Ok(Some(value.clone()));
            }
        }

        // Uncached: re-resolve the coordinates under the disk mutex, since
        // a mutation may have moved the block while we waited for it.
        let mut disk = self.disk.lock();
        let (position, len) = {
            let index = self.index.read();
            let Some(slot) = index.get(key) else {
                return Ok(None);
            };
            match &slot.cached {
                Some(value) => return Ok(Some(value.clone())),
                None => (slot.value_position(), slot.value_len as usize),
            }
        };
        Ok(Some(read_value(&mut disk, position, len, self.opts.buffer_values)?))
    }

    /// Every live key, in insertion order. Never touches the file.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.index.read().keys().cloned().collect()
    }

    /// Every live value, in key insertion order.
    ///
    /// # Errors
    ///
    /// Only an uncached store can fail here, on a positioned read.
    pub fn values(&self) -> Result<Vec<Value>> {
        Ok(self.entries()?.into_iter().map(|(_, value)| value).collect())
    }

    /// Every live `(key, value)` pair, in insertion order.
    ///
    /// # Errors
    ///
    /// Only an uncached store can fail here, on a positioned read.
    pub fn entries(&self) -> Result<Vec<(String, Value)>> {
        // A cached store answers from the index alone, without queueing
        // behind in-flight mutations.
        if self.opts.in_memory_values {
            let index = self.index.read();
            let mut out = Vec::with_capacity(index.len());
            for (key, slot) in index.iter() {
                if let Some(value) = &slot.cached {
                    out.push((key.clone(), value.clone()));
                }
            }
            return Ok(out);
        }

        // Uncached: hold the disk mutex across the whole sweep so the
        // per-key reads see one consistent layout.
        let mut disk = self.disk.lock();
        let snapshot: Vec<(String, Option<Value>, u64, usize)> = {
            let index = self.index.read();
            index
                .iter()
                .map(|(key, slot)| {
                    (
                        key.clone(),
                        slot.cached.clone(),
                        slot.value_position(),
                        slot.value_len as usize,
                    )
                })
                .collect()
        };

        let mut out = Vec::with_capacity(snapshot.len());
        for (key, cached, position, len) in snapshot {
            let value = match cached {
                Some(value) => value,
                None => read_value(&mut disk, position, len, self.opts.buffer_values)?,
            };
            out.push((key, value));
        }
        Ok(out)
    }

    /// Calls `f` for every `(key, value)` pair in insertion order.
    ///
    /// The pairs are materialized first (one positioned read per key on an
    /// uncached store), then `f` runs without any store lock held.
    ///
    /// # Errors
    ///
    /// Only an uncached store can fail here, on a positioned read.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str, &Value),
    {
        for (key, value) in self.entries()? {
            f(&key, &value);
        }
        Ok(())
    }
}

/// One positioned read of exactly the value bytes, decoded per the store's
/// value kind.
fn read_value(
    disk: &mut DiskState,
    position: u64,
    len: usize,
    buffer_values: bool,
) -> Result<Value> {
    let mut buf = vec![0u8; len];
    disk.file.read_at(position, &mut buf)?;
    Ok(Value::from_raw(buf, buffer_values))
}

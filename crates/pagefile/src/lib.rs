//! # Pagefile — Positioned File Backend
//!
//! Owns the single read/write handle to the database file plus the logical
//! end-of-file cursor. All I/O is positioned: every call seeks to an
//! absolute offset before reading or writing, so callers never depend on
//! where a previous operation left the cursor. The handle is exclusively
//! owned for the lifetime of the store; external mutation of the file is
//! undefined.
//!
//! The `eof` cursor tracks the end of the *allocated* region. It starts at
//! the physical file length on open, advances through [`PageFile::reserve`]
//! when a block is appended, and only ever moves backwards on
//! [`PageFile::truncate`].

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// The database file handle and its end-of-file cursor.
#[derive(Debug)]
pub struct PageFile {
    file: File,
    eof: u64,
}

impl PageFile {
    /// Opens `path` for read+write, creating it if absent, and records the
    /// current file length as the eof cursor. A zero-length file is a valid
    /// empty database.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let eof = file.metadata()?.len();
        Ok(Self { file, eof })
    }

    /// The offset immediately past the last allocated block.
    #[must_use]
    pub fn eof(&self) -> u64 {
        self.eof
    }

    /// Claims `len` bytes at the end of the allocated region, returning the
    /// offset where they start. The caller is expected to write the block
    /// there immediately; a failed write leaves the cursor past the physical
    /// end, which is one of the ways an I/O error makes the store unusable.
    pub fn reserve(&mut self, len: u64) -> u64 {
        let offset = self.eof;
        self.eof += len;
        offset
    }

    /// Fills `buf` from the file starting at `offset`.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }

    /// Writes all of `buf` at `offset`.
    pub fn write_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)
    }

    /// Cuts the file to zero length and resets the eof cursor.
    pub fn truncate(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.eof = 0;
        Ok(())
    }
}

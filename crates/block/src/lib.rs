//! # Block — On-Disk Block Codec
//!
//! Pure functions mapping between a one-byte flags value and a logical block
//! size, and between `(key, value)` pairs and a flat byte block of the chosen
//! size. This crate knows nothing about files or indexes; it only produces
//! and parses byte buffers.
//!
//! ## Size ladder
//!
//! Block sizes form a discrete ladder indexed by a 5-bit exponent
//! `e ∈ [0, 31]` and a 1-bit half-step `h`:
//!
//! ```text
//! size = 2^(e+4)        when h = 0
//! size = 1.5 * 2^(e+4)  when h = 1
//!
//! 16, 24, 32, 48, 64, 96, 128, 192, 256, ... up to 1.5 * 2^35
//! ```
//!
//! The smallest block is 16 bytes. Requests past the top of the ladder are
//! refused with [`BlockError::TooLarge`].
//!
//! ## Record layout within a block
//!
//! ```text
//! [flags: u8][key_len][value_len][key bytes][value bytes][zero padding]
//!
//! small form: key_len u8,  value_len u16 BE   (header = 4 bytes)
//! large form: key_len u16, value_len u32 BE   (header = 7 bytes)
//! ```
//!
//! The large form is selected when `key_len > 255` or `value_len > 65535`.
//! Every byte past the record is zero-filled so a recycled block cannot leak
//! bytes from its previous occupant.
//!
//! ## Flags byte
//!
//! ```text
//! bit 7  FREE        block is reusable; length prefixes are undefined
//! bit 6  LARGE_LPS   extended length prefixes (large form)
//! bit 5  HALF_STEP   size is 1.5 * 2^(e+4)
//! bits 0-4           exponent e
//! ```
//!
//! A free block stores only its flags byte (FREE set, size bits matching the
//! physical length); the remainder is zero.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io;
use thiserror::Error;

/// Bit 7: the block is free and may be recycled.
pub const FLAG_FREE: u8 = 0b1000_0000;
/// Bit 6: the record uses the large (extended) length prefixes.
pub const FLAG_LARGE_LPS: u8 = 0b0100_0000;
/// Bit 5: the block size carries the 1.5x half-step.
pub const FLAG_HALF_STEP: u8 = 0b0010_0000;
/// Bits 0-4: the size exponent.
pub const EXPONENT_MASK: u8 = 0b0001_1111;

/// Smallest representable block (`e = 0`, no half-step).
pub const MIN_BLOCK_BYTES: u64 = 16;
/// Largest representable block: `1.5 * 2^35` (`e = 31`, half-step set).
pub const MAX_BLOCK_BYTES: u64 = 3 << 34;

/// Largest key the large-form prefix can carry.
pub const MAX_KEY_BYTES: usize = u16::MAX as usize;
/// Largest value the large-form prefix can carry.
pub const MAX_VALUE_BYTES: usize = u32::MAX as usize;

/// Worst-case record header: flags + large-form key and value prefixes.
/// The load scan reads this many bytes per block before deciding anything.
pub const PREFIX_BYTES: usize = HEADER_LARGE;

const HEADER_SMALL: usize = 1 + 1 + 2;
const HEADER_LARGE: usize = 1 + 2 + 4;

/// Errors produced by the codec.
#[derive(Debug, Error)]
pub enum BlockError {
    /// An underlying I/O error (only possible when decoding short input).
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The requested byte count is above the top of the size ladder.
    #[error("requested block of {0} bytes exceeds the maximum of {MAX_BLOCK_BYTES}")]
    TooLarge(u64),

    /// The key does not fit the large-form length prefix.
    #[error("key of {0} bytes exceeds the maximum of {MAX_KEY_BYTES}")]
    KeyTooLong(usize),

    /// The value does not fit the large-form length prefix.
    #[error("value of {0} bytes exceeds the maximum of {MAX_VALUE_BYTES}")]
    ValueTooLong(usize),
}

/// A block size class on the ladder: `2^(e+4)` or `1.5 * 2^(e+4)` bytes.
///
/// Constructed either from a required byte count ([`BlockSize::for_payload`])
/// or from a flags byte read back from disk ([`BlockSize::from_flags`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize {
    exponent: u8,
    half: bool,
}

impl BlockSize {
    /// Returns the smallest ladder size that holds `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::TooLarge`] when `n` exceeds [`MAX_BLOCK_BYTES`].
    pub fn for_payload(n: u64) -> Result<Self, BlockError> {
        if n <= MIN_BLOCK_BYTES {
            return Ok(Self { exponent: 0, half: false });
        }
        if n > MAX_BLOCK_BYTES {
            return Err(BlockError::TooLarge(n));
        }

        // Smallest power of two >= n, as a bit position.
        let pow_bits = 64 - (n - 1).leading_zeros() as u8;
        let pow_size = 1u64 << pow_bits;

        // Smallest 3 * 2^m >= n: ceil(n / 3) rounded up to a power of two.
        // n > 16 here, so third >= 6 and the subtraction cannot underflow.
        let third = n.div_ceil(3);
        let half_bits = 64 - (third - 1).leading_zeros() as u8;
        let half_size = 3u64 << half_bits;

        if pow_size <= half_size {
            Ok(Self { exponent: pow_bits - 4, half: false })
        } else {
            Ok(Self { exponent: half_bits - 3, half: true })
        }
    }

    /// Recovers the size class from a flags byte. Every 5-bit exponent maps
    /// to a representable size, so this cannot fail.
    pub fn from_flags(flags: u8) -> Self {
        Self {
            exponent: flags & EXPONENT_MASK,
            half: flags & FLAG_HALF_STEP != 0,
        }
    }

    /// The physical block length in bytes.
    #[must_use]
    pub fn bytes(self) -> u64 {
        if self.half {
            24u64 << self.exponent
        } else {
            16u64 << self.exponent
        }
    }

    /// The size bits as they appear in the flags byte (exponent + half-step).
    #[must_use]
    pub fn flag_bits(self) -> u8 {
        if self.half {
            self.exponent | FLAG_HALF_STEP
        } else {
            self.exponent
        }
    }

    /// The 5-bit exponent `e`.
    #[must_use]
    pub fn exponent(self) -> u8 {
        self.exponent
    }

    /// Whether the half-step bit is set.
    #[must_use]
    pub fn is_half_step(self) -> bool {
        self.half
    }
}

/// The decoded fixed-size prefix of a block.
///
/// For free blocks only `free` and `size` are meaningful; the length fields
/// are undefined on disk and reported as zero here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// FREE bit: the block carries no record.
    pub free: bool,
    /// Physical size class of the block.
    pub size: BlockSize,
    /// Key byte length.
    pub key_len: usize,
    /// Value byte length.
    pub value_len: usize,
    /// Bytes occupied by flags + length prefixes (4 small, 7 large).
    pub header_len: usize,
}

impl RecordHeader {
    /// In-block offset of the value bytes.
    #[must_use]
    pub fn value_offset(&self) -> usize {
        self.header_len + self.key_len
    }

    /// Total record bytes: header + key + value.
    #[must_use]
    pub fn record_len(&self) -> u64 {
        self.header_len as u64 + self.key_len as u64 + self.value_len as u64
    }
}

/// Whether a `(key, value)` pair needs the large length prefixes.
#[must_use]
pub fn needs_large(key_len: usize, value_len: usize) -> bool {
    key_len > u8::MAX as usize || value_len > u16::MAX as usize
}

/// Header bytes for a `(key, value)` pair: 4 small, 7 large.
#[must_use]
pub fn header_len(key_len: usize, value_len: usize) -> usize {
    if needs_large(key_len, value_len) {
        HEADER_LARGE
    } else {
        HEADER_SMALL
    }
}

/// Total record bytes (header + key + value) for a pair.
#[must_use]
pub fn record_len(key_len: usize, value_len: usize) -> u64 {
    header_len(key_len, value_len) as u64 + key_len as u64 + value_len as u64
}

/// Sizing input for a freshly placed record: `ceil(record_len * 1.2)`.
///
/// The slack lets a value grow a little without forcing relocation; the
/// ladder then rounds the padded length up to a block size.
#[must_use]
pub fn grow_for_placement(record_len: u64) -> u64 {
    record_len + (record_len + 4) / 5
}

/// Serializes a record into `buf`, replacing its contents with exactly
/// `size.bytes()` bytes: flags, length prefixes, key, value, zero padding.
///
/// The caller picks `size` (a fresh ladder fit on insert, the existing class
/// on an in-place update); the record must fit it.
///
/// # Panics
///
/// Panics if the record does not fit `size` — the engine checks fit before
/// choosing in-place rewrite over relocation.
///
/// # Errors
///
/// Returns [`BlockError::KeyTooLong`] / [`BlockError::ValueTooLong`] when a
/// length prefix cannot represent the payload.
pub fn encode_record(
    buf: &mut Vec<u8>,
    size: BlockSize,
    key: &[u8],
    value: &[u8],
) -> Result<(), BlockError> {
    if key.len() > MAX_KEY_BYTES {
        return Err(BlockError::KeyTooLong(key.len()));
    }
    if value.len() > MAX_VALUE_BYTES {
        return Err(BlockError::ValueTooLong(value.len()));
    }

    let large = needs_large(key.len(), value.len());
    let record = record_len(key.len(), value.len());
    assert!(
        record <= size.bytes(),
        "record of {} bytes does not fit a {}-byte block",
        record,
        size.bytes()
    );

    buf.clear();
    buf.reserve(size.bytes() as usize);

    let mut flags = size.flag_bits();
    if large {
        flags |= FLAG_LARGE_LPS;
    }
    buf.push(flags);

    if large {
        buf.write_u16::<BigEndian>(key.len() as u16)?;
        buf.write_u32::<BigEndian>(value.len() as u32)?;
    } else {
        buf.push(key.len() as u8);
        buf.write_u16::<BigEndian>(value.len() as u16)?;
    }

    buf.extend_from_slice(key);
    buf.extend_from_slice(value);

    // Zero-fill the remainder so a recycled block never leaks old bytes.
    buf.resize(size.bytes() as usize, 0);
    Ok(())
}

/// Serializes a free block into `buf`: the flags byte with FREE and the size
/// bits set, followed by zeros out to the physical length.
pub fn encode_free(buf: &mut Vec<u8>, size: BlockSize) {
    buf.clear();
    buf.resize(size.bytes() as usize, 0);
    buf[0] = FLAG_FREE | size.flag_bits();
}

/// Parses the fixed prefix of a block ([`PREFIX_BYTES`] bytes are enough for
/// any form). Free blocks yield a header with `free` set and zeroed lengths.
///
/// # Errors
///
/// Returns [`BlockError::Io`] when `prefix` is too short for the form the
/// flags byte announces.
pub fn decode_prefix(prefix: &[u8]) -> Result<RecordHeader, BlockError> {
    let mut p = prefix;
    let flags = p.read_u8()?;
    let size = BlockSize::from_flags(flags);

    if flags & FLAG_FREE != 0 {
        return Ok(RecordHeader {
            free: true,
            size,
            key_len: 0,
            value_len: 0,
            header_len: 1,
        });
    }

    let (key_len, value_len, header_len) = if flags & FLAG_LARGE_LPS != 0 {
        (
            p.read_u16::<BigEndian>()? as usize,
            p.read_u32::<BigEndian>()? as usize,
            HEADER_LARGE,
        )
    } else {
        (
            p.read_u8()? as usize,
            p.read_u16::<BigEndian>()? as usize,
            HEADER_SMALL,
        )
    };

    Ok(RecordHeader {
        free: false,
        size,
        key_len,
        value_len,
        header_len,
    })
}

//! The stored value type and its normalization rules.

use std::fmt;

/// A stored value: UTF-8 text or raw bytes.
///
/// Each store is configured for one variant (`buffer_values` in
/// [`StoreOptions`]); [`Value::normalize`] collapses whatever the caller
/// hands in to the configured kind, so a given store only ever holds one
/// variant.
///
/// [`StoreOptions`]: crate::StoreOptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A UTF-8 string value.
    Text(String),
    /// An opaque byte value.
    Bytes(Vec<u8>),
}

impl Value {
    /// The value payload as bytes, whichever variant it is.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Text(s) => s.as_bytes(),
            Value::Bytes(b) => b,
        }
    }

    /// The value as text, if it is the text variant.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(_) => None,
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Collapses the value to the store's configured variant: bytes when
    /// `buffer_values`, text otherwise. Byte-to-text conversion is lossy
    /// UTF-8, so normalization never fails.
    pub(crate) fn normalize(self, buffer_values: bool) -> Value {
        if buffer_values {
            Value::Bytes(match self {
                Value::Text(s) => s.into_bytes(),
                Value::Bytes(b) => b,
            })
        } else {
            Value::Text(match self {
                Value::Text(s) => s,
                Value::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
            })
        }
    }

    /// Decodes bytes read back from disk into the configured variant.
    pub(crate) fn from_raw(bytes: Vec<u8>, buffer_values: bool) -> Value {
        if buffer_values {
            Value::Bytes(bytes)
        } else {
            Value::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

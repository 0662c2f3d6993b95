use bytes::Bytes;

/// One step of a payload stream: either a chunk of data or the end of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of payload data
    Chunk(Bytes),
    /// Marks the end of the payload stream
    Eof,
}

/// Declared size of a body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Exactly this many bytes
    Length(u64),
    /// Not known up front, the body ends when its source ends
    Unknown,
}

impl PayloadSize {
    /// Returns true if the payload is known to be empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Length(0))
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, PayloadSize::Unknown)
    }
}

impl PayloadItem {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the item, an Eof becomes an empty chunk
    pub fn into_bytes(self) -> Bytes {
        match self {
            PayloadItem::Chunk(bytes) => bytes,
            PayloadItem::Eof => Bytes::new(),
        }
    }
}

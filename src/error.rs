//! Error taxonomy for the save-file codec.

use thiserror::Error;

/// Everything that can go wrong while decoding or encoding a save file.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad chunk magic, unknown compressor, inflate failure, or chunk size
    /// disagreement in the outer compression envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The stored CRC32 doesn't match the computed one.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    BadChecksum { stored: u32, computed: u32 },

    /// A typed read ran past the end of the buffer, or a seek landed outside
    /// the valid range.
    #[error("out of bounds: requested {requested} bytes at position {position}, only {available} available")]
    OutOfBounds {
        position: usize,
        requested: usize,
        available: usize,
    },

    /// An `FString` had an inconsistent length/terminator, or an `FName`
    /// index pointed outside its document's names table.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Advisory only: a property's declared type wasn't recognized. Normal
    /// decode does not raise this — the reader preserves the property's
    /// declared `size` bytes opaquely and continues. Exposed for callers
    /// that want to treat unknown kinds as hard failures.
    #[error("unknown property kind: {0}")]
    UnknownPropertyKind(String),

    /// A structured property, component, or object body consumed more (or
    /// fewer, where exactness is required) bytes than its declared size.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Profile-variant path only: the nested `PersistenceBlob` could not be
    /// located inside the outer document.
    #[error("could not locate persistence blob")]
    BlobDetectionFailed,

    /// Filesystem I/O failure at the `load`/`save` boundary.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types returned by the codec.

use std::io;

use thiserror::Error;

/// The compression envelope could not produce a plaintext buffer.
#[derive(Error, Debug)]
pub enum DecompressionError {
    /// An explicitly requested codec failed.
    #[error("{method} decompression failed: {reason}")]
    CodecFailed {
        /// Name of the codec that was asked for (`"zlib"`, `"lz4"`, ...).
        method: &'static str,
        /// Human-readable failure reason from the underlying library.
        reason: String,
    },
    /// `auto` mode exhausted every candidate codec without success.
    #[error("could not decompress payload; tried zlib, deflate, gzip, lz4, zstd")]
    AutoExhausted,
}

/// The byte stream did not conform to the GVAS container or property grammar.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The `"GVAS"` magic was not found at the start of the buffer, nor within
    /// the first 256 bytes.
    #[error("GVAS magic not found")]
    MagicNotFound,
    /// Every custom-versions layout variant failed its plausibility check.
    #[error("no plausible custom-versions layout found in header")]
    ImplausibleHeader,
    /// A fixed-width property's declared `size` did not match the kind's wire width.
    #[error("invalid value size for {kind}: expected {expected}, got {actual}")]
    InvalidValueSize {
        /// Property kind name (`"Int64Property"`, ...).
        kind: &'static str,
        /// Width mandated by the kind.
        expected: u32,
        /// Width actually declared on the wire.
        actual: u32,
    },
    /// A `StrProperty`/`NameProperty`/`ObjectProperty`'s declared `size` didn't
    /// match `len(utf8) + 4 + (1 if non-empty else 0)`.
    #[error("invalid string property size: expected {expected}, got {actual}")]
    InvalidStringSize {
        /// Size the invariant requires.
        expected: u32,
        /// Size actually declared on the wire.
        actual: u32,
    },
    /// A property's `type` field named a kind this codec doesn't know.
    #[error("unknown property kind {0:?}")]
    UnknownPropertyKind(String),
    /// Recursion (`Array<Struct>` / nested `Struct`) exceeded the configured
    /// maximum depth.
    #[error("struct/array nesting exceeded maximum depth {0}")]
    MaxDepthExceeded(usize),
    /// A string or GUID literal could not be decoded/parsed.
    #[error("malformed {what}: {detail}")]
    Malformed {
        /// What kind of value failed to parse (`"GUID"`, `"FString"`, ...).
        what: &'static str,
        /// Detail message.
        detail: String,
    },
}

/// Top-level error type returned by every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The compression envelope failed.
    #[error(transparent)]
    Decompression(#[from] DecompressionError),
    /// The byte stream was malformed.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Underlying file I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

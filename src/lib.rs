#![warn(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
#![warn(missing_docs)]

//! gvas-save
//!
//! Reads and writes Unreal Engine "SaveGame" files: the `GVAS`-tagged binary
//! container an Unreal title writes to persist player state, and the
//! self-describing tagged property stream nested inside it.
//!
//! # Examples
//!
//! ```no_run
//! use gvas_save::{read_savefile, CompressionMethod};
//!
//! let save = read_savefile("save.sav", CompressionMethod::Auto)?;
//! println!("{:#?}", save.header.save_game_class_name);
//! # Ok::<(), gvas_save::error::Error>(())
//! ```
//!
//! ## Scope
//!
//! This crate models the container and property grammar faithfully,
//! including several historically ambiguous records (the header's
//! custom-versions sub-record, whose layout drifts across engine revisions)
//! that are resolved by attempt-driven parsing rather than a single fixed
//! schema. `MapProperty` entries and `TextProperty`'s localization envelope
//! are preserved as opaque payloads rather than interpreted; see
//! [`properties::MapValue`] and [`properties::PropertyValue::Text`].
//!
//! Compressed input is transparently unwrapped on read (`zlib`, raw
//! `DEFLATE`, `gzip`, LZ4 frame, Zstandard); the writer always emits
//! uncompressed GVAS.

/// The compression envelope: unwraps whole-file compression framings.
pub mod compression;
/// Extensions for reading/writing GVAS binary primitives.
pub mod cursor_ext;
/// Custom-version compatibility-milestone records.
pub mod custom_version;
/// The embedded engine-version record.
pub mod engine_version;
/// Error types.
pub mod error;
/// The GVAS container header.
pub mod header;
/// The tagged property stream.
pub mod properties;
/// The file facade: top-level `read`/`write` entry points.
pub mod savefile;
/// GUID and other small value types.
pub mod types;

pub use compression::{decompress_payload, CompressionMethod};
pub use header::{FileVersion, GvasHeader};
pub use properties::{DecodeOptions, PropertyRecord, PropertyValue};
pub use savefile::{read_savefile, write_savefile, SaveFile};

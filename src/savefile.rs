//! The file facade: orchestrates the compression envelope, header codec, and
//! property stream codec into the two top-level entry points.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::compression::{decompress_payload, CompressionMethod};
use crate::error::{Error, FormatError};
use crate::header::{GvasHeader, MAGIC};
use crate::properties::{
    read_property_list, write_property_list, ArrayBody, DecodeOptions, PropertyRecord,
    PropertyValue, StructBody,
};

/// Bytes searched for a fallback `"GVAS"` magic when neither the raw buffer
/// nor its decompressed form starts with it at offset 0.
const MAGIC_SEARCH_WINDOW: usize = 256;

/// A decoded save: a header plus its ordered top-level property list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveFile {
    /// The decoded GVAS header.
    pub header: GvasHeader,
    /// The top-level property list, in wire order.
    pub properties: Vec<PropertyRecord>,
}

impl SaveFile {
    /// Decodes a `SaveFile` from an in-memory buffer, applying the
    /// compression envelope before decoding the header and property stream.
    pub fn read(bytes: &[u8], method: CompressionMethod) -> Result<Self, Error> {
        Self::read_with_options(bytes, method, DecodeOptions::default())
    }

    /// As [`SaveFile::read`], with explicit recursion-depth bounds.
    pub fn read_with_options(
        bytes: &[u8],
        method: CompressionMethod,
        options: DecodeOptions,
    ) -> Result<Self, Error> {
        let located = locate_magic(bytes, method)?;
        let mut cursor = Cursor::new(located);
        let header = GvasHeader::read(&mut cursor)?;
        let properties = read_property_list(&mut cursor, 0, &options)?;
        Ok(SaveFile { header, properties })
    }

    /// Encodes this `SaveFile` to an in-memory buffer. The writer always
    /// emits uncompressed GVAS; compressing the result is the caller's
    /// responsibility.
    pub fn write(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.header.write(&mut buf)?;
        write_property_list(&mut buf, &self.properties)?;
        Ok(buf)
    }

    /// Finds the first top-level property named `name`, if any.
    pub fn get(&self, name: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Iterates the children of a `Struct` or `Array<Struct>` value, for
    /// tree-navigation callers. Returns an empty iterator for every other
    /// kind.
    pub fn children(value: &PropertyValue) -> Box<dyn Iterator<Item = &PropertyRecord> + '_> {
        match value {
            PropertyValue::Struct(s) => match &s.body {
                StructBody::Custom(fields) => Box::new(fields.iter()),
                StructBody::WellKnown(_) => Box::new(std::iter::empty()),
            },
            PropertyValue::Array(a) => match &a.body {
                ArrayBody::Struct(records) => Box::new(records.iter()),
                _ => Box::new(std::iter::empty()),
            },
            _ => Box::new(std::iter::empty()),
        }
    }
}

/// Locates the `"GVAS"` magic in `bytes`, applying the compression envelope
/// when needed:
/// 1. If `bytes` already starts with the magic, use it unchanged.
/// 2. Otherwise run the envelope; if the result starts with the magic, adopt
///    it.
/// 3. Otherwise search for the magic within the first 256 bytes of the
///    *original* buffer.
/// 4. Otherwise fail.
fn locate_magic(bytes: &[u8], method: CompressionMethod) -> Result<Vec<u8>, Error> {
    if bytes.starts_with(&MAGIC) {
        return Ok(bytes.to_vec());
    }

    if let Ok(decompressed) = decompress_payload(bytes, method) {
        if decompressed.starts_with(&MAGIC) {
            return Ok(decompressed);
        }
    }

    let window = bytes.len().min(MAGIC_SEARCH_WINDOW);
    if let Some(offset) = bytes[..window]
        .windows(MAGIC.len())
        .position(|w| w == MAGIC)
    {
        return Ok(bytes[offset..].to_vec());
    }

    Err(FormatError::MagicNotFound.into())
}

/// Reads a `SaveFile` from the file at `path`.
pub fn read_savefile(path: impl AsRef<Path>, method: CompressionMethod) -> Result<SaveFile, Error> {
    let bytes = fs::read(path)?;
    SaveFile::read(&bytes, method)
}

/// Writes `save` to the file at `path`, uncompressed.
pub fn write_savefile(path: impl AsRef<Path>, save: &SaveFile) -> Result<(), Error> {
    let bytes = save.write()?;
    fs::write(path, bytes)?;
    Ok(())
}

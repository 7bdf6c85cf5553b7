//! `(GUID, version)` compatibility-milestone records.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{GvasCursorRead, GvasCursorWrite};
use crate::error::Error;
use crate::types::Guid;

/// One entry of the header's custom-versions record.
///
/// `friendly_name` is only present when the header was encoded with one of
/// the variants that inlines a name per entry (Variants B/D in the header
/// codec); most saves use the nameless Variant A layout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomVersion {
    /// Identifies the engine subsystem this version number belongs to.
    pub guid: Guid,
    /// The compatibility milestone reached for that subsystem.
    pub version: i32,
    /// Optional human-readable name, present only in the named variants.
    pub friendly_name: Option<String>,
}

impl CustomVersion {
    /// Creates a nameless custom-version entry (the canonical writer shape).
    pub fn new(guid: Guid, version: i32) -> Self {
        CustomVersion {
            guid,
            version,
            friendly_name: None,
        }
    }

    pub(crate) fn read_unnamed<R: Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let guid = reader.read_guid()?;
        let version = reader.read_i32::<LittleEndian>()?;
        Ok(CustomVersion {
            guid,
            version,
            friendly_name: None,
        })
    }

    pub(crate) fn read_named<R: Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let guid = reader.read_guid()?;
        let version = reader.read_i32::<LittleEndian>()?;
        let friendly_name = Some(reader.read_fstring()?);
        Ok(CustomVersion {
            guid,
            version,
            friendly_name,
        })
    }

    pub(crate) fn write_unnamed<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_guid(&self.guid)?;
        writer.write_i32::<LittleEndian>(self.version)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn unnamed_round_trips() {
        let entry = CustomVersion::new(Guid::new([0xAB; 16]), 7);
        let mut buf = Vec::new();
        entry.write_unnamed(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(CustomVersion::read_unnamed(&mut cursor).unwrap(), entry);
    }

    #[test]
    fn named_variant_carries_friendly_name() {
        let mut buf = Vec::new();
        buf.write_guid(&Guid::ZERO).unwrap();
        buf.write_i32::<LittleEndian>(3).unwrap();
        buf.write_fstring("FortniteMain").unwrap();

        let mut cursor = Cursor::new(buf);
        let entry = CustomVersion::read_named(&mut cursor).unwrap();
        assert_eq!(entry.version, 3);
        assert_eq!(entry.friendly_name.as_deref(), Some("FortniteMain"));
    }
}

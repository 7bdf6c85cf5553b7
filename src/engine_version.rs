//! The embedded engine-version record inside the GVAS header.

use std::fmt::{self, Display};
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{GvasCursorRead, GvasCursorWrite};
use crate::error::Error;

/// The Unreal Engine build that produced a save file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineVersion {
    /// Major version number.
    pub major: u16,
    /// Minor version number.
    pub minor: u16,
    /// Patch version number.
    pub patch: u16,
    /// Build changelist number.
    pub changelist: u32,
    /// Branch name the build was cut from (often empty for shipped titles).
    pub branch: String,
}

impl Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{}+++{}",
            self.major, self.minor, self.patch, self.changelist, self.branch
        )
    }
}

impl EngineVersion {
    /// Reads the fixed-layout engine-version record.
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let major = reader.read_u16::<LittleEndian>()?;
        let minor = reader.read_u16::<LittleEndian>()?;
        let patch = reader.read_u16::<LittleEndian>()?;
        let changelist = reader.read_u32::<LittleEndian>()?;
        let branch = reader.read_fstring()?;
        Ok(EngineVersion {
            major,
            minor,
            patch,
            changelist,
            branch,
        })
    }

    /// Writes the engine-version record.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_u16::<LittleEndian>(self.major)?;
        writer.write_u16::<LittleEndian>(self.minor)?;
        writer.write_u16::<LittleEndian>(self.patch)?;
        writer.write_u32::<LittleEndian>(self.changelist)?;
        writer.write_fstring(&self.branch)?;
        Ok(())
    }
}

//! The well-known struct bodies that short-circuit generic field parsing.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Error;
use crate::types::Guid;

/// A struct type whose fixed binary layout is known, bypassing the generic
/// recursive field parser.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WellKnownStruct {
    /// `size == 16`: four `f32`s, `{X, Y, Z, W}`.
    Quat { x: f32, y: f32, z: f32, w: f32 },
    /// `size == 12`: three `f32`s, `{X, Y, Z}`.
    Vector { x: f32, y: f32, z: f32 },
    /// `size == 8`: one `i64` tick count.
    DateTime {
        /// Ticks since the Unreal epoch.
        ticks: i64,
    },
    /// `size == 16`: sixteen raw bytes, rendered canonically.
    Guid(Guid),
}

impl WellKnownStruct {
    /// Returns the well-known body for `struct_type`/`size`, or `None` if
    /// this isn't one of the recognized types (the caller should fall back
    /// to the generic recursive field parser).
    pub(crate) fn recognize(struct_type: &str, size: u32) -> Option<&'static str> {
        match (struct_type, size) {
            ("Quat", 16) => Some("Quat"),
            ("Vector", 12) => Some("Vector"),
            ("DateTime", 8) => Some("DateTime"),
            ("Guid", 16) => Some("Guid"),
            _ => None,
        }
    }

    pub(crate) fn read<R: Read + ?Sized>(kind: &str, reader: &mut R) -> Result<Self, Error> {
        match kind {
            "Quat" => Ok(WellKnownStruct::Quat {
                x: reader.read_f32::<LittleEndian>()?,
                y: reader.read_f32::<LittleEndian>()?,
                z: reader.read_f32::<LittleEndian>()?,
                w: reader.read_f32::<LittleEndian>()?,
            }),
            "Vector" => Ok(WellKnownStruct::Vector {
                x: reader.read_f32::<LittleEndian>()?,
                y: reader.read_f32::<LittleEndian>()?,
                z: reader.read_f32::<LittleEndian>()?,
            }),
            "DateTime" => Ok(WellKnownStruct::DateTime {
                ticks: reader.read_i64::<LittleEndian>()?,
            }),
            "Guid" => {
                let mut bytes = [0u8; 16];
                reader.read_exact(&mut bytes)?;
                Ok(WellKnownStruct::Guid(Guid::new(bytes)))
            }
            other => unreachable!("recognize() guards against unknown kind {other:?}"),
        }
    }

    pub(crate) fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            WellKnownStruct::Quat { x, y, z, w } => {
                writer.write_f32::<LittleEndian>(*x)?;
                writer.write_f32::<LittleEndian>(*y)?;
                writer.write_f32::<LittleEndian>(*z)?;
                writer.write_f32::<LittleEndian>(*w)?;
            }
            WellKnownStruct::Vector { x, y, z } => {
                writer.write_f32::<LittleEndian>(*x)?;
                writer.write_f32::<LittleEndian>(*y)?;
                writer.write_f32::<LittleEndian>(*z)?;
            }
            WellKnownStruct::DateTime { ticks } => {
                writer.write_i64::<LittleEndian>(*ticks)?;
            }
            WellKnownStruct::Guid(guid) => {
                writer.write_all(guid.as_bytes())?;
            }
        }
        Ok(())
    }

    pub(crate) fn wire_size(&self) -> u32 {
        match self {
            WellKnownStruct::Quat { .. } => 16,
            WellKnownStruct::Vector { .. } => 12,
            WellKnownStruct::DateTime { .. } => 8,
            WellKnownStruct::Guid(_) => 16,
        }
    }
}

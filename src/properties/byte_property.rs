//! `ByteProperty`: a scalar byte, or an enum member name when the declared
//! enum has one.

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{fstring_wire_len, GvasCursorRead, GvasCursorWrite};
use crate::error::Error;

/// `ByteProperty`'s body: a raw byte when the enum name is `"None"` (or the
/// declared size is exactly `1`), otherwise the enum member's name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteValue {
    /// A plain byte, tagged with the enum name it was read against
    /// (typically `"None"` for non-enum byte fields).
    Scalar {
        /// Name of the declaring enum, or `"None"` for a plain byte field.
        enum_name: String,
        /// The byte value.
        value: u8,
    },
    /// An enum member name, used when `size != 1`.
    Named {
        /// Name of the declaring enum.
        enum_name: String,
        /// The enum member's name.
        member: String,
    },
}

impl ByteValue {
    pub(crate) fn read<R: Read + ?Sized>(reader: &mut R, size: u32) -> Result<Self, Error> {
        let enum_name = reader.read_fstring()?;
        if size == 1 {
            let value = reader.read_u8()?;
            Ok(ByteValue::Scalar { enum_name, value })
        } else {
            let member = reader.read_fstring()?;
            Ok(ByteValue::Named { enum_name, member })
        }
    }

    pub(crate) fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            ByteValue::Scalar { enum_name, value } => {
                writer.write_fstring(enum_name)?;
                writer.write_u8(*value)?;
            }
            ByteValue::Named { enum_name, member } => {
                writer.write_fstring(enum_name)?;
                writer.write_fstring(member)?;
            }
        }
        Ok(())
    }

    pub(crate) fn wire_size(&self) -> u32 {
        match self {
            ByteValue::Scalar { .. } => 1,
            ByteValue::Named { member, .. } => fstring_wire_len(member),
        }
    }

    /// Actual bytes [`ByteValue::write`] emits, including the enum-name
    /// preamble that the declared `size` field omits.
    pub(crate) fn actual_wire_len(&self) -> u32 {
        match self {
            ByteValue::Scalar { enum_name, .. } => fstring_wire_len(enum_name) + 1,
            ByteValue::Named { enum_name, member } => {
                fstring_wire_len(enum_name) + fstring_wire_len(member)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn scalar_byte_round_trips() {
        let value = ByteValue::Scalar {
            enum_name: "None".to_string(),
            value: 7,
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(ByteValue::read(&mut cursor, 1).unwrap(), value);
    }

    #[test]
    fn named_enum_member_round_trips() {
        let value = ByteValue::Named {
            enum_name: "EFoo".to_string(),
            member: "EFoo::Bar".to_string(),
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let size = value.wire_size();
        let mut cursor = Cursor::new(buf);
        assert_eq!(ByteValue::read(&mut cursor, size).unwrap(), value);
    }
}

//! `StructProperty`: a named, GUID-tagged nested value. Four struct types
//! have a known fixed layout and short-circuit the generic recursive parser.

use std::io::{Read, Seek, Write};

use byteorder::WriteBytesExt;

use crate::cursor_ext::{fstring_wire_len, GvasCursorRead, GvasCursorWrite};
use crate::error::Error;
use crate::types::Guid;

use super::struct_types::WellKnownStruct;
use super::{
    read_bounded_property_list, record_wire_len, write_property_record, DecodeOptions,
    PropertyRecord, NONE_SENTINEL,
};

/// `StructProperty`'s body: one of the well-known fixed layouts, or a
/// recursive field list for any other struct type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructBody {
    /// A recognized fixed-layout struct (`Quat`, `Vector`, `DateTime`, `Guid`).
    WellKnown(WellKnownStruct),
    /// Any other struct type: an ordered field list, terminated by `"None"`
    /// when non-empty.
    Custom(Vec<PropertyRecord>),
}

/// `StructProperty`: `{struct_type, struct_guid, fields}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructValue {
    /// The struct's declared type name, e.g. `"Vector"` or a Blueprint struct
    /// path.
    pub struct_type: String,
    /// The struct's GUID; almost always the zero GUID for non-engine types.
    pub struct_guid: Guid,
    /// The struct's body.
    pub body: StructBody,
}

impl StructValue {
    pub(crate) fn read<R: Read + Seek + ?Sized>(
        reader: &mut R,
        size: u32,
        depth: usize,
        options: &DecodeOptions,
    ) -> Result<Self, Error> {
        let struct_type = reader.read_fstring()?;
        let struct_guid = reader.read_guid()?;
        reader.read_u8()?; // null separator

        let body = if let Some(kind) = WellKnownStruct::recognize(&struct_type, size) {
            StructBody::WellKnown(WellKnownStruct::read(kind, reader)?)
        } else {
            let end_pos = reader.stream_position()? + size as u64;
            let fields = read_bounded_property_list(reader, end_pos, depth, options)?;
            StructBody::Custom(fields)
        };

        Ok(StructValue {
            struct_type,
            struct_guid,
            body,
        })
    }

    pub(crate) fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_fstring(&self.struct_type)?;
        writer.write_guid(&self.struct_guid)?;
        writer.write_u8(0)?;
        match &self.body {
            StructBody::WellKnown(well_known) => well_known.write(writer)?,
            StructBody::Custom(fields) => {
                for field in fields {
                    write_property_record(writer, field)?;
                }
                if !fields.is_empty() {
                    writer.write_fstring(NONE_SENTINEL)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn wire_size(&self) -> u32 {
        match &self.body {
            StructBody::WellKnown(well_known) => well_known.wire_size(),
            StructBody::Custom(fields) => custom_fields_wire_len(fields),
        }
    }

    /// Actual body bytes emitted by [`StructValue::write`]; identical to
    /// [`StructValue::wire_size`] since a struct's declared `size` always
    /// matches its real body span.
    pub(crate) fn actual_wire_len(&self) -> u32 {
        self.wire_size()
    }
}

fn custom_fields_wire_len(fields: &[PropertyRecord]) -> u32 {
    let sentinel = if fields.is_empty() {
        0
    } else {
        fstring_wire_len(NONE_SENTINEL)
    };
    fields.iter().map(record_wire_len).sum::<u32>() + sentinel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyValue;
    use std::io::Cursor;

    #[test]
    fn vector_short_circuit_round_trips() {
        let value = StructValue {
            struct_type: "Vector".to_string(),
            struct_guid: Guid::ZERO,
            body: StructBody::WellKnown(WellKnownStruct::Vector {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            }),
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded =
            StructValue::read(&mut cursor, value.wire_size(), 0, &DecodeOptions::default())
                .unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn empty_custom_struct_has_no_trailing_sentinel() {
        let value = StructValue {
            struct_type: "MyStruct".to_string(),
            struct_guid: Guid::ZERO,
            body: StructBody::Custom(Vec::new()),
        };
        assert_eq!(value.wire_size(), 0);
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let preamble = fstring_wire_len("MyStruct") as usize + 16 + 1;
        assert_eq!(buf.len(), preamble);
    }

    #[test]
    fn custom_struct_round_trips_with_sentinel() {
        let value = StructValue {
            struct_type: "MyStruct".to_string(),
            struct_guid: Guid::ZERO,
            body: StructBody::Custom(vec![PropertyRecord {
                name: "Count".to_string(),
                tag: 0,
                value: PropertyValue::Int {
                    value: 7,
                    trailing_byte: 0,
                },
            }]),
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded =
            StructValue::read(&mut cursor, value.wire_size(), 0, &DecodeOptions::default())
                .unwrap();
        assert_eq!(decoded, value);
    }
}

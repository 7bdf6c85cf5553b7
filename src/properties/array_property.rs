//! `ArrayProperty`: a length-prefixed sequence whose element codec is
//! polymorphic on the declared inner type.

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{fstring_wire_len, GvasCursorRead, GvasCursorWrite};
use crate::error::Error;

use super::{
    read_bounded_property_list, record_wire_len, write_property_record, DecodeOptions,
    PropertyRecord, NONE_SENTINEL,
};

/// `ArrayProperty`'s body, polymorphic on `inner_type`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArrayBody {
    /// `inner_type == "ByteProperty"`: raw bytes, `prop_size - 4` of them.
    Byte(Vec<u8>),
    /// `inner_type` is `"StrProperty"` or `"NameProperty"`.
    Strings(Vec<String>),
    /// `inner_type == "IntProperty"`.
    Int(Vec<i32>),
    /// `inner_type == "FloatProperty"`.
    Float(Vec<f32>),
    /// `inner_type == "StructProperty"`: recursively parsed elements, each a
    /// full property record, bounded by the array's declared `size` or an
    /// early `"None"` sentinel.
    Struct(Vec<PropertyRecord>),
    /// Any other inner type: opaque `size` bytes, preserved for round-trip.
    Other(Vec<u8>),
}

/// `ArrayProperty`: `{inner_type, count, values}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayValue {
    /// `FString` naming the element kind (`"IntProperty"`, ...).
    pub inner_type: String,
    /// Declared element count, preserved verbatim; for `Byte`/`Struct`/other
    /// opaque bodies this does not bound the read and is metadata only.
    pub count: u32,
    /// The element payload, polymorphic on `inner_type`.
    pub body: ArrayBody,
}

impl ArrayValue {
    pub(crate) fn read<R: Read + Seek + ?Sized>(
        reader: &mut R,
        size: u32,
        depth: usize,
        options: &DecodeOptions,
    ) -> Result<Self, Error> {
        let inner_type = reader.read_fstring()?;
        reader.read_u8()?; // null separator
        let count = reader.read_u32::<LittleEndian>()?;

        let body = match inner_type.as_str() {
            "ByteProperty" => {
                let payload_len = size.saturating_sub(4) as usize;
                let mut bytes = vec![0u8; payload_len];
                reader.read_exact(&mut bytes)?;
                ArrayBody::Byte(bytes)
            }
            "StrProperty" | "NameProperty" => {
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(reader.read_fstring()?);
                }
                ArrayBody::Strings(values)
            }
            "IntProperty" => {
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(reader.read_i32::<LittleEndian>()?);
                }
                ArrayBody::Int(values)
            }
            "FloatProperty" => {
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(reader.read_f32::<LittleEndian>()?);
                }
                ArrayBody::Float(values)
            }
            "StructProperty" => {
                let end_pos = reader.stream_position()? + size as u64;
                let records = read_bounded_property_list(reader, end_pos, depth, options)?;
                ArrayBody::Struct(records)
            }
            _ => {
                let mut bytes = vec![0u8; size as usize];
                reader.read_exact(&mut bytes)?;
                ArrayBody::Other(bytes)
            }
        };

        Ok(ArrayValue {
            inner_type,
            count,
            body,
        })
    }

    pub(crate) fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_fstring(&self.inner_type)?;
        writer.write_u8(0)?;
        writer.write_u32::<LittleEndian>(self.count)?;
        match &self.body {
            ArrayBody::Byte(bytes) | ArrayBody::Other(bytes) => writer.write_all(bytes)?,
            ArrayBody::Strings(values) => {
                for value in values {
                    writer.write_fstring(value)?;
                }
            }
            ArrayBody::Int(values) => {
                for value in values {
                    writer.write_i32::<LittleEndian>(*value)?;
                }
            }
            ArrayBody::Float(values) => {
                for value in values {
                    writer.write_f32::<LittleEndian>(*value)?;
                }
            }
            ArrayBody::Struct(records) => {
                for record in records {
                    write_property_record(writer, record)?;
                }
                writer.write_fstring(NONE_SENTINEL)?;
            }
        }
        Ok(())
    }

    /// The declared `size` field: `count`+payload for `Byte`, the raw
    /// payload length for opaque inner types, the element-count-driven total
    /// for scalar arrays, and the bounded body span (including the trailing
    /// sentinel) for `Struct` arrays.
    pub(crate) fn wire_size(&self) -> u32 {
        match &self.body {
            ArrayBody::Byte(bytes) => bytes.len() as u32 + 4,
            ArrayBody::Other(bytes) => bytes.len() as u32,
            ArrayBody::Strings(values) => values.iter().map(|s| fstring_wire_len(s)).sum(),
            ArrayBody::Int(values) => values.len() as u32 * 4,
            ArrayBody::Float(values) => values.len() as u32 * 4,
            ArrayBody::Struct(_) => self.actual_wire_len(),
        }
    }

    /// Actual bytes [`ArrayValue::write`] emits for the body, used when this
    /// array is itself an element of an outer `Struct`/`Array<Struct>` whose
    /// bound must match real byte spans.
    pub(crate) fn actual_wire_len(&self) -> u32 {
        match &self.body {
            ArrayBody::Struct(records) => {
                records.iter().map(record_wire_len).sum::<u32>() + fstring_wire_len(NONE_SENTINEL)
            }
            _ => self.wire_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyValue;
    use std::io::Cursor;

    #[test]
    fn int_array_round_trips() {
        let value = ArrayValue {
            inner_type: "IntProperty".to_string(),
            count: 3,
            body: ArrayBody::Int(vec![1, 2, 3]),
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let size = value.wire_size();
        let mut cursor = Cursor::new(buf);
        let decoded =
            ArrayValue::read(&mut cursor, size, 0, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn byte_array_consumes_size_minus_four() {
        let payload = vec![0xAAu8, 0xBB, 0xCC];
        let value = ArrayValue {
            inner_type: "ByteProperty".to_string(),
            count: 3,
            body: ArrayBody::Byte(payload.clone()),
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        assert_eq!(value.wire_size(), payload.len() as u32 + 4);

        let mut cursor = Cursor::new(buf);
        let decoded =
            ArrayValue::read(&mut cursor, value.wire_size(), 0, &DecodeOptions::default())
                .unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn struct_array_bounds_by_size_and_appends_none() {
        let elements = vec![PropertyRecord {
            name: "X".to_string(),
            tag: 0,
            value: PropertyValue::Float(1.5),
        }];
        let value = ArrayValue {
            inner_type: "StructProperty".to_string(),
            count: 1,
            body: ArrayBody::Struct(elements),
        };
        let size = value.actual_wire_len();
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();

        // inner_type fstring + NUL + count(4) + body == full buffer.
        let preamble = fstring_wire_len("StructProperty") as usize + 1 + 4;
        assert_eq!(buf.len() - preamble, size as usize);

        let mut cursor = Cursor::new(buf);
        let decoded = ArrayValue::read(&mut cursor, size, 0, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, value);
    }
}

//! The tagged property stream: a recursive, self-describing value language
//! terminated at every nesting level by an `FString` equal to `"None"`.

mod array_property;
mod byte_property;
mod map_property;
mod struct_property;
mod struct_types;

pub use array_property::{ArrayBody, ArrayValue};
pub use byte_property::ByteValue;
pub use map_property::MapValue;
pub use struct_property::{StructBody, StructValue};
pub use struct_types::WellKnownStruct;

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{fstring_wire_len, GvasCursorRead, GvasCursorWrite};
use crate::error::{Error, FormatError};

/// The `FString` spelling of `"None"`, which terminates a property list at
/// every nesting level.
pub(crate) const NONE_SENTINEL: &str = "None";

/// Bounds how deeply `Array<Struct>`/nested `Struct` values may recurse
/// before decoding is aborted, guarding against adversarial inputs with a
/// native-stack-exhausting nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum recursion depth for nested `Struct`/`Array<Struct>` values.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions { max_depth: 64 }
    }
}

fn check_depth(depth: usize, options: &DecodeOptions) -> Result<(), Error> {
    if depth > options.max_depth {
        Err(FormatError::MaxDepthExceeded(options.max_depth).into())
    } else {
        Ok(())
    }
}

/// One entry of a property list: the shared `name`/`tag` header plus a
/// kind-specific [`PropertyValue`] body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyRecord {
    /// The property's field name.
    pub name: String,
    /// Opaque per-record index; almost always `0`, preserved verbatim.
    pub tag: u32,
    /// The kind-specific value.
    pub value: PropertyValue,
}

/// The ~14 property kinds of the tagged property stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    /// `BoolProperty`: value lives in the tag byte, on-wire `size == 0`.
    Bool(bool),
    /// `ByteProperty`: either a raw byte or an enum member name.
    Byte(ByteValue),
    /// `IntProperty`: an `i32` plus the mysterious trailing byte.
    Int {
        /// The integer value.
        value: i32,
        /// Trailing byte observed as `0x00` or `0xFF` in the wild; meaning
        /// unknown, preserved verbatim for round-trip.
        trailing_byte: u8,
    },
    /// `Int64Property`.
    Int64(i64),
    /// `UInt64Property`.
    UInt64(u64),
    /// `FloatProperty`.
    Float(f32),
    /// `DoubleProperty`.
    Double(f64),
    /// `StrProperty`.
    Str(String),
    /// `NameProperty`.
    Name(String),
    /// `ObjectProperty`: an asset path.
    Object(String),
    /// `TextProperty`: opaque bytes, Unreal's localization envelope is not
    /// modelled.
    Text(Vec<u8>),
    /// `ArrayProperty`.
    Array(ArrayValue),
    /// `StructProperty`.
    Struct(StructValue),
    /// `MapProperty`: opaque payload, key/value types preserved for display.
    Map(MapValue),
}

impl PropertyValue {
    /// The `FString` spelling of this value's kind, as it appears in the
    /// `type` field of the wire header.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "BoolProperty",
            PropertyValue::Byte(_) => "ByteProperty",
            PropertyValue::Int { .. } => "IntProperty",
            PropertyValue::Int64(_) => "Int64Property",
            PropertyValue::UInt64(_) => "UInt64Property",
            PropertyValue::Float(_) => "FloatProperty",
            PropertyValue::Double(_) => "DoubleProperty",
            PropertyValue::Str(_) => "StrProperty",
            PropertyValue::Name(_) => "NameProperty",
            PropertyValue::Object(_) => "ObjectProperty",
            PropertyValue::Text(_) => "TextProperty",
            PropertyValue::Array(_) => "ArrayProperty",
            PropertyValue::Struct(_) => "StructProperty",
            PropertyValue::Map(_) => "MapProperty",
        }
    }
}

fn expect_size(kind: &'static str, expected: u32, actual: u32) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(FormatError::InvalidValueSize {
            kind,
            expected,
            actual,
        }
        .into())
    }
}

fn read_nul<R: Read + ?Sized>(reader: &mut R) -> Result<(), Error> {
    let byte = reader.read_u8()?;
    // The separator is always zero on well-formed input; preserved only
    // implicitly since it carries no information of its own.
    let _ = byte;
    Ok(())
}

/// Reads one property record, or `None` if the `"None"` sentinel was hit.
pub(crate) fn read_property_record<R: Read + Seek + ?Sized>(
    reader: &mut R,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Option<PropertyRecord>, Error> {
    let name = reader.read_fstring()?;
    if name.is_empty() || name == NONE_SENTINEL {
        return Ok(None);
    }

    let kind = reader.read_fstring()?;
    let size = reader.read_u32::<LittleEndian>()?;
    let tag = reader.read_u32::<LittleEndian>()?;

    let value = read_property_body(reader, &kind, size, depth, options)?;
    Ok(Some(PropertyRecord { name, tag, value }))
}

fn read_property_body<R: Read + Seek + ?Sized>(
    reader: &mut R,
    kind: &str,
    size: u32,
    depth: usize,
    options: &DecodeOptions,
) -> Result<PropertyValue, Error> {
    match kind {
        "BoolProperty" => {
            let value = reader.read_u8()? != 0;
            read_nul(reader)?;
            Ok(PropertyValue::Bool(value))
        }
        "ByteProperty" => Ok(PropertyValue::Byte(ByteValue::read(reader, size)?)),
        "IntProperty" => {
            expect_size("IntProperty", 4, size)?;
            let value = reader.read_i32::<LittleEndian>()?;
            let trailing_byte = reader.read_u8()?;
            Ok(PropertyValue::Int {
                value,
                trailing_byte,
            })
        }
        "Int64Property" => {
            expect_size("Int64Property", 8, size)?;
            Ok(PropertyValue::Int64(reader.read_i64::<LittleEndian>()?))
        }
        "UInt64Property" => {
            expect_size("UInt64Property", 8, size)?;
            Ok(PropertyValue::UInt64(reader.read_u64::<LittleEndian>()?))
        }
        "FloatProperty" => {
            expect_size("FloatProperty", 4, size)?;
            Ok(PropertyValue::Float(reader.read_f32::<LittleEndian>()?))
        }
        "DoubleProperty" => {
            expect_size("DoubleProperty", 8, size)?;
            Ok(PropertyValue::Double(reader.read_f64::<LittleEndian>()?))
        }
        "StrProperty" => Ok(PropertyValue::Str(read_string_body(reader, size)?)),
        "NameProperty" => Ok(PropertyValue::Name(read_string_body(reader, size)?)),
        "ObjectProperty" => Ok(PropertyValue::Object(read_string_body(reader, size)?)),
        "TextProperty" => {
            let mut body = vec![0u8; size as usize];
            reader.read_exact(&mut body)?;
            read_nul(reader)?;
            Ok(PropertyValue::Text(body))
        }
        "ArrayProperty" => Ok(PropertyValue::Array(ArrayValue::read(
            reader, size, depth, options,
        )?)),
        "StructProperty" => Ok(PropertyValue::Struct(StructValue::read(
            reader, size, depth, options,
        )?)),
        "MapProperty" => Ok(PropertyValue::Map(MapValue::read(reader, size)?)),
        other => Err(FormatError::UnknownPropertyKind(other.to_string()).into()),
    }
}

fn read_string_body<R: Read + ?Sized>(reader: &mut R, size: u32) -> Result<String, Error> {
    read_nul(reader)?;
    let value = reader.read_fstring()?;
    let expected = fstring_wire_len(&value);
    if expected != size {
        return Err(FormatError::InvalidStringSize {
            expected,
            actual: size,
        }
        .into());
    }
    Ok(value)
}

/// Reads a property list bounded only by the `"None"` sentinel (used for the
/// top-level stream).
pub(crate) fn read_property_list<R: Read + Seek + ?Sized>(
    reader: &mut R,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Vec<PropertyRecord>, Error> {
    check_depth(depth, options)?;
    let mut records = Vec::new();
    while let Some(record) = read_property_record(reader, depth + 1, options)? {
        records.push(record);
    }
    Ok(records)
}

/// Reads a property list bounded by whichever comes first: the `"None"`
/// sentinel, or the stream reaching `end_pos` (used for `Struct` bodies and
/// `Array<Struct>` elements, whose declared `size` field delimits them).
pub(crate) fn read_bounded_property_list<R: Read + Seek + ?Sized>(
    reader: &mut R,
    end_pos: u64,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Vec<PropertyRecord>, Error> {
    check_depth(depth, options)?;
    let mut records = Vec::new();
    loop {
        if reader.stream_position()? >= end_pos {
            break;
        }
        match read_property_record(reader, depth + 1, options)? {
            Some(record) => records.push(record),
            None => break,
        }
    }
    Ok(records)
}

/// The actual number of bytes [`write_property_record`] emits for `record`,
/// including its own `name`/`type`/`size`/`tag` header. Used to recompute the
/// declared `size` field of a `Struct`/`Array<Struct>` body that bounds a
/// nested property list, which (unlike `size` fields in general) must match
/// the real byte span for the bound to round-trip correctly.
pub(crate) fn record_wire_len(record: &PropertyRecord) -> u32 {
    fstring_wire_len(&record.name)
        + fstring_wire_len(record.value.kind_name())
        + 4
        + 4
        + body_wire_len(&record.value)
}

/// The actual number of body bytes [`write_property_body`] emits for `value`
/// — as opposed to [`property_size`], which is the kind's *declared* `size`
/// field and, for most kinds, omits a few bytes of fixed preamble/separator
/// overhead that the body always carries on the wire.
fn body_wire_len(value: &PropertyValue) -> u32 {
    match value {
        PropertyValue::Bool(_) => 2,
        PropertyValue::Byte(b) => b.actual_wire_len(),
        PropertyValue::Int { .. } => 5,
        PropertyValue::Int64(_) | PropertyValue::UInt64(_) | PropertyValue::Double(_) => 8,
        PropertyValue::Float(_) => 4,
        PropertyValue::Str(s) | PropertyValue::Name(s) | PropertyValue::Object(s) => {
            1 + fstring_wire_len(s)
        }
        PropertyValue::Text(bytes) => bytes.len() as u32 + 1,
        PropertyValue::Array(a) => a.actual_wire_len(),
        PropertyValue::Struct(s) => s.actual_wire_len(),
        PropertyValue::Map(m) => m.actual_wire_len(),
    }
}

/// Writes one property record (header plus body), the exact inverse of
/// [`read_property_record`].
pub(crate) fn write_property_record<W: Write + ?Sized>(
    writer: &mut W,
    record: &PropertyRecord,
) -> Result<(), Error> {
    writer.write_fstring(&record.name)?;
    writer.write_fstring(record.value.kind_name())?;
    writer.write_u32::<LittleEndian>(property_size(&record.value))?;
    writer.write_u32::<LittleEndian>(record.tag)?;
    write_property_body(writer, &record.value)?;
    Ok(())
}

fn property_size(value: &PropertyValue) -> u32 {
    match value {
        PropertyValue::Bool(_) => 0,
        PropertyValue::Byte(b) => b.wire_size(),
        PropertyValue::Int { .. } => 4,
        PropertyValue::Int64(_) | PropertyValue::UInt64(_) | PropertyValue::Double(_) => 8,
        PropertyValue::Float(_) => 4,
        PropertyValue::Str(s) | PropertyValue::Name(s) | PropertyValue::Object(s) => {
            fstring_wire_len(s)
        }
        PropertyValue::Text(bytes) => bytes.len() as u32,
        PropertyValue::Array(a) => a.wire_size(),
        PropertyValue::Struct(s) => s.wire_size(),
        PropertyValue::Map(m) => m.wire_size(),
    }
}

fn write_property_body<W: Write + ?Sized>(
    writer: &mut W,
    value: &PropertyValue,
) -> Result<(), Error> {
    match value {
        PropertyValue::Bool(b) => {
            writer.write_u8(u8::from(*b))?;
            writer.write_u8(0)?;
        }
        PropertyValue::Byte(b) => b.write(writer)?,
        PropertyValue::Int {
            value,
            trailing_byte,
        } => {
            writer.write_i32::<LittleEndian>(*value)?;
            writer.write_u8(*trailing_byte)?;
        }
        PropertyValue::Int64(v) => writer.write_i64::<LittleEndian>(*v)?,
        PropertyValue::UInt64(v) => writer.write_u64::<LittleEndian>(*v)?,
        PropertyValue::Float(v) => writer.write_f32::<LittleEndian>(*v)?,
        PropertyValue::Double(v) => writer.write_f64::<LittleEndian>(*v)?,
        PropertyValue::Str(s) | PropertyValue::Name(s) | PropertyValue::Object(s) => {
            writer.write_u8(0)?;
            writer.write_fstring(s)?;
        }
        PropertyValue::Text(bytes) => {
            writer.write_all(bytes)?;
            writer.write_u8(0)?;
        }
        PropertyValue::Array(a) => a.write(writer)?,
        PropertyValue::Struct(s) => s.write(writer)?,
        PropertyValue::Map(m) => m.write(writer)?,
    }
    Ok(())
}

/// Writes a property list followed by the `"None"` sentinel.
pub(crate) fn write_property_list<W: Write + ?Sized>(
    writer: &mut W,
    records: &[PropertyRecord],
) -> Result<(), Error> {
    for record in records {
        write_property_record(writer, record)?;
    }
    writer.write_fstring(NONE_SENTINEL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn bool_property_round_trips_s6() {
        let mut buf = Vec::new();
        buf.write_fstring("X").unwrap();
        buf.write_fstring("BoolProperty").unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u8(1).unwrap();
        buf.write_u8(0).unwrap();
        assert_eq!(buf.len(), 15);

        let mut cursor = Cursor::new(buf.clone());
        let options = DecodeOptions::default();
        let record = read_property_record(&mut cursor, 0, &options)
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "X");
        assert_eq!(record.value, PropertyValue::Bool(true));

        let mut rewritten = Vec::new();
        write_property_record(&mut rewritten, &record).unwrap();
        assert_eq!(rewritten, buf);
    }

    #[test]
    fn unknown_kind_is_fatal() {
        let mut buf = Vec::new();
        buf.write_fstring("X").unwrap();
        buf.write_fstring("NoSuchProperty").unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        let mut cursor = Cursor::new(buf);
        let err = read_property_record(&mut cursor, 0, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::UnknownPropertyKind(_))));
    }

    #[test]
    fn none_sentinel_terminates_list() {
        let mut buf = Vec::new();
        buf.write_fstring(NONE_SENTINEL).unwrap();
        let mut cursor = Cursor::new(buf);
        let list = read_property_list(&mut cursor, 0, &DecodeOptions::default()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn int_property_preserves_mystery_byte() {
        let mut buf = Vec::new();
        buf.write_fstring("Health").unwrap();
        buf.write_fstring("IntProperty").unwrap();
        buf.write_u32::<LittleEndian>(4).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_i32::<LittleEndian>(42).unwrap();
        buf.write_u8(0xFF).unwrap();

        let mut cursor = Cursor::new(buf.clone());
        let record = read_property_record(&mut cursor, 0, &DecodeOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            record.value,
            PropertyValue::Int {
                value: 42,
                trailing_byte: 0xFF
            }
        );
        let mut rewritten = Vec::new();
        write_property_record(&mut rewritten, &record).unwrap();
        assert_eq!(rewritten, buf);
    }

    #[test]
    fn invalid_int64_size_is_fatal() {
        let mut buf = Vec::new();
        buf.write_fstring("X").unwrap();
        buf.write_fstring("Int64Property").unwrap();
        buf.write_u32::<LittleEndian>(4).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_i32::<LittleEndian>(1).unwrap();
        let mut cursor = Cursor::new(buf);
        let err = read_property_record(&mut cursor, 0, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::InvalidValueSize { kind: "Int64Property", .. })
        ));
    }
}

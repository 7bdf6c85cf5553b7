//! `MapProperty`: preserved as an opaque payload. Entry-level interpretation
//! of the key/value type names is out of scope; the raw bytes round-trip
//! unchanged.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::GvasCursorRead;
use crate::cursor_ext::GvasCursorWrite;
use crate::error::Error;

/// `MapProperty`: `{key_type, value_type, map_size, payload}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapValue {
    /// `FString` naming the key type.
    pub key_type: String,
    /// `FString` naming the value type.
    pub value_type: String,
    /// Declared entry count; entries themselves are not decoded.
    pub map_size: u32,
    /// Opaque entry bytes, `prop_size - 5` of them.
    pub payload: Vec<u8>,
}

impl MapValue {
    pub(crate) fn read<R: Read + ?Sized>(reader: &mut R, size: u32) -> Result<Self, Error> {
        let key_type = reader.read_fstring()?;
        let value_type = reader.read_fstring()?;
        reader.read_u8()?; // null separator
        let map_size = reader.read_u32::<LittleEndian>()?;
        let payload_len = size.saturating_sub(5) as usize;
        let mut payload = vec![0u8; payload_len];
        reader.read_exact(&mut payload)?;
        reader.read_u8()?; // null separator

        Ok(MapValue {
            key_type,
            value_type,
            map_size,
            payload,
        })
    }

    pub(crate) fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_fstring(&self.key_type)?;
        writer.write_fstring(&self.value_type)?;
        writer.write_u8(0)?;
        writer.write_u32::<LittleEndian>(self.map_size)?;
        writer.write_all(&self.payload)?;
        writer.write_u8(0)?;
        Ok(())
    }

    pub(crate) fn wire_size(&self) -> u32 {
        self.payload.len() as u32 + 5
    }

    pub(crate) fn actual_wire_len(&self) -> u32 {
        self.wire_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn opaque_payload_round_trips() {
        let value = MapValue {
            key_type: "StrProperty".to_string(),
            value_type: "IntProperty".to_string(),
            map_size: 2,
            payload: vec![1, 2, 3, 4, 5],
        };
        let mut buf = Vec::new();
        value.write(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded = MapValue::read(&mut cursor, value.wire_size()).unwrap();
        assert_eq!(decoded, value);
    }
}

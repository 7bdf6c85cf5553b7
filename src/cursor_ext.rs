//! Little-endian integer and `FString` primitives.
//!
//! Everything in this module reads or writes against any `Read`/`Write`
//! implementor directly — no intermediate buffering beyond what `byteorder`
//! itself does — so the same trait works for an in-memory `Cursor<Vec<u8>>`
//! and for a `File`.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, FormatError};
use crate::types::Guid;

/// Extension trait for reading GVAS primitives.
pub trait GvasCursorRead: Read {
    /// Reads an Unreal `FString`.
    ///
    /// A 4-byte signed length prefix selects the encoding: `0` is empty,
    /// positive is UTF-8 (including a trailing NUL byte), negative is
    /// UTF-16LE (including a trailing NUL code unit, `-len` code units total).
    fn read_fstring(&mut self) -> Result<String, Error> {
        let len = self.read_i32::<LittleEndian>()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len > 0 {
            let len = len as usize;
            let mut buf = vec![0u8; len];
            self.read_exact(&mut buf)?;
            if buf.last() == Some(&0) {
                buf.pop();
            }
            return Ok(String::from_utf8_lossy(&buf).into_owned());
        }
        let units = (-len) as usize;
        let mut buf = vec![0u16; units];
        for slot in buf.iter_mut() {
            *slot = self.read_u16::<LittleEndian>()?;
        }
        if buf.last() == Some(&0) {
            buf.pop();
        }
        Ok(String::from_utf16_lossy(&buf))
    }

    /// Reads a 16-byte GUID and renders it in canonical form.
    fn read_guid(&mut self) -> Result<Guid, Error> {
        let mut bytes = [0u8; 16];
        self.read_exact(&mut bytes)?;
        Ok(Guid::new(bytes))
    }
}

impl<R: Read + ?Sized> GvasCursorRead for R {}

/// Extension trait for writing GVAS primitives.
pub trait GvasCursorWrite: Write {
    /// Writes an Unreal `FString`, choosing UTF-8 or UTF-16LE depending on
    /// whether every character is representable as a single ASCII byte.
    fn write_fstring(&mut self, value: &str) -> Result<(), Error> {
        if value.is_empty() {
            self.write_i32::<LittleEndian>(0)?;
            return Ok(());
        }

        if value.is_ascii() {
            let len = value.len() + 1;
            self.write_i32::<LittleEndian>(len as i32)?;
            self.write_all(value.as_bytes())?;
            self.write_u8(0)?;
        } else {
            let units: Vec<u16> = value.encode_utf16().collect();
            let len = units.len() + 1;
            self.write_i32::<LittleEndian>(-(len as i32))?;
            for unit in units {
                self.write_u16::<LittleEndian>(unit)?;
            }
            self.write_u16::<LittleEndian>(0)?;
        }
        Ok(())
    }

    /// Writes a 16-byte GUID, the exact inverse of [`GvasCursorRead::read_guid`].
    fn write_guid(&mut self, guid: &Guid) -> Result<(), Error> {
        self.write_all(guid.as_bytes())?;
        Ok(())
    }
}

impl<W: Write + ?Sized> GvasCursorWrite for W {}

/// The length, in bytes, `value` would occupy when written with
/// [`GvasCursorWrite::write_fstring`]. Used to recompute `StrProperty`-family
/// `size` fields before serialization.
pub fn fstring_wire_len(value: &str) -> u32 {
    if value.is_empty() {
        return 4;
    }
    if value.is_ascii() {
        4 + value.len() as u32 + 1
    } else {
        4 + (value.encode_utf16().count() as u32 + 1) * 2
    }
}

/// Reads `n` raw bytes, surfacing an I/O-flavored [`FormatError`] on short reads.
pub fn read_exact_n<R: Read + ?Sized>(reader: &mut R, n: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; n];
    reader
        .read_exact(&mut buf)
        .map_err(|e| -> Error {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                FormatError::Malformed {
                    what: "property body",
                    detail: format!("expected {n} bytes, stream ended early"),
                }
                .into()
            } else {
                e.into()
            }
        })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_string_round_trips_s1() {
        let mut buf = Vec::new();
        buf.write_fstring("").unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0]);
        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_fstring().unwrap(), "");
    }

    #[test]
    fn ascii_string_round_trips_s2() {
        let mut buf = Vec::new();
        buf.write_fstring("Hi").unwrap();
        assert_eq!(buf, vec![0x03, 0x00, 0x00, 0x00, b'H', b'i', 0x00]);
        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_fstring().unwrap(), "Hi");
    }

    #[test]
    fn utf16_string_round_trips_s3() {
        let mut buf = Vec::new();
        buf.write_fstring("é").unwrap();
        assert_eq!(
            buf,
            vec![0xFE, 0xFF, 0xFF, 0xFF, 0xE9, 0x00, 0x00, 0x00]
        );
        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_fstring().unwrap(), "é");
    }

    #[test]
    fn guid_round_trips_s4() {
        let raw: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ];
        let guid = Guid::new(raw);
        let mut buf = Vec::new();
        buf.write_guid(&guid).unwrap();
        assert_eq!(buf, raw);
        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_guid().unwrap(), guid);
    }

    #[test]
    fn fstring_wire_len_matches_actual_encoding() {
        for s in ["", "Hi", "é", "longer ascii string"] {
            let mut buf = Vec::new();
            buf.write_fstring(s).unwrap();
            assert_eq!(buf.len() as u32, fstring_wire_len(s), "mismatch for {s:?}");
        }
    }
}

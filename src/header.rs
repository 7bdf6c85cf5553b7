//! The GVAS container header: fixed prelude plus the ambiguous
//! custom-versions record.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{GvasCursorRead, GvasCursorWrite};
use crate::custom_version::CustomVersion;
use crate::engine_version::EngineVersion;
use crate::error::{Error, FormatError};

/// The four bytes `GVAS` that open every file this crate reads.
pub const MAGIC: [u8; 4] = *b"GVAS";

/// Guard bounds and thresholds used by the header's plausibility checks.
mod plausibility {
    pub const MAX_CUSTOM_VERSION_COUNT: i32 = 10_000;
    pub const MAX_CUSTOM_VERSION_FORMAT: i32 = 10;
    pub const MAX_ENGINE_COMPONENT_FOR_DUAL_LAYOUT: u16 = 50;
    pub const MAX_CLASS_NAME_LEN: usize = 2048;
    pub const MIN_PLAUSIBLE_CHAR_RATIO: f64 = 0.75;
    pub const ALLOWED_CLASS_NAME_CHARS: &str =
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_./\\:-$[]()<>@!%+, '\"";
}

/// Whether the fixed-size file-version field is a single `package_file_version`
/// (pre-UE5 saves) or a `(ue4, ue5)` pair (UE5's `FPackageFileSummary` split).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileVersion {
    /// Pre-split layout: one combined package file version.
    Single {
        /// The package file version.
        package_file_version: i32,
    },
    /// Post-UE5-split layout.
    Dual {
        /// UE4 package file version.
        ue4: i32,
        /// UE5 package file version.
        ue5: i32,
    },
}

/// The decoded GVAS header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GvasHeader {
    /// `FSaveGameFileVersion`-ish version of the save-file container itself.
    pub save_game_version: i32,
    /// Single vs. dual package file version, per the dual-layout heuristic.
    pub file_version: FileVersion,
    /// The engine build that wrote the save.
    pub engine_version: EngineVersion,
    /// Leading format tag of the custom-versions record, when the detected
    /// variant carries one.
    pub custom_versions_format: Option<i32>,
    /// Ordered `(guid, version)` compatibility entries.
    pub custom_versions: Vec<CustomVersion>,
    /// Fully qualified save-game class path, e.g. `/Game/Blueprints/MySave.MySave_C`.
    pub save_game_class_name: String,
}

/// The five custom-versions layouts this codec knows how to detect, tried in
/// this order until one produces a plausible class name.
#[derive(Debug, Clone, Copy)]
enum Variant {
    /// `fmt, count, (guid, ver) * count, name`
    A,
    /// `fmt, count, (guid, ver, friendly) * count, name`
    B,
    /// `count, (guid, ver) * count, name`
    C,
    /// `count, (guid, ver, friendly) * count, name`
    D,
    /// `name` (no custom versions at all)
    E,
}

const VARIANTS: [Variant; 5] = [Variant::A, Variant::B, Variant::C, Variant::D, Variant::E];

type CustomVersionsTail = (Option<i32>, Vec<CustomVersion>, String);

fn guard_count(count: i32) -> Result<usize, Error> {
    if (0..=plausibility::MAX_CUSTOM_VERSION_COUNT).contains(&count) {
        Ok(count as usize)
    } else {
        Err(FormatError::ImplausibleHeader.into())
    }
}

fn guard_format(fmt: i32) -> Result<i32, Error> {
    if (0..=plausibility::MAX_CUSTOM_VERSION_FORMAT).contains(&fmt) {
        Ok(fmt)
    } else {
        Err(FormatError::ImplausibleHeader.into())
    }
}

/// Whether `s` looks like a plausible Unreal class path: bounded length and a
/// high ratio of characters drawn from the set class paths are built from.
/// Markers like `/Game/` are a fast-accept, never a requirement.
fn plausible_class_name(s: &str) -> bool {
    let len = s.chars().count();
    if !(1..=plausibility::MAX_CLASS_NAME_LEN).contains(&len) {
        return false;
    }
    let allowed_ratio = s
        .chars()
        .filter(|c| plausibility::ALLOWED_CLASS_NAME_CHARS.contains(*c))
        .count() as f64
        / len as f64;
    if allowed_ratio < plausibility::MIN_PLAUSIBLE_CHAR_RATIO {
        return false;
    }
    true
}

impl GvasHeader {
    fn try_variant<R: Read + ?Sized>(
        reader: &mut R,
        variant: Variant,
    ) -> Result<CustomVersionsTail, Error> {
        let (fmt, count) = match variant {
            Variant::A | Variant::B => {
                let fmt = guard_format(reader.read_i32::<LittleEndian>()?)?;
                let count = guard_count(reader.read_i32::<LittleEndian>()?)?;
                (Some(fmt), count)
            }
            Variant::C | Variant::D => {
                let count = guard_count(reader.read_i32::<LittleEndian>()?)?;
                (None, count)
            }
            Variant::E => (None, 0),
        };

        let mut custom_versions = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let entry = match variant {
                Variant::A | Variant::C => CustomVersion::read_unnamed(reader)?,
                Variant::B | Variant::D => CustomVersion::read_named(reader)?,
                Variant::E => unreachable!("Variant::E has count == 0"),
            };
            custom_versions.push(entry);
        }

        let class_name = reader.read_fstring()?;
        if !plausible_class_name(&class_name) {
            return Err(FormatError::ImplausibleHeader.into());
        }

        Ok((fmt, custom_versions, class_name))
    }

    /// Reads a `GvasHeader` from the start of `reader`.
    ///
    /// Dual-vs-single file versions and the custom-versions layout are both
    /// detected heuristically: each candidate is tried against a snapshot of
    /// the cursor position and rolled back on failure.
    pub fn read<R: Read + Seek + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(FormatError::MagicNotFound.into());
        }

        let save_game_version = reader.read_i32::<LittleEndian>()?;

        let dual_probe_pos = reader.stream_position()?;
        let ue4 = reader.read_i32::<LittleEndian>()?;
        let ue5 = reader.read_i32::<LittleEndian>()?;
        let peek_major = reader.read_u16::<LittleEndian>()?;
        let peek_minor = reader.read_u16::<LittleEndian>()?;
        let dual_plausible = peek_major <= plausibility::MAX_ENGINE_COMPONENT_FOR_DUAL_LAYOUT
            && peek_minor <= plausibility::MAX_ENGINE_COMPONENT_FOR_DUAL_LAYOUT;

        reader.seek(SeekFrom::Start(dual_probe_pos))?;
        let file_version = if dual_plausible {
            let ue4 = reader.read_i32::<LittleEndian>()?;
            let ue5 = reader.read_i32::<LittleEndian>()?;
            FileVersion::Dual { ue4, ue5 }
        } else {
            let package_file_version = reader.read_i32::<LittleEndian>()?;
            FileVersion::Single {
                package_file_version,
            }
        };

        let engine_version = EngineVersion::read(reader)?;

        let custom_versions_pos = reader.stream_position()?;
        let mut tail = None;
        for variant in VARIANTS {
            reader.seek(SeekFrom::Start(custom_versions_pos))?;
            if let Ok(result) = Self::try_variant(reader, variant) {
                tail = Some(result);
                break;
            }
        }
        let (custom_versions_format, custom_versions, save_game_class_name) =
            tail.ok_or(FormatError::ImplausibleHeader)?;

        Ok(GvasHeader {
            save_game_version,
            file_version,
            engine_version,
            custom_versions_format,
            custom_versions,
            save_game_class_name,
        })
    }

    /// Writes the header in canonical Variant-A shape (format tag + unnamed
    /// `(guid, version)` entries), regardless of which variant it was read as.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_all(&MAGIC)?;
        writer.write_i32::<LittleEndian>(self.save_game_version)?;
        match self.file_version {
            FileVersion::Dual { ue4, ue5 } => {
                writer.write_i32::<LittleEndian>(ue4)?;
                writer.write_i32::<LittleEndian>(ue5)?;
            }
            FileVersion::Single {
                package_file_version,
            } => {
                writer.write_i32::<LittleEndian>(package_file_version)?;
            }
        }
        self.engine_version.write(writer)?;

        // Default format tag: 3, the value FCustomVersion's container format
        // has used since custom versions were introduced.
        let fmt = self.custom_versions_format.unwrap_or(3);
        writer.write_i32::<LittleEndian>(fmt)?;
        writer.write_i32::<LittleEndian>(self.custom_versions.len() as i32)?;
        for entry in &self.custom_versions {
            entry.write_unnamed(writer)?;
        }
        writer.write_fstring(&self.save_game_class_name)?;
        Ok(())
    }
}

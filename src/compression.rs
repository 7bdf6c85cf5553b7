//! The compression envelope: unwraps whole-file compression framings before
//! the header codec ever sees a byte.

use std::io::Read;

use crate::error::{DecompressionError, Error};
use crate::header::MAGIC;

/// Maximum span, in bytes, searched for the `"GVAS"` magic after a candidate
/// decompression succeeds but didn't land on the magic at offset 0.
const MAGIC_SEARCH_WINDOW: usize = 256;

/// Compression method selector for [`decompress_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressionMethod {
    /// Sniff the magic, then fall back through every known codec in order.
    #[default]
    Auto,
    /// The buffer is already plaintext.
    None,
    /// zlib-wrapped DEFLATE (2-byte header, Adler-32 trailer).
    Zlib,
    /// Raw DEFLATE, no header or trailer.
    Deflate,
    /// gzip-wrapped DEFLATE.
    Gzip,
    /// LZ4 frame format (not LZ4 block format).
    Lz4,
    /// Zstandard.
    Zstd,
}

fn decompress_zlib(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

fn decompress_deflate(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

fn decompress_gzip(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

fn decompress_lz4(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    lz4_flex::frame::FrameDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| e.to_string())?;
    Ok(out)
}

fn decompress_zstd(bytes: &[u8]) -> Result<Vec<u8>, String> {
    zstd::stream::decode_all(bytes).map_err(|e| e.to_string())
}

fn codec_name(method: CompressionMethod) -> &'static str {
    match method {
        CompressionMethod::Auto => "auto",
        CompressionMethod::None => "none",
        CompressionMethod::Zlib => "zlib",
        CompressionMethod::Deflate => "deflate",
        CompressionMethod::Gzip => "gzip",
        CompressionMethod::Lz4 => "lz4",
        CompressionMethod::Zstd => "zstd",
    }
}

fn run_codec(bytes: &[u8], method: CompressionMethod) -> Result<Vec<u8>, String> {
    match method {
        CompressionMethod::Auto => unreachable!("auto is resolved by decompress_payload"),
        CompressionMethod::None => Ok(bytes.to_vec()),
        CompressionMethod::Zlib => decompress_zlib(bytes),
        CompressionMethod::Deflate => decompress_deflate(bytes),
        CompressionMethod::Gzip => decompress_gzip(bytes),
        CompressionMethod::Lz4 => decompress_lz4(bytes),
        CompressionMethod::Zstd => decompress_zstd(bytes),
    }
}

/// Finds `"GVAS"` within the first [`MAGIC_SEARCH_WINDOW`] bytes of `bytes`
/// and returns the slice starting there, if present.
fn rescue_magic(bytes: &[u8]) -> Option<&[u8]> {
    let window = bytes.len().min(MAGIC_SEARCH_WINDOW);
    bytes[..window]
        .windows(MAGIC.len())
        .position(|w| w == MAGIC)
        .map(|offset| &bytes[offset..])
}

/// Sniffs `bytes`' leading magic to guess its compression codec, for `auto`'s
/// first attempt.
fn sniff(bytes: &[u8]) -> Option<CompressionMethod> {
    if bytes.starts_with(&[0x1F, 0x8B]) {
        Some(CompressionMethod::Gzip)
    } else if bytes.starts_with(&[0x28, 0xB5, 0x2F, 0xFD]) {
        Some(CompressionMethod::Zstd)
    } else if bytes.starts_with(&[0x04, 0x22, 0x4D, 0x18]) {
        Some(CompressionMethod::Lz4)
    } else {
        None
    }
}

/// Decompresses `bytes` per `method`, returning plaintext whose first four
/// bytes are `"GVAS"`.
///
/// An explicit method that fails surfaces a named [`DecompressionError`]. In
/// `auto` mode the sniffed codec is tried first, then every other codec in
/// the fixed order `zlib, deflate, gzip, lz4, zstd`; the first result whose
/// output starts with the magic (directly, or after a bounded rescue search)
/// wins. If no candidate produces the magic, `auto` returns
/// [`DecompressionError::AutoExhausted`].
pub fn decompress_payload(bytes: &[u8], method: CompressionMethod) -> Result<Vec<u8>, Error> {
    if method != CompressionMethod::Auto {
        return run_codec(bytes, method)
            .map_err(|reason| {
                DecompressionError::CodecFailed {
                    method: codec_name(method),
                    reason,
                }
                .into()
            })
            .and_then(|plaintext| finalize(plaintext, bytes));
    }

    let mut order = Vec::with_capacity(6);
    if let Some(sniffed) = sniff(bytes) {
        order.push(sniffed);
    }
    for candidate in [
        CompressionMethod::Zlib,
        CompressionMethod::Deflate,
        CompressionMethod::Gzip,
        CompressionMethod::Lz4,
        CompressionMethod::Zstd,
    ] {
        if !order.contains(&candidate) {
            order.push(candidate);
        }
    }

    for candidate in order {
        if let Ok(plaintext) = run_codec(bytes, candidate) {
            if let Ok(resolved) = finalize(plaintext, bytes) {
                return Ok(resolved);
            }
        }
    }

    Err(DecompressionError::AutoExhausted.into())
}

/// Checks `plaintext` for the `"GVAS"` magic, rescuing it from within the
/// first [`MAGIC_SEARCH_WINDOW`] bytes of the *original* buffer if the
/// decompressed output itself doesn't carry it at offset 0.
fn finalize(plaintext: Vec<u8>, original: &[u8]) -> Result<Vec<u8>, Error> {
    if plaintext.starts_with(&MAGIC) {
        return Ok(plaintext);
    }
    if let Some(rescued) = rescue_magic(original) {
        return Ok(rescued.to_vec());
    }
    Err(DecompressionError::AutoExhausted.into())
}

//! The `miCOMPRESSED` element wrapper.
//!
//! A compressed element is a tag of type 15 whose payload is a zlib
//! stream; inflating it yields a complete element, own tag included.
//! The outer tag's length is the compressed byte count and the payload
//! is never padded.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::endian::Endian;
use crate::error::FormatError;
use crate::tag::{encode_element, DataType};

/// Wrap an already-encoded element in a compressed element.
pub fn compress_element(encoded: &[u8], endian: Endian) -> Result<Vec<u8>, FormatError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(encoded)
        .map_err(|e| FormatError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| FormatError::Compression(e.to_string()))?;

    let mut buf = Vec::with_capacity(8 + compressed.len());
    encode_element(&mut buf, DataType::Compressed, &compressed, endian);
    Ok(buf)
}

/// Inflate a compressed element's payload back into the encoded inner
/// element. Failures from the inflate primitive are surfaced as
/// [`FormatError::Compression`] and never retried.
pub fn decompress_payload(payload: &[u8]) -> Result<Vec<u8>, FormatError> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| FormatError::Compression(e.to_string()))?;
    Ok(out)
}

/// Inflate at most `limit` bytes of a compressed element's payload.
///
/// The index scan uses this to reach the flags/dims/name sub-elements of
/// a compressed array record without inflating its bulk data. A stream
/// that ends before `limit` is not an error.
pub fn decompress_prefix(payload: &[u8], limit: usize) -> Result<Vec<u8>, FormatError> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut out = vec![0u8; limit];
    let mut filled = 0;
    while filled < limit {
        match decoder.read(&mut out[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => return Err(FormatError::Compression(e.to_string())),
        }
    }
    out.truncate(filled);
    Ok(out)
}

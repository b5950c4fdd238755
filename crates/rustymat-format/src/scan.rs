//! Shallow scan of top-level elements.
//!
//! One forward pass over the element stream reads just enough of each
//! record (tag, flags, dimensions, name) to build a lookup index,
//! then skips ahead by the outer declared length. Compressed records
//! are inflated only far enough to reach those header sub-elements;
//! their bulk payload stays untouched. Full decoding happens later,
//! per element, through [`crate::element_read::decode_matrix`].

use crate::compressed::{decompress_payload, decompress_prefix};
use crate::endian::Endian;
use crate::error::FormatError;
use crate::subelement::{read_array_flags, read_dimensions, read_name, MatClass};
use crate::tag::{decode_element, DataType};

/// Inflated prefix large enough for flags, a generous dimension count,
/// and the longest name MATLAB permits.
const SCAN_PREFIX_LEN: usize = 512;

/// One index entry produced by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Variable name (empty for anonymous records).
    pub name: String,
    /// Byte offset of the element's tag.
    pub offset: usize,
    /// Array class from the flags sub-element.
    pub class: MatClass,
    /// Array dimensions.
    pub dims: Vec<i32>,
    /// Whether the record is wrapped in a compressed element.
    pub compressed: bool,
}

/// Scan the top-level elements of `data` starting at `start`.
///
/// Any structural failure aborts the whole scan: once a tag cannot be
/// trusted, neither can the offsets derived from it.
pub fn scan_elements(
    data: &[u8],
    start: usize,
    endian: Endian,
) -> Result<Vec<EntryInfo>, FormatError> {
    let mut entries = Vec::new();
    let mut pos = start;
    while pos < data.len() {
        let (tag, payload, next) = decode_element(data, pos, endian)?;
        let entry = match tag.data_type {
            DataType::Matrix => {
                let (class, dims, name) = shallow_header(payload, endian)?;
                EntryInfo {
                    name,
                    offset: pos,
                    class,
                    dims,
                    compressed: false,
                }
            }
            DataType::Compressed => {
                let prefix = decompress_prefix(payload, SCAN_PREFIX_LEN)?;
                let parsed = shallow_inner(&prefix, endian);
                let (class, dims, name) = match parsed {
                    // A name or dimension list running past the prefix
                    // shows up as EOF; fall back to a full inflate.
                    Err(FormatError::UnexpectedEof { .. })
                        if prefix.len() == SCAN_PREFIX_LEN =>
                    {
                        shallow_inner(&decompress_payload(payload)?, endian)?
                    }
                    other => other?,
                };
                EntryInfo {
                    name,
                    offset: pos,
                    class,
                    dims,
                    compressed: true,
                }
            }
            _ => {
                return Err(FormatError::ClassMismatch {
                    expected: "matrix or compressed element",
                    actual: "numeric data",
                })
            }
        };
        entries.push(entry);
        pos = next;
    }
    Ok(entries)
}

/// Parse class/dims/name from a `miMATRIX` payload.
pub fn shallow_header(
    payload: &[u8],
    endian: Endian,
) -> Result<(MatClass, Vec<i32>, String), FormatError> {
    if payload.is_empty() {
        return Ok((MatClass::Double, vec![0, 0], String::new()));
    }
    let (flags, pos) = read_array_flags(payload, 0, endian)?;
    let (dims, pos) = read_dimensions(payload, pos, endian)?;
    let (name, _) = read_name(payload, pos, endian)?;
    Ok((flags.class, dims, name))
}

/// Parse class/dims/name from the inflated prefix of a compressed
/// record: inner tag first, then the header sub-elements.
///
/// The inner tag's declared length is deliberately not checked against
/// the buffer, since only a prefix was inflated.
pub fn shallow_inner(
    inflated: &[u8],
    endian: Endian,
) -> Result<(MatClass, Vec<i32>, String), FormatError> {
    let type_word = endian.read_u32(inflated, 0)?;
    if type_word != DataType::Matrix as u32 {
        return Err(FormatError::UnknownTypeCode(type_word));
    }
    let byte_count = endian.read_u32(inflated, 4)? as usize;
    if byte_count == 0 {
        return Ok((MatClass::Double, vec![0, 0], String::new()));
    }
    let (flags, pos) = read_array_flags(inflated, 8, endian)?;
    let (dims, pos) = read_dimensions(inflated, pos, endian)?;
    let (name, _) = read_name(inflated, pos, endian)?;
    Ok((flags.class, dims, name))
}

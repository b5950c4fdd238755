//! Sub-elements shared by every array record: array flags, dimensions,
//! name, and the struct field-name pair.
//!
//! Each function reads from or appends to a buffer at element
//! granularity (tag + payload + padding), returning the offset where the
//! next sub-element starts.

use crate::endian::Endian;
use crate::error::FormatError;
use crate::tag::{decode_element, encode_element, DataType};

/// The MATLAB array classes. Distinct from the storage [`DataType`]: the
/// class says what the value *is*, the storage type says how its payload
/// bytes are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatClass {
    Cell = 1,
    Struct = 2,
    /// Recognized but not supported by this codec.
    Object = 3,
    Char = 4,
    Sparse = 5,
    Double = 6,
    Single = 7,
    Int8 = 8,
    UInt8 = 9,
    Int16 = 10,
    UInt16 = 11,
    Int32 = 12,
    UInt32 = 13,
    Int64 = 14,
    UInt64 = 15,
}

impl MatClass {
    /// Map a raw class code, rejecting anything outside the enumeration.
    pub fn from_u8(code: u8) -> Result<MatClass, FormatError> {
        Ok(match code {
            1 => MatClass::Cell,
            2 => MatClass::Struct,
            3 => MatClass::Object,
            4 => MatClass::Char,
            5 => MatClass::Sparse,
            6 => MatClass::Double,
            7 => MatClass::Single,
            8 => MatClass::Int8,
            9 => MatClass::UInt8,
            10 => MatClass::Int16,
            11 => MatClass::UInt16,
            12 => MatClass::Int32,
            13 => MatClass::UInt32,
            14 => MatClass::Int64,
            15 => MatClass::UInt64,
            other => return Err(FormatError::UnsupportedClass(other)),
        })
    }

    /// Whether this class carries a numeric payload.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            MatClass::Double
                | MatClass::Single
                | MatClass::Int8
                | MatClass::UInt8
                | MatClass::Int16
                | MatClass::UInt16
                | MatClass::Int32
                | MatClass::UInt32
                | MatClass::Int64
                | MatClass::UInt64
        )
    }

    /// Class name as MATLAB spells it, for error reporting.
    pub fn name(self) -> &'static str {
        match self {
            MatClass::Cell => "cell",
            MatClass::Struct => "struct",
            MatClass::Object => "object",
            MatClass::Char => "char",
            MatClass::Sparse => "sparse",
            MatClass::Double => "double",
            MatClass::Single => "single",
            MatClass::Int8 => "int8",
            MatClass::UInt8 => "uint8",
            MatClass::Int16 => "int16",
            MatClass::UInt16 => "uint16",
            MatClass::Int32 => "int32",
            MatClass::UInt32 => "uint32",
            MatClass::Int64 => "int64",
            MatClass::UInt64 => "uint64",
        }
    }
}

/// Flag bit for complex arrays, within the flags byte.
const FLAG_COMPLEX: u8 = 0x08;
/// Flag bit for global arrays.
const FLAG_GLOBAL: u8 = 0x04;
/// Flag bit for logical arrays.
const FLAG_LOGICAL: u8 = 0x02;
/// The undocumented bit MATLAB sets on sparse arrays. No semantic
/// meaning is assigned; it is preserved on read and set on write so
/// MATLAB-authored files round-trip byte-for-byte.
pub const FLAG_SPARSE_EXTRA: u8 = 0x01;

/// The array flags sub-element: always two 32-bit words on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayFlags {
    /// The array class.
    pub class: MatClass,
    /// An imaginary payload is present.
    pub complex: bool,
    /// The variable was global in the writing workspace.
    pub global: bool,
    /// The payload holds logical values.
    pub logical: bool,
    /// Flag-byte bits outside the defined complex/global/logical set,
    /// carried verbatim for byte-exact round trips.
    pub extra_bits: u8,
    /// Maximum nonzero count; meaningful only for sparse arrays.
    pub nzmax: u32,
}

impl ArrayFlags {
    /// Plain flags for a non-sparse array of `class`.
    pub fn new(class: MatClass) -> ArrayFlags {
        ArrayFlags {
            class,
            complex: false,
            global: false,
            logical: false,
            extra_bits: 0,
            nzmax: 0,
        }
    }

    /// Flags for a sparse array, with the undocumented MATLAB bit set.
    pub fn sparse(nzmax: u32) -> ArrayFlags {
        ArrayFlags {
            class: MatClass::Sparse,
            complex: false,
            global: false,
            logical: false,
            extra_bits: FLAG_SPARSE_EXTRA,
            nzmax,
        }
    }

    fn flags_byte(&self) -> u8 {
        let mut b = self.extra_bits & !(FLAG_COMPLEX | FLAG_GLOBAL | FLAG_LOGICAL);
        if self.complex {
            b |= FLAG_COMPLEX;
        }
        if self.global {
            b |= FLAG_GLOBAL;
        }
        if self.logical {
            b |= FLAG_LOGICAL;
        }
        b
    }
}

/// Append the array flags sub-element (tag + 8 bytes).
pub fn write_array_flags(buf: &mut Vec<u8>, flags: &ArrayFlags, endian: Endian) {
    let word = (flags.class as u32) | ((flags.flags_byte() as u32) << 8);
    let mut payload = Vec::with_capacity(8);
    endian.put_u32(&mut payload, word);
    endian.put_u32(&mut payload, flags.nzmax);
    encode_element(buf, DataType::UInt32, &payload, endian);
}

/// Read the array flags sub-element at `pos`; returns the flags and the
/// offset of the next sub-element.
pub fn read_array_flags(
    data: &[u8],
    pos: usize,
    endian: Endian,
) -> Result<(ArrayFlags, usize), FormatError> {
    let (_, payload, next) = decode_element(data, pos, endian)?;
    if payload.len() != 8 {
        return Err(FormatError::PayloadSizeMismatch {
            len: payload.len(),
            width: 8,
        });
    }
    let word = endian.read_u32(payload, 0)?;
    let nzmax = endian.read_u32(payload, 4)?;
    let class = MatClass::from_u8((word & 0xFF) as u8)?;
    let flags_byte = ((word >> 8) & 0xFF) as u8;
    Ok((
        ArrayFlags {
            class,
            complex: flags_byte & FLAG_COMPLEX != 0,
            global: flags_byte & FLAG_GLOBAL != 0,
            logical: flags_byte & FLAG_LOGICAL != 0,
            extra_bits: flags_byte & !(FLAG_COMPLEX | FLAG_GLOBAL | FLAG_LOGICAL),
            nzmax,
        },
        next,
    ))
}

/// Append the dimensions sub-element (`miINT32`, one word per axis).
pub fn write_dimensions(buf: &mut Vec<u8>, dims: &[i32], endian: Endian) {
    let mut payload = Vec::with_capacity(dims.len() * 4);
    for &d in dims {
        endian.put_i32(&mut payload, d);
    }
    encode_element(buf, DataType::Int32, &payload, endian);
}

/// Read the dimensions sub-element at `pos`. At least two non-negative
/// extents are required.
pub fn read_dimensions(
    data: &[u8],
    pos: usize,
    endian: Endian,
) -> Result<(Vec<i32>, usize), FormatError> {
    let (_, payload, next) = decode_element(data, pos, endian)?;
    if payload.len() % 4 != 0 {
        return Err(FormatError::PayloadSizeMismatch {
            len: payload.len(),
            width: 4,
        });
    }
    let count = payload.len() / 4;
    if count < 2 {
        return Err(FormatError::TooFewDimensions(count));
    }
    let mut dims = Vec::with_capacity(count);
    for i in 0..count {
        let d = endian.read_i32(payload, i * 4)?;
        if d < 0 {
            return Err(FormatError::NegativeDimension(d));
        }
        dims.push(d);
    }
    Ok((dims, next))
}

/// Append the name sub-element (`miINT8`, no NUL terminator).
pub fn write_name(buf: &mut Vec<u8>, name: &str, endian: Endian) {
    encode_element(buf, DataType::Int8, name.as_bytes(), endian);
}

/// Read the name sub-element at `pos`. Short names come straight out of
/// the tag slot; the empty name is a zero-length element.
pub fn read_name(
    data: &[u8],
    pos: usize,
    endian: Endian,
) -> Result<(String, usize), FormatError> {
    let (_, payload, next) = decode_element(data, pos, endian)?;
    Ok((String::from_utf8_lossy(payload).into_owned(), next))
}

/// Struct field names are stored in fixed-width slots: the slot width is
/// the longest name plus its NUL terminator, rounded up to 8.
pub fn field_name_slot_width(names: &[String]) -> i32 {
    let max = names.iter().map(|n| n.len()).max().unwrap_or(0);
    (((max + 1) + 7) / 8 * 8) as i32
}

/// Append the field-name-length and field-names sub-elements.
pub fn write_field_names(buf: &mut Vec<u8>, names: &[String], endian: Endian) {
    let slot = field_name_slot_width(names);

    let mut len_payload = Vec::with_capacity(4);
    endian.put_i32(&mut len_payload, slot);
    encode_element(buf, DataType::Int32, &len_payload, endian);

    let mut payload = vec![0u8; names.len() * slot as usize];
    for (i, name) in names.iter().enumerate() {
        let start = i * slot as usize;
        payload[start..start + name.len()].copy_from_slice(name.as_bytes());
        // remainder of the slot is the NUL terminator plus zero padding
    }
    encode_element(buf, DataType::Int8, &payload, endian);
}

/// Read the field-name-length and field-names sub-elements at `pos`.
///
/// Names are split on the declared slot width, not on NUL bytes, then
/// trimmed to the terminator inside each slot.
pub fn read_field_names(
    data: &[u8],
    pos: usize,
    endian: Endian,
) -> Result<(Vec<String>, usize), FormatError> {
    let (_, len_payload, after_len) = decode_element(data, pos, endian)?;
    if len_payload.len() != 4 {
        return Err(FormatError::PayloadSizeMismatch {
            len: len_payload.len(),
            width: 4,
        });
    }
    let slot = endian.read_i32(len_payload, 0)?;
    if slot <= 0 {
        return Err(FormatError::PayloadSizeMismatch {
            len: slot.unsigned_abs() as usize,
            width: 1,
        });
    }
    let slot = slot as usize;

    let (_, names_payload, next) = decode_element(data, after_len, endian)?;
    if names_payload.len() % slot != 0 {
        return Err(FormatError::PayloadSizeMismatch {
            len: names_payload.len(),
            width: slot,
        });
    }
    let names = names_payload
        .chunks_exact(slot)
        .map(|chunk| {
            let end = chunk.iter().position(|&b| b == 0).unwrap_or(slot);
            String::from_utf8_lossy(&chunk[..end]).into_owned()
        })
        .collect();
    Ok((names, next))
}

/// Validate a field name the way the reference ecosystem does: truncate
/// at the first space (reporting the truncation), reject names longer
/// than 31 characters.
pub fn validate_field_name(
    name: &str,
) -> Result<(String, Option<crate::error::FieldNameWarning>), FormatError> {
    let (kept, warning) = match name.find(' ') {
        Some(idx) => {
            let truncated = name[..idx].to_string();
            (
                truncated.clone(),
                Some(crate::error::FieldNameWarning {
                    original: name.to_string(),
                    truncated,
                }),
            )
        }
        None => (name.to_string(), None),
    };
    if kept.len() > 31 {
        return Err(FormatError::FieldNameTooLong {
            name: kept.clone(),
            len: kept.len(),
        });
    }
    Ok((kept, warning))
}

//! Error types for MAT-file format parsing and serialization.

use core::fmt;

/// Errors that can occur when encoding or decoding MAT-file structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Unexpected end of data.
    UnexpectedEof {
        /// Number of bytes expected.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },
    /// A tag carried a data type code outside the known enumeration.
    UnknownTypeCode(u32),
    /// A tag declared a payload length that the buffer cannot satisfy,
    /// or a short-form tag declared more than 4 payload bytes.
    TagSizeMismatch {
        /// Byte count declared by the tag.
        declared: usize,
        /// Bytes actually available (or the short-form limit of 4).
        available: usize,
    },
    /// The file header is shorter than the fixed 128 bytes.
    HeaderTooShort(usize),
    /// The endian indicator bytes were neither `MI` nor `IM`.
    InvalidEndianIndicator([u8; 2]),
    /// The header version field was not 0x0100.
    InvalidVersion(u16),
    /// The array flags carried a class this codec does not support
    /// (unknown code, or `mxOBJECT_CLASS`).
    UnsupportedClass(u8),
    /// A dimensions sub-element held fewer than two dimensions.
    TooFewDimensions(usize),
    /// A dimensions sub-element held a negative extent.
    NegativeDimension(i32),
    /// A typed view was requested of an array whose class differs.
    ClassMismatch {
        /// The class the caller asked for.
        expected: &'static str,
        /// The class actually stored.
        actual: &'static str,
    },
    /// A narrower numeric view was requested than the stored buffer holds.
    PrecisionLoss {
        /// The stored buffer type.
        stored: &'static str,
        /// The requested view type.
        requested: &'static str,
    },
    /// Indexed access used the wrong number of coordinate axes, or a
    /// shape does not match the element count it was paired with.
    DimensionMismatch {
        /// Element count implied by the dimensions.
        expected: usize,
        /// Element count actually supplied.
        actual: usize,
    },
    /// A linear or (row, column) index fell outside the array extent.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The extent it was checked against.
        len: usize,
    },
    /// A payload's byte length is not a multiple of its element width.
    PayloadSizeMismatch {
        /// Payload length in bytes.
        len: usize,
        /// Element width in bytes.
        width: usize,
    },
    /// A struct already holds a field with this name.
    DuplicateFieldName(String),
    /// A struct field name exceeded the 31-character limit.
    FieldNameTooLong {
        /// The rejected name.
        name: String,
        /// Its length in bytes.
        len: usize,
    },
    /// The DEFLATE primitive reported a failure (corrupt or truncated
    /// stream); never retried.
    Compression(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnexpectedEof {
                expected,
                available,
            } => {
                write!(f, "unexpected EOF: need {expected} bytes, have {available}")
            }
            FormatError::UnknownTypeCode(code) => {
                write!(f, "unknown data element type code: {code}")
            }
            FormatError::TagSizeMismatch {
                declared,
                available,
            } => {
                write!(
                    f,
                    "tag declares {declared} payload bytes but only {available} are possible"
                )
            }
            FormatError::HeaderTooShort(len) => {
                write!(f, "file header too short: {len} bytes (need 128)")
            }
            FormatError::InvalidEndianIndicator(bytes) => {
                write!(
                    f,
                    "invalid endian indicator: {:?} (expected \"MI\" or \"IM\")",
                    core::str::from_utf8(bytes).unwrap_or("??")
                )
            }
            FormatError::InvalidVersion(v) => {
                write!(f, "unsupported MAT-file version: {v:#06x} (expected 0x0100)")
            }
            FormatError::UnsupportedClass(c) => {
                write!(f, "unsupported array class: {c}")
            }
            FormatError::TooFewDimensions(n) => {
                write!(f, "dimensions sub-element holds {n} entries (need at least 2)")
            }
            FormatError::NegativeDimension(d) => {
                write!(f, "negative dimension extent: {d}")
            }
            FormatError::ClassMismatch { expected, actual } => {
                write!(f, "class mismatch: requested {expected}, stored {actual}")
            }
            FormatError::PrecisionLoss { stored, requested } => {
                write!(
                    f,
                    "precision loss: stored {stored} does not fit requested {requested}"
                )
            }
            FormatError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: shape implies {expected} elements, got {actual}"
                )
            }
            FormatError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for extent {len}")
            }
            FormatError::PayloadSizeMismatch { len, width } => {
                write!(
                    f,
                    "payload of {len} bytes is not a multiple of the {width}-byte element width"
                )
            }
            FormatError::DuplicateFieldName(name) => {
                write!(f, "duplicate struct field name: {name:?}")
            }
            FormatError::FieldNameTooLong { name, len } => {
                write!(f, "field name {name:?} is {len} characters (limit 31)")
            }
            FormatError::Compression(msg) => {
                write!(f, "compression failure: {msg}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Advisory emitted when a struct field name is silently truncated at its
/// first space. Not an error: the field is still added under the
/// truncated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNameWarning {
    /// The name as the caller supplied it.
    pub original: String,
    /// The name actually used.
    pub truncated: String,
}

impl fmt::Display for FieldNameWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field name {:?} truncated at first space to {:?}",
            self.original, self.truncated
        )
    }
}

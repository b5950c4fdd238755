//! Homogeneous numeric buffers and their storage conversions.
//!
//! A [`NumericData`] holds one array payload in exactly one storage
//! type. The storage type is independent of the array's class: a
//! `double` array may sit on disk as `miUINT8` if every value fits,
//! which is what [`narrow`] decides on the write path. Widening back to
//! `f64` via [`NumericData::to_f64`] always reproduces the original
//! values.

use crate::endian::Endian;
use crate::error::FormatError;
use crate::tag::DataType;

/// One homogeneous numeric buffer, tagged with its storage type.
#[derive(Debug, Clone)]
pub enum NumericData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Single(Vec<f32>),
    Double(Vec<f64>),
    /// Logical values; stored on disk as `miUINT8` 0/1 bytes.
    Bool(Vec<bool>),
}

impl NumericData {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            NumericData::Int8(v) => v.len(),
            NumericData::UInt8(v) => v.len(),
            NumericData::Int16(v) => v.len(),
            NumericData::UInt16(v) => v.len(),
            NumericData::Int32(v) => v.len(),
            NumericData::UInt32(v) => v.len(),
            NumericData::Int64(v) => v.len(),
            NumericData::UInt64(v) => v.len(),
            NumericData::Single(v) => v.len(),
            NumericData::Double(v) => v.len(),
            NumericData::Bool(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The on-disk storage type this buffer encodes to.
    pub fn data_type(&self) -> DataType {
        match self {
            NumericData::Int8(_) => DataType::Int8,
            NumericData::UInt8(_) | NumericData::Bool(_) => DataType::UInt8,
            NumericData::Int16(_) => DataType::Int16,
            NumericData::UInt16(_) => DataType::UInt16,
            NumericData::Int32(_) => DataType::Int32,
            NumericData::UInt32(_) => DataType::UInt32,
            NumericData::Int64(_) => DataType::Int64,
            NumericData::UInt64(_) => DataType::UInt64,
            NumericData::Single(_) => DataType::Single,
            NumericData::Double(_) => DataType::Double,
        }
    }

    /// Short name of the storage type, for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            NumericData::Int8(_) => "int8",
            NumericData::UInt8(_) => "uint8",
            NumericData::Int16(_) => "int16",
            NumericData::UInt16(_) => "uint16",
            NumericData::Int32(_) => "int32",
            NumericData::UInt32(_) => "uint32",
            NumericData::Int64(_) => "int64",
            NumericData::UInt64(_) => "uint64",
            NumericData::Single(_) => "single",
            NumericData::Double(_) => "double",
            NumericData::Bool(_) => "logical",
        }
    }

    /// Widen every element to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            NumericData::Int8(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::UInt8(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::Int16(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::UInt16(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::UInt32(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::Int64(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::UInt64(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::Single(v) => v.iter().map(|&x| x as f64).collect(),
            NumericData::Double(v) => v.clone(),
            NumericData::Bool(v) => v.iter().map(|&x| x as u8 as f64).collect(),
        }
    }

    /// View as `i64`, rejecting storage types whose values may not fit.
    pub fn to_i64(&self) -> Result<Vec<i64>, FormatError> {
        Ok(match self {
            NumericData::Int8(v) => v.iter().map(|&x| x as i64).collect(),
            NumericData::UInt8(v) => v.iter().map(|&x| x as i64).collect(),
            NumericData::Int16(v) => v.iter().map(|&x| x as i64).collect(),
            NumericData::UInt16(v) => v.iter().map(|&x| x as i64).collect(),
            NumericData::Int32(v) => v.iter().map(|&x| x as i64).collect(),
            NumericData::UInt32(v) => v.iter().map(|&x| x as i64).collect(),
            NumericData::Int64(v) => v.clone(),
            NumericData::Bool(v) => v.iter().map(|&x| x as i64).collect(),
            other => {
                return Err(FormatError::PrecisionLoss {
                    stored: other.type_name(),
                    requested: "int64",
                })
            }
        })
    }

    /// View as `i32`, rejecting storage types whose values may not fit.
    pub fn to_i32(&self) -> Result<Vec<i32>, FormatError> {
        Ok(match self {
            NumericData::Int8(v) => v.iter().map(|&x| x as i32).collect(),
            NumericData::UInt8(v) => v.iter().map(|&x| x as i32).collect(),
            NumericData::Int16(v) => v.iter().map(|&x| x as i32).collect(),
            NumericData::UInt16(v) => v.iter().map(|&x| x as i32).collect(),
            NumericData::Int32(v) => v.clone(),
            NumericData::Bool(v) => v.iter().map(|&x| x as i32).collect(),
            other => {
                return Err(FormatError::PrecisionLoss {
                    stored: other.type_name(),
                    requested: "int32",
                })
            }
        })
    }

    /// View as `f32`, rejecting storage types `f32` cannot hold exactly.
    pub fn to_f32(&self) -> Result<Vec<f32>, FormatError> {
        Ok(match self {
            NumericData::Int8(v) => v.iter().map(|&x| x as f32).collect(),
            NumericData::UInt8(v) => v.iter().map(|&x| x as f32).collect(),
            NumericData::Int16(v) => v.iter().map(|&x| x as f32).collect(),
            NumericData::UInt16(v) => v.iter().map(|&x| x as f32).collect(),
            NumericData::Single(v) => v.clone(),
            NumericData::Bool(v) => v.iter().map(|&x| x as u8 as f32).collect(),
            other => {
                return Err(FormatError::PrecisionLoss {
                    stored: other.type_name(),
                    requested: "single",
                })
            }
        })
    }

    /// View as `u8`; only byte-wide storage qualifies.
    pub fn to_u8(&self) -> Result<Vec<u8>, FormatError> {
        Ok(match self {
            NumericData::UInt8(v) => v.clone(),
            NumericData::Bool(v) => v.iter().map(|&x| x as u8).collect(),
            other => {
                return Err(FormatError::PrecisionLoss {
                    stored: other.type_name(),
                    requested: "uint8",
                })
            }
        })
    }

    /// One element widened to `f64`, by flat index.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        if index >= self.len() {
            return None;
        }
        Some(match self {
            NumericData::Int8(v) => v[index] as f64,
            NumericData::UInt8(v) => v[index] as f64,
            NumericData::Int16(v) => v[index] as f64,
            NumericData::UInt16(v) => v[index] as f64,
            NumericData::Int32(v) => v[index] as f64,
            NumericData::UInt32(v) => v[index] as f64,
            NumericData::Int64(v) => v[index] as f64,
            NumericData::UInt64(v) => v[index] as f64,
            NumericData::Single(v) => v[index] as f64,
            NumericData::Double(v) => v[index],
            NumericData::Bool(v) => v[index] as u8 as f64,
        })
    }

    /// Serialize all elements in `endian` order.
    pub fn encode(&self, endian: Endian) -> Vec<u8> {
        let width = self.data_type().element_width().unwrap_or(1);
        let mut buf = Vec::with_capacity(self.len() * width);
        match self {
            NumericData::Int8(v) => buf.extend(v.iter().map(|&x| x as u8)),
            NumericData::UInt8(v) => buf.extend_from_slice(v),
            NumericData::Bool(v) => buf.extend(v.iter().map(|&x| x as u8)),
            NumericData::Int16(v) => v.iter().for_each(|&x| endian.put_i16(&mut buf, x)),
            NumericData::UInt16(v) => v.iter().for_each(|&x| endian.put_u16(&mut buf, x)),
            NumericData::Int32(v) => v.iter().for_each(|&x| endian.put_i32(&mut buf, x)),
            NumericData::UInt32(v) => v.iter().for_each(|&x| endian.put_u32(&mut buf, x)),
            NumericData::Int64(v) => v.iter().for_each(|&x| endian.put_i64(&mut buf, x)),
            NumericData::UInt64(v) => v.iter().for_each(|&x| endian.put_u64(&mut buf, x)),
            NumericData::Single(v) => v.iter().for_each(|&x| endian.put_f32(&mut buf, x)),
            NumericData::Double(v) => v.iter().for_each(|&x| endian.put_f64(&mut buf, x)),
        }
        buf
    }

    /// Deserialize a payload of storage type `data_type`.
    pub fn decode(
        data_type: DataType,
        payload: &[u8],
        endian: Endian,
    ) -> Result<NumericData, FormatError> {
        let width = match data_type.element_width() {
            Some(w) => w,
            None => {
                return Err(FormatError::ClassMismatch {
                    expected: "numeric storage",
                    actual: "container",
                })
            }
        };
        if payload.len() % width != 0 {
            return Err(FormatError::PayloadSizeMismatch {
                len: payload.len(),
                width,
            });
        }
        let count = payload.len() / width;

        let read_all_u16 = || -> Result<Vec<u16>, FormatError> {
            (0..count).map(|i| endian.read_u16(payload, i * 2)).collect()
        };

        Ok(match data_type {
            DataType::Int8 => NumericData::Int8(payload.iter().map(|&b| b as i8).collect()),
            DataType::UInt8 | DataType::Utf8 => NumericData::UInt8(payload.to_vec()),
            DataType::Int16 => NumericData::Int16(
                (0..count)
                    .map(|i| endian.read_i16(payload, i * 2))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::UInt16 | DataType::Utf16 => NumericData::UInt16(read_all_u16()?),
            DataType::Int32 => NumericData::Int32(
                (0..count)
                    .map(|i| endian.read_i32(payload, i * 4))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::UInt32 | DataType::Utf32 => NumericData::UInt32(
                (0..count)
                    .map(|i| endian.read_u32(payload, i * 4))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::Int64 => NumericData::Int64(
                (0..count)
                    .map(|i| endian.read_i64(payload, i * 8))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::UInt64 => NumericData::UInt64(
                (0..count)
                    .map(|i| endian.read_u64(payload, i * 8))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::Single => NumericData::Single(
                (0..count)
                    .map(|i| endian.read_f32(payload, i * 4))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::Double => NumericData::Double(
                (0..count)
                    .map(|i| endian.read_f64(payload, i * 8))
                    .collect::<Result<_, _>>()?,
            ),
            DataType::Matrix | DataType::Compressed => unreachable!(), // no element width
        })
    }

    /// Reinterpret the buffer as logical values (any nonzero is true).
    pub fn to_bool(&self) -> Vec<bool> {
        self.to_f64().iter().map(|&v| v != 0.0).collect()
    }
}

// Data-model equality: same storage type compares element-wise; mixed
// storage types compare through the f64 widening (bit-exact, so NaN
// round trips and -0.0 stays distinct from 0.0).
impl PartialEq for NumericData {
    fn eq(&self, other: &Self) -> bool {
        use NumericData::*;
        match (self, other) {
            (Int8(a), Int8(b)) => a == b,
            (UInt8(a), UInt8(b)) => a == b,
            (Int16(a), Int16(b)) => a == b,
            (UInt16(a), UInt16(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (UInt32(a), UInt32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (UInt64(a), UInt64(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (a, b) => {
                let av = a.to_f64();
                let bv = b.to_f64();
                av.len() == bv.len()
                    && av
                        .iter()
                        .zip(&bv)
                        .all(|(x, y)| x.to_bits() == y.to_bits())
            }
        }
    }
}

/// Pick the smallest lossless storage type for values nominally written
/// as `double`.
///
/// Any non-integer (or non-finite, or 64-bit-range-exceeding) value
/// keeps the full `double` storage. All-integer inputs narrow to the
/// smallest of `u8`/`u16` (non-negative range) or `i16`/`i32` (negative
/// minimum); non-negative values above the `u16` range that still fit
/// in 31 bits use `i32` storage rather than `u32`, matching the
/// reference ecosystem so common files stay byte-identical. Anything
/// wider keeps `double`.
pub fn narrow(values: &[f64]) -> NumericData {
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for &v in values {
        if !v.is_finite() || v.trunc() != v || v < i64::MIN as f64 || v >= i64::MAX as f64 {
            return NumericData::Double(values.to_vec());
        }
        let i = v as i64;
        min = min.min(i);
        max = max.max(i);
    }
    if values.is_empty() {
        return NumericData::Double(Vec::new());
    }

    if min < 0 {
        if min >= i16::MIN as i64 && max <= i16::MAX as i64 {
            NumericData::Int16(values.iter().map(|&v| v as i16).collect())
        } else if min >= i32::MIN as i64 && max <= i32::MAX as i64 {
            NumericData::Int32(values.iter().map(|&v| v as i32).collect())
        } else {
            NumericData::Double(values.to_vec())
        }
    } else if max <= u8::MAX as i64 {
        NumericData::UInt8(values.iter().map(|&v| v as u8).collect())
    } else if max <= u16::MAX as i64 {
        NumericData::UInt16(values.iter().map(|&v| v as u16).collect())
    } else if max <= i32::MAX as i64 {
        NumericData::Int32(values.iter().map(|&v| v as i32).collect())
    } else {
        NumericData::Double(values.to_vec())
    }
}

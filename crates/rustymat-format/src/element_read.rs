//! Recursive array element decoding.
//!
//! The entry point peeks the element tag, inflates compressed wrappers
//! transparently, then reads the common flags/dims/name prefix and
//! branches on the class identifier for the variant payload. Containers
//! recurse; a zero-length element anywhere decodes to the Empty
//! placeholder.

use crate::compressed::decompress_payload;
use crate::endian::Endian;
use crate::error::FormatError;
use crate::matrix::{Matrix, MatrixData};
use crate::numeric::NumericData;
use crate::sparse::Csc;
use crate::subelement::{read_array_flags, read_dimensions, read_field_names, read_name, MatClass};
use crate::tag::{decode_element, DataType};

/// Decode the array element at `pos`, following a compressed wrapper if
/// one is present. Returns the matrix and the offset of the next
/// top-level element.
pub fn decode_matrix(
    data: &[u8],
    pos: usize,
    endian: Endian,
) -> Result<(Matrix, usize), FormatError> {
    let (tag, payload, next) = decode_element(data, pos, endian)?;
    match tag.data_type {
        DataType::Compressed => {
            let inflated = decompress_payload(payload)?;
            let (matrix, _) = decode_matrix(&inflated, 0, endian)?;
            Ok((matrix, next))
        }
        DataType::Matrix => {
            let matrix = decode_matrix_payload(payload, endian)?;
            Ok((matrix, next))
        }
        other => Err(FormatError::ClassMismatch {
            expected: "matrix or compressed element",
            actual: type_label(other),
        }),
    }
}

fn type_label(dt: DataType) -> &'static str {
    match dt {
        DataType::Matrix => "matrix",
        DataType::Compressed => "compressed",
        _ => "numeric data",
    }
}

/// Decode the payload of a `miMATRIX` element (tag already consumed).
pub fn decode_matrix_payload(payload: &[u8], endian: Endian) -> Result<Matrix, FormatError> {
    if payload.is_empty() {
        return Ok(Matrix::empty(""));
    }

    let (flags, pos) = read_array_flags(payload, 0, endian)?;
    if flags.class == MatClass::Object {
        return Err(FormatError::UnsupportedClass(MatClass::Object as u8));
    }
    let (dims, pos) = read_dimensions(payload, pos, endian)?;
    let (name, pos) = read_name(payload, pos, endian)?;
    let num_elements: usize = dims.iter().map(|&d| d as usize).product();

    let data = match flags.class {
        MatClass::Cell => {
            let mut grid = Vec::with_capacity(num_elements);
            let mut at = pos;
            for _ in 0..num_elements {
                let (child, next) = decode_matrix(payload, at, endian)?;
                grid.push(child);
                at = next;
            }
            MatrixData::Cell { grid }
        }
        MatClass::Struct => {
            let (field_names, mut at) = read_field_names(payload, pos, endian)?;
            let mut fields = Vec::with_capacity(field_names.len());
            for fname in field_names {
                let (child, next) = decode_matrix(payload, at, endian)?;
                fields.push((fname, child));
                at = next;
            }
            MatrixData::Struct { fields }
        }
        MatClass::Char => {
            let (tag, text_payload, _) = decode_element(payload, pos, endian)?;
            MatrixData::Char {
                text: decode_text(tag.data_type, text_payload, endian)?,
            }
        }
        MatClass::Sparse => {
            let (row_idx, at) = read_i32_subelement(payload, pos, endian)?;
            let (col_ptr, at) = read_i32_subelement(payload, at, endian)?;
            let (tag, pr, at) = decode_element(payload, at, endian)?;
            let real = NumericData::decode(tag.data_type, pr, endian)?.to_f64();
            let imag = if flags.complex {
                let (tag, pi, _) = decode_element(payload, at, endian)?;
                Some(NumericData::decode(tag.data_type, pi, endian)?.to_f64())
            } else {
                None
            };

            // nzmax may exceed the stored count; trust col_ptr.
            let nnz = col_ptr.last().copied().unwrap_or(0).max(0) as usize;
            let mut csc = Csc {
                row_idx,
                col_ptr,
                real,
                imag,
            };
            if csc.row_idx.len() < nnz || csc.real.len() < nnz {
                return Err(FormatError::IndexOutOfRange {
                    index: nnz,
                    len: csc.row_idx.len().min(csc.real.len()),
                });
            }
            csc.row_idx.truncate(nnz);
            csc.real.truncate(nnz);
            if let Some(imag) = &mut csc.imag {
                imag.truncate(nnz);
            }
            MatrixData::Sparse(csc)
        }
        class if class.is_numeric() => {
            let (tag, pr, at) = decode_element(payload, pos, endian)?;
            let real = NumericData::decode(tag.data_type, pr, endian)?;
            if real.len() != num_elements {
                return Err(FormatError::DimensionMismatch {
                    expected: num_elements,
                    actual: real.len(),
                });
            }
            let imag = if flags.complex {
                let (tag, pi, _) = decode_element(payload, at, endian)?;
                let buf = NumericData::decode(tag.data_type, pi, endian)?;
                if buf.len() != num_elements {
                    return Err(FormatError::DimensionMismatch {
                        expected: num_elements,
                        actual: buf.len(),
                    });
                }
                Some(buf)
            } else {
                None
            };
            let real = if flags.logical && !flags.complex {
                NumericData::Bool(real.to_bool())
            } else {
                real
            };
            MatrixData::Numeric { real, imag }
        }
        other => return Err(FormatError::UnsupportedClass(other as u8)),
    };

    Ok(Matrix {
        name,
        dims,
        flags,
        data,
    })
}

/// Read a sub-element holding an `i32` array (sparse `ir`/`jc`).
fn read_i32_subelement(
    data: &[u8],
    pos: usize,
    endian: Endian,
) -> Result<(Vec<i32>, usize), FormatError> {
    let (tag, payload, next) = decode_element(data, pos, endian)?;
    let values = NumericData::decode(tag.data_type, payload, endian)?.to_i32()?;
    Ok((values, next))
}

/// Decode character payload bytes into a string, accepting the 8-, 16-
/// and 32-bit unit storages MATLAB emits.
fn decode_text(
    data_type: DataType,
    payload: &[u8],
    endian: Endian,
) -> Result<String, FormatError> {
    Ok(match data_type {
        DataType::Utf8 => String::from_utf8_lossy(payload).into_owned(),
        DataType::Int8 | DataType::UInt8 => {
            payload.iter().map(|&b| b as char).collect()
        }
        DataType::Int16 | DataType::UInt16 | DataType::Utf16 => {
            if payload.len() % 2 != 0 {
                return Err(FormatError::PayloadSizeMismatch {
                    len: payload.len(),
                    width: 2,
                });
            }
            let units: Vec<u16> = (0..payload.len() / 2)
                .map(|i| endian.read_u16(payload, i * 2))
                .collect::<Result<_, _>>()?;
            String::from_utf16_lossy(&units)
        }
        DataType::Int32 | DataType::UInt32 | DataType::Utf32 => {
            if payload.len() % 4 != 0 {
                return Err(FormatError::PayloadSizeMismatch {
                    len: payload.len(),
                    width: 4,
                });
            }
            (0..payload.len() / 4)
                .map(|i| {
                    let unit = endian.read_u32(payload, i * 4)?;
                    Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
                })
                .collect::<Result<String, FormatError>>()?
        }
        other => {
            return Err(FormatError::ClassMismatch {
                expected: "character storage",
                actual: type_label(other),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_write::{encode_matrix, encode_matrix_compressed};
    use crate::matrix::{CellBuilder, StructBuilder};
    use crate::sparse::to_csc;
    use crate::subelement::MatClass;

    const LE: Endian = Endian::Little;

    fn roundtrip(m: &Matrix) -> Matrix {
        let bytes = encode_matrix(m, LE).unwrap();
        let (back, next) = decode_matrix(&bytes, 0, LE).unwrap();
        assert_eq!(next, bytes.len(), "decode must consume the whole element");
        back
    }

    #[test]
    fn numeric_roundtrip_preserves_values_through_narrowing() {
        let m = Matrix::from_f64("v", 2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let back = roundtrip(&m);
        assert_eq!(back, m);
        assert_eq!(back.class(), MatClass::Double);
    }

    #[test]
    fn numeric_roundtrip_fractional() {
        let m = Matrix::from_f64("f", 1, 3, vec![0.5, -1.5, 2.25]).unwrap();
        assert_eq!(roundtrip(&m), m);
    }

    #[test]
    fn complex_roundtrip() {
        let m =
            Matrix::from_f64_complex("z", 1, 2, vec![1.0, 2.0], vec![-0.5, 0.5]).unwrap();
        let back = roundtrip(&m);
        assert_eq!(back, m);
        assert!(back.flags.complex);
    }

    #[test]
    fn big_endian_roundtrip() {
        let m = Matrix::from_f64("be", 1, 2, vec![1.0, 256.0]).unwrap();
        let bytes = encode_matrix(&m, Endian::Big).unwrap();
        let (back, _) = decode_matrix(&bytes, 0, Endian::Big).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn empty_roundtrip() {
        let back = roundtrip(&Matrix::empty("e"));
        assert_eq!(back.data, MatrixData::Empty);
        assert_eq!(back.dims, vec![0, 0]);
    }

    #[test]
    fn char_roundtrip() {
        let m = Matrix::char_row("greeting", "hello matrix");
        let back = roundtrip(&m);
        assert_eq!(back.text().unwrap(), "hello matrix");
        assert_eq!(back.dims, vec![1, 12]);
    }

    #[test]
    fn logical_roundtrip() {
        let m = Matrix::logical("mask", 1, 4, vec![true, false, false, true]).unwrap();
        let back = roundtrip(&m);
        assert_eq!(back, m);
        assert!(back.flags.logical);
    }

    #[test]
    fn typed_int_roundtrip() {
        let m = Matrix::from_numeric("counts", 1, 3, NumericData::Int32(vec![-5, 0, 5]))
            .unwrap();
        let back = roundtrip(&m);
        assert_eq!(back, m);
        assert_eq!(back.class(), MatClass::Int32);
    }

    #[test]
    fn cell_roundtrip_with_autofilled_empties() {
        let mut b = CellBuilder::new(2, 2);
        b.set(0, 0, Matrix::scalar("", 7.0)).unwrap();
        let m = b.build("c");
        let back = roundtrip(&m);
        assert_eq!(back.cell_at(0, 0).unwrap().to_f64_vec().unwrap(), vec![7.0]);
        assert_eq!(back.cell_at(1, 1).unwrap().data, MatrixData::Empty);
        assert_eq!(back, m);
    }

    #[test]
    fn nested_cell_roundtrip() {
        let mut inner = CellBuilder::new(1, 2);
        inner.set(0, 0, Matrix::char_row("", "deep")).unwrap();
        let mut outer = CellBuilder::new(1, 1);
        outer.set(0, 0, inner.build("")).unwrap();
        let m = outer.build("nested");
        let back = roundtrip(&m);
        let inner_back = back.cell_at(0, 0).unwrap();
        assert_eq!(inner_back.cell_at(0, 0).unwrap().text().unwrap(), "deep");
    }

    #[test]
    fn struct_roundtrip_preserves_field_order() {
        let mut b = StructBuilder::new();
        b.set_field("gamma", Matrix::scalar("", 1.0)).unwrap();
        b.set_field("alpha", Matrix::char_row("", "x")).unwrap();
        b.set_field("beta", Matrix::from_f64("", 1, 2, vec![2.0, 3.0]).unwrap())
            .unwrap();
        let m = b.build("s");
        let back = roundtrip(&m);
        assert_eq!(back.field_names(), vec!["gamma", "alpha", "beta"]);
        assert_eq!(back.field("beta").unwrap().to_f64_vec().unwrap(), vec![2.0, 3.0]);
        assert_eq!(back, m);
    }

    #[test]
    fn sparse_roundtrip() {
        let entries = vec![
            (4, 0, 0.1, 0.0),
            (3, 1, 1.1, 0.0),
            (2, 2, 2.2, 0.0),
            (1, 3, 3.3, 0.0),
            (3, 3, 4.4, 0.0),
        ];
        let csc = to_csc(5, 4, &entries, false).unwrap();
        let m = Matrix::sparse_from_csc("sp", 5, 4, csc).unwrap();
        let back = roundtrip(&m);
        let csc = back.csc().unwrap();
        assert_eq!(csc.col_ptr, vec![0, 1, 2, 3, 5]);
        assert_eq!(csc.row_idx, vec![4, 3, 2, 1, 3]);
        assert_eq!(back, m);
        assert_eq!(back.flags.nzmax, 5);
    }

    #[test]
    fn sparse_complex_roundtrip() {
        let entries = vec![(0, 0, 1.0, -1.0), (1, 1, 0.0, 2.0)];
        let csc = to_csc(2, 2, &entries, true).unwrap();
        let m = Matrix::sparse_from_csc("spc", 2, 2, csc).unwrap();
        let back = roundtrip(&m);
        assert_eq!(back, m);
        assert_eq!(back.csc().unwrap().imag, Some(vec![-1.0, 2.0]));
    }

    #[test]
    fn compressed_and_plain_decode_identically() {
        let mut b = StructBuilder::new();
        b.set_field("data", Matrix::from_f64("", 1, 100, (0..100).map(|i| i as f64).collect()).unwrap())
            .unwrap();
        let m = b.build("s");

        let plain = encode_matrix(&m, LE).unwrap();
        let packed = encode_matrix_compressed(&m, LE).unwrap();
        let (a, _) = decode_matrix(&plain, 0, LE).unwrap();
        let (b, _) = decode_matrix(&packed, 0, LE).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, m);
    }

    #[test]
    fn object_class_rejected() {
        let mut payload = Vec::new();
        let mut words = Vec::new();
        LE.put_u32(&mut words, 3); // mxOBJECT_CLASS
        LE.put_u32(&mut words, 0);
        crate::tag::encode_element(&mut payload, DataType::UInt32, &words, LE);
        crate::subelement::write_dimensions(&mut payload, &[1, 1], LE);
        crate::subelement::write_name(&mut payload, "o", LE);
        let mut buf = Vec::new();
        crate::tag::encode_element(&mut buf, DataType::Matrix, &payload, LE);
        assert_eq!(
            decode_matrix(&buf, 0, LE).unwrap_err(),
            FormatError::UnsupportedClass(3)
        );
    }

    #[test]
    fn payload_shorter_than_dims_rejected() {
        let m = Matrix::from_f64("v", 1, 2, vec![1.0, 2.0]).unwrap();
        let mut bytes = encode_matrix(&m, LE).unwrap();
        // Grow the dims to promise more elements than the payload holds.
        // dims payload sits after outer tag (8) + flags element (16) + dims tag (8).
        let dims_pos = 8 + 16 + 8;
        let mut patched = Vec::new();
        LE.put_i32(&mut patched, 1);
        LE.put_i32(&mut patched, 3);
        bytes[dims_pos..dims_pos + 8].copy_from_slice(&patched);
        assert!(matches!(
            decode_matrix(&bytes, 0, LE),
            Err(FormatError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn truncated_element_fails_with_eof() {
        let m = Matrix::from_f64("v", 1, 8, (0..8).map(|i| i as f64 + 0.5).collect()).unwrap();
        let bytes = encode_matrix(&m, LE).unwrap();
        for cut in [4, 12, 30] {
            assert!(decode_matrix(&bytes[..cut], 0, LE).is_err());
        }
    }
}

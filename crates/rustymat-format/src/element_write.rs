//! Recursive array element encoding.
//!
//! The element tag carries the total payload length, so children are
//! serialized first and the tag prefixed once the size is known: every
//! container encodes bottom-up. Double-typed payloads pass through the
//! storage-narrowing heuristic on the way out; the class identifier in
//! the flags word is unaffected, so readers see the same values.

use crate::compressed::compress_element;
use crate::endian::Endian;
use crate::error::FormatError;
use crate::matrix::{Matrix, MatrixData};
use crate::numeric::{narrow, NumericData};
use crate::subelement::{write_array_flags, write_dimensions, write_field_names, write_name};
use crate::tag::{encode_element, DataType};

/// Encode a complete array element, tag included.
pub fn encode_matrix(matrix: &Matrix, endian: Endian) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::new();
    append_matrix(&mut buf, matrix, endian, None)?;
    Ok(buf)
}

/// Encode an array element and wrap it in a compressed element.
pub fn encode_matrix_compressed(matrix: &Matrix, endian: Endian) -> Result<Vec<u8>, FormatError> {
    let encoded = encode_matrix(matrix, endian)?;
    compress_element(&encoded, endian)
}

/// Append one encoded element to `buf`. `name_override` replaces the
/// matrix's own name; containers pass `Some("")` for their children
/// because the format does not persist inner names.
fn append_matrix(
    buf: &mut Vec<u8>,
    matrix: &Matrix,
    endian: Endian,
    name_override: Option<&str>,
) -> Result<(), FormatError> {
    if matches!(matrix.data, MatrixData::Empty) {
        // The empty placeholder is a zero-length element.
        encode_element(buf, DataType::Matrix, &[], endian);
        return Ok(());
    }

    let name = name_override.unwrap_or(&matrix.name);
    let mut payload = Vec::new();
    write_array_flags(&mut payload, &matrix.flags, endian);
    write_dimensions(&mut payload, &matrix.dims, endian);
    write_name(&mut payload, name, endian);

    match &matrix.data {
        MatrixData::Empty => unreachable!(), // handled above
        MatrixData::Numeric { real, imag } => {
            write_numeric_payload(&mut payload, real, endian);
            if let Some(imag) = imag {
                write_numeric_payload(&mut payload, imag, endian);
            }
        }
        MatrixData::Char { text } => {
            let mut bytes = Vec::new();
            for unit in text.encode_utf16() {
                endian.put_u16(&mut bytes, unit);
            }
            encode_element(&mut payload, DataType::UInt16, &bytes, endian);
        }
        MatrixData::Cell { grid } => {
            for child in grid {
                append_matrix(&mut payload, child, endian, Some(""))?;
            }
        }
        MatrixData::Struct { fields } => {
            let names: Vec<String> = fields.iter().map(|(n, _)| n.clone()).collect();
            write_field_names(&mut payload, &names, endian);
            for (_, value) in fields {
                append_matrix(&mut payload, value, endian, Some(""))?;
            }
        }
        MatrixData::Sparse(csc) => {
            let mut ir = Vec::with_capacity(csc.row_idx.len() * 4);
            for &r in &csc.row_idx {
                endian.put_i32(&mut ir, r);
            }
            encode_element(&mut payload, DataType::Int32, &ir, endian);

            let mut jc = Vec::with_capacity(csc.col_ptr.len() * 4);
            for &c in &csc.col_ptr {
                endian.put_i32(&mut jc, c);
            }
            encode_element(&mut payload, DataType::Int32, &jc, endian);

            write_numeric_payload(&mut payload, &NumericData::Double(csc.real.clone()), endian);
            if let Some(imag) = &csc.imag {
                write_numeric_payload(&mut payload, &NumericData::Double(imag.clone()), endian);
            }
        }
    }

    encode_element(buf, DataType::Matrix, &payload, endian);
    Ok(())
}

/// Write one numeric payload sub-element, narrowing double storage to
/// the smallest lossless type first.
fn write_numeric_payload(buf: &mut Vec<u8>, data: &NumericData, endian: Endian) {
    let narrowed;
    let to_write = match data {
        NumericData::Double(values) => {
            narrowed = narrow(values);
            &narrowed
        }
        other => other,
    };
    encode_element(buf, to_write.data_type(), &to_write.encode(endian), endian);
}

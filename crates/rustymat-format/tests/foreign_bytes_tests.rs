//! Decoding byte streams shaped the way MATLAB itself writes them,
//! including the quirks this codec must tolerate rather than produce:
//! 32-byte field-name slots, over-allocated `nzmax`, the undocumented
//! sparse flag bit, and 8-bit character storage.

use rustymat_format::element_read::decode_matrix;
use rustymat_format::endian::Endian;
use rustymat_format::matrix::MatrixData;
use rustymat_format::numeric::NumericData;
use rustymat_format::subelement::MatClass;
use rustymat_format::tag::padding;

const LE: Endian = Endian::Little;

/// Append a long-form element: tag, payload, 8-byte padding.
fn put_element(buf: &mut Vec<u8>, type_code: u32, payload: &[u8]) {
    buf.extend_from_slice(&type_code.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    buf.extend(std::iter::repeat(0u8).take(padding(payload.len(), false)));
}

/// Append a short-form element packed into one 8-byte slot.
fn put_short_element(buf: &mut Vec<u8>, type_code: u32, payload: &[u8]) {
    assert!(!payload.is_empty() && payload.len() <= 4);
    let word = type_code | ((payload.len() as u32) << 16);
    buf.extend_from_slice(&word.to_le_bytes());
    buf.extend_from_slice(payload);
    buf.extend(std::iter::repeat(0u8).take(4 - payload.len()));
}

/// Wrap a payload in a `miMATRIX` element.
fn put_matrix(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    put_element(&mut buf, 14, payload);
    buf
}

fn flags_words(class: u8, flag_byte: u8, nzmax: u32) -> Vec<u8> {
    let mut w = Vec::new();
    w.extend_from_slice(&((class as u32) | ((flag_byte as u32) << 8)).to_le_bytes());
    w.extend_from_slice(&nzmax.to_le_bytes());
    w
}

#[test]
fn int32_array_with_int16_storage() {
    // An int32-class array whose payload MATLAB narrowed to int16.
    let mut payload = Vec::new();
    put_element(&mut payload, 6, &flags_words(12, 0, 0)); // mxINT32
    let mut dims = Vec::new();
    dims.extend_from_slice(&1i32.to_le_bytes());
    dims.extend_from_slice(&3i32.to_le_bytes());
    put_element(&mut payload, 5, &dims);
    put_short_element(&mut payload, 1, b"v");
    let mut pr = Vec::new();
    for v in [-2i16, 0, 2] {
        pr.extend_from_slice(&v.to_le_bytes());
    }
    put_element(&mut payload, 3, &pr); // miINT16 storage

    let bytes = put_matrix(&payload);
    let (m, consumed) = decode_matrix(&bytes, 0, LE).unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(m.class(), MatClass::Int32);
    assert_eq!(m.name, "v");
    assert_eq!(m.to_f64_vec().unwrap(), vec![-2.0, 0.0, 2.0]);
}

#[test]
fn char_array_with_8bit_storage() {
    // Old files store character data one byte per unit (miUINT8).
    let mut payload = Vec::new();
    put_element(&mut payload, 6, &flags_words(4, 0, 0)); // mxCHAR
    let mut dims = Vec::new();
    dims.extend_from_slice(&1i32.to_le_bytes());
    dims.extend_from_slice(&5i32.to_le_bytes());
    put_element(&mut payload, 5, &dims);
    put_short_element(&mut payload, 1, b"s");
    put_element(&mut payload, 2, b"hello"); // miUINT8 units

    let (m, _) = decode_matrix(&put_matrix(&payload), 0, LE).unwrap();
    assert_eq!(m.text().unwrap(), "hello");
}

#[test]
fn struct_with_matlab_32_byte_slots() {
    // MATLAB always writes 32-byte field-name slots regardless of the
    // longest name; the declared width must drive the split.
    let mut payload = Vec::new();
    put_element(&mut payload, 6, &flags_words(2, 0, 0)); // mxSTRUCT
    let mut dims = Vec::new();
    dims.extend_from_slice(&1i32.to_le_bytes());
    dims.extend_from_slice(&1i32.to_le_bytes());
    put_element(&mut payload, 5, &dims);
    put_short_element(&mut payload, 1, b"s");

    put_short_element(&mut payload, 5, &32i32.to_le_bytes()); // field name length
    let mut names = vec![0u8; 64];
    names[..2].copy_from_slice(b"ab");
    names[32..34].copy_from_slice(b"cd");
    put_element(&mut payload, 1, &names);

    // Two scalar field values with empty names.
    for v in [1.0f64, 2.0] {
        let mut field = Vec::new();
        put_element(&mut field, 6, &flags_words(6, 0, 0));
        let mut fdims = Vec::new();
        fdims.extend_from_slice(&1i32.to_le_bytes());
        fdims.extend_from_slice(&1i32.to_le_bytes());
        put_element(&mut field, 5, &fdims);
        put_element(&mut field, 1, &[]); // empty name
        put_element(&mut field, 9, &v.to_le_bytes());
        put_element(&mut payload, 14, &field);
    }

    let (m, _) = decode_matrix(&put_matrix(&payload), 0, LE).unwrap();
    assert_eq!(m.field_names(), vec!["ab", "cd"]);
    assert_eq!(m.field("cd").unwrap().to_f64_vec().unwrap(), vec![2.0]);
}

#[test]
fn sparse_with_overallocated_nzmax() {
    // nzmax = 4 but only 2 stored nonzeros; ir and pr carry the unused
    // trailing slots MATLAB leaves behind.
    let mut payload = Vec::new();
    put_element(&mut payload, 6, &flags_words(5, 0x01, 4)); // mxSPARSE + extra bit
    let mut dims = Vec::new();
    dims.extend_from_slice(&3i32.to_le_bytes());
    dims.extend_from_slice(&2i32.to_le_bytes());
    put_element(&mut payload, 5, &dims);
    put_short_element(&mut payload, 1, b"sp");

    let mut ir = Vec::new();
    for r in [0i32, 2, 0, 0] {
        ir.extend_from_slice(&r.to_le_bytes());
    }
    put_element(&mut payload, 5, &ir);
    let mut jc = Vec::new();
    for c in [0i32, 1, 2] {
        jc.extend_from_slice(&c.to_le_bytes());
    }
    put_element(&mut payload, 5, &jc);
    let mut pr = Vec::new();
    for v in [1.5f64, -2.5, 0.0, 0.0] {
        pr.extend_from_slice(&v.to_le_bytes());
    }
    put_element(&mut payload, 9, &pr);

    let (m, _) = decode_matrix(&put_matrix(&payload), 0, LE).unwrap();
    assert_eq!(m.class(), MatClass::Sparse);
    assert_eq!(m.flags.nzmax, 4);
    assert_eq!(m.flags.extra_bits, 0x01);
    let csc = m.csc().unwrap();
    assert_eq!(csc.nnz(), 2);
    assert_eq!(csc.row_idx, vec![0, 2]);
    assert_eq!(csc.real, vec![1.5, -2.5]);
}

#[test]
fn logical_uint8_array() {
    let mut payload = Vec::new();
    put_element(&mut payload, 6, &flags_words(9, 0x02, 0)); // mxUINT8 + logical
    let mut dims = Vec::new();
    dims.extend_from_slice(&1i32.to_le_bytes());
    dims.extend_from_slice(&3i32.to_le_bytes());
    put_element(&mut payload, 5, &dims);
    put_short_element(&mut payload, 1, b"m");
    put_short_element(&mut payload, 2, &[1, 0, 7]); // nonzero means true

    let (m, _) = decode_matrix(&put_matrix(&payload), 0, LE).unwrap();
    assert!(m.flags.logical);
    match &m.data {
        MatrixData::Numeric { real, .. } => {
            assert_eq!(real, &NumericData::Bool(vec![true, false, true]))
        }
        other => panic!("expected numeric data, got {other:?}"),
    }
}

#[test]
fn global_flag_survives_decode() {
    let mut payload = Vec::new();
    put_element(&mut payload, 6, &flags_words(6, 0x04, 0)); // global bit
    let mut dims = Vec::new();
    dims.extend_from_slice(&1i32.to_le_bytes());
    dims.extend_from_slice(&1i32.to_le_bytes());
    put_element(&mut payload, 5, &dims);
    put_short_element(&mut payload, 1, b"g");
    put_element(&mut payload, 9, &1.0f64.to_le_bytes());

    let (m, _) = decode_matrix(&put_matrix(&payload), 0, LE).unwrap();
    assert!(m.flags.global);
    assert!(!m.flags.complex);
    assert!(!m.flags.logical);
}

#[test]
fn big_endian_foreign_record() {
    // The same structure with every word big-endian.
    let put_be = |buf: &mut Vec<u8>, type_code: u32, payload: &[u8]| {
        buf.extend_from_slice(&type_code.to_be_bytes());
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(payload);
        buf.extend(std::iter::repeat(0u8).take(padding(payload.len(), false)));
    };
    let mut payload = Vec::new();
    let mut flags = Vec::new();
    flags.extend_from_slice(&(6u32).to_be_bytes());
    flags.extend_from_slice(&0u32.to_be_bytes());
    put_be(&mut payload, 6, &flags);
    let mut dims = Vec::new();
    dims.extend_from_slice(&1i32.to_be_bytes());
    dims.extend_from_slice(&2i32.to_be_bytes());
    put_be(&mut payload, 5, &dims);
    put_be(&mut payload, 1, b"big_endian_name");
    let mut pr = Vec::new();
    pr.extend_from_slice(&3.25f64.to_be_bytes());
    pr.extend_from_slice(&(-1.0f64).to_be_bytes());
    put_be(&mut payload, 9, &pr);
    let mut bytes = Vec::new();
    put_be(&mut bytes, 14, &payload);

    let (m, _) = decode_matrix(&bytes, 0, Endian::Big).unwrap();
    assert_eq!(m.name, "big_endian_name");
    assert_eq!(m.to_f64_vec().unwrap(), vec![3.25, -1.0]);
}

//! Pure-Rust MATLAB Level-5 MAT-file binary format codec.
//!
//! This crate provides low-level, byte-exact encoding and decoding of
//! every MAT-file structure: the 128-byte header, element tags (long
//! and short form), the sub-elements every array record shares, the
//! array record variants (numeric, character, cell, struct, sparse),
//! and the DEFLATE-compressed element wrapper. The ergonomic reader and
//! writer surfaces live in the `rustymat` crate.

pub mod compressed;
pub mod element_read;
pub mod element_write;
pub mod endian;
pub mod error;
pub mod file_writer;
pub mod header;
pub mod matrix;
pub mod numeric;
pub mod scan;
pub mod sparse;
pub mod subelement;
pub mod tag;

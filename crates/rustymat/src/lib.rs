//! High-level API for reading and writing MATLAB Level-5 MAT-files.
//!
//! This crate provides an ergonomic interface on top of
//! `rustymat-format`.
//!
//! # Reading
//!
//! ```no_run
//! use rustymat::MatFile;
//!
//! let file = MatFile::open("data.mat").unwrap();
//! println!("variables: {:?}", file.names());
//! let m = file.get("temperature").unwrap();
//! println!("shape: {:?}, data: {:?}", m.dims, m.to_f64_vec().unwrap());
//! ```
//!
//! # Writing
//!
//! ```no_run
//! use rustymat::{MatFileBuilder, Matrix};
//!
//! let mut builder = MatFileBuilder::new();
//! builder.add(&Matrix::from_f64("data", 1, 3, vec![1.0, 2.0, 3.0]).unwrap()).unwrap();
//! builder.add_compressed(&Matrix::char_row("note", "hello")).unwrap();
//! builder.write("output.mat").unwrap();
//! ```

pub mod error;
pub mod lazy;
pub mod reader;
pub mod writer;

pub use error::Error;
pub use lazy::LazyMatFile;
pub use reader::MatFile;
pub use writer::MatFileBuilder;

// Re-export the model and codec types callers interact with.
pub use rustymat_format::endian::Endian;
pub use rustymat_format::error::{FieldNameWarning, FormatError};
pub use rustymat_format::matrix::{CellBuilder, Matrix, MatrixData, SparseBuilder, StructBuilder};
pub use rustymat_format::numeric::NumericData;
pub use rustymat_format::scan::EntryInfo;
pub use rustymat_format::sparse::{from_csc, to_csc, Csc};
pub use rustymat_format::subelement::MatClass;

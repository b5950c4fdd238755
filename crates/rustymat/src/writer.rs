//! Writing API: a builder for creating MAT-files.

use std::path::Path;

use rustymat_format::endian::Endian;
use rustymat_format::file_writer::FileWriter as FormatWriter;
use rustymat_format::header::Header;
use rustymat_format::matrix::Matrix;

use crate::error::Error;

/// Builder for creating a new MAT-file.
///
/// # Example
///
/// ```no_run
/// use rustymat::{Matrix, MatFileBuilder};
///
/// let mut builder = MatFileBuilder::new();
/// builder.add(&Matrix::scalar("answer", 42.0)).unwrap();
/// builder.write("output.mat").unwrap();
/// ```
pub struct MatFileBuilder {
    writer: FormatWriter,
}

impl MatFileBuilder {
    /// A little-endian builder with the conventional header text.
    pub fn new() -> MatFileBuilder {
        MatFileBuilder {
            writer: FormatWriter::new(),
        }
    }

    /// A builder emitting the given byte order.
    pub fn with_endian(endian: Endian) -> MatFileBuilder {
        MatFileBuilder {
            writer: FormatWriter::with_header(Header::new(endian)),
        }
    }

    /// Append one variable.
    pub fn add(&mut self, matrix: &Matrix) -> Result<(), Error> {
        self.writer.append(matrix)?;
        Ok(())
    }

    /// Append one variable wrapped in a compressed element.
    pub fn add_compressed(&mut self, matrix: &Matrix) -> Result<(), Error> {
        self.writer.append_compressed(matrix)?;
        Ok(())
    }

    /// Serialize the file to bytes in memory.
    pub fn finish(self) -> Vec<u8> {
        self.writer.finish()
    }

    /// Serialize and write the file to the given path.
    pub fn write<P: AsRef<Path>>(self, path: P) -> Result<(), Error> {
        std::fs::write(path, self.finish()).map_err(Error::Io)
    }
}

impl Default for MatFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

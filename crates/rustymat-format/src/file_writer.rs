//! MAT-file creation (write pipeline).
//!
//! A [`FileWriter`] is an append-only sink: the 128-byte header is laid
//! down at construction and each [`FileWriter::append`] call encodes one
//! complete top-level element. Appends take `&mut self`, so a shared
//! writer is serialized by the borrow checker rather than a runtime
//! lock.

use crate::element_write::{encode_matrix, encode_matrix_compressed};
use crate::endian::Endian;
use crate::error::FormatError;
use crate::header::Header;
use crate::matrix::Matrix;

/// Append-only writer assembling a complete MAT-file in memory.
pub struct FileWriter {
    endian: Endian,
    buf: Vec<u8>,
}

impl FileWriter {
    /// A little-endian writer with the conventional header text.
    pub fn new() -> FileWriter {
        FileWriter::with_header(Header::new(Endian::Little))
    }

    /// A writer using the given header (and its byte order) verbatim.
    pub fn with_header(header: Header) -> FileWriter {
        FileWriter {
            endian: header.endian,
            buf: header.serialize().to_vec(),
        }
    }

    /// The byte order this writer emits.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Append one array element.
    pub fn append(&mut self, matrix: &Matrix) -> Result<(), FormatError> {
        let encoded = encode_matrix(matrix, self.endian)?;
        self.buf.extend_from_slice(&encoded);
        Ok(())
    }

    /// Append one array element wrapped in a compressed element.
    pub fn append_compressed(&mut self, matrix: &Matrix) -> Result<(), FormatError> {
        let encoded = encode_matrix_compressed(matrix, self.endian)?;
        self.buf.extend_from_slice(&encoded);
        Ok(())
    }

    /// Bytes written so far, header included.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether anything beyond the header has been appended.
    pub fn is_empty(&self) -> bool {
        self.buf.len() == crate::header::HEADER_SIZE
    }

    /// Finish and take the assembled file bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for FileWriter {
    fn default() -> Self {
        Self::new()
    }
}

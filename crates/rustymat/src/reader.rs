//! Eager reading API: load a whole file into memory, index it once,
//! decode variables on demand.

use std::path::Path;

use rustymat_format::element_read::decode_matrix;
use rustymat_format::endian::Endian;
use rustymat_format::header::{Header, HEADER_SIZE};
use rustymat_format::matrix::Matrix;
use rustymat_format::scan::{scan_elements, EntryInfo};

use crate::error::Error;

/// An opened MAT-file held fully in memory.
///
/// Opening validates the header and runs one shallow scan to build a
/// name → offset index; no array payload is materialized until
/// [`MatFile::get`] asks for it. The index is immutable after open, so
/// lookups take `&self`.
pub struct MatFile {
    data: Vec<u8>,
    header: Header,
    entries: Vec<EntryInfo>,
}

impl MatFile {
    /// Open and index a MAT-file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<MatFile, Error> {
        MatFile::from_bytes(std::fs::read(path)?)
    }

    /// Open and index a MAT-file already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<MatFile, Error> {
        let header = Header::parse(&data)?;
        let entries = scan_elements(&data, HEADER_SIZE, header.endian)?;
        Ok(MatFile {
            data,
            header,
            entries,
        })
    }

    /// The parsed file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The file's byte order.
    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    /// Names of all top-level variables, in file order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// The index entries built at open time (name, offset, class, dims).
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// Decode one variable by name, transparently decompressing.
    pub fn get(&self, name: &str) -> Result<Matrix, Error> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))?;
        let (matrix, _) = decode_matrix(&self.data, entry.offset, self.header.endian)?;
        Ok(matrix)
    }

    /// The raw file bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for MatFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatFile")
            .field("size", &self.data.len())
            .field("variables", &self.entries.len())
            .finish()
    }
}

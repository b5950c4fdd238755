//! Lazy file handle that reads only what each operation needs.
//!
//! Unlike [`crate::MatFile`], which loads the entire file into a
//! `Vec<u8>`, [`LazyMatFile`] works against any `Read + Seek` backend.
//! Opening reads the 128-byte header and one shallow pass over the
//! element tags (inflating only the prefix of compressed records needed
//! for their flags/dims/name); everything else stays on disk until
//! [`LazyMatFile::get`] seeks back and decodes a single element.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use rustymat_format::compressed::decompress_prefix;
use rustymat_format::element_read::decode_matrix;
use rustymat_format::endian::Endian;
use rustymat_format::error::FormatError;
use rustymat_format::header::{Header, HEADER_SIZE};
use rustymat_format::matrix::Matrix;
use rustymat_format::scan::{shallow_header, shallow_inner, EntryInfo};
use rustymat_format::tag::{padding, DataType};

use crate::error::Error;

/// Compressed bytes pulled per record during the shallow scan; enough
/// to inflate the header sub-elements of any realistically-named array.
const SHALLOW_READ: usize = 1024;

/// Inflated prefix handed to the header parse.
const SHALLOW_INFLATE: usize = 512;

/// A lazy MAT-file handle over a seekable stream.
///
/// The index is built once at open and never mutated. Lookups take
/// `&mut self` because they seek the shared reader; the exclusive
/// borrow is what keeps each seek+read pair atomic.
pub struct LazyMatFile<R: Read + Seek> {
    reader: R,
    header: Header,
    entries: Vec<EntryInfo>,
}

impl LazyMatFile<BufReader<File>> {
    /// Open a file from disk behind a buffered reader.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        LazyMatFile::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> LazyMatFile<R> {
    /// Open a lazy handle over any `Read + Seek` backend.
    pub fn new(mut reader: R) -> Result<Self, Error> {
        reader.seek(SeekFrom::Start(0))?;
        let mut header_buf = [0u8; HEADER_SIZE];
        read_fully(&mut reader, &mut header_buf)?;
        let header = Header::parse(&header_buf)?;
        let endian = header.endian;

        let file_len = reader.seek(SeekFrom::End(0))?;
        let mut entries = Vec::new();
        let mut pos = HEADER_SIZE as u64;
        while pos < file_len {
            reader.seek(SeekFrom::Start(pos))?;
            let mut tag_buf = [0u8; 8];
            read_fully(&mut reader, &mut tag_buf).map_err(|_| {
                Error::Format(FormatError::UnexpectedEof {
                    expected: pos as usize + 8,
                    available: file_len as usize,
                })
            })?;

            let word = endian.read_u32(&tag_buf, 0)?;
            if word >> 16 != 0 {
                // A packed short-form tag cannot start a top-level record.
                return Err(FormatError::ClassMismatch {
                    expected: "matrix or compressed element",
                    actual: "numeric data",
                }
                .into());
            }
            let data_type = DataType::from_u32(word)?;
            let byte_count = endian.read_u32(&tag_buf, 4)? as usize;
            let pad = if data_type == DataType::Compressed {
                0
            } else {
                padding(byte_count, false)
            };
            let next = pos + 8 + byte_count as u64 + pad as u64;
            if next > file_len {
                return Err(FormatError::TagSizeMismatch {
                    declared: byte_count,
                    available: (file_len - pos - 8) as usize,
                }
                .into());
            }

            let entry = match data_type {
                DataType::Matrix => {
                    let (class, dims, name) =
                        Self::shallow_plain(&mut reader, byte_count, endian)?;
                    EntryInfo {
                        name,
                        offset: pos as usize,
                        class,
                        dims,
                        compressed: false,
                    }
                }
                DataType::Compressed => {
                    let (class, dims, name) =
                        Self::shallow_compressed(&mut reader, byte_count, endian)?;
                    EntryInfo {
                        name,
                        offset: pos as usize,
                        class,
                        dims,
                        compressed: true,
                    }
                }
                _ => {
                    return Err(FormatError::ClassMismatch {
                        expected: "matrix or compressed element",
                        actual: "numeric data",
                    }
                    .into())
                }
            };
            entries.push(entry);
            pos = next;
        }

        Ok(LazyMatFile {
            reader,
            header,
            entries,
        })
    }

    /// Shallow-parse a directly-encoded record: read the payload prefix
    /// (or all of it for small records) and pull out flags/dims/name.
    fn shallow_plain(
        reader: &mut R,
        byte_count: usize,
        endian: Endian,
    ) -> Result<(rustymat_format::subelement::MatClass, Vec<i32>, String), Error> {
        let take = byte_count.min(SHALLOW_READ);
        let mut buf = vec![0u8; take];
        read_fully(reader, &mut buf)?;
        match shallow_header(&buf, endian) {
            // An unusually long name or dimension list overran the
            // prefix; pull the rest of the payload and retry.
            Err(FormatError::UnexpectedEof { .. }) if take < byte_count => {
                let mut rest = vec![0u8; byte_count - take];
                read_fully(reader, &mut rest)?;
                buf.extend_from_slice(&rest);
                Ok(shallow_header(&buf, endian)?)
            }
            other => Ok(other?),
        }
    }

    /// Shallow-parse a compressed record: inflate only the prefix.
    fn shallow_compressed(
        reader: &mut R,
        byte_count: usize,
        endian: Endian,
    ) -> Result<(rustymat_format::subelement::MatClass, Vec<i32>, String), Error> {
        let take = byte_count.min(SHALLOW_READ);
        let mut buf = vec![0u8; take];
        read_fully(reader, &mut buf)?;
        let attempt = decompress_prefix(&buf, SHALLOW_INFLATE)
            .and_then(|prefix| shallow_inner(&prefix, endian));
        match attempt {
            Ok(parsed) => Ok(parsed),
            // Truncated zlib input or a header running past the inflated
            // prefix; pull the whole compressed payload and retry.
            Err(FormatError::Compression(_)) | Err(FormatError::UnexpectedEof { .. })
                if take < byte_count =>
            {
                let mut rest = vec![0u8; byte_count - take];
                read_fully(reader, &mut rest)?;
                buf.extend_from_slice(&rest);
                let prefix = decompress_prefix(&buf, SHALLOW_INFLATE)?;
                Ok(shallow_inner(&prefix, endian)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The parsed file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Names of all top-level variables, in file order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// The index entries built at open time.
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// Seek to and decode one variable by name.
    pub fn get(&mut self, name: &str) -> Result<Matrix, Error> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))?;
        let offset = entry.offset as u64;
        let endian = self.header.endian;

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut tag_buf = [0u8; 8];
        read_fully(&mut self.reader, &mut tag_buf)?;
        let byte_count = endian.read_u32(&tag_buf, 4)? as usize;

        let mut element = Vec::with_capacity(8 + byte_count);
        element.extend_from_slice(&tag_buf);
        let mut payload = vec![0u8; byte_count];
        read_fully(&mut self.reader, &mut payload)?;
        element.extend_from_slice(&payload);

        let (matrix, _) = decode_matrix(&element, 0, endian)?;
        Ok(matrix)
    }

    /// Access the inner reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

impl<R: Read + Seek> std::fmt::Debug for LazyMatFile<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyMatFile")
            .field("variables", &self.entries.len())
            .finish()
    }
}

/// `read_exact` with the partial-read count surfaced as an I/O error.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), Error> {
    reader.read_exact(buf).map_err(Error::Io)
}

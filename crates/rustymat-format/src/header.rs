//! MAT-file header parsing and serialization.
//!
//! The header is a fixed 128 bytes: 116 bytes of descriptive text,
//! 8 reserved bytes (subsystem data offset, unused here), a 2-byte
//! version field (0x0100), and a 2-byte endian indicator. The indicator
//! is the characters `MI` written as a 16-bit value: a reader that sees
//! `"IM"` is looking at a little-endian file, `"MI"` at a big-endian one.

use crate::endian::Endian;
use crate::error::FormatError;

/// Total header size in bytes.
pub const HEADER_SIZE: usize = 128;

/// Length of the descriptive text field.
pub const TEXT_LEN: usize = 116;

/// The version field value for Level 5 files.
pub const VERSION: u16 = 0x0100;

/// Parsed MAT-file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Descriptive text, trailing spaces and NULs trimmed.
    pub text: String,
    /// Byte order of everything after the header.
    pub endian: Endian,
}

impl Header {
    /// Build a header with the conventional description prefix.
    pub fn new(endian: Endian) -> Header {
        Header {
            text: format!(
                "MATLAB 5.0 MAT-file, Platform: {}, Created by: rustymat",
                std::env::consts::OS
            ),
            endian,
        }
    }

    /// Parse the 128-byte header at the start of `data`.
    ///
    /// The endian indicator is resolved first so the version field can
    /// be read in the file's own byte order.
    pub fn parse(data: &[u8]) -> Result<Header, FormatError> {
        if data.len() < HEADER_SIZE {
            return Err(FormatError::HeaderTooShort(data.len()));
        }

        let indicator = [data[126], data[127]];
        let endian = match &indicator {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            _ => return Err(FormatError::InvalidEndianIndicator(indicator)),
        };

        let version = endian.read_u16(data, 124)?;
        if version != VERSION {
            return Err(FormatError::InvalidVersion(version));
        }

        let text_end = data[..TEXT_LEN]
            .iter()
            .rposition(|&b| b != b' ' && b != 0)
            .map_or(0, |i| i + 1);
        let text = String::from_utf8_lossy(&data[..text_end]).into_owned();

        Ok(Header { text, endian })
    }

    /// Serialize to the fixed 128-byte wire form.
    ///
    /// Text longer than 116 bytes is truncated; shorter text is
    /// space-padded. The reserved bytes are written as zeros.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..TEXT_LEN].fill(b' ');
        let text = self.text.as_bytes();
        let n = text.len().min(TEXT_LEN);
        buf[..n].copy_from_slice(&text[..n]);

        // bytes 116..124 reserved (subsystem offset), left as zeros
        let mut tail = Vec::with_capacity(4);
        self.endian.put_u16(&mut tail, VERSION);
        self.endian.put_u16(&mut tail, u16::from_be_bytes(*b"MI"));
        buf[124..128].copy_from_slice(&tail);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_header_bytes(endian: Endian, version: u16, indicator: &[u8; 2]) -> Vec<u8> {
        let mut buf = vec![b' '; TEXT_LEN];
        buf[..4].copy_from_slice(b"test");
        buf.extend_from_slice(&[0u8; 8]); // reserved
        let mut tail = Vec::new();
        endian.put_u16(&mut tail, version);
        buf.extend_from_slice(&tail);
        buf.extend_from_slice(indicator);
        buf
    }

    #[test]
    fn parse_little_endian() {
        let data = build_header_bytes(Endian::Little, VERSION, b"IM");
        let hdr = Header::parse(&data).unwrap();
        assert_eq!(hdr.endian, Endian::Little);
        assert_eq!(hdr.text, "test");
    }

    #[test]
    fn parse_big_endian() {
        let data = build_header_bytes(Endian::Big, VERSION, b"MI");
        let hdr = Header::parse(&data).unwrap();
        assert_eq!(hdr.endian, Endian::Big);
    }

    #[test]
    fn bad_endian_indicator_rejected() {
        let data = build_header_bytes(Endian::Little, VERSION, b"XY");
        assert_eq!(
            Header::parse(&data),
            Err(FormatError::InvalidEndianIndicator(*b"XY"))
        );
    }

    #[test]
    fn bad_version_rejected() {
        let data = build_header_bytes(Endian::Little, 0x0200, b"IM");
        assert_eq!(Header::parse(&data), Err(FormatError::InvalidVersion(0x0200)));
    }

    #[test]
    fn version_read_in_file_byte_order() {
        // A version written big-endian alongside a little-endian
        // indicator reads back as a foreign value and is rejected.
        let data = build_header_bytes(Endian::Big, VERSION, b"IM");
        assert_eq!(Header::parse(&data), Err(FormatError::InvalidVersion(0x0001)));
    }

    #[test]
    fn short_header_rejected() {
        assert_eq!(
            Header::parse(&[0u8; 64]),
            Err(FormatError::HeaderTooShort(64))
        );
    }

    #[test]
    fn serialize_roundtrip_little() {
        let hdr = Header {
            text: "hello mat".into(),
            endian: Endian::Little,
        };
        let bytes = hdr.serialize();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[126..128], b"IM");
        let back = Header::parse(&bytes).unwrap();
        assert_eq!(back, hdr);
    }

    #[test]
    fn serialize_roundtrip_big() {
        let hdr = Header {
            text: "big endian file".into(),
            endian: Endian::Big,
        };
        let bytes = hdr.serialize();
        assert_eq!(&bytes[126..128], b"MI");
        let back = Header::parse(&bytes).unwrap();
        assert_eq!(back.endian, Endian::Big);
    }

    #[test]
    fn long_text_truncated() {
        let hdr = Header {
            text: "x".repeat(300),
            endian: Endian::Little,
        };
        let bytes = hdr.serialize();
        let back = Header::parse(&bytes).unwrap();
        assert_eq!(back.text.len(), TEXT_LEN);
    }

    #[test]
    fn default_text_mentions_matlab_level_5() {
        let hdr = Header::new(Endian::Little);
        assert!(hdr.text.starts_with("MATLAB 5.0 MAT-file"));
        assert!(hdr.text.len() <= TEXT_LEN);
    }
}

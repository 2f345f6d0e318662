//! Document container: header, compression, and the main timeline
//!
//! The container is an 8-byte preamble (signature, version, declared file
//! length) followed by a body that may be zlib-compressed. The body holds
//! the frame-size rectangle, frame rate, frame count, and the records.

use crate::bits::{BitReader, BitWriter};
use crate::tag::{parse_tags, Tag, TagKind};
use crate::types::Rect;
use crate::{Result, SwfError};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};
use std::path::Path;

/// Length of the signature/version/length preamble
const PREAMBLE_LEN: usize = 8;

/// How the body following the preamble is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// `FWS` signature
    #[default]
    None,
    /// `CWS` signature
    Zlib,
}

/// Document-level header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieHeader {
    pub compression: Compression,
    pub version: u8,
    /// Declared stage rectangle in twips
    pub frame_size: Rect,
    /// Frames per second in 8.8 fixed point
    pub frame_rate: u16,
    pub frame_count: u16,
}

/// A fully buffered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub header: MovieHeader,
    /// Main timeline records, ending with the End record when present
    pub tags: Vec<Tag>,
}

impl Movie {
    /// Create an empty uncompressed document
    pub fn new(version: u8, frame_size: Rect) -> Self {
        Self {
            header: MovieHeader {
                compression: Compression::None,
                version,
                frame_size,
                frame_rate: 12 << 8,
                frame_count: 1,
            },
            tags: Vec::new(),
        }
    }

    /// Append a record to the main timeline
    pub fn push(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Parse a document from its serialized bytes
    pub fn parse(bytes: &[u8]) -> Result<Movie> {
        if bytes.len() < PREAMBLE_LEN {
            return Err(SwfError::UnexpectedEof {
                offset: bytes.len(),
            });
        }
        let signature = [bytes[0], bytes[1], bytes[2]];
        let compression = match &signature {
            b"FWS" => Compression::None,
            b"CWS" => Compression::Zlib,
            b"ZWS" => {
                return Err(SwfError::UnsupportedCompression(
                    "LZMA-compressed documents".to_string(),
                ))
            }
            _ => return Err(SwfError::InvalidSignature(signature)),
        };
        let version = bytes[3];
        let declared_len =
            u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

        let body = match compression {
            Compression::None => bytes[PREAMBLE_LEN..].to_vec(),
            Compression::Zlib => {
                let capacity = declared_len.saturating_sub(PREAMBLE_LEN).min(64 << 20);
                let mut inflated = Vec::with_capacity(capacity);
                ZlibDecoder::new(&bytes[PREAMBLE_LEN..])
                    .read_to_end(&mut inflated)
                    .map_err(|e| SwfError::Decompression(e.to_string()))?;
                inflated
            }
        };
        if body.len() + PREAMBLE_LEN != declared_len {
            tracing::debug!(
                "declared length {} differs from actual {}",
                declared_len,
                body.len() + PREAMBLE_LEN
            );
        }

        let mut reader = BitReader::new(&body);
        let frame_size = Rect::read(&mut reader)?;
        let frame_rate = reader.read_u16()?;
        let frame_count = reader.read_u16()?;
        let tags = parse_tags(reader.remaining())?;
        tracing::debug!("parsed {} top-level records (version {})", tags.len(), version);

        Ok(Movie {
            header: MovieHeader {
                compression,
                version,
                frame_size,
                frame_rate,
                frame_count,
            },
            tags,
        })
    }

    /// Serialize, recomputing the declared length and recompressing if needed
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.header.frame_size.write(&mut writer)?;
        writer.write_u16(self.header.frame_rate);
        writer.write_u16(self.header.frame_count);
        let mut body = writer.into_bytes();
        for tag in &self.tags {
            tag.write_to(&mut body)?;
        }
        if self.tags.last().map(|t| t.kind) != Some(TagKind::End) {
            Tag::new(TagKind::End, Vec::new()).write_to(&mut body)?;
        }

        let total_len = u32::try_from(body.len() + PREAMBLE_LEN)
            .map_err(|_| SwfError::ValueOutOfRange("document larger than 4 GiB".to_string()))?;
        let signature: &[u8; 3] = match self.header.compression {
            Compression::None => b"FWS",
            Compression::Zlib => b"CWS",
        };

        let mut out = Vec::with_capacity(body.len() + PREAMBLE_LEN);
        out.extend_from_slice(signature);
        out.push(self.header.version);
        out.extend_from_slice(&total_len.to_le_bytes());
        match self.header.compression {
            Compression::None => out.extend_from_slice(&body),
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(out, flate2::Compression::default());
                encoder.write_all(&body)?;
                out = encoder.finish()?;
            }
        }
        Ok(out)
    }

    pub fn read_from_path(path: &Path) -> Result<Movie> {
        let bytes = std::fs::read(path)?;
        Movie::parse(&bytes)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_movie() -> Movie {
        let mut movie = Movie::new(8, Rect::new(0, 0, 11000, 8000));
        movie.push(Tag::new(TagKind::SetBackgroundColor, vec![0xff, 0xff, 0xff]));
        movie.push(Tag::new(TagKind::ShowFrame, Vec::new()));
        movie.push(Tag::new(TagKind::End, Vec::new()));
        movie
    }

    #[test]
    fn test_uncompressed_layout() {
        let bytes = sample_movie().to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"FWS\x08");
        let declared = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(declared as usize, bytes.len());
        assert_eq!(Movie::parse(&bytes).unwrap(), sample_movie());
    }

    #[test]
    fn test_compressed_document() {
        let mut movie = sample_movie();
        movie.header.compression = Compression::Zlib;
        let bytes = movie.to_bytes().unwrap();
        assert_eq!(&bytes[..3], b"CWS");

        let parsed = Movie::parse(&bytes).unwrap();
        assert_eq!(parsed.header.compression, Compression::Zlib);
        assert_eq!(parsed.tags, movie.tags);
        assert_eq!(parsed.header.frame_size, Rect::new(0, 0, 11000, 8000));
    }

    #[test]
    fn test_missing_end_record_is_appended() {
        let mut movie = sample_movie();
        movie.tags.pop();
        let parsed = Movie::parse(&movie.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.tags.last().unwrap().kind, TagKind::End);
    }

    #[test]
    fn test_rejects_unknown_signatures() {
        assert!(matches!(
            Movie::parse(b"ZWS\x0d\x00\x00\x00\x00"),
            Err(SwfError::UnsupportedCompression(_))
        ));
        assert!(matches!(
            Movie::parse(b"GIF89a\x00\x00"),
            Err(SwfError::InvalidSignature(_))
        ));
        assert!(matches!(
            Movie::parse(b"FWS"),
            Err(SwfError::UnexpectedEof { .. })
        ));
    }
}

//! Tag records and the record stream
//!
//! A document body is a flat sequence of self-delimited records. Each
//! record starts with a 16-bit word holding the record code in its upper
//! ten bits and the payload length in its lower six; a length of `0x3f`
//! means a 32-bit length follows.

use crate::bits::BitReader;
use crate::{Result, SwfError};

/// Short-form lengths stop one below this marker
const LONG_LENGTH_MARKER: u16 = 0x3f;

// =============================================================================
// Record kinds
// =============================================================================

/// Record codes the engine interprets; everything else is kept verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    End,
    ShowFrame,
    DefineShape,
    PlaceObject,
    RemoveObject,
    DefineBits,
    DefineButton,
    JpegTables,
    SetBackgroundColor,
    DefineFont,
    DefineText,
    DoAction,
    DefineFontInfo,
    DefineSound,
    DefineBitsLossless,
    DefineBitsJpeg2,
    DefineShape2,
    PlaceObject2,
    RemoveObject2,
    DefineShape3,
    DefineText2,
    DefineButton2,
    DefineBitsJpeg3,
    DefineBitsLossless2,
    DefineEditText,
    DefineSprite,
    FrameLabel,
    DefineMorphShape,
    DefineFont2,
    DefineVideoStream,
    DefineFontInfo2,
    PlaceObject3,
    DefineFont3,
    DefineShape4,
    DefineMorphShape2,
    DefineBitsJpeg4,
    Unknown(u16),
}

impl TagKind {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => TagKind::End,
            1 => TagKind::ShowFrame,
            2 => TagKind::DefineShape,
            4 => TagKind::PlaceObject,
            5 => TagKind::RemoveObject,
            6 => TagKind::DefineBits,
            7 => TagKind::DefineButton,
            8 => TagKind::JpegTables,
            9 => TagKind::SetBackgroundColor,
            10 => TagKind::DefineFont,
            11 => TagKind::DefineText,
            12 => TagKind::DoAction,
            13 => TagKind::DefineFontInfo,
            14 => TagKind::DefineSound,
            20 => TagKind::DefineBitsLossless,
            21 => TagKind::DefineBitsJpeg2,
            22 => TagKind::DefineShape2,
            26 => TagKind::PlaceObject2,
            28 => TagKind::RemoveObject2,
            32 => TagKind::DefineShape3,
            33 => TagKind::DefineText2,
            34 => TagKind::DefineButton2,
            35 => TagKind::DefineBitsJpeg3,
            36 => TagKind::DefineBitsLossless2,
            37 => TagKind::DefineEditText,
            39 => TagKind::DefineSprite,
            43 => TagKind::FrameLabel,
            46 => TagKind::DefineMorphShape,
            48 => TagKind::DefineFont2,
            60 => TagKind::DefineVideoStream,
            62 => TagKind::DefineFontInfo2,
            70 => TagKind::PlaceObject3,
            75 => TagKind::DefineFont3,
            83 => TagKind::DefineShape4,
            84 => TagKind::DefineMorphShape2,
            90 => TagKind::DefineBitsJpeg4,
            other => TagKind::Unknown(other),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            TagKind::End => 0,
            TagKind::ShowFrame => 1,
            TagKind::DefineShape => 2,
            TagKind::PlaceObject => 4,
            TagKind::RemoveObject => 5,
            TagKind::DefineBits => 6,
            TagKind::DefineButton => 7,
            TagKind::JpegTables => 8,
            TagKind::SetBackgroundColor => 9,
            TagKind::DefineFont => 10,
            TagKind::DefineText => 11,
            TagKind::DoAction => 12,
            TagKind::DefineFontInfo => 13,
            TagKind::DefineSound => 14,
            TagKind::DefineBitsLossless => 20,
            TagKind::DefineBitsJpeg2 => 21,
            TagKind::DefineShape2 => 22,
            TagKind::PlaceObject2 => 26,
            TagKind::RemoveObject2 => 28,
            TagKind::DefineShape3 => 32,
            TagKind::DefineText2 => 33,
            TagKind::DefineButton2 => 34,
            TagKind::DefineBitsJpeg3 => 35,
            TagKind::DefineBitsLossless2 => 36,
            TagKind::DefineEditText => 37,
            TagKind::DefineSprite => 39,
            TagKind::FrameLabel => 43,
            TagKind::DefineMorphShape => 46,
            TagKind::DefineFont2 => 48,
            TagKind::DefineVideoStream => 60,
            TagKind::DefineFontInfo2 => 62,
            TagKind::PlaceObject3 => 70,
            TagKind::DefineFont3 => 75,
            TagKind::DefineShape4 => 83,
            TagKind::DefineMorphShape2 => 84,
            TagKind::DefineBitsJpeg4 => 90,
            TagKind::Unknown(code) => *code,
        }
    }

    /// Human-readable record name for logs
    pub fn name(&self) -> String {
        match self {
            TagKind::Unknown(code) => format!("UNKNOWN({})", code),
            other => format!("{:?}", other),
        }
    }

    /// Whether the record defines a character under a 16-bit id
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            TagKind::DefineShape
                | TagKind::DefineShape2
                | TagKind::DefineShape3
                | TagKind::DefineShape4
                | TagKind::DefineMorphShape
                | TagKind::DefineMorphShape2
                | TagKind::DefineBits
                | TagKind::DefineBitsJpeg2
                | TagKind::DefineBitsJpeg3
                | TagKind::DefineBitsJpeg4
                | TagKind::DefineBitsLossless
                | TagKind::DefineBitsLossless2
                | TagKind::DefineButton
                | TagKind::DefineButton2
                | TagKind::DefineFont
                | TagKind::DefineFont2
                | TagKind::DefineFont3
                | TagKind::DefineText
                | TagKind::DefineText2
                | TagKind::DefineEditText
                | TagKind::DefineSprite
                | TagKind::DefineSound
                | TagKind::DefineVideoStream
        )
    }

    pub fn is_placement(&self) -> bool {
        matches!(
            self,
            TagKind::PlaceObject | TagKind::PlaceObject2 | TagKind::PlaceObject3
        )
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, TagKind::RemoveObject | TagKind::RemoveObject2)
    }

    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            TagKind::DefineShape
                | TagKind::DefineShape2
                | TagKind::DefineShape3
                | TagKind::DefineShape4
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self, TagKind::DefineText | TagKind::DefineText2)
    }

    pub fn is_font(&self) -> bool {
        matches!(
            self,
            TagKind::DefineFont | TagKind::DefineFont2 | TagKind::DefineFont3
        )
    }
}

// =============================================================================
// Records
// =============================================================================

/// An owned record of the main timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    pub data: Vec<u8>,
    /// Whether the header used the 32-bit length form when read
    pub long_header: bool,
}

impl Tag {
    pub fn new(kind: TagKind, data: Vec<u8>) -> Self {
        Self {
            kind,
            data,
            long_header: false,
        }
    }

    /// Borrowed view used by code that walks nested timelines too
    pub fn as_tag_ref(&self) -> TagRef<'_> {
        TagRef {
            kind: self.kind,
            data: &self.data,
        }
    }

    /// Append header and payload to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        write_record(out, self.kind, &self.data, self.long_header)
    }
}

/// A record borrowed from either the main timeline or a sprite payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRef<'a> {
    pub kind: TagKind,
    pub data: &'a [u8],
}

impl<'a> TagRef<'a> {
    pub fn reader(&self) -> BitReader<'a> {
        BitReader::new(self.data)
    }

    pub fn to_owned_tag(&self) -> Tag {
        Tag::new(self.kind, self.data.to_vec())
    }
}

/// Serialize one record header and payload
pub fn write_record(out: &mut Vec<u8>, kind: TagKind, data: &[u8], long_header: bool) -> Result<()> {
    let code = kind.code();
    if code > 0x3ff {
        return Err(SwfError::ValueOutOfRange(format!("record code {}", code)));
    }
    let len = u32::try_from(data.len())
        .map_err(|_| SwfError::ValueOutOfRange(format!("record length {}", data.len())))?;
    if long_header || len >= u32::from(LONG_LENGTH_MARKER) {
        out.extend_from_slice(&((code << 6) | LONG_LENGTH_MARKER).to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
    } else {
        out.extend_from_slice(&((code << 6) | len as u16).to_le_bytes());
    }
    out.extend_from_slice(data);
    Ok(())
}

// =============================================================================
// Record stream
// =============================================================================

/// Iterator over the records of a byte region
///
/// Stops after the End record or when the region is exhausted; a truncated
/// record yields one error and then ends the stream.
#[derive(Debug, Clone)]
pub struct TagIter<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> TagIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            done: false,
        }
    }

    /// Byte offset of the next record
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_record(&mut self) -> Result<(TagRef<'a>, bool)> {
        let mut reader = BitReader::at(self.data, self.pos);
        let word = reader.read_u16()?;
        let kind = TagKind::from_code(word >> 6);
        let short_len = word & LONG_LENGTH_MARKER;
        let long_header = short_len == LONG_LENGTH_MARKER;
        let len = if long_header {
            reader.read_u32()? as usize
        } else {
            usize::from(short_len)
        };
        let data = reader.read_bytes(len)?;
        self.pos = reader.position();
        Ok((TagRef { kind, data }, long_header))
    }

    /// Like `next`, but also reports whether the long header form was used
    pub fn next_with_header(&mut self) -> Option<Result<(TagRef<'a>, bool)>> {
        if self.done || self.pos >= self.data.len() {
            return None;
        }
        match self.next_record() {
            Ok((tag, long_header)) => {
                if tag.kind == TagKind::End {
                    self.done = true;
                }
                Some(Ok((tag, long_header)))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<'a> Iterator for TagIter<'a> {
    type Item = Result<TagRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_header()
            .map(|item| item.map(|(tag, _)| tag))
    }
}

/// Parse a record region into owned tags
pub fn parse_tags(data: &[u8]) -> Result<Vec<Tag>> {
    let mut iter = TagIter::new(data);
    let mut tags = Vec::new();
    while let Some(item) = iter.next_with_header() {
        let (tag, long_header) = item?;
        tags.push(Tag {
            kind: tag.kind,
            data: tag.data.to_vec(),
            long_header,
        });
    }
    Ok(tags)
}

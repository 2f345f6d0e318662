//! Character definitions the engine reads without fully parsing
//!
//! Covers the defining id shared by every definition, rectangles stored
//! in shape/text/edit-text/morph headers, bitmap and video pixel sizes,
//! sprites and buttons.

use crate::bits::BitReader;
use crate::tag::{TagIter, TagKind, TagRef};
use crate::types::{skip_color_transform, Matrix, Rect};
use crate::{Result, SwfError};

/// Id of the character a defining record introduces
pub fn definition_id(tag: TagRef<'_>) -> Result<Option<u16>> {
    if !tag.kind.is_definition() {
        return Ok(None);
    }
    Ok(Some(tag.reader().read_u16()?))
}

/// Rectangles a definition stores in its header
///
/// One for shapes, text and edit text, two for morph shapes (start and
/// end), none for every other record.
pub fn stored_rects(tag: TagRef<'_>) -> Result<Vec<Rect>> {
    let mut reader = tag.reader();
    match tag.kind {
        TagKind::DefineShape
        | TagKind::DefineShape2
        | TagKind::DefineShape3
        | TagKind::DefineShape4
        | TagKind::DefineText
        | TagKind::DefineText2
        | TagKind::DefineEditText => {
            reader.read_u16()?;
            Ok(vec![Rect::read(&mut reader)?])
        }
        TagKind::DefineMorphShape | TagKind::DefineMorphShape2 => {
            reader.read_u16()?;
            let start = Rect::read(&mut reader)?;
            let end = Rect::read(&mut reader)?;
            Ok(vec![start, end])
        }
        _ => Ok(Vec::new()),
    }
}

// =============================================================================
// Bitmaps and video
// =============================================================================

/// Pixel dimensions of a bitmap or video stream definition
///
/// Returns `None` for other records and for image data whose format is
/// not recognized.
pub fn pixel_size(tag: TagRef<'_>) -> Result<Option<(u32, u32)>> {
    let mut reader = tag.reader();
    match tag.kind {
        TagKind::DefineBitsLossless | TagKind::DefineBitsLossless2 => {
            reader.read_u16()?;
            let _format = reader.read_u8()?;
            let width = reader.read_u16()?;
            let height = reader.read_u16()?;
            Ok(Some((u32::from(width), u32::from(height))))
        }
        TagKind::DefineVideoStream => {
            reader.read_u16()?;
            let _frames = reader.read_u16()?;
            let width = reader.read_u16()?;
            let height = reader.read_u16()?;
            Ok(Some((u32::from(width), u32::from(height))))
        }
        TagKind::DefineBits | TagKind::DefineBitsJpeg2 => {
            reader.read_u16()?;
            Ok(image_size(reader.remaining()))
        }
        TagKind::DefineBitsJpeg3 => {
            reader.read_u16()?;
            let alpha_offset = reader.read_u32()? as usize;
            let image = reader.remaining();
            Ok(image_size(&image[..alpha_offset.min(image.len())]))
        }
        TagKind::DefineBitsJpeg4 => {
            reader.read_u16()?;
            let alpha_offset = reader.read_u32()? as usize;
            let _deblocking = reader.read_u16()?;
            let image = reader.remaining();
            Ok(image_size(&image[..alpha_offset.min(image.len())]))
        }
        _ => Ok(None),
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn image_size(data: &[u8]) -> Option<(u32, u32)> {
    if data.starts_with(&PNG_SIGNATURE) {
        // IHDR is always the first chunk
        let width = data.get(16..20)?;
        let height = data.get(20..24)?;
        return Some((
            u32::from_be_bytes([width[0], width[1], width[2], width[3]]),
            u32::from_be_bytes([height[0], height[1], height[2], height[3]]),
        ));
    }
    if data.starts_with(b"GIF8") {
        let dims = data.get(6..10)?;
        return Some((
            u32::from(u16::from_le_bytes([dims[0], dims[1]])),
            u32::from(u16::from_le_bytes([dims[2], dims[3]])),
        ));
    }
    jpeg_size(data)
}

/// Scan JPEG markers for the first start-of-frame segment
fn jpeg_size(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 0usize;
    while pos + 1 < data.len() {
        if data[pos] != 0xff {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        match marker {
            // fill byte
            0xff => pos += 1,
            // markers without a length: SOI, EOI, TEM, RSTn, and the stray
            // zero after an escaped 0xff
            0xd8 | 0xd9 | 0x01 | 0xd0..=0xd7 | 0x00 => pos += 2,
            0xc0..=0xcf if !matches!(marker, 0xc4 | 0xc8 | 0xcc) => {
                let frame = data.get(pos + 5..pos + 9)?;
                let height = u16::from_be_bytes([frame[0], frame[1]]);
                let width = u16::from_be_bytes([frame[2], frame[3]]);
                return Some((u32::from(width), u32::from(height)));
            }
            _ => {
                let len = data.get(pos + 2..pos + 4)?;
                pos += 2 + usize::from(u16::from_be_bytes([len[0], len[1]]));
            }
        }
    }
    None
}

// =============================================================================
// Sprites
// =============================================================================

/// A sprite definition viewed in place
///
/// The nested records stay in the sprite payload; [`SpriteDefinition::tags`]
/// walks them without copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteDefinition<'a> {
    pub id: u16,
    pub frame_count: u16,
    data: &'a [u8],
}

impl<'a> SpriteDefinition<'a> {
    pub fn parse(tag: TagRef<'a>) -> Result<SpriteDefinition<'a>> {
        if tag.kind != TagKind::DefineSprite {
            return Err(SwfError::invalid(
                "sprite",
                format!("{} is not a sprite", tag.kind.name()),
            ));
        }
        let mut reader = tag.reader();
        let id = reader.read_u16()?;
        let frame_count = reader.read_u16()?;
        Ok(SpriteDefinition {
            id,
            frame_count,
            data: reader.remaining(),
        })
    }

    /// Nested records, borrowed from the sprite payload
    pub fn tags(&self) -> TagIter<'a> {
        TagIter::new(self.data)
    }
}

// =============================================================================
// Buttons
// =============================================================================

const BUTTON_HAS_BLEND_MODE: u8 = 0x20;
const BUTTON_HAS_FILTER_LIST: u8 = 0x10;

/// One character drawn by a button in some of its states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRecord {
    /// Hit-test/down/over/up state bits
    pub states: u8,
    pub character_id: u16,
    pub depth: u16,
    pub matrix: Matrix,
}

/// Parse the character records of a DefineButton/DefineButton2
///
/// Filter lists are not decoded, so parsing ends after the first record
/// that carries one.
pub fn button_records(tag: TagRef<'_>) -> Result<Vec<ButtonRecord>> {
    let mut reader = tag.reader();
    let version = match tag.kind {
        TagKind::DefineButton => 1,
        TagKind::DefineButton2 => 2,
        other => {
            return Err(SwfError::invalid(
                "button",
                format!("{} is not a button", other.name()),
            ))
        }
    };
    reader.read_u16()?;
    if version == 2 {
        let _flags = reader.read_u8()?;
        let _action_offset = reader.read_u16()?;
    }

    let mut records = Vec::new();
    loop {
        let flags = reader.read_u8()?;
        if flags == 0 {
            break;
        }
        let record = read_button_record(&mut reader, flags, version)?;
        records.push(record);
        if flags & BUTTON_HAS_FILTER_LIST != 0 {
            tracing::debug!("button filter list: remaining records skipped");
            break;
        }
        if flags & BUTTON_HAS_BLEND_MODE != 0 {
            let _blend_mode = reader.read_u8()?;
        }
    }
    Ok(records)
}

fn read_button_record(reader: &mut BitReader<'_>, flags: u8, version: u8) -> Result<ButtonRecord> {
    let character_id = reader.read_u16()?;
    let depth = reader.read_u16()?;
    let matrix = Matrix::read(reader)?;
    if version == 2 {
        skip_color_transform(reader, true)?;
    }
    Ok(ButtonRecord {
        states: flags & 0x0f,
        character_id,
        depth,
        matrix,
    })
}

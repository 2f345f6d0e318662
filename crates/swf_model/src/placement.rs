//! Display-list records: PlaceObject (1, 2, 3) and RemoveObject (1, 2)

use crate::bits::{BitReader, BitWriter};
use crate::tag::{Tag, TagKind, TagRef};
use crate::types::{skip_color_transform, Matrix};
use crate::{Result, SwfError};

const PLACE_HAS_CLIP_ACTIONS: u8 = 0x80;
const PLACE_HAS_CLIP_DEPTH: u8 = 0x40;
const PLACE_HAS_NAME: u8 = 0x20;
const PLACE_HAS_RATIO: u8 = 0x10;
const PLACE_HAS_COLOR_TRANSFORM: u8 = 0x08;
const PLACE_HAS_MATRIX: u8 = 0x04;
const PLACE_HAS_CHARACTER: u8 = 0x02;
const PLACE_MOVE: u8 = 0x01;

const PLACE3_HAS_IMAGE: u8 = 0x10;
const PLACE3_HAS_CLASS_NAME: u8 = 0x08;

/// A parsed placement record
///
/// Fields absent from the record are `None`; the character id is always
/// present for version 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceObject {
    pub version: u8,
    pub depth: u16,
    pub character_id: Option<u16>,
    pub matrix: Option<Matrix>,
    pub ratio: Option<u16>,
    pub name: Option<String>,
    pub clip_depth: Option<u16>,
    pub class_name: Option<String>,
    /// Modifies the character already at this depth
    pub is_move: bool,
}

impl PlaceObject {
    pub fn parse(tag: TagRef<'_>) -> Result<PlaceObject> {
        let mut reader = tag.reader();
        match tag.kind {
            TagKind::PlaceObject => {
                let character_id = reader.read_u16()?;
                let depth = reader.read_u16()?;
                let matrix = Matrix::read(&mut reader)?;
                Ok(PlaceObject {
                    version: 1,
                    depth,
                    character_id: Some(character_id),
                    matrix: Some(matrix),
                    ..PlaceObject::default()
                })
            }
            TagKind::PlaceObject2 => {
                let flags = reader.read_u8()?;
                read_place_body(&mut reader, 2, flags, 0)
            }
            TagKind::PlaceObject3 => {
                let flags = reader.read_u8()?;
                let flags2 = reader.read_u8()?;
                read_place_body(&mut reader, 3, flags, flags2)
            }
            other => Err(SwfError::invalid(
                "placement",
                format!("{} is not a placement", other.name()),
            )),
        }
    }

    /// The placement matrix, identity when the record omits it
    pub fn matrix_or_identity(&self) -> Matrix {
        self.matrix.unwrap_or(Matrix::IDENTITY)
    }

    /// Encode as a PlaceObject2 record
    pub fn to_place_object2(&self) -> Result<Tag> {
        let mut flags = 0u8;
        if self.is_move {
            flags |= PLACE_MOVE;
        }
        if self.character_id.is_some() {
            flags |= PLACE_HAS_CHARACTER;
        }
        if self.matrix.is_some() {
            flags |= PLACE_HAS_MATRIX;
        }
        if self.ratio.is_some() {
            flags |= PLACE_HAS_RATIO;
        }
        if self.name.is_some() {
            flags |= PLACE_HAS_NAME;
        }
        if self.clip_depth.is_some() {
            flags |= PLACE_HAS_CLIP_DEPTH;
        }

        let mut writer = BitWriter::new();
        writer.write_u8(flags);
        writer.write_u16(self.depth);
        if let Some(id) = self.character_id {
            writer.write_u16(id);
        }
        if let Some(matrix) = &self.matrix {
            matrix.write(&mut writer)?;
        }
        if let Some(ratio) = self.ratio {
            writer.write_u16(ratio);
        }
        if let Some(name) = &self.name {
            writer.write_cstring(name);
        }
        if let Some(clip_depth) = self.clip_depth {
            writer.write_u16(clip_depth);
        }
        Ok(Tag::new(TagKind::PlaceObject2, writer.into_bytes()))
    }
}

fn read_place_body(
    reader: &mut BitReader<'_>,
    version: u8,
    flags: u8,
    flags2: u8,
) -> Result<PlaceObject> {
    let depth = reader.read_u16()?;
    let has_character = flags & PLACE_HAS_CHARACTER != 0;
    let class_name = if flags2 & PLACE3_HAS_CLASS_NAME != 0
        || (flags2 & PLACE3_HAS_IMAGE != 0 && has_character)
    {
        Some(reader.read_cstring()?)
    } else {
        None
    };
    let character_id = if has_character {
        Some(reader.read_u16()?)
    } else {
        None
    };
    let matrix = if flags & PLACE_HAS_MATRIX != 0 {
        Some(Matrix::read(reader)?)
    } else {
        None
    };
    if flags & PLACE_HAS_COLOR_TRANSFORM != 0 {
        skip_color_transform(reader, true)?;
    }
    let ratio = if flags & PLACE_HAS_RATIO != 0 {
        Some(reader.read_u16()?)
    } else {
        None
    };
    let name = if flags & PLACE_HAS_NAME != 0 {
        Some(reader.read_cstring()?)
    } else {
        None
    };
    let clip_depth = if flags & PLACE_HAS_CLIP_DEPTH != 0 {
        Some(reader.read_u16()?)
    } else {
        None
    };
    if flags & PLACE_HAS_CLIP_ACTIONS != 0 {
        tracing::trace!("clip actions at depth {} left unparsed", depth);
    }
    Ok(PlaceObject {
        version,
        depth,
        character_id,
        matrix,
        ratio,
        name,
        clip_depth,
        class_name,
        is_move: flags & PLACE_MOVE != 0,
    })
}

/// A parsed removal record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveObject {
    pub depth: u16,
    /// Only RemoveObject (version 1) names the character
    pub character_id: Option<u16>,
}

impl RemoveObject {
    pub fn parse(tag: TagRef<'_>) -> Result<RemoveObject> {
        let mut reader = tag.reader();
        match tag.kind {
            TagKind::RemoveObject => {
                let character_id = reader.read_u16()?;
                let depth = reader.read_u16()?;
                Ok(RemoveObject {
                    depth,
                    character_id: Some(character_id),
                })
            }
            TagKind::RemoveObject2 => Ok(RemoveObject {
                depth: reader.read_u16()?,
                character_id: None,
            }),
            other => Err(SwfError::invalid(
                "removal",
                format!("{} is not a removal", other.name()),
            )),
        }
    }

    pub fn to_tag(&self) -> Tag {
        let mut data = Vec::with_capacity(4);
        match self.character_id {
            Some(id) => {
                data.extend_from_slice(&id.to_le_bytes());
                data.extend_from_slice(&self.depth.to_le_bytes());
                Tag::new(TagKind::RemoveObject, data)
            }
            None => {
                data.extend_from_slice(&self.depth.to_le_bytes());
                Tag::new(TagKind::RemoveObject2, data)
            }
        }
    }
}

//! Font definitions and font info records
//!
//! Glyph outlines are stored in a 1024-unit em square, except for
//! DefineFont3 which uses a 20x finer grid (20480 units).

use crate::bits::{BitReader, BitWriter};
use crate::shape::Outline;
use crate::tag::{Tag, TagKind, TagRef};
use crate::types::Rect;
use crate::{Result, SwfError};

/// Em square of DefineFont and DefineFont2 glyphs
pub const EM_SQUARE: i32 = 1024;

/// Resolution multiplier of DefineFont3 glyphs
pub const FONT3_RESOLUTION: i32 = 20;

const FLAG_HAS_LAYOUT: u8 = 0x80;
const FLAG_WIDE_OFFSETS: u8 = 0x08;
const FLAG_WIDE_CODES: u8 = 0x04;

/// Layout block of DefineFont2/3
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontLayout {
    pub ascent: u16,
    pub descent: u16,
    pub leading: i16,
    pub advances: Vec<i16>,
    /// Per-glyph bounds in em units
    pub bounds: Vec<Rect>,
}

/// A parsed DefineFont, DefineFont2 or DefineFont3 record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDefinition {
    pub id: u16,
    pub version: u8,
    pub name: Option<String>,
    pub flags: u8,
    pub glyphs: Vec<Outline>,
    /// Character code per glyph; empty for DefineFont
    pub codes: Vec<u16>,
    pub layout: Option<FontLayout>,
}

impl FontDefinition {
    pub fn parse(tag: TagRef<'_>) -> Result<FontDefinition> {
        match tag.kind {
            TagKind::DefineFont => parse_font1(tag.data),
            TagKind::DefineFont2 => parse_font2(tag.data, 2),
            TagKind::DefineFont3 => parse_font2(tag.data, 3),
            other => Err(SwfError::invalid(
                "font",
                format!("{} is not a font definition", other.name()),
            )),
        }
    }

    /// Glyph grid units per em
    pub fn units_per_em(&self) -> i32 {
        if self.version >= 3 {
            EM_SQUARE * FONT3_RESOLUTION
        } else {
            EM_SQUARE
        }
    }

    pub fn kind(&self) -> TagKind {
        match self.version {
            1 => TagKind::DefineFont,
            2 => TagKind::DefineFont2,
            _ => TagKind::DefineFont3,
        }
    }

    /// Serialize the definition; offset width is chosen to fit
    pub fn to_tag(&self) -> Result<Tag> {
        let mut glyph_data = Vec::with_capacity(self.glyphs.len());
        for glyph in &self.glyphs {
            let mut writer = BitWriter::new();
            glyph.write_glyph(&mut writer)?;
            glyph_data.push(writer.into_bytes());
        }
        let data = if self.version == 1 {
            encode_font1(self.id, &glyph_data)?
        } else {
            self.encode_font2(&glyph_data)?
        };
        Ok(Tag::new(self.kind(), data))
    }

    fn encode_font2(&self, glyph_data: &[Vec<u8>]) -> Result<Vec<u8>> {
        let count = glyph_data.len();
        let glyph_count = u16::try_from(count)
            .map_err(|_| SwfError::ValueOutOfRange(format!("{} glyphs", count)))?;
        let glyph_bytes: usize = glyph_data.iter().map(Vec::len).sum();
        let narrow_table = 2 * (count + 1);
        let wide = narrow_table + glyph_bytes > usize::from(u16::MAX);
        let entry = if wide { 4 } else { 2 };

        let mut flags = (self.flags & !(FLAG_WIDE_OFFSETS | FLAG_HAS_LAYOUT)) | FLAG_WIDE_CODES;
        if wide {
            flags |= FLAG_WIDE_OFFSETS;
        }
        if self.layout.is_some() {
            flags |= FLAG_HAS_LAYOUT;
        }

        let name = self.name.as_deref().unwrap_or("");
        let name_len = u8::try_from(name.len())
            .map_err(|_| SwfError::ValueOutOfRange(format!("font name of {} bytes", name.len())))?;

        let mut writer = BitWriter::new();
        writer.write_u16(self.id);
        writer.write_u8(flags);
        writer.write_u8(0);
        writer.write_u8(name_len);
        writer.write_bytes(name.as_bytes());
        writer.write_u16(glyph_count);

        let mut offset = entry * (count + 1);
        let write_offset = |writer: &mut BitWriter, value: usize| -> Result<()> {
            if wide {
                let value = u32::try_from(value)
                    .map_err(|_| SwfError::ValueOutOfRange("font offset".to_string()))?;
                writer.write_u32(value);
            } else {
                writer.write_u16(value as u16);
            }
            Ok(())
        };
        for glyph in glyph_data {
            write_offset(&mut writer, offset)?;
            offset += glyph.len();
        }
        // code table follows the glyphs
        write_offset(&mut writer, offset)?;
        for glyph in glyph_data {
            writer.write_bytes(glyph);
        }
        for index in 0..count {
            writer.write_u16(self.codes.get(index).copied().unwrap_or(0));
        }

        if let Some(layout) = &self.layout {
            writer.write_u16(layout.ascent);
            writer.write_u16(layout.descent);
            writer.write_i16(layout.leading);
            for index in 0..count {
                writer.write_i16(layout.advances.get(index).copied().unwrap_or(0));
            }
            for index in 0..count {
                layout
                    .bounds
                    .get(index)
                    .copied()
                    .unwrap_or_default()
                    .write(&mut writer)?;
            }
            // no kerning pairs
            writer.write_u16(0);
        }
        Ok(writer.into_bytes())
    }
}

fn encode_font1(id: u16, glyph_data: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut writer = BitWriter::new();
    writer.write_u16(id);
    let mut offset = 2 * glyph_data.len();
    for glyph in glyph_data {
        let value = u16::try_from(offset)
            .map_err(|_| SwfError::ValueOutOfRange("font offset".to_string()))?;
        writer.write_u16(value);
        offset += glyph.len();
    }
    for glyph in glyph_data {
        writer.write_bytes(glyph);
    }
    Ok(writer.into_bytes())
}

fn read_glyph_at(data: &[u8], table_start: usize, offset: usize) -> Result<Outline> {
    let start = table_start
        .checked_add(offset)
        .filter(|&start| start <= data.len())
        .ok_or_else(|| SwfError::invalid("font", format!("glyph offset {} outside record", offset)))?;
    Outline::read_glyph(&mut BitReader::at(data, start))
}

fn parse_font1(data: &[u8]) -> Result<FontDefinition> {
    let mut reader = BitReader::new(data);
    let id = reader.read_u16()?;
    let table_start = reader.position();

    let mut glyphs = Vec::new();
    if !reader.is_empty() {
        // the first offset is also the size of the offset table
        let first = usize::from(reader.read_u16()?);
        let count = first / 2;
        let mut offsets = Vec::with_capacity(count);
        if count > 0 {
            offsets.push(first);
        }
        for _ in 1..count {
            offsets.push(usize::from(reader.read_u16()?));
        }
        for offset in offsets {
            glyphs.push(read_glyph_at(data, table_start, offset)?);
        }
    }

    Ok(FontDefinition {
        id,
        version: 1,
        name: None,
        flags: 0,
        glyphs,
        codes: Vec::new(),
        layout: None,
    })
}

fn parse_font2(data: &[u8], version: u8) -> Result<FontDefinition> {
    let mut reader = BitReader::new(data);
    let id = reader.read_u16()?;
    let flags = reader.read_u8()?;
    let _language = reader.read_u8()?;
    let name_len = usize::from(reader.read_u8()?);
    let name = decode_name(reader.read_bytes(name_len)?);
    let count = usize::from(reader.read_u16()?);

    let mut font = FontDefinition {
        id,
        version,
        name,
        flags,
        glyphs: Vec::with_capacity(count),
        codes: Vec::with_capacity(count),
        layout: None,
    };
    if count == 0 {
        // encoders disagree on whether the empty tables are written
        return Ok(font);
    }

    let table_start = reader.position();
    let wide = flags & FLAG_WIDE_OFFSETS != 0;
    let read_offset = |reader: &mut BitReader<'_>| -> Result<usize> {
        if wide {
            Ok(reader.read_u32()? as usize)
        } else {
            Ok(usize::from(reader.read_u16()?))
        }
    };
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(read_offset(&mut reader)?);
    }
    let code_table = read_offset(&mut reader)?;
    for offset in offsets {
        font.glyphs.push(read_glyph_at(data, table_start, offset)?);
    }

    let mut reader = BitReader::at(data, table_start.saturating_add(code_table));
    for _ in 0..count {
        let code = if flags & FLAG_WIDE_CODES != 0 {
            reader.read_u16()?
        } else {
            u16::from(reader.read_u8()?)
        };
        font.codes.push(code);
    }

    if flags & FLAG_HAS_LAYOUT != 0 {
        let ascent = reader.read_u16()?;
        let descent = reader.read_u16()?;
        let leading = reader.read_i16()?;
        let mut advances = Vec::with_capacity(count);
        for _ in 0..count {
            advances.push(reader.read_i16()?);
        }
        let mut bounds = Vec::with_capacity(count);
        for _ in 0..count {
            bounds.push(Rect::read(&mut reader)?);
        }
        font.layout = Some(FontLayout {
            ascent,
            descent,
            leading,
            advances,
            bounds,
        });
    }
    Ok(font)
}

fn decode_name(bytes: &[u8]) -> Option<String> {
    let trimmed = match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    };
    if trimmed.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(trimmed).into_owned())
    }
}

/// Every font definition among `tags`, in document order
pub fn fonts(tags: &[Tag]) -> impl Iterator<Item = Result<FontDefinition>> + '_ {
    tags.iter()
        .filter(|tag| tag.kind.is_font())
        .map(|tag| FontDefinition::parse(tag.as_tag_ref()))
}

/// Every font info record among `tags`, in document order
pub fn font_infos(tags: &[Tag]) -> impl Iterator<Item = Result<FontInfo>> + '_ {
    tags.iter()
        .filter(|tag| matches!(tag.kind, TagKind::DefineFontInfo | TagKind::DefineFontInfo2))
        .map(|tag| FontInfo::parse(tag.as_tag_ref()))
}

// =============================================================================
// Font info
// =============================================================================

/// Name carried by a DefineFontInfo/DefineFontInfo2 record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontInfo {
    pub font_id: u16,
    pub name: Option<String>,
}

impl FontInfo {
    pub fn parse(tag: TagRef<'_>) -> Result<FontInfo> {
        if !matches!(tag.kind, TagKind::DefineFontInfo | TagKind::DefineFontInfo2) {
            return Err(SwfError::invalid(
                "font info",
                format!("{} is not a font info record", tag.kind.name()),
            ));
        }
        let mut reader = tag.reader();
        let font_id = reader.read_u16()?;
        let name_len = usize::from(reader.read_u8()?);
        let name = decode_name(reader.read_bytes(name_len)?);
        Ok(FontInfo { font_id, name })
    }
}

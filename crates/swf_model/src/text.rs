//! Static text definitions
//!
//! A text definition stores its bounding rectangle, then a matrix that
//! always starts on a byte boundary, then the glyph/advance field widths
//! and a list of text records. Each record may restate the font, color,
//! pen position and height before its glyph entries; unstated values carry
//! over from the previous record.

use crate::bits::{signed_bits, unsigned_bits, BitReader, BitWriter};
use crate::tag::{Tag, TagKind, TagRef};
use crate::types::{Matrix, Rect, Rgba};
use crate::{Result, SwfError};

const HAS_FONT: u8 = 0x08;
const HAS_COLOR: u8 = 0x04;
const HAS_Y_OFFSET: u8 = 0x02;
const HAS_X_OFFSET: u8 = 0x01;
/// Set on records that carry style fields
const STYLE_RECORD: u8 = 0x80;

/// One glyph of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphEntry {
    /// Index into the font's glyph table
    pub index: u32,
    /// Pen advance in twips after this glyph
    pub advance: i32,
}

/// A sequence of glyphs sharing font, height and baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub font_id: u16,
    /// Em height in twips
    pub font_size: u16,
    /// Pen start in the text's own coordinate space
    pub x: i32,
    pub y: i32,
    pub color: Option<Rgba>,
    pub glyphs: Vec<GlyphEntry>,
}

impl TextRun {
    /// Glyph indices paired with their pen offset from the run start
    pub fn glyph_offsets(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        let mut offset = 0i32;
        self.glyphs.iter().map(move |glyph| {
            let at = offset;
            offset = offset.saturating_add(glyph.advance);
            (glyph.index, at)
        })
    }

    pub fn total_advance(&self) -> i32 {
        self.glyphs
            .iter()
            .fold(0i32, |sum, glyph| sum.saturating_add(glyph.advance))
    }
}

// =============================================================================
// DefineText
// =============================================================================

/// Header fields of a DefineText/DefineText2 record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineText {
    pub id: u16,
    /// 1 for RGB colors, 2 for RGBA
    pub version: u8,
    pub bounds: Rect,
    pub matrix: Matrix,
    /// Byte offset of the matrix within the payload
    pub matrix_offset: usize,
    /// Byte offset just past the matrix
    pub matrix_end: usize,
    pub glyph_bits: u8,
    pub advance_bits: u8,
    records_offset: usize,
}

impl DefineText {
    pub fn parse(tag: TagRef<'_>) -> Result<DefineText> {
        let version = match tag.kind {
            TagKind::DefineText => 1,
            TagKind::DefineText2 => 2,
            other => {
                return Err(SwfError::invalid(
                    "text",
                    format!("{} is not a text definition", other.name()),
                ))
            }
        };
        let mut reader = tag.reader();
        let id = reader.read_u16()?;
        let bounds = Rect::read(&mut reader)?;
        let matrix_offset = reader.position();
        let matrix = Matrix::read(&mut reader)?;
        let matrix_end = reader.position();
        let glyph_bits = reader.read_u8()?;
        let advance_bits = reader.read_u8()?;
        if glyph_bits > 32 || advance_bits > 32 {
            return Err(SwfError::invalid("text", "glyph field wider than 32 bits"));
        }
        Ok(DefineText {
            id,
            version,
            bounds,
            matrix,
            matrix_offset,
            matrix_end,
            glyph_bits,
            advance_bits,
            records_offset: reader.position(),
        })
    }

    /// Restartable iterator over the runs stored in `data` (the same
    /// payload this header was parsed from)
    pub fn runs<'a>(&self, data: &'a [u8]) -> TextRuns<'a> {
        TextRuns {
            reader: BitReader::at(data, self.records_offset),
            version: self.version,
            glyph_bits: u32::from(self.glyph_bits),
            advance_bits: u32::from(self.advance_bits),
            font: None,
            color: None,
            x: 0,
            y: 0,
            done: false,
        }
    }
}

/// Iterator over the text runs of one definition
#[derive(Debug, Clone)]
pub struct TextRuns<'a> {
    reader: BitReader<'a>,
    version: u8,
    glyph_bits: u32,
    advance_bits: u32,
    /// Font id and height in effect
    font: Option<(u16, u16)>,
    color: Option<Rgba>,
    x: i32,
    y: i32,
    done: bool,
}

impl<'a> TextRuns<'a> {
    fn next_run(&mut self) -> Result<Option<TextRun>> {
        loop {
            let flags = self.reader.read_u8()?;
            if flags == 0 {
                return Ok(None);
            }

            let count = if flags & STYLE_RECORD != 0 {
                let font_id = if flags & HAS_FONT != 0 {
                    Some(self.reader.read_u16()?)
                } else {
                    None
                };
                if flags & HAS_COLOR != 0 {
                    self.color = Some(if self.version >= 2 {
                        Rgba::read_rgba(&mut self.reader)?
                    } else {
                        Rgba::read_rgb(&mut self.reader)?
                    });
                }
                if flags & HAS_X_OFFSET != 0 {
                    self.x = i32::from(self.reader.read_i16()?);
                }
                if flags & HAS_Y_OFFSET != 0 {
                    self.y = i32::from(self.reader.read_i16()?);
                }
                if let Some(font_id) = font_id {
                    let height = self.reader.read_u16()?;
                    self.font = Some((font_id, height));
                }
                self.reader.read_u8()?
            } else {
                // legacy glyph-only record: the flags byte is the glyph count
                flags
            };

            let mut glyphs = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let index = self.reader.read_ubits(self.glyph_bits)?;
                let advance = self.reader.read_sbits(self.advance_bits)?;
                glyphs.push(GlyphEntry { index, advance });
            }
            self.reader.align();

            let (font_id, font_size) = match self.font {
                Some(font) => font,
                // style change ahead of the first font selection
                None if glyphs.is_empty() => continue,
                None => {
                    return Err(SwfError::invalid("text", "glyphs before any font selection"));
                }
            };
            let run = TextRun {
                font_id,
                font_size,
                x: self.x,
                y: self.y,
                color: self.color,
                glyphs,
            };
            self.x = self.x.saturating_add(run.total_advance());
            return Ok(Some(run));
        }
    }
}

impl<'a> Iterator for TextRuns<'a> {
    type Item = Result<TextRun>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_run() {
            Ok(Some(run)) => Some(Ok(run)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Serialize a text definition; every run restates its full style
pub fn encode_define_text(
    id: u16,
    version: u8,
    bounds: &Rect,
    matrix: &Matrix,
    runs: &[TextRun],
) -> Result<Tag> {
    let glyphs = runs.iter().flat_map(|run| run.glyphs.iter());
    let glyph_bits = glyphs
        .clone()
        .map(|g| unsigned_bits(g.index))
        .max()
        .unwrap_or(0);
    let advance_bits = glyphs.map(|g| signed_bits(g.advance)).max().unwrap_or(0);

    let mut writer = BitWriter::new();
    writer.write_u16(id);
    bounds.write(&mut writer)?;
    matrix.write(&mut writer)?;
    writer.write_u8(glyph_bits as u8);
    writer.write_u8(advance_bits as u8);

    for run in runs {
        if run.glyphs.len() > usize::from(u8::MAX) {
            return Err(SwfError::ValueOutOfRange(format!(
                "{} glyphs in one text record",
                run.glyphs.len()
            )));
        }
        let x = i16::try_from(run.x)
            .map_err(|_| SwfError::ValueOutOfRange(format!("text x offset {}", run.x)))?;
        let y = i16::try_from(run.y)
            .map_err(|_| SwfError::ValueOutOfRange(format!("text y offset {}", run.y)))?;
        let mut flags = STYLE_RECORD | HAS_FONT | HAS_X_OFFSET | HAS_Y_OFFSET;
        if run.color.is_some() {
            flags |= HAS_COLOR;
        }
        writer.write_u8(flags);
        writer.write_u16(run.font_id);
        if let Some(color) = run.color {
            if version >= 2 {
                color.write_rgba(&mut writer);
            } else {
                color.write_rgb(&mut writer);
            }
        }
        writer.write_i16(x);
        writer.write_i16(y);
        writer.write_u16(run.font_size);
        writer.write_u8(run.glyphs.len() as u8);
        for glyph in &run.glyphs {
            writer.write_ubits(glyph.index, glyph_bits);
            writer.write_sbits(glyph.advance, advance_bits);
        }
        writer.align();
    }
    writer.write_u8(0);

    let kind = if version >= 2 {
        TagKind::DefineText2
    } else {
        TagKind::DefineText
    };
    Ok(Tag::new(kind, writer.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(font_id: u16, x: i32, glyphs: &[(u32, i32)]) -> TextRun {
        TextRun {
            font_id,
            font_size: 240,
            x,
            y: 300,
            color: Some(Rgba {
                r: 10,
                g: 20,
                b: 30,
                a: 255,
            }),
            glyphs: glyphs
                .iter()
                .map(|&(index, advance)| GlyphEntry { index, advance })
                .collect(),
        }
    }

    #[test]
    fn test_parse_header_offsets() {
        let tag = encode_define_text(
            4,
            1,
            &Rect::new(0, 0, 1000, 400),
            &Matrix::translate(20, 40),
            &[run(1, 0, &[(0, 100), (3, 120)])],
        )
        .unwrap();
        let text = DefineText::parse(tag.as_tag_ref()).unwrap();
        assert_eq!(text.id, 4);
        assert_eq!(text.bounds, Rect::new(0, 0, 1000, 400));
        assert_eq!(text.matrix, Matrix::translate(20, 40));
        assert!(text.matrix_offset > 2);
        assert!(text.matrix_end > text.matrix_offset);
        assert_eq!(text.glyph_bits, 2);
        assert_eq!(text.advance_bits, 8);
    }

    #[test]
    fn test_runs_round_trip() {
        let runs = vec![run(1, 0, &[(0, 100), (3, 120)]), run(2, 500, &[(1, -5)])];
        let tag = encode_define_text(9, 2, &Rect::default(), &Matrix::IDENTITY, &runs).unwrap();
        assert_eq!(tag.kind, TagKind::DefineText2);
        let text = DefineText::parse(tag.as_tag_ref()).unwrap();
        let parsed: Vec<TextRun> = text.runs(&tag.data).collect::<Result<_>>().unwrap();
        assert_eq!(parsed, runs);

        // the iterator can be restarted from the header
        assert_eq!(text.runs(&tag.data).count(), 2);
    }

    #[test]
    fn test_state_carries_between_records() {
        // style record with font + x, then a record restating only y
        let mut writer = BitWriter::new();
        writer.write_u16(1);
        Rect::default().write(&mut writer).unwrap();
        Matrix::IDENTITY.write(&mut writer).unwrap();
        writer.write_u8(4);
        writer.write_u8(8);
        writer.write_u8(STYLE_RECORD | HAS_FONT | HAS_X_OFFSET);
        writer.write_u16(5);
        writer.write_i16(100);
        writer.write_u16(480);
        writer.write_u8(2);
        writer.write_ubits(1, 4);
        writer.write_sbits(50, 8);
        writer.write_ubits(2, 4);
        writer.write_sbits(60, 8);
        writer.write_u8(STYLE_RECORD | HAS_Y_OFFSET);
        writer.write_i16(-200);
        writer.write_u8(1);
        writer.write_ubits(3, 4);
        writer.write_sbits(10, 8);
        writer.write_u8(0);
        let data = writer.into_bytes();

        let tag = TagRef {
            kind: TagKind::DefineText,
            data: &data,
        };
        let text = DefineText::parse(tag).unwrap();
        let runs: Vec<TextRun> = text.runs(&data).collect::<Result<_>>().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].font_id, runs[0].font_size, runs[0].x, runs[0].y), (5, 480, 100, 0));
        assert_eq!(runs[0].glyph_offsets().collect::<Vec<_>>(), vec![(1, 0), (2, 50)]);
        assert_eq!((runs[1].font_id, runs[1].x, runs[1].y), (5, 210, -200));
    }

    #[test]
    fn test_glyphs_without_font_are_rejected() {
        let mut writer = BitWriter::new();
        writer.write_u16(1);
        Rect::default().write(&mut writer).unwrap();
        Matrix::IDENTITY.write(&mut writer).unwrap();
        writer.write_u8(1);
        writer.write_u8(1);
        writer.write_u8(STYLE_RECORD | HAS_X_OFFSET);
        writer.write_i16(0);
        writer.write_u8(1);
        writer.write_ubits(0, 2);
        writer.write_u8(0);
        let data = writer.into_bytes();
        let tag = TagRef {
            kind: TagKind::DefineText,
            data: &data,
        };
        let text = DefineText::parse(tag).unwrap();
        let mut runs = text.runs(&data);
        assert!(matches!(runs.next(), Some(Err(SwfError::InvalidRecord { .. }))));
        assert!(runs.next().is_none());
    }

    #[test]
    fn test_style_change_before_font_is_folded() {
        // colour-only record ahead of the font selection yields no run
        let mut writer = BitWriter::new();
        writer.write_u16(1);
        Rect::default().write(&mut writer).unwrap();
        Matrix::IDENTITY.write(&mut writer).unwrap();
        writer.write_u8(1);
        writer.write_u8(8);
        writer.write_u8(STYLE_RECORD | HAS_COLOR | HAS_X_OFFSET);
        writer.write_bytes(&[1, 2, 3]);
        writer.write_i16(40);
        writer.write_u8(0);
        writer.write_u8(STYLE_RECORD | HAS_FONT);
        writer.write_u16(3);
        writer.write_u16(200);
        writer.write_u8(1);
        writer.write_ubits(1, 1);
        writer.write_sbits(90, 8);
        writer.write_u8(0);
        let data = writer.into_bytes();

        let tag = TagRef {
            kind: TagKind::DefineText,
            data: &data,
        };
        let text = DefineText::parse(tag).unwrap();
        let runs: Vec<TextRun> = text.runs(&data).collect::<Result<_>>().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].font_id, runs[0].font_size, runs[0].x), (3, 200, 40));
        assert_eq!(runs[0].color, Some(Rgba { r: 1, g: 2, b: 3, a: 255 }));
    }
}

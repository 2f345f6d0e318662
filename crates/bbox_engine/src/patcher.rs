//! In-place rewrites of the rectangle stored in shape and text records
//!
//! Shape payloads are regenerated from their parsed form. Text payloads
//! are spliced: the character id and new rectangle are written, then every
//! byte from the start of the matrix to the end of the record is copied
//! back verbatim.

use crate::font_metrics::FontRegistry;
use crate::geometry::BoundingBox;
use crate::shape_bounds::shape_bounds;
use crate::text_bounds::text_bounds;
use crate::Result;
use swf_model::{BitWriter, DefineShape, DefineText, Rect, Tag};

/// Recompute a shape record's bounds and regenerate its payload
///
/// Version 4 edge bounds receive the same rectangle. An outline with no
/// edges is written with the zero rectangle.
pub fn patch_shape(tag: &mut Tag) -> Result<BoundingBox> {
    let mut shape = DefineShape::parse(tag.as_tag_ref())?;
    let bounds = shape_bounds(&shape);
    let rect = bounds.rect_or_zero();
    tracing::debug!(
        "{} {}: {:?} -> {:?}",
        tag.kind.name(),
        shape.id,
        shape.bounds,
        rect
    );
    shape.bounds = rect;
    if shape.edge_bounds.is_some() {
        shape.edge_bounds = Some(rect);
    }
    tag.data = shape.to_bytes()?;
    Ok(bounds)
}

/// Replace the rectangle of a text payload, keeping everything from the
/// matrix onwards byte for byte
pub fn splice_text_rect(data: &[u8], text: &DefineText, rect: &Rect) -> Result<Vec<u8>> {
    let tail = data.get(text.matrix_offset..).unwrap_or_default();
    let mut writer = BitWriter::new();
    writer.write_u16(text.id);
    rect.write(&mut writer)?;
    let mut patched = writer.into_bytes();
    patched.extend_from_slice(tail);
    Ok(patched)
}

/// Recompute a text record's bounds from its glyphs and splice them in
pub fn patch_text(tag: &mut Tag, fonts: &FontRegistry) -> Result<BoundingBox> {
    let text = DefineText::parse(tag.as_tag_ref())?;
    let bounds = text_bounds(&text, &tag.data, fonts)?;
    let rect = bounds.rect_or_zero();
    tracing::debug!(
        "{} {}: old {:?} new {:?}",
        tag.kind.name(),
        text.id,
        text.bounds,
        rect
    );
    tag.data = splice_text_rect(&tag.data, &text, &rect)?;
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swf_model::{
        encode_define_text, GlyphEntry, Matrix, Outline, Point, ShapeRecord, ShapeStyles,
        StyleChange, TagKind, TextRun, FIXED_ONE,
    };

    fn line_shape(version: u8) -> DefineShape {
        DefineShape {
            id: 1,
            version,
            bounds: Rect::new(-5000, -5000, 5000, 5000),
            edge_bounds: (version >= 4).then(|| Rect::new(-1, -1, 1, 1)),
            flags: 0,
            outline: Outline {
                styles: ShapeStyles::default(),
                records: vec![
                    ShapeRecord::StyleChange(StyleChange {
                        move_to: Some(Point::new(0, 0)),
                        ..StyleChange::default()
                    }),
                    ShapeRecord::StraightEdge { dx: 100, dy: 0 },
                ],
            },
        }
    }

    #[test]
    fn test_patch_shape_rewrites_bounds() {
        let mut tag = line_shape(1).to_tag().unwrap();
        let bounds = patch_shape(&mut tag).unwrap();
        assert_eq!(bounds.rect(), Some(Rect::new(0, 0, 100, 0)));
        let patched = DefineShape::parse(tag.as_tag_ref()).unwrap();
        assert_eq!(patched.bounds, Rect::new(0, 0, 100, 0));
        assert_eq!(patched.outline, line_shape(1).outline);
    }

    #[test]
    fn test_patch_shape4_edge_bounds() {
        let mut tag = line_shape(4).to_tag().unwrap();
        assert_eq!(tag.kind, TagKind::DefineShape4);
        patch_shape(&mut tag).unwrap();
        let patched = DefineShape::parse(tag.as_tag_ref()).unwrap();
        assert_eq!(patched.edge_bounds, Some(Rect::new(0, 0, 100, 0)));
    }

    #[test]
    fn test_splice_preserves_matrix_and_tail() {
        let matrix = Matrix {
            scale_x: 3 * FIXED_ONE,
            scale_y: FIXED_ONE,
            rotate_skew0: 17,
            rotate_skew1: -3,
            translate_x: 4000,
            translate_y: -77,
        };
        let runs = [TextRun {
            font_id: 1,
            font_size: 240,
            x: 5,
            y: 300,
            color: None,
            glyphs: vec![GlyphEntry { index: 3, advance: 120 }],
        }];
        let tag = encode_define_text(9, 2, &Rect::new(0, 0, 1, 1), &matrix, &runs).unwrap();
        let text = DefineText::parse(tag.as_tag_ref()).unwrap();

        let new_rect = Rect::new(-100_000, -3, 250_000, 9_000);
        let patched = splice_text_rect(&tag.data, &text, &new_rect).unwrap();
        let reparsed = DefineText::parse(swf_model::TagRef {
            kind: tag.kind,
            data: &patched,
        })
        .unwrap();
        assert_eq!(reparsed.id, 9);
        assert_eq!(reparsed.bounds, new_rect);
        assert_eq!(&patched[reparsed.matrix_offset..], &tag.data[text.matrix_offset..]);
        assert_eq!(reparsed.matrix, matrix);
    }
}

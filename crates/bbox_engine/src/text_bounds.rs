//! Text extents rebuilt from glyph extents
//!
//! Each glyph's pen position is mapped through the text matrix to get an
//! anchor. The glyph extent (1024-unit em) is scaled by `height / 1024`,
//! passed through the linear part of the text matrix and moved to the
//! anchor.

use crate::font_metrics::FontRegistry;
use crate::geometry::{transform_point, BoundingBox};
use crate::Result;
use swf_model::{DefineText, Matrix, Point, EM_SQUARE};

/// Linear part of `matrix` scaled by `height / 1024`, translated to `anchor`
fn glyph_matrix(matrix: &Matrix, height: u16, anchor: Point) -> Matrix {
    let scale = |term: i32| -> i32 {
        let scaled = i64::from(term) * i64::from(height) / i64::from(EM_SQUARE);
        scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    };
    Matrix {
        scale_x: scale(matrix.scale_x),
        scale_y: scale(matrix.scale_y),
        rotate_skew0: scale(matrix.rotate_skew0),
        rotate_skew1: scale(matrix.rotate_skew1),
        translate_x: anchor.x,
        translate_y: anchor.y,
    }
}

/// Union of every glyph's transformed extent
///
/// `data` is the payload `text` was parsed from. Fails with
/// [`BboxError::UnknownFont`](crate::BboxError::UnknownFont) when a run
/// names a font the document does not define.
pub fn text_bounds(text: &DefineText, data: &[u8], fonts: &FontRegistry) -> Result<BoundingBox> {
    let mut bounds = BoundingBox::Empty;
    for run in text.runs(data) {
        let run = run?;
        let font = fonts.get(run.font_id)?;
        if run.glyphs.is_empty() {
            continue;
        }
        tracing::debug!(
            "{} chars, font {}, size {}, at ({},{})",
            run.glyphs.len(),
            run.font_id,
            run.font_size,
            run.x,
            run.y
        );

        for (index, offset) in run.glyph_offsets() {
            let Some(glyph) = font.glyph(index) else {
                tracing::warn!(
                    "glyph {} outside font {} ({} glyphs)",
                    index,
                    run.font_id,
                    font.glyph_count()
                );
                continue;
            };
            let pen = Point::new(run.x.saturating_add(offset), run.y);
            let anchor = transform_point(pen, &text.matrix);
            let placed = glyph.transform(&glyph_matrix(&text.matrix, run.font_size, anchor));
            bounds = bounds.union(placed);
            tracing::trace!(
                "{:5} glyph {}, {:?} -> {:?} total {:?}",
                offset,
                index,
                glyph,
                placed,
                bounds
            );
        }
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BboxError;
    use swf_model::{
        encode_define_text, FontDefinition, FontLayout, GlyphEntry, Outline, Rect, Tag, TextRun,
        FIXED_ONE,
    };

    /// Font 1: glyph 0 covers (0,-1024)..(512,0), glyph 1 has no ink
    fn font_tags() -> Vec<Tag> {
        let font = FontDefinition {
            id: 1,
            version: 2,
            name: Some("Test".to_string()),
            flags: 0,
            glyphs: vec![Outline::default(), Outline::default()],
            codes: vec![65, 32],
            layout: Some(FontLayout {
                advances: vec![512, 256],
                bounds: vec![Rect::new(0, -1024, 512, 0), Rect::default()],
                ..FontLayout::default()
            }),
        };
        vec![font.to_tag().unwrap()]
    }

    fn run(font_id: u16, font_size: u16, x: i32, y: i32, glyphs: &[(u32, i32)]) -> TextRun {
        TextRun {
            font_id,
            font_size,
            x,
            y,
            color: None,
            glyphs: glyphs
                .iter()
                .map(|&(index, advance)| GlyphEntry { index, advance })
                .collect(),
        }
    }

    fn bounds_of(matrix: Matrix, runs: &[TextRun]) -> Result<BoundingBox> {
        let tag = encode_define_text(2, 1, &Rect::default(), &matrix, runs).unwrap();
        let text = DefineText::parse(tag.as_tag_ref()).unwrap();
        let fonts = FontRegistry::build(&font_tags());
        text_bounds(&text, &tag.data, &fonts)
    }

    #[test]
    fn test_glyphs_advance_along_baseline() {
        // 20-twip em: glyph 0 is 10 wide and 20 tall
        let bounds = bounds_of(
            Matrix::IDENTITY,
            &[run(1, 20, 100, 200, &[(0, 10), (1, 5), (0, 10)])],
        )
        .unwrap();
        assert_eq!(bounds.rect(), Some(Rect::new(100, 180, 125, 200)));
    }

    #[test]
    fn test_text_matrix_translates_once() {
        let bounds = bounds_of(Matrix::translate(1000, 500), &[run(1, 1024, 0, 0, &[(0, 0)])])
            .unwrap();
        assert_eq!(bounds.rect(), Some(Rect::new(1000, -524, 1512, 500)));
    }

    #[test]
    fn test_text_matrix_scales_glyphs() {
        let bounds = bounds_of(
            Matrix::scale(2 * FIXED_ONE, 2 * FIXED_ONE),
            &[run(1, 1024, 10, 0, &[(0, 0)])],
        )
        .unwrap();
        // anchor at (20, 0), glyph scaled by 2
        assert_eq!(bounds.rect(), Some(Rect::new(20, -2048, 1044, 0)));
    }

    #[test]
    fn test_text_matrix_rotates_glyphs() {
        // quarter turn: x' = -y, y' = x
        let rotate = Matrix {
            scale_x: 0,
            scale_y: 0,
            rotate_skew0: FIXED_ONE,
            rotate_skew1: -FIXED_ONE,
            translate_x: 0,
            translate_y: 0,
        };
        let bounds = bounds_of(rotate, &[run(1, 1024, 10, 0, &[(0, 0)])]).unwrap();
        // anchor at (0, 10); glyph (0,-1024)..(512,0) turns into (0,0)..(1024,512)
        assert_eq!(bounds.rect(), Some(Rect::new(0, 10, 1024, 522)));
    }

    #[test]
    fn test_inkless_text_is_empty() {
        let bounds = bounds_of(Matrix::IDENTITY, &[run(1, 240, 0, 0, &[(1, 100)])]).unwrap();
        assert!(bounds.is_empty());
    }

    #[test]
    fn test_out_of_range_glyph_is_skipped() {
        let bounds = bounds_of(Matrix::IDENTITY, &[run(1, 1024, 0, 0, &[(7, 100), (0, 0)])])
            .unwrap();
        assert_eq!(bounds.rect(), Some(Rect::new(100, -1024, 612, 0)));
    }

    #[test]
    fn test_unknown_font_is_fatal() {
        let result = bounds_of(Matrix::IDENTITY, &[run(9, 240, 0, 0, &[(0, 100)])]);
        assert!(matches!(result, Err(BboxError::UnknownFont(9))));

        // a run without glyphs still names its font
        let result = bounds_of(
            Matrix::IDENTITY,
            &[run(1, 240, 0, 0, &[(0, 100)]), run(9, 240, 0, 0, &[])],
        );
        assert!(matches!(result, Err(BboxError::UnknownFont(9))));
    }
}

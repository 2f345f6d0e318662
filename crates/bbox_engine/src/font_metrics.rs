//! Glyph extents per font, keyed by font id
//!
//! Every extent is expressed on the 1024-unit em square regardless of the
//! font record's own resolution.

use crate::geometry::BoundingBox;
use crate::shape_bounds::outline_bounds;
use crate::{BboxError, Result};
use std::collections::HashMap;
use swf_model::{font_infos, fonts, FontDefinition, Rect, Tag, EM_SQUARE};

/// Glyph extents of one font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetrics {
    pub id: u16,
    pub name: Option<String>,
    glyphs: Vec<BoundingBox>,
}

impl FontMetrics {
    pub fn from_definition(font: &FontDefinition) -> Self {
        let divisor = font.units_per_em() / EM_SQUARE;
        let layout_bounds = font
            .layout
            .as_ref()
            .map(|layout| &layout.bounds)
            .filter(|bounds| bounds.len() == font.glyphs.len());

        let glyphs = match layout_bounds {
            // a zero rectangle in the layout table marks a glyph without ink
            Some(bounds) => bounds
                .iter()
                .map(|rect| match *rect {
                    Rect {
                        x_min: 0,
                        y_min: 0,
                        x_max: 0,
                        y_max: 0,
                    } => BoundingBox::Empty,
                    rect => BoundingBox::Rect(normalize(rect, divisor)),
                })
                .collect(),
            None => font
                .glyphs
                .iter()
                .map(|glyph| match outline_bounds(glyph) {
                    BoundingBox::Rect(rect) => BoundingBox::Rect(normalize(rect, divisor)),
                    BoundingBox::Empty => BoundingBox::Empty,
                })
                .collect(),
        };

        Self {
            id: font.id,
            name: font.name.clone(),
            glyphs,
        }
    }

    /// Extent of one glyph, `None` when the index is outside the font
    pub fn glyph(&self, index: u32) -> Option<BoundingBox> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.glyphs.get(index))
            .copied()
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

/// Scale down to the 1024 grid, rounding outward
fn normalize(rect: Rect, divisor: i32) -> Rect {
    if divisor <= 1 {
        return rect;
    }
    let floor = |v: i32| v.div_euclid(divisor);
    let ceil = |v: i32| -((-v).div_euclid(divisor));
    Rect::new(
        floor(rect.x_min),
        floor(rect.y_min),
        ceil(rect.x_max),
        ceil(rect.y_max),
    )
}

/// All fonts of one document
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: HashMap<u16, FontMetrics>,
}

impl FontRegistry {
    /// Scan the top-level records once for every font definition
    ///
    /// A font that fails to parse is skipped with a warning; text that
    /// references it later fails with [`BboxError::UnknownFont`].
    pub fn build(tags: &[Tag]) -> Self {
        let mut names: HashMap<u16, String> = HashMap::new();
        for info in font_infos(tags) {
            match info {
                Ok(info) => {
                    if let Some(name) = info.name {
                        names.entry(info.font_id).or_insert(name);
                    }
                }
                Err(e) => tracing::warn!("skipping font info record: {}", e),
            }
        }

        let mut registry = FontRegistry::default();
        for font in fonts(tags) {
            let font = match font {
                Ok(font) => font,
                Err(e) => {
                    tracing::warn!("extracting font failed: {}", e);
                    continue;
                }
            };
            let mut metrics = FontMetrics::from_definition(&font);
            if metrics.name.is_none() {
                metrics.name = names.get(&font.id).cloned();
            }
            tracing::debug!(
                "extracting font {} ({}), {} glyphs",
                metrics.id,
                metrics.name.as_deref().unwrap_or("unnamed"),
                metrics.glyph_count()
            );
            if registry.fonts.contains_key(&font.id) {
                tracing::warn!("font {} defined twice, keeping the first", font.id);
                continue;
            }
            registry.fonts.insert(font.id, metrics);
        }
        tracing::info!("extracted {} fonts", registry.fonts.len());
        registry
    }

    pub fn get(&self, font_id: u16) -> Result<&FontMetrics> {
        self.fonts
            .get(&font_id)
            .ok_or(BboxError::UnknownFont(font_id))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swf_model::{FontLayout, Outline, Point, ShapeRecord, ShapeStyles, StyleChange, TagKind};

    fn square_glyph(size: i32) -> Outline {
        Outline {
            styles: ShapeStyles {
                num_fill_bits: 1,
                ..ShapeStyles::default()
            },
            records: vec![
                ShapeRecord::StyleChange(StyleChange {
                    move_to: Some(Point::new(0, -size)),
                    fill_style1: Some(1),
                    ..StyleChange::default()
                }),
                ShapeRecord::StraightEdge { dx: size, dy: 0 },
                ShapeRecord::StraightEdge { dx: 0, dy: size },
                ShapeRecord::StraightEdge { dx: -size, dy: 0 },
                ShapeRecord::StraightEdge { dx: 0, dy: -size },
            ],
        }
    }

    fn font(id: u16, version: u8, glyph_size: i32) -> FontDefinition {
        FontDefinition {
            id,
            version,
            name: None,
            flags: 0,
            glyphs: vec![square_glyph(glyph_size), Outline::default()],
            codes: vec![65, 32],
            layout: None,
        }
    }

    #[test]
    fn test_glyph_bounds_from_outlines() {
        let metrics = FontMetrics::from_definition(&font(1, 2, 1024));
        assert_eq!(metrics.glyph(0), Some(BoundingBox::Rect(Rect::new(0, -1024, 1024, 0))));
        assert_eq!(metrics.glyph(1), Some(BoundingBox::Empty));
        assert_eq!(metrics.glyph(2), None);
    }

    #[test]
    fn test_font3_is_normalized() {
        let metrics = FontMetrics::from_definition(&font(1, 3, 20480));
        assert_eq!(metrics.glyph(0), Some(BoundingBox::Rect(Rect::new(0, -1024, 1024, 0))));

        // partial units round outward
        let metrics = FontMetrics::from_definition(&font(1, 3, 30));
        assert_eq!(metrics.glyph(0), Some(BoundingBox::Rect(Rect::new(0, -2, 2, 0))));
    }

    #[test]
    fn test_layout_table_preferred() {
        let mut definition = font(1, 2, 1024);
        definition.layout = Some(FontLayout {
            bounds: vec![Rect::new(10, -700, 600, 10), Rect::default()],
            ..FontLayout::default()
        });
        let metrics = FontMetrics::from_definition(&definition);
        assert_eq!(metrics.glyph(0), Some(BoundingBox::Rect(Rect::new(10, -700, 600, 10))));
        assert_eq!(metrics.glyph(1), Some(BoundingBox::Empty));
    }

    #[test]
    fn test_registry_names_and_unknown_font() {
        let tags = vec![
            font(4, 1, 512).to_tag().unwrap(),
            Tag::new(TagKind::DefineFontInfo, vec![4, 0, 4, b'M', b'o', b'n', b'o', 0]),
            // a truncated font is skipped
            Tag::new(TagKind::DefineFont2, vec![5, 0]),
        ];
        let registry = FontRegistry::build(&tags);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(4).unwrap().name.as_deref(), Some("Mono"));
        assert!(matches!(registry.get(5), Err(BboxError::UnknownFont(5))));
    }

    #[test]
    fn test_duplicate_font_keeps_first() {
        let tags = vec![
            font(4, 2, 512).to_tag().unwrap(),
            font(4, 2, 1024).to_tag().unwrap(),
        ];
        let registry = FontRegistry::build(&tags);
        assert_eq!(
            registry.get(4).unwrap().glyph(0),
            Some(BoundingBox::Rect(Rect::new(0, -512, 512, 0)))
        );
    }
}

//! Whole-document reconciliation
//!
//! A run optionally rewrites shape and text rectangles, resolves a
//! rectangle for every defined character, then walks the main timeline to
//! get the document's real extent.

use crate::config::BboxConfig;
use crate::font_metrics::FontRegistry;
use crate::geometry::BoundingBox;
use crate::patcher::{patch_shape, patch_text};
use crate::sprite_bounds::{BoundsResolver, PlacedInstance};
use crate::Result;
use std::path::Path;
use swf_model::{Movie, Rect};

/// Counts from the record-rewriting pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    pub shapes: usize,
    pub texts: usize,
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq)]
pub struct BboxReport {
    /// Frame size as read from the document header
    pub declared: Rect,
    /// Union of every placement on the main timeline
    pub computed: BoundingBox,
    pub optimized: OptimizeStats,
    /// Frame groups on the main timeline
    pub frames: u32,
    /// Main timeline placements; only filled when collection is enabled
    pub instances: Vec<PlacedInstance>,
}

impl BboxReport {
    /// Recomputed rectangle, the zero rectangle when nothing is placed
    pub fn computed_rect(&self) -> Rect {
        self.computed.rect_or_zero()
    }
}

/// Runs the reconciliation passes over a buffered document
#[derive(Debug, Clone, Default)]
pub struct BboxEngine {
    config: BboxConfig,
}

impl BboxEngine {
    pub fn new(config: BboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BboxConfig {
        &self.config
    }

    /// Rewrite the stored rectangle of every shape and text record
    ///
    /// Fonts are extracted on the first text record only.
    pub fn optimize(&self, movie: &mut Movie) -> Result<OptimizeStats> {
        let mut stats = OptimizeStats::default();
        let mut fonts: Option<FontRegistry> = None;

        for index in 0..movie.tags.len() {
            let kind = movie.tags[index].kind;
            if kind.is_shape() {
                patch_shape(&mut movie.tags[index])?;
                stats.shapes += 1;
            } else if kind.is_text() {
                if fonts.is_none() {
                    tracing::debug!("extracting fonts");
                    fonts = Some(FontRegistry::build(&movie.tags));
                }
                if let Some(fonts) = &fonts {
                    patch_text(&mut movie.tags[index], fonts)?;
                    stats.texts += 1;
                }
            }
        }
        tracing::info!(
            "optimized {} shapes and {} texts",
            stats.shapes,
            stats.texts
        );
        Ok(stats)
    }

    /// Run every configured pass, updating `movie` in place
    pub fn run(&self, movie: &mut Movie) -> Result<BboxReport> {
        let declared = movie.header.frame_size;
        let optimized = if self.config.optimize {
            self.optimize(movie)?
        } else {
            OptimizeStats::default()
        };

        let timeline = {
            let mut resolver = BoundsResolver::new(&movie.tags, self.config.max_sprite_depth)?;
            resolver.resolve_all()?;
            resolver.walk_timeline(
                movie.tags.iter().map(|tag| Ok(tag.as_tag_ref())),
                self.config.collect_placements,
            )?
        };

        if self.config.expand {
            movie.header.frame_size = timeline.bounds.rect_or_zero();
            tracing::info!("frame size set to {:?}", movie.header.frame_size);
        }

        Ok(BboxReport {
            declared,
            computed: timeline.bounds,
            optimized,
            frames: timeline.frames,
            instances: timeline.instances,
        })
    }

    /// Read `input`, run, and write `output` when the run changes the document
    pub fn run_file(&self, input: &Path, output: &Path) -> Result<BboxReport> {
        let mut movie = Movie::read_from_path(input)?;
        let report = self.run(&mut movie)?;
        if self.config.writes_output() {
            movie.write_to_path(output)?;
            tracing::info!("wrote {}", output.display());
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swf_model::{BitWriter, PlaceObject, Tag, TagKind};

    fn movie_with(tags: Vec<Tag>) -> Movie {
        let mut movie = Movie::new(6, Rect::new(0, 0, 11000, 8000));
        movie.tags = tags;
        movie
    }

    fn shape_with_declared(id: u16, rect: Rect) -> Tag {
        let mut writer = BitWriter::new();
        writer.write_u16(id);
        rect.write(&mut writer).unwrap();
        // no styles, end of shape
        writer.write_u8(0);
        writer.write_u8(0);
        writer.write_u8(0);
        writer.write_u8(0);
        Tag::new(TagKind::DefineShape, writer.into_bytes())
    }

    fn place(depth: u16, id: u16) -> Tag {
        PlaceObject {
            version: 2,
            depth,
            character_id: Some(id),
            ..PlaceObject::default()
        }
        .to_place_object2()
        .unwrap()
    }

    #[test]
    fn test_no_placements_is_empty() {
        let mut movie = movie_with(vec![shape_with_declared(1, Rect::new(0, 0, 20, 20))]);
        let report = BboxEngine::default().run(&mut movie).unwrap();
        assert!(report.computed.is_empty());
        assert_eq!(report.computed_rect(), Rect::default());
        assert_eq!(report.declared, Rect::new(0, 0, 11000, 8000));
    }

    #[test]
    fn test_declared_rect_is_used_without_optimize() {
        let mut movie = movie_with(vec![
            shape_with_declared(1, Rect::new(0, 0, 40, 60)),
            place(1, 1),
        ]);
        let report = BboxEngine::default().run(&mut movie).unwrap();
        assert_eq!(report.computed.rect(), Some(Rect::new(0, 0, 40, 60)));
        // header untouched without expand
        assert_eq!(movie.header.frame_size, Rect::new(0, 0, 11000, 8000));
    }

    #[test]
    fn test_optimize_replaces_declared_rect() {
        let mut movie = movie_with(vec![
            shape_with_declared(1, Rect::new(0, 0, 40, 60)),
            place(1, 1),
        ]);
        let engine = BboxEngine::new(BboxConfig {
            optimize: true,
            expand: true,
            ..BboxConfig::default()
        });
        let report = engine.run(&mut movie).unwrap();
        assert_eq!(report.optimized, OptimizeStats { shapes: 1, texts: 0 });
        // a shape with no edges has the zero rectangle after optimizing
        assert_eq!(report.computed.rect(), Some(Rect::default()));
        assert_eq!(movie.header.frame_size, Rect::default());
    }
}

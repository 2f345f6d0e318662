//! Character rectangles and timeline aggregation
//!
//! [`BoundsResolver`] owns the per-run character table. Rectangles are
//! resolved on demand: a sprite or button asks for the rectangles of the
//! characters it places, which may in turn be sprites. Each timeline walk
//! gets its own [`DepthTable`]; nested sprites are read in place from their
//! definition payload.

use crate::geometry::{rect_corners, transform_point, BoundingBox};
use crate::placement_tracker::DepthTable;
use crate::{BboxError, Result};
use std::collections::HashMap;
use swf_model::{
    button_records, clamp_coord, definition_id, pixel_size, stored_rects, PlaceObject, Point,
    Rect, RemoveObject, SpriteDefinition, Tag, TagKind, TagRef, TWIPS_PER_UNIT,
};

/// Rectangle per character id, written once
#[derive(Debug, Clone, Default)]
pub struct CharacterTable {
    rects: HashMap<u16, BoundingBox>,
}

impl CharacterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u16) -> Option<BoundingBox> {
        self.rects.get(&id).copied()
    }

    /// Store a rectangle; returns false if the id already had one
    pub fn insert(&mut self, id: u16, bounds: BoundingBox) -> bool {
        if self.rects.contains_key(&id) {
            return false;
        }
        self.rects.insert(id, bounds);
        true
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, BoundingBox)> + '_ {
        self.rects.iter().map(|(&id, &bounds)| (id, bounds))
    }
}

/// One placement on a timeline, in display units
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    /// Zero-based frame the placement belongs to
    pub frame: u32,
    pub depth: u16,
    pub character_id: u16,
    /// Instance name, or `ID<n>`
    pub label: String,
    /// Transformed (min,min), (max,min), (min,max), (max,max) corners
    pub corners: [(f64, f64); 4],
}

/// Result of walking one timeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineBounds {
    pub bounds: BoundingBox,
    /// Number of frame groups: one plus the ShowFrame records seen
    pub frames: u32,
    pub instances: Vec<PlacedInstance>,
}

/// Resolves character rectangles for one document
pub struct BoundsResolver<'a> {
    definitions: HashMap<u16, TagRef<'a>>,
    /// Defined ids in document order
    order: Vec<u16>,
    table: CharacterTable,
    /// Sprites and buttons currently being resolved, outermost first
    stack: Vec<u16>,
    max_depth: usize,
}

impl<'a> BoundsResolver<'a> {
    /// Index the defining records of `tags`; the first definition of an id wins
    pub fn new(tags: &'a [Tag], max_depth: usize) -> Result<Self> {
        let mut definitions = HashMap::new();
        let mut order = Vec::new();
        for tag in tags {
            let tag = tag.as_tag_ref();
            if let Some(id) = definition_id(tag)? {
                if definitions.contains_key(&id) {
                    tracing::warn!(
                        "character {} redefined by {}, keeping the first definition",
                        id,
                        tag.kind.name()
                    );
                    continue;
                }
                definitions.insert(id, tag);
                order.push(id);
            }
        }
        Ok(Self {
            definitions,
            order,
            table: CharacterTable::new(),
            stack: Vec::new(),
            max_depth,
        })
    }

    /// Fill the table for every defined character
    pub fn resolve_all(&mut self) -> Result<()> {
        for index in 0..self.order.len() {
            self.resolve(self.order[index])?;
        }
        tracing::info!("resolved {} character rectangles", self.table.len());
        Ok(())
    }

    /// Rectangle of a character, computing it on first use
    pub fn resolve(&mut self, id: u16) -> Result<BoundingBox> {
        if let Some(bounds) = self.table.get(id) {
            return Ok(bounds);
        }
        let Some(tag) = self.definitions.get(&id).copied() else {
            tracing::warn!("character {} has no recorded rectangle", id);
            return Ok(BoundingBox::Empty);
        };
        let bounds = self.definition_bounds(id, tag)?;
        self.table.insert(id, bounds);
        Ok(bounds)
    }

    pub fn table(&self) -> &CharacterTable {
        &self.table
    }

    pub fn into_table(self) -> CharacterTable {
        self.table
    }

    fn definition_bounds(&mut self, id: u16, tag: TagRef<'a>) -> Result<BoundingBox> {
        match tag.kind {
            TagKind::DefineSprite => {
                let sprite = SpriteDefinition::parse(tag)?;
                let bounds = self.nested(id, |resolver| {
                    resolver
                        .walk_timeline(sprite.tags(), false)
                        .map(|timeline| timeline.bounds)
                })?;
                if let BoundingBox::Rect(rect) = bounds {
                    tracing::debug!(
                        "sprite {} is {:.2}x{:.2}",
                        id,
                        f64::from(rect.width()) / TWIPS_PER_UNIT,
                        f64::from(rect.height()) / TWIPS_PER_UNIT
                    );
                }
                Ok(bounds)
            }
            TagKind::DefineButton | TagKind::DefineButton2 => {
                let records = button_records(tag)?;
                self.nested(id, |resolver| {
                    let mut bounds = BoundingBox::Empty;
                    for record in &records {
                        let character = resolver.resolve(record.character_id)?;
                        bounds = bounds.union(character.transform(&record.matrix));
                    }
                    Ok(bounds)
                })
            }
            _ => {
                if let Some((width, height)) = pixel_size(tag)? {
                    let twips = |pixels: u32| clamp_coord(i64::from(pixels) * 20);
                    return Ok(BoundingBox::Rect(Rect::new(0, 0, twips(width), twips(height))));
                }
                Ok(stored_rects(tag)?
                    .into_iter()
                    .fold(BoundingBox::Empty, |acc, rect| acc.union(rect.into())))
            }
        }
    }

    /// Run `f` with `id` pushed on the recursion stack
    fn nested<F>(&mut self, id: u16, f: F) -> Result<BoundingBox>
    where
        F: FnOnce(&mut Self) -> Result<BoundingBox>,
    {
        if self.stack.contains(&id) {
            return Err(BboxError::CyclicSprite(id));
        }
        if self.stack.len() >= self.max_depth {
            return Err(BboxError::SpriteNestingTooDeep {
                sprite: id,
                limit: self.max_depth,
            });
        }
        self.stack.push(id);
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Union of every placement on a timeline, through a fresh depth table
    pub fn walk_timeline<I>(&mut self, tags: I, collect_instances: bool) -> Result<TimelineBounds>
    where
        I: IntoIterator<Item = swf_model::Result<TagRef<'a>>>,
    {
        let mut depths = DepthTable::new();
        let mut timeline = TimelineBounds {
            frames: 1,
            ..TimelineBounds::default()
        };

        for tag in tags {
            let tag = tag?;
            match tag.kind {
                TagKind::ShowFrame => timeline.frames += 1,
                kind if kind.is_removal() => {
                    depths.observe_removal(&RemoveObject::parse(tag)?);
                }
                kind if kind.is_placement() => {
                    let place = PlaceObject::parse(tag)?;
                    depths.observe_placement(&place);
                    let Some(id) = depths.character_at(place.depth) else {
                        tracing::debug!("depth {} has no character, placement skipped", place.depth);
                        continue;
                    };
                    let matrix = place.matrix_or_identity();
                    let bounds = self.resolve(id)?;
                    timeline.bounds = timeline.bounds.union(bounds.transform(&matrix));

                    if collect_instances {
                        let corners = rect_corners(&bounds.rect_or_zero())
                            .map(|corner| display_units(transform_point(corner, &matrix)));
                        timeline.instances.push(PlacedInstance {
                            frame: timeline.frames - 1,
                            depth: place.depth,
                            character_id: id,
                            label: depths.label_at(place.depth).unwrap_or_else(|| format!("ID{}", id)),
                            corners,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(timeline)
    }
}

fn display_units(point: Point) -> (f64, f64) {
    (
        f64::from(point.x) / TWIPS_PER_UNIT,
        f64::from(point.y) / TWIPS_PER_UNIT,
    )
}

//! Shape extents from outline geometry
//!
//! The extent covers every edge endpoint and every curve control point.
//! Curves are not solved for their true extrema and stroke widths are not
//! added, so the result can be looser than the rendered ink for curves and
//! tighter for stroked outlines.

use crate::geometry::BoundingBox;
use swf_model::{DefineShape, Outline, Segment};

/// Extent of the edges drawn by an outline; pen moves alone add nothing
pub fn outline_bounds(outline: &Outline) -> BoundingBox {
    let mut bounds = BoundingBox::Empty;
    for segment in outline.segments() {
        match segment {
            Segment::MoveTo(_) => {}
            Segment::LineTo { from, to } => {
                bounds.include_point(from);
                bounds.include_point(to);
            }
            Segment::CurveTo { from, control, to } => {
                bounds.include_point(from);
                bounds.include_point(control);
                bounds.include_point(to);
            }
        }
    }
    bounds
}

pub fn shape_bounds(shape: &DefineShape) -> BoundingBox {
    let bounds = outline_bounds(&shape.outline);
    tracing::trace!("shape {} outline bounds {:?}", shape.id, bounds);
    bounds
}

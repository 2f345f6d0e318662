//! Affine transforms and rectangle unions in twips

use swf_model::{clamp_coord, Matrix, Point, Rect};

/// Fractional bits of the matrix scale and rotate/skew terms
const FIXED_SHIFT: u32 = 16;

/// Map a point through a placement matrix
///
/// Results are clamped to what a RECT field can encode.
pub fn transform_point(point: Point, matrix: &Matrix) -> Point {
    let x = i64::from(point.x);
    let y = i64::from(point.y);
    let tx = (i64::from(matrix.scale_x) * x + i64::from(matrix.rotate_skew1) * y) >> FIXED_SHIFT;
    let ty = (i64::from(matrix.rotate_skew0) * x + i64::from(matrix.scale_y) * y) >> FIXED_SHIFT;
    Point::new(
        clamp_coord(tx + i64::from(matrix.translate_x)),
        clamp_coord(ty + i64::from(matrix.translate_y)),
    )
}

/// Axis-aligned envelope of a rectangle's four transformed corners
pub fn transform_rect(rect: &Rect, matrix: &Matrix) -> Rect {
    let corners = rect_corners(rect).map(|corner| transform_point(corner, matrix));
    let mut envelope = Rect::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y);
    for corner in &corners[1..] {
        envelope.x_min = envelope.x_min.min(corner.x);
        envelope.y_min = envelope.y_min.min(corner.y);
        envelope.x_max = envelope.x_max.max(corner.x);
        envelope.y_max = envelope.y_max.max(corner.y);
    }
    envelope
}

/// Corners in (min,min), (max,min), (min,max), (max,max) order
pub fn rect_corners(rect: &Rect) -> [Point; 4] {
    [
        Point::new(rect.x_min, rect.y_min),
        Point::new(rect.x_max, rect.y_min),
        Point::new(rect.x_min, rect.y_max),
        Point::new(rect.x_max, rect.y_max),
    ]
}

/// A rectangle accumulator that distinguishes "nothing yet" from a
/// zero-extent rectangle at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum BoundingBox {
    #[default]
    Empty,
    Rect(Rect),
}

impl BoundingBox {
    pub fn is_empty(&self) -> bool {
        matches!(self, BoundingBox::Empty)
    }

    pub fn rect(&self) -> Option<Rect> {
        match self {
            BoundingBox::Empty => None,
            BoundingBox::Rect(rect) => Some(*rect),
        }
    }

    /// The rectangle, or the zero rectangle when empty
    pub fn rect_or_zero(&self) -> Rect {
        self.rect().unwrap_or_default()
    }

    pub fn union(self, other: BoundingBox) -> BoundingBox {
        match (self, other) {
            (BoundingBox::Empty, other) => other,
            (this, BoundingBox::Empty) => this,
            (BoundingBox::Rect(a), BoundingBox::Rect(b)) => BoundingBox::Rect(Rect::new(
                a.x_min.min(b.x_min),
                a.y_min.min(b.y_min),
                a.x_max.max(b.x_max),
                a.y_max.max(b.y_max),
            )),
        }
    }

    pub fn include_rect(&mut self, rect: Rect) {
        *self = self.union(BoundingBox::Rect(rect));
    }

    pub fn include_point(&mut self, point: Point) {
        self.include_rect(Rect::new(point.x, point.y, point.x, point.y));
    }

    /// Envelope after a placement transform; empty stays empty
    pub fn transform(&self, matrix: &Matrix) -> BoundingBox {
        match self {
            BoundingBox::Empty => BoundingBox::Empty,
            BoundingBox::Rect(rect) => BoundingBox::Rect(transform_rect(rect, matrix)),
        }
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        BoundingBox::Rect(rect)
    }
}

impl FromIterator<Point> for BoundingBox {
    fn from_iter<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut bounds = BoundingBox::Empty;
        for point in points {
            bounds.include_point(point);
        }
        bounds
    }
}

/// Union of two accumulators
pub fn union_rect(a: BoundingBox, b: BoundingBox) -> BoundingBox {
    a.union(b)
}

//! Vector shape definitions
//!
//! A shape definition carries its id, a stored bounding rectangle, style
//! tables and a bit-packed stream of shape records. Edges are stored as
//! deltas from the current pen position; [`Outline::segments`] resolves
//! them into absolute move/line/curve segments.

use crate::bits::{signed_bits, BitReader, BitWriter};
use crate::tag::{Tag, TagKind, TagRef};
use crate::types::{Matrix, Point, Rect, Rgba};
use crate::{Result, SwfError};

/// Edge deltas are stored with at most 15 + 2 bits
const MAX_EDGE_BITS: u32 = 17;

/// Move-to deltas carry a 5-bit width prefix
const MAX_MOVE_BITS: u32 = 31;

/// Shape record version for a record kind (1 to 4)
pub fn shape_version(kind: TagKind) -> Option<u8> {
    match kind {
        TagKind::DefineShape => Some(1),
        TagKind::DefineShape2 => Some(2),
        TagKind::DefineShape3 => Some(3),
        TagKind::DefineShape4 => Some(4),
        _ => None,
    }
}

fn read_color(reader: &mut BitReader<'_>, version: u8) -> Result<Rgba> {
    if version >= 3 {
        Rgba::read_rgba(reader)
    } else {
        Rgba::read_rgb(reader)
    }
}

fn write_color(writer: &mut BitWriter, color: &Rgba, version: u8) {
    if version >= 3 {
        color.write_rgba(writer);
    } else {
        color.write_rgb(writer);
    }
}

fn read_style_count(reader: &mut BitReader<'_>, version: u8) -> Result<usize> {
    let count = reader.read_u8()?;
    if count == 0xff && version >= 2 {
        Ok(usize::from(reader.read_u16()?))
    } else {
        Ok(usize::from(count))
    }
}

fn write_style_count(writer: &mut BitWriter, count: usize, version: u8) -> Result<()> {
    if count < 0xff {
        writer.write_u8(count as u8);
        return Ok(());
    }
    if version < 2 || count > usize::from(u16::MAX) {
        return Err(SwfError::ValueOutOfRange(format!(
            "{} styles in a version {} shape",
            count, version
        )));
    }
    writer.write_u8(0xff);
    writer.write_u16(count as u16);
    Ok(())
}

// =============================================================================
// Styles
// =============================================================================

/// One gradient control point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientStop {
    pub ratio: u8,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gradient {
    /// Spread and interpolation modes (upper nibble of the count byte)
    pub modes: u8,
    pub stops: Vec<GradientStop>,
    /// Present for focal gradients only (8.8 fixed point)
    pub focal_point: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillStyle {
    Solid(Rgba),
    /// Linear (0x10), radial (0x12) or focal radial (0x13)
    Gradient {
        kind: u8,
        matrix: Matrix,
        gradient: Gradient,
    },
    /// Repeating/clipped, smoothed or not (0x40 to 0x43)
    Bitmap {
        kind: u8,
        bitmap_id: u16,
        matrix: Matrix,
    },
}

impl FillStyle {
    pub fn read(reader: &mut BitReader<'_>, version: u8) -> Result<FillStyle> {
        let kind = reader.read_u8()?;
        match kind {
            0x00 => Ok(FillStyle::Solid(read_color(reader, version)?)),
            0x10 | 0x12 | 0x13 => {
                let matrix = Matrix::read(reader)?;
                let header = reader.read_u8()?;
                let mut stops = Vec::with_capacity(usize::from(header & 0x0f));
                for _ in 0..(header & 0x0f) {
                    let ratio = reader.read_u8()?;
                    let color = read_color(reader, version)?;
                    stops.push(GradientStop { ratio, color });
                }
                let focal_point = if kind == 0x13 {
                    Some(reader.read_i16()?)
                } else {
                    None
                };
                Ok(FillStyle::Gradient {
                    kind,
                    matrix,
                    gradient: Gradient {
                        modes: header & 0xf0,
                        stops,
                        focal_point,
                    },
                })
            }
            0x40..=0x43 => {
                let bitmap_id = reader.read_u16()?;
                let matrix = Matrix::read(reader)?;
                Ok(FillStyle::Bitmap {
                    kind,
                    bitmap_id,
                    matrix,
                })
            }
            other => Err(SwfError::invalid(
                "fill style",
                format!("unknown fill type 0x{:02x}", other),
            )),
        }
    }

    pub fn write(&self, writer: &mut BitWriter, version: u8) -> Result<()> {
        match self {
            FillStyle::Solid(color) => {
                writer.write_u8(0x00);
                write_color(writer, color, version);
            }
            FillStyle::Gradient {
                kind,
                matrix,
                gradient,
            } => {
                if gradient.stops.len() > 15 {
                    return Err(SwfError::ValueOutOfRange(format!(
                        "{} gradient stops",
                        gradient.stops.len()
                    )));
                }
                writer.write_u8(*kind);
                matrix.write(writer)?;
                writer.write_u8((gradient.modes & 0xf0) | gradient.stops.len() as u8);
                for stop in &gradient.stops {
                    writer.write_u8(stop.ratio);
                    write_color(writer, &stop.color, version);
                }
                if let Some(focal) = gradient.focal_point {
                    writer.write_i16(focal);
                }
            }
            FillStyle::Bitmap {
                kind,
                bitmap_id,
                matrix,
            } => {
                writer.write_u8(*kind);
                writer.write_u16(*bitmap_id);
                matrix.write(writer)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStyle {
    /// Stroke width in twips
    pub width: u16,
    pub color: Rgba,
    /// Cap/join/scaling flags of version 4 line styles
    pub flags: Option<[u8; 2]>,
    pub miter_limit: Option<u16>,
    /// Version 4 strokes may be filled instead of colored
    pub fill: Option<FillStyle>,
}

impl LineStyle {
    pub fn read(reader: &mut BitReader<'_>, version: u8) -> Result<LineStyle> {
        let width = reader.read_u16()?;
        if version < 4 {
            return Ok(LineStyle {
                width,
                color: read_color(reader, version)?,
                flags: None,
                miter_limit: None,
                fill: None,
            });
        }
        let flags = [reader.read_u8()?, reader.read_u8()?];
        let join = (flags[0] >> 4) & 0x03;
        let has_fill = flags[0] & 0x08 != 0;
        let miter_limit = if join == 2 {
            Some(reader.read_u16()?)
        } else {
            None
        };
        let (color, fill) = if has_fill {
            (
                Rgba {
                    r: 0,
                    g: 0,
                    b: 0,
                    a: 255,
                },
                Some(FillStyle::read(reader, version)?),
            )
        } else {
            (Rgba::read_rgba(reader)?, None)
        };
        Ok(LineStyle {
            width,
            color,
            flags: Some(flags),
            miter_limit,
            fill,
        })
    }

    pub fn write(&self, writer: &mut BitWriter, version: u8) -> Result<()> {
        writer.write_u16(self.width);
        if version < 4 {
            write_color(writer, &self.color, version);
            return Ok(());
        }
        let mut flags = self.flags.unwrap_or([0, 0]);
        if self.fill.is_some() {
            flags[0] |= 0x08;
        } else {
            flags[0] &= !0x08;
        }
        writer.write_bytes(&flags);
        if (flags[0] >> 4) & 0x03 == 2 {
            writer.write_u16(self.miter_limit.unwrap_or(0));
        }
        match &self.fill {
            Some(fill) => fill.write(writer, version)?,
            None => self.color.write_rgba(writer),
        }
        Ok(())
    }
}

/// Fill and line style tables with the index widths used after them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShapeStyles {
    pub fill_styles: Vec<FillStyle>,
    pub line_styles: Vec<LineStyle>,
    pub num_fill_bits: u8,
    pub num_line_bits: u8,
}

impl ShapeStyles {
    pub fn read(reader: &mut BitReader<'_>, version: u8) -> Result<ShapeStyles> {
        let fill_count = read_style_count(reader, version)?;
        let mut fill_styles = Vec::with_capacity(fill_count.min(1024));
        for _ in 0..fill_count {
            fill_styles.push(FillStyle::read(reader, version)?);
        }
        let line_count = read_style_count(reader, version)?;
        let mut line_styles = Vec::with_capacity(line_count.min(1024));
        for _ in 0..line_count {
            line_styles.push(LineStyle::read(reader, version)?);
        }
        let num_fill_bits = reader.read_ubits(4)? as u8;
        let num_line_bits = reader.read_ubits(4)? as u8;
        Ok(ShapeStyles {
            fill_styles,
            line_styles,
            num_fill_bits,
            num_line_bits,
        })
    }

    pub fn write(&self, writer: &mut BitWriter, version: u8) -> Result<()> {
        write_style_count(writer, self.fill_styles.len(), version)?;
        for fill in &self.fill_styles {
            fill.write(writer, version)?;
        }
        write_style_count(writer, self.line_styles.len(), version)?;
        for line in &self.line_styles {
            line.write(writer, version)?;
        }
        writer.align();
        writer.write_ubits(u32::from(self.num_fill_bits), 4);
        writer.write_ubits(u32::from(self.num_line_bits), 4);
        Ok(())
    }
}

// =============================================================================
// Shape records
// =============================================================================

/// Pen move and/or style selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleChange {
    /// Absolute pen position
    pub move_to: Option<Point>,
    pub fill_style0: Option<u32>,
    pub fill_style1: Option<u32>,
    pub line_style: Option<u32>,
    pub new_styles: Option<ShapeStyles>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeRecord {
    StyleChange(StyleChange),
    StraightEdge {
        dx: i32,
        dy: i32,
    },
    /// Quadratic curve: control point relative to the pen, anchor relative
    /// to the control point
    CurvedEdge {
        control_dx: i32,
        control_dy: i32,
        anchor_dx: i32,
        anchor_dy: i32,
    },
}

/// Absolute-coordinate view of one shape record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    MoveTo(Point),
    LineTo { from: Point, to: Point },
    CurveTo { from: Point, control: Point, to: Point },
}

/// Style tables plus the record stream drawn with them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outline {
    pub styles: ShapeStyles,
    pub records: Vec<ShapeRecord>,
}

impl Outline {
    /// Read the styled form used by shape definitions
    pub fn read(reader: &mut BitReader<'_>, version: u8) -> Result<Outline> {
        let styles = ShapeStyles::read(reader, version)?;
        let records = read_records(reader, version, &styles)?;
        Ok(Outline { styles, records })
    }

    /// Read the unstyled form used by font glyphs
    pub fn read_glyph(reader: &mut BitReader<'_>) -> Result<Outline> {
        reader.align();
        let styles = ShapeStyles {
            num_fill_bits: reader.read_ubits(4)? as u8,
            num_line_bits: reader.read_ubits(4)? as u8,
            ..ShapeStyles::default()
        };
        let records = read_records(reader, 1, &styles)?;
        Ok(Outline { styles, records })
    }

    pub fn write(&self, writer: &mut BitWriter, version: u8) -> Result<()> {
        self.styles.write(writer, version)?;
        write_records(writer, version, &self.styles, &self.records)
    }

    pub fn write_glyph(&self, writer: &mut BitWriter) -> Result<()> {
        writer.align();
        writer.write_ubits(u32::from(self.styles.num_fill_bits), 4);
        writer.write_ubits(u32::from(self.styles.num_line_bits), 4);
        write_records(writer, 1, &self.styles, &self.records)
    }

    /// Resolve the record stream into absolute segments
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let mut pen = Point::default();
        self.records.iter().filter_map(move |record| match record {
            ShapeRecord::StyleChange(change) => change.move_to.map(|to| {
                pen = to;
                Segment::MoveTo(to)
            }),
            ShapeRecord::StraightEdge { dx, dy } => {
                let from = pen;
                pen = from.offset(*dx, *dy);
                Some(Segment::LineTo { from, to: pen })
            }
            ShapeRecord::CurvedEdge {
                control_dx,
                control_dy,
                anchor_dx,
                anchor_dy,
            } => {
                let from = pen;
                let control = from.offset(*control_dx, *control_dy);
                pen = control.offset(*anchor_dx, *anchor_dy);
                Some(Segment::CurveTo {
                    from,
                    control,
                    to: pen,
                })
            }
        })
    }
}

fn read_records(
    reader: &mut BitReader<'_>,
    version: u8,
    styles: &ShapeStyles,
) -> Result<Vec<ShapeRecord>> {
    let mut fill_bits = u32::from(styles.num_fill_bits);
    let mut line_bits = u32::from(styles.num_line_bits);
    let mut records = Vec::new();

    loop {
        let is_edge = reader.read_bit()?;
        if !is_edge {
            let flags = reader.read_ubits(5)?;
            if flags == 0 {
                break;
            }
            let mut change = StyleChange::default();
            if flags & 0x01 != 0 {
                let bits = reader.read_ubits(5)?;
                let x = reader.read_sbits(bits)?;
                let y = reader.read_sbits(bits)?;
                change.move_to = Some(Point::new(x, y));
            }
            if flags & 0x02 != 0 {
                change.fill_style0 = Some(reader.read_ubits(fill_bits)?);
            }
            if flags & 0x04 != 0 {
                change.fill_style1 = Some(reader.read_ubits(fill_bits)?);
            }
            if flags & 0x08 != 0 {
                change.line_style = Some(reader.read_ubits(line_bits)?);
            }
            if flags & 0x10 != 0 {
                reader.align();
                let new_styles = ShapeStyles::read(reader, version)?;
                fill_bits = u32::from(new_styles.num_fill_bits);
                line_bits = u32::from(new_styles.num_line_bits);
                change.new_styles = Some(new_styles);
            }
            records.push(ShapeRecord::StyleChange(change));
            continue;
        }

        let is_straight = reader.read_bit()?;
        let bits = reader.read_ubits(4)? + 2;
        if is_straight {
            let (dx, dy) = if reader.read_bit()? {
                (reader.read_sbits(bits)?, reader.read_sbits(bits)?)
            } else if reader.read_bit()? {
                (0, reader.read_sbits(bits)?)
            } else {
                (reader.read_sbits(bits)?, 0)
            };
            records.push(ShapeRecord::StraightEdge { dx, dy });
        } else {
            records.push(ShapeRecord::CurvedEdge {
                control_dx: reader.read_sbits(bits)?,
                control_dy: reader.read_sbits(bits)?,
                anchor_dx: reader.read_sbits(bits)?,
                anchor_dy: reader.read_sbits(bits)?,
            });
        }
    }
    reader.align();
    Ok(records)
}

fn edge_bits(values: &[i32]) -> Result<u32> {
    let bits = values
        .iter()
        .map(|&v| signed_bits(v))
        .max()
        .unwrap_or(2)
        .max(2);
    if bits > MAX_EDGE_BITS {
        return Err(SwfError::ValueOutOfRange(format!(
            "edge delta needs {} bits",
            bits
        )));
    }
    Ok(bits)
}

fn write_records(
    writer: &mut BitWriter,
    version: u8,
    styles: &ShapeStyles,
    records: &[ShapeRecord],
) -> Result<()> {
    let mut fill_bits = u32::from(styles.num_fill_bits);
    let mut line_bits = u32::from(styles.num_line_bits);

    for record in records {
        match record {
            ShapeRecord::StyleChange(change) => {
                writer.write_bit(false);
                let flags = u32::from(change.new_styles.is_some()) << 4
                    | u32::from(change.line_style.is_some()) << 3
                    | u32::from(change.fill_style1.is_some()) << 2
                    | u32::from(change.fill_style0.is_some()) << 1
                    | u32::from(change.move_to.is_some());
                if flags == 0 {
                    // an empty style change would read back as the end record
                    return Err(SwfError::invalid("shape", "empty style change record"));
                }
                writer.write_ubits(flags, 5);
                if let Some(to) = change.move_to {
                    let bits = signed_bits(to.x).max(signed_bits(to.y));
                    if bits > MAX_MOVE_BITS {
                        return Err(SwfError::ValueOutOfRange(format!(
                            "move-to needs {} bits",
                            bits
                        )));
                    }
                    writer.write_ubits(bits, 5);
                    writer.write_sbits(to.x, bits);
                    writer.write_sbits(to.y, bits);
                }
                if let Some(index) = change.fill_style0 {
                    writer.write_ubits(index, fill_bits);
                }
                if let Some(index) = change.fill_style1 {
                    writer.write_ubits(index, fill_bits);
                }
                if let Some(index) = change.line_style {
                    writer.write_ubits(index, line_bits);
                }
                if let Some(new_styles) = &change.new_styles {
                    writer.align();
                    new_styles.write(writer, version)?;
                    fill_bits = u32::from(new_styles.num_fill_bits);
                    line_bits = u32::from(new_styles.num_line_bits);
                }
            }
            ShapeRecord::StraightEdge { dx, dy } => {
                let bits = edge_bits(&[*dx, *dy])?;
                writer.write_bit(true);
                writer.write_bit(true);
                writer.write_ubits(bits - 2, 4);
                if *dx != 0 && *dy != 0 {
                    writer.write_bit(true);
                    writer.write_sbits(*dx, bits);
                    writer.write_sbits(*dy, bits);
                } else if *dx == 0 {
                    writer.write_bit(false);
                    writer.write_bit(true);
                    writer.write_sbits(*dy, bits);
                } else {
                    writer.write_bit(false);
                    writer.write_bit(false);
                    writer.write_sbits(*dx, bits);
                }
            }
            ShapeRecord::CurvedEdge {
                control_dx,
                control_dy,
                anchor_dx,
                anchor_dy,
            } => {
                let bits = edge_bits(&[*control_dx, *control_dy, *anchor_dx, *anchor_dy])?;
                writer.write_bit(true);
                writer.write_bit(false);
                writer.write_ubits(bits - 2, 4);
                writer.write_sbits(*control_dx, bits);
                writer.write_sbits(*control_dy, bits);
                writer.write_sbits(*anchor_dx, bits);
                writer.write_sbits(*anchor_dy, bits);
            }
        }
    }
    // end of shape
    writer.write_bit(false);
    writer.write_ubits(0, 5);
    writer.align();
    Ok(())
}

// =============================================================================
// Shape definitions
// =============================================================================

/// A parsed DefineShape record (versions 1 to 4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineShape {
    pub id: u16,
    pub version: u8,
    pub bounds: Rect,
    /// Version 4: bounds without stroke widths
    pub edge_bounds: Option<Rect>,
    /// Version 4: scaling-stroke and winding flags
    pub flags: u8,
    pub outline: Outline,
}

impl DefineShape {
    pub fn parse(tag: TagRef<'_>) -> Result<DefineShape> {
        let version = shape_version(tag.kind)
            .ok_or_else(|| SwfError::invalid("shape", format!("{} is not a shape", tag.kind.name())))?;
        let mut reader = tag.reader();
        let id = reader.read_u16()?;
        let bounds = Rect::read(&mut reader)?;
        let (edge_bounds, flags) = if version >= 4 {
            let edge_bounds = Rect::read(&mut reader)?;
            (Some(edge_bounds), reader.read_u8()?)
        } else {
            (None, 0)
        };
        let outline = Outline::read(&mut reader, version)?;
        Ok(DefineShape {
            id,
            version,
            bounds,
            edge_bounds,
            flags,
            outline,
        })
    }

    /// Regenerate the whole payload
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();
        writer.write_u16(self.id);
        self.bounds.write(&mut writer)?;
        if self.version >= 4 {
            self.edge_bounds.unwrap_or(self.bounds).write(&mut writer)?;
            writer.write_u8(self.flags);
        }
        self.outline.write(&mut writer, self.version)?;
        Ok(writer.into_bytes())
    }

    pub fn kind(&self) -> TagKind {
        match self.version {
            1 => TagKind::DefineShape,
            2 => TagKind::DefineShape2,
            3 => TagKind::DefineShape3,
            _ => TagKind::DefineShape4,
        }
    }

    pub fn to_tag(&self) -> Result<Tag> {
        Ok(Tag::new(self.kind(), self.to_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black() -> Rgba {
        Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 255,
        }
    }

    fn triangle_outline() -> Outline {
        Outline {
            styles: ShapeStyles {
                fill_styles: vec![FillStyle::Solid(black())],
                line_styles: vec![LineStyle {
                    width: 20,
                    color: black(),
                    flags: None,
                    miter_limit: None,
                    fill: None,
                }],
                num_fill_bits: 1,
                num_line_bits: 1,
            },
            records: vec![
                ShapeRecord::StyleChange(StyleChange {
                    move_to: Some(Point::new(10, 10)),
                    fill_style1: Some(1),
                    line_style: Some(1),
                    ..StyleChange::default()
                }),
                ShapeRecord::StraightEdge { dx: 100, dy: 0 },
                ShapeRecord::StraightEdge { dx: 0, dy: 50 },
                ShapeRecord::CurvedEdge {
                    control_dx: -50,
                    control_dy: 20,
                    anchor_dx: -50,
                    anchor_dy: -70,
                },
            ],
        }
    }

    #[test]
    fn test_segments_are_absolute() {
        let segments: Vec<Segment> = triangle_outline().segments().collect();
        assert_eq!(
            segments,
            vec![
                Segment::MoveTo(Point::new(10, 10)),
                Segment::LineTo {
                    from: Point::new(10, 10),
                    to: Point::new(110, 10)
                },
                Segment::LineTo {
                    from: Point::new(110, 10),
                    to: Point::new(110, 60)
                },
                Segment::CurveTo {
                    from: Point::new(110, 60),
                    control: Point::new(60, 80),
                    to: Point::new(10, 10)
                },
            ]
        );
    }

    #[test]
    fn test_define_shape_regenerates_payload() {
        let shape = DefineShape {
            id: 7,
            version: 1,
            bounds: Rect::new(0, 0, 120, 80),
            edge_bounds: None,
            flags: 0,
            outline: triangle_outline(),
        };
        let tag = shape.to_tag().unwrap();
        assert_eq!(tag.kind, TagKind::DefineShape);
        assert_eq!(&tag.data[..2], &[7, 0]);

        let parsed = DefineShape::parse(tag.as_tag_ref()).unwrap();
        assert_eq!(parsed, shape);
        assert_eq!(parsed.to_bytes().unwrap(), tag.data);
    }

    #[test]
    fn test_version4_styles_and_new_styles() {
        let gradient_fill = FillStyle::Gradient {
            kind: 0x13,
            matrix: Matrix::scale(3 << 16, 3 << 16),
            gradient: Gradient {
                modes: 0x10,
                stops: vec![
                    GradientStop {
                        ratio: 0,
                        color: black(),
                    },
                    GradientStop {
                        ratio: 255,
                        color: Rgba {
                            r: 255,
                            g: 0,
                            b: 0,
                            a: 128,
                        },
                    },
                ],
                focal_point: Some(-64),
            },
        };
        let mut outline = triangle_outline();
        outline.styles.line_styles[0].flags = Some([0x20, 0x01]);
        outline.styles.line_styles[0].miter_limit = Some(3 << 8);
        outline.records.push(ShapeRecord::StyleChange(StyleChange {
            new_styles: Some(ShapeStyles {
                fill_styles: vec![
                    gradient_fill,
                    FillStyle::Bitmap {
                        kind: 0x41,
                        bitmap_id: 3,
                        matrix: Matrix::translate(5, 5),
                    },
                ],
                line_styles: vec![LineStyle {
                    width: 40,
                    color: Rgba {
                        r: 0,
                        g: 0,
                        b: 0,
                        a: 255,
                    },
                    flags: Some([0x08, 0x00]),
                    miter_limit: None,
                    fill: Some(FillStyle::Solid(black())),
                }],
                num_fill_bits: 2,
                num_line_bits: 1,
            }),
            // indices before the new tables still use the old widths
            fill_style0: Some(1),
            ..StyleChange::default()
        }));
        outline.records.push(ShapeRecord::StraightEdge { dx: -3, dy: 0 });

        let shape = DefineShape {
            id: 300,
            version: 4,
            bounds: Rect::new(-10, -10, 130, 90),
            edge_bounds: Some(Rect::new(0, 0, 120, 80)),
            flags: 0x01,
            outline,
        };
        let bytes = shape.to_bytes().unwrap();
        let parsed = DefineShape::parse(TagRef {
            kind: TagKind::DefineShape4,
            data: &bytes,
        })
        .unwrap();
        assert_eq!(parsed, shape);
    }

    #[test]
    fn test_glyph_outline() {
        let glyph = Outline {
            styles: ShapeStyles {
                num_fill_bits: 1,
                num_line_bits: 0,
                ..ShapeStyles::default()
            },
            records: vec![
                ShapeRecord::StyleChange(StyleChange {
                    move_to: Some(Point::new(0, -700)),
                    fill_style0: Some(1),
                    ..StyleChange::default()
                }),
                ShapeRecord::StraightEdge { dx: 500, dy: 700 },
            ],
        };
        let mut writer = BitWriter::new();
        glyph.write_glyph(&mut writer).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes[0], 0x10);
        let parsed = Outline::read_glyph(&mut BitReader::new(&bytes)).unwrap();
        assert_eq!(parsed, glyph);
    }

    #[test]
    fn test_oversized_edge_is_rejected() {
        let mut outline = triangle_outline();
        outline.records.push(ShapeRecord::StraightEdge {
            dx: 70_000,
            dy: 1,
        });
        let mut writer = BitWriter::new();
        assert!(matches!(
            outline.write(&mut writer, 1),
            Err(SwfError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn test_unknown_fill_type() {
        let data = [0x01, 0x50];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert!(FillStyle::read(&mut reader, 1).is_err());
    }
}

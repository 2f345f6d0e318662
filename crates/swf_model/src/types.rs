//! Variable-width geometry codecs shared by every record kind
//!
//! Coordinates are twips (1/20 of a display unit). Scale and rotate/skew
//! terms of a [`Matrix`] are 16.16 fixed point.

use crate::bits::{signed_bits, BitReader, BitWriter};
use crate::{Result, SwfError};

/// One in 16.16 fixed point
pub const FIXED_ONE: i32 = 1 << 16;

/// Twips per display unit
pub const TWIPS_PER_UNIT: f64 = 20.0;

/// Largest field width expressible in a 5-bit width prefix
const MAX_FIELD_BITS: u32 = 31;

/// Largest coordinate magnitude a 31-bit signed RECT field can hold
pub const COORD_LIMIT: i32 = (1 << 30) - 1;

/// Clamp a widened coordinate into the encodable range
pub fn clamp_coord(value: i64) -> i32 {
    value.clamp(-i64::from(COORD_LIMIT), i64::from(COORD_LIMIT)) as i32
}

fn field_bits(values: &[i32], context: &str) -> Result<u32> {
    let bits = values.iter().map(|&v| signed_bits(v)).max().unwrap_or(1);
    if bits > MAX_FIELD_BITS {
        return Err(SwfError::ValueOutOfRange(format!(
            "{} needs {} bits per field",
            context, bits
        )));
    }
    Ok(bits)
}

/// A position in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move by a delta, clamped to the encodable range
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(
            clamp_coord(i64::from(self.x) + i64::from(dx)),
            clamp_coord(i64::from(self.y) + i64::from(dy)),
        )
    }
}

// =============================================================================
// Rect
// =============================================================================

/// Axis-aligned rectangle in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Rect {
    pub const fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> i32 {
        self.x_max.saturating_sub(self.x_min)
    }

    pub fn height(&self) -> i32 {
        self.y_max.saturating_sub(self.y_min)
    }

    /// Decode a rectangle and skip the padding up to the next byte
    pub fn read(reader: &mut BitReader<'_>) -> Result<Rect> {
        reader.align();
        let bits = reader.read_ubits(5)?;
        let x_min = reader.read_sbits(bits)?;
        let x_max = reader.read_sbits(bits)?;
        let y_min = reader.read_sbits(bits)?;
        let y_max = reader.read_sbits(bits)?;
        reader.align();
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Encode with the narrowest field width, padded to a byte boundary
    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        let bits = field_bits(&[self.x_min, self.x_max, self.y_min, self.y_max], "rect")?;
        writer.align();
        writer.write_ubits(bits, 5);
        writer.write_sbits(self.x_min, bits);
        writer.write_sbits(self.x_max, bits);
        writer.write_sbits(self.y_min, bits);
        writer.write_sbits(self.y_max, bits);
        writer.align();
        Ok(())
    }
}

// =============================================================================
// Matrix
// =============================================================================

/// 2x3 affine placement matrix
///
/// Maps `(x, y)` to
/// `(scale_x*x + rotate_skew1*y + translate_x, rotate_skew0*x + scale_y*y + translate_y)`
/// with the four linear terms in 16.16 fixed point. Field names follow
/// the serialized order: the rotate/skew pair is stored as `rotate_skew0`
/// then `rotate_skew1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix {
    pub scale_x: i32,
    pub scale_y: i32,
    pub rotate_skew0: i32,
    pub rotate_skew1: i32,
    pub translate_x: i32,
    pub translate_y: i32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        scale_x: FIXED_ONE,
        scale_y: FIXED_ONE,
        rotate_skew0: 0,
        rotate_skew1: 0,
        translate_x: 0,
        translate_y: 0,
    };

    /// Pure translation in twips
    pub const fn translate(translate_x: i32, translate_y: i32) -> Self {
        Matrix {
            translate_x,
            translate_y,
            ..Self::IDENTITY
        }
    }

    /// Pure scale, factors given in 16.16 fixed point
    pub const fn scale(scale_x: i32, scale_y: i32) -> Self {
        Matrix {
            scale_x,
            scale_y,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Decode a matrix; it starts and ends on a byte boundary
    pub fn read(reader: &mut BitReader<'_>) -> Result<Matrix> {
        reader.align();
        let mut matrix = Matrix::IDENTITY;
        if reader.read_bit()? {
            let bits = reader.read_ubits(5)?;
            matrix.scale_x = reader.read_sbits(bits)?;
            matrix.scale_y = reader.read_sbits(bits)?;
        }
        if reader.read_bit()? {
            let bits = reader.read_ubits(5)?;
            matrix.rotate_skew0 = reader.read_sbits(bits)?;
            matrix.rotate_skew1 = reader.read_sbits(bits)?;
        }
        let bits = reader.read_ubits(5)?;
        matrix.translate_x = reader.read_sbits(bits)?;
        matrix.translate_y = reader.read_sbits(bits)?;
        reader.align();
        Ok(matrix)
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        writer.align();
        let has_scale = self.scale_x != FIXED_ONE || self.scale_y != FIXED_ONE;
        writer.write_bit(has_scale);
        if has_scale {
            let bits = field_bits(&[self.scale_x, self.scale_y], "matrix scale")?;
            writer.write_ubits(bits, 5);
            writer.write_sbits(self.scale_x, bits);
            writer.write_sbits(self.scale_y, bits);
        }
        let has_rotate = self.rotate_skew0 != 0 || self.rotate_skew1 != 0;
        writer.write_bit(has_rotate);
        if has_rotate {
            let bits = field_bits(&[self.rotate_skew0, self.rotate_skew1], "matrix rotate")?;
            writer.write_ubits(bits, 5);
            writer.write_sbits(self.rotate_skew0, bits);
            writer.write_sbits(self.rotate_skew1, bits);
        }
        let bits = field_bits(&[self.translate_x, self.translate_y], "matrix translate")?;
        writer.write_ubits(bits, 5);
        writer.write_sbits(self.translate_x, bits);
        writer.write_sbits(self.translate_y, bits);
        writer.align();
        Ok(())
    }
}

// =============================================================================
// Colors
// =============================================================================

/// RGBA color (alpha is 255 for RGB-only records)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn read_rgb(reader: &mut BitReader<'_>) -> Result<Rgba> {
        let bytes = reader.read_bytes(3)?;
        Ok(Rgba {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            a: 255,
        })
    }

    pub fn read_rgba(reader: &mut BitReader<'_>) -> Result<Rgba> {
        let bytes = reader.read_bytes(4)?;
        Ok(Rgba {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            a: bytes[3],
        })
    }

    pub fn write_rgb(&self, writer: &mut BitWriter) {
        writer.write_bytes(&[self.r, self.g, self.b]);
    }

    pub fn write_rgba(&self, writer: &mut BitWriter) {
        writer.write_bytes(&[self.r, self.g, self.b, self.a]);
    }
}

/// Skip a color transform; its contents never affect geometry.
pub fn skip_color_transform(reader: &mut BitReader<'_>, with_alpha: bool) -> Result<()> {
    reader.align();
    let has_add = reader.read_bit()?;
    let has_mult = reader.read_bit()?;
    let bits = reader.read_ubits(4)?;
    let channels = if with_alpha { 4 } else { 3 };
    let fields = channels * (u32::from(has_add) + u32::from(has_mult));
    for _ in 0..fields {
        reader.read_sbits(bits)?;
    }
    reader.align();
    Ok(())
}

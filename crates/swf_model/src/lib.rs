//! SWF Model - Tag stream representation of SWF documents
//!
//! This crate reads and writes the SWF container and gives typed access to
//! the records a bounding-box pass needs: shapes, text, fonts, placements,
//! sprites, buttons and bitmaps. Records it does not interpret are carried
//! through untouched.

mod bits;
mod error;
mod movie;
mod tag;
mod types;
pub mod character;
pub mod font;
pub mod placement;
pub mod shape;
pub mod text;

pub use bits::*;
pub use error::*;
pub use movie::*;
pub use tag::*;
pub use types::*;
pub use character::*;
pub use font::*;
pub use placement::*;
pub use shape::*;
pub use text::*;

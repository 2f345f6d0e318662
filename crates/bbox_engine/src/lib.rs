//! Bbox Engine - Bounding-box reconciliation for SWF documents
//!
//! This crate recomputes the rectangles a document declares for its shapes,
//! texts, sprites and for the document itself from the geometry it actually
//! places, and optionally writes the recomputed rectangles back.

mod config;
mod error;
mod font_metrics;
mod geometry;
mod orchestrator;
mod placement_tracker;
mod shape_bounds;
mod sprite_bounds;
mod text_bounds;
pub mod patcher;
pub mod report;

pub use config::*;
pub use error::*;
pub use font_metrics::*;
pub use geometry::*;
pub use orchestrator::*;
pub use placement_tracker::*;
pub use shape_bounds::*;
pub use sprite_bounds::*;
pub use text_bounds::*;

//! Error types for bounding-box reconciliation

use swf_model::SwfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BboxError {
    #[error("SWF error: {0}")]
    Swf(#[from] SwfError),

    #[error("Font {0} unknown")]
    UnknownFont(u16),

    #[error("Sprite {0} places itself")]
    CyclicSprite(u16),

    #[error("Sprite nesting deeper than {limit} levels at sprite {sprite}")]
    SpriteNestingTooDeep { sprite: u16, limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BboxError>;

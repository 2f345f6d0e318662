//! Engine configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use crate::{BboxError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default limit on sprite nesting
pub const DEFAULT_MAX_SPRITE_DEPTH: usize = 64;

/// Options for one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BboxConfig {
    /// Recompute and rewrite the rectangles stored in shape and text records
    pub optimize: bool,
    /// Replace the document's frame size with the recomputed rectangle
    pub expand: bool,
    /// Collect per-instance transformed rectangles of the main timeline
    pub collect_placements: bool,
    /// Deepest sprite nesting resolved before giving up
    pub max_sprite_depth: usize,
}

impl Default for BboxConfig {
    fn default() -> Self {
        Self {
            optimize: false,
            expand: false,
            collect_placements: false,
            max_sprite_depth: DEFAULT_MAX_SPRITE_DEPTH,
        }
    }
}

impl BboxConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BboxConfig = serde_json::from_str(json)
            .map_err(|e| BboxError::Config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        tracing::debug!("loaded configuration from {}", path.display());
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BboxError::Config(format!("cannot serialize configuration: {}", e)))
    }

    /// Whether the run produces a document to write back
    pub fn writes_output(&self) -> bool {
        self.optimize || self.expand
    }

    fn validate(&self) -> Result<()> {
        if self.max_sprite_depth == 0 {
            return Err(BboxError::Config(
                "max_sprite_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BboxConfig::default();
        assert!(!config.optimize);
        assert!(!config.expand);
        assert!(!config.writes_output());
        assert_eq!(config.max_sprite_depth, 64);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BboxConfig::from_json(r#"{"optimize": true}"#).unwrap();
        assert!(config.optimize);
        assert!(config.writes_output());
        assert_eq!(config.max_sprite_depth, DEFAULT_MAX_SPRITE_DEPTH);
    }

    #[test]
    fn test_json_round_trip() {
        let config = BboxConfig {
            expand: true,
            collect_placements: true,
            max_sprite_depth: 8,
            ..BboxConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(BboxConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            BboxConfig::from_json("{not json"),
            Err(BboxError::Config(_))
        ));
        assert!(matches!(
            BboxConfig::from_json(r#"{"max_sprite_depth": 0}"#),
            Err(BboxError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bbox.json");
        std::fs::write(&path, r#"{"expand": true, "max_sprite_depth": 3}"#).unwrap();
        let config = BboxConfig::load(&path).unwrap();
        assert!(config.expand);
        assert_eq!(config.max_sprite_depth, 3);

        assert!(matches!(
            BboxConfig::load(&dir.path().join("missing.json")),
            Err(BboxError::Io(_))
        ));
    }
}

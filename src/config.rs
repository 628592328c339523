//! Editor configuration loaded from `pxedit.yaml`.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working editor.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::swatch::ScanLimits;
use crate::tools::{Brush, SelectionLimits};

/// Config file name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "pxedit.yaml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub selection: SelectionLimits,

    /// Limits for the auto-swatch scan.
    pub swatch: ScanLimits,

    /// Pen and eraser defaults.
    pub brush: Brush,

    /// Largest per-channel difference still treated as the seed colour.
    pub fill_tolerance: u8,

    /// Maximum undo steps kept. Unlimited when absent.
    pub history_depth: Option<usize>,

    /// Seed for textured fills, for reproducible output.
    pub seed: Option<u64>,
}

impl EditorConfig {
    /// Load config from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EditError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| EditError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Load `pxedit.yaml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// The config as YAML, for writing a starter file.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| EditError::Parse {
            message: format!("Could not serialize config: {}", e),
            help: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::tools::BrushShape;

    #[test]
    fn test_parse_minimal_config() {
        let config = EditorConfig::parse("fill_tolerance: 12\n").unwrap();
        assert_eq!(config.fill_tolerance, 12);
        assert_eq!(config.selection, SelectionLimits::default());
        assert!(config.history_depth.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
selection:
  max_pixels: 1024
  max_colours: 16
swatch:
  max_dimension: 512
  max_unique_colours: 100
brush:
  shape: circle
  size: 3
fill_tolerance: 4
history_depth: 50
seed: 99
"#;
        let config = EditorConfig::parse(yaml).unwrap();
        assert_eq!(config.selection.max_pixels, 1024);
        assert_eq!(config.selection.max_colours, 16);
        assert_eq!(config.swatch.max_dimension, 512);
        assert_eq!(config.brush, Brush::new(BrushShape::Circle, 3));
        assert_eq!(config.history_depth, Some(50));
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = EditorConfig::parse("selection:\n  max_colours: 8\n").unwrap();
        assert_eq!(config.selection.max_colours, 8);
        assert_eq!(config.selection.max_pixels, 4096 * 4096);
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(EditorConfig::parse("").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EditorConfig::parse("fill_tolerance: lots"),
            Err(EditError::Parse { .. })
        ));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = EditorConfig {
            fill_tolerance: 7,
            seed: Some(1),
            ..Default::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(EditorConfig::parse(&yaml).unwrap(), config);
    }

    #[test]
    fn test_discover() {
        let dir = tempdir().unwrap();
        assert_eq!(EditorConfig::discover(dir.path()).unwrap(), EditorConfig::default());
        std::fs::write(dir.path().join(CONFIG_FILENAME), "seed: 5\n").unwrap();
        assert_eq!(EditorConfig::discover(dir.path()).unwrap().seed, Some(5));
    }
}

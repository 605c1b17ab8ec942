// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loader settings.

use framekit_graph::TieBreak;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Name of the implicit root frame of a model
pub const DEFAULT_ROOT_FRAME: &str = "__model__";

/// Settings controlling how documents are loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Format version
    pub version: u32,
    /// Name of the implicit root frame created for each model
    pub root_frame: String,
    /// Reject references to frame names shared by several vertices
    /// instead of using the first inserted one
    pub strict_frame_references: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            root_frame: DEFAULT_ROOT_FRAME.to_string(),
            strict_frame_references: false,
        }
    }
}

impl LoaderSettings {
    /// Tie-break policy for frame references
    pub fn tie_break(&self) -> TieBreak {
        if self.strict_frame_references {
            TieBreak::Unique
        } else {
            TieBreak::FirstInserted
        }
    }

    /// Parse settings from RON, rejecting newer format versions
    pub fn from_ron(s: &str) -> std::io::Result<Self> {
        let settings: LoaderSettings = ron::from_str(s).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LoaderSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.root_frame, "__model__");
        assert_eq!(settings.tie_break(), TieBreak::FirstInserted);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings = LoaderSettings::from_ron("(strict_frame_references: true)").unwrap();
        assert_eq!(settings.root_frame, DEFAULT_ROOT_FRAME);
        assert_eq!(settings.tie_break(), TieBreak::Unique);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let err = LoaderSettings::from_ron("(version: 99)").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_serialization() {
        let settings = LoaderSettings {
            root_frame: "world".to_string(),
            ..Default::default()
        };
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = LoaderSettings::from_ron(&text).unwrap();
        assert_eq!(loaded, settings);
    }
}

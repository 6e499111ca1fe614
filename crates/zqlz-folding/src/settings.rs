//! Folding settings.

use crate::{FoldingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest line threshold the policy accepts. Single-line statements are
/// never folded.
pub const MIN_FOLDING_LINES: usize = 2;

/// User-facing folding configuration.
///
/// Persisted as JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldingSettings {
    /// Whether statements are folded at all
    pub enabled: bool,
    /// A statement with no trailing whitespace to absorb must span more
    /// lines than this to be folded
    pub min_lines: usize,
    /// Let a folded statement swallow the blank line that follows it
    pub absorb_trailing_whitespace: bool,
}

impl Default for FoldingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_lines: MIN_FOLDING_LINES,
            absorb_trailing_whitespace: true,
        }
    }
}

impl FoldingSettings {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_min_lines(mut self, min_lines: usize) -> Self {
        self.min_lines = min_lines.max(MIN_FOLDING_LINES);
        self
    }

    pub fn with_absorb_trailing_whitespace(mut self, absorb: bool) -> Self {
        self.absorb_trailing_whitespace = absorb;
        self
    }

    /// `min_lines` as the policy uses it.
    pub fn effective_min_lines(&self) -> usize {
        self.min_lines.max(MIN_FOLDING_LINES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads settings from `path`, falling back to defaults if the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no folding settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            FoldingError::Configuration("Could not find config directory".to_string())
        })?;
        Ok(config_dir.join("zqlz").join("folding.json"))
    }
}

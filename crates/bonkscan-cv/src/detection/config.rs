//! Scan configuration

use super::aggregate::PositionPolicy;
use crate::Result;
use crate::grid::GridConfig;
use crate::signature::SignatureConfig;
use crate::template::MatchConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main scan configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub grid: GridConfig,
    pub signature: SignatureConfig,
    pub matching: MatchConfig,
    pub fusion: FusionConfig,
    pub learning: LearningConfig,
    /// Measured cell size in pixels, when the host knows it.
    pub cell_size_hint: Option<f64>,
}

/// Detector fusion and deduplication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Ceiling for fused OCR + pixel confidence.
    pub max_confidence: f64,
    /// IoU above which two pixel detections are considered the same cell.
    pub overlap_threshold: f64,
    pub position_policy: PositionPolicy,
}

/// Active-learning review thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Detections strictly below this confidence are offered for review.
    pub uncertainty_threshold: f64,
    pub max_alternatives: usize,
    /// Minimum number of uncertain detections before prompting.
    pub min_uncertain_to_prompt: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            max_confidence: 0.98,
            overlap_threshold: 0.3,
            position_policy: PositionPolicy::FirstSeen,
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            uncertainty_threshold: 0.6,
            max_alternatives: 3,
            min_uncertain_to_prompt: 2,
        }
    }
}

impl ScanConfig {
    /// Higher match bar, fewer false positives
    pub fn strict() -> Self {
        Self {
            matching: MatchConfig::strict(),
            learning: LearningConfig {
                uncertainty_threshold: 0.75,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Color-only matching for blurred or scaled captures
    pub fn palette_only() -> Self {
        Self {
            matching: MatchConfig::palette_only(),
            fusion: FusionConfig {
                position_policy: PositionPolicy::HighestConfidence,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MatchMode;

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan.json");
        std::fs::write(
            &path,
            r#"{"learning": {"uncertainty_threshold": 0.5}, "cell_size_hint": 52}"#,
        )?;

        let config = ScanConfig::load(&path)?;
        assert_eq!(config.learning.uncertainty_threshold, 0.5);
        assert_eq!(config.learning.max_alternatives, 3);
        assert_eq!(config.cell_size_hint, Some(52.0));
        assert_eq!(config.grid, GridConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan.json");
        let config = ScanConfig::palette_only();
        config.save(&path)?;
        assert_eq!(ScanConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_presets() {
        assert_eq!(ScanConfig::palette_only().matching.mode, MatchMode::PaletteOnly);
        assert!(ScanConfig::strict().matching.threshold > ScanConfig::default().matching.threshold);
        assert!(ScanConfig::load("/nonexistent/scan.json").is_err());
    }
}

//! End-to-end inventory scanner

use super::aggregate::{aggregate_with_policy, combine_with};
use super::config::ScanConfig;
use super::types::{AggregatedDetection, DetectionMethod, RawDetection};
use crate::Result;
use crate::grid::GridLayout;
use crate::template::{IconLoader, IconMatcher, IconTemplate};
use crate::traits::TextRecognizer;
use crate::utils::image::ImageUtils;
use crate::utils::nms::suppress_overlaps;
use anyhow::Context;
use bonkscan_core::{CatalogIndex, GameData};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Result of scanning one screenshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Fused and deduplicated, sorted by name.
    pub detections: Vec<AggregatedDetection>,
    /// Pixel detections after overlap suppression.
    pub cv: Vec<RawDetection>,
    /// Text detections as reported by the recognizer.
    pub ocr: Vec<RawDetection>,
    pub stats: ScanStats,
}

/// Scan statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    pub cells_scanned: usize,
    pub cv_detections: usize,
    pub ocr_detections: usize,
    pub fused_detections: usize,
    pub unique_entities: usize,
    pub avg_confidence: f64,
    pub processing_time_ms: u64,
}

impl ScanResult {
    /// Export scan results in JSON format
    pub fn export_json<P: AsRef<Path>>(&self, output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize scan results")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        Ok(())
    }
}

/// Inventory scanner: grid estimation, icon matching and detector fusion
pub struct ItemScanner {
    config: ScanConfig,
    catalog: CatalogIndex,
    grid: GridLayout,
    matcher: IconMatcher,
}

impl ItemScanner {
    pub fn new(config: ScanConfig, catalog: CatalogIndex, templates: Vec<IconTemplate>) -> Self {
        let grid = GridLayout::new(config.grid.clone());
        let matcher =
            IconMatcher::new(config.matching.clone(), config.signature.clone(), templates);
        Self {
            config,
            catalog,
            grid,
            matcher,
        }
    }

    /// Load game data from `data_dir` and icons from `icon_dirs`.
    pub fn from_dirs<P, Q>(config: ScanConfig, data_dir: P, icon_dirs: &[Q]) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let catalog = GameData::load_catalog(data_dir)?;

        let mut loader = IconLoader::new()
            .with_appearance(config.matching.icon_background, config.signature.clone());
        for dir in icon_dirs {
            loader = loader.add_icon_dir(dir);
        }
        let templates = loader.load_all(&catalog);

        Ok(Self::new(config, catalog, templates))
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn matcher(&self) -> &IconMatcher {
        &self.matcher
    }

    /// Scan a screenshot file
    pub fn scan_file<P: AsRef<Path>>(
        &self,
        path: P,
        recognizer: Option<&dyn TextRecognizer>,
    ) -> Result<ScanResult> {
        let screenshot = ImageUtils::load_rgba(&path)?;
        self.scan(&screenshot, recognizer)
    }

    /// Scan one screenshot, optionally fusing in text recognition.
    pub fn scan(
        &self,
        screenshot: &RgbaImage,
        recognizer: Option<&dyn TextRecognizer>,
    ) -> Result<ScanResult> {
        let start_time = Instant::now();
        let (width, height) = screenshot.dimensions();

        let cells = self
            .grid
            .detect(width as f64, height as f64, self.config.cell_size_hint);
        let cv = suppress_overlaps(
            self.matcher.match_cells(screenshot, &cells),
            self.config.fusion.overlap_threshold,
        );

        let ocr: Vec<RawDetection> = match recognizer {
            Some(recognizer) => recognizer
                .recognize(screenshot, &self.catalog)
                .context("Text recognition failed")?
                .into_iter()
                .map(|d| d.relinked(&self.catalog))
                .collect(),
            None => Vec::new(),
        };

        let combined = combine_with(ocr.clone(), cv.clone(), &self.config.fusion);
        let fused_detections = combined
            .iter()
            .filter(|d| d.method == DetectionMethod::Hybrid)
            .count();
        let detections = aggregate_with_policy(combined, self.config.fusion.position_policy);

        let avg_confidence = if detections.is_empty() {
            0.0
        } else {
            detections.iter().map(|d| d.confidence()).sum::<f64>() / detections.len() as f64
        };

        let stats = ScanStats {
            cells_scanned: cells.len(),
            cv_detections: cv.len(),
            ocr_detections: ocr.len(),
            fused_detections,
            unique_entities: detections.len(),
            avg_confidence,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            width,
            height,
            cells = stats.cells_scanned,
            cv = stats.cv_detections,
            ocr = stats.ocr_detections,
            unique = stats.unique_entities,
            ms = stats.processing_time_ms,
            "scan complete"
        );

        Ok(ScanResult {
            detections,
            cv,
            ocr,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{Rgb, SignatureConfig};
    use bonkscan_core::{CatalogEntity, EntityKind};
    use image::Rgba;
    use std::sync::Arc;

    fn icon() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([230, 200, 30, 255])
            } else {
                Rgba([20, 20, 200, 255])
            }
        })
    }

    fn scanner() -> ItemScanner {
        let catalog = CatalogIndex::from_entities([
            CatalogEntity::new("honey", "Honey", EntityKind::Item),
            CatalogEntity::new("moldy_cheese", "Moldy Cheese", EntityKind::Item),
        ]);
        let template = IconTemplate::new(
            Arc::clone(catalog.get("honey").unwrap()),
            icon(),
            Rgb::new(32, 32, 32),
            &SignatureConfig::default(),
        );
        let config = ScanConfig {
            cell_size_hint: Some(40.0),
            ..Default::default()
        };
        ItemScanner::new(config, catalog, vec![template])
    }

    #[test]
    fn test_blank_screenshot_has_no_detections() -> Result<()> {
        let scanner = scanner();
        let screen = RgbaImage::from_pixel(1280, 720, Rgba([32, 32, 32, 255]));
        let result = scanner.scan(&screen, None)?;
        assert!(result.detections.is_empty());
        assert!(result.stats.cells_scanned > 0);
        assert_eq!(result.stats.avg_confidence, 0.0);
        Ok(())
    }

    #[test]
    fn test_icon_in_first_cell_is_found_and_fused_with_text() -> Result<()> {
        let scanner = scanner();
        let cells = scanner.grid.detect(1280.0, 720.0, Some(40.0));
        let first = &cells[0];

        let mut screen = RgbaImage::from_pixel(1280, 720, Rgba([32, 32, 32, 255]));
        let scaled = ImageUtils::resize_exact(&icon(), first.width as u32, first.height as u32);
        image::imageops::replace(&mut screen, &scaled, first.x as i64, first.y as i64);

        let text = vec![
            RawDetection::new(
                Arc::new(CatalogEntity::new("honey", "Honey", EntityKind::Item)),
                0.5,
                DetectionMethod::Ocr,
            ),
            RawDetection::new(
                Arc::new(CatalogEntity::new("moldy_cheese", "Moldy Cheese", EntityKind::Item)),
                0.4,
                DetectionMethod::Ocr,
            ),
        ];
        let result = scanner.scan(&screen, Some(&text))?;

        assert_eq!(result.stats.cv_detections, 1);
        assert_eq!(result.stats.ocr_detections, 2);
        assert_eq!(result.stats.fused_detections, 1);
        assert_eq!(result.detections.len(), 2);

        let honey = &result.detections[0];
        assert_eq!(honey.id(), "honey");
        assert_eq!(honey.detection.method, DetectionMethod::Hybrid);
        assert_eq!(honey.detection.position.as_ref(), Some(first));
        assert!(Arc::ptr_eq(honey.entity(), scanner.catalog().get("honey").unwrap()));
        Ok(())
    }

    #[test]
    fn test_export_json() -> Result<()> {
        let scanner = scanner();
        let screen = RgbaImage::from_pixel(640, 360, Rgba([32, 32, 32, 255]));
        let result = scanner.scan(&screen, None)?;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan.json");
        result.export_json(&path)?;
        let back: ScanResult = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(back.stats, result.stats);
        Ok(())
    }
}

//! Cell-to-icon matching on structure and palette

use super::{IconTemplate, MatchConfig, MatchMode};
use crate::detection::types::{DetectionMethod, RawDetection};
use crate::region::Region;
use crate::signature::{Signature, SignatureConfig, extract_signature};
use crate::utils::image::{ImageUtils, PixelView};
use crate::utils::similarity::{grayscale_variance, palette_similarity, structural_similarity};
use image::RgbaImage;
use std::collections::HashMap;
use tracing::debug;

/// Matches inventory cells against a set of icon templates
pub struct IconMatcher {
    config: MatchConfig,
    signature: SignatureConfig,
    templates: Vec<IconTemplate>,
}

impl IconMatcher {
    pub fn new(
        config: MatchConfig,
        signature: SignatureConfig,
        templates: Vec<IconTemplate>,
    ) -> Self {
        Self {
            config,
            signature,
            templates,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn templates(&self) -> &[IconTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn method(&self) -> DetectionMethod {
        match self.config.mode {
            MatchMode::Structural => DetectionMethod::TemplateMatch,
            MatchMode::PaletteOnly => DetectionMethod::IconSimilarity,
        }
    }

    /// Score one cell against one template, in `[0, 1]`.
    ///
    /// `icon` is the template image already resized to the cell's dimensions.
    pub fn score(
        &self,
        cell: PixelView<'_>,
        signature: &Signature,
        template: &IconTemplate,
        icon: &RgbaImage,
    ) -> f64 {
        let palette = palette_similarity(&signature.dominant, &template.palette);

        let mut score = match self.config.mode {
            MatchMode::PaletteOnly => palette,
            MatchMode::Structural => {
                let ws = self.config.structural_weight.max(0.0);
                let wp = self.config.palette_weight.max(0.0);
                if ws + wp <= 0.0 {
                    return 0.0;
                }
                let structure = structural_similarity(cell, PixelView::from(icon));
                (ws * structure + wp * palette) / (ws + wp)
            }
        };

        if let (Some(seen), Some(expected)) = (signature.rarity, template.entity.rarity) {
            if seen != expected {
                score -= self.config.rarity_penalty;
            }
        }

        if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 }
    }

    /// Best matching template for one cell, if it clears the threshold.
    ///
    /// `icons` must hold the templates resized to the cell, in template order.
    fn best_match(&self, cell: &RgbaImage, icons: &[RgbaImage]) -> Option<RawDetection> {
        let view = PixelView::from(cell);
        if grayscale_variance(view) < self.config.empty_variance {
            return None;
        }
        let signature = extract_signature(view, &self.signature);

        let (index, score) = self
            .templates
            .iter()
            .zip(icons)
            .map(|(template, icon)| self.score(view, &signature, template, icon))
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        if score < self.config.threshold {
            return None;
        }
        let entity = self.templates[index].entity.clone();
        Some(RawDetection::new(entity, score, self.method()))
    }

    /// Match a single cell image
    pub fn match_cell(&self, cell: &RgbaImage) -> Option<RawDetection> {
        let icons = self.prepare(cell.width(), cell.height());
        self.best_match(cell, &icons)
    }

    /// Match every cell region of a screenshot.
    ///
    /// Returns one detection per non-empty cell whose best score clears the
    /// threshold, positioned at the cell.
    pub fn match_cells(&self, screenshot: &RgbaImage, cells: &[Region]) -> Vec<RawDetection> {
        if self.templates.is_empty() {
            return Vec::new();
        }

        let mut prepared: HashMap<(u32, u32), Vec<RgbaImage>> = HashMap::new();
        let mut jobs = Vec::with_capacity(cells.len());
        for region in cells {
            let Some(cell) = ImageUtils::crop(screenshot, region) else {
                continue;
            };
            prepared
                .entry(cell.dimensions())
                .or_insert_with(|| self.prepare(cell.width(), cell.height()));
            jobs.push((region, cell));
        }

        let match_job = |(region, cell): &(&Region, RgbaImage)| {
            let icons = prepared.get(&cell.dimensions())?;
            self.best_match(cell, icons)
                .map(|d| d.with_position((*region).clone()))
        };

        #[cfg(feature = "parallel")]
        let detections: Vec<RawDetection> = {
            use rayon::prelude::*;
            jobs.par_iter().filter_map(match_job).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let detections: Vec<RawDetection> = jobs.iter().filter_map(match_job).collect();

        debug!(cells = jobs.len(), matched = detections.len(), "matched cells");
        detections
    }

    fn prepare(&self, width: u32, height: u32) -> Vec<RgbaImage> {
        self.templates
            .iter()
            .map(|t| ImageUtils::resize_exact(&t.image, width, height))
            .collect()
    }
}

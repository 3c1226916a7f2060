//! Icon templates and matching

pub mod loader;
pub mod matcher;

pub use loader::{IconLoader, TemplateError};
pub use matcher::IconMatcher;

use crate::signature::{ColorSample, Rgb, SignatureConfig, palette::extract_dominant_colors_with};
use crate::utils::image::PixelView;
use bonkscan_core::CatalogEntity;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Decoded icon of one catalog entity
#[derive(Debug, Clone)]
pub struct IconTemplate {
    pub entity: Arc<CatalogEntity>,
    /// Icon with transparency flattened onto the slot background.
    pub image: RgbaImage,
    pub palette: Vec<ColorSample>,
    pub source: Option<PathBuf>,
}

impl IconTemplate {
    pub fn new(
        entity: Arc<CatalogEntity>,
        image: RgbaImage,
        background: Rgb,
        signature: &SignatureConfig,
    ) -> Self {
        let image = flatten_alpha(&image, background);
        let palette = extract_dominant_colors_with(
            PixelView::from(&image),
            signature.num_colors,
            signature.bucket_size,
        );
        Self {
            entity,
            image,
            palette,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }
}

/// Composite every pixel over an opaque `background`.
pub fn flatten_alpha(image: &RgbaImage, background: Rgb) -> RgbaImage {
    let bg = [background.r, background.g, background.b];
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let alpha = a as u32;
        let mix = |c: u8, k: u8| ((c as u32 * alpha + k as u32 * (255 - alpha) + 127) / 255) as u8;
        Rgba([mix(r, bg[0]), mix(g, bg[1]), mix(b, bg[2]), 255])
    })
}

/// How cells are compared with icons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Grayscale correlation blended with palette similarity
    #[default]
    Structural,
    /// Palette similarity only; tolerant of scaling and blur
    PaletteOnly,
}

/// Icon matching configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum score for a cell to produce a detection.
    pub threshold: f64,
    pub mode: MatchMode,
    pub structural_weight: f64,
    pub palette_weight: f64,
    /// Subtracted when the cell's frame rarity contradicts the entity's rarity.
    pub rarity_penalty: f64,
    /// Cells with lower grayscale variance are treated as empty slots.
    pub empty_variance: f64,
    /// Color transparent icon pixels are composited onto.
    pub icon_background: Rgb,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.55,
            mode: MatchMode::Structural,
            structural_weight: 0.7,
            palette_weight: 0.3,
            rarity_penalty: 0.15,
            empty_variance: 40.0,
            icon_background: Rgb::new(32, 32, 32),
        }
    }
}

impl MatchConfig {
    /// Configuration that ignores structure and compares colors only
    pub fn palette_only() -> Self {
        Self {
            threshold: 0.8,
            mode: MatchMode::PaletteOnly,
            ..Default::default()
        }
    }

    /// Configuration with a higher bar and a heavier rarity penalty
    pub fn strict() -> Self {
        Self {
            threshold: 0.7,
            rarity_penalty: 0.3,
            ..Default::default()
        }
    }
}

//! Visual signatures of inventory cells
//!
//! A signature is the compact color description of one cell that matching and
//! rarity inference work from: the average color, a quantized palette, the
//! averaged border ring and what those imply.

pub mod category;
pub mod palette;
pub mod rarity;

pub use category::{ColorCategory, classify_color};
pub use palette::{ColorSample, extract_dominant_colors, quantize};
pub use rarity::{RarityReference, infer_rarity, sample_border_color};

use crate::utils::image::PixelView;
use bonkscan_core::Rarity;
use serde::{Deserialize, Serialize};

/// Plain RGB triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: Rgb) -> f64 {
        color_distance(*self, other)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from(v: (u8, u8, u8)) -> Self {
        Self::new(v.0, v.1, v.2)
    }
}

impl From<&ColorSample> for Rgb {
    fn from(s: &ColorSample) -> Self {
        Self::new(s.r, s.g, s.b)
    }
}

/// Euclidean distance between two colors in RGB space.
pub fn color_distance(a: impl Into<Rgb>, b: impl Into<Rgb>) -> f64 {
    let (a, b) = (a.into(), b.into());
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Average color of every pixel in the view, `None` for an empty view.
pub fn average_color(image: PixelView<'_>) -> Option<Rgb> {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for [r, g, b, _] in image.pixels() {
        sum[0] += r as u64;
        sum[1] += g as u64;
        sum[2] += b as u64;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Rgb::new(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ))
}

/// Signature extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub num_colors: usize,
    /// Channel quantization step; every channel is floored to a multiple of it.
    pub bucket_size: u8,
    /// Width of the border ring sampled for rarity, in pixels.
    pub border_width: u32,
    pub rarity_table: Vec<RarityReference>,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            num_colors: 5,
            bucket_size: palette::DEFAULT_BUCKET,
            border_width: 3,
            rarity_table: rarity::default_rarity_table(),
        }
    }
}

/// Everything the pipeline knows about one cell's colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub average: Option<Rgb>,
    pub dominant: Vec<ColorSample>,
    pub border: Option<Rgb>,
    /// `None` means the border matched no reference ("unknown").
    pub rarity: Option<Rarity>,
    pub category: ColorCategory,
}

/// Compute the full signature of one cell image.
pub fn extract_signature(image: PixelView<'_>, config: &SignatureConfig) -> Signature {
    let average = average_color(image);
    let border = sample_border_color(image, config.border_width);
    let rarity = border.and_then(|c| infer_rarity(c, &config.rarity_table));

    let dominant =
        palette::extract_dominant_colors_with(image, config.num_colors, config.bucket_size);

    Signature {
        average,
        dominant,
        border,
        rarity,
        category: average.map(classify_color).unwrap_or(ColorCategory::Mixed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_color_distance() {
        assert_eq!(color_distance((0, 0, 0), (0, 0, 0)), 0.0);
        assert_eq!(color_distance((0, 0, 0), (3, 4, 0)), 5.0);
        assert_eq!(
            color_distance([10, 20, 30], [40, 50, 60]),
            color_distance([40, 50, 60], [10, 20, 30])
        );
    }

    #[test]
    fn test_signature_of_framed_icon() {
        // Purple frame around a gray body.
        let img = RgbaImage::from_fn(20, 20, |x, y| {
            if x < 3 || y < 3 || x >= 17 || y >= 17 {
                Rgba([156, 39, 176, 255])
            } else {
                Rgba([128, 128, 128, 255])
            }
        });

        let sig = extract_signature(PixelView::from(&img), &SignatureConfig::default());
        assert_eq!(sig.rarity, Some(Rarity::Epic));
        assert_eq!(sig.border, Some(Rgb::new(156, 39, 176)));
        assert!(sig.dominant.len() == 2);
        assert!(sig.average.is_some());
    }

    #[test]
    fn test_signature_of_empty_image() {
        let sig = extract_signature(PixelView::new(0, 0, &[]), &SignatureConfig::default());
        assert!(sig.dominant.is_empty());
        assert_eq!(sig.rarity, None);
        assert_eq!(sig.category, ColorCategory::Mixed);
    }
}

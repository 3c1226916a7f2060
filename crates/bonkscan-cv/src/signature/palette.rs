//! Quantized dominant-color palettes

use crate::utils::image::PixelView;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_BUCKET: u8 = 32;

/// One palette entry: a quantized color and how many pixels fell into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub frequency: u32,
}

/// Floor a channel to a multiple of `bucket`.
#[inline]
pub fn quantize(channel: u8, bucket: u8) -> u8 {
    let bucket = bucket.max(1);
    (channel / bucket) * bucket
}

/// Top `num_colors` quantized colors by descending pixel count (bucket size 32).
pub fn extract_dominant_colors(image: PixelView<'_>, num_colors: usize) -> Vec<ColorSample> {
    extract_dominant_colors_with(image, num_colors, DEFAULT_BUCKET)
}

/// Like [`extract_dominant_colors`] with an explicit bucket size.
///
/// Every pixel is counted whatever its alpha; icons are flattened onto their
/// background before they get here. Ties in frequency are ordered by color so
/// the result is deterministic.
pub fn extract_dominant_colors_with(
    image: PixelView<'_>,
    num_colors: usize,
    bucket: u8,
) -> Vec<ColorSample> {
    if num_colors == 0 || image.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<(u8, u8, u8), u32> = HashMap::new();
    for [r, g, b, _] in image.pixels() {
        let key = (quantize(r, bucket), quantize(g, bucket), quantize(b, bucket));
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut samples: Vec<ColorSample> = counts
        .into_iter()
        .map(|((r, g, b), frequency)| ColorSample { r, g, b, frequency })
        .collect();

    samples.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| (a.r, a.g, a.b).cmp(&(b.r, b.g, b.b)))
    });
    samples.truncate(num_colors);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn striped() -> RgbaImage {
        // 6 columns red, 3 green, 1 blue
        RgbaImage::from_fn(10, 4, |x, _| match x {
            0..=5 => Rgba([250, 10, 10, 255]),
            6..=8 => Rgba([10, 250, 10, 255]),
            _ => Rgba([10, 10, 250, 255]),
        })
    }

    #[test]
    fn test_sorted_by_frequency() {
        let img = striped();
        let colors = extract_dominant_colors(PixelView::from(&img), 5);
        assert_eq!(colors.len(), 3);
        assert!(colors.windows(2).all(|w| w[0].frequency >= w[1].frequency));
        assert_eq!((colors[0].r, colors[0].g, colors[0].b), (224, 0, 0));
        assert_eq!(colors[0].frequency, 24);
    }

    #[test]
    fn test_zero_and_truncation() {
        let img = striped();
        assert!(extract_dominant_colors(PixelView::from(&img), 0).is_empty());
        assert_eq!(extract_dominant_colors(PixelView::from(&img), 2).len(), 2);
        assert!(extract_dominant_colors(PixelView::new(0, 0, &[]), 5).is_empty());
    }

    #[test]
    fn test_quantized_to_bucket_multiples() {
        let img = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 31) as u8, (y * 29) as u8, 77, 255]));
        for c in extract_dominant_colors(PixelView::from(&img), 64) {
            assert_eq!(c.r % 32, 0);
            assert_eq!(c.g % 32, 0);
            assert_eq!(c.b % 32, 0);
        }
    }

    #[test]
    fn test_zero_alpha_capture_still_has_palette() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
        let colors = extract_dominant_colors(PixelView::from(&img), 5);
        assert_eq!(colors.len(), 1);
        assert_eq!((colors[0].r, colors[0].g, colors[0].b), (224, 224, 224));
        assert_eq!(colors[0].frequency, 16);
    }
}

//! Pixel buffer views and image conversions

use crate::Result;
use crate::region::Region;
use anyhow::Context;
use base64::{Engine, prelude::BASE64_STANDARD};
use image::{RgbaImage, imageops::FilterType};
use std::io::Cursor;
use std::path::Path;

/// Borrowed, read-only view over a flat row-major RGBA buffer (4 bytes per pixel).
///
/// Construction never fails: a buffer shorter than `width * height * 4` only
/// exposes the complete pixels it actually holds, and trailing partial pixels
/// are ignored.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelView<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self {
        let expected = (width as usize).saturating_mul(height as usize).saturating_mul(4);
        let usable = expected.min(data.len() - data.len() % 4);
        Self {
            width,
            height,
            data: &data[..usable],
        }
    }

    pub fn from_image(image: &'a RgbaImage) -> Self {
        Self::new(image.width(), image.height(), image.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of complete pixels available.
    pub fn pixel_count(&self) -> usize {
        self.data.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate `[r, g, b, a]` pixels in row-major order.
    pub fn pixels(self) -> impl Iterator<Item = [u8; 4]> + 'a {
        self.data.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Pixel at `(x, y)`, if inside both the declared size and the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize)
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x as usize))
            .and_then(|n| n.checked_mul(4))?;
        self.data.get(i..i.checked_add(4)?).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Grayscale intensity `(r + g + b) / 3` of every pixel.
    pub fn grayscale(&self) -> Vec<f64> {
        self.pixels()
            .map(|[r, g, b, _]| (r as f64 + g as f64 + b as f64) / 3.0)
            .collect()
    }
}

impl<'a> From<&'a RgbaImage> for PixelView<'a> {
    fn from(image: &'a RgbaImage) -> Self {
        Self::from_image(image)
    }
}

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Load any supported image file as RGBA
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgba8();
        Ok(img)
    }

    /// Copy `region` out of `image`, clamped to the image bounds.
    ///
    /// Returns `None` when the clamped region has no area.
    pub fn crop(image: &RgbaImage, region: &Region) -> Option<RgbaImage> {
        let clamped = region.clamp_to(image.width(), image.height());
        if clamped.is_empty() {
            return None;
        }
        Some(
            image::imageops::crop_imm(
                image,
                clamped.x as u32,
                clamped.y as u32,
                clamped.width as u32,
                clamped.height as u32,
            )
            .to_image(),
        )
    }

    /// Resize to exactly `width x height` (used to bring icons to cell size).
    pub fn resize_exact(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        if image.width() == width && image.height() == height {
            return image.clone();
        }
        image::imageops::resize(image, width.max(1), height.max(1), FilterType::Triangle)
    }

    /// Encode as PNG
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .context("Failed to encode PNG")?;
        Ok(bytes)
    }

    /// Encode as a `data:image/png;base64,...` URL for embedding in HTML.
    pub fn to_data_url(image: &RgbaImage) -> Result<String> {
        let png = Self::encode_png(image)?;
        Ok(format!("data:image/png;base64,{}", BASE64_STANDARD.encode(png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_short_buffer_exposes_complete_pixels_only() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let view = PixelView::new(4, 4, &data);
        assert_eq!(view.pixel_count(), 2);
        assert_eq!(view.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(view.pixel(2, 0), None);
    }

    #[test]
    fn test_extreme_dimensions_do_not_overflow() {
        let view = PixelView::new(u32::MAX, u32::MAX, &[]);
        assert_eq!(view.pixel_count(), 0);
        assert_eq!(view.pixel(u32::MAX - 1, u32::MAX - 1), None);

        let data = [9u8; 8];
        let view = PixelView::new(u32::MAX, u32::MAX, &data);
        assert_eq!(view.pixel_count(), 2);
        assert_eq!(view.pixel(1, 0), Some([9, 9, 9, 9]));
        assert_eq!(view.pixel(0, 1), None);
    }

    #[test]
    fn test_empty_view() {
        let view = PixelView::new(0, 0, &[]);
        assert!(view.is_empty());
        assert!(view.grayscale().is_empty());
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255]));
        let crop = ImageUtils::crop(&img, &Region::new(8, 8, 5, 5)).unwrap();
        assert_eq!(crop.dimensions(), (2, 2));
        assert!(ImageUtils::crop(&img, &Region::new(20, 20, 5, 5)).is_none());
    }

    #[test]
    fn test_data_url_prefix() -> Result<()> {
        let img = RgbaImage::from_pixel(3, 3, Rgba([200, 10, 10, 255]));
        let url = ImageUtils::to_data_url(&img)?;
        assert!(url.starts_with("data:image/png;base64,"));
        Ok(())
    }
}

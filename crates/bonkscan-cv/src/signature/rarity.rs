//! Rarity inference from the colored frame around an icon

use super::{Rgb, color_distance};
use crate::utils::image::PixelView;
use bonkscan_core::Rarity;
use serde::{Deserialize, Serialize};

/// One row of the rarity lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityReference {
    pub rarity: Rarity,
    pub reference: Rgb,
    /// Maximum RGB distance from `reference` still attributed to this rarity.
    pub tolerance: f64,
}

/// Frame colors used by the in-game inventory.
pub fn default_rarity_table() -> Vec<RarityReference> {
    vec![
        RarityReference {
            rarity: Rarity::Common,
            reference: Rgb::new(128, 128, 128),
            tolerance: 50.0,
        },
        RarityReference {
            rarity: Rarity::Uncommon,
            reference: Rgb::new(76, 175, 80),
            tolerance: 70.0,
        },
        RarityReference {
            rarity: Rarity::Rare,
            reference: Rgb::new(33, 150, 243),
            tolerance: 70.0,
        },
        RarityReference {
            rarity: Rarity::Epic,
            reference: Rgb::new(156, 39, 176),
            tolerance: 70.0,
        },
        RarityReference {
            rarity: Rarity::Legendary,
            reference: Rgb::new(255, 152, 0),
            tolerance: 70.0,
        },
    ]
}

/// Average color of the `ring_width`-pixel ring along the image edge.
///
/// Returns `None` for an empty image or a zero-width ring. A ring wider than
/// half the image covers the whole image.
pub fn sample_border_color(image: PixelView<'_>, ring_width: u32) -> Option<Rgb> {
    let (w, h) = (image.width(), image.height());
    if ring_width == 0 || w == 0 || h == 0 {
        return None;
    }

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for (i, [r, g, b, _]) in image.pixels().enumerate() {
        let x = (i % w as usize) as u32;
        let y = (i / w as usize) as u32;
        let on_ring = x < ring_width
            || y < ring_width
            || x >= w.saturating_sub(ring_width)
            || y >= h.saturating_sub(ring_width);
        if on_ring {
            sum[0] += r as u64;
            sum[1] += g as u64;
            sum[2] += b as u64;
            count += 1;
        }
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

/// Closest rarity whose reference lies within its tolerance of `color`.
pub fn infer_rarity(color: Rgb, table: &[RarityReference]) -> Option<Rarity> {
    table
        .iter()
        .map(|row| (row, color_distance(color, row.reference)))
        .filter(|(row, d)| *d <= row.tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(row, _)| row.rarity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_reference_colors_map_to_themselves() {
        let table = default_rarity_table();
        for row in &table {
            assert_eq!(infer_rarity(row.reference, &table), Some(row.rarity));
        }
    }

    #[test]
    fn test_near_color_and_unknown() {
        let table = default_rarity_table();
        assert_eq!(infer_rarity(Rgb::new(40, 140, 230), &table), Some(Rarity::Rare));
        assert_eq!(infer_rarity(Rgb::new(0, 0, 0), &table), None);
        assert_eq!(infer_rarity(Rgb::new(255, 255, 0), &table), None);
        assert_eq!(infer_rarity(Rgb::new(128, 128, 128), &[]), None);
    }

    #[test]
    fn test_border_ring_ignores_center() {
        let img = RgbaImage::from_fn(10, 10, |x, y| {
            if x == 0 || y == 0 || x == 9 || y == 9 {
                Rgba([255, 152, 0, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let view = PixelView::from(&img);
        assert_eq!(sample_border_color(view, 1), Some(Rgb::new(255, 152, 0)));
        assert_eq!(sample_border_color(view, 0), None);
        assert_eq!(sample_border_color(PixelView::new(0, 0, &[]), 3), None);
    }
}

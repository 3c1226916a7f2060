//! Image similarity measures used by the icon matcher

use super::image::PixelView;
use crate::signature::{ColorSample, color_distance};

/// Length of the RGB cube diagonal, the largest possible color distance.
const MAX_COLOR_DISTANCE: f64 = 441.672_955_930_063_7;

/// Normalized cross-correlation of two images' grayscale intensities, in `[0, 1]`.
///
/// Pixels are compared pairwise in row-major order over the first
/// `min(len_a, len_b)` pixels. When either side has no variance the correlation
/// is undefined and the result is `0.0`. Anti-correlation clamps to `0.0`.
pub fn structural_similarity(a: PixelView<'_>, b: PixelView<'_>) -> f64 {
    let ga = a.grayscale();
    let gb = b.grayscale();
    normalized_cross_correlation(&ga, &gb).max(0.0)
}

/// Pearson correlation of two intensity series over their common prefix, in `[-1, 1]`.
pub fn normalized_cross_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= f64::EPSILON || var_b <= f64::EPSILON {
        return 0.0;
    }

    let ncc = cov / (var_a * var_b).sqrt();
    if ncc.is_finite() { ncc.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Population variance of the grayscale intensities; `0.0` for an empty view.
pub fn grayscale_variance(image: PixelView<'_>) -> f64 {
    let gray = image.grayscale();
    if gray.is_empty() {
        return 0.0;
    }
    let n = gray.len() as f64;
    let mean = gray.iter().sum::<f64>() / n;
    gray.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Similarity of two palettes in `[0, 1]`.
///
/// Every color of `a` is paired with its nearest color in `b` and vice versa;
/// distances are weighted by frequency and normalized by the RGB cube diagonal.
/// Two empty palettes are not similar (`0.0`).
pub fn palette_similarity(a: &[ColorSample], b: &[ColorSample]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let forward = weighted_nearest_distance(a, b);
    let backward = weighted_nearest_distance(b, a);
    (1.0 - (forward + backward) / 2.0 / MAX_COLOR_DISTANCE).clamp(0.0, 1.0)
}

fn weighted_nearest_distance(from: &[ColorSample], to: &[ColorSample]) -> f64 {
    let total: f64 = from.iter().map(|s| s.frequency as f64).sum();
    if total <= 0.0 {
        return MAX_COLOR_DISTANCE;
    }
    from.iter()
        .map(|s| {
            let nearest = to
                .iter()
                .map(|t| color_distance(s, t))
                .fold(f64::INFINITY, f64::min);
            nearest * s.frequency as f64
        })
        .sum::<f64>()
        / total
}

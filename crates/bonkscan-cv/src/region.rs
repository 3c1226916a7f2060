//! Screen regions and overlap geometry
//!
//! Core abstraction for the rectangles the grid estimator emits and detections carry.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixel coordinates.
///
/// Zero or negative `width`/`height` is a valid value meaning "no area".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Region {
    /// Create a new unlabeled region
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// True when the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Area in pixels; degenerate regions have area 0.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width as f64 * self.height as f64
        }
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Center point
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Intersection over union with another region, in `[0, 1]`.
    pub fn iou(&self, other: &Region) -> f64 {
        iou(self, other)
    }

    /// Check if this region overlaps another by more than `threshold` IoU
    pub fn overlaps(&self, other: &Region, threshold: f64) -> bool {
        self.iou(other) > threshold
    }

    /// Clamp to a `width x height` canvas. The result may be empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> Region {
        let x1 = (self.x as i64).clamp(0, width as i64);
        let y1 = (self.y as i64).clamp(0, height as i64);
        let x2 = self.right().clamp(0, width as i64);
        let y2 = self.bottom().clamp(0, height as i64);

        Region {
            x: x1 as i32,
            y: y1 as i32,
            width: (x2 - x1).max(0) as i32,
            height: (y2 - y1).max(0) as i32,
            label: self.label.clone(),
        }
    }

    /// Scale coordinates by independent horizontal and vertical factors.
    pub fn scaled(&self, sx: f64, sy: f64) -> Region {
        Region {
            x: (self.x as f64 * sx).round() as i32,
            y: (self.y as f64 * sy).round() as i32,
            width: (self.width as f64 * sx).round() as i32,
            height: (self.height as f64 * sy).round() as i32,
            label: self.label.clone(),
        }
    }
}

/// Intersection over union of two regions.
///
/// Degenerate or disjoint regions yield exactly `0.0`; identical non-empty
/// regions yield exactly `1.0`. Symmetric in its arguments.
pub fn iou(a: &Region, b: &Region) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let x1 = (a.x as i64).max(b.x as i64);
    let y1 = (a.y as i64).max(b.y as i64);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    let intersection = (x2 - x1) as f64 * (y2 - y1) as f64;
    let union = a.area() + b.area() - intersection;

    if union <= 0.0 {
        return 0.0;
    }
    (intersection / union).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_iou() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);

        let value = a.iou(&b);
        assert!(value > 0.0 && value < 1.0);
        assert_eq!(value, b.iou(&a));
        // 25 / (100 + 100 - 25)
        assert!((value - 25.0 / 175.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_is_one() {
        let a = Region::new(12, 900, 48, 48).with_label("cell_0");
        assert_eq!(iou(&a, &a.clone()), 1.0);
    }

    #[test]
    fn test_disjoint_and_touching_are_zero() {
        let a = Region::new(0, 0, 10, 10);
        assert_eq!(iou(&a, &Region::new(20, 20, 5, 5)), 0.0);
        assert_eq!(iou(&a, &Region::new(10, 0, 10, 10)), 0.0);
    }

    #[test]
    fn test_degenerate_regions() {
        let a = Region::new(0, 0, 0, 10);
        let b = Region::new(0, 0, -5, -5);
        assert!(a.is_empty());
        assert_eq!(iou(&a, &a), 0.0);
        assert_eq!(iou(&b, &Region::new(-10, -10, 20, 20)), 0.0);
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let a = Region::new(i32::MAX - 5, 0, i32::MAX, 10);
        let b = Region::new(i32::MAX - 5, 0, 10, 10);
        let value = iou(&a, &b);
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn test_clamp_to_canvas() {
        let r = Region::new(-10, 90, 40, 40).clamp_to(100, 100);
        assert_eq!(r, Region::new(0, 90, 30, 10));
        assert!(Region::new(200, 200, 5, 5).clamp_to(100, 100).is_empty());
    }
}

//! Overlap suppression for pixel detections

use crate::detection::types::RawDetection;

/// Greedy non-maximum suppression over positioned detections.
///
/// Detections are visited from most to least confident; one whose region
/// overlaps an already kept region by more than `iou_threshold` is dropped.
/// Detections without a position are never suppressed. The result is ordered
/// by confidence, highest first.
pub fn suppress_overlaps(
    mut detections: Vec<RawDetection>,
    iou_threshold: f64,
) -> Vec<RawDetection> {
    if detections.len() < 2 {
        return detections;
    }

    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<RawDetection> = Vec::with_capacity(detections.len());
    for candidate in detections {
        let suppressed = candidate.position.as_ref().is_some_and(|region| {
            keep.iter()
                .filter_map(|kept| kept.position.as_ref())
                .any(|kept| kept.overlaps(region, iou_threshold))
        });
        if !suppressed {
            keep.push(candidate);
        }
    }
    keep
}

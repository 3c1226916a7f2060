//! Deduplication and detector fusion

use super::config::FusionConfig;
use super::types::{AggregatedDetection, DetectionMethod, RawDetection};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Which member's region an aggregated detection keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    /// Region of the first detection seen for the entity; later ones are dropped.
    #[default]
    FirstSeen,
    /// Region of the most confident detection that has one.
    HighestConfidence,
}

/// Group detections by entity id with the default [`PositionPolicy::FirstSeen`].
///
/// Accepts raw detections (count 1 each) or already aggregated ones (their
/// counts are summed). See [`aggregate_with_policy`].
pub fn aggregate_duplicates<I, D>(detections: I) -> Vec<AggregatedDetection>
where
    I: IntoIterator<Item = D>,
    D: Into<AggregatedDetection>,
{
    aggregate_with_policy(detections, PositionPolicy::FirstSeen)
}

/// Group detections by `entity.id`: max confidence, summed counts, position per
/// `policy`. Detections with a non-finite confidence are dropped. The result is
/// sorted by entity name, case-insensitively.
pub fn aggregate_with_policy<I, D>(
    detections: I,
    policy: PositionPolicy,
) -> Vec<AggregatedDetection>
where
    I: IntoIterator<Item = D>,
    D: Into<AggregatedDetection>,
{
    let mut groups: Vec<AggregatedDetection> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in detections {
        let item: AggregatedDetection = item.into();
        if !item.confidence().is_finite() {
            debug!(id = item.id(), "dropping detection with non-finite confidence");
            continue;
        }

        let Some(&i) = index.get(item.id()) else {
            index.insert(item.id().to_string(), groups.len());
            groups.push(item);
            continue;
        };

        let group = &mut groups[i];
        group.count = group.count.saturating_add(item.count);
        if item.confidence() > group.detection.confidence {
            group.detection.confidence = item.confidence();
            if policy == PositionPolicy::HighestConfidence && item.detection.position.is_some() {
                group.detection.position = item.detection.position;
            }
        }
    }

    groups.sort_by_cached_key(|g| g.name().to_lowercase());
    groups
}

/// Fused confidence of two agreeing detectors.
///
/// Inputs are clamped to `[0, 1]` and combined as independent evidence
/// (`1 - (1-a)(1-b)`), so the result is never below either input, then capped
/// at `cap`.
pub fn fused_confidence(a: f64, b: f64, cap: f64) -> f64 {
    let a = a.clamp(0.0, 1.0);
    let b = b.clamp(0.0, 1.0);
    (1.0 - (1.0 - a) * (1.0 - b)).min(cap)
}

/// Fuse OCR and pixel-detector outputs with the default [`FusionConfig`].
pub fn combine_detections(ocr: Vec<RawDetection>, cv: Vec<RawDetection>) -> Vec<RawDetection> {
    combine_with(ocr, cv, &FusionConfig::default())
}

/// Fuse OCR and pixel-detector outputs.
///
/// Each OCR detection pairs with at most one CV detection of the same entity
/// id (the most confident one still unpaired) and becomes a
/// [`DetectionMethod::Hybrid`] detection. Identity is the id: two entities that
/// share a display name are never merged. Unpaired detections pass through as
/// they are. The result is sorted by confidence, highest first.
pub fn combine_with(
    ocr: Vec<RawDetection>,
    cv: Vec<RawDetection>,
    config: &FusionConfig,
) -> Vec<RawDetection> {
    let mut cv: Vec<RawDetection> = cv.into_iter().filter(|d| d.confidence.is_finite()).collect();
    cv.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut by_id: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (i, d) in cv.iter().enumerate() {
        by_id.entry(d.entity.id.clone()).or_default().push_back(i);
    }
    let mut cv_slots: Vec<Option<RawDetection>> = cv.into_iter().map(Some).collect();

    let mut combined = Vec::with_capacity(cv_slots.len() + ocr.len());
    let mut fused = 0usize;

    for text in ocr.into_iter().filter(|d| d.confidence.is_finite()) {
        let partner = by_id
            .get_mut(text.id())
            .and_then(VecDeque::pop_front)
            .and_then(|i| cv_slots[i].take());

        match partner {
            Some(pixel) => {
                fused += 1;
                combined.push(fuse(text, pixel, config.max_confidence));
            }
            None => combined.push(text),
        }
    }
    combined.extend(cv_slots.into_iter().flatten());

    combined.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    debug!(total = combined.len(), fused, "combined detector outputs");
    combined
}

fn fuse(text: RawDetection, pixel: RawDetection, cap: f64) -> RawDetection {
    RawDetection {
        kind: text.kind,
        confidence: fused_confidence(text.confidence, pixel.confidence, cap),
        method: DetectionMethod::Hybrid,
        position: pixel.position.or(text.position),
        raw_text: text.raw_text,
        entity: text.entity,
    }
}

//! Selecting low-confidence detections for review

use crate::detection::config::LearningConfig;
use crate::detection::types::AggregatedDetection;
use bonkscan_core::{CatalogEntity, CatalogIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A detection queued for human verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertainDetection {
    pub detection: AggregatedDetection,
    /// Same-kind entities the user may pick instead.
    pub alternatives: Vec<Arc<CatalogEntity>>,
    /// PNG crop of the detection's region, as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_data_url: Option<String>,
}

impl UncertainDetection {
    pub fn id(&self) -> &str {
        self.detection.id()
    }

    pub fn confidence(&self) -> f64 {
        self.detection.confidence()
    }
}

/// Detections strictly below `threshold`, least confident first, each with up
/// to three alternatives.
pub fn find_uncertain_detections(
    detections: &[AggregatedDetection],
    catalog: &CatalogIndex,
    threshold: f64,
) -> Vec<UncertainDetection> {
    let config = LearningConfig {
        uncertainty_threshold: threshold,
        ..Default::default()
    };
    find_uncertain_with(detections, catalog, &config)
}

/// [`find_uncertain_detections`] with an explicit alternatives limit.
pub fn find_uncertain_with(
    detections: &[AggregatedDetection],
    catalog: &CatalogIndex,
    config: &LearningConfig,
) -> Vec<UncertainDetection> {
    let mut uncertain: Vec<UncertainDetection> = detections
        .iter()
        .filter(|d| d.confidence() < config.uncertainty_threshold)
        .map(|d| UncertainDetection {
            alternatives: catalog.alternatives(
                d.detection.kind,
                d.id(),
                d.entity().rarity,
                config.max_alternatives,
            ),
            detection: d.clone(),
            crop_data_url: None,
        })
        .collect();

    uncertain.sort_by(|a, b| a.confidence().total_cmp(&b.confidence()));
    uncertain
}

/// Number of detections strictly below `threshold`.
pub fn count_uncertain(detections: &[AggregatedDetection], threshold: f64) -> usize {
    detections.iter().filter(|d| d.confidence() < threshold).count()
}

/// Whether a review is worth interrupting the user for: two or more
/// detections below the default threshold.
pub fn should_prompt_for_learning(detections: &[AggregatedDetection]) -> bool {
    should_prompt_with(detections, &LearningConfig::default())
}

pub fn should_prompt_with(detections: &[AggregatedDetection], config: &LearningConfig) -> bool {
    let required = config.min_uncertain_to_prompt.max(1);
    count_uncertain(detections, config.uncertainty_threshold) >= required
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{DetectionMethod, RawDetection};
    use bonkscan_core::{EntityKind, Rarity};

    fn catalog() -> CatalogIndex {
        CatalogIndex::from_entities([
            CatalogEntity::new("a", "Anvil", EntityKind::Item).with_rarity(Rarity::Rare),
            CatalogEntity::new("b", "Beer", EntityKind::Item),
            CatalogEntity::new("c", "Clover", EntityKind::Item).with_rarity(Rarity::Rare),
            CatalogEntity::new("d", "Dice", EntityKind::Item),
            CatalogEntity::new("e", "Echo", EntityKind::Item),
            CatalogEntity::new("s", "Sword", EntityKind::Weapon),
        ])
    }

    fn agg(catalog: &CatalogIndex, id: &str, confidence: f64) -> AggregatedDetection {
        let entity = Arc::clone(catalog.get(id).unwrap());
        RawDetection::new(entity, confidence, DetectionMethod::TemplateMatch).into()
    }

    #[test]
    fn test_uncertainty_scenario() {
        let catalog = catalog();
        let detections = vec![
            agg(&catalog, "a", 0.4),
            agg(&catalog, "b", 0.8),
            agg(&catalog, "d", 0.3),
        ];
        let uncertain = find_uncertain_detections(&detections, &catalog, 0.6);
        let confidences: Vec<f64> = uncertain.iter().map(|u| u.confidence()).collect();
        assert_eq!(confidences, vec![0.3, 0.4]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let catalog = catalog();
        let detections = vec![agg(&catalog, "a", 0.6)];
        assert!(find_uncertain_detections(&detections, &catalog, 0.6).is_empty());
    }

    #[test]
    fn test_alternatives_same_kind_same_rarity_first() {
        let catalog = catalog();
        let uncertain = find_uncertain_detections(&[agg(&catalog, "a", 0.2)], &catalog, 0.6);
        let alternatives: Vec<&str> =
            uncertain[0].alternatives.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[0], "c");
        assert!(!alternatives.contains(&"a"));
        assert!(!alternatives.contains(&"s"));
    }

    #[test]
    fn test_prompt_needs_two_uncertain() {
        let catalog = catalog();
        assert!(!should_prompt_for_learning(&[]));
        assert!(!should_prompt_for_learning(&[agg(&catalog, "a", 0.1), agg(&catalog, "b", 0.9)]));
        assert!(should_prompt_for_learning(&[agg(&catalog, "a", 0.1), agg(&catalog, "b", 0.5)]));
    }
}

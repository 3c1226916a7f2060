//! Detection records exchanged between detectors, the aggregator and the UI

use crate::region::Region;
use bonkscan_core::{CatalogEntity, CatalogIndex, EntityKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which detector produced a detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Structural comparison against an icon template (the default for
    /// records that do not say).
    #[default]
    TemplateMatch,
    /// Text recognition of the entity name.
    Ocr,
    /// OCR and pixel detectors agreed on the same entity.
    Hybrid,
    /// Palette-only comparison against an icon.
    IconSimilarity,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::TemplateMatch => "template_match",
            DetectionMethod::Ocr => "ocr",
            DetectionMethod::Hybrid => "hybrid",
            DetectionMethod::IconSimilarity => "icon_similarity",
        }
    }

    /// True for detectors that look at pixels rather than text.
    pub fn is_pixel_based(&self) -> bool {
        match self {
            DetectionMethod::TemplateMatch | DetectionMethod::IconSimilarity => true,
            DetectionMethod::Ocr | DetectionMethod::Hybrid => false,
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detector's claim that `entity` is visible, produced per scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDetection {
    #[serde(rename = "type", default)]
    pub kind: EntityKind,
    pub entity: Arc<CatalogEntity>,
    /// Conventionally in `[0, 1]` but not enforced.
    pub confidence: f64,
    #[serde(default)]
    pub method: DetectionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl RawDetection {
    pub fn new(entity: Arc<CatalogEntity>, confidence: f64, method: DetectionMethod) -> Self {
        Self {
            kind: entity.kind,
            entity,
            confidence,
            method,
            position: None,
            raw_text: None,
        }
    }

    pub fn with_position(mut self, position: Region) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }

    /// Point `entity` at the catalog's shared instance with the same id, if any.
    ///
    /// Records deserialized from an external detector carry their own copy of
    /// the entity; relinking keeps every detection referencing the catalog.
    pub fn relinked(mut self, catalog: &CatalogIndex) -> Self {
        if let Some(shared) = catalog.get(&self.entity.id) {
            self.entity = Arc::clone(shared);
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.entity.id
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }
}

/// All raw detections of one entity folded together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDetection {
    #[serde(flatten)]
    pub detection: RawDetection,
    pub count: u32,
}

impl AggregatedDetection {
    pub fn id(&self) -> &str {
        self.detection.id()
    }

    pub fn name(&self) -> &str {
        self.detection.name()
    }

    pub fn confidence(&self) -> f64 {
        self.detection.confidence
    }

    pub fn entity(&self) -> &Arc<CatalogEntity> {
        &self.detection.entity
    }
}

impl From<RawDetection> for AggregatedDetection {
    fn from(detection: RawDetection) -> Self {
        Self { detection, count: 1 }
    }
}

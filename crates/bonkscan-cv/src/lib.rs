//! Bonkscan Computer Vision Library
//!
//! Inventory detection for screenshots: grid estimation, visual signatures,
//! icon matching, fusion with text recognition and active-learning review.

pub mod detection;
pub mod grid;
pub mod learning;
pub mod region;
pub mod signature;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use detection::{
    AggregatedDetection, DetectionMethod, ItemScanner, RawDetection, ScanConfig, ScanResult,
    aggregate_duplicates, combine_detections,
};
pub use grid::{GridConfig, GridLayout, detect_grid_positions};
pub use learning::{
    ActiveLearning, UncertainDetection, find_uncertain_detections, should_prompt_for_learning,
};
pub use region::{Region, iou};
pub use signature::{Signature, extract_dominant_colors, extract_signature};
pub use template::{IconLoader, IconMatcher};
pub use utils::{PixelView, structural_similarity};

// Error handling
pub type Result<T> = anyhow::Result<T>;

/// Core traits for the CV system
pub mod traits {
    use super::*;
    use bonkscan_core::CatalogIndex;
    use image::RgbaImage;

    /// Source of text-based detections, typically an OCR engine.
    pub trait TextRecognizer {
        fn recognize(
            &self,
            screenshot: &RgbaImage,
            catalog: &CatalogIndex,
        ) -> Result<Vec<RawDetection>>;
    }

    /// Precomputed recognizer output, e.g. records read from a JSON file.
    impl TextRecognizer for [RawDetection] {
        fn recognize(
            &self,
            _screenshot: &RgbaImage,
            _catalog: &CatalogIndex,
        ) -> Result<Vec<RawDetection>> {
            Ok(self.to_vec())
        }
    }

    impl TextRecognizer for Vec<RawDetection> {
        fn recognize(
            &self,
            screenshot: &RgbaImage,
            catalog: &CatalogIndex,
        ) -> Result<Vec<RawDetection>> {
            self.as_slice().recognize(screenshot, catalog)
        }
    }
}

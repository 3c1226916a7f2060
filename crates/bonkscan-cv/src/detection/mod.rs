//! Detection records, fusion and the end-to-end scanner

pub mod aggregate;
pub mod config;
pub mod detector;
pub mod types;

pub use aggregate::{
    PositionPolicy, aggregate_duplicates, aggregate_with_policy, combine_detections, combine_with,
};
pub use config::{FusionConfig, LearningConfig, ScanConfig};
pub use detector::{ItemScanner, ScanResult, ScanStats};
pub use types::{AggregatedDetection, DetectionMethod, RawDetection};

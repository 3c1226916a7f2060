//! Scan driver for the command line

use anyhow::Context;
use bonkscan_cv::Result;
use bonkscan_cv::detection::{
    AggregatedDetection, ItemScanner, RawDetection, ScanConfig, ScanResult,
};
use bonkscan_cv::utils::ImageUtils;
use image::RgbaImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ScanOptions<'a> {
    pub data_dir: &'a Path,
    pub icon_dirs: &'a [PathBuf],
    pub screenshot: &'a Path,
    pub config: Option<&'a Path>,
    pub ocr: Option<&'a Path>,
}

pub struct ScanOutcome {
    pub scanner: ItemScanner,
    pub screenshot: RgbaImage,
    pub result: ScanResult,
}

/// Text-recognition output accepted either as a bare array or wrapped in `{"detections": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum OcrFile {
    Bare(Vec<RawDetection>),
    Wrapped { detections: Vec<RawDetection> },
}

pub fn load_ocr_records(path: &Path) -> Result<Vec<RawDetection>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OCR records: {:?}", path))?;
    let file: OcrFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse OCR records: {:?}", path))?;
    Ok(match file {
        OcrFile::Bare(detections) | OcrFile::Wrapped { detections } => detections,
    })
}

pub fn run_scan(options: &ScanOptions<'_>) -> Result<ScanOutcome> {
    let config = match options.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };

    let scanner = ItemScanner::from_dirs(config, options.data_dir, options.icon_dirs)?;
    info!(
        entities = scanner.catalog().len(),
        icons = scanner.matcher().len(),
        "scanner ready"
    );

    let ocr = options.ocr.map(load_ocr_records).transpose()?;
    let screenshot = ImageUtils::load_rgba(options.screenshot)?;
    let result = match &ocr {
        Some(records) => scanner.scan(&screenshot, Some(records))?,
        None => scanner.scan(&screenshot, None)?,
    };

    Ok(ScanOutcome {
        scanner,
        screenshot,
        result,
    })
}

/// Ranked listing, most confident first.
pub fn format_detections(detections: &[AggregatedDetection]) -> String {
    let mut ranked: Vec<&AggregatedDetection> = detections.iter().collect();
    ranked.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

    let mut out = String::new();
    for (rank, d) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<28} x{:<3} {:>5.1}%  {:<8} {}\n",
            rank + 1,
            d.name(),
            d.count,
            d.confidence() * 100.0,
            d.detection.kind.as_str(),
            d.detection.method.as_str()
        ));
    }
    out
}

pub fn print_detections(detections: &[AggregatedDetection]) {
    if detections.is_empty() {
        println!("No items detected");
        return;
    }
    print!("{}", format_detections(detections));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ocr_records_both_shapes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let bare = dir.path().join("bare.json");
        std::fs::write(
            &bare,
            concat!(
                r#"[{"type": "item", "entity": {"id": "honey", "name": "Honey"}, "#,
                r#""confidence": 0.7, "method": "ocr"}]"#,
            ),
        )?;
        let wrapped = dir.path().join("wrapped.json");
        std::fs::write(
            &wrapped,
            concat!(
                r#"{"detections": [{"type": "tome", "entity": {"id": "t", "name": "T"}, "#,
                r#""confidence": 0.2}]}"#,
            ),
        )?;

        assert_eq!(load_ocr_records(&bare)?[0].id(), "honey");
        assert_eq!(load_ocr_records(&wrapped)?.len(), 1);
        assert!(load_ocr_records(&dir.path().join("missing.json")).is_err());
        Ok(())
    }
}

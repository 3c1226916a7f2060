//! Console active-learning review

use bonkscan_core::CatalogIndex;
use bonkscan_cv::Result;
use bonkscan_cv::detection::AggregatedDetection;
use bonkscan_cv::learning::{
    ActionOutcome, ActiveLearning, SessionStats, UncertainDetection, VerificationAction,
};
use image::RgbaImage;
use std::io::{BufRead, Write};

/// Interpret one line of user input for the detection under review.
///
/// `y` accepts, `n` rejects, `s` skips and a number picks that alternative
/// (1-based). Anything else is `None`.
pub fn parse_action(line: &str, current: &UncertainDetection) -> Option<VerificationAction> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(VerificationAction::Correct),
        "n" | "no" => Some(VerificationAction::Wrong),
        "s" | "skip" => Some(VerificationAction::Skip),
        other => {
            let n: usize = other.parse().ok()?;
            let alt = current.alternatives.get(n.checked_sub(1)?)?;
            Some(VerificationAction::Alternative(alt.id.clone()))
        }
    }
}

fn describe<W: Write>(
    out: &mut W,
    current: &UncertainDetection,
    index: usize,
    total: usize,
) -> Result<()> {
    writeln!(
        out,
        "[{}/{}] {} ({:.0}%)",
        index + 1,
        total,
        current.detection.name(),
        current.confidence().clamp(0.0, 1.0) * 100.0
    )?;
    for (i, alt) in current.alternatives.iter().enumerate() {
        writeln!(out, "  {}) {}", i + 1, alt.name)?;
    }
    write!(out, "Correct? [y/n/s/number] ")?;
    out.flush()?;
    Ok(())
}

/// Walk the user through every uncertain detection; stops early at end of input.
pub fn run_review<R: BufRead, W: Write>(
    learning: &mut ActiveLearning,
    detections: &[AggregatedDetection],
    catalog: &CatalogIndex,
    screenshot: Option<&RgbaImage>,
    mut input: R,
    mut out: W,
) -> Result<SessionStats> {
    let (width, height) = screenshot.map(|s| s.dimensions()).unwrap_or((0, 0));
    let total = learning.start(detections, catalog, screenshot, width, height).len();
    if total == 0 {
        writeln!(out, "Nothing to review")?;
        return Ok(learning.end());
    }

    let mut line = String::new();
    while let Some(current) = learning.current().cloned() {
        let index = learning.session().map(|s| s.current_index()).unwrap_or(0);
        describe(&mut out, &current, index, total)?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let Some(action) = parse_action(&line, &current) else {
            writeln!(out, "Unrecognized answer")?;
            continue;
        };

        match learning.handle_verification_action(action) {
            ActionOutcome::Alternatives if current.alternatives.is_empty() => {
                writeln!(out, "No alternatives known, skipping")?;
                learning.skip();
            }
            ActionOutcome::Alternatives => {
                writeln!(out, "Pick the right item by number, or s to skip")?
            }
            ActionOutcome::Next => {}
            ActionOutcome::Done => break,
        }
    }

    Ok(learning.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonkscan_core::{CatalogEntity, EntityKind};
    use bonkscan_cv::detection::{DetectionMethod, RawDetection};
    use std::io::Cursor;
    use std::sync::Arc;

    fn setup() -> (CatalogIndex, Vec<AggregatedDetection>) {
        let catalog = CatalogIndex::from_entities([
            CatalogEntity::new("a", "Anvil", EntityKind::Item),
            CatalogEntity::new("b", "Beer", EntityKind::Item),
            CatalogEntity::new("c", "Clover", EntityKind::Item),
        ]);
        let detections = [("a", 0.2), ("b", 0.4)]
            .into_iter()
            .map(|(id, c)| {
                let entity = Arc::clone(catalog.get(id).unwrap());
                RawDetection::new(entity, c, DetectionMethod::TemplateMatch).into()
            })
            .collect();
        (catalog, detections)
    }

    #[test]
    fn test_console_review() -> Result<()> {
        let (catalog, detections) = setup();
        let mut learning = ActiveLearning::default();
        let mut out = Vec::new();

        // Anvil: reject, then pick alternative 2 (Clover). Beer: accept.
        let input = Cursor::new("n\n2\ny\n");
        let stats = run_review(&mut learning, &detections, &catalog, None, input, &mut out)?;

        let expected = SessionStats { total_reviewed: 2, corrections_added: 1, skipped: 0 };
        assert_eq!(stats, expected);
        assert_eq!(learning.verification_log()[0].corrected_entity_id.as_deref(), Some("c"));
        assert!(String::from_utf8(out)?.contains("[1/2] Anvil (20%)"));
        Ok(())
    }

    #[test]
    fn test_end_of_input_counts_as_skipped() -> Result<()> {
        let (catalog, detections) = setup();
        let mut learning = ActiveLearning::default();
        let input = Cursor::new("what\n");
        let stats = run_review(&mut learning, &detections, &catalog, None, input, Vec::new())?;
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.total_reviewed, 0);
        Ok(())
    }
}

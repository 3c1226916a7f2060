//! HTML fragments for the review UI

use super::session::SessionStats;
use super::uncertain::UncertainDetection;

/// Escape text for use inside HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Confidence as a whole-number percentage in `0..=100`.
pub fn confidence_percent(confidence: f64) -> u32 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Review card for one uncertain detection. `index` is zero-based.
pub fn render_active_learning_prompt(
    item: &UncertainDetection,
    index: usize,
    total: usize,
) -> String {
    let name = escape_html(item.detection.name());
    let id = escape_html(item.id());
    let position = (index + 1).min(total.max(1));

    let mut html = format!(r#"<div class="al-prompt" data-detection-id="{id}">"#);
    html.push_str(&format!(r#"<div class="al-progress">{position} / {total}</div>"#));

    match item.crop_data_url.as_deref() {
        Some(url) => html.push_str(&format!(
            r#"<img class="al-thumb" src="{}" alt="{name}">"#,
            escape_html(url)
        )),
        None => html.push_str(r#"<div class="al-thumb al-thumb-placeholder">?</div>"#),
    }

    html.push_str(&format!(
        concat!(
            r#"<div class="al-candidate"><span class="al-name">{}</span> "#,
            r#"<span class="al-confidence">{}%</span></div>"#,
        ),
        name,
        confidence_percent(item.confidence())
    ));

    if !item.alternatives.is_empty() {
        html.push_str(r#"<ul class="al-alternatives">"#);
        for alt in &item.alternatives {
            html.push_str(&format!(
                r#"<li><button data-action="alternative" data-entity-id="{}">{}</button></li>"#,
                escape_html(&alt.id),
                escape_html(&alt.name)
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str(concat!(
        r#"<div class="al-actions">"#,
        r#"<button data-action="correct">Correct</button>"#,
        r#"<button data-action="wrong">Wrong</button>"#,
        r#"<button data-action="skip">Skip</button>"#,
        "</div>",
    ));
    html.push_str("</div>");
    html
}

pub fn render_completion_message(stats: &SessionStats) -> String {
    format!(
        concat!(
            r#"<div class="al-complete"><p>Review complete.</p><ul>"#,
            "<li>Reviewed: {}</li><li>Corrections added: {}</li><li>Skipped: {}</li>",
            "</ul></div>",
        ),
        stats.total_reviewed, stats.corrections_added, stats.skipped
    )
}

/// Badge announcing pending reviews; empty for zero.
pub fn render_uncertain_badge(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let noun = if count == 1 { "detection" } else { "detections" };
    format!(
        r#"<span class="al-badge" title="{count} uncertain {noun} need review">{count}</span>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{DetectionMethod, RawDetection};
    use bonkscan_core::{CatalogEntity, EntityKind};
    use std::sync::Arc;

    fn item(name: &str, confidence: f64) -> UncertainDetection {
        UncertainDetection {
            detection: RawDetection::new(
                Arc::new(CatalogEntity::new("x", name, EntityKind::Item)),
                confidence,
                DetectionMethod::TemplateMatch,
            )
            .into(),
            alternatives: vec![Arc::new(CatalogEntity::new("y", "Yo<b>", EntityKind::Item))],
            crop_data_url: None,
        }
    }

    #[test]
    fn test_prompt_contents_are_escaped() {
        let html = render_active_learning_prompt(&item("<script>alert(1)</script>", 0.456), 0, 3);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("46%"));
        assert!(html.contains("al-thumb-placeholder"));
        assert!(html.contains("Yo&lt;b&gt;"));
        assert!(html.contains("1 / 3"));
        assert!(html.starts_with(r#"<div class="al-prompt" data-detection-id="x">"#));
        assert!(html.contains(r#"data-entity-id="y">Yo&lt;b&gt;</button>"#));
        assert!(html.ends_with("</div></div>"));
        for action in ["correct", "wrong", "skip"] {
            assert!(html.contains(&format!(r#"data-action="{action}""#)));
        }
    }

    #[test]
    fn test_prompt_with_thumbnail() {
        let mut with_crop = item("Anvil", 0.2);
        with_crop.crop_data_url = Some("data:image/png;base64,AAAA".into());
        let html = render_active_learning_prompt(&with_crop, 1, 2);
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(!html.contains("al-thumb-placeholder"));
    }

    #[test]
    fn test_completion_and_badge() {
        let stats = SessionStats { total_reviewed: 4, corrections_added: 1, skipped: 2 };
        let html = render_completion_message(&stats);
        assert!(html.contains("Reviewed: 4"));
        assert!(html.contains("Corrections added: 1"));
        assert!(html.contains("Skipped: 2"));

        assert_eq!(render_uncertain_badge(0), "");
        let badge = render_uncertain_badge(3);
        assert!(badge.contains(">3<"));
        assert!(badge.contains("title="));
    }

    #[test]
    fn test_confidence_percent() {
        assert_eq!(confidence_percent(0.999), 100);
        assert_eq!(confidence_percent(f64::NAN), 0);
        assert_eq!(confidence_percent(-1.0), 0);
    }
}

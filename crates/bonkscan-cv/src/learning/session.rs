//! Active-learning review session
//!
//! [`ActiveLearning`] owns at most one [`ActiveLearningSession`] at a time and
//! walks the user through the uncertain detections one by one. Responses of
//! ended sessions accumulate in an in-memory verification log; persisting that
//! log is left to the host.

use super::uncertain::{UncertainDetection, find_uncertain_with};
use crate::detection::config::LearningConfig;
use crate::detection::types::AggregatedDetection;
use crate::utils::image::ImageUtils;
use bonkscan_core::CatalogIndex;
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What the user said about one detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub detection_id: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_entity_id: Option<String>,
}

/// A recorded verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub detection_id: String,
    pub detected_entity_id: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_entity_id: Option<String>,
    pub confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

impl VerificationResponse {
    /// True when the user named a replacement entity.
    pub fn is_correction(&self) -> bool {
        self.corrected_entity_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_reviewed: usize,
    pub corrections_added: usize,
    pub skipped: usize,
}

/// User actions on the current detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationAction {
    Correct,
    Wrong,
    Skip,
    /// The user picked this entity id as the real one.
    Alternative(String),
}

/// What the caller should show next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Next,
    Alternatives,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Reviewing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLearningSession {
    uncertain_detections: Vec<UncertainDetection>,
    current_index: usize,
    responses: Vec<VerificationResponse>,
    started_at: DateTime<Utc>,
}

impl ActiveLearningSession {
    pub fn uncertain_detections(&self) -> &[UncertainDetection] {
        &self.uncertain_detections
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn responses(&self) -> &[VerificationResponse] {
        &self.responses
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn len(&self) -> usize {
        self.uncertain_detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uncertain_detections.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.uncertain_detections.len()
    }

    pub fn current(&self) -> Option<&UncertainDetection> {
        self.uncertain_detections.get(self.current_index)
    }

    fn advance(&mut self) {
        self.current_index = (self.current_index + 1).min(self.uncertain_detections.len());
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            total_reviewed: self.responses.len(),
            corrections_added: self.responses.iter().filter(|r| r.is_correction()).count(),
            skipped: self.uncertain_detections.len().saturating_sub(self.responses.len()),
        }
    }
}

/// Owner of the review session and the verification log
#[derive(Debug, Default)]
pub struct ActiveLearning {
    config: LearningConfig,
    session: Option<ActiveLearningSession>,
    log: Vec<VerificationResponse>,
}

impl ActiveLearning {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            session: None,
            log: Vec::new(),
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&ActiveLearningSession> {
        self.session.as_ref()
    }

    /// `Reviewing` while a session has a current detection, `Idle` otherwise.
    pub fn state(&self) -> SessionState {
        match &self.session {
            Some(session) if !session.is_complete() => SessionState::Reviewing,
            _ => SessionState::Idle,
        }
    }

    /// Start a review of `detections`, discarding any previous session.
    ///
    /// `width` and `height` are the dimensions the detection regions refer to;
    /// when `screenshot` has other dimensions the regions are scaled before
    /// cropping. Zero dimensions mean "same as the screenshot".
    pub fn start(
        &mut self,
        detections: &[AggregatedDetection],
        catalog: &CatalogIndex,
        screenshot: Option<&RgbaImage>,
        width: u32,
        height: u32,
    ) -> &ActiveLearningSession {
        if let Some(previous) = self.session.take() {
            debug!(responses = previous.responses.len(), "discarding unfinished session");
        }

        let mut uncertain = find_uncertain_with(detections, catalog, &self.config);
        if let Some(screenshot) = screenshot {
            attach_crops(&mut uncertain, screenshot, width, height);
        }

        info!(uncertain = uncertain.len(), "active learning session started");
        self.session.insert(ActiveLearningSession {
            uncertain_detections: uncertain,
            current_index: 0,
            responses: Vec::new(),
            started_at: Utc::now(),
        })
    }

    pub fn current(&self) -> Option<&UncertainDetection> {
        self.session.as_ref().and_then(ActiveLearningSession::current)
    }

    /// Advance without recording. No-op when idle or complete.
    pub fn skip(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.advance();
        }
    }

    /// Record a verification for the current detection and advance.
    ///
    /// Returns `false` without changing anything when there is no session or
    /// no current detection.
    pub fn submit_verification(&mut self, request: VerificationRequest) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(current) = session.current() else {
            return false;
        };

        if request.detection_id != current.id() {
            warn!(
                expected = current.id(),
                got = %request.detection_id,
                "verification for a detection that is not current"
            );
        }

        let response = VerificationResponse {
            detected_entity_id: current.id().to_string(),
            confidence: current.confidence(),
            detection_id: request.detection_id,
            is_correct: request.is_correct,
            corrected_entity_id: request.corrected_entity_id,
            recorded_at: Utc::now(),
        };
        session.responses.push(response);
        session.advance();
        true
    }

    /// Apply a user action to the current detection.
    pub fn handle_verification_action(&mut self, action: VerificationAction) -> ActionOutcome {
        let Some(current_id) = self.current().map(|c| c.id().to_string()) else {
            return ActionOutcome::Done;
        };

        match action {
            VerificationAction::Correct => {
                self.submit_verification(VerificationRequest {
                    detection_id: current_id,
                    is_correct: true,
                    corrected_entity_id: None,
                });
            }
            VerificationAction::Wrong => return ActionOutcome::Alternatives,
            VerificationAction::Skip => self.skip(),
            VerificationAction::Alternative(entity_id) => {
                self.submit_verification(VerificationRequest {
                    detection_id: current_id,
                    is_correct: false,
                    corrected_entity_id: Some(entity_id),
                });
            }
        }

        if self.current().is_some() { ActionOutcome::Next } else { ActionOutcome::Done }
    }

    /// Close the session, moving its responses into the verification log.
    pub fn end(&mut self) -> SessionStats {
        let Some(session) = self.session.take() else {
            return SessionStats::default();
        };
        let stats = session.stats();
        info!(
            reviewed = stats.total_reviewed,
            corrections = stats.corrections_added,
            skipped = stats.skipped,
            "active learning session ended"
        );
        self.log.extend(session.responses);
        stats
    }

    /// Responses of every ended session, oldest first.
    pub fn verification_log(&self) -> &[VerificationResponse] {
        &self.log
    }

    pub fn drain_verification_log(&mut self) -> Vec<VerificationResponse> {
        std::mem::take(&mut self.log)
    }
}

fn attach_crops(
    uncertain: &mut [UncertainDetection],
    screenshot: &RgbaImage,
    width: u32,
    height: u32,
) {
    let sx = if width == 0 { 1.0 } else { screenshot.width() as f64 / width as f64 };
    let sy = if height == 0 { 1.0 } else { screenshot.height() as f64 / height as f64 };

    for item in uncertain.iter_mut() {
        let Some(region) = item.detection.detection.position.as_ref() else {
            continue;
        };
        let Some(crop) = ImageUtils::crop(screenshot, &region.scaled(sx, sy)) else {
            continue;
        };
        match ImageUtils::to_data_url(&crop) {
            Ok(url) => item.crop_data_url = Some(url),
            Err(err) => debug!(error = %err, id = item.id(), "could not encode crop"),
        }
    }
}

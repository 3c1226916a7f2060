//! Human-in-the-loop review of low-confidence detections

pub mod render;
pub mod session;
pub mod uncertain;

pub use render::{render_active_learning_prompt, render_completion_message, render_uncertain_badge};
pub use session::{
    ActionOutcome, ActiveLearning, ActiveLearningSession, SessionState, SessionStats,
    VerificationAction, VerificationRequest, VerificationResponse,
};
pub use uncertain::{
    UncertainDetection, find_uncertain_detections, find_uncertain_with, should_prompt_for_learning,
};

//! Core motion analysis engine for GymformAI.
//!
//! Given the joints detected in each sampled frame of a workout video, the
//! engine derives per-frame biomechanical metrics, classifies the exercise
//! against a static template library and counts repetitions by extremum
//! detection. Everything here is synchronous and free of I/O; video decoding,
//! landmark detection and the text critique are external collaborators.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod critique;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod pose;
pub mod reps;

#[cfg(test)]
mod test_support;

pub use analysis::{analyze, AnalysisEngine, AnalysisReport};
pub use classifier::{classify, classify_with, score_template, Classification};
pub use config::{AnalysisConfig, AppConfig, SummaryConfig};
pub use critique::{
    CritiquePrompt, CritiqueValidation, FormCritique, KeypointSummary, SummaryFrame,
};
pub use error::{FormScoreError, Result};
pub use exercise::{
    AnglePair, AngleRange, ExerciseKind, ExerciseTemplate, MovementRange, VerticalSignal,
    TEMPLATES,
};
pub use geometry::{compute_metrics, joint_angle, Metrics};
pub use pose::{parse_detections, Frame, Joint, JointMap, JointName, Sequence};
pub use reps::{count_reps, count_reps_with, find_extrema, CountRule, CountUnit, ExtremumMode};

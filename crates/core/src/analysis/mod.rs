use serde::{Deserialize, Serialize};

use crate::{
    classifier::classify_with, exercise::TEMPLATES, reps, AnalysisConfig, Classification,
    CountUnit, ExerciseKind, ExerciseTemplate, Frame,
};

/// Result of analysing one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub exercise: ExerciseKind,
    /// Score of the best matching template, in [0, 1].
    pub confidence: f32,
    pub rep_count: u32,
    /// [`CountUnit::Seconds`] marks a hold duration rather than repetitions.
    pub count_unit: CountUnit,
    pub frame_count: usize,
}

impl AnalysisReport {
    fn empty() -> Self {
        Self {
            exercise: ExerciseKind::Unknown,
            confidence: 0.0,
            rep_count: 0,
            count_unit: CountUnit::Repetitions,
            frame_count: 0,
        }
    }

    /// `(rep_count, exercise_id)` as handed to the critique provider.
    pub fn as_tuple(&self) -> (u32, &'static str) {
        (self.rep_count, self.exercise.as_str())
    }
}

/// Synchronous facade that classifies a sequence and counts repetitions.
///
/// The engine holds only configuration and the template library, both
/// read-only, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    templates: &'static [ExerciseTemplate],
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Creates an engine with the default thresholds and template library.
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            templates: TEMPLATES,
        }
    }

    /// Swaps in a different template library.
    pub fn with_templates(mut self, templates: &'static [ExerciseTemplate]) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn templates(&self) -> &'static [ExerciseTemplate] {
        self.templates
    }

    pub fn classify(&self, frames: &[Frame]) -> Classification {
        classify_with(frames, self.templates, &self.config)
    }

    pub fn count_reps(&self, frames: &[Frame], exercise: ExerciseKind) -> u32 {
        reps::count_reps_with(frames, exercise, &self.config)
    }

    /// Classifies `frames` and counts repetitions for the detected exercise.
    /// Never fails; insufficient or unusable input yields an unknown exercise
    /// and a zero count.
    pub fn analyze(&self, frames: &[Frame]) -> AnalysisReport {
        if frames.is_empty() {
            tracing::debug!("empty sequence, skipping analysis");
            return AnalysisReport::empty();
        }

        let Classification {
            exercise,
            confidence,
        } = self.classify(frames);
        let rep_count = self.count_reps(frames, exercise);
        let count_unit = reps::rule_for(exercise).unit();

        tracing::info!(
            exercise = %exercise,
            confidence,
            rep_count,
            ?count_unit,
            frames = frames.len(),
            "analysis complete"
        );

        AnalysisReport {
            exercise,
            confidence,
            rep_count,
            count_unit,
            frame_count: frames.len(),
        }
    }
}

/// Analyses a sequence with default settings, returning
/// `(rep_count, exercise)`.
pub fn analyze(frames: &[Frame]) -> (u32, ExerciseKind) {
    let report = AnalysisEngine::new().analyze(frames);
    (report.rep_count, report.exercise)
}

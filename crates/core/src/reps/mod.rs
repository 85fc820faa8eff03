//! Repetition counting by extremum detection over a per-exercise signal.
//!
//! Each exercise maps to a [`CountRule`] in [`COUNT_RULES`]. Exercises without
//! a row use [`GENERIC_RULE`]. [`find_extrema`] itself knows nothing about
//! exercises.
//!
//! Known limitation: detection has no debounce or smoothing. A noisy signal
//! can register adjacent extrema as separate repetitions.

use serde::{Deserialize, Serialize};

use crate::{exercise::VerticalSignal, AnalysisConfig, ExerciseKind, Frame};

/// Which local extrema mark a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremumMode {
    /// Local maxima strictly above the threshold.
    Peak,
    /// Local minima strictly below the threshold.
    Valley,
}

/// Scalar series extracted from a sequence for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepSignal {
    /// Mean of both knee angles.
    KneeAngle,
    /// Mean of both elbow angles.
    ElbowAngle,
    /// Mean `y` of both hips.
    HipHeight,
}

impl RepSignal {
    /// Extracts the series, skipping frames that lack the inputs. Angle
    /// signals also skip degenerate (zero) angles.
    pub fn extract(self, frames: &[Frame]) -> Vec<f32> {
        frames
            .iter()
            .filter_map(|frame| {
                let metrics = frame.metrics();
                match self {
                    RepSignal::KneeAngle => {
                        bilateral_angle(metrics.left_knee_angle, metrics.right_knee_angle)
                    }
                    RepSignal::ElbowAngle => {
                        bilateral_angle(metrics.left_elbow_angle, metrics.right_elbow_angle)
                    }
                    RepSignal::HipHeight => VerticalSignal::HipCenter.sample(frame.joints()),
                }
            })
            .collect()
    }
}

fn bilateral_angle(left: Option<f32>, right: Option<f32>) -> Option<f32> {
    let (left, right) = (left?, right?);
    (left > 0.0 && right > 0.0).then(|| (left + right) / 2.0)
}

/// How an exercise turns a sequence into a count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CountRule {
    Extrema {
        signal: RepSignal,
        mode: ExtremumMode,
        threshold: f32,
    },
    /// Held positions report whole seconds instead of repetitions.
    Duration,
}

impl CountRule {
    pub fn unit(&self) -> CountUnit {
        match self {
            CountRule::Extrema { .. } => CountUnit::Repetitions,
            CountRule::Duration => CountUnit::Seconds,
        }
    }
}

/// What the number returned by the counter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountUnit {
    Repetitions,
    /// Duration pseudo-count for holds; not a repetition count.
    Seconds,
}

pub const GENERIC_RULE: CountRule = CountRule::Extrema {
    signal: RepSignal::HipHeight,
    mode: ExtremumMode::Peak,
    threshold: 0.1,
};

pub static COUNT_RULES: &[(ExerciseKind, CountRule)] = &[
    (
        ExerciseKind::Squat,
        CountRule::Extrema {
            signal: RepSignal::KneeAngle,
            mode: ExtremumMode::Peak,
            threshold: 120.0,
        },
    ),
    (
        ExerciseKind::PushUp,
        CountRule::Extrema {
            signal: RepSignal::ElbowAngle,
            mode: ExtremumMode::Peak,
            threshold: 90.0,
        },
    ),
    (
        ExerciseKind::Deadlift,
        CountRule::Extrema {
            signal: RepSignal::HipHeight,
            mode: ExtremumMode::Valley,
            threshold: 0.5,
        },
    ),
    (ExerciseKind::Plank, CountRule::Duration),
];

pub fn rule_for(kind: ExerciseKind) -> CountRule {
    COUNT_RULES
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, rule)| *rule)
        .unwrap_or(GENERIC_RULE)
}

/// Counts repetitions with default settings.
pub fn count_reps(frames: &[Frame], kind: ExerciseKind) -> u32 {
    count_reps_with(frames, kind, &AnalysisConfig::default())
}

pub fn count_reps_with(frames: &[Frame], kind: ExerciseKind, config: &AnalysisConfig) -> u32 {
    // Also covers holds: an empty sequence has no duration, so no `max(1, ..)`.
    if frames.is_empty() {
        return 0;
    }

    match rule_for(kind) {
        CountRule::Duration => hold_seconds(frames.len(), config.assumed_fps),
        CountRule::Extrema {
            signal,
            mode,
            threshold,
        } => {
            if frames.len() < config.min_frames {
                tracing::debug!(
                    exercise = %kind,
                    frames = frames.len(),
                    min_frames = config.min_frames,
                    "sequence too short to count"
                );
                return 0;
            }

            let series = signal.extract(frames);
            if series.len() < config.min_signal_points {
                tracing::debug!(
                    exercise = %kind,
                    points = series.len(),
                    min_points = config.min_signal_points,
                    "too few signal points to count"
                );
                return 0;
            }

            let count = find_extrema(&series, mode, threshold).len();
            u32::try_from(count).unwrap_or(u32::MAX)
        }
    }
}

/// `max(1, frames / fps)`, the whole seconds a hold lasted at the assumed
/// frame rate.
pub fn hold_seconds(frame_count: usize, fps: u32) -> u32 {
    let fps = fps.max(1) as usize;
    let seconds = u32::try_from(frame_count / fps).unwrap_or(u32::MAX);
    seconds.max(1)
}

/// Indices of strict interior extrema that also pass the threshold test.
pub fn find_extrema(signal: &[f32], mode: ExtremumMode, threshold: f32) -> Vec<usize> {
    signal
        .windows(3)
        .enumerate()
        .filter_map(|(offset, window)| {
            let (prev, value, next) = (window[0], window[1], window[2]);
            let hit = match mode {
                ExtremumMode::Peak => value > prev && value > next && value > threshold,
                ExtremumMode::Valley => value < prev && value < next && value < threshold,
            };
            hit.then_some(offset + 1)
        })
        .collect()
}

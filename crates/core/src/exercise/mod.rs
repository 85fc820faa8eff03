//! Exercise kinds and the static template library used for classification.
//!
//! Templates are plain data. Adding an exercise means adding a
//! [`ExerciseKind`] variant and a row to [`TEMPLATES`]; the scoring code in
//! [`crate::classifier`] never branches on a particular exercise.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{FormScoreError, Frame, JointMap, JointName, Metrics, Result};

/// Weight of the visibility sub-score.
pub const VISIBILITY_WEIGHT: f32 = 0.3;
/// Weight of each angle-range predicate.
pub const ANGLE_RANGE_WEIGHT: f32 = 0.3;
/// Weight of each movement-range predicate.
pub const MOVEMENT_WEIGHT: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    PushUp,
    Plank,
    Deadlift,
    Unknown,
}

impl ExerciseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::PushUp => "push_up",
            ExerciseKind::Plank => "plank",
            ExerciseKind::Deadlift => "deadlift",
            ExerciseKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = FormScoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "squat" => Ok(ExerciseKind::Squat),
            "push_up" | "push-up" | "pushup" => Ok(ExerciseKind::PushUp),
            "plank" => Ok(ExerciseKind::Plank),
            "deadlift" => Ok(ExerciseKind::Deadlift),
            "unknown" => Ok(ExerciseKind::Unknown),
            other => Err(FormScoreError::invalid(format!(
                "unknown exercise `{other}`"
            ))),
        }
    }
}

/// A bilateral pair of joint angles read from [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnglePair {
    Knees,
    Elbows,
}

impl AnglePair {
    /// Returns `(left, right)` when both sides were computed.
    pub fn values(self, metrics: &Metrics) -> Option<(f32, f32)> {
        let (left, right) = match self {
            AnglePair::Knees => (metrics.left_knee_angle, metrics.right_knee_angle),
            AnglePair::Elbows => (metrics.left_elbow_angle, metrics.right_elbow_angle),
        };
        Some((left?, right?))
    }
}

/// Vertical position of the midpoint of a bilateral joint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalSignal {
    HipCenter,
    ShoulderCenter,
}

impl VerticalSignal {
    pub fn joints(self) -> (JointName, JointName) {
        match self {
            VerticalSignal::HipCenter => (JointName::LeftHip, JointName::RightHip),
            VerticalSignal::ShoulderCenter => (JointName::LeftShoulder, JointName::RightShoulder),
        }
    }

    /// Mean `y` of the pair, or `None` if either joint is missing.
    pub fn sample(self, joints: &JointMap) -> Option<f32> {
        let (left, right) = self.joints();
        let left = joints.get(&left)?;
        let right = joints.get(&right)?;
        Some((left.y + right.y) / 2.0)
    }

    /// Samples every frame that has both joints, in order.
    pub fn series(self, frames: &[Frame]) -> Vec<f32> {
        frames
            .iter()
            .filter_map(|frame| self.sample(frame.joints()))
            .collect()
    }
}

/// Both angles of `pair` must lie within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngleRange {
    pub pair: AnglePair,
    pub min: f32,
    pub max: f32,
}

impl AngleRange {
    pub fn matches(&self, metrics: &Metrics) -> bool {
        let range = self.min..=self.max;
        self.pair
            .values(metrics)
            .map(|(left, right)| range.contains(&left) && range.contains(&right))
            .unwrap_or(false)
    }
}

/// The signal should travel at least `threshold` over the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovementRange {
    pub signal: VerticalSignal,
    pub threshold: f32,
}

/// Immutable description of how an exercise should look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExerciseTemplate {
    pub kind: ExerciseKind,
    pub required_joints: &'static [JointName],
    pub angle_ranges: &'static [AngleRange],
    pub movement_ranges: &'static [MovementRange],
}

impl ExerciseTemplate {
    /// Highest score this template can reach before clamping to 1.0.
    pub fn max_score(&self) -> f32 {
        let raw = VISIBILITY_WEIGHT
            + ANGLE_RANGE_WEIGHT * self.angle_ranges.len() as f32
            + MOVEMENT_WEIGHT * self.movement_ranges.len() as f32;
        raw.min(1.0)
    }
}

/// Templates in tie-break order: on equal scores the earlier row wins.
pub static TEMPLATES: &[ExerciseTemplate] = &[
    ExerciseTemplate {
        kind: ExerciseKind::Squat,
        required_joints: &[
            JointName::LeftKnee,
            JointName::RightKnee,
            JointName::LeftHip,
            JointName::RightHip,
        ],
        angle_ranges: &[AngleRange {
            pair: AnglePair::Knees,
            min: 60.0,
            max: 160.0,
        }],
        movement_ranges: &[MovementRange {
            signal: VerticalSignal::HipCenter,
            threshold: 0.1,
        }],
    },
    ExerciseTemplate {
        kind: ExerciseKind::PushUp,
        required_joints: &[
            JointName::LeftElbow,
            JointName::RightElbow,
            JointName::LeftShoulder,
            JointName::RightShoulder,
        ],
        angle_ranges: &[AngleRange {
            pair: AnglePair::Elbows,
            min: 60.0,
            max: 160.0,
        }],
        movement_ranges: &[MovementRange {
            signal: VerticalSignal::ShoulderCenter,
            threshold: 0.05,
        }],
    },
    // Scored on visibility alone, so it never clears the acceptance threshold.
    ExerciseTemplate {
        kind: ExerciseKind::Plank,
        required_joints: &[
            JointName::LeftShoulder,
            JointName::RightShoulder,
            JointName::LeftHip,
            JointName::RightHip,
        ],
        angle_ranges: &[],
        movement_ranges: &[],
    },
    ExerciseTemplate {
        kind: ExerciseKind::Deadlift,
        required_joints: &[
            JointName::LeftHip,
            JointName::RightHip,
            JointName::LeftKnee,
            JointName::RightKnee,
        ],
        angle_ranges: &[AngleRange {
            pair: AnglePair::Knees,
            min: 80.0,
            max: 170.0,
        }],
        movement_ranges: &[MovementRange {
            signal: VerticalSignal::HipCenter,
            threshold: 0.15,
        }],
    },
];

/// Looks up the built-in template for `kind`.
pub fn template_for(kind: ExerciseKind) -> Option<&'static ExerciseTemplate> {
    TEMPLATES.iter().find(|template| template.kind == kind)
}

//! Scores a frame sequence against the exercise template library.

use serde::{Deserialize, Serialize};

use crate::{
    exercise::{ANGLE_RANGE_WEIGHT, MOVEMENT_WEIGHT, TEMPLATES, VISIBILITY_WEIGHT},
    AnalysisConfig, AngleRange, ExerciseKind, ExerciseTemplate, Frame, MovementRange,
};

/// Outcome of classifying one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub exercise: ExerciseKind,
    /// Score of the best template in [0, 1], reported even when the result
    /// is [`ExerciseKind::Unknown`].
    pub confidence: f32,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            exercise: ExerciseKind::Unknown,
            confidence: 0.0,
        }
    }
}

/// Classifies `frames` against the built-in library with default settings.
pub fn classify(frames: &[Frame]) -> Classification {
    classify_with(frames, TEMPLATES, &AnalysisConfig::default())
}

/// Classifies `frames` against `templates`.
///
/// The highest score wins; ties go to the template declared first. A winner
/// scoring at or below `config.acceptance_threshold` is reported as unknown.
pub fn classify_with(
    frames: &[Frame],
    templates: &[ExerciseTemplate],
    config: &AnalysisConfig,
) -> Classification {
    let mut best: Option<(ExerciseKind, f32)> = None;

    for template in templates {
        let score = score_template(frames, template, config.visibility_floor);
        tracing::debug!(exercise = %template.kind, score, "template score");

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((template.kind, score));
        }
    }

    let Some((exercise, confidence)) = best else {
        return Classification::unknown();
    };

    if confidence > config.acceptance_threshold {
        Classification {
            exercise,
            confidence,
        }
    } else {
        tracing::debug!(
            candidate = %exercise,
            confidence,
            threshold = config.acceptance_threshold,
            "no template cleared the acceptance threshold"
        );
        Classification {
            exercise: ExerciseKind::Unknown,
            confidence,
        }
    }
}

/// Total score of one template over the sequence, clamped to [0, 1].
pub fn score_template(
    frames: &[Frame],
    template: &ExerciseTemplate,
    visibility_floor: f32,
) -> f32 {
    if frames.is_empty() {
        return 0.0;
    }

    let mut score = visibility_score(frames, template, visibility_floor) * VISIBILITY_WEIGHT;

    for range in template.angle_ranges {
        score += angle_range_score(frames, range) * ANGLE_RANGE_WEIGHT;
    }

    for range in template.movement_ranges {
        score += movement_score(frames, range) * MOVEMENT_WEIGHT;
    }

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Fraction of frames in which every required joint is visible.
fn visibility_score(frames: &[Frame], template: &ExerciseTemplate, floor: f32) -> f32 {
    let visible = frames
        .iter()
        .filter(|frame| {
            template.required_joints.iter().all(|name| {
                frame
                    .joint(*name)
                    .map(|joint| joint.is_visible(floor))
                    .unwrap_or(false)
            })
        })
        .count();

    visible as f32 / frames.len() as f32
}

/// Fraction of frames whose angle pair sits inside the range. Frames without
/// both angles count against the template.
fn angle_range_score(frames: &[Frame], range: &AngleRange) -> f32 {
    let matching = frames
        .iter()
        .filter(|frame| range.matches(frame.metrics()))
        .count();

    matching as f32 / frames.len() as f32
}

/// Travel of the signal relative to the expected threshold, capped at 1.
fn movement_score(frames: &[Frame], range: &MovementRange) -> f32 {
    let series = range.signal.series(frames);
    if series.len() < 2 || range.threshold <= 0.0 {
        return 0.0;
    }

    let (min, max) = series
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        });

    ((max - min) / range.threshold).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exercise::{template_for, AnglePair, VerticalSignal},
        test_support::{squat_sequence, standing_frame},
        JointName,
    };

    #[test]
    fn empty_sequence_is_unknown() {
        let result = classify(&[]);
        assert_eq!(result.exercise, ExerciseKind::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn oscillating_knees_classify_as_squat() {
        let frames = squat_sequence(30, 1.0);
        let result = classify(&frames);

        assert_eq!(result.exercise, ExerciseKind::Squat);
        assert!(result.confidence > 0.6);
    }

    #[test]
    fn invisible_joints_fall_back_to_unknown() {
        let frames = squat_sequence(30, 0.0);
        let result = classify(&frames);

        assert_eq!(result.exercise, ExerciseKind::Unknown);
        assert!(result.confidence <= 0.6);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let sequences = [
            squat_sequence(30, 1.0),
            squat_sequence(30, 0.0),
            squat_sequence(3, 0.7),
            (0..12).map(|i| standing_frame(i, 1.0)).collect(),
        ];

        for frames in &sequences {
            for template in TEMPLATES {
                let score = score_template(frames, template, 0.5);
                assert!((0.0..=1.0).contains(&score), "{} scored {score}", template.kind);
            }
        }
    }

    #[test]
    fn stacked_predicates_are_clamped() {
        static HEAVY: ExerciseTemplate = ExerciseTemplate {
            kind: ExerciseKind::Squat,
            required_joints: &[JointName::LeftHip, JointName::RightHip],
            angle_ranges: &[
                AngleRange {
                    pair: AnglePair::Knees,
                    min: 0.0,
                    max: 180.0,
                },
                AngleRange {
                    pair: AnglePair::Knees,
                    min: 0.0,
                    max: 180.0,
                },
                AngleRange {
                    pair: AnglePair::Knees,
                    min: 0.0,
                    max: 180.0,
                },
            ],
            movement_ranges: &[MovementRange {
                signal: VerticalSignal::HipCenter,
                threshold: 0.01,
            }],
        };

        let frames = squat_sequence(20, 1.0);
        assert_eq!(score_template(&frames, &HEAVY, 0.5), 1.0);
    }

    #[test]
    fn ties_go_to_the_first_declared_template() {
        let squat = *template_for(ExerciseKind::Squat).unwrap();
        let deadlift = ExerciseTemplate {
            kind: ExerciseKind::Deadlift,
            ..squat
        };
        let frames = squat_sequence(30, 1.0);
        let config = AnalysisConfig::default();

        let forward = classify_with(&frames, &[squat, deadlift], &config);
        let reversed = classify_with(&frames, &[deadlift, squat], &config);

        assert_eq!(forward.exercise, ExerciseKind::Squat);
        assert_eq!(reversed.exercise, ExerciseKind::Deadlift);
        assert_eq!(forward.confidence, reversed.confidence);
    }

    #[test]
    fn acceptance_threshold_is_exclusive() {
        let frames = squat_sequence(30, 1.0);
        let squat = template_for(ExerciseKind::Squat).unwrap();
        let score = score_template(&frames, squat, 0.5);

        let config = AnalysisConfig {
            acceptance_threshold: score,
            ..Default::default()
        };
        let result = classify_with(&frames, TEMPLATES, &config);
        assert_eq!(result.exercise, ExerciseKind::Unknown);
        assert_eq!(result.confidence, score);
    }

    #[test]
    fn stationary_signal_earns_no_movement_credit() {
        let frames: Vec<Frame> = (0..12).map(|i| standing_frame(i, 1.0)).collect();
        let range = MovementRange {
            signal: VerticalSignal::HipCenter,
            threshold: 0.1,
        };
        assert_eq!(movement_score(&frames, &range), 0.0);
        assert_eq!(movement_score(&frames[..1], &range), 0.0);
    }
}

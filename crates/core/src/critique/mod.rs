//! Data exchanged with the generative-text critique provider.
//!
//! The provider itself lives outside this crate. These helpers down-sample a
//! sequence into a compact joint summary for the prompt, validate the JSON
//! the provider returns, and supply the canned critique used when it fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ExerciseKind, FormScoreError, Frame, Joint, JointName, Result, SummaryConfig};

/// Limb joints included in the summary.
pub const SUMMARY_JOINTS: [JointName; 12] = [
    JointName::LeftShoulder,
    JointName::RightShoulder,
    JointName::LeftElbow,
    JointName::RightElbow,
    JointName::LeftWrist,
    JointName::RightWrist,
    JointName::LeftHip,
    JointName::RightHip,
    JointName::LeftKnee,
    JointName::RightKnee,
    JointName::LeftAnkle,
    JointName::RightAnkle,
];

const MAX_FINDINGS: usize = 2;
const MIN_SCORE: f32 = 1.0;
const MAX_SCORE: f32 = 10.0;

const COACH_PROMPT: &str = "You are GymformAI, an expert fitness coach analyzing workout videos. \
You have extensive knowledge of exercise form, biomechanics, and common form issues.

Your task is to analyze the provided pose keypoints data and provide:
1. A form score from 1-10 (where 10 is perfect form)
2. 2 main posture/form issues detected
3. 1 specific correction for each issue
4. Validate the detected exercise type and rep count

Be specific, actionable, and professional in your feedback. Focus on the most critical form \
issues that could lead to injury or reduce exercise effectiveness.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFrame {
    pub frame: usize,
    /// Every summary joint; `None` where it was not detected.
    pub joints: BTreeMap<JointName, Option<Joint>>,
}

/// Down-sampled joint positions handed to the critique provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeypointSummary {
    pub frames: Vec<SummaryFrame>,
}

impl KeypointSummary {
    pub fn from_frames(frames: &[Frame], config: &SummaryConfig) -> Self {
        let frames = frames
            .iter()
            .step_by(config.stride.max(1))
            .take(config.max_frames)
            .map(|frame| SummaryFrame {
                frame: frame.index(),
                joints: SUMMARY_JOINTS
                    .iter()
                    .map(|name| (*name, frame.joint(*name).copied()))
                    .collect(),
            })
            .collect();

        Self { frames }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Chat messages sent to the critique provider for one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiquePrompt {
    pub system: String,
    pub user: String,
}

impl CritiquePrompt {
    /// Embeds the summary and the engine's verdict in the user message, along
    /// with the reply format [`FormCritique::parse`] accepts.
    pub fn new(summary: &KeypointSummary, exercise: ExerciseKind, rep_count: u32) -> Result<Self> {
        let keypoints = summary.to_json()?;
        let exercise = exercise.as_str();

        let user = format!(
            r#"Here are the detected body keypoints for frames (JSON):
{keypoints}

The exercise is: {exercise}
The detected number of reps is: {rep_count}

Please analyze this data and provide:
- Diagnose 2 main posture/form issues
- Give 1 specific correction per issue
- Score the form (1-10)
- Validate if the exercise type and rep count seem accurate

Output your response as JSON in this exact format:
{{
  "exercise": "{exercise}",
  "score": 7.5,
  "risks": ["Issue 1 description", "Issue 2 description"],
  "corrections": ["Correction 1", "Correction 2"],
  "rep_count": {rep_count},
  "validation": {{
    "exercise_type_accurate": true,
    "rep_count_accurate": true,
    "confidence": 0.85
  }}
}}"#
        );

        Ok(Self {
            system: COACH_PROMPT.to_string(),
            user,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueValidation {
    pub exercise_type_accurate: bool,
    pub rep_count_accurate: bool,
    pub confidence: f32,
}

/// Form assessment returned by the critique provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormCritique {
    pub exercise: String,
    /// Form score in [1, 10].
    pub score: f32,
    pub risks: Vec<String>,
    pub corrections: Vec<String>,
    pub rep_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<CritiqueValidation>,
}

/// Wire shape before validation. List fields may arrive as a bare string and
/// numeric fields as a number or a numeric string.
#[derive(Deserialize)]
struct RawCritique {
    exercise: Option<String>,
    score: Option<serde_json::Value>,
    risks: Option<OneOrMany>,
    corrections: Option<OneOrMany>,
    rep_count: Option<serde_json::Value>,
    #[serde(default)]
    validation: Option<CritiqueValidation>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

impl OneOrMany {
    fn into_findings(self) -> Vec<String> {
        let mut items = match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        };
        items.truncate(MAX_FINDINGS);
        items
    }
}

fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Whole, non-negative counts only; `3.0` is accepted, `2.5` is not.
fn as_count(value: &serde_json::Value) -> Option<u32> {
    let count = as_number(value)?;
    if count.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&count) {
        return None;
    }
    Some(count as u32)
}

impl FormCritique {
    /// Parses the provider's reply. The reply may wrap the JSON object in
    /// prose; the outermost `{ ... }` is used.
    pub fn parse(response: &str) -> Result<Self> {
        let start = response.find('{');
        let end = response.rfind('}');
        let body = match (start, end) {
            (Some(start), Some(end)) if start < end => &response[start..=end],
            _ => return Err(FormScoreError::invalid("no JSON object in critique response")),
        };

        let raw: RawCritique = serde_json::from_str(body)?;
        let missing =
            |field: &str| FormScoreError::invalid(format!("critique is missing `{field}`"));

        let score = raw.score.ok_or_else(|| missing("score"))?;
        let score = as_number(&score)
            .map(|score| score as f32)
            .filter(|score| score.is_finite())
            .ok_or_else(|| FormScoreError::invalid("critique score is not a number"))?;

        let rep_count = raw.rep_count.ok_or_else(|| missing("rep_count"))?;
        let rep_count = as_count(&rep_count).ok_or_else(|| {
            FormScoreError::invalid("critique rep_count is not a whole number")
        })?;

        Ok(Self {
            exercise: raw.exercise.ok_or_else(|| missing("exercise"))?,
            score: score.clamp(MIN_SCORE, MAX_SCORE),
            risks: raw.risks.ok_or_else(|| missing("risks"))?.into_findings(),
            corrections: raw
                .corrections
                .ok_or_else(|| missing("corrections"))?
                .into_findings(),
            rep_count,
            validation: raw.validation,
        })
    }

    /// Canned critique used when the provider is unavailable or its reply
    /// cannot be parsed.
    pub fn fallback(exercise: ExerciseKind, rep_count: u32) -> Self {
        tracing::warn!(exercise = %exercise, "using fallback critique");

        Self {
            exercise: exercise.as_str().to_string(),
            score: 6.0,
            risks: vec![
                "Unable to analyze form due to technical issues".to_string(),
                "Please ensure good lighting and clear video for better analysis".to_string(),
            ],
            corrections: vec![
                "Record video in well-lit environment".to_string(),
                "Ensure full body is visible in frame".to_string(),
            ],
            rep_count,
            validation: Some(CritiqueValidation {
                exercise_type_accurate: true,
                rep_count_accurate: true,
                confidence: 0.5,
            }),
        }
    }

    /// Parses `response`, falling back to the canned critique on failure.
    pub fn parse_or_fallback(response: &str, exercise: ExerciseKind, rep_count: u32) -> Self {
        match Self::parse(response) {
            Ok(critique) => critique,
            Err(err) => {
                tracing::warn!(error = %err, "critique response rejected");
                Self::fallback(exercise, rep_count)
            }
        }
    }
}

//! Pose data model: named joints, frames and ordered frame sequences.
//!
//! Frames are produced from the landmark provider's per-frame detections.
//! Derived [`Metrics`] are computed exactly once when a [`Frame`] is built and
//! can only be read afterwards.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{geometry::compute_metrics, FormScoreError, Metrics, Result};

/// Landmarks emitted by the pose provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl JointName {
    pub const ALL: [JointName; 21] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
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
        JointName::LeftHeel,
        JointName::RightHeel,
        JointName::LeftFootIndex,
        JointName::RightFootIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JointName::Nose => "nose",
            JointName::LeftEye => "left_eye",
            JointName::RightEye => "right_eye",
            JointName::LeftEar => "left_ear",
            JointName::RightEar => "right_ear",
            JointName::LeftShoulder => "left_shoulder",
            JointName::RightShoulder => "right_shoulder",
            JointName::LeftElbow => "left_elbow",
            JointName::RightElbow => "right_elbow",
            JointName::LeftWrist => "left_wrist",
            JointName::RightWrist => "right_wrist",
            JointName::LeftHip => "left_hip",
            JointName::RightHip => "right_hip",
            JointName::LeftKnee => "left_knee",
            JointName::RightKnee => "right_knee",
            JointName::LeftAnkle => "left_ankle",
            JointName::RightAnkle => "right_ankle",
            JointName::LeftHeel => "left_heel",
            JointName::RightHeel => "right_heel",
            JointName::LeftFootIndex => "left_foot_index",
            JointName::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JointName {
    type Err = FormScoreError;

    fn from_str(s: &str) -> Result<Self> {
        JointName::ALL
            .into_iter()
            .find(|joint| joint.as_str() == s)
            .ok_or_else(|| FormScoreError::invalid(format!("unknown joint `{s}`")))
    }
}

/// A single detected landmark in normalised image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    /// Detection confidence in [0, 1].
    #[serde(default)]
    pub visibility: f32,
}

impl Joint {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility,
        }
    }

    pub fn is_visible(&self, floor: f32) -> bool {
        self.visibility > floor
    }
}

/// Joints detected in one frame. Keys are not guaranteed to be present.
pub type JointMap = BTreeMap<JointName, Joint>;

/// One time-sampled observation with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    index: usize,
    timestamp: f32,
    joints: JointMap,
    metrics: Metrics,
}

impl Frame {
    pub fn new(index: usize, timestamp: f32, joints: JointMap) -> Self {
        let metrics = compute_metrics(&joints);
        Self {
            index,
            timestamp,
            joints,
            metrics,
        }
    }

    /// Position of the frame in the original (sampled) video.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Normalised position in the video, `index / total_frames`.
    pub fn timestamp(&self) -> f32 {
        self.timestamp
    }

    pub fn joints(&self) -> &JointMap {
        &self.joints
    }

    pub fn joint(&self, name: JointName) -> Option<&Joint> {
        self.joints.get(&name)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Temporally ordered frames for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sequence {
    frames: Vec<Frame>,
}

impl Sequence {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Builds a sequence from per-frame detections, where `None` is the
    /// provider's "no pose detected" result. Missed frames are dropped but
    /// still count toward the timestamp denominator, so surviving frames keep
    /// their position in the video.
    pub fn from_detections(detections: Vec<Option<JointMap>>) -> Self {
        let total = detections.len();
        let frames: Vec<Frame> = detections
            .into_iter()
            .enumerate()
            .filter_map(|(index, detection)| {
                let joints = detection.filter(|joints| !joints.is_empty())?;
                Some(Frame::new(index, index as f32 / total as f32, joints))
            })
            .collect();

        tracing::debug!(
            detections = total,
            frames = frames.len(),
            "built pose sequence"
        );
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decodes the landmark provider's output: a JSON array with one element per
/// sampled video frame, each either `null` or an object mapping landmark
/// names to joints. Entries that are not a known landmark with a joint-shaped
/// value (such as a provider-side `metrics` object) are ignored.
pub fn parse_detections(json: &str) -> Result<Vec<Option<JointMap>>> {
    let raw: Vec<Option<BTreeMap<String, serde_json::Value>>> = serde_json::from_str(json)?;

    let detections = raw
        .into_iter()
        .map(|detection| {
            detection.map(|entries| {
                entries
                    .into_iter()
                    .filter_map(|(name, value)| decode_joint(&name, value))
                    .collect()
            })
        })
        .collect();

    Ok(detections)
}

fn decode_joint(name: &str, value: serde_json::Value) -> Option<(JointName, Joint)> {
    let Ok(joint_name) = name.parse::<JointName>() else {
        tracing::debug!(landmark = %name, "skipping unsupported landmark");
        return None;
    };

    match serde_json::from_value::<Joint>(value) {
        Ok(joint) => Some((joint_name, joint)),
        Err(err) => {
            tracing::debug!(landmark = %name, error = %err, "skipping malformed landmark");
            None
        }
    }
}

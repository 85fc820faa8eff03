//! Per-frame biomechanical features derived from a single [`JointMap`].
//!
//! All computations use the 2-D projected image plane; `z` is ignored.

use serde::{Deserialize, Serialize};

use crate::{Joint, JointMap, JointName};

/// Scalar features of one frame. A field is `None` when the joints it needs
/// were not detected; that is distinct from a computed zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoulder_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hip_width: Option<f32>,
    /// Degrees, from `atan2(dx, dy)` of the hip-center to shoulder-center
    /// vector. Image y grows downward, so an upright torso reads near ±180.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spine_angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_knee_angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_knee_angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_elbow_angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_elbow_angle: Option<f32>,
    /// Mean visibility over every joint present in the frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f32>,
}

/// Computes the metrics for one frame.
pub fn compute_metrics(joints: &JointMap) -> Metrics {
    let get = |name: JointName| joints.get(&name);

    let left_shoulder = get(JointName::LeftShoulder);
    let right_shoulder = get(JointName::RightShoulder);
    let left_hip = get(JointName::LeftHip);
    let right_hip = get(JointName::RightHip);

    Metrics {
        shoulder_width: pair(left_shoulder, right_shoulder).map(|(a, b)| planar_distance(a, b)),
        hip_width: pair(left_hip, right_hip).map(|(a, b)| planar_distance(a, b)),
        spine_angle: match (left_shoulder, right_shoulder, left_hip, right_hip) {
            (Some(ls), Some(rs), Some(lh), Some(rh)) => Some(spine_angle(ls, rs, lh, rh)),
            _ => None,
        },
        left_knee_angle: vertex_angle(
            joints,
            JointName::LeftHip,
            JointName::LeftKnee,
            JointName::LeftAnkle,
        ),
        right_knee_angle: vertex_angle(
            joints,
            JointName::RightHip,
            JointName::RightKnee,
            JointName::RightAnkle,
        ),
        left_elbow_angle: vertex_angle(
            joints,
            JointName::LeftShoulder,
            JointName::LeftElbow,
            JointName::LeftWrist,
        ),
        right_elbow_angle: vertex_angle(
            joints,
            JointName::RightShoulder,
            JointName::RightElbow,
            JointName::RightWrist,
        ),
        overall_confidence: mean(joints.values().map(|joint| joint.visibility)),
    }
}

/// Euclidean distance between two joints in the image plane.
pub fn planar_distance(a: &Joint, b: &Joint) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Tilt of the torso in degrees, measured from the hip center to the
/// shoulder center.
pub fn spine_angle(
    left_shoulder: &Joint,
    right_shoulder: &Joint,
    left_hip: &Joint,
    right_hip: &Joint,
) -> f32 {
    let shoulder_x = (left_shoulder.x + right_shoulder.x) / 2.0;
    let shoulder_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let hip_x = (left_hip.x + right_hip.x) / 2.0;
    let hip_y = (left_hip.y + right_hip.y) / 2.0;

    (shoulder_x - hip_x).atan2(shoulder_y - hip_y).to_degrees()
}

/// Angle in degrees at `vertex` between the segments to `proximal` and
/// `distal`. Returns `0.0` when either segment has zero length.
pub fn joint_angle(proximal: &Joint, vertex: &Joint, distal: &Joint) -> f32 {
    let v1 = (proximal.x - vertex.x, proximal.y - vertex.y);
    let v2 = (distal.x - vertex.x, distal.y - vertex.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 > 0.0 && mag2 > 0.0 {
        let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
        cos_angle.acos().to_degrees()
    } else {
        0.0
    }
}

fn vertex_angle(
    joints: &JointMap,
    proximal: JointName,
    vertex: JointName,
    distal: JointName,
) -> Option<f32> {
    Some(joint_angle(
        joints.get(&proximal)?,
        joints.get(&vertex)?,
        joints.get(&distal)?,
    ))
}

fn pair<'a>(a: Option<&'a Joint>, b: Option<&'a Joint>) -> Option<(&'a Joint, &'a Joint)> {
    Some((a?, b?))
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0_f32, 0_usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    (count > 0).then(|| sum / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Joint {
        Joint::new(x, y, 1.0)
    }

    #[test]
    fn perpendicular_segments_form_right_angle() {
        let vertex = at(0.3, 0.4);
        let angle = joint_angle(&at(0.3, 0.1), &vertex, &at(0.7, 0.4));
        assert!((angle - 90.0).abs() < 1e-3);

        let angle = joint_angle(&at(0.5, 0.6), &at(0.4, 0.5), &at(0.3, 0.6));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn straight_limb_is_180_degrees() {
        let angle = joint_angle(&at(0.5, 0.2), &at(0.5, 0.5), &at(0.5, 0.8));
        assert!((angle - 180.0).abs() < 0.1);
    }

    #[test]
    fn angle_is_symmetric() {
        let points = [
            (at(0.1, 0.2), at(0.4, 0.4), at(0.9, 0.3)),
            (at(0.5, 0.5), at(0.2, 0.8), at(0.25, 0.1)),
            (at(0.0, 0.0), at(1.0, 1.0), at(0.3, 0.9)),
        ];

        for (a, v, b) in points {
            assert_eq!(joint_angle(&a, &v, &b), joint_angle(&b, &v, &a));
        }
    }

    #[test]
    fn coincident_points_yield_zero_angle() {
        let vertex = at(0.5, 0.5);
        assert_eq!(joint_angle(&vertex, &vertex, &at(0.9, 0.1)), 0.0);
        assert_eq!(joint_angle(&at(0.9, 0.1), &vertex, &vertex), 0.0);
    }

    #[test]
    fn missing_joints_leave_metrics_absent() {
        let mut joints = JointMap::new();
        joints.insert(JointName::LeftHip, at(0.4, 0.6));
        joints.insert(JointName::LeftKnee, at(0.4, 0.75));
        joints.insert(JointName::LeftAnkle, at(0.4, 0.9));
        joints.insert(JointName::RightHip, at(0.6, 0.6));

        let metrics = compute_metrics(&joints);
        assert!((metrics.left_knee_angle.unwrap() - 180.0).abs() < 0.1);
        assert!(metrics.right_knee_angle.is_none());
        assert!(metrics.left_elbow_angle.is_none());
        assert!(metrics.shoulder_width.is_none());
        assert!(metrics.spine_angle.is_none());
        assert!((metrics.hip_width.unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn empty_frame_computes_nothing() {
        assert_eq!(compute_metrics(&JointMap::new()), Metrics::default());
    }

    #[test]
    fn overall_confidence_averages_every_present_joint() {
        let mut joints = JointMap::new();
        joints.insert(JointName::Nose, Joint::new(0.5, 0.1, 0.2));
        joints.insert(JointName::LeftHeel, Joint::new(0.4, 0.95, 0.6));
        joints.insert(JointName::RightHeel, Joint::new(0.6, 0.95, 1.0));

        let confidence = compute_metrics(&joints).overall_confidence.unwrap();
        assert!((confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn spine_angle_uses_hip_to_shoulder_vector() {
        // Torso leaning right by 45 degrees in image space, shoulders below hips.
        let angle = spine_angle(&at(0.5, 0.5), &at(0.7, 0.5), &at(0.4, 0.4), &at(0.6, 0.4));
        assert!((angle - 45.0).abs() < 1e-3);

        // Upright torso: shoulders above hips.
        let angle = spine_angle(&at(0.4, 0.3), &at(0.6, 0.3), &at(0.4, 0.6), &at(0.6, 0.6));
        assert!((angle.abs() - 180.0).abs() < 0.1);
    }

    #[test]
    fn absent_metrics_are_not_serialised() {
        let metrics = Metrics {
            hip_width: Some(0.25),
            ..Default::default()
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(json, r#"{"hip_width":0.25}"#);
    }
}

//! Synthetic pose builders shared by the unit tests.

use std::f32::consts::PI;

use crate::{Frame, Joint, JointMap, JointName};

const THIGH: f32 = 0.2;
const TORSO: f32 = 0.3;
const ARM_SEGMENT: f32 = 0.15;

/// Knee angle of the synthetic squat at `index`: swings 70..150 degrees
/// with a period of ten frames, bottoming out on multiples of ten.
pub fn squat_knee_angle(index: usize) -> f32 {
    110.0 - 40.0 * (2.0 * PI * index as f32 / 10.0).cos()
}

/// Side-on figure with both knees bent to `knee_angle`. Shins are vertical,
/// the thigh pivots at the knee, the torso sits upright on the hips and the
/// arms hang straight.
pub fn pose_joints(knee_angle: f32, visibility: f32) -> JointMap {
    let theta = knee_angle.to_radians();
    let mut joints = JointMap::new();

    for (side_x, hip, knee, ankle, shoulder, elbow, wrist) in [
        (
            0.4,
            JointName::LeftHip,
            JointName::LeftKnee,
            JointName::LeftAnkle,
            JointName::LeftShoulder,
            JointName::LeftElbow,
            JointName::LeftWrist,
        ),
        (
            0.6,
            JointName::RightHip,
            JointName::RightKnee,
            JointName::RightAnkle,
            JointName::RightShoulder,
            JointName::RightElbow,
            JointName::RightWrist,
        ),
    ] {
        let knee_y = 0.7;
        let hip_x = side_x + THIGH * theta.sin();
        let hip_y = knee_y + THIGH * theta.cos();
        let shoulder_y = hip_y - TORSO;

        joints.insert(ankle, Joint::new(side_x, knee_y + THIGH, visibility));
        joints.insert(knee, Joint::new(side_x, knee_y, visibility));
        joints.insert(hip, Joint::new(hip_x, hip_y, visibility));
        joints.insert(shoulder, Joint::new(hip_x, shoulder_y, visibility));
        joints.insert(elbow, Joint::new(hip_x, shoulder_y + ARM_SEGMENT, visibility));
        joints.insert(
            wrist,
            Joint::new(hip_x, shoulder_y + 2.0 * ARM_SEGMENT, visibility),
        );
    }

    joints
}

pub fn squat_sequence(len: usize, visibility: f32) -> Vec<Frame> {
    (0..len)
        .map(|index| {
            Frame::new(
                index,
                index as f32 / len as f32,
                pose_joints(squat_knee_angle(index), visibility),
            )
        })
        .collect()
}

/// Motionless, straight-legged figure.
pub fn standing_frame(index: usize, visibility: f32) -> Frame {
    Frame::new(index, 0.0, pose_joints(180.0, visibility))
}

/// Frames carrying only the two hips at the given heights.
pub fn hip_height_sequence(heights: &[f32]) -> Vec<Frame> {
    heights
        .iter()
        .enumerate()
        .map(|(index, &y)| {
            let mut joints = JointMap::new();
            joints.insert(JointName::LeftHip, Joint::new(0.45, y, 1.0));
            joints.insert(JointName::RightHip, Joint::new(0.55, y, 1.0));
            Frame::new(index, index as f32 / heights.len() as f32, joints)
        })
        .collect()
}

/// Both elbows bent to `elbow_angle` under fixed shoulders; no lower body.
pub fn arm_joints(elbow_angle: f32, visibility: f32) -> JointMap {
    let theta = elbow_angle.to_radians();
    let mut joints = JointMap::new();

    for (side_x, shoulder, elbow, wrist) in [
        (
            0.4,
            JointName::LeftShoulder,
            JointName::LeftElbow,
            JointName::LeftWrist,
        ),
        (
            0.6,
            JointName::RightShoulder,
            JointName::RightElbow,
            JointName::RightWrist,
        ),
    ] {
        let elbow_y = 0.3 + ARM_SEGMENT;
        joints.insert(shoulder, Joint::new(side_x, 0.3, visibility));
        joints.insert(elbow, Joint::new(side_x, elbow_y, visibility));
        joints.insert(
            wrist,
            Joint::new(
                side_x + ARM_SEGMENT * theta.sin(),
                elbow_y - ARM_SEGMENT * theta.cos(),
                visibility,
            ),
        );
    }

    joints
}

/// Elbows swinging 70..150 degrees on the same ten-frame cycle as the squat.
pub fn push_up_sequence(len: usize) -> Vec<Frame> {
    (0..len)
        .map(|index| {
            Frame::new(
                index,
                index as f32 / len as f32,
                arm_joints(squat_knee_angle(index), 1.0),
            )
        })
        .collect()
}

/// Rebuilds `frame` with both hips collapsed onto the knees, leaving the
/// knee angles degenerate (0 degrees).
pub fn collapse_hips(frame: &Frame) -> Frame {
    let mut joints = frame.joints().clone();
    for (hip, knee) in [
        (JointName::LeftHip, JointName::LeftKnee),
        (JointName::RightHip, JointName::RightKnee),
    ] {
        if let Some(knee) = joints.get(&knee).copied() {
            joints.insert(hip, knee);
        }
    }
    Frame::new(frame.index(), frame.timestamp(), joints)
}

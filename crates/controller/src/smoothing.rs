//! Per-frame convergence of the entity's local pose toward a desired pose.

use bevy::prelude::*;

/// Blend rate applied per second of frame delta.
pub const LERP_RATE: f32 = 12.0;

/// Remaining distance at or below which position snaps to the target.
pub const POSITION_SNAP_DISTANCE: f32 = 0.01;

/// Quaternion |dot| at or above which rotation snaps to the target.
pub const ROTATION_SNAP_DOT: f32 = 0.99;

/// Pending placement target, one optional component per axis of motion.
///
/// An absent component means that axis has fully converged and needs no
/// further blending.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DesiredTransform {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
}

impl DesiredTransform {
    /// True when both components have converged.
    pub fn is_settled(&self) -> bool {
        self.position.is_none() && self.rotation.is_none()
    }

    pub fn clear(&mut self) {
        self.position = None;
        self.rotation = None;
    }
}

/// Advance `current` toward `desired` by one frame of blending.
///
/// Returns the new position and whether the target was reached, in which
/// case the returned position is exactly `desired`.
pub fn step_position(current: Vec3, desired: Vec3, delta_seconds: f32) -> (Vec3, bool) {
    let factor = (delta_seconds * LERP_RATE).clamp(0.0, 1.0);
    let blended = current.lerp(desired, factor);
    if (desired - blended).length() <= POSITION_SNAP_DISTANCE {
        (desired, true)
    } else {
        (blended, false)
    }
}

/// Advance `current` toward `desired` by one frame of shortest-path slerp.
///
/// Returns the new rotation and whether the target was reached, in which
/// case the returned rotation is exactly `desired`.
pub fn step_rotation(current: Quat, desired: Quat, delta_seconds: f32) -> (Quat, bool) {
    let factor = (delta_seconds * LERP_RATE).clamp(0.0, 1.0);
    let blended = current.slerp(desired, factor);
    if blended.dot(desired).abs() >= ROTATION_SNAP_DOT {
        (desired, true)
    } else {
        (blended, false)
    }
}

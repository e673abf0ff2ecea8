//! Orientation reconciliation between surface tilt and remembered facing.

use bevy::prelude::*;

/// Canonical forward direction of a placed entity (Bevy's -Z).
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Reconcile a raw desired rotation with the facing recorded at drag start.
///
/// The result keeps the up axis implied by `raw` (surface tilt, roll
/// discarded) while pointing the entity along `initial_forward_in_local`
/// instead of whatever azimuth the hit orientation carries. The facing
/// rotation is applied first and the tilt second so both constraints hold
/// simultaneously.
pub fn reconcile(raw: Quat, initial_forward_in_local: Vec3) -> Quat {
    let target_up = (raw * Vec3::Y).try_normalize().unwrap_or(Vec3::Y);
    let tilt = Quat::from_rotation_arc(Vec3::Y, target_up);
    let forward = initial_forward_in_local.try_normalize().unwrap_or(FORWARD);
    let facing = Quat::from_rotation_arc(FORWARD, forward);
    (tilt * facing).normalize()
}

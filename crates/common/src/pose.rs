//! Position/orientation pairs tagged with the space they are expressed in.
//!
//! A [`Pose`] is a position plus a unit orientation, no scale. World and
//! parent-local poses are distinct types so that every space conversion is
//! an explicit call rather than an implicit assumption.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Position + orientation pair, space-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Build from a [`Transform`], dropping its scale.
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: Vec3::ONE,
        }
    }

    /// Map a point from this pose's local space into the surrounding space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    /// Map a point from the surrounding space into this pose's local space.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Map a direction from this pose's local space into the surrounding space.
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Map a direction from the surrounding space into this pose's local space.
    pub fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

/// A pose expressed in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPose(pub Pose);

/// A pose expressed in a parent's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPose(pub Pose);

impl WorldPose {
    /// Re-express this pose in the local space of `parent_world`.
    ///
    /// The rotation is re-normalized so the result satisfies the unit
    /// orientation invariant even after accumulated float drift.
    pub fn to_local(&self, parent_world: &Pose) -> LocalPose {
        LocalPose(Pose {
            position: parent_world.inverse_transform_point(self.0.position),
            rotation: (parent_world.rotation.inverse() * self.0.rotation).normalize(),
        })
    }
}

impl LocalPose {
    /// Re-express this pose in world space given its parent's world pose.
    pub fn to_world(&self, parent_world: &Pose) -> WorldPose {
        WorldPose(Pose {
            position: parent_world.transform_point(self.0.position),
            rotation: (parent_world.rotation * self.0.rotation).normalize(),
        })
    }
}

//! Shared mocks for controller tests.
//!
//! `MockFrame` and `MockTarget` stand in for the hit-test and scene-graph
//! collaborators so the drag lifecycle can be exercised without a camera
//! or a full ECS world.

use std::collections::HashMap;

use bevy::prelude::*;

use gridplace_common::surfaces::{SurfaceId, SurfaceType};
use gridplace_common::{Pose, TrackingState, WorldPose};

use crate::controller::{HitCandidate, HitTestSource, PlacementTarget};

/// Allocate `N` distinct entities from a throwaway world.
pub(crate) fn spawn_entities<const N: usize>() -> [Entity; N] {
    let mut world = World::new();
    [(); N].map(|_| world.spawn_empty().id())
}

/// Scripted hit-test collaborator.
pub(crate) struct MockFrame {
    pub tracking: TrackingState,
    pub candidates: Vec<HitCandidate>,
    pub surfaces: HashMap<SurfaceId, (SurfaceType, bool)>,
}

impl MockFrame {
    pub fn tracking() -> Self {
        Self {
            tracking: TrackingState::Tracking,
            candidates: Vec::new(),
            surfaces: HashMap::new(),
        }
    }

    pub fn with_candidate(mut self, surface: SurfaceId, position: Vec3, rotation: Quat) -> Self {
        self.candidates.push(HitCandidate {
            surface,
            pose: WorldPose(Pose::new(position, rotation)),
        });
        self
    }

    pub fn with_surface(
        mut self,
        surface: SurfaceId,
        surface_type: SurfaceType,
        in_polygon: bool,
    ) -> Self {
        self.surfaces.insert(surface, (surface_type, in_polygon));
        self
    }
}

impl HitTestSource for MockFrame {
    fn camera_tracking(&self) -> TrackingState {
        self.tracking
    }

    fn hit_test(&self, _screen_position: Vec2) -> Vec<HitCandidate> {
        self.candidates.clone()
    }

    fn pose_in_polygon(&self, surface: SurfaceId, _pose: &WorldPose) -> bool {
        self.surfaces
            .get(&surface)
            .map(|(_, in_polygon)| *in_polygon)
            .unwrap_or(false)
    }

    fn surface_type(&self, surface: SurfaceId) -> SurfaceType {
        self.surfaces
            .get(&surface)
            .map(|(surface_type, _)| *surface_type)
            .unwrap_or(SurfaceType::Unknown)
    }
}

/// Scripted scene-graph collaborator.
pub(crate) struct MockTarget {
    pub entity: Entity,
    pub descendants: Vec<Entity>,
    pub selectable: bool,
    pub selected: bool,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub world_forward: Vec3,
    pub parent: Option<Pose>,
}

impl MockTarget {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            descendants: Vec::new(),
            selectable: true,
            selected: false,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            world_forward: Vec3::NEG_Z,
            parent: None,
        }
    }
}

impl PlacementTarget for MockTarget {
    fn entity(&self) -> Entity {
        self.entity
    }

    fn is_self_or_descendant(&self, other: Entity) -> bool {
        other == self.entity || self.descendants.contains(&other)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn select(&mut self) -> bool {
        if self.selectable {
            self.selected = true;
        }
        self.selected
    }

    fn local_position(&self) -> Vec3 {
        self.local_position
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.local_position = position;
    }

    fn local_rotation(&self) -> Quat {
        self.local_rotation
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.local_rotation = rotation;
    }

    fn world_forward(&self) -> Vec3 {
        self.world_forward
    }

    fn parent_world_pose(&self) -> Option<Pose> {
        self.parent
    }
}

// ============================================================================
// Bevy Integration - plugin, components, and driving systems
// ============================================================================
// ## Table of Contents
// 1. Placeable component
// 2. ECS collaborator adapters (CameraHitTester, EcsTarget)
// 3. Driving systems (gesture routing, per-frame smoothing, settings)
// 4. Plugin registration
// ============================================================================

use bevy::log::warn;
use bevy::prelude::*;

use gridplace_common::surfaces::{SurfaceId, SurfaceType};
use gridplace_common::{ArSessionState, PlacementSettings, Pose, TrackingState, WorldPose};

use crate::animation::run_scale_animations;
use crate::controller::{
    DragGesture, GridPlacementController, HitCandidate, HitTestSource, PlacementTarget,
    TransformController,
};
use crate::gestures::{recognize_drag_gestures, ActiveDrag, DragEnd, DragMove, DragStart};
use crate::orientation;
use crate::raycast::ray_plane_intersection;
use crate::surface_store::{update_surface_store, SurfaceLost, SurfaceStore, SurfaceUpdated};

// ============================================================================
// 1. Placeable Component
// ============================================================================

/// Marks an entity the controller can pick up and place.
#[derive(Component, Debug, Clone)]
pub struct Placeable {
    /// Half-extents of the pick volume around the entity origin.
    pub bounds: Vec3,
    /// Whether selection attempts succeed.
    pub selectable: bool,
    /// Current selection state.
    pub selected: bool,
}

impl Default for Placeable {
    fn default() -> Self {
        Self {
            bounds: Vec3::splat(0.05),
            selectable: true,
            selected: false,
        }
    }
}

// ============================================================================
// 2. ECS Collaborator Adapters
// ============================================================================

/// [`HitTestSource`] implementation raycasting the surface registry through
/// the active camera.
struct CameraHitTester<'a> {
    camera: &'a Camera,
    camera_transform: &'a GlobalTransform,
    surfaces: &'a SurfaceStore,
    tracking: TrackingState,
}

impl HitTestSource for CameraHitTester<'_> {
    fn camera_tracking(&self) -> TrackingState {
        self.tracking
    }

    fn hit_test(&self, screen_position: Vec2) -> Vec<HitCandidate> {
        let Ok(ray) = self
            .camera
            .viewport_to_world(self.camera_transform, screen_position)
        else {
            return Vec::new();
        };

        let mut hits: Vec<(f32, HitCandidate)> = Vec::new();
        for surface in self.surfaces.tracked() {
            let Some(distance) = ray_plane_intersection(
                ray.origin,
                *ray.direction,
                surface.center,
                surface.normal,
            ) else {
                continue;
            };
            let position = ray.origin + *ray.direction * distance;
            hits.push((
                distance,
                HitCandidate {
                    surface: surface.id,
                    pose: WorldPose(Pose::new(position, surface.orientation())),
                },
            ));
        }
        // Closest surface first, matching the ranked order hit-test
        // consumers expect.
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    fn pose_in_polygon(&self, surface: SurfaceId, pose: &WorldPose) -> bool {
        self.surfaces
            .get(surface)
            .is_some_and(|s| s.contains_point(pose.0.position))
    }

    fn surface_type(&self, surface: SurfaceId) -> SurfaceType {
        self.surfaces
            .get(surface)
            .map(|s| s.surface_type)
            .unwrap_or(SurfaceType::Unknown)
    }
}

/// [`PlacementTarget`] adapter over the ECS scene graph.
struct EcsTarget<'a, 'w, 's> {
    entity: Entity,
    placeable: &'a mut Placeable,
    transform: &'a mut Transform,
    parent_world: Option<Pose>,
    parents: &'a Query<'w, 's, &'static ChildOf>,
}

impl PlacementTarget for EcsTarget<'_, '_, '_> {
    fn entity(&self) -> Entity {
        self.entity
    }

    fn is_self_or_descendant(&self, other: Entity) -> bool {
        if other == self.entity {
            return true;
        }
        let mut current = other;
        while let Ok(child_of) = self.parents.get(current) {
            let parent = child_of.parent();
            if parent == self.entity {
                return true;
            }
            current = parent;
        }
        false
    }

    fn is_selected(&self) -> bool {
        self.placeable.selected
    }

    fn select(&mut self) -> bool {
        if self.placeable.selectable {
            self.placeable.selected = true;
        }
        self.placeable.selected
    }

    fn local_position(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.transform.translation = position;
    }

    fn local_rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn world_forward(&self) -> Vec3 {
        let world_rotation = match &self.parent_world {
            Some(parent) => parent.rotation * self.transform.rotation,
            None => self.transform.rotation,
        };
        world_rotation * orientation::FORWARD
    }

    fn parent_world_pose(&self) -> Option<Pose> {
        self.parent_world
    }
}

/// World pose of an entity's parent, when it has one.
fn parent_world_pose(
    entity: Entity,
    parents: &Query<&ChildOf>,
    globals: &Query<&GlobalTransform>,
) -> Option<Pose> {
    let parent = parents.get(entity).ok()?.parent();
    let transform = globals.get(parent).ok()?.compute_transform();
    Some(Pose::from_transform(&transform))
}

/// Walk up from a gesture target to the entity carrying the controller.
fn controller_root(
    target: Entity,
    controllers: &Query<(
        Entity,
        &mut GridPlacementController,
        &mut Placeable,
        &mut Transform,
    )>,
    parents: &Query<&ChildOf>,
) -> Option<Entity> {
    let mut current = target;
    loop {
        if controllers.contains(current) {
            return Some(current);
        }
        match parents.get(current) {
            Ok(child_of) => current = child_of.parent(),
            Err(_) => return None,
        }
    }
}

// ============================================================================
// 3. Driving Systems
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn drive_drag_gestures(
    mut starts: MessageReader<DragStart>,
    mut moves: MessageReader<DragMove>,
    mut ends: MessageReader<DragEnd>,
    ar_session: Res<ArSessionState>,
    surfaces: Res<SurfaceStore>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut controllers: Query<(
        Entity,
        &mut GridPlacementController,
        &mut Placeable,
        &mut Transform,
    )>,
    parents: Query<&'static ChildOf>,
    globals: Query<&GlobalTransform>,
) {
    for message in starts.read() {
        let Some(root) = controller_root(message.target, &controllers, &parents) else {
            continue;
        };
        let Ok((entity, mut controller, mut placeable, mut transform)) = controllers.get_mut(root)
        else {
            continue;
        };
        let parent_world = parent_world_pose(entity, &parents, &globals);
        let mut target = EcsTarget {
            entity,
            placeable: &mut *placeable,
            transform: &mut *transform,
            parent_world,
            parents: &parents,
        };
        let gesture = DragGesture {
            target: Some(message.target),
            screen_position: message.screen_position,
        };
        controller.on_gesture_start(&gesture, &mut target);
    }

    for message in moves.read() {
        let Some(root) = controller_root(message.target, &controllers, &parents) else {
            continue;
        };
        let Ok((entity, mut controller, mut placeable, mut transform)) = controllers.get_mut(root)
        else {
            continue;
        };
        // No camera means no ray to cast; the frame is skipped like any
        // other no-candidate frame.
        let Ok((camera, camera_transform)) = cameras.single() else {
            continue;
        };
        let tester = CameraHitTester {
            camera,
            camera_transform,
            surfaces: &*surfaces,
            tracking: ar_session.tracking,
        };
        let parent_world = parent_world_pose(entity, &parents, &globals);
        let mut target = EcsTarget {
            entity,
            placeable: &mut *placeable,
            transform: &mut *transform,
            parent_world,
            parents: &parents,
        };
        let gesture = DragGesture {
            target: Some(message.target),
            screen_position: message.screen_position,
        };
        controller.on_gesture_continue(&gesture, &tester, &mut target);
    }

    for message in ends.read() {
        let Some(root) = controller_root(message.target, &controllers, &parents) else {
            continue;
        };
        let Ok((entity, mut controller, mut placeable, mut transform)) = controllers.get_mut(root)
        else {
            continue;
        };
        let parent_world = parent_world_pose(entity, &parents, &globals);
        let mut target = EcsTarget {
            entity,
            placeable: &mut *placeable,
            transform: &mut *transform,
            parent_world,
            parents: &parents,
        };
        let gesture = DragGesture {
            target: Some(message.target),
            screen_position: message.screen_position,
        };
        controller.on_gesture_end(&gesture, &mut target);
    }
}

/// Advance every controller's smoothing by the frame delta.
fn drive_motion_smoothing(
    time: Res<Time>,
    mut controllers: Query<(
        Entity,
        &mut GridPlacementController,
        &mut Placeable,
        &mut Transform,
    )>,
    parents: Query<&'static ChildOf>,
    globals: Query<&GlobalTransform>,
) {
    let delta = time.delta_secs();
    for (entity, mut controller, mut placeable, mut transform) in controllers.iter_mut() {
        if !controller.is_transforming() {
            continue;
        }
        let parent_world = parent_world_pose(entity, &parents, &globals);
        let mut target = EcsTarget {
            entity,
            placeable: &mut *placeable,
            transform: &mut *transform,
            parent_world,
            parents: &parents,
        };
        controller.on_frame_update(delta, &mut target);
    }
}

fn save_settings_on_change(settings: Res<PlacementSettings>) {
    if settings.is_changed() && !settings.is_added() && settings.auto_save {
        if let Err(err) = settings.save() {
            warn!("failed to save placement settings: {err}");
        }
    }
}

// ============================================================================
// 4. Plugin Registration
// ============================================================================

/// Grid-snapped drag placement plugin.
///
/// Registers the surface registry, drag messages, and the chained update
/// systems. The host supplies gestures (or relies on the built-in mouse
/// recognizer), feeds [`SurfaceUpdated`]/[`SurfaceLost`] from its tracking
/// layer, and keeps [`ArSessionState`] current each frame.
#[derive(Default)]
pub struct PlacementControllerPlugin;

impl Plugin for PlacementControllerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PlacementSettings::load())
            .init_resource::<SurfaceStore>()
            .init_resource::<ArSessionState>()
            .init_resource::<ActiveDrag>()
            .add_message::<SurfaceUpdated>()
            .add_message::<SurfaceLost>()
            .add_message::<DragStart>()
            .add_message::<DragMove>()
            .add_message::<DragEnd>()
            .add_systems(
                Update,
                (
                    update_surface_store,
                    recognize_drag_gestures,
                    drive_drag_gestures,
                    drive_motion_smoothing,
                    run_scale_animations,
                    save_settings_on_change,
                )
                    .chain(),
            );
    }
}

//! Drag gesture messages and the built-in mouse recognizer.
//!
//! Hosts with their own gesture layer write the messages directly; the
//! recognizer system exists so a plain mouse-driven app works out of the
//! box.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::plugin::Placeable;
use crate::raycast::ray_obb_intersection;

/// A drag began on a placeable entity.
#[derive(Message, Debug, Clone, Copy)]
pub struct DragStart {
    pub target: Entity,
    pub screen_position: Vec2,
}

/// The pointer moved while dragging.
#[derive(Message, Debug, Clone, Copy)]
pub struct DragMove {
    pub target: Entity,
    pub screen_position: Vec2,
}

/// The drag was released.
#[derive(Message, Debug, Clone, Copy)]
pub struct DragEnd {
    pub target: Entity,
    pub screen_position: Vec2,
}

/// The entity currently grabbed by the mouse, if any.
#[derive(Resource, Debug, Default)]
pub struct ActiveDrag {
    pub target: Option<Entity>,
    /// Last cursor position seen while dragging.
    pub last_screen_position: Vec2,
}

/// Convert mouse input into drag messages by picking the closest placeable
/// under the cursor.
#[allow(clippy::too_many_arguments)]
pub fn recognize_drag_gestures(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    placeables: Query<(Entity, &GlobalTransform, &Placeable)>,
    mut active: ResMut<ActiveDrag>,
    mut starts: MessageWriter<DragStart>,
    mut moves: MessageWriter<DragMove>,
    mut ends: MessageWriter<DragEnd>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    let cursor = match window.cursor_position() {
        Some(position) => position,
        None => {
            // Pointer left the window; a held drag ends where it was last seen.
            if mouse.just_released(MouseButton::Left) {
                if let Some(target) = active.target.take() {
                    ends.write(DragEnd {
                        target,
                        screen_position: active.last_screen_position,
                    });
                }
            }
            return;
        }
    };

    if mouse.just_pressed(MouseButton::Left) {
        let Ok((camera, camera_transform)) = cameras.single() else {
            return;
        };
        let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
            return;
        };

        let mut closest: Option<(f32, Entity)> = None;
        for (entity, global_transform, placeable) in placeables.iter() {
            let transform = global_transform.compute_transform();
            if let Some(distance) = ray_obb_intersection(
                ray.origin,
                *ray.direction,
                transform.translation,
                placeable.bounds,
                transform.rotation,
            ) {
                if closest.is_none() || distance < closest.unwrap().0 {
                    closest = Some((distance, entity));
                }
            }
        }

        if let Some((_, entity)) = closest {
            active.target = Some(entity);
            active.last_screen_position = cursor;
            starts.write(DragStart {
                target: entity,
                screen_position: cursor,
            });
        }
    } else if mouse.pressed(MouseButton::Left) {
        if let Some(target) = active.target {
            active.last_screen_position = cursor;
            moves.write(DragMove {
                target,
                screen_position: cursor,
            });
        }
    } else if mouse.just_released(MouseButton::Left) {
        if let Some(target) = active.target.take() {
            ends.write(DragEnd {
                target,
                screen_position: cursor,
            });
        }
    }
}

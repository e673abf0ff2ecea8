//! Entry/exit scale animations for placed entities.
//!
//! A fixed-duration accelerate-decelerate scale blend used to introduce a
//! newly placed entity and to shrink one away before removal.

use bevy::prelude::*;

/// Default animation duration in seconds.
pub const DEFAULT_DURATION: f32 = 1.0;

/// In-flight scale animation on an entity.
///
/// Removed automatically by [`run_scale_animations`] when finished.
#[derive(Component, Debug, Clone)]
pub struct ScaleAnimation {
    start: Vec3,
    end: Vec3,
    duration: f32,
    elapsed: f32,
}

impl ScaleAnimation {
    pub fn new(start: Vec3, end: Vec3, duration: f32) -> Self {
        Self {
            start,
            end,
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Grow from zero to `target`, used to introduce a new entity.
    pub fn entry(target: Vec3) -> Self {
        Self::new(Vec3::ZERO, target, DEFAULT_DURATION)
    }

    /// Shrink from `current` to zero ahead of removing an entity.
    pub fn exit(current: Vec3) -> Self {
        Self::new(current, Vec3::ZERO, DEFAULT_DURATION)
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration.max(f32::EPSILON);
        self
    }

    /// Accelerate-decelerate easing over normalized time.
    fn ease(t: f32) -> f32 {
        0.5 - 0.5 * (std::f32::consts::PI * t).cos()
    }

    /// Advance by a frame delta, returning the scale to apply and whether
    /// the animation finished.
    fn advance(&mut self, delta_seconds: f32) -> (Vec3, bool) {
        self.elapsed = (self.elapsed + delta_seconds).min(self.duration);
        let t = self.elapsed / self.duration;
        (self.start.lerp(self.end, Self::ease(t)), self.elapsed >= self.duration)
    }
}

/// Drive scale animations and drop them on completion.
pub fn run_scale_animations(
    time: Res<Time>,
    mut commands: Commands,
    mut animations: Query<(Entity, &mut Transform, &mut ScaleAnimation)>,
) {
    let delta = time.delta_secs();
    for (entity, mut transform, mut animation) in animations.iter_mut() {
        let (scale, finished) = animation.advance(delta);
        transform.scale = scale;
        if finished {
            commands.entity(entity).remove::<ScaleAnimation>();
        }
    }
}

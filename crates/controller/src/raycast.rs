//! Ray intersection helpers for screen-ray hit testing and picking.

use bevy::prelude::*;

/// Ray-plane intersection distance along the ray, if any.
pub fn ray_plane_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = plane_normal.dot(ray_direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (plane_point - ray_origin).dot(plane_normal) / denom;
    if t >= 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Slab-method ray-AABB intersection distance.
pub fn ray_aabb_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray_direction.x,
        1.0 / ray_direction.y,
        1.0 / ray_direction.z,
    );

    let t1 = (aabb_min.x - ray_origin.x) * inv_dir.x;
    let t2 = (aabb_max.x - ray_origin.x) * inv_dir.x;
    let t3 = (aabb_min.y - ray_origin.y) * inv_dir.y;
    let t4 = (aabb_max.y - ray_origin.y) * inv_dir.y;
    let t5 = (aabb_min.z - ray_origin.z) * inv_dir.z;
    let t6 = (aabb_max.z - ray_origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(tmin.max(0.0))
    }
}

/// Ray-OBB intersection: transform the ray into the box frame, then run
/// the slab test against the axis-aligned half-extents.
pub fn ray_obb_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    center: Vec3,
    half_extents: Vec3,
    rotation: Quat,
) -> Option<f32> {
    let inverse = rotation.inverse();
    let local_origin = inverse * (ray_origin - center);
    let local_direction = inverse * ray_direction;
    ray_aabb_intersection(local_origin, local_direction, -half_extents, half_extents)
}

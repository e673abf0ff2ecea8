//! Detected planar surfaces produced by the host's spatial-tracking layer.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tracking::TrackingState;

/// Identifier assigned by the tracking layer to a detected surface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SurfaceId(pub u64);

/// Category of a detected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Floors and tables, normal pointing up.
    HorizontalUp,
    /// Ceilings, normal pointing down.
    HorizontalDown,
    /// Walls.
    Vertical,
    Unknown,
}

impl SurfaceType {
    pub const ALL: [SurfaceType; 4] = [
        SurfaceType::HorizontalUp,
        SurfaceType::HorizontalDown,
        SurfaceType::Vertical,
        SurfaceType::Unknown,
    ];

    /// The set of every known surface type.
    pub fn all() -> HashSet<SurfaceType> {
        Self::ALL.into_iter().collect()
    }
}

/// A planar surface detected and tracked in the environment.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct DetectedSurface {
    pub id: SurfaceId,
    /// Center of the plane in world space.
    pub center: Vec3,
    /// Unit normal in world space.
    pub normal: Vec3,
    /// Half-extents of the plane's bounding rectangle in plane-local X/Z.
    pub extents: Vec2,
    pub surface_type: SurfaceType,
    /// Boundary polygon vertices in plane-local X/Z coordinates.
    pub boundary: Vec<Vec2>,
    pub tracking_state: TrackingState,
}

impl DetectedSurface {
    /// Orientation aligning +Y with the surface normal (shortest arc).
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Y, self.normal.try_normalize().unwrap_or(Vec3::Y))
    }

    /// Map a world-space point into plane-local coordinates.
    ///
    /// X/Z span the plane, Y is the off-plane offset.
    pub fn world_to_plane_local(&self, point: Vec3) -> Vec3 {
        self.orientation().inverse() * (point - self.center)
    }

    /// Whether a world-space point lies within the surface's polygon.
    ///
    /// Falls back to the extents rectangle when no boundary polygon has
    /// been reported yet.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.world_to_plane_local(point);
        let in_plane = Vec2::new(local.x, local.z);
        if self.boundary.len() < 3 {
            return in_plane.x.abs() <= self.extents.x && in_plane.y.abs() <= self.extents.y;
        }
        point_in_polygon(in_plane, &self.boundary)
    }

    /// Area of the boundary polygon based on its polygonal extents, in
    /// square length units (shoelace formula).
    pub fn polygonal_area(&self) -> f32 {
        shoelace_area(&self.boundary)
    }
}

/// Even-odd ray-crossing containment test over plane-local vertices.
fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let crossing_x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn shoelace_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    let mut area = 0.0;
    for i in 0..n - 1 {
        area += vertices[i].x * vertices[i + 1].y - vertices[i + 1].x * vertices[i].y;
    }
    area += vertices[n - 1].x * vertices[0].y - vertices[0].x * vertices[n - 1].y;
    (area / 2.0).abs()
}

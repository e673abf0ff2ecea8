//! Registry of detected surfaces, maintained from tracking updates.

use std::collections::HashMap;

use bevy::prelude::*;

use gridplace_common::{DetectedSurface, SurfaceId, TrackingState};

/// All surfaces currently known to the controller.
///
/// The host's tracking layer feeds this through [`SurfaceUpdated`] and
/// [`SurfaceLost`] messages; hit-testing reads it every drag frame.
#[derive(Resource, Debug, Default)]
pub struct SurfaceStore {
    surfaces: HashMap<SurfaceId, DetectedSurface>,
}

impl SurfaceStore {
    pub fn insert(&mut self, surface: DetectedSurface) {
        self.surfaces.insert(surface.id, surface);
    }

    pub fn remove(&mut self, id: SurfaceId) -> Option<DetectedSurface> {
        self.surfaces.remove(&id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&DetectedSurface> {
        self.surfaces.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedSurface> {
        self.surfaces.values()
    }

    /// Surfaces currently usable for hit testing.
    pub fn tracked(&self) -> impl Iterator<Item = &DetectedSurface> {
        self.iter()
            .filter(|surface| surface.tracking_state == TrackingState::Tracking)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

/// A surface was detected or its geometry/tracking state changed.
#[derive(Message, Debug, Clone)]
pub struct SurfaceUpdated {
    pub surface: DetectedSurface,
}

/// A surface left tracking entirely and should be forgotten.
#[derive(Message, Debug, Clone, Copy)]
pub struct SurfaceLost {
    pub id: SurfaceId,
}

/// Apply tracking updates to the store.
///
/// Tracking and limited surfaces are upserted. Paused surfaces have been
/// detected but are not yet tracked, so their updates are ignored.
/// Surfaces reported as not-tracking, or explicitly lost, are dropped.
pub fn update_surface_store(
    mut store: ResMut<SurfaceStore>,
    mut updated: MessageReader<SurfaceUpdated>,
    mut lost: MessageReader<SurfaceLost>,
) {
    for message in updated.read() {
        match message.surface.tracking_state {
            TrackingState::Tracking | TrackingState::Limited => {
                store.insert(message.surface.clone());
            }
            TrackingState::Paused => {}
            TrackingState::NotTracking => {
                store.remove(message.surface.id);
            }
        }
    }
    for message in lost.read() {
        store.remove(message.id);
    }
}

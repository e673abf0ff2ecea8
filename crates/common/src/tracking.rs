//! Tracking states for the viewing camera and for tracked surfaces.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Tracking state of the camera or of an individual trackable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrackingState {
    #[default]
    NotTracking,
    Tracking,
    /// Tracked with degraded confidence.
    Limited,
    /// Detected but not yet tracked.
    Paused,
}

impl TrackingState {
    /// Whether hit-testing and placement updates should run this frame.
    pub fn is_actively_tracking(self) -> bool {
        matches!(self, TrackingState::Tracking)
    }
}

/// Per-frame camera tracking status supplied by the host application.
///
/// Defaults to `Tracking` so the controller works out of the box in hosts
/// without a spatial-tracking session; AR hosts should write the real
/// camera state here every frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ArSessionState {
    pub tracking: TrackingState,
}

impl Default for ArSessionState {
    fn default() -> Self {
        Self {
            tracking: TrackingState::Tracking,
        }
    }
}

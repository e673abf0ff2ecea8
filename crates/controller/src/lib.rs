// ============================================================================
// Bevy Placement Controller
// ============================================================================
// Grid-snapped drag placement for spatially-tracked environments.
//
// ## Table of Contents
// 1. grid          - horizontal grid quantization
// 2. orientation   - surface-tilt / remembered-facing reconciliation
// 3. smoothing     - per-frame convergence toward the desired pose
// 4. controller    - drag lifecycle state machine + collaborator contracts
// 5. raycast       - ray/plane and ray/OBB helpers
// 6. surface_store - detected-surface registry
// 7. gestures      - drag messages + built-in mouse recognizer
// 8. animation     - entry/exit scale animations
// 9. plugin        - Bevy integration
// ============================================================================

#![deny(unsafe_code)]

pub mod animation;
pub mod controller;
pub mod gestures;
pub mod grid;
pub mod orientation;
pub mod plugin;
pub mod raycast;
pub mod smoothing;
pub mod surface_store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use animation::ScaleAnimation;
pub use controller::{
    CommitHook, DragGesture, GridPlacementController, HitCandidate, HitTestSource,
    PlacementPhase, PlacementTarget, TransformController,
};
pub use gestures::{ActiveDrag, DragEnd, DragMove, DragStart};
pub use grid::GridSpec;
pub use plugin::{Placeable, PlacementControllerPlugin};
pub use smoothing::DesiredTransform;
pub use surface_store::{SurfaceLost, SurfaceStore, SurfaceUpdated};

//! # GridPlace Common
//!
//! Shared spatial types and configuration used across the GridPlace crates.
//!
//! ## Modules
//!
//! - `error`: Error taxonomy for placement and configuration
//! - `pointcloud`: Feature-point extraction from raw tracking buffers
//! - `pose`: Space-tagged position/orientation pairs
//! - `settings`: Persistent placement settings (JSON on disk)
//! - `surfaces`: Detected planar surfaces and polygon queries
//! - `tracking`: Camera/trackable tracking states

pub mod error;
pub mod pointcloud;
pub mod pose;
pub mod settings;
pub mod surfaces;
pub mod tracking;

pub use error::PlacementError;
pub use pose::{LocalPose, Pose, WorldPose};
pub use settings::PlacementSettings;
pub use surfaces::{DetectedSurface, SurfaceId, SurfaceType};
pub use tracking::{ArSessionState, TrackingState};

//! Feature-point extraction from raw tracking buffers.
//!
//! The tracking layer delivers feature points as a flat buffer of four
//! floats per point: x, y, z, confidence.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Floats per feature point in a raw buffer.
pub const FLOATS_PER_FEATURE: usize = 4;

/// A single tracked feature point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub position: Vec3,
    /// Tracking confidence in `[0, 1]`.
    pub confidence: f32,
}

/// Number of complete features in a raw buffer.
pub fn feature_count(buffer: &[f32]) -> usize {
    buffer.len() / FLOATS_PER_FEATURE
}

/// Parse a stride-4 feature buffer. Trailing partial entries are ignored.
pub fn features_from_buffer(buffer: &[f32]) -> Vec<PointFeature> {
    buffer
        .chunks_exact(FLOATS_PER_FEATURE)
        .map(|chunk| PointFeature {
            position: Vec3::new(chunk[0], chunk[1], chunk[2]),
            confidence: chunk[3],
        })
        .collect()
}

/// Features at or above the given confidence.
pub fn confident_features(buffer: &[f32], min_confidence: f32) -> Vec<PointFeature> {
    features_from_buffer(buffer)
        .into_iter()
        .filter(|feature| feature.confidence >= min_confidence)
        .collect()
}

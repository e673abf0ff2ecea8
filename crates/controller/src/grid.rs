//! Horizontal grid quantization for placement positions.

use bevy::prelude::*;

/// Default grid cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f32 = 0.05;

/// Horizontal grid description.
///
/// A single cell size shared by the two ground-plane axes; elevation is
/// never quantized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Cell edge length in world units.
    pub cell_size: f32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl GridSpec {
    pub fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    /// Snap one coordinate onto the grid, truncating toward zero.
    fn snap(self, value: f32) -> f32 {
        (value / self.cell_size).trunc() * self.cell_size
    }

    /// Lock a position onto the grid: X and Z snap, Y passes through.
    pub fn quantize(self, position: Vec3) -> Vec3 {
        Vec3::new(self.snap(position.x), position.y, self.snap(position.z))
    }
}

use crate::errors::{PlannerError, PlannerResult};
use crate::geometry::BlockPos;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod generation;

/// Height and water-occupancy grids for the bounded planning area.
/// Read-only for the duration of a planning run.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TerrainGrid {
    #[validate(range(min = 1, max = 2048))]
    pub width: i32,
    #[validate(range(min = 1, max = 2048))]
    pub depth: i32,
    /// World position of the grid's (0, 0) column; heights are absolute
    pub origin: BlockPos,
    /// Surface heights, flattened row-major (z * width + x)
    pub heights: Vec<i32>,
    /// Water occupancy, parallel to `heights`
    pub water: Vec<bool>,
}

impl TerrainGrid {
    pub fn new(
        width: i32,
        depth: i32,
        origin: BlockPos,
        heights: Vec<i32>,
        water: Vec<bool>,
    ) -> PlannerResult<Self> {
        if width <= 0 || depth <= 0 {
            return Err(PlannerError::InvalidBounds { width, depth });
        }
        let cells = (width as usize) * (depth as usize);
        if heights.len() != cells || water.len() != cells {
            return Err(PlannerError::InvalidConfig {
                reason: format!(
                    "terrain grids must hold {} cells (got {} heights, {} water)",
                    cells,
                    heights.len(),
                    water.len()
                ),
            });
        }
        let grid = Self {
            width,
            depth,
            origin,
            heights,
            water,
        };
        grid.validate()
            .map_err(|_| PlannerError::InvalidBounds { width, depth })?;
        Ok(grid)
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if x < 0 || z < 0 || x >= self.width || z >= self.depth {
            return None;
        }
        Some((z * self.width + x) as usize)
    }

    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        self.index(x, z).is_some()
    }

    /// Surface height at local grid offset (x, z)
    pub fn height_at(&self, x: i32, z: i32) -> Option<i32> {
        self.index(x, z).map(|i| self.heights[i])
    }

    pub fn is_water(&self, x: i32, z: i32) -> Option<bool> {
        self.index(x, z).map(|i| self.water[i])
    }

    /// Convert a world position to local grid offsets
    pub fn world_to_local(&self, pos: &BlockPos) -> (i32, i32) {
        (pos.x - self.origin.x, pos.z - self.origin.z)
    }

    pub fn local_to_world(&self, x: i32, z: i32) -> BlockPos {
        let y = self.height_at(x, z).unwrap_or(self.origin.y);
        BlockPos::new(self.origin.x + x, y, self.origin.z + z)
    }

    /// Mean gradient magnitude over a footprint rectangle, central differences
    /// in the interior and one-sided at the grid edges. Returns None when the
    /// rectangle falls outside the grid.
    pub fn mean_steepness(&self, x0: i32, z0: i32, width: i32, depth: i32) -> Option<f64> {
        if width <= 0 || depth <= 0 {
            return None;
        }
        self.index(x0, z0)?;
        self.index(x0 + width - 1, z0 + depth - 1)?;

        let mut total = 0.0;
        let mut cells = 0u32;
        for z in z0..z0 + depth {
            for x in x0..x0 + width {
                let gx = self.axis_gradient(x, z, 1, 0);
                let gz = self.axis_gradient(x, z, 0, 1);
                total += (gx * gx + gz * gz).sqrt();
                cells += 1;
            }
        }
        Some(total / cells as f64)
    }

    fn axis_gradient(&self, x: i32, z: i32, dx: i32, dz: i32) -> f64 {
        let here = self.height_at(x, z).unwrap_or(self.origin.y) as f64;
        let ahead = self.height_at(x + dx, z + dz);
        let behind = self.height_at(x - dx, z - dz);
        match (behind, ahead) {
            (Some(b), Some(a)) => (a as f64 - b as f64) / 2.0,
            (None, Some(a)) => a as f64 - here,
            (Some(b), None) => here - b as f64,
            (None, None) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_grid(width: i32, depth: i32, height: i32) -> TerrainGrid {
        let cells = (width * depth) as usize;
        TerrainGrid::new(
            width,
            depth,
            BlockPos::new(0, height, 0),
            vec![height; cells],
            vec![false; cells],
        )
        .unwrap()
    }

    #[test]
    fn test_zero_extent_rejected() {
        let err = TerrainGrid::new(0, 10, BlockPos::new(0, 64, 0), vec![], vec![]).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidBounds {
                width: 0,
                depth: 10
            }
        ));
    }

    #[test]
    fn test_mismatched_grid_lengths_rejected() {
        let err =
            TerrainGrid::new(2, 2, BlockPos::new(0, 64, 0), vec![64; 4], vec![false; 3])
                .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig { .. }));
    }

    #[test]
    fn test_height_lookup_and_bounds() {
        let mut grid = flat_grid(4, 3, 64);
        grid.heights[(1 * 4 + 2) as usize] = 70;
        assert_eq!(grid.height_at(2, 1), Some(70));
        assert_eq!(grid.height_at(0, 0), Some(64));
        assert_eq!(grid.height_at(4, 0), None);
        assert_eq!(grid.height_at(-1, 0), None);
    }

    #[test]
    fn test_world_local_round_trip() {
        let grid = flat_grid(8, 8, 64);
        let world = grid.local_to_world(3, 5);
        assert_eq!(world, BlockPos::new(3, 64, 5));
        assert_eq!(grid.world_to_local(&world), (3, 5));
    }

    #[test]
    fn test_flat_terrain_has_zero_steepness() {
        let grid = flat_grid(8, 8, 64);
        assert_eq!(grid.mean_steepness(0, 0, 8, 8), Some(0.0));
    }

    #[test]
    fn test_ramp_steepness_positive() {
        let width = 8;
        let depth = 8;
        let mut heights = Vec::new();
        for _z in 0..depth {
            for x in 0..width {
                heights.push(64 + x);
            }
        }
        let grid = TerrainGrid::new(
            width,
            depth,
            BlockPos::new(0, 64, 0),
            heights,
            vec![false; (width * depth) as usize],
        )
        .unwrap();
        let steep = grid.mean_steepness(1, 1, 4, 4).unwrap();
        assert!((steep - 1.0).abs() < 1e-9);
    }
}

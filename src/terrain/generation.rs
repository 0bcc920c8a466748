use crate::errors::PlannerResult;
use crate::geometry::BlockPos;
use crate::terrain::TerrainGrid;
use noise::{MultiFractal, NoiseFn, Perlin, RidgedMulti};

/// Terrain generation algorithms for synthetic planning areas
#[derive(Debug, Clone)]
pub enum TerrainAlgorithm {
    Flat {
        height: i32,
    },
    Perlin {
        amplitude: f64,
        frequency: f64,
        octaves: u32,
    },
    Ridged {
        amplitude: f64,
        frequency: f64,
    },
}

/// Generates a synthetic `TerrainGrid` for the demo binary and tests. Real
/// runs get their grid from a world collaborator instead.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    pub seed: u32,
    pub base_height: i32,
    /// Cells at or below this height are flooded
    pub water_level: i32,
    pub algorithm: TerrainAlgorithm,
}

impl TerrainGenerator {
    pub fn new(seed: u32, base_height: i32, water_level: i32, algorithm: TerrainAlgorithm) -> Self {
        Self {
            seed,
            base_height,
            water_level,
            algorithm,
        }
    }

    /// Generate a grid of the given extent, origin at `origin`
    pub fn generate(&self, width: i32, depth: i32, origin: BlockPos) -> PlannerResult<TerrainGrid> {
        let total = (width.max(0) * depth.max(0)) as usize;
        let mut heights = Vec::with_capacity(total);

        match &self.algorithm {
            TerrainAlgorithm::Flat { height } => {
                heights.resize(total, *height);
            }
            TerrainAlgorithm::Perlin {
                amplitude,
                frequency,
                octaves,
            } => {
                let perlin = Perlin::new(self.seed);
                for z in 0..depth {
                    for x in 0..width {
                        let mut noise_value = 0.0;
                        let mut current_amplitude = *amplitude;
                        let mut current_frequency = *frequency;
                        for _ in 0..*octaves {
                            noise_value += perlin
                                .get([x as f64 * current_frequency, z as f64 * current_frequency])
                                * current_amplitude;
                            current_amplitude *= 0.5; // Persistence
                            current_frequency *= 2.0; // Lacunarity
                        }
                        heights.push(self.base_height + noise_value.round() as i32);
                    }
                }
            }
            TerrainAlgorithm::Ridged {
                amplitude,
                frequency,
            } => {
                let ridged = RidgedMulti::<Perlin>::new(self.seed).set_frequency(*frequency);
                for z in 0..depth {
                    for x in 0..width {
                        let noise_value = ridged.get([x as f64, z as f64]) * amplitude;
                        heights.push(self.base_height + noise_value.round() as i32);
                    }
                }
            }
        }

        let water = heights.iter().map(|&h| h <= self.water_level).collect();
        TerrainGrid::new(width, depth, origin, heights, water)
    }
}

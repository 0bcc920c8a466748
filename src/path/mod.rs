use crate::errors::{PlannerError, PlannerResult};
use crate::placement::PlacementList;
use crate::terrain::TerrainGrid;
use pathfinding::prelude::astar;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One cell of the final walking path, world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: i32,
    pub z: i32,
    pub elevation: i32,
}

/// All eight lateral neighbor offsets; no vertical moves
const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (1, -1),
    (-1, 0),
    (-1, 1),
    (-1, -1),
    (0, 1),
    (0, -1),
];

/// Threads a single walkable path through every placed structure's entrance
/// checkpoint using grid A*, visiting checkpoints nearest-remaining-first.
pub struct PathPlanner<'a> {
    terrain: &'a TerrainGrid,
}

impl<'a> PathPlanner<'a> {
    pub fn new(terrain: &'a TerrainGrid) -> Self {
        Self { terrain }
    }

    /// Local-grid checkpoint for each placement, clamped into the area
    fn checkpoints(&self, placements: &PlacementList) -> Vec<(i32, i32)> {
        placements
            .iter()
            .map(|p| {
                let (x, z) = self.terrain.world_to_local(&p.waypoint());
                (
                    x.clamp(0, self.terrain.width - 1),
                    z.clamp(0, self.terrain.depth - 1),
                )
            })
            .collect()
    }

    /// Plan the connected path. Fails with `UnreachablePath` when any leg has
    /// no route under the height-delta rule; partial layouts stay usable
    /// because the failure carries how far the path got.
    pub fn plan(&self, placements: &PlacementList) -> PlannerResult<Vec<PathPoint>> {
        let mut remaining = self.checkpoints(placements);
        let total = remaining.len();
        if total < 2 {
            let path = remaining
                .iter()
                .map(|&(x, z)| self.path_point(x, z))
                .collect();
            return Ok(path);
        }

        let mut current = remaining.remove(0);
        let mut path = vec![self.path_point(current.0, current.1)];
        let mut connected = 1usize;

        while !remaining.is_empty() {
            // Aim for the closest remaining checkpoint from where we stand
            let (target_index, _) = remaining
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    distance_sq(current, *a.1).cmp(&distance_sq(current, *b.1))
                })
                .map(|(i, c)| (i, *c))
                .unwrap_or((0, remaining[0]));
            let target = remaining.remove(target_index);

            let leg = self
                .leg(current, target)
                .ok_or(PlannerError::UnreachablePath { connected, total })?;
            // First cell of the leg is where the previous one ended
            for &(x, z) in leg.iter().skip(1) {
                path.push(self.path_point(x, z));
            }
            connected += 1;
            current = target;
        }

        debug!(cells = path.len(), checkpoints = total, "path planned");
        Ok(path)
    }

    /// A* for a single checkpoint-to-checkpoint leg. Unit step cost with a
    /// squared straight-line heuristic, as the layouts were tuned against;
    /// the inflated heuristic trades optimality for speed.
    fn leg(&self, start: (i32, i32), goal: (i32, i32)) -> Option<Vec<(i32, i32)>> {
        let result = astar(
            &start,
            |&(x, z)| {
                let here = self.terrain.height_at(x, z);
                NEIGHBORS
                    .iter()
                    .filter_map(move |&(dx, dz)| {
                        let next = (x + dx, z + dz);
                        let there = self.terrain.height_at(next.0, next.1)?;
                        let here = here?;
                        // No fly/dig movement
                        if (there - here).abs() > 1 {
                            return None;
                        }
                        Some((next, 1u64))
                    })
                    .collect::<Vec<_>>()
            },
            |&node| distance_sq(node, goal),
            |&node| node == goal,
        );
        result.map(|(cells, _cost)| cells)
    }

    fn path_point(&self, x: i32, z: i32) -> PathPoint {
        let world = self.terrain.local_to_world(x, z);
        PathPoint {
            x: world.x,
            z: world.z,
            elevation: world.y,
        }
    }
}

fn distance_sq(a: (i32, i32), b: (i32, i32)) -> u64 {
    let dx = (a.0 - b.0) as i64;
    let dz = (a.1 - b.1) as i64;
    (dx * dx + dz * dz) as u64
}

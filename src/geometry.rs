use derive_more::{Add, AddAssign, Sub};
use serde::{Deserialize, Serialize};

/// Integer block position in world coordinates
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Add, AddAssign, Sub, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Squared 2D (x, z) distance to another position, ignoring height
    pub fn distance_sq_2d(&self, other: &BlockPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dz = (self.z - other.z) as f64;
        dx * dx + dz * dz
    }

    /// 2D (x, z) distance to another position, ignoring height
    pub fn distance_2d(&self, other: &BlockPos) -> f64 {
        self.distance_sq_2d(other).sqrt()
    }
}

/// Axis-aligned bounding box, inclusive on both ends.
/// `max = min + (size - 1)` on each axis, so a 1-block structure has min == max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BoundingBox {
    /// Build a box from an origin corner and a (width, height, depth) size.
    pub fn from_origin_size(origin: BlockPos, size: (i32, i32, i32)) -> Self {
        Self {
            min: origin,
            max: BlockPos::new(
                origin.x + size.0 - 1,
                origin.y + size.1 - 1,
                origin.z + size.2 - 1,
            ),
        }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    pub fn depth(&self) -> i32 {
        self.max.z - self.min.z + 1
    }

    /// Footprint cell count on the (x, z) plane
    pub fn footprint_area(&self) -> i64 {
        self.width() as i64 * self.depth() as i64
    }

    pub fn volume(&self) -> i64 {
        self.footprint_area() * self.height() as i64
    }

    /// Inclusive AABB overlap test on all three axes
    pub fn collides(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Representative 2D distance between two boxes: the smallest of the four
    /// corner-pair distances (min-min, min-max, max-min, max-max).
    pub fn corner_distance_2d(&self, other: &BoundingBox) -> f64 {
        let corners =
            |b: &BoundingBox| [BlockPos::new(b.min.x, 0, b.min.z), BlockPos::new(b.max.x, 0, b.max.z)];
        let mut smallest = f64::INFINITY;
        for a in corners(self) {
            for b in corners(other) {
                smallest = smallest.min(a.distance_2d(&b));
            }
        }
        smallest
    }
}

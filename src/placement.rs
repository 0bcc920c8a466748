use crate::geometry::{BlockPos, BoundingBox};
use crate::template::StructureTemplate;
use serde::{Deserialize, Serialize};

/// A structure instance fixed at a world position, committed or candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub template: StructureTemplate,
    pub origin: BlockPos,
    pub bounds: BoundingBox,
}

impl Placement {
    pub fn new(template: StructureTemplate, origin: BlockPos) -> Self {
        let bounds = BoundingBox::from_origin_size(origin, template.size);
        Self {
            template,
            origin,
            bounds,
        }
    }

    /// Identical (template, position) pair - the duplicate-penalty test
    pub fn same_site(&self, other: &Placement) -> bool {
        self.template.id == other.template.id && self.origin == other.origin
    }

    /// Waypoint the path planner should route through: the entrance cell one
    /// level down, or one cell diagonally outside the box corner when the
    /// template has no entrance.
    pub fn waypoint(&self) -> BlockPos {
        match self.template.entrance {
            Some(entrance) => BlockPos::new(
                self.origin.x + entrance.x,
                self.origin.y + entrance.y - 1,
                self.origin.z + entrance.z,
            ),
            None => self.origin + BlockPos::new(-1, -1, -1),
        }
    }
}

/// Ordered accumulator of committed placements for a run. Append-only while
/// the loop runs; the sole durable output handed to the path planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementList {
    placements: Vec<Placement>,
}

impl PlacementList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    pub fn as_slice(&self) -> &[Placement] {
        &self.placements
    }

    /// Frozen copy for tentative lookahead evaluation
    pub fn snapshot(&self) -> Vec<Placement> {
        self.placements.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Category;

    #[test]
    fn test_bounds_derived_from_size() {
        let template = StructureTemplate::new("hut", Category::Residential, (3, 4, 5));
        let placement = Placement::new(template, BlockPos::new(10, 64, 20));
        assert_eq!(placement.bounds.min, BlockPos::new(10, 64, 20));
        assert_eq!(placement.bounds.max, BlockPos::new(12, 67, 24));
    }

    #[test]
    fn test_waypoint_from_entrance() {
        let template = StructureTemplate::new("hut", Category::Residential, (3, 4, 3))
            .with_entrance(BlockPos::new(1, 0, 0));
        let placement = Placement::new(template, BlockPos::new(10, 64, 20));
        assert_eq!(placement.waypoint(), BlockPos::new(11, 63, 20));
    }

    #[test]
    fn test_waypoint_fallback_outside_box() {
        let template = StructureTemplate::new("silo", Category::Production, (3, 8, 3));
        let placement = Placement::new(template, BlockPos::new(10, 64, 20));
        let waypoint = placement.waypoint();
        assert_eq!(waypoint, BlockPos::new(9, 63, 19));
        assert!(!placement.bounds.collides(&BoundingBox {
            min: waypoint,
            max: waypoint
        }));
    }

    #[test]
    fn test_list_is_append_only_ordered() {
        let template = StructureTemplate::new("hut", Category::Residential, (3, 3, 3));
        let mut list = PlacementList::new();
        list.commit(Placement::new(template.clone(), BlockPos::new(0, 64, 0)));
        list.commit(Placement::new(template, BlockPos::new(10, 64, 0)));
        assert_eq!(list.len(), 2);
        let origins: Vec<_> = list.iter().map(|p| p.origin.x).collect();
        assert_eq!(origins, vec![0, 10]);
    }
}

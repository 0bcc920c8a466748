use crate::errors::{PlannerError, PlannerResult};
use crate::geometry::BlockPos;
use serde::{Deserialize, Serialize};

/// Fixed structure classification used for compatibility scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Residential,
    Food,
    Production,
    Entertainment,
    Government,
    Water,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Residential,
        Category::Food,
        Category::Production,
        Category::Entertainment,
        Category::Government,
        Category::Water,
    ];

    /// Acceptable neighboring categories for compatibility scoring
    pub fn accepts(&self, neighbor: Category) -> bool {
        use Category::*;
        match self {
            Entertainment => matches!(neighbor, Residential | Entertainment | Water),
            Food => matches!(neighbor, Residential | Food | Production | Water),
            Government => matches!(neighbor, Residential | Water),
            Production => matches!(neighbor, Food | Production | Residential | Water),
            Residential => matches!(
                neighbor,
                Entertainment | Residential | Food | Production | Water
            ),
            Water => true,
        }
    }
}

/// A placeable building type: fixed 3D size, category, optional entrance
/// offset relative to the structure's own origin corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    pub id: String,
    pub category: Category,
    /// (width, height, depth) in blocks
    pub size: (i32, i32, i32),
    pub entrance: Option<BlockPos>,
}

impl StructureTemplate {
    pub fn new(id: impl Into<String>, category: Category, size: (i32, i32, i32)) -> Self {
        Self {
            id: id.into(),
            category,
            size,
            entrance: None,
        }
    }

    pub fn with_entrance(mut self, entrance: BlockPos) -> Self {
        self.entrance = Some(entrance);
        self
    }

    pub fn footprint(&self) -> (i32, i32) {
        (self.size.0, self.size.2)
    }
}

/// In-memory set of placeable templates. The oracle samples a continuous
/// template parameter which is truncated to an index into this list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLibrary {
    templates: Vec<StructureTemplate>,
}

impl TemplateLibrary {
    pub fn new(templates: Vec<StructureTemplate>) -> PlannerResult<Self> {
        if templates.is_empty() {
            return Err(PlannerError::InvalidConfig {
                reason: "template library must contain at least one template".to_string(),
            });
        }
        Ok(Self { templates })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StructureTemplate> {
        self.templates.get(index)
    }

    /// Template at `index`, clamped into range; the library is never empty
    pub fn clamped(&self, index: usize) -> &StructureTemplate {
        &self.templates[index.min(self.templates.len() - 1)]
    }

    pub fn by_id(&self, id: &str) -> PlannerResult<&StructureTemplate> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| PlannerError::UnknownTemplate { id: id.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructureTemplate> {
        self.templates.iter()
    }

    /// Largest footprint area across the library, used to normalize the size
    /// bonus term
    pub fn max_footprint_area(&self) -> i64 {
        self.templates
            .iter()
            .map(|t| t.size.0 as i64 * t.size.2 as i64)
            .max()
            .unwrap_or(1)
    }

    /// Built-in template set covering all six categories
    pub fn default_set() -> Self {
        use Category::*;
        let templates = vec![
            StructureTemplate::new("oak_house", Residential, (5, 6, 5))
                .with_entrance(BlockPos::new(2, 0, 0)),
            StructureTemplate::new("spruce_cabin", Residential, (4, 5, 4))
                .with_entrance(BlockPos::new(1, 0, 0)),
            StructureTemplate::new("wheat_farm", Food, (7, 3, 6))
                .with_entrance(BlockPos::new(3, 0, 0)),
            StructureTemplate::new("fishing_hut", Water, (4, 4, 5))
                .with_entrance(BlockPos::new(0, 0, 2)),
            StructureTemplate::new("smithy", Production, (6, 5, 5))
                .with_entrance(BlockPos::new(2, 0, 0)),
            StructureTemplate::new("windmill", Production, (5, 9, 5)),
            StructureTemplate::new("tavern", Entertainment, (7, 6, 6))
                .with_entrance(BlockPos::new(3, 0, 0)),
            StructureTemplate::new("town_hall", Government, (9, 8, 8))
                .with_entrance(BlockPos::new(4, 0, 0)),
        ];
        Self { templates }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_table() {
        assert!(Category::Food.accepts(Category::Residential));
        assert!(Category::Food.accepts(Category::Production));
        assert!(!Category::Food.accepts(Category::Entertainment));
        assert!(!Category::Government.accepts(Category::Production));
        // Water accepts everything
        for cat in Category::ALL {
            assert!(Category::Water.accepts(cat));
        }
    }

    #[test]
    fn test_empty_library_rejected() {
        assert!(TemplateLibrary::new(vec![]).is_err());
    }

    #[test]
    fn test_default_set_covers_all_categories() {
        let library = TemplateLibrary::default_set();
        for cat in Category::ALL {
            assert!(
                library.iter().any(|t| t.category == cat),
                "missing category {cat:?}"
            );
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let library = TemplateLibrary::default_set();
        let smithy = library.by_id("smithy").unwrap();
        assert_eq!(smithy.category, Category::Production);
        assert!(library.by_id("castle").is_err());
    }

    #[test]
    fn test_max_footprint_area() {
        let library = TemplateLibrary::default_set();
        assert_eq!(library.max_footprint_area(), 72); // town_hall 9x8
    }
}

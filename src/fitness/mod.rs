use crate::placement::Placement;
use crate::template::Category;
use crate::terrain::TerrainGrid;
use serde::Serialize;

/// Sentinel returned on an absolute veto (collision or steepness gate).
/// Normal scores stay within [-1, 1], so this is unambiguous.
pub const VETO_SCORE: f64 = -1.0e4;

/// Per-cell height delta considered maximally disruptive when normalizing the
/// terrain term
const TERRAIN_DELTA_CAP: f64 = 8.0;

/// Raw term weights, kept from tuning against hand-checked layouts
const SPACING_WEIGHT: f64 = 10.0;
const RELATION_WEIGHT: f64 = 5.0;
const DIVERSITY_WEIGHT: f64 = 10.0;
const DUPLICATE_WEIGHT: f64 = 7.0;
const COUNT_WEIGHT: f64 = 5.0;
const SIZE_WEIGHT: f64 = 0.002;

#[derive(Debug, Clone)]
pub struct FitnessConfig {
    /// Acceptable corner-to-corner spacing band between structures
    pub min_spacing: f64,
    pub max_spacing: f64,
    /// How many nearest neighbors the category term examines
    pub neighbor_count: usize,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            min_spacing: 3.0,
            max_spacing: 30.0,
            neighbor_count: 3,
        }
    }
}

/// Normalized sub-scores for one evaluation, for diagnostics and run summaries
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FitnessBreakdown {
    pub individual: f64,
    pub relational: f64,
    pub group: f64,
    pub total: f64,
}

/// Scores one candidate placement against the already-placed structures and
/// the terrain grid. Stateless between calls; safe to share read-only.
pub struct FitnessEvaluator<'a> {
    terrain: &'a TerrainGrid,
    config: FitnessConfig,
    /// Largest footprint in the template library, normalizes the size bonus
    max_footprint_area: i64,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(terrain: &'a TerrainGrid, config: FitnessConfig, max_footprint_area: i64) -> Self {
        Self {
            terrain,
            config,
            max_footprint_area: max_footprint_area.max(1),
        }
    }

    /// Bounded score for `candidate` against `placed`. Collision is an
    /// absolute veto, not a soft penalty.
    pub fn evaluate(&self, candidate: &Placement, placed: &[Placement]) -> f64 {
        self.evaluate_detailed(candidate, placed).total
    }

    pub fn evaluate_detailed(&self, candidate: &Placement, placed: &[Placement]) -> FitnessBreakdown {
        if placed.iter().any(|p| candidate.bounds.collides(&p.bounds)) {
            return FitnessBreakdown {
                individual: VETO_SCORE,
                relational: VETO_SCORE,
                group: VETO_SCORE,
                total: VETO_SCORE,
            };
        }

        let area = candidate.bounds.footprint_area() as f64;

        // Individual terms: terrain disruption, floating/submersion, size
        let terrain_raw = -self.terrain_disruption(candidate);
        let terrain_cap = TERRAIN_DELTA_CAP * area;
        let floating_raw = -self.floating_cells(candidate);
        let floating_cap = 2.0 * area;
        let size_raw = SIZE_WEIGHT * area;
        let size_cap = SIZE_WEIGHT * self.max_footprint_area as f64;

        let individual = ((terrain_raw.max(-terrain_cap))
            + floating_raw.max(-floating_cap)
            + size_raw)
            / (terrain_cap + floating_cap + size_cap);

        // Relational terms: spacing band, category compatibility, duplicate
        let neighbors = self.config.neighbor_count.min(placed.len());
        let spacing_raw = self.spacing_term(candidate, placed);
        let spacing_cap = if placed.is_empty() { 0.0 } else { SPACING_WEIGHT };
        let category_raw = self.category_term(candidate, placed);
        let category_cap = RELATION_WEIGHT * neighbors as f64;
        let duplicate_raw = self.duplicate_term(candidate, placed);
        let duplicate_cap = DUPLICATE_WEIGHT;

        let relational_cap = spacing_cap + category_cap + duplicate_cap;
        let relational = (spacing_raw + category_raw + duplicate_raw) / relational_cap;

        // Group terms: building count, type diversity, plus the relational set
        let count_raw = COUNT_WEIGHT * placed.len() as f64 + 1.0;
        let diversity_raw = DIVERSITY_WEIGHT * self.distinct_categories(candidate, placed) as f64;
        let diversity_cap =
            DIVERSITY_WEIGHT * Category::ALL.len().min(placed.len() + 1) as f64;

        let group_cap = count_raw + diversity_cap + relational_cap;
        let group =
            (count_raw + diversity_raw + spacing_raw + category_raw + duplicate_raw) / group_cap;

        let total = (individual + relational + group) / 3.0;
        FitnessBreakdown {
            individual,
            relational,
            group,
            total,
        }
    }

    /// Sum of |height - height at origin| over the footprint. Penalizes
    /// building across uneven ground.
    fn terrain_disruption(&self, candidate: &Placement) -> f64 {
        let (x0, z0) = self.terrain.world_to_local(&candidate.origin);
        let Some(origin_height) = self.terrain.height_at(x0, z0) else {
            return TERRAIN_DELTA_CAP * candidate.bounds.footprint_area() as f64;
        };
        let mut total = 0.0;
        for z in z0..z0 + candidate.bounds.depth() {
            for x in x0..x0 + candidate.bounds.width() {
                if let Some(h) = self.terrain.height_at(x, z) {
                    total += (h - origin_height).abs() as f64;
                }
            }
        }
        total
    }

    /// Cells that would leave the structure floating, plus water-mismatch
    /// cells: water under a dry-land category, dry ground under a water one.
    fn floating_cells(&self, candidate: &Placement) -> f64 {
        let (x0, z0) = self.terrain.world_to_local(&candidate.origin);
        let Some(origin_height) = self.terrain.height_at(x0, z0) else {
            return 2.0 * candidate.bounds.footprint_area() as f64;
        };
        let wants_water = candidate.template.category == Category::Water;
        let mut count = 0.0;
        for z in z0..z0 + candidate.bounds.depth() {
            for x in x0..x0 + candidate.bounds.width() {
                if let Some(h) = self.terrain.height_at(x, z) {
                    if h < origin_height {
                        count += 1.0;
                    }
                }
                if let Some(wet) = self.terrain.is_water(x, z) {
                    if wet != wants_water {
                        count += 1.0;
                    }
                }
            }
        }
        count
    }

    fn spacing_term(&self, candidate: &Placement, placed: &[Placement]) -> f64 {
        let Some(nearest) = placed
            .iter()
            .map(|p| candidate.bounds.corner_distance_2d(&p.bounds))
            .min_by(|a, b| a.total_cmp(b))
        else {
            return 0.0; // no neighbors yet, neutral
        };
        if nearest >= self.config.min_spacing && nearest <= self.config.max_spacing {
            SPACING_WEIGHT
        } else {
            -SPACING_WEIGHT
        }
    }

    fn category_term(&self, candidate: &Placement, placed: &[Placement]) -> f64 {
        let mut by_distance: Vec<(f64, Category)> = placed
            .iter()
            .map(|p| {
                (
                    candidate.bounds.corner_distance_2d(&p.bounds),
                    p.template.category,
                )
            })
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut counter = 0.0;
        for (_, neighbor) in by_distance.iter().take(self.config.neighbor_count) {
            if candidate.template.category.accepts(*neighbor) {
                counter += RELATION_WEIGHT;
            } else {
                counter -= RELATION_WEIGHT;
            }
        }
        counter
    }

    fn duplicate_term(&self, candidate: &Placement, placed: &[Placement]) -> f64 {
        if placed.iter().any(|p| p.same_site(candidate)) {
            -DUPLICATE_WEIGHT
        } else {
            DUPLICATE_WEIGHT
        }
    }

    fn distinct_categories(&self, candidate: &Placement, placed: &[Placement]) -> usize {
        let mut seen = [false; Category::ALL.len()];
        let mark = |seen: &mut [bool; 6], cat: Category| {
            let index = Category::ALL.iter().position(|c| *c == cat).unwrap_or(0);
            seen[index] = true;
        };
        mark(&mut seen, candidate.template.category);
        for p in placed {
            mark(&mut seen, p.template.category);
        }
        seen.iter().filter(|s| **s).count()
    }
}

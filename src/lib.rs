pub mod config;
pub mod errors;
pub mod fitness;
pub mod geometry;
pub mod oracle;
pub mod path;
pub mod placement;
pub mod planner;
pub mod search;
pub mod template;
pub mod terrain;
pub mod world;

// Selective re-exports for external consumers

pub use config::PlannerConfig;
pub use errors::{PlannerError, PlannerResult};
pub use fitness::{FitnessConfig, FitnessEvaluator, VETO_SCORE};
pub use geometry::{BlockPos, BoundingBox};
pub use oracle::{Oracle, OracleBudget, OracleSample, PlacementParams, RandomSearchOracle, SampleSpace};
pub use path::{PathPlanner, PathPoint};
pub use placement::{Placement, PlacementList};
pub use planner::{AcceptancePolicy, LoopConfig, PlacementLoop, RunReport, StopCondition};
pub use search::{Decision, LookaheadSearch, SearchConfig};
pub use template::{Category, StructureTemplate, TemplateLibrary};
pub use terrain::TerrainGrid;
pub use world::{NullBuilder, RecordingBuilder, StructureBuilder};

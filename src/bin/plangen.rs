use clap::Parser;
use serde::Serialize;
use townsmith::errors::{PlannerError, PlannerResult};
use townsmith::fitness::{FitnessBreakdown, FitnessEvaluator};
use townsmith::geometry::BlockPos;
use townsmith::path::{PathPlanner, PathPoint};
use townsmith::placement::Placement;
use townsmith::planner::PlacementLoop;
use townsmith::search::LookaheadSearch;
use townsmith::template::TemplateLibrary;
use townsmith::terrain::generation::{TerrainAlgorithm, TerrainGenerator};
use townsmith::world::NullBuilder;
use townsmith::{PlannerConfig, RandomSearchOracle};
use tracing::{info, warn};

#[derive(Parser, Clone)]
#[command(name = "plangen")]
#[command(about = "Plan a settlement layout on synthetic terrain")]
struct Args {
    /// Planning area size in grid cells (format: WIDTHxDEPTH)
    #[arg(long, default_value = "64x64")]
    size: String,

    /// Terrain type preset (flat, hills, ridges)
    #[arg(long, default_value = "hills")]
    terrain_type: String,

    /// Base surface height
    #[arg(long, default_value = "64")]
    base_height: i32,

    /// Cells at or below this height are water
    #[arg(long, default_value = "62")]
    water_level: i32,

    /// Random seed for terrain and oracle; overrides the config file's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Planner config TOML path; defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Where to write the layout TOML
    #[arg(long)]
    output: Option<String>,
}

/// Everything a run produces, serialized for downstream tooling
#[derive(Serialize)]
struct LayoutFile {
    placements: Vec<Placement>,
    path: Vec<PathPoint>,
}

fn parse_size(size: &str) -> PlannerResult<(i32, i32)> {
    let parts: Vec<&str> = size.split('x').collect();
    if parts.len() != 2 {
        return Err(PlannerError::InvalidConfig {
            reason: format!("size must be WIDTHxDEPTH, got '{size}'"),
        });
    }
    let width = parts[0].parse().map_err(|_| PlannerError::InvalidConfig {
        reason: format!("bad width '{}'", parts[0]),
    })?;
    let depth = parts[1].parse().map_err(|_| PlannerError::InvalidConfig {
        reason: format!("bad depth '{}'", parts[1]),
    })?;
    Ok((width, depth))
}

fn terrain_algorithm(name: &str) -> PlannerResult<TerrainAlgorithm> {
    match name {
        "flat" => Ok(TerrainAlgorithm::Flat { height: 64 }),
        "hills" => Ok(TerrainAlgorithm::Perlin {
            amplitude: 6.0,
            frequency: 0.03,
            octaves: 4,
        }),
        "ridges" => Ok(TerrainAlgorithm::Ridged {
            amplitude: 10.0,
            frequency: 0.02,
        }),
        other => Err(PlannerError::InvalidConfig {
            reason: format!("unknown terrain type '{other}' (flat, hills, ridges)"),
        }),
    }
}

fn print_summary(placements: &[Placement], breakdowns: &[FitnessBreakdown]) {
    println!("Planned {} structures:", placements.len());
    for (placement, breakdown) in placements.iter().zip(breakdowns) {
        println!(
            "  {:<12} at ({:>4}, {:>4})  ind {:+.3}  rel {:+.3}  grp {:+.3}",
            placement.template.id,
            placement.origin.x,
            placement.origin.z,
            breakdown.individual,
            breakdown.relational,
            breakdown.group,
        );
    }
}

fn run(args: Args) -> PlannerResult<()> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::load_from_file(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let (width, depth) = parse_size(&args.size)?;
    let generator = TerrainGenerator::new(
        config.seed as u32,
        args.base_height,
        args.water_level,
        terrain_algorithm(&args.terrain_type)?,
    );
    let terrain = generator.generate(width, depth, BlockPos::new(0, args.base_height, 0))?;
    info!(width, depth, terrain_type = %args.terrain_type, "terrain ready");

    let library = TemplateLibrary::default_set();
    let search = LookaheadSearch::new(
        &terrain,
        &library,
        config.fitness_config(),
        config.search_config(),
    );
    let planner = PlacementLoop::new(search, config.loop_config());
    let report = planner.run(&mut RandomSearchOracle, &mut NullBuilder);
    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        elapsed_ms = report.elapsed.as_millis() as u64,
        best_score = report.best_score,
        "placement loop finished"
    );

    // Per-structure breakdown against the rest of the layout, as committed
    let evaluator = FitnessEvaluator::new(
        &terrain,
        config.fitness_config(),
        library.max_footprint_area(),
    );
    let placements = report.placements.as_slice();
    let breakdowns: Vec<FitnessBreakdown> = placements
        .iter()
        .enumerate()
        .map(|(i, p)| evaluator.evaluate_detailed(p, &placements[..i]))
        .collect();
    print_summary(placements, &breakdowns);

    let path = match PathPlanner::new(&terrain).plan(&report.placements) {
        Ok(path) => {
            println!("Connected path: {} cells", path.len());
            path
        }
        Err(PlannerError::UnreachablePath { connected, total }) => {
            warn!(connected, total, "could not connect every structure");
            println!("Path unreachable: connected {connected} of {total} structures");
            Vec::new()
        }
        Err(other) => return Err(other),
    };

    if let Some(output) = &args.output {
        let layout = LayoutFile {
            placements: placements.to_vec(),
            path,
        };
        let contents =
            toml::to_string_pretty(&layout).map_err(PlannerError::SerializationFailed)?;
        std::fs::write(output, contents)?;
        println!("Layout written to {output}");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(error) = run(args) {
        eprintln!("plangen failed: {error}");
        std::process::exit(1);
    }
}

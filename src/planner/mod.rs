use crate::errors::PlannerError;
use crate::fitness::VETO_SCORE;
use crate::oracle::Oracle;
use crate::placement::PlacementList;
use crate::search::LookaheadSearch;
use crate::world::StructureBuilder;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// When the placement loop gives up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Wall-clock budget; checked between iterations with the last iteration's
    /// duration subtracted, so a slow final pass cannot overrun the deadline
    WallClock(Duration),
    Iterations(usize),
    /// Stop after this many consecutive non-improving iterations
    ConsecutiveRejections(usize),
}

/// Whether a decision gets committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcceptancePolicy {
    /// Accept any decision scoring above a fixed threshold
    Threshold(f64),
    /// Accept only decisions beating the best committed score so far
    ImproveOnBest,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub stop: StopCondition,
    pub acceptance: AcceptancePolicy,
    /// Starting oracle seed; incremented once per oracle call
    pub seed: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            stop: StopCondition::Iterations(10),
            acceptance: AcceptancePolicy::Threshold(0.0),
            seed: 0,
        }
    }
}

/// What a run produced. Loop exit is never an error: whatever accumulated in
/// `placements` is returned.
#[derive(Debug)]
pub struct RunReport {
    pub placements: PlacementList,
    pub iterations: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub best_score: f64,
    pub elapsed: Duration,
}

/// Top-level driver: repeatedly runs a lookahead pass, commits accepted
/// placements, and accumulates the final layout.
pub struct PlacementLoop<'a> {
    search: LookaheadSearch<'a>,
    config: LoopConfig,
}

impl<'a> PlacementLoop<'a> {
    pub fn new(search: LookaheadSearch<'a>, config: LoopConfig) -> Self {
        Self { search, config }
    }

    pub fn run(&self, oracle: &mut dyn Oracle, builder: &mut dyn StructureBuilder) -> RunReport {
        let start = Instant::now();
        let mut placements = PlacementList::new();
        let mut seed = self.config.seed;
        let mut iterations = 0usize;
        let mut accepted = 0usize;
        let mut rejected = 0usize;
        let mut consecutive_rejections = 0usize;
        let mut best_score = f64::NEG_INFINITY;
        let mut last_iteration = Duration::ZERO;

        loop {
            let stop = match self.config.stop {
                StopCondition::WallClock(budget) => start.elapsed() + last_iteration >= budget,
                StopCondition::Iterations(count) => iterations >= count,
                StopCondition::ConsecutiveRejections(count) => consecutive_rejections >= count,
            };
            if stop {
                break;
            }

            let iteration_start = Instant::now();
            iterations += 1;

            match self.search.decide(oracle, placements.as_slice(), &mut seed) {
                Ok(decision) => {
                    let vetoed = decision.score <= VETO_SCORE;
                    let accept = !vetoed
                        && match self.config.acceptance {
                            AcceptancePolicy::Threshold(threshold) => decision.score > threshold,
                            AcceptancePolicy::ImproveOnBest => decision.score > best_score,
                        };
                    if accept {
                        best_score = best_score.max(decision.score);
                        if let Err(error) = builder.place(&decision.placement) {
                            warn!(%error, "build side-effect failed, keeping placement");
                        }
                        info!(
                            template = %decision.placement.template.id,
                            x = decision.placement.origin.x,
                            z = decision.placement.origin.z,
                            score = decision.score,
                            "committed placement"
                        );
                        placements.commit(decision.placement);
                        accepted += 1;
                        consecutive_rejections = 0;
                    } else {
                        rejected += 1;
                        consecutive_rejections += 1;
                    }
                }
                Err(PlannerError::OracleExhausted) => {
                    // Non-improving iteration, not fatal
                    rejected += 1;
                    consecutive_rejections += 1;
                }
                Err(error) => {
                    warn!(%error, "lookahead pass failed, skipping iteration");
                    rejected += 1;
                    consecutive_rejections += 1;
                }
            }

            last_iteration = iteration_start.elapsed();
        }

        RunReport {
            placements,
            iterations,
            accepted,
            rejected,
            best_score,
            elapsed: start.elapsed(),
        }
    }
}

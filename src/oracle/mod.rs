use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Parameter bounds the oracle samples from: continuous (x, z) position plus a
/// continuous template parameter that callers truncate to a library index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpace {
    pub x: (f64, f64),
    pub z: (f64, f64),
    pub template: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    pub x: f64,
    pub z: f64,
    pub template: f64,
}

/// Evaluation budget for a single `maximize` call
#[derive(Debug, Clone, Copy)]
pub struct OracleBudget {
    pub total_samples: usize,
    /// Share of the budget spent on uniform exploration before exploitation
    pub exploration_fraction: f64,
}

impl Default for OracleBudget {
    fn default() -> Self {
        Self {
            total_samples: 40,
            exploration_fraction: 0.4,
        }
    }
}

/// One evaluated sample, score attached
#[derive(Debug, Clone, Copy)]
pub struct OracleSample {
    pub score: f64,
    pub params: PlacementParams,
}

/// Black-box global maximizer. The planner only requires that implementations
/// call `objective` finitely often, return every evaluated sample best-first,
/// and behave deterministically for a given seed. The internal search strategy
/// is entirely the implementation's business.
pub trait Oracle {
    fn maximize(
        &mut self,
        space: &SampleSpace,
        objective: &mut dyn FnMut(&PlacementParams) -> f64,
        budget: &OracleBudget,
        seed: u64,
    ) -> Vec<OracleSample>;
}

/// Seeded random search with a light exploitation phase: after the uniform
/// exploration samples, remaining samples perturb the best point found so far
/// within a shrinking fraction of each parameter span.
#[derive(Debug, Clone, Default)]
pub struct RandomSearchOracle;

impl RandomSearchOracle {
    fn sample_uniform(rng: &mut Pcg64, space: &SampleSpace) -> PlacementParams {
        PlacementParams {
            x: sample_range(rng, space.x),
            z: sample_range(rng, space.z),
            template: sample_range(rng, space.template),
        }
    }

    fn perturb(
        rng: &mut Pcg64,
        space: &SampleSpace,
        around: &PlacementParams,
        scale: f64,
    ) -> PlacementParams {
        PlacementParams {
            x: jitter(rng, around.x, space.x, scale),
            z: jitter(rng, around.z, space.z, scale),
            template: jitter(rng, around.template, space.template, scale),
        }
    }
}

fn sample_range(rng: &mut Pcg64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

fn jitter(rng: &mut Pcg64, value: f64, (lo, hi): (f64, f64), scale: f64) -> f64 {
    let span = (hi - lo).max(0.0);
    if span == 0.0 {
        return lo;
    }
    let radius = span * scale;
    (value + rng.gen_range(-radius..=radius)).clamp(lo, hi)
}

impl Oracle for RandomSearchOracle {
    fn maximize(
        &mut self,
        space: &SampleSpace,
        objective: &mut dyn FnMut(&PlacementParams) -> f64,
        budget: &OracleBudget,
        seed: u64,
    ) -> Vec<OracleSample> {
        let mut rng = Pcg64::seed_from_u64(seed);
        let total = budget.total_samples;
        let exploration = ((total as f64) * budget.exploration_fraction.clamp(0.0, 1.0))
            .round() as usize;

        let mut samples: Vec<OracleSample> = Vec::with_capacity(total);
        let mut best: Option<OracleSample> = None;

        for i in 0..total {
            let params = match &best {
                Some(champion) if i >= exploration => {
                    // Shrink the search radius as the exploitation phase runs
                    let progress =
                        (i - exploration) as f64 / (total - exploration).max(1) as f64;
                    let scale = 0.25 * (1.0 - progress) + 0.02;
                    Self::perturb(&mut rng, space, &champion.params, scale)
                }
                _ => Self::sample_uniform(&mut rng, space),
            };
            let score = objective(&params);
            let sample = OracleSample { score, params };
            if best.map_or(true, |b| score > b.score) {
                best = Some(sample);
            }
            samples.push(sample);
        }

        samples.sort_by(|a, b| b.score.total_cmp(&a.score));
        samples
    }
}

use crate::errors::{PlannerError, PlannerResult};
use crate::fitness::FitnessConfig;
use crate::oracle::OracleBudget;
use crate::planner::{AcceptancePolicy, LoopConfig, StopCondition};
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Full configuration surface for a planning run, TOML-serializable.
/// Validated eagerly: a bad config fails before any placement happens.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlannerConfig {
    #[validate(nested)]
    pub search: SearchSettings,
    #[validate(nested)]
    pub oracle: OracleSettings,
    #[validate(nested)]
    pub spacing: SpacingSettings,
    pub acceptance: AcceptanceSettings,
    pub stop: StopSettings,
    /// Starting oracle seed, incremented once per oracle call
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchSettings {
    /// Lookahead depth; 1 disables lookahead
    #[validate(range(min = 1, max = 4))]
    pub depth: usize,
    /// Candidates kept per tree expansion
    #[validate(range(min = 1, max = 8))]
    pub width: usize,
    /// Mean footprint gradient above which a site is vetoed
    #[validate(range(min = 0.0))]
    pub max_steepness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OracleSettings {
    #[validate(range(min = 1, max = 100_000))]
    pub total_samples: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub exploration_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpacingSettings {
    #[validate(range(min = 0.0))]
    pub min: f64,
    #[validate(range(min = 0.0))]
    pub max: f64,
    /// Nearest neighbors examined by the category term
    #[validate(range(min = 1, max = 8))]
    pub neighbors: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceSettings {
    Threshold(f64),
    ImproveOnBest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopSettings {
    WallClockSeconds(f64),
    Iterations(usize),
    MaxConsecutiveRejections(usize),
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search: SearchSettings {
                depth: 1,
                width: 2,
                max_steepness: 0.25,
            },
            oracle: OracleSettings {
                total_samples: 40,
                exploration_fraction: 0.4,
            },
            spacing: SpacingSettings {
                min: 3.0,
                max: 30.0,
                neighbors: 3,
            },
            acceptance: AcceptanceSettings::Threshold(0.0),
            stop: StopSettings::Iterations(15),
            seed: 0,
        }
    }
}

impl PlannerConfig {
    /// Validate ranges and cross-field constraints, consuming and returning
    /// the config so construction sites read as one expression
    pub fn validated(self) -> PlannerResult<Self> {
        self.validate().map_err(|e| PlannerError::InvalidConfig {
            reason: e.to_string(),
        })?;
        if self.spacing.min > self.spacing.max {
            return Err(PlannerError::InvalidConfig {
                reason: format!(
                    "spacing.min ({}) must not exceed spacing.max ({})",
                    self.spacing.min, self.spacing.max
                ),
            });
        }
        if let StopSettings::WallClockSeconds(seconds) = self.stop {
            if !(seconds > 0.0) {
                return Err(PlannerError::InvalidConfig {
                    reason: "stop.wall_clock_seconds must be positive".to_string(),
                });
            }
        }
        Ok(self)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PlannerError::ConfigFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let config: PlannerConfig = toml::from_str(&contents)?;
        config.validated()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> PlannerResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn oracle_budget(&self) -> OracleBudget {
        OracleBudget {
            total_samples: self.oracle.total_samples,
            exploration_fraction: self.oracle.exploration_fraction,
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.search.depth,
            width: self.search.width,
            budget: self.oracle_budget(),
            max_steepness: self.search.max_steepness,
        }
    }

    pub fn fitness_config(&self) -> FitnessConfig {
        FitnessConfig {
            min_spacing: self.spacing.min,
            max_spacing: self.spacing.max,
            neighbor_count: self.spacing.neighbors,
        }
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            stop: match self.stop {
                StopSettings::WallClockSeconds(seconds) => {
                    StopCondition::WallClock(Duration::from_secs_f64(seconds))
                }
                StopSettings::Iterations(count) => StopCondition::Iterations(count),
                StopSettings::MaxConsecutiveRejections(count) => {
                    StopCondition::ConsecutiveRejections(count)
                }
            },
            acceptance: match self.acceptance {
                AcceptanceSettings::Threshold(threshold) => AcceptancePolicy::Threshold(threshold),
                AcceptanceSettings::ImproveOnBest => AcceptancePolicy::ImproveOnBest,
            },
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlannerConfig::default().validated().is_ok());
    }

    #[test]
    fn test_spacing_band_inversion_rejected() {
        let mut config = PlannerConfig::default();
        config.spacing.min = 40.0;
        config.spacing.max = 10.0;
        assert!(matches!(
            config.validated(),
            Err(PlannerError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut config = PlannerConfig::default();
        config.search.depth = 0;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PlannerConfig {
            acceptance: AcceptanceSettings::ImproveOnBest,
            stop: StopSettings::WallClockSeconds(120.0),
            ..PlannerConfig::default()
        };
        let toml_text = toml::to_string_pretty(&config).unwrap();
        let parsed: PlannerConfig = toml::from_str(&toml_text).unwrap();
        assert!(matches!(parsed.acceptance, AcceptanceSettings::ImproveOnBest));
        assert!(matches!(parsed.stop, StopSettings::WallClockSeconds(s) if s == 120.0));
        assert_eq!(parsed.search.width, config.search.width);
    }

    #[test]
    fn test_missing_file_reported() {
        let err = PlannerConfig::load_from_file("/nonexistent/planner.toml").unwrap_err();
        assert!(matches!(err, PlannerError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_loop_config_translation() {
        let config = PlannerConfig {
            stop: StopSettings::MaxConsecutiveRejections(5),
            ..PlannerConfig::default()
        };
        let loop_config = config.loop_config();
        assert_eq!(loop_config.stop, StopCondition::ConsecutiveRejections(5));
    }
}

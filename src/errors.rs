use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    // Configuration errors - validated eagerly, fail fast
    #[error("Planning area has invalid extent: {width}x{depth}")]
    InvalidBounds { width: i32, depth: i32 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Failed to read or write config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    // Runtime outcomes
    #[error("Oracle returned no samples")]
    OracleExhausted,

    #[error("No walkable path connects all structures ({connected}/{total} checkpoints reached)")]
    UnreachablePath { connected: usize, total: usize },

    #[error("Unknown template id: {id}")]
    UnknownTemplate { id: String },
}

/// Result type alias for all planning operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_error_display() {
        let err = PlannerError::InvalidBounds {
            width: 0,
            depth: 64,
        };
        assert!(err.to_string().contains("invalid extent"));

        let err = PlannerError::UnreachablePath {
            connected: 2,
            total: 5,
        };
        assert_eq!(
            err.to_string(),
            "No walkable path connects all structures (2/5 checkpoints reached)"
        );

        let err = PlannerError::OracleExhausted;
        assert_eq!(err.to_string(), "Oracle returned no samples");
    }
}

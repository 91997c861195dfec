use thiserror::Error;

/// Main error type for the sweep planner
#[derive(Error, Debug)]
pub enum MsError {
    #[error("Archetype error: {0}")]
    Archetype(#[from] ArchetypeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while resolving archetypes, templates and species defaults
#[derive(Error, Debug)]
pub enum ArchetypeError {
    #[error("Archetype key not found: {name}")]
    UnknownArchetype { name: String },

    #[error("Configuration template not found: {name}")]
    UnknownTemplate { name: String },

    #[error("No default parameters for vector species: {name}")]
    UnknownSpecies { name: String },

    #[error("Seasonality curve for {species} has {times} times but {values} values")]
    MismatchedSeasonality {
        species: String,
        times: usize,
        values: usize,
    },
}

/// Errors raised by the experiment store and the local file system
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Authentication failed against {url}: {message}")]
    AuthenticationFailure { url: String, message: String },

    #[error("Experiment not found: {experiment_id}")]
    ExperimentNotFound { experiment_id: String },

    #[error("Path not found or unreadable: {path}")]
    PathNotFound { path: String },

    #[error("Simulation {simulation_id} is missing tag {tag}")]
    MissingTag { simulation_id: String, tag: String },

    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    #[error("Response parsing error: {message}")]
    ParseError { message: String },

    #[error("Export failed: {message}")]
    ExportFailed { message: String },
}

/// Errors raised while assembling the baseline or expanding the sweep
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Invalid grid segment [{start}, {stop}) with step {step}")]
    InvalidSegment { start: f64, stop: f64, step: f64 },

    #[error("Sweep grid is empty: {grid}")]
    EmptyGrid { grid: String },

    #[error("Overlay step {step} removed key {key} set by an earlier step")]
    OverlayClobbered { step: String, key: String },

    #[error("Modification index {index} out of range ({len} sets)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Parameter path {path} crosses a non-object value")]
    InvalidPath { path: String },
}

/// Result type alias for sweep planner operations
pub type MsResult<T> = Result<T, MsError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::MsError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::MsError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = StoreError::MissingTag {
            simulation_id: "sim-1".to_string(),
            tag: "Run_Number".to_string(),
        };

        assert!(error.to_string().contains("sim-1"));
        assert!(error.to_string().contains("Run_Number"));
    }

    #[test]
    fn test_error_conversion() {
        let archetype_error = ArchetypeError::UnknownArchetype {
            name: "atlantis".to_string(),
        };
        let ms_error: MsError = archetype_error.into();

        match ms_error {
            MsError::Archetype(ArchetypeError::UnknownArchetype { name }) => {
                assert_eq!(name, "atlantis")
            }
            _ => panic!("Expected Archetype error"),
        }
    }

    #[test]
    fn test_store_errors_are_distinct() {
        let not_found: MsError = StoreError::ExperimentNotFound {
            experiment_id: "cc8002ec".to_string(),
        }
        .into();
        let path: MsError = StoreError::PathNotFound {
            path: "/missing/output".to_string(),
        }
        .into();

        assert!(not_found.to_string().contains("Experiment not found"));
        assert!(path.to_string().contains("/missing/output"));
    }

    #[test]
    fn test_macros() {
        let validation_err = validation_error!("Invalid value: {}", 42);
        let config_err = config_error!("Missing required field: {}", "archetype");

        assert!(matches!(validation_err, MsError::Validation(_)));
        assert!(config_err.to_string().contains("archetype"));
    }
}

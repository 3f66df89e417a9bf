use thiserror::Error;

/// Failures reported by the simulation core.
///
/// Every variant is raised synchronously at the offending call; nothing is
/// retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifeError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    #[error("cell ({row}, {col}) is outside a {width}x{height} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("seeding probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("glider gun count must be 1 or 2, got {0}")]
    InvalidGliderCount(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LifeError>;

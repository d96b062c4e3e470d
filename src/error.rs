use thiserror::Error;

/// Top-level error type for the geodesics engine.
#[derive(Debug, Error)]
pub enum GeodesicsError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Numerics(#[from] NumericsError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl GeodesicsError {
    /// Returns whether this error is a precondition violation: a parameter
    /// combination the model cannot represent.
    #[must_use]
    pub fn is_domain(&self) -> bool {
        match self {
            Self::Geometry(_) | Self::Trajectory(_) => true,
            Self::Numerics(err) => !matches!(err, NumericsError::NoConvergence { .. }),
            Self::Scene(_) => false,
        }
    }

    /// Returns whether an iteration cap was exhausted.
    #[must_use]
    pub fn is_convergence(&self) -> bool {
        matches!(self, Self::Numerics(NumericsError::NoConvergence { .. }))
    }
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised by root finding, integration and lookup tables.
#[derive(Debug, Error)]
pub enum NumericsError {
    #[error("target {target} does not lie between f(a) = {value_a} and f(b) = {value_b}")]
    NotBracketed {
        target: f64,
        value_a: f64,
        value_b: f64,
    },

    #[error("no convergence after {iterations} iterations, remaining gap {gap:e}")]
    NoConvergence { iterations: usize, gap: f64 },

    #[error("{parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("table samples decrease at index {index}")]
    NonMonotonic { index: usize },

    #[error("invalid numeric parameters: {0}")]
    InvalidParameters(String),
}

/// Errors related to free-fall trajectories.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("invalid trajectory input: {0}")]
    Domain(String),

    #[error("height {height} is unreachable, the orbit peaks at {apex}")]
    Unreachable { height: f64, apex: f64 },
}

/// Errors related to the scene context.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("scene has no embedding configured")]
    NoEmbedding,
}

/// Convenience type alias for results using [`GeodesicsError`].
pub type Result<T> = std::result::Result<T, GeodesicsError>;

//! Jonsson's isometric embedding of the Schwarzschild exterior.
//!
//! A `(t, r)` slice of spacetime is drawn as a funnel in 3D: time wraps around
//! the funnel once every `delta_tau_real` seconds and height up the funnel
//! grows with distance from the center of the attracting body. Free-fall
//! worldlines become geodesics of the funnel surface.
mod geodesic;
mod jonsson;
mod transform;

pub use geodesic::{GeodesicTrace, GeodesicTracer, Termination};
pub use jonsson::JonssonEmbedding;
pub use transform::EmbeddingTransform;

use serde::{Deserialize, Serialize};

/// Shape and sampling parameters of the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingParams {
    /// Sine of the slope angle at the bottom of the funnel.
    pub sin_theta_zero: f64,
    /// Proper time per turn around the funnel, in seconds.
    pub delta_tau_real: f64,
    /// Funnel radius at the surface of the body.
    pub bottom_radius: f64,
    /// Outermost embedded distance, as a multiple of the body radius.
    pub max_space_factor: f64,
    /// Number of samples in the height table.
    pub table_size: usize,
    /// Simpson points used per table interval.
    pub table_subdivisions: usize,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            sin_theta_zero: 0.8,
            delta_tau_real: 1.0,
            bottom_radius: 1.0,
            max_space_factor: 100.0,
            table_size: 1000,
            table_subdivisions: 16,
        }
    }
}

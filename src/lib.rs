pub mod embedding;
pub mod error;
pub mod math;
pub mod physics;
pub mod scene;
pub mod transform;

pub use error::{GeodesicsError, Result};

pub mod accelerating_frame;
pub mod constants;
pub mod free_fall;
pub mod path;
pub mod radial_orbit;

pub use accelerating_frame::AcceleratingFrame;
pub use constants::{CentralBody, PhysicalConstants};
pub use free_fall::{distance_travelled_with_constant_acceleration, FreeFall};
pub use path::Path;
pub use radial_orbit::{
    Classification, Crossing, OrbitType, PeakPosition, RadialOrbit, VelocitySign,
};

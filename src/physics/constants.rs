use serde::{Deserialize, Serialize};

/// Physical constants in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Newton's constant, m^3 kg^-1 s^-2.
    pub gravitational_constant: f64,
    /// Speed of light, m/s.
    pub light_speed: f64,
    /// Acceleration of a frame standing on the surface, m/s^2.
    pub surface_gravity: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravitational_constant: 6.674_30e-11,
            light_speed: 299_792_458.0,
            surface_gravity: 9.8,
        }
    }
}

/// A spherical central mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralBody {
    /// Mass in kg.
    pub mass: f64,
    /// Surface radius in m.
    pub radius: f64,
}

impl CentralBody {
    /// The Earth.
    #[must_use]
    pub fn earth() -> Self {
        Self {
            mass: 5.972e24,
            radius: 6.371e6,
        }
    }

    /// Standard gravitational parameter `mu = G M`.
    #[must_use]
    pub fn mu(&self, constants: &PhysicalConstants) -> f64 {
        constants.gravitational_constant * self.mass
    }

    /// Schwarzschild radius `2 G M / c^2`.
    #[must_use]
    pub fn schwarzschild_radius(&self, constants: &PhysicalConstants) -> f64 {
        2.0 * self.mu(constants) / (constants.light_speed * constants.light_speed)
    }
}

impl Default for CentralBody {
    fn default() -> Self {
        Self::earth()
    }
}

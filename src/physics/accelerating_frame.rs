use crate::error::Result;
use crate::math::vector::{line_points, lerp};
use crate::math::Point;
use crate::transform::{Axis, Transform};

use super::free_fall::distance_travelled_with_constant_acceleration;

/// Vertical offset between two frames whose accelerations differ by
/// `delta_acceleration`, at time `t`: `-(t - t0)^2 * delta_acceleration / 2`.
#[must_use]
pub fn distortion(t: f64, t_zero: f64, delta_acceleration: f64) -> f64 {
    -distance_travelled_with_constant_acceleration(t - t_zero, delta_acceleration)
}

/// Change of reference frame between two uniformly accelerating observers.
///
/// Events keep their time; the vertical axis is shifted by [`distortion`].
/// At `t_zero` both frames agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceleratingFrame {
    pub delta_acceleration: f64,
    pub t_zero: f64,
    pub vertical_axis: Axis,
}

impl AcceleratingFrame {
    /// Creates a frame change with `y` as the vertical axis.
    #[must_use]
    pub fn new(delta_acceleration: f64, t_zero: f64) -> Self {
        Self {
            delta_acceleration,
            t_zero,
            vertical_axis: Axis::Y,
        }
    }

    #[must_use]
    pub fn with_vertical_axis(mut self, axis: Axis) -> Self {
        self.vertical_axis = axis;
        self
    }

    /// Frame change from a surface frame accelerating at `g` to free fall.
    #[must_use]
    pub fn surface_to_inertial(g: f64, t_zero: f64) -> Self {
        Self::new(-g, t_zero)
    }

    fn shift(&self, p: &Point, delta_acceleration: f64) -> Point {
        let mut q = *p;
        q[self.vertical_axis.index()] += distortion(p.x, self.t_zero, delta_acceleration);
        q
    }

    /// Applies the frame change.
    #[must_use]
    pub fn apply(&self, p: &Point) -> Point {
        self.shift(p, self.delta_acceleration)
    }

    /// Undoes the frame change.
    #[must_use]
    pub fn invert(&self, p: &Point) -> Point {
        self.shift(p, -self.delta_acceleration)
    }
}

impl Transform for AcceleratingFrame {
    fn forward(&self, p: &Point) -> Result<Point> {
        Ok(self.apply(p))
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        Ok(self.invert(p))
    }
}

/// Maps an event seen from a surface frame accelerating at `g` into free fall.
#[must_use]
pub fn to_inertial(p: &Point, g: f64, t_zero: f64) -> Point {
    AcceleratingFrame::surface_to_inertial(g, t_zero).apply(p)
}

/// Maps a free-falling event into the surface frame accelerating at `g`.
#[must_use]
pub fn from_inertial(p: &Point, g: f64, t_zero: f64) -> Point {
    AcceleratingFrame::surface_to_inertial(g, t_zero).invert(p)
}

/// Samples the free-fall worldline between two surface-frame events.
///
/// The worldline is straight in the inertial frame; the returned `n + 1`
/// points are expressed in the surface frame, where it bends into a parabola.
#[must_use]
pub fn inertial_line_points(start: &Point, end: &Point, g: f64, t_zero: f64, n: usize) -> Vec<Point> {
    let a = to_inertial(start, g, t_zero);
    let b = to_inertial(end, g, t_zero);
    line_points(&a, &b, n)
        .iter()
        .map(|p| from_inertial(p, g, t_zero))
        .collect()
}

/// Two nearby surface-frame points at fraction `u` and `u + 0.01` along the
/// free-fall worldline, for placing a direction arrow.
#[must_use]
pub fn arrow_anchor(start: &Point, end: &Point, g: f64, t_zero: f64, u: f64) -> (Point, Point) {
    let a = to_inertial(start, g, t_zero);
    let b = to_inertial(end, g, t_zero);
    (
        from_inertial(&lerp(&a, &b, u), g, t_zero),
        from_inertial(&lerp(&a, &b, u + 0.01), g, t_zero),
    )
}

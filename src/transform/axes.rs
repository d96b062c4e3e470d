use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::vector::{hadamard_div, hadamard_mul};
use crate::math::{Point, TOLERANCE};

use super::Transform;

/// Component of a [`Point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    W,
}

impl Axis {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
            Self::W => 3,
        }
    }
}

/// Exchanges two components. Self-inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAxes {
    a: Axis,
    b: Axis,
}

impl SwapAxes {
    #[must_use]
    pub fn new(a: Axis, b: Axis) -> Self {
        Self { a, b }
    }
}

impl Transform for SwapAxes {
    fn forward(&self, p: &Point) -> Result<Point> {
        let mut q = *p;
        q.swap_rows(self.a.index(), self.b.index());
        Ok(q)
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        self.forward(p)
    }
}

/// Mirrors `y` inside `[y_min, y_max]`: `y -> y_max - y + y_min`. Self-inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipY {
    pub y_min: f64,
    pub y_max: f64,
}

impl FlipY {
    #[must_use]
    pub fn new(y_min: f64, y_max: f64) -> Self {
        Self { y_min, y_max }
    }
}

impl Transform for FlipY {
    fn forward(&self, p: &Point) -> Result<Point> {
        Ok(Point::new(p.x, self.y_max - p.y + self.y_min, p.z, p.w))
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        self.forward(p)
    }
}

/// Componentwise scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleAxes {
    factors: Point,
}

impl ScaleAxes {
    /// Creates a scaling by `factors`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if any factor is zero.
    pub fn new(factors: Point) -> Result<Self> {
        if factors.iter().any(|f| f.abs() < TOLERANCE) {
            return Err(
                GeometryError::Degenerate(format!("zero scale factor in {factors:?}")).into(),
            );
        }
        Ok(Self { factors })
    }
}

impl Transform for ScaleAxes {
    fn forward(&self, p: &Point) -> Result<Point> {
        Ok(hadamard_mul(p, &self.factors))
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        Ok(hadamard_div(p, &self.factors))
    }
}

/// Oblique projection of `(t, x, y, z)` to `(z + s t, x, y)`.
///
/// Time is folded onto the last spatial axis so a 4D worldline can be drawn
/// in a 3D view. `backward` is an identity placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Project4To3 {
    pub time_scale: f64,
}

impl Project4To3 {
    #[must_use]
    pub fn new(time_scale: f64) -> Self {
        Self { time_scale }
    }
}

impl Transform for Project4To3 {
    fn forward(&self, p: &Point) -> Result<Point> {
        Ok(Point::new(p.w + self.time_scale * p.x, p.y, p.z, 0.0))
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        Ok(*p)
    }

    fn is_exact(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::point4;

    const TOL: f64 = 1e-12;

    #[test]
    fn swap_is_self_inverse() {
        let t = SwapAxes::new(Axis::X, Axis::W);
        let p = point4(1.0, 2.0, 3.0, 4.0);
        let f = t.forward(&p).unwrap();
        assert!((f - point4(4.0, 2.0, 3.0, 1.0)).norm() < TOL);
        assert!((t.backward(&f).unwrap() - p).norm() < TOL);
    }

    #[test]
    fn flip_y_maps_bounds() {
        let t = FlipY::new(10.0, 50.0);
        let f = t.forward(&point4(0.0, 10.0, 0.0, 0.0)).unwrap();
        assert!((f.y - 50.0).abs() < TOL);
        assert!((t.backward(&f).unwrap().y - 10.0).abs() < TOL);
    }

    #[test]
    fn scale_round_trip() {
        let t = ScaleAxes::new(point4(20.0, 1.0, 0.5, -2.0)).unwrap();
        let p = point4(1.0, 2.0, 3.0, 4.0);
        assert!((t.backward(&t.forward(&p).unwrap()).unwrap() - p).norm() < TOL);
        assert!(ScaleAxes::new(point4(1.0, 0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn project_folds_time() {
        let t = Project4To3::new(20.0);
        let f = t.forward(&point4(2.0, 5.0, 6.0, 1.0)).unwrap();
        assert!((f - point4(41.0, 5.0, 6.0, 0.0)).norm() < TOL);
        assert!(!t.is_exact());
    }
}

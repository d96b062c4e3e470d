use crate::error::{GeometryError, Result};
use crate::math::vector::{hadamard_div_2d, hadamard_mul};
use crate::math::{point2, Point, Rect, TOLERANCE};

use super::Transform;

/// Affine map of one rect onto another in the XY plane.
///
/// `z` and `w` pass through unchanged. A target rect with negative height
/// flips the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform2D {
    scale: Point,
    offset: Point,
}

impl LinearTransform2D {
    /// Creates the map sending `from` onto `to`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if `from` or `to` has a zero-size axis.
    pub fn new(from: &Rect, to: &Rect) -> Result<Self> {
        for (name, rect) in [("source", from), ("target", to)] {
            if rect.size.x.abs() < TOLERANCE || rect.size.y.abs() < TOLERANCE {
                return Err(GeometryError::Degenerate(format!(
                    "{name} rect has zero size ({}, {})",
                    rect.size.x, rect.size.y
                ))
                .into());
            }
        }
        let scale = hadamard_div_2d(&to.size, &from.size);
        let offset = to.origin - hadamard_mul(&from.origin, &scale);
        Ok(Self {
            scale,
            offset: point2(offset.x, offset.y),
        })
    }

    #[must_use]
    pub fn scale(&self) -> &Point {
        &self.scale
    }
}

impl Transform for LinearTransform2D {
    fn forward(&self, p: &Point) -> Result<Point> {
        Ok(Point::new(
            p.x * self.scale.x + self.offset.x,
            p.y * self.scale.y + self.offset.y,
            p.z,
            p.w,
        ))
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        Ok(Point::new(
            (p.x - self.offset.x) / self.scale.x,
            (p.y - self.offset.y) / self.scale.y,
            p.z,
            p.w,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::point4;

    const TOL: f64 = 1e-9;

    #[test]
    fn maps_corners() {
        let from = Rect::from_xywh(-10.0, 0.0, 20.0, 100.0);
        let to = Rect::from_xywh(50.0, 450.0, 400.0, -400.0);
        let t = LinearTransform2D::new(&from, &to).unwrap();
        let a = t.forward(&point2(-10.0, 0.0)).unwrap();
        assert!((a - point2(50.0, 450.0)).norm() < TOL);
        let b = t.forward(&point2(10.0, 100.0)).unwrap();
        assert!((b - point2(450.0, 50.0)).norm() < TOL);
    }

    #[test]
    fn passes_trailing_components() {
        let t = LinearTransform2D::new(
            &Rect::from_xywh(0.0, 0.0, 1.0, 1.0),
            &Rect::from_xywh(5.0, 5.0, 2.0, 3.0),
        )
        .unwrap();
        let p = point4(0.5, 0.5, 7.0, -8.0);
        let f = t.forward(&p).unwrap();
        assert!((f.z - 7.0).abs() < TOL && (f.w + 8.0).abs() < TOL);
        assert!((t.backward(&f).unwrap() - p).norm() < TOL);
    }

    #[test]
    fn zero_size_is_degenerate() {
        let r = LinearTransform2D::new(
            &Rect::from_xywh(0.0, 0.0, 0.0, 1.0),
            &Rect::from_xywh(0.0, 0.0, 1.0, 1.0),
        );
        assert!(r.is_err());
    }
}

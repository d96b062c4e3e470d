use serde::{Deserialize, Serialize};

use super::{point2, Point};

/// An axis-aligned rectangle in the XY plane.
///
/// Defined by an origin and a size that may be negative on either axis (a
/// screen rect with negative height flips the vertical direction). The
/// accessors always report normalized bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Corner the size is measured from.
    pub origin: Point,
    /// Signed extent along x and y.
    pub size: Point,
}

impl Rect {
    /// Creates a rect from its origin and signed size.
    #[must_use]
    pub fn new(origin: Point, size: Point) -> Self {
        Self { origin, size }
    }

    /// Creates a rect from plain coordinates.
    #[must_use]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(point2(x, y), point2(width, height))
    }

    /// Returns the smallest rect containing all `points`, or `None` if empty.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut left, mut right) = (first.x, first.x);
        let (mut top, mut bottom) = (first.y, first.y);
        for p in &points[1..] {
            left = left.min(p.x);
            right = right.max(p.x);
            top = top.min(p.y);
            bottom = bottom.max(p.y);
        }
        Some(Self::from_xywh(left, top, right - left, bottom - top))
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.origin.x.min(self.origin.x + self.size.x)
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.origin.x.max(self.origin.x + self.size.x)
    }

    #[must_use]
    pub fn y_min(&self) -> f64 {
        self.origin.y.min(self.origin.y + self.size.y)
    }

    #[must_use]
    pub fn y_max(&self) -> f64 {
        self.origin.y.max(self.origin.y + self.size.y)
    }

    /// Returns the corner with the smallest coordinates.
    #[must_use]
    pub fn min(&self) -> Point {
        point2(self.x_min(), self.y_min())
    }

    /// Returns the corner with the largest coordinates.
    #[must_use]
    pub fn max(&self) -> Point {
        point2(self.x_max(), self.y_max())
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Point {
        let c = self.origin + self.size * 0.5;
        point2(c.x, c.y)
    }

    /// Returns whether `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x_min() && p.x <= self.x_max() && p.y >= self.y_min() && p.y <= self.y_max()
    }

    /// Clamps the `x` and `y` components of `p` into the rect.
    #[must_use]
    pub fn clamp(&self, p: &Point) -> Point {
        Point::new(
            p.x.clamp(self.x_min(), self.x_max()),
            p.y.clamp(self.y_min(), self.y_max()),
            p.z,
            p.w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn negative_size_normalizes() {
        let r = Rect::from_xywh(50.0, 450.0, 400.0, -400.0);
        assert!((r.y_min() - 50.0).abs() < TOL);
        assert!((r.y_max() - 450.0).abs() < TOL);
        assert!((r.center() - point2(250.0, 250.0)).norm() < TOL);
    }

    #[test]
    fn contains_boundary() {
        let r = Rect::from_xywh(0.0, 0.0, 1.0, 1.0);
        assert!(r.contains(&point2(1.0, 0.5)));
        assert!(!r.contains(&point2(1.1, 0.5)));
    }

    #[test]
    fn clamp_keeps_trailing_components() {
        let r = Rect::from_xywh(0.0, 0.0, 1.0, 1.0);
        let p = r.clamp(&Point::new(2.0, -1.0, 3.0, 4.0));
        assert!((p - Point::new(1.0, 0.0, 3.0, 4.0)).norm() < TOL);
    }

    #[test]
    fn bounding_rect() {
        let pts = [point2(1.0, 5.0), point2(-2.0, 3.0), point2(4.0, -1.0)];
        let r = Rect::bounding(&pts).unwrap_or_else(|| Rect::from_xywh(0.0, 0.0, 0.0, 0.0));
        assert!((r.min() - point2(-2.0, -1.0)).norm() < TOL);
        assert!((r.max() - point2(4.0, 5.0)).norm() < TOL);
        assert!(Rect::bounding(&[]).is_none());
    }
}

use crate::error::Result;

use super::vector::{cross, invert_y, normalize};
use super::Point;

/// A pinhole camera projecting 3D points onto a screen.
///
/// The basis is built once at construction:
/// `forward = normalize(look_at - position)`,
/// `right = normalize(forward x up)`, `true_up = normalize(right x forward)`.
/// Screen `y` grows downward.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point,
    right: Point,
    up: Point,
    forward: Point,
    focal_length: f64,
    principal_point: Point,
    near: f64,
}

impl Camera {
    /// Default near-plane depth.
    pub const DEFAULT_NEAR: f64 = 1.0;

    /// Creates a new camera.
    ///
    /// # Arguments
    ///
    /// * `position` - Camera center
    /// * `look_at` - Point the camera looks at
    /// * `up` - Approximate up direction (must not be parallel to the view direction)
    /// * `focal_length` - Scalar focal distance in screen units
    /// * `principal_point` - Screen position of the optical axis
    ///
    /// # Errors
    ///
    /// Returns an error if `look_at` coincides with `position` or `up` is
    /// parallel to the view direction.
    pub fn new(
        position: Point,
        look_at: Point,
        up: Point,
        focal_length: f64,
        principal_point: Point,
    ) -> Result<Self> {
        Self::with_near(
            position,
            look_at,
            up,
            focal_length,
            principal_point,
            Self::DEFAULT_NEAR,
        )
    }

    /// Creates a new camera with an explicit near-plane depth.
    ///
    /// # Errors
    ///
    /// See [`Camera::new`].
    pub fn with_near(
        position: Point,
        look_at: Point,
        up: Point,
        focal_length: f64,
        principal_point: Point,
        near: f64,
    ) -> Result<Self> {
        let to_3d = |p: Point| Point::new(p.x, p.y, p.z, 0.0);
        let position = to_3d(position);
        let forward = normalize(&(to_3d(look_at) - position))?;
        let right = normalize(&cross(&forward, &to_3d(up)))?;
        let up = normalize(&cross(&right, &forward))?;
        Ok(Self {
            position,
            right,
            up,
            forward,
            focal_length,
            principal_point,
            near,
        })
    }

    /// Returns the camera center.
    #[must_use]
    pub fn position(&self) -> &Point {
        &self.position
    }

    /// Returns the unit view direction.
    #[must_use]
    pub fn forward(&self) -> &Point {
        &self.forward
    }

    /// Projects a point onto the screen.
    ///
    /// Returns `(sx, sy, depth, 0)`. Depth is clamped to the near plane so
    /// points at or behind the camera never divide by zero.
    #[must_use]
    pub fn project(&self, p: &Point) -> Point {
        let ray = Point::new(p.x, p.y, p.z, 0.0) - self.position;
        let depth = self.forward.dot(&ray).max(self.near);
        let scale = self.focal_length / depth;
        let cam = Point::new(self.right.dot(&ray) * scale, self.up.dot(&ray) * scale, 0.0, 0.0);
        let screen = invert_y(&cam) + self.principal_point;
        Point::new(screen.x, screen.y, depth, 0.0)
    }
}

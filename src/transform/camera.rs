use crate::error::Result;
use crate::math::{Camera, Point};

use super::Transform;

/// Pinhole projection as a transform step.
///
/// `forward` yields `(sx, sy, depth, 0)`; `backward` is an identity
/// placeholder since depth alone cannot recover the dropped direction.
#[derive(Debug, Clone)]
pub struct CameraTransform {
    camera: Camera,
}

impl CameraTransform {
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self { camera }
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}

impl Transform for CameraTransform {
    fn forward(&self, p: &Point) -> Result<Point> {
        Ok(self.camera.project(p))
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
    use crate::math::{point2, point3};

    const TOL: f64 = 1e-9;

    fn looking_down_z() -> CameraTransform {
        let camera = Camera::new(
            point3(0.0, 0.0, -10.0),
            Point::zeros(),
            point3(0.0, 1.0, 0.0),
            100.0,
            point2(200.0, 200.0),
        )
        .unwrap();
        CameraTransform::new(camera)
    }

    #[test]
    fn forward_projects_onto_screen() {
        let t = looking_down_z();
        let s = t.forward(&point3(0.0, 2.0, 10.0)).unwrap();
        // Depth 20 halves the offset seen at depth 10.
        assert!((s - Point::new(200.0, 190.0, 20.0, 0.0)).norm() < TOL);
        let direct = t.camera().project(&point3(0.0, 2.0, 10.0));
        assert!((s - direct).norm() < TOL);
    }

    #[test]
    fn backward_is_a_placeholder() {
        let t = looking_down_z();
        assert!(!t.is_exact());
        let p = point3(12.0, 34.0, 5.0);
        assert!((t.backward(&p).unwrap() - p).norm() < TOL);
    }
}

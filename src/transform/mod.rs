mod axes;
mod camera;
mod linear;

pub use axes::{Axis, FlipY, Project4To3, ScaleAxes, SwapAxes};
pub use camera::CameraTransform;
pub use linear::LinearTransform2D;

use crate::error::Result;
use crate::math::Point;

/// Reversible point mapping between two coordinate systems.
pub trait Transform {
    /// Maps a point into the target coordinate system.
    ///
    /// # Errors
    ///
    /// Returns an error if the point lies outside the transform's domain.
    fn forward(&self, p: &Point) -> Result<Point>;

    /// Maps a point back into the source coordinate system.
    ///
    /// # Errors
    ///
    /// Returns an error if the point lies outside the transform's range.
    fn backward(&self, p: &Point) -> Result<Point>;

    /// Returns whether `backward` exactly inverts `forward`.
    ///
    /// Projections that drop information keep a placeholder `backward` and
    /// report `false`.
    fn is_exact(&self) -> bool {
        true
    }

    /// Maps every point of a polyline forward.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Transform::forward`].
    fn forward_all(&self, points: &[Point]) -> Result<Vec<Point>> {
        points.iter().map(|p| self.forward(p)).collect()
    }
}

/// Transform built from a pair of closures.
pub struct FnTransform<F, B> {
    forward: F,
    backward: B,
    exact: bool,
}

impl<F, B> FnTransform<F, B>
where
    F: Fn(&Point) -> Result<Point>,
    B: Fn(&Point) -> Result<Point>,
{
    /// Creates an exact transform from a forward map and its inverse.
    #[must_use]
    pub fn new(forward: F, backward: B) -> Self {
        Self {
            forward,
            backward,
            exact: true,
        }
    }

    /// Marks `backward` as an approximate inverse.
    #[must_use]
    pub fn inexact(mut self) -> Self {
        self.exact = false;
        self
    }
}

impl<F, B> Transform for FnTransform<F, B>
where
    F: Fn(&Point) -> Result<Point>,
    B: Fn(&Point) -> Result<Point>,
{
    fn forward(&self, p: &Point) -> Result<Point> {
        (self.forward)(p)
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        (self.backward)(p)
    }

    fn is_exact(&self) -> bool {
        self.exact
    }
}

/// Ordered chain of transforms.
///
/// `forward` applies the steps first to last, `backward` applies their
/// inverses last to first.
#[derive(Default)]
pub struct ComposedTransform<'a> {
    steps: Vec<Box<dyn Transform + 'a>>,
}

impl<'a> ComposedTransform<'a> {
    /// Creates an empty (identity) chain.
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step to the end of the chain.
    pub fn push<T: Transform + 'a>(&mut self, step: T) {
        self.steps.push(Box::new(step));
    }

    /// Builder form of [`ComposedTransform::push`].
    #[must_use]
    pub fn then<T: Transform + 'a>(mut self, step: T) -> Self {
        self.push(step);
        self
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transform for ComposedTransform<'_> {
    fn forward(&self, p: &Point) -> Result<Point> {
        self.steps.iter().try_fold(*p, |acc, step| step.forward(&acc))
    }

    fn backward(&self, p: &Point) -> Result<Point> {
        self.steps
            .iter()
            .rev()
            .try_fold(*p, |acc, step| step.backward(&acc))
    }

    fn is_exact(&self) -> bool {
        self.steps.iter().all(|step| step.is_exact())
    }
}

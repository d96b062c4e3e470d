use serde::{Deserialize, Serialize};

use crate::embedding::{EmbeddingTransform, JonssonEmbedding};
use crate::error::{Result, SceneError};
use crate::math::{point3, Camera, Point, Rect};
use crate::physics::AcceleratingFrame;
use crate::transform::{
    Axis, CameraTransform, ComposedTransform, FlipY, LinearTransform2D, Project4To3, ScaleAxes,
    SwapAxes,
};

use super::ViewParams;

slotmap::new_key_type! {
    /// Unique identifier for a graph in a scene.
    pub struct GraphId;
}

/// Which pipeline a graph uses to map events to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    /// Time across, height up.
    T1S1,
    /// Second space axis across, height up.
    S2,
    /// Three space axes in perspective.
    S3,
    /// Time and two space axes in perspective.
    T1S2,
    /// Time folded onto the third space axis, in perspective.
    T1S3,
    /// Time across, distance from the center up, for inverse-square gravity.
    Spacetime,
    /// The Jonsson funnel seen by an orbiting camera.
    Funnel,
}

impl GraphKind {
    /// Returns whether the kind's transform has an exact inverse.
    #[must_use]
    pub fn is_exact(self) -> bool {
        matches!(self, Self::T1S1 | Self::S2 | Self::Spacetime)
    }

    /// Returns whether the kind draws the flat constant-gravity picture.
    #[must_use]
    pub fn is_constant_gravity(self) -> bool {
        matches!(self, Self::T1S1 | Self::S2 | Self::S3 | Self::T1S2 | Self::T1S3)
    }
}

/// Shared inputs every graph pipeline is built from.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    /// The visible spacetime window.
    pub window: Rect,
    pub view: ViewParams,
    pub surface_gravity: f64,
    pub embedding: Option<&'a JonssonEmbedding>,
}

/// A view of the scene: a screen rectangle and the frame it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub kind: GraphKind,
    /// Target rectangle in screen pixels.
    pub rect: Rect,
    /// Acceleration of the frame the graph is drawn in.
    pub frame_acceleration: f64,
}

impl Graph {
    #[must_use]
    pub fn new(kind: GraphKind, rect: Rect, frame_acceleration: f64) -> Self {
        Self {
            kind,
            rect,
            frame_acceleration,
        }
    }

    /// Builds the transform from scene coordinates to screen pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoEmbedding`] for a funnel graph without an
    /// embedding, or an error if a window or camera is degenerate.
    pub fn transform<'a>(&self, ctx: &ViewContext<'a>) -> Result<ComposedTransform<'a>> {
        let window = &ctx.window;
        let view = &ctx.view;
        let distortion = AcceleratingFrame::new(
            self.frame_acceleration - ctx.surface_gravity,
            window.center().x,
        );

        let composed = match self.kind {
            GraphKind::T1S1 => ComposedTransform::new()
                .then(distortion)
                .then(LinearTransform2D::new(window, &self.rect)?),
            GraphKind::S2 => {
                let space = Rect::from_xywh(
                    window.y_min(),
                    window.y_min(),
                    window.size.y.abs(),
                    window.size.y.abs(),
                );
                ComposedTransform::new()
                    .then(distortion)
                    .then(SwapAxes::new(Axis::X, Axis::Z))
                    .then(LinearTransform2D::new(&space, &self.rect)?)
            }
            GraphKind::S3 => {
                let c = window.center().y;
                let camera = self.orbit_camera(view, point3(c, c, c))?;
                ComposedTransform::new()
                    .then(distortion)
                    .then(SwapAxes::new(Axis::X, Axis::W))
                    .then(CameraTransform::new(camera))
            }
            GraphKind::T1S2 => {
                let camera = self.orbit_camera(view, window.center())?;
                ComposedTransform::new()
                    .then(distortion)
                    .then(ScaleAxes::new(Point::new(view.time_scale, 1.0, 1.0, 1.0))?)
                    .then(CameraTransform::new(camera))
            }
            GraphKind::T1S3 => {
                let camera = self.orbit_camera(view, window.center())?;
                ComposedTransform::new()
                    .then(distortion)
                    .then(Project4To3::new(view.time_scale))
                    .then(CameraTransform::new(camera))
            }
            GraphKind::Spacetime => ComposedTransform::new()
                .then(FlipY::new(window.y_min(), window.y_max()))
                .then(LinearTransform2D::new(window, &self.rect)?),
            GraphKind::Funnel => {
                let embedding = ctx.embedding.ok_or(SceneError::NoEmbedding)?;
                ComposedTransform::new()
                    .then(EmbeddingTransform::new(embedding))
                    .then(CameraTransform::new(self.funnel_camera(view)?))
            }
        };
        Ok(composed)
    }

    /// Camera circling the window at `view.camera_distance`, a quarter of
    /// that distance up.
    fn orbit_camera(&self, view: &ViewParams, look_at: Point) -> Result<Camera> {
        let d = view.camera_distance;
        let (s, c) = view.view_angle.sin_cos();
        Camera::new(
            point3(d * c, d / 4.0, d * s),
            look_at,
            point3(0.0, 1.0, 0.0),
            view.focal_length,
            self.rect.center(),
        )
    }

    /// Camera orbiting the funnel axis, looking at the target height.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera looks straight along the funnel axis.
    pub fn funnel_camera(&self, view: &ViewParams) -> Result<Camera> {
        let d = view.funnel_distance;
        let (st, ct) = view.view_angle.sin_cos();
        let (sp, cp) = view.vertical_view_angle.sin_cos();
        let target = point3(0.0, 0.0, view.funnel_target_height);
        Camera::new(
            point3(d * st * cp, d * ct * cp, view.funnel_target_height + d * sp),
            target,
            point3(0.0, 0.0, 1.0),
            self.funnel_focal_length(view),
            self.rect.center(),
        )
    }

    /// Focal length giving the funnel camera its vertical field of view over
    /// the graph's height.
    #[must_use]
    pub fn funnel_focal_length(&self, view: &ViewParams) -> f64 {
        0.5 * self.rect.size.y.abs() / (0.5 * view.funnel_fov.to_radians()).tan()
    }
}

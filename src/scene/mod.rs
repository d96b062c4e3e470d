//! Session state shared by the views: the spacetime window, the
//! trajectories, the graphs drawing them and the view parameters.
mod graph;
mod trajectory;

pub use graph::{Graph, GraphId, GraphKind, ViewContext};
pub use trajectory::{MarkerStyle, Rgb, Trajectory, TrajectoryEnd, TrajectoryId, TrajectoryKind};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::embedding::{EmbeddingParams, JonssonEmbedding};
use crate::error::{Result, SceneError, TrajectoryError};
use crate::math::vector::normalize;
use crate::math::{Camera, Point, Rect};
use crate::physics::accelerating_frame::inertial_line_points;
use crate::physics::{CentralBody, FreeFall, OrbitType, Path, PhysicalConstants, RadialOrbit};
use crate::transform::{ComposedTransform, Transform};

/// Samples on a constant-gravity worldline.
const LINE_POINTS: usize = 100;
/// Height steps of an inverse-square path.
const FREE_FALL_POINTS: usize = 500;
/// Fraction step used to find the direction of travel along a path.
const FOLLOW_STEP: f64 = 0.001;
/// Follow camera offset along the surface normal.
const FOLLOW_RISE: f64 = 0.4;
/// Follow camera offset behind the moving point.
const FOLLOW_TRAIL: f64 = 0.8;
/// Near plane of the follow camera, well inside its distance to the point.
const FOLLOW_NEAR: f64 = 0.1;

/// Numeric view parameters shared by every graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewParams {
    /// Horizontal orbit angle of the perspective cameras, in radians.
    pub view_angle: f64,
    /// Elevation of the funnel camera, in radians.
    pub vertical_view_angle: f64,
    pub camera_distance: f64,
    pub focal_length: f64,
    /// Screen units per second on time axes drawn in perspective.
    pub time_scale: f64,
    /// Distance of the funnel camera from its target.
    pub funnel_distance: f64,
    /// Height on the funnel axis the funnel camera looks at.
    pub funnel_target_height: f64,
    /// Vertical field of view of the funnel camera, in degrees.
    pub funnel_fov: f64,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            view_angle: 0.0,
            vertical_view_angle: 0.0,
            camera_distance: 500.0,
            focal_length: 1400.0,
            time_scale: 20.0,
            funnel_distance: 10.0,
            funnel_target_height: 1.0,
            funnel_fov: 22.0,
        }
    }
}

/// Everything needed to set up a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub constants: PhysicalConstants,
    pub body: CentralBody,
    /// Visible spacetime window, time across and height up.
    pub window: Rect,
    pub view: ViewParams,
    /// Funnel shape; `None` leaves the scene flat.
    pub embedding: Option<EmbeddingParams>,
}

impl Default for SceneConfig {
    /// The constant-gravity picture: 8 s around `t = 0`, heights from -10 m
    /// to 60 m.
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            body: CentralBody::earth(),
            window: Rect::from_xywh(-4.0, -10.0, 8.0, 70.0),
            view: ViewParams::default(),
            embedding: None,
        }
    }
}

impl SceneConfig {
    /// The inverse-square picture around the Earth: heights from the surface
    /// to `height` above it, over the time needed to fall from that height,
    /// with the default funnel.
    ///
    /// # Errors
    ///
    /// Returns an error if `height` is not positive.
    pub fn variable_gravity(height: f64) -> Result<Self> {
        let mut config = Self {
            embedding: Some(EmbeddingParams::default()),
            ..Self::default()
        };
        config.window = variable_gravity_window(&config.constants, &config.body, height)?;
        Ok(config)
    }
}

/// Window centered on `t = 0` spanning, on each side, the fall time from
/// `height` above the surface; heights run from the surface up `height`.
///
/// # Errors
///
/// Returns an error if `height` is not positive.
pub fn variable_gravity_window(
    constants: &PhysicalConstants,
    body: &CentralBody,
    height: f64,
) -> Result<Rect> {
    if !(height > 0.0) {
        return Err(TrajectoryError::Domain(format!(
            "window height must be positive, got {height}"
        ))
        .into());
    }
    let time_width =
        FreeFall::new(body.mu(constants)).fall_time(body.radius + height, body.radius)?;
    Ok(Rect::from_xywh(-time_width, body.radius, 2.0 * time_width, height))
}

/// Explicit session state replacing shared globals.
///
/// Trajectories and graphs are referenced by generational IDs, so a stale
/// ID is reported instead of aliasing a newer entity.
#[derive(Debug)]
pub struct Scene {
    constants: PhysicalConstants,
    body: CentralBody,
    window: Rect,
    view: ViewParams,
    embedding: Option<JonssonEmbedding>,
    trajectories: SlotMap<TrajectoryId, Trajectory>,
    graphs: SlotMap<GraphId, Graph>,
}

impl Scene {
    /// Creates an empty scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured embedding cannot be built.
    pub fn new(config: SceneConfig) -> Result<Self> {
        let embedding = config
            .embedding
            .map(|params| JonssonEmbedding::new(params, &config.constants, &config.body))
            .transpose()?;
        Ok(Self {
            constants: config.constants,
            body: config.body,
            window: config.window,
            view: config.view,
            embedding,
            trajectories: SlotMap::with_key(),
            graphs: SlotMap::with_key(),
        })
    }

    #[must_use]
    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    #[must_use]
    pub fn body(&self) -> &CentralBody {
        &self.body
    }

    #[must_use]
    pub fn window(&self) -> &Rect {
        &self.window
    }

    /// Replaces the visible window. Cached paths depend on it and are dropped.
    pub fn set_window(&mut self, window: Rect) {
        self.window = window;
        for trajectory in self.trajectories.values_mut() {
            trajectory.invalidate();
        }
    }

    /// See [`variable_gravity_window`].
    ///
    /// # Errors
    ///
    /// Returns an error if `height` is not positive.
    pub fn variable_gravity_window(&self, height: f64) -> Result<Rect> {
        variable_gravity_window(&self.constants, &self.body, height)
    }

    #[must_use]
    pub fn view(&self) -> &ViewParams {
        &self.view
    }

    pub fn set_view_angle(&mut self, view_angle: f64) {
        self.view.view_angle = view_angle;
    }

    pub fn set_vertical_view_angle(&mut self, vertical_view_angle: f64) {
        self.view.vertical_view_angle = vertical_view_angle;
    }

    #[must_use]
    pub fn embedding(&self) -> Option<&JonssonEmbedding> {
        self.embedding.as_ref()
    }

    /// Mutable access to the funnel, for reshaping it.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoEmbedding`] for a flat scene.
    pub fn embedding_mut(&mut self) -> Result<&mut JonssonEmbedding> {
        Ok(self.embedding.as_mut().ok_or(SceneError::NoEmbedding)?)
    }

    // --- Trajectory operations ---

    /// Inserts a trajectory and returns its ID.
    pub fn add_trajectory(&mut self, trajectory: Trajectory) -> TrajectoryId {
        self.trajectories.insert(trajectory)
    }

    /// Returns a reference to the trajectory, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn trajectory(&self, id: TrajectoryId) -> Result<&Trajectory> {
        Ok(self
            .trajectories
            .get(id)
            .ok_or_else(|| SceneError::EntityNotFound("trajectory".into()))?)
    }

    /// Returns a mutable reference to the trajectory, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn trajectory_mut(&mut self, id: TrajectoryId) -> Result<&mut Trajectory> {
        Ok(self
            .trajectories
            .get_mut(id)
            .ok_or_else(|| SceneError::EntityNotFound("trajectory".into()))?)
    }

    /// Removes a trajectory and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn remove_trajectory(&mut self, id: TrajectoryId) -> Result<Trajectory> {
        Ok(self
            .trajectories
            .remove(id)
            .ok_or_else(|| SceneError::EntityNotFound("trajectory".into()))?)
    }

    /// Iterates over all trajectories.
    pub fn trajectories(&self) -> impl Iterator<Item = (TrajectoryId, &Trajectory)> {
        self.trajectories.iter()
    }

    /// Moves one endpoint to a spacetime event.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn move_end(&mut self, id: TrajectoryId, end: TrajectoryEnd, p: Point) -> Result<()> {
        self.trajectory_mut(id)?.set_end(end, p);
        Ok(())
    }

    /// Moves one endpoint to the event under a screen point of a graph.
    ///
    /// Returns the new event.
    ///
    /// # Errors
    ///
    /// Returns an error if an ID is stale or the graph cannot map the point
    /// back.
    pub fn drag_end(
        &mut self,
        id: TrajectoryId,
        end: TrajectoryEnd,
        graph: GraphId,
        screen: &Point,
    ) -> Result<Point> {
        let p = self.graph_transform(graph)?.backward(screen)?;
        self.move_end(id, end, p)?;
        Ok(p)
    }

    /// Restores every marker to its default look.
    ///
    /// Returns the trajectory that had a highlighted marker, if any.
    pub fn reset_markers(&mut self) -> Option<TrajectoryId> {
        let mut highlighted = None;
        for (id, trajectory) in &mut self.trajectories {
            if trajectory.reset_markers() {
                highlighted = Some(id);
            }
        }
        highlighted
    }

    /// Highlights one endpoint marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn highlight_end(&mut self, id: TrajectoryId, end: TrajectoryEnd) -> Result<()> {
        self.trajectory_mut(id)?.highlight_end(end);
        Ok(())
    }

    fn compute_path(&self, trajectory: &Trajectory) -> Result<(Path, Option<OrbitType>)> {
        let [start, end] = trajectory.ends();
        match trajectory.kind() {
            TrajectoryKind::ConstantGravity => {
                let points = inertial_line_points(
                    start,
                    end,
                    self.constants.surface_gravity,
                    self.window.center().x,
                    LINE_POINTS,
                );
                Ok((points.into_iter().collect(), None))
            }
            TrajectoryKind::InverseSquare => {
                let solver = RadialOrbit::new(self.body.mu(&self.constants));
                let (path, orbit) = solver.free_fall_path(
                    start,
                    end,
                    self.body.radius,
                    self.window.y_max(),
                    FREE_FALL_POINTS,
                )?;
                Ok((path, Some(orbit)))
            }
        }
    }

    /// Returns the trajectory's path, computing it if the cache is stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is stale or the path cannot be computed;
    /// the trajectory keeps no path in that case.
    pub fn trajectory_path(&mut self, id: TrajectoryId) -> Result<&Path> {
        let trajectory = self.trajectory(id)?;
        if trajectory.path().is_none() {
            let (path, orbit) = self.compute_path(trajectory)?;
            self.trajectory_mut(id)?.store_path(path, orbit);
        }
        self.trajectory(id)?
            .path()
            .ok_or_else(|| SceneError::EntityNotFound("trajectory path".into()).into())
    }

    /// Dense spacetime polyline of a trajectory.
    ///
    /// # Errors
    ///
    /// See [`Scene::trajectory_path`].
    pub fn trajectory_points(&mut self, id: TrajectoryId) -> Result<&[Point]> {
        Ok(self.trajectory_path(id)?.points())
    }

    /// Event reached after fraction `u` of the trajectory's elapsed time.
    ///
    /// # Errors
    ///
    /// See [`Scene::trajectory_path`].
    pub fn trajectory_position(&mut self, id: TrajectoryId, u: f64) -> Result<Point> {
        let path = self.trajectory_path(id)?;
        path.interpolate_time(u)
            .ok_or_else(|| TrajectoryError::Domain("trajectory has no points".into()).into())
    }

    /// The trajectory mapped onto the funnel.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoEmbedding`] for a flat scene, or an error if
    /// the path leaves the embedded range.
    pub fn embedded_trajectory(&mut self, id: TrajectoryId) -> Result<Vec<Point>> {
        self.trajectory_path(id)?;
        let embedding = self.embedding.as_ref().ok_or(SceneError::NoEmbedding)?;
        let path = self.trajectory(id)?.path().map(Path::points).unwrap_or_default();
        path.iter()
            .map(|p| embedding.embedding_point_from_spacetime(p))
            .collect()
    }

    /// Camera riding along a trajectory on the funnel: above the surface at
    /// fraction `u` of the path, looking down at it from behind.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NoEmbedding`] for a flat scene, or an error if
    /// the path leaves the embedded range.
    pub fn follow_camera(&mut self, id: TrajectoryId, u: f64, screen: &Rect) -> Result<Camera> {
        let here = self.trajectory_position(id, u)?;
        let (near, ahead) = if u < 1.0 - FOLLOW_STEP {
            (here, self.trajectory_position(id, u + FOLLOW_STEP)?)
        } else {
            (self.trajectory_position(id, u - FOLLOW_STEP)?, here)
        };
        let embedding = self.embedding.as_ref().ok_or(SceneError::NoEmbedding)?;
        let p = embedding.embedding_point_from_spacetime(&here)?;
        let n = embedding.surface_normal_from_spacetime(&here)?;
        let v = normalize(
            &(embedding.embedding_point_from_spacetime(&ahead)?
                - embedding.embedding_point_from_spacetime(&near)?),
        )?;
        let graph = Graph::new(GraphKind::Funnel, *screen, 0.0);
        Camera::with_near(
            p + n * FOLLOW_RISE - v * FOLLOW_TRAIL,
            p,
            n,
            graph.funnel_focal_length(&self.view),
            screen.center(),
            FOLLOW_NEAR,
        )
    }

    // --- Graph operations ---

    /// Inserts a graph and returns its ID.
    pub fn add_graph(&mut self, graph: Graph) -> GraphId {
        self.graphs.insert(graph)
    }

    /// Returns a reference to the graph, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn graph(&self, id: GraphId) -> Result<&Graph> {
        Ok(self
            .graphs
            .get(id)
            .ok_or_else(|| SceneError::EntityNotFound("graph".into()))?)
    }

    /// Removes a graph and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn remove_graph(&mut self, id: GraphId) -> Result<Graph> {
        Ok(self
            .graphs
            .remove(id)
            .ok_or_else(|| SceneError::EntityNotFound("graph".into()))?)
    }

    /// Iterates over all graphs.
    pub fn graphs(&self) -> impl Iterator<Item = (GraphId, &Graph)> {
        self.graphs.iter()
    }

    /// Draws every graph in a frame with the given acceleration.
    pub fn set_frame_acceleration(&mut self, acceleration: f64) {
        for graph in self.graphs.values_mut() {
            graph.frame_acceleration = acceleration;
        }
    }

    fn view_context(&self) -> ViewContext<'_> {
        ViewContext {
            window: self.window,
            view: self.view,
            surface_gravity: self.constants.surface_gravity,
            embedding: self.embedding.as_ref(),
        }
    }

    /// Builds the graph's current transform from scene coordinates to
    /// screen pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is stale or the transform cannot be built.
    pub fn graph_transform(&self, id: GraphId) -> Result<ComposedTransform<'_>> {
        self.graph(id)?.transform(&self.view_context())
    }

    /// A trajectory's path as drawn by a graph.
    ///
    /// # Errors
    ///
    /// Returns an error if an ID is stale, the path cannot be computed or a
    /// point falls outside the graph's domain.
    pub fn screen_polyline(&mut self, trajectory: TrajectoryId, graph: GraphId) -> Result<Vec<Point>> {
        self.trajectory_path(trajectory)?;
        let transform = self.graph_transform(graph)?;
        let points = self.trajectory(trajectory)?.path().map(Path::points).unwrap_or_default();
        transform.forward_all(points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GeodesicsError;
    use crate::math::{point2, point3, point4};

    const R: f64 = 6.371e6;

    fn flat_scene() -> Scene {
        Scene::new(SceneConfig::default()).unwrap()
    }

    fn dropped_ball() -> Trajectory {
        Trajectory::new(
            point4(0.0, 44.1, 20.0, 10.0),
            point4(3.0, 0.0, 20.0, 10.0),
            TrajectoryKind::ConstantGravity,
            Rgb(255, 100, 100),
            Rgb(200, 100, 100),
        )
    }

    fn launch(scene: &mut Scene) -> TrajectoryId {
        scene.add_trajectory(Trajectory::new(
            point2(0.0, R),
            point2(1200.0, R + 4.3e6),
            TrajectoryKind::InverseSquare,
            Rgb::UNBOUND,
            Rgb::UNBOUND,
        ))
    }

    fn earth_scene() -> Scene {
        let mut config = SceneConfig::variable_gravity(21e6).unwrap();
        config.embedding = Some(EmbeddingParams {
            delta_tau_real: 2000.0,
            ..EmbeddingParams::default()
        });
        Scene::new(config).unwrap()
    }

    #[test]
    fn stale_ids_are_reported() {
        let mut scene = flat_scene();
        let id = scene.add_trajectory(dropped_ball());
        assert!(scene.trajectory(id).is_ok());
        scene.remove_trajectory(id).unwrap();
        let err = scene.trajectory(id).unwrap_err();
        assert!(matches!(err, GeodesicsError::Scene(SceneError::EntityNotFound(_))));
        assert!(scene.remove_trajectory(id).is_err());

        let g = scene.add_graph(Graph::new(GraphKind::T1S1, Rect::from_xywh(0.0, 0.0, 400.0, 400.0), 9.8));
        scene.remove_graph(g).unwrap();
        assert!(scene.graph_transform(g).is_err());
    }

    #[test]
    fn constant_gravity_path_joins_the_ends() {
        let mut scene = flat_scene();
        let id = scene.add_trajectory(dropped_ball());
        let points = scene.trajectory_points(id).unwrap();
        assert_eq!(points.len(), LINE_POINTS + 1);
        assert!((points[0] - point4(0.0, 44.1, 20.0, 10.0)).norm() < 1e-9);
        assert!((points[LINE_POINTS] - point4(3.0, 0.0, 20.0, 10.0)).norm() < 1e-9);
        assert!(scene.trajectory(id).unwrap().orbit().is_none());
    }

    #[test]
    fn moving_an_end_recomputes_lazily() {
        let mut scene = flat_scene();
        let id = scene.add_trajectory(dropped_ball());
        let before = scene.trajectory_points(id).unwrap()[LINE_POINTS];
        scene
            .move_end(id, TrajectoryEnd::End, point4(2.0, 24.5, 20.0, 10.0))
            .unwrap();
        assert!(scene.trajectory(id).unwrap().path().is_none());
        let after = scene.trajectory_points(id).unwrap()[LINE_POINTS];
        assert!((after.x - 2.0).abs() < 1e-9);
        assert!((before - after).norm() > 1.0);
    }

    #[test]
    fn drag_follows_the_screen_point() {
        let mut scene = flat_scene();
        let id = scene.add_trajectory(dropped_ball());
        let g = scene.add_graph(Graph::new(
            GraphKind::T1S1,
            Rect::from_xywh(50.0, 450.0, 400.0, -400.0),
            0.0,
        ));
        let target = point2(1.5, 30.0);
        let screen = scene.graph_transform(g).unwrap().forward(&target).unwrap();
        let p = scene.drag_end(id, TrajectoryEnd::Start, g, &screen).unwrap();
        assert!((p - target).norm() < 1e-9);
        assert!((scene.trajectory(id).unwrap().end(TrajectoryEnd::Start) - target).norm() < 1e-9);
    }

    #[test]
    fn frame_acceleration_applies_to_all_graphs() {
        let mut scene = flat_scene();
        let rect = Rect::from_xywh(0.0, 0.0, 400.0, 400.0);
        let a = scene.add_graph(Graph::new(GraphKind::T1S1, rect, 9.8));
        let b = scene.add_graph(Graph::new(GraphKind::S3, rect, 9.8));
        scene.set_frame_acceleration(4.9);
        assert!((scene.graph(a).unwrap().frame_acceleration - 4.9).abs() < 1e-12);
        assert!((scene.graph(b).unwrap().frame_acceleration - 4.9).abs() < 1e-12);
        assert_eq!(scene.graphs().count(), 2);
    }

    #[test]
    fn marker_feedback() {
        let mut scene = flat_scene();
        let a = scene.add_trajectory(dropped_ball());
        let b = scene.add_trajectory(dropped_ball());
        assert!(scene.reset_markers().is_none());
        scene.highlight_end(b, TrajectoryEnd::Start).unwrap();
        assert_eq!(scene.reset_markers(), Some(b));
        let marker = scene.trajectory(a).unwrap().marker(TrajectoryEnd::Start);
        assert!((marker.size - marker.default_size).abs() < 1e-12);
    }

    #[test]
    fn variable_gravity_window_spans_the_fall() {
        let scene = flat_scene();
        let window = scene.variable_gravity_window(21e6).unwrap();
        let fall = FreeFall::new(scene.body().mu(scene.constants()))
            .fall_time(R + 21e6, R)
            .unwrap();
        assert!((window.x_min() + fall).abs() < 1e-9);
        assert!((window.x_max() - fall).abs() < 1e-9);
        assert!(window.center().x.abs() < 1e-9);
        assert!((window.y_min() - R).abs() < 1e-6);
        assert!((window.y_max() - R - 21e6).abs() < 1e-6);
        assert!(scene.variable_gravity_window(0.0).unwrap_err().is_domain());
    }

    #[test]
    fn inverse_square_launch_is_bound() {
        let mut scene = earth_scene();
        let id = launch(&mut scene);
        let len = scene.trajectory_points(id).unwrap().len();
        assert_eq!(len, 2 * FREE_FALL_POINTS);
        let trajectory = scene.trajectory(id).unwrap();
        assert_eq!(trajectory.orbit(), Some(OrbitType::Elliptic));
        assert_eq!(trajectory.color(), Rgb::BOUND);
    }

    #[test]
    fn spacetime_view_stays_on_screen() {
        let mut scene = earth_scene();
        let id = launch(&mut scene);
        let rect = Rect::from_xywh(40.0, 50.0, 400.0, 400.0);
        let g = scene.add_graph(Graph::new(GraphKind::Spacetime, rect, 0.0));
        let screen = scene.screen_polyline(id, g).unwrap();
        assert_eq!(screen.len(), 2 * FREE_FALL_POINTS);
        // The first sample sits on the surface, at the bottom of the graph.
        assert!((screen[0].y - 450.0).abs() < 1e-6, "y={}", screen[0].y);
        assert!(screen.iter().all(|p| p.y >= 50.0 - 1e-6 && p.y <= 450.0 + 1e-6));
    }

    #[test]
    fn trajectory_on_the_funnel() {
        let mut scene = earth_scene();
        let id = launch(&mut scene);
        let embedded = scene.embedded_trajectory(id).unwrap();
        assert_eq!(embedded.len(), 2 * FREE_FALL_POINTS);
        let top = embedded.iter().map(|p| p.z).fold(f64::MIN, f64::max);
        assert!(top > embedded[0].z);

        let rect = Rect::from_xywh(0.0, 0.0, 400.0, 400.0);
        let g = scene.add_graph(Graph::new(GraphKind::Funnel, rect, 0.0));
        let screen = scene.screen_polyline(id, g).unwrap();
        assert!(screen.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn follow_camera_looks_at_the_traveller() {
        let mut scene = earth_scene();
        let id = launch(&mut scene);
        let rect = Rect::from_xywh(0.0, 0.0, 400.0, 400.0);
        for u in [0.3, 1.0] {
            let camera = scene.follow_camera(id, u, &rect).unwrap();
            let here = scene.trajectory_position(id, u).unwrap();
            let p = scene
                .embedding()
                .unwrap()
                .embedding_point_from_spacetime(&here)
                .unwrap();
            let s = camera.project(&p);
            assert!((s.x - 200.0).abs() < 1e-6 && (s.y - 200.0).abs() < 1e-6);
        }
    }

    #[test]
    fn follow_camera_keeps_the_neighbourhood_in_depth() {
        let mut scene = earth_scene();
        let id = launch(&mut scene);
        let rect = Rect::from_xywh(0.0, 0.0, 400.0, 400.0);
        let camera = scene.follow_camera(id, 0.3, &rect).unwrap();
        let here = scene.trajectory_position(id, 0.3).unwrap();
        let p = scene
            .embedding()
            .unwrap()
            .embedding_point_from_spacetime(&here)
            .unwrap();

        let reach = (p - camera.position()).norm();
        assert!(reach < 1.0 && reach > FOLLOW_NEAR, "reach={reach}");
        assert!((camera.project(&p).z - reach).abs() < 1e-9);

        let side = point3(0.01, 0.0, 0.0);
        let left = camera.project(&(p - side));
        let right = camera.project(&(p + side));
        for (q, s) in [(p - side, left), (p + side, right)] {
            let depth = camera.forward().dot(&(q - camera.position()));
            assert!((s.z - depth).abs() < 1e-9, "depth={depth} z={}", s.z);
        }
        assert!((left - right).norm() > 1e-3);
    }

    #[test]
    fn flat_scene_has_no_funnel() {
        let mut scene = flat_scene();
        let id = scene.add_trajectory(dropped_ball());
        assert!(scene.embedded_trajectory(id).is_err());
        assert!(scene.embedding_mut().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SceneConfig::variable_gravity(21e6).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

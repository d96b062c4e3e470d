//! Funnel demo: launches a projectile from the Earth's surface, draws it on
//! the spacetime graph and on the Jonsson funnel, and traces the matching
//! geodesic by walking the funnel surface.
//!
//! Usage:
//! ```text
//! cargo run --example funnel
//! RUST_LOG=geodesics=debug cargo run --example funnel
//! ```

use geodesics::embedding::GeodesicTracer;
use geodesics::error::{SceneError, TrajectoryError};
use geodesics::math::{point2, Rect};
use geodesics::physics::RadialOrbit;
use geodesics::scene::{
    Graph, GraphKind, Rgb, Scene, SceneConfig, Trajectory, TrajectoryEnd, TrajectoryKind,
};
use geodesics::Result;
use tracing::info;

/// Window height above the surface, in meters.
const WINDOW_HEIGHT: f64 = 21e6;

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for geodesics.
    // Override with RUST_LOG env var (e.g. RUST_LOG=geodesics=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("funnel=info".parse().unwrap_or_default())
        .add_directive("geodesics=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut config = SceneConfig::variable_gravity(WINDOW_HEIGHT)?;
    if let Some(params) = config.embedding.as_mut() {
        params.delta_tau_real = 2000.0;
    }
    let mut scene = Scene::new(config)?;
    let radius = scene.body().radius;

    let id = scene.add_trajectory(Trajectory::new(
        point2(0.0, radius),
        point2(20.0 * 60.0, radius + 4.3e6),
        TrajectoryKind::InverseSquare,
        Rgb::UNBOUND,
        Rgb::UNBOUND,
    ));
    let rect = Rect::from_xywh(40.0, 50.0, 600.0, 600.0);
    let spacetime = scene.add_graph(Graph::new(GraphKind::Spacetime, rect, 0.0));
    let funnel = scene.add_graph(Graph::new(GraphKind::Funnel, rect, 0.0));

    let start = *scene.trajectory(id)?.end(TrajectoryEnd::Start);
    let end = *scene.trajectory(id)?.end(TrajectoryEnd::End);
    let solver = RadialOrbit::new(scene.body().mu(scene.constants()));
    let classification = solver.classify(start.y, start.x, end.y, end.x)?;
    let v0 = solver.launch_velocity(start.y, start.x, end.y, end.x)?;
    info!(?classification, v0, "solved launch");

    let n_points = scene.trajectory_points(id)?.len();
    let orbit = scene.trajectory(id)?.orbit();
    println!("trajectory: {n_points} points, orbit {orbit:?}, launch speed {v0:.1} m/s");
    if let Some(peak) = solver.peak(start.y, v0, start.x)? {
        println!(
            "apex: {:.0} km above the surface at t = {:.0} s",
            (peak.y - radius) / 1e3,
            peak.x
        );
    }

    let on_graph = scene.screen_polyline(id, spacetime)?;
    let on_funnel = scene.screen_polyline(id, funnel)?;
    if let (Some(a), Some(b)) = (on_graph.first(), on_funnel.first()) {
        println!(
            "first screen point: graph ({:.1}, {:.1}), funnel ({:.1}, {:.1})",
            a.x, a.y, b.x, b.y
        );
    }

    let embedding = scene.embedding().ok_or(SceneError::NoEmbedding)?;
    let a = point2(0.0, radius + 1e6);
    let b = point2(20.0, radius + 1e6);
    let trace = GeodesicTracer::new(embedding).trace(&a, &b, 2000)?;
    let last = trace
        .points
        .last()
        .copied()
        .ok_or_else(|| TrajectoryError::Domain("empty trace".into()))?;
    println!(
        "geodesic from rest at 1000 km: {} points, stopped at {:?} after {:.0} s at {:.1} km",
        trace.points.len(),
        trace.termination,
        last.x,
        (last.y - radius) / 1e3
    );
    Ok(())
}

use serde::{Deserialize, Serialize};

use crate::math::Point;
use crate::physics::{OrbitType, Path};

slotmap::new_key_type! {
    /// Unique identifier for a trajectory in a scene.
    pub struct TrajectoryId;
}

/// An RGB color for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Color of bound (elliptic) orbits.
    pub const BOUND: Self = Self(100, 100, 200);
    /// Color of unbound orbits.
    pub const UNBOUND: Self = Self(200, 100, 100);

    /// Color used for a trajectory of the given orbit type.
    #[must_use]
    pub fn for_orbit(orbit: OrbitType) -> Self {
        match orbit {
            OrbitType::Elliptic => Self::BOUND,
            OrbitType::Parabolic | OrbitType::Hyperbolic => Self::UNBOUND,
        }
    }
}

/// How the path between the two endpoints is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajectoryKind {
    /// Straight inertial line seen from the surface frame under constant
    /// gravity.
    ConstantGravity,
    /// Radial free fall under inverse-square gravity.
    InverseSquare,
}

/// Which endpoint of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajectoryEnd {
    Start,
    End,
}

impl TrajectoryEnd {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Start => 0,
            Self::End => 1,
        }
    }
}

/// Display state of an endpoint marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: Rgb,
    pub size: f64,
    pub default_size: f64,
}

impl MarkerStyle {
    #[must_use]
    pub fn new(color: Rgb, default_size: f64) -> Self {
        Self {
            color,
            size: default_size,
            default_size,
        }
    }
}

/// A free-fall worldline between two draggable events.
///
/// The dense path is cached and dropped whenever an endpoint moves.
#[derive(Debug, Clone)]
pub struct Trajectory {
    ends: [Point; 2],
    kind: TrajectoryKind,
    color: Rgb,
    hover_color: Rgb,
    markers: [MarkerStyle; 2],
    mid_size: f64,
    hover_size: f64,
    path: Option<Path>,
    orbit: Option<OrbitType>,
}

impl Trajectory {
    /// Start marker size.
    pub const START_SIZE: f64 = 6.0;
    /// End marker size.
    pub const END_SIZE: f64 = 4.0;
    /// Marker size while hovered or dragged.
    pub const HOVER_SIZE: f64 = 10.0;

    /// Creates a trajectory from `start` to `end`.
    #[must_use]
    pub fn new(start: Point, end: Point, kind: TrajectoryKind, color: Rgb, hover_color: Rgb) -> Self {
        Self {
            ends: [start, end],
            kind,
            color,
            hover_color,
            markers: [
                MarkerStyle::new(color, Self::START_SIZE),
                MarkerStyle::new(color, Self::END_SIZE),
            ],
            mid_size: 2.0,
            hover_size: Self::HOVER_SIZE,
            path: None,
            orbit: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> TrajectoryKind {
        self.kind
    }

    #[must_use]
    pub fn ends(&self) -> &[Point; 2] {
        &self.ends
    }

    #[must_use]
    pub fn end(&self, end: TrajectoryEnd) -> &Point {
        &self.ends[end.index()]
    }

    /// Moves an endpoint and drops the cached path.
    pub fn set_end(&mut self, end: TrajectoryEnd, p: Point) {
        self.ends[end.index()] = p;
        self.invalidate();
    }

    /// Drops the cached path.
    pub fn invalidate(&mut self) {
        self.path = None;
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    #[must_use]
    pub fn hover_color(&self) -> Rgb {
        self.hover_color
    }

    #[must_use]
    pub fn marker(&self, end: TrajectoryEnd) -> &MarkerStyle {
        &self.markers[end.index()]
    }

    #[must_use]
    pub fn mid_size(&self) -> f64 {
        self.mid_size
    }

    /// Restores both markers to their default look.
    ///
    /// Returns whether either marker was highlighted.
    pub fn reset_markers(&mut self) -> bool {
        let mut was_highlighted = false;
        for marker in &mut self.markers {
            was_highlighted |= (marker.size - marker.default_size).abs() > f64::EPSILON;
            marker.size = marker.default_size;
            marker.color = self.color;
        }
        was_highlighted
    }

    /// Enlarges one marker and gives it the hover color.
    pub fn highlight_end(&mut self, end: TrajectoryEnd) {
        let marker = &mut self.markers[end.index()];
        marker.size = self.hover_size;
        marker.color = self.hover_color;
    }

    /// Orbit type of the last computed inverse-square path.
    #[must_use]
    pub fn orbit(&self) -> Option<OrbitType> {
        self.orbit
    }

    /// The cached path, if it is up to date.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Stores a freshly computed path.
    ///
    /// An orbit type recolors the trajectory and both markers.
    pub(crate) fn store_path(&mut self, path: Path, orbit: Option<OrbitType>) {
        if let Some(orbit) = orbit {
            let color = Rgb::for_orbit(orbit);
            self.color = color;
            self.hover_color = color;
            for marker in &mut self.markers {
                marker.color = color;
            }
        }
        self.orbit = orbit;
        self.path = Some(path);
    }
}

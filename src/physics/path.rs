use crate::math::vector::lerp;
use crate::math::Point;

/// A spacetime polyline measured by elapsed time.
///
/// The length accumulates `|dt|` between consecutive points, so a cursor at
/// fraction `u` moves along the worldline at a uniform rate in coordinate time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    points: Vec<Point>,
    length_time: f64,
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point.
    pub fn add(&mut self, p: Point) {
        if let Some(last) = self.points.last() {
            self.length_time += (p.x - last.x).abs();
        }
        self.points.push(p);
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total elapsed time along the path.
    #[must_use]
    pub fn length_time(&self) -> f64 {
        self.length_time
    }

    /// Point reached after fraction `u` of the total elapsed time.
    ///
    /// Fractions past the end return the last point. Returns `None` for an
    /// empty path.
    #[must_use]
    pub fn interpolate_time(&self, u: f64) -> Option<Point> {
        let target = u * self.length_time;
        let mut walked = 0.0;
        for pair in self.points.windows(2) {
            if target < walked {
                break;
            }
            let len = (pair[1].x - pair[0].x).abs();
            if target < walked + len {
                return Some(lerp(&pair[0], &pair[1], (target - walked) / len));
            }
            walked += len;
        }
        if target < walked {
            // Only reachable for negative fractions.
            return self.points.first().copied();
        }
        self.points.last().copied()
    }
}

impl FromIterator<Point> for Path {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut path = Self::new();
        for p in iter {
            path.add(p);
        }
        path
    }
}

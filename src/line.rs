use crate::geometry::PointD;
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};
use std::fmt;

// Cross products and intersection parameters below this magnitude are treated
// as zero even when the caller asked for exact comparisons through `find_eps`.
const DIVISOR_FLOOR: f64 = 1e-10;

/// A directed line segment from `start` to `end` with `f64` coordinates.
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineD {
    pub start: PointD,
    pub end: PointD,
}

/// The location of a point relative to a directed segment, with the y axis
/// growing upward. On-line locations run `Before`, `Start`, `Between`, `End`,
/// `After` along the direction of the segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineLocation {
    Before,
    Start,
    Between,
    End,
    After,
    Left,
    Right,
}

impl LineLocation {
    // True for locations on the closed segment itself.
    #[inline]
    #[must_use]
    pub const fn contains(self) -> bool {
        matches!(self, Self::Start | Self::Between | Self::End)
    }
}

/// How two segments relate: no shared line point, the same carrier line, or a
/// single crossing of the carrier lines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineRelation {
    Parallel,
    Collinear,
    Divergent,
}

impl LineD {
    #[inline]
    #[must_use]
    pub const fn new(start: PointD, end: PointD) -> Self {
        Self { start, end }
    }

    #[inline]
    #[must_use]
    pub fn from_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(PointD::new(x0, y0), PointD::new(x1, y1))
    }

    #[inline]
    #[must_use]
    pub fn vector(&self) -> PointD {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    #[inline]
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.vector().angle()
    }

    #[inline]
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self::new(self.end, self.start)
    }

    #[inline]
    #[must_use]
    pub fn midpoint(&self) -> PointD {
        self.start.lerp(self.end, 0.5)
    }

    // Foot of the perpendicular from `p` onto the carrier line.
    #[must_use]
    pub fn project(&self, p: PointD) -> PointD {
        let d = self.vector();
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return self.start;
        }
        let t = (p - self.start).dot(d) / len2;
        self.start.lerp(self.end, t)
    }

    // Squared distance from `p` to the closed segment.
    #[must_use]
    pub fn distance_squared(&self, p: PointD) -> f64 {
        let d = self.vector();
        let len2 = d.length_squared();
        if len2 == 0.0 {
            return self.start.distance_squared(p);
        }
        let t = ((p - self.start).dot(d) / len2).clamp(0.0, 1.0);
        self.start.lerp(self.end, t).distance_squared(p)
    }

    /// Classify `p` against this segment with exact comparisons.
    #[must_use]
    pub fn locate(&self, p: PointD) -> LineLocation {
        self.locate_eps(p, 0.0)
    }

    /// Classify `p` against this segment, treating coordinates within
    /// `epsilon` of the carrier line or of an endpoint as coincident.
    #[must_use]
    pub fn locate_eps(&self, p: PointD, epsilon: f64) -> LineLocation {
        if p.equals_eps(self.start, epsilon) {
            return LineLocation::Start;
        }
        if p.equals_eps(self.end, epsilon) {
            return LineLocation::End;
        }
        let d = self.vector();
        let len = d.length();
        let cross = d.cross(p - self.start);
        // perpendicular distance |cross| / len against the tolerance band
        if cross.abs() > epsilon * len || (epsilon == 0.0 && cross != 0.0) {
            return if cross > 0.0 { LineLocation::Left } else { LineLocation::Right };
        }
        let t = (p - self.start).dot(d);
        if t < -epsilon * len {
            LineLocation::Before
        } else if t > d.length_squared() + epsilon * len {
            LineLocation::After
        } else {
            LineLocation::Between
        }
    }

    /// Intersect with `other` using exact comparisons.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> LineIntersection {
        LineIntersection::find(self, other)
    }

    /// Intersect with `other` under the given tolerance.
    #[must_use]
    pub fn intersect_eps(&self, other: &Self, epsilon: f64) -> LineIntersection {
        LineIntersection::find_eps(self, other, epsilon)
    }
}

impl fmt::Display for LineD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// The result of intersecting two directed segments `a` and `b`.
///
/// For a `Divergent` pair, `shared` is the crossing of the carrier lines and
/// `first`/`second` locate it along `a` and `b`. For a `Collinear` pair,
/// `shared` is a representative point of the overlap (if any) and
/// `first`/`second` locate the other segment's start. For a `Parallel` pair,
/// `first`/`second` report on which side the other segment lies.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineIntersection {
    pub relation: LineRelation,
    pub first: LineLocation,
    pub second: LineLocation,
    pub shared: Option<PointD>,
}

impl LineIntersection {
    /// Classify `a` against `b` with exact comparisons.
    #[must_use]
    pub fn find(a: &LineD, b: &LineD) -> Self {
        Self::classify(a, b, 0.0)
    }

    /// Classify `a` against `b` under the given tolerance. The tolerance is
    /// raised to an internal floor so that near-zero determinants degrade to
    /// the collinear case instead of producing a wild crossing point.
    #[must_use]
    pub fn find_eps(a: &LineD, b: &LineD, epsilon: f64) -> Self {
        Self::classify(a, b, epsilon.max(DIVISOR_FLOOR))
    }

    fn classify(a: &LineD, b: &LineD, epsilon: f64) -> Self {
        let ad = a.vector();
        let bd = b.vector();
        let offset = b.start - a.start;

        let m = Matrix2::new(ad.x, -bd.x, ad.y, -bd.y);
        let det = m.determinant();

        if det.abs() <= epsilon {
            // carrier lines parallel; collinear when the offset is parallel too
            if ad.cross(offset).abs() <= epsilon {
                return Self::collinear(a, b, epsilon);
            }
            return Self {
                relation: LineRelation::Parallel,
                first: a.locate_eps(b.start, epsilon),
                second: b.locate_eps(a.start, epsilon),
                shared: None,
            };
        }

        let solution = m.lu().solve(&offset.to_vector());
        let Some(params) = solution else {
            return Self::collinear(a, b, epsilon);
        };
        let (t, u) = (params[0], params[1]);
        let shared = a.start.lerp(a.end, t);
        Self {
            relation: LineRelation::Divergent,
            first: Self::locate_param(t, epsilon, a.length()),
            second: Self::locate_param(u, epsilon, b.length()),
            shared: Some(shared),
        }
    }

    fn collinear(a: &LineD, b: &LineD, epsilon: f64) -> Self {
        // representative shared point: an endpoint of one segment inside the other
        let shared = if b.locate_eps(a.start, epsilon).contains() {
            Some(a.start)
        } else if b.locate_eps(a.end, epsilon).contains() {
            Some(a.end)
        } else if a.locate_eps(b.start, epsilon).contains() {
            Some(b.start)
        } else {
            None
        };
        Self {
            relation: LineRelation::Collinear,
            first: a.locate_eps(b.start, epsilon),
            second: b.locate_eps(a.start, epsilon),
            shared,
        }
    }

    // Map an intersection parameter to its on-line location, with the
    // coordinate tolerance rescaled to parameter space.
    fn locate_param(t: f64, epsilon: f64, length: f64) -> LineLocation {
        let e = if length > 0.0 { epsilon / length } else { epsilon };
        if (t - 0.0).abs() <= e {
            LineLocation::Start
        } else if (t - 1.0).abs() <= e {
            LineLocation::End
        } else if t < 0.0 {
            LineLocation::Before
        } else if t > 1.0 {
            LineLocation::After
        } else {
            LineLocation::Between
        }
    }

    // True when the two closed segments actually share at least one point.
    #[must_use]
    pub fn exists(&self) -> bool {
        match self.relation {
            LineRelation::Parallel => false,
            LineRelation::Collinear => self.shared.is_some(),
            LineRelation::Divergent => self.first.contains() && self.second.contains(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_positions() {
        let l = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        assert!(l.locate(PointD::new(-1.0, 0.0)) == LineLocation::Before);
        assert!(l.locate(PointD::new(0.0, 0.0)) == LineLocation::Start);
        assert!(l.locate(PointD::new(5.0, 0.0)) == LineLocation::Between);
        assert!(l.locate(PointD::new(10.0, 0.0)) == LineLocation::End);
        assert!(l.locate(PointD::new(11.0, 0.0)) == LineLocation::After);
        assert!(l.locate(PointD::new(5.0, 1.0)) == LineLocation::Left);
        assert!(l.locate(PointD::new(5.0, -1.0)) == LineLocation::Right);
    }

    #[test]
    fn locate_with_tolerance() {
        let l = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        assert!(l.locate_eps(PointD::new(0.0, 0.5), 1.0) == LineLocation::Start);
        assert!(l.locate_eps(PointD::new(5.0, 0.5), 1.0) == LineLocation::Between);
        assert!(l.locate_eps(PointD::new(5.0, 1.5), 1.0) == LineLocation::Left);
    }

    #[test]
    fn divergent_crossing() {
        let a = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = LineD::from_coords(5.0, -5.0, 5.0, 5.0);
        let x = a.intersect(&b);
        assert!(x.relation == LineRelation::Divergent);
        assert!(x.shared.unwrap().equals_eps(PointD::new(5.0, 0.0), 1e-12));
        assert!(x.first == LineLocation::Between);
        assert!(x.second == LineLocation::Between);
        assert!(x.exists());
    }

    #[test]
    fn crossing_outside_segments() {
        let a = LineD::from_coords(0.0, 0.0, 1.0, 0.0);
        let b = LineD::from_coords(5.0, -1.0, 5.0, 1.0);
        let x = a.intersect(&b);
        assert!(x.relation == LineRelation::Divergent);
        assert!(x.first == LineLocation::After);
        assert!(!x.exists());
    }

    #[test]
    fn parallel_without_overlap() {
        let a = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = LineD::from_coords(0.0, 1.0, 10.0, 1.0);
        let x = a.intersect(&b);
        assert!(x.relation == LineRelation::Parallel);
        assert!(x.shared.is_none());
        assert!(!x.exists());
    }

    #[test]
    fn collinear_overlap() {
        let a = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = LineD::from_coords(5.0, 0.0, 15.0, 0.0);
        let x = a.intersect(&b);
        assert!(x.relation == LineRelation::Collinear);
        assert!(x.shared.is_some());
        assert!(x.first == LineLocation::Between);
        assert!(x.exists());
    }

    #[test]
    fn collinear_disjoint() {
        let a = LineD::from_coords(0.0, 0.0, 1.0, 0.0);
        let b = LineD::from_coords(5.0, 0.0, 9.0, 0.0);
        let x = a.intersect(&b);
        assert!(x.relation == LineRelation::Collinear);
        assert!(x.shared.is_none());
        assert!(x.first == LineLocation::After);
        assert!(!x.exists());
    }

    #[test]
    fn near_parallel_degrades_to_collinear() {
        let a = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = LineD::from_coords(0.0, 1e-13, 10.0, -1e-13);
        let x = a.intersect_eps(&b, 1e-6);
        assert!(x.relation == LineRelation::Collinear);
    }

    #[test]
    fn segment_distance() {
        let l = LineD::from_coords(0.0, 0.0, 10.0, 0.0);
        assert!((l.distance_squared(PointD::new(5.0, 3.0)) - 9.0).abs() < 1e-12);
        assert!((l.distance_squared(PointD::new(-3.0, 4.0)) - 25.0).abs() < 1e-12);
        assert!(l.project(PointD::new(5.0, 3.0)).equals_eps(PointD::new(5.0, 0.0), 1e-12));
    }
}

use crate::geometry::{PointD, SizeD};
use crate::line::LineD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle stored as its minimum and maximum corners.
/// The rectangle is closed: both borders belong to it.
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectD {
    pub min: PointD,
    pub max: PointD,
}

impl RectD {
    // Build from any two opposite corners, normalizing the coordinate order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: PointD::new(x0.min(x1), y0.min(y1)),
            max: PointD::new(x0.max(x1), y0.max(y1)),
        }
    }

    #[must_use]
    pub fn from_corners(min: PointD, max: PointD) -> Self {
        Self::new(min.x, min.y, max.x, max.y)
    }

    // Bounding box of a point set. Empty input yields a degenerate rectangle
    // at the origin.
    #[must_use]
    pub fn bounding(points: &[PointD]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> SizeD {
        SizeD::new(self.width(), self.height())
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> PointD {
        self.min.lerp(self.max, 0.5)
    }

    // Corners in counter-clockwise order starting at the minimum corner.
    #[must_use]
    pub fn corners(&self) -> [PointD; 4] {
        [
            self.min,
            PointD::new(self.max.x, self.min.y),
            self.max,
            PointD::new(self.min.x, self.max.y),
        ]
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, p: PointD) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Intersection with another rectangle, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min: PointD::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: PointD::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: PointD::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: PointD::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    // Grow (or shrink, with negative amounts) outward on each side.
    #[must_use]
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.min.x - dx, self.min.y - dy, self.max.x + dx, self.max.y + dy)
    }

    #[must_use]
    pub fn offset(&self, d: PointD) -> Self {
        Self {
            min: self.min + d,
            max: self.max + d,
        }
    }

    /// Clip a segment against the rectangle by the Liang–Barsky algorithm.
    /// Returns the surviving sub-segment, with clipped endpoints lying exactly
    /// on the border they were clipped to.
    #[must_use]
    pub fn clip_line(&self, line: &LineD) -> Option<LineD> {
        let d = line.vector();
        if d.x == 0.0 && d.y == 0.0 {
            return self.contains(line.start).then_some(*line);
        }
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        let tests = [
            (-d.x, line.start.x - self.min.x),
            (d.x, self.max.x - line.start.x),
            (-d.y, line.start.y - self.min.y),
            (d.y, self.max.y - line.start.y),
        ];
        for (p, q) in tests {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    if r > t1 {
                        return None;
                    }
                    t0 = t0.max(r);
                } else {
                    if r < t0 {
                        return None;
                    }
                    t1 = t1.min(r);
                }
            }
        }
        if t0 > t1 {
            return None;
        }
        let clamp = |p: PointD| {
            PointD::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
        };
        let start = if t0 == 0.0 { line.start } else { clamp(line.start.lerp(line.end, t0)) };
        let end = if t1 == 1.0 { line.end } else { clamp(line.start.lerp(line.end, t1)) };
        Some(LineD::new(start, end))
    }

    /// Clip an arbitrary polygon against the rectangle by the
    /// Sutherland–Hodgman algorithm, with the rectangle as the convex
    /// clipper. Emitted border points carry the stored border coordinate
    /// verbatim, so they compare equal to coordinates read off the rectangle.
    #[must_use]
    pub fn clip_polygon(&self, polygon: &[PointD]) -> Vec<PointD> {
        #[derive(Copy, Clone)]
        enum Border {
            Left(f64),
            Right(f64),
            Bottom(f64),
            Top(f64),
        }

        impl Border {
            fn inside(self, p: PointD) -> bool {
                match self {
                    Self::Left(x) => p.x >= x,
                    Self::Right(x) => p.x <= x,
                    Self::Bottom(y) => p.y >= y,
                    Self::Top(y) => p.y <= y,
                }
            }

            // Crossing of segment (a, b) with the border line; the border
            // coordinate is written unchanged into the result.
            fn crossing(self, a: PointD, b: PointD) -> PointD {
                match self {
                    Self::Left(x) | Self::Right(x) => {
                        let t = (x - a.x) / (b.x - a.x);
                        PointD::new(x, a.y + (b.y - a.y) * t)
                    }
                    Self::Bottom(y) | Self::Top(y) => {
                        let t = (y - a.y) / (b.y - a.y);
                        PointD::new(a.x + (b.x - a.x) * t, y)
                    }
                }
            }
        }

        let borders = [
            Border::Left(self.min.x),
            Border::Right(self.max.x),
            Border::Bottom(self.min.y),
            Border::Top(self.max.y),
        ];

        let mut input: Vec<PointD> = polygon.to_vec();
        for border in borders {
            if input.is_empty() {
                break;
            }
            let mut output = Vec::with_capacity(input.len() + 4);
            for i in 0..input.len() {
                let cur = input[i];
                let prev = input[(i + input.len() - 1) % input.len()];
                if border.inside(cur) {
                    if !border.inside(prev) {
                        output.push(border.crossing(prev, cur));
                    }
                    output.push(cur);
                } else if border.inside(prev) {
                    output.push(border.crossing(prev, cur));
                }
            }
            input = output;
        }
        input
    }
}

impl fmt::Display for RectD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_and_intersection() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(PointD::new(0.0, 10.0)));
        assert!(!r.contains(PointD::new(-0.1, 5.0)));
        let s = RectD::new(5.0, 5.0, 15.0, 15.0);
        let i = r.intersection(&s).unwrap();
        assert!(i == RectD::new(5.0, 5.0, 10.0, 10.0));
        assert!(r.union(&s) == RectD::new(0.0, 0.0, 15.0, 15.0));
        assert!(r.intersection(&RectD::new(20.0, 20.0, 30.0, 30.0)).is_none());
    }

    #[test]
    fn clip_horizontal_through() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        let c = r.clip_line(&LineD::from_coords(-1.0, 5.0, 11.0, 5.0)).unwrap();
        assert!(c.start == PointD::new(0.0, 5.0));
        assert!(c.end == PointD::new(10.0, 5.0));
    }

    #[test]
    fn clip_vertical_through() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        let c = r.clip_line(&LineD::from_coords(5.0, -1.0, 5.0, 11.0)).unwrap();
        assert!(c.start == PointD::new(5.0, 0.0));
        assert!(c.end == PointD::new(5.0, 10.0));
    }

    #[test]
    fn clip_miss() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.clip_line(&LineD::from_coords(-1.0, -1.0, -0.5, -0.5)).is_none());
    }

    #[test]
    fn clip_inside_untouched() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        let l = LineD::from_coords(1.0, 1.0, 9.0, 9.0);
        assert!(r.clip_line(&l) == Some(l));
    }

    #[test]
    fn polygon_clip_copies_border() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        let tri = [
            PointD::new(5.0, 5.0),
            PointD::new(15.0, 5.0),
            PointD::new(5.0, 15.0),
        ];
        let clipped = r.clip_polygon(&tri);
        assert!(clipped.len() >= 4);
        for p in &clipped {
            assert!(r.contains(*p));
        }
        // every clipped point carries the stored border coordinate exactly
        assert!(clipped.iter().any(|p| p.x == r.max.x));
        assert!(clipped.iter().any(|p| p.y == r.max.y));
    }

    #[test]
    fn polygon_clip_disjoint() {
        let r = RectD::new(0.0, 0.0, 1.0, 1.0);
        let tri = [
            PointD::new(5.0, 5.0),
            PointD::new(6.0, 5.0),
            PointD::new(5.0, 6.0),
        ];
        assert!(r.clip_polygon(&tri).is_empty());
    }
}

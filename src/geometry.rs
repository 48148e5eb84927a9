use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 2-D point or vector with `f64` coordinates. The y axis grows upward:
/// positive angles turn counter-clockwise.
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    // Convert polar coordinates (length, angle in radians) to a point.
    #[must_use]
    pub fn from_polar(length: f64, angle: f64) -> Self {
        Self::new(length * angle.cos(), length * angle.sin())
    }

    // Angle of the vector from the origin to this point, in (-pi, pi].
    #[inline]
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    #[must_use]
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    #[must_use]
    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    // Scalar cross product: `self.x * other.y - self.y * other.x`.
    #[inline]
    #[must_use]
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    // Scalar cross product of (a - self) and (b - self). Positive when the
    // turn self -> a -> b is counter-clockwise.
    #[inline]
    #[must_use]
    pub fn cross_at(&self, a: Self, b: Self) -> f64 {
        (a - *self).cross(b - *self)
    }

    #[inline]
    #[must_use]
    pub fn distance(&self, other: Self) -> f64 {
        (other - *self).length()
    }

    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: Self) -> f64 {
        (other - *self).length_squared()
    }

    #[inline]
    #[must_use]
    pub fn lerp(&self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    // Coordinate equality under a non-negative tolerance. A tolerance of zero
    // demands exact equality.
    #[inline]
    #[must_use]
    pub fn equals_eps(&self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    // Lexicographic comparison by (y, x), the spatial vertex order.
    #[must_use]
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        self.y.total_cmp(&other.y).then_with(|| self.x.total_cmp(&other.x))
    }

    // Lexicographic (y, x) comparison treating coordinates within `epsilon`
    // as equal.
    #[must_use]
    pub fn lex_cmp_eps(&self, other: &Self, epsilon: f64) -> Ordering {
        let dy = self.y - other.y;
        if dy.abs() > epsilon {
            return if dy < 0.0 { Ordering::Less } else { Ordering::Greater };
        }
        let dx = self.x - other.x;
        if dx.abs() > epsilon {
            return if dx < 0.0 { Ordering::Less } else { Ordering::Greater };
        }
        Ordering::Equal
    }

    #[inline]
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub fn from_vector(v: Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }
}

impl Add for PointD {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointD {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for PointD {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for PointD {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for PointD {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl fmt::Display for PointD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2-D point with `i32` coordinates, used for grid cells.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointI {
    pub x: i32,
    pub y: i32,
}

impl PointI {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for PointI {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointI {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for PointI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A width/height pair with `f64` components.
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeD {
    pub width: f64,
    pub height: f64,
}

impl SizeD {
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A width/height pair with `i32` components, used for grid dimensions.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizeI {
    pub width: i32,
    pub height: i32,
}

impl SizeI {
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

// Signed area of a polygon given as a vertex list, by the shoelace formula.
// Positive for counter-clockwise orientation (y up), negative for clockwise.
#[must_use]
pub fn polygon_area(polygon: &[PointD]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for w in polygon.windows(2) {
        sum += w[0].cross(w[1]);
    }
    sum += polygon[polygon.len() - 1].cross(polygon[0]);
    sum / 2.0
}

// Arithmetic mean of a vertex list. Beware concave polygons, the result may
// lay outside the polygon.
#[must_use]
pub fn polygon_centroid(polygon: &[PointD]) -> PointD {
    let (sum, count) = polygon
        .iter()
        .fold((PointD::ZERO, 0.0), |(sum, count), &p| (sum + p, count + 1.0));
    sum / count
}

// Even-odd containment test. Points exactly on the boundary may fall on
// either side; callers needing boundary detection run an edge test first.
#[must_use]
pub fn polygon_contains(polygon: &[PointD], p: PointD) -> bool {
    let n = polygon.len();
    if n == 0 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

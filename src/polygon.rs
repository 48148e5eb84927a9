use crate::error::{Error, Result};
use crate::geometry::{PointD, polygon_contains};
use crate::rect::RectD;
use serde::{Deserialize, Serialize};

/// Whether the topmost feature of a regular polygon is an edge or a vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolygonOrientation {
    OnEdge,
    OnVertex,
}

/// A regular polygon centered on the origin, described by its number of
/// sides, circumradius, and orientation. Squares may additionally declare
/// that cells touching only at a corner count as neighbors in a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegularPolygon {
    sides: usize,
    circumradius: f64,
    orientation: PolygonOrientation,
    vertex_neighbors: bool,
    vertices: Vec<PointD>,
    bounds: RectD,
}

impl RegularPolygon {
    pub fn new(sides: usize, circumradius: f64, orientation: PolygonOrientation) -> Result<Self> {
        Self::with_vertex_neighbors(sides, circumradius, orientation, false)
    }

    pub fn with_vertex_neighbors(
        sides: usize,
        circumradius: f64,
        orientation: PolygonOrientation,
        vertex_neighbors: bool,
    ) -> Result<Self> {
        if sides < 3 {
            return Err(Error::PolygonTooSmall(sides));
        }
        if !circumradius.is_finite() || circumradius <= 0.0 {
            return Err(Error::InvalidArgument("circumradius must be positive"));
        }
        if vertex_neighbors && sides != 4 {
            return Err(Error::InvalidArgument("vertex neighbors require a square"));
        }
        let step = std::f64::consts::TAU / sides as f64;
        let start = std::f64::consts::FRAC_PI_2
            + match orientation {
                PolygonOrientation::OnEdge => step / 2.0,
                PolygonOrientation::OnVertex => 0.0,
            };
        let vertices: Vec<PointD> = (0..sides)
            .map(|k| PointD::from_polar(circumradius, start + step * k as f64))
            .collect();
        let bounds = RectD::bounding(&vertices);
        Ok(Self {
            sides,
            circumradius,
            orientation,
            vertex_neighbors,
            vertices,
            bounds,
        })
    }

    // Build from the side length instead of the circumradius.
    pub fn from_side_length(sides: usize, length: f64, orientation: PolygonOrientation) -> Result<Self> {
        if sides < 3 {
            return Err(Error::PolygonTooSmall(sides));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::InvalidArgument("side length must be positive"));
        }
        let circumradius = length / (2.0 * (std::f64::consts::PI / sides as f64).sin());
        Self::new(sides, circumradius, orientation)
    }

    #[inline]
    #[must_use]
    pub const fn sides(&self) -> usize {
        self.sides
    }

    #[inline]
    #[must_use]
    pub const fn circumradius(&self) -> f64 {
        self.circumradius
    }

    #[inline]
    #[must_use]
    pub const fn orientation(&self) -> PolygonOrientation {
        self.orientation
    }

    #[inline]
    #[must_use]
    pub const fn vertex_neighbors(&self) -> bool {
        self.vertex_neighbors
    }

    #[must_use]
    pub fn side_length(&self) -> f64 {
        2.0 * self.circumradius * (std::f64::consts::PI / self.sides as f64).sin()
    }

    // Apothem: distance from the center to the midpoint of a side.
    #[must_use]
    pub fn inradius(&self) -> f64 {
        self.circumradius * (std::f64::consts::PI / self.sides as f64).cos()
    }

    /// Tight axis-aligned bounds of the polygon around its center.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> &RectD {
        &self.bounds
    }

    /// Vertex template in counter-clockwise order, centered on the origin.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[PointD] {
        &self.vertices
    }

    /// Vertices translated to a cell center.
    #[must_use]
    pub fn vertices_at(&self, center: PointD) -> Vec<PointD> {
        self.vertices.iter().map(|&v| v + center).collect()
    }

    /// Whether the offset `d` from the polygon center falls inside the
    /// polygon. Squares and hexagons use closed-form tests; other side counts
    /// fall back to the generic containment test.
    #[must_use]
    pub fn contains_offset(&self, d: PointD) -> bool {
        let (dx, dy) = (d.x.abs(), d.y.abs());
        let r = self.circumradius;
        match (self.sides, self.orientation) {
            (4, PolygonOrientation::OnEdge) => {
                let half = self.side_length() / 2.0;
                dx <= half && dy <= half
            }
            (4, PolygonOrientation::OnVertex) => dx + dy <= r,
            (6, PolygonOrientation::OnEdge) => {
                let sqrt3 = 3.0_f64.sqrt();
                dx <= r && dy <= sqrt3 * r / 2.0 && dy <= sqrt3 * (r - dx)
            }
            (6, PolygonOrientation::OnVertex) => {
                let sqrt3 = 3.0_f64.sqrt();
                dy <= r && dx <= sqrt3 * r / 2.0 && dx <= sqrt3 * (r - dy)
            }
            _ => polygon_contains(&self.vertices, d),
        }
    }
}

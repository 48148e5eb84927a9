use crate::error::{Error, Result};
use crate::geometry::{PointD, polygon_contains};
use crate::subdivision::{EdgeKey, FaceKey, Subdivision, VertKey};

/// The answer of a point-location query: the entity containing the point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Locate {
    Vertex(VertKey),
    Edge(EdgeKey),
    Face(FaceKey),
}

impl Subdivision {
    /// Find the vertex, edge, or face containing `p`. Vertices win over
    /// edges, edges over faces, both under the comparison epsilon; every
    /// other point belongs to exactly one face.
    #[must_use]
    pub fn locate(&self, p: PointD) -> Locate {
        if let Some(v) = self.find_vertex(p) {
            return Locate::Vertex(v);
        }
        if let Some((e, d2)) = self.nearest_edge(p) {
            if d2 <= self.epsilon * self.epsilon {
                return Locate::Edge(e);
            }
        }
        for f in self.face_keys() {
            if f != self.unbounded_face() && self.face_contains(f, p) {
                return Locate::Face(f);
            }
        }
        Locate::Face(self.unbounded_face())
    }

    // Whether `p` lies inside a bounded face: inside its outer boundary but
    // in none of its holes.
    pub(crate) fn face_contains(&self, f: FaceKey, p: PointD) -> bool {
        let Some(outer) = self.face_polygon(f) else {
            return false;
        };
        if !polygon_contains(&outer, p) {
            return false;
        }
        !self
            .face_inner(f)
            .iter()
            .any(|&e| polygon_contains(&self.cycle_polygon(e), p))
    }

    /// The vertex closest to `p` and its Euclidean distance. Runs a binary
    /// search on the (y, x) vertex order, then expands outward while the
    /// vertical offset stays within the best radius found so far.
    #[must_use]
    pub fn nearest_vertex(&self, p: PointD) -> Option<(VertKey, f64)> {
        if self.vert_order.is_empty() {
            return None;
        }
        let start = match self.vert_order.binary_search_by(|&v| self.verts[v].pos.lex_cmp(&p)) {
            Ok(i) | Err(i) => i,
        };
        let mut best: Option<(VertKey, f64)> = None;
        for k in start..self.vert_order.len() {
            let v = self.vert_order[k];
            let q = self.verts[v].pos;
            if best.as_ref().is_some_and(|(_, r)| q.y - p.y > *r) {
                break;
            }
            let d = q.distance(p);
            if best.as_ref().is_none_or(|(_, r)| d < *r) {
                best = Some((v, d));
            }
        }
        for k in (0..start).rev() {
            let v = self.vert_order[k];
            let q = self.verts[v].pos;
            if best.as_ref().is_some_and(|(_, r)| p.y - q.y > *r) {
                break;
            }
            let d = q.distance(p);
            if best.as_ref().is_none_or(|(_, r)| d < *r) {
                best = Some((v, d));
            }
        }
        best
    }

    /// The edge nearest to `p` and the squared distance to it. The returned
    /// half-edge is the one of the twin pair whose origin precedes its
    /// destination in the spatial order.
    #[must_use]
    pub fn nearest_edge(&self, p: PointD) -> Option<(EdgeKey, f64)> {
        self.edge_pairs()
            .into_iter()
            .map(|e| (e, self.line(e).distance_squared(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// The half-edge from the vertex at `a` to the vertex at `b`, if both
    /// vertices exist (within epsilon) and are connected.
    #[must_use]
    pub fn find_edge(&self, a: PointD, b: PointD) -> Option<EdgeKey> {
        let u = self.find_vertex(a)?;
        let v = self.find_vertex(b)?;
        self.edge_between(u, v)
    }

    /// The bounded face whose outer boundary is the given polygon, vertices
    /// matched within epsilon and in either orientation.
    pub fn find_face(&self, polygon: &[PointD]) -> Result<FaceKey> {
        if polygon.len() < 3 {
            return Err(Error::PolygonTooSmall(polygon.len()));
        }
        let ring: Vec<VertKey> = polygon
            .iter()
            .map(|&p| self.find_vertex(p).ok_or(Error::FaceNotFound(p)))
            .collect::<Result<_>>()?;
        self.ring_face(&ring).ok_or(Error::FaceNotFound(polygon[0]))
    }
}

use crate::error::{Error, Result};
use crate::geometry::{PointD, polygon_area, polygon_centroid};
use crate::line::LineD;
use bimap::BiHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

slotmap::new_key_type! {
    pub struct VertKey;
    pub struct EdgeKey;
    pub struct FaceKey;
}

/// A vertex: its location and one representative outgoing half-edge.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Vertex {
    pub(crate) pos: PointD,
    pub(crate) rep: EdgeKey,
}

/// One directed side of an undirected edge. `root` is the origin vertex;
/// `next` continues along the boundary of `face`, which lies to the left
/// (y growing upward).
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct HalfEdge {
    pub(crate) root: VertKey,
    pub(crate) twin: EdgeKey,
    pub(crate) next: EdgeKey,
    pub(crate) prev: EdgeKey,
    pub(crate) face: FaceKey,
}

/// A face: one optional outer boundary and any number of inner boundaries,
/// each represented by one half-edge on the cycle. The unbounded face has no
/// outer boundary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Face {
    pub(crate) outer: Option<EdgeKey>,
    pub(crate) inner: Vec<EdgeKey>,
}

/// A planar subdivision: a doubly-connected edge list of vertices,
/// half-edges, and faces.
///
/// Vertices keep a lexicographic (y, x) order for snapping and nearest
/// queries. Faces additionally carry a dense `u32` number; number 0 is always
/// the unbounded face. Coordinate equality everywhere uses the subdivision's
/// comparison epsilon (exact when zero).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subdivision {
    pub(crate) verts: SlotMap<VertKey, Vertex>,
    pub(crate) edges: SlotMap<EdgeKey, HalfEdge>,
    pub(crate) faces: SlotMap<FaceKey, Face>,
    // vertex keys sorted by lexicographic (y, x) position
    pub(crate) vert_order: Vec<VertKey>,
    // dense face number <-> face key; 0 is the unbounded face
    pub(crate) face_numbers: BiHashMap<u32, FaceKey>,
    pub(crate) next_face_number: u32,
    pub(crate) epsilon: f64,
}

impl Subdivision {
    /// An empty subdivision: no vertices, no edges, only the unbounded face.
    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::InvalidArgument("epsilon must be non-negative"));
        }
        let mut faces = SlotMap::with_key();
        let unbounded = faces.insert(Face::default());
        let mut face_numbers = BiHashMap::new();
        face_numbers.insert(0, unbounded);
        Ok(Self {
            verts: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces,
            vert_order: Vec::new(),
            face_numbers,
            next_face_number: 1,
            epsilon,
        })
    }

    #[inline]
    #[must_use]
    pub const fn comparison_epsilon(&self) -> f64 {
        self.epsilon
    }

    #[inline]
    #[must_use]
    pub fn nr_verts(&self) -> usize {
        self.verts.len()
    }

    #[inline]
    #[must_use]
    pub fn nr_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    #[must_use]
    pub fn nr_faces(&self) -> usize {
        self.faces.len()
    }

    /// The face with number 0.
    #[must_use]
    pub fn unbounded_face(&self) -> FaceKey {
        *self.face_numbers.get_by_left(&0).expect("unbounded face missing")
    }

    /// Dense number of a face. Number 0 is the unbounded face; bounded faces
    /// keep their creation number until `renumber_faces`.
    #[must_use]
    pub fn face_number(&self, face: FaceKey) -> u32 {
        *self
            .face_numbers
            .get_by_right(&face)
            .unwrap_or_else(|| panic!("F:{face:?} not numbered"))
    }

    #[must_use]
    pub fn face_with_number(&self, number: u32) -> Option<FaceKey> {
        self.face_numbers.get_by_left(&number).copied()
    }

    // Get position of a given vertex.
    #[must_use]
    pub fn position(&self, id: VertKey) -> PointD {
        self.verts
            .get(id)
            .unwrap_or_else(|| panic!("V:{id:?} not initialized"))
            .pos
    }

    // Get a representative outgoing half-edge of a given vertex.
    #[must_use]
    pub fn vertex_edge(&self, id: VertKey) -> EdgeKey {
        self.verts
            .get(id)
            .unwrap_or_else(|| panic!("V:{id:?} not initialized"))
            .rep
    }

    #[must_use]
    pub(crate) fn edge(&self, id: EdgeKey) -> &HalfEdge {
        self.edges
            .get(id)
            .unwrap_or_else(|| panic!("E:{id:?} not initialized"))
    }

    // Get the origin vertex of a given half-edge.
    #[must_use]
    pub fn root(&self, id: EdgeKey) -> VertKey {
        self.edge(id).root
    }

    // Get the destination vertex of a given half-edge.
    #[must_use]
    pub fn tip(&self, id: EdgeKey) -> VertKey {
        self.root(self.twin(id))
    }

    #[must_use]
    pub fn twin(&self, id: EdgeKey) -> EdgeKey {
        self.edge(id).twin
    }

    #[must_use]
    pub fn next(&self, id: EdgeKey) -> EdgeKey {
        self.edge(id).next
    }

    #[must_use]
    pub fn prev(&self, id: EdgeKey) -> EdgeKey {
        self.edge(id).prev
    }

    // Get the face on the left of a given half-edge.
    #[must_use]
    pub fn face(&self, id: EdgeKey) -> FaceKey {
        self.edge(id).face
    }

    // Get both endpoints (origin, destination) of a given half-edge.
    #[must_use]
    pub fn endpoints(&self, id: EdgeKey) -> (VertKey, VertKey) {
        (self.root(id), self.tip(id))
    }

    // Get the directed segment spanned by a given half-edge.
    #[must_use]
    pub fn line(&self, id: EdgeKey) -> LineD {
        let (u, v) = self.endpoints(id);
        LineD::new(self.position(u), self.position(v))
    }

    #[must_use]
    pub fn length(&self, id: EdgeKey) -> f64 {
        self.line(id).length()
    }

    /// Outgoing half-edges of a vertex in counter-clockwise angular order
    /// (the twin of the previous edge, repeatedly), starting at the
    /// representative edge.
    #[must_use]
    pub fn outgoing(&self, id: VertKey) -> Vec<EdgeKey> {
        let first = self.vertex_edge(id);
        let mut result = vec![first];
        let mut e = self.twin(self.prev(first));
        while e != first {
            result.push(e);
            e = self.twin(self.prev(e));
        }
        result
    }

    /// The boundary cycle through a half-edge, following `next` until the
    /// walk closes.
    #[must_use]
    pub fn cycle(&self, id: EdgeKey) -> Vec<EdgeKey> {
        let mut result = vec![id];
        let mut e = self.next(id);
        while e != id {
            result.push(e);
            e = self.next(e);
        }
        result
    }

    // Origins of a boundary cycle, as a polygon.
    #[must_use]
    pub fn cycle_polygon(&self, id: EdgeKey) -> Vec<PointD> {
        self.cycle(id).iter().map(|&e| self.position(self.root(e))).collect()
    }

    // Signed area of a boundary cycle: positive for outer boundaries,
    // negative for holes, zero for collapsed cycles.
    #[must_use]
    pub fn cycle_area(&self, id: EdgeKey) -> f64 {
        polygon_area(&self.cycle_polygon(id))
    }

    /// A half-edge on the outer boundary of a face, absent for the unbounded
    /// face.
    #[must_use]
    pub fn face_outer(&self, id: FaceKey) -> Option<EdgeKey> {
        self.faces
            .get(id)
            .unwrap_or_else(|| panic!("F:{id:?} not initialized"))
            .outer
    }

    /// One half-edge per inner boundary of a face.
    #[must_use]
    pub fn face_inner(&self, id: FaceKey) -> &[EdgeKey] {
        &self
            .faces
            .get(id)
            .unwrap_or_else(|| panic!("F:{id:?} not initialized"))
            .inner
    }

    /// The outer boundary polygon of a bounded face, in counter-clockwise
    /// order.
    #[must_use]
    pub fn face_polygon(&self, id: FaceKey) -> Option<Vec<PointD>> {
        self.face_outer(id).map(|e| self.cycle_polygon(e))
    }

    // Centroid of the outer boundary of a bounded face.
    #[must_use]
    pub fn face_centroid(&self, id: FaceKey) -> Option<PointD> {
        self.face_polygon(id).map(|p| polygon_centroid(&p))
    }

    /// Every half-edge on any boundary of a face.
    #[must_use]
    pub fn face_edges(&self, id: FaceKey) -> Vec<EdgeKey> {
        let face = self.faces.get(id).unwrap_or_else(|| panic!("F:{id:?} not initialized"));
        face.outer
            .iter()
            .chain(face.inner.iter())
            .flat_map(|&e| self.cycle(e))
            .collect()
    }

    /// Faces sharing at least one edge with a face, without duplicates.
    #[must_use]
    pub fn fneighbors(&self, id: FaceKey) -> Vec<FaceKey> {
        self.face_edges(id)
            .iter()
            .map(|&e| self.face(self.twin(e)))
            .filter(|&f| f != id)
            .unique()
            .collect()
    }

    /// Vertex keys in lexicographic (y, x) order.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertKey> + '_ {
        self.vert_order.iter().copied()
    }

    /// All half-edge keys, in arbitrary order.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.keys()
    }

    /// Half-edge keys sorted by the lexicographic (y, x) order of their
    /// (origin, destination) endpoint pair. Materialized on demand.
    #[must_use]
    pub fn edges_ordered(&self) -> Vec<EdgeKey> {
        self.edges
            .keys()
            .sorted_by(|&a, &b| {
                let la = self.line(a);
                let lb = self.line(b);
                la.start
                    .lex_cmp(&lb.start)
                    .then_with(|| la.end.lex_cmp(&lb.end))
            })
            .collect()
    }

    /// Face keys in ascending dense-number order, starting with the
    /// unbounded face.
    #[must_use]
    pub fn face_keys(&self) -> Vec<FaceKey> {
        self.face_numbers
            .iter()
            .sorted_by_key(|(n, _)| **n)
            .map(|(_, &f)| f)
            .collect()
    }

    // One representative half-edge per undirected edge pair: the half-edge
    // whose origin precedes its destination in the spatial order.
    pub(crate) fn edge_pairs(&self) -> Vec<EdgeKey> {
        self.edges
            .keys()
            .filter(|&e| {
                let l = self.line(e);
                l.start.lex_cmp(&l.end) == std::cmp::Ordering::Less
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // internal construction plumbing shared by build and edit operations
    // ------------------------------------------------------------------

    // Binary search of the spatial vertex order under the comparison epsilon.
    pub(crate) fn order_search(&self, pos: PointD) -> std::result::Result<usize, usize> {
        self.vert_order
            .binary_search_by(|&v| self.verts[v].pos.lex_cmp_eps(&pos, self.epsilon))
    }

    /// The vertex within the comparison epsilon of `pos`, if any.
    #[must_use]
    pub fn find_vertex(&self, pos: PointD) -> Option<VertKey> {
        self.order_search(pos).ok().map(|i| self.vert_order[i])
    }

    // Insert a new vertex, keeping the spatial order sorted. The caller must
    // have checked that no existing vertex lies within epsilon.
    pub(crate) fn insert_vertex(&mut self, pos: PointD) -> VertKey {
        let key = self.verts.insert(Vertex {
            pos,
            rep: EdgeKey::default(),
        });
        let at = match self.order_search(pos) {
            Ok(i) | Err(i) => i,
        };
        self.vert_order.insert(at, key);
        key
    }

    // Find the vertex at `pos` or create one.
    pub(crate) fn find_or_insert_vertex(&mut self, pos: PointD) -> VertKey {
        match self.order_search(pos) {
            Ok(i) => self.vert_order[i],
            Err(i) => {
                let key = self.verts.insert(Vertex {
                    pos,
                    rep: EdgeKey::default(),
                });
                self.vert_order.insert(i, key);
                key
            }
        }
    }

    pub(crate) fn remove_vertex(&mut self, id: VertKey) {
        let pos = self.verts[id].pos;
        if let Ok(i) = self.order_search(pos) {
            self.vert_order.remove(i);
        }
        self.verts.remove(id);
    }

    // Allocate a twin pair between two vertices, unlinked and faceless.
    pub(crate) fn alloc_pair(&mut self, u: VertKey, v: VertKey) -> (EdgeKey, EdgeKey) {
        let e = self.edges.insert(HalfEdge {
            root: u,
            twin: EdgeKey::default(),
            next: EdgeKey::default(),
            prev: EdgeKey::default(),
            face: FaceKey::default(),
        });
        let t = self.edges.insert(HalfEdge {
            root: v,
            twin: e,
            next: EdgeKey::default(),
            prev: EdgeKey::default(),
            face: FaceKey::default(),
        });
        self.edges[e].twin = t;
        (e, t)
    }

    pub(crate) fn alloc_face(&mut self) -> FaceKey {
        let key = self.faces.insert(Face::default());
        self.face_numbers.insert(self.next_face_number, key);
        self.next_face_number += 1;
        key
    }

    pub(crate) fn link(&mut self, a: EdgeKey, b: EdgeKey) {
        self.edges[a].next = b;
        self.edges[b].prev = a;
    }

    // Retag every edge of the cycle through `start` to `face`.
    pub(crate) fn set_cycle_face(&mut self, start: EdgeKey, face: FaceKey) {
        let cycle = self.cycle(start);
        for e in cycle {
            self.edges[e].face = face;
        }
    }

    // ------------------------------------------------------------------
    // invariant audit
    // ------------------------------------------------------------------

    /// Check every structural invariant of the subdivision. Intended for
    /// tests and for callers that edit aggressively.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &'static str| Err(Error::TopologyConflict(msg));

        for (e, edge) in &self.edges {
            if edge.twin == e {
                return fail("edge is its own twin");
            }
            if self.twin(edge.twin) != e {
                return fail("twin pairing broken");
            }
            if self.prev(edge.next) != e || self.next(edge.prev) != e {
                return fail("next/prev pairing broken");
            }
            if self.root(edge.twin) != self.tip(e) {
                return fail("twins do not share endpoints");
            }
            if edge.root != self.root(self.twin(edge.prev)) {
                return fail("previous edge does not end at the origin");
            }
            if self.face(edge.next) != edge.face {
                return fail("face differs along a cycle");
            }
            if !self.faces.contains_key(edge.face) {
                return fail("edge references a dead face");
            }
        }

        // rotation around each vertex must be a counter-clockwise cycle
        // covering every outgoing edge exactly once
        for (v, vert) in &self.verts {
            if !self.edges.contains_key(vert.rep) {
                return fail("vertex representative is dead");
            }
            if self.root(vert.rep) != v {
                return fail("vertex representative starts elsewhere");
            }
            let ring = self.outgoing(v);
            let outgoing_count = self.edges.iter().filter(|(_, e)| e.root == v).count();
            if ring.len() != outgoing_count {
                return fail("rotation misses outgoing edges");
            }
            if ring.iter().duplicates().next().is_some() {
                return fail("rotation repeats an edge");
            }
            if ring.len() > 1 {
                let angles = ring.iter().map(|&e| self.line(e).angle()).collect_vec();
                // strictly ascending after rotating the minimum to the front
                let min_at = angles
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let rotated = angles[min_at..].iter().chain(&angles[..min_at]).collect_vec();
                if !rotated.windows(2).all(|w| w[0] < w[1]) {
                    return fail("rotation is not counter-clockwise");
                }
            }
        }

        // faces: boundary entries must partition the edge set, outer cycles
        // must run counter-clockwise, inner cycles must not
        let mut seen = std::collections::HashSet::new();
        for (f, face) in &self.faces {
            if f == self.unbounded_face() && face.outer.is_some() {
                return fail("unbounded face has an outer boundary");
            }
            if f != self.unbounded_face() && face.outer.is_none() {
                return fail("bounded face lacks an outer boundary");
            }
            if let Some(outer) = face.outer {
                if !self.cycle_is_outer(&self.cycle(outer)) {
                    return fail("outer boundary is not counter-clockwise");
                }
            }
            for &entry in face.inner.iter() {
                if self.cycle_is_outer(&self.cycle(entry)) {
                    return fail("inner boundary is counter-clockwise");
                }
            }
            for &entry in face.outer.iter().chain(face.inner.iter()) {
                for e in self.cycle(entry) {
                    if self.face(e) != f {
                        return fail("cycle edge tagged with another face");
                    }
                    if !seen.insert(e) {
                        return fail("edge appears on two boundaries");
                    }
                }
            }
        }
        if seen.len() != self.edges.len() {
            return fail("edge missing from all face boundaries");
        }

        // vertex order sorted under the comparison epsilon, complete, and
        // epsilon-separated
        if self.vert_order.len() != self.verts.len() {
            return fail("vertex order incomplete");
        }
        for w in self.vert_order.windows(2) {
            let (a, b) = (self.verts[w[0]].pos, self.verts[w[1]].pos);
            if a.lex_cmp_eps(&b, self.epsilon) != std::cmp::Ordering::Less {
                return fail("vertex order unsorted");
            }
            if self.epsilon > 0.0 && a.equals_eps(b, self.epsilon) {
                return fail("vertices closer than epsilon");
            }
        }

        // dense numbering covers every face, with 0 = unbounded
        if self.face_numbers.len() != self.faces.len() {
            return fail("face numbering incomplete");
        }
        for (_, &f) in self.face_numbers.iter() {
            if !self.faces.contains_key(f) {
                return fail("face number references a dead face");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_subdivision() {
        let s = Subdivision::new(0.0).unwrap();
        assert!(s.nr_verts() == 0);
        assert!(s.nr_edges() == 0);
        assert!(s.nr_faces() == 1);
        assert!(s.face_number(s.unbounded_face()) == 0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_negative_epsilon() {
        assert!(Subdivision::new(-1.0).is_err());
        assert!(Subdivision::new(f64::NAN).is_err());
    }

    #[test]
    fn vertex_order_stays_sorted() {
        let mut s = Subdivision::new(0.5).unwrap();
        let a = s.insert_vertex(PointD::new(3.0, 1.0));
        let b = s.insert_vertex(PointD::new(-2.0, 0.0));
        let c = s.insert_vertex(PointD::new(0.0, 2.0));
        let order = s.vertex_keys().collect::<Vec<_>>();
        assert!(order == vec![b, a, c]);
        // snapping within epsilon finds the existing vertex
        assert!(s.find_vertex(PointD::new(3.2, 1.1)) == Some(a));
        assert!(s.find_vertex(PointD::new(10.0, 10.0)).is_none());
        assert!(s.find_or_insert_vertex(PointD::new(-2.1, 0.2)) == b);
        assert!(s.nr_verts() == 3);
    }
}

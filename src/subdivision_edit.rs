use crate::error::{Error, Result};
use crate::geometry::{PointD, polygon_contains};
use crate::line::{LineD, LineLocation, LineRelation};
use crate::subdivision::{EdgeKey, FaceKey, Subdivision, VertKey};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::collections::HashSet;

impl Subdivision {
    /// Split an edge at a point strictly between its endpoints. The edge pair
    /// keeps its identity on the origin side; a new pair spans from the new
    /// vertex to the old destination. Faces are unaffected.
    pub fn split_edge(&mut self, e: EdgeKey, p: PointD) -> Result<VertKey> {
        if !self.edges.contains_key(e) {
            return Err(Error::InvalidArgument("edge does not exist"));
        }
        if self.line(e).locate_eps(p, self.epsilon) != LineLocation::Between {
            return Err(Error::NotOnEdge(p));
        }
        if self.find_vertex(p).is_some() {
            return Err(Error::TopologyConflict("split point collides with a vertex"));
        }

        let t = self.twin(e);
        let v = self.root(t);
        let next_e = self.next(e);
        let prev_t = self.prev(t);
        let fe = self.face(e);
        let ft = self.face(t);

        let w = self.insert_vertex(p);
        let (n, nt) = self.alloc_pair(w, v);
        self.edges[n].face = fe;
        self.edges[nt].face = ft;
        self.edges[t].root = w;

        self.link(e, n);
        self.link(n, if next_e == t { nt } else { next_e });
        self.link(nt, t);
        if prev_t != e {
            self.link(prev_t, nt);
        }

        self.verts[w].rep = n;
        if self.verts[v].rep == t {
            self.verts[v].rep = nt;
        }
        Ok(w)
    }

    /// Insert the segment from `a` to `b`. Endpoints snap to existing
    /// vertices within epsilon; existing edges crossed by the segment are
    /// split at the crossings, so one call may insert several sub-edges.
    /// Closing a cycle splits the containing face. Returns the half-edge
    /// leaving the vertex at `a` (the existing one, if the segment was
    /// already present).
    pub fn add_edge(&mut self, a: PointD, b: PointD) -> Result<EdgeKey> {
        if a.equals_eps(b, self.epsilon) {
            return Err(Error::DegenerateSegment(LineD::new(a, b)));
        }
        let ua0 = self.find_vertex(a);
        let ub0 = self.find_vertex(b);
        if let (Some(u), Some(v)) = (ua0, ub0) {
            if u == v {
                return Err(Error::DegenerateSegment(LineD::new(a, b)));
            }
            if let Some(e) = self.edge_between(u, v) {
                return Ok(e);
            }
        }
        let pa = ua0.map_or(a, |u| self.position(u));
        let pb = ub0.map_or(b, |v| self.position(v));
        let seg = LineD::new(pa, pb);

        // points where the segment meets the interior of existing edges:
        // proper crossings, endpoints resting on an edge, and the endpoints
        // of collinear overlaps
        let mut split_points: Vec<PointD> = Vec::new();
        for e in self.edge_pairs() {
            let x = seg.intersect_eps(&self.line(e), self.epsilon);
            match x.relation {
                LineRelation::Divergent
                    if x.second == LineLocation::Between && x.first.contains() =>
                {
                    let p = match x.first {
                        LineLocation::Start => pa,
                        LineLocation::End => pb,
                        _ => x.shared.expect("divergent pair has a crossing"),
                    };
                    split_points.push(p);
                }
                LineRelation::Collinear => {
                    split_points.extend([pa, pb]);
                }
                _ => {}
            }
        }
        // split whichever edge currently holds each point in its interior
        for p in split_points {
            if self.find_vertex(p).is_some() {
                continue;
            }
            let hit = self
                .edge_pairs()
                .into_iter()
                .find(|&e| self.line(e).locate_eps(p, self.epsilon) == LineLocation::Between);
            if let Some(e) = hit {
                self.split_edge(e, p)?;
            }
        }
        let ua = match self.find_vertex(a) {
            Some(u) => u,
            None => self.insert_vertex(a),
        };
        let ub = match self.find_vertex(b) {
            Some(v) => v,
            None => self.insert_vertex(b),
        };

        // every vertex on the segment joins the path, ordered along it
        let dir = seg.vector();
        let len2 = dir.length_squared();
        let threshold = self.epsilon * self.epsilon;
        let mut path: Vec<(OrderedFloat<f64>, VertKey)> = Vec::new();
        for &v in &self.vert_order {
            let q = self.verts[v].pos;
            if seg.distance_squared(q) > threshold {
                continue;
            }
            let t = (q - pa).dot(dir) / len2;
            if v != ua && v != ub && !(0.0..=1.0).contains(&t) {
                continue;
            }
            path.push((OrderedFloat(t.clamp(0.0, 1.0)), v));
        }
        path.sort();
        let order = path.into_iter().map(|(_, v)| v).dedup().collect_vec();

        let mut result = None;
        for (v1, v2) in order.into_iter().tuple_windows() {
            let e = match self.edge_between(v1, v2) {
                Some(e) => e,
                None => self.insert_pair_linked(v1, v2),
            };
            result = result.or(Some(e));
        }
        result.ok_or(Error::TopologyConflict("segment produced no edge"))
    }

    /// Remove a twin pair. If its two sides bound distinct faces, the face
    /// with the larger dense number is merged into the other; inner
    /// boundaries move along. Vertices left without edges are removed.
    pub fn remove_edge(&mut self, e: EdgeKey) -> Result<()> {
        if !self.edges.contains_key(e) {
            return Err(Error::InvalidArgument("edge does not exist"));
        }
        let t = self.twin(e);
        let u = self.root(e);
        let v = self.root(t);
        let f1 = self.face(e);
        let f2 = self.face(t);

        let mut seeds: Vec<EdgeKey> = Vec::new();
        let keeper = if f1 == f2 {
            f1
        } else {
            // the face with the smaller dense number survives the merge
            let (keeper, loser) = if self.face_number(f1) < self.face_number(f2) {
                (f1, f2)
            } else {
                (f2, f1)
            };
            let loser_entries = self
                .face_outer(loser)
                .into_iter()
                .chain(self.face_inner(loser).iter().copied())
                .collect_vec();
            for &entry in &loser_entries {
                self.set_cycle_face(entry, keeper);
            }
            seeds.extend(loser_entries);
            self.face_numbers.remove_by_right(&loser);
            self.faces.remove(loser);
            keeper
        };

        seeds.extend(
            [self.prev(e), self.next(e), self.prev(t), self.next(t)]
                .into_iter()
                .filter(|&s| s != e && s != t),
        );

        // unlink the rotations at both endpoints
        let u_isolated = self.next(t) == e;
        let v_isolated = self.next(e) == t;
        if !u_isolated {
            let (p, n) = (self.prev(e), self.next(t));
            self.link(p, n);
            if self.verts[u].rep == e {
                self.verts[u].rep = n;
            }
        }
        if !v_isolated {
            let (p, n) = (self.prev(t), self.next(e));
            self.link(p, n);
            if self.verts[v].rep == t {
                self.verts[v].rep = n;
            }
        }

        self.edges.remove(e);
        self.edges.remove(t);
        if u_isolated {
            self.remove_vertex(u);
        }
        if v_isolated {
            self.remove_vertex(v);
        }
        self.rebuild_entries(keeper, &seeds);
        Ok(())
    }

    /// Remove a vertex that joins exactly two collinear edges, merging them
    /// into a single edge pair: the inverse of [`Self::split_edge`]. Returns
    /// the surviving half-edge spanning both former edges.
    pub fn merge_edges(&mut self, v: VertKey) -> Result<EdgeKey> {
        if !self.verts.contains_key(v) {
            return Err(Error::InvalidArgument("vertex does not exist"));
        }
        let ring = self.outgoing(v);
        if ring.len() != 2 {
            return Err(Error::TopologyConflict("vertex does not join exactly two edges"));
        }
        let (g1, g2) = (ring[0], ring[1]);
        let a = self.tip(g1);
        let b = self.tip(g2);
        let carrier = LineD::new(self.position(a), self.position(b));
        if carrier.locate_eps(self.position(v), self.epsilon) != LineLocation::Between {
            return Err(Error::TopologyConflict("incident edges are not collinear"));
        }
        if self.edge_between(a, b).is_some() {
            return Err(Error::TopologyConflict("merged edge already exists"));
        }

        // the pair through `a` survives as a <-> b; the pair through `b` goes
        let e = self.twin(g1);
        let t = g1;
        let n = g2;
        let nt = self.twin(g2);
        let after = self.next(n);
        let before = self.prev(nt);

        self.link(e, if after == nt { t } else { after });
        if before != n {
            self.link(before, t);
        } else {
            self.link(e, t);
        }
        self.edges[t].root = b;
        if self.verts[b].rep == nt {
            self.verts[b].rep = t;
        }
        let face_n = self.face(n);
        let face_nt = self.face(nt);
        self.replace_entry(face_n, n, e);
        self.replace_entry(face_nt, nt, t);
        self.edges.remove(n);
        self.edges.remove(nt);
        self.remove_vertex(v);
        Ok(e)
    }

    fn replace_entry(&mut self, f: FaceKey, old: EdgeKey, new: EdgeKey) {
        let face = &mut self.faces[f];
        if face.outer == Some(old) {
            face.outer = Some(new);
        }
        for entry in &mut face.inner {
            if *entry == old {
                *entry = new;
            }
        }
    }

    /// Renumber the bounded faces 1..n by the lexicographic (y, x) order of
    /// the lowest vertex of their outer boundary. Number 0 stays with the
    /// unbounded face.
    pub fn renumber_faces(&mut self) {
        self.renumber_faces_by(|sub, a, b| {
            let low = |f: FaceKey| {
                sub.face_polygon(f)
                    .expect("bounded face has an outer boundary")
                    .into_iter()
                    .min_by(|p, q| p.lex_cmp(q))
                    .expect("outer boundary is never empty")
            };
            low(a).lex_cmp(&low(b))
        });
    }

    /// Renumber the bounded faces 1..n by a caller-supplied total order.
    pub fn renumber_faces_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&Self, FaceKey, FaceKey) -> std::cmp::Ordering,
    {
        let unbounded = self.unbounded_face();
        let mut bounded = self.faces.keys().filter(|&f| f != unbounded).collect_vec();
        bounded.sort_by(|&a, &b| cmp(self, a, b));
        let mut numbers = bimap::BiHashMap::new();
        numbers.insert(0, unbounded);
        for (i, f) in bounded.iter().enumerate() {
            numbers.insert(i as u32 + 1, *f);
        }
        self.face_numbers = numbers;
        self.next_face_number = bounded.len() as u32 + 1;
    }

    // ------------------------------------------------------------------
    // splice plumbing
    // ------------------------------------------------------------------

    fn has_edges(&self, v: VertKey) -> bool {
        let rep = self.verts[v].rep;
        rep != EdgeKey::default() && self.edges.contains_key(rep)
    }

    // The face of the angular wedge at `v` that the direction `theta` points
    // into: the face left of the incoming twin of the wedge's
    // counter-clockwise bounding edge.
    fn wedge_face(&self, v: VertKey, theta: f64) -> FaceKey {
        let o_ccw = self.rotation_bracket(v, theta).1;
        self.face(self.twin(o_ccw))
    }

    // The outgoing edges at `v` immediately clockwise and counter-clockwise
    // of the direction `theta`.
    fn rotation_bracket(&self, v: VertKey, theta: f64) -> (EdgeKey, EdgeKey) {
        let tau = std::f64::consts::TAU;
        let ring = self.outgoing(v);
        let o_cw = ring
            .iter()
            .copied()
            .min_by_key(|&e| OrderedFloat((theta - self.line(e).angle()).rem_euclid(tau)))
            .expect("vertex has outgoing edges");
        let o_ccw = ring
            .iter()
            .copied()
            .min_by_key(|&e| OrderedFloat((self.line(e).angle() - theta).rem_euclid(tau)))
            .expect("vertex has outgoing edges");
        (o_cw, o_ccw)
    }

    // Wire a new outgoing edge into the rotation at its origin: the twin of
    // the counter-clockwise neighbor continues into the new edge, and the
    // new edge's twin continues into the clockwise neighbor.
    fn splice(&mut self, g: EdgeKey) {
        let v = self.root(g);
        if !self.has_edges(v) || self.verts[v].rep == g {
            self.link(self.twin(g), g);
            self.verts[v].rep = g;
            return;
        }
        let theta = self.line(g).angle();
        let (o_cw, o_ccw) = self.rotation_bracket(v, theta);
        self.link(self.twin(o_ccw), g);
        self.link(self.twin(g), o_cw);
    }

    // Insert a twin pair between two vertices whose open segment crosses
    // nothing, update both rotations, and repair the face structure: either
    // the pair merges boundary components of one face, or it closes a cycle
    // and splits off a new face.
    fn insert_pair_linked(&mut self, v1: VertKey, v2: VertKey) -> EdgeKey {
        let p1 = self.position(v1);
        let p2 = self.position(v2);
        let f = if self.has_edges(v1) {
            self.wedge_face(v1, (p2 - p1).angle())
        } else if self.has_edges(v2) {
            self.wedge_face(v2, (p1 - p2).angle())
        } else {
            match self.locate(p1.lerp(p2, 0.5)) {
                crate::subdivision_locate::Locate::Face(f) => f,
                crate::subdivision_locate::Locate::Edge(e) => self.face(e),
                crate::subdivision_locate::Locate::Vertex(w) => {
                    self.wedge_face(w, (p2 - self.position(w)).angle())
                }
            }
        };

        let (g, g2) = self.alloc_pair(v1, v2);
        self.edges[g].face = f;
        self.edges[g2].face = f;
        self.splice(g);
        self.splice(g2);

        let c1 = self.cycle(g);
        if c1.contains(&g2) {
            // boundary components merged, no new face
            self.set_cycle_face(g, f);
            self.rebuild_entries(f, &[g]);
            return g;
        }

        // a cycle closed: classify both sides
        let c2 = self.cycle(g2);
        let old_outer = self.face_outer(f);
        for (rep, cycle) in [(g, &c1), (g2, &c2)] {
            if old_outer.is_some_and(|o| cycle.contains(&o)) {
                self.set_cycle_face(rep, f);
            } else if self.cycle_is_outer(cycle) {
                let nf = self.alloc_face();
                self.faces[nf].outer = Some(rep);
                self.set_cycle_face(rep, nf);
                // inner boundaries of the old face enclosed by the new one
                // move over
                let poly = cycle
                    .iter()
                    .map(|&e| self.position(self.root(e)))
                    .collect_vec();
                for entry in self.face_inner(f).to_vec() {
                    if !self.edges.contains_key(entry)
                        || self.face(entry) != f
                        || c1.contains(&entry)
                        || c2.contains(&entry)
                    {
                        continue;
                    }
                    if polygon_contains(&poly, self.position(self.root(entry))) {
                        self.set_cycle_face(entry, nf);
                        self.faces[nf].inner.push(entry);
                    }
                }
            } else {
                self.set_cycle_face(rep, f);
            }
        }
        self.rebuild_entries(f, &[g, g2]);
        g
    }

    // Recompute the boundary entries of a face from its previous entries
    // plus the given seed edges: walk every candidate cycle once, make the
    // counter-clockwise one the outer boundary, the rest inner boundaries.
    pub(crate) fn rebuild_entries(&mut self, f: FaceKey, seeds: &[EdgeKey]) {
        let candidates = self
            .face_outer(f)
            .into_iter()
            .chain(self.face_inner(f).iter().copied())
            .chain(seeds.iter().copied())
            .filter(|&c| self.edges.contains_key(c) && self.face(c) == f)
            .collect_vec();
        let mut seen: HashSet<EdgeKey> = HashSet::new();
        let mut outer = None;
        let mut inner = Vec::new();
        for c in candidates {
            if seen.contains(&c) {
                continue;
            }
            let cycle = self.cycle(c);
            seen.extend(cycle.iter().copied());
            if self.cycle_is_outer(&cycle) {
                outer = Some(c);
            } else {
                inner.push(c);
            }
        }
        self.faces[f].outer = outer;
        self.faces[f].inner = inner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Subdivision {
        let lines = vec![
            LineD::from_coords(0.0, 0.0, 10.0, 0.0),
            LineD::from_coords(10.0, 0.0, 10.0, 10.0),
            LineD::from_coords(10.0, 10.0, 0.0, 10.0),
            LineD::from_coords(0.0, 10.0, 0.0, 0.0),
        ];
        Subdivision::from_lines(&lines, 0.0).unwrap()
    }

    #[test]
    fn split_preserves_topology() {
        let mut sub = square();
        let e = sub.find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 0.0)).unwrap();
        let w = sub.split_edge(e, PointD::new(4.0, 0.0)).unwrap();
        assert!(sub.position(w) == PointD::new(4.0, 0.0));
        assert!(sub.nr_verts() == 5);
        assert!(sub.nr_edges() == 10);
        assert!(sub.nr_faces() == 2);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        // the original edge now ends at the new vertex
        assert!(sub.tip(e) == w);
    }

    #[test]
    fn split_rejects_off_edge_points() {
        let mut sub = square();
        let e = sub.find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 0.0)).unwrap();
        assert!(sub.split_edge(e, PointD::new(4.0, 1.0)).is_err());
        assert!(sub.split_edge(e, PointD::new(0.0, 0.0)).is_err());
        assert!(sub.split_edge(e, PointD::new(-2.0, 0.0)).is_err());
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn add_edge_splits_a_face() {
        let mut sub = square();
        let e = sub.add_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 10.0)).unwrap();
        assert!(sub.root(e) == sub.find_vertex(PointD::new(0.0, 0.0)).unwrap());
        assert!(sub.nr_faces() == 3);
        assert!(sub.nr_edges() == 10);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn add_edge_reuses_existing() {
        let mut sub = square();
        let before = sub.nr_edges();
        let e = sub.add_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 0.0)).unwrap();
        assert!(sub.nr_edges() == before);
        assert!(sub.line(e) == LineD::from_coords(0.0, 0.0, 10.0, 0.0));
    }

    #[test]
    fn add_edge_crosses_and_splits() {
        let mut sub = Subdivision::new(0.0).unwrap();
        sub.add_edge(PointD::new(0.0, 5.0), PointD::new(10.0, 5.0)).unwrap();
        sub.add_edge(PointD::new(5.0, 0.0), PointD::new(5.0, 10.0)).unwrap();
        assert!(sub.nr_verts() == 5);
        assert!(sub.nr_edges() == 8);
        assert!(sub.nr_faces() == 1);
        assert!(sub.find_vertex(PointD::new(5.0, 5.0)).is_some());
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn add_edge_builds_a_triangle_incrementally() {
        let mut sub = Subdivision::new(0.0).unwrap();
        sub.add_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 0.0)).unwrap();
        assert!(sub.nr_faces() == 1);
        sub.add_edge(PointD::new(10.0, 0.0), PointD::new(5.0, 8.0)).unwrap();
        assert!(sub.nr_faces() == 1);
        sub.add_edge(PointD::new(5.0, 8.0), PointD::new(0.0, 0.0)).unwrap();
        assert!(sub.nr_faces() == 2);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        let face = sub.face_with_number(1).unwrap();
        assert!(sub.face_outer(face).is_some());
    }

    #[test]
    fn add_edge_endpoint_on_edge_interior_splits_it() {
        let mut sub = square();
        sub.add_edge(PointD::new(5.0, 0.0), PointD::new(5.0, 10.0)).unwrap();
        // both square sides split, face split in two
        assert!(sub.nr_verts() == 6);
        assert!(sub.nr_faces() == 3);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn merge_undoes_split() {
        let mut sub = square();
        let e = sub.find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 0.0)).unwrap();
        let w = sub.split_edge(e, PointD::new(4.0, 0.0)).unwrap();
        let merged = sub.merge_edges(w).unwrap();
        assert!(sub.nr_verts() == 4);
        assert!(sub.nr_edges() == 8);
        assert!(sub.nr_faces() == 2);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        let (u, v) = sub.endpoints(merged);
        assert!(sub.position(u) == PointD::new(0.0, 0.0));
        assert!(sub.position(v) == PointD::new(10.0, 0.0));
    }

    #[test]
    fn merge_rejects_corners_and_junctions() {
        let mut sub = square();
        // a square corner joins two edges, but they are not collinear
        let corner = sub.find_vertex(PointD::new(0.0, 0.0)).unwrap();
        assert!(sub.merge_edges(corner).is_err());
        // a crossing vertex joins four edges
        sub.add_edge(PointD::new(-5.0, 5.0), PointD::new(15.0, 5.0)).unwrap();
        let crossing = sub.find_vertex(PointD::new(0.0, 5.0)).unwrap();
        assert!(sub.merge_edges(crossing).is_err());
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn remove_edge_merges_into_smaller_number() {
        let mut sub = square();
        sub.add_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 10.0)).unwrap();
        let diagonal = sub.find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 10.0)).unwrap();
        let f1 = sub.face(diagonal);
        let f2 = sub.face(sub.twin(diagonal));
        let keeper = if sub.face_number(f1) < sub.face_number(f2) { f1 } else { f2 };
        sub.remove_edge(diagonal).unwrap();
        assert!(sub.nr_faces() == 2);
        assert!(sub.faces.contains_key(keeper));
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn remove_boundary_edge_merges_into_unbounded() {
        let mut sub = square();
        let e = sub.find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 0.0)).unwrap();
        sub.remove_edge(e).unwrap();
        assert!(sub.nr_faces() == 1);
        assert!(sub.nr_verts() == 4);
        assert!(sub.nr_edges() == 6);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn remove_dangling_edge_cleans_vertices() {
        let mut sub = square();
        sub.add_edge(PointD::new(10.0, 10.0), PointD::new(15.0, 15.0)).unwrap();
        assert!(sub.nr_verts() == 5);
        let e = sub.find_edge(PointD::new(10.0, 10.0), PointD::new(15.0, 15.0)).unwrap();
        sub.remove_edge(e).unwrap();
        assert!(sub.nr_verts() == 4);
        assert!(sub.nr_faces() == 2);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn remove_isolated_pair_drops_component() {
        let mut sub = Subdivision::new(0.0).unwrap();
        let e = sub.add_edge(PointD::new(0.0, 0.0), PointD::new(3.0, 3.0)).unwrap();
        sub.remove_edge(e).unwrap();
        assert!(sub.nr_verts() == 0);
        assert!(sub.nr_edges() == 0);
        assert!(sub.face_inner(sub.unbounded_face()).is_empty());
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }

    #[test]
    fn renumber_is_spatial_and_dense() {
        let mut sub = square();
        sub.add_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 10.0)).unwrap();
        // drop the lower-right triangle, leaving a numbering gap
        let diagonal = sub.find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 10.0)).unwrap();
        sub.remove_edge(diagonal).unwrap();
        sub.renumber_faces();
        assert!(sub.face_with_number(0) == Some(sub.unbounded_face()));
        assert!(sub.face_with_number(1).is_some());
        assert!(sub.face_with_number(2).is_none());
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }
}

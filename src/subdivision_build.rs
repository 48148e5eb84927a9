use crate::error::{Error, Result};
use crate::geometry::PointD;
use crate::line::{LineD, LineLocation, LineRelation};
use crate::subdivision::{EdgeKey, FaceKey, Subdivision, VertKey};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::collections::{HashMap, HashSet};

impl Subdivision {
    /// Build a subdivision from an unordered set of directed segments.
    ///
    /// Endpoints within `epsilon` of each other are merged into one vertex.
    /// Every pairwise crossing becomes a vertex splitting both segments, and
    /// collinear overlaps are decomposed into maximal runs kept once. Fails
    /// on a segment whose endpoints collapse under `epsilon`.
    pub fn from_lines(lines: &[LineD], epsilon: f64) -> Result<Self> {
        let mut sub = Self::new(epsilon)?;

        // canonicalize endpoints
        let mut segs: Vec<(VertKey, VertKey)> = Vec::with_capacity(lines.len());
        for line in lines {
            let u = sub.find_or_insert_vertex(line.start);
            let v = sub.find_or_insert_vertex(line.end);
            if u == v {
                return Err(Error::DegenerateSegment(*line));
            }
            segs.push((u, v));
        }

        // pairwise intersection; collect the cut vertices of every segment
        let mut cuts: Vec<Vec<VertKey>> = vec![Vec::new(); segs.len()];
        for i in 0..segs.len() {
            for j in i + 1..segs.len() {
                let li = sub.seg_line(segs[i]);
                let lj = sub.seg_line(segs[j]);
                let x = li.intersect_eps(&lj, epsilon);
                match x.relation {
                    LineRelation::Divergent => {
                        if x.first.contains() && x.second.contains() {
                            // a crossing at a segment endpoint reuses that
                            // endpoint's vertex
                            let w = match (x.first, x.second) {
                                (LineLocation::Start, _) => segs[i].0,
                                (LineLocation::End, _) => segs[i].1,
                                (_, LineLocation::Start) => segs[j].0,
                                (_, LineLocation::End) => segs[j].1,
                                _ => sub.find_or_insert_vertex(
                                    x.shared.expect("divergent crossing"),
                                ),
                            };
                            cuts[i].push(w);
                            cuts[j].push(w);
                        }
                    }
                    LineRelation::Collinear => {
                        // endpoints lying on the other segment cut it there
                        for (target, other) in [(i, j), (j, i)] {
                            let line = sub.seg_line(segs[target]);
                            for v in [segs[other].0, segs[other].1] {
                                if line.locate_eps(sub.position(v), epsilon).contains() {
                                    cuts[target].push(v);
                                }
                            }
                        }
                    }
                    LineRelation::Parallel => {}
                }
            }
        }

        // decompose into elementary pieces with disjoint interiors
        let mut pieces: Vec<(VertKey, VertKey)> = Vec::new();
        let mut known: HashSet<(VertKey, VertKey)> = HashSet::new();
        for (&(u, v), cut) in segs.iter().zip(&cuts) {
            let line = sub.seg_line((u, v));
            let run = std::iter::once(u)
                .chain(cut.iter().copied())
                .chain(std::iter::once(v))
                .map(|w| {
                    let t = (sub.position(w) - line.start).dot(line.vector());
                    (OrderedFloat(t), w)
                })
                .sorted()
                .map(|(_, w)| w)
                .dedup()
                .collect_vec();
            for (a, b) in run.iter().copied().tuple_windows() {
                let key = (a.min(b), a.max(b));
                if known.insert(key) {
                    pieces.push((a, b));
                }
            }
        }

        sub.assemble(&pieces);
        Ok(sub)
    }

    /// Build a subdivision whose bounded faces correspond one-to-one, in
    /// order, with the given closed polygons: face numbers run 1..=n. Shared
    /// edges between adjacent polygons are stored once. The polygons must
    /// already form a subdivision (disjoint interiors, coincident only along
    /// whole edges and vertices within `epsilon`).
    pub fn from_polygons(polygons: &[Vec<PointD>], epsilon: f64) -> Result<Self> {
        if polygons.is_empty() {
            return Err(Error::InvalidArgument("no polygons"));
        }
        let mut sub = Self::new(epsilon)?;

        let mut pieces: Vec<(VertKey, VertKey)> = Vec::new();
        let mut known: HashSet<(VertKey, VertKey)> = HashSet::new();
        let mut rings: Vec<Vec<VertKey>> = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            if polygon.len() < 3 {
                return Err(Error::PolygonTooSmall(polygon.len()));
            }
            let mut ring = polygon
                .iter()
                .map(|&p| sub.find_or_insert_vertex(p))
                .dedup()
                .collect_vec();
            // tolerate an explicitly closed input ring
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            if ring.len() < 3 || ring.iter().duplicates().next().is_some() {
                return Err(Error::InvalidArgument("polygon degenerates under epsilon"));
            }
            for k in 0..ring.len() {
                let (a, b) = (ring[k], ring[(k + 1) % ring.len()]);
                let key = (a.min(b), a.max(b));
                if known.insert(key) {
                    pieces.push((a, b));
                }
            }
            rings.push(ring);
        }

        sub.assemble(&pieces);

        // renumber the bounded faces to match the input order
        let mut numbers = bimap::BiHashMap::new();
        numbers.insert(0, sub.unbounded_face());
        for (i, ring) in rings.iter().enumerate() {
            let face = sub
                .ring_face(ring)
                .ok_or(Error::InvalidArgument("polygons do not form a subdivision"))?;
            if numbers.insert_no_overwrite(i as u32 + 1, face).is_err() {
                return Err(Error::InvalidArgument("polygons share a face"));
            }
        }
        if numbers.len() != sub.nr_faces() {
            return Err(Error::InvalidArgument("polygons do not cover every face"));
        }
        sub.face_numbers = numbers;
        sub.next_face_number = polygons.len() as u32 + 1;
        Ok(sub)
    }

    fn seg_line(&self, seg: (VertKey, VertKey)) -> LineD {
        LineD::new(self.position(seg.0), self.position(seg.1))
    }

    // The bounded face whose outer boundary visits exactly the given ring of
    // vertices, in either orientation.
    pub(crate) fn ring_face(&self, ring: &[VertKey]) -> Option<FaceKey> {
        let reversed = ring.iter().rev().copied().collect_vec();
        for candidate in [ring.to_vec(), reversed] {
            let Some(start) = self.edge_between(candidate[0], candidate[1]) else {
                continue;
            };
            let cycle = self.cycle(start);
            if cycle.len() != candidate.len() {
                continue;
            }
            let origins = cycle.iter().map(|&e| self.root(e)).collect_vec();
            if rotations_match(&origins, &candidate) {
                let face = self.face(start);
                if self.face_outer(face) == Some(start)
                    || self.face_outer(face).is_some_and(|o| cycle.contains(&o))
                {
                    return Some(face);
                }
            }
        }
        None
    }

    // The half-edge from `u` to `v`, if the two vertices are connected.
    pub(crate) fn edge_between(&self, u: VertKey, v: VertKey) -> Option<EdgeKey> {
        if self.verts[u].rep == EdgeKey::default() {
            return None;
        }
        self.outgoing(u).into_iter().find(|&e| self.tip(e) == v)
    }

    // ------------------------------------------------------------------
    // topological assembly: from disjoint elementary pieces to a full DCEL
    // ------------------------------------------------------------------

    pub(crate) fn assemble(&mut self, pieces: &[(VertKey, VertKey)]) {
        // one twin pair per piece
        for &(u, v) in pieces {
            let (e, t) = self.alloc_pair(u, v);
            if self.verts[u].rep == EdgeKey::default() {
                self.verts[u].rep = e;
            }
            if self.verts[v].rep == EdgeKey::default() {
                self.verts[v].rep = t;
            }
        }

        // the angular rotation at every vertex fixes next/prev: the successor
        // of an incoming half-edge is the outgoing edge one step clockwise
        // from its twin (faces lie left of their boundary, y grows upward)
        let mut outgoing: HashMap<VertKey, Vec<EdgeKey>> = HashMap::new();
        let edge_keys = self.edges.keys().collect_vec();
        for &e in &edge_keys {
            outgoing.entry(self.root(e)).or_default().push(e);
        }
        for (v, mut ring) in outgoing {
            ring.sort_by_key(|&e| OrderedFloat(self.line(e).angle()));
            for k in 0..ring.len() {
                let incoming = self.twin(ring[k]);
                let successor = ring[(k + ring.len() - 1) % ring.len()];
                self.link(incoming, successor);
            }
            self.verts[v].rep = ring[0];
        }

        // discover boundary cycles; counter-clockwise cycles bound new faces
        let mut assigned: HashSet<EdgeKey> = HashSet::new();
        let mut inner: Vec<(EdgeKey, Vec<EdgeKey>)> = Vec::new();
        for &e in &edge_keys {
            if assigned.contains(&e) {
                continue;
            }
            let cycle = self.cycle(e);
            assigned.extend(cycle.iter().copied());
            if self.cycle_is_outer(&cycle) {
                let face = self.alloc_face();
                self.faces[face].outer = Some(e);
                for &c in &cycle {
                    self.edges[c].face = face;
                }
            } else {
                inner.push((e, cycle));
            }
        }

        // attach each inner boundary to its containing face, nearest enclosing
        // boundary first: process by descending topmost vertex so that the
        // boundary crossed by the upward ray is already assigned
        inner.sort_by_key(|(_, cycle)| {
            let top = cycle
                .iter()
                .map(|&c| {
                    let p = self.position(self.root(c));
                    (OrderedFloat(p.y), OrderedFloat(p.x))
                })
                .max()
                .expect("cycle is never empty");
            std::cmp::Reverse(top)
        });
        for (entry, cycle) in inner {
            let members: HashSet<EdgeKey> = cycle.iter().copied().collect();
            let top = cycle
                .iter()
                .map(|&c| self.position(self.root(c)))
                .max_by(|a, b| a.lex_cmp(b))
                .expect("cycle is never empty");
            let face = self.face_above(top, &members);
            for &c in &cycle {
                self.edges[c].face = face;
            }
            self.faces[face].inner.push(entry);
        }
    }

    // Orientation of a boundary cycle by the turn at its lexicographically
    // smallest origin. Collapsed cycles (every turn straight) are not outer.
    pub(crate) fn cycle_is_outer(&self, cycle: &[EdgeKey]) -> bool {
        let n = cycle.len();
        let origins = cycle.iter().map(|&e| self.position(self.root(e))).collect_vec();
        let low = origins
            .iter()
            .min_by(|a, b| a.lex_cmp(b))
            .expect("cycle is never empty");
        for k in 0..n {
            if origins[k] != *low {
                continue;
            }
            let entering = self.line(cycle[(k + n - 1) % n]).vector();
            let leaving = self.line(cycle[k]).vector();
            let turn = entering.cross(leaving);
            if turn != 0.0 {
                return turn > 0.0;
            }
        }
        false
    }

    // The face met first by a vertical ray cast upward from `p`, skipping the
    // edges in `exclude`. Falls back to the unbounded face when the ray
    // escapes.
    fn face_above(&self, p: PointD, exclude: &HashSet<EdgeKey>) -> FaceKey {
        let mut best: Option<(f64, EdgeKey)> = None;
        for e in self.edge_pairs() {
            if exclude.contains(&e) || exclude.contains(&self.twin(e)) {
                continue;
            }
            let line = self.line(e);
            let (lo, hi) = if line.start.x <= line.end.x {
                (line.start, line.end)
            } else {
                (line.end, line.start)
            };
            // half-open span so a ray through a shared vertex counts once
            if !(lo.x <= p.x && p.x < hi.x) {
                continue;
            }
            let t = (p.x - lo.x) / (hi.x - lo.x);
            let y = lo.y + (hi.y - lo.y) * t;
            if y <= p.y {
                continue;
            }
            if best.is_none_or(|(by, _)| y < by) {
                best = Some((y, e));
            }
        }
        match best {
            None => self.unbounded_face(),
            Some((_, e)) => {
                // the containing face lies below the crossed edge
                let rightward = if self.line(e).vector().x > 0.0 { e } else { self.twin(e) };
                self.face(self.twin(rightward))
            }
        }
    }
}

// Whether `a` is a cyclic rotation of `b`.
fn rotations_match(a: &[VertKey], b: &[VertKey]) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    let Some(offset) = a.iter().position(|&v| v == b[0]) else {
        return false;
    };
    (0..a.len()).all(|k| a[(offset + k) % a.len()] == b[k])
}

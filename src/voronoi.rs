use crate::error::{Error, Result};
use crate::geometry::PointD;
use crate::line::LineD;
use crate::rect::RectD;
use crate::subdivision::Subdivision;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::collections::HashMap;

// Divisors below this magnitude make two bisectors effectively parallel.
const DIVISOR_FLOOR: f64 = 1e-10;

const LE: usize = 0;
const RE: usize = 1;

/// One edge of a Voronoi diagram: the indices of the two generator sites it
/// separates and of its two endpoints in [`VoronoiResults::vertices`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoronoiEdge {
    pub site1: usize,
    pub site2: usize,
    pub vertex1: usize,
    pub vertex2: usize,
}

/// The output of [`Voronoi::find_all`]: the clipped Voronoi diagram of the
/// input sites together with its dual Delaunay edge set.
///
/// `vertices` holds the true Voronoi vertices first, followed by the
/// pseudo-vertices where clipped edges meet the viewport border.
#[derive(Clone, Debug)]
pub struct VoronoiResults {
    pub clipping_bounds: RectD,
    pub sites: Vec<PointD>,
    pub vertices: Vec<PointD>,
    pub true_vertex_count: usize,
    pub edges: Vec<VoronoiEdge>,
    pub delaunay_edges: Vec<(usize, usize)>,
}

impl VoronoiResults {
    /// The Delaunay triangulation as segments between site coordinates.
    #[must_use]
    pub fn delaunay_lines(&self) -> Vec<LineD> {
        self.delaunay_edges
            .iter()
            .map(|&(i, j)| LineD::new(self.sites[i], self.sites[j]))
            .collect()
    }

    /// The clipped Voronoi edges as segments between vertex coordinates.
    #[must_use]
    pub fn voronoi_lines(&self) -> Vec<LineD> {
        self.edges
            .iter()
            .map(|e| LineD::new(self.vertices[e.vertex1], self.vertices[e.vertex2]))
            .collect()
    }

    /// Assemble the Delaunay edge set into a planar subdivision.
    pub fn delaunay_subdivision(&self, epsilon: f64) -> Result<Subdivision> {
        Subdivision::from_lines(&self.delaunay_lines(), epsilon)
    }

    /// Assemble the clipped Voronoi edges plus the viewport border into a
    /// planar subdivision: one bounded face per Voronoi cell. The border
    /// segments are split where clipped edges meet them.
    pub fn voronoi_subdivision(&self, epsilon: f64) -> Result<Subdivision> {
        let mut lines = self
            .voronoi_lines()
            .into_iter()
            .filter(|l| !l.start.equals_eps(l.end, epsilon))
            .collect_vec();
        let corners = self.clipping_bounds.corners();
        for k in 0..4 {
            lines.push(LineD::new(corners[k], corners[(k + 1) % 4]));
        }
        Subdivision::from_lines(&lines, epsilon)
    }
}

/// Fortune's sweep-line construction of Voronoi diagrams and Delaunay
/// triangulations.
pub struct Voronoi;

impl Voronoi {
    /// Compute the Voronoi diagram of at least three distinct sites, clipped
    /// to a viewport. The viewport is the bounding box of the sites extended
    /// by a tenth per axis, further extended to enclose `clip` when given:
    /// the effective viewport only ever grows.
    pub fn find_all(points: &[PointD], clip: Option<RectD>) -> Result<VoronoiResults> {
        if points.len() < 3 {
            return Err(Error::InvalidArgument("at least three sites required"));
        }
        let bounds = RectD::bounding(points);
        let dx = if bounds.width() > 0.0 {
            bounds.width() / 10.0
        } else if bounds.height() > 0.0 {
            bounds.height() / 10.0
        } else {
            1.0
        };
        let dy = if bounds.height() > 0.0 { bounds.height() / 10.0 } else { dx };
        let mut clipping = bounds.inflate(dx, dy);
        if let Some(requested) = clip {
            clipping = clipping.union(&requested);
        }
        // round-trip through the rectangle type: the sweep compares against
        // exactly the values the caller can observe on the result
        let clipping = RectD::from_corners(clipping.min, clipping.max);
        let mut sweep = Sweep::new(points, clipping);
        sweep.run();
        Ok(sweep.finish())
    }

    /// Compute only the Delaunay edge set of at least three distinct sites.
    pub fn find_delaunay(points: &[PointD]) -> Result<Vec<(usize, usize)>> {
        Ok(Self::find_all(points, None)?.delaunay_edges)
    }
}

// ----------------------------------------------------------------------
// sweep-line state
// ----------------------------------------------------------------------

// A bisector line a*x + b*y = c between two sites, normalized so that the
// dominant coefficient is one.
struct Bisector {
    a: f64,
    b: f64,
    c: f64,
    reg: [usize; 2],
    ep: [Option<usize>; 2],
}

// A beach-line node: one side (left or right) of a bisector, linked into the
// beach list. `vertex`/`ystar` hold its pending circle event.
struct BeachArc {
    left: usize,
    right: usize,
    edge: Option<usize>,
    pm: usize,
    vertex: PointD,
    ystar: f64,
    in_queue: bool,
    deleted: bool,
}

enum VertexRef {
    TrueVertex(usize),
    Pseudo(usize),
}

struct Sweep {
    // sites in ascending (y, x) order; `input_index` maps back to the caller
    sites: Vec<PointD>,
    input_index: Vec<usize>,
    clipping: RectD,
    xmin: f64,
    deltax: f64,
    ymin: f64,
    deltay: f64,

    arcs: Vec<BeachArc>,
    leftend: usize,
    rightend: usize,
    beach_hash: Vec<Option<usize>>,

    queue: Vec<Vec<usize>>,
    queue_count: usize,
    queue_min: usize,

    edges: Vec<Bisector>,
    bottomsite: usize,

    true_vertices: Vec<PointD>,
    pseudo_vertices: Vec<PointD>,
    pseudo_index: HashMap<(OrderedFloat<f64>, OrderedFloat<f64>), usize>,
    out_edges: Vec<(usize, usize, VertexRef, VertexRef)>,
    emitted: Vec<bool>,
    delaunay: Vec<(usize, usize)>,
}

impl Sweep {
    fn new(points: &[PointD], clipping: RectD) -> Self {
        let order = (0..points.len())
            .sorted_by(|&i, &j| points[i].lex_cmp(&points[j]))
            .collect_vec();
        let sites = order.iter().map(|&i| points[i]).collect_vec();
        let input_index = order;

        let bounds = RectD::bounding(&sites);
        let sqrt_n = (sites.len() as f64).sqrt() as usize + 1;

        let mut sweep = Self {
            xmin: bounds.min.x,
            deltax: (bounds.width()).max(f64::MIN_POSITIVE),
            ymin: bounds.min.y,
            deltay: (bounds.height()).max(f64::MIN_POSITIVE),
            sites,
            input_index,
            clipping,
            arcs: Vec::new(),
            leftend: 0,
            rightend: 0,
            beach_hash: vec![None; 2 * sqrt_n],
            queue: vec![Vec::new(); 4 * sqrt_n],
            queue_count: 0,
            queue_min: 0,
            edges: Vec::new(),
            bottomsite: 0,
            true_vertices: Vec::new(),
            pseudo_vertices: Vec::new(),
            pseudo_index: HashMap::new(),
            out_edges: Vec::new(),
            emitted: Vec::new(),
            delaunay: Vec::new(),
        };
        sweep.leftend = sweep.new_arc(None, LE);
        sweep.rightend = sweep.new_arc(None, LE);
        let (l, r) = (sweep.leftend, sweep.rightend);
        sweep.arcs[l].right = r;
        sweep.arcs[r].left = l;
        sweep.beach_hash[0] = Some(l);
        let last = sweep.beach_hash.len() - 1;
        sweep.beach_hash[last] = Some(r);
        sweep
    }

    fn new_arc(&mut self, edge: Option<usize>, pm: usize) -> usize {
        self.arcs.push(BeachArc {
            left: usize::MAX,
            right: usize::MAX,
            edge,
            pm,
            vertex: PointD::ZERO,
            ystar: 0.0,
            in_queue: false,
            deleted: false,
        });
        self.arcs.len() - 1
    }

    // ------------------------------------------------------------------
    // beach list with x-bucketed hash lookup
    // ------------------------------------------------------------------

    fn beach_insert(&mut self, after: usize, arc: usize) {
        let right = self.arcs[after].right;
        self.arcs[arc].left = after;
        self.arcs[arc].right = right;
        self.arcs[right].left = arc;
        self.arcs[after].right = arc;
    }

    fn beach_delete(&mut self, arc: usize) {
        let (l, r) = (self.arcs[arc].left, self.arcs[arc].right);
        self.arcs[l].right = r;
        self.arcs[r].left = l;
        self.arcs[arc].deleted = true;
    }

    fn beach_gethash(&mut self, bucket: usize) -> Option<usize> {
        let arc = self.beach_hash[bucket]?;
        if self.arcs[arc].deleted {
            self.beach_hash[bucket] = None;
            return None;
        }
        Some(arc)
    }

    // The beach arc immediately left of `p`, found through the hash and a
    // local list walk.
    fn beach_leftbnd(&mut self, p: PointD) -> usize {
        let size = self.beach_hash.len();
        let raw = ((p.x - self.xmin) / self.deltax * size as f64) as isize;
        let bucket = raw.clamp(0, size as isize - 1) as usize;
        let mut arc = self.beach_gethash(bucket);
        if arc.is_none() {
            for i in 1..size {
                if bucket >= i {
                    arc = self.beach_gethash(bucket - i);
                    if arc.is_some() {
                        break;
                    }
                }
                if bucket + i < size {
                    arc = self.beach_gethash(bucket + i);
                    if arc.is_some() {
                        break;
                    }
                }
            }
        }
        let mut he = arc.expect("beach sentinels are never deleted");
        if he == self.leftend || (he != self.rightend && self.right_of(he, p)) {
            loop {
                he = self.arcs[he].right;
                if he == self.rightend || !self.right_of(he, p) {
                    break;
                }
            }
            he = self.arcs[he].left;
        } else {
            loop {
                he = self.arcs[he].left;
                if he == self.leftend || self.right_of(he, p) {
                    break;
                }
            }
        }
        if bucket > 0 && bucket < size - 1 {
            self.beach_hash[bucket] = Some(he);
        }
        he
    }

    // Whether `p` lies right of the arc boundary traced by a beach node.
    fn right_of(&self, arc: usize, p: PointD) -> bool {
        let e = &self.edges[self.arcs[arc].edge.expect("sentinels are filtered out")];
        let topsite = self.sites[e.reg[1]];
        let right_of_site = p.x > topsite.x;
        if right_of_site && self.arcs[arc].pm == LE {
            return true;
        }
        if !right_of_site && self.arcs[arc].pm == RE {
            return false;
        }
        let above;
        if e.a == 1.0 {
            let dyp = p.y - topsite.y;
            let dxp = p.x - topsite.x;
            let mut fast = false;
            let mut result;
            if (!right_of_site && e.b < 0.0) || (right_of_site && e.b >= 0.0) {
                result = dyp >= e.b * dxp;
                fast = result;
            } else {
                result = p.x + p.y * e.b > e.c;
                if e.b < 0.0 {
                    result = !result;
                }
                if !result {
                    fast = true;
                }
            }
            if !fast {
                let dxs = topsite.x - self.sites[e.reg[0]].x;
                result = e.b * (dxp * dxp - dyp * dyp)
                    < dxs * dyp * (1.0 + 2.0 * dxp / dxs + e.b * e.b);
                if e.b < 0.0 {
                    result = !result;
                }
            }
            above = result;
        } else {
            let yl = e.c - e.a * p.x;
            let t1 = p.y - yl;
            let t2 = p.x - topsite.x;
            let t3 = yl - topsite.y;
            above = t1 * t1 > t2 * t2 + t3 * t3;
        }
        if self.arcs[arc].pm == LE { above } else { !above }
    }

    fn left_site(&self, arc: usize) -> usize {
        match self.arcs[arc].edge {
            None => self.bottomsite,
            Some(e) => self.edges[e].reg[self.arcs[arc].pm],
        }
    }

    fn right_site(&self, arc: usize) -> usize {
        match self.arcs[arc].edge {
            None => self.bottomsite,
            Some(e) => self.edges[e].reg[1 - self.arcs[arc].pm],
        }
    }

    // ------------------------------------------------------------------
    // circle-event queue: a y-bucketed hash of sorted buckets
    // ------------------------------------------------------------------

    fn queue_bucket(&self, ystar: f64) -> usize {
        let size = self.queue.len();
        let raw = ((ystar - self.ymin) / self.deltay * size as f64) as isize;
        raw.clamp(0, size as isize - 1) as usize
    }

    fn queue_insert(&mut self, arc: usize, vertex: PointD, offset: f64) {
        self.arcs[arc].vertex = vertex;
        self.arcs[arc].ystar = vertex.y + offset;
        self.arcs[arc].in_queue = true;
        let bucket = self.queue_bucket(self.arcs[arc].ystar);
        let key = (OrderedFloat(self.arcs[arc].ystar), OrderedFloat(vertex.x));
        let at = self.queue[bucket]
            .binary_search_by_key(&key, |&other| {
                (OrderedFloat(self.arcs[other].ystar), OrderedFloat(self.arcs[other].vertex.x))
            })
            .unwrap_or_else(|i| i);
        self.queue[bucket].insert(at, arc);
        self.queue_count += 1;
        self.queue_min = self.queue_min.min(bucket);
    }

    fn queue_delete(&mut self, arc: usize) {
        if !self.arcs[arc].in_queue {
            return;
        }
        let bucket = self.queue_bucket(self.arcs[arc].ystar);
        self.queue[bucket].retain(|&a| a != arc);
        self.arcs[arc].in_queue = false;
        self.queue_count -= 1;
    }

    fn queue_is_empty(&self) -> bool {
        self.queue_count == 0
    }

    fn queue_peek(&mut self) -> PointD {
        while self.queue[self.queue_min].is_empty() {
            self.queue_min += 1;
        }
        let arc = self.queue[self.queue_min][0];
        PointD::new(self.arcs[arc].vertex.x, self.arcs[arc].ystar)
    }

    fn queue_pop(&mut self) -> usize {
        while self.queue[self.queue_min].is_empty() {
            self.queue_min += 1;
        }
        let arc = self.queue[self.queue_min].remove(0);
        self.arcs[arc].in_queue = false;
        self.queue_count -= 1;
        arc
    }

    // ------------------------------------------------------------------
    // bisectors
    // ------------------------------------------------------------------

    // The perpendicular bisector of two sites; also emits the Delaunay edge
    // between them.
    fn bisect(&mut self, s1: usize, s2: usize) -> usize {
        let (p1, p2) = (self.sites[s1], self.sites[s2]);
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        let mut c = p1.x * dx + p1.y * dy + (dx * dx + dy * dy) * 0.5;
        let (a, b);
        if dx.abs() > dy.abs() {
            a = 1.0;
            b = dy / dx;
            c /= dx;
        } else {
            b = 1.0;
            a = dx / dy;
            c /= dy;
        }
        let (i1, i2) = (self.input_index[s1], self.input_index[s2]);
        self.delaunay.push((i1.min(i2), i1.max(i2)));
        self.edges.push(Bisector {
            a,
            b,
            c,
            reg: [s1, s2],
            ep: [None, None],
        });
        self.emitted.push(false);
        self.edges.len() - 1
    }

    // Crossing of the bisectors of two beach nodes, if the parabola geometry
    // admits a future circle event there.
    fn intersect(&self, el1: usize, el2: usize) -> Option<PointD> {
        let e1 = self.arcs[el1].edge?;
        let e2 = self.arcs[el2].edge?;
        if self.edges[e1].reg[1] == self.edges[e2].reg[1] {
            return None;
        }
        let (b1, b2) = (&self.edges[e1], &self.edges[e2]);
        let d = b1.a * b2.b - b1.b * b2.a;
        if d.abs() < DIVISOR_FLOOR {
            return None;
        }
        let xint = (b1.c * b2.b - b2.c * b1.b) / d;
        let yint = (b2.c * b1.a - b1.c * b2.a) / d;
        let (el, e) = if self.sites[b1.reg[1]].lex_cmp(&self.sites[b2.reg[1]])
            == std::cmp::Ordering::Less
        {
            (el1, b1)
        } else {
            (el2, b2)
        };
        let right_of_site = xint >= self.sites[e.reg[1]].x;
        if (right_of_site && self.arcs[el].pm == LE)
            || (!right_of_site && self.arcs[el].pm == RE)
        {
            return None;
        }
        Some(PointD::new(xint, yint))
    }

    fn make_vertex(&mut self, p: PointD) -> usize {
        self.true_vertices.push(p);
        self.true_vertices.len() - 1
    }

    // Terminate one end of a bisector at a Voronoi vertex; once both ends
    // are known the edge is clipped and emitted.
    fn endpoint(&mut self, edge: usize, side: usize, vertex: usize) {
        self.edges[edge].ep[side] = Some(vertex);
        if self.edges[edge].ep[1 - side].is_some() {
            self.clip_line(edge);
        }
    }

    // ------------------------------------------------------------------
    // the sweep itself
    // ------------------------------------------------------------------

    fn run(&mut self) {
        let mut next_site = 1;
        loop {
            let site_turn = if next_site < self.sites.len() {
                if self.queue_is_empty() {
                    true
                } else {
                    let min = self.queue_peek();
                    self.sites[next_site].lex_cmp(&min) == std::cmp::Ordering::Less
                }
            } else {
                false
            };

            if site_turn {
                let newsite = next_site;
                next_site += 1;
                let p = self.sites[newsite];
                let lbnd = self.beach_leftbnd(p);
                let rbnd = self.arcs[lbnd].right;
                let bot = self.right_site(lbnd);
                let e = self.bisect(bot, newsite);
                let bisector = self.new_arc(Some(e), LE);
                self.beach_insert(lbnd, bisector);
                if let Some(x) = self.intersect(lbnd, bisector) {
                    self.queue_delete(lbnd);
                    self.queue_insert(lbnd, x, x.distance(p));
                }
                let lbnd = bisector;
                let bisector = self.new_arc(Some(e), RE);
                self.beach_insert(lbnd, bisector);
                if let Some(x) = self.intersect(bisector, rbnd) {
                    self.queue_insert(bisector, x, x.distance(p));
                }
            } else if !self.queue_is_empty() {
                let lbnd = self.queue_pop();
                let llbnd = self.arcs[lbnd].left;
                let rbnd = self.arcs[lbnd].right;
                let rrbnd = self.arcs[rbnd].right;
                let mut bot = self.left_site(lbnd);
                let mut top = self.right_site(rbnd);
                let v = self.arcs[lbnd].vertex;
                let vidx = self.make_vertex(v);
                if let Some(e) = self.arcs[lbnd].edge {
                    let pm = self.arcs[lbnd].pm;
                    self.endpoint(e, pm, vidx);
                }
                if let Some(e) = self.arcs[rbnd].edge {
                    let pm = self.arcs[rbnd].pm;
                    self.endpoint(e, pm, vidx);
                }
                self.beach_delete(lbnd);
                self.queue_delete(rbnd);
                self.beach_delete(rbnd);
                let mut pm = LE;
                if self.sites[bot].y > self.sites[top].y {
                    std::mem::swap(&mut bot, &mut top);
                    pm = RE;
                }
                let e = self.bisect(bot, top);
                let bisector = self.new_arc(Some(e), pm);
                self.beach_insert(llbnd, bisector);
                self.endpoint(e, 1 - pm, vidx);
                let bottom = self.sites[bot];
                if let Some(x) = self.intersect(llbnd, bisector) {
                    self.queue_delete(llbnd);
                    self.queue_insert(llbnd, x, x.distance(bottom));
                }
                if let Some(x) = self.intersect(bisector, rrbnd) {
                    self.queue_insert(bisector, x, x.distance(bottom));
                }
            } else {
                break;
            }
        }

        // clip the bisectors still open on the beach line
        let mut arc = self.arcs[self.leftend].right;
        while arc != self.rightend {
            if let Some(e) = self.arcs[arc].edge {
                self.clip_line(e);
            }
            arc = self.arcs[arc].right;
        }
    }

    // ------------------------------------------------------------------
    // clipping and emission
    // ------------------------------------------------------------------

    fn pseudo_vertex(&mut self, p: PointD) -> VertexRef {
        let key = (OrderedFloat(p.x), OrderedFloat(p.y));
        let next = self.pseudo_vertices.len();
        let idx = *self.pseudo_index.entry(key).or_insert(next);
        if idx == next {
            self.pseudo_vertices.push(p);
        }
        VertexRef::Pseudo(idx)
    }

    // Clip a bisector against the viewport and emit the surviving segment.
    // Endpoints that are true Voronoi vertices inside the viewport keep
    // their identity; every clipped end becomes a shared pseudo-vertex.
    fn clip_line(&mut self, edge: usize) {
        if self.emitted[edge] {
            return;
        }
        self.emitted[edge] = true;

        let (pxmin, pxmax) = (self.clipping.min.x, self.clipping.max.x);
        let (pymin, pymax) = (self.clipping.min.y, self.clipping.max.y);
        let e = &self.edges[edge];
        let coord = |v: Option<usize>| v.map(|i| self.true_vertices[i]);

        let (s1, s2) = if e.a == 1.0 && e.b >= 0.0 {
            (e.ep[RE], e.ep[LE])
        } else {
            (e.ep[LE], e.ep[RE])
        };
        let (c1, c2) = (coord(s1), coord(s2));

        let mut id1 = s1;
        let mut id2 = s2;
        let (mut x1, mut y1, mut x2, mut y2);
        if e.a == 1.0 {
            y1 = pymin;
            if let Some(p) = c1 {
                if p.y > pymin {
                    y1 = p.y;
                } else {
                    id1 = None;
                }
            }
            if y1 > pymax {
                return;
            }
            x1 = e.c - e.b * y1;
            y2 = pymax;
            if let Some(p) = c2 {
                if p.y < pymax {
                    y2 = p.y;
                } else {
                    id2 = None;
                }
            }
            if y2 < pymin {
                return;
            }
            x2 = e.c - e.b * y2;
            if (x1 > pxmax && x2 > pxmax) || (x1 < pxmin && x2 < pxmin) {
                return;
            }
            if x1 > pxmax {
                x1 = pxmax;
                y1 = (e.c - x1) / e.b;
                id1 = None;
            }
            if x1 < pxmin {
                x1 = pxmin;
                y1 = (e.c - x1) / e.b;
                id1 = None;
            }
            if x2 > pxmax {
                x2 = pxmax;
                y2 = (e.c - x2) / e.b;
                id2 = None;
            }
            if x2 < pxmin {
                x2 = pxmin;
                y2 = (e.c - x2) / e.b;
                id2 = None;
            }
        } else {
            x1 = pxmin;
            if let Some(p) = c1 {
                if p.x > pxmin {
                    x1 = p.x;
                } else {
                    id1 = None;
                }
            }
            if x1 > pxmax {
                return;
            }
            y1 = e.c - e.a * x1;
            x2 = pxmax;
            if let Some(p) = c2 {
                if p.x < pxmax {
                    x2 = p.x;
                } else {
                    id2 = None;
                }
            }
            if x2 < pxmin {
                return;
            }
            y2 = e.c - e.a * x2;
            if (y1 > pymax && y2 > pymax) || (y1 < pymin && y2 < pymin) {
                return;
            }
            if y1 > pymax {
                y1 = pymax;
                x1 = (e.c - y1) / e.a;
                id1 = None;
            }
            if y1 < pymin {
                y1 = pymin;
                x1 = (e.c - y1) / e.a;
                id1 = None;
            }
            if y2 > pymax {
                y2 = pymax;
                x2 = (e.c - y2) / e.a;
                id2 = None;
            }
            if y2 < pymin {
                y2 = pymin;
                x2 = (e.c - y2) / e.a;
                id2 = None;
            }
        }

        let site1 = self.input_index[self.edges[edge].reg[0]];
        let site2 = self.input_index[self.edges[edge].reg[1]];
        let r1 = match id1 {
            Some(i) => VertexRef::TrueVertex(i),
            None => self.pseudo_vertex(PointD::new(x1, y1)),
        };
        let r2 = match id2 {
            Some(i) => VertexRef::TrueVertex(i),
            None => self.pseudo_vertex(PointD::new(x2, y2)),
        };
        self.out_edges.push((site1, site2, r1, r2));
    }

    fn finish(self) -> VoronoiResults {
        let true_count = self.true_vertices.len();
        let mut vertices = self.true_vertices;
        vertices.extend(self.pseudo_vertices);
        let resolve = |r: &VertexRef| match *r {
            VertexRef::TrueVertex(i) => i,
            VertexRef::Pseudo(i) => true_count + i,
        };
        let edges = self
            .out_edges
            .iter()
            .map(|(s1, s2, r1, r2)| VoronoiEdge {
                site1: *s1,
                site2: *s2,
                vertex1: resolve(r1),
                vertex2: resolve(r2),
            })
            .collect_vec();
        let mut sites = vec![PointD::ZERO; self.sites.len()];
        for (sorted, &orig) in self.input_index.iter().enumerate() {
            sites[orig] = self.sites[sorted];
        }
        VoronoiResults {
            clipping_bounds: self.clipping,
            sites,
            vertices,
            true_vertex_count: true_count,
            edges,
            delaunay_edges: self.delaunay.into_iter().unique().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_one_true_vertex() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(2.0, 0.0),
            PointD::new(1.0, 2.0),
        ];
        let results = Voronoi::find_all(&sites, None).unwrap();
        assert!(results.true_vertex_count == 1);
        assert!(results.vertices[0].equals_eps(PointD::new(1.0, 0.75), 1e-9));
        assert!(results.edges.len() == 3);
        // every edge starts or ends at the circumcenter, the other end on
        // the viewport border
        for edge in &results.edges {
            let (a, b) = (results.vertices[edge.vertex1], results.vertices[edge.vertex2]);
            let touches_center = a.equals_eps(results.vertices[0], 1e-9)
                || b.equals_eps(results.vertices[0], 1e-9);
            assert!(touches_center);
        }
        let mut delaunay = results.delaunay_edges.clone();
        delaunay.sort_unstable();
        assert!(delaunay == vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn collinear_sites_have_no_true_vertices() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(1.0, 0.0),
            PointD::new(2.0, 0.0),
        ];
        let results = Voronoi::find_all(&sites, None).unwrap();
        assert!(results.true_vertex_count == 0);
        assert!(results.edges.len() == 2);
        let mut xs = results
            .edges
            .iter()
            .map(|e| {
                let (a, b) = (results.vertices[e.vertex1], results.vertices[e.vertex2]);
                assert!((a.x - b.x).abs() < 1e-9, "edges are vertical");
                // both ends clipped to the viewport border
                assert!(a.y == results.clipping_bounds.min.y || a.y == results.clipping_bounds.max.y);
                assert!(b.y == results.clipping_bounds.min.y || b.y == results.clipping_bounds.max.y);
                a.x
            })
            .collect_vec();
        xs.sort_by(f64::total_cmp);
        assert!((xs[0] - 0.5).abs() < 1e-9);
        assert!((xs[1] - 1.5).abs() < 1e-9);
        let mut delaunay = results.delaunay_edges.clone();
        delaunay.sort_unstable();
        assert!(delaunay == vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn rejects_too_few_sites() {
        let sites = vec![PointD::new(0.0, 0.0), PointD::new(1.0, 0.0)];
        assert!(Voronoi::find_all(&sites, None).is_err());
    }

    #[test]
    fn caller_viewport_only_grows() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(2.0, 0.0),
            PointD::new(1.0, 2.0),
        ];
        let tiny = RectD::new(0.9, 0.9, 1.1, 1.1);
        let results = Voronoi::find_all(&sites, Some(tiny)).unwrap();
        assert!(results.clipping_bounds.contains_rect(&tiny));
        assert!(results.clipping_bounds.width() >= 2.0);
        let large = RectD::new(-10.0, -10.0, 10.0, 10.0);
        let results = Voronoi::find_all(&sites, Some(large)).unwrap();
        assert!(results.clipping_bounds == large);
    }

    #[test]
    fn sites_equidistant_from_their_edges() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(4.0, 1.0),
            PointD::new(1.0, 5.0),
            PointD::new(5.0, 4.0),
            PointD::new(2.5, 2.5),
        ];
        let results = Voronoi::find_all(&sites, None).unwrap();
        for edge in &results.edges {
            let a = results.vertices[edge.vertex1];
            let b = results.vertices[edge.vertex2];
            let mid = a.lerp(b, 0.5);
            let d1 = mid.distance(results.sites[edge.site1]);
            let d2 = mid.distance(results.sites[edge.site2]);
            assert!((d1 - d2).abs() < 1e-6, "midpoint equidistant: {d1} vs {d2}");
        }
        // the dual is consistent: every Delaunay edge separates two cells
        // that share a Voronoi edge
        for &(i, j) in &results.delaunay_edges {
            let shared = results
                .edges
                .iter()
                .any(|e| (e.site1 == i && e.site2 == j) || (e.site1 == j && e.site2 == i));
            assert!(shared);
        }
    }

    #[test]
    fn square_of_sites_yields_cross() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(4.0, 0.0),
            PointD::new(0.0, 4.0),
            PointD::new(4.0, 4.0),
        ];
        let results = Voronoi::find_all(&sites, None).unwrap();
        // the two circle events coincide at the square center
        for i in 0..results.true_vertex_count {
            assert!(results.vertices[i].equals_eps(PointD::new(2.0, 2.0), 1e-9));
        }
        let mut delaunay = results.delaunay_edges.clone();
        delaunay.sort_unstable();
        assert!(delaunay.len() >= 4);
    }

    #[test]
    fn delaunay_subdivision_round_trip() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(2.0, 0.0),
            PointD::new(1.0, 2.0),
        ];
        let results = Voronoi::find_all(&sites, None).unwrap();
        let sub = results.delaunay_subdivision(1e-9).unwrap();
        assert!(sub.nr_verts() == 3);
        assert!(sub.nr_edges() == 6);
        assert!(sub.nr_faces() == 2);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
    }
}

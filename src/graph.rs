use crate::geometry::{PointD, PointI};
use crate::grid::PolygonGrid;
use crate::subdivision::{FaceKey, Subdivision, VertKey};
use crate::subdivision_locate::Locate;
use itertools::Itertools;
use petgraph::graphmap::DiGraphMap;

/// A uniform view of a 2-D tessellation as a graph, for path-finding and
/// similar algorithms: nodes have world locations, polygonal regions, and a
/// step metric.
pub trait Graph2D {
    type Node: Copy + Eq + std::hash::Hash;

    /// The maximum number of direct neighbors of any node.
    fn connectivity(&self) -> usize;

    fn node_count(&self) -> usize;

    fn nodes(&self) -> Vec<Self::Node>;

    fn contains_node(&self, node: Self::Node) -> bool;

    /// Direct neighbors of a node.
    fn neighbors(&self, node: Self::Node) -> Vec<Self::Node>;

    /// World location of a node.
    fn node_world(&self, node: Self::Node) -> PointD;

    /// The polygonal region a node covers, if it covers one.
    fn node_region(&self, node: Self::Node) -> Option<Vec<PointD>>;

    /// The node nearest to a world location.
    fn nearest_node(&self, location: PointD) -> Option<Self::Node>;

    /// Distance between two nodes in step units.
    fn distance(&self, a: Self::Node, b: Self::Node) -> f64;
}

/// Bounded faces as nodes, adjacency across shared edges.
impl Graph2D for Subdivision {
    type Node = FaceKey;

    fn connectivity(&self) -> usize {
        self.nodes()
            .into_iter()
            .map(|f| self.neighbors(f).len())
            .max()
            .unwrap_or(0)
    }

    fn node_count(&self) -> usize {
        self.nr_faces() - 1
    }

    fn nodes(&self) -> Vec<FaceKey> {
        let unbounded = self.unbounded_face();
        self.face_keys().into_iter().filter(|&f| f != unbounded).collect()
    }

    fn contains_node(&self, node: FaceKey) -> bool {
        node != self.unbounded_face() && self.faces.contains_key(node)
    }

    fn neighbors(&self, node: FaceKey) -> Vec<FaceKey> {
        let unbounded = self.unbounded_face();
        self.fneighbors(node).into_iter().filter(|&f| f != unbounded).collect()
    }

    fn node_world(&self, node: FaceKey) -> PointD {
        self.face_centroid(node).expect("bounded faces have a centroid")
    }

    fn node_region(&self, node: FaceKey) -> Option<Vec<PointD>> {
        self.face_polygon(node)
    }

    fn nearest_node(&self, location: PointD) -> Option<FaceKey> {
        if self.node_count() == 0 {
            return None;
        }
        let unbounded = self.unbounded_face();
        match self.locate(location) {
            Locate::Face(f) if f != unbounded => return Some(f),
            Locate::Edge(e) => {
                for f in [self.face(e), self.face(self.twin(e))] {
                    if f != unbounded {
                        return Some(f);
                    }
                }
            }
            _ => {}
        }
        // fall back to the nearest face centroid
        self.nodes()
            .into_iter()
            .min_by(|&a, &b| {
                self.node_world(a)
                    .distance_squared(location)
                    .total_cmp(&self.node_world(b).distance_squared(location))
            })
    }

    fn distance(&self, a: FaceKey, b: FaceKey) -> f64 {
        self.node_world(a).distance(self.node_world(b))
    }
}

/// Grid cells as nodes, adjacency per the grid's neighbor tables.
impl Graph2D for PolygonGrid {
    type Node = PointI;

    fn connectivity(&self) -> usize {
        Self::connectivity(self)
    }

    fn node_count(&self) -> usize {
        (self.size().width * self.size().height) as usize
    }

    fn nodes(&self) -> Vec<PointI> {
        (0..self.size().height)
            .flat_map(|r| (0..self.size().width).map(move |c| PointI::new(c, r)))
            .collect()
    }

    fn contains_node(&self, node: PointI) -> bool {
        self.contains_cell(node)
    }

    fn neighbors(&self, node: PointI) -> Vec<PointI> {
        Self::neighbors(self, node).expect("node is a grid cell")
    }

    fn node_world(&self, node: PointI) -> PointD {
        self.grid_to_world(node).expect("node is a grid cell")
    }

    fn node_region(&self, node: PointI) -> Option<Vec<PointD>> {
        self.cell_polygon(node).ok()
    }

    fn nearest_node(&self, location: PointD) -> Option<PointI> {
        Some(self.world_to_grid_clipped(location))
    }

    fn distance(&self, a: PointI, b: PointI) -> f64 {
        f64::from(self.step_distance(a, b).expect("nodes are grid cells"))
    }
}

// petgraph exports, for callers running their path-finding on petgraph.
impl Subdivision {
    /// The vertex graph: one node per vertex, one directed edge per
    /// half-edge, weighted by Euclidean length.
    #[must_use]
    pub fn vertex_graph(&self) -> DiGraphMap<VertKey, f64> {
        let edges = self
            .edge_keys()
            .map(|e| (self.root(e), self.tip(e), self.length(e)))
            .collect_vec();
        DiGraphMap::from_edges(edges)
    }

    /// The dual graph: one node per bounded face, edges between faces
    /// sharing an edge, weighted by centroid distance.
    #[must_use]
    pub fn face_graph(&self) -> DiGraphMap<FaceKey, f64> {
        let mut edges = vec![];
        for f in self.nodes() {
            for n in Graph2D::neighbors(self, f) {
                edges.push((f, n, self.node_world(f).distance(self.node_world(n))));
            }
        }
        DiGraphMap::from_edges(edges)
    }
}

impl PolygonGrid {
    /// The cell graph: one node per cell, edges between direct neighbors,
    /// weighted by center distance.
    #[must_use]
    pub fn cell_graph(&self) -> DiGraphMap<PointI, f64> {
        let mut edges = vec![];
        for cell in Graph2D::nodes(self) {
            for n in Graph2D::neighbors(self, cell) {
                edges.push((cell, n, self.node_world(cell).distance(self.node_world(n))));
            }
        }
        DiGraphMap::from_edges(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SizeI;
    use crate::grid::GridShift;
    use crate::polygon::{PolygonOrientation, RegularPolygon};

    fn two_cells() -> Subdivision {
        let left = vec![
            PointD::new(0.0, 0.0),
            PointD::new(5.0, 0.0),
            PointD::new(5.0, 10.0),
            PointD::new(0.0, 10.0),
        ];
        let right = vec![
            PointD::new(5.0, 0.0),
            PointD::new(10.0, 0.0),
            PointD::new(10.0, 10.0),
            PointD::new(5.0, 10.0),
        ];
        Subdivision::from_polygons(&[left, right], 1e-10).unwrap()
    }

    #[test]
    fn subdivision_as_graph() {
        let sub = two_cells();
        assert!(sub.node_count() == 2);
        let nodes = Graph2D::nodes(&sub);
        assert!(Graph2D::neighbors(&sub, nodes[0]) == vec![nodes[1]]);
        assert!(sub.contains_node(nodes[0]));
        assert!(!sub.contains_node(sub.unbounded_face()));
        let near = sub.nearest_node(PointD::new(2.0, 5.0)).unwrap();
        assert!(near == sub.face_with_number(1).unwrap());
        // a far outside point still resolves to the closest cell
        let far = sub.nearest_node(PointD::new(100.0, 5.0)).unwrap();
        assert!(far == sub.face_with_number(2).unwrap());
        assert!((Graph2D::distance(&sub, nodes[0], nodes[1]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn grid_as_graph() {
        let hex = RegularPolygon::from_side_length(6, 1.0, PolygonOrientation::OnEdge).unwrap();
        let grid = PolygonGrid::new(hex, GridShift::ColumnDown, SizeI::new(3, 3)).unwrap();
        assert!(Graph2D::connectivity(&grid) == 6);
        assert!(grid.node_count() == 9);
        let center = PointI::new(1, 1);
        assert!(Graph2D::neighbors(&grid, center).len() == 6);
        let world = grid.node_world(center);
        assert!(grid.nearest_node(world) == Some(center));
        assert!((Graph2D::distance(&grid, PointI::new(0, 0), PointI::new(2, 2)) - 3.0).abs() < 1e-9);
        assert!(grid.node_region(center).unwrap().len() == 6);
    }

    #[test]
    fn petgraph_exports() {
        let sub = two_cells();
        let vg = sub.vertex_graph();
        assert!(vg.node_count() == 6);
        assert!(vg.edge_count() == 14);
        let fg = sub.face_graph();
        assert!(fg.node_count() == 2);

        let hex = RegularPolygon::from_side_length(6, 1.0, PolygonOrientation::OnEdge).unwrap();
        let grid = PolygonGrid::new(hex, GridShift::ColumnDown, SizeI::new(3, 3)).unwrap();
        let cg = grid.cell_graph();
        assert!(cg.node_count() == 9);
    }
}

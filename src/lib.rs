#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

pub mod error;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod line;
pub mod polygon;
pub mod rect;
pub mod subdivision;
pub mod subdivision_build;
pub mod subdivision_edit;
pub mod subdivision_locate;
pub mod voronoi;

pub use error::{Error, Result};
pub use geometry::{PointD, PointI, SizeD, SizeI};
pub use graph::Graph2D;
pub use grid::{GridShift, GridView, INVALID_CELL, PolygonGrid};
pub use line::{LineD, LineIntersection, LineLocation, LineRelation};
pub use polygon::{PolygonOrientation, RegularPolygon};
pub use rect::RectD;
pub use subdivision::{EdgeKey, FaceKey, Subdivision, VertKey};
pub use subdivision_locate::Locate;
pub use voronoi::{Voronoi, VoronoiEdge, VoronoiResults};

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use std::collections::HashMap;

    // Connected components of the vertex-edge graph, for Euler's formula.
    fn component_count(sub: &Subdivision) -> usize {
        let verts = sub.vertex_keys().collect_vec();
        let mut comp: HashMap<VertKey, usize> = HashMap::new();
        let mut count = 0;
        for &start in &verts {
            if comp.contains_key(&start) {
                continue;
            }
            let mut stack = vec![start];
            comp.insert(start, count);
            while let Some(v) = stack.pop() {
                for e in sub.outgoing(v) {
                    let w = sub.tip(e);
                    if !comp.contains_key(&w) {
                        comp.insert(w, count);
                        stack.push(w);
                    }
                }
            }
            count += 1;
        }
        count
    }

    fn assert_euler(sub: &Subdivision) {
        let v = sub.nr_verts() as isize;
        let e = sub.nr_edges() as isize;
        let f = sub.nr_faces() as isize;
        let c = component_count(sub) as isize;
        assert!(v - e / 2 + f == 1 + c, "V={v} E={e} F={f} C={c}");
    }

    #[test]
    fn four_segment_cross() {
        // the diagonal absorbs one endpoint of the vertical segment at
        // (5, 5) and crosses the bottom segment's interior at (5, 0)
        let lines = vec![
            LineD::from_coords(0.0, 0.0, 10.0, 0.0),
            LineD::from_coords(5.0, -5.0, 5.0, 5.0),
            LineD::from_coords(0.0, 10.0, 10.0, 10.0),
            LineD::from_coords(0.0, 0.0, 10.0, 10.0),
        ];
        let sub = Subdivision::from_lines(&lines, 0.0).unwrap();
        assert!(sub.nr_verts() == 7);
        assert!(sub.nr_edges() == 14);
        assert!(sub.nr_faces() == 2);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        assert_euler(&sub);
        // the one bounded face is the triangle (0,0) (5,0) (5,5)
        let face = sub.face_with_number(1).unwrap();
        let triangle = [
            PointD::new(0.0, 0.0),
            PointD::new(5.0, 0.0),
            PointD::new(5.0, 5.0),
        ];
        assert!(sub.find_face(&triangle).unwrap() == face);
    }

    #[test]
    fn square_with_both_diagonals() {
        let lines = vec![
            LineD::from_coords(0.0, 0.0, 10.0, 0.0),
            LineD::from_coords(10.0, 0.0, 10.0, 10.0),
            LineD::from_coords(10.0, 10.0, 0.0, 10.0),
            LineD::from_coords(0.0, 10.0, 0.0, 0.0),
            LineD::from_coords(0.0, 0.0, 10.0, 10.0),
            LineD::from_coords(0.0, 10.0, 10.0, 0.0),
        ];
        let sub = Subdivision::from_lines(&lines, 0.0).unwrap();
        // the diagonals cross at the center, yielding four triangles
        assert!(sub.nr_verts() == 5);
        assert!(sub.nr_edges() == 16);
        assert!(sub.nr_faces() == 5);
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        assert_euler(&sub);
        assert!(sub.locate(PointD::new(5.0, 2.0)) != Locate::Face(sub.unbounded_face()));
        assert!(
            sub.locate(PointD::new(5.0, 5.0))
                == Locate::Vertex(sub.find_vertex(PointD::new(5.0, 5.0)).unwrap())
        );
    }

    #[test]
    fn voronoi_of_a_triangle_end_to_end() {
        let sites = vec![
            PointD::new(0.0, 0.0),
            PointD::new(2.0, 0.0),
            PointD::new(1.0, 2.0),
        ];
        let results = Voronoi::find_all(&sites, None).unwrap();
        assert!(results.true_vertex_count == 1);
        assert!(results.vertices[0].equals_eps(PointD::new(1.0, 0.75), 1e-9));
        assert!(results.edges.len() == 3);
        assert!(results.delaunay_edges.len() == 3);
        // the voronoi edges assemble into a subdivision partitioning the
        // viewport into one cell per site
        let sub = results.voronoi_subdivision(1e-9).unwrap();
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        for (i, &site) in results.sites.iter().enumerate() {
            match sub.locate(site) {
                Locate::Face(f) => {
                    assert!(f != sub.unbounded_face(), "site {i} inside its cell");
                }
                other => panic!("site {i} on the diagram skeleton: {other:?}"),
            }
        }
    }

    #[test]
    fn hex_grid_distances_and_export() {
        let hex = RegularPolygon::from_side_length(6, 1.0, PolygonOrientation::OnEdge).unwrap();
        let grid = PolygonGrid::new(hex, GridShift::ColumnDown, SizeI::new(5, 5)).unwrap();
        assert!(grid.step_distance(PointI::new(0, 0), PointI::new(4, 4)).unwrap() == 6);
        assert!(grid.step_distance(PointI::new(0, 0), PointI::new(2, 2)).unwrap() == 3);
        assert!(Graph2D::neighbors(&grid, PointI::new(2, 2)).len() == 6);
        assert!(Graph2D::neighbors(&grid, PointI::new(0, 0)).len() == 3);

        let mut small = grid.clone();
        small.set_size(SizeI::new(3, 3)).unwrap();
        let (sub, map) = small.to_subdivision(PointD::ZERO, None).unwrap();
        assert!(sub.nr_faces() == 10);
        let cell = PointI::new(1, 1);
        let polygon = small.cell_polygon(cell).unwrap();
        let by_lookup = *map.get_by_left(&cell).unwrap();
        assert!(sub.find_face(&polygon).unwrap() == by_lookup);
        assert!(map.get_by_right(&by_lookup) == Some(&cell));
    }

    #[test]
    fn liang_barsky_cases() {
        let r = RectD::new(0.0, 0.0, 10.0, 10.0);
        let clipped = r.clip_line(&LineD::from_coords(-1.0, 5.0, 11.0, 5.0)).unwrap();
        assert!(clipped == LineD::from_coords(0.0, 5.0, 10.0, 5.0));
        let clipped = r.clip_line(&LineD::from_coords(5.0, -1.0, 5.0, 11.0)).unwrap();
        assert!(clipped == LineD::from_coords(5.0, 0.0, 5.0, 10.0));
        assert!(r.clip_line(&LineD::from_coords(-1.0, -1.0, -0.5, -0.5)).is_none());
    }

    #[test]
    fn subdivision_serde_round_trip() {
        let lines = vec![
            LineD::from_coords(0.0, 0.0, 10.0, 0.0),
            LineD::from_coords(10.0, 0.0, 10.0, 10.0),
            LineD::from_coords(10.0, 10.0, 0.0, 10.0),
            LineD::from_coords(0.0, 10.0, 0.0, 0.0),
            LineD::from_coords(0.0, 0.0, 10.0, 10.0),
        ];
        let sub = Subdivision::from_lines(&lines, 1e-9).unwrap();
        let serialized = serde_json::to_string(&sub);
        assert!(serialized.is_ok(), "{serialized:?}");
        let deserialized = serde_json::from_str::<Subdivision>(&serialized.unwrap());
        assert!(deserialized.is_ok(), "{deserialized:?}");
        let back = deserialized.unwrap();
        assert!(back.nr_verts() == sub.nr_verts());
        assert!(back.nr_edges() == sub.nr_edges());
        assert!(back.nr_faces() == sub.nr_faces());
        assert!(back.validate().is_ok(), "{:?}", back.validate());
    }

    #[test]
    fn random_sites_voronoi_properties() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let sites = (0..40)
            .map(|_| PointD::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect_vec();
        let results = Voronoi::find_all(&sites, None).unwrap();
        assert!(results.edges.len() >= sites.len());
        for edge in &results.edges {
            let a = results.vertices[edge.vertex1];
            let b = results.vertices[edge.vertex2];
            for t in [0.25, 0.5, 0.75] {
                let p = a.lerp(b, t);
                let d1 = p.distance(results.sites[edge.site1]);
                let d2 = p.distance(results.sites[edge.site2]);
                assert!((d1 - d2).abs() < 1e-6 * (1.0 + d1), "{d1} vs {d2}");
            }
        }
        // no duplicate Delaunay edges
        let unique = results.delaunay_edges.iter().unique().count();
        assert!(unique == results.delaunay_edges.len());
    }

    #[test]
    fn random_segments_build_a_valid_subdivision() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let lines = (0..12)
            .map(|_| {
                LineD::from_coords(
                    rng.random_range(0.0..100.0),
                    rng.random_range(0.0..100.0),
                    rng.random_range(0.0..100.0),
                    rng.random_range(0.0..100.0),
                )
            })
            .collect_vec();
        let sub = Subdivision::from_lines(&lines, 1e-9).unwrap();
        assert!(sub.validate().is_ok(), "{:?}", sub.validate());
        assert_euler(&sub);
    }

    #[test]
    fn incremental_editing_matches_bulk_construction() {
        let lines = vec![
            LineD::from_coords(0.0, 0.0, 10.0, 0.0),
            LineD::from_coords(10.0, 0.0, 10.0, 10.0),
            LineD::from_coords(10.0, 10.0, 0.0, 10.0),
            LineD::from_coords(0.0, 10.0, 0.0, 0.0),
            LineD::from_coords(0.0, 0.0, 10.0, 10.0),
        ];
        let bulk = Subdivision::from_lines(&lines, 0.0).unwrap();

        let mut incremental = Subdivision::new(0.0).unwrap();
        for line in &lines {
            incremental.add_edge(line.start, line.end).unwrap();
        }
        assert!(incremental.nr_verts() == bulk.nr_verts());
        assert!(incremental.nr_edges() == bulk.nr_edges());
        assert!(incremental.nr_faces() == bulk.nr_faces());
        assert!(incremental.validate().is_ok(), "{:?}", incremental.validate());

        // removing the diagonal again leaves the plain square
        let diagonal = incremental
            .find_edge(PointD::new(0.0, 0.0), PointD::new(10.0, 10.0))
            .unwrap();
        incremental.remove_edge(diagonal).unwrap();
        assert!(incremental.nr_faces() == 2);
        assert!(incremental.validate().is_ok(), "{:?}", incremental.validate());
        assert_euler(&incremental);
    }

    #[test]
    fn clone_replicates_keys() {
        let lines = vec![
            LineD::from_coords(0.0, 0.0, 4.0, 0.0),
            LineD::from_coords(4.0, 0.0, 2.0, 3.0),
            LineD::from_coords(2.0, 3.0, 0.0, 0.0),
        ];
        let sub = Subdivision::from_lines(&lines, 0.0).unwrap();
        let copy = sub.clone();
        for v in sub.vertex_keys() {
            assert!(copy.position(v) == sub.position(v));
        }
        for f in sub.face_keys() {
            assert!(copy.face_number(f) == sub.face_number(f));
        }
    }
}

use mesh_halfedge::geometry::predicates::{circle_from_points_xy, distance_xy};
use mesh_halfedge::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Assert the empty-circumcircle property: no input point lies strictly
/// inside any triangle's circumcircle (up to floating-point slack).
fn assert_delaunay(tri: &Triangulation, points: &[Point2]) {
    let mesh = tri.mesh();
    for [a, b, c] in tri.triangles() {
        let (center, radius) =
            circle_from_points_xy(mesh.vertex_xy(a), mesh.vertex_xy(b), mesh.vertex_xy(c))
                .expect("non-degenerate triangle");
        let tolerance = 1e-7 * radius.max(1.0);
        for (i, &pt) in points.iter().enumerate() {
            let key = tri.point_key(i).expect("every point inserted");
            if key == a || key == b || key == c {
                continue;
            }
            assert!(
                distance_xy(pt, center) >= radius - tolerance,
                "point {i} lies inside the circumcircle of a triangle"
            );
        }
    }
}

/// Euler count for planar triangulations of a point set: with `n` inserted
/// points and `h` hull vertices, there are `2n - h - 2` triangles.
fn assert_triangle_count(tri: &Triangulation, n: usize) {
    let h = tri.mesh().boundary_vertices().len();
    assert_eq!(
        tri.number_of_triangles(),
        2 * n - h - 2,
        "expected 2*{n} - {h} - 2 triangles"
    );
}

#[test]
fn unit_square_corners() {
    let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let tri = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate(&square)
        .unwrap();
    assert_eq!(tri.number_of_triangles(), 2);
    assert_triangle_count(&tri, 4);

    // Each triangle fits inside the square's circumscribing circle.
    let mesh = tri.mesh();
    let max_radius = 0.5 * 2.0_f64.sqrt() + 1e-9;
    for [a, b, c] in tri.triangles() {
        let (_, radius) =
            circle_from_points_xy(mesh.vertex_xy(a), mesh.vertex_xy(b), mesh.vertex_xy(c))
                .unwrap();
        assert!(radius <= max_radius, "circumradius {radius} too large");
    }
    assert_delaunay(&tri, &square);

    // Fixed seed, fixed output.
    let again = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate(&square)
        .unwrap();
    assert_eq!(tri.triangles(), again.triangles());
}

#[test]
fn random_point_sets_are_delaunay() {
    for seed in [1_u64, 7, 42] {
        let mut rng = SmallRng::seed_from_u64(seed);
        let points: Vec<Point2> = (0..40)
            .map(|_| [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)])
            .collect();
        let config = DelaunayConfig {
            seed,
            ..DelaunayConfig::default()
        };
        let tri = DelaunayTriangulator::new(config).triangulate(&points).unwrap();
        assert!((0..points.len()).all(|i| tri.point_key(i).is_some()));
        tri.mesh().validate_invariants().unwrap();
        assert_delaunay(&tri, &points);
        assert_triangle_count(&tri, points.len());
    }
}

#[test]
fn regular_grid_survives_the_jitter() {
    // Perfectly co-circular quadruples everywhere; the seeded jitter must
    // break every tie.
    let mut points = Vec::new();
    for j in 0..5 {
        for i in 0..5 {
            points.push([i as f64, j as f64]);
        }
    }
    let tri = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate(&points)
        .unwrap();
    tri.mesh().validate_invariants().unwrap();
    assert!((0..points.len()).all(|i| tri.point_key(i).is_some()));
    // 25 points, 16 hull vertices: 2*25 - 16 - 2 = 32 triangles.
    assert_triangle_count(&tri, 25);
    assert_delaunay(&tri, &points);
}

#[test]
fn boundary_clipping_drops_outside_faces() {
    let mut points = Vec::new();
    for j in 0..4 {
        for i in 0..4 {
            points.push([i as f64, j as f64]);
        }
    }
    // Keep only the lower-left triangle of the domain.
    let boundary = vec![[-0.5, -0.5], [3.5, -0.5], [-0.5, 3.5]];
    let tri = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate_clipped(&points, Some(&boundary), &[])
        .unwrap();
    assert!(tri.number_of_triangles() > 0);
    let mesh = tri.mesh();
    for fkey in mesh.faces() {
        let [cx, cy, _] = mesh.face_centroid(fkey).unwrap();
        assert!(
            cx + cy < 3.0 + 1e-6,
            "face centroid ({cx}, {cy}) outside the clip boundary"
        );
    }
    mesh.validate_invariants().unwrap();
}

#[test]
fn hole_clipping_punches_faces_out() {
    let mut points = Vec::new();
    for j in 0..5 {
        for i in 0..5 {
            points.push([i as f64, j as f64]);
        }
    }
    let hole = vec![[0.5, 0.5], [3.5, 0.5], [3.5, 3.5], [0.5, 3.5]];
    let full = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate(&points)
        .unwrap();
    let punched = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate_clipped(&points, None, std::slice::from_ref(&hole))
        .unwrap();
    assert!(punched.number_of_triangles() < full.number_of_triangles());
    let mesh = punched.mesh();
    for fkey in mesh.faces() {
        let [cx, cy, _] = mesh.face_centroid(fkey).unwrap();
        assert!(
            !(cx > 0.5 && cx < 3.5 && cy > 0.5 && cy < 3.5),
            "face centroid ({cx}, {cy}) inside the hole"
        );
    }
    mesh.validate_invariants().unwrap();
}

#[test]
fn triangles_reference_live_vertices_only() {
    let points = [[0.0, 0.0], [3.0, 0.0], [3.0, 2.0], [0.0, 2.0], [1.5, 1.0]];
    let tri = DelaunayTriangulator::new(DelaunayConfig::default())
        .triangulate(&points)
        .unwrap();
    let mesh = tri.mesh();
    // The super-triangle is fully gone.
    assert_eq!(mesh.number_of_vertices(), points.len());
    for [a, b, c] in tri.triangles() {
        for key in [a, b, c] {
            assert!(mesh.has_vertex(key));
        }
    }
    assert_triangle_count(&tri, points.len());
}

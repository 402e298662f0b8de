use mesh_halfedge::prelude::*;
use std::collections::HashSet;

fn unit_triangle() -> (HalfedgeMesh, [VertexKey; 3]) {
    let mut mesh = HalfedgeMesh::new();
    let a = mesh.add_vertex_at(0.0, 0.0, 0.0);
    let b = mesh.add_vertex_at(1.0, 0.0, 0.0);
    let c = mesh.add_vertex_at(0.0, 1.0, 0.0);
    (mesh, [a, b, c])
}

#[test]
fn one_triangle_scenario() {
    // Three vertices, one face: the concrete acceptance scenario.
    let (mut mesh, [a, b, c]) = unit_triangle();
    let f = mesh.add_face(&[a, b, c]).unwrap();
    assert_eq!(mesh.faces().collect::<Vec<_>>(), vec![f]);
    assert_eq!(f, FaceKey::new(0));

    let edges: HashSet<EdgeKey> = mesh.edges().map(|(u, v)| edge_key(u, v)).collect();
    assert_eq!(
        edges,
        HashSet::from([edge_key(a, b), edge_key(b, c), edge_key(c, a)])
    );

    // Splitting along an existing edge is rejected: a and b are neighbors.
    assert_eq!(
        mesh.split_face(f, a, b),
        Err(MeshHalfedgeError::AdjacentSplitVertices(a, b, f))
    );
}

#[test]
fn adjacency_agrees_with_faces_through_mutation_sequences() {
    // Build a 3x3 vertex grid of quads, then put it through a mutation
    // mill; the adjacency/face consistency invariant must hold throughout.
    let mut mesh = HalfedgeMesh::new();
    let mut grid = Vec::new();
    for j in 0..3 {
        for i in 0..3 {
            grid.push(mesh.add_vertex_at(i as f64, j as f64, 0.0));
        }
    }
    let at = |i: usize, j: usize| grid[j * 3 + i];
    let mut faces = Vec::new();
    for j in 0..2 {
        for i in 0..2 {
            faces.push(
                mesh.add_face(&[at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)])
                    .unwrap(),
            );
        }
    }
    mesh.validate_invariants().unwrap();
    assert_eq!(mesh.number_of_faces(), 4);
    assert_eq!(mesh.number_of_edges(), 12);

    // Split one quad along its diagonal.
    mesh.split_face(faces[0], at(0, 0), at(1, 1)).unwrap();
    mesh.validate_invariants().unwrap();

    // Split an interior edge.
    mesh.split_edge(at(1, 0), at(1, 1), 0.5, false)
        .unwrap()
        .unwrap();
    mesh.validate_invariants().unwrap();

    // Delete the center vertex; all its faces cascade away.
    mesh.delete_vertex(at(1, 1)).unwrap();
    mesh.validate_invariants().unwrap();
    assert!(!mesh.has_vertex(at(1, 1)));
    for fkey in mesh.faces() {
        assert!(!mesh.face_vertices(fkey).unwrap().contains(&at(1, 1)));
    }

    // Delete one of the remaining faces explicitly.
    let fkey = mesh.faces().next().unwrap();
    mesh.delete_face(fkey).unwrap();
    mesh.validate_invariants().unwrap();
}

#[test]
fn keys_are_unique_across_the_whole_mutation_history() {
    let mut mesh = HalfedgeMesh::new();
    let mut vertex_keys = HashSet::new();
    let mut face_keys = HashSet::new();
    for round in 0..5 {
        let a = mesh.add_vertex_at(0.0, round as f64, 0.0);
        let b = mesh.add_vertex_at(1.0, round as f64, 0.0);
        let c = mesh.add_vertex_at(1.0, 1.0 + round as f64, 0.0);
        for key in [a, b, c] {
            assert!(vertex_keys.insert(key), "vertex key {key} reused");
        }
        let f = mesh.add_face(&[a, b, c]).unwrap();
        assert!(face_keys.insert(f), "face key {f} reused");
        // Tear the triangle down again; keys must still never recur.
        mesh.delete_vertex(a).unwrap();
        mesh.delete_vertex(b).unwrap();
        mesh.delete_vertex(c).unwrap();
    }
    assert_eq!(mesh.number_of_vertices(), 0);
    assert_eq!(mesh.number_of_faces(), 0);
}

#[test]
fn deletion_leaves_no_trace() {
    let (mut mesh, [a, b, c]) = unit_triangle();
    let d = mesh.add_vertex_at(1.0, 1.0, 0.0);
    mesh.add_face(&[a, b, c]).unwrap();
    mesh.add_face(&[b, d, c]).unwrap();

    mesh.delete_vertex(b).unwrap();
    assert!(!mesh.vertices().any(|v| v == b));
    for fkey in mesh.faces() {
        assert!(!mesh.face_vertices(fkey).unwrap().contains(&b));
    }
    assert!(!mesh.edges().any(|(u, v)| u == b || v == b));
    mesh.validate_invariants().unwrap();
}

#[test]
fn round_trip_preserves_vertices_and_faces() {
    let vertices = vec![
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [2.0, 2.0, 0.0],
        [0.0, 2.0, 0.0],
        [1.0, 1.0, 1.0],
    ];
    let faces = vec![
        vec![0, 1, 4],
        vec![1, 2, 4],
        vec![2, 3, 4],
        vec![3, 0, 4],
    ];
    let mesh = HalfedgeMesh::from_vertices_and_faces(&vertices, &faces).unwrap();
    let (v2, f2) = mesh.to_vertices_and_faces();
    assert_eq!(v2, vertices);
    assert_eq!(f2, faces);

    // And the rebuilt mesh round-trips too.
    let rebuilt = HalfedgeMesh::from_vertices_and_faces(&v2, &f2).unwrap();
    let (v3, f3) = rebuilt.to_vertices_and_faces();
    assert_eq!(v3, vertices);
    assert_eq!(f3, faces);
}

#[test]
fn structural_errors_leave_the_mesh_untouched() {
    let (mut mesh, [a, b, c]) = unit_triangle();
    let f = mesh.add_face(&[a, b, c]).unwrap();
    let snapshot = mesh.to_vertices_and_faces();

    assert_eq!(
        mesh.add_face(&[a, b, c]).unwrap_err(),
        MeshHalfedgeError::NonManifoldEdge(a, b, f)
    );
    assert!(matches!(
        mesh.add_face(&[a, VertexKey::new(42), b]).unwrap_err(),
        MeshHalfedgeError::UnknownVertex(_)
    ));
    assert!(mesh.delete_vertex(VertexKey::new(42)).is_err());
    assert!(mesh.delete_face(FaceKey::new(42)).is_err());

    assert_eq!(mesh.to_vertices_and_faces(), snapshot);
    mesh.validate_invariants().unwrap();
}

#[test]
fn validation_options_catch_external_corruption() {
    let mesh = HalfedgeMesh::from_vertices_and_faces(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [3.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [3.0, 1.0, 0.0],
        ],
        &[vec![0, 1, 2], vec![3, 4, 5]],
    )
    .unwrap();
    // Two disjoint triangles are fine.
    validate_mesh_topology(&mesh, TopologyValidationOptions::all()).unwrap();
}

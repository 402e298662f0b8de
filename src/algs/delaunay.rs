//! Incremental Delaunay triangulation of 2D point sets.
//!
//! Bowyer-Watson-style algorithm driven entirely through the half-edge
//! mesh's editing operators: seed a far-oversized super triangle, insert
//! each point with a 1-to-3 face split, then repair the Delaunay property
//! locally by flipping every edge whose opposite circumcircle contains the
//! new point. The super-triangle vertices are deleted at the end (cascading
//! over their faces), and the result can optionally be clipped to a boundary
//! polygon and punched with holes by centroid containment.
//!
//! Input points are perturbed by a tiny seeded jitter so that perfectly
//! regular inputs (grids, co-circular corner sets) land in general position;
//! all randomized decisions draw from an explicitly seeded `SmallRng`, so
//! runs are reproducible.

use crate::geometry::predicates::{
    Point2, bounding_box_xy, circle_from_points_xy, distance_xy, is_point_in_circle_xy,
    is_point_in_polygon_xy, is_point_in_triangle_xy,
};
use crate::mesh_error::MeshHalfedgeError;
use crate::topology::halfedge::HalfedgeMesh;
use crate::topology::key::{FaceKey, VertexKey};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Tuning knobs for [`DelaunayTriangulator`].
#[derive(Debug, Clone, Copy)]
pub struct DelaunayConfig {
    /// Half-width of the uniform coordinate perturbation.
    pub jitter: f64,
    /// Seed for the jitter generator; fixed seed, fixed output.
    pub seed: u64,
    /// Super-triangle circumradius as a multiple of the input bounding-box
    /// diagonal.
    pub super_triangle_scale: f64,
}

impl Default for DelaunayConfig {
    fn default() -> Self {
        Self {
            jitter: 1e-12,
            seed: 0,
            super_triangle_scale: 300.0,
        }
    }
}

/// Incremental Delaunay triangulator over a [`HalfedgeMesh`].
#[derive(Debug, Clone, Default)]
pub struct DelaunayTriangulator {
    config: DelaunayConfig,
}

/// Result of a triangulation run: the mesh plus the key each input point
/// ended up under.
#[derive(Debug, Clone)]
pub struct Triangulation {
    mesh: HalfedgeMesh,
    point_keys: Vec<Option<VertexKey>>,
}

impl Triangulation {
    /// The triangulated mesh. Coordinates carry the jitter applied during
    /// insertion.
    pub fn mesh(&self) -> &HalfedgeMesh {
        &self.mesh
    }

    /// The vertex key of input point `i`, or `None` if the point was
    /// dropped (no containing triangle was found for it).
    pub fn point_key(&self, i: usize) -> Option<VertexKey> {
        self.point_keys.get(i).copied().flatten()
    }

    /// The triangles as vertex-key triples, in face iteration order.
    pub fn triangles(&self) -> Vec<[VertexKey; 3]> {
        self.mesh
            .faces()
            .map(|fkey| {
                let cycle = self.mesh.face_vertices(fkey).expect("face key from faces()");
                [cycle[0], cycle[1], cycle[2]]
            })
            .collect()
    }

    /// Number of triangles.
    pub fn number_of_triangles(&self) -> usize {
        self.mesh.number_of_faces()
    }

    /// Export as coordinate list plus index triples (see
    /// [`HalfedgeMesh::to_vertices_and_faces`]).
    pub fn to_vertices_and_faces(&self) -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
        self.mesh.to_vertices_and_faces()
    }
}

impl DelaunayTriangulator {
    /// Triangulator with the given configuration.
    pub fn new(config: DelaunayConfig) -> Self {
        Self { config }
    }

    /// Triangulate a point set.
    pub fn triangulate(&self, points: &[Point2]) -> Result<Triangulation, MeshHalfedgeError> {
        self.triangulate_clipped(points, None, &[])
    }

    /// Triangulate a point set, then clip by centroid containment: faces
    /// whose centroid falls outside `boundary` (when given) or inside any of
    /// the `holes` are deleted.
    pub fn triangulate_clipped(
        &self,
        points: &[Point2],
        boundary: Option<&[Point2]>,
        holes: &[Vec<Point2>],
    ) -> Result<Triangulation, MeshHalfedgeError> {
        let mut result = self.build(points)?;
        if let Some(boundary) = boundary {
            let faces: Vec<FaceKey> = result.mesh.faces().collect();
            for fkey in faces {
                let [cx, cy, _] = result.mesh.face_centroid(fkey).expect("live face");
                if !is_point_in_polygon_xy([cx, cy], boundary) {
                    result.mesh.delete_face(fkey)?;
                }
            }
        }
        for hole in holes {
            let faces: Vec<FaceKey> = result.mesh.faces().collect();
            for fkey in faces {
                let [cx, cy, _] = result.mesh.face_centroid(fkey).expect("live face");
                if is_point_in_polygon_xy([cx, cy], hole) {
                    result.mesh.delete_face(fkey)?;
                }
            }
        }
        Ok(result)
    }

    /// Run the insertion loop over all points.
    fn build(&self, points: &[Point2]) -> Result<Triangulation, MeshHalfedgeError> {
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let jitter = self.config.jitter;
        let jittered: Vec<Point2> = points
            .iter()
            .map(|&[x, y]| {
                if jitter > 0.0 {
                    [
                        x + rng.gen_range(-jitter..jitter),
                        y + rng.gen_range(-jitter..jitter),
                    ]
                } else {
                    [x, y]
                }
            })
            .collect();

        let mut mesh = HalfedgeMesh::new();
        let mut point_keys: Vec<Option<VertexKey>> = vec![None; points.len()];
        if jittered.is_empty() {
            return Ok(Triangulation { mesh, point_keys });
        }

        let [sa, sb, sc] = self.seed_super_triangle(&mut mesh, &jittered)?;

        for (i, &pt) in jittered.iter().enumerate() {
            // Materialize before the scan: insertion mutates the face table.
            let candidates: Vec<FaceKey> = mesh.faces().collect();
            let containing = candidates.into_iter().find(|&fkey| {
                let cycle = mesh.face_vertices(fkey).expect("live face");
                is_point_in_triangle_xy(
                    pt,
                    mesh.vertex_xy(cycle[0]),
                    mesh.vertex_xy(cycle[1]),
                    mesh.vertex_xy(cycle[2]),
                    true,
                )
            });
            let Some(fkey) = containing else {
                // Degenerate leftover the jitter did not resolve; drop the
                // point rather than corrupt the triangulation.
                log::debug!("point ({}, {}) claimed by no triangle; skipped", pt[0], pt[1]);
                continue;
            };
            let (w, seeds) = insert_vertex(&mut mesh, fkey, pt)?;
            point_keys[i] = Some(w);
            self.repair_around(&mut mesh, w, pt, seeds)?;
        }

        for key in [sa, sb, sc] {
            mesh.delete_vertex(key)?;
        }
        Ok(Triangulation { mesh, point_keys })
    }

    /// Seed the mesh with one triangle far outside the input bounding box.
    fn seed_super_triangle(
        &self,
        mesh: &mut HalfedgeMesh,
        points: &[Point2],
    ) -> Result<[VertexKey; 3], MeshHalfedgeError> {
        let (min, max) = bounding_box_xy(points);
        let center = [0.5 * (min[0] + max[0]), 0.5 * (min[1] + max[1])];
        let diagonal = distance_xy(min, max).max(1.0);
        let r = self.config.super_triangle_scale * diagonal;
        let (s3, half) = (3.0_f64.sqrt() / 2.0, 0.5);
        let a = mesh.add_vertex_at(center[0], center[1] + r, 0.0);
        let b = mesh.add_vertex_at(center[0] - s3 * r, center[1] - half * r, 0.0);
        let c = mesh.add_vertex_at(center[0] + s3 * r, center[1] - half * r, 0.0);
        mesh.add_face(&[a, b, c])?;
        Ok([a, b, c])
    }

    /// Flip-repair loop: restore the local Delaunay property around a
    /// freshly inserted vertex.
    fn repair_around(
        &self,
        mesh: &mut HalfedgeMesh,
        w: VertexKey,
        pt: Point2,
        seeds: [FaceKey; 3],
    ) -> Result<(), MeshHalfedgeError> {
        let mut pending: VecDeque<FaceKey> = seeds.into_iter().collect();
        while let Some(fkey) = pending.pop_front() {
            // A queued face may have been consumed by an earlier flip.
            if !mesh.has_face(fkey) {
                continue;
            }
            let cycle = mesh.face_vertices(fkey).expect("live face").to_vec();
            let Some(i) = cycle.iter().position(|&k| k == w) else {
                continue;
            };
            let (a, b) = (cycle[(i + 1) % 3], cycle[(i + 2) % 3]);
            // Face across the edge opposite `w`.
            let Some(Some(opposite)) = mesh.halfedge_face(b, a) else {
                continue;
            };
            let oc = mesh.face_vertices(opposite).expect("live face");
            let (p0, p1, p2) = (
                mesh.vertex_xy(oc[0]),
                mesh.vertex_xy(oc[1]),
                mesh.vertex_xy(oc[2]),
            );
            if let Some((c_center, c_radius)) = circle_from_points_xy(p0, p1, p2) {
                if is_point_in_circle_xy(pt, c_center, c_radius) {
                    let (g1, g2) = mesh.trimesh_swap_edge(a, b)?;
                    pending.push_back(g1);
                    pending.push_back(g2);
                }
            }
        }
        Ok(())
    }
}

/// 1-to-3 split: replace the triangle containing `pt` by three triangles
/// fanning out of a new vertex at `pt`.
fn insert_vertex(
    mesh: &mut HalfedgeMesh,
    fkey: FaceKey,
    pt: Point2,
) -> Result<(VertexKey, [FaceKey; 3]), MeshHalfedgeError> {
    let cycle = mesh
        .face_vertices(fkey)
        .ok_or(MeshHalfedgeError::UnknownFace(fkey))?
        .to_vec();
    let [a, b, c] = [cycle[0], cycle[1], cycle[2]];
    mesh.delete_face(fkey)?;
    let w = mesh.add_vertex_at(pt[0], pt[1], 0.0);
    let f1 = mesh.add_face(&[a, b, w])?;
    let f2 = mesh.add_face(&[b, c, w])?;
    let f3 = mesh.add_face(&[c, a, w])?;
    Ok((w, [f1, f2, f3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangulator() -> DelaunayTriangulator {
        DelaunayTriangulator::new(DelaunayConfig::default())
    }

    #[test]
    fn empty_and_tiny_inputs() {
        let tri = triangulator().triangulate(&[]).unwrap();
        assert_eq!(tri.number_of_triangles(), 0);
        let tri = triangulator().triangulate(&[[0.0, 0.0]]).unwrap();
        assert_eq!(tri.number_of_triangles(), 0);
        assert_eq!(tri.mesh().number_of_vertices(), 1);
        let tri = triangulator()
            .triangulate(&[[0.0, 0.0], [1.0, 0.0]])
            .unwrap();
        assert_eq!(tri.number_of_triangles(), 0);
    }

    #[test]
    fn single_triangle_input() {
        let tri = triangulator()
            .triangulate(&[[0.0, 0.0], [4.0, 0.0], [0.0, 3.0]])
            .unwrap();
        assert_eq!(tri.number_of_triangles(), 1);
        assert_eq!(tri.mesh().number_of_vertices(), 3);
        for i in 0..3 {
            assert!(tri.point_key(i).is_some());
        }
    }

    #[test]
    fn unit_square_gives_two_triangles() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let tri = triangulator().triangulate(&square).unwrap();
        assert_eq!(tri.number_of_triangles(), 2);
        // Deterministic under the fixed seed: the same run twice agrees.
        let again = triangulator().triangulate(&square).unwrap();
        assert_eq!(tri.triangles(), again.triangles());
    }

    #[test]
    fn insert_vertex_fans_the_containing_triangle() {
        let mut mesh = HalfedgeMesh::new();
        let a = mesh.add_vertex_at(0.0, 0.0, 0.0);
        let b = mesh.add_vertex_at(4.0, 0.0, 0.0);
        let c = mesh.add_vertex_at(0.0, 4.0, 0.0);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        let (w, seeds) = insert_vertex(&mut mesh, f, [1.0, 1.0]).unwrap();
        assert_eq!(mesh.number_of_faces(), 3);
        assert_eq!(mesh.vertex_degree(w), 3);
        for fkey in seeds {
            assert!(mesh.face_vertices(fkey).unwrap().contains(&w));
        }
    }
}

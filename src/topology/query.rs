//! Derived read-only queries over a [`HalfedgeMesh`].
//!
//! Everything here is expressible through the mesh's public interface:
//! coordinate resolution via the attribute protocol, neighborhoods and
//! boundary tests via the adjacency table, and face geometry from the
//! boundary cycles. No method in this module mutates topology.

use crate::data::attributes::AttrValue;
use crate::geometry::predicates::{
    Point2, Point3, centroid_points, sorted_ccw_xy, unit_normal,
};
use crate::topology::halfedge::{HalfedgeMesh, cyclic_pairs};
use crate::topology::key::{FaceKey, VertexKey};

impl HalfedgeMesh {
    // ------------------------------------------------------------------
    // Vertex geometry
    // ------------------------------------------------------------------

    /// The `(x, y, z)` coordinates of a vertex, resolved through the
    /// attribute store (unset axes resolve to the default, usually 0).
    pub fn vertex_coordinates(&self, key: VertexKey) -> Point3 {
        let axis = |name: &str| {
            self.vertex_attribute(key, name)
                .and_then(|value| value.as_number())
                .unwrap_or(0.0)
        };
        [axis("x"), axis("y"), axis("z")]
    }

    /// Coordinates in a caller-chosen axis order, e.g. `"xy"` or `"zyx"`.
    pub fn vertex_coordinates_axes(&self, key: VertexKey, axes: &str) -> Vec<f64> {
        let [x, y, z] = self.vertex_coordinates(key);
        axes.chars()
            .filter_map(|axis| match axis {
                'x' => Some(x),
                'y' => Some(y),
                'z' => Some(z),
                _ => None,
            })
            .collect()
    }

    /// The XY projection of a vertex.
    #[inline]
    pub fn vertex_xy(&self, key: VertexKey) -> Point2 {
        let [x, y, _] = self.vertex_coordinates(key);
        [x, y]
    }

    /// Overwrite a vertex's coordinates.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownVertex`](crate::mesh_error::MeshHalfedgeError::UnknownVertex)
    /// if `key` is not in the mesh.
    pub fn set_vertex_coordinates(
        &mut self,
        key: VertexKey,
        [x, y, z]: Point3,
    ) -> Result<(), crate::mesh_error::MeshHalfedgeError> {
        self.set_vertex_attribute(key, "x", x)?;
        self.set_vertex_attribute(key, "y", y)?;
        self.set_vertex_attribute(key, "z", z)
    }

    // ------------------------------------------------------------------
    // Neighborhoods
    // ------------------------------------------------------------------

    /// Neighbors of a vertex in adjacency-row order.
    pub fn vertex_neighbors(&self, key: VertexKey) -> Vec<VertexKey> {
        self.vertex_halfedges(key)
            .map(|row| row.iter().map(|&(v, _)| v).collect())
            .unwrap_or_default()
    }

    /// Neighbors of a vertex sorted counterclockwise by planar angle.
    pub fn vertex_neighbors_ordered(&self, key: VertexKey) -> Vec<VertexKey> {
        let center = self.vertex_xy(key);
        let keyed: Vec<(VertexKey, Point2)> = self
            .vertex_neighbors(key)
            .into_iter()
            .map(|nbr| (nbr, self.vertex_xy(nbr)))
            .collect();
        sorted_ccw_xy(center, &keyed)
    }

    /// Number of neighbors of a vertex.
    #[inline]
    pub fn vertex_degree(&self, key: VertexKey) -> usize {
        self.vertex_halfedges(key).map_or(0, |row| row.len())
    }

    /// Faces incident to a vertex, in adjacency-row order.
    pub fn vertex_faces(&self, key: VertexKey) -> Vec<FaceKey> {
        self.vertex_halfedges(key)
            .map(|row| row.iter().filter_map(|&(_, face)| face).collect())
            .unwrap_or_default()
    }

    /// True iff any edge incident to the vertex is a boundary edge.
    pub fn is_boundary_vertex(&self, key: VertexKey) -> bool {
        self.vertex_neighbors(key)
            .iter()
            .any(|&nbr| self.is_boundary_edge(key, nbr))
    }

    /// All boundary vertices, in vertex iteration order.
    pub fn boundary_vertices(&self) -> Vec<VertexKey> {
        self.vertices()
            .filter(|&key| self.is_boundary_vertex(key))
            .collect()
    }

    // ------------------------------------------------------------------
    // Face geometry
    // ------------------------------------------------------------------

    /// The directed half-edges of a face's boundary cycle, in order.
    pub fn face_halfedges(&self, fkey: FaceKey) -> Vec<(VertexKey, VertexKey)> {
        self.face_vertices(fkey)
            .map(|cycle| cyclic_pairs(cycle).map(|(&a, &b)| (a, b)).collect())
            .unwrap_or_default()
    }

    /// Arithmetic mean of a face's vertex coordinates.
    pub fn face_centroid(&self, fkey: FaceKey) -> Option<Point3> {
        let cycle = self.face_vertices(fkey)?;
        let coords: Vec<Point3> = cycle.iter().map(|&v| self.vertex_coordinates(v)).collect();
        Some(centroid_points(&coords))
    }

    /// Unit normal from the face's first three vertices, or `None` when they
    /// are collinear (or the face is unknown).
    pub fn face_normal(&self, fkey: FaceKey) -> Option<Point3> {
        let cycle = self.face_vertices(fkey)?;
        let a = self.vertex_coordinates(cycle[0]);
        let b = self.vertex_coordinates(cycle[1]);
        let c = self.vertex_coordinates(cycle[2]);
        unit_normal(a, b, c)
    }

    /// True iff any of the face's edges is a boundary edge.
    pub fn is_boundary_face(&self, fkey: FaceKey) -> bool {
        self.face_halfedges(fkey)
            .iter()
            .any(|&(u, v)| self.is_boundary_edge(u, v))
    }

    // ------------------------------------------------------------------
    // Edge geometry
    // ------------------------------------------------------------------

    /// The vector from `u` to `v`.
    pub fn edge_vector(&self, u: VertexKey, v: VertexKey) -> Point3 {
        let a = self.vertex_coordinates(u);
        let b = self.vertex_coordinates(v);
        [b[0] - a[0], b[1] - a[1], b[2] - a[2]]
    }

    /// Length of the edge `u` - `v`.
    pub fn edge_length(&self, u: VertexKey, v: VertexKey) -> f64 {
        let [dx, dy, dz] = self.edge_vector(u, v);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The point at parameter `t` along `u -> v` (`t = 0.5` is the midpoint).
    pub fn edge_point(&self, u: VertexKey, v: VertexKey, t: f64) -> Point3 {
        let a = self.vertex_coordinates(u);
        let [dx, dy, dz] = self.edge_vector(u, v);
        [a[0] + t * dx, a[1] + t * dy, a[2] + t * dz]
    }

    /// Midpoint of the edge `u` - `v`.
    #[inline]
    pub fn edge_midpoint(&self, u: VertexKey, v: VertexKey) -> Point3 {
        self.edge_point(u, v, 0.5)
    }

    /// Resolve a vertex attribute as a number, for callers that know the
    /// schema (coordinates, force densities, loads).
    pub fn vertex_attribute_number(&self, key: VertexKey, name: &str) -> Option<f64> {
        self.vertex_attribute(key, name)
            .and_then(|value: AttrValue| value.as_number())
    }
}

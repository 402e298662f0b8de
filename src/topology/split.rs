//! Local topological editing operators: edge and face splitting, edge flips.
//!
//! These compose the atomic table operations of
//! [`HalfedgeMesh`](crate::topology::halfedge::HalfedgeMesh) into the
//! editing moves higher-level algorithms are built from. The general-face
//! variants work on arbitrary polygonal faces; the `trimesh_` variants
//! assume (and check) triangular faces on both sides of the edge they touch
//! and are what the Delaunay triangulator drives.
//!
//! Splitting a boundary edge is refused by policy unless the caller opts in
//! with `allow_boundary`; the refusal is the soft `Ok(None)`, not an error,
//! so a caller that loops over candidate edges can skip protected ones
//! without special-casing.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshHalfedgeError;
use crate::topology::halfedge::HalfedgeMesh;
use crate::topology::key::{FaceKey, VertexKey};

impl HalfedgeMesh {
    /// Split the edge `u` - `v` at parameter `t`, keeping both incident
    /// faces as (now one-vertex-longer) polygons.
    ///
    /// The new vertex `w` lands at the parametrized point between `u` and
    /// `v`; the adjacency entries `u -> v` / `v -> u` are replaced by
    /// `u -> w -> v` / `v -> w -> u`, and `w` is spliced into the boundary
    /// cycle of each real incident face.
    ///
    /// Returns `Ok(None)` without touching the mesh when the edge borders
    /// the boundary and `allow_boundary` is false.
    ///
    /// # Errors
    /// - [`MeshHalfedgeError::ParameterOutOfRange`] unless `0 < t < 1`.
    /// - [`MeshHalfedgeError::UnknownHalfedge`] if the edge is absent.
    pub fn split_edge(
        &mut self,
        u: VertexKey,
        v: VertexKey,
        t: f64,
        allow_boundary: bool,
    ) -> Result<Option<VertexKey>, MeshHalfedgeError> {
        if !(t > 0.0 && t < 1.0) {
            return Err(MeshHalfedgeError::ParameterOutOfRange(t));
        }
        let fkey_uv = self
            .halfedge_face(u, v)
            .ok_or(MeshHalfedgeError::UnknownHalfedge(u, v))?;
        let fkey_vu = self
            .halfedge_face(v, u)
            .ok_or(MeshHalfedgeError::UnknownHalfedge(v, u))?;
        if !allow_boundary && (fkey_uv.is_none() || fkey_vu.is_none()) {
            return Ok(None);
        }

        let [x, y, z] = self.edge_point(u, v, t);
        let w = self.add_vertex_at(x, y, z);

        if let Some(fkey) = fkey_uv {
            let cycle = splice_after(self.face_vertices(fkey).unwrap(), u, w);
            self.replace_face_cycle(fkey, &cycle)?;
        }
        if let Some(fkey) = fkey_vu {
            let cycle = splice_after(self.face_vertices(fkey).unwrap(), v, w);
            self.replace_face_cycle(fkey, &cycle)?;
        }
        if fkey_uv.is_none() && fkey_vu.is_none() {
            // Isolated sentinel pair: rewire it through `w` by hand.
            self.set_halfedge(u, w, None);
            self.set_halfedge(w, u, None);
            self.set_halfedge(w, v, None);
            self.set_halfedge(v, w, None);
        }
        // Whatever remains of the original pair is sentinel on both sides.
        self.prune_edge(u, v);
        self.debug_assert_invariants();
        Ok(Some(w))
    }

    /// Split a face along the chord `u` - `v`.
    ///
    /// The boundary cycle is partitioned into the inclusive run from `u` to
    /// `v` and the inclusive run from `v` to `u`; the original face is
    /// removed and the two runs become new faces sharing the chord.
    ///
    /// Returns the new face keys as (`u -> v` branch, `v -> u` branch).
    ///
    /// # Errors
    /// - [`MeshHalfedgeError::UnknownFace`] if `fkey` is absent.
    /// - [`MeshHalfedgeError::SplitVertexNotOnFace`] if `u` or `v` is not on
    ///   the cycle.
    /// - [`MeshHalfedgeError::AdjacentSplitVertices`] if `u` and `v` are
    ///   cyclically adjacent (the second face would be degenerate).
    pub fn split_face(
        &mut self,
        fkey: FaceKey,
        u: VertexKey,
        v: VertexKey,
    ) -> Result<(FaceKey, FaceKey), MeshHalfedgeError> {
        let cycle = self
            .face_vertices(fkey)
            .ok_or(MeshHalfedgeError::UnknownFace(fkey))?
            .to_vec();
        let i = cycle
            .iter()
            .position(|&k| k == u)
            .ok_or(MeshHalfedgeError::SplitVertexNotOnFace(u, fkey))?;
        let j = cycle
            .iter()
            .position(|&k| k == v)
            .ok_or(MeshHalfedgeError::SplitVertexNotOnFace(v, fkey))?;
        let n = cycle.len();
        if u == v || (i + 1) % n == j || (j + 1) % n == i {
            return Err(MeshHalfedgeError::AdjacentSplitVertices(u, v, fkey));
        }

        let first = cyclic_run(&cycle, i, j);
        let second = cyclic_run(&cycle, j, i);
        self.delete_face(fkey)?;
        let f1 = self.add_face(&first)?;
        let f2 = self.add_face(&second)?;
        self.debug_assert_invariants();
        Ok((f1, f2))
    }

    /// Triangle-restricted edge split: each real incident triangle is
    /// replaced by two triangles fanning out of the new vertex.
    ///
    /// Same parameter and boundary policy as
    /// [`split_edge`](Self::split_edge).
    ///
    /// # Errors
    /// Everything `split_edge` raises, plus
    /// [`MeshHalfedgeError::InvalidGeometry`] when an incident face is not a
    /// triangle.
    pub fn trimesh_split_edge(
        &mut self,
        u: VertexKey,
        v: VertexKey,
        t: f64,
        allow_boundary: bool,
    ) -> Result<Option<VertexKey>, MeshHalfedgeError> {
        if !(t > 0.0 && t < 1.0) {
            return Err(MeshHalfedgeError::ParameterOutOfRange(t));
        }
        let fkey_uv = self
            .halfedge_face(u, v)
            .ok_or(MeshHalfedgeError::UnknownHalfedge(u, v))?;
        let fkey_vu = self
            .halfedge_face(v, u)
            .ok_or(MeshHalfedgeError::UnknownHalfedge(v, u))?;
        if !allow_boundary && (fkey_uv.is_none() || fkey_vu.is_none()) {
            return Ok(None);
        }
        let o_uv = match fkey_uv {
            Some(fkey) => Some(self.opposite_vertex(fkey, u, v)?),
            None => None,
        };
        let o_vu = match fkey_vu {
            Some(fkey) => Some(self.opposite_vertex(fkey, v, u)?),
            None => None,
        };

        if let Some(fkey) = fkey_uv {
            self.delete_face(fkey)?;
        }
        if let Some(fkey) = fkey_vu {
            self.delete_face(fkey)?;
        }
        let [x, y, z] = self.edge_point(u, v, t);
        let w = self.add_vertex_at(x, y, z);
        if let Some(o) = o_uv {
            self.add_face(&[u, w, o])?;
            self.add_face(&[w, v, o])?;
        }
        if let Some(o) = o_vu {
            self.add_face(&[v, w, o])?;
            self.add_face(&[w, u, o])?;
        }
        if o_uv.is_none() && o_vu.is_none() {
            self.set_halfedge(u, w, None);
            self.set_halfedge(w, u, None);
            self.set_halfedge(w, v, None);
            self.set_halfedge(v, w, None);
        }
        self.prune_edge(u, v);
        self.debug_assert_invariants();
        Ok(Some(w))
    }

    /// Flip the edge `u` - `v` shared by two triangles onto the other
    /// diagonal of their union quad.
    ///
    /// Returns the two new faces.
    ///
    /// # Errors
    /// - [`MeshHalfedgeError::UnknownHalfedge`] if the edge is absent.
    /// - [`MeshHalfedgeError::BoundaryEdge`] if either side is open.
    /// - [`MeshHalfedgeError::InvalidGeometry`] when an incident face is not
    ///   a triangle.
    pub fn trimesh_swap_edge(
        &mut self,
        u: VertexKey,
        v: VertexKey,
    ) -> Result<(FaceKey, FaceKey), MeshHalfedgeError> {
        let fkey_uv = self
            .halfedge_face(u, v)
            .ok_or(MeshHalfedgeError::UnknownHalfedge(u, v))?
            .ok_or(MeshHalfedgeError::BoundaryEdge(u, v))?;
        let fkey_vu = self
            .halfedge_face(v, u)
            .ok_or(MeshHalfedgeError::UnknownHalfedge(v, u))?
            .ok_or(MeshHalfedgeError::BoundaryEdge(u, v))?;
        let o1 = self.opposite_vertex(fkey_uv, u, v)?;
        let o2 = self.opposite_vertex(fkey_vu, v, u)?;

        self.delete_face(fkey_uv)?;
        self.delete_face(fkey_vu)?;
        let g1 = self.add_face(&[o1, u, o2])?;
        let g2 = self.add_face(&[o2, v, o1])?;
        self.prune_edge(u, v);
        self.debug_assert_invariants();
        Ok((g1, g2))
    }

    /// The third vertex of triangle `fkey` opposite the edge `a -> b`.
    fn opposite_vertex(
        &self,
        fkey: FaceKey,
        a: VertexKey,
        b: VertexKey,
    ) -> Result<VertexKey, MeshHalfedgeError> {
        let cycle = self
            .face_vertices(fkey)
            .ok_or(MeshHalfedgeError::UnknownFace(fkey))?;
        if cycle.len() != 3 {
            return Err(MeshHalfedgeError::InvalidGeometry(format!(
                "face `{fkey}` has {} vertices, expected a triangle",
                cycle.len()
            )));
        }
        cycle
            .iter()
            .copied()
            .find(|&k| k != a && k != b)
            .ok_or(MeshHalfedgeError::InvalidGeometry(format!(
                "face `{fkey}` has no vertex opposite `{a}` -> `{b}`"
            )))
    }
}

/// The cycle with `w` inserted right after `anchor`.
fn splice_after(cycle: &[VertexKey], anchor: VertexKey, w: VertexKey) -> Vec<VertexKey> {
    let mut out = Vec::with_capacity(cycle.len() + 1);
    for &k in cycle {
        out.push(k);
        if k == anchor {
            out.push(w);
        }
    }
    out
}

/// Inclusive cyclic run of `cycle` from index `from` to index `to`.
fn cyclic_run(cycle: &[VertexKey], from: usize, to: usize) -> Vec<VertexKey> {
    let n = cycle.len();
    let mut out = Vec::new();
    let mut k = from;
    loop {
        out.push(cycle[k]);
        if k == to {
            break;
        }
        k = (k + 1) % n;
    }
    out
}

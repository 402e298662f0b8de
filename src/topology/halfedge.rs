//! `HalfedgeMesh`: the core topological datastructure.
//!
//! A half-edge mesh stores, for every ordered vertex pair `(u, v)` that forms
//! part of some face boundary, the face lying to the left of the directed
//! edge `u -> v`, or `None` when that side is open (the boundary sentinel).
//! The adjacency table is the single source of truth: vertex neighborhoods,
//! face incidence and boundary detection are all answered from it, and every
//! mutating operator must leave it consistent with the vertex and face
//! tables.
//!
//! Storage follows the row-per-vertex shape: each vertex owns a vector of
//! `(target, Option<FaceKey>)` entries in insertion order. Rows are small
//! (vertex degree), so linear scans within a row are fine. Separate order
//! vectors preserve element insertion order for deterministic iteration.
//!
//! Mutating operators validate before touching anything, so a returned error
//! means the mesh is exactly as it was before the call.

use crate::data::attributes::{AttrValue, AttributeStore};
use crate::debug_assert_ok;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshHalfedgeError;
use crate::topology::key::{FaceKey, KeyGenerator, VertexKey};
use std::collections::{HashMap, HashSet};

/// Undirected edge identity: the vertex pair in normalized (low, high) order.
pub type EdgeKey = (VertexKey, VertexKey);

/// Normalize an unordered vertex pair into an [`EdgeKey`].
#[inline]
pub fn edge_key(u: VertexKey, v: VertexKey) -> EdgeKey {
    if u <= v { (u, v) } else { (v, u) }
}

/// Half-edge mesh with per-element attribute storage.
///
/// # Invariants
///
/// - For every face with cycle `[v0..vn-1]`, every cyclic pair
///   `(vi, vi+1)` maps to that face in the adjacency table, and the reverse
///   pair exists (owned by another face or the boundary sentinel).
/// - Every half-edge target is a live vertex; every non-sentinel half-edge
///   references a live face that contains it.
/// - Vertex and face keys are unique and never reused after deletion.
///
/// These are checked after every mutation in debug builds (and under the
/// `check-invariants` feature) and can be verified manually via
/// [`validate_invariants`](DebugInvariants::validate_invariants).
#[derive(Clone, Debug)]
pub struct HalfedgeMesh {
    /// Adjacency rows: vertex -> [(target, face-or-boundary)].
    halfedges: HashMap<VertexKey, Vec<(VertexKey, Option<FaceKey>)>>,
    /// Face boundary cycles.
    faces: HashMap<FaceKey, Vec<VertexKey>>,
    /// Vertex insertion order, for deterministic iteration.
    vertex_order: Vec<VertexKey>,
    /// Face insertion order, for deterministic iteration.
    face_order: Vec<FaceKey>,
    vertex_attrs: AttributeStore<VertexKey>,
    face_attrs: AttributeStore<FaceKey>,
    edge_attrs: AttributeStore<EdgeKey>,
    keys: KeyGenerator,
}

impl Default for HalfedgeMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HalfedgeMesh {
    /// Empty mesh whose vertices default to coordinates `(0, 0, 0)`.
    pub fn new() -> Self {
        Self {
            halfedges: HashMap::new(),
            faces: HashMap::new(),
            vertex_order: Vec::new(),
            face_order: Vec::new(),
            vertex_attrs: AttributeStore::with_defaults([
                ("x", AttrValue::Number(0.0)),
                ("y", AttrValue::Number(0.0)),
                ("z", AttrValue::Number(0.0)),
            ]),
            face_attrs: AttributeStore::new(),
            edge_attrs: AttributeStore::new(),
            keys: KeyGenerator::new(),
        }
    }

    /// Empty mesh with a custom vertex-attribute defaults snapshot.
    ///
    /// The snapshot should normally include `x`, `y`, `z`; it is fixed for
    /// the life of the mesh.
    pub fn with_default_vertex_attributes<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (S, AttrValue)>,
        S: Into<String>,
    {
        Self {
            vertex_attrs: AttributeStore::with_defaults(defaults),
            ..Self::new()
        }
    }

    // ------------------------------------------------------------------
    // Row plumbing
    // ------------------------------------------------------------------

    /// Upsert the directed entry `u -> v`, preserving row insertion order.
    pub(crate) fn set_halfedge(&mut self, u: VertexKey, v: VertexKey, face: Option<FaceKey>) {
        let row = self.halfedges.entry(u).or_default();
        if let Some(slot) = row.iter_mut().find(|(dst, _)| *dst == v) {
            slot.1 = face;
        } else {
            row.push((v, face));
        }
    }

    /// Remove the directed entry `u -> v`, returning its face slot.
    pub(crate) fn remove_halfedge(&mut self, u: VertexKey, v: VertexKey) -> Option<Option<FaceKey>> {
        let row = self.halfedges.get_mut(&u)?;
        let pos = row.iter().position(|(dst, _)| *dst == v)?;
        Some(row.remove(pos).1)
    }

    // ------------------------------------------------------------------
    // Existence and lookup
    // ------------------------------------------------------------------

    /// True iff `key` is a live vertex.
    #[inline]
    pub fn has_vertex(&self, key: VertexKey) -> bool {
        self.halfedges.contains_key(&key)
    }

    /// True iff `fkey` is a live face.
    #[inline]
    pub fn has_face(&self, fkey: FaceKey) -> bool {
        self.faces.contains_key(&fkey)
    }

    /// True iff the directed half-edge `u -> v` exists.
    #[inline]
    pub fn has_halfedge(&self, u: VertexKey, v: VertexKey) -> bool {
        self.halfedge_face(u, v).is_some()
    }

    /// The face slot of the directed half-edge `u -> v`.
    ///
    /// Returns `None` when no such half-edge exists, `Some(None)` when it
    /// exists but borders the mesh boundary, and `Some(Some(fkey))` when a
    /// face owns it.
    pub fn halfedge_face(&self, u: VertexKey, v: VertexKey) -> Option<Option<FaceKey>> {
        self.halfedges
            .get(&u)?
            .iter()
            .find(|(dst, _)| *dst == v)
            .map(|&(_, face)| face)
    }

    /// True iff `(u, v)` exists and either direction borders the boundary.
    pub fn is_boundary_edge(&self, u: VertexKey, v: VertexKey) -> bool {
        self.halfedge_face(u, v) == Some(None) || self.halfedge_face(v, u) == Some(None)
    }

    /// Number of live vertices.
    #[inline]
    pub fn number_of_vertices(&self) -> usize {
        self.vertex_order.len()
    }

    /// Number of live faces.
    #[inline]
    pub fn number_of_faces(&self) -> usize {
        self.face_order.len()
    }

    /// Number of undirected edges.
    pub fn number_of_edges(&self) -> usize {
        self.edges().count()
    }

    // ------------------------------------------------------------------
    // Vertices
    // ------------------------------------------------------------------

    /// Add a vertex with a mesh-assigned key.
    ///
    /// # Example
    /// ```rust
    /// use mesh_halfedge::topology::halfedge::HalfedgeMesh;
    /// let mut mesh = HalfedgeMesh::new();
    /// let a = mesh.add_vertex();
    /// let b = mesh.add_vertex();
    /// assert_ne!(a, b);
    /// ```
    pub fn add_vertex(&mut self) -> VertexKey {
        let key = self.keys.next_vertex();
        self.halfedges.insert(key, Vec::new());
        self.vertex_order.push(key);
        key
    }

    /// Add a vertex at explicit coordinates.
    pub fn add_vertex_at(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        let key = self.add_vertex();
        self.vertex_attrs.set(key, "x", x);
        self.vertex_attrs.set(key, "y", y);
        self.vertex_attrs.set(key, "z", z);
        key
    }

    /// Add a vertex under an explicit key.
    ///
    /// The key generator is advanced past `key`, so later mesh-assigned keys
    /// never collide with it.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::DuplicateVertexKey`] if `key` is already present.
    pub fn add_vertex_with_key(&mut self, key: VertexKey) -> Result<VertexKey, MeshHalfedgeError> {
        if self.has_vertex(key) {
            return Err(MeshHalfedgeError::DuplicateVertexKey(key));
        }
        self.keys.observe_vertex(key);
        self.halfedges.insert(key, Vec::new());
        self.vertex_order.push(key);
        Ok(key)
    }

    /// Delete a vertex, cascading over everything that references it.
    ///
    /// Incident faces are removed first (scanning the vertex's adjacency
    /// row), then half-edge pairs that have become boundary-on-both-sides
    /// among the former neighbors are pruned, and finally the vertex's own
    /// row and attribute bag are dropped.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownVertex`] if `key` is not in the mesh.
    pub fn delete_vertex(&mut self, key: VertexKey) -> Result<(), MeshHalfedgeError> {
        if !self.has_vertex(key) {
            return Err(MeshHalfedgeError::UnknownVertex(key));
        }
        // Materialize before mutating; the row shrinks as faces are deleted.
        let incident: Vec<FaceKey> = self.halfedges[&key]
            .iter()
            .filter_map(|&(_, face)| face)
            .collect();
        for fkey in incident {
            if self.has_face(fkey) {
                self.delete_face(fkey)?;
            }
        }
        let neighbors: Vec<VertexKey> = self.halfedges[&key].iter().map(|&(v, _)| v).collect();
        for &nbr in &neighbors {
            let candidates: Vec<VertexKey> = self
                .halfedges
                .get(&nbr)
                .map(|row| row.iter().map(|&(v, _)| v).collect())
                .unwrap_or_default();
            for n in candidates {
                if self.halfedge_face(nbr, n) == Some(None)
                    && self.halfedge_face(n, nbr) == Some(None)
                {
                    self.remove_halfedge(nbr, n);
                    self.remove_halfedge(n, nbr);
                    self.edge_attrs.remove_key(edge_key(nbr, n));
                }
            }
        }
        // Anything still in the row points at the deleted vertex's leftovers.
        let remaining: Vec<VertexKey> = self.halfedges[&key].iter().map(|&(v, _)| v).collect();
        for n in remaining {
            self.remove_halfedge(key, n);
            self.remove_halfedge(n, key);
            self.edge_attrs.remove_key(edge_key(key, n));
        }
        self.halfedges.remove(&key);
        self.vertex_order.retain(|&v| v != key);
        self.vertex_attrs.remove_key(key);
        self.debug_assert_invariants();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Faces
    // ------------------------------------------------------------------

    /// Add a face from an ordered boundary cycle of existing vertices.
    ///
    /// Every consecutive pair `(a, b)` of the cycle (wrapping) becomes a
    /// half-edge owned by the new face; reverse pairs are created as
    /// boundary sentinels when absent and are never overwritten.
    ///
    /// # Errors
    /// - [`MeshHalfedgeError::FaceTooSmall`] for fewer than 3 vertices.
    /// - [`MeshHalfedgeError::RepeatedVertex`] if the cycle repeats a vertex.
    /// - [`MeshHalfedgeError::UnknownVertex`] naming the first missing key.
    /// - [`MeshHalfedgeError::NonManifoldEdge`] if a forward half-edge is
    ///   already owned by another face.
    ///
    /// # Example
    /// ```rust
    /// use mesh_halfedge::topology::halfedge::HalfedgeMesh;
    /// let mut mesh = HalfedgeMesh::new();
    /// let a = mesh.add_vertex_at(0.0, 0.0, 0.0);
    /// let b = mesh.add_vertex_at(1.0, 0.0, 0.0);
    /// let c = mesh.add_vertex_at(0.0, 1.0, 0.0);
    /// let f = mesh.add_face(&[a, b, c]).unwrap();
    /// assert_eq!(mesh.face_vertices(f), Some(&[a, b, c][..]));
    /// ```
    pub fn add_face(&mut self, vertices: &[VertexKey]) -> Result<FaceKey, MeshHalfedgeError> {
        self.validate_face_cycle(vertices)?;
        let fkey = self.keys.next_face();
        self.install_face(fkey, vertices);
        self.debug_assert_invariants();
        Ok(fkey)
    }

    /// Add a face under an explicit key (see [`add_face`](Self::add_face)).
    ///
    /// # Errors
    /// [`MeshHalfedgeError::DuplicateFaceKey`] if `fkey` is already present,
    /// plus everything `add_face` can raise.
    pub fn add_face_with_key(
        &mut self,
        fkey: FaceKey,
        vertices: &[VertexKey],
    ) -> Result<FaceKey, MeshHalfedgeError> {
        if self.has_face(fkey) {
            return Err(MeshHalfedgeError::DuplicateFaceKey(fkey));
        }
        self.validate_face_cycle(vertices)?;
        self.keys.observe_face(fkey);
        self.install_face(fkey, vertices);
        self.debug_assert_invariants();
        Ok(fkey)
    }

    /// All validation for a prospective face cycle; no mutation.
    fn validate_face_cycle(&self, vertices: &[VertexKey]) -> Result<(), MeshHalfedgeError> {
        if vertices.len() < 3 {
            return Err(MeshHalfedgeError::FaceTooSmall(vertices.len()));
        }
        let mut seen = HashSet::with_capacity(vertices.len());
        for &v in vertices {
            if !self.has_vertex(v) {
                return Err(MeshHalfedgeError::UnknownVertex(v));
            }
            if !seen.insert(v) {
                return Err(MeshHalfedgeError::RepeatedVertex(v));
            }
        }
        for (&a, &b) in cyclic_pairs(vertices) {
            if let Some(Some(owner)) = self.halfedge_face(a, b) {
                return Err(MeshHalfedgeError::NonManifoldEdge(a, b, owner));
            }
        }
        Ok(())
    }

    /// Write a validated face into the tables.
    fn install_face(&mut self, fkey: FaceKey, vertices: &[VertexKey]) {
        self.faces.insert(fkey, vertices.to_vec());
        self.face_order.push(fkey);
        for (&a, &b) in cyclic_pairs(vertices) {
            self.set_halfedge(a, b, Some(fkey));
            if !self.has_halfedge(b, a) {
                self.set_halfedge(b, a, None);
            }
        }
    }

    /// Delete a face, resetting its boundary half-edges to the sentinel.
    ///
    /// The adjacency entries themselves are kept: the reverse direction may
    /// still be owned by another face, and a sentinel pair is what marks a
    /// boundary.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownFace`] if `fkey` is not in the mesh.
    pub fn delete_face(&mut self, fkey: FaceKey) -> Result<(), MeshHalfedgeError> {
        let cycle = self
            .faces
            .get(&fkey)
            .cloned()
            .ok_or(MeshHalfedgeError::UnknownFace(fkey))?;
        for (&a, &b) in cyclic_pairs(&cycle) {
            self.set_halfedge(a, b, None);
        }
        self.faces.remove(&fkey);
        self.face_order.retain(|&f| f != fkey);
        self.face_attrs.remove_key(fkey);
        self.debug_assert_invariants();
        Ok(())
    }

    /// The boundary cycle of a face, in stored order.
    pub fn face_vertices(&self, fkey: FaceKey) -> Option<&[VertexKey]> {
        self.faces.get(&fkey).map(|cycle| cycle.as_slice())
    }

    /// Replace a face's boundary cycle in place, rewiring its half-edges.
    ///
    /// Used by the splitting operators; the new cycle is validated like a
    /// fresh face except that edges owned by `fkey` itself are not
    /// non-manifold conflicts.
    pub(crate) fn replace_face_cycle(
        &mut self,
        fkey: FaceKey,
        vertices: &[VertexKey],
    ) -> Result<(), MeshHalfedgeError> {
        if !self.has_face(fkey) {
            return Err(MeshHalfedgeError::UnknownFace(fkey));
        }
        if vertices.len() < 3 {
            return Err(MeshHalfedgeError::FaceTooSmall(vertices.len()));
        }
        for (&a, &b) in cyclic_pairs(vertices) {
            if let Some(Some(owner)) = self.halfedge_face(a, b) {
                if owner != fkey {
                    return Err(MeshHalfedgeError::NonManifoldEdge(a, b, owner));
                }
            }
        }
        let old = self.faces[&fkey].clone();
        for (&a, &b) in cyclic_pairs(&old) {
            self.set_halfedge(a, b, None);
        }
        self.faces.insert(fkey, vertices.to_vec());
        for (&a, &b) in cyclic_pairs(vertices) {
            self.set_halfedge(a, b, Some(fkey));
            if !self.has_halfedge(b, a) {
                self.set_halfedge(b, a, None);
            }
        }
        self.debug_assert_invariants();
        Ok(())
    }

    /// Remove the adjacency pair of an undirected edge outright.
    ///
    /// Only legal for sentinel/sentinel pairs; the splitting operators use
    /// it to prune an edge both of whose sides they have just re-triangulated.
    pub(crate) fn prune_edge(&mut self, u: VertexKey, v: VertexKey) {
        debug_assert_eq!(self.halfedge_face(u, v), Some(None));
        debug_assert_eq!(self.halfedge_face(v, u), Some(None));
        self.remove_halfedge(u, v);
        self.remove_halfedge(v, u);
        self.edge_attrs.remove_key(edge_key(u, v));
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Vertex keys in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertex_order.iter().copied()
    }

    /// Vertices with their resolved attribute bags.
    pub fn vertices_with_data(
        &self,
    ) -> impl Iterator<Item = (VertexKey, Vec<(String, AttrValue)>)> + '_ {
        self.vertices().map(|key| (key, self.vertex_attributes(key)))
    }

    /// Face keys in insertion order.
    pub fn faces(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.face_order.iter().copied()
    }

    /// Faces with their resolved attribute bags.
    pub fn faces_with_data(
        &self,
    ) -> impl Iterator<Item = (FaceKey, Vec<(String, AttrValue)>)> + '_ {
        self.faces().map(|key| (key, self.face_attributes(key)))
    }

    /// Undirected edges in discovery order, each pair yielded once.
    ///
    /// Re-iterating re-scans the current adjacency state; the iterator is
    /// not a snapshot, so materialize the edge list before any loop body
    /// that mutates the mesh.
    pub fn edges(&self) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
        let mut seen: HashSet<EdgeKey> = HashSet::new();
        self.vertex_order
            .iter()
            .flat_map(|&u| {
                self.halfedges
                    .get(&u)
                    .into_iter()
                    .flatten()
                    .map(move |&(v, _)| (u, v))
            })
            .filter(move |&(u, v)| seen.insert(edge_key(u, v)))
    }

    /// Edges with their resolved attribute bags.
    pub fn edges_with_data(
        &self,
    ) -> impl Iterator<Item = ((VertexKey, VertexKey), Vec<(String, AttrValue)>)> + '_ {
        self.edges().map(|(u, v)| {
            let names = self.edge_attrs.names_for(edge_key(u, v));
            let bag = names
                .into_iter()
                .filter_map(|name| {
                    self.edge_attrs
                        .get(edge_key(u, v), &name)
                        .map(|value| (name, value))
                })
                .collect();
            ((u, v), bag)
        })
    }

    /// Raw adjacency row of a vertex: `(target, face-or-boundary)` entries
    /// in insertion order.
    pub fn vertex_halfedges(
        &self,
        key: VertexKey,
    ) -> Option<&[(VertexKey, Option<FaceKey>)]> {
        self.halfedges.get(&key).map(|row| row.as_slice())
    }

    // ------------------------------------------------------------------
    // Attribute protocol
    // ------------------------------------------------------------------

    /// Resolve a vertex attribute (override, then default, then `None`).
    pub fn vertex_attribute(&self, key: VertexKey, name: &str) -> Option<AttrValue> {
        if !self.has_vertex(key) {
            return None;
        }
        self.vertex_attrs.get(key, name)
    }

    /// Set a vertex attribute override.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownVertex`] if `key` is not in the mesh.
    pub fn set_vertex_attribute(
        &mut self,
        key: VertexKey,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), MeshHalfedgeError> {
        if !self.has_vertex(key) {
            return Err(MeshHalfedgeError::UnknownVertex(key));
        }
        self.vertex_attrs.set(key, name, value);
        Ok(())
    }

    /// Every attribute visible on a vertex, resolved.
    pub fn vertex_attributes(&self, key: VertexKey) -> Vec<(String, AttrValue)> {
        self.vertex_attrs
            .names_for(key)
            .into_iter()
            .filter_map(|name| self.vertex_attrs.get(key, &name).map(|value| (name, value)))
            .collect()
    }

    /// Resolve a face attribute.
    pub fn face_attribute(&self, fkey: FaceKey, name: &str) -> Option<AttrValue> {
        if !self.has_face(fkey) {
            return None;
        }
        self.face_attrs.get(fkey, name)
    }

    /// Set a face attribute override.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownFace`] if `fkey` is not in the mesh.
    pub fn set_face_attribute(
        &mut self,
        fkey: FaceKey,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), MeshHalfedgeError> {
        if !self.has_face(fkey) {
            return Err(MeshHalfedgeError::UnknownFace(fkey));
        }
        self.face_attrs.set(fkey, name, value);
        Ok(())
    }

    /// Every attribute visible on a face, resolved.
    pub fn face_attributes(&self, fkey: FaceKey) -> Vec<(String, AttrValue)> {
        self.face_attrs
            .names_for(fkey)
            .into_iter()
            .filter_map(|name| self.face_attrs.get(fkey, &name).map(|value| (name, value)))
            .collect()
    }

    /// Resolve an edge attribute (the pair is normalized internally).
    pub fn edge_attribute(&self, u: VertexKey, v: VertexKey, name: &str) -> Option<AttrValue> {
        if !self.has_halfedge(u, v) && !self.has_halfedge(v, u) {
            return None;
        }
        self.edge_attrs.get(edge_key(u, v), name)
    }

    /// Set an edge attribute override.
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownHalfedge`] if neither direction of the
    /// edge exists.
    pub fn set_edge_attribute(
        &mut self,
        u: VertexKey,
        v: VertexKey,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), MeshHalfedgeError> {
        if !self.has_halfedge(u, v) && !self.has_halfedge(v, u) {
            return Err(MeshHalfedgeError::UnknownHalfedge(u, v));
        }
        self.edge_attrs.set(edge_key(u, v), name, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Interchange
    // ------------------------------------------------------------------

    /// Build a mesh from the canonical interchange format: a coordinate list
    /// and faces as vertex-index lists.
    ///
    /// Vertex `i` of the input becomes key `i`; the key counters restart for
    /// the new mesh (the one lifecycle point where they reset).
    ///
    /// # Errors
    /// [`MeshHalfedgeError::UnknownVertex`] for a face index out of range,
    /// plus everything [`add_face`](Self::add_face) can raise.
    pub fn from_vertices_and_faces(
        vertices: &[[f64; 3]],
        faces: &[Vec<usize>],
    ) -> Result<Self, MeshHalfedgeError> {
        let mut mesh = Self::new();
        let keys: Vec<VertexKey> = vertices
            .iter()
            .map(|&[x, y, z]| mesh.add_vertex_at(x, y, z))
            .collect();
        for cycle in faces {
            let face_keys: Vec<VertexKey> = cycle
                .iter()
                .map(|&i| {
                    keys.get(i)
                        .copied()
                        .ok_or(MeshHalfedgeError::UnknownVertex(VertexKey::new(i as u64)))
                })
                .collect::<Result<_, _>>()?;
            mesh.add_face(&face_keys)?;
        }
        Ok(mesh)
    }

    /// Export the mesh as a coordinate list plus faces as index lists, the
    /// inverse of [`from_vertices_and_faces`](Self::from_vertices_and_faces).
    ///
    /// Vertices appear in iteration order; face indices refer to positions
    /// in the returned coordinate list.
    pub fn to_vertices_and_faces(&self) -> (Vec<[f64; 3]>, Vec<Vec<usize>>) {
        let mut index_of: HashMap<VertexKey, usize> = HashMap::new();
        let mut coords = Vec::with_capacity(self.number_of_vertices());
        for (i, key) in self.vertices().enumerate() {
            index_of.insert(key, i);
            coords.push(self.vertex_coordinates(key));
        }
        let faces = self
            .faces()
            .map(|fkey| {
                self.faces[&fkey]
                    .iter()
                    .map(|v| index_of[v])
                    .collect::<Vec<usize>>()
            })
            .collect();
        (coords, faces)
    }
}

/// Iterate the cyclic consecutive pairs of a slice: `(v0,v1) .. (vn-1,v0)`.
pub(crate) fn cyclic_pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    let n = items.len();
    (0..n).map(move |i| (&items[i], &items[(i + 1) % n]))
}

impl DebugInvariants for HalfedgeMesh {
    fn debug_assert_invariants(&self) {
        debug_assert_ok!(self.validate_invariants(), "HalfedgeMesh invalid");
    }

    fn validate_invariants(&self) -> Result<(), MeshHalfedgeError> {
        // 1) order vectors agree with the tables, both directions
        let vset: HashSet<_> = self.vertex_order.iter().copied().collect();
        if vset.len() != self.vertex_order.len() {
            let mut seen = HashSet::new();
            let dup = self
                .vertex_order
                .iter()
                .copied()
                .find(|v| !seen.insert(*v))
                .unwrap();
            return Err(MeshHalfedgeError::DuplicateVertexKey(dup));
        }
        if let Some(&v) = self.vertex_order.iter().find(|&&v| !self.halfedges.contains_key(&v)) {
            return Err(MeshHalfedgeError::UnknownVertex(v));
        }
        if let Some(&v) = self.halfedges.keys().find(|&&v| !vset.contains(&v)) {
            return Err(MeshHalfedgeError::DuplicateVertexKey(v));
        }
        let fset: HashSet<_> = self.face_order.iter().copied().collect();
        if fset.len() != self.face_order.len() || fset.len() != self.faces.len() {
            let dup = self
                .faces
                .keys()
                .copied()
                .find(|f| !fset.contains(f))
                .or_else(|| {
                    let mut seen = HashSet::new();
                    self.face_order.iter().copied().find(|f| !seen.insert(*f))
                })
                .unwrap_or(FaceKey::new(0));
            return Err(MeshHalfedgeError::DuplicateFaceKey(dup));
        }
        if let Some(&f) = self.face_order.iter().find(|&&f| !self.faces.contains_key(&f)) {
            return Err(MeshHalfedgeError::UnknownFace(f));
        }

        // 2) every face cycle is well formed and owns its forward half-edges
        for (&fkey, cycle) in &self.faces {
            if cycle.len() < 3 {
                return Err(MeshHalfedgeError::FaceTooSmall(cycle.len()));
            }
            let unique: HashSet<_> = cycle.iter().copied().collect();
            if unique.len() != cycle.len() {
                let mut seen = HashSet::new();
                let dup = cycle.iter().copied().find(|v| !seen.insert(*v)).unwrap();
                return Err(MeshHalfedgeError::RepeatedVertex(dup));
            }
            for (&a, &b) in cyclic_pairs(cycle) {
                match self.halfedge_face(a, b) {
                    Some(Some(owner)) if owner == fkey => {}
                    Some(Some(owner)) => {
                        return Err(MeshHalfedgeError::NonManifoldEdge(a, b, owner));
                    }
                    _ => return Err(MeshHalfedgeError::UnknownHalfedge(a, b)),
                }
                if self.halfedge_face(b, a).is_none() {
                    return Err(MeshHalfedgeError::UnknownHalfedge(b, a));
                }
            }
        }

        // 3) no half-edge dangles: live targets, live owning faces that
        //    actually contain the half-edge
        for (&u, row) in &self.halfedges {
            for &(v, face) in row {
                if !self.halfedges.contains_key(&v) {
                    return Err(MeshHalfedgeError::UnknownVertex(v));
                }
                if let Some(fkey) = face {
                    let ok = self.faces.get(&fkey).is_some_and(|cycle| {
                        cyclic_pairs(cycle).any(|(&a, &b)| a == u && b == v)
                    });
                    if !ok {
                        return Err(MeshHalfedgeError::DanglingHalfedge(u, v, fkey));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (HalfedgeMesh, [VertexKey; 3], FaceKey) {
        let mut mesh = HalfedgeMesh::new();
        let a = mesh.add_vertex_at(0.0, 0.0, 0.0);
        let b = mesh.add_vertex_at(1.0, 0.0, 0.0);
        let c = mesh.add_vertex_at(0.0, 1.0, 0.0);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        (mesh, [a, b, c], f)
    }

    #[test]
    fn add_face_wires_both_directions() {
        let (mesh, [a, b, c], f) = triangle();
        assert_eq!(mesh.halfedge_face(a, b), Some(Some(f)));
        assert_eq!(mesh.halfedge_face(b, c), Some(Some(f)));
        assert_eq!(mesh.halfedge_face(c, a), Some(Some(f)));
        // Reverse side is open boundary.
        assert_eq!(mesh.halfedge_face(b, a), Some(None));
        assert!(mesh.is_boundary_edge(a, b));
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn add_face_rejects_bad_cycles() {
        let mut mesh = HalfedgeMesh::new();
        let a = mesh.add_vertex();
        let b = mesh.add_vertex();
        let c = mesh.add_vertex();
        assert_eq!(
            mesh.add_face(&[a, b]),
            Err(MeshHalfedgeError::FaceTooSmall(2))
        );
        assert_eq!(
            mesh.add_face(&[a, b, a]),
            Err(MeshHalfedgeError::RepeatedVertex(a))
        );
        let ghost = VertexKey::new(99);
        assert_eq!(
            mesh.add_face(&[a, b, ghost]),
            Err(MeshHalfedgeError::UnknownVertex(ghost))
        );
        // Failed calls must not have touched the mesh.
        assert_eq!(mesh.number_of_faces(), 0);
        assert_eq!(mesh.number_of_edges(), 0);
        mesh.add_face(&[a, b, c]).unwrap();
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn second_face_on_same_directed_edge_is_non_manifold() {
        let (mut mesh, [a, b, c], f) = triangle();
        let d = mesh.add_vertex_at(1.0, 1.0, 0.0);
        // Same direction a->b again: rejected.
        assert_eq!(
            mesh.add_face(&[a, b, d]),
            Err(MeshHalfedgeError::NonManifoldEdge(a, b, f))
        );
        // Opposite direction b->a: fine, fills the boundary.
        let g = mesh.add_face(&[b, a, d]).unwrap();
        assert_eq!(mesh.halfedge_face(b, a), Some(Some(g)));
        assert!(!mesh.is_boundary_edge(a, b));
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn explicit_keys_are_unique_and_advance_the_counter() {
        let mut mesh = HalfedgeMesh::new();
        let v5 = mesh.add_vertex_with_key(VertexKey::new(5)).unwrap();
        assert_eq!(
            mesh.add_vertex_with_key(VertexKey::new(5)),
            Err(MeshHalfedgeError::DuplicateVertexKey(v5))
        );
        // Auto keys continue past the explicit one.
        assert_eq!(mesh.add_vertex(), VertexKey::new(6));
    }

    #[test]
    fn explicit_face_keys_follow_the_same_rules() {
        let (mut mesh, [a, b, _], f) = triangle();
        let d = mesh.add_vertex_at(1.0, 1.0, 0.0);
        assert_eq!(
            mesh.add_face_with_key(f, &[b, a, d]),
            Err(MeshHalfedgeError::DuplicateFaceKey(f))
        );
        let g = mesh.add_face_with_key(FaceKey::new(10), &[b, a, d]).unwrap();
        assert_eq!(g, FaceKey::new(10));
        // Auto keys continue past the explicit one.
        let e = mesh.add_vertex_at(2.0, 0.0, 0.0);
        let h = mesh.add_face(&[b, d, e]).unwrap();
        assert_eq!(h, FaceKey::new(11));
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn deleted_keys_are_not_reused() {
        let mut mesh = HalfedgeMesh::new();
        let a = mesh.add_vertex();
        mesh.delete_vertex(a).unwrap();
        let b = mesh.add_vertex();
        assert_ne!(a, b);
        assert_eq!(b, VertexKey::new(1));
    }

    #[test]
    fn delete_face_resets_halfedges_to_sentinel() {
        let (mut mesh, [a, b, c], f) = triangle();
        mesh.delete_face(f).unwrap();
        assert!(!mesh.has_face(f));
        // Entries survive as sentinel pairs.
        assert_eq!(mesh.halfedge_face(a, b), Some(None));
        assert_eq!(mesh.halfedge_face(b, a), Some(None));
        assert_eq!(mesh.halfedge_face(b, c), Some(None));
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn delete_vertex_cascades_and_prunes() {
        let (mut mesh, [a, b, c], _) = triangle();
        let d = mesh.add_vertex_at(1.0, 1.0, 0.0);
        mesh.add_face(&[b, a, d]).unwrap();
        mesh.delete_vertex(a).unwrap();
        assert!(!mesh.has_vertex(a));
        assert_eq!(mesh.number_of_faces(), 0);
        assert!(!mesh.vertices().any(|v| v == a));
        // No face references the deleted vertex, and the leftover edges
        // among former neighbors were pruned.
        assert_eq!(mesh.number_of_edges(), 0);
        assert!(mesh.has_vertex(b) && mesh.has_vertex(c) && mesh.has_vertex(d));
        mesh.validate_invariants().unwrap();
        assert_eq!(
            mesh.delete_vertex(a),
            Err(MeshHalfedgeError::UnknownVertex(a))
        );
    }

    #[test]
    fn edges_deduplicate_undirected_pairs() {
        let (mesh, [a, b, c], _) = triangle();
        let edges: Vec<_> = mesh.edges().map(|(u, v)| edge_key(u, v)).collect();
        assert_eq!(edges.len(), 3);
        let set: HashSet<_> = edges.into_iter().collect();
        assert_eq!(
            set,
            HashSet::from([edge_key(a, b), edge_key(b, c), edge_key(c, a)])
        );
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut mesh = HalfedgeMesh::new();
        let keys: Vec<_> = (0..5).map(|_| mesh.add_vertex()).collect();
        assert_eq!(mesh.vertices().collect::<Vec<_>>(), keys);
        mesh.delete_vertex(keys[2]).unwrap();
        assert_eq!(
            mesh.vertices().collect::<Vec<_>>(),
            vec![keys[0], keys[1], keys[3], keys[4]]
        );
    }

    #[test]
    fn attribute_protocol_round_trips() {
        let (mut mesh, [a, b, _], f) = triangle();
        mesh.set_vertex_attribute(a, "is_fixed", true).unwrap();
        assert_eq!(
            mesh.vertex_attribute(a, "is_fixed"),
            Some(AttrValue::Bool(true))
        );
        mesh.set_face_attribute(f, "label", "roof").unwrap();
        assert_eq!(
            mesh.face_attribute(f, "label"),
            Some(AttrValue::Text("roof".into()))
        );
        mesh.set_edge_attribute(a, b, "q", 2.5).unwrap();
        // Normalized: both orders resolve.
        assert_eq!(mesh.edge_attribute(b, a, "q"), Some(AttrValue::Number(2.5)));
        assert_eq!(
            mesh.set_vertex_attribute(VertexKey::new(99), "x", 0.0),
            Err(MeshHalfedgeError::UnknownVertex(VertexKey::new(99)))
        );
    }

    #[test]
    fn interchange_round_trip() {
        let vertices = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3]];
        let mesh = HalfedgeMesh::from_vertices_and_faces(&vertices, &faces).unwrap();
        let (v2, f2) = mesh.to_vertices_and_faces();
        assert_eq!(v2, vertices);
        assert_eq!(f2, faces);
        mesh.validate_invariants().unwrap();
    }

    #[test]
    fn interchange_rejects_out_of_range_indices() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let faces = vec![vec![0, 1, 7]];
        assert_eq!(
            HalfedgeMesh::from_vertices_and_faces(&vertices, &faces).unwrap_err(),
            MeshHalfedgeError::UnknownVertex(VertexKey::new(7))
        );
    }
}

//! `VertexKey` and `FaceKey`: strong, zero-cost handles for mesh elements
//!
//! Every element of a [`HalfedgeMesh`](crate::topology::halfedge::HalfedgeMesh)
//! is identified by an opaque key. Vertex and face keys live in separate
//! namespaces, so the two newtypes keep them from being mixed up at compile
//! time. Keys are minted by a per-mesh [`KeyGenerator`] and are never reused
//! after deletion; a key's numeric value is therefore stable across the whole
//! mutation history of its mesh.
//!
//! This module provides:
//! - Transparent `u64` newtypes with the usual map/set/printing traits.
//! - The monotonic generator that owns the next-key counters.

use std::fmt;

/// Identifier of a vertex within one mesh.
///
/// # Memory layout
/// `repr(transparent)`: same ABI and alignment as a bare `u64`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct VertexKey(u64);

/// Identifier of a face within one mesh.
///
/// # Memory layout
/// `repr(transparent)`: same ABI and alignment as a bare `u64`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct FaceKey(u64);

impl VertexKey {
    /// Wraps a raw `u64`. Key 0 is a legal key (auto-generated keys start at 0).
    #[inline]
    pub const fn new(raw: u64) -> Self {
        VertexKey(raw)
    }

    /// Returns the inner `u64` value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl FaceKey {
    /// Wraps a raw `u64`. Key 0 is a legal key (auto-generated keys start at 0).
    #[inline]
    pub const fn new(raw: u64) -> Self {
        FaceKey(raw)
    }

    /// Returns the inner `u64` value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VertexKey").field(&self.0).finish()
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FaceKey").field(&self.0).finish()
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VertexKey {
    fn from(raw: u64) -> Self {
        VertexKey(raw)
    }
}

impl From<u64> for FaceKey {
    fn from(raw: u64) -> Self {
        FaceKey(raw)
    }
}

/// Monotonic key counters owned by a mesh instance.
///
/// The counters only ever move forward: supplying an explicit key advances
/// the counter past it, and deleting an element never gives its key back.
/// The sole reset point is full mesh reconstruction
/// ([`HalfedgeMesh::from_vertices_and_faces`](crate::topology::halfedge::HalfedgeMesh::from_vertices_and_faces)).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KeyGenerator {
    next_vertex: u64,
    next_face: u64,
}

impl KeyGenerator {
    /// Fresh generator with both counters at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next vertex key.
    #[inline]
    pub fn next_vertex(&mut self) -> VertexKey {
        let key = VertexKey(self.next_vertex);
        self.next_vertex += 1;
        key
    }

    /// Mints the next face key.
    #[inline]
    pub fn next_face(&mut self) -> FaceKey {
        let key = FaceKey(self.next_face);
        self.next_face += 1;
        key
    }

    /// Records an externally supplied vertex key so it is never minted again.
    #[inline]
    pub fn observe_vertex(&mut self, key: VertexKey) {
        self.next_vertex = self.next_vertex.max(key.0 + 1);
    }

    /// Records an externally supplied face key so it is never minted again.
    #[inline]
    pub fn observe_face(&mut self, key: FaceKey) {
        self.next_face = self.next_face.max(key.0 + 1);
    }
}

//! MeshHalfedgeError: Unified error type for mesh-halfedge public APIs
//!
//! This error type is used throughout the mesh-halfedge library to provide
//! robust, non-panicking error handling for all public APIs. Structural
//! violations are raised synchronously at the point of detection and are
//! never downgraded to warnings.

use crate::topology::key::{FaceKey, VertexKey};
use thiserror::Error;

/// Unified error type for mesh-halfedge operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshHalfedgeError {
    /// An explicit vertex key collided with one already in the vertex table.
    #[error("vertex key `{0}` already exists in the mesh")]
    DuplicateVertexKey(VertexKey),
    /// An explicit face key collided with one already in the face table.
    #[error("face key `{0}` already exists in the mesh")]
    DuplicateFaceKey(FaceKey),
    /// An operation referenced a vertex absent from the vertex table.
    #[error("unknown vertex `{0}`")]
    UnknownVertex(VertexKey),
    /// An operation referenced a face absent from the face table.
    #[error("unknown face `{0}`")]
    UnknownFace(FaceKey),
    /// An operation referenced a half-edge with no adjacency entry.
    #[error("no half-edge from `{0}` to `{1}`")]
    UnknownHalfedge(VertexKey, VertexKey),
    /// A cycle-finder operation referenced a node absent from the graph.
    #[error("unknown node `{0}` in planar graph")]
    UnknownNode(u64),
    /// `add_face` would assign a second face to an already-owned half-edge.
    #[error("half-edge `{0}` -> `{1}` already borders face `{2}`; adding another face would make the edge non-manifold")]
    NonManifoldEdge(VertexKey, VertexKey, FaceKey),
    /// A face boundary needs at least three vertices.
    #[error("face needs at least 3 vertices, got {0}")]
    FaceTooSmall(usize),
    /// A face boundary listed the same vertex more than once.
    #[error("vertex `{0}` appears more than once in the face boundary")]
    RepeatedVertex(VertexKey),
    /// A half-edge references a face that is missing or does not contain it.
    #[error("half-edge `{0}` -> `{1}` references face `{2}` which is missing or does not contain it")]
    DanglingHalfedge(VertexKey, VertexKey, FaceKey),
    /// A vertex whose incident faces do not form a single fan.
    #[error("vertex `{0}` is non-manifold: its incident faces form more than one fan")]
    NonManifoldVertex(VertexKey),
    /// A split parameter fell outside the open interval (0, 1).
    #[error("split parameter t = {0} must lie strictly between 0 and 1")]
    ParameterOutOfRange(f64),
    /// A face-split endpoint does not lie on the face being split.
    #[error("split vertex `{0}` does not belong to face `{1}`")]
    SplitVertexNotOnFace(VertexKey, FaceKey),
    /// Face-split endpoints are cyclically adjacent on the face.
    #[error("split vertices `{0}` and `{1}` are neighbors on face `{2}`")]
    AdjacentSplitVertices(VertexKey, VertexKey, FaceKey),
    /// An operation that needs faces on both sides hit a boundary edge.
    #[error("edge `{0}` - `{1}` lies on the mesh boundary")]
    BoundaryEdge(VertexKey, VertexKey),
    /// Strict attribute lookup found neither an override nor a default.
    #[error("no value or default registered for attribute `{0}`")]
    MissingAttributeDefault(String),
    /// Geometric input the algorithms cannot work with.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

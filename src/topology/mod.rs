//! Top-level module for mesh topology.
//!
//! This module provides the core types for representing and editing
//! half-edge mesh topology:
//! - Typed vertex/face keys and the monotonic key generator
//! - The `HalfedgeMesh` datastructure and its atomic mutating operators
//! - Splitting and flipping operators composed from the atomic ones
//! - Derived read-only queries (neighborhoods, boundary tests, face geometry)
//! - Configurable topology validation for externally built meshes
//!
//! Most users will interact with [`halfedge::HalfedgeMesh`] directly; the
//! query and split operations are inherent methods on it.

pub mod halfedge;
pub mod key;
pub mod query;
pub mod split;
pub mod validation;

pub use halfedge::{EdgeKey, HalfedgeMesh, edge_key};
pub use key::{FaceKey, KeyGenerator, VertexKey};
pub use validation::{NonManifoldHandling, TopologyValidationOptions, validate_mesh_topology};

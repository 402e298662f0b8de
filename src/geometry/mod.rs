//! Geometry utilities for mesh-halfedge.
//!
//! This module provides the double-precision XY predicates and small vector
//! helpers shared by the mesh queries and the triangulation algorithms.

pub mod predicates;

pub use predicates::{Point2, Point3};

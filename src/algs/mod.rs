//! Re-export public algorithms.

pub mod cycles;
pub mod delaunay;

pub use cycles::PlanarGraph;
pub use delaunay::{DelaunayConfig, DelaunayTriangulator, Triangulation};

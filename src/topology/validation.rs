//! Mesh topology validation helpers.
//!
//! [`DebugInvariants`](crate::debug_invariants::DebugInvariants) guards the
//! structural invariants after every mutation in debug builds; this module
//! is the configurable, caller-driven complement for checking meshes that
//! arrive from outside (interchange data, hand-built fixtures).

use crate::mesh_error::MeshHalfedgeError;
use crate::topology::halfedge::{HalfedgeMesh, cyclic_pairs};
use crate::topology::key::VertexKey;
use std::collections::{HashMap, HashSet};

/// Optional validation toggles for half-edge topology checks.
#[derive(Debug, Clone, Copy)]
pub struct TopologyValidationOptions {
    /// Ensure every face cycle's forward half-edges map back to the face.
    pub check_face_cycles: bool,
    /// Ensure the reverse half-edge of every face half-edge exists.
    pub check_reverse_halfedges: bool,
    /// Ensure every half-edge target is a live vertex.
    pub check_vertex_references: bool,
    /// How to handle non-manifold vertices (disconnected face fans).
    pub non_manifold: NonManifoldHandling,
}

impl Default for TopologyValidationOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl TopologyValidationOptions {
    /// Enable all topology validation checks.
    pub fn all() -> Self {
        Self {
            check_face_cycles: true,
            check_reverse_halfedges: true,
            check_vertex_references: true,
            non_manifold: NonManifoldHandling::Error,
        }
    }
}

/// Behavior for non-manifold vertex detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonManifoldHandling {
    /// Skip non-manifold detection.
    Ignore,
    /// Log a warning on non-manifold vertices.
    Warn,
    /// Return an error on non-manifold vertices.
    Error,
}

/// Validate a mesh's topology against the provided options.
pub fn validate_mesh_topology(
    mesh: &HalfedgeMesh,
    options: TopologyValidationOptions,
) -> Result<(), MeshHalfedgeError> {
    if options.check_face_cycles || options.check_reverse_halfedges {
        for fkey in mesh.faces() {
            let cycle = mesh
                .face_vertices(fkey)
                .ok_or(MeshHalfedgeError::UnknownFace(fkey))?;
            for (&a, &b) in cyclic_pairs(cycle) {
                if options.check_face_cycles {
                    match mesh.halfedge_face(a, b) {
                        Some(Some(owner)) if owner == fkey => {}
                        Some(Some(owner)) => {
                            return Err(MeshHalfedgeError::NonManifoldEdge(a, b, owner));
                        }
                        _ => return Err(MeshHalfedgeError::UnknownHalfedge(a, b)),
                    }
                }
                if options.check_reverse_halfedges && mesh.halfedge_face(b, a).is_none() {
                    return Err(MeshHalfedgeError::UnknownHalfedge(b, a));
                }
            }
        }
    }

    if options.check_vertex_references {
        for key in mesh.vertices() {
            for &(target, _) in mesh.vertex_halfedges(key).unwrap_or(&[]) {
                if !mesh.has_vertex(target) {
                    return Err(MeshHalfedgeError::UnknownVertex(target));
                }
            }
        }
    }

    if options.non_manifold != NonManifoldHandling::Ignore {
        for key in mesh.vertices() {
            if fan_component_count(mesh, key) > 1 {
                match options.non_manifold {
                    NonManifoldHandling::Warn => {
                        log::warn!("vertex {key} is non-manifold (disconnected face fans)");
                    }
                    NonManifoldHandling::Error => {
                        return Err(MeshHalfedgeError::NonManifoldVertex(key));
                    }
                    NonManifoldHandling::Ignore => unreachable!(),
                }
            }
        }
    }

    Ok(())
}

/// Number of connected components among the faces incident to `key`, where
/// two faces are connected when they share an edge through `key`.
fn fan_component_count(mesh: &HalfedgeMesh, key: VertexKey) -> usize {
    let faces = mesh.vertex_faces(key);
    if faces.len() < 2 {
        return faces.len().min(1);
    }
    // Faces sharing the edge (key, nbr) sit on its two sides.
    let mut adjacent: HashMap<_, Vec<_>> = HashMap::new();
    for nbr in mesh.vertex_neighbors(key) {
        if let (Some(Some(f)), Some(Some(g))) =
            (mesh.halfedge_face(key, nbr), mesh.halfedge_face(nbr, key))
        {
            adjacent.entry(f).or_default().push(g);
            adjacent.entry(g).or_default().push(f);
        }
    }
    let mut seen: HashSet<_> = HashSet::new();
    let mut components = 0;
    for &start in &faces {
        if !seen.insert(start) {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        while let Some(f) = stack.pop() {
            for &g in adjacent.get(&f).map(|v| v.as_slice()).unwrap_or(&[]) {
                if seen.insert(g) {
                    stack.push(g);
                }
            }
        }
    }
    components
}

//! WGSL shader sources for the mesh raycast pass.

/// Per-triangle intersection and minimum-t reduction, two entry points:
/// `intersect` then `resolve`.
pub const MESH_RAYCAST_SHADER: &str = include_str!("mesh_raycast.wgsl");

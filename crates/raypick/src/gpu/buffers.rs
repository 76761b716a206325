//! GPU buffer layouts for the mesh raycast pass.

use bytemuck::{Pod, Zeroable};
use raypick_math::Point3;

use crate::mesh::MeshGeometry;
use crate::ray::Ray;

/// Bit pattern of `f32::INFINITY`, the "no intersection" marker.
///
/// Positive IEEE-754 floats order the same as their bit patterns, so the
/// shader reduces to the nearest hit with an integer `atomicMin`.
pub const NO_HIT_BITS: u32 = 0x7f80_0000;

/// Triangle-index marker meaning no triangle won the reduction.
pub const NO_TRIANGLE: u32 = u32::MAX;

/// One triangle, vec4-padded to match the WGSL storage layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuTriangle {
    /// First vertex (xyz, w unused).
    pub v0: [f32; 4],
    /// Second vertex.
    pub v1: [f32; 4],
    /// Third vertex.
    pub v2: [f32; 4],
}

impl GpuTriangle {
    fn vertex(p: &Point3) -> [f32; 4] {
        [p.x, p.y, p.z, 0.0]
    }
}

/// Flatten a mesh into the triangle buffer uploaded to the shader.
pub(crate) fn mesh_triangles(mesh: &MeshGeometry) -> Vec<GpuTriangle> {
    (0..mesh.triangle_count())
        .map(|i| {
            let [v0, v1, v2] = mesh.triangle(i);
            GpuTriangle {
                v0: GpuTriangle::vertex(&v0),
                v1: GpuTriangle::vertex(&v1),
                v2: GpuTriangle::vertex(&v2),
            }
        })
        .collect()
}

/// Ray parameters for one dispatch (uniform buffer).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuRayParams {
    /// Ray origin in mesh local space (xyz, w unused).
    pub origin: [f32; 4],
    /// Unit ray direction in mesh local space (xyz, w unused).
    pub direction: [f32; 4],
    /// Number of triangles in the buffer.
    pub triangle_count: u32,
    /// Padding for 16-byte uniform alignment.
    pub _pad: [u32; 3],
}

impl GpuRayParams {
    /// Pack a local-space ray and the triangle count.
    pub(crate) fn new(local_ray: &Ray, triangle_count: u32) -> Self {
        let o = local_ray.origin;
        let d = local_ray.direction;
        Self {
            origin: [o.x, o.y, o.z, 0.0],
            direction: [d.x, d.y, d.z, 0.0],
            triangle_count,
            _pad: [0; 3],
        }
    }
}

/// The single record read back after the reduction.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuHitRecord {
    /// Bit pattern of the winning parametric distance, or [`NO_HIT_BITS`].
    pub t_bits: u32,
    /// Winning triangle index, or [`NO_TRIANGLE`].
    pub triangle: u32,
}

impl GpuHitRecord {
    /// The initial record every dispatch starts from.
    pub(crate) fn miss() -> Self {
        Self {
            t_bits: NO_HIT_BITS,
            triangle: NO_TRIANGLE,
        }
    }

    /// Decode the record: `Some((t, triangle))` on a hit.
    pub(crate) fn decode(&self) -> Option<(f32, u32)> {
        if self.t_bits == NO_HIT_BITS || self.triangle == NO_TRIANGLE {
            return None;
        }
        Some((f32::from_bits(self.t_bits), self.triangle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_float_bits_order_as_integers() {
        let samples = [0.001f32, 0.5, 1.0, 9.0, 1e6];
        for pair in samples.windows(2) {
            assert!(pair[0].to_bits() < pair[1].to_bits());
            assert!(pair[1].to_bits() < NO_HIT_BITS);
        }
    }

    #[test]
    fn test_miss_record_decodes_to_none() {
        assert!(GpuHitRecord::miss().decode().is_none());
    }

    #[test]
    fn test_hit_record_roundtrip() {
        let record = GpuHitRecord {
            t_bits: 9.0f32.to_bits(),
            triangle: 4,
        };
        assert_eq!(record.decode(), Some((9.0, 4)));
    }

    #[test]
    fn test_mesh_triangles_layout() {
        let triangles = mesh_triangles(&MeshGeometry::unit_cube());
        assert_eq!(triangles.len(), 12);
        assert_eq!(std::mem::size_of::<GpuTriangle>(), 48);
        assert_eq!(std::mem::size_of::<GpuRayParams>(), 48);
        assert_eq!(std::mem::size_of::<GpuHitRecord>(), 8);
    }
}

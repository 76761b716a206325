//! Triangle geometry tested by the mesh backends.

use raypick_math::{Aabb, Point3};

use crate::error::RaycastError;

/// An ordered sequence of triangles in mesh local space.
///
/// Owned by the host's asset system in spirit: geometry is immutable
/// during a raycast, and both mesh backends read it without copying
/// (the GPU backend uploads it per cast).
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    positions: Vec<Point3>,
    indices: Option<Vec<u32>>,
    aabb: Option<Aabb>,
}

impl MeshGeometry {
    /// Non-indexed geometry: every three consecutive positions form a
    /// triangle.
    ///
    /// Fails with [`RaycastError::InvalidArgument`] when the position
    /// count is not a multiple of three.
    pub fn from_positions(positions: Vec<Point3>) -> Result<Self, RaycastError> {
        if positions.len() % 3 != 0 {
            return Err(RaycastError::InvalidArgument(
                "position count must be a multiple of 3",
            ));
        }
        let aabb = Aabb::from_points(positions.iter());
        Ok(Self {
            positions,
            indices: None,
            aabb,
        })
    }

    /// Indexed geometry: every three consecutive indices form a triangle.
    ///
    /// Fails with [`RaycastError::InvalidArgument`] when the index count
    /// is not a multiple of three or an index is out of bounds.
    pub fn indexed(positions: Vec<Point3>, indices: Vec<u32>) -> Result<Self, RaycastError> {
        if indices.len() % 3 != 0 {
            return Err(RaycastError::InvalidArgument(
                "index count must be a multiple of 3",
            ));
        }
        if indices.iter().any(|&i| i as usize >= positions.len()) {
            return Err(RaycastError::InvalidArgument("triangle index out of bounds"));
        }
        let aabb = Aabb::from_points(positions.iter());
        Ok(Self {
            positions,
            indices: Some(indices),
            aabb,
        })
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Whether the mesh holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Vertices of triangle `i`, in local space.
    ///
    /// # Panics
    ///
    /// Panics if `i >= triangle_count()`.
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        match &self.indices {
            Some(indices) => [
                self.positions[indices[3 * i] as usize],
                self.positions[indices[3 * i + 1] as usize],
                self.positions[indices[3 * i + 2] as usize],
            ],
            None => [
                self.positions[3 * i],
                self.positions[3 * i + 1],
                self.positions[3 * i + 2],
            ],
        }
    }

    /// Local-space bounding box, `None` for an empty mesh.
    pub fn local_aabb(&self) -> Option<&Aabb> {
        self.aabb.as_ref()
    }

    /// Vertex positions in local space.
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Triangle indices, if the geometry is indexed.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Axis-aligned unit cube centered at the origin: 8 vertices, 12
    /// triangles, corners at ±0.5.
    ///
    /// Instance size comes from the [`Transform`](raypick_math::Transform)
    /// scale, matching how hosts place primitive meshes.
    pub fn unit_cube() -> Self {
        let h = 0.5;
        let positions = vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ];
        #[rustfmt::skip]
        let indices = vec![
            // -Z face
            0, 2, 1, 0, 3, 2,
            // +Z face
            4, 5, 6, 4, 6, 7,
            // -X face
            0, 4, 7, 0, 7, 3,
            // +X face
            1, 2, 6, 1, 6, 5,
            // -Y face
            0, 1, 5, 0, 5, 4,
            // +Y face
            3, 7, 6, 3, 6, 2,
        ];
        // Construction cannot fail for the hard-coded data.
        Self::indexed(positions, indices).expect("unit cube geometry is well-formed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube() {
        let cube = MeshGeometry::unit_cube();
        assert_eq!(cube.triangle_count(), 12);
        let aabb = cube.local_aabb().unwrap();
        assert_eq!(aabb.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(aabb.max, Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_triangle_accessor() {
        let mesh = MeshGeometry::from_positions(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        let [v0, v1, v2] = mesh.triangle(0);
        assert_eq!(v0, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(v1, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(v2, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_ragged_positions_rejected() {
        let result = MeshGeometry::from_positions(vec![Point3::origin(); 4]);
        assert!(matches!(result, Err(RaycastError::InvalidArgument(_))));
    }

    #[test]
    fn test_out_of_bounds_index_rejected() {
        let result = MeshGeometry::indexed(vec![Point3::origin(); 3], vec![0, 1, 3]);
        assert!(matches!(result, Err(RaycastError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshGeometry::from_positions(Vec::new()).unwrap();
        assert!(mesh.is_empty());
        assert!(mesh.local_aabb().is_none());
    }
}

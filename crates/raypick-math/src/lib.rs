#![warn(missing_docs)]

//! Math types for the raypick ray-casting subsystem.
//!
//! Thin wrappers around nalgebra providing the types the intersectors
//! share: points, vectors, directions, a TRS transform for mesh
//! instances, and an axis-aligned bounding box.
//!
//! Everything is `f32`: the subsystem feeds `f32` GPU buffers and the
//! physics adapter's `f32` world, so a wider scalar would only add
//! conversions.

use nalgebra::{Matrix4, Unit, UnitQuaternion, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f32>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f32>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f32>>;

/// A 4x4 homogeneous transformation matrix.
pub type Mat4 = Matrix4<f32>;

/// A rotation expressed as a unit quaternion.
pub type Rotation = UnitQuaternion<f32>;

/// Position, rotation and scale of a mesh instance.
///
/// Read-only input to the intersectors; the owning scene element is free
/// to mutate it between raycasts.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation applied after rotation and scale.
    pub position: Vec3,
    /// Orientation of the instance.
    pub rotation: Rotation,
    /// Per-axis scale applied first.
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform: no translation, no rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Rotation::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Transform translated to `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Transform translated to `position` with per-axis `scale`.
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Rotation::identity(),
            scale,
        }
    }

    /// The model matrix `T * R * S` mapping local space to world space.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Inverse of the model matrix, mapping world space to local space.
    ///
    /// Returns `None` when the transform is degenerate (a scale component
    /// of zero collapses the instance onto a plane).
    pub fn inverse_model_matrix(&self) -> Option<Mat4> {
        self.model_matrix().try_inverse()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Create a box from its corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Tight bounds of a point set, or `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(*first, *first);
        for p in iter {
            aabb.extend(p);
        }
        Some(aabb)
    }

    /// Grow the box to contain `p`.
    pub fn extend(&mut self, p: &Point3) {
        self.min = Point3::new(
            self.min.x.min(p.x),
            self.min.y.min(p.y),
            self.min.z.min(p.z),
        );
        self.max = Point3::new(
            self.max.x.max(p.x),
            self.max.y.max(p.y),
            self.max.z.max(p.z),
        );
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_matrix_trs_order() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Rotation::from_euler_angles(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        // Local +X scales to 2, rotates about Y onto -Z, then translates.
        let p = transform.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
        assert!((p.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let transform = Transform {
            position: Vec3::new(-4.0, 0.5, 9.0),
            rotation: Rotation::from_euler_angles(0.3, -1.1, 0.7),
            scale: Vec3::new(2.0, 5.0, 0.5),
        };
        let model = transform.model_matrix();
        let inverse = transform.inverse_model_matrix().unwrap();
        let p = Point3::new(3.0, -2.0, 1.0);
        let roundtrip = inverse.transform_point(&model.transform_point(&p));
        assert!((roundtrip - p).norm() < 1e-4);
    }

    #[test]
    fn test_degenerate_scale_has_no_inverse() {
        let transform = Transform::from_position_scale(Vec3::zeros(), Vec3::new(1.0, 0.0, 1.0));
        assert!(transform.inverse_model_matrix().is_none());
    }

    #[test]
    fn test_aabb_from_points() {
        let points = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
        ];
        let aabb = Aabb::from_points(points.iter()).unwrap();
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 5.0));
    }

    #[test]
    fn test_aabb_empty() {
        assert!(Aabb::from_points([].iter()).is_none());
    }
}

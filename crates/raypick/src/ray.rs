//! Ray and intersection-result value types.

use raypick_math::{Aabb, Dir3, Point3, Vec3};

use crate::error::RaycastError;

/// Opaque identifier for a scene entity hit by a raycast.
///
/// The subsystem never interprets the value; hosts map it back to their
/// own entity storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// A ray in 3D space defined by origin and direction.
///
/// Immutable once constructed; one ray is built per raycast invocation.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Precomputed reciprocal of direction components for fast AABB tests.
    inv_direction: Vec3,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction is normalized; a zero or near-zero vector is
    /// rejected with [`RaycastError::InvalidArgument`].
    pub fn new(origin: Point3, direction: Vec3) -> Result<Self, RaycastError> {
        let dir = Dir3::try_new(direction, 1e-9)
            .ok_or(RaycastError::InvalidArgument("ray direction must be non-zero"))?;
        let inv = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let sign = [
            if inv.x < 0.0 { 1 } else { 0 },
            if inv.y < 0.0 { 1 } else { 0 },
            if inv.z < 0.0 { 1 } else { 0 },
        ];
        Ok(Self {
            origin,
            direction: dir,
            inv_direction: inv,
            sign,
        })
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Test ray-AABB intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` with the entry and exit parameters
    /// if the ray intersects the box, `None` otherwise. Handles infinite
    /// values correctly for axis-aligned rays.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let bounds = [aabb.min, aabb.max];

        let tx1 = (bounds[self.sign[0]].x - self.origin.x) * self.inv_direction.x;
        let tx2 = (bounds[1 - self.sign[0]].x - self.origin.x) * self.inv_direction.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[self.sign[1]].y - self.origin.y) * self.inv_direction.y;
        let ty2 = (bounds[1 - self.sign[1]].y - self.origin.y) * self.inv_direction.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (bounds[self.sign[2]].z - self.origin.z) * self.inv_direction.z;
        let tz2 = (bounds[1 - self.sign[2]].z - self.origin.z) * self.inv_direction.z;

        t_min = t_min.max(tz1);
        t_max = t_max.min(tz2);

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min.max(0.0), t_max))
        } else {
            None
        }
    }
}

/// Result of a successful raycast, in world space.
///
/// A miss is represented as `Option::<RayHit>::None`, so a hit record
/// never carries unspecified fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space intersection point.
    pub position: Point3,
    /// Distance from the ray origin to the intersection, in world units.
    pub distance: f32,
    /// Index of the intersected triangle. `None` for the physics backend,
    /// which reports whole-collider hits.
    pub triangle: Option<u32>,
    /// The scene entity that was hit. The mesh backends leave this unset;
    /// the dispatcher fills in the target's element.
    pub element: Option<ElementId>,
}

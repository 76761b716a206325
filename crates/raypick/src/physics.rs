//! Seam to an external physics engine's ray query.

use crate::ray::{ElementId, Ray};

/// Closest hit reported by a physics world's ray test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsRayHit {
    /// Distance from the ray origin to the hit, in world units.
    pub distance: f32,
    /// Entity associated with the hit collider, when the adapter knows it.
    pub element: Option<ElementId>,
}

/// Ray query over a rigid-body world.
///
/// Implemented by physics adapters (see the `raypick-rapier` crate); the
/// engine's broadphase/narrowphase does the spatial work, so this is the
/// preferred backend when many interactive bodies exist.
pub trait PhysicsRayQuery {
    /// Closest hit along `ray` within `max_distance`, across every
    /// registered body. `None` when nothing is hit.
    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<PhysicsRayHit>;
}

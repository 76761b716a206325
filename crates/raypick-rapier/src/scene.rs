//! Rigid-body world with element-tagged colliders.

use std::collections::HashMap;

use nalgebra::{Isometry3, Vector3};
use parry3d::shape::{SharedShape, TriMesh};
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use rapier3d::geometry::{
    BroadPhaseMultiSap, ColliderBuilder, ColliderHandle, ColliderSet, NarrowPhase,
};
use rapier3d::pipeline::{PhysicsPipeline, QueryFilter, QueryPipeline};

use raypick::{ElementId, MeshGeometry, PhysicsRayHit, PhysicsRayQuery, Ray};
use raypick_math::{Transform, Vec3};

use crate::error::SceneError;

/// A Rapier world whose colliders are associated with scene entities.
///
/// Ray tests run through Rapier's query pipeline, reusing the broadphase
/// acceleration the simulation already maintains; hits come back with the
/// entity registered for the hit collider.
pub struct PhysicsScene {
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    collider_elements: HashMap<ColliderHandle, ElementId>,
}

impl PhysicsScene {
    /// Empty world with standard gravity.
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: Vector3::new(0.0, -9.81, 0.0),
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collider_elements: HashMap::new(),
        }
    }

    /// Set the gravity vector.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Add a fixed box collider.
    ///
    /// `half_extents` are in world units; `element` is reported on ray
    /// hits against this collider.
    pub fn add_fixed_cuboid(
        &mut self,
        position: Vec3,
        half_extents: Vec3,
        element: ElementId,
    ) -> ColliderHandle {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.add_fixed_shape(position, shape, element)
    }

    /// Add a fixed triangle-mesh collider from raypick geometry.
    ///
    /// The mesh is baked into world space through `transform`, so the
    /// physics backend and the mesh backends see the same surface.
    pub fn add_fixed_mesh(
        &mut self,
        transform: &Transform,
        mesh: &MeshGeometry,
        element: ElementId,
    ) -> Result<ColliderHandle, SceneError> {
        if mesh.is_empty() {
            return Err(SceneError::CollisionShape {
                element,
                reason: "empty mesh".to_string(),
            });
        }

        let model = transform.model_matrix();
        let vertices: Vec<nalgebra::Point3<f32>> = mesh
            .positions()
            .iter()
            .map(|p| model.transform_point(p))
            .collect();
        let indices: Vec<[u32; 3]> = match mesh.indices() {
            Some(indices) => indices.chunks(3).map(|i| [i[0], i[1], i[2]]).collect(),
            None => (0..mesh.triangle_count() as u32)
                .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
                .collect(),
        };

        let trimesh = TriMesh::new(vertices, indices).map_err(|e| SceneError::CollisionShape {
            element,
            reason: format!("failed to create trimesh: {:?}", e),
        })?;

        Ok(self.add_fixed_shape(Vec3::zeros(), SharedShape::new(trimesh), element))
    }

    fn add_fixed_shape(
        &mut self,
        position: Vec3,
        shape: SharedShape,
        element: ElementId,
    ) -> ColliderHandle {
        let body = RigidBodyBuilder::new(RigidBodyType::Fixed)
            .position(Isometry3::translation(position.x, position.y, position.z))
            .build();
        let body_handle = self.bodies.insert(body);
        let collider = ColliderBuilder::new(shape).build();
        let handle = self
            .colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies);
        self.collider_elements.insert(handle, element);

        // Keep the query pipeline in sync so casts issued before the next
        // step still see the new collider.
        self.query_pipeline.update(&self.colliders);
        handle
    }

    /// Remove a collider and its body from the world.
    pub fn remove(&mut self, handle: ColliderHandle) {
        match self.colliders.get(handle).and_then(|c| c.parent()) {
            Some(body_handle) => self.remove_body(body_handle),
            None => {
                self.colliders.remove(
                    handle,
                    &mut self.islands,
                    &mut self.bodies,
                    /* wake_up */ false,
                );
            }
        }
        self.collider_elements.remove(&handle);
        self.query_pipeline.update(&self.colliders);
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            /* remove_attached_colliders */ true,
        );
    }

    /// Step the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// The entity registered for a collider.
    pub fn element_of(&self, handle: ColliderHandle) -> Option<ElementId> {
        self.collider_elements.get(&handle).copied()
    }
}

impl Default for PhysicsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsRayQuery for PhysicsScene {
    fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<PhysicsRayHit> {
        let rapier_ray = rapier3d::geometry::Ray::new(ray.origin, *ray.direction.as_ref());
        let (handle, toi) = self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &rapier_ray,
            max_distance,
            /* solid */ true,
            QueryFilter::default(),
        )?;
        Some(PhysicsRayHit {
            distance: toi,
            element: self.collider_elements.get(&handle).copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raypick_math::Point3;

    fn down_z_ray() -> Ray {
        Ray::new(Point3::new(0.0, 1.5, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap()
    }

    #[test]
    fn test_cuboid_scenario() {
        // 2x5x2 box centered at (0, 1.5, 0): the +Z face sits at z = 1.
        let mut scene = PhysicsScene::new();
        let element = ElementId(3);
        scene.add_fixed_cuboid(Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.0, 2.5, 1.0), element);

        let hit = scene.cast_ray(&down_z_ray(), f32::MAX).unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert_eq!(hit.element, Some(element));
    }

    #[test]
    fn test_empty_world_misses() {
        let scene = PhysicsScene::new();
        assert!(scene.cast_ray(&down_z_ray(), f32::MAX).is_none());
    }

    #[test]
    fn test_removed_collider_no_longer_hits() {
        let mut scene = PhysicsScene::new();
        let handle =
            scene.add_fixed_cuboid(Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.0, 2.5, 1.0), ElementId(3));
        scene.remove(handle);
        assert!(scene.cast_ray(&down_z_ray(), f32::MAX).is_none());
        assert!(scene.element_of(handle).is_none());
    }

    #[test]
    fn test_mesh_collider_matches_cuboid_surface() {
        let mut scene = PhysicsScene::new();
        let transform = Transform::from_position_scale(
            Vec3::new(0.0, 1.5, 0.0),
            Vec3::new(2.0, 5.0, 2.0),
        );
        scene
            .add_fixed_mesh(&transform, &MeshGeometry::unit_cube(), ElementId(9))
            .unwrap();

        let hit = scene.cast_ray(&down_z_ray(), f32::MAX).unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-3);
        assert_eq!(hit.element, Some(ElementId(9)));
    }

    #[test]
    fn test_nearest_of_two_bodies_wins() {
        let mut scene = PhysicsScene::new();
        let near = ElementId(1);
        let far = ElementId(2);
        scene.add_fixed_cuboid(Vec3::new(0.0, 1.5, -5.0), Vec3::new(1.0, 1.0, 1.0), far);
        scene.add_fixed_cuboid(Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.0, 1.0, 1.0), near);

        let hit = scene.cast_ray(&down_z_ray(), f32::MAX).unwrap();
        assert_eq!(hit.element, Some(near));
        assert!((hit.distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_max_distance_limits_query() {
        let mut scene = PhysicsScene::new();
        scene.add_fixed_cuboid(Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.0, 2.5, 1.0), ElementId(3));
        assert!(scene.cast_ray(&down_z_ray(), 5.0).is_none());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mut scene = PhysicsScene::new();
        let mesh = MeshGeometry::from_positions(Vec::new()).unwrap();
        let result = scene.add_fixed_mesh(&Transform::identity(), &mesh, ElementId(1));
        assert!(matches!(result, Err(SceneError::CollisionShape { .. })));
    }
}

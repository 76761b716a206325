//! Backend selection and result normalization.

use raypick_math::Transform;

use crate::camera::{Camera, Viewport};
use crate::cpu;
use crate::error::RaycastError;
use crate::mesh::MeshGeometry;
use crate::physics::PhysicsRayQuery;
use crate::ray::{ElementId, Ray, RayHit};

#[cfg(feature = "gpu")]
use std::sync::Arc;

#[cfg(feature = "gpu")]
use raypick_gpu::GpuContext;

#[cfg(feature = "gpu")]
use crate::gpu::MeshRaycastPipeline;

/// Which intersection backend a cast is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaycastMode {
    /// Closest hit across the whole physics world.
    #[default]
    PhysicsEngine,
    /// Exact triangle intersection against one mesh, on the CPU.
    CpuMesh,
    /// Exact triangle intersection against one mesh, on the GPU.
    GpuMesh,
}

/// The single mesh instance the CPU and GPU backends test.
#[derive(Debug, Clone, Copy)]
pub struct RaycastTarget<'a> {
    /// Placement of the mesh instance.
    pub transform: &'a Transform,
    /// The instance's geometry.
    pub mesh: &'a MeshGeometry,
    /// Entity to report on a mesh-backend hit. The intersectors only test
    /// one mesh, so the dispatcher assigns this rather than the backend.
    pub element: Option<ElementId>,
}

impl<'a> RaycastTarget<'a> {
    /// Target a mesh instance with no associated entity.
    pub fn new(transform: &'a Transform, mesh: &'a MeshGeometry) -> Self {
        Self {
            transform,
            mesh,
            element: None,
        }
    }

    /// Associate the entity reported on a hit.
    pub fn with_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }
}

#[cfg(feature = "gpu")]
struct GpuBackend {
    ctx: Arc<GpuContext>,
    pipeline: MeshRaycastPipeline,
}

/// Routes each cast to the selected backend and normalizes the result.
///
/// Owns the mode selector and, between [`init_gpu`](Self::init_gpu) and
/// [`dispose_gpu`](Self::dispose_gpu), the GPU backend's compute
/// resources. Changing the mode only updates the selector; no resources
/// are reallocated. There is no fallback between backends: a miss is
/// `Ok(None)`, never a retry.
pub struct RaycastDispatcher {
    mode: RaycastMode,
    #[cfg(feature = "gpu")]
    gpu: Option<GpuBackend>,
}

impl RaycastDispatcher {
    /// Dispatcher starting in `mode`, with the GPU backend uninitialized.
    pub fn new(mode: RaycastMode) -> Self {
        Self {
            mode,
            #[cfg(feature = "gpu")]
            gpu: None,
        }
    }

    /// The currently selected backend.
    pub fn mode(&self) -> RaycastMode {
        self.mode
    }

    /// Select the backend used by subsequent casts.
    pub fn set_mode(&mut self, mode: RaycastMode) {
        self.mode = mode;
    }

    /// Allocate the GPU backend's compute pipeline on `ctx`.
    ///
    /// Must be called exactly once before the first [`RaycastMode::GpuMesh`]
    /// cast; a second call without an intervening dispose fails with
    /// [`RaycastError::InvalidState`].
    #[cfg(feature = "gpu")]
    pub fn init_gpu(&mut self, ctx: Arc<GpuContext>) -> Result<(), RaycastError> {
        if self.gpu.is_some() {
            return Err(RaycastError::InvalidState(
                "GPU backend is already initialized",
            ));
        }
        let pipeline = MeshRaycastPipeline::new(&ctx)?;
        self.gpu = Some(GpuBackend { ctx, pipeline });
        Ok(())
    }

    /// Release the GPU backend's compute resources.
    ///
    /// Fails with [`RaycastError::InvalidState`] when the backend was
    /// never initialized (or was already disposed).
    #[cfg(feature = "gpu")]
    pub fn dispose_gpu(&mut self) -> Result<(), RaycastError> {
        match self.gpu.take() {
            Some(_) => Ok(()),
            None => Err(RaycastError::InvalidState(
                "GPU backend is not initialized",
            )),
        }
    }

    /// Cast one ray through a screen point and resolve it with the
    /// selected backend.
    ///
    /// Ray construction is identical for every mode; only the backend
    /// invoked changes. The physics backend queries the whole world and
    /// carries its own entity association; the mesh backends test only
    /// `target` and the dispatcher assigns `target.element` on a hit.
    pub fn cast(
        &self,
        camera: &Camera,
        viewport: &Viewport,
        screen: (f32, f32),
        physics: &dyn PhysicsRayQuery,
        target: &RaycastTarget<'_>,
    ) -> Result<Option<RayHit>, RaycastError> {
        let ray = Ray::from_screen_point(camera, viewport, screen.0, screen.1)?;
        self.cast_ray(&ray, physics, target)
    }

    /// Resolve an already-constructed world-space ray.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        physics: &dyn PhysicsRayQuery,
        target: &RaycastTarget<'_>,
    ) -> Result<Option<RayHit>, RaycastError> {
        match self.mode {
            RaycastMode::PhysicsEngine => {
                Ok(physics.cast_ray(ray, f32::MAX).map(|hit| RayHit {
                    position: ray.at(hit.distance),
                    distance: hit.distance,
                    triangle: None,
                    element: hit.element,
                }))
            }
            RaycastMode::CpuMesh => Ok(Self::assign_element(
                cpu::intersect_mesh(ray, target.transform, target.mesh),
                target,
            )),
            RaycastMode::GpuMesh => self.cast_gpu(ray, target),
        }
    }

    #[cfg(feature = "gpu")]
    fn cast_gpu(
        &self,
        ray: &Ray,
        target: &RaycastTarget<'_>,
    ) -> Result<Option<RayHit>, RaycastError> {
        let gpu = self.gpu.as_ref().ok_or(RaycastError::InvalidState(
            "GPU backend is not initialized",
        ))?;
        let hit = gpu.pipeline.cast(&gpu.ctx, ray, target.transform, target.mesh)?;
        Ok(Self::assign_element(hit, target))
    }

    #[cfg(not(feature = "gpu"))]
    fn cast_gpu(
        &self,
        _ray: &Ray,
        _target: &RaycastTarget<'_>,
    ) -> Result<Option<RayHit>, RaycastError> {
        Err(RaycastError::InvalidState(
            "GPU backend requires the `gpu` feature",
        ))
    }

    fn assign_element(hit: Option<RayHit>, target: &RaycastTarget<'_>) -> Option<RayHit> {
        hit.map(|mut hit| {
            if hit.element.is_none() {
                hit.element = target.element;
            }
            hit
        })
    }
}

//! wgpu compute pipeline for the mesh raycast.

use raypick_gpu::{GpuContext, GpuError};
use raypick_math::Transform;
use wgpu::util::DeviceExt;

use super::buffers::{mesh_triangles, GpuHitRecord, GpuRayParams};
use crate::error::RaycastError;
use crate::mesh::MeshGeometry;
use crate::ray::{Ray, RayHit};

const WORKGROUP_SIZE: u32 = 64;

/// Compute pipeline testing a ray against one mesh's triangles.
///
/// Pipeline state is created once and reused across casts; per-cast
/// buffers (triangles, ray params, candidates, result) are transient.
/// Dropping the pipeline releases its resources.
pub struct MeshRaycastPipeline {
    intersect: wgpu::ComputePipeline,
    resolve: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl MeshRaycastPipeline {
    /// Create the shader module, layout and both compute pipelines.
    ///
    /// Allocation failures on the device surface as
    /// [`RaycastError::ResourceExhaustion`].
    pub fn new(ctx: &GpuContext) -> Result<Self, RaycastError> {
        ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let shader_module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Mesh Raycast Shader"),
                source: wgpu::ShaderSource::Wgsl(super::shaders::MESH_RAYCAST_SHADER.into()),
            });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Mesh Raycast Bind Group Layout"),
                    entries: &[
                        // Ray params uniform
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Triangles storage
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: true },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Per-triangle candidates
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: false },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Reduced hit record
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::COMPUTE,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: false },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Raycast Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let intersect = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Mesh Raycast Intersect Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader_module,
                entry_point: Some("intersect"),
                compilation_options: Default::default(),
                cache: None,
            });

        let resolve = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Mesh Raycast Resolve Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader_module,
                entry_point: Some("resolve"),
                compilation_options: Default::default(),
                cache: None,
            });

        if let Some(error) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(RaycastError::ResourceExhaustion(error.to_string()));
        }

        Ok(Self {
            intersect,
            resolve,
            bind_group_layout,
        })
    }

    /// Test a world-space ray against one mesh instance on the GPU.
    ///
    /// Uploads the local-space triangle buffer and ray parameters,
    /// dispatches the intersect and resolve passes, and blocks on the
    /// readback of the reduced hit record. Mirrors the CPU intersector's
    /// contract: smallest positive t wins, exact ties go to the lowest
    /// triangle index, `element` is left unset.
    pub fn cast(
        &self,
        ctx: &GpuContext,
        ray: &Ray,
        transform: &Transform,
        mesh: &MeshGeometry,
    ) -> Result<Option<RayHit>, RaycastError> {
        if mesh.is_empty() {
            return Ok(None);
        }
        let Some(inverse) = transform.inverse_model_matrix() else {
            return Ok(None);
        };
        let local_origin = inverse.transform_point(&ray.origin);
        let local_direction = inverse.transform_vector(ray.direction.as_ref());
        let Ok(local_ray) = Ray::new(local_origin, local_direction) else {
            return Ok(None);
        };

        let triangle_count = mesh.triangle_count() as u32;
        let triangles = mesh_triangles(mesh);

        let params_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Raycast Params"),
                contents: bytemuck::bytes_of(&GpuRayParams::new(&local_ray, triangle_count)),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let triangle_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Raycast Triangles"),
                contents: bytemuck::cast_slice(&triangles),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let candidates_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Raycast Candidates"),
            size: u64::from(triangle_count) * 4,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let result_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Raycast Result"),
                contents: bytemuck::bytes_of(&GpuHitRecord::miss()),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            });

        let readback_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Mesh Raycast Readback"),
            size: std::mem::size_of::<GpuHitRecord>() as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Raycast Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: triangle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: candidates_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: result_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mesh Raycast Encoder"),
            });

        let workgroups = triangle_count.div_ceil(WORKGROUP_SIZE);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Mesh Raycast Intersect Pass"),
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_pipeline(&self.intersect);
            pass.dispatch_workgroups(workgroups, 1, 1);
            pass.set_pipeline(&self.resolve);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }

        encoder.copy_buffer_to_buffer(
            &result_buffer,
            0,
            &readback_buffer,
            0,
            std::mem::size_of::<GpuHitRecord>() as u64,
        );

        ctx.queue.submit(Some(encoder.finish()));

        // Synchronous readback: blocks this thread until the dispatch
        // completes. This is the backend's documented GPU/CPU sync point.
        let buffer_slice = readback_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| GpuError::BufferMapping)?
            .map_err(|_| GpuError::BufferMapping)?;

        let data = buffer_slice.get_mapped_range();
        let record: GpuHitRecord = bytemuck::pod_read_unaligned(&data);
        drop(data);
        readback_buffer.unmap();

        Ok(record.decode().map(|(t, triangle)| {
            let position = transform.model_matrix().transform_point(&local_ray.at(t));
            RayHit {
                position,
                distance: (position - ray.origin).norm(),
                triangle: Some(triangle),
                element: None,
            }
        }))
    }
}

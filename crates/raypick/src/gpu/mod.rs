//! Compute-shader triangle intersector.
//!
//! Offloads the per-triangle ray test to the GPU for large meshes: one
//! thread per triangle, a device-side minimum-t reduction, and a
//! synchronous readback of a single hit record.
//!
//! The readback is a GPU/CPU synchronization point. Hosts presenting
//! with vertical sync should expect stalls or stale results when casting
//! every frame; the backend trades latency predictability for throughput
//! on heavy geometry.

mod buffers;
mod pipeline;
pub mod shaders;

pub use buffers::{GpuHitRecord, GpuRayParams, GpuTriangle, NO_HIT_BITS, NO_TRIANGLE};
pub use pipeline::MeshRaycastPipeline;

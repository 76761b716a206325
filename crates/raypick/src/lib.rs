#![warn(missing_docs)]

//! Pluggable ray-casting against a 3D scene via interchangeable
//! intersection backends.
//!
//! A screen-space cursor position is unprojected into a world-space ray,
//! then resolved by one of three backends selected per invocation:
//!
//! - physics engine: the closest hit across every registered rigid body,
//!   through the [`PhysicsRayQuery`] seam;
//! - CPU mesh: exact triangle-level intersection against one mesh
//!   instance in host memory;
//! - GPU mesh: the same per-triangle test dispatched as a compute pass,
//!   with the nearest hit reduced on device and read back synchronously
//!   (cargo feature `gpu`).
//!
//! # Architecture
//!
//! - [`Ray`] / [`RayHit`] - ray and intersection result value types
//! - [`Camera`] / [`Viewport`] - inputs to screen-point ray construction
//! - [`MeshGeometry`] - triangle geometry tested by the mesh backends
//! - [`cpu`] - host-memory triangle intersector
//! - [`gpu`] - compute-shader triangle intersector (feature `gpu`)
//! - [`RaycastDispatcher`] - per-mode backend selection and GPU lifecycle
//!
//! # Example
//!
//! ```ignore
//! use raypick::{Camera, MeshGeometry, RaycastDispatcher, RaycastMode, RaycastTarget, Viewport};
//! use raypick_math::{Point3, Transform, Vec3};
//!
//! let camera = Camera::perspective(
//!     Point3::new(0.0, 3.0, -6.0),
//!     Point3::origin(),
//!     Vec3::y(),
//!     60f32.to_radians(),
//!     16.0 / 9.0,
//!     0.1,
//!     100.0,
//! );
//! let viewport = Viewport::new(1280, 720);
//! let mesh = MeshGeometry::unit_cube();
//! let target = RaycastTarget::new(&transform, &mesh).with_element(cube_id);
//!
//! let mut dispatcher = RaycastDispatcher::new(RaycastMode::CpuMesh);
//! let hit = dispatcher.cast(&camera, &viewport, cursor, &physics, &target)?;
//! ```

pub mod camera;
pub mod cpu;
mod dispatcher;
mod error;
mod mesh;
mod physics;
mod ray;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use camera::{Camera, Viewport};
pub use dispatcher::{RaycastDispatcher, RaycastMode, RaycastTarget};
pub use error::RaycastError;
pub use mesh::MeshGeometry;
pub use physics::{PhysicsRayHit, PhysicsRayQuery};
pub use ray::{ElementId, Ray, RayHit};

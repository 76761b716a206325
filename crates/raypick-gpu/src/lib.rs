#![warn(missing_docs)]

//! wgpu device bootstrap for the raypick GPU intersector.
//!
//! Provides [`GpuContext`], a caller-owned device/queue pair, and
//! [`GpuError`]. The context is deliberately not a process-wide
//! singleton: hosts embed it wherever their render device lives and
//! tests can stand up as many contexts as they need.

mod context;

pub use context::{GpuContext, GpuError};

//! Error types for the ray-casting subsystem.

use thiserror::Error;

/// Errors surfaced by ray construction and the backends.
///
/// A miss is not an error: every backend reports "nothing hit" as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum RaycastError {
    /// A caller-supplied input was unusable (degenerate viewport,
    /// zero-length ray direction, malformed mesh indices).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An operation was invoked outside its valid lifecycle (GPU backend
    /// used before init or after dispose).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The GPU ran out of memory while allocating backend resources.
    /// Fatal to the GPU backend only.
    #[cfg(feature = "gpu")]
    #[error("GPU resources exhausted: {0}")]
    ResourceExhaustion(String),

    /// A GPU device operation failed.
    #[cfg(feature = "gpu")]
    #[error(transparent)]
    Gpu(#[from] raypick_gpu::GpuError),
}

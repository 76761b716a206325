//! Error types for the physics adapter.

use raypick::ElementId;
use thiserror::Error;

/// Errors that can occur while registering scene colliders.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Failed to build a collision shape from mesh geometry.
    #[error("failed to build collision shape for element {element:?}: {reason}")]
    CollisionShape {
        /// Entity the collider was meant for.
        element: ElementId,
        /// Reason for failure.
        reason: String,
    },
}

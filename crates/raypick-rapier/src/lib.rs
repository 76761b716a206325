#![warn(missing_docs)]

//! Rapier3d physics adapter for the raypick ray-casting subsystem.
//!
//! Provides [`PhysicsScene`], a rigid-body world whose colliders carry a
//! [`raypick::ElementId`] association, and implements
//! [`raypick::PhysicsRayQuery`] over Rapier's query pipeline so the
//! dispatcher's physics backend gets broadphase-accelerated whole-world
//! ray tests.
//!
//! # Example
//!
//! ```ignore
//! use raypick::ElementId;
//! use raypick_rapier::PhysicsScene;
//! use raypick_math::{Transform, Vec3};
//!
//! let mut scene = PhysicsScene::new();
//! scene.add_fixed_cuboid(Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.0, 2.5, 1.0), ElementId(1));
//! scene.step(1.0 / 60.0);
//! ```

mod error;
mod scene;

pub use error::SceneError;
pub use scene::PhysicsScene;

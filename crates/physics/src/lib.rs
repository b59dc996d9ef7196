#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Rigid Body Physics
//!
//! The physics layer the hanging-card chains are simulated on.
//!
//! The crate exposes the [`PhysicsEngine`] trait, the only surface higher
//! layers talk to, and [`World`], a CPU reference implementation of it.
//!
//! ## Key Components
//!
//! -   **Handles:** bodies and joints live in generational arenas inside the
//!     world. Callers hold [`BodyHandle`] and [`JointHandle`] values, never the
//!     bodies themselves, so a joint refers to its bodies by index and a whole
//!     chain can be torn down by releasing its handles.
//! -   **Motion modes:** a body is [`MotionMode::Dynamic`],
//!     [`MotionMode::KinematicTarget`] or [`MotionMode::Fixed`].
//! -   **Joints:** [`JointKind::Rope`] limits the anchor separation,
//!     [`JointKind::Spherical`] pins the anchors together.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{BodyDesc, JointDesc, MotionMode, PhysicsEngine, Vec3, World};
//!
//! let mut world = World::default();
//! let anchor = world.create_body(&BodyDesc::new(MotionMode::Fixed, Vec3::ZERO))?;
//! let bob = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::X))?;
//! world.create_joint(&JointDesc::rope(anchor, bob, [Vec3::ZERO; 2], 1.0))?;
//! world.run(1.0 / 60.0, 60);
//! assert!(world.translation(bob)?.length() <= 1.0 + 1e-3);
//! # Ok::<(), physics::PhysicsError>(())
//! ```

mod arena;
mod body;
mod builder;
pub mod engine;
pub mod error;
pub mod simulation;
mod steps;
pub mod transform;
pub mod types;

pub use arena::{BodyHandle, JointHandle};
pub use engine::PhysicsEngine;
pub use error::PhysicsError;
pub use glam::{Quat, Vec3};
pub use simulation::{World, WorldConfig, WorldStats};
pub use types::{BodyDesc, BodyState, JointDesc, JointKind, MotionMode, Shape};

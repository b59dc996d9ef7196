//! # Drag Controller
//!
//! Puppets a card with the pointer. The card body is only ever in one of two
//! modes:
//!
//! ```text
//! Dynamic --pointer down--> KinematicTarget --pointer up--> Dynamic
//! ```
//!
//! While dragging, the card's kinematic target follows the pointer, offset by
//! where on the card it was grabbed.

use glam::{Vec2, Vec3};
use physics::{MotionMode, PhysicsEngine};

use crate::camera::CameraView;
use crate::chain::JointChain;
use crate::config::DragConfig;
use crate::error::ChainError;
use crate::input::PointerId;

/// Exists only between pointer down and pointer up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragState {
    /// Card origin to grab point, world space, fixed at pointer down.
    pub grab_offset: Vec3,
    /// Pointer holding the capture, if the input source reported one.
    pub pointer: Option<PointerId>,
}

#[derive(Debug, Default)]
pub struct DragController {
    config: DragConfig,
    state: Option<DragState>,
}

impl DragController {
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self { config, state: None }
    }

    #[must_use]
    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    /// Starts a drag grabbing the card at `pointer_world_point`.
    ///
    /// A second pointer down during a drag keeps the original grab, and a
    /// pointer down on a destroyed chain is a no-op. The card only turns
    /// kinematic once the whole chain is awake, so a failure leaves it in the
    /// solver's hands with no drag recorded.
    ///
    /// # Errors
    /// Fails if the engine rejects a handle.
    pub fn on_pointer_down(
        &mut self,
        engine: &mut dyn PhysicsEngine,
        chain: &JointChain,
        pointer_world_point: Vec3,
        pointer: Option<PointerId>,
    ) -> Result<(), ChainError> {
        if !chain.is_alive() || self.state.is_some() {
            return Ok(());
        }
        let card = chain.card();
        let grab_offset = pointer_world_point - engine.translation(card)?;
        chain.wake_all(engine)?;
        engine.set_motion_mode(card, MotionMode::KinematicTarget)?;
        self.state = Some(DragState { grab_offset, pointer });
        tracing::debug!("Drag started on {card}, grab offset {grab_offset}");
        Ok(())
    }

    /// Moves the card's kinematic target under the pointer. Returns the
    /// target written, or `None` when no drag is active. A drag whose chain
    /// was destroyed is dropped.
    ///
    /// # Errors
    /// Fails if the engine rejects a handle.
    pub fn on_pointer_move(
        &mut self,
        engine: &mut dyn PhysicsEngine,
        chain: &JointChain,
        camera: &dyn CameraView,
        pointer_ndc: Vec2,
    ) -> Result<Option<Vec3>, ChainError> {
        let Some(state) = self.state else {
            return Ok(None);
        };
        if !chain.is_alive() {
            self.state = None;
            return Ok(None);
        }
        let target = pointer_world(camera, pointer_ndc, self.config.unproject_depth) - state.grab_offset;
        chain.wake_all(engine)?;
        engine.set_kinematic_target(chain.card(), target)?;
        Ok(Some(target))
    }

    /// Ends the drag and hands the card back to the solver. Ending a drag
    /// that was never started is a no-op.
    ///
    /// # Errors
    /// Fails if the engine rejects the card handle.
    pub fn on_pointer_up(&mut self, engine: &mut dyn PhysicsEngine, chain: &JointChain) -> Result<(), ChainError> {
        if self.state.take().is_none() {
            return Ok(());
        }
        if !chain.is_alive() {
            return Ok(());
        }
        engine.set_motion_mode(chain.card(), MotionMode::Dynamic)?;
        tracing::debug!("Drag released on {}", chain.card());
        Ok(())
    }

    /// Forgets the drag without touching the engine, for teardown.
    pub fn cancel(&mut self) -> Option<DragState> {
        self.state.take()
    }
}

/// Pointer position pushed into the scene: unprojected at `depth`, then moved
/// along the view ray by the camera's distance from the origin.
#[must_use]
pub fn pointer_world(camera: &dyn CameraView, pointer_ndc: Vec2, depth: f32) -> Vec3 {
    let eye = camera.position();
    let point = camera.unproject(pointer_ndc.extend(depth));
    let direction = (point - eye).normalize_or_zero();
    point + direction * eye.length()
}

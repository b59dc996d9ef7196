#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Lanyard
//!
//! Physically simulated cards hanging from rope chains, one per upstream
//! record, with a smooth rope curve drawn through the links.
//!
//! ## Key Components
//!
//! -   **[`JointChain`]:** five bodies (fixed anchor, three rope links, the
//!     card) joined by three rope joints and one spherical joint.
//! -   **[`CurveSampler`]:** a 32 point Catmull-Rom polyline through the
//!     links, with the middle control points lagging behind the physics.
//! -   **[`DragController`]:** pointer grab that switches the card between
//!     dynamic and kinematic-target motion.
//! -   **[`StabilizationController`]:** damps card yaw every physics step.
//! -   **[`ChainFactory`]:** lays records out in a centred row and spawns
//!     their chains.
//! -   **[`Scene`]:** owns the engine and the chains and runs the frame loop.
//!
//! ## Usage
//!
//! ```rust
//! use lanyard::{Camera, LanyardConfig, Scene};
//!
//! let mut scene = Scene::with_world(LanyardConfig::default(), Camera::new(1280, 720));
//! let report = scene.rebuild_from_json(r#"[{"contentHash": "QmExample", "title": "Lot 7"}]"#)?;
//! assert_eq!(report.chains.len(), 1);
//!
//! let frame = scene.tick(1.0 / 60.0);
//! assert_eq!(frame.chains[0].points.len(), 32);
//! # Ok::<(), lanyard::RecordError>(())
//! ```

pub mod camera;
pub mod chain;
pub mod config;
pub mod curve;
pub mod drag;
pub mod error;
pub mod factory;
pub mod gpu_types;
pub mod input;
pub mod picking;
pub mod record;
pub mod scene;
pub mod stabilize;
pub mod stepper;
pub mod subscription;

pub use camera::{Camera, CameraView};
pub use chain::{BodyTransform, ChainTransforms, JointChain, Link, CHAIN_LEN, JOINT_COUNT};
pub use config::{
    ChainConfig, CurveConfig, DragConfig, LagClock, LanyardConfig, LayoutConfig, Parameterization,
    StabilizerConfig, StepConfig,
};
pub use curve::{CurveSampler, CURVE_SAMPLES};
pub use drag::{DragController, DragState};
pub use error::{ChainError, ConfigError, RecordError};
pub use factory::{ChainFactory, Placement, SpawnReport};
pub use input::{CursorStyle, HoverState, PointerEvent, PointerId, PointerQueue};
pub use record::{parse_records, CardLabel, CardRecord};
pub use scene::{ChainFrame, ChainId, FrameOutput, RebuildReport, Scene};
pub use stabilize::StabilizationController;
pub use stepper::FixedStepper;
pub use subscription::{Disposer, Subscriptions};

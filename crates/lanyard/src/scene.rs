//! # Scene
//!
//! Owns the physics engine and every chain hanging in it, and drives them
//! from a single [`Scene::tick`] call per render frame.
//!
//! ## Frame Order
//!
//! ```text
//! drain pointer queue
//! for each due physics step:
//!     snapshot poses -> write drag targets -> engine.step(fixed_dt) -> stabilize cards
//! blend snapshot and current poses by the leftover step fraction
//! resample rope curves
//! emit FrameOutput
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::{Vec2, Vec3};
use physics::{PhysicsEngine, World};

use crate::camera::Camera;
use crate::chain::{ChainTransforms, JointChain, CHAIN_LEN};
use crate::config::{LagClock, LanyardConfig};
use crate::curve::CurveSampler;
use crate::drag::DragController;
use crate::error::{ChainError, RecordError};
use crate::factory::{ChainFactory, SkippedRecord, SpawnedChain};
use crate::gpu_types::{BodyInstance, CurveVertex};
use crate::input::{CursorStyle, HoverState, PointerEvent, PointerId, PointerQueue};
use crate::picking::intersect_box;
use crate::record::{parse_records, CardLabel, CardRecord};
use crate::stabilize::StabilizationController;
use crate::stepper::FixedStepper;
use crate::subscription::{Disposer, Subscriptions};

/// Scene-local identifier of a chain. Never reused within one scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain#{}", self.0)
    }
}

/// Everything the scene keeps per record.
pub struct ChainSlot {
    pub record: CardRecord,
    pub label: CardLabel,
    /// Row position the chain was laid out at.
    pub position: Vec3,
    pub chain: JointChain,
    pub curve: CurveSampler,
    pub drag: DragController,
    pub hover: HoverState,
    subscriptions: Subscriptions,
    drag_ndc: Option<Vec2>,
    /// Poses before the most recent physics step.
    previous: Option<ChainTransforms>,
}

impl ChainSlot {
    fn release(&mut self, engine: &mut dyn PhysicsEngine) {
        self.drag.cancel();
        self.drag_ndc = None;
        self.previous = None;
        self.hover = HoverState::default();
        self.chain.destroy(engine);
        self.subscriptions.dispose_all();
    }
}

/// Outcome of [`Scene::rebuild`].
#[derive(Debug, Default)]
pub struct RebuildReport {
    pub chains: Vec<ChainId>,
    pub skipped: Vec<SkippedRecord>,
    pub failed: Vec<(CardRecord, ChainError)>,
}

/// Render data of one chain for one frame.
#[derive(Clone, Debug)]
pub struct ChainFrame {
    pub id: ChainId,
    pub key: String,
    pub points: Vec<Vec3>,
    pub vertices: Vec<CurveVertex>,
    pub transforms: ChainTransforms,
    pub instances: [BodyInstance; CHAIN_LEN],
    pub dragging: bool,
    pub hovered: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    /// Physics steps taken this frame.
    pub steps: u32,
    pub chains: Vec<ChainFrame>,
    pub cursor: CursorStyle,
}

pub struct Scene<E: PhysicsEngine = World> {
    engine: E,
    config: LanyardConfig,
    camera: Camera,
    chains: BTreeMap<ChainId, ChainSlot>,
    next_id: u64,
    queue: PointerQueue,
    /// Pointer currently captured by a card, with the chain holding it.
    capture: Option<(PointerId, ChainId)>,
    stepper: FixedStepper,
    stabilizer: StabilizationController,
    factory: ChainFactory,
}

impl Scene<World> {
    /// Scene over a fresh reference world built from `config.world`.
    #[must_use]
    pub fn with_world(config: LanyardConfig, camera: Camera) -> Self {
        let world = World::new(config.world.clone());
        Self::new(world, camera, config)
    }
}

impl<E: PhysicsEngine> Scene<E> {
    #[must_use]
    pub fn new(engine: E, camera: Camera, config: LanyardConfig) -> Self {
        let stepper = FixedStepper::new(config.step.fixed_dt, config.step.max_steps_per_frame);
        let stabilizer = StabilizationController::new(config.stabilizer.clone());
        let factory = ChainFactory::new(config.layout.clone(), config.chain.clone());
        Self {
            engine,
            config,
            camera,
            chains: BTreeMap::new(),
            next_id: 0,
            queue: PointerQueue::new(),
            capture: None,
            stepper,
            stabilizer,
            factory,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[must_use]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[must_use]
    pub fn config(&self) -> &LanyardConfig {
        &self.config
    }

    /// Handle input sources push pointer events into.
    #[must_use]
    pub fn pointer_queue(&self) -> PointerQueue {
        self.queue.clone()
    }

    #[must_use]
    pub fn chain(&self, id: ChainId) -> Option<&ChainSlot> {
        self.chains.get(&id)
    }

    #[must_use]
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    #[must_use]
    pub fn captured(&self) -> Option<(PointerId, ChainId)> {
        self.capture
    }

    #[must_use]
    pub fn cursor(&self) -> CursorStyle {
        if self.capture.is_some() {
            return CursorStyle::Grabbing;
        }
        let hovered = self.chains.values().any(|slot| slot.hover.hovered);
        CursorStyle::for_card(HoverState { hovered }, false)
    }

    /// Replaces every chain with a fresh row built from `records`.
    pub fn rebuild(&mut self, records: &[CardRecord]) -> RebuildReport {
        self.teardown();
        let report = self.factory.spawn(&mut self.engine, records);
        let mut rebuilt = RebuildReport {
            skipped: report.skipped,
            failed: report.failed,
            ..RebuildReport::default()
        };
        for SpawnedChain { record, position, chain } in report.spawned {
            let id = ChainId(self.next_id);
            self.next_id += 1;
            let slot = ChainSlot {
                label: record.label(),
                record,
                position,
                chain,
                curve: CurveSampler::new(self.config.curve.clone()),
                drag: DragController::new(self.config.drag.clone()),
                hover: HoverState::default(),
                subscriptions: Subscriptions::default(),
                drag_ndc: None,
                previous: None,
            };
            self.chains.insert(id, slot);
            rebuilt.chains.push(id);
        }
        rebuilt
    }

    /// Parses a record feed and rebuilds from it.
    ///
    /// # Errors
    /// Returns [`RecordError`] when the document itself is unusable; bad
    /// elements are skipped.
    pub fn rebuild_from_json(&mut self, json: &str) -> Result<RebuildReport, RecordError> {
        let records = parse_records(json)?;
        Ok(self.rebuild(&records))
    }

    /// Ties `cleanup` to the lifetime of chain `id`.
    ///
    /// # Errors
    /// Returns [`ChainError::UnknownChain`] if the chain is gone; `cleanup`
    /// then runs immediately.
    pub fn subscribe(&mut self, id: ChainId, cleanup: impl FnOnce() + 'static) -> Result<(), ChainError> {
        let disposer = Disposer::new(cleanup);
        match self.chains.get_mut(&id) {
            Some(slot) => {
                slot.subscriptions.push(disposer);
                Ok(())
            }
            None => {
                disposer.dispose();
                Err(ChainError::UnknownChain(id))
            }
        }
    }

    /// Destroys one chain. Returns `false` if it was already gone.
    pub fn remove_chain(&mut self, id: ChainId) -> bool {
        let Some(mut slot) = self.chains.remove(&id) else {
            return false;
        };
        if self.capture.is_some_and(|(_, owner)| owner == id) {
            self.capture = None;
        }
        slot.release(&mut self.engine);
        true
    }

    /// Releases every chain, capture and pending event.
    pub fn teardown(&mut self) {
        if self.chains.is_empty() && self.capture.is_none() {
            return;
        }
        let count = self.chains.len();
        self.capture = None;
        self.queue.clear();
        for (_, mut slot) in std::mem::take(&mut self.chains) {
            slot.release(&mut self.engine);
        }
        tracing::info!("Tore down {count} chains");
    }

    /// Advances the scene by one render frame of `frame_dt` seconds.
    pub fn tick(&mut self, frame_dt: f32) -> FrameOutput {
        for event in self.queue.drain() {
            self.handle_event(event);
        }

        let steps = self.stepper.advance(frame_dt);
        let fixed_dt = self.stepper.fixed_dt();
        for _ in 0..steps {
            self.snapshot_transforms();
            self.write_drag_targets();
            self.engine.step(fixed_dt);
            self.stabilize();
        }

        #[allow(clippy::cast_precision_loss)]
        let lag_dt = match self.config.curve.lag_clock {
            LagClock::Frame if frame_dt.is_finite() => frame_dt.max(0.0),
            LagClock::Frame => 0.0,
            LagClock::Physics => steps as f32 * fixed_dt,
        };

        let alpha = self.stepper.alpha();
        let mut chains = Vec::with_capacity(self.chains.len());
        for (&id, slot) in &mut self.chains {
            let current = match slot.chain.current_transforms(&self.engine) {
                Ok(transforms) => transforms,
                Err(e) => {
                    tracing::warn!("Skipping {id} this frame: {e}");
                    continue;
                }
            };
            let transforms = match &slot.previous {
                Some(previous) if self.config.step.interpolate => current.interpolate(previous, alpha),
                _ => current,
            };
            let points = slot.curve.update(lag_dt, &transforms).to_vec();
            let bodies = transforms.to_array();
            chains.push(ChainFrame {
                id,
                key: slot.record.key().to_owned(),
                vertices: points.iter().copied().map(CurveVertex::from).collect(),
                points,
                transforms,
                instances: bodies.each_ref().map(BodyInstance::from),
                dragging: slot.drag.is_dragging(),
                hovered: slot.hover.hovered,
            });
        }

        FrameOutput {
            steps,
            chains,
            cursor: self.cursor(),
        }
    }

    fn handle_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { pointer, ndc } => self.pointer_down(pointer, ndc),
            PointerEvent::Move { pointer, ndc } => self.pointer_move(pointer, ndc),
            PointerEvent::Up { pointer, .. } => self.pointer_up(pointer),
        }
    }

    fn pointer_down(&mut self, pointer: PointerId, ndc: Vec2) {
        if self.capture.is_some() {
            return;
        }
        let Some((id, hit)) = self.pick(ndc) else {
            return;
        };
        let Some(slot) = self.chains.get_mut(&id) else {
            return;
        };
        match slot.drag.on_pointer_down(&mut self.engine, &slot.chain, hit, Some(pointer)) {
            Ok(()) => {
                slot.drag_ndc = Some(ndc);
                self.capture = Some((pointer, id));
            }
            Err(e) => tracing::warn!("Pointer down on {id} ignored: {e}"),
        }
    }

    fn pointer_move(&mut self, pointer: PointerId, ndc: Vec2) {
        if let Some((captured, id)) = self.capture {
            if captured == pointer {
                if let Some(slot) = self.chains.get_mut(&id) {
                    slot.drag_ndc = Some(ndc);
                }
            }
            return;
        }
        let hovered = self.pick(ndc).map(|(id, _)| id);
        for (&id, slot) in &mut self.chains {
            slot.hover.hovered = hovered == Some(id);
        }
    }

    fn pointer_up(&mut self, pointer: PointerId) {
        let Some((captured, id)) = self.capture else {
            return;
        };
        if captured != pointer {
            return;
        }
        self.capture = None;
        let Some(slot) = self.chains.get_mut(&id) else {
            return;
        };
        slot.drag_ndc = None;
        if let Err(e) = slot.drag.on_pointer_up(&mut self.engine, &slot.chain) {
            tracing::warn!("Pointer up on {id} failed: {e}");
        }
    }

    /// Nearest live card under the pointer, with the world hit point.
    fn pick(&self, ndc: Vec2) -> Option<(ChainId, Vec3)> {
        let ray = self.camera.ray(ndc);
        let half_extents = self.config.chain.card_half_extents;
        let mut nearest: Option<(ChainId, f32)> = None;
        for (&id, slot) in &self.chains {
            if !slot.chain.is_alive() {
                continue;
            }
            let Ok(card) = self.engine.body(slot.chain.card()) else {
                continue;
            };
            if let Some(distance) = intersect_box(&ray, card.position, card.rotation, half_extents) {
                let closer = match nearest {
                    Some((_, best)) => distance < best,
                    None => true,
                };
                if closer {
                    nearest = Some((id, distance));
                }
            }
        }
        nearest.map(|(id, distance)| (id, ray.at(distance)))
    }

    fn snapshot_transforms(&mut self) {
        for slot in self.chains.values_mut() {
            slot.previous = slot.chain.current_transforms(&self.engine).ok();
        }
    }

    fn write_drag_targets(&mut self) {
        for (&id, slot) in &mut self.chains {
            let Some(ndc) = slot.drag_ndc else {
                continue;
            };
            if let Err(e) = slot.drag.on_pointer_move(&mut self.engine, &slot.chain, &self.camera, ndc) {
                tracing::warn!("Drag target for {id} dropped: {e}");
            }
        }
    }

    fn stabilize(&mut self) {
        for (&id, slot) in &self.chains {
            if !slot.chain.is_alive() {
                continue;
            }
            if let Err(e) = self.stabilizer.apply(&mut self.engine, slot.chain.card()) {
                tracing::warn!("Stabilizing {id} failed: {e}");
            }
        }
    }
}

impl<E: PhysicsEngine> Drop for Scene<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str) -> CardRecord {
        CardRecord {
            identifier: String::new(),
            title: String::new(),
            locality: String::new(),
            size_value: None,
            created_at: None,
            updated_at: None,
            content_hash: hash.to_owned(),
            status: None,
        }
    }

    #[test]
    fn chain_ids_are_not_reused_across_rebuilds() {
        let mut scene = Scene::with_world(LanyardConfig::default(), Camera::new(800, 600));
        let first = scene.rebuild(&[record("a")]).chains;
        let second = scene.rebuild(&[record("b")]).chains;
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0], second[0]);
        assert!(scene.chain(first[0]).is_none());
    }

    #[test]
    fn subscribe_to_unknown_chain_runs_cleanup_now() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut scene = Scene::with_world(LanyardConfig::default(), Camera::new(800, 600));
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let result = scene.subscribe(ChainId(42), move || flag.set(true));
        assert_eq!(result, Err(ChainError::UnknownChain(ChainId(42))));
        assert!(ran.get());
    }

    #[test]
    fn pointer_up_without_capture_is_ignored() {
        let mut scene = Scene::with_world(LanyardConfig::default(), Camera::new(800, 600));
        scene.rebuild(&[record("a")]);
        scene.pointer_queue().push(PointerEvent::Up { pointer: 3, ndc: Vec2::ZERO });
        let frame = scene.tick(1.0 / 60.0);
        assert!(frame.chains.iter().all(|c| !c.dragging));
        assert_eq!(frame.cursor, CursorStyle::Default);
    }
}

use approx::assert_abs_diff_eq;
use std::cell::Cell;
use std::rc::Rc;

use lanyard::{
    Camera, CardRecord, ChainId, CursorStyle, LanyardConfig, PointerEvent, Scene, CHAIN_LEN, CURVE_SAMPLES,
};
use physics::{MotionMode, PhysicsEngine, Vec3, World, WorldConfig};

const FRAME: f32 = 1.0 / 60.0;

fn record(hash: &str) -> CardRecord {
    serde_json::from_value(serde_json::json!({
        "identifier": format!("deed-{hash}"),
        "title": format!("Lot {hash}"),
        "locality": "Springfield",
        "sizeValue": 420.0,
        "createdAt": "2024-03-01T12:00:00Z",
        "contentHash": hash,
    }))
    .unwrap()
}

fn scene() -> Scene {
    Scene::with_world(LanyardConfig::default(), Camera::new(1280, 720))
}

/// NDC of the card's centre for the current camera.
fn card_ndc(scene: &Scene, id: ChainId) -> glam::Vec2 {
    let card = scene.chain(id).unwrap().chain.card();
    let position = scene.engine().translation(card).unwrap();
    scene.camera().project(position).truncate()
}

fn card_mode(scene: &Scene, id: ChainId) -> MotionMode {
    let card = scene.chain(id).unwrap().chain.card();
    scene.engine().body(card).unwrap().mode
}

#[test]
fn three_records_hang_in_a_centred_row() {
    let mut scene = scene();
    let report = scene.rebuild(&[record("QmA"), record("QmB"), record("QmC")]);
    assert_eq!(report.chains.len(), 3);

    let xs: Vec<f32> = report
        .chains
        .iter()
        .map(|&id| scene.chain(id).unwrap().position.x)
        .collect();
    assert_eq!(xs, vec![-3.0, 0.0, 3.0]);
    assert_eq!(scene.engine().body_count(), 3 * CHAIN_LEN);
    assert_eq!(scene.engine().joint_count(), 3 * 4);
}

#[test]
fn empty_record_list_allocates_nothing() {
    let mut scene = scene();
    let report = scene.rebuild(&[]);
    assert!(report.chains.is_empty());
    assert_eq!(scene.engine().stats().created_bodies, 0);
    assert_eq!(scene.engine().stats().created_joints, 0);
    assert!(scene.tick(FRAME).chains.is_empty());
}

#[test]
fn invalid_records_are_skipped_without_shifting_the_row() -> anyhow::Result<()> {
    let mut scene = scene();
    let feed = r#"[
        {"contentHash": "QmA"},
        {"title": "no hash"},
        {"contentHash": "QmB"},
        "not a record"
    ]"#;
    let report = scene.rebuild_from_json(feed)?;
    assert_eq!(report.chains.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);

    let xs: Vec<f32> = report
        .chains
        .iter()
        .map(|&id| scene.chain(id).unwrap().position.x)
        .collect();
    assert_eq!(xs, vec![-1.5, 1.5]);
    Ok(())
}

#[test]
fn every_frame_emits_five_transforms_and_a_full_curve() {
    let mut scene = scene();
    scene.rebuild(&[record("QmA")]);
    for _ in 0..30 {
        let frame = scene.tick(FRAME);
        let chain = &frame.chains[0];
        assert_eq!(chain.points.len(), CURVE_SAMPLES);
        assert_eq!(chain.vertices.len(), CURVE_SAMPLES);
        assert_eq!(chain.transforms.to_array().len(), CHAIN_LEN);
        assert_eq!(chain.instances.len(), CHAIN_LEN);

        let first = chain.points[0];
        let last = chain.points[CURVE_SAMPLES - 1];
        assert_abs_diff_eq!(first, chain.transforms.j3.position, epsilon = 1e-4);
        assert_abs_diff_eq!(last, chain.transforms.anchor.position, epsilon = 1e-4);
    }
}

#[test]
fn card_hangs_below_its_anchor_after_settling() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    for _ in 0..240 {
        scene.tick(FRAME);
    }
    let frame = scene.tick(FRAME);
    let transforms = frame.chains[0].transforms;
    assert!(transforms.card.position.y < transforms.anchor.position.y - 2.0);
    assert_abs_diff_eq!(transforms.anchor.position, Vec3::new(0.0, 5.2, 0.0), epsilon = 1e-5);
    assert_eq!(card_mode(&scene, id), MotionMode::Dynamic);
}

#[test]
fn drag_switches_card_mode_and_back() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let queue = scene.pointer_queue();
    assert_eq!(card_mode(&scene, id), MotionMode::Dynamic);

    queue.push(PointerEvent::Down {
        pointer: 1,
        ndc: card_ndc(&scene, id),
    });
    let frame = scene.tick(FRAME);
    assert_eq!(card_mode(&scene, id), MotionMode::KinematicTarget);
    assert_eq!(scene.captured(), Some((1, id)));
    assert!(frame.chains[0].dragging);
    assert_eq!(frame.cursor, CursorStyle::Grabbing);

    let start = frame.chains[0].transforms.card.position;
    queue.push(PointerEvent::Move {
        pointer: 1,
        ndc: glam::Vec2::new(0.3, 0.8),
    });
    for _ in 0..20 {
        scene.tick(FRAME);
    }
    assert_eq!(card_mode(&scene, id), MotionMode::KinematicTarget);
    let moved = scene.tick(FRAME).chains[0].transforms.card.position;
    assert!((moved - start).length() > 1.0, "card should follow the pointer");

    queue.push(PointerEvent::Up {
        pointer: 1,
        ndc: glam::Vec2::new(0.3, 0.8),
    });
    let frame = scene.tick(FRAME);
    assert_eq!(card_mode(&scene, id), MotionMode::Dynamic);
    assert_eq!(scene.captured(), None);
    assert!(!frame.chains[0].dragging);
}

#[test]
fn pointer_move_without_drag_only_hovers() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let queue = scene.pointer_queue();

    queue.push(PointerEvent::Move {
        pointer: 1,
        ndc: card_ndc(&scene, id),
    });
    let frame = scene.tick(0.0);
    assert!(frame.chains[0].hovered);
    assert_eq!(frame.cursor, CursorStyle::Grab);
    assert_eq!(card_mode(&scene, id), MotionMode::Dynamic);

    queue.push(PointerEvent::Move {
        pointer: 1,
        ndc: glam::Vec2::new(-0.95, -0.95),
    });
    let frame = scene.tick(0.0);
    assert!(!frame.chains[0].hovered);
    assert_eq!(frame.cursor, CursorStyle::Default);
}

#[test]
fn events_for_a_removed_chain_are_no_ops() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let queue = scene.pointer_queue();
    queue.push(PointerEvent::Down {
        pointer: 7,
        ndc: card_ndc(&scene, id),
    });
    scene.tick(FRAME);
    assert_eq!(scene.captured(), Some((7, id)));

    assert!(scene.remove_chain(id));
    assert_eq!(scene.captured(), None);
    queue.push(PointerEvent::Move {
        pointer: 7,
        ndc: glam::Vec2::ZERO,
    });
    queue.push(PointerEvent::Up {
        pointer: 7,
        ndc: glam::Vec2::ZERO,
    });
    let frame = scene.tick(FRAME);
    assert!(frame.chains.is_empty());
    assert!(!scene.remove_chain(id));
}

#[test]
fn destroy_releases_every_handle_exactly_once() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let stats = scene.engine().stats();
    assert_eq!((stats.created_bodies, stats.created_joints), (5, 4));

    assert!(scene.remove_chain(id));
    scene.teardown();
    scene.teardown();

    let stats = scene.engine().stats();
    assert_eq!((stats.live_bodies, stats.live_joints), (0, 0));
    assert_eq!((stats.released_bodies, stats.released_joints), (5, 4));
}

#[test]
fn rebuild_tears_down_the_previous_row() {
    let mut scene = scene();
    scene.rebuild(&[record("QmA"), record("QmB")]);
    scene.rebuild(&[record("QmC")]);

    let stats = scene.engine().stats();
    assert_eq!(stats.live_bodies, CHAIN_LEN);
    assert_eq!(stats.released_bodies, 2 * CHAIN_LEN);
    assert_eq!(scene.len(), 1);
}

#[test]
fn allocation_failure_is_isolated_to_one_chain() {
    let config = LanyardConfig {
        world: WorldConfig {
            max_bodies: Some(7),
            ..WorldConfig::default()
        },
        ..LanyardConfig::default()
    };
    let mut scene = Scene::with_world(config, Camera::new(1280, 720));
    let report = scene.rebuild(&[record("QmA"), record("QmB"), record("QmC")]);

    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(scene.engine().body_count(), CHAIN_LEN);
    assert_eq!(scene.engine().joint_count(), 4);
    assert_eq!(scene.tick(FRAME).chains.len(), 1);
}

#[test]
fn subscriptions_are_disposed_once_on_teardown() {
    let runs = Rc::new(Cell::new(0));
    {
        let mut scene = scene();
        let id = scene.rebuild(&[record("QmA")]).chains[0];
        let counter = Rc::clone(&runs);
        scene.subscribe(id, move || counter.set(counter.get() + 1)).unwrap();

        scene.rebuild(&[record("QmB")]);
        assert_eq!(runs.get(), 1);
    }
    assert_eq!(runs.get(), 1);
}

#[test]
fn dropping_the_scene_releases_its_chains() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    scene.subscribe(id, move || counter.set(counter.get() + 1)).unwrap();
    drop(scene);
    assert_eq!(runs.get(), 1);
}

#[test]
fn frames_take_zero_or_several_physics_steps() {
    let mut scene = scene();
    scene.rebuild(&[record("QmA")]);
    assert_eq!(scene.tick(0.001).steps, 0);
    assert_eq!(scene.tick(0.04).steps, 2);
    assert_eq!(scene.tick(10.0).steps, 5);
    assert_eq!(scene.tick(f32::NAN).steps, 0);
}

#[test]
fn scene_accepts_an_explicit_engine() {
    let world = World::new(WorldConfig::default());
    let mut scene: Scene<World> = Scene::new(world, Camera::new(640, 480), LanyardConfig::default());
    scene.rebuild(&[record("QmA")]);
    assert_eq!(scene.tick(FRAME).chains.len(), 1);
}

#[test]
fn pointer_down_wakes_a_sleeping_chain() {
    let mut config = LanyardConfig::default();
    config.chain.can_sleep = true;
    let mut scene = Scene::with_world(config, Camera::new(1280, 720));
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    for _ in 0..1200 {
        scene.tick(FRAME);
    }
    let bodies = *scene.chain(id).unwrap().chain.bodies();
    let asleep = |scene: &Scene| -> Vec<bool> {
        bodies
            .iter()
            .map(|&body| scene.engine().body(body).unwrap().sleeping)
            .collect()
    };
    assert!(asleep(&scene).contains(&true), "chain never settled: {:?}", asleep(&scene));

    scene.pointer_queue().push(PointerEvent::Down {
        pointer: 1,
        ndc: card_ndc(&scene, id),
    });
    scene.tick(FRAME);
    assert_eq!(scene.captured(), Some((1, id)));
    assert_eq!(asleep(&scene), vec![false; CHAIN_LEN]);
}

#[test]
fn frame_between_steps_blends_poses() {
    let mut scene = scene();
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let card = scene.chain(id).unwrap().chain.card();
    let fixed_dt = scene.config().step.fixed_dt;
    for _ in 0..10 {
        scene.tick(fixed_dt);
    }

    // No time left over, so the frame shows the pose before the last step.
    let before_step = scene.tick(fixed_dt).chains[0].transforms.card.position;
    let after_step = scene.engine().translation(card).unwrap();
    assert!((after_step - before_step).length() > 1e-3, "card should still be swinging");

    let frame = scene.tick(fixed_dt * 0.5);
    assert_eq!(frame.steps, 0);
    assert_eq!(scene.engine().translation(card).unwrap(), after_step);
    assert_abs_diff_eq!(
        frame.chains[0].transforms.card.position,
        (before_step + after_step) * 0.5,
        epsilon = 1e-4
    );
    assert_abs_diff_eq!(frame.chains[0].points[0], frame.chains[0].transforms.j3.position, epsilon = 1e-4);
}

#[test]
fn interpolation_can_be_switched_off() {
    let mut config = LanyardConfig::default();
    config.step.interpolate = false;
    let mut scene = Scene::with_world(config, Camera::new(1280, 720));
    let id = scene.rebuild(&[record("QmA")]).chains[0];
    let card = scene.chain(id).unwrap().chain.card();
    for _ in 0..10 {
        scene.tick(FRAME);
    }
    let frame = scene.tick(FRAME * 0.5);
    assert_eq!(frame.chains[0].transforms.card.position, scene.engine().translation(card).unwrap());
}

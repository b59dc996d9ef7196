use approx::assert_abs_diff_eq;
use physics::{
    BodyDesc, JointDesc, MotionMode, PhysicsEngine, PhysicsError, Quat, Shape, Vec3, World, WorldConfig,
};

fn pendulum(world: &mut World) -> (physics::BodyHandle, physics::BodyHandle) {
    let anchor = world
        .create_body(&BodyDesc::new(MotionMode::Fixed, Vec3::new(0.0, 4.0, 0.0)))
        .unwrap();
    let bob = world
        .create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::new(1.0, 4.0, 0.0)).with_damping(2.0, 2.0))
        .unwrap();
    world
        .create_joint(&JointDesc::rope(anchor, bob, [Vec3::ZERO; 2], 1.0))
        .unwrap();
    (anchor, bob)
}

#[test]
fn rope_never_exceeds_its_length() {
    let mut world = World::default();
    let (anchor, bob) = pendulum(&mut world);
    for _ in 0..240 {
        world.step(1.0 / 60.0);
        let distance = (world.translation(bob).unwrap() - world.translation(anchor).unwrap()).length();
        assert!(distance <= 1.0 + 1e-3, "rope stretched to {distance}");
    }
    let bob_pos = world.translation(bob).unwrap();
    assert!(bob_pos.y < 3.2, "bob should hang below the anchor, got {bob_pos:?}");
    assert_eq!(world.translation(anchor).unwrap(), Vec3::new(0.0, 4.0, 0.0));
}

#[test]
fn spherical_joint_keeps_offset_anchor_attached() {
    let mut world = World::default();
    let link = world
        .create_body(&BodyDesc::new(MotionMode::Fixed, Vec3::ZERO))
        .unwrap();
    let card = world
        .create_body(
            &BodyDesc::new(MotionMode::Dynamic, Vec3::new(2.0, 0.0, 0.0))
                .with_shape(Shape::Cuboid {
                    half_extents: Vec3::new(0.8, 1.125, 0.01),
                })
                .with_damping(2.0, 2.0),
        )
        .unwrap();
    let card_anchor = Vec3::new(0.0, 1.45, 0.0);
    world
        .create_joint(&JointDesc::spherical(link, card, [Vec3::ZERO, card_anchor]))
        .unwrap();
    world.run(1.0 / 60.0, 180);

    let state = world.body(card).unwrap();
    let anchor_world = state.position + state.rotation * card_anchor;
    assert!(anchor_world.length() < 0.05, "anchor drifted to {anchor_world:?}");
    assert!(state.position.y < -0.5, "card should hang under the joint");
}

#[test]
fn destroyed_handles_are_stale_and_counted_once() -> anyhow::Result<()> {
    let mut world = World::default();
    let a = world.create_body(&BodyDesc::new(MotionMode::Fixed, Vec3::ZERO))?;
    let b = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::X))?;
    let joint = world.create_joint(&JointDesc::rope(a, b, [Vec3::ZERO; 2], 1.0))?;
    assert_eq!((world.body_count(), world.joint_count()), (2, 1));

    world.destroy_joint(joint)?;
    world.destroy_body(b)?;
    world.destroy_body(a)?;
    assert_eq!(world.destroy_body(a), Err(PhysicsError::StaleBody(a)));
    assert_eq!(world.destroy_joint(joint), Err(PhysicsError::StaleJoint(joint)));

    let stats = world.stats();
    assert_eq!((stats.live_bodies, stats.live_joints), (0, 0));
    assert_eq!((stats.released_bodies, stats.released_joints), (2, 1));

    // A reused slot must not answer for the old handle.
    let c = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::Y))?;
    assert!(world.body(c).is_ok());
    assert!(matches!(world.body(b), Err(PhysicsError::StaleBody(_))));
    Ok(())
}

#[test]
fn capacity_limits_refuse_allocation() {
    let mut world = World::new(WorldConfig {
        max_bodies: Some(2),
        max_joints: Some(0),
        ..WorldConfig::default()
    });
    let a = world.create_body(&BodyDesc::new(MotionMode::Fixed, Vec3::ZERO)).unwrap();
    let b = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::X)).unwrap();
    assert_eq!(
        world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::Y)),
        Err(PhysicsError::BodyCapacity { limit: 2 })
    );
    assert_eq!(
        world.create_joint(&JointDesc::rope(a, b, [Vec3::ZERO; 2], 1.0)),
        Err(PhysicsError::JointCapacity { limit: 0 })
    );
}

#[test]
fn invalid_descriptions_are_rejected() {
    let mut world = World::default();
    let bad_mass = BodyDesc::new(MotionMode::Dynamic, Vec3::ZERO).with_mass(0.0);
    assert!(matches!(
        world.create_body(&bad_mass),
        Err(PhysicsError::InvalidDescription(_))
    ));
    let a = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::ZERO)).unwrap();
    assert_eq!(
        world.create_joint(&JointDesc::spherical(a, a, [Vec3::ZERO; 2])),
        Err(PhysicsError::SelfJoint(a))
    );
    assert_eq!(world.body_count(), 1);
}

#[test]
fn kinematic_target_is_reached_and_held() -> anyhow::Result<()> {
    let mut world = World::default();
    let body = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::ZERO))?;
    assert_eq!(
        world.set_kinematic_target(body, Vec3::X),
        Err(PhysicsError::NotKinematic(body))
    );

    world.set_motion_mode(body, MotionMode::KinematicTarget)?;
    world.set_kinematic_target(body, Vec3::new(0.5, 2.0, 0.0))?;
    world.step(1.0 / 60.0);
    let state = world.body(body)?;
    assert_abs_diff_eq!(state.position, Vec3::new(0.5, 2.0, 0.0), epsilon = 1e-5);
    assert!(state.linear_velocity.y > 0.0);

    world.run(1.0 / 60.0, 10);
    assert_abs_diff_eq!(world.translation(body)?, Vec3::new(0.5, 2.0, 0.0), epsilon = 1e-5);
    Ok(())
}

#[test]
fn returning_to_dynamic_resumes_from_kinematic_pose() -> anyhow::Result<()> {
    let mut world = World::default();
    let body = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::ZERO))?;
    world.set_motion_mode(body, MotionMode::KinematicTarget)?;
    world.set_kinematic_target(body, Vec3::new(0.0, 3.0, 0.0))?;
    world.step(1.0 / 60.0);
    world.set_motion_mode(body, MotionMode::Dynamic)?;
    world.step(1.0 / 60.0);
    let state = world.body(body)?;
    assert_eq!(state.mode, MotionMode::Dynamic);
    // Integration continues from the kinematic pose, carrying its velocity.
    assert!(state.position.y > 3.0);
    assert!(state.linear_velocity.y > 0.0);
    Ok(())
}

#[test]
fn resting_body_sleeps_and_wakes_on_request() -> anyhow::Result<()> {
    let mut world = World::new(WorldConfig {
        gravity: Vec3::ZERO,
        ..WorldConfig::default()
    });
    let body = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::ZERO).with_can_sleep(true))?;
    world.run(1.0 / 60.0, 60);
    assert!(world.body(body)?.sleeping);

    world.wake(body)?;
    assert!(!world.body(body)?.sleeping);
    Ok(())
}

#[test]
fn angular_velocity_spins_dynamic_bodies_only() -> anyhow::Result<()> {
    let mut world = World::new(WorldConfig {
        gravity: Vec3::ZERO,
        ..WorldConfig::default()
    });
    let spinner = world.create_body(&BodyDesc::new(MotionMode::Dynamic, Vec3::ZERO).with_can_sleep(false))?;
    let fixed = world.create_body(&BodyDesc::new(MotionMode::Fixed, Vec3::X))?;
    let held = world.create_body(&BodyDesc::new(MotionMode::KinematicTarget, Vec3::Y))?;
    for body in [spinner, fixed, held] {
        world.set_angular_velocity(body, Vec3::new(0.0, 1.0, 0.0))?;
    }
    world.step(1.0 / 60.0);
    assert!(world.rotation(spinner)?.y > 0.0);
    assert_eq!(world.rotation(fixed)?, Quat::IDENTITY);
    assert_eq!(world.angular_velocity(held)?, Vec3::ZERO);
    assert_eq!(world.rotation(held)?, Quat::IDENTITY);
    Ok(())
}

#[test]
fn non_positive_dt_is_ignored() {
    let mut world = World::default();
    let (_, bob) = pendulum(&mut world);
    let before = world.translation(bob).unwrap();
    world.step(0.0);
    world.step(-1.0);
    world.step(f32::NAN);
    assert_eq!(world.translation(bob).unwrap(), before);
    assert_eq!(world.elapsed(), 0.0);
}

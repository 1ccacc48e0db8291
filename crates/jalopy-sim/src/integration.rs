//! End-to-end integration tests for the damage, hinge and seat flows.
//!
//! These tests exercise the complete pipeline through the built scene:
//! panel state transitions with their rapier-side bodies and joints,
//! health accounting, tear-off, ray self-exclusion, the wreck event and
//! seat boarding.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::prelude::*;

    use jalopy_physics::context::PhysicsContext;
    use jalopy_physics::raycast::WheelRaycaster;
    use jalopy_spec::{presets, PanelKind, VehicleSpec};
    use jalopy_vehicle::components::{DriverControls, Vehicle};
    use jalopy_vehicle::damage::{
        DamageFlags, DamageInfo, DamageKind, FrameState, PendingDamage, VehicleDamage,
    };
    use jalopy_vehicle::events::VehicleWrecked;
    use jalopy_vehicle::spawn::{board_occupant, vacate_seat};
    use rapier3d::prelude::{ColliderBuilder, JointAxis, RigidBodyBuilder};

    use crate::builder::SceneBuilder;

    const SPAWN: Vec3 = Vec3::new(0.0, 0.66, 0.0);

    fn scene_with(spec: VehicleSpec) -> (App, Entity) {
        let scene = SceneBuilder::new()
            .with_ground_plane()
            .with_vehicle(Arc::new(spec), SPAWN)
            .unwrap()
            .build();
        let car = scene.vehicles[0];
        (scene.app, car)
    }

    fn scene() -> (App, Entity) {
        scene_with(presets::hatchback())
    }

    /// Run `f` with simultaneous access to the physics context and the
    /// vehicle's damage state.
    fn with_parts<R>(
        app: &mut App,
        car: Entity,
        f: impl FnOnce(&mut PhysicsContext, &Vehicle, &mut VehicleDamage) -> R,
    ) -> R {
        app.world_mut()
            .resource_scope(|world, mut ctx: Mut<PhysicsContext>| {
                let mut query = world.query::<(&Vehicle, &mut VehicleDamage)>();
                let (vehicle, mut damage) = query.get_mut(world, car).unwrap();
                f(&mut ctx, vehicle, &mut damage)
            })
    }

    fn physics_counts(app: &App) -> (usize, usize) {
        let ctx = app.world().resource::<PhysicsContext>();
        (ctx.bodies.len(), ctx.impulse_joints.len())
    }

    fn door_index(app: &App, car: Entity) -> usize {
        app.world()
            .get::<Vehicle>(car)
            .unwrap()
            .spec()
            .panel_index(PanelKind::DoorFrontLeft)
            .unwrap()
    }

    fn windscreen_hit(magnitude: f32) -> DamageInfo {
        DamageInfo {
            source: SPAWN + Vec3::new(0.0, 0.5, -3.0),
            position: SPAWN + Vec3::new(0.0, 0.5, -0.8),
            magnitude,
            kind: DamageKind::Collision,
        }
    }

    // -------------------------------------------------------------------
    // Hinge lifecycle
    // -------------------------------------------------------------------

    #[test]
    fn break_and_restore_pair_create_with_destroy() {
        let (mut app, car) = scene();
        let door = door_index(&app, car);
        let before = physics_counts(&app);

        with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Broken)
                .unwrap();
            assert_eq!(damage.hinge_count(), 1);
        });
        let broken = physics_counts(&app);
        assert_eq!(broken, (before.0 + 1, before.1 + 1));

        with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Ok)
                .unwrap();
            assert_eq!(damage.hinge_count(), 0);
            assert_eq!(damage.frame_state(door).unwrap(), FrameState::Ok);
        });
        assert_eq!(physics_counts(&app), before);
    }

    #[test]
    fn repeated_state_requests_are_idempotent() {
        let (mut app, car) = scene();
        let door = door_index(&app, car);

        let first_body = with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Broken)
                .unwrap();
            damage.hinged_entries().next().unwrap().1.body()
        });
        let counts = physics_counts(&app);

        // Asking for the state it is already in must not rebuild the hinge.
        let second_body = with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Broken)
                .unwrap();
            damage.hinged_entries().next().unwrap().1.body()
        });
        assert_eq!(second_body, first_body);
        assert_eq!(physics_counts(&app), counts);

        with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Ok)
                .unwrap();
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Ok)
                .unwrap();
            assert_eq!(damage.hinge_count(), 0);
        });
    }

    #[test]
    fn locking_a_broken_door_pins_it_without_reattaching() {
        let (mut app, car) = scene();
        let door = door_index(&app, car);

        let joint = with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Broken)
                .unwrap();
            damage.set_hinge_locked(ctx, door, true).unwrap();
            assert_eq!(damage.frame_state(door).unwrap(), FrameState::Broken);
            damage.hinged_entries().next().unwrap().1.joint()
        });

        {
            let ctx = app.world().resource::<PhysicsContext>();
            let data = &ctx.impulse_joints.get(joint).unwrap().data;
            let limits = data.limits(JointAxis::AngX).unwrap();
            assert!(limits.min.abs() < 1e-6 && limits.max.abs() < 1e-6);
        }

        // A locked door must not drift open while the sim runs.
        let closed = {
            let ctx = app.world().resource::<PhysicsContext>();
            *ctx.body(door_body(&app, car)).unwrap().position()
        };
        for _ in 0..120 {
            app.update();
        }
        {
            let ctx = app.world().resource::<PhysicsContext>();
            let now = ctx.body(door_body(&app, car)).unwrap().position();
            let drift = (now.translation.vector - closed.translation.vector).norm();
            assert!(drift < 0.25, "locked door drifted {drift}");
        }

        // Unlocking restores the spec swing range.
        with_parts(&mut app, car, |ctx, _vehicle, damage| {
            damage.set_hinge_locked(ctx, door, false).unwrap();
        });
        let ctx = app.world().resource::<PhysicsContext>();
        let data = &ctx.impulse_joints.get(joint).unwrap().data;
        let limits = data.limits(JointAxis::AngX).unwrap();
        assert!((limits.max - 1.4).abs() < 1e-6);
    }

    fn door_body(app: &App, car: Entity) -> rapier3d::prelude::RigidBodyHandle {
        let damage = app.world().get::<VehicleDamage>(car).unwrap();
        damage.hinged_entries().next().unwrap().1.body()
    }

    #[test]
    fn heavy_impact_tears_a_door_loose_and_repair_reattaches() {
        let (mut app, car) = scene();
        let door = door_index(&app, car);
        let before = physics_counts(&app);

        // Break threshold is 75; one 80-unit side impact at the door zone.
        let hit = DamageInfo {
            source: SPAWN + Vec3::new(-3.0, 0.1, -0.45),
            position: SPAWN + Vec3::new(-0.92, 0.1, -0.45),
            magnitude: 80.0,
            kind: DamageKind::Collision,
        };
        with_parts(&mut app, car, |ctx, vehicle, damage| {
            let destroyed = damage.take_damage(ctx, vehicle, &hit).unwrap();
            assert!(!destroyed);
            assert_eq!(damage.frame_state(door).unwrap(), FrameState::Broken);
            assert_eq!(damage.hinge_count(), 1);

            damage.set_hinge_locked(ctx, door, true).unwrap();
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Ok)
                .unwrap();
            assert_eq!(damage.hinge_count(), 0);
            assert_eq!(damage.frame_state(door).unwrap(), FrameState::Ok);
        });
        assert_eq!(physics_counts(&app), before);

        let damage = app.world().get::<VehicleDamage>(car).unwrap();
        assert!(!damage.flags().contains(DamageFlags::DOOR_FRONT_LEFT));
    }

    // -------------------------------------------------------------------
    // Health and flags
    // -------------------------------------------------------------------

    #[test]
    fn windscreen_hits_floor_health_at_zero_with_one_destroy() {
        let mut spec = presets::hatchback();
        spec.handling.max_health = 100.0;
        let (mut app, car) = scene_with(spec);

        let results: Vec<(bool, f32)> = (0..4)
            .map(|_| {
                with_parts(&mut app, car, |ctx, vehicle, damage| {
                    let destroyed = damage
                        .take_damage(ctx, vehicle, &windscreen_hit(40.0))
                        .unwrap();
                    (destroyed, damage.health())
                })
            })
            .collect();

        assert_eq!(results[0], (false, 60.0));
        assert_eq!(results[1], (false, 20.0));
        // The third hit floors at zero, never −20, and is the only one
        // reporting destruction.
        assert_eq!(results[2], (true, 0.0));
        assert_eq!(results[3], (false, 0.0));

        let damage = app.world().get::<VehicleDamage>(car).unwrap();
        assert!(damage.flags().contains(DamageFlags::WINDSCREEN));
        assert!(damage.is_wrecked());
    }

    #[test]
    fn sub_threshold_damage_changes_no_flag() {
        let (mut app, car) = scene();

        with_parts(&mut app, car, |ctx, vehicle, damage| {
            let destroyed = damage
                .take_damage(ctx, vehicle, &windscreen_hit(10.0))
                .unwrap();
            assert!(!destroyed);
        });

        let damage = app.world().get::<VehicleDamage>(car).unwrap();
        assert!(damage.flags().is_empty());
        assert!((damage.health() - 990.0).abs() < 1e-3);
    }

    #[test]
    fn tear_off_destroys_the_panel_body_for_good() {
        let (mut app, car) = scene();
        let door = door_index(&app, car);
        let before = physics_counts(&app);

        with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage
                .set_frame_state(ctx, vehicle, door, FrameState::Broken)
                .unwrap();
            damage.tear_off(ctx, vehicle, door).unwrap();
            assert_eq!(damage.hinge_count(), 0);
            // Severed still reads Broken from the outside.
            assert_eq!(damage.frame_state(door).unwrap(), FrameState::Broken);
            // Idempotent.
            damage.tear_off(ctx, vehicle, door).unwrap();
        });
        assert_eq!(physics_counts(&app), before);

        // Tearing a pristine panel off skips the hinged stage entirely.
        let bonnet = app
            .world()
            .get::<Vehicle>(car)
            .unwrap()
            .spec()
            .panel_index(PanelKind::Bonnet)
            .unwrap();
        with_parts(&mut app, car, |ctx, vehicle, damage| {
            damage.tear_off(ctx, vehicle, bonnet).unwrap();
            assert_eq!(damage.frame_state(bonnet).unwrap(), FrameState::Broken);
        });
        assert_eq!(physics_counts(&app), before);

        let damage = app.world().get::<VehicleDamage>(car).unwrap();
        assert!(damage
            .flags()
            .contains(DamageFlags::DOOR_FRONT_LEFT | DamageFlags::BONNET));
    }

    // -------------------------------------------------------------------
    // Raycast self-exclusion
    // -------------------------------------------------------------------

    #[test]
    fn ray_through_own_hull_hits_nothing() {
        let scene = SceneBuilder::new()
            .with_vehicle(Arc::new(presets::hatchback()), SPAWN)
            .unwrap()
            .build();
        let mut app = scene.app;
        let car = scene.vehicles[0];
        let chassis = app.world().get::<Vehicle>(car).unwrap().chassis();

        let from = SPAWN + Vec3::Y * 2.0;
        let to = SPAWN - Vec3::Y * 2.0;

        let mut ctx = app.world_mut().resource_mut::<PhysicsContext>();
        ctx.refresh_queries();
        let caster = WheelRaycaster::new(chassis);
        assert!(caster.cast(&ctx, from, to).is_none());

        // The same ray with a second body in its path reports that body.
        let slab = ctx.insert_body(
            RigidBodyBuilder::fixed()
                .translation(nalgebra::vector![0.0, -0.6, 0.0])
                .build(),
        );
        ctx.insert_collider(ColliderBuilder::cuboid(5.0, 0.1, 5.0).build(), slab);
        ctx.refresh_queries();

        let hit = caster.cast(&ctx, from, to).unwrap();
        assert_eq!(hit.body, Some(slab));
    }

    // -------------------------------------------------------------------
    // Wreck event and drive gating
    // -------------------------------------------------------------------

    #[test]
    fn queued_overkill_wrecks_once_and_kills_the_engine() {
        let (mut app, car) = scene();

        let hit = windscreen_hit(600.0);
        {
            let mut pending = app.world_mut().get_mut::<PendingDamage>(car).unwrap();
            pending.push(hit);
            pending.push(hit);
        }
        app.update();

        let wrecks: Vec<VehicleWrecked> = app
            .world_mut()
            .resource_mut::<Events<VehicleWrecked>>()
            .drain()
            .collect();
        assert_eq!(wrecks, vec![VehicleWrecked { vehicle: car }]);

        // Full throttle on a wreck goes nowhere.
        app.world_mut()
            .get_mut::<DriverControls>(car)
            .unwrap()
            .set_throttle(1.0);
        for _ in 0..60 {
            app.update();
        }
        let vehicle = app.world().get::<Vehicle>(car).unwrap();
        let ctx = app.world().resource::<PhysicsContext>();
        let v = ctx.body(vehicle.chassis()).unwrap().linvel();
        assert!(v.z.abs() < 0.1, "wreck still drives: {v}");
    }

    // -------------------------------------------------------------------
    // Seats
    // -------------------------------------------------------------------

    #[test]
    fn boarded_rider_follows_the_seat() {
        let (mut app, car) = scene();
        let rider = app.world_mut().spawn(Transform::default()).id();

        board_occupant(app.world_mut(), car, 0, rider).unwrap();
        app.update();

        let vehicle_pos = {
            let vehicle = app.world().get::<Vehicle>(car).unwrap();
            let ctx = app.world().resource::<PhysicsContext>();
            let t = ctx.body(vehicle.chassis()).unwrap().translation();
            Vec3::new(t.x, t.y, t.z)
        };
        let rider_pos = app.world().get::<Transform>(rider).unwrap().translation;
        // Seat 0 sits at (−0.35, 0.05, −0.2) in chassis space.
        assert!((rider_pos - (vehicle_pos + Vec3::new(-0.35, 0.05, -0.2))).length() < 1e-3);

        let out = vacate_seat(app.world_mut(), car, 0).unwrap();
        assert_eq!(out, Some(rider));
    }
}

//! Headless driving smoke tests.
//!
//! Exercises the full stack (core, physics, vehicle plugins) with no
//! window or renderer: suspension settling, throttle, braking, steering
//! and buoyancy over many frames.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::prelude::*;

    use jalopy_physics::context::PhysicsContext;
    use jalopy_spec::presets;
    use jalopy_vehicle::components::{DriverControls, Vehicle, WheelState};

    use crate::builder::SceneBuilder;

    const SPAWN: Vec3 = Vec3::new(0.0, 0.66, 0.0);

    fn driving_scene() -> (App, Entity) {
        let scene = SceneBuilder::new()
            .with_ground_plane()
            .with_vehicle(Arc::new(presets::hatchback()), SPAWN)
            .unwrap()
            .build();
        let car = scene.vehicles[0];
        (scene.app, car)
    }

    fn chassis_height(app: &App, car: Entity) -> f32 {
        let vehicle = app.world().get::<Vehicle>(car).unwrap();
        let ctx = app.world().resource::<PhysicsContext>();
        ctx.body(vehicle.chassis()).unwrap().translation().y
    }

    fn chassis_velocity(app: &App, car: Entity) -> Vec3 {
        let vehicle = app.world().get::<Vehicle>(car).unwrap();
        let ctx = app.world().resource::<PhysicsContext>();
        let v = ctx.body(vehicle.chassis()).unwrap().linvel();
        Vec3::new(v.x, v.y, v.z)
    }

    fn set_controls(app: &mut App, car: Entity, f: impl FnOnce(&mut DriverControls)) {
        let mut controls = app.world_mut().get_mut::<DriverControls>(car).unwrap();
        f(&mut controls);
    }

    // -------------------------------------------------------------------
    // Suspension
    // -------------------------------------------------------------------

    #[test]
    fn suspension_holds_the_car_above_ground() {
        let (mut app, car) = driving_scene();

        let mut min_height = f32::MAX;
        for _ in 0..300 {
            app.update();
            min_height = min_height.min(chassis_height(&app, car));
        }

        // Five simulated seconds of settling: the springs never let the
        // hull reach the slab and the car ends up at ride height.
        assert!(min_height > 0.5, "chassis sank to {min_height}");
        let final_height = chassis_height(&app, car);
        assert!(
            (0.55..0.75).contains(&final_height),
            "expected ride height, got {final_height}"
        );
        let wheels = app.world().get::<WheelState>(car).unwrap();
        assert_eq!(wheels.grounded_count(), 4);
    }

    // -------------------------------------------------------------------
    // Drive / brake / steer
    // -------------------------------------------------------------------

    #[test]
    fn throttle_accelerates_then_brake_stops() {
        let (mut app, car) = driving_scene();

        set_controls(&mut app, car, |c| c.set_throttle(1.0));
        for _ in 0..120 {
            app.update();
        }
        let forward = -chassis_velocity(&app, car).z;
        assert!(forward > 2.0, "expected forward speed, got {forward}");

        set_controls(&mut app, car, |c| {
            c.set_throttle(0.0);
            c.set_brake(1.0);
        });
        for _ in 0..300 {
            app.update();
        }
        let speed = chassis_velocity(&app, car).length();
        assert!(speed < 0.5, "brake failed to stop the car: {speed}");
    }

    #[test]
    fn steering_curves_the_path() {
        let (mut app, car) = driving_scene();

        set_controls(&mut app, car, |c| {
            c.set_throttle(1.0);
            c.set_steering(0.5);
        });
        for _ in 0..180 {
            app.update();
        }

        let vehicle = app.world().get::<Vehicle>(car).unwrap();
        let ctx = app.world().resource::<PhysicsContext>();
        let position = ctx.body(vehicle.chassis()).unwrap().translation();
        // Positive steering swings the nose toward −x.
        assert!(position.x < -0.1, "car did not turn: x = {}", position.x);
        assert!(position.z < -1.0, "car did not move: z = {}", position.z);
    }

    #[test]
    fn plugins_alone_drive_without_the_scene_builder() {
        use jalopy_test_utils::{
            SPAWN_HEIGHT, full_test_app, spawn_ground_plane, spawn_test_vehicle,
        };

        let mut app = full_test_app();
        spawn_ground_plane(app.world_mut());
        let car = spawn_test_vehicle(app.world_mut(), Vec3::new(0.0, SPAWN_HEIGHT, 0.0));

        set_controls(&mut app, car, |c| c.set_throttle(1.0));
        for _ in 0..120 {
            app.update();
        }

        let forward = -chassis_velocity(&app, car).z;
        assert!(forward > 2.0, "expected forward speed, got {forward}");
    }

    // -------------------------------------------------------------------
    // Buoyancy
    // -------------------------------------------------------------------

    #[test]
    fn flooded_world_floats_the_car() {
        let scene = SceneBuilder::new()
            .with_ground_plane()
            .with_water_level(10.0)
            .with_vehicle(Arc::new(presets::hatchback()), SPAWN)
            .unwrap()
            .build();
        let mut app = scene.app;
        let car = scene.vehicles[0];

        for _ in 0..60 {
            app.update();
        }

        let height = chassis_height(&app, car);
        assert!(height > 2.0, "submerged car failed to rise: {height}");
    }
}

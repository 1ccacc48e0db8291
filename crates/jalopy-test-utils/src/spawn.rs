//! Entity spawn helpers for tests.

use std::sync::Arc;

use bevy::prelude::*;
use rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder};

use jalopy_physics::components::{GroundPlane, PhysicsBody};
use jalopy_physics::context::PhysicsContext;
use jalopy_spec::{presets, VehicleSpec};
use jalopy_vehicle::components::Livery;
use jalopy_vehicle::spawn::spawn_vehicle;

/// Spawn height at which the hatchback's suspension starts near its
/// settled ride height.
pub const SPAWN_HEIGHT: f32 = 0.66;

/// The reference spec used across the test suites.
pub fn test_spec() -> Arc<VehicleSpec> {
    Arc::new(presets::hatchback())
}

/// Spawn a large fixed ground slab whose top surface is `y = 0`.
///
/// Must be called after the physics plugin has been added (so that
/// `PhysicsContext` exists as a resource).
pub fn spawn_ground_plane(world: &mut World) -> Entity {
    let body = {
        let mut ctx = world.resource_mut::<PhysicsContext>();
        let body = ctx.insert_body(
            RigidBodyBuilder::fixed()
                .translation(nalgebra::vector![0.0, -0.5, 0.0])
                .build(),
        );
        ctx.insert_collider(ColliderBuilder::cuboid(100.0, 0.5, 100.0).build(), body);
        body
    };
    world
        .spawn((
            GroundPlane,
            PhysicsBody::new(body),
            Transform::from_translation(Vec3::new(0.0, -0.5, 0.0)),
        ))
        .id()
}

/// Spawn the reference hatchback at `position` with default livery.
///
/// Panics if the preset fails validation; the preset is covered by its
/// own tests, so a failure here means the fixture itself is broken.
pub fn spawn_test_vehicle(world: &mut World, position: Vec3) -> Entity {
    spawn_vehicle(world, &test_spec(), position, Quat::IDENTITY, Livery::default()).unwrap()
}

/// Spawn a bare occupant entity carrying only a `Transform`.
pub fn spawn_occupant(world: &mut World, position: Vec3) -> Entity {
    world.spawn(Transform::from_translation(position)).id()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::full_test_app;
    use jalopy_vehicle::components::{Vehicle, WheelState};

    #[test]
    fn ground_plane_registers_a_fixed_body() {
        let mut app = full_test_app();
        let entity = spawn_ground_plane(app.world_mut());

        assert!(app.world().get::<GroundPlane>(entity).is_some());
        let handle = app.world().get::<PhysicsBody>(entity).unwrap().handle;
        let ctx = app.world().resource::<PhysicsContext>();
        assert!(ctx.body(handle).unwrap().is_fixed());
    }

    #[test]
    fn test_vehicle_spawns_with_wheels() {
        let mut app = full_test_app();
        spawn_ground_plane(app.world_mut());
        let car = spawn_test_vehicle(app.world_mut(), Vec3::new(0.0, SPAWN_HEIGHT, 0.0));

        assert!(app.world().get::<Vehicle>(car).is_some());
        assert_eq!(app.world().get::<WheelState>(car).unwrap().wheels.len(), 4);
    }

    #[test]
    fn spawned_vehicle_grounds_after_an_update() {
        let mut app = full_test_app();
        spawn_ground_plane(app.world_mut());
        let car = spawn_test_vehicle(app.world_mut(), Vec3::new(0.0, SPAWN_HEIGHT, 0.0));

        app.update();

        let wheels = app.world().get::<WheelState>(car).unwrap();
        assert_eq!(wheels.grounded_count(), 4);
    }
}

//! Pipeline stepping and transform writeback.

use bevy::prelude::*;

use crate::components::PhysicsBody;
use crate::context::PhysicsContext;
use crate::convert::from_iso;

/// Advance the physics pipeline by one simulation frame (all substeps).
///
/// Force and impulse systems must run before this in
/// [`JalopySet::Simulate`](jalopy_core::JalopySet::Simulate); anything
/// observing post-step state runs after.
pub fn step_physics(mut ctx: ResMut<PhysicsContext>) {
    for _ in 0..ctx.substeps {
        ctx.step();
    }
}

/// Copy rigid body poses back onto the ECS [`Transform`]s.
#[allow(clippy::needless_pass_by_value)]
pub fn writeback_transforms(
    ctx: Res<PhysicsContext>,
    mut query: Query<(&PhysicsBody, &mut Transform)>,
) {
    for (body, mut transform) in &mut query {
        let Some(rb) = ctx.body(body.handle) else {
            continue;
        };
        let (position, rotation) = from_iso(rb.position());
        transform.translation = position;
        transform.rotation = rotation;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jalopy_core::{JalopyCorePlugin, JalopySet};
    use rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder};

    fn physics_app() -> App {
        let mut app = App::new();
        app.add_plugins(JalopyCorePlugin);
        app.insert_resource(PhysicsContext::default());
        app.add_systems(
            Update,
            (step_physics, writeback_transforms)
                .chain()
                .in_set(JalopySet::Simulate),
        );
        app.finish();
        app.cleanup();
        app
    }

    #[test]
    fn writeback_follows_falling_body() {
        let mut app = physics_app();

        let handle = {
            let mut ctx = app.world_mut().resource_mut::<PhysicsContext>();
            let handle = ctx.insert_body(
                RigidBodyBuilder::dynamic()
                    .translation(nalgebra::vector![0.0, 5.0, 0.0])
                    .build(),
            );
            ctx.insert_collider(ColliderBuilder::ball(0.5).build(), handle);
            handle
        };
        let entity = app
            .world_mut()
            .spawn((PhysicsBody::new(handle), Transform::from_xyz(0.0, 5.0, 0.0)))
            .id();

        for _ in 0..30 {
            app.update();
        }

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!(
            transform.translation.y < 5.0,
            "transform should track the falling body, y = {}",
            transform.translation.y
        );
    }

    #[test]
    fn writeback_skips_stale_handles() {
        let mut app = physics_app();
        let entity = app
            .world_mut()
            .spawn((
                PhysicsBody::new(rapier3d::prelude::RigidBodyHandle::invalid()),
                Transform::from_xyz(1.0, 2.0, 3.0),
            ))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!((transform.translation - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }
}

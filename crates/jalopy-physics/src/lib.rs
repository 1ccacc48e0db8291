// jalopy-physics: Rapier3D integration for the jalopy workspace.
//
// One `PhysicsContext` resource owns every rapier set and pipeline object;
// systems step it and write body poses back to ECS transforms. Ray queries
// that must not see the casting vehicle go through `WheelRaycaster`. All
// glam ↔ nalgebra crossings are explicit via the `convert` helpers.

pub mod components;
pub mod context;
pub mod convert;
pub mod plugin;
pub mod raycast;
pub mod systems;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        components::{GroundPlane, PhysicsBody},
        context::PhysicsContext,
        plugin::JalopyPhysicsPlugin,
        raycast::{RayHit, WheelRaycaster},
    };
}

// Re-export the plugin at crate root for convenience.
pub use plugin::JalopyPhysicsPlugin;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    fn assert_send_sync<T: Send + Sync>() {}

    /// Verify the prelude re-exports compile and the context can cross
    /// thread boundaries inside the bevy schedule.
    #[test]
    fn prelude_exports() {
        use crate::prelude::*;

        assert_send_sync::<PhysicsContext>();
        let _gp = GroundPlane::default();
        let _caster = WheelRaycaster::new(rapier3d::prelude::RigidBodyHandle::invalid());
    }
}

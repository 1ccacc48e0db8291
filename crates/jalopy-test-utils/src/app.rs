//! Bevy test app builders with various plugin combinations.

use bevy::prelude::*;

/// Create a minimal test app with only the core plugin.
///
/// Provides `JalopySet` system ordering, `SimConfig` and `SimTime` but no
/// physics context or vehicle systems.
pub fn minimal_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(jalopy_core::JalopyCorePlugin);
    app.finish();
    app.cleanup();
    app
}

/// Create a test app with the core and physics plugins.
///
/// Provides a stepped [`PhysicsContext`](jalopy_physics::context::PhysicsContext)
/// and transform writeback, but none of the vehicle systems.
pub fn physics_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(jalopy_core::JalopyCorePlugin);
    app.add_plugins(jalopy_physics::JalopyPhysicsPlugin);
    app.finish();
    app.cleanup();
    app
}

/// Create a full-stack test app: core, physics and vehicle plugins.
///
/// Insert a custom `SimConfig` resource before calling this if the test
/// needs non-default gravity, timestep or water level; the plugins read
/// it at build time.
pub fn full_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(jalopy_core::JalopyCorePlugin);
    app.add_plugins(jalopy_physics::JalopyPhysicsPlugin);
    app.add_plugins(jalopy_vehicle::JalopyVehiclePlugin);
    app.finish();
    app.cleanup();
    app
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

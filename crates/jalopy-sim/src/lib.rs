//! Top-level Bevy plugin integrating the full vehicle simulation stack.
//!
//! [`JalopySimPlugin`] is a convenience meta-plugin that adds the core,
//! physics and vehicle plugins in one call. [`SceneBuilder`] goes a step
//! further and assembles a ready-to-step world: config, ground, water
//! and vehicles.
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use jalopy_sim::JalopySimPlugin;
//!
//! App::new().add_plugins(JalopySimPlugin).run();
//! ```

pub mod builder;

#[cfg(test)]
mod headless;
#[cfg(test)]
mod integration;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use builder::{SceneBuilder, SpawnedScene};

// ---------------------------------------------------------------------------
// JalopySimPlugin
// ---------------------------------------------------------------------------

/// Meta-plugin that adds the full vehicle simulation stack.
///
/// Includes:
/// - [`JalopyCorePlugin`](jalopy_core::JalopyCorePlugin) — phase ordering,
///   `SimConfig`, `SimTime`
/// - [`JalopyPhysicsPlugin`](jalopy_physics::JalopyPhysicsPlugin) — rapier
///   context, stepping, transform writeback
/// - [`JalopyVehiclePlugin`](jalopy_vehicle::JalopyVehiclePlugin) — wheels,
///   buoyancy, damage, seats
///
/// Insert a custom `SimConfig` resource before adding this plugin; the
/// physics context and water level are derived from it at build time.
pub struct JalopySimPlugin;

impl Plugin for JalopySimPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(jalopy_core::JalopyCorePlugin)
            .add_plugins(jalopy_physics::JalopyPhysicsPlugin)
            .add_plugins(jalopy_vehicle::JalopyVehiclePlugin);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jalopy_physics::context::PhysicsContext;

    #[test]
    fn plugin_builds_without_panic() {
        let mut app = App::new();
        app.add_plugins(JalopySimPlugin);
        app.finish();
        app.cleanup();
        app.update();

        assert!(app.world().get_resource::<PhysicsContext>().is_some());
    }
}

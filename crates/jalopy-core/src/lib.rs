//! Core types for the jalopy vehicle simulation: system ordering, the
//! simulation clock, configuration and the error taxonomy.
//!
//! Every other crate in the workspace hangs its systems off [`JalopySet`],
//! which [`JalopyCorePlugin`] configures as a strict
//! `Control → Simulate → Maintain` chain per frame.
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use jalopy_core::JalopyCorePlugin;
//!
//! App::new().add_plugins(JalopyCorePlugin).run();
//! ```

pub mod config;
pub mod error;
pub mod time;

use bevy::prelude::*;

pub use config::SimConfig;
pub use error::{ConfigError, JalopyError, SpecError, VehicleError};
pub use time::SimTime;

// ---------------------------------------------------------------------------
// JalopySet
// ---------------------------------------------------------------------------

/// Fixed per-frame phases of the vehicle simulation.
///
/// Configured by [`JalopyCorePlugin`] to run as a chain, so everything in
/// `Control` settles before wheel forces are computed, and the physics step
/// completes before damage and seat bookkeeping observe its results.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JalopySet {
    /// Driver input: player/AI systems write steering, throttle, brake.
    Control,
    /// Wheel raycasts and forces, buoyancy, the physics pipeline step and
    /// transform writeback.
    Simulate,
    /// Non-physics bookkeeping: queued damage, panel reconciliation, seat
    /// occupant transforms.
    Maintain,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Advances [`SimTime`] by one step of `physics_dt` each frame.
fn advance_sim_time(config: Res<SimConfig>, mut time: ResMut<SimTime>) {
    time.advance_step(config.physics_dt);
}

// ---------------------------------------------------------------------------
// JalopyCorePlugin
// ---------------------------------------------------------------------------

/// Installs the [`JalopySet`] phase chain, [`SimConfig`] and [`SimTime`].
pub struct JalopyCorePlugin;

impl Plugin for JalopyCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>()
            .init_resource::<SimTime>()
            .configure_sets(
                Update,
                (
                    JalopySet::Control,
                    JalopySet::Simulate,
                    JalopySet::Maintain,
                )
                    .chain(),
            )
            .add_systems(Update, advance_sim_time.in_set(JalopySet::Simulate));
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::error::{ConfigError, JalopyError, SpecError, VehicleError};
    pub use crate::time::SimTime;
    pub use crate::{JalopyCorePlugin, JalopySet};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn core_resources_are_send_sync() {
        assert_send_sync::<SimConfig>();
        assert_send_sync::<SimTime>();
    }

    #[test]
    fn plugin_builds_without_panic() {
        let mut app = App::new();
        app.add_plugins(JalopyCorePlugin);
        app.finish();
        app.cleanup();
        app.update();

        assert!(app.world().get_resource::<SimConfig>().is_some());
        assert!(app.world().get_resource::<SimTime>().is_some());
    }

    #[test]
    fn sim_time_advances_once_per_update() {
        let mut app = App::new();
        app.add_plugins(JalopyCorePlugin);
        app.finish();
        app.cleanup();

        app.update();
        app.update();

        let config = app.world().resource::<SimConfig>().clone();
        let time = app.world().resource::<SimTime>();
        assert_eq!(time.ticks(), 2);
        assert!((time.secs_f64() - 2.0 * config.physics_dt).abs() < 1e-9);
    }
}

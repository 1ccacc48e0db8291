//! Drivable vehicles: raycast wheels, seats, a panel damage model and
//! detachable body panels on live hinge joints.
//!
//! A vehicle is one ECS entity ([`components::Vehicle`] plus input, seat,
//! damage and telemetry components) backed by one rapier chassis body.
//! Panels that break off become their own rapier bodies joined to the
//! chassis by limited revolute joints, owned by
//! [`damage::VehicleDamage`].
//!
//! [`JalopyVehiclePlugin`] schedules the per-frame work: wheel forces and
//! buoyancy feed the physics step inside [`JalopySet::Simulate`], damage
//! and seat bookkeeping run afterwards in [`JalopySet::Maintain`].
//!
//! # Example
//!
//! ```
//! use bevy::prelude::*;
//! use jalopy_core::prelude::*;
//! use jalopy_physics::prelude::*;
//! use jalopy_vehicle::prelude::*;
//! use std::sync::Arc;
//!
//! let mut app = App::new();
//! app.add_plugins((JalopyCorePlugin, JalopyPhysicsPlugin, JalopyVehiclePlugin));
//!
//! let spec = Arc::new(jalopy_spec::presets::hatchback());
//! let car = spawn_vehicle(
//!     app.world_mut(),
//!     &spec,
//!     Vec3::new(0.0, 0.66, 0.0),
//!     Quat::IDENTITY,
//!     Livery::default(),
//! )
//! .unwrap();
//!
//! app.update();
//! assert!(app.world().get::<WheelState>(car).is_some());
//! ```

pub mod components;
pub mod damage;
pub mod events;
pub mod hinge;
pub mod spawn;
pub mod systems;

use bevy::prelude::*;

use jalopy_core::{JalopySet, SimConfig};
use jalopy_physics::systems::step_physics;

use crate::events::{SeatBoarded, SeatVacated, VehicleWrecked};
use crate::systems::{
    apply_pending_damage, drive_vehicles, float_vehicles, settle_panels, sync_seated_occupants,
    WaterLevel,
};

// ---------------------------------------------------------------------------
// JalopyVehiclePlugin
// ---------------------------------------------------------------------------

/// Bevy plugin running the vehicle simulation.
///
/// Requires [`JalopyCorePlugin`](jalopy_core::JalopyCorePlugin) and
/// [`JalopyPhysicsPlugin`](jalopy_physics::JalopyPhysicsPlugin) to be added
/// first: the core plugin provides [`SimConfig`] and the phase chain, the
/// physics plugin provides the context and the step this plugin orders
/// against.
///
/// If the active [`SimConfig`] carries a water level, a [`WaterLevel`]
/// resource is inserted so buoyancy runs out of the box.
pub struct JalopyVehiclePlugin;

impl Plugin for JalopyVehiclePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SeatBoarded>()
            .add_event::<SeatVacated>()
            .add_event::<VehicleWrecked>();

        let water_level = app
            .world()
            .get_resource::<SimConfig>()
            .and_then(|config| config.water_level);
        if let Some(level) = water_level {
            app.insert_resource(WaterLevel(level));
        }

        app.add_systems(
            Update,
            (drive_vehicles, float_vehicles)
                .chain()
                .before(step_physics)
                .in_set(JalopySet::Simulate),
        )
        .add_systems(
            Update,
            (apply_pending_damage, settle_panels, sync_seated_occupants)
                .chain()
                .in_set(JalopySet::Maintain),
        );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::components::{
        DriverControls, Livery, Seating, Vehicle, WheelContact, WheelState,
    };
    pub use crate::damage::{
        Attachment, DamageFlags, DamageInfo, DamageKind, FrameState, PendingDamage, VehicleDamage,
    };
    pub use crate::events::{SeatBoarded, SeatVacated, VehicleWrecked};
    pub use crate::spawn::{
        board_occupant, despawn_vehicle, eject_occupants, spawn_vehicle, vacate_seat,
    };
    pub use crate::systems::WaterLevel;
    pub use crate::JalopyVehiclePlugin;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jalopy_core::JalopyCorePlugin;
    use jalopy_physics::JalopyPhysicsPlugin;

    #[test]
    fn plugin_builds_without_panic() {
        let mut app = App::new();
        app.add_plugins((JalopyCorePlugin, JalopyPhysicsPlugin, JalopyVehiclePlugin));
        app.finish();
        app.cleanup();
        app.update();
    }

    #[test]
    fn plugin_inserts_water_level_from_config() {
        let mut app = App::new();
        app.insert_resource(SimConfig {
            water_level: Some(-2.0),
            ..SimConfig::default()
        });
        app.add_plugins((JalopyCorePlugin, JalopyPhysicsPlugin, JalopyVehiclePlugin));

        assert_eq!(
            app.world().get_resource::<WaterLevel>(),
            Some(&WaterLevel(-2.0))
        );
    }

    #[test]
    fn dry_config_installs_no_water_level() {
        let mut app = App::new();
        app.add_plugins((JalopyCorePlugin, JalopyPhysicsPlugin, JalopyVehiclePlugin));
        assert!(app.world().get_resource::<WaterLevel>().is_none());
    }
}

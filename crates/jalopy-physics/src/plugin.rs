//! The physics plugin: context resource plus step/writeback systems.

use bevy::prelude::*;

use jalopy_core::{JalopySet, SimConfig};

use crate::context::PhysicsContext;
use crate::systems::{step_physics, writeback_transforms};

/// Bevy plugin that owns the rapier world.
///
/// Inserts a [`PhysicsContext`] built from the app's [`SimConfig`]
/// (inserting the default config first if none is present — insert a
/// custom `SimConfig` *before* adding this plugin to override gravity or
/// timestep) and schedules the pipeline step and transform writeback in
/// [`JalopySet::Simulate`].
pub struct JalopyPhysicsPlugin;

impl Plugin for JalopyPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>();
        let config = app.world().resource::<SimConfig>().clone();
        app.insert_resource(PhysicsContext::from_config(&config));

        app.add_systems(
            Update,
            (step_physics, writeback_transforms)
                .chain()
                .in_set(JalopySet::Simulate),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

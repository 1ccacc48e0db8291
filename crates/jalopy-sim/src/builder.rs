//! Scene builder for constructing a fully configured Bevy [`App`].
//!
//! [`SceneBuilder`] provides a fluent API for composing a simulation:
//! config, a ground plane, a water level and vehicles, with all stack
//! plugins added and finalized.
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use jalopy_sim::SceneBuilder;
//! use jalopy_spec::presets;
//! use std::sync::Arc;
//!
//! let scene = SceneBuilder::new()
//!     .with_ground_plane()
//!     .with_vehicle(Arc::new(presets::hatchback()), Vec3::new(0.0, 0.66, 0.0))
//!     .unwrap()
//!     .build();
//! ```

use std::sync::Arc;

use bevy::prelude::*;
use rapier3d::prelude::{ColliderBuilder, RigidBodyBuilder};

use jalopy_core::{SimConfig, SpecError};
use jalopy_physics::components::{GroundPlane, PhysicsBody};
use jalopy_physics::context::PhysicsContext;
use jalopy_spec::VehicleSpec;
use jalopy_vehicle::components::Livery;
use jalopy_vehicle::spawn::spawn_vehicle;

use crate::JalopySimPlugin;

// ---------------------------------------------------------------------------
// SpawnedScene
// ---------------------------------------------------------------------------

/// Result of building a scene — the Bevy app plus spawned entity handles.
pub struct SpawnedScene {
    /// The fully configured Bevy application.
    pub app: App,
    /// Spawned vehicles, in the order they were added to the builder.
    pub vehicles: Vec<Entity>,
    /// The ground plane entity, if one was requested.
    pub ground: Option<Entity>,
}

// ---------------------------------------------------------------------------
// VehicleEntry
// ---------------------------------------------------------------------------

/// Internal representation of a vehicle to spawn.
struct VehicleEntry {
    spec: Arc<VehicleSpec>,
    position: Vec3,
    rotation: Quat,
    livery: Livery,
}

// ---------------------------------------------------------------------------
// SceneBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for constructing a complete vehicle simulation.
///
/// Specs are validated as they are added, so `build` itself cannot fail.
pub struct SceneBuilder {
    sim_config: Option<SimConfig>,
    water_level: Option<f32>,
    ground: bool,
    vehicles: Vec<VehicleEntry>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    /// Create a new scene builder with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sim_config: None,
            water_level: None,
            ground: false,
            vehicles: Vec::new(),
        }
    }

    /// Set the simulation configuration.
    #[must_use]
    pub const fn with_sim_config(mut self, config: SimConfig) -> Self {
        self.sim_config = Some(config);
        self
    }

    /// Set the world water plane, overriding any level in the sim config.
    #[must_use]
    pub const fn with_water_level(mut self, level: f32) -> Self {
        self.water_level = Some(level);
        self
    }

    /// Add a large fixed ground slab whose top surface is `y = 0`.
    #[must_use]
    pub const fn with_ground_plane(mut self) -> Self {
        self.ground = true;
        self
    }

    /// Add a vehicle at `position` with identity rotation and default
    /// livery.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] if the spec fails validation.
    pub fn with_vehicle(
        self,
        spec: Arc<VehicleSpec>,
        position: Vec3,
    ) -> Result<Self, SpecError> {
        self.with_vehicle_posed(spec, position, Quat::IDENTITY, Livery::default())
    }

    /// Add a vehicle with full pose and livery control.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError`] if the spec fails validation.
    pub fn with_vehicle_posed(
        mut self,
        spec: Arc<VehicleSpec>,
        position: Vec3,
        rotation: Quat,
        livery: Livery,
    ) -> Result<Self, SpecError> {
        spec.validate()?;
        self.vehicles.push(VehicleEntry {
            spec,
            position,
            rotation,
            livery,
        });
        Ok(self)
    }

    /// Build the Bevy [`App`] with all plugins and spawned entities.
    #[must_use]
    pub fn build(self) -> SpawnedScene {
        let mut app = App::new();

        // The physics plugin derives its context from SimConfig at build
        // time, so the resource must be in place before the plugins.
        let mut config = self.sim_config.unwrap_or_default();
        if self.water_level.is_some() {
            config.water_level = self.water_level;
        }
        app.insert_resource(config);
        app.add_plugins(JalopySimPlugin);
        app.finish();
        app.cleanup();

        let ground = self.ground.then(|| spawn_ground(app.world_mut()));

        let mut vehicles = Vec::with_capacity(self.vehicles.len());
        for entry in self.vehicles {
            match spawn_vehicle(
                app.world_mut(),
                &entry.spec,
                entry.position,
                entry.rotation,
                entry.livery,
            ) {
                Ok(entity) => vehicles.push(entity),
                // Specs were validated at add time.
                Err(err) => error!("jalopy-sim: vehicle spawn failed: {err}"),
            }
        }

        SpawnedScene {
            app,
            vehicles,
            ground,
        }
    }
}

fn spawn_ground(world: &mut World) -> Entity {
    let body = {
        let mut ctx = world.resource_mut::<PhysicsContext>();
        let body = ctx.insert_body(
            RigidBodyBuilder::fixed()
                .translation(nalgebra::vector![0.0, -0.5, 0.0])
                .build(),
        );
        ctx.insert_collider(ColliderBuilder::cuboid(200.0, 0.5, 200.0).build(), body);
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Per-frame vehicle systems.
//!
//! Simulation half (before the physics step): wheel ticks and buoyancy.
//! Maintenance half (after the step): queued damage, panel settling and
//! seat followers.

use bevy::prelude::*;

use jalopy_core::SimConfig;
use jalopy_physics::context::PhysicsContext;
use jalopy_physics::convert::{from_na_point, from_na_quat, to_na_point};

use crate::components::{DriverControls, Seating, Vehicle, WheelState};
use crate::damage::{PendingDamage, VehicleDamage};
use crate::events::VehicleWrecked;

/// World water plane height. Absent means a dry world; buoyancy does
/// nothing without it.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WaterLevel(pub f32);

/// Tick every vehicle's wheels against the current collider set and
/// store the resulting contact telemetry.
#[allow(clippy::needless_pass_by_value)]
pub fn drive_vehicles(
    mut ctx: ResMut<PhysicsContext>,
    config: Res<SimConfig>,
    mut vehicles: Query<(&Vehicle, &DriverControls, &VehicleDamage, &mut WheelState)>,
) {
    // Wheel rays must see colliders moved by the previous frame.
    ctx.refresh_queries();
    let dt = config.dt();
    for (vehicle, controls, damage, mut wheels) in &mut vehicles {
        match vehicle.tick_physics(&mut ctx, controls, damage, dt) {
            Ok(state) => *wheels = state,
            Err(err) => warn!("jalopy-vehicle: wheel tick failed: {err}"),
        }
    }
}

/// Push partially submerged vehicles up at their float points. No-op in
/// a world without a [`WaterLevel`].
#[allow(clippy::needless_pass_by_value)]
pub fn float_vehicles(
    mut ctx: ResMut<PhysicsContext>,
    water: Option<Res<WaterLevel>>,
    vehicles: Query<&Vehicle>,
) {
    let Some(water) = water else {
        return;
    };
    for vehicle in &vehicles {
        for point in vehicle.spec().effective_float_points() {
            if let Err(err) =
                vehicle.apply_water_float(&mut ctx, Vec3::from_array(point), water.0)
            {
                warn!("jalopy-vehicle: buoyancy failed: {err}");
                break;
            }
        }
    }
}

/// Drain every vehicle's damage queue into its damage model, firing
/// [`VehicleWrecked`] on the health transition to zero.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_pending_damage(
    mut ctx: ResMut<PhysicsContext>,
    mut vehicles: Query<(Entity, &Vehicle, &mut VehicleDamage, &mut PendingDamage)>,
    mut wrecked: EventWriter<VehicleWrecked>,
) {
    for (entity, vehicle, mut damage, mut pending) in &mut vehicles {
        for info in pending.drain() {
            match damage.take_damage(&mut ctx, vehicle, &info) {
                Ok(true) => {
                    wrecked.send(VehicleWrecked { vehicle: entity });
                }
                Ok(false) => {}
                Err(err) => warn!("jalopy-vehicle: damage application failed: {err}"),
            }
        }
    }
}

/// Drain panel damage accumulators and keep the damage mask in step with
/// panel states.
#[allow(clippy::needless_pass_by_value)]
pub fn settle_panels(
    config: Res<SimConfig>,
    mut vehicles: Query<(&Vehicle, &mut VehicleDamage)>,
) {
    let dt = config.dt();
    for (vehicle, mut damage) in &mut vehicles {
        damage.decay(vehicle.spec(), dt);
        damage.reconcile_flags(vehicle.spec());
    }
}

/// Pin seated occupants' transforms to their seat's world pose.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_seated_occupants(
    ctx: Res<PhysicsContext>,
    vehicles: Query<(&Vehicle, &Seating)>,
    mut occupants: Query<&mut Transform, Without<Vehicle>>,
) {
    for (vehicle, seating) in &vehicles {
        let Some(body) = ctx.body(vehicle.chassis()) else {
            continue;
        };
        let pose = *body.position();
        let rotation = from_na_quat(&pose.rotation);
        for (seat, occupant) in seating.occupants() {
            let Some(spec_seat) = vehicle.spec().seats.get(seat) else {
                continue;
            };
            let world = pose * to_na_point(Vec3::from_array(spec_seat.offset));
            if let Ok(mut transform) = occupants.get_mut(occupant) {
                transform.translation = from_na_point(&world);
                transform.rotation = rotation;
            }
        }
    }
}

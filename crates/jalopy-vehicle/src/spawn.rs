//! Spawning and despawning vehicles.
//!
//! A vehicle is one ECS entity plus one rapier chassis body (and, once
//! panels break loose, extra panel bodies owned by [`VehicleDamage`]).
//! These helpers keep the two worlds consistent: spawn creates both
//! halves, despawn tears both down.

use std::sync::Arc;

use bevy::prelude::{Entity, Quat, Transform, Vec3, World};
use rapier3d::prelude::{ColliderBuilder, MassProperties, RigidBodyBuilder};

use jalopy_core::{SpecError, VehicleError};
use jalopy_physics::components::PhysicsBody;
use jalopy_physics::context::PhysicsContext;
use jalopy_physics::convert::{to_iso, to_na_point};
use jalopy_spec::VehicleSpec;

use crate::components::{DriverControls, Livery, Seating, Vehicle, WheelState};
use crate::damage::{PendingDamage, VehicleDamage};
use crate::events::{SeatBoarded, SeatVacated};

/// Spawn a vehicle from a spec at a world pose.
///
/// Validates the spec, creates the chassis rigid body and collider in the
/// [`PhysicsContext`] resource (which must already exist), and spawns the
/// ECS entity carrying the full component set. The chassis collider has
/// zero density; mass and inertia come from the spec's handling data so
/// the same shape can serve models of different weight.
pub fn spawn_vehicle(
    world: &mut World,
    spec: &Arc<VehicleSpec>,
    position: Vec3,
    rotation: Quat,
    livery: Livery,
) -> Result<Entity, SpecError> {
    spec.validate()?;

    let handling = &spec.handling;
    let [hx, hy, hz] = handling.half_extents;
    let (w, h, d) = (2.0 * hx, 2.0 * hy, 2.0 * hz);
    let inertia = nalgebra::vector![
        handling.mass / 12.0 * (h * h + d * d),
        handling.mass / 12.0 * (w * w + d * d),
        handling.mass / 12.0 * (w * w + h * h)
    ];

    let chassis = {
        let mut ctx = world.resource_mut::<PhysicsContext>();
        let body = ctx.insert_body(
            RigidBodyBuilder::dynamic()
                .position(to_iso(position, rotation))
                .additional_mass_properties(MassProperties::new(
                    to_na_point(Vec3::from_array(handling.centre_of_mass)),
                    handling.mass,
                    inertia,
                ))
                .build(),
        );
        ctx.insert_collider(
            ColliderBuilder::cuboid(hx, hy, hz).density(0.0).build(),
            body,
        );
        body
    };

    let entity = world
        .spawn((
            Vehicle::new(Arc::clone(spec), chassis),
            DriverControls::default(),
            Seating::new(spec.seat_count()),
            VehicleDamage::new(spec),
            PendingDamage::default(),
            WheelState::for_spec(spec),
            livery,
            PhysicsBody::new(chassis),
            Transform {
                translation: position,
                rotation,
                ..Transform::default()
            },
        ))
        .id();
    Ok(entity)
}

/// Despawn a vehicle and everything it owns in the physics world.
///
/// Seats are emptied first (the evicted occupants are returned so the
/// caller can reposition them), loose panel bodies are severed and
/// destroyed, then the chassis body goes. Occupant entities themselves
/// are never despawned.
pub fn despawn_vehicle(world: &mut World, entity: Entity) -> Result<Vec<Entity>, VehicleError> {
    let chassis = world
        .get::<Vehicle>(entity)
        .ok_or(VehicleError::ChassisMissing)?
        .chassis();

    let evicted = match world.get_mut::<Seating>(entity) {
        Some(mut seating) => seating.eject_all(),
        None => Vec::new(),
    };

    let damage = world.entity_mut(entity).take::<VehicleDamage>();
    let ctx = world.resource_mut::<PhysicsContext>().into_inner();
    if let Some(mut damage) = damage {
        damage.release_hinges(ctx);
    }
    ctx.remove_body(chassis);

    world.despawn(entity);
    Ok(evicted)
}

/// Seat an occupant and emit [`SeatBoarded`].
///
/// The silent path (no event) is [`Seating::set_occupant`] on the
/// component itself; this wrapper is for gameplay code that wants
/// listeners to hear about it.
pub fn board_occupant(
    world: &mut World,
    vehicle: Entity,
    seat: usize,
    occupant: Entity,
) -> Result<(), VehicleError> {
    let mut seating = world
        .get_mut::<Seating>(vehicle)
        .ok_or(VehicleError::ChassisMissing)?;
    seating.set_occupant(seat, Some(occupant))?;
    world.send_event(SeatBoarded {
        vehicle,
        seat,
        occupant,
    });
    Ok(())
}

/// Empty one seat, emitting [`SeatVacated`] if someone was in it.
/// Returns the previous occupant.
pub fn vacate_seat(
    world: &mut World,
    vehicle: Entity,
    seat: usize,
) -> Result<Option<Entity>, VehicleError> {
    let mut seating = world
        .get_mut::<Seating>(vehicle)
        .ok_or(VehicleError::ChassisMissing)?;
    let occupant = seating.occupant(seat)?;
    seating.set_occupant(seat, None)?;
    if let Some(occupant) = occupant {
        world.send_event(SeatVacated {
            vehicle,
            seat,
            occupant,
        });
    }
    Ok(occupant)
}

/// Empty every seat, emitting [`SeatVacated`] per occupant. Returns the
/// evicted occupants.
pub fn eject_occupants(world: &mut World, vehicle: Entity) -> Result<Vec<Entity>, VehicleError> {
    let mut seating = world
        .get_mut::<Seating>(vehicle)
        .ok_or(VehicleError::ChassisMissing)?;
    let evicted: Vec<(usize, Entity)> = seating.occupants().collect();
    seating.eject_all();
    for &(seat, occupant) in &evicted {
        world.send_event(SeatVacated {
            vehicle,
            seat,
            occupant,
        });
    }
    Ok(evicted.into_iter().map(|(_, occupant)| occupant).collect())
}

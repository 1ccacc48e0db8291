//! Vehicle lifecycle events.

use bevy::prelude::{Entity, Event};

/// An occupant was placed in a seat.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatBoarded {
    pub vehicle: Entity,
    pub seat: usize,
    pub occupant: Entity,
}

/// An occupant left (or was thrown out of) a seat.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatVacated {
    pub vehicle: Entity,
    pub seat: usize,
    pub occupant: Entity,
}

/// Health reached zero. Fired exactly once per vehicle life; the wreck
/// itself stays in the world.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleWrecked {
    pub vehicle: Entity,
}

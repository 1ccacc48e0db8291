//! Vehicle ECS components: chassis, driver input, seats, livery and
//! wheel telemetry.

use std::sync::Arc;

use bevy::prelude::{Component, Entity, Quat, Vec3};
use nalgebra::{Isometry3, Translation3};
use rapier3d::prelude::RigidBodyHandle;

use jalopy_core::VehicleError;
use jalopy_physics::context::PhysicsContext;
use jalopy_physics::convert::{from_na, from_na_point, from_na_quat, to_na, to_na_point, to_na_quat};
use jalopy_physics::raycast::WheelRaycaster;
use jalopy_spec::VehicleSpec;

use crate::damage::VehicleDamage;

// ---------------------------------------------------------------------------
// DriverControls
// ---------------------------------------------------------------------------

/// Driver input state.
///
/// Pure state: set by a controller (player or AI), consumed once per
/// physics step, never reset automatically, never validated or clamped —
/// out-of-range values flow into the wheel forces unchanged.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct DriverControls {
    steering: f32,
    throttle: f32,
    brake: f32,
    handbrake: bool,
}

impl DriverControls {
    /// Steering input; by convention `[-1, 1]`, scaled by the spec's
    /// steering lock at the wheels.
    #[must_use]
    pub fn steering(&self) -> f32 {
        self.steering
    }

    pub fn set_steering(&mut self, steering: f32) {
        self.steering = steering;
    }

    /// Throttle input; by convention `[0, 1]`.
    #[must_use]
    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn set_throttle(&mut self, throttle: f32) {
        self.throttle = throttle;
    }

    /// Brake input; by convention `[0, 1]`.
    #[must_use]
    pub fn brake(&self) -> f32 {
        self.brake
    }

    pub fn set_brake(&mut self, brake: f32) {
        self.brake = brake;
    }

    #[must_use]
    pub fn handbrake(&self) -> bool {
        self.handbrake
    }

    pub fn set_handbrake(&mut self, handbrake: bool) {
        self.handbrake = handbrake;
    }
}

// ---------------------------------------------------------------------------
// Seating
// ---------------------------------------------------------------------------

/// Seat table: seat index → occupant entity.
///
/// References are non-owning; a seat knows nothing about the entity in it
/// beyond its id.
#[derive(Component, Debug)]
pub struct Seating {
    seats: Vec<Option<Entity>>,
}

impl Seating {
    /// Empty seat table with `seat_count` seats.
    #[must_use]
    pub fn new(seat_count: usize) -> Self {
        Self {
            seats: vec![None; seat_count],
        }
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Occupant of a seat, `None` when empty.
    pub fn occupant(&self, seat: usize) -> Result<Option<Entity>, VehicleError> {
        self.seats
            .get(seat)
            .copied()
            .ok_or(VehicleError::InvalidSeat {
                seat,
                seat_count: self.seats.len(),
            })
    }

    /// Put `occupant` in a seat (or clear it with `None`).
    ///
    /// Setting over an occupied seat overwrites without evicting: the
    /// previous occupant's own state is the caller's problem, by design —
    /// this table only tracks who is where.
    pub fn set_occupant(
        &mut self,
        seat: usize,
        occupant: Option<Entity>,
    ) -> Result<(), VehicleError> {
        let seat_count = self.seats.len();
        let slot = self
            .seats
            .get_mut(seat)
            .ok_or(VehicleError::InvalidSeat { seat, seat_count })?;
        *slot = occupant;
        Ok(())
    }

    /// Clear every seat and return the evicted occupants.
    pub fn eject_all(&mut self) -> Vec<Entity> {
        self.seats.iter_mut().filter_map(Option::take).collect()
    }

    /// Lowest-numbered empty seat.
    #[must_use]
    pub fn first_free(&self) -> Option<usize> {
        self.seats.iter().position(Option::is_none)
    }

    /// Occupied seats as `(seat, occupant)` pairs.
    pub fn occupants(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(seat, occupant)| occupant.map(|e| (seat, e)))
    }
}

// ---------------------------------------------------------------------------
// Livery
// ---------------------------------------------------------------------------

/// Paint colours, fixed at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Livery {
    primary: [f32; 3],
    secondary: [f32; 3],
}

impl Livery {
    #[must_use]
    pub fn new(primary: [f32; 3], secondary: [f32; 3]) -> Self {
        Self { primary, secondary }
    }

    #[must_use]
    pub fn primary(&self) -> [f32; 3] {
        self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> [f32; 3] {
        self.secondary
    }
}

impl Default for Livery {
    fn default() -> Self {
        Self::new([0.8, 0.8, 0.8], [0.1, 0.1, 0.1])
    }
}

// ---------------------------------------------------------------------------
// WheelState
// ---------------------------------------------------------------------------

/// Per-wheel contact telemetry from the last wheel tick.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WheelContact {
    /// Whether the wheel ray found ground this tick.
    pub grounded: bool,
    /// Suspension compression below rest length, in metres.
    pub compression: f32,
    /// World-space contact point.
    pub contact_point: Vec3,
    /// World-space contact normal.
    pub contact_normal: Vec3,
    /// Suspension impulse applied this tick, in N·s.
    pub spring_impulse: f32,
}

/// Wheel telemetry, one entry per spec wheel, rewritten every tick.
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct WheelState {
    pub wheels: Vec<WheelContact>,
}

impl WheelState {
    /// Telemetry sized for a spec, all wheels airborne.
    #[must_use]
    pub fn for_spec(spec: &VehicleSpec) -> Self {
        Self {
            wheels: vec![WheelContact::default(); spec.wheels.len()],
        }
    }

    /// Number of wheels touching ground.
    #[must_use]
    pub fn grounded_count(&self) -> usize {
        self.wheels.iter().filter(|w| w.grounded).count()
    }
}

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

/// The vehicle root: spec identity, chassis body handle and the wheel
/// raycaster.
///
/// Logical position and rotation live *in* the chassis rigid body — reads
/// and writes go through [`PhysicsContext`], so the logical and physical
/// transform can only diverge mid-step.
#[derive(Component)]
pub struct Vehicle {
    spec: Arc<VehicleSpec>,
    chassis: RigidBodyHandle,
    raycaster: WheelRaycaster,
}

impl Vehicle {
    /// Wrap a spawned chassis body. Use
    /// [`spawn_vehicle`](crate::spawn::spawn_vehicle) instead of calling
    /// this directly unless you are building the body yourself.
    #[must_use]
    pub fn new(spec: Arc<VehicleSpec>, chassis: RigidBodyHandle) -> Self {
        Self {
            spec,
            chassis,
            raycaster: WheelRaycaster::new(chassis),
        }
    }

    /// The static spec this vehicle was spawned from.
    #[must_use]
    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    /// Shared handle to the spec, for spawning siblings.
    #[must_use]
    pub fn spec_arc(&self) -> Arc<VehicleSpec> {
        Arc::clone(&self.spec)
    }

    /// Rapier handle of the chassis body.
    #[must_use]
    pub fn chassis(&self) -> RigidBodyHandle {
        self.chassis
    }

    /// Chassis position.
    pub fn position(&self, ctx: &PhysicsContext) -> Result<Vec3, VehicleError> {
        let body = ctx.body(self.chassis).ok_or(VehicleError::ChassisMissing)?;
        Ok(from_na(body.translation()))
    }

    /// Chassis rotation.
    pub fn rotation(&self, ctx: &PhysicsContext) -> Result<Quat, VehicleError> {
        let body = ctx.body(self.chassis).ok_or(VehicleError::ChassisMissing)?;
        Ok(from_na_quat(&body.position().rotation))
    }

    /// Teleport the chassis, carrying live hinged panels by the same
    /// delta so their joints are not stretched across the jump.
    pub fn set_position(
        &self,
        ctx: &mut PhysicsContext,
        damage: &VehicleDamage,
        position: Vec3,
    ) -> Result<(), VehicleError> {
        let body = ctx.body(self.chassis).ok_or(VehicleError::ChassisMissing)?;
        let delta = to_na(position) - body.translation();

        let body = ctx
            .body_mut(self.chassis)
            .ok_or(VehicleError::ChassisMissing)?;
        body.set_translation(to_na(position), true);

        for (panel, entry) in damage.hinged_entries() {
            let panel_body = ctx
                .body_mut(entry.body())
                .ok_or(VehicleError::PanelBodyMissing { panel })?;
            let translation = panel_body.translation() + delta;
            panel_body.set_translation(translation, true);
        }
        Ok(())
    }

    /// Re-orient the chassis, swinging live hinged panels around the
    /// chassis origin by the same delta rotation.
    pub fn set_rotation(
        &self,
        ctx: &mut PhysicsContext,
        damage: &VehicleDamage,
        rotation: Quat,
    ) -> Result<(), VehicleError> {
        let body = ctx.body(self.chassis).ok_or(VehicleError::ChassisMissing)?;
        let pose = *body.position();
        let target = to_na_quat(rotation);
        let delta = target * pose.rotation.inverse();
        let pivot = pose.translation.vector;

        let body = ctx
            .body_mut(self.chassis)
            .ok_or(VehicleError::ChassisMissing)?;
        body.set_rotation(target, true);

        for (panel, entry) in damage.hinged_entries() {
            let panel_body = ctx
                .body_mut(entry.body())
                .ok_or(VehicleError::PanelBodyMissing { panel })?;
            let panel_pose = *panel_body.position();
            let translation = pivot + delta * (panel_pose.translation.vector - pivot);
            let new_pose = Isometry3::from_parts(
                Translation3::from(translation),
                delta * panel_pose.rotation,
            );
            panel_body.set_position(new_pose, true);
        }
        Ok(())
    }

    /// World-space point where a character stands to board `seat`: the
    /// seat offset plus the spec's entry clearance, lateral component
    /// mirrored to the seat's side of the car.
    pub fn seat_entry_position(
        &self,
        ctx: &PhysicsContext,
        seat: usize,
    ) -> Result<Vec3, VehicleError> {
        let offset = self
            .spec
            .seats
            .get(seat)
            .ok_or(VehicleError::InvalidSeat {
                seat,
                seat_count: self.spec.seat_count(),
            })?
            .offset;
        let body = ctx.body(self.chassis).ok_or(VehicleError::ChassisMissing)?;

        let clearance = Vec3::from_array(self.spec.entry_clearance);
        let side = if offset[0] < 0.0 { -1.0 } else { 1.0 };
        let local = Vec3::from_array(offset)
            + Vec3::new(side * clearance.x, clearance.y, clearance.z);
        Ok(from_na_point(&(body.position() * to_na_point(local))))
    }

    /// One buoyant impulse at a chassis-local float point: upward,
    /// scaled by how far the point sits below the water plane, saturating
    /// at full submersion.
    pub fn apply_water_float(
        &self,
        ctx: &mut PhysicsContext,
        local_point: Vec3,
        water_level: f32,
    ) -> Result<(), VehicleError> {
        let body = ctx
            .body_mut(self.chassis)
            .ok_or(VehicleError::ChassisMissing)?;
        let world = body.position() * to_na_point(local_point);
        if world.y >= water_level {
            return Ok(());
        }
        let factor = ((water_level - world.y) / 2.0 + 0.05).min(1.0);
        let impulse = factor * self.spec.handling.buoyancy_impulse;
        body.apply_impulse_at_point(nalgebra::vector![0.0, impulse, 0.0], world, true);
        Ok(())
    }

    /// One wheel tick: cast every wheel ray, apply suspension, drive,
    /// brake and tyre impulses to the chassis, and report per-wheel
    /// telemetry.
    ///
    /// `dt == 0` is a valid no-op (all wheels reported airborne, nothing
    /// applied). Engine and brake forces gate off while the vehicle is
    /// wrecked; suspension and lateral grip do not — a dead car still
    /// rolls and slides.
    pub fn tick_physics(
        &self,
        ctx: &mut PhysicsContext,
        controls: &DriverControls,
        damage: &VehicleDamage,
        dt: f32,
    ) -> Result<WheelState, VehicleError> {
        let spec = &self.spec;
        let susp = &spec.handling.suspension;
        let mut state = WheelState::for_spec(spec);
        if dt <= 0.0 {
            return Ok(state);
        }

        let chassis = ctx.body(self.chassis).ok_or(VehicleError::ChassisMissing)?;
        let rotation = from_na_quat(&chassis.position().rotation);
        let mass = chassis.mass();
        let up = rotation * Vec3::Y;

        let drivable = !damage.is_wrecked();
        let steering_angle = controls.steering() * spec.handling.steering_lock;
        let wheel_count = spec.wheels.len() as f32;
        let driven_count = spec.wheels.iter().filter(|w| w.driven).count().max(1) as f32;
        let wheel_mass_share = mass / wheel_count;

        let mut impulses: Vec<(Vec3, Vec3)> = Vec::with_capacity(spec.wheels.len());

        for (i, wheel) in spec.wheels.iter().enumerate() {
            let mount_local = Vec3::from_array(wheel.offset) + Vec3::Y * susp.rest_length;
            let mount = from_na_point(&(chassis.position() * to_na_point(mount_local)));
            let ray_end = mount - up * susp.ray_length();

            let Some(hit) = self.raycaster.cast(ctx, mount, ray_end) else {
                continue;
            };

            let hit_distance = hit.fraction * susp.ray_length();
            let spring_length = hit_distance - susp.wheel_radius;
            let compression = (susp.rest_length - spring_length).max(0.0);

            let contact_velocity = from_na(&chassis.velocity_at_point(&to_na_point(hit.point)));
            let v_up = contact_velocity.dot(up);
            let spring_force = (susp.stiffness * compression - susp.damping * v_up).max(0.0);
            let spring_impulse = spring_force * dt;

            let mut impulse = hit.normal * spring_impulse;

            // Tyre frame on the contact plane.
            let steer = if wheel.steerable { steering_angle } else { 0.0 };
            let forward = rotation * (Quat::from_rotation_y(steer) * Vec3::NEG_Z);
            let forward_t =
                (forward - hit.normal * forward.dot(hit.normal)).normalize_or_zero();
            let side_t = forward_t.cross(hit.normal).normalize_or_zero();

            let v_forward = contact_velocity.dot(forward_t);
            let v_side = contact_velocity.dot(side_t);

            if drivable {
                if wheel.driven && controls.throttle() != 0.0 {
                    let drive =
                        controls.throttle() * spec.handling.engine_force / driven_count * dt;
                    impulse += forward_t * drive;
                }
                if controls.brake() > 0.0 && v_forward.abs() > 1e-4 {
                    let from_pedal =
                        controls.brake() * spec.handling.brake_force / wheel_count * dt;
                    // Never brake past a standstill.
                    let stopping = wheel_mass_share * v_forward.abs();
                    impulse -= forward_t * (v_forward.signum() * from_pedal.min(stopping));
                }
            }

            // Lateral grip saturates at the friction budget for this
            // wheel's load; handbrake slashes it on the non-steered axle.
            let grip = if controls.handbrake() && !wheel.steerable {
                spec.handling.lateral_grip * spec.handling.handbrake_grip
            } else {
                spec.handling.lateral_grip
            };
            let max_lateral = grip * spring_force * dt;
            let lateral = (-v_side * wheel_mass_share).clamp(-max_lateral, max_lateral);
            impulse += side_t * lateral;

            impulses.push((hit.point, impulse));
            state.wheels[i] = WheelContact {
                grounded: true,
                compression,
                contact_point: hit.point,
                contact_normal: hit.normal,
                spring_impulse,
            };
        }

        let body = ctx
            .body_mut(self.chassis)
            .ok_or(VehicleError::ChassisMissing)?;
        for (point, impulse) in impulses {
            body.apply_impulse_at_point(to_na(impulse), to_na_point(point), true);
        }
        Ok(state)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

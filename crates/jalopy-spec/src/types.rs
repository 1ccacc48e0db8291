//! Core data types for the in-memory vehicle specification.
//!
//! These types are the canonical read-only description of a vehicle model:
//! handling parameters, seats, wheels and body panels. A spec is shared
//! (`Arc`) by every vehicle instance spawned from it and never mutated at
//! runtime. All positions are in chassis-local space, y-up, −z forward
//! (bevy's `Transform::forward` convention), +x to the driver's right.

use serde::{Deserialize, Serialize};

use jalopy_core::error::SpecError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_mass() -> f32 {
    1200.0
}
const fn default_half_extents() -> [f32; 3] {
    [0.9, 0.55, 2.1]
}
const fn default_centre_of_mass() -> [f32; 3] {
    [0.0, -0.25, 0.0]
}
const fn default_engine_force() -> f32 {
    6000.0
}
const fn default_brake_force() -> f32 {
    9000.0
}
const fn default_steering_lock() -> f32 {
    0.55
}
const fn default_lateral_grip() -> f32 {
    0.9
}
const fn default_handbrake_grip() -> f32 {
    0.25
}
const fn default_buoyancy_impulse() -> f32 {
    150.0
}
const fn default_max_health() -> f32 {
    1000.0
}
const fn default_dent_threshold() -> f32 {
    25.0
}
const fn default_break_threshold() -> f32 {
    75.0
}
const fn default_damage_decay() -> f32 {
    10.0
}
const fn default_stiffness() -> f32 {
    30_000.0
}
const fn default_damping() -> f32 {
    4_500.0
}
const fn default_rest_length() -> f32 {
    0.35
}
const fn default_travel() -> f32 {
    0.15
}
const fn default_wheel_radius() -> f32 {
    0.3
}
const fn default_swing_limits() -> [f32; 2] {
    [0.0, 1.4]
}
const fn default_hinge_mass() -> f32 {
    15.0
}
const fn default_hinge_half_extents() -> [f32; 3] {
    [0.05, 0.4, 0.45]
}
const fn default_hinge_axis() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
/// Hand-tuned clearance between a seat and where a character stands to
/// board: outward past the sill, up to ground level, back toward the pillar.
const fn default_entry_clearance() -> [f32; 3] {
    [0.81756252, 0.486281008, -0.34800607]
}

// ---------------------------------------------------------------------------
// PanelKind
// ---------------------------------------------------------------------------

/// Identity of a damage-tracked body panel.
///
/// Doors, bonnet and boot are detachable (they can tear loose and swing on
/// a hinge); windscreen, bumpers and wings only dent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Bonnet,
    DoorFrontLeft,
    DoorFrontRight,
    DoorRearLeft,
    DoorRearRight,
    Boot,
    Windscreen,
    BumperFront,
    BumperRear,
    WingFrontLeft,
    WingFrontRight,
    WingRearLeft,
    WingRearRight,
}

impl PanelKind {
    /// Whether panels of this kind can tear loose and swing on a hinge.
    pub const fn detachable(self) -> bool {
        matches!(
            self,
            Self::Bonnet
                | Self::DoorFrontLeft
                | Self::DoorFrontRight
                | Self::DoorRearLeft
                | Self::DoorRearRight
                | Self::Boot
        )
    }

    /// Snake-case name, matching the TOML serialization.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bonnet => "bonnet",
            Self::DoorFrontLeft => "door_front_left",
            Self::DoorFrontRight => "door_front_right",
            Self::DoorRearLeft => "door_rear_left",
            Self::DoorRearRight => "door_rear_right",
            Self::Boot => "boot",
            Self::Windscreen => "windscreen",
            Self::BumperFront => "bumper_front",
            Self::BumperRear => "bumper_rear",
            Self::WingFrontLeft => "wing_front_left",
            Self::WingFrontRight => "wing_front_right",
            Self::WingRearLeft => "wing_rear_left",
            Self::WingRearRight => "wing_rear_right",
        }
    }
}

// ---------------------------------------------------------------------------
// HingeSpec
// ---------------------------------------------------------------------------

/// Hinge geometry for a detachable panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HingeSpec {
    /// Swing axis in chassis space (vertical for doors, lateral for
    /// bonnet/boot). Normalized at spawn time.
    #[serde(default = "default_hinge_axis")]
    pub axis: [f32; 3],

    /// Angular limits `[closed, open]` in radians about the axis.
    #[serde(default = "default_swing_limits")]
    pub swing_limits: [f32; 2],

    /// Half-extents of the loose panel's collision box.
    #[serde(default = "default_hinge_half_extents")]
    pub half_extents: [f32; 3],

    /// Mass of the loose panel in kilograms.
    #[serde(default = "default_hinge_mass")]
    pub mass: f32,
}

impl Default for HingeSpec {
    fn default() -> Self {
        Self {
            axis: default_hinge_axis(),
            swing_limits: default_swing_limits(),
            half_extents: default_hinge_half_extents(),
            mass: default_hinge_mass(),
        }
    }
}

// ---------------------------------------------------------------------------
// PanelSpec
// ---------------------------------------------------------------------------

/// A damage-tracked body panel.
///
/// `offset` doubles as the panel's damage zone centre: incoming damage is
/// attributed to whichever panel offset lies nearest the impact point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub kind: PanelKind,

    /// Attachment point (and damage zone centre) in chassis space.
    pub offset: [f32; 3],

    /// Present iff the kind is detachable.
    #[serde(default)]
    pub hinge: Option<HingeSpec>,
}

// ---------------------------------------------------------------------------
// SeatSpec
// ---------------------------------------------------------------------------

/// A seat attachment point in chassis space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatSpec {
    pub offset: [f32; 3],
}

// ---------------------------------------------------------------------------
// WheelSpec
// ---------------------------------------------------------------------------

/// A wheel mount in chassis space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSpec {
    /// Suspension mount point in chassis space.
    pub offset: [f32; 3],

    /// Whether the steering angle turns this wheel.
    #[serde(default)]
    pub steerable: bool,

    /// Whether engine force drives this wheel.
    #[serde(default)]
    pub driven: bool,
}

// ---------------------------------------------------------------------------
// SuspensionSpec
// ---------------------------------------------------------------------------

/// Per-wheel suspension parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuspensionSpec {
    /// Spring stiffness in N/m.
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,

    /// Damping coefficient in N·s/m.
    #[serde(default = "default_damping")]
    pub damping: f32,

    /// Spring rest length in metres.
    #[serde(default = "default_rest_length")]
    pub rest_length: f32,

    /// Maximum compression travel below rest length, in metres.
    #[serde(default = "default_travel")]
    pub travel: f32,

    /// Wheel radius in metres.
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f32,
}

impl Default for SuspensionSpec {
    fn default() -> Self {
        Self {
            stiffness: default_stiffness(),
            damping: default_damping(),
            rest_length: default_rest_length(),
            travel: default_travel(),
            wheel_radius: default_wheel_radius(),
        }
    }
}

impl SuspensionSpec {
    /// Total ray length for the wheel cast: rest length plus travel plus
    /// the wheel itself.
    pub fn ray_length(&self) -> f32 {
        self.rest_length + self.travel + self.wheel_radius
    }
}

// ---------------------------------------------------------------------------
// HandlingData
// ---------------------------------------------------------------------------

/// Chassis and drive parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlingData {
    /// Chassis mass in kilograms.
    #[serde(default = "default_mass")]
    pub mass: f32,

    /// Chassis collision box half-extents `[x, y, z]`.
    #[serde(default = "default_half_extents")]
    pub half_extents: [f32; 3],

    /// Centre of mass offset from the chassis origin. Kept low for
    /// roll stability.
    #[serde(default = "default_centre_of_mass")]
    pub centre_of_mass: [f32; 3],

    /// Peak longitudinal drive force across driven wheels, in newtons.
    #[serde(default = "default_engine_force")]
    pub engine_force: f32,

    /// Peak braking force across all wheels, in newtons.
    #[serde(default = "default_brake_force")]
    pub brake_force: f32,

    /// Maximum steering angle in radians.
    #[serde(default = "default_steering_lock")]
    pub steering_lock: f32,

    /// Lateral friction coefficient: sideways tyre force saturates at
    /// `lateral_grip`× the wheel's suspension load.
    #[serde(default = "default_lateral_grip")]
    pub lateral_grip: f32,

    /// Rear lateral grip multiplier while the handbrake is on.
    #[serde(default = "default_handbrake_grip")]
    pub handbrake_grip: f32,

    /// Upward impulse per float point at full submersion, in N·s.
    #[serde(default = "default_buoyancy_impulse")]
    pub buoyancy_impulse: f32,

    /// Health the vehicle starts with.
    #[serde(default = "default_max_health")]
    pub max_health: f32,

    /// Accumulated local damage at which a panel dents.
    #[serde(default = "default_dent_threshold")]
    pub dent_threshold: f32,

    /// Single-impact magnitude at which a detachable panel tears loose.
    #[serde(default = "default_break_threshold")]
    pub break_threshold: f32,

    /// Per-panel damage accumulator decay, in damage units per second.
    #[serde(default = "default_damage_decay")]
    pub damage_decay: f32,

    #[serde(default)]
    pub suspension: SuspensionSpec,
}

impl Default for HandlingData {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            half_extents: default_half_extents(),
            centre_of_mass: default_centre_of_mass(),
            engine_force: default_engine_force(),
            brake_force: default_brake_force(),
            steering_lock: default_steering_lock(),
            lateral_grip: default_lateral_grip(),
            handbrake_grip: default_handbrake_grip(),
            buoyancy_impulse: default_buoyancy_impulse(),
            max_health: default_max_health(),
            dent_threshold: default_dent_threshold(),
            break_threshold: default_break_threshold(),
            damage_decay: default_damage_decay(),
            suspension: SuspensionSpec::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// VehicleSpec
// ---------------------------------------------------------------------------

/// Complete read-only description of a vehicle model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,

    #[serde(default)]
    pub handling: HandlingData,

    /// Seats, indexed by position in this list. Seat 0 is the driver.
    pub seats: Vec<SeatSpec>,

    pub wheels: Vec<WheelSpec>,

    #[serde(default)]
    pub panels: Vec<PanelSpec>,

    /// Chassis-local points the buoyancy model pushes up on. Defaults to
    /// the wheel mounts when empty.
    #[serde(default)]
    pub float_points: Vec<[f32; 3]>,

    /// Offset from a seat to where a character stands to board, with the
    /// lateral component mirrored to the seat's side of the car.
    #[serde(default = "default_entry_clearance")]
    pub entry_clearance: [f32; 3],
}

impl VehicleSpec {
    /// Validate the spec. A spec that fails here must never reach the
    /// physics world.
    pub fn validate(&self) -> Result<(), SpecError> {
        let h = &self.handling;
        for (field, value) in [
            ("mass", h.mass),
            ("engine_force", h.engine_force),
            ("brake_force", h.brake_force),
            ("steering_lock", h.steering_lock),
            ("lateral_grip", h.lateral_grip),
            ("max_health", h.max_health),
            ("dent_threshold", h.dent_threshold),
            ("break_threshold", h.break_threshold),
            ("suspension.stiffness", h.suspension.stiffness),
            ("suspension.damping", h.suspension.damping),
            ("suspension.rest_length", h.suspension.rest_length),
            ("suspension.travel", h.suspension.travel),
            ("suspension.wheel_radius", h.suspension.wheel_radius),
        ] {
            if value <= 0.0 {
                return Err(SpecError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("half_extents.x", h.half_extents[0]),
            ("half_extents.y", h.half_extents[1]),
            ("half_extents.z", h.half_extents[2]),
        ] {
            if value <= 0.0 {
                return Err(SpecError::NonPositive { field, value });
            }
        }
        if self.seats.is_empty() {
            return Err(SpecError::NoSeats);
        }
        if self.wheels.is_empty() {
            return Err(SpecError::NoWheels);
        }
        let mut seen = Vec::with_capacity(self.panels.len());
        for (index, panel) in self.panels.iter().enumerate() {
            let kind = panel.kind.name();
            if seen.contains(&panel.kind) {
                return Err(SpecError::DuplicatePanel { kind });
            }
            seen.push(panel.kind);

            match (&panel.hinge, panel.kind.detachable()) {
                (Some(_), false) => return Err(SpecError::UnexpectedHinge { index, kind }),
                (None, true) => return Err(SpecError::MissingHinge { index, kind }),
                _ => {}
            }
            if let Some(hinge) = &panel.hinge {
                if hinge.mass <= 0.0 {
                    return Err(SpecError::NonPositive {
                        field: "hinge.mass",
                        value: hinge.mass,
                    });
                }
                let axis_sq: f32 = hinge.axis.iter().map(|a| a * a).sum();
                if axis_sq <= 0.0 {
                    return Err(SpecError::NonPositive {
                        field: "hinge.axis length",
                        value: axis_sq,
                    });
                }
                let [lo, hi] = hinge.swing_limits;
                if lo > hi {
                    return Err(SpecError::ReversedSwingLimits { index, lo, hi });
                }
            }
        }
        Ok(())
    }

    /// Number of seats.
    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    /// Number of damage-tracked panels.
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Index of the panel of `kind`, if the model has one.
    pub fn panel_index(&self, kind: PanelKind) -> Option<usize> {
        self.panels.iter().position(|p| p.kind == kind)
    }

    /// Panel whose zone centre lies nearest `local` (chassis space).
    pub fn nearest_panel(&self, local: [f32; 3]) -> Option<usize> {
        let dist_sq = |p: &PanelSpec| -> f32 {
            let d = [
                p.offset[0] - local[0],
                p.offset[1] - local[1],
                p.offset[2] - local[2],
            ];
            d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
        };
        let mut best: Option<(usize, f32)> = None;
        for (i, panel) in self.panels.iter().enumerate() {
            let d = dist_sq(panel);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Buoyancy float points: the declared ones, or the wheel mounts when
    /// none are declared.
    pub fn effective_float_points(&self) -> Vec<[f32; 3]> {
        if self.float_points.is_empty() {
            self.wheels.iter().map(|w| w.offset).collect()
        } else {
            self.float_points.clone()
        }
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, SpecError> {
        let spec: Self = toml::from_str(content)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SpecError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

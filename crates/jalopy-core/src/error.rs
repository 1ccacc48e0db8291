use thiserror::Error;

/// Top-level error type for the jalopy workspace.
#[derive(Debug, Error)]
pub enum JalopyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Vehicle spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("Vehicle error: {0}")]
    Vehicle(#[from] VehicleError),
}

/// Simulation configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid physics_dt: {0} (must be > 0)")]
    InvalidPhysicsDt(f64),

    #[error("Invalid substeps: {0} (must be >= 1)")]
    InvalidSubsteps(u32),

    #[error("Gravity vector contains a non-finite component")]
    NonFiniteGravity,
}

/// Static vehicle specification errors.
///
/// Raised while loading or validating a [`VehicleSpec`]; a spec that fails
/// validation never reaches the physics world.
///
/// [`VehicleSpec`]: https://docs.rs/jalopy-spec
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Vehicle spec declares no seats")]
    NoSeats,

    #[error("Vehicle spec declares no wheels")]
    NoWheels,

    #[error("Non-positive {field}: {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("Panel {index} ({kind}) is not detachable but carries a hinge")]
    UnexpectedHinge { index: usize, kind: &'static str },

    #[error("Detachable panel {index} ({kind}) is missing its hinge")]
    MissingHinge { index: usize, kind: &'static str },

    #[error("Swing limits reversed for panel {index}: [{lo}, {hi}]")]
    ReversedSwingLimits { index: usize, lo: f32, hi: f32 },

    #[error("Duplicate panel kind {kind}")]
    DuplicatePanel { kind: &'static str },
}

/// Vehicle runtime errors.
///
/// Copy + static payloads for cheap propagation in per-tick paths. The
/// `*Missing` variants surface physics-world lookups that came back empty;
/// the operation that hit one is abandoned with the vehicle left in its
/// prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VehicleError {
    #[error("Seat index {seat} out of range: vehicle has {seat_count} seats")]
    InvalidSeat { seat: usize, seat_count: usize },

    #[error("Panel index {panel} out of range: vehicle has {panel_count} panels")]
    InvalidPanel { panel: usize, panel_count: usize },

    #[error("Panel {panel} is not detachable")]
    NotDetachable { panel: usize },

    #[error("Chassis rigid body missing from the physics world")]
    ChassisMissing,

    #[error("Loose panel {panel} has no rigid body in the physics world")]
    PanelBodyMissing { panel: usize },

    #[error("Hinge joint for panel {panel} missing from the physics world")]
    JointMissing { panel: usize },
}

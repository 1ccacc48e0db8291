//! Static vehicle specifications for the jalopy simulation.
//!
//! A [`VehicleSpec`] is the read-only description a vehicle is spawned
//! from: chassis handling data, seat and wheel layout, and the damage
//! panel set. Specs are plain data — serde types loadable from TOML — and
//! are validated before anything touches the physics world.
//!
//! # Example
//!
//! ```
//! use jalopy_spec::presets;
//!
//! let spec = presets::hatchback();
//! assert!(spec.validate().is_ok());
//! assert_eq!(spec.seat_count(), 4);
//! ```

pub mod presets;
pub mod types;

pub use types::{
    HandlingData, HingeSpec, PanelKind, PanelSpec, SeatSpec, SuspensionSpec, VehicleSpec, WheelSpec,
};

pub mod prelude {
    pub use crate::presets;
    pub use crate::types::{
        HandlingData, HingeSpec, PanelKind, PanelSpec, SeatSpec, SuspensionSpec, VehicleSpec,
        WheelSpec,
    };
}

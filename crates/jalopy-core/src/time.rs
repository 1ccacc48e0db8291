use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SimTime
// ---------------------------------------------------------------------------

/// Integer-nanosecond simulation clock.
///
/// Tracks elapsed simulated time as a monotonically increasing `u64`
/// nanosecond count plus the number of completed simulation steps, avoiding
/// floating-point accumulation drift over long drives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    Resource,
)]
pub struct SimTime {
    nanos: u64,
    ticks: u64,
}

impl SimTime {
    /// Create a new `SimTime` at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0, ticks: 0 }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Number of completed simulation steps.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed whole seconds (truncated).
    #[must_use]
    pub const fn secs(&self) -> u64 {
        self.nanos / 1_000_000_000
    }

    /// Elapsed seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Elapsed seconds as `f32`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f32(&self) -> f32 {
        self.nanos as f32 / 1_000_000_000.0
    }

    /// Record one completed simulation step of `dt_secs` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance_step(&mut self, dt_secs: f64) {
        let delta_nanos = (dt_secs * 1_000_000_000.0) as u64;
        self.nanos = self.nanos.saturating_add(delta_nanos);
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Reset the clock to zero.
    pub const fn reset(&mut self) {
        self.nanos = 0;
        self.ticks = 0;
    }
}

//! Shared test fixtures and utilities for jalopy crates.
//!
//! Provides reusable helpers for building headless Bevy test apps,
//! laying down ground colliders and spawning vehicles at ride height.

pub mod app;
pub mod spawn;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::{full_test_app, minimal_test_app, physics_test_app};
pub use spawn::{SPAWN_HEIGHT, spawn_ground_plane, spawn_occupant, spawn_test_vehicle, test_spec};

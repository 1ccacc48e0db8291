//! ECS components linking entities to their rapier bodies.

use bevy::prelude::*;
use rapier3d::prelude::RigidBodyHandle;

// ---------------------------------------------------------------------------
// PhysicsBody
// ---------------------------------------------------------------------------

/// Links an entity to its rigid body in the [`PhysicsContext`].
///
/// Entities carrying this component get their [`Transform`] overwritten
/// from the body pose after every pipeline step, so the ECS transform is
/// the physics transform outside of mid-step integration.
///
/// [`PhysicsContext`]: crate::context::PhysicsContext
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    /// Rapier handle for the rigid body.
    pub handle: RigidBodyHandle,
}

impl PhysicsBody {
    /// Wrap a rapier handle.
    #[must_use]
    pub fn new(handle: RigidBodyHandle) -> Self {
        Self { handle }
    }
}

// ---------------------------------------------------------------------------
// GroundPlane
// ---------------------------------------------------------------------------

/// Marker for the static ground body.
#[derive(Component, Debug, Default)]
pub struct GroundPlane;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn components_are_send_sync() {
        assert_send_sync::<PhysicsBody>();
        assert_send_sync::<GroundPlane>();
    }

    #[test]
    fn physics_body_wraps_handle() {
        let body = PhysicsBody::new(RigidBodyHandle::invalid());
        assert_eq!(body.handle, RigidBodyHandle::invalid());
    }
}

//! Ray queries that ignore the querying vehicle's own chassis.
//!
//! Wheel rays originate at hardpoints *inside* the chassis hull, so an
//! unfiltered cast would always report the vehicle's own collider at
//! fraction zero. [`WheelRaycaster`] excludes the chassis body by identity
//! rather than by distance or collision group, so rays still see every
//! other vehicle, detached panels included.

use bevy::prelude::Vec3;
use rapier3d::prelude::{ColliderHandle, QueryFilter, Ray, RigidBodyHandle};

use crate::context::PhysicsContext;
use crate::convert::{from_na, from_na_point, to_na, to_na_point};

// ---------------------------------------------------------------------------
// RayHit
// ---------------------------------------------------------------------------

/// Nearest intersection along a cast segment.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Collider that was hit.
    pub collider: ColliderHandle,
    /// Body owning the hit collider, if it has one.
    pub body: Option<RigidBodyHandle>,
    /// Fraction along the segment in `[0, 1]`.
    pub fraction: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// World-space surface normal at the hit.
    pub normal: Vec3,
}

// ---------------------------------------------------------------------------
// WheelRaycaster
// ---------------------------------------------------------------------------

/// Segment caster bound to one chassis body, which its rays never report.
#[derive(Debug, Clone, Copy)]
pub struct WheelRaycaster {
    exclude: RigidBodyHandle,
}

impl WheelRaycaster {
    /// Create a caster that ignores `chassis` in every query.
    #[must_use]
    pub fn new(chassis: RigidBodyHandle) -> Self {
        Self { exclude: chassis }
    }

    /// Nearest hit on the segment `from → to`, skipping the excluded body.
    ///
    /// Returns `None` when nothing else intersects the segment, including
    /// the degenerate `from == to` case.
    #[must_use]
    pub fn cast(&self, ctx: &PhysicsContext, from: Vec3, to: Vec3) -> Option<RayHit> {
        let segment = to - from;
        if segment.length_squared() <= f32::EPSILON {
            return None;
        }

        // Unnormalized direction with max_toi = 1.0 makes the reported
        // time-of-impact the fraction along the segment directly.
        let ray = Ray::new(to_na_point(from), to_na(segment));
        let filter = QueryFilter::new().exclude_rigid_body(self.exclude);

        let (collider, hit) = ctx.query_pipeline.cast_ray_and_get_normal(
            &ctx.bodies,
            &ctx.colliders,
            &ray,
            1.0,
            true,
            filter,
        )?;

        Some(RayHit {
            collider,
            body: ctx.colliders.get(collider).and_then(|c| c.parent()),
            fraction: hit.time_of_impact,
            point: from_na_point(&ray.point_at(hit.time_of_impact)),
            normal: from_na(&hit.normal),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

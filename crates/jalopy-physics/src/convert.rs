//! Conversions between bevy's glam types and rapier's nalgebra types.
//!
//! The ECS side of the workspace speaks glam (`Vec3`, `Quat`); rapier
//! speaks nalgebra. Crossing the boundary is always explicit through these
//! helpers rather than a nalgebra conversion feature, so the two math
//! stacks can be upgraded independently.

use bevy::prelude::{Quat, Vec3};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};

/// glam vector → nalgebra vector.
#[must_use]
pub fn to_na(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

/// glam vector → nalgebra point.
#[must_use]
pub fn to_na_point(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

/// nalgebra vector → glam vector.
#[must_use]
pub fn from_na(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// nalgebra point → glam vector.
#[must_use]
pub fn from_na_point(p: &Point3<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// glam quaternion → nalgebra unit quaternion.
#[must_use]
pub fn to_na_quat(q: Quat) -> UnitQuaternion<f32> {
    // nalgebra stores w first.
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// nalgebra unit quaternion → glam quaternion.
#[must_use]
pub fn from_na_quat(q: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Position + rotation → rapier isometry.
#[must_use]
pub fn to_iso(position: Vec3, rotation: Quat) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::from(to_na(position)), to_na_quat(rotation))
}

/// Rapier isometry → position + rotation.
#[must_use]
pub fn from_iso(iso: &Isometry3<f32>) -> (Vec3, Quat) {
    (from_na(&iso.translation.vector), from_na_quat(&iso.rotation))
}

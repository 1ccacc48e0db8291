//! Hinged loose panels: secondary rigid bodies revolute-jointed to the
//! chassis.
//!
//! A [`HingeEntry`] exists exactly as long as its panel is in the broken,
//! still-attached state. Creation builds body, collider and joint in the
//! physics world; destruction removes the joint before the body so rapier
//! never sees a joint with a dangling attachment. Entries are owned by the
//! panel attachment state in [`VehicleDamage`](crate::damage::VehicleDamage),
//! which is what ties their lifetime to the vehicle's.

use bevy::prelude::Vec3;
use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion};
use rapier3d::prelude::{
    ColliderBuilder, ColliderHandle, ImpulseJointHandle, JointAxis, RevoluteJointBuilder,
    RigidBodyBuilder, RigidBodyHandle,
};

use jalopy_core::VehicleError;
use jalopy_physics::context::PhysicsContext;
use jalopy_physics::convert::{to_na, to_na_point};
use jalopy_spec::PanelSpec;

// ---------------------------------------------------------------------------
// HingeEntry
// ---------------------------------------------------------------------------

/// Physics-world handles for one loose panel.
#[derive(Debug)]
pub struct HingeEntry {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    joint: ImpulseJointHandle,
    locked: bool,
    /// Spec swing limits, kept so unlocking can restore them.
    swing_limits: [f32; 2],
}

impl HingeEntry {
    /// Rapier handle of the loose panel body.
    #[must_use]
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    /// Rapier handle of the panel's collider.
    #[must_use]
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    /// Rapier handle of the revolute joint anchoring the panel.
    #[must_use]
    pub fn joint(&self) -> ImpulseJointHandle {
        self.joint
    }

    /// Whether the swing is currently pinned shut.
    #[must_use]
    pub fn locked(&self) -> bool {
        self.locked
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Break a panel loose: spawn its body at the panel's current world
/// transform and hinge it to the chassis.
///
/// The revolute axis is the panel's natural swing axis (vertical for
/// doors, lateral for bonnet/boot) with the spec's angular limits. Contact
/// between panel and chassis is disabled on the joint, so the loose part
/// does not fight the hull it just came off.
///
/// On error nothing is left behind in the physics world.
pub fn create(
    ctx: &mut PhysicsContext,
    chassis: RigidBodyHandle,
    panel_index: usize,
    panel: &PanelSpec,
) -> Result<HingeEntry, VehicleError> {
    let Some(hinge) = &panel.hinge else {
        return Err(VehicleError::NotDetachable { panel: panel_index });
    };
    let chassis_pose = *ctx
        .body(chassis)
        .ok_or(VehicleError::ChassisMissing)?
        .position();

    let anchor_local = Vec3::from_array(panel.offset);
    let panel_pose = chassis_pose
        * Isometry3::from_parts(
            Translation3::from(to_na(anchor_local)),
            UnitQuaternion::identity(),
        );

    let body = ctx.insert_body(RigidBodyBuilder::dynamic().position(panel_pose).build());
    let [hx, hy, hz] = hinge.half_extents;
    let collider = ctx.insert_collider(
        ColliderBuilder::cuboid(hx, hy, hz).mass(hinge.mass).build(),
        body,
    );

    let axis = Unit::new_normalize(to_na(Vec3::from_array(hinge.axis)));
    let joint = RevoluteJointBuilder::new(axis)
        .local_anchor1(to_na_point(anchor_local))
        .local_anchor2(nalgebra::Point3::origin())
        .limits(hinge.swing_limits)
        .contacts_enabled(false)
        .build();
    let joint = ctx.insert_joint(chassis, body, joint);

    Ok(HingeEntry {
        body,
        collider,
        joint,
        locked: false,
        swing_limits: hinge.swing_limits,
    })
}

/// Remove a loose panel from the physics world, joint before body.
pub fn destroy(ctx: &mut PhysicsContext, entry: HingeEntry) {
    ctx.remove_joint(entry.joint);
    ctx.remove_body(entry.body);
}

/// Pin the swing shut (`locked`) or restore the spec limits.
///
/// Locking is purely a joint-limit change: the panel stays broken and its
/// body stays in the world.
pub fn set_locked(
    ctx: &mut PhysicsContext,
    entry: &mut HingeEntry,
    panel_index: usize,
    locked: bool,
) -> Result<(), VehicleError> {
    let Some(joint) = ctx.impulse_joints.get_mut(entry.joint, true) else {
        return Err(VehicleError::JointMissing { panel: panel_index });
    };
    let limits = if locked { [0.0, 0.0] } else { entry.swing_limits };
    joint.data.set_limits(JointAxis::AngX, limits);
    entry.locked = locked;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jalopy_spec::{presets, PanelKind};
    use rapier3d::prelude::RigidBodyBuilder;

    fn chassis_ctx() -> (PhysicsContext, RigidBodyHandle) {
        let mut ctx = PhysicsContext::default();
        let chassis = ctx.insert_body(
            RigidBodyBuilder::dynamic()
                .translation(nalgebra::vector![0.0, 1.0, 0.0])
                .additional_mass(1200.0)
                .build(),
        );
        (ctx, chassis)
    }

    fn door_panel() -> (usize, PanelSpec) {
        let spec = presets::hatchback();
        let index = spec.panel_index(PanelKind::DoorFrontLeft).unwrap();
        (index, spec.panels[index].clone())
    }

    #[test]
    fn create_adds_body_collider_and_joint() {
        let (mut ctx, chassis) = chassis_ctx();
        let (index, panel) = door_panel();

        let entry = create(&mut ctx, chassis, index, &panel).unwrap();

        assert_eq!(ctx.bodies.len(), 2);
        assert_eq!(ctx.colliders.len(), 1);
        assert!(ctx.impulse_joints.get(entry.joint()).is_some());
        assert!(!entry.locked());
    }

    #[test]
    fn created_panel_sits_at_panel_offset() {
        let (mut ctx, chassis) = chassis_ctx();
        let (index, panel) = door_panel();

        let entry = create(&mut ctx, chassis, index, &panel).unwrap();

        let pos = ctx.body(entry.body()).unwrap().translation();
        // Chassis at (0, 1, 0), door offset (-0.92, 0.1, -0.45).
        assert!((pos.x - panel.offset[0]).abs() < 1e-5);
        assert!((pos.y - (1.0 + panel.offset[1])).abs() < 1e-5);
        assert!((pos.z - panel.offset[2]).abs() < 1e-5);
    }

    #[test]
    fn create_rejects_cosmetic_panel() {
        let (mut ctx, chassis) = chassis_ctx();
        let spec = presets::hatchback();
        let index = spec.panel_index(PanelKind::Windscreen).unwrap();

        let err = create(&mut ctx, chassis, index, &spec.panels[index]).unwrap_err();
        assert_eq!(err, VehicleError::NotDetachable { panel: index });
        assert_eq!(ctx.bodies.len(), 1);
    }

    #[test]
    fn destroy_removes_joint_and_body() {
        let (mut ctx, chassis) = chassis_ctx();
        let (index, panel) = door_panel();
        let entry = create(&mut ctx, chassis, index, &panel).unwrap();
        let joint = entry.joint();

        destroy(&mut ctx, entry);

        assert_eq!(ctx.bodies.len(), 1);
        assert_eq!(ctx.colliders.len(), 0);
        assert!(ctx.impulse_joints.get(joint).is_none());
    }

    #[test]
    fn lock_and_unlock_toggle_limits() {
        let (mut ctx, chassis) = chassis_ctx();
        let (index, panel) = door_panel();
        let mut entry = create(&mut ctx, chassis, index, &panel).unwrap();

        set_locked(&mut ctx, &mut entry, index, true).unwrap();
        assert!(entry.locked());
        let joint = ctx.impulse_joints.get(entry.joint()).unwrap();
        let limits = joint.data.limits(JointAxis::AngX).unwrap();
        assert!(limits.min.abs() < f32::EPSILON && limits.max.abs() < f32::EPSILON);

        set_locked(&mut ctx, &mut entry, index, false).unwrap();
        assert!(!entry.locked());
        let joint = ctx.impulse_joints.get(entry.joint()).unwrap();
        let limits = joint.data.limits(JointAxis::AngX).unwrap();
        assert!((limits.max - panel.hinge.as_ref().unwrap().swing_limits[1]).abs() < 1e-6);
    }

    #[test]
    fn set_locked_errors_on_missing_joint() {
        let (mut ctx, chassis) = chassis_ctx();
        let (index, panel) = door_panel();
        let mut entry = create(&mut ctx, chassis, index, &panel).unwrap();

        ctx.remove_joint(entry.joint());

        let err = set_locked(&mut ctx, &mut entry, index, true).unwrap_err();
        assert_eq!(err, VehicleError::JointMissing { panel: index });
    }

    #[test]
    fn loose_door_stays_jointed_over_steps() {
        let (mut ctx, chassis) = chassis_ctx();
        ctx.insert_collider(
            rapier3d::prelude::ColliderBuilder::cuboid(0.9, 0.55, 2.1)
                .density(0.0)
                .build(),
            chassis,
        );
        let (index, panel) = door_panel();
        let entry = create(&mut ctx, chassis, index, &panel).unwrap();

        for _ in 0..120 {
            ctx.step();
        }

        // The joint keeps the loose door near its chassis anchor even in
        // free fall.
        let chassis_pos = *ctx.body(chassis).unwrap().translation();
        let door_pos = *ctx.body(entry.body()).unwrap().translation();
        let dist = (door_pos - chassis_pos).norm();
        assert!(dist < 2.5, "door drifted {dist} m from chassis");
    }
}

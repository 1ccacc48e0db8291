//! Vehicle damage: health, the 13-flag damage mask, and the per-panel
//! frame state machine.
//!
//! Panel attachment is a tagged variant so a hinge entry cannot exist
//! without the broken state that requires it: `Rigid` panels move with the
//! chassis, `Hinged` panels own exactly one live [`HingeEntry`], `Severed`
//! panels have nothing left in the physics world. The public projection
//! [`FrameState`] collapses this to `Ok`/`Dam`/`Broken` for callers.

use bevy::prelude::{Component, Vec3};
use bitflags::bitflags;

use jalopy_core::VehicleError;
use jalopy_physics::context::PhysicsContext;
use jalopy_physics::convert::to_na_point;
use jalopy_spec::{PanelKind, VehicleSpec};

use crate::components::Vehicle;
use crate::hinge::{self, HingeEntry};

// ---------------------------------------------------------------------------
// DamageFlags
// ---------------------------------------------------------------------------

bitflags! {
    /// Per-panel damage mask. Bit values are stable: they are savegame and
    /// network currency for consumers, never renumbered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DamageFlags: u32 {
        const BONNET = 1 << 0;
        const DOOR_FRONT_LEFT = 1 << 1;
        const DOOR_FRONT_RIGHT = 1 << 2;
        const DOOR_REAR_LEFT = 1 << 3;
        const DOOR_REAR_RIGHT = 1 << 4;
        const BOOT = 1 << 5;
        const WINDSCREEN = 1 << 6;
        const BUMPER_FRONT = 1 << 7;
        const BUMPER_REAR = 1 << 8;
        const WING_FRONT_LEFT = 1 << 9;
        const WING_FRONT_RIGHT = 1 << 10;
        const WING_REAR_LEFT = 1 << 11;
        const WING_REAR_RIGHT = 1 << 12;
    }
}

impl DamageFlags {
    /// The flag for a panel kind. Every kind maps to exactly one flag.
    #[must_use]
    pub const fn for_panel(kind: PanelKind) -> Self {
        match kind {
            PanelKind::Bonnet => Self::BONNET,
            PanelKind::DoorFrontLeft => Self::DOOR_FRONT_LEFT,
            PanelKind::DoorFrontRight => Self::DOOR_FRONT_RIGHT,
            PanelKind::DoorRearLeft => Self::DOOR_REAR_LEFT,
            PanelKind::DoorRearRight => Self::DOOR_REAR_RIGHT,
            PanelKind::Boot => Self::BOOT,
            PanelKind::Windscreen => Self::WINDSCREEN,
            PanelKind::BumperFront => Self::BUMPER_FRONT,
            PanelKind::BumperRear => Self::BUMPER_REAR,
            PanelKind::WingFrontLeft => Self::WING_FRONT_LEFT,
            PanelKind::WingFrontRight => Self::WING_FRONT_RIGHT,
            PanelKind::WingRearLeft => Self::WING_REAR_LEFT,
            PanelKind::WingRearRight => Self::WING_REAR_RIGHT,
        }
    }
}

// ---------------------------------------------------------------------------
// DamageInfo
// ---------------------------------------------------------------------------

/// What inflicted a damage event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Collision,
    Explosion,
    Bullet,
    Fire,
}

/// One damage event, in world space.
#[derive(Debug, Clone, Copy)]
pub struct DamageInfo {
    /// Where the damage came from (projectile origin, other body's centre).
    pub source: Vec3,
    /// Impact point; attributed to the nearest panel zone.
    pub position: Vec3,
    /// Damage units removed from health and added to the panel accumulator.
    pub magnitude: f32,
    pub kind: DamageKind,
}

/// Damage events queued for the maintenance tick.
///
/// Collision and gameplay systems push here from anywhere in the frame;
/// the `Maintain` set drains the queue through
/// [`VehicleDamage::take_damage`] so panel transitions and hinge creation
/// happen at one sanctioned point.
#[derive(Component, Debug, Default)]
pub struct PendingDamage {
    queue: Vec<DamageInfo>,
}

impl PendingDamage {
    /// Queue a damage event.
    pub fn push(&mut self, info: DamageInfo) {
        self.queue.push(info);
    }

    /// Drain all queued events in arrival order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, DamageInfo> {
        self.queue.drain(..)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

// ---------------------------------------------------------------------------
// FrameState / Attachment
// ---------------------------------------------------------------------------

/// Public panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Pristine, rigidly attached.
    Ok,
    /// Dented, still rigidly attached.
    Dam,
    /// Torn loose (hinged) or gone entirely.
    Broken,
}

/// How a panel is attached to the chassis.
#[derive(Debug)]
pub enum Attachment {
    /// Moves with the chassis; `dented` is the cosmetic damage bit.
    Rigid { dented: bool },
    /// Independent body constrained by a hinge.
    Hinged(HingeEntry),
    /// Physically removed; nothing left in the physics world.
    Severed,
}

impl Attachment {
    /// Collapse to the public [`FrameState`].
    #[must_use]
    pub fn frame_state(&self) -> FrameState {
        match self {
            Self::Rigid { dented: false } => FrameState::Ok,
            Self::Rigid { dented: true } => FrameState::Dam,
            Self::Hinged(_) | Self::Severed => FrameState::Broken,
        }
    }
}

#[derive(Debug)]
struct PanelDamage {
    attachment: Attachment,
    /// Sub-break damage accumulated at this panel; decays over time.
    accumulated: f32,
}

// ---------------------------------------------------------------------------
// VehicleDamage
// ---------------------------------------------------------------------------

/// Health, damage mask and panel states for one vehicle.
#[derive(Component, Debug)]
pub struct VehicleDamage {
    health: f32,
    flags: DamageFlags,
    panels: Vec<PanelDamage>,
}

impl VehicleDamage {
    /// Fresh damage state for a spec: full health, no flags, every panel
    /// pristine.
    #[must_use]
    pub fn new(spec: &VehicleSpec) -> Self {
        Self {
            health: spec.handling.max_health,
            flags: DamageFlags::empty(),
            panels: spec
                .panels
                .iter()
                .map(|_| PanelDamage {
                    attachment: Attachment::Rigid { dented: false },
                    accumulated: 0.0,
                })
                .collect(),
        }
    }

    /// Current health. Clamped at zero.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether health has reached zero. A wrecked vehicle loses engine and
    /// brake forces but remains a live object.
    #[must_use]
    pub fn is_wrecked(&self) -> bool {
        self.health <= 0.0
    }

    /// The damage mask.
    #[must_use]
    pub fn flags(&self) -> DamageFlags {
        self.flags
    }

    /// Set or clear flags directly, independent of any panel state.
    /// Scripted damage (mission setup, cosmetics) uses this.
    pub fn set_flags(&mut self, flags: DamageFlags, on: bool) {
        self.flags.set(flags, on);
    }

    /// Public state of a panel.
    pub fn frame_state(&self, panel: usize) -> Result<FrameState, VehicleError> {
        Ok(self.panel(panel)?.attachment.frame_state())
    }

    /// Accumulated sub-break damage at a panel.
    pub fn accumulated(&self, panel: usize) -> Result<f32, VehicleError> {
        Ok(self.panel(panel)?.accumulated)
    }

    /// Number of live hinge entries (panels currently swinging loose).
    #[must_use]
    pub fn hinge_count(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| matches!(p.attachment, Attachment::Hinged(_)))
            .count()
    }

    /// Live hinge entries with their panel indices. Used by teleporting
    /// code to displace loose panels together with the chassis.
    pub fn hinged_entries(&self) -> impl Iterator<Item = (usize, &HingeEntry)> {
        self.panels.iter().enumerate().filter_map(|(i, p)| {
            if let Attachment::Hinged(entry) = &p.attachment {
                Some((i, entry))
            } else {
                None
            }
        })
    }

    fn panel(&self, panel: usize) -> Result<&PanelDamage, VehicleError> {
        self.panels.get(panel).ok_or(VehicleError::InvalidPanel {
            panel,
            panel_count: self.panels.len(),
        })
    }

    fn check_panel(&self, panel: usize) -> Result<(), VehicleError> {
        self.panel(panel).map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Damage application
    // -----------------------------------------------------------------------

    /// Apply one damage event.
    ///
    /// Health drops by the magnitude, clamped at zero; the event is
    /// attributed to the nearest panel zone, where it either tears a
    /// detachable panel loose (magnitude at or above the break threshold)
    /// or accumulates toward a dent. Returns whether *this* application
    /// took health from positive to zero — exactly one call in a damage
    /// sequence reports `true`, and further calls are safe no-ops on
    /// health.
    pub fn take_damage(
        &mut self,
        ctx: &mut PhysicsContext,
        vehicle: &Vehicle,
        info: &DamageInfo,
    ) -> Result<bool, VehicleError> {
        let spec = vehicle.spec();
        let chassis_pose = *ctx
            .body(vehicle.chassis())
            .ok_or(VehicleError::ChassisMissing)?
            .position();

        let previous = self.health;
        self.health = (self.health - info.magnitude).max(0.0);
        let destroyed = previous > 0.0 && self.health <= 0.0;

        let local = chassis_pose.inverse_transform_point(&to_na_point(info.position));
        if let Some(panel) = spec.nearest_panel([local.x, local.y, local.z]) {
            let kind = spec.panels[panel].kind;
            if info.magnitude >= spec.handling.break_threshold && kind.detachable() {
                self.break_panel(ctx, vehicle, panel)?;
            } else {
                self.panels[panel].accumulated += info.magnitude;
                if self.panels[panel].accumulated >= spec.handling.dent_threshold {
                    self.dent_panel(panel, kind);
                }
            }
        }

        Ok(destroyed)
    }

    /// Dent a rigid panel: set the cosmetic bit and its flag. Hinged and
    /// severed panels are already past denting.
    fn dent_panel(&mut self, panel: usize, kind: PanelKind) {
        if let Attachment::Rigid { dented } = &mut self.panels[panel].attachment {
            *dented = true;
            self.flags.insert(DamageFlags::for_panel(kind));
        }
    }

    /// Transition a rigid panel to hinged. No-op if already broken.
    fn break_panel(
        &mut self,
        ctx: &mut PhysicsContext,
        vehicle: &Vehicle,
        panel: usize,
    ) -> Result<(), VehicleError> {
        let spec = vehicle.spec();
        if matches!(
            self.panels[panel].attachment,
            Attachment::Hinged(_) | Attachment::Severed
        ) {
            return Ok(());
        }
        // Create first: a failed creation must leave the prior attachment
        // untouched.
        let entry = hinge::create(ctx, vehicle.chassis(), panel, &spec.panels[panel])?;
        self.panels[panel].attachment = Attachment::Hinged(entry);
        self.flags.insert(DamageFlags::for_panel(spec.panels[panel].kind));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Explicit state control
    // -----------------------------------------------------------------------

    /// Force a panel to a state. Idempotent: requesting the current state
    /// is a no-op. Entering `Broken` creates the hinge entry; leaving it
    /// destroys the entry — no transition skips the hinge lifecycle.
    ///
    /// `Broken` on a non-detachable panel is rejected
    /// (`VehicleError::NotDetachable`); impact damage saturates such
    /// panels at `Dam` instead.
    pub fn set_frame_state(
        &mut self,
        ctx: &mut PhysicsContext,
        vehicle: &Vehicle,
        panel: usize,
        state: FrameState,
    ) -> Result<(), VehicleError> {
        self.check_panel(panel)?;
        if self.panels[panel].attachment.frame_state() == state {
            return Ok(());
        }
        let spec = vehicle.spec();
        let kind = spec.panels[panel].kind;

        match state {
            FrameState::Ok => {
                self.reattach(ctx, panel, false);
                self.flags.remove(DamageFlags::for_panel(kind));
                self.panels[panel].accumulated = 0.0;
            }
            FrameState::Dam => {
                self.reattach(ctx, panel, true);
                self.flags.insert(DamageFlags::for_panel(kind));
            }
            FrameState::Broken => {
                if !kind.detachable() {
                    return Err(VehicleError::NotDetachable { panel });
                }
                self.break_panel(ctx, vehicle, panel)?;
            }
        }
        Ok(())
    }

    /// Re-parent a panel rigidly, destroying its hinge entry if one is
    /// live.
    fn reattach(&mut self, ctx: &mut PhysicsContext, panel: usize, dented: bool) {
        let prior = std::mem::replace(
            &mut self.panels[panel].attachment,
            Attachment::Rigid { dented },
        );
        if let Attachment::Hinged(entry) = prior {
            hinge::destroy(ctx, entry);
        }
    }

    /// Pin a broken panel's swing shut or restore its spec limits.
    ///
    /// Requires a live hinge: locking never changes [`FrameState`], so a
    /// panel without a joint in the world has nothing to lock and the call
    /// fails with `JointMissing`.
    pub fn set_hinge_locked(
        &mut self,
        ctx: &mut PhysicsContext,
        panel: usize,
        locked: bool,
    ) -> Result<(), VehicleError> {
        self.check_panel(panel)?;
        match &mut self.panels[panel].attachment {
            Attachment::Hinged(entry) => hinge::set_locked(ctx, entry, panel, locked),
            Attachment::Rigid { .. } | Attachment::Severed => {
                Err(VehicleError::JointMissing { panel })
            }
        }
    }

    /// Tear a detachable panel off entirely: its joint and body are
    /// removed and the panel reports `Broken` with nothing left in the
    /// physics world. Idempotent on already-severed panels; repair via
    /// `set_frame_state(panel, Ok)`.
    pub fn tear_off(
        &mut self,
        ctx: &mut PhysicsContext,
        vehicle: &Vehicle,
        panel: usize,
    ) -> Result<(), VehicleError> {
        self.check_panel(panel)?;
        let spec = vehicle.spec();
        let kind = spec.panels[panel].kind;
        if !kind.detachable() {
            return Err(VehicleError::NotDetachable { panel });
        }
        let prior = std::mem::replace(&mut self.panels[panel].attachment, Attachment::Severed);
        if let Attachment::Hinged(entry) = prior {
            hinge::destroy(ctx, entry);
        }
        self.flags.insert(DamageFlags::for_panel(kind));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Decay every panel's damage accumulator toward zero, so scattered
    /// light hits do not dent a panel that one equal-total hit would.
    pub fn decay(&mut self, spec: &VehicleSpec, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let step = spec.handling.damage_decay * dt;
        for panel in &mut self.panels {
            panel.accumulated = (panel.accumulated - step).max(0.0);
        }
    }

    /// Make the flag mask agree with panel states: every dented, hinged
    /// or severed panel has its flag set. Flags raised directly through
    /// [`set_flags`](Self::set_flags) are left alone.
    pub fn reconcile_flags(&mut self, spec: &VehicleSpec) {
        for (panel, state) in self.panels.iter().enumerate() {
            if !matches!(state.attachment, Attachment::Rigid { dented: false }) {
                if let Some(p) = spec.panels.get(panel) {
                    self.flags.insert(DamageFlags::for_panel(p.kind));
                }
            }
        }
    }

    /// Destroy every live hinge entry, joint before body. Called on
    /// vehicle despawn; hinged panels end up `Severed`, the rest keep
    /// their attachment.
    pub fn release_hinges(&mut self, ctx: &mut PhysicsContext) {
        for panel in &mut self.panels {
            if matches!(panel.attachment, Attachment::Hinged(_)) {
                let prior = std::mem::replace(&mut panel.attachment, Attachment::Severed);
                if let Attachment::Hinged(entry) = prior {
                    hinge::destroy(ctx, entry);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

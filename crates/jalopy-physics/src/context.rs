//! Bevy resource wrapping all Rapier3D physics pipeline state.

use bevy::prelude::{Resource, Vec3};
use rapier3d::prelude::{
    CCDSolver, Collider, ColliderHandle, ColliderSet, DefaultBroadPhase, GenericJoint,
    ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    NarrowPhase, PhysicsPipeline, QueryPipeline, RigidBody, RigidBodyHandle, RigidBodySet,
};

use jalopy_core::SimConfig;

use crate::convert::to_na;

// ---------------------------------------------------------------------------
// PhysicsContext
// ---------------------------------------------------------------------------

/// All rapier state in a single Bevy resource.
///
/// `PhysicsPipeline::step()` requires mutable access to every set
/// simultaneously, so they must all live together. Vehicle code never
/// touches rapier sets directly except through this resource, which keeps
/// handle bookkeeping (joint removal wakes bodies, body removal drops
/// attached colliders and joints) in one place.
#[derive(Resource)]
pub struct PhysicsContext {
    // -- Rapier sets --
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,

    // -- Pipeline objects --
    pub pipeline: PhysicsPipeline,
    pub islands: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    // -- Parameters --
    pub integration_parameters: IntegrationParameters,
    pub gravity: Vec3,
    /// Number of pipeline substeps per simulation frame.
    pub substeps: u32,
}

impl Default for PhysicsContext {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl PhysicsContext {
    /// Create a new context with given gravity, substep timestep, and
    /// substep count.
    #[must_use]
    pub fn new(gravity: Vec3, substep_dt: f32, substeps: u32) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: substep_dt,
            ..IntegrationParameters::default()
        };

        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters,
            gravity,
            substeps,
        }
    }

    /// Create a context from a [`SimConfig`].
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let substep_dt = config.substep_dt() as f32;
        Self::new(Vec3::from_array(config.gravity), substep_dt, config.substeps)
    }

    /// Insert a rigid body and return its handle.
    pub fn insert_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.bodies.insert(body)
    }

    /// Insert a collider attached to an existing body.
    pub fn insert_collider(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.colliders
            .insert_with_parent(collider, parent, &mut self.bodies)
    }

    /// Insert an impulse joint between two bodies, waking both.
    pub fn insert_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        joint: impl Into<GenericJoint>,
    ) -> ImpulseJointHandle {
        self.impulse_joints.insert(body1, body2, joint, true)
    }

    /// Remove an impulse joint, waking the bodies it linked.
    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joints.remove(handle, true);
    }

    /// Remove a rigid body together with its attached colliders and any
    /// joints referencing it.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Shared access to a rigid body.
    #[must_use]
    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Mutable access to a rigid body.
    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Incrementally rebuild the query acceleration structure.
    ///
    /// Must run after collider insertion/removal and before any ray query
    /// in the same frame; the pipeline step also refreshes it.
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    /// Run one physics substep.
    pub fn step(&mut self) {
        self.pipeline.step(
            &to_na(self.gravity),
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

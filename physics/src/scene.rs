//! The simulated scene.
//!
//! A [`Scene`] holds the backend state for one set of actors together with
//! the filter policy and event callback it was created with. Scenes are made
//! and owned by a [`crate::World`]; stepping lives in [`crate::simulation`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rapier3d::prelude::*;

use crate::actor::{Actor, ActorHandle, ActorKind, ActorState, ShapeHandle};
use crate::debug::SceneDebugClient;
use crate::error::{Result, WorldError};
use crate::events::{ContactEvents, ContactReportCallback, SimulationEventCallback};
use crate::filter::{FilterData, FilterPolicy, PolicyHooks, report_all_contacts};
use crate::material::MaterialHandle;
use crate::math::Vec3;
use crate::simulation::{PendingStep, StepEventCollector};

/// Everything needed to build a scene.
#[derive(Clone)]
pub struct SceneDesc {
    pub gravity: Vec3,
    pub filter_policy: FilterPolicy,
    pub callback: Arc<dyn SimulationEventCallback>,
    /// Set when `callback` is a [`ContactReportCallback`] the scene should expose.
    pub contact_report: Option<Arc<ContactReportCallback>>,
}

impl SceneDesc {
    /// Report every contact into a fresh [`ContactReportCallback`].
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            filter_policy: report_all_contacts,
            callback: Arc::new(crate::events::NoopCallback),
            contact_report: None,
        }
        .with_contact_report(Arc::new(ContactReportCallback::new()))
    }

    pub fn with_filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    /// Deliver notifications to `callback`. The scene then has no contact
    /// report of its own to read back.
    pub fn with_callback(mut self, callback: Arc<dyn SimulationEventCallback>) -> Self {
        self.callback = callback;
        self.contact_report = None;
        self
    }

    pub fn with_contact_report(mut self, report: Arc<ContactReportCallback>) -> Self {
        self.callback = report.clone();
        self.contact_report = Some(report);
        self
    }
}

/// Bookkeeping for an actor the scene owns.
#[derive(Clone, Debug)]
pub(crate) struct ActorRecord {
    pub kind: ActorKind,
    pub shape: ColliderHandle,
    pub material: MaterialHandle,
    pub name: Option<String>,
}

pub struct Scene {
    pub(crate) gravity: Vec3,
    pub(crate) policy: FilterPolicy,
    pub(crate) hooks: PolicyHooks,
    pub(crate) callback: Arc<dyn SimulationEventCallback>,
    pub(crate) contact_report: Option<Arc<ContactReportCallback>>,
    pub(crate) debug_client: Option<SceneDebugClient>,

    pub(crate) params: IntegrationParameters,
    pub(crate) pipeline: PhysicsPipeline,
    pub(crate) islands: IslandManager,
    pub(crate) broad_phase: BroadPhaseBvh,
    pub(crate) narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    pub(crate) impulse_joints: ImpulseJointSet,
    pub(crate) multibody_joints: MultibodyJointSet,
    pub(crate) ccd_solver: CCDSolver,

    pub(crate) actors: HashMap<RigidBodyHandle, ActorRecord>,
    pub(crate) collector: StepEventCollector,
    pub(crate) pending: Option<PendingStep>,
    pub(crate) step_count: u64,
}

impl Scene {
    pub(crate) fn new(desc: SceneDesc, length_unit: f32) -> Self {
        let mut params = IntegrationParameters::default();
        params.length_unit = length_unit;

        Self {
            gravity: desc.gravity,
            policy: desc.filter_policy,
            hooks: PolicyHooks {
                policy: desc.filter_policy,
            },
            callback: desc.callback,
            contact_report: desc.contact_report,
            debug_client: None,
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            actors: HashMap::new(),
            collector: StepEventCollector::default(),
            pending: None,
            step_count: 0,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        self.policy
    }

    pub fn callback(&self) -> &Arc<dyn SimulationEventCallback> {
        &self.callback
    }

    /// The aggregator this scene reports into, if it was built with one.
    pub fn contact_report(&self) -> Option<&Arc<ContactReportCallback>> {
        self.contact_report.as_ref()
    }

    /// Contact events of the last step. Empty if the scene has no contact report.
    pub fn contact_events(&self) -> ContactEvents {
        self.contact_report
            .as_ref()
            .map(|report| report.events())
            .unwrap_or_default()
    }

    pub fn debug_client(&self) -> Option<&SceneDebugClient> {
        self.debug_client.as_ref()
    }

    /// Steps completed since the scene was created.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Hand an actor to the scene.
    ///
    /// Dynamic actors must have had [`Actor::update_mass_and_inertia`] called;
    /// otherwise the actor is rejected and dropped.
    pub fn add_actor(&mut self, actor: Actor) -> Result<ActorHandle> {
        if !actor.has_mass() {
            return Err(WorldError::MassNotComputed { name: actor.name });
        }

        let body = self.bodies.insert(actor.body);
        let shape = self
            .colliders
            .insert_with_parent(actor.collider, body, &mut self.bodies);

        log::trace!(
            "added {:?} actor {:?} ({})",
            actor.kind,
            body,
            actor.name.as_deref().unwrap_or("unnamed")
        );
        self.actors.insert(
            body,
            ActorRecord {
                kind: actor.kind,
                shape,
                material: actor.material,
                name: actor.name,
            },
        );
        Ok(ActorHandle(body))
    }

    /// Take an actor out of the scene together with its shape.
    ///
    /// The removed body is returned; dropping it is up to the caller.
    pub fn remove_actor(&mut self, actor: ActorHandle) -> Result<RigidBody> {
        self.actors
            .remove(&actor.0)
            .ok_or(WorldError::UnknownActor(actor))?;
        self.bodies
            .remove(
                actor.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .ok_or(WorldError::UnknownActor(actor))
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn dynamic_actor_count(&self) -> usize {
        self.actors
            .values()
            .filter(|r| r.kind == ActorKind::Dynamic)
            .count()
    }

    /// Handles of every actor in the scene, in no particular order.
    pub fn actors(&self) -> impl Iterator<Item = ActorHandle> + '_ {
        self.actors.keys().map(|&h| ActorHandle(h))
    }

    pub fn actor_state(&self, actor: ActorHandle) -> Option<ActorState> {
        let record = self.actors.get(&actor.0)?;
        let body = self.bodies.get(actor.0)?;
        Some(ActorState::of(record.kind, body))
    }

    pub fn actor_name(&self, actor: ActorHandle) -> Option<&str> {
        self.actors.get(&actor.0)?.name.as_deref()
    }

    pub fn actor_material(&self, actor: ActorHandle) -> Option<MaterialHandle> {
        Some(self.actors.get(&actor.0)?.material)
    }

    pub fn actor_shape(&self, actor: ActorHandle) -> Option<ShapeHandle> {
        Some(ShapeHandle(self.actors.get(&actor.0)?.shape))
    }

    /// The actor a shape belongs to.
    pub fn shape_owner(&self, shape: ShapeHandle) -> Option<ActorHandle> {
        let parent = self.colliders.get(shape.0)?.parent()?;
        self.actors.contains_key(&parent).then_some(ActorHandle(parent))
    }

    /// Attach application filter words to a shape; the filter policy sees
    /// them from the next step on.
    pub fn set_filter_data(&mut self, shape: ShapeHandle, data: FilterData) -> Result<()> {
        let collider = self
            .colliders
            .get_mut(shape.0)
            .ok_or(WorldError::UnknownShape(shape))?;
        collider.user_data = data.pack();
        Ok(())
    }

    pub fn filter_data(&self, shape: ShapeHandle) -> Option<FilterData> {
        Some(FilterData::unpack(self.colliders.get(shape.0)?.user_data))
    }

    /// Dynamic actors that are currently awake.
    pub(crate) fn awake_actors(&self) -> HashSet<RigidBodyHandle> {
        self.actors
            .iter()
            .filter(|(_, r)| r.kind == ActorKind::Dynamic)
            .filter(|(h, _)| self.bodies.get(**h).is_some_and(|b| !b.is_sleeping()))
            .map(|(h, _)| *h)
            .collect()
    }
}

//! Actors: rigid bodies with exactly one shape and one material.
//!
//! An [`Actor`] value is a body that isn't in any scene yet. Adding it to a
//! scene hands its body and shape to the backend and gives back an
//! [`ActorHandle`].

use rapier3d::prelude::*;

use crate::geometry::Geometry;
use crate::material::{Material, MaterialHandle};
use crate::math::{Transform, Vec3};

/// Reference to an actor inside a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActorHandle(pub(crate) RigidBodyHandle);

/// Reference to an actor's shape inside a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub(crate) ColliderHandle);

impl ActorHandle {
    pub fn body(&self) -> RigidBodyHandle {
        self.0
    }
}

impl ShapeHandle {
    pub fn collider(&self) -> ColliderHandle {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorKind {
    /// Immovable (ground planes, walls).
    Static,
    /// Has mass and velocity; moved by the solver.
    Dynamic,
}

/// A body that hasn't been added to a scene yet.
#[derive(Clone, Debug)]
pub struct Actor {
    pub(crate) kind: ActorKind,
    pub(crate) body: RigidBody,
    pub(crate) collider: Collider,
    pub(crate) geometry: Geometry,
    pub(crate) material: MaterialHandle,
    pub(crate) name: Option<String>,
    mass_computed: bool,
}

impl Actor {
    pub(crate) fn new(
        kind: ActorKind,
        pose: Transform,
        geometry: Geometry,
        material: (MaterialHandle, &Material),
    ) -> Self {
        let body = match kind {
            ActorKind::Static => RigidBodyBuilder::fixed(),
            ActorKind::Dynamic => RigidBodyBuilder::dynamic(),
        }
        .pose(pose.iso())
        .build();

        let mut collider = geometry
            .to_collider()
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::FILTER_INTERSECTION_PAIR)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        material.1.apply(&mut collider);

        Self {
            kind,
            body,
            collider,
            geometry,
            material: material.0,
            name: None,
            // Static bodies never need mass.
            mass_computed: kind == ActorKind::Static,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == ActorKind::Dynamic
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn pose(&self) -> Transform {
        Transform::new(*self.body.translation(), *self.body.rotation())
    }

    /// Give the shape `mass` and let the backend derive the inertia tensor
    /// from the geometry. Required before a dynamic actor can join a scene.
    pub fn update_mass_and_inertia(&mut self, mass: f32) {
        self.collider.set_mass(mass);
        self.mass_computed = true;
    }

    pub fn has_mass(&self) -> bool {
        self.mass_computed
    }

    /// Turn the shape into a trigger volume: it reports overlaps and never
    /// generates contacts.
    pub fn set_trigger(&mut self, trigger: bool) {
        self.collider.set_sensor(trigger);
    }

    pub fn is_trigger(&self) -> bool {
        self.collider.is_sensor()
    }

    pub fn set_angular_damping(&mut self, damping: f32) {
        self.body.set_angular_damping(damping);
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.body.set_linvel(velocity, true);
    }
}

/// Snapshot of an actor that is in a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorState {
    pub kind: ActorKind,
    pub pose: Transform,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub sleeping: bool,
}

impl ActorState {
    pub(crate) fn of(kind: ActorKind, body: &RigidBody) -> Self {
        Self {
            kind,
            pose: Transform::new(*body.translation(), *body.rotation()),
            linear_velocity: *body.linvel(),
            angular_velocity: *body.angvel(),
            mass: body.mass(),
            sleeping: body.is_sleeping(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Plane;

    fn material() -> (MaterialHandle, Material) {
        let mut registry = crate::material::MaterialRegistry::new();
        let handle = registry.create(0.5, 0.5, 0.1);
        (handle, *registry.get(handle).expect("material"))
    }

    #[test]
    fn dynamic_actor_needs_mass_static_does_not() {
        let (h, m) = material();
        let mut dynamic = Actor::new(
            ActorKind::Dynamic,
            Transform::from_xyz(0.0, 1.0, 0.0),
            Geometry::cube(0.5),
            (h, &m),
        );
        assert!(!dynamic.has_mass());
        dynamic.update_mass_and_inertia(10.0);
        assert!(dynamic.has_mass());

        let plane = Actor::new(
            ActorKind::Static,
            Transform::identity(),
            Geometry::Plane(Plane::new(0.0, 1.0, 0.0, 0.0)),
            (h, &m),
        );
        assert!(plane.has_mass());
        assert!(!plane.is_dynamic());
    }

    #[test]
    fn builder_carries_pose_material_and_event_settings() {
        let (h, m) = material();
        let mut actor = Actor::new(
            ActorKind::Dynamic,
            Transform::from_xyz(1.0, 2.0, 3.0),
            Geometry::sphere(1.0),
            (h, &m),
        );
        actor.set_name("Ball");

        assert_eq!(actor.pose().translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(actor.material(), h);
        assert_eq!(actor.name(), Some("Ball"));
        assert!(actor.collider.active_events().contains(ActiveEvents::COLLISION_EVENTS));
        assert!(actor.collider.active_hooks().contains(ActiveHooks::FILTER_CONTACT_PAIRS));
        assert_eq!(actor.collider.restitution(), 0.1);
    }
}

//! Material registry.
//!
//! Materials are immutable once created and are referenced by handle. Two
//! materials with the same values are distinct handles that behave the same.

use rapier3d::prelude::{Collider, CoefficientCombineRule};

/// Surface response of a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub restitution: f32,
}

impl Material {
    pub fn new(static_friction: f32, dynamic_friction: f32, restitution: f32) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            restitution,
        }
    }

    /// Write this material onto a backend collider.
    ///
    /// The backend has a single Coulomb coefficient, which takes the dynamic
    /// friction. Out-of-range values are clamped here rather than rejected:
    /// friction to `>= 0`, restitution to `[0, 1]`.
    pub(crate) fn apply(&self, collider: &mut Collider) {
        collider.set_friction(self.dynamic_friction.max(0.0));
        collider.set_restitution(self.restitution.clamp(0.0, 1.0));
        collider.set_friction_combine_rule(CoefficientCombineRule::Average);
        collider.set_restitution_combine_rule(CoefficientCombineRule::Average);
    }
}

/// Opaque reference to a [`Material`] owned by a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

impl MaterialHandle {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Append-only store of materials. Handles stay valid for the registry's lifetime.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new material. The values are kept as given.
    pub fn create(
        &mut self,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        self.materials
            .push(Material::new(static_friction, dynamic_friction, restitution));
        handle
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

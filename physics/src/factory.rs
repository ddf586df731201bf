/*!
Actor factory.

Builds the handful of actors a scene is usually made of: ground planes,
boxes, spheres and pyramid stacks of boxes. Every dynamic body built here
weighs the world's reference mass ([`crate::config::WorldConfig::reference_mass`]),
whatever its size.

Nothing is validated geometrically: zero or negative extents and radii go to
the backend as given.

Stack layout
- Layer `i` (from the bottom, `0..size`) holds `size - i` boxes.
- Box `j` of layer `i` sits at `((2j - (size - i)) * h, (2i + 1) * h, 0)`
  in the stack's local frame, `h` being the cube half-extent.
- Each box gets its own shape. Sharing one shape across the stack would
  work just as well since the boxes are identical.
*/

use crate::actor::{Actor, ActorHandle, ActorKind, ShapeHandle};
use crate::error::{Result, WorldError};
use crate::geometry::Geometry;
use crate::material::MaterialHandle;
use crate::math::{Plane, Transform, Vec3};
use crate::settings::{DEFAULT_SPHERE_RADIUS, DYNAMIC_ANGULAR_DAMPING};
use crate::world::World;

/// Local poses of the boxes of a `size`-layer pyramid, bottom layer first.
///
/// Yields `size * (size + 1) / 2` transforms; empty for `size == 0`.
pub fn stack_layout(size: u32, half_extent: f32) -> Vec<Transform> {
    let mut layout = Vec::with_capacity(stack_box_count(size));
    for i in 0..size {
        for j in 0..size - i {
            let x = (2 * j) as f32 - (size - i) as f32;
            let y = (2 * i + 1) as f32;
            layout.push(Transform::from_xyz(x * half_extent, y * half_extent, 0.0));
        }
    }
    layout
}

/// Boxes in a `size`-layer pyramid.
pub fn stack_box_count(size: u32) -> usize {
    let n = size as usize;
    n * (n + 1) / 2
}

impl World {
    /// An actor of `kind`, checked against the active scene and material registry.
    fn build_actor(
        &self,
        kind: ActorKind,
        pose: Transform,
        geometry: Geometry,
        material: MaterialHandle,
    ) -> Result<Actor> {
        if self.scene.is_none() {
            return Err(WorldError::NoScene);
        }
        let m = self.material(material)?;
        Ok(Actor::new(kind, pose, geometry, (material, m)))
    }

    /// Dynamic actor at the reference mass, added to the scene.
    fn spawn_dynamic(&mut self, mut actor: Actor) -> Result<ActorHandle> {
        actor.update_mass_and_inertia(self.config().reference_mass);
        self.add_actor(actor)
    }

    /// Static plane actor. It is returned, not added: pass it to
    /// [`World::add_actor`] to put it in the scene.
    pub fn create_plane(&self, plane: Plane, material: MaterialHandle) -> Result<Actor> {
        log::trace!("creating plane {:?}", plane);
        self.build_actor(
            ActorKind::Static,
            Transform::identity(),
            Geometry::Plane(plane),
            material,
        )
    }

    /// Dynamic cube with half-extent `half_extent`, added to the scene.
    pub fn create_box(
        &mut self,
        transform: Transform,
        half_extent: f32,
        material: MaterialHandle,
    ) -> Result<ShapeHandle> {
        let actor = self.build_actor(
            ActorKind::Dynamic,
            transform,
            Geometry::cube(half_extent),
            material,
        )?;
        let handle = self.spawn_dynamic(actor)?;
        self.shape_of(handle)
    }

    /// Dynamic sphere of [`DEFAULT_SPHERE_RADIUS`], added to the scene.
    pub fn create_sphere(
        &mut self,
        transform: Transform,
        material: MaterialHandle,
    ) -> Result<ShapeHandle> {
        let actor = self.build_actor(
            ActorKind::Dynamic,
            transform,
            Geometry::sphere(DEFAULT_SPHERE_RADIUS),
            material,
        )?;
        let handle = self.spawn_dynamic(actor)?;
        self.shape_of(handle)
    }

    /// Dynamic body with caller geometry, an initial linear velocity and
    /// angular damping, added to the scene.
    pub fn create_dynamic_sphere(
        &mut self,
        transform: Transform,
        geometry: Geometry,
        velocity: Vec3,
        material: MaterialHandle,
    ) -> Result<ActorHandle> {
        let mut actor = self.build_actor(ActorKind::Dynamic, transform, geometry, material)?;
        actor.set_angular_damping(DYNAMIC_ANGULAR_DAMPING);
        actor.set_linear_velocity(velocity);
        self.spawn_dynamic(actor)
    }

    /// Pyramid of `size` layers of cubes, placed relative to `base`.
    ///
    /// Stops at the first box that fails; boxes added before it stay.
    pub fn create_stack(
        &mut self,
        base: Transform,
        size: u32,
        half_extent: f32,
        material: MaterialHandle,
    ) -> Result<()> {
        let layout = stack_layout(size, half_extent);
        log::trace!("creating stack of {} boxes", layout.len());
        for local in &layout {
            self.create_box(base.transform(local), half_extent, material)?;
        }
        Ok(())
    }

    fn shape_of(&self, actor: ActorHandle) -> Result<ShapeHandle> {
        self.scene()?
            .actor_shape(actor)
            .ok_or(WorldError::UnknownActor(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::material::MaterialRegistry;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn world_with_scene() -> (World, MaterialHandle) {
        let mut world = World::new(WorldConfig::default()).expect("world");
        world.create_scene(Vec3::new(0.0, -9.81, 0.0));
        let material = world.create_material(0.5, 0.5, 0.6);
        (world, material)
    }

    #[test]
    fn layout_has_triangular_count() {
        for size in 0..8u32 {
            assert_eq!(stack_layout(size, 2.0).len(), stack_box_count(size));
        }
    }

    #[test]
    fn box_count_of_tall_stacks_does_not_overflow() {
        // 65536 * 65537 doesn't fit in a u32.
        assert_eq!(stack_box_count(1 << 16), 2_147_516_416);
        assert_eq!(stack_box_count(0), 0);
        assert_eq!(stack_layout(3, 1.0).len(), stack_box_count(3));
    }

    #[test]
    fn single_box_stack_sits_on_its_base() {
        let layout = stack_layout(1, 2.0);
        assert_eq!(layout.len(), 1);
        assert_relative_eq!(layout[0].translation, Vec3::new(-2.0, 2.0, 0.0));
    }

    #[test]
    fn layout_follows_pyramid_formula() {
        let h = 0.5;
        let layout = stack_layout(3, h);

        let expected = [
            (-3.0, 1.0),
            (-1.0, 1.0),
            (1.0, 1.0),
            (-2.0, 3.0),
            (0.0, 3.0),
            (-1.0, 5.0),
        ];
        for (pose, (x, y)) in layout.iter().zip(expected) {
            assert_relative_eq!(pose.translation, Vec3::new(x * h, y * h, 0.0));
        }
        // Every layer is two half-extents above the one below.
        assert_relative_eq!(layout[3].translation.y - layout[0].translation.y, 2.0 * h);
    }

    #[test]
    fn stack_adds_one_dynamic_actor_per_box() {
        let (mut world, material) = world_with_scene();
        let base = Transform::from_xyz(0.0, 0.0, 10.0);

        world.create_stack(base, 4, 2.0, material).expect("stack");

        let scene = world.scene().expect("scene");
        assert_eq!(scene.actor_count(), 10);
        assert_eq!(scene.dynamic_actor_count(), 10);

        let shapes: HashSet<_> = scene.actors().filter_map(|a| scene.actor_shape(a)).collect();
        assert_eq!(shapes.len(), 10);
        assert!(scene
            .actors()
            .filter_map(|a| scene.actor_state(a))
            .all(|s| s.pose.translation.z == 10.0));
    }

    #[test]
    fn plane_is_built_but_not_added() {
        let (mut world, material) = world_with_scene();
        let plane = world
            .create_plane(Plane::new(0.0, 1.0, 0.0, 0.0), material)
            .expect("plane");
        assert_eq!(world.scene().expect("scene").actor_count(), 0);

        world.add_actor(plane).expect("add");
        let scene = world.scene().expect("scene");
        assert_eq!(scene.actor_count(), 1);
        assert_eq!(scene.dynamic_actor_count(), 0);
    }

    #[test]
    fn dynamic_sphere_carries_velocity_and_material() {
        let (mut world, material) = world_with_scene();
        let ball = world
            .create_dynamic_sphere(
                Transform::from_xyz(0.0, 40.0, 100.0),
                Geometry::sphere(10.0),
                Vec3::new(0.0, -50.0, -100.0),
                material,
            )
            .expect("ball");

        let scene = world.scene().expect("scene");
        let state = scene.actor_state(ball).expect("state");
        assert_relative_eq!(state.linear_velocity, Vec3::new(0.0, -50.0, -100.0));
        assert_eq!(scene.actor_material(ball), Some(material));
    }

    #[test]
    fn factory_needs_scene_and_known_material() {
        let mut world = World::new(WorldConfig::default()).expect("world");
        let material = world.create_material(0.5, 0.5, 0.6);
        assert!(matches!(
            world.create_box(Transform::identity(), 1.0, material),
            Err(WorldError::NoScene)
        ));

        world.create_scene(Vec3::zeros());
        // Second handle of another registry: past the end of this world's.
        let mut other = MaterialRegistry::new();
        other.create(0.0, 0.0, 0.0);
        let foreign = other.create(0.0, 0.0, 0.0);
        assert!(matches!(
            world.create_sphere(Transform::identity(), foreign),
            Err(WorldError::UnknownMaterial(_))
        ));
        assert_eq!(world.scene().expect("scene").actor_count(), 0);
    }
}

use rapier3d::prelude::*;

use crate::math::Plane;

/// Geometry an actor's shape can have.
///
/// Keep this small: the factory only ever builds planes, boxes and spheres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Infinite plane (half-space) `normal ⋅ x + d = 0`, in world space.
    ///
    /// The plane carries its own placement, so its actor stays at the
    /// identity pose.
    Plane(Plane),

    /// Box with the given half-extents (meters).
    Box { half_extents: Vector<f32> },

    /// Sphere (meters).
    Sphere { radius: f32 },
}

impl Geometry {
    /// Cube with the same half-extent on every axis.
    pub fn cube(half_extent: f32) -> Self {
        Geometry::Box {
            half_extents: vector![half_extent, half_extent, half_extent],
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Geometry::Sphere { radius }
    }

    /// Build the backend collider for this geometry.
    ///
    /// The collider gets an identity local transform (the parent body carries
    /// the pose), except planes, which sit at their own offset.
    pub(crate) fn to_collider(&self) -> ColliderBuilder {
        match self {
            Geometry::Plane(plane) => {
                let plane = plane.normalized();

                // Rapier's half-space expects a `UnitVector<Real>`, not a raw vector.
                // A zero normal normalizes to NaN components; planes are not validated at this layer.
                let unit_n = UnitVector::new_normalize(plane.normal);

                // Place the half-space at the plane point closest to the origin.
                ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                    .translation(plane.point_on_plane())
            }

            Geometry::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }

            Geometry::Sphere { radius } => ColliderBuilder::ball(*radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_collider_sits_on_the_plane() {
        let collider = Geometry::Plane(Plane::new(0.0, 1.0, 0.0, -2.0))
            .to_collider()
            .build();

        let halfspace = collider.shape().as_halfspace().expect("half-space shape");
        assert_relative_eq!(halfspace.normal.into_inner(), vector![0.0, 1.0, 0.0]);
        assert_relative_eq!(collider.translation().y, 2.0);
    }

    #[test]
    fn cube_and_sphere_dimensions() {
        let cube = Geometry::cube(0.5).to_collider().build();
        let cuboid = cube.shape().as_cuboid().expect("cuboid shape");
        assert_relative_eq!(cuboid.half_extents, vector![0.5, 0.5, 0.5]);

        let ball = Geometry::sphere(2.0).to_collider().build();
        assert_relative_eq!(ball.shape().as_ball().expect("ball shape").radius, 2.0);
    }
}

/*!
Math aliases and the two small value types the public API speaks in.

Everything here is plain nalgebra; these are the same types rapier3d uses, so
values pass to the backend without conversion.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (translation + rotation) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    #[inline]
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    /// Convert to an nalgebra `Isometry3` for the backend.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    #[inline]
    pub fn from_iso(iso: &Iso) -> Self {
        Self::new(iso.translation.vector, iso.rotation)
    }

    /// Compose `self ∘ local`: express a transform given relative to `self`
    /// in the frame `self` lives in.
    pub fn transform(&self, local: &Transform) -> Transform {
        Self::new(
            self.rotation * local.translation + self.translation,
            self.rotation * local.rotation,
        )
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * p + self.translation
    }
}

/// Infinite plane `normal ⋅ x + d = 0`.
///
/// The solid side is the one `normal` points away from, so `(0, 1, 0, 0)` is
/// a ground plane through the origin with everything above it free.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn new(nx: f32, ny: f32, nz: f32, d: f32) -> Self {
        Self {
            normal: Vec3::new(nx, ny, nz),
            d,
        }
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            d: -normal.dot(&point),
        }
    }

    /// The same plane with a unit normal. A zero normal is returned unchanged.
    pub fn normalized(&self) -> Self {
        let len = self.normal.norm();
        if len <= f32::EPSILON {
            return *self;
        }
        Self {
            normal: self.normal / len,
            d: self.d / len,
        }
    }

    /// Signed distance of `point` from the plane (unit normal assumed).
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.d
    }

    /// The point of the plane closest to the origin.
    #[inline]
    pub fn point_on_plane(&self) -> Vec3 {
        -self.normal * self.d
    }
}

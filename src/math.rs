//! Types, aliases and helper operations for doing math with `ultraviolet`.
use std::f64::consts::PI;
pub use ultraviolet as uv;

/// The vector type used everywhere in the simulation.
///
/// Arithmetic (`+ - * / neg` and their compound assignment forms) comes from `ultraviolet`;
/// the extra operations the physics code needs live in [`VecExt`][self::VecExt].
pub type Vec2 = uv::DVec2;

/// An angle in either degrees or radians.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Angle {
    Rad(f64),
    Deg(f64),
}
impl Angle {
    /// Get the angle as radians.
    #[inline]
    pub fn rad(&self) -> f64 {
        match self {
            Angle::Rad(rad) => *rad,
            Angle::Deg(deg) => deg * PI / 180.0,
        }
    }
}
impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    /// Normalize a vector, falling back to the x axis if it has zero length.
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(v.normal_or(Vec2::unit_x()))
    }

    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

/// Operations on [`Vec2`][self::Vec2] that `ultraviolet` doesn't name the way
/// the physics code uses them.
pub trait VecExt: Sized {
    /// Vector pointing from `self` to `other`.
    fn vector_to(self, other: Self) -> Self;
    /// Unit vector pointing from `self` to `other`, x axis if the points coincide.
    fn direction_to(self, other: Self) -> Self;
    /// Squared length. Cheaper than the length for comparisons.
    fn square(self) -> f64;
    /// Scalar projection onto `axis`, i.e. the dot product.
    fn project_onto_axis(self, axis: Self) -> f64;
    /// The 2D cross product `x1 * y2 - y1 * x2`.
    fn cross(self, other: Self) -> f64;
    /// Unit vector in the same direction, or `fallback` if the length is zero.
    fn normal_or(self, fallback: Self) -> Self;
    /// Rotate counterclockwise around the origin.
    fn rotated(self, angle: f64) -> Self;
}

impl VecExt for Vec2 {
    #[inline]
    fn vector_to(self, other: Self) -> Self {
        other - self
    }

    #[inline]
    fn direction_to(self, other: Self) -> Self {
        self.vector_to(other).normal_or(Vec2::unit_x())
    }

    #[inline]
    fn square(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    fn project_onto_axis(self, axis: Self) -> f64 {
        self.x * axis.x + self.y * axis.y
    }

    #[inline]
    fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn normal_or(self, fallback: Self) -> Self {
        let len = self.mag();
        if len > f64::EPSILON {
            self / len
        } else {
            fallback
        }
    }

    #[inline]
    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

// Vec2 utils

#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
#[inline]
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

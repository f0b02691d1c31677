//! Rigid body simulation in 2D.
//!
//! A [`PhysicsWorld`] owns [`PhysicsBody`]s, each with one [`Collider`].
//! Every update moves the bodies under gravity, then finds intersections
//! and pushes intersecting bodies apart with impulses.

use crate::math as m;

pub mod body;
pub use body::{BodyKind, BodyType, DynamicState, Mass, PhysicsBody};

pub mod boundary;
pub use boundary::{BoundaryResult, BoundaryType, WorldBoundary};

pub mod collision;
pub use collision::{
    Collider, ColliderShape, ColliderType, Contact, ContactPoints, LayerSet, ShapeKind, AABB,
};

mod error;
pub use error::PhysicsError;

pub mod resolution;

pub mod settings;
pub use settings::{ResolutionMode, ResolutionSettings, WorldSettings};

pub mod world;
pub use world::{BodyHandle, Collision, PhysicsWorld, StepStats};

//

/// Velocity of an object.
///
// Equivalent to a Vec3 but with names for the translational and rotational part.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Velocity {
    /// Linear velocity in metres per second.
    pub linear: m::Vec2,
    /// Angular velocity in radians per second.
    pub angular: f64,
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity {
            linear: m::Vec2::zero(),
            angular: 0.0,
        }
    }
}

impl Velocity {
    /// Get the linear velocity of a point offset from the center of mass.
    pub fn point_velocity(&self, offset: m::Vec2) -> m::Vec2 {
        let tangent = m::left_normal(offset) * self.angular;
        self.linear + tangent
    }
}

impl std::ops::Add for Velocity {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }
}
impl std::ops::AddAssign for Velocity {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
impl std::ops::Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Self::Output {
        Velocity {
            linear: self.linear * rhs,
            angular: self.angular * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_velocity_includes_rotation() {
        let vel = Velocity {
            linear: m::Vec2::new(1.0, 0.0),
            angular: 2.0,
        };
        // a point to the right of a counterclockwise spinning body moves up
        assert_eq!(vel.point_velocity(m::Vec2::new(0.5, 0.0)), m::Vec2::new(1.0, 1.0));
        assert_eq!(vel.point_velocity(m::Vec2::zero()), vel.linear);

        let mut sum = vel + vel * 0.5;
        assert_eq!(sum.linear, m::Vec2::new(1.5, 0.0));
        sum += Velocity::default();
        assert_eq!(sum.angular, 3.0);
    }
}

use super::{error, Collider, PhysicsError, Velocity};
use crate::math::{self as m, Angle, VecExt};

/// Restitution given to new dynamic bodies.
pub const DEFAULT_RESTITUTION: f64 = 0.6;
/// Mass given to new dynamic bodies.
pub const DEFAULT_MASS: f64 = 1.0;

/// A rigid body with exactly one collider.
///
/// Create one with the `new_*` constructors and hand it to a
/// [`PhysicsWorld`][super::PhysicsWorld], which then owns it.
/// The collider always follows the body's position and rotation,
/// which is why the transform is only changed through methods here.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsBody {
    position: m::Vec2,
    rotation: f64,
    collider: Collider,
    kind: BodyKind,
}

/// Whether a body moves, along with the state that only moving bodies have.
#[derive(Clone, Copy, Debug)]
pub enum BodyKind {
    /// Does not respond to forces or collisions and never moves on its own.
    Static,
    /// Responds to gravity, forces and collisions.
    Dynamic(DynamicState),
}

/// [`BodyKind`] without the data, for when we only care which kind it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    Static,
    Dynamic,
}

/// The moving parts of a dynamic body.
#[derive(Clone, Copy, Debug)]
pub struct DynamicState {
    pub(crate) velocity: Velocity,
    force: m::Vec2,
    restitution: f64,
    mass: Mass,
    affected_by_gravity: bool,
}

impl Default for DynamicState {
    fn default() -> Self {
        DynamicState {
            velocity: Velocity::default(),
            force: m::Vec2::zero(),
            restitution: DEFAULT_RESTITUTION,
            mass: Mass::new(DEFAULT_MASS),
            affected_by_gravity: true,
        }
    }
}

impl DynamicState {
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn set_velocity(&mut self, linear: m::Vec2) {
        self.velocity.linear = linear;
    }

    pub fn set_angular_velocity(&mut self, angular: f64) {
        self.velocity.angular = angular;
    }

    /// The force accumulated since the last physics update.
    pub fn force(&self) -> m::Vec2 {
        self.force
    }

    /// Add a force to be applied during the next physics update.
    /// Forces are cleared after every update.
    pub fn apply_force(&mut self, force: m::Vec2) {
        self.force += force;
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Set the bounciness of the body. Values outside of `[0, 1]` are ignored.
    pub fn set_restitution(&mut self, restitution: f64) {
        error::ignore(self.try_set_restitution(restitution));
    }

    pub fn try_set_restitution(&mut self, restitution: f64) -> Result<(), PhysicsError> {
        if !(0.0..=1.0).contains(&restitution) {
            return Err(PhysicsError::InvalidRestitution(restitution));
        }
        self.restitution = restitution;
        Ok(())
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    /// Set the mass of the body. Zero, negative and non-finite values are ignored.
    pub fn set_mass(&mut self, mass: f64) {
        error::ignore(self.try_set_mass(mass));
    }

    pub fn try_set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        self.mass = Mass::new(mass);
        Ok(())
    }

    pub fn is_affected_by_gravity(&self) -> bool {
        self.affected_by_gravity
    }

    pub fn set_affected_by_gravity(&mut self, affected: bool) {
        self.affected_by_gravity = affected;
    }
}

/// Mass or moment of inertia of a body, which can be infinite.
///
/// This stores both a mass value and its inverse, because the inverse
/// is what most physics calculations need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mass {
    Finite { mass: f64, inverse: f64 },
    Infinite,
}

impl Mass {
    /// Anything that isn't positive and finite is considered infinite.
    pub fn new(mass: f64) -> Self {
        if mass > 0.0 && mass.is_finite() {
            Mass::Finite {
                mass,
                inverse: 1.0 / mass,
            }
        } else {
            Mass::Infinite
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            Mass::Finite { mass, .. } => *mass,
            Mass::Infinite => f64::INFINITY,
        }
    }

    /// Get the inverse of the mass, which is zero if the mass is infinite.
    #[inline]
    pub fn inv(&self) -> f64 {
        match self {
            Mass::Finite { inverse, .. } => *inverse,
            Mass::Infinite => 0.0,
        }
    }
}

impl PhysicsBody {
    /// Create a body at the given position.
    /// The collider's offset is kept and its transform is synced to the body.
    pub fn new(position: m::Vec2, collider: Collider, kind: BodyKind) -> Self {
        let mut body = PhysicsBody {
            position,
            rotation: 0.0,
            collider,
            kind,
        };
        body.sync_collider();
        body
    }

    pub fn new_static_circle(position: m::Vec2, radius: f64) -> Self {
        Self::new(position, Collider::new_circle(radius), BodyKind::Static)
    }

    /// `dimensions` holds the full width and height.
    pub fn new_static_rect(position: m::Vec2, dimensions: m::Vec2) -> Self {
        Self::new(
            position,
            Collider::new_rect(dimensions.x, dimensions.y),
            BodyKind::Static,
        )
    }

    pub fn new_dynamic_circle(position: m::Vec2, radius: f64) -> Self {
        Self::new(
            position,
            Collider::new_circle(radius),
            BodyKind::Dynamic(DynamicState::default()),
        )
    }

    /// `dimensions` holds the full width and height.
    pub fn new_dynamic_rect(position: m::Vec2, dimensions: m::Vec2) -> Self {
        Self::new(
            position,
            Collider::new_rect(dimensions.x, dimensions.y),
            BodyKind::Dynamic(DynamicState::default()),
        )
    }

    /// Set the rotation in a builder-like chain.
    pub fn with_rotation(mut self, rotation: Angle) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Set the velocity of a dynamic body in a builder-like chain.
    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        if let Some(dy) = self.dynamic_mut() {
            dy.velocity = velocity;
        }
        self
    }

    /// Set the mass of a dynamic body in a builder-like chain. Invalid values are ignored.
    pub fn with_mass(mut self, mass: f64) -> Self {
        if let Some(dy) = self.dynamic_mut() {
            dy.set_mass(mass);
        }
        self
    }

    /// Set the restitution of a dynamic body in a builder-like chain.
    /// Invalid values are ignored.
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        if let Some(dy) = self.dynamic_mut() {
            dy.set_restitution(restitution);
        }
        self
    }

    /// Replace the collider's settings in a builder-like chain,
    /// e.g. to make it a trigger or put it on other layers.
    pub fn with_collider(mut self, f: impl FnOnce(Collider) -> Collider) -> Self {
        self.collider = f(self.collider);
        self.sync_collider();
        self
    }

    // accessors

    pub fn position(&self) -> m::Vec2 {
        self.position
    }

    pub fn rotation(&self) -> Angle {
        Angle::Rad(self.rotation)
    }

    pub fn ty(&self) -> BodyType {
        match self.kind {
            BodyKind::Static => BodyType::Static,
            BodyKind::Dynamic(_) => BodyType::Dynamic,
        }
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// Access the collider to change its size, type or layers.
    /// The bounding box is updated by the collider's own setters.
    pub fn collider_mut(&mut self) -> &mut Collider {
        &mut self.collider
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self.kind, BodyKind::Static)
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, BodyKind::Dynamic(_))
    }

    pub fn dynamic(&self) -> Option<&DynamicState> {
        match &self.kind {
            BodyKind::Dynamic(dy) => Some(dy),
            BodyKind::Static => None,
        }
    }

    pub fn dynamic_mut(&mut self) -> Option<&mut DynamicState> {
        match &mut self.kind {
            BodyKind::Dynamic(dy) => Some(dy),
            BodyKind::Static => None,
        }
    }

    /// Velocity of the body, which is always zero for static bodies.
    pub fn velocity(&self) -> Velocity {
        self.dynamic().map(|dy| dy.velocity).unwrap_or_default()
    }

    /// Restitution of the body. Static bodies don't bounce back themselves,
    /// so this is zero for them.
    pub fn restitution(&self) -> f64 {
        self.dynamic().map_or(0.0, |dy| dy.restitution)
    }

    /// Mass of the body, infinite for static bodies.
    pub fn mass(&self) -> Mass {
        self.dynamic().map_or(Mass::Infinite, |dy| dy.mass)
    }

    pub fn inverse_mass(&self) -> f64 {
        self.mass().inv()
    }

    /// Moment of inertia derived from the collider's shape and the body's mass.
    /// Degenerate shapes with no extent are treated as impossible to rotate.
    pub fn moment_of_inertia(&self) -> Mass {
        Mass::new(self.collider.moment_of_inertia_coef() * self.mass().value())
    }

    pub fn inverse_moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia().inv()
    }

    // mutation

    /// Move the body by a relative offset.
    pub fn move_by(&mut self, delta: m::Vec2) {
        self.position += delta;
        self.sync_collider();
    }

    pub fn set_position(&mut self, position: m::Vec2) {
        self.position = position;
        self.sync_collider();
    }

    pub fn set_rotation(&mut self, rotation: Angle) {
        self.rotation = rotation.rad();
        self.sync_collider();
    }

    /// Add this body's weight to its force accumulator.
    /// Does nothing for static bodies and bodies that ignore gravity.
    pub fn apply_gravity(&mut self, gravity: m::Vec2) {
        if let Some(dy) = self.dynamic_mut() {
            if dy.affected_by_gravity {
                let weight = gravity * dy.mass.value();
                dy.apply_force(weight);
            }
        }
    }

    /// Apply an impulse at a point offset from the body's center.
    pub(crate) fn apply_impulse(&mut self, impulse: m::Vec2, offset: m::Vec2) {
        let inv_inertia = self.inverse_moment_of_inertia();
        if let Some(dy) = self.dynamic_mut() {
            dy.velocity += Velocity {
                linear: impulse * dy.mass.inv(),
                angular: offset.cross(impulse) * inv_inertia,
            };
        }
    }

    /// Advance the body by one timestep with semi-implicit Euler integration,
    /// then clear accumulated forces. Gravity must already be in the force accumulator.
    pub(crate) fn integrate(&mut self, dt: f64) {
        let dy = match &mut self.kind {
            BodyKind::Dynamic(dy) => dy,
            BodyKind::Static => return,
        };
        let acceleration = dy.force * dy.mass.inv();
        dy.velocity.linear += acceleration * dt;
        let step = dy.velocity * dt;
        self.position += step.linear;
        self.rotation += step.angular;
        dy.force = m::Vec2::zero();
        self.sync_collider();
    }

    fn sync_collider(&mut self) {
        self.collider.sync_to_body(self.position, self.rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_round_trip() {
        let start = m::Vec2::new(0.1, -7.3);
        let mut body = PhysicsBody::new_dynamic_circle(start, 1.0);
        let delta = m::Vec2::new(3.7, 1.9);
        body.move_by(delta);
        assert_eq!(body.collider().position(), start + delta);
        body.move_by(-delta);
        assert!((body.position() - start).mag() < 1e-12);
        assert!((body.collider().aabb().center() - start).mag() < 1e-12);
    }

    #[test]
    fn defaults() {
        let body = PhysicsBody::new_dynamic_rect(m::Vec2::zero(), m::Vec2::new(2.0, 1.0));
        let dy = body.dynamic().unwrap();
        assert_eq!(dy.restitution(), DEFAULT_RESTITUTION);
        assert_eq!(body.mass().value(), DEFAULT_MASS);
        assert!(dy.is_affected_by_gravity());
        assert_eq!(body.ty(), BodyType::Dynamic);
        assert_eq!(body.collider().width(), Some(2.0));

        let stat = PhysicsBody::new_static_circle(m::Vec2::zero(), 1.0);
        assert!(stat.is_static());
        assert_eq!(stat.inverse_mass(), 0.0);
        assert_eq!(stat.inverse_moment_of_inertia(), 0.0);
        assert_eq!(stat.velocity().linear, m::Vec2::zero());
    }

    #[test]
    fn moment_of_inertia_by_shape() {
        let circle = PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 2.0).with_mass(3.0);
        // 1/2 m r^2
        assert!((circle.moment_of_inertia().value() - 6.0).abs() < 1e-12);

        let rect =
            PhysicsBody::new_dynamic_rect(m::Vec2::zero(), m::Vec2::new(2.0, 4.0)).with_mass(6.0);
        // 1/12 m (w^2 + h^2)
        assert!((rect.moment_of_inertia().value() - 10.0).abs() < 1e-12);

        let point = PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 0.0);
        assert_eq!(point.moment_of_inertia(), Mass::Infinite);
        assert_eq!(point.inverse_moment_of_inertia(), 0.0);
    }

    #[test]
    fn invalid_values_keep_previous() {
        let mut body = PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 1.0);
        let dy = body.dynamic_mut().unwrap();
        dy.set_mass(-1.0);
        dy.set_mass(0.0);
        dy.set_mass(f64::INFINITY);
        assert_eq!(dy.mass().value(), DEFAULT_MASS);
        dy.set_restitution(1.5);
        dy.set_restitution(-0.1);
        assert_eq!(dy.restitution(), DEFAULT_RESTITUTION);
        assert_eq!(dy.try_set_mass(-2.0), Err(PhysicsError::InvalidMass(-2.0)));
        assert_eq!(dy.try_set_restitution(0.2), Ok(()));
        assert_eq!(dy.restitution(), 0.2);
    }

    #[test]
    fn integration_step() {
        let mut body = PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 1.0).with_mass(2.0);
        body.apply_gravity(m::Vec2::new(0.0, -10.0));
        body.dynamic_mut().unwrap().set_angular_velocity(1.0);
        body.integrate(0.5);
        // a = -10, v = -5, x = -2.5
        assert_eq!(body.velocity().linear, m::Vec2::new(0.0, -5.0));
        assert_eq!(body.position(), m::Vec2::new(0.0, -2.5));
        assert_eq!(body.rotation().rad(), 0.5);
        assert_eq!(body.collider().position(), body.position());
        assert_eq!(body.dynamic().unwrap().force(), m::Vec2::zero());

        let mut floating = PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 1.0);
        floating.dynamic_mut().unwrap().set_affected_by_gravity(false);
        floating.apply_gravity(m::Vec2::new(0.0, -10.0));
        floating.integrate(1.0);
        assert_eq!(floating.position(), m::Vec2::zero());

        let mut stat = PhysicsBody::new_static_rect(m::Vec2::zero(), m::Vec2::new(1.0, 1.0));
        stat.apply_gravity(m::Vec2::new(0.0, -10.0));
        stat.integrate(1.0);
        assert_eq!(stat.position(), m::Vec2::zero());
    }

    #[test]
    fn rotation_moves_collider_corners() {
        let body = PhysicsBody::new_static_rect(m::Vec2::new(1.0, 1.0), m::Vec2::new(4.0, 2.0))
            .with_rotation(Angle::Deg(90.0));
        let aabb = body.collider().aabb();
        assert!((aabb.width() - 2.0).abs() < 1e-9);
        assert!((aabb.height() - 4.0).abs() < 1e-9);
    }
}

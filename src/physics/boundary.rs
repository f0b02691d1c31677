use super::{PhysicsBody, AABB};
use crate::math as m;

pub const MIN_WORLD_WIDTH: f64 = 5.0;
pub const MAX_WORLD_WIDTH: f64 = 10000.0;
pub const MIN_WORLD_HEIGHT: f64 = 5.0;
pub const MAX_WORLD_HEIGHT: f64 = 10000.0;
/// How far above the floor a body's lowest point can be while still standing on it.
pub const FLOOR_TOLERANCE: f64 = 1e-3;
/// Oversized bodies closer than this to the low wall count as aligned with it.
const ALIGNED_EPSILON: f64 = 1e-9;

/// What happens to bodies that leave the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum BoundaryType {
    /// The edges of the world are walls that bodies bounce off.
    Collidable,
    /// Bodies that end up entirely outside the world are removed from it.
    #[default]
    Delete,
}

/// Outcome of enforcing the boundary on a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryResult {
    /// The body didn't need to change.
    Inside,
    /// The body was moved back inside.
    Corrected,
    /// The body is entirely outside and should be deleted.
    OutOfBounds,
}

/// The rectangle, centered on the origin, that bodies are confined to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBoundary {
    width: f64,
    height: f64,
    ty: BoundaryType,
}

impl WorldBoundary {
    /// Dimensions outside of the allowed range are clamped into it.
    pub fn new(dimensions: m::Vec2, ty: BoundaryType) -> Self {
        let mut boundary = WorldBoundary {
            width: MIN_WORLD_WIDTH,
            height: MIN_WORLD_HEIGHT,
            ty,
        };
        boundary.set_dimensions(dimensions);
        boundary
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn dimensions(&self) -> m::Vec2 {
        m::Vec2::new(self.width, self.height)
    }

    pub fn ty(&self) -> BoundaryType {
        self.ty
    }

    pub fn set_type(&mut self, ty: BoundaryType) {
        self.ty = ty;
    }

    /// Resize the world. Dimensions outside of the allowed range are clamped into it,
    /// and NaN keeps the previous value.
    pub fn set_dimensions(&mut self, dimensions: m::Vec2) {
        let clamp = |requested: f64, min: f64, max: f64, current: f64| {
            if requested.is_nan() {
                current
            } else {
                let clamped = requested.clamp(min, max);
                if clamped != requested {
                    log::debug!("World dimension {requested} clamped to {clamped}");
                }
                clamped
            }
        };
        self.width = clamp(dimensions.x, MIN_WORLD_WIDTH, MAX_WORLD_WIDTH, self.width);
        self.height = clamp(dimensions.y, MIN_WORLD_HEIGHT, MAX_WORLD_HEIGHT, self.height);
    }

    fn bounds(&self) -> AABB {
        let half = self.dimensions() / 2.0;
        AABB::new(-half, half)
    }

    /// Enforce the boundary on a body that was just placed in the world.
    /// Collidable boundaries move the body inside; Delete boundaries report
    /// whether the body is entirely outside.
    pub fn placement_enforce(&self, body: &mut PhysicsBody) -> BoundaryResult {
        self.enforce(body, false)
    }

    /// Enforce the boundary on a body after it has moved.
    /// Like [`placement_enforce`][Self::placement_enforce], but collidable
    /// boundaries also bounce dynamic bodies back in,
    /// reflecting the part of the velocity that points out of the world.
    pub fn dynamic_enforce(&self, body: &mut PhysicsBody) -> BoundaryResult {
        self.enforce(body, true)
    }

    fn enforce(&self, body: &mut PhysicsBody, bounce: bool) -> BoundaryResult {
        let bounds = self.bounds();
        let aabb = *body.collider().aabb();

        match self.ty {
            BoundaryType::Delete => {
                let outside = aabb.max.x < bounds.min.x
                    || aabb.min.x > bounds.max.x
                    || aabb.max.y < bounds.min.y
                    || aabb.min.y > bounds.max.y;
                if outside {
                    BoundaryResult::OutOfBounds
                } else {
                    BoundaryResult::Inside
                }
            }
            BoundaryType::Collidable => {
                if bounds.contains(&aabb) {
                    return BoundaryResult::Inside;
                }
                let x = push_inside(aabb.min.x, aabb.max.x, bounds.min.x, bounds.max.x);
                let y = push_inside(aabb.min.y, aabb.max.y, bounds.min.y, bounds.max.y);
                if x.is_none() && y.is_none() {
                    return BoundaryResult::Inside;
                }

                let shift = m::Vec2::new(x.map_or(0.0, |(s, _)| s), y.map_or(0.0, |(s, _)| s));
                body.move_by(shift);

                if bounce {
                    let e = body.restitution();
                    if let Some(dy) = body.dynamic_mut() {
                        let mut vel = dy.velocity().linear;
                        if let Some((_, wall)) = x {
                            vel.x = bounce_off(vel.x, wall, e);
                        }
                        if let Some((_, wall)) = y {
                            vel.y = bounce_off(vel.y, wall, e);
                        }
                        dy.set_velocity(vel);
                    }
                }
                BoundaryResult::Corrected
            }
        }
    }

    /// Check whether a body's lowest point is resting on the bottom edge of the world.
    pub fn check_if_on_floor(&self, body: &PhysicsBody) -> bool {
        let floor = -self.height / 2.0;
        (body.collider().aabb().min.y - floor).abs() <= FLOOR_TOLERANCE
    }
}

/// Which side of the world a body was pushed away from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wall {
    Low,
    High,
}

/// Shift needed on one axis to bring `min..max` inside `lo..hi`.
/// Bodies larger than the world are aligned with the low side,
/// and left alone once they are.
fn push_inside(min: f64, max: f64, lo: f64, hi: f64) -> Option<(f64, Wall)> {
    if max - min > hi - lo {
        let shift = lo - min;
        return (shift.abs() > ALIGNED_EPSILON).then_some((shift, Wall::Low));
    }
    if min < lo {
        Some((lo - min, Wall::Low))
    } else if max > hi {
        Some((hi - max, Wall::High))
    } else {
        None
    }
}

/// Reflect a velocity component if it points out through the wall.
fn bounce_off(v: f64, wall: Wall, restitution: f64) -> f64 {
    let outward = match wall {
        Wall::Low => v < 0.0,
        Wall::High => v > 0.0,
    };
    if outward {
        -v * restitution
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Angle;
    use crate::physics::{body::DEFAULT_RESTITUTION, Velocity};

    fn collidable() -> WorldBoundary {
        WorldBoundary::new(m::Vec2::new(20.0, 10.0), BoundaryType::Collidable)
    }

    fn assert_inside(boundary: &WorldBoundary, body: &PhysicsBody) {
        let bounds = boundary.bounds();
        let aabb = body.collider().aabb();
        let eps = 1e-9;
        assert!(aabb.min.x >= bounds.min.x - eps && aabb.max.x <= bounds.max.x + eps);
        assert!(aabb.min.y >= bounds.min.y - eps && aabb.max.y <= bounds.max.y + eps);
    }

    #[test]
    fn dimensions_are_clamped() {
        let mut b = WorldBoundary::new(m::Vec2::new(1.0, 50000.0), BoundaryType::Delete);
        assert_eq!(b.dimensions(), m::Vec2::new(MIN_WORLD_WIDTH, MAX_WORLD_HEIGHT));
        b.set_dimensions(m::Vec2::new(100.0, -3.0));
        assert_eq!(b.width(), 100.0);
        assert_eq!(b.height(), MIN_WORLD_HEIGHT);
        b.set_dimensions(m::Vec2::new(f64::NAN, 30.0));
        assert_eq!(b.dimensions(), m::Vec2::new(100.0, 30.0));
    }

    #[test]
    fn placement_moves_outside_bodies_in() {
        let boundary = collidable();
        let positions = [
            m::Vec2::new(50.0, 0.0),
            m::Vec2::new(-50.0, 3.0),
            m::Vec2::new(0.0, 20.0),
            m::Vec2::new(-30.0, -30.0),
        ];
        for pos in positions {
            let mut body = PhysicsBody::new_static_rect(pos, m::Vec2::new(1.0, 1.0));
            assert_eq!(boundary.placement_enforce(&mut body), BoundaryResult::Corrected);
            assert_inside(&boundary, &body);
        }

        let mut inside = PhysicsBody::new_dynamic_circle(m::Vec2::new(1.0, 1.0), 1.0);
        assert_eq!(boundary.placement_enforce(&mut inside), BoundaryResult::Inside);
        assert_eq!(inside.position(), m::Vec2::new(1.0, 1.0));
    }

    #[test]
    fn rotated_rects_use_their_bounding_box() {
        let boundary = collidable();
        let mut body = PhysicsBody::new_dynamic_rect(m::Vec2::new(9.5, 0.0), m::Vec2::new(4.0, 1.0))
            .with_rotation(Angle::Deg(45.0));
        boundary.placement_enforce(&mut body);
        assert_inside(&boundary, &body);
    }

    #[test]
    fn walls_reflect_only_outward_velocity() {
        let boundary = collidable();
        let mut body = PhysicsBody::new_dynamic_circle(m::Vec2::new(0.0, -4.5), 1.0)
            .with_restitution(0.5)
            .with_velocity(Velocity {
                linear: m::Vec2::new(2.0, -4.0),
                angular: 0.0,
            });
        assert_eq!(boundary.dynamic_enforce(&mut body), BoundaryResult::Corrected);
        assert_eq!(body.position(), m::Vec2::new(0.0, -4.0));
        assert_eq!(body.velocity().linear, m::Vec2::new(2.0, 2.0));
        assert!(boundary.check_if_on_floor(&body));

        // already moving back in, so the velocity is left alone
        body.set_position(m::Vec2::new(0.0, -4.5));
        boundary.dynamic_enforce(&mut body);
        assert_eq!(body.velocity().linear, m::Vec2::new(2.0, 2.0));
    }

    #[test]
    fn oversized_bodies_stay_against_the_low_wall() {
        let boundary = WorldBoundary::new(m::Vec2::new(5.0, 5.0), BoundaryType::Collidable);
        let mut body = PhysicsBody::new_dynamic_rect(m::Vec2::zero(), m::Vec2::new(8.0, 1.0))
            .with_velocity(Velocity {
                linear: m::Vec2::new(0.5, 0.0),
                angular: 0.0,
            });
        assert_eq!(boundary.placement_enforce(&mut body), BoundaryResult::Corrected);
        assert!((body.collider().aabb().min().x + 2.5).abs() < 1e-12);

        for _ in 0..4 {
            assert_eq!(boundary.dynamic_enforce(&mut body), BoundaryResult::Inside);
            assert!((body.position().x - 1.5).abs() < 1e-12);
        }
        assert_eq!(body.velocity().linear, m::Vec2::new(0.5, 0.0));

        // pushed back when it drifts off the low wall, bouncing only if moving outward
        body.move_by(m::Vec2::new(-0.2, 0.0));
        body.dynamic_mut().unwrap().set_velocity(m::Vec2::new(-1.0, 0.0));
        assert_eq!(boundary.dynamic_enforce(&mut body), BoundaryResult::Corrected);
        assert!((body.position().x - 1.5).abs() < 1e-12);
        assert!((body.velocity().linear.x - DEFAULT_RESTITUTION).abs() < 1e-12);
    }

    #[test]
    fn delete_reports_bodies_entirely_outside() {
        let boundary = WorldBoundary::new(m::Vec2::new(20.0, 10.0), BoundaryType::Delete);
        let mut partly = PhysicsBody::new_dynamic_rect(m::Vec2::new(10.2, 0.0), m::Vec2::new(1.0, 1.0));
        assert_eq!(boundary.dynamic_enforce(&mut partly), BoundaryResult::Inside);
        assert_eq!(partly.position(), m::Vec2::new(10.2, 0.0));

        let mut gone = PhysicsBody::new_dynamic_rect(m::Vec2::new(11.0, 0.0), m::Vec2::new(1.0, 1.0));
        assert_eq!(boundary.placement_enforce(&mut gone), BoundaryResult::OutOfBounds);
        let mut below = PhysicsBody::new_static_circle(m::Vec2::new(0.0, -7.0), 1.0);
        assert_eq!(boundary.dynamic_enforce(&mut below), BoundaryResult::OutOfBounds);
    }

    #[test]
    fn floor_detection() {
        let boundary = collidable();
        let resting = PhysicsBody::new_static_rect(m::Vec2::new(3.0, -4.5), m::Vec2::new(2.0, 1.0));
        assert!(boundary.check_if_on_floor(&resting));
        let hovering = PhysicsBody::new_static_rect(m::Vec2::new(3.0, -4.4), m::Vec2::new(2.0, 1.0));
        assert!(!boundary.check_if_on_floor(&hovering));
    }
}

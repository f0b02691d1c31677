use super::{
    collision::detection, error, resolution, BoundaryResult, BoundaryType, Contact, PhysicsBody,
    PhysicsError, WorldBoundary, WorldSettings,
};
use crate::math as m;

use itertools::Itertools;
use thunderdome as td;

/// A handle to a body owned by a [`PhysicsWorld`].
///
/// Handles of removed bodies are never reused for other bodies,
/// so a stale handle simply finds nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(td::Index);

/// Two bodies found to be intersecting.
/// The contact normal points from `body_a` to `body_b`.
#[derive(Clone, Copy, Debug)]
pub struct Collision {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub contact: Contact,
}

/// Counters of the work done during the last [`PhysicsWorld::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Pairs whose bounding boxes were compared.
    pub broad_phase_tests: usize,
    /// Pairs whose exact shapes were compared.
    pub narrow_phase_tests: usize,
    pub collisions_resolved: usize,
    /// Bodies deleted for leaving the world.
    pub bodies_removed: usize,
}

/// Owns a set of bodies and moves them through time.
///
/// Bodies are kept in the order they were added,
/// which is also the order collisions between them are resolved in.
/// Given the same bodies and the same sequence of timesteps,
/// the simulation always produces exactly the same results.
pub struct PhysicsWorld {
    bodies: td::Arena<PhysicsBody>,
    order: Vec<BodyHandle>,
    boundary: WorldBoundary,
    settings: WorldSettings,
    physics_process: bool,
    collision_process: bool,
    last_step: StepStats,
}

impl PhysicsWorld {
    /// Create an empty world with default settings.
    /// Bodies that leave the boundary are deleted;
    /// see [`set_boundary_type`][Self::set_boundary_type] to make it a wall instead.
    pub fn new(boundary_dimensions: m::Vec2) -> Self {
        PhysicsWorld {
            bodies: td::Arena::new(),
            order: Vec::new(),
            boundary: WorldBoundary::new(boundary_dimensions, BoundaryType::default()),
            settings: WorldSettings::default(),
            physics_process: true,
            collision_process: true,
            last_step: StepStats::default(),
        }
    }

    /// Set the tunable parameters in a builder-like chain.
    /// Out-of-range values are replaced with defaults.
    pub fn with_settings(mut self, settings: WorldSettings) -> Self {
        self.settings = settings.sanitized();
        self
    }

    /// Add a body to the world, enforcing the boundary on it first.
    ///
    /// Returns `None` if the boundary deletes bodies and this one is entirely outside,
    /// in which case the body is dropped.
    pub fn add_body(&mut self, mut body: PhysicsBody) -> Option<BodyHandle> {
        if self.boundary.placement_enforce(&mut body) == BoundaryResult::OutOfBounds {
            log::debug!(
                "Body placed outside of the world at {:?} was discarded",
                body.position()
            );
            return None;
        }
        let handle = BodyHandle(self.bodies.insert(body));
        self.order.push(handle);
        Some(handle)
    }

    /// Remove a body from the world, giving it back if it was there.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<PhysicsBody> {
        let body = self.bodies.remove(handle.0)?;
        self.order.retain(|h| *h != handle);
        Some(body)
    }

    /// Step the simulation forward by `dt` seconds:
    /// move bodies, then resolve collisions between them.
    /// Either part can be paused with [`set_physics_process`][Self::set_physics_process]
    /// and [`set_collision_process`][Self::set_collision_process].
    pub fn update(&mut self, dt: f64) {
        let _span = tracy_span!("physics update", "update");
        self.last_step = StepStats::default();

        if self.physics_process {
            self.update_physics(dt);
        }
        if self.collision_process {
            self.update_collisions();
        }

        log::trace!("Physics step done: {:?}", self.last_step);
    }

    /// Apply gravity to and integrate every dynamic body,
    /// then enforce the boundary on it and delete it if it has left the world.
    pub fn update_physics(&mut self, dt: f64) {
        let _span = tracy_span!("integrate bodies", "update_physics");
        let gravity = self.settings.scaled_gravity();

        // explicit indexing because bodies are removed from the list along the way
        let mut i = 0;
        while i < self.order.len() {
            let handle = self.order[i];
            let body = match self.bodies.get_mut(handle.0) {
                Some(body) if body.is_dynamic() => body,
                _ => {
                    i += 1;
                    continue;
                }
            };

            body.apply_gravity(gravity);
            body.integrate(dt);

            if self.boundary.dynamic_enforce(body) == BoundaryResult::OutOfBounds {
                log::debug!("Body left the world at {:?} and was deleted", body.position());
                self.bodies.remove(handle.0);
                self.order.remove(i);
                self.last_step.bodies_removed += 1;
                continue;
            }
            i += 1;
        }
    }

    /// Resolve intersections between bodies.
    ///
    /// Every pair of bodies is tested in insertion order, and the whole
    /// set of pairs is gone through as many times as the settings say.
    /// Each resolved pair moves the bodies immediately, so later pairs in the
    /// same pass see the corrected positions.
    /// Pairs of static bodies, pairs involving a trigger and pairs whose layers
    /// don't interact are skipped without testing.
    pub fn update_collisions(&mut self) {
        let _span = tracy_span!("resolve collisions", "update_collisions");
        let res_settings = self.settings.resolution;
        let stats = &mut self.last_step;

        for _ in 0..self.settings.solver_iterations {
            for (i, j) in (0..self.order.len()).tuple_combinations() {
                let (a, b) = match self.bodies.get2_mut(self.order[i].0, self.order[j].0) {
                    (Some(a), Some(b)) => (a, b),
                    _ => continue,
                };
                if a.is_static() && b.is_static() {
                    continue;
                }
                let (coll_a, coll_b) = (a.collider(), b.collider());
                if coll_a.is_trigger() || coll_b.is_trigger() || !coll_a.interacts_with(coll_b) {
                    continue;
                }

                stats.broad_phase_tests += 1;
                if !detection::aabb_vs_aabb(coll_a.aabb(), coll_b.aabb()) {
                    continue;
                }
                stats.narrow_phase_tests += 1;
                if let Some(contact) = detection::check_colliders(coll_a, coll_b) {
                    resolution::resolve_collision(a, b, &contact, &res_settings);
                    stats.collisions_resolved += 1;
                }
            }
        }
    }

    /// Add the world's gravity to a body's forces for the next update.
    /// Gravity is also applied automatically by [`update`][Self::update];
    /// calling this as well doubles it for one step.
    pub fn apply_gravity(&mut self, handle: BodyHandle) {
        let gravity = self.settings.scaled_gravity();
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.apply_gravity(gravity);
        }
    }

    /// Check whether two bodies are intersecting without resolving anything.
    /// Works for triggers too, which makes it useful for things like pickups.
    pub fn check_if_colliding(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.find_collision(a, b).is_some()
    }

    /// Like [`check_if_colliding`][Self::check_if_colliding],
    /// but returns the details of the intersection.
    pub fn find_collision(&self, a: BodyHandle, b: BodyHandle) -> Option<Collision> {
        if a == b {
            return None;
        }
        let body_a = self.bodies.get(a.0)?;
        let body_b = self.bodies.get(b.0)?;
        if !body_a.collider().interacts_with(body_b.collider()) {
            return None;
        }
        detection::check_collision(body_a, body_b).map(|contact| Collision {
            body_a: a,
            body_b: b,
            contact,
        })
    }

    /// Check whether a body is resting on the bottom edge of the world.
    pub fn check_if_on_floor(&self, handle: BodyHandle) -> bool {
        self.bodies
            .get(handle.0)
            .map_or(false, |body| self.boundary.check_if_on_floor(body))
    }

    // settings

    pub fn set_boundary_type(&mut self, ty: BoundaryType) {
        self.boundary.set_type(ty);
    }

    /// Resize the world. Out-of-range dimensions are clamped.
    pub fn set_boundary_dimensions(&mut self, dimensions: m::Vec2) {
        self.boundary.set_dimensions(dimensions);
    }

    /// Pause or resume moving bodies.
    pub fn set_physics_process(&mut self, enabled: bool) {
        self.physics_process = enabled;
    }

    /// Pause or resume resolving collisions.
    pub fn set_collision_process(&mut self, enabled: bool) {
        self.collision_process = enabled;
    }

    /// Set the multiplier on gravity. Negative values are ignored.
    pub fn set_gravity_scale(&mut self, scale: f64) {
        error::ignore(self.try_set_gravity_scale(scale));
    }

    pub fn try_set_gravity_scale(&mut self, scale: f64) -> Result<(), PhysicsError> {
        self.settings.try_set_gravity_scale(scale)
    }

    pub fn set_solver_iterations(&mut self, iterations: usize) {
        self.settings.solver_iterations = iterations;
    }

    // accessors

    /// All bodies in the order they were added.
    pub fn bodies(&self) -> impl Iterator<Item = &PhysicsBody> + '_ {
        self.order.iter().filter_map(|h| self.bodies.get(h.0))
    }

    /// Handles of all bodies in the order they were added.
    pub fn handles(&self) -> &[BodyHandle] {
        &self.order
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&PhysicsBody> {
        self.bodies.get(handle.0)
    }

    /// Access a body to change it.
    /// Moving a body this way doesn't enforce the boundary until the next update.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(handle.0)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn boundary(&self) -> &WorldBoundary {
        &self.boundary
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn is_physics_processing(&self) -> bool {
        self.physics_process
    }

    pub fn is_collision_processing(&self) -> bool {
        self.collision_process
    }

    pub fn step_stats(&self) -> StepStats {
        self.last_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{ColliderType, LayerSet, Velocity};

    const DT: f64 = 1.0 / 60.0;

    fn walled_world(size: f64) -> PhysicsWorld {
        let mut world = PhysicsWorld::new(m::Vec2::new(size, size));
        world.set_boundary_type(BoundaryType::Collidable);
        world
    }

    fn pile(world: &mut PhysicsWorld) {
        world.add_body(PhysicsBody::new_static_rect(
            m::Vec2::new(0.0, -8.0),
            m::Vec2::new(30.0, 2.0),
        ));
        for i in 0..4 {
            let x = i as f64 * 1.3 - 2.0;
            world.add_body(
                PhysicsBody::new_dynamic_rect(m::Vec2::new(x, i as f64 * 1.5), m::Vec2::new(1.0, 1.0))
                    .with_rotation(crate::math::Angle::Deg(i as f64 * 17.0)),
            );
            world.add_body(PhysicsBody::new_dynamic_circle(
                m::Vec2::new(-x, 2.0 + i as f64 * 1.5),
                0.5,
            ));
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let run = || {
            let mut world = walled_world(40.0);
            pile(&mut world);
            for _ in 0..180 {
                world.update(DT);
            }
            world
                .bodies()
                .flat_map(|b| {
                    [
                        b.position().x.to_bits(),
                        b.position().y.to_bits(),
                        b.rotation().rad().to_bits(),
                    ]
                })
                .collect::<Vec<u64>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn circle_comes_to_rest_on_platform() {
        let mut world = walled_world(100.0);
        let platform = world
            .add_body(PhysicsBody::new_static_rect(
                m::Vec2::new(0.0, -5.0),
                m::Vec2::new(4.0, 1.0),
            ))
            .unwrap();
        let ball = world
            .add_body(
                PhysicsBody::new_dynamic_circle(m::Vec2::new(0.0, 5.0), 1.0)
                    .with_mass(1.0)
                    .with_restitution(0.0),
            )
            .unwrap();

        for _ in 0..300 {
            world.update(DT);
        }

        let ball = world.body(ball).unwrap();
        let platform_top = world.body(platform).unwrap().collider().aabb().max().y;
        assert!(ball.velocity().linear.y.abs() < 1e-6);
        assert!((ball.position().y - (platform_top + 1.0)).abs() < 0.01);
        assert!(ball.position().x.abs() < 1e-9);
    }

    #[test]
    fn overlap_is_resolved_within_one_update() {
        let mut world = walled_world(50.0);
        world.set_gravity_scale(0.0);
        let a = world
            .add_body(PhysicsBody::new_dynamic_rect(m::Vec2::zero(), m::Vec2::new(1.0, 1.0)))
            .unwrap();
        let b = world
            .add_body(PhysicsBody::new_dynamic_rect(
                m::Vec2::new(0.9, 0.0),
                m::Vec2::new(1.0, 1.0),
            ))
            .unwrap();
        let c = world
            .add_body(PhysicsBody::new_dynamic_circle(m::Vec2::new(0.0, 1.2), 0.5))
            .unwrap();

        world.update(DT);

        for (x, y) in [(a, b), (a, c), (b, c)] {
            if let Some(collision) = world.find_collision(x, y) {
                assert!(collision.contact.depth < 0.01, "{:?}", collision);
            }
        }
    }

    #[test]
    fn pile_stays_separated() {
        let mut world = walled_world(40.0);
        pile(&mut world);
        for _ in 0..120 {
            world.update(DT);
        }
        for (x, y) in world.handles().iter().copied().tuple_combinations() {
            if let Some(collision) = world.find_collision(x, y) {
                assert!(collision.contact.depth < 0.01, "{:?}", collision);
            }
        }
    }

    #[test]
    fn placement_in_collidable_world_moves_body_inside() {
        let mut world = walled_world(10.0);
        let h = world
            .add_body(PhysicsBody::new_static_rect(
                m::Vec2::new(40.0, -40.0),
                m::Vec2::new(1.0, 1.0),
            ))
            .unwrap();
        let aabb = *world.body(h).unwrap().collider().aabb();
        assert!(aabb.min().x >= -5.0 && aabb.max().x <= 5.0);
        assert!(aabb.min().y >= -5.0 && aabb.max().y <= 5.0);
    }

    #[test]
    fn body_wider_than_world_settles() {
        let mut world = walled_world(5.0);
        world.set_gravity_scale(0.0);
        let h = world
            .add_body(PhysicsBody::new_dynamic_rect(m::Vec2::zero(), m::Vec2::new(8.0, 1.0)))
            .unwrap();
        for _ in 0..4 {
            world.update(DT);
            let body = world.body(h).unwrap();
            assert!((body.position().x - 1.5).abs() < 1e-12);
            assert_eq!(body.velocity().linear, m::Vec2::zero());
        }
    }

    #[test]
    fn delete_boundary_removes_bodies() {
        let mut world = PhysicsWorld::new(m::Vec2::new(10.0, 10.0));
        assert_eq!(world.boundary().ty(), BoundaryType::Delete);
        world.set_gravity_scale(0.0);

        let outside = PhysicsBody::new_dynamic_rect(m::Vec2::new(40.0, 0.0), m::Vec2::new(1.0, 1.0));
        assert_eq!(world.add_body(outside), None);
        assert!(world.is_empty());

        let moving = |x: f64, vx: f64| {
            PhysicsBody::new_dynamic_rect(m::Vec2::new(x, 0.0), m::Vec2::new(1.0, 1.0)).with_velocity(
                Velocity {
                    linear: m::Vec2::new(vx, 0.0),
                    angular: 0.0,
                },
            )
        };
        let first = world.add_body(moving(-3.0, 0.0)).unwrap();
        let leaving = world.add_body(moving(4.0, 600.0)).unwrap();
        let last = world.add_body(moving(0.0, 60.0)).unwrap();

        world.update(DT);

        assert!(!world.contains(leaving));
        assert_eq!(world.step_stats().bodies_removed, 1);
        itertools::assert_equal(world.handles().iter().copied(), [first, last]);
        // the body after the removed one still moved this step
        assert!((world.body(last).unwrap().position().x - 1.0).abs() < 1e-12);
        assert_eq!(world.bodies().count(), 2);
    }

    #[test]
    fn static_pairs_are_never_tested() {
        let mut world = walled_world(20.0);
        let a = world
            .add_body(PhysicsBody::new_static_rect(m::Vec2::zero(), m::Vec2::new(2.0, 2.0)))
            .unwrap();
        let b = world
            .add_body(PhysicsBody::new_static_circle(m::Vec2::new(0.5, 0.5), 1.0))
            .unwrap();

        world.update(DT);

        let stats = world.step_stats();
        assert_eq!(stats.broad_phase_tests, 0);
        assert_eq!(stats.narrow_phase_tests, 0);
        assert_eq!(stats.collisions_resolved, 0);
        assert_eq!(world.body(a).unwrap().position(), m::Vec2::zero());
        assert_eq!(world.body(b).unwrap().position(), m::Vec2::new(0.5, 0.5));
        // still detectable on request
        assert!(world.check_if_colliding(a, b));
    }

    #[test]
    fn triggers_detect_but_never_resolve() {
        let mut world = walled_world(20.0);
        world.set_gravity_scale(0.0);
        let player = world
            .add_body(PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 1.0))
            .unwrap();
        let coin = world
            .add_body(
                PhysicsBody::new_dynamic_circle(m::Vec2::new(0.5, 0.0), 0.5)
                    .with_collider(|c| c.with_type(ColliderType::Trigger)),
            )
            .unwrap();

        assert!(world.check_if_colliding(player, coin));
        world.update(DT);

        assert_eq!(world.body(player).unwrap().position(), m::Vec2::zero());
        assert_eq!(world.body(coin).unwrap().position(), m::Vec2::new(0.5, 0.0));
        assert_eq!(world.body(player).unwrap().velocity().linear, m::Vec2::zero());
        assert_eq!(world.step_stats().broad_phase_tests, 0);
        assert!(world.check_if_colliding(player, coin));
    }

    #[test]
    fn layers_filter_pairs() {
        let mut world = walled_world(20.0);
        world.set_gravity_scale(0.0);
        let a = world
            .add_body(
                PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 1.0).with_collider(|c| {
                    c.with_layers(LayerSet::single(1)).with_mask(LayerSet::single(1))
                }),
            )
            .unwrap();
        let b = world
            .add_body(
                PhysicsBody::new_dynamic_circle(m::Vec2::new(0.5, 0.0), 1.0).with_collider(|c| {
                    c.with_layers(LayerSet::single(2)).with_mask(LayerSet::single(2))
                }),
            )
            .unwrap();

        world.update(DT);
        assert_eq!(world.body(a).unwrap().position(), m::Vec2::zero());
        assert!(!world.check_if_colliding(a, b));

        // once one of them collides with the other's layer they're pushed apart
        world.body_mut(b).unwrap().collider_mut().set_mask(LayerSet::single(1).with(2));
        world.update(DT);
        assert!(world.body(a).unwrap().position().x < 0.0);
        assert!(world.step_stats().collisions_resolved > 0);
    }

    #[test]
    fn pausing_and_settings() {
        let mut world = walled_world(20.0);
        let h = world
            .add_body(PhysicsBody::new_dynamic_circle(m::Vec2::zero(), 1.0))
            .unwrap();

        world.set_physics_process(false);
        world.update(DT);
        assert_eq!(world.body(h).unwrap().position(), m::Vec2::zero());

        world.set_physics_process(true);
        world.set_gravity_scale(-3.0);
        assert_eq!(world.settings().gravity_scale, 1.0);
        assert_eq!(
            world.try_set_gravity_scale(-3.0),
            Err(PhysicsError::InvalidGravityScale(-3.0))
        );
        world.set_gravity_scale(2.0);
        world.update(0.5);
        // v = 2 * -9.81 * 0.5, x = v * 0.5
        let body = world.body(h).unwrap();
        assert!((body.velocity().linear.y + 9.81).abs() < 1e-12);
        assert!((body.position().y + 4.905).abs() < 1e-12);
        assert!(!world.check_if_on_floor(h));

        world.set_collision_process(false);
        world.set_solver_iterations(3);
        assert_eq!(world.settings().solver_iterations, 3);
        assert!(!world.is_collision_processing());
    }

    #[test]
    fn removing_bodies() {
        let mut world = PhysicsWorld::new(m::Vec2::new(20.0, 20.0));
        let a = world
            .add_body(PhysicsBody::new_static_circle(m::Vec2::zero(), 1.0))
            .unwrap();
        let b = world
            .add_body(PhysicsBody::new_dynamic_circle(m::Vec2::new(3.0, 0.0), 1.0))
            .unwrap();
        assert_eq!(world.len(), 2);

        let removed = world.remove_body(a).unwrap();
        assert!(removed.is_static());
        assert!(world.remove_body(a).is_none());
        assert!(world.body(a).is_none());
        assert!(!world.check_if_colliding(a, b));
        itertools::assert_equal(world.handles().iter().copied(), [b]);

        // the removed handle doesn't alias a new body
        let c = world
            .add_body(PhysicsBody::new_static_circle(m::Vec2::zero(), 1.0))
            .unwrap();
        assert_ne!(a, c);
        assert!(world.body(a).is_none());
    }

    #[test]
    fn floor_check_through_world() {
        let mut world = walled_world(10.0);
        let h = world
            .add_body(PhysicsBody::new_dynamic_rect(m::Vec2::new(0.0, -2.0), m::Vec2::new(1.0, 1.0)))
            .unwrap();
        for _ in 0..600 {
            world.update(DT);
        }
        assert!(world.check_if_on_floor(h));
    }

    #[test]
    fn settings_are_applied() {
        let settings = WorldSettings::default()
            .with_gravity([0.0, 0.0])
            .with_solver_iterations(1);
        let world = PhysicsWorld::new(m::Vec2::new(10.0, 10.0)).with_settings(settings);
        assert_eq!(world.settings().solver_iterations, 1);
        assert_eq!(world.settings().scaled_gravity(), m::Vec2::zero());
    }
}

//! Collision response with impulses.
//!
//! Every function here takes a contact whose normal points from the first body
//! to the second, and pushes the bodies apart along it. Static bodies are never
//! changed; when one takes part, the other body is the one that moves.

use super::{Contact, PhysicsBody, ResolutionMode, ResolutionSettings};
use crate::math::{self as m, VecExt};

/// Resolve an intersection between two bodies with the method chosen in the settings.
/// Advanced resolution needs contact points, so contacts without any fall back to basic.
pub fn resolve_collision(
    a: &mut PhysicsBody,
    b: &mut PhysicsBody,
    contact: &Contact,
    settings: &ResolutionSettings,
) {
    let mode = if contact.points.is_empty() {
        ResolutionMode::Basic
    } else {
        settings.mode
    };
    let percent = settings.correction_percent;

    use ResolutionMode::*;
    match (a.is_dynamic(), b.is_dynamic(), mode) {
        (false, false, _) => {}
        (true, false, Basic) => resolve_basic_dynamic_static(a, contact),
        (false, true, Basic) => resolve_basic_dynamic_static(b, &contact.flipped()),
        (true, true, Basic) => resolve_basic_dynamic_dynamic(a, b, contact),
        (true, false, Advanced) => resolve_advanced_dynamic_static(a, contact, percent),
        (false, true, Advanced) => {
            resolve_advanced_dynamic_static(b, &contact.flipped(), percent)
        }
        (true, true, Advanced) => resolve_advanced_dynamic_dynamic(a, b, contact, percent),
    }
}

/// Push a dynamic body out of a static one by the full depth
/// and reflect its velocity along the normal.
/// The normal points from the dynamic body to the static one.
pub fn resolve_basic_dynamic_static(body: &mut PhysicsBody, contact: &Contact) {
    let n = *contact.normal;
    body.move_by(-n * contact.depth);

    let vel = body.velocity().linear;
    let vn = vel.project_onto_axis(n);
    if vn <= 0.0 {
        // already moving away
        return;
    }
    let e = body.restitution();
    if let Some(dy) = body.dynamic_mut() {
        dy.velocity.linear = vel - n * (vn * (1.0 + e));
    }
}

/// Split the correction between two dynamic bodies by inverse mass
/// and exchange an impulse along the normal.
pub fn resolve_basic_dynamic_dynamic(a: &mut PhysicsBody, b: &mut PhysicsBody, contact: &Contact) {
    let n = *contact.normal;
    let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }

    a.move_by(-n * (contact.depth * inv_a / inv_sum));
    b.move_by(n * (contact.depth * inv_b / inv_sum));

    let rel_vel = b.velocity().linear - a.velocity().linear;
    let vn = rel_vel.project_onto_axis(n);
    if vn > 0.0 {
        return;
    }
    let e = combined_restitution(a, b);
    let j = -(1.0 + e) * vn / inv_sum;
    let impulse = n * j;
    a.apply_impulse(-impulse, m::Vec2::zero());
    b.apply_impulse(impulse, m::Vec2::zero());
}

/// Apply an impulse at each contact point of a dynamic body touching a static one,
/// then remove `percent` of the penetration.
/// The normal points from the dynamic body to the static one.
pub fn resolve_advanced_dynamic_static(body: &mut PhysicsBody, contact: &Contact, percent: f64) {
    let n = *contact.normal;
    let count = contact.points.len() as f64;
    let e = body.restitution();
    let inv_mass = body.inverse_mass();
    let inv_inertia = body.inverse_moment_of_inertia();
    let vel = body.velocity();
    let pos = body.position();

    // all impulses are computed from the velocity before any of them is applied
    let mut impulses: [(m::Vec2, m::Vec2); 2] = [(m::Vec2::zero(), m::Vec2::zero()); 2];
    for (slot, &point) in impulses.iter_mut().zip(contact.points.iter()) {
        let r = point - pos;
        let vn = vel.point_velocity(r).project_onto_axis(n);
        if vn < 0.0 {
            continue;
        }
        let r_cross_n = r.cross(n);
        let denom = inv_mass + r_cross_n * r_cross_n * inv_inertia;
        if denom <= 0.0 {
            continue;
        }
        let j = -(1.0 + e) * vn / denom / count;
        *slot = (n * j, r);
    }
    for (impulse, r) in impulses {
        body.apply_impulse(impulse, r);
    }

    body.move_by(-n * (contact.depth * percent));
}

/// Exchange impulses between two dynamic bodies at each contact point,
/// then move them apart by `percent` of the penetration, weighted by inverse mass.
pub fn resolve_advanced_dynamic_dynamic(
    a: &mut PhysicsBody,
    b: &mut PhysicsBody,
    contact: &Contact,
    percent: f64,
) {
    let n = *contact.normal;
    let count = contact.points.len() as f64;
    let e = combined_restitution(a, b);
    let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
    let (inv_ia, inv_ib) = (a.inverse_moment_of_inertia(), b.inverse_moment_of_inertia());
    let (vel_a, vel_b) = (a.velocity(), b.velocity());
    let (pos_a, pos_b) = (a.position(), b.position());

    let mut impulses: [(m::Vec2, m::Vec2, m::Vec2); 2] =
        [(m::Vec2::zero(), m::Vec2::zero(), m::Vec2::zero()); 2];
    for (slot, &point) in impulses.iter_mut().zip(contact.points.iter()) {
        let ra = point - pos_a;
        let rb = point - pos_b;
        let rel_vel = vel_b.point_velocity(rb) - vel_a.point_velocity(ra);
        let vn = rel_vel.project_onto_axis(n);
        if vn > 0.0 {
            continue;
        }
        let (ra_n, rb_n) = (ra.cross(n), rb.cross(n));
        let denom = inv_a + inv_b + ra_n * ra_n * inv_ia + rb_n * rb_n * inv_ib;
        if denom <= 0.0 {
            continue;
        }
        let j = -(1.0 + e) * vn / denom / count;
        *slot = (n * j, ra, rb);
    }
    for (impulse, ra, rb) in impulses {
        a.apply_impulse(-impulse, ra);
        b.apply_impulse(impulse, rb);
    }

    let inv_sum = inv_a + inv_b;
    if inv_sum > 0.0 {
        let correction = contact.depth * percent / inv_sum;
        a.move_by(-n * (correction * inv_a));
        b.move_by(n * (correction * inv_b));
    }
}

fn combined_restitution(a: &PhysicsBody, b: &PhysicsBody) -> f64 {
    a.restitution().min(b.restitution()).clamp(0.0, 1.0)
}

//! Overlap tests between colliders.
//!
//! Bounding boxes are compared first since that's cheap, then the exact shapes
//! are tested with the separating axis theorem.

use super::{collider::ColliderShape, Collider, AABB};
use crate::math::{self as m, left_normal, Unit, VecExt};
use crate::physics::PhysicsBody;

use itertools::{Itertools, MinMaxResult};

/// Distances closer together than this count as equal when picking contact points.
const CONTACT_EPSILON: f64 = 0.0005;
/// Edges shorter than this (squared) produce no separating axis.
const DEGENERATE_EDGE_SQ: f64 = 1e-12;

/// An intersection between two colliders.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// The normal, facing away from the first collider
    pub normal: Unit<m::Vec2>,
    /// Penetration depth
    pub depth: f64,
    /// Points of contact in world space
    pub points: ContactPoints,
}

impl Contact {
    /// The same contact seen from the other collider.
    pub fn flipped(self) -> Self {
        Contact {
            normal: -self.normal,
            ..self
        }
    }
}

/// 0-2 points of contact can occur between two 2D objects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactPoints {
    Zero,
    One(m::Vec2),
    Two(m::Vec2, m::Vec2),
}

impl ContactPoints {
    pub fn iter(&self) -> ContactPointIter<'_> {
        ContactPointIter { cp: self, idx: 0 }
    }

    pub fn len(&self) -> usize {
        match self {
            ContactPoints::Zero => 0,
            ContactPoints::One(_) => 1,
            ContactPoints::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ContactPoints::Zero)
    }
}

/// An iterator over the points in a [`ContactPoints`].
pub struct ContactPointIter<'a> {
    cp: &'a ContactPoints,
    idx: u8,
}

impl<'a> Iterator for ContactPointIter<'a> {
    type Item = &'a m::Vec2;

    fn next(&mut self) -> Option<Self::Item> {
        self.idx += 1;
        use ContactPoints::*;
        match (self.cp, self.idx - 1) {
            (One(p), 0) => Some(p),
            (Two(p, _), 0) => Some(p),
            (Two(_, p), 1) => Some(p),
            _ => None,
        }
    }
}

/// The interval a shape covers when projected onto an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub min: f64,
    pub max: f64,
}

impl Projection {
    /// Distance one interval has to move along the axis to stop overlapping the other,
    /// or `None` if there's a gap between them.
    pub fn overlap(&self, other: &Projection) -> Option<f64> {
        if self.max <= other.min || other.max <= self.min {
            None
        } else {
            Some((self.max - other.min).min(other.max - self.min))
        }
    }
}

//
// entry points
//

/// Broad phase test.
#[inline]
pub fn aabb_vs_aabb(a: &AABB, b: &AABB) -> bool {
    a.overlaps(b)
}

/// Test two bodies' colliders for intersection, checking bounding boxes first.
/// The contact normal points from `body_a` to `body_b`.
pub fn check_collision(body_a: &PhysicsBody, body_b: &PhysicsBody) -> Option<Contact> {
    let (a, b) = (body_a.collider(), body_b.collider());
    if !aabb_vs_aabb(a.aabb(), b.aabb()) {
        return None;
    }
    check_colliders(a, b)
}

/// Narrow phase test. Dispatches to the right test for the pair of shapes.
pub fn check_colliders(a: &Collider, b: &Collider) -> Option<Contact> {
    use ColliderShape::*;
    match (a.shape, b.shape) {
        (Circle { r: r1 }, Circle { r: r2 }) => {
            circle_circle(a.position(), r1, b.position(), r2)
        }
        (Circle { r }, Rect { hw, hh }) => {
            circle_polygon(a.position(), r, &b.rect_vertices(hw, hh), b.position())
        }
        (Rect { hw, hh }, Circle { r }) => {
            circle_polygon(b.position(), r, &a.rect_vertices(hw, hh), a.position())
                .map(Contact::flipped)
        }
        (Rect { hw: hw1, hh: hh1 }, Rect { hw: hw2, hh: hh2 }) => polygon_polygon(
            &a.rect_vertices(hw1, hh1),
            a.position(),
            &b.rect_vertices(hw2, hh2),
            b.position(),
        ),
    }
}

//
// shape pairs
//

pub fn circle_circle(
    center_a: m::Vec2,
    r_a: f64,
    center_b: m::Vec2,
    r_b: f64,
) -> Option<Contact> {
    let dist = center_a.vector_to(center_b);
    let dist_sq = dist.square();
    let r_sum = r_a + r_b;
    if dist_sq > r_sum * r_sum {
        return None;
    }

    // same position falls back to the x axis
    let normal = Unit::new_normalize(dist);

    Some(Contact {
        normal,
        depth: r_sum - dist_sq.sqrt(),
        points: ContactPoints::One(center_a + *normal * r_a),
    })
}

/// Separating axis test between two convex polygons given as counterclockwise vertices.
pub fn polygon_polygon(
    verts_a: &[m::Vec2],
    center_a: m::Vec2,
    verts_b: &[m::Vec2],
    center_b: m::Vec2,
) -> Option<Contact> {
    let axes = edge_normals(verts_a).chain(edge_normals(verts_b));
    let (axis, depth) = min_overlap_axis(axes, |axis| {
        (project_polygon(verts_a, axis), project_polygon(verts_b, axis))
    })?;

    Some(Contact {
        normal: facing(axis, center_a, center_b),
        depth,
        points: polygon_contact_points(verts_a, verts_b),
    })
}

/// Separating axis test between a circle and a convex polygon.
/// The contact normal points from the circle to the polygon.
pub fn circle_polygon(
    center: m::Vec2,
    r: f64,
    verts: &[m::Vec2],
    poly_center: m::Vec2,
) -> Option<Contact> {
    // the polygon's edges can't separate a circle from a corner,
    // that takes the axis towards the nearest vertex
    let vertex_axis = closest_vertex(center, verts)
        .map(|v| center.vector_to(v))
        .filter(|axis| axis.square() > DEGENERATE_EDGE_SQ)
        .map(|axis| axis.normalized());
    let axes = edge_normals(verts).chain(vertex_axis);
    let (axis, depth) = min_overlap_axis(axes, |axis| {
        (project_circle(center, r, axis), project_polygon(verts, axis))
    })?;

    Some(Contact {
        normal: facing(axis, center, poly_center),
        depth,
        points: circle_polygon_contact_point(center, verts)
            .map_or(ContactPoints::Zero, ContactPoints::One),
    })
}

//
// helpers
//

/// Project every vertex onto a unit axis and take the extremes.
pub fn project_polygon(verts: &[m::Vec2], axis: m::Vec2) -> Projection {
    match verts.iter().map(|v| v.project_onto_axis(axis)).minmax() {
        MinMaxResult::NoElements => Projection { min: 0.0, max: 0.0 },
        MinMaxResult::OneElement(p) => Projection { min: p, max: p },
        MinMaxResult::MinMax(min, max) => Projection { min, max },
    }
}

/// Project a circle onto a unit axis.
pub fn project_circle(center: m::Vec2, r: f64, axis: m::Vec2) -> Projection {
    let c = center.project_onto_axis(axis);
    Projection {
        min: c - r,
        max: c + r,
    }
}

/// The vertex nearest to `point`. Ties go to the first one in order.
pub fn closest_vertex(point: m::Vec2, verts: &[m::Vec2]) -> Option<m::Vec2> {
    verts.iter().copied().min_by(|a, b| {
        let da = point.vector_to(*a).square();
        let db = point.vector_to(*b).square();
        da.total_cmp(&db)
    })
}

/// The point on segment `a..b` nearest to `p`, and its squared distance to `p`.
pub fn closest_point_on_segment(p: m::Vec2, a: m::Vec2, b: m::Vec2) -> (m::Vec2, f64) {
    let ab = a.vector_to(b);
    let len_sq = ab.square();
    let closest = if len_sq < DEGENERATE_EDGE_SQ {
        a
    } else {
        let t = (a.vector_to(p).project_onto_axis(ab) / len_sq).clamp(0.0, 1.0);
        a + ab * t
    };
    (closest, closest.vector_to(p).square())
}

/// Find the vertices of either polygon that lie closest to an edge of the other.
/// Up to two vertices at (nearly) the same distance become contact points,
/// which happens when edges are resting flat against each other.
pub fn polygon_contact_points(verts_a: &[m::Vec2], verts_b: &[m::Vec2]) -> ContactPoints {
    let mut min_dist_sq = f64::INFINITY;
    let mut points = ContactPoints::Zero;

    for (verts, others) in [(verts_a, verts_b), (verts_b, verts_a)] {
        for &v in verts {
            for (&e1, &e2) in others.iter().circular_tuple_windows() {
                let (_, dist_sq) = closest_point_on_segment(v, e1, e2);
                if nearly_equal(dist_sq, min_dist_sq) {
                    if let ContactPoints::One(first) = points {
                        if !nearly_equal_vec(v, first) {
                            points = ContactPoints::Two(first, v);
                        }
                    }
                } else if dist_sq < min_dist_sq {
                    min_dist_sq = dist_sq;
                    points = ContactPoints::One(v);
                }
            }
        }
    }

    points
}

/// The point on the polygon's outline nearest to the circle's center.
pub fn circle_polygon_contact_point(center: m::Vec2, verts: &[m::Vec2]) -> Option<m::Vec2> {
    verts
        .iter()
        .circular_tuple_windows()
        .map(|(&e1, &e2)| closest_point_on_segment(center, e1, e2))
        .min_by(|(_, da), (_, db)| da.total_cmp(db))
        .map(|(p, _)| p)
}

/// Unit normals of a polygon's edges, skipping edges of zero length.
fn edge_normals(verts: &[m::Vec2]) -> impl Iterator<Item = m::Vec2> + '_ {
    verts
        .iter()
        .circular_tuple_windows()
        .map(|(&p1, &p2)| p1.vector_to(p2))
        .filter(|edge| edge.square() > DEGENERATE_EDGE_SQ)
        .map(|edge| left_normal(edge) / edge.mag())
}

/// Run the separating axis test over the given axes.
/// Returns `None` as soon as an axis separates the shapes,
/// otherwise the first axis with the smallest overlap.
/// If every axis was degenerate the x axis is tested instead.
fn min_overlap_axis(
    axes: impl Iterator<Item = m::Vec2>,
    project: impl Fn(m::Vec2) -> (Projection, Projection),
) -> Option<(m::Vec2, f64)> {
    let mut best: Option<(m::Vec2, f64)> = None;
    for axis in axes {
        let (pa, pb) = project(axis);
        let overlap = pa.overlap(&pb)?;
        if best.map_or(true, |(_, min)| overlap < min) {
            best = Some((axis, overlap));
        }
    }

    match best {
        Some(found) => Some(found),
        None => {
            let axis = m::Vec2::unit_x();
            let (pa, pb) = project(axis);
            pa.overlap(&pb).map(|overlap| (axis, overlap))
        }
    }
}

/// Orient an axis so that it points from `from` towards `to`.
fn facing(axis: m::Vec2, from: m::Vec2, to: m::Vec2) -> Unit<m::Vec2> {
    if from.vector_to(to).project_onto_axis(axis) < 0.0 {
        Unit::new_unchecked(-axis)
    } else {
        Unit::new_unchecked(axis)
    }
}

#[inline]
fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < CONTACT_EPSILON
}

#[inline]
fn nearly_equal_vec(a: m::Vec2, b: m::Vec2) -> bool {
    nearly_equal(a.x, b.x) && nearly_equal(a.y, b.y)
}

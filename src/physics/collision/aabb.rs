use crate::math as m;

/// Axis-aligned bounding box, used to cheaply reject pairs of colliders
/// that can't possibly intersect.
///
/// Invariant: `min.x <= max.x && min.y <= max.y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB {
    pub(crate) min: m::Vec2,
    pub(crate) max: m::Vec2,
}

impl AABB {
    /// Create a box from two corners in any order.
    pub fn new(a: m::Vec2, b: m::Vec2) -> Self {
        AABB {
            min: m::Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: m::Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The smallest box containing every point.
    /// An empty point set gives a zero-size box at the origin.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a m::Vec2>) -> Self {
        let mut points = points.into_iter();
        let first = match points.next() {
            Some(p) => *p,
            None => return AABB::new(m::Vec2::zero(), m::Vec2::zero()),
        };
        points.fold(AABB::around_point(first), |aabb, p| {
            aabb.union(&AABB::around_point(*p))
        })
    }

    fn around_point(p: m::Vec2) -> Self {
        AABB { min: p, max: p }
    }

    /// The bounding box of a disc.
    pub fn around_circle(center: m::Vec2, r: f64) -> Self {
        let r = m::Vec2::new(r.abs(), r.abs());
        AABB {
            min: center - r,
            max: center + r,
        }
    }

    pub fn min(&self) -> m::Vec2 {
        self.min
    }

    pub fn max(&self) -> m::Vec2 {
        self.max
    }

    pub fn center(&self) -> m::Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn half_extents(&self) -> m::Vec2 {
        (self.max - self.min) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Check for overlap with another box. Boxes that only touch don't overlap.
    #[inline]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    /// Check whether a point is inside the box or on its boundary.
    pub fn contains_point(&self, p: m::Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Check whether another box is entirely inside this one.
    pub fn contains(&self, other: &AABB) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: m::Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: m::Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

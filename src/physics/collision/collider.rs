use super::{LayerSet, AABB};
use crate::math::{self as m, VecExt};
use crate::physics::{error, PhysicsError};

/// The part of a body that collides with others.
///
/// A collider lives inside exactly one [`PhysicsBody`][crate::physics::PhysicsBody],
/// which keeps its position and rotation in sync. The bounding box is recomputed
/// every time the position, rotation or size changes, so it's always current.
#[derive(Clone, Copy, Debug)]
pub struct Collider {
    pub(crate) shape: ColliderShape,
    pub(crate) ty: ColliderType,
    offset: m::Vec2,
    position: m::Vec2,
    rotation: f64,
    aabb: AABB,
    layers: LayerSet,
    mask: LayerSet,
}

/// The physical shape of a collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    Circle {
        r: f64,
    },
    /// The rect collider stores its side lengths halved because this makes
    /// intersection tests easier.
    Rect {
        hw: f64,
        hh: f64,
    },
}

/// Shape without the dimensions, for when we only care which kind it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Rect,
}

/// Whether a collider takes part in collision resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum ColliderType {
    /// Pushes other solid colliders away.
    #[default]
    Solid,
    /// Detects overlaps with
    /// [`PhysicsWorld::check_if_colliding`][crate::physics::PhysicsWorld::check_if_colliding]
    /// but never resolves them. Good for pickups and zones.
    Trigger,
}

impl ColliderShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ColliderShape::Circle { .. } => ShapeKind::Circle,
            ColliderShape::Rect { .. } => ShapeKind::Rect,
        }
    }

    pub fn area(&self) -> f64 {
        match *self {
            ColliderShape::Circle { r } => std::f64::consts::PI * r * r,
            ColliderShape::Rect { hw, hh } => 4.0 * hw * hh,
        }
    }

    /// Moment of inertia divided by mass.
    pub fn moment_of_inertia_coef(&self) -> f64 {
        // from https://en.wikipedia.org/wiki/List_of_moments_of_inertia
        match *self {
            ColliderShape::Circle { r } => r * r / 2.0,
            ColliderShape::Rect { hw, hh } => (hw * hw + hh * hh) / 3.0,
        }
    }
}

impl Collider {
    /// Create a circle collider from a radius. Negative radii are treated as zero.
    pub fn new_circle(radius: f64) -> Self {
        Self::from_shape(ColliderShape::Circle {
            r: radius.max(0.0),
        })
    }

    /// Create a rect collider with both sides set to the same length.
    pub fn new_square(side_length: f64) -> Self {
        Collider::new_rect(side_length, side_length)
    }

    /// Create a rect collider with two different side lengths.
    /// Negative lengths are treated as zero.
    pub fn new_rect(width: f64, height: f64) -> Self {
        let hw = width.max(0.0) / 2.0;
        let hh = height.max(0.0) / 2.0;
        Self::from_shape(ColliderShape::Rect { hw, hh })
    }

    fn from_shape(shape: ColliderShape) -> Self {
        let mut coll = Collider {
            shape,
            ty: ColliderType::Solid,
            offset: m::Vec2::zero(),
            position: m::Vec2::zero(),
            rotation: 0.0,
            aabb: AABB::new(m::Vec2::zero(), m::Vec2::zero()),
            layers: LayerSet::default(),
            mask: LayerSet::default(),
        };
        coll.update_aabb();
        coll
    }

    /// Set the collider type in a builder-like chain.
    pub fn with_type(mut self, ty: ColliderType) -> Self {
        self.ty = ty;
        self
    }

    /// Set the offset from the body's position in a builder-like chain.
    pub fn with_offset(mut self, offset: m::Vec2) -> Self {
        self.set_offset(offset);
        self
    }

    /// Set the layers this collider belongs to in a builder-like chain.
    pub fn with_layers(mut self, layers: LayerSet) -> Self {
        self.layers = layers;
        self
    }

    /// Set the layers this collider collides with in a builder-like chain.
    pub fn with_mask(mut self, mask: LayerSet) -> Self {
        self.mask = mask;
        self
    }

    // accessors

    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Radius if this is a circle.
    pub fn radius(&self) -> Option<f64> {
        match self.shape {
            ColliderShape::Circle { r } => Some(r),
            _ => None,
        }
    }

    /// Full width if this is a rect.
    pub fn width(&self) -> Option<f64> {
        match self.shape {
            ColliderShape::Rect { hw, .. } => Some(2.0 * hw),
            _ => None,
        }
    }

    /// Full height if this is a rect.
    pub fn height(&self) -> Option<f64> {
        match self.shape {
            ColliderShape::Rect { hh, .. } => Some(2.0 * hh),
            _ => None,
        }
    }

    pub fn ty(&self) -> ColliderType {
        self.ty
    }

    pub fn is_trigger(&self) -> bool {
        self.ty == ColliderType::Trigger
    }

    /// Position of the collider's center in world space.
    pub fn position(&self) -> m::Vec2 {
        self.position
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn offset(&self) -> m::Vec2 {
        self.offset
    }

    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    pub fn layers(&self) -> LayerSet {
        self.layers
    }

    pub fn mask(&self) -> LayerSet {
        self.mask
    }

    pub fn area(&self) -> f64 {
        self.shape.area()
    }

    pub fn moment_of_inertia_coef(&self) -> f64 {
        self.shape.moment_of_inertia_coef()
    }

    /// Check whether two colliders' layers allow them to interact.
    pub fn interacts_with(&self, other: &Collider) -> bool {
        self.mask.intersects(other.layers) || other.mask.intersects(self.layers)
    }

    /// Corners of a rect collider in world space, in counterclockwise order.
    /// Circles have no vertices.
    pub fn vertices(&self) -> Option<[m::Vec2; 4]> {
        match self.shape {
            ColliderShape::Rect { hw, hh } => Some(self.rect_vertices(hw, hh)),
            ColliderShape::Circle { .. } => None,
        }
    }

    pub(crate) fn rect_vertices(&self, hw: f64, hh: f64) -> [m::Vec2; 4] {
        [
            m::Vec2::new(-hw, -hh),
            m::Vec2::new(hw, -hh),
            m::Vec2::new(hw, hh),
            m::Vec2::new(-hw, hh),
        ]
        .map(|corner| self.position + corner.rotated(self.rotation))
    }

    // setters

    pub fn set_type(&mut self, ty: ColliderType) {
        self.ty = ty;
    }

    pub fn set_layers(&mut self, layers: LayerSet) {
        self.layers = layers;
    }

    pub fn set_mask(&mut self, mask: LayerSet) {
        self.mask = mask;
    }

    /// Change the offset from the owning body's position.
    pub fn set_offset(&mut self, offset: m::Vec2) {
        let body_pos = self.position - self.offset;
        self.offset = offset;
        self.position = body_pos + offset;
        self.update_aabb();
    }

    /// Set the radius of a circle collider.
    /// Negative values and non-circle colliders are ignored.
    pub fn set_radius(&mut self, radius: f64) {
        error::ignore(self.try_set_radius(radius));
    }

    pub fn try_set_radius(&mut self, radius: f64) -> Result<(), PhysicsError> {
        if !(radius >= 0.0) {
            return Err(PhysicsError::InvalidRadius(radius));
        }
        match &mut self.shape {
            ColliderShape::Circle { r } => *r = radius,
            other => {
                return Err(PhysicsError::ShapeMismatch {
                    expected: ShapeKind::Circle,
                    actual: other.kind(),
                })
            }
        }
        self.update_aabb();
        Ok(())
    }

    /// Set the full width and height of a rect collider.
    /// Negative values and non-rect colliders are ignored.
    pub fn set_dimensions(&mut self, width: f64, height: f64) {
        error::ignore(self.try_set_dimensions(width, height));
    }

    pub fn try_set_dimensions(&mut self, width: f64, height: f64) -> Result<(), PhysicsError> {
        if !(width >= 0.0 && height >= 0.0) {
            return Err(PhysicsError::InvalidDimensions(width, height));
        }
        match &mut self.shape {
            ColliderShape::Rect { hw, hh } => {
                *hw = width / 2.0;
                *hh = height / 2.0;
            }
            other => {
                return Err(PhysicsError::ShapeMismatch {
                    expected: ShapeKind::Rect,
                    actual: other.kind(),
                })
            }
        }
        self.update_aabb();
        Ok(())
    }

    pub fn set_width(&mut self, width: f64) {
        if let ColliderShape::Rect { hh, .. } = self.shape {
            self.set_dimensions(width, 2.0 * hh);
        } else {
            self.set_dimensions(width, 0.0);
        }
    }

    pub fn set_height(&mut self, height: f64) {
        if let ColliderShape::Rect { hw, .. } = self.shape {
            self.set_dimensions(2.0 * hw, height);
        } else {
            self.set_dimensions(0.0, height);
        }
    }

    /// Follow the owning body to a new position and rotation.
    pub(crate) fn sync_to_body(&mut self, body_position: m::Vec2, rotation: f64) {
        self.position = body_position + self.offset;
        self.rotation = rotation;
        self.update_aabb();
    }

    fn update_aabb(&mut self) {
        self.aabb = match self.shape {
            ColliderShape::Circle { r } => AABB::around_circle(self.position, r),
            ColliderShape::Rect { hw, hh } => AABB::from_points(&self.rect_vertices(hw, hh)),
        };
    }
}

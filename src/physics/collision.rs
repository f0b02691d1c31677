mod aabb;
pub use aabb::AABB;

mod collider;
pub use collider::{Collider, ColliderShape, ColliderType, ShapeKind};

pub mod detection;
pub use detection::{Contact, ContactPoints, Projection};

mod layers;
pub use layers::{LayerIter, LayerSet};

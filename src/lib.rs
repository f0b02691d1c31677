/// Open a profiler span that lasts until the returned value is dropped.
/// Does nothing unless the `tracy` feature is enabled and a profiler is connected.
macro_rules! tracy_span {
    ($name:literal, $fn_name:literal) => {
        tracy_client::Client::running()
            .map(|client| client.span_alloc(Some($name), $fn_name, file!(), line!(), 0))
    };
}

pub mod math;
pub use math::{uv, Angle, Unit, Vec2, VecExt};

pub mod physics;
pub use physics::{
    body::{BodyKind, BodyType, DynamicState, Mass, PhysicsBody},
    boundary::{BoundaryResult, BoundaryType, WorldBoundary},
    collision::{
        self, Collider, ColliderShape, ColliderType, Contact, ContactPoints, LayerSet, ShapeKind,
        AABB,
    },
    settings::{ResolutionMode, ResolutionSettings, WorldSettings},
    BodyHandle, Collision, PhysicsError, PhysicsWorld, StepStats, Velocity,
};

use super::collision::ShapeKind;

/// A request to change a physical property that was rejected.
///
/// The plain setters throughout the crate ignore invalid values and keep the previous one.
/// Their `try_` counterparts return this error instead, for callers that want to know.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum PhysicsError {
    #[error("Mass must be positive and finite, got {0}")]
    InvalidMass(f64),
    #[error("Restitution must be between 0 and 1, got {0}")]
    InvalidRestitution(f64),
    #[error("Radius must be non-negative, got {0}")]
    InvalidRadius(f64),
    #[error("Rectangle dimensions must be non-negative, got {0} x {1}")]
    InvalidDimensions(f64, f64),
    #[error("Gravity scale must be non-negative, got {0}")]
    InvalidGravityScale(f64),
    #[error("Operation requires a {expected:?} collider but it was a {actual:?}")]
    ShapeMismatch {
        expected: ShapeKind,
        actual: ShapeKind,
    },
}

/// Log a rejected request the way the silent setters do.
pub(crate) fn ignore(result: Result<(), PhysicsError>) {
    if let Err(err) = result {
        log::debug!("Ignored invalid physics parameter: {err}");
    }
}

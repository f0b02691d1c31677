use super::{error, PhysicsError};
use crate::math as m;

/// Gravity applied to new worlds, in metres per second squared.
pub const DEFAULT_GRAVITY: [f64; 2] = [0.0, -9.81];
/// Number of relaxation passes over all body pairs per update.
pub const DEFAULT_SOLVER_ITERATIONS: usize = 10;
/// Share of the penetration depth removed per pass in advanced resolution.
pub const DEFAULT_CORRECTION_PERCENT: f64 = 0.5;

/// Tunable parameters of a [`PhysicsWorld`][super::PhysicsWorld].
///
/// Can be built in code with the `with_*` methods or loaded from a file;
/// missing fields take their default values. Invalid values set through the
/// builder methods are ignored, and invalid values from a file are replaced
/// with defaults when the world is created.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct WorldSettings {
    pub gravity: [f64; 2],
    pub gravity_scale: f64,
    pub solver_iterations: usize,
    pub resolution: ResolutionSettings,
}

/// How collisions are resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct ResolutionSettings {
    pub mode: ResolutionMode,
    /// Share of the penetration depth corrected per pass, between 0 and 1.
    pub correction_percent: f64,
}

/// Whether collision response models rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum ResolutionMode {
    /// Impulses along the normal through the centers of mass only.
    /// Bodies are pushed apart by the full penetration depth.
    Basic,
    /// Impulses at the contact points, which also spin bodies up.
    #[default]
    Advanced,
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            gravity: DEFAULT_GRAVITY,
            gravity_scale: 1.0,
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            resolution: ResolutionSettings::default(),
        }
    }
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        ResolutionSettings {
            mode: ResolutionMode::default(),
            correction_percent: DEFAULT_CORRECTION_PERCENT,
        }
    }
}

impl WorldSettings {
    #[inline]
    pub fn with_gravity(mut self, gravity: impl Into<[f64; 2]>) -> Self {
        self.gravity = gravity.into();
        self
    }

    /// Negative values are ignored.
    #[inline]
    pub fn with_gravity_scale(mut self, scale: f64) -> Self {
        error::ignore(self.try_set_gravity_scale(scale));
        self
    }

    #[inline]
    pub fn with_solver_iterations(mut self, iterations: usize) -> Self {
        self.solver_iterations = iterations;
        self
    }

    #[inline]
    pub fn with_resolution(mut self, resolution: ResolutionSettings) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn try_set_gravity_scale(&mut self, scale: f64) -> Result<(), PhysicsError> {
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(PhysicsError::InvalidGravityScale(scale));
        }
        self.gravity_scale = scale;
        Ok(())
    }

    /// Gravity with the scale applied.
    pub fn scaled_gravity(&self) -> m::Vec2 {
        m::Vec2::new(self.gravity[0], self.gravity[1]) * self.gravity_scale
    }

    /// Replace out-of-range values with their defaults.
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = WorldSettings::default();
        if self.try_set_gravity_scale(self.gravity_scale).is_err() {
            log::debug!(
                "Invalid gravity scale {} in settings, using {}",
                self.gravity_scale,
                defaults.gravity_scale
            );
            self.gravity_scale = defaults.gravity_scale;
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            log::debug!("Non-finite gravity {:?} in settings, using default", self.gravity);
            self.gravity = defaults.gravity;
        }
        self.resolution = self.resolution.sanitized();
        self
    }
}

impl ResolutionSettings {
    #[inline]
    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Values outside of `[0, 1]` are ignored.
    #[inline]
    pub fn with_correction_percent(mut self, percent: f64) -> Self {
        if (0.0..=1.0).contains(&percent) {
            self.correction_percent = percent;
        } else {
            log::debug!("Ignored correction percent {percent} outside of [0, 1]");
        }
        self
    }

    fn sanitized(self) -> Self {
        if (0.0..=1.0).contains(&self.correction_percent) {
            self
        } else {
            log::debug!(
                "Invalid correction percent {} in settings, using default",
                self.correction_percent
            );
            ResolutionSettings {
                correction_percent: DEFAULT_CORRECTION_PERCENT,
                ..self
            }
        }
    }
}

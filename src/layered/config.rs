//! Layered optimizer configuration.

use crate::brute::BruteForceConfig;
use crate::error::{OptimError, Result};
use crate::ga::GaConfig;

/// Configuration for [`LayeredOptimizer`](super::LayeredOptimizer).
///
/// # Examples
///
/// ```
/// use u_tuner::ga::GaConfig;
/// use u_tuner::layered::LayeredConfig;
///
/// let config = LayeredConfig::default()
///     .with_genetic(GaConfig::default().with_max_generations(50).with_seed(7))
///     .with_search_radius(0.05)
///     .with_step_scale(0.25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayeredConfig {
    /// Phase 1 settings.
    pub genetic: GaConfig,

    /// Phase 2 settings.
    pub brute_force: BruteForceConfig,

    /// Refinement half-width as a fraction of each range's span. Must be
    /// `> 0`.
    pub search_radius: f64,

    /// Multiplier applied to each range's step for refinement. Must be in
    /// `(0, 1]`.
    pub step_scale: f64,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            genetic: GaConfig::default(),
            brute_force: BruteForceConfig::default(),
            search_radius: 0.1,
            step_scale: 0.5,
        }
    }
}

impl LayeredConfig {
    /// Sets the phase-1 genetic configuration.
    pub fn with_genetic(mut self, genetic: GaConfig) -> Self {
        self.genetic = genetic;
        self
    }

    /// Sets the phase-2 brute-force configuration.
    pub fn with_brute_force(mut self, brute_force: BruteForceConfig) -> Self {
        self.brute_force = brute_force;
        self
    }

    /// Not clamped; out-of-range values are reported by [`validate`](Self::validate).
    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = radius;
        self
    }

    /// Not clamped; out-of-range values are reported by [`validate`](Self::validate).
    pub fn with_step_scale(mut self, scale: f64) -> Self {
        self.step_scale = scale;
        self
    }

    /// Validates both phases and the refinement parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.search_radius > 0.0 && self.search_radius.is_finite()) {
            return Err(OptimError::InvalidConfig(format!(
                "search_radius must be > 0, got {}",
                self.search_radius
            )));
        }
        if !(self.step_scale > 0.0 && self.step_scale <= 1.0) {
            return Err(OptimError::InvalidConfig(format!(
                "step_scale must be in (0, 1], got {}",
                self.step_scale
            )));
        }
        self.genetic.validate()?;
        self.brute_force.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayeredConfig::default();
        assert_eq!(config.search_radius, 0.1);
        assert_eq!(config.step_scale, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refinement_bounds() {
        for radius in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let err = LayeredConfig::default()
                .with_search_radius(radius)
                .validate()
                .unwrap_err();
            assert!(err.to_string().contains("search_radius"), "{radius}");
        }
        for scale in [0.0, -1.0, 1.01, f64::NAN] {
            let err = LayeredConfig::default()
                .with_step_scale(scale)
                .validate()
                .unwrap_err();
            assert!(err.to_string().contains("step_scale"), "{scale}");
        }
        assert!(LayeredConfig::default().with_step_scale(1.0).validate().is_ok());
        assert!(LayeredConfig::default().with_search_radius(2.0).validate().is_ok());
    }

    #[test]
    fn test_phase_configs_are_validated() {
        let config = LayeredConfig::default().with_genetic(GaConfig::default().with_population_size(0));
        assert!(config.validate().is_err());
        let config =
            LayeredConfig::default().with_brute_force(BruteForceConfig::default().with_max_evaluations(0));
        assert!(config.validate().is_err());
    }
}

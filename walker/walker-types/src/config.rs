//! Validation limits for walker bodies.
//!
//! The defaults are the bounds the downstream physics engine tolerates
//! without tearing a body apart.

use serde::{Deserialize, Serialize};

use crate::WalkerError;

/// Bounds checked by walker validation.
///
/// # Example
///
/// ```
/// use walker_types::ValidationLimits;
///
/// let limits = ValidationLimits::default();
/// assert_eq!(limits.max_muscles_per_joint, 4);
/// assert!(limits.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Maximum number of muscle endpoints attached to one joint.
    pub max_muscles_per_joint: usize,
    /// Maximum amplitude of an actuated muscle.
    pub max_muscle_strength: f64,
    /// Minimum value of `x - y` for every joint.
    pub min_joint_spacing: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_muscles_per_joint: 4,
            max_muscle_strength: 10.0,
            min_joint_spacing: 0.1,
        }
    }
}

impl ValidationLimits {
    /// Set the per-joint muscle limit.
    #[must_use]
    pub const fn with_max_muscles_per_joint(mut self, max: usize) -> Self {
        self.max_muscles_per_joint = max;
        self
    }

    /// Set the amplitude limit.
    #[must_use]
    pub const fn with_max_muscle_strength(mut self, max: f64) -> Self {
        self.max_muscle_strength = max;
        self
    }

    /// Set the joint spacing floor.
    #[must_use]
    pub const fn with_min_joint_spacing(mut self, min: f64) -> Self {
        self.min_joint_spacing = min;
        self
    }

    /// Parse limits from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let limits: Self = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    /// Validate the limits themselves.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.max_muscle_strength.is_finite() || self.max_muscle_strength < 0.0 {
            return Err(WalkerError::invalid_config(format!(
                "max_muscle_strength must be finite and non-negative, got {}",
                self.max_muscle_strength
            )));
        }

        if !self.min_joint_spacing.is_finite() {
            return Err(WalkerError::invalid_config(format!(
                "min_joint_spacing must be finite, got {}",
                self.min_joint_spacing
            )));
        }

        Ok(())
    }
}

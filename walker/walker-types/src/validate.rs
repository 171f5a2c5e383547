//! Walker validation.
//!
//! Checks that a body will not break the physics engine:
//!
//! - each joint anchors a bounded number of muscles
//! - muscle strength is bounded
//! - every joint satisfies `x - y >= min_joint_spacing`
//!
//! Nothing here is enforced at construction time. A walker may be built in
//! any shape and validated afterwards.

use hashbrown::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::{ValidationLimits, Walker};

/// A single broken validation rule.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Violation {
    /// A joint anchors too many muscle endpoints.
    #[error("joint {joint} anchors {count} muscles (max {max})")]
    TooManyMuscles {
        /// Index of the joint.
        joint: usize,
        /// Muscle endpoints attached to it.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// An actuated muscle is too strong.
    #[error("muscle {muscle} amplitude {amplitude} exceeds {max}")]
    ExcessiveStrength {
        /// Index of the muscle.
        muscle: usize,
        /// Its amplitude.
        amplitude: f64,
        /// Allowed maximum.
        max: f64,
    },

    /// A joint is too close to the `x = y` diagonal.
    #[error("joint {joint} has x - y = {spacing}, below {min}")]
    JointSpacing {
        /// Index of the joint.
        joint: usize,
        /// Its `x - y`.
        spacing: f64,
        /// Required minimum.
        min: f64,
    },
}

/// Every rule a walker breaks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Total number of joints.
    pub joint_count: usize,
    /// Total number of muscles.
    pub muscle_count: usize,
    /// Violations, strength first (by muscle), then per joint.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Check if no rule is broken.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Walker Report:")?;
        writeln!(f, "  Joints: {}", self.joint_count)?;
        writeln!(f, "  Muscles: {}", self.muscle_count)?;
        writeln!(
            f,
            "  Valid: {}",
            if self.is_valid() { "Yes" } else { "No" }
        )?;

        if !self.is_valid() {
            writeln!(f)?;
            writeln!(f, "  Violations:")?;
            for violation in &self.violations {
                writeln!(f, "    {violation}")?;
            }
        }

        Ok(())
    }
}

impl Walker {
    /// Check the walker against the default limits.
    ///
    /// # Example
    ///
    /// ```
    /// use walker_types::WalkerBuilder;
    ///
    /// let mut builder = WalkerBuilder::new();
    /// let a = builder.add_joint(5.0, 0.0);
    /// let b = builder.add_joint(1.0, 0.0);
    /// builder.add_distance(a, b).unwrap();
    /// assert!(builder.get_walker().validate());
    ///
    /// builder.add_actuated(a, b, 11.0, 0.0).unwrap();
    /// assert!(!builder.get_walker().validate());
    /// ```
    #[must_use]
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Check the walker against custom limits.
    #[must_use]
    pub fn validate_with(&self, limits: &ValidationLimits) -> bool {
        self.check_with(limits).is_ok()
    }

    /// Like [`Walker::validate`], but reports the first broken rule.
    pub fn check(&self) -> Result<(), Violation> {
        self.check_with(&ValidationLimits::default())
    }

    /// Like [`Walker::validate_with`], but reports the first broken rule.
    ///
    /// Joints are visited in order. For each one, every muscle is scanned:
    /// its endpoints are tallied and an over-strength muscle fails at once.
    /// Then the tally is checked, then the joint's spacing. A walker with no
    /// joints is never checked further.
    pub fn check_with(&self, limits: &ValidationLimits) -> Result<(), Violation> {
        for (i, id) in self.joint_ids().enumerate() {
            let mut count = 0;
            for (m, muscle) in self.muscles.iter().enumerate() {
                count += muscle.incidence(id);

                if let Some(amplitude) = muscle.kind.amplitude() {
                    if amplitude > limits.max_muscle_strength {
                        return Err(self.reject(Violation::ExcessiveStrength {
                            muscle: m,
                            amplitude,
                            max: limits.max_muscle_strength,
                        }));
                    }
                }
            }

            if count > limits.max_muscles_per_joint {
                return Err(self.reject(Violation::TooManyMuscles {
                    joint: i,
                    count,
                    max: limits.max_muscles_per_joint,
                }));
            }

            let spacing = self.joints[i].spacing();
            if spacing < limits.min_joint_spacing {
                return Err(self.reject(Violation::JointSpacing {
                    joint: i,
                    spacing,
                    min: limits.min_joint_spacing,
                }));
            }
        }

        Ok(())
    }

    /// Collect every broken rule instead of stopping at the first.
    #[must_use]
    pub fn validation_report(&self, limits: &ValidationLimits) -> ValidationReport {
        let mut violations = Vec::new();

        let mut degree: HashMap<usize, usize> = HashMap::new();
        for (m, muscle) in self.muscles.iter().enumerate() {
            *degree.entry(muscle.j0.index).or_default() += 1;
            *degree.entry(muscle.j1.index).or_default() += 1;

            if let Some(amplitude) = muscle.kind.amplitude() {
                if amplitude > limits.max_muscle_strength {
                    violations.push(Violation::ExcessiveStrength {
                        muscle: m,
                        amplitude,
                        max: limits.max_muscle_strength,
                    });
                }
            }
        }

        for (i, joint) in self.joints.iter().enumerate() {
            let count = degree.get(&i).copied().unwrap_or(0);
            if count > limits.max_muscles_per_joint {
                violations.push(Violation::TooManyMuscles {
                    joint: i,
                    count,
                    max: limits.max_muscles_per_joint,
                });
            }

            let spacing = joint.spacing();
            if spacing < limits.min_joint_spacing {
                violations.push(Violation::JointSpacing {
                    joint: i,
                    spacing,
                    min: limits.min_joint_spacing,
                });
            }
        }

        debug!(
            joints = self.joints.len(),
            muscles = self.muscles.len(),
            violations = violations.len(),
            "validated walker"
        );

        ValidationReport {
            joint_count: self.joints.len(),
            muscle_count: self.muscles.len(),
            violations,
        }
    }

    fn reject(&self, violation: Violation) -> Violation {
        debug!(
            joints = self.joints.len(),
            muscles = self.muscles.len(),
            "walker rejected: {violation}"
        );
        violation
    }
}

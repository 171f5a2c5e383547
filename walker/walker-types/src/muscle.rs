//! Muscle types connecting pairs of joints.

use serde::{Deserialize, Serialize};

use crate::JointId;
use crate::error::WalkerError;

/// Handle to a muscle stored in a walker's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MuscleId {
    pub(crate) owner: u64,
    pub(crate) index: usize,
}

impl MuscleId {
    pub(crate) const fn new(owner: u64, index: usize) -> Self {
        Self { owner, index }
    }

    /// Position of the muscle in its walker's insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Tag of the walker that minted this handle.
    #[must_use]
    pub const fn owner(self) -> u64 {
        self.owner
    }
}

impl std::fmt::Display for MuscleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Muscle({})", self.index)
    }
}

/// Variant of a connector between two joints.
///
/// Serializes to the metadata object used by the walker record format:
/// `{"type": "distance"}` or `{"type": "muscle", "amplitude": a, "phase": p}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MuscleKind {
    /// Passive connector that holds its rest length.
    Distance,
    /// Actuated connector that oscillates.
    Muscle {
        /// Strength of the oscillation.
        amplitude: f64,
        /// Timing offset of the oscillation.
        phase: f64,
    },
}

impl MuscleKind {
    /// Create an actuated variant.
    #[must_use]
    pub const fn actuated(amplitude: f64, phase: f64) -> Self {
        Self::Muscle { amplitude, phase }
    }

    /// Build a variant from a loose argument list.
    ///
    /// An empty list is a passive `distance` connector. Three values are read
    /// as `(is_distance, amplitude, phase)`; the leading flag is ignored and
    /// the result is always actuated.
    ///
    /// # Errors
    ///
    /// Returns [`WalkerError::InvalidArgument`] for any other length.
    ///
    /// # Example
    ///
    /// ```
    /// use walker_types::MuscleKind;
    ///
    /// assert_eq!(MuscleKind::from_args(&[]).ok(), Some(MuscleKind::Distance));
    /// assert_eq!(
    ///     MuscleKind::from_args(&[1.0, 2.0, 0.5]).ok(),
    ///     Some(MuscleKind::actuated(2.0, 0.5)),
    /// );
    /// assert!(MuscleKind::from_args(&[1.0]).is_err());
    /// ```
    pub fn from_args(args: &[f64]) -> crate::Result<Self> {
        match *args {
            [] => Ok(Self::Distance),
            [_flag, amplitude, phase] => Ok(Self::Muscle { amplitude, phase }),
            _ => Err(WalkerError::InvalidArgument { count: args.len() }),
        }
    }

    /// Check if this is an actuated connector.
    #[must_use]
    pub const fn is_actuated(&self) -> bool {
        matches!(self, Self::Muscle { .. })
    }

    /// Amplitude of an actuated connector.
    #[must_use]
    pub const fn amplitude(&self) -> Option<f64> {
        match self {
            Self::Distance => None,
            Self::Muscle { amplitude, .. } => Some(*amplitude),
        }
    }

    /// Phase of an actuated connector.
    #[must_use]
    pub const fn phase(&self) -> Option<f64> {
        match self {
            Self::Distance => None,
            Self::Muscle { phase, .. } => Some(*phase),
        }
    }

    /// Name used in the `type` field of the record format.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Muscle { .. } => "muscle",
        }
    }
}

impl std::fmt::Display for MuscleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A connector between two joints of the same walker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Muscle {
    /// First endpoint.
    pub j0: JointId,
    /// Second endpoint.
    pub j1: JointId,
    /// Passive or actuated.
    pub kind: MuscleKind,
}

impl Muscle {
    /// Create a muscle between two joints.
    #[must_use]
    pub const fn new(j0: JointId, j1: JointId, kind: MuscleKind) -> Self {
        Self { j0, j1, kind }
    }

    /// Number of endpoints attached to `joint` (0, 1, or 2 for a self-loop).
    #[must_use]
    pub fn incidence(&self, joint: JointId) -> usize {
        usize::from(self.j0 == joint) + usize::from(self.j1 == joint)
    }

    /// Check if `joint` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, joint: JointId) -> bool {
        self.j0 == joint || self.j1 == joint
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        assert_eq!(MuscleKind::from_args(&[]).unwrap(), MuscleKind::Distance);

        // The flag value is never consulted.
        for flag in [0.0, 1.0, -3.0] {
            let kind = MuscleKind::from_args(&[flag, 4.0, 0.25]).unwrap();
            assert_eq!(kind, MuscleKind::actuated(4.0, 0.25));
        }
    }

    #[test]
    fn test_from_args_wrong_arity() {
        for args in [&[1.0][..], &[1.0, 2.0], &[1.0, 2.0, 3.0, 4.0]] {
            let err = MuscleKind::from_args(args).unwrap_err();
            assert!(matches!(err, WalkerError::InvalidArgument { count } if count == args.len()));
        }
    }

    #[test]
    fn test_kind_accessors() {
        let kind = MuscleKind::actuated(2.0, 0.5);
        assert!(kind.is_actuated());
        assert_eq!(kind.amplitude(), Some(2.0));
        assert_eq!(kind.phase(), Some(0.5));
        assert_eq!(kind.to_string(), "muscle");

        let kind = MuscleKind::Distance;
        assert!(!kind.is_actuated());
        assert_eq!(kind.amplitude(), None);
        assert_eq!(kind.phase(), None);
        assert_eq!(kind.to_string(), "distance");
    }

    #[test]
    fn test_kind_json_shape() {
        let json = serde_json::to_value(MuscleKind::Distance).unwrap();
        assert_eq!(json, serde_json::json!({"type": "distance"}));

        let json = serde_json::to_value(MuscleKind::actuated(2.0, 0.5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "muscle", "amplitude": 2.0, "phase": 0.5})
        );
    }

    #[test]
    fn test_incidence() {
        let a = JointId::new(1, 0);
        let b = JointId::new(1, 1);
        let c = JointId::new(1, 2);

        let m = Muscle::new(a, b, MuscleKind::Distance);
        assert_eq!(m.incidence(a), 1);
        assert_eq!(m.incidence(c), 0);
        assert!(m.touches(b));
        assert!(!m.touches(c));

        let self_loop = Muscle::new(a, a, MuscleKind::Distance);
        assert_eq!(self_loop.incidence(a), 2);
    }

    #[test]
    fn test_muscle_id_display() {
        assert_eq!(MuscleId::new(4, 9).to_string(), "Muscle(9)");
    }
}

//! Joint types for walker bodies.
//!
//! A joint is a point mass in the plane. Joints are named by the handle
//! returned when they are added, never by their coordinates: two joints at the
//! same position are still distinct.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Handle to a joint stored in a walker's arena.
///
/// Carries the arena index plus a tag identifying the walker that minted it,
/// so a handle is never resolved against some other walker's joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointId {
    pub(crate) owner: u64,
    pub(crate) index: usize,
}

impl JointId {
    pub(crate) const fn new(owner: u64, index: usize) -> Self {
        Self { owner, index }
    }

    /// Position of the joint in its walker's insertion order.
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

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Joint({})", self.index)
    }
}

/// A point mass anchoring zero or more muscles.
///
/// # Example
///
/// ```
/// use walker_types::Joint;
///
/// let joint = Joint::new(2.0, 0.5);
/// assert_eq!(joint.x(), 2.0);
/// assert_eq!(joint.y(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Position in the simulation plane.
    pub position: Point2<f64>,
}

impl Joint {
    /// Create a joint at `(x, y)`.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point2::new(x, y),
        }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// `x - y`, the quantity bounded below by the joint spacing rule.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.position.x - self.position.y
    }

    /// Coordinates as an `[x, y]` pair.
    #[must_use]
    pub fn to_array(&self) -> [f64; 2] {
        [self.position.x, self.position.y]
    }

    /// Check if both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }
}

impl From<[f64; 2]> for Joint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_joint_id() {
        let id = JointId::new(7, 3);
        assert_eq!(id.index(), 3);
        assert_eq!(id.owner(), 7);
        assert_eq!(id.to_string(), "Joint(3)");
    }

    #[test]
    fn test_joint_ids_from_different_owners_differ() {
        assert_ne!(JointId::new(1, 0), JointId::new(2, 0));
    }

    #[test]
    fn test_joint_coordinates() {
        let joint = Joint::new(1.5, -2.0);
        assert_eq!(joint.x(), 1.5);
        assert_eq!(joint.y(), -2.0);
        assert_eq!(joint.to_array(), [1.5, -2.0]);
        assert_relative_eq!(joint.spacing(), 3.5, epsilon = 1e-12);
    }

    #[test]
    fn test_joint_from_array() {
        let joint = Joint::from([4.0, 1.0]);
        assert_eq!(joint, Joint::new(4.0, 1.0));
    }

    #[test]
    fn test_joint_finite() {
        assert!(Joint::new(0.0, 0.0).is_finite());
        assert!(!Joint::new(f64::NAN, 0.0).is_finite());
        assert!(!Joint::new(0.0, f64::INFINITY).is_finite());
    }
}

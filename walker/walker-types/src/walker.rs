//! The walker aggregate and its builder.
//!
//! Joints and muscles live in arenas owned by the walker. Handles returned by
//! the builder carry the arena index and the walker's owner tag, so muscles
//! store handles instead of references and a handle from another walker is
//! rejected instead of silently resolving to the wrong joint.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use tracing::debug;

use crate::error::WalkerError;
use crate::serialize::{MuscleRecord, WalkerRecord};
use crate::{Joint, JointId, Muscle, MuscleId, MuscleKind};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

fn next_owner() -> u64 {
    NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}

/// A walker creature: ordered joints plus ordered muscles.
///
/// Joint order is significant. Serialized muscle endpoints are positions in
/// this order.
///
/// # Example
///
/// ```
/// use walker_types::WalkerBuilder;
///
/// let mut builder = WalkerBuilder::new();
/// let hip = builder.add_joint(2.0, 0.0);
/// let foot = builder.add_joint(3.0, 1.0);
/// builder.add_distance(hip, foot).unwrap();
///
/// let walker = builder.build();
/// assert_eq!(walker.joint_count(), 2);
/// assert!(walker.validate());
/// ```
#[derive(Debug, Clone)]
pub struct Walker {
    pub(crate) owner: u64,
    pub(crate) joints: Vec<Joint>,
    pub(crate) muscles: Vec<Muscle>,
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

impl Walker {
    /// Create an empty walker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owner: next_owner(),
            joints: Vec::new(),
            muscles: Vec::new(),
        }
    }

    /// Start building a walker.
    #[must_use]
    pub fn builder() -> WalkerBuilder {
        WalkerBuilder::new()
    }

    /// Joints in insertion order.
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Muscles in insertion order.
    #[must_use]
    pub fn muscles(&self) -> &[Muscle] {
        &self.muscles
    }

    /// Number of joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Number of muscles.
    #[must_use]
    pub fn muscle_count(&self) -> usize {
        self.muscles.len()
    }

    /// Check if the walker has no joints and no muscles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.muscles.is_empty()
    }

    /// Position of `joint` in this walker's joint order.
    ///
    /// Returns `None` for a handle that was never added to this walker.
    #[must_use]
    pub fn joint_index(&self, joint: JointId) -> Option<usize> {
        (joint.owner == self.owner && joint.index < self.joints.len()).then_some(joint.index)
    }

    /// Look up a joint by handle.
    #[must_use]
    pub fn joint(&self, joint: JointId) -> Option<&Joint> {
        self.joint_index(joint).map(|i| &self.joints[i])
    }

    /// Look up a muscle by handle.
    #[must_use]
    pub fn muscle(&self, muscle: MuscleId) -> Option<&Muscle> {
        if muscle.owner != self.owner {
            return None;
        }
        self.muscles.get(muscle.index)
    }

    /// Handles of all joints, in order.
    pub fn joint_ids(&self) -> impl Iterator<Item = JointId> + '_ {
        (0..self.joints.len()).map(|i| JointId::new(self.owner, i))
    }

    /// Number of muscle endpoints attached to `joint`.
    ///
    /// A muscle whose endpoints are both `joint` counts twice.
    #[must_use]
    pub fn degree(&self, joint: JointId) -> usize {
        self.muscles.iter().map(|m| m.incidence(joint)).sum()
    }

    /// Rebuild a walker from its record form.
    ///
    /// # Errors
    ///
    /// Returns [`WalkerError::JointIndexOutOfRange`] if a muscle entry names
    /// a joint the record does not contain.
    pub fn from_record(record: &WalkerRecord) -> crate::Result<Self> {
        let mut builder = WalkerBuilder::new();
        let ids: Vec<JointId> = record
            .joints
            .iter()
            .map(|&[x, y]| builder.add_joint(x, y))
            .collect();

        for (i, &MuscleRecord(i0, i1, kind)) in record.muscles.iter().enumerate() {
            let endpoint = |index: usize| {
                ids.get(index)
                    .copied()
                    .ok_or(WalkerError::JointIndexOutOfRange {
                        muscle: i,
                        index,
                        joint_count: ids.len(),
                    })
            };
            builder.add_muscle(endpoint(i0)?, endpoint(i1)?, kind)?;
        }

        debug!(
            joints = record.joints.len(),
            muscles = record.muscles.len(),
            "rebuilt walker from record"
        );
        Ok(builder.build())
    }

    /// Parse a walker from the JSON text of its record form.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let record: WalkerRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }

    fn check_joint(&self, joint: JointId) -> crate::Result<()> {
        if joint.owner == self.owner && joint.index < self.joints.len() {
            Ok(())
        } else {
            Err(WalkerError::ForeignJoint {
                index: joint.index,
                owner: joint.owner,
                expected: self.owner,
            })
        }
    }
}

impl TryFrom<WalkerRecord> for Walker {
    type Error = WalkerError;

    fn try_from(record: WalkerRecord) -> crate::Result<Self> {
        Self::from_record(&record)
    }
}

impl TryFrom<&WalkerRecord> for Walker {
    type Error = WalkerError;

    fn try_from(record: &WalkerRecord) -> crate::Result<Self> {
        Self::from_record(record)
    }
}

impl PartialEq for Walker {
    fn eq(&self, other: &Self) -> bool {
        self.serialize_walker() == other.serialize_walker()
    }
}

impl PartialEq<WalkerRecord> for Walker {
    fn eq(&self, other: &WalkerRecord) -> bool {
        self.serialize_walker() == *other
    }
}

impl PartialEq<Walker> for WalkerRecord {
    fn eq(&self, other: &Walker) -> bool {
        other == self
    }
}

impl PartialEq<serde_json::Value> for Walker {
    fn eq(&self, other: &serde_json::Value) -> bool {
        WalkerRecord::deserialize(other).is_ok_and(|record| self.serialize_walker() == record)
    }
}

impl std::fmt::Display for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(&self.serialize_walker()).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

/// Accumulates joints and muscles into a [`Walker`].
///
/// Appends only: joints and muscles are never removed or edited once added.
/// A clone is a separate builder: it mints its own handles, and handles from
/// the original are foreign to it.
#[derive(Debug, Default)]
pub struct WalkerBuilder {
    walker: Walker,
}

impl Clone for WalkerBuilder {
    fn clone(&self) -> Self {
        let owner = next_owner();
        let retag = |id: JointId| JointId::new(owner, id.index);
        let walker = Walker {
            owner,
            joints: self.walker.joints.clone(),
            muscles: self
                .walker
                .muscles
                .iter()
                .map(|m| Muscle::new(retag(m.j0), retag(m.j1), m.kind))
                .collect(),
        };
        Self { walker }
    }
}

impl WalkerBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a joint at `(x, y)` and return its handle.
    pub fn add_joint(&mut self, x: f64, y: f64) -> JointId {
        let id = JointId::new(self.walker.owner, self.walker.joints.len());
        self.walker.joints.push(Joint::new(x, y));
        id
    }

    /// Connect two joints of this builder.
    ///
    /// The endpoints need not be distinct.
    ///
    /// # Errors
    ///
    /// Returns [`WalkerError::ForeignJoint`] if either handle came from
    /// another builder.
    pub fn add_muscle(&mut self, j0: JointId, j1: JointId, kind: MuscleKind) -> crate::Result<MuscleId> {
        self.walker.check_joint(j0)?;
        self.walker.check_joint(j1)?;

        let id = MuscleId::new(self.walker.owner, self.walker.muscles.len());
        self.walker.muscles.push(Muscle::new(j0, j1, kind));
        Ok(id)
    }

    /// Connect two joints with a passive distance constraint.
    pub fn add_distance(&mut self, j0: JointId, j1: JointId) -> crate::Result<MuscleId> {
        self.add_muscle(j0, j1, MuscleKind::Distance)
    }

    /// Connect two joints with an actuated muscle.
    pub fn add_actuated(
        &mut self,
        j0: JointId,
        j1: JointId,
        amplitude: f64,
        phase: f64,
    ) -> crate::Result<MuscleId> {
        self.add_muscle(j0, j1, MuscleKind::actuated(amplitude, phase))
    }

    /// Connect two joints using a loose argument list.
    ///
    /// See [`MuscleKind::from_args`] for how `args` is read.
    pub fn add_muscle_args(&mut self, j0: JointId, j1: JointId, args: &[f64]) -> crate::Result<MuscleId> {
        let kind = MuscleKind::from_args(args)?;
        self.add_muscle(j0, j1, kind)
    }

    /// View of everything added so far.
    #[must_use]
    pub fn get_walker(&self) -> &Walker {
        &self.walker
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Walker {
        self.walker
    }
}

//! Output records consumed by the simulator and its visualizer.
//!
//! Two shapes are produced:
//!
//! - [`WalkerRecord`]: `{"joints": [[x, y], ...], "muscles": [[i0, i1, meta], ...]}`
//! - [`SodaraceRecord`]: `{"useLEO": true, "nodes": [...], "connections": [...]}`
//!
//! Field names, string node IDs and the `cppnOutputs` layout are fixed by the
//! consumer and must not change.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::{MuscleKind, Walker};

/// Output vector value marking a passive connector.
pub const PASSIVE_CPPN_SENTINEL: f64 = -10.0;

/// Walker in the `joints`/`muscles` record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerRecord {
    /// `[x, y]` per joint, in joint order.
    pub joints: Vec<[f64; 2]>,
    /// One entry per muscle, in muscle order.
    pub muscles: Vec<MuscleRecord>,
}

/// `[j0_index, j1_index, metadata]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MuscleRecord(pub usize, pub usize, pub MuscleKind);

/// Walker in the shape read by the Sodarace simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SodaraceRecord {
    /// Always `true`.
    #[serde(rename = "useLEO")]
    pub use_leo: bool,
    /// One node per joint, in joint order.
    pub nodes: Vec<SodaraceNode>,
    /// One connection per muscle, in muscle order.
    pub connections: Vec<SodaraceConnection>,
}

/// A joint position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SodaraceNode {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// A muscle, with endpoints named by stringified joint index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SodaraceConnection {
    /// Index of the first joint, as a string.
    #[serde(rename = "sourceID")]
    pub source_id: String,
    /// Index of the second joint, as a string.
    #[serde(rename = "targetID")]
    pub target_id: String,
    /// Four-value output vector.
    #[serde(rename = "cppnOutputs")]
    pub cppn_outputs: CppnOutputs,
}

/// The four-value `cppnOutputs` vector of a connection.
///
/// Passive connectors encode as `[0, 0, 0, -10.0]`; actuated ones as
/// `[0, 0, phase, amplitude]`. The leading zeros are written as integers.
/// Decoding treats exactly `[0, 0, 0, -10]` as passive, so an actuated
/// muscle with phase 0 and amplitude -10 reads back as passive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 4]")]
pub enum CppnOutputs {
    /// Distance constraint.
    Passive,
    /// Oscillating muscle.
    Actuated {
        /// Timing offset.
        phase: f64,
        /// Strength.
        amplitude: f64,
    },
}

impl CppnOutputs {
    /// The vector as plain numbers.
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        match *self {
            Self::Passive => [0.0, 0.0, 0.0, PASSIVE_CPPN_SENTINEL],
            Self::Actuated { phase, amplitude } => [0.0, 0.0, phase, amplitude],
        }
    }
}

impl From<MuscleKind> for CppnOutputs {
    fn from(kind: MuscleKind) -> Self {
        match kind {
            MuscleKind::Distance => Self::Passive,
            MuscleKind::Muscle { amplitude, phase } => Self::Actuated { phase, amplitude },
        }
    }
}

impl From<[f64; 4]> for CppnOutputs {
    #[allow(clippy::float_cmp)]
    fn from(values: [f64; 4]) -> Self {
        if values == [0.0, 0.0, 0.0, PASSIVE_CPPN_SENTINEL] {
            Self::Passive
        } else {
            Self::Actuated {
                phase: values[2],
                amplitude: values[3],
            }
        }
    }
}

impl Serialize for CppnOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&0)?;
        tuple.serialize_element(&0)?;
        match *self {
            Self::Passive => {
                tuple.serialize_element(&0)?;
                tuple.serialize_element(&PASSIVE_CPPN_SENTINEL)?;
            }
            Self::Actuated { phase, amplitude } => {
                tuple.serialize_element(&phase)?;
                tuple.serialize_element(&amplitude)?;
            }
        }
        tuple.end()
    }
}

impl Walker {
    /// Produce the `joints`/`muscles` record.
    ///
    /// # Example
    ///
    /// ```
    /// use walker_types::WalkerBuilder;
    ///
    /// let mut builder = WalkerBuilder::new();
    /// let a = builder.add_joint(0.0, 0.0);
    /// let b = builder.add_joint(1.0, 0.0);
    /// builder.add_distance(a, b).unwrap();
    ///
    /// let record = builder.get_walker().serialize_walker();
    /// assert_eq!(record.joints, vec![[0.0, 0.0], [1.0, 0.0]]);
    /// assert_eq!(record.muscles[0].1, 1);
    /// ```
    #[must_use]
    pub fn serialize_walker(&self) -> WalkerRecord {
        WalkerRecord {
            joints: self.joints.iter().map(|j| j.to_array()).collect(),
            // Muscles are only ever created with handles checked against this
            // walker, so the arena index is the joint index.
            muscles: self
                .muscles
                .iter()
                .map(|m| MuscleRecord(m.j0.index, m.j1.index, m.kind))
                .collect(),
        }
    }

    /// Produce the Sodarace simulator record.
    #[must_use]
    pub fn serialize_walker_sodarace(&self) -> SodaraceRecord {
        SodaraceRecord {
            use_leo: true,
            nodes: self
                .joints
                .iter()
                .map(|j| SodaraceNode { x: j.x(), y: j.y() })
                .collect(),
            connections: self
                .muscles
                .iter()
                .map(|m| SodaraceConnection {
                    source_id: m.j0.index.to_string(),
                    target_id: m.j1.index.to_string(),
                    cppn_outputs: m.kind.into(),
                })
                .collect(),
        }
    }

    /// JSON text of [`Walker::serialize_walker`].
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.serialize_walker())?)
    }

    /// Indented JSON text of [`Walker::serialize_walker`].
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize_walker())?)
    }

    /// JSON text of [`Walker::serialize_walker_sodarace`].
    pub fn to_sodarace_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.serialize_walker_sodarace())?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::WalkerBuilder;
    use serde_json::json;

    fn two_joint_walker() -> Walker {
        let mut builder = WalkerBuilder::new();
        let j0 = builder.add_joint(0.0, 0.0);
        let j1 = builder.add_joint(1.0, 0.0);
        builder.add_distance(j0, j1).unwrap();
        builder.add_actuated(j1, j0, 2.0, 0.5).unwrap();
        builder.build()
    }

    #[test]
    fn test_walker_record() {
        let record = two_joint_walker().serialize_walker();
        assert_eq!(record.joints, vec![[0.0, 0.0], [1.0, 0.0]]);
        assert_eq!(
            record.muscles,
            vec![
                MuscleRecord(0, 1, MuscleKind::Distance),
                MuscleRecord(1, 0, MuscleKind::actuated(2.0, 0.5)),
            ]
        );
    }

    #[test]
    fn test_walker_record_json() {
        let json = two_joint_walker().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"joints":[[0.0,0.0],[1.0,0.0]],"muscles":[[0,1,{"type":"distance"}],[1,0,{"type":"muscle","amplitude":2.0,"phase":0.5}]]}"#
        );
    }

    #[test]
    fn test_sodarace_record() {
        let record = two_joint_walker().serialize_walker_sodarace();
        assert!(record.use_leo);
        assert_eq!(
            record.nodes,
            vec![SodaraceNode { x: 0.0, y: 0.0 }, SodaraceNode { x: 1.0, y: 0.0 }]
        );
        assert_eq!(record.connections[0].source_id, "0");
        assert_eq!(record.connections[0].target_id, "1");
        assert_eq!(record.connections[0].cppn_outputs, CppnOutputs::Passive);
        assert_eq!(record.connections[1].source_id, "1");
        assert_eq!(record.connections[1].target_id, "0");
        assert_eq!(
            record.connections[1].cppn_outputs.to_array(),
            [0.0, 0.0, 0.5, 2.0]
        );
    }

    #[test]
    fn test_sodarace_json() {
        let json = two_joint_walker().to_sodarace_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"useLEO":true,"nodes":[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0}],"#,
                r#""connections":[{"sourceID":"0","targetID":"1","cppnOutputs":[0,0,0,-10.0]},"#,
                r#"{"sourceID":"1","targetID":"0","cppnOutputs":[0,0,0.5,2.0]}]}"#
            )
        );
    }

    #[test]
    fn test_sodarace_value_shape() {
        let value = serde_json::to_value(two_joint_walker().serialize_walker_sodarace()).unwrap();
        assert_eq!(value["useLEO"], json!(true));
        assert_eq!(value["connections"][0]["cppnOutputs"], json!([0, 0, 0, -10.0]));
        assert_eq!(value["connections"][1]["cppnOutputs"], json!([0, 0, 0.5, 2.0]));
    }

    #[test]
    fn test_cppn_outputs_decode() {
        let outputs: CppnOutputs = serde_json::from_str("[0, 0, 0, -10.0]").unwrap();
        assert_eq!(outputs, CppnOutputs::Passive);

        let outputs: CppnOutputs = serde_json::from_str("[0, 0, 0.25, 3.0]").unwrap();
        assert_eq!(
            outputs,
            CppnOutputs::Actuated {
                phase: 0.25,
                amplitude: 3.0
            }
        );
    }

    #[test]
    fn test_sodarace_record_parses_back() {
        let walker = two_joint_walker();
        let json = walker.to_sodarace_json().unwrap();
        let parsed: SodaraceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, walker.serialize_walker_sodarace());
    }

    #[test]
    fn test_empty_walker_records() {
        let walker = Walker::new();
        assert_eq!(walker.to_json().unwrap(), r#"{"joints":[],"muscles":[]}"#);
        assert_eq!(
            walker.to_sodarace_json().unwrap(),
            r#"{"useLEO":true,"nodes":[],"connections":[]}"#
        );
    }

    #[test]
    fn test_pretty_json_parses() {
        let walker = two_joint_walker();
        let pretty = walker.to_json_pretty().unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(Walker::from_json(&pretty).unwrap(), walker);
    }
}

//! Error types for walker construction and serialization.

use thiserror::Error;

/// Errors that can occur while building or (de)serializing a walker.
#[derive(Debug, Error)]
pub enum WalkerError {
    /// Loose muscle arguments had the wrong arity.
    #[error("invalid muscle arguments: expected 0 or 3 values, got {count}")]
    InvalidArgument {
        /// Number of values supplied.
        count: usize,
    },

    /// A joint handle was minted by a different builder.
    #[error("joint {index} belongs to walker {owner}, not walker {expected}")]
    ForeignJoint {
        /// Arena index carried by the handle.
        index: usize,
        /// Walker that minted the handle.
        owner: u64,
        /// Walker the handle was used with.
        expected: u64,
    },

    /// A muscle handle was minted by a different builder.
    #[error("muscle {index} belongs to walker {owner}, not walker {expected}")]
    ForeignMuscle {
        /// Arena index carried by the handle.
        index: usize,
        /// Walker that minted the handle.
        owner: u64,
        /// Walker the handle was used with.
        expected: u64,
    },

    /// A serialized muscle references a joint index that does not exist.
    #[error("muscle {muscle} references joint {index}, but only {joint_count} joints exist")]
    JointIndexOutOfRange {
        /// Position of the offending muscle entry.
        muscle: usize,
        /// The out-of-range joint index.
        index: usize,
        /// Number of joints in the record.
        joint_count: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WalkerError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this error was caused by a handle from another walker.
    #[must_use]
    pub fn is_foreign_handle(&self) -> bool {
        matches!(self, Self::ForeignJoint { .. } | Self::ForeignMuscle { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WalkerError::InvalidArgument { count: 2 };
        assert!(err.to_string().contains("got 2"));

        let err = WalkerError::JointIndexOutOfRange {
            muscle: 1,
            index: 7,
            joint_count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("joint 7"));
        assert!(msg.contains("3 joints"));

        let err = WalkerError::invalid_config("negative spacing");
        assert!(err.to_string().contains("negative spacing"));
    }

    #[test]
    fn test_error_predicates() {
        let err = WalkerError::ForeignJoint {
            index: 0,
            owner: 1,
            expected: 2,
        };
        assert!(err.is_foreign_handle());
        assert!(!err.is_config_error());

        let err = WalkerError::invalid_config("bad");
        assert!(err.is_config_error());
        assert!(!err.is_foreign_handle());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = WalkerError::from(json_err);
        assert!(matches!(err, WalkerError::Serialization(_)));
    }
}

//! Walker creatures for 2-D soft-body simulation.
//!
//! A walker is a set of point-mass joints connected by muscles:
//!
//! - [`Joint`] - A point in the plane
//! - [`Muscle`] - A connector between two joints, passive or actuated
//! - [`Walker`] - Ordered joints plus ordered muscles
//! - [`WalkerBuilder`] - Append-only construction, returning handles
//!
//! Walkers are validated against engine safety limits
//! ([`ValidationLimits`]) and serialized into two record shapes:
//! [`WalkerRecord`] and the Sodarace simulator's [`SodaraceRecord`].
//!
//! # Design Philosophy
//!
//! Joints live in an arena. A [`JointId`] is the arena index plus the tag of
//! the walker that minted it, and muscles store those handles directly.
//! Construction never validates; [`Walker::validate`] does.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. No physics is
//! simulated here.
//!
//! # Example
//!
//! ```
//! use walker_types::WalkerBuilder;
//!
//! let mut builder = WalkerBuilder::new();
//! let j0 = builder.add_joint(0.0, 0.0);
//! let j1 = builder.add_joint(1.0, 0.0);
//! builder.add_distance(j0, j1).unwrap();
//! builder.add_actuated(j1, j0, 2.0, 0.5).unwrap();
//!
//! let walker = builder.build();
//! let record = walker.serialize_walker_sodarace();
//! assert_eq!(record.connections[1].source_id, "1");
//!
//! // Joint 0 sits on the x = y diagonal.
//! assert!(!walker.validate());
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::missing_const_for_fn,      // nalgebra accessors are not const
)]

mod config;
mod error;
mod joint;
mod muscle;
mod serialize;
mod validate;
mod walker;

pub use config::ValidationLimits;
pub use error::WalkerError;
pub use joint::{Joint, JointId};
pub use muscle::{Muscle, MuscleId, MuscleKind};
pub use serialize::{
    CppnOutputs, MuscleRecord, PASSIVE_CPPN_SENTINEL, SodaraceConnection, SodaraceNode,
    SodaraceRecord, WalkerRecord,
};
pub use validate::{ValidationReport, Violation};
pub use walker::{Walker, WalkerBuilder};

// Re-export math types for convenience
pub use nalgebra::Point2;

/// Result type for walker operations.
pub type Result<T> = std::result::Result<T, WalkerError>;

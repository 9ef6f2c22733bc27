//! Unified error types and result handling.
//!
//! Allocation editing and aggregation never fail (see the `core` module docs);
//! these variants cover configuration, directory validation, month parsing,
//! the shared lock and the narrative collaborator.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// A month identifier or label did not parse
    #[error("Invalid month: {input}")]
    InvalidMonth {
        /// The rejected input
        input: String,
    },

    /// Role lookup failed
    #[error("Role not found: {id}")]
    RoleNotFound {
        /// Requested role id
        id: i64,
    },

    /// Team member lookup failed
    #[error("Team member not found: {id}")]
    MemberNotFound {
        /// Requested member id
        id: i64,
    },

    /// Project lookup failed
    #[error("Project not found: {id}")]
    ProjectNotFound {
        /// Requested project id
        id: i64,
    },

    /// Hourly rate was negative or not finite
    #[error("Invalid hourly rate: {rate}")]
    InvalidRate {
        /// The rejected rate
        rate: f64,
    },

    /// An entity with the same id already exists
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Entity kind ("role", "member", "project")
        kind: &'static str,
        /// The clashing id
        id: i64,
    },

    /// The shared planner lock was poisoned by a panicking holder
    #[error("Planner lock poisoned")]
    LockPoisoned,

    /// The narrative-generation collaborator failed
    #[error("Narrative service error: {message}")]
    Narrative {
        /// Description of the failure
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

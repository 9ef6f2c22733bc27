//! Role entity - A job title with a default hourly rate.

use serde::{Deserialize, Serialize};

/// A role that team members are assigned to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier for the role
    pub id: i64,
    /// Human-readable title (e.g., "Senior Engineer")
    pub title: String,
    /// Default billable rate in dollars per hour, never negative
    pub hourly_rate: f64,
}

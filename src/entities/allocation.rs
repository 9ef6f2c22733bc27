//! Allocation entity - The percentage of one member's month spent on one project.

use crate::core::calendar::Month;
use serde::{Deserialize, Serialize};

/// The natural key of an allocation: at most one record exists per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllocationKey {
    /// Project the capacity is spent on
    pub project_id: i64,
    /// Member whose capacity is allocated
    pub member_id: i64,
    /// Month of the allocation
    pub month: Month,
}

impl AllocationKey {
    /// Builds a key from its parts.
    #[must_use]
    pub const fn new(project_id: i64, member_id: i64, month: Month) -> Self {
        Self {
            project_id,
            member_id,
            month,
        }
    }
}

/// A stored allocation record.
///
/// `percentage` is never zero inside the store and is not clamped at 100;
/// values above 100 come from direct entry and feed over-allocation detection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Identity assigned by the store, stable across updates
    pub id: i64,
    /// Project reference
    pub project_id: i64,
    /// Member reference
    pub member_id: i64,
    /// Month of the allocation
    pub month: Month,
    /// Percentage of the member's capacity
    pub percentage: u32,
}

impl Allocation {
    /// The (project, member, month) key of this record.
    #[must_use]
    pub const fn key(&self) -> AllocationKey {
        AllocationKey::new(self.project_id, self.member_id, self.month)
    }
}

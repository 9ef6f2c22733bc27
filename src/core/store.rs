//! Allocation store - The canonical in-memory set of allocation records.
//!
//! Records are keyed by (project, member, month). Writing a percentage of 0
//! deletes the record; the store never holds a zero row. Record ids are
//! assigned on creation and survive updates.
//!
//! The store has no locking of its own. Callers serialize mutation, either by
//! owning it on one thread or through [`crate::core::planner::SharedPlanner`].

use crate::{
    core::calendar::Month,
    entities::{Allocation, AllocationKey},
};
use std::collections::HashMap;
use tracing::{debug, info};

/// A single mutation applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// A new record was inserted
    Created(Allocation),
    /// An existing record changed percentage
    Updated {
        /// Record after the update
        allocation: Allocation,
        /// Percentage before the update
        previous: u32,
    },
    /// A record was removed
    Deleted(Allocation),
}

impl StoreChange {
    /// Key of the record this change touched.
    #[must_use]
    pub const fn key(&self) -> AllocationKey {
        match self {
            Self::Created(a) | Self::Updated { allocation: a, .. } | Self::Deleted(a) => a.key(),
        }
    }
}

/// In-memory allocation records, unique per [`AllocationKey`].
#[derive(Debug, Default, Clone)]
pub struct AllocationStore {
    records: HashMap<AllocationKey, Allocation>,
    keys_by_id: HashMap<i64, AllocationKey>,
    /// Last id handed out; ids start at 1
    next_id: i64,
}

impl AllocationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for (project, member, month).
    #[must_use]
    pub fn get(&self, project_id: i64, member_id: i64, month: Month) -> Option<&Allocation> {
        self.records
            .get(&AllocationKey::new(project_id, member_id, month))
    }

    /// Looks up a record by its id.
    #[must_use]
    pub fn get_by_id(&self, id: i64) -> Option<&Allocation> {
        self.keys_by_id.get(&id).and_then(|k| self.records.get(k))
    }

    /// Current percentage at a key, 0 when no record exists.
    #[must_use]
    pub fn percentage(&self, project_id: i64, member_id: i64, month: Month) -> u32 {
        self.get(project_id, member_id, month)
            .map_or(0, |a| a.percentage)
    }

    /// Creates, updates or deletes the record at (project, member, month).
    ///
    /// A percentage of 0 deletes an existing record and is a no-op otherwise.
    /// Returns `None` when nothing changed, including writing the value a
    /// record already holds.
    pub fn upsert(
        &mut self,
        project_id: i64,
        member_id: i64,
        month: Month,
        percentage: u32,
    ) -> Option<StoreChange> {
        let key = AllocationKey::new(project_id, member_id, month);

        if percentage == 0 {
            let removed = self.records.remove(&key)?;
            self.keys_by_id.remove(&removed.id);
            debug!(id = removed.id, %month, project_id, member_id, "Deleted allocation");
            return Some(StoreChange::Deleted(removed));
        }

        if let Some(existing) = self.records.get_mut(&key) {
            if existing.percentage == percentage {
                return None;
            }
            let previous = existing.percentage;
            existing.percentage = percentage;
            debug!(id = existing.id, %month, previous, percentage, "Updated allocation");
            return Some(StoreChange::Updated {
                allocation: existing.clone(),
                previous,
            });
        }

        self.next_id += 1;
        let allocation = Allocation {
            id: self.next_id,
            project_id,
            member_id,
            month,
            percentage,
        };
        self.keys_by_id.insert(allocation.id, key);
        self.records.insert(key, allocation.clone());
        debug!(
            id = allocation.id,
            %month,
            project_id,
            member_id,
            percentage,
            "Created allocation"
        );
        Some(StoreChange::Created(allocation))
    }

    /// Removes a record by id. Unknown ids are a no-op.
    pub fn delete(&mut self, id: i64) -> Option<Allocation> {
        let key = self.keys_by_id.remove(&id)?;
        let removed = self.records.remove(&key);
        if let Some(a) = &removed {
            debug!(id, month = %a.month, "Deleted allocation by id");
        }
        removed
    }

    /// Records matching `predicate`, ordered by (project, member, month).
    pub fn all_for<P>(&self, predicate: P) -> Vec<&Allocation>
    where
        P: Fn(&Allocation) -> bool,
    {
        let mut matches: Vec<&Allocation> =
            self.records.values().filter(|a| predicate(*a)).collect();
        matches.sort_by_key(|a| a.key());
        matches
    }

    /// Iterates every record in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.records.values()
    }

    /// Deletes every record for (project, member) across all months.
    ///
    /// Matching keys are collected before anything is removed, so the
    /// operation applies as a whole.
    pub fn remove_member_from_project(
        &mut self,
        project_id: i64,
        member_id: i64,
    ) -> Vec<Allocation> {
        let removed =
            self.remove_where(|k| k.project_id == project_id && k.member_id == member_id);
        info!(
            project_id,
            member_id,
            removed = removed.len(),
            "Removed member from project"
        );
        removed
    }

    /// Deletes every record for a member on any project.
    pub fn remove_member(&mut self, member_id: i64) -> Vec<Allocation> {
        let removed = self.remove_where(|k| k.member_id == member_id);
        info!(member_id, removed = removed.len(), "Removed all allocations for member");
        removed
    }

    /// Deletes every record for a project.
    pub fn remove_project(&mut self, project_id: i64) -> Vec<Allocation> {
        let removed = self.remove_where(|k| k.project_id == project_id);
        info!(project_id, removed = removed.len(), "Removed all allocations for project");
        removed
    }

    fn remove_where<F>(&mut self, matches: F) -> Vec<Allocation>
    where
        F: Fn(&AllocationKey) -> bool,
    {
        let mut keys: Vec<AllocationKey> = self
            .records
            .keys()
            .filter(|k| matches(*k))
            .copied()
            .collect();
        keys.sort();

        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(allocation) = self.records.remove(&key) {
                self.keys_by_id.remove(&allocation.id);
                removed.push(allocation);
            }
        }
        removed
    }
}

//! Planner context - Directory, allocation store and edit engine in one place.
//!
//! [`Planner`] is the single-threaded unit of mutation. [`SharedPlanner`] puts
//! it behind one mutex so store writes and gesture state are always guarded
//! together when the host dispatches from several threads.

use crate::{
    config::planner::{PlannerConfig, PlannerSettings},
    core::{
        aggregate::{
            self, AllocationFilter, CostModel, MemberUtilization, MonthlyFinancials,
            OverAllocation,
        },
        calendar::{Clock, Month, next_months},
        directory::Directory,
        edit::{EditEngine, GestureEvent},
        store::{AllocationStore, StoreChange},
        summary::{SummaryPayload, build_summary},
    },
    entities::{Allocation, AllocationKey, TeamMember},
    errors::{Error, Result},
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};
use tracing::info;

/// All planner state plus the rules that govern it.
#[derive(Debug, Default)]
pub struct Planner {
    /// Roles, members and projects
    pub directory: Directory,
    /// Allocation records
    pub store: AllocationStore,
    engine: EditEngine,
    cost_model: CostModel,
    horizon_months: usize,
}

impl Planner {
    /// Creates an empty planner using `settings`.
    #[must_use]
    pub fn new(settings: &PlannerSettings) -> Self {
        Self {
            directory: Directory::new(),
            store: AllocationStore::new(),
            engine: EditEngine::new(settings.edit_rules()),
            cost_model: settings.cost_model(),
            horizon_months: settings.horizon_months,
        }
    }

    /// Builds a planner and seeds it with the roles, members, projects and
    /// allocations listed in `config`.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let mut planner = Self::new(&config.settings);
        for role in &config.roles {
            planner.directory.add_role(role.clone())?;
        }
        for member in &config.members {
            planner.directory.add_member(member.clone())?;
        }
        for project in &config.projects {
            planner.directory.add_project(project.clone())?;
        }
        for seed in &config.allocations {
            if planner.directory.project(seed.project_id).is_none() {
                return Err(Error::ProjectNotFound { id: seed.project_id });
            }
            if planner.directory.classification_of(seed.member_id).is_none() {
                return Err(Error::MemberNotFound { id: seed.member_id });
            }
            planner
                .store
                .upsert(seed.project_id, seed.member_id, seed.month, seed.percentage);
        }
        info!(
            roles = config.roles.len(),
            members = config.members.len(),
            projects = config.projects.len(),
            allocations = planner.store.len(),
            "Seeded planner from configuration"
        );
        Ok(planner)
    }

    /// Cost constants in effect.
    #[must_use]
    pub const fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// The edit engine, for inspecting gesture state.
    #[must_use]
    pub const fn engine(&self) -> &EditEngine {
        &self.engine
    }

    /// Month columns for the grid, starting at the clock's current month.
    pub fn grid_months(&self, clock: &impl Clock) -> Vec<Month> {
        next_months(clock, self.horizon_months)
    }

    /// Feeds a gesture event to the edit engine.
    pub fn handle(&mut self, event: GestureEvent) -> Vec<StoreChange> {
        self.engine.handle(&mut self.store, event)
    }

    /// Opens a cell for text entry and returns its seed text.
    pub fn open_editor(&mut self, cell: AllocationKey) -> String {
        self.engine.open_editor(&self.store, cell)
    }

    /// Commits typed text for a cell.
    pub fn commit_entry(&mut self, cell: AllocationKey, text: &str) -> Option<StoreChange> {
        self.engine.commit_entry(&mut self.store, cell, text)
    }

    /// Removes a member from a project, deleting all of the pair's allocations.
    pub fn remove_member_from_project(
        &mut self,
        project_id: i64,
        member_id: i64,
    ) -> Vec<StoreChange> {
        self.engine
            .remove_member_from_project(&mut self.store, project_id, member_id)
    }

    /// Deletes a member from the directory along with their allocations.
    pub fn remove_member(&mut self, member_id: i64) -> Result<(TeamMember, Vec<Allocation>)> {
        self.engine.global_pointer_up();
        self.directory.remove_member(&mut self.store, member_id)
    }

    /// Total cost per project.
    #[must_use]
    pub fn project_costs(&self) -> BTreeMap<i64, f64> {
        aggregate::project_costs(&self.store, &self.directory, &self.cost_model)
    }

    /// Cost, revenue and FTE per allocated month.
    #[must_use]
    pub fn monthly_financials(&self, filter: &AllocationFilter) -> Vec<MonthlyFinancials> {
        aggregate::monthly_financials(&self.store, &self.directory, &self.cost_model, filter)
    }

    /// Every over-allocated (member, month).
    #[must_use]
    pub fn over_allocations(&self) -> Vec<OverAllocation> {
        aggregate::detect_over_allocations(&self.store)
    }

    /// Utilization of every member over `months`.
    #[must_use]
    pub fn utilization(&self, months: &[Month]) -> Vec<MemberUtilization> {
        let member_ids: Vec<i64> = self.directory.members().iter().map(|m| m.id).collect();
        aggregate::utilization_report(&self.store, &member_ids, months)
    }

    /// Snapshot for the narrative collaborator.
    #[must_use]
    pub fn summary(&self) -> SummaryPayload {
        build_summary(&self.directory, &self.store)
    }
}

/// A [`Planner`] behind a single mutex, cloneable across threads.
#[derive(Debug, Clone, Default)]
pub struct SharedPlanner {
    inner: Arc<Mutex<Planner>>,
}

impl SharedPlanner {
    /// Wraps `planner`.
    #[must_use]
    pub fn new(planner: Planner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(planner)),
        }
    }

    /// Runs `f` with exclusive access to the planner.
    pub fn with<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Planner) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(f(&mut guard))
    }

    /// Runs `f` with read access to the planner. Still takes the one lock,
    /// so reads never observe a half-applied gesture.
    pub fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Planner) -> R,
    {
        let guard = self.inner.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Feeds a gesture event under the lock.
    pub fn handle(&self, event: GestureEvent) -> Result<Vec<StoreChange>> {
        self.with(|p| p.handle(event))
    }

    /// Commits typed text under the lock.
    pub fn commit_entry(&self, cell: AllocationKey, text: &str) -> Result<Option<StoreChange>> {
        self.with(|p| p.commit_entry(cell, text))
    }

    /// Takes a summary snapshot. The lock is released before returning, so a
    /// slow narrative call never holds up edits.
    pub fn summary(&self) -> Result<SummaryPayload> {
        self.read(Planner::summary)
    }
}

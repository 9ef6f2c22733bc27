//! Directory business logic - Roles, team members and projects.
//!
//! Each kind of record lives in an owned id-keyed map. Consumers resolve ids
//! through the [`RoleCatalog`] and [`MemberCatalog`] capabilities and must
//! handle a missing record rather than assume presence.

use crate::{
    core::store::AllocationStore,
    entities::{Allocation, Classification, Project, Role, TeamMember},
    errors::{Error, Result},
};
use std::collections::HashMap;
use tracing::{info, warn};

/// Resolves role ids.
pub trait RoleCatalog {
    /// The role with `id`, if it exists.
    fn resolve_role(&self, id: i64) -> Option<&Role>;
}

/// Resolves member ids.
pub trait MemberCatalog {
    /// The member with `id`, if it exists.
    fn resolve_member(&self, id: i64) -> Option<&TeamMember>;
}

/// Owned catalogs of roles, members and projects.
#[derive(Debug, Default, Clone)]
pub struct Directory {
    roles: HashMap<i64, Role>,
    members: HashMap<i64, TeamMember>,
    projects: HashMap<i64, Project>,
}

impl RoleCatalog for Directory {
    fn resolve_role(&self, id: i64) -> Option<&Role> {
        self.roles.get(&id)
    }
}

impl MemberCatalog for Directory {
    fn resolve_member(&self, id: i64) -> Option<&TeamMember> {
        self.members.get(&id)
    }
}

impl Directory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role. The rate must be finite and non-negative.
    pub fn add_role(&mut self, role: Role) -> Result<()> {
        if !role.hourly_rate.is_finite() || role.hourly_rate < 0.0 {
            return Err(Error::InvalidRate {
                rate: role.hourly_rate,
            });
        }
        if self.roles.contains_key(&role.id) {
            return Err(Error::DuplicateId {
                kind: "role",
                id: role.id,
            });
        }
        info!(id = role.id, title = %role.title, "Added role");
        self.roles.insert(role.id, role);
        Ok(())
    }

    /// Adds a member. The referenced role must exist at creation time.
    pub fn add_member(&mut self, member: TeamMember) -> Result<()> {
        if !self.roles.contains_key(&member.role_id) {
            return Err(Error::RoleNotFound { id: member.role_id });
        }
        if self.members.contains_key(&member.id) {
            return Err(Error::DuplicateId {
                kind: "member",
                id: member.id,
            });
        }
        info!(id = member.id, name = %member.name, "Added team member");
        self.members.insert(member.id, member);
        Ok(())
    }

    /// Adds a project.
    pub fn add_project(&mut self, project: Project) -> Result<()> {
        if self.projects.contains_key(&project.id) {
            return Err(Error::DuplicateId {
                kind: "project",
                id: project.id,
            });
        }
        info!(id = project.id, name = %project.name, "Added project");
        self.projects.insert(project.id, project);
        Ok(())
    }

    /// Removes a role. Members keep their now-dangling reference and cost
    /// nothing until reassigned.
    pub fn remove_role(&mut self, id: i64) -> Result<Role> {
        let role = self.roles.remove(&id).ok_or(Error::RoleNotFound { id })?;
        let orphaned = self.members.values().filter(|m| m.role_id == id).count();
        if orphaned > 0 {
            warn!(id, orphaned, "Removed role still referenced by members");
        }
        Ok(role)
    }

    /// Removes a member and all of their allocations.
    pub fn remove_member(
        &mut self,
        store: &mut AllocationStore,
        id: i64,
    ) -> Result<(TeamMember, Vec<Allocation>)> {
        let member = self.members.remove(&id).ok_or(Error::MemberNotFound { id })?;
        let removed = store.remove_member(id);
        Ok((member, removed))
    }

    /// Removes a project and all of its allocations.
    pub fn remove_project(
        &mut self,
        store: &mut AllocationStore,
        id: i64,
    ) -> Result<(Project, Vec<Allocation>)> {
        let project = self.projects.remove(&id).ok_or(Error::ProjectNotFound { id })?;
        let removed = store.remove_project(id);
        Ok((project, removed))
    }

    /// The project with `id`, if it exists.
    #[must_use]
    pub fn project(&self, id: i64) -> Option<&Project> {
        self.projects.get(&id)
    }

    /// Classification of a member, if the member exists.
    #[must_use]
    pub fn classification_of(&self, member_id: i64) -> Option<Classification> {
        self.members.get(&member_id).map(|m| m.classification)
    }

    /// All roles ordered by title.
    #[must_use]
    pub fn roles(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        roles
    }

    /// All members ordered by name.
    #[must_use]
    pub fn members(&self) -> Vec<&TeamMember> {
        let mut members: Vec<&TeamMember> = self.members.values().collect();
        members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        members
    }

    /// All projects ordered by name.
    #[must_use]
    pub fn projects(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.projects.values().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        projects
    }
}

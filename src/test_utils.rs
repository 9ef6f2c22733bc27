//! Shared test utilities for the staffing planner.
//!
//! Helpers for building months, grid cells and a small seeded directory with
//! sensible defaults.

use crate::{
    core::{calendar::Month, directory::Directory},
    entities::{AllocationKey, Classification, Project, ProjectStatus, Role, TeamMember},
    errors::Result,
};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Parses a `YYYY-MM` literal.
///
/// # Panics
/// Panics on malformed input; test literals only.
#[allow(clippy::unwrap_used)]
pub fn month(s: &str) -> Month {
    s.parse().unwrap()
}

/// Grid cell at (project, member, month).
pub fn cell(project_id: i64, member_id: i64, m: &str) -> AllocationKey {
    AllocationKey::new(project_id, member_id, month(m))
}

/// Role with the given rate.
pub fn role(id: i64, title: &str, hourly_rate: f64) -> Role {
    Role {
        id,
        title: title.to_string(),
        hourly_rate,
    }
}

/// Member with the given role and classification.
pub fn member(id: i64, name: &str, role_id: i64, classification: Classification) -> TeamMember {
    TeamMember {
        id,
        name: name.to_string(),
        role_id,
        classification,
    }
}

/// Active project with a placeholder client.
pub fn project(id: i64, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        client: "Test Client".to_string(),
        status: ProjectStatus::Active,
        color: "#888888".to_string(),
    }
}

/// A directory with two roles, three members and two projects.
///
/// # Defaults
/// * roles: 1 `Engineer` ($100/hr), 2 `Designer` ($80/hr)
/// * members: 10 `Ada` (Engineer, full-time), 11 `Grace` (Designer, contractor),
///   12 `Linus` (Engineer, consultant)
/// * projects: 1 `Apollo`, 2 `Borealis`
pub fn seeded_directory() -> Result<Directory> {
    let mut dir = Directory::new();
    dir.add_role(role(1, "Engineer", 100.0))?;
    dir.add_role(role(2, "Designer", 80.0))?;
    dir.add_member(member(10, "Ada", 1, Classification::FullTime))?;
    dir.add_member(member(11, "Grace", 2, Classification::Contractor))?;
    dir.add_member(member(12, "Linus", 1, Classification::Consultant))?;
    dir.add_project(project(1, "Apollo"))?;
    dir.add_project(project(2, "Borealis"))?;
    Ok(dir)
}

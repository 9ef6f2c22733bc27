//! Entity module - Contains the plain data records of the planner.
//! Roles, team members and projects are owned by the directory; allocations
//! are owned by the allocation store. All records are serde-friendly so a
//! persistence collaborator can serialize them however it likes.

pub mod allocation;
pub mod member;
pub mod project;
pub mod role;

pub use allocation::{Allocation, AllocationKey};
pub use member::{Classification, TeamMember};
pub use project::{Project, ProjectStatus};
pub use role::Role;

//! Core business logic - framework-agnostic planning operations.
//!
//! Editing and aggregation never return errors: unparseable input is
//! discarded, dangling references cost nothing, and gesture state is reset
//! rather than reported. Fallible operations are limited to directory
//! validation, configuration and the shared lock.

/// Aggregated cost, utilization and FTE figures
pub mod aggregate;
/// Month values, the grid's month axis and billable hours
pub mod calendar;
/// Roles, members and projects with id lookups
pub mod directory;
/// Gesture interpretation over the allocation grid
pub mod edit;
/// Planner context and its mutex-guarded wrapper
pub mod planner;
/// Canonical allocation records
pub mod store;
/// Payload construction and dispatch for narrative summaries
pub mod summary;

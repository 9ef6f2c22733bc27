//! Project entity - A client engagement people are allocated to.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a project. Informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not yet started
    #[default]
    Planning,
    /// In progress
    Active,
    /// Finished
    Completed,
}

/// A project tracked by the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project
    pub id: i64,
    /// Project name
    pub name: String,
    /// Client the project is delivered for
    pub client: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: ProjectStatus,
    /// Display color tag (e.g., "#3b82f6")
    #[serde(default)]
    pub color: String,
}

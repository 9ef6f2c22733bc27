//! Team member entity - A person whose capacity is allocated to projects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Employment classification of a team member.
///
/// Has no effect on cost; it is surfaced in reporting breakdowns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Salaried staff
    #[default]
    FullTime,
    /// Contracted individual
    Contractor,
    /// External consultant
    Consultant,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FullTime => "full-time",
            Self::Contractor => "contractor",
            Self::Consultant => "consultant",
        };
        f.write_str(label)
    }
}

/// A person tracked by the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Unique identifier for the member
    pub id: i64,
    /// Display name
    pub name: String,
    /// Role reference; may dangle if the role was removed
    pub role_id: i64,
    /// Employment classification
    #[serde(default)]
    pub classification: Classification,
}

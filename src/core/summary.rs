//! Summary export for the narrative-generation collaborator.
//!
//! Builds a plain-data snapshot of the plan (roles with rates, months,
//! project names, over-allocation findings) and renders it as one text prompt.
//! Building the payload only reads state. The narrative call happens after the
//! snapshot is taken, so its outcome can never touch the allocation store.

use crate::{
    core::{
        aggregate::{OverAllocation, detect_over_allocations},
        directory::{Directory, MemberCatalog},
        store::AllocationStore,
    },
    errors::Result,
};
use async_trait::async_trait;
use std::{collections::BTreeSet, fmt::Write as _, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Snapshot handed to the narrative collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryPayload {
    /// `"<title>: $<rate>/hr"` per role, ordered by title
    pub roles: Vec<String>,
    /// Distinct allocated months, ascending, as display labels
    pub months: Vec<String>,
    /// Project names, ordered
    pub projects: Vec<String>,
    /// One human-readable line per over-allocation finding
    pub over_allocations: Vec<String>,
}

impl SummaryPayload {
    /// Renders the payload as a single prompt.
    #[must_use]
    pub fn to_prompt(&self) -> String {
        let mut prompt = String::from(
            "Summarize this staffing plan in a few sentences, calling out risks.\n\nRoles:\n",
        );
        for role in &self.roles {
            let _ = writeln!(prompt, "- {role}");
        }
        let _ = writeln!(prompt, "\nMonths: {}", self.months.join(", "));
        let _ = writeln!(prompt, "Projects: {}", self.projects.join(", "));
        prompt.push_str("\nOver-allocations:\n");
        if self.over_allocations.is_empty() {
            prompt.push_str("- none\n");
        }
        for line in &self.over_allocations {
            let _ = writeln!(prompt, "- {line}");
        }
        prompt
    }
}

/// Formats a finding as `"<name> is allocated <total>% in <Mon YYYY>"`.
pub fn describe_over_allocation(finding: &OverAllocation, members: &impl MemberCatalog) -> String {
    let name = members
        .resolve_member(finding.member_id)
        .map_or_else(|| format!("Member #{}", finding.member_id), |m| m.name.clone());
    format!(
        "{name} is allocated {}% in {}",
        finding.total,
        finding.month.display_label()
    )
}

/// Builds the summary payload from the current plan.
#[must_use]
pub fn build_summary(directory: &Directory, store: &AllocationStore) -> SummaryPayload {
    let roles = directory
        .roles()
        .into_iter()
        .map(|r| format!("{}: ${:.2}/hr", r.title, r.hourly_rate))
        .collect();
    let months = store
        .iter()
        .map(|a| a.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|m| m.display_label())
        .collect();
    let projects = directory
        .projects()
        .into_iter()
        .map(|p| p.name.clone())
        .collect();
    let over_allocations = detect_over_allocations(store)
        .iter()
        .map(|f| describe_over_allocation(f, directory))
        .collect();

    SummaryPayload {
        roles,
        months,
        projects,
        over_allocations,
    }
}

/// External text-generation service. Opaque to the planner.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    /// Produces free text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Makes a single attempt at a narrative. Failure comes back as an
/// `"Error: ..."` string instead of an error value.
pub async fn request_narrative(
    service: &dyn NarrativeService,
    payload: &SummaryPayload,
) -> String {
    match service.generate(&payload.to_prompt()).await {
        Ok(text) => {
            info!(chars = text.len(), "Narrative generated");
            text
        }
        Err(e) => {
            warn!("Narrative generation failed: {}", e);
            format!("Error: {e}")
        }
    }
}

/// Runs [`request_narrative`] on a background task. Dropping or aborting the
/// handle abandons the request.
pub fn spawn_narrative(
    service: Arc<dyn NarrativeService>,
    payload: SummaryPayload,
) -> JoinHandle<String> {
    tokio::spawn(async move { request_narrative(service.as_ref(), &payload).await })
}

use async_trait::async_trait;
use dotenvy::dotenv;
use staffing_planner::{
    config::planner::load_default_config,
    core::{
        aggregate::{AllocationFilter, classification_breakdown, round_fte},
        calendar::SystemClock,
        planner::{Planner, SharedPlanner},
        summary::{NarrativeService, describe_over_allocation, spawn_narrative},
    },
    errors::{Error, Result},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Stand-in narrative collaborator that echoes the prompt it would send.
struct PromptPreview;

#[async_trait]
impl NarrativeService for PromptPreview {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(format!("[narrative service not configured]\n{prompt}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load configuration and seed the planner
    let config = load_default_config()
        .inspect_err(|e| error!("Critical error loading planner configuration: {}", e))?;
    let planner = Planner::from_config(&config)
        .inspect(|_| info!("Planner seeded successfully."))
        .inspect_err(|e| error!("Failed to seed planner: {}", e))?;
    let shared = SharedPlanner::new(planner);

    // 4. Report derived figures
    let payload = shared.with(|p| {
        let months = p.grid_months(&SystemClock);
        info!(
            first = ?months.first(),
            count = months.len(),
            "Grid horizon"
        );

        for (project_id, cost) in p.project_costs() {
            let name = p
                .directory
                .project(project_id)
                .map_or("<unknown project>", |pr| pr.name.as_str());
            info!(project_id, "{name}: total cost ${cost:.2}");
        }
        for row in p.monthly_financials(&AllocationFilter::default()) {
            info!(
                month = %row.month,
                "cost ${:.2}, revenue ${:.2}, {:.1} FTE",
                row.cost,
                row.revenue,
                round_fte(row.fte)
            );
            let breakdown = classification_breakdown(&p.store, &p.directory, row.month);
            for (classification, fte) in breakdown {
                info!(month = %row.month, "  {classification}: {:.1} FTE", round_fte(fte));
            }
        }
        for finding in p.over_allocations() {
            warn!("{}", describe_over_allocation(&finding, &p.directory));
        }
        p.summary()
    })?;

    // 5. Hand the summary to the narrative collaborator
    let narrative = spawn_narrative(Arc::new(PromptPreview), payload)
        .await
        .map_err(|e| Error::Narrative {
            message: e.to_string(),
        })?;
    println!("{narrative}");

    Ok(())
}

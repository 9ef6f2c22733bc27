//! Planner configuration loading from planner.toml
//!
//! The `[settings]` table carries the business constants the planner would
//! otherwise hardcode (revenue markup, click-cycle values, paint value, hours
//! per weekday, grid horizon). The remaining tables seed the directory and the
//! allocation store. Every key is optional; missing settings fall back to the
//! defaults below.

use crate::{
    core::{
        aggregate::{CostModel, DEFAULT_REVENUE_MARKUP},
        calendar::{DEFAULT_HOURS_PER_DAY, Month},
        edit::EditRules,
    },
    entities::{Project, Role, TeamMember},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "PLANNER_CONFIG";

/// Config file used when `PLANNER_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "planner.toml";

/// Tunable business constants.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerSettings {
    /// Revenue = cost x markup
    pub revenue_markup: f64,
    /// Values successive clicks visit after 0
    pub click_cycle: [u32; 2],
    /// Value painted by a drag that starts on an empty cell
    pub paint_value: u32,
    /// Billable hours per weekday
    pub hours_per_day: u32,
    /// Number of month columns in the grid
    pub horizon_months: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        let rules = EditRules::default();
        Self {
            revenue_markup: DEFAULT_REVENUE_MARKUP,
            click_cycle: rules.click_cycle,
            paint_value: rules.paint_value,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            horizon_months: 12,
        }
    }
}

impl PlannerSettings {
    /// Edit engine rules derived from these settings.
    #[must_use]
    pub const fn edit_rules(&self) -> EditRules {
        EditRules {
            click_cycle: self.click_cycle,
            paint_value: self.paint_value,
        }
    }

    /// Cost constants derived from these settings.
    #[must_use]
    pub const fn cost_model(&self) -> CostModel {
        CostModel {
            hours_per_day: self.hours_per_day,
            revenue_markup: self.revenue_markup,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.revenue_markup.is_finite() || self.revenue_markup < 0.0 {
            return Err(Error::Config {
                message: format!(
                    "revenue_markup must be non-negative, got {}",
                    self.revenue_markup
                ),
            });
        }
        if self.hours_per_day > 24 {
            return Err(Error::Config {
                message: format!("hours_per_day must be at most 24, got {}", self.hours_per_day),
            });
        }
        if self.paint_value == 0 || self.click_cycle[0] == 0 {
            return Err(Error::Config {
                message: "paint_value and the first click_cycle value must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// An allocation listed in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AllocationSeed {
    /// Project id
    pub project_id: i64,
    /// Member id
    pub member_id: i64,
    /// Month as `YYYY-MM`
    pub month: Month,
    /// Percentage of capacity
    pub percentage: u32,
}

/// Configuration structure representing the entire planner.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlannerConfig {
    /// Business constants
    #[serde(default)]
    pub settings: PlannerSettings,
    /// Roles to seed
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Members to seed
    #[serde(default)]
    pub members: Vec<TeamMember>,
    /// Projects to seed
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Allocations to seed
    #[serde(default)]
    pub allocations: Vec<AllocationSeed>,
}

/// Parses planner configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML is invalid or the settings are out of range.
pub fn parse_config(contents: &str) -> Result<PlannerConfig> {
    let config: PlannerConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse planner config: {e}"),
    })?;
    config.settings.validate()?;
    Ok(config)
}

/// Loads planner configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A setting is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PlannerConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).inspect_err(|e| {
        tracing::error!("Failed to read config file {}: {}", path_ref.display(), e);
    })?;
    parse_config(&contents)
}

/// Loads configuration from `$PLANNER_CONFIG`, or ./planner.toml when unset
pub fn load_default_config() -> Result<PlannerConfig> {
    let path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

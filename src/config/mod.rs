/// Planner settings and seed data loading from planner.toml
pub mod planner;

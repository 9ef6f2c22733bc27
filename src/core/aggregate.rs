//! Aggregation business logic.
//!
//! Derives cost, utilization and FTE figures from the allocation store. Every
//! figure is recomputed from the current records, so nothing goes stale after
//! an edit. Sums walk records in key order, which keeps floating-point totals
//! independent of insertion order.
//!
//! Dangling references (a member or role that no longer resolves) contribute
//! zero cost and are logged, never raised.

use crate::{
    core::{
        calendar::{DEFAULT_HOURS_PER_DAY, Month, business_hours_in_month},
        directory::{MemberCatalog, RoleCatalog},
        store::AllocationStore,
    },
    entities::{Allocation, Classification},
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Placeholder markup applied to cost to produce the revenue series.
pub const DEFAULT_REVENUE_MARKUP: f64 = 1.3;

/// A person's monthly ceiling, in percent.
pub const FULL_CAPACITY: u64 = 100;

/// Constants used when turning allocations into money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Billable hours per weekday
    pub hours_per_day: u32,
    /// Revenue = cost x markup
    pub revenue_markup: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            revenue_markup: DEFAULT_REVENUE_MARKUP,
        }
    }
}

/// Optional narrowing applied before aggregation. Empty matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationFilter {
    /// Only this project
    pub project_id: Option<i64>,
    /// Only this member
    pub member_id: Option<i64>,
    /// Only members with this classification
    pub classification: Option<Classification>,
}

impl AllocationFilter {
    /// Whether `allocation` passes the filter. A classification filter never
    /// matches a member that does not resolve.
    pub fn matches(&self, allocation: &Allocation, members: &impl MemberCatalog) -> bool {
        if self.project_id.is_some_and(|p| p != allocation.project_id) {
            return false;
        }
        if self.member_id.is_some_and(|m| m != allocation.member_id) {
            return false;
        }
        match self.classification {
            None => true,
            Some(c) => members
                .resolve_member(allocation.member_id)
                .is_some_and(|m| m.classification == c),
        }
    }
}

/// A person whose allocations in one month exceed full capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverAllocation {
    /// Over-allocated member
    pub member_id: i64,
    /// Month of the violation
    pub month: Month,
    /// Summed percentage across projects
    pub total: u64,
}

/// Cost, revenue and FTE for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyFinancials {
    /// Month the figures cover
    pub month: Month,
    /// Summed allocation cost
    pub cost: f64,
    /// Cost scaled by the revenue markup
    pub revenue: f64,
    /// Summed percentage / 100, unrounded
    pub fte: f64,
}

/// One member's load in one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberUtilization {
    /// Member the row describes
    pub member_id: i64,
    /// Month the row describes
    pub month: Month,
    /// Summed percentage across projects
    pub total: u64,
    /// Unallocated capacity, never negative
    pub bench: u64,
    /// Whether `total` exceeds full capacity
    pub over_allocated: bool,
}

/// Cost of a single allocation: hours x share x role rate.
///
/// Returns 0 when the member or their role does not resolve.
pub fn allocation_cost<C>(allocation: &Allocation, catalog: &C, model: &CostModel) -> f64
where
    C: RoleCatalog + MemberCatalog,
{
    let Some(member) = catalog.resolve_member(allocation.member_id) else {
        warn!(
            allocation_id = allocation.id,
            member_id = allocation.member_id,
            "Allocation references unknown member, costing as zero"
        );
        return 0.0;
    };
    let Some(role) = catalog.resolve_role(member.role_id) else {
        warn!(
            member_id = member.id,
            role_id = member.role_id,
            "Member role does not resolve, costing as zero"
        );
        return 0.0;
    };
    let hours = f64::from(business_hours_in_month(allocation.month, model.hours_per_day));
    hours * (f64::from(allocation.percentage) / 100.0) * role.hourly_rate
}

/// Total cost of every allocation on a project.
///
/// # Arguments
///
/// * `store` - Allocation records to sum over
/// * `catalog` - Resolves each allocation's member and their role rate
/// * `model` - Hours-per-day used to turn a month into billable hours
/// * `project_id` - Project whose allocations are costed
///
/// # Returns
///
/// The summed cost. Allocations whose member or role no longer resolves add
/// nothing, and a project with no allocations costs 0.
pub fn project_total_cost<C>(
    store: &AllocationStore,
    catalog: &C,
    model: &CostModel,
    project_id: i64,
) -> f64
where
    C: RoleCatalog + MemberCatalog,
{
    store
        .all_for(|a| a.project_id == project_id)
        .into_iter()
        .map(|a| allocation_cost(a, catalog, model))
        .sum()
}

/// Total cost per project, for every project with at least one allocation.
pub fn project_costs<C>(
    store: &AllocationStore,
    catalog: &C,
    model: &CostModel,
) -> BTreeMap<i64, f64>
where
    C: RoleCatalog + MemberCatalog,
{
    let mut totals = BTreeMap::new();
    for allocation in store.all_for(|_| true) {
        *totals.entry(allocation.project_id).or_insert(0.0) +=
            allocation_cost(allocation, catalog, model);
    }
    totals
}

/// Summed percentage for a member in a month across all projects. Not clamped.
#[must_use]
pub fn member_month_total(store: &AllocationStore, member_id: i64, month: Month) -> u64 {
    store
        .iter()
        .filter(|a| a.member_id == member_id && a.month == month)
        .map(|a| u64::from(a.percentage))
        .sum()
}

/// Unallocated share for a given total: `max(0, 100 - total)`.
#[must_use]
pub const fn bench_percentage(total: u64) -> u64 {
    FULL_CAPACITY.saturating_sub(total)
}

/// Distinct months with at least one allocation passing `filter`, ascending.
pub fn months_present(
    store: &AllocationStore,
    members: &impl MemberCatalog,
    filter: &AllocationFilter,
) -> Vec<Month> {
    store
        .iter()
        .filter(|a| filter.matches(a, members))
        .map(|a| a.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Full-time equivalents in `month`: summed filtered percentage / 100.
pub fn monthly_fte(
    store: &AllocationStore,
    members: &impl MemberCatalog,
    filter: &AllocationFilter,
    month: Month,
) -> f64 {
    let total: u64 = store
        .iter()
        .filter(|a| a.month == month && filter.matches(a, members))
        .map(|a| u64::from(a.percentage))
        .sum();
    // Totals stay far below 2^53
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    total / 100.0
}

/// Rounds an FTE figure to one decimal place for display.
#[must_use]
pub fn round_fte(fte: f64) -> f64 {
    (fte * 10.0).round() / 10.0
}

/// Every (member, month) pair whose total exceeds full capacity.
///
/// Scans all months present in the store, ordered by month then member.
#[must_use]
pub fn detect_over_allocations(store: &AllocationStore) -> Vec<OverAllocation> {
    let mut totals: BTreeMap<(Month, i64), u64> = BTreeMap::new();
    for allocation in store.iter() {
        *totals
            .entry((allocation.month, allocation.member_id))
            .or_insert(0) += u64::from(allocation.percentage);
    }
    totals
        .into_iter()
        .filter(|(_, total)| *total > FULL_CAPACITY)
        .map(|((month, member_id), total)| OverAllocation { member_id, month, total })
        .collect()
}

/// Cost, revenue and FTE for each month present after filtering.
///
/// # Arguments
///
/// * `store` - Allocation records to aggregate
/// * `catalog` - Resolves members (for the filter and cost) and role rates
/// * `model` - Hours-per-day and the revenue markup
/// * `filter` - Optional project and classification restriction
///
/// # Returns
///
/// One entry per month holding at least one matching allocation, ascending.
/// Months with no matching allocation are left out rather than zero-filled.
pub fn monthly_financials<C>(
    store: &AllocationStore,
    catalog: &C,
    model: &CostModel,
    filter: &AllocationFilter,
) -> Vec<MonthlyFinancials>
where
    C: RoleCatalog + MemberCatalog,
{
    months_present(store, catalog, filter)
        .into_iter()
        .map(|month| {
            let cost: f64 = store
                .all_for(|a| a.month == month && filter.matches(a, catalog))
                .into_iter()
                .map(|a| allocation_cost(a, catalog, model))
                .sum();
            MonthlyFinancials {
                month,
                cost,
                revenue: cost * model.revenue_markup,
                fte: monthly_fte(store, catalog, filter, month),
            }
        })
        .collect()
}

/// Utilization rows for every listed member over `months`, member-major.
pub fn utilization_report(
    store: &AllocationStore,
    member_ids: &[i64],
    months: &[Month],
) -> Vec<MemberUtilization> {
    member_ids
        .iter()
        .flat_map(|&member_id| {
            months.iter().map(move |&month| {
                let total = member_month_total(store, member_id, month);
                MemberUtilization {
                    member_id,
                    month,
                    total,
                    bench: bench_percentage(total),
                    over_allocated: total > FULL_CAPACITY,
                }
            })
        })
        .collect()
}

/// FTE in `month` split by member classification. Unresolvable members are
/// left out.
pub fn classification_breakdown(
    store: &AllocationStore,
    members: &impl MemberCatalog,
    month: Month,
) -> BTreeMap<Classification, f64> {
    let mut breakdown = BTreeMap::new();
    for allocation in store.all_for(|a| a.month == month) {
        if let Some(member) = members.resolve_member(allocation.member_id) {
            *breakdown.entry(member.classification).or_insert(0.0) +=
                f64::from(allocation.percentage) / 100.0;
        }
    }
    breakdown
}

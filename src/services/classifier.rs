//! Outlier classification of enriched candidates.
//!
//! A filter, not an annotator: ineligible candidates are discarded. A budget or
//! revenue of zero means the catalog does not know the figure, and such a
//! candidate never reaches either pool.

use crate::models::{net_result, ClassifiedCandidate, EnrichedCandidate, OutlierMode};

/// Figures at or below this are treated as placeholders, in USD
pub const BUDGET_FLOOR: u64 = 1_000_000;

/// Revenue must exceed `budget * PROFIT_MULTIPLIER` to count as a profit outlier
pub const PROFIT_MULTIPLIER: f64 = 1.3;

/// Revenue must stay below `budget * LOSS_MULTIPLIER` to count as a loss outlier
pub const LOSS_MULTIPLIER: f64 = 0.85;

/// Eligibility predicate for one pool
pub fn is_eligible(budget: u64, revenue: u64, mode: OutlierMode) -> bool {
    if budget <= BUDGET_FLOOR {
        return false;
    }

    let budget_f = budget as f64;
    let revenue_f = revenue as f64;

    match mode {
        OutlierMode::Profit => revenue > BUDGET_FLOOR && revenue_f > budget_f * PROFIT_MULTIPLIER,
        OutlierMode::Loss => revenue > 0 && revenue_f < budget_f * LOSS_MULTIPLIER,
    }
}

/// Keeps the candidates eligible for `mode` and attaches their outcome
pub fn classify(candidates: &[EnrichedCandidate], mode: OutlierMode) -> Vec<ClassifiedCandidate> {
    candidates
        .iter()
        .filter(|c| is_eligible(c.budget, c.revenue, mode))
        .map(|c| ClassifiedCandidate {
            profit_or_loss: net_result(c.revenue, c.budget),
            ratio: c.revenue as f64 / c.budget as f64,
            candidate: c.clone(),
        })
        .collect()
}

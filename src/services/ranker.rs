use std::cmp::Ordering;

use crate::models::ClassifiedCandidate;

/// Recency bucket first (current year leads), then larger absolute outcome.
///
/// Candidates equal on both keys compare equal so the stable sort keeps their
/// input order.
pub fn compare(a: &ClassifiedCandidate, b: &ClassifiedCandidate) -> Ordering {
    a.candidate
        .year_priority
        .cmp(&b.candidate.year_priority)
        .then_with(|| {
            b.profit_or_loss
                .unsigned_abs()
                .cmp(&a.profit_or_loss.unsigned_abs())
        })
}

/// Orders a pool and keeps at most `limit` entries
pub fn rank(mut pool: Vec<ClassifiedCandidate>, limit: usize) -> Vec<ClassifiedCandidate> {
    pool.sort_by(compare);
    pool.truncate(limit);
    pool
}

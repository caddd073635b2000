use crate::domain::model::{LoanRecord, RatingCount, SectorBalance, RATING_ORDER};
use std::collections::HashMap;

/// Total balance per sector, largest first.
pub fn balance_by_sector(records: &[LoanRecord]) -> Vec<SectorBalance> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        *totals.entry(record.sector.as_str()).or_insert(0.0) += record.balance;
    }

    let mut result: Vec<SectorBalance> = totals
        .into_iter()
        .map(|(sector, balance)| SectorBalance {
            sector: sector.to_string(),
            balance,
        })
        .collect();
    result.sort_by(|a, b| {
        b.balance
            .partial_cmp(&a.balance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    result
}

/// Facility count per credit rating in rating order; unlisted ratings go last.
pub fn count_by_rating(records: &[LoanRecord]) -> Vec<RatingCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.credit_rating.as_str()).or_insert(0) += 1;
    }

    let rank = |rating: &str| {
        RATING_ORDER
            .iter()
            .position(|r| *r == rating)
            .unwrap_or(RATING_ORDER.len())
    };

    let mut result: Vec<RatingCount> = counts
        .into_iter()
        .map(|(rating, count)| RatingCount {
            rating: rating.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| {
        rank(&a.rating)
            .cmp(&rank(&b.rating))
            .then_with(|| a.rating.cmp(&b.rating))
    });
    result
}

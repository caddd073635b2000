use crate::domain::model::{LoanRecord, PortfolioSummary, YearMonth};

/// Monthly snapshot over the month's records, before any other filter.
/// Returns `None` when the month has no facilities.
pub fn monthly_summary(month: YearMonth, records: &[LoanRecord]) -> Option<PortfolioSummary> {
    if records.is_empty() {
        return None;
    }

    let total_balance: f64 = records.iter().map(|r| r.balance).sum();
    let total_rwa = records.iter().map(|r| r.rwa).sum();
    let total_nii = records.iter().map(|r| r.net_interest_income).sum();
    let total_fees = records.iter().map(|r| r.fee_income).sum();

    Some(PortfolioSummary {
        month,
        total_balance,
        total_rwa,
        total_nii,
        total_fees,
        facility_count: records.len(),
        weighted_avg_margin: weighted_average_margin(records),
    })
}

/// Balance-weighted average margin; zero when the total balance is not positive.
pub fn weighted_average_margin(records: &[LoanRecord]) -> f64 {
    let total_balance: f64 = records.iter().map(|r| r.balance).sum();
    if total_balance <= 0.0 {
        return 0.0;
    }
    records.iter().map(|r| r.margin * r.balance).sum::<f64>() / total_balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::record;

    #[test]
    fn test_monthly_summary_totals() {
        let mut a = record("2025-03-31", "Corporate", "Energy", "AA", "Term Loan", 1_000.0, 0.02);
        a.rwa = 500.0;
        a.net_interest_income = 10.0;
        a.fee_income = 1.0;
        let mut b = record("2025-03-31", "SME", "Retail", "BBB", "RCF", 3_000.0, 0.04);
        b.rwa = 2_000.0;
        b.net_interest_income = 30.0;
        b.fee_income = 2.5;

        let month = "2025-03".parse().unwrap();
        let summary = monthly_summary(month, &[a, b]).unwrap();

        assert_eq!(summary.total_balance, 4_000.0);
        assert_eq!(summary.total_rwa, 2_500.0);
        assert_eq!(summary.total_nii, 40.0);
        assert_eq!(summary.total_fees, 3.5);
        assert_eq!(summary.facility_count, 2);
        // (0.02*1000 + 0.04*3000) / 4000
        assert!((summary.weighted_avg_margin - 0.035).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_margin_is_zero_without_positive_balance() {
        let a = record("2025-03-31", "Corporate", "Energy", "AA", "Term Loan", 0.0, 0.05);
        assert_eq!(weighted_average_margin(&[a]), 0.0);
        assert_eq!(weighted_average_margin(&[]), 0.0);
    }

    #[test]
    fn test_empty_month_has_no_summary() {
        assert!(monthly_summary("2025-03".parse().unwrap(), &[]).is_none());
    }
}

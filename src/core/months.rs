use crate::domain::model::{LoanRecord, YearMonth};
use crate::utils::error::{DashError, Result};
use std::collections::BTreeSet;

/// Distinct months in the data, most recent first.
pub fn available_months(records: &[LoanRecord]) -> Vec<YearMonth> {
    let months: BTreeSet<YearMonth> = records.iter().map(LoanRecord::month).collect();
    months.into_iter().rev().collect()
}

/// Resolve the requested month against the available ones; `None` picks the most recent.
pub fn select_month(available: &[YearMonth], requested: Option<YearMonth>) -> Result<YearMonth> {
    match requested {
        Some(month) if available.contains(&month) => Ok(month),
        Some(month) => Err(DashError::SelectionError {
            message: format!(
                "month {} not available; choose one of: {}",
                month,
                available
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
        None => available
            .first()
            .copied()
            .ok_or_else(|| DashError::SelectionError {
                message: "no months available in the loan data".to_string(),
            }),
    }
}

pub fn records_for_month(records: &[LoanRecord], month: YearMonth) -> Vec<LoanRecord> {
    records
        .iter()
        .filter(|r| month.contains(r.date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::record;

    #[test]
    fn test_available_months_sorted_descending_and_unique() {
        let records = vec![
            record("2025-01-31", "Corporate", "Energy", "AA", "Term Loan", 100.0, 0.02),
            record("2025-03-31", "Corporate", "Energy", "AA", "Term Loan", 100.0, 0.02),
            record("2025-03-15", "SME", "Retail", "BBB", "RCF", 50.0, 0.03),
            record("2024-12-31", "SME", "Retail", "BBB", "RCF", 50.0, 0.03),
        ];

        let months: Vec<String> = available_months(&records)
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2025-03", "2025-01", "2024-12"]);
    }

    #[test]
    fn test_select_month_defaults_to_most_recent() {
        let available = vec!["2025-03".parse().unwrap(), "2025-02".parse().unwrap()];
        assert_eq!(select_month(&available, None).unwrap().to_string(), "2025-03");
        assert_eq!(
            select_month(&available, Some("2025-02".parse().unwrap()))
                .unwrap()
                .to_string(),
            "2025-02"
        );
    }

    #[test]
    fn test_select_unknown_month_lists_choices() {
        let available = vec!["2025-03".parse().unwrap()];
        let err = select_month(&available, Some("2020-01".parse().unwrap())).unwrap_err();
        assert!(err.to_string().contains("2025-03"));
        assert!(select_month(&[], None).is_err());
    }

    #[test]
    fn test_records_for_month() {
        let records = vec![
            record("2025-03-01", "Corporate", "Energy", "AA", "Term Loan", 100.0, 0.02),
            record("2025-02-28", "SME", "Retail", "BBB", "RCF", 50.0, 0.03),
        ];
        let march = records_for_month(&records, "2025-03".parse().unwrap());
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].franchise, "Corporate");
    }
}

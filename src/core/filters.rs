use crate::domain::model::{LoanRecord, YearMonth, RATING_ORDER};
use crate::utils::error::{DashError, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// What the user asked for. Empty lists and `None` bounds mean "everything".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub month: Option<YearMonth>,
    pub franchises: Vec<String>,
    pub sectors: Vec<String>,
    pub ratings: Vec<String>,
    pub products: Vec<String>,
    pub min_balance: Option<i64>,
    pub max_balance: Option<i64>,
}

/// Integer balance slider derived from one month's balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSlider {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl BalanceSlider {
    pub fn from_balances(balances: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (lo, hi) = balances
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, b| match acc {
                None => Some((b, b)),
                Some((lo, hi)) => Some((lo.min(b), hi.max(b))),
            })?;

        let min = lo.floor() as i64;
        let mut max = hi.ceil() as i64;
        let step = (max.saturating_sub(min) / 100).max(1);
        // 只有單一值時仍需要一個可用的區間
        if min >= max {
            max = min.saturating_add(step);
        }
        Some(Self { min, max, step })
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// Choices offered for one month's data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub franchises: Vec<String>,
    pub sectors: Vec<String>,
    pub ratings: Vec<String>,
    pub products: Vec<String>,
    pub balance: BalanceSlider,
}

/// Effective selection after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSelection {
    pub franchises: Vec<String>,
    pub sectors: Vec<String>,
    pub ratings: Vec<String>,
    pub products: Vec<String>,
    pub balance_range: (i64, i64),
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn resolve_list(field: &str, options: &[String], requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() {
        return Ok(options.to_vec());
    }
    if let Some(unknown) = requested.iter().find(|r| !options.contains(r)) {
        return Err(DashError::SelectionError {
            message: format!(
                "unknown {} '{}'; available: {}",
                field,
                unknown,
                options.join(", ")
            ),
        });
    }
    Ok(options
        .iter()
        .filter(|o| requested.contains(o))
        .cloned()
        .collect())
}

impl FilterOptions {
    pub fn from_records(records: &[LoanRecord]) -> Option<Self> {
        let balance = BalanceSlider::from_balances(records.iter().map(|r| r.balance))?;
        let present: BTreeSet<&str> = records.iter().map(|r| r.credit_rating.as_str()).collect();

        Some(Self {
            franchises: sorted_unique(records.iter().map(|r| r.franchise.as_str())),
            sectors: sorted_unique(records.iter().map(|r| r.sector.as_str())),
            ratings: RATING_ORDER
                .iter()
                .filter(|rating| present.contains(*rating))
                .map(|rating| rating.to_string())
                .collect(),
            products: sorted_unique(records.iter().map(|r| r.product.as_str())),
            balance,
        })
    }

    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection {
            franchises: self.franchises.clone(),
            sectors: self.sectors.clone(),
            ratings: self.ratings.clone(),
            products: self.products.clone(),
            balance_range: (self.balance.min, self.balance.max),
        }
    }

    pub fn resolve(&self, request: &FilterRequest) -> Result<FilterSelection> {
        let lo = self
            .balance
            .clamp(request.min_balance.unwrap_or(self.balance.min));
        let hi = self
            .balance
            .clamp(request.max_balance.unwrap_or(self.balance.max));
        if lo > hi {
            return Err(DashError::SelectionError {
                message: format!("balance range {} - {} is empty", lo, hi),
            });
        }

        Ok(FilterSelection {
            franchises: resolve_list("franchise", &self.franchises, &request.franchises)?,
            sectors: resolve_list("sector", &self.sectors, &request.sectors)?,
            ratings: resolve_list("credit rating", &self.ratings, &request.ratings)?,
            products: resolve_list("product", &self.products, &request.products)?,
            balance_range: (lo, hi),
        })
    }
}

impl FilterSelection {
    pub fn matches(&self, record: &LoanRecord) -> bool {
        let (lo, hi) = self.balance_range;
        self.franchises.contains(&record.franchise)
            && self.sectors.contains(&record.sector)
            && self.ratings.contains(&record.credit_rating)
            && self.products.contains(&record.product)
            && record.balance >= lo as f64
            && record.balance <= hi as f64
    }

    pub fn apply(&self, records: &[LoanRecord]) -> Vec<LoanRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::record;

    fn month_records() -> Vec<LoanRecord> {
        vec![
            record("2025-03-31", "SME", "Retail", "BBB", "RCF", 1_000.4, 0.03),
            record("2025-03-31", "Corporate", "Energy", "AA", "Term Loan", 25_000.0, 0.02),
            record("2025-03-31", "Corporate", "Retail", "CCC", "Term Loan", 12_000.0, 0.05),
            record("2025-03-31", "Corporate", "Energy", "NR", "Overdraft", 8_000.0, 0.04),
        ]
    }

    #[test]
    fn test_options_are_sorted_and_ratings_follow_rating_order() {
        let options = FilterOptions::from_records(&month_records()).unwrap();
        assert_eq!(options.franchises, vec!["Corporate", "SME"]);
        assert_eq!(options.sectors, vec!["Energy", "Retail"]);
        assert_eq!(options.ratings, vec!["AA", "BBB", "CCC"]);
        assert_eq!(options.products, vec!["Overdraft", "RCF", "Term Loan"]);
    }

    #[test]
    fn test_balance_slider_bounds_and_step() {
        let options = FilterOptions::from_records(&month_records()).unwrap();
        assert_eq!(options.balance.min, 1_000);
        assert_eq!(options.balance.max, 25_000);
        assert_eq!(options.balance.step, 240);
    }

    #[test]
    fn test_balance_slider_single_value_widens() {
        let slider = BalanceSlider::from_balances([500.0]).unwrap();
        assert_eq!(slider, BalanceSlider { min: 500, max: 501, step: 1 });
        assert!(BalanceSlider::from_balances(std::iter::empty()).is_none());
    }

    #[test]
    fn test_balance_slider_extreme_balances_saturate() {
        let slider = BalanceSlider::from_balances([1e20]).unwrap();
        assert_eq!(slider.min, i64::MAX);
        assert_eq!(slider.max, i64::MAX);
        assert_eq!(slider.step, 1);

        let slider = BalanceSlider::from_balances([-1e20, 1e20]).unwrap();
        assert_eq!(slider.min, i64::MIN);
        assert_eq!(slider.max, i64::MAX);
        assert_eq!(slider.step, i64::MAX / 100);
    }

    #[test]
    fn test_default_selection_excludes_unknown_ratings() {
        let records = month_records();
        let options = FilterOptions::from_records(&records).unwrap();
        let filtered = options.default_selection().apply(&records);
        // "NR" 不在評等清單內，預設選取會排除
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.credit_rating != "NR"));
    }

    #[test]
    fn test_resolve_request_narrows_selection() {
        let records = month_records();
        let options = FilterOptions::from_records(&records).unwrap();
        let request = FilterRequest {
            franchises: vec!["Corporate".to_string()],
            min_balance: Some(10_000),
            ..Default::default()
        };

        let selection = options.resolve(&request).unwrap();
        assert_eq!(selection.balance_range, (10_000, 25_000));
        let filtered = selection.apply(&records);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.franchise == "Corporate"));
    }

    #[test]
    fn test_resolve_clamps_balance_and_rejects_unknown_values() {
        let options = FilterOptions::from_records(&month_records()).unwrap();

        let wide = FilterRequest {
            min_balance: Some(-5),
            max_balance: Some(1_000_000),
            ..Default::default()
        };
        assert_eq!(options.resolve(&wide).unwrap().balance_range, (1_000, 25_000));

        let inverted = FilterRequest {
            min_balance: Some(20_000),
            max_balance: Some(2_000),
            ..Default::default()
        };
        assert!(options.resolve(&inverted).is_err());

        let unknown = FilterRequest {
            sectors: vec!["Shipping".to_string()],
            ..Default::default()
        };
        let err = options.resolve(&unknown).unwrap_err();
        assert!(err.to_string().contains("Shipping"));
    }
}

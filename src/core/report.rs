use crate::core::breakdown::{balance_by_sector, count_by_rating};
use crate::core::filters::{FilterOptions, FilterRequest};
use crate::core::format::display_table;
use crate::core::months::{available_months, records_for_month, select_month};
use crate::core::summary::monthly_summary;
use crate::domain::model::{LoanBook, Notice, PortfolioReport};
use crate::utils::error::Result;

/// Build the Total Book view for one month of `book`.
pub fn build_report(book: &LoanBook, request: &FilterRequest) -> Result<PortfolioReport> {
    let mut report = PortfolioReport {
        columns: book.columns.clone(),
        ..Default::default()
    };

    if book.is_empty() {
        report.notices.push(Notice::DataUnavailable);
        return Ok(report);
    }

    let available = available_months(&book.records);
    let month = select_month(&available, request.month)?;
    report.available_months = available;
    report.month = Some(month);

    let monthly = records_for_month(&book.records, month);
    report.summary = monthly_summary(month, &monthly);

    let Some(options) = FilterOptions::from_records(&monthly) else {
        report.notices.push(Notice::NoMonthlyData(month));
        return Ok(report);
    };
    let selection = options.resolve(request)?;
    let filtered = selection.apply(&monthly);
    tracing::debug!(
        "{} of {} facilities in {} match the filters",
        filtered.len(),
        monthly.len(),
        month
    );

    if filtered.is_empty() {
        report.notices.push(Notice::NoVisuals);
        report.notices.push(Notice::NoFilterMatches(month));
    } else {
        report.sector_balances = balance_by_sector(&filtered);
        report.rating_counts = count_by_rating(&filtered);
    }

    report.table = Some(display_table(&filtered, &book.columns, month));
    report.options = Some(options);
    report.selection = Some(selection);
    report.filtered = filtered;
    Ok(report)
}

use crate::core::format::{balance_caption, currency, percent};
use crate::core::navigation::{home_layout, Section};
use crate::domain::model::{DisplayTable, PortfolioReport, PortfolioSummary, YearMonth};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

fn rule(out: &mut String) {
    out.push_str(&"-".repeat(60));
    out.push('\n');
}

pub fn render_home() -> String {
    let mut out = String::from("BSM\n\n");
    for row in home_layout() {
        for section in row {
            let status = if section.is_available() {
                ""
            } else {
                " (coming soon)"
            };
            let _ = writeln!(out, "  [{}]{}", section.button_label(), status);
            let _ = writeln!(out, "      {} -> {}", section.slug(), section.page_path());
        }
        out.push('\n');
    }
    out.push_str("Select a section with `bsm open <section>`.\n");
    out
}

pub fn render_overview() -> String {
    let mut out = String::from("Portfolio Management\n");
    rule(&mut out);
    out.push_str("Main Portfolio Overview\n");
    out.push_str("This is the main landing area for Portfolio Management.\n");
    out.push_str("Select a sub-section below or using the sidebar filters (when available).\n\n");
    let _ = writeln!(
        out,
        "  [View Total Book]  bsm open {} --view total-book",
        Section::PortfolioManagement.slug()
    );
    out
}

pub fn render_months(months: &[YearMonth]) -> String {
    months.iter().map(|m| format!("{}\n", m)).collect()
}

fn render_summary(out: &mut String, summary: &PortfolioSummary) {
    let metrics = [
        ("Total Balance", currency(summary.total_balance)),
        ("Facility Count", summary.facility_count.to_string()),
        ("Total RWA", currency(summary.total_rwa)),
        ("W. Avg. Margin", percent(summary.weighted_avg_margin, 2)),
        ("Total NII (Month)", currency(summary.total_nii)),
        ("Total Fees (Month)", currency(summary.total_fees)),
    ];
    for (label, value) in metrics {
        let _ = writeln!(out, "  {:<20} {}", label, value);
    }
}

fn render_bars(out: &mut String, title: &str, rows: &[(String, f64, String)]) {
    let _ = writeln!(out, "{}", title);
    let max = rows.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _, _)| l.chars().count()).max().unwrap_or(0);
    for (label, value, shown) in rows {
        let len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<width$} {:<bar$} {}",
            label,
            "█".repeat(len),
            shown,
            width = label_width,
            bar = BAR_WIDTH
        );
    }
}

pub fn render_table(table: &DisplayTable) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&table.columns));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &table.rows {
        let _ = writeln!(out, "{}", line(row));
    }
    out
}

/// Terminal rendering of the Total Book view.
pub fn render_report(report: &PortfolioReport) -> String {
    let mut out = String::from("Portfolio Management\n");
    rule(&mut out);
    out.push_str("Total Book View\n\n");

    if let Some(month) = report.month {
        let _ = writeln!(out, "Month: {}\n", month);
    }

    if let Some(summary) = &report.summary {
        out.push_str("Monthly Snapshot Summary\n");
        render_summary(&mut out, summary);
        rule(&mut out);
    }

    if let Some(selection) = &report.selection {
        let _ = writeln!(out, "{}\n", balance_caption(selection.balance_range));
    }

    if !report.sector_balances.is_empty() {
        out.push_str("Filtered Data Visuals\n");
        let sectors: Vec<(String, f64, String)> = report
            .sector_balances
            .iter()
            .map(|s| (s.sector.clone(), s.balance, currency(s.balance)))
            .collect();
        render_bars(&mut out, "Total Balance by Sector", &sectors);
        out.push('\n');

        let ratings: Vec<(String, f64, String)> = report
            .rating_counts
            .iter()
            .map(|r| (r.rating.clone(), r.count as f64, r.count.to_string()))
            .collect();
        render_bars(&mut out, "Facility Count by Credit Rating", &ratings);
        rule(&mut out);
    }

    if let Some(table) = &report.table {
        out.push_str("Filtered Data Table\n");
        let _ = writeln!(out, "{}\n", table.caption);
        out.push_str(&render_table(table));
    }

    for notice in &report.notices {
        let _ = writeln!(out, "! {}", notice);
    }

    out.push_str("\n  [Back to Portfolio Overview]  bsm open portfolio-management\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Notice;

    #[test]
    fn test_home_lists_all_sections() {
        let home = render_home();
        for section in Section::ALL {
            assert!(home.contains(&section.button_label()));
        }
        assert!(home.contains("Explore Forecasting] (coming soon)"));
    }

    #[test]
    fn test_table_alignment() {
        let table = DisplayTable {
            columns: vec!["Sector".to_string(), "Balance".to_string()],
            rows: vec![vec!["Energy".to_string(), "£1,000".to_string()]],
            caption: String::new(),
        };
        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Sector | Balance");
        assert_eq!(lines[1], "-------+--------");
        assert_eq!(lines[2], "Energy | £1,000");
    }

    #[test]
    fn test_report_shows_notices() {
        let report = PortfolioReport {
            notices: vec![Notice::DataUnavailable],
            ..Default::default()
        };
        assert!(render_report(&report)
            .contains("! Could not display Portfolio data as the data file failed to load."));
    }
}

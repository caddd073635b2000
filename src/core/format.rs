use crate::domain::model::{Cell, ColumnKind, DisplayTable, LoanColumn, LoanRecord, YearMonth};

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Round to whole units and insert thousands separators: `1234567.8` -> `1,234,568`.
pub fn thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    match rounded.strip_prefix('-') {
        Some(digits) => format!("-{}", group_thousands(digits)),
        None => group_thousands(&rounded),
    }
}

pub fn thousands_i64(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    if value < 0 {
        format!("-{}", group_thousands(&digits))
    } else {
        group_thousands(&digits)
    }
}

/// `£1,234`; the sign follows the currency symbol (`£-1,234`).
pub fn currency(value: f64) -> String {
    format!("£{}", thousands(value))
}

/// Fraction rendered as a percentage: `percent(0.0125, 2)` -> `1.25%`.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

pub fn format_cell(column: LoanColumn, cell: Cell<'_>) -> String {
    match (column.kind(), cell) {
        (_, Cell::Empty) => String::new(),
        (_, Cell::Date(date)) => date.format("%Y-%m-%d").to_string(),
        (_, Cell::Text(text)) => text.to_string(),
        (ColumnKind::Currency, Cell::Number(n)) => currency(n),
        (ColumnKind::Percent { decimals }, Cell::Number(n)) => percent(n, decimals),
        (_, Cell::Number(n)) => n.to_string(),
    }
}

/// Columns present in the source, in display order.
pub fn display_columns(present: &[LoanColumn]) -> Vec<LoanColumn> {
    LoanColumn::DISPLAY_ORDER
        .into_iter()
        .filter(|c| present.contains(c))
        .collect()
}

pub fn display_table(
    records: &[LoanRecord],
    present: &[LoanColumn],
    month: YearMonth,
) -> DisplayTable {
    let columns = display_columns(present);

    DisplayTable {
        columns: columns.iter().map(|c| c.header().to_string()).collect(),
        rows: records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|&column| format_cell(column, record.cell(column)))
                    .collect()
            })
            .collect(),
        caption: format!(
            "Displaying {} facilities matching filters for {}.",
            records.len(),
            month
        ),
    }
}

pub fn balance_caption(range: (i64, i64)) -> String {
    format!(
        "Selected Balance: £{} - £{}",
        thousands_i64(range.0),
        thousands_i64(range.1)
    )
}

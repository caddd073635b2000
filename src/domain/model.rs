use crate::core::filters::{FilterOptions, FilterSelection};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 信用評等的固定排序（由高到低）
pub const RATING_ORDER: [&str; 7] = ["AAA", "AA", "A", "BBB", "BB", "B", "CCC"];

/// Columns of the loan data file, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LoanColumn {
    Date,
    FacilityId,
    CustomerName,
    Franchise,
    Sector,
    Product,
    Balance,
    Margin,
    NetInterestIncome,
    FeeIncome,
    Raroe,
    CreditRating,
    Pd,
    Lgd,
    Ead,
    Rwa,
    InterestIncome,
    InterestCosts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Text,
    Currency,
    Percent { decimals: usize },
}

impl LoanColumn {
    pub const DISPLAY_ORDER: [LoanColumn; 18] = [
        LoanColumn::Date,
        LoanColumn::FacilityId,
        LoanColumn::CustomerName,
        LoanColumn::Franchise,
        LoanColumn::Sector,
        LoanColumn::Product,
        LoanColumn::Balance,
        LoanColumn::Margin,
        LoanColumn::NetInterestIncome,
        LoanColumn::FeeIncome,
        LoanColumn::Raroe,
        LoanColumn::CreditRating,
        LoanColumn::Pd,
        LoanColumn::Lgd,
        LoanColumn::Ead,
        LoanColumn::Rwa,
        LoanColumn::InterestIncome,
        LoanColumn::InterestCosts,
    ];

    pub fn header(self) -> &'static str {
        match self {
            LoanColumn::Date => "Date",
            LoanColumn::FacilityId => "Facility ID",
            LoanColumn::CustomerName => "Customer Name",
            LoanColumn::Franchise => "Franchise",
            LoanColumn::Sector => "Sector",
            LoanColumn::Product => "Product",
            LoanColumn::Balance => "Balance",
            LoanColumn::Margin => "Margin",
            LoanColumn::NetInterestIncome => "Net Interest Income",
            LoanColumn::FeeIncome => "Fee Income",
            LoanColumn::Raroe => "RAROE",
            LoanColumn::CreditRating => "Credit Rating",
            LoanColumn::Pd => "PD",
            LoanColumn::Lgd => "LGD",
            LoanColumn::Ead => "EAD",
            LoanColumn::Rwa => "RWA",
            LoanColumn::InterestIncome => "Interest Income",
            LoanColumn::InterestCosts => "Interest Costs",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::DISPLAY_ORDER
            .iter()
            .copied()
            .find(|column| column.header() == header.trim())
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            LoanColumn::Date
                | LoanColumn::Franchise
                | LoanColumn::Sector
                | LoanColumn::Product
                | LoanColumn::CreditRating
                | LoanColumn::Balance
                | LoanColumn::Margin
                | LoanColumn::Rwa
                | LoanColumn::NetInterestIncome
                | LoanColumn::FeeIncome
        )
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            LoanColumn::Date => ColumnKind::Date,
            LoanColumn::FacilityId
            | LoanColumn::CustomerName
            | LoanColumn::Franchise
            | LoanColumn::Sector
            | LoanColumn::Product
            | LoanColumn::CreditRating => ColumnKind::Text,
            LoanColumn::Balance
            | LoanColumn::Ead
            | LoanColumn::Rwa
            | LoanColumn::InterestIncome
            | LoanColumn::InterestCosts
            | LoanColumn::NetInterestIncome
            | LoanColumn::FeeIncome => ColumnKind::Currency,
            LoanColumn::Margin | LoanColumn::Raroe => ColumnKind::Percent { decimals: 2 },
            LoanColumn::Pd => ColumnKind::Percent { decimals: 4 },
            LoanColumn::Lgd => ColumnKind::Percent { decimals: 1 },
        }
    }

    pub fn required() -> impl Iterator<Item = LoanColumn> {
        Self::DISPLAY_ORDER.into_iter().filter(|c| c.is_required())
    }
}

impl fmt::Display for LoanColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One facility at one month-end.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoanRecord {
    #[serde(rename = "Date", deserialize_with = "deserialize_loan_date")]
    pub date: NaiveDate,
    #[serde(rename = "Facility ID", default)]
    pub facility_id: Option<String>,
    #[serde(rename = "Customer Name", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "Franchise")]
    pub franchise: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Credit Rating")]
    pub credit_rating: String,
    #[serde(rename = "Balance")]
    pub balance: f64,
    #[serde(rename = "Margin")]
    pub margin: f64,
    #[serde(rename = "RWA")]
    pub rwa: f64,
    #[serde(rename = "Net Interest Income")]
    pub net_interest_income: f64,
    #[serde(rename = "Fee Income")]
    pub fee_income: f64,
    #[serde(rename = "RAROE", default)]
    pub raroe: Option<f64>,
    #[serde(rename = "PD", default)]
    pub pd: Option<f64>,
    #[serde(rename = "LGD", default)]
    pub lgd: Option<f64>,
    #[serde(rename = "EAD", default)]
    pub ead: Option<f64>,
    #[serde(rename = "Interest Income", default)]
    pub interest_income: Option<f64>,
    #[serde(rename = "Interest Costs", default)]
    pub interest_costs: Option<f64>,
}

/// A single cell borrowed from a [`LoanRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Date(NaiveDate),
    Text(&'a str),
    Number(f64),
    Empty,
}

impl LoanRecord {
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    pub fn cell(&self, column: LoanColumn) -> Cell<'_> {
        fn text(value: &Option<String>) -> Cell<'_> {
            value.as_deref().map(Cell::Text).unwrap_or(Cell::Empty)
        }
        fn number(value: Option<f64>) -> Cell<'static> {
            value.map(Cell::Number).unwrap_or(Cell::Empty)
        }

        match column {
            LoanColumn::Date => Cell::Date(self.date),
            LoanColumn::FacilityId => text(&self.facility_id),
            LoanColumn::CustomerName => text(&self.customer_name),
            LoanColumn::Franchise => Cell::Text(&self.franchise),
            LoanColumn::Sector => Cell::Text(&self.sector),
            LoanColumn::Product => Cell::Text(&self.product),
            LoanColumn::CreditRating => Cell::Text(&self.credit_rating),
            LoanColumn::Balance => Cell::Number(self.balance),
            LoanColumn::Margin => Cell::Number(self.margin),
            LoanColumn::Rwa => Cell::Number(self.rwa),
            LoanColumn::NetInterestIncome => Cell::Number(self.net_interest_income),
            LoanColumn::FeeIncome => Cell::Number(self.fee_income),
            LoanColumn::Raroe => number(self.raroe),
            LoanColumn::Pd => number(self.pd),
            LoanColumn::Lgd => number(self.lgd),
            LoanColumn::Ead => number(self.ead),
            LoanColumn::InterestIncome => number(self.interest_income),
            LoanColumn::InterestCosts => number(self.interest_costs),
        }
    }
}

/// Loaded loan data plus the columns the source actually carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanBook {
    pub records: Vec<LoanRecord>,
    pub columns: Vec<LoanColumn>,
}

impl LoanBook {
    pub fn new(records: Vec<LoanRecord>, mut columns: Vec<LoanColumn>) -> Self {
        columns.sort();
        columns.dedup();
        Self { records, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn has_column(&self, column: LoanColumn) -> bool {
        self.columns.contains(&column)
    }
}

/// Calendar month, shown as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("expected YYYY-MM, got '{}'", s));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 解析日期欄位：接受 `YYYY-MM-DD`、`YYYY-MM-DD HH:MM:SS[.f]` 與 RFC 3339
pub fn parse_loan_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

fn deserialize_loan_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_loan_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date '{}'", raw)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub month: YearMonth,
    pub total_balance: f64,
    pub total_rwa: f64,
    pub total_nii: f64,
    pub total_fees: f64,
    pub facility_count: usize,
    pub weighted_avg_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorBalance {
    pub sector: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCount {
    pub rating: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DataUnavailable,
    NoMonthlyData(YearMonth),
    NoVisuals,
    NoFilterMatches(YearMonth),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DataUnavailable => f.write_str(
                "Could not display Portfolio data as the data file failed to load.",
            ),
            Notice::NoMonthlyData(month) => write!(
                f,
                "No data available for {} to calculate summaries.",
                month
            ),
            Notice::NoVisuals => f.write_str("No data matching current filters to display visuals."),
            Notice::NoFilterMatches(month) => write!(
                f,
                "No data matches the selected filters for {}.",
                month
            ),
        }
    }
}

impl Serialize for Notice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Formatted rows ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub caption: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioReport {
    pub month: Option<YearMonth>,
    pub available_months: Vec<YearMonth>,
    pub summary: Option<PortfolioSummary>,
    pub options: Option<FilterOptions>,
    pub selection: Option<FilterSelection>,
    #[serde(skip)]
    pub filtered: Vec<LoanRecord>,
    #[serde(skip)]
    pub columns: Vec<LoanColumn>,
    pub sector_balances: Vec<SectorBalance>,
    pub rating_counts: Vec<RatingCount>,
    #[serde(skip)]
    pub table: Option<DisplayTable>,
    pub notices: Vec<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_round_trip_and_order() {
        let march: YearMonth = "2025-03".parse().unwrap();
        assert_eq!(march.to_string(), "2025-03");
        assert!(march > "2025-02".parse().unwrap());
        assert!(march < "2026-01".parse().unwrap());
        assert!("2025-3".parse::<YearMonth>().is_err());
        assert!("2025-00".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_parse_loan_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(parse_loan_date("2025-03-31"), Some(expected));
        assert_eq!(parse_loan_date("2025-03-31 00:00:00"), Some(expected));
        assert_eq!(parse_loan_date("2025-03-31T00:00:00.000"), Some(expected));
        assert_eq!(parse_loan_date("2025-03-31T10:00:00+00:00"), Some(expected));
        assert_eq!(parse_loan_date("31/03/2025"), None);
    }

    #[test]
    fn test_column_headers_round_trip() {
        for column in LoanColumn::DISPLAY_ORDER {
            assert_eq!(LoanColumn::from_header(column.header()), Some(column));
        }
        assert_eq!(LoanColumn::required().count(), 10);
    }

    #[test]
    fn test_notice_messages() {
        let month: YearMonth = "2025-03".parse().unwrap();
        assert_eq!(
            Notice::NoFilterMatches(month).to_string(),
            "No data matches the selected filters for 2025-03."
        );
        assert_eq!(
            Notice::NoMonthlyData(month).to_string(),
            "No data available for 2025-03 to calculate summaries."
        );
    }
}

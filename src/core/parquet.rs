use crate::core::loader::check_required_columns;
use crate::domain::model::{parse_loan_date, LoanBook, LoanColumn, LoanRecord};
use crate::utils::error::{DashError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::io::Cursor;

/// 0001-01-01 到 1970-01-01 的天數
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parse a Parquet file (as written by pandas/pyarrow) into a loan book.
pub fn parse_parquet(bytes: Vec<u8>) -> Result<LoanBook> {
    let df = ParquetReader::new(Cursor::new(bytes)).finish()?;
    dataframe_to_book(&df)
}

fn missing(column: LoanColumn, row: usize) -> DashError {
    DashError::InvalidValue {
        column: column.header().to_string(),
        row: row + 1,
        value: String::new(),
        reason: "missing value".to_string(),
    }
}

fn text_values(df: &DataFrame, column: LoanColumn) -> Result<Option<Vec<Option<String>>>> {
    let Ok(col) = df.column(column.header()) else {
        return Ok(None);
    };
    let col = col.cast(&DataType::String)?;
    let ca = col.str()?;
    Ok(Some(
        (0..df.height())
            .map(|i| ca.get(i).map(str::to_string))
            .collect(),
    ))
}

fn float_values(df: &DataFrame, column: LoanColumn) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(col) = df.column(column.header()) else {
        return Ok(None);
    };
    let col = col.cast(&DataType::Float64)?;
    let ca = col.f64()?;
    Ok(Some((0..df.height()).map(|i| ca.get(i)).collect()))
}

fn date_values(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    let col = df.column(LoanColumn::Date.header())?;

    if matches!(col.dtype(), DataType::String) {
        let ca = col.str()?;
        return (0..df.height())
            .map(|i| {
                let raw = ca.get(i).ok_or_else(|| missing(LoanColumn::Date, i))?;
                parse_loan_date(raw).ok_or_else(|| DashError::InvalidValue {
                    column: LoanColumn::Date.header().to_string(),
                    row: i + 1,
                    value: raw.to_string(),
                    reason: "unrecognised date".to_string(),
                })
            })
            .collect();
    }

    // Date / Datetime: 轉成距 epoch 的天數
    let days = col.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    let ca = days.i32()?;
    (0..df.height())
        .map(|i| {
            let day = ca.get(i).ok_or_else(|| missing(LoanColumn::Date, i))?;
            NaiveDate::from_num_days_from_ce_opt(day + UNIX_EPOCH_DAYS_FROM_CE).ok_or_else(|| {
                DashError::InvalidValue {
                    column: LoanColumn::Date.header().to_string(),
                    row: i + 1,
                    value: day.to_string(),
                    reason: "date out of range".to_string(),
                }
            })
        })
        .collect()
}

fn required<T: Clone>(values: &Option<Vec<Option<T>>>, column: LoanColumn, row: usize) -> Result<T> {
    values
        .as_ref()
        .and_then(|v| v[row].clone())
        .ok_or_else(|| missing(column, row))
}

fn optional<T: Clone>(values: &Option<Vec<Option<T>>>, row: usize) -> Option<T> {
    values.as_ref().and_then(|v| v[row].clone())
}

/// Convert a DataFrame with the loan data schema into records.
pub fn dataframe_to_book(df: &DataFrame) -> Result<LoanBook> {
    let columns: Vec<LoanColumn> = df
        .get_column_names()
        .iter()
        .filter_map(|name| LoanColumn::from_header(name.as_str()))
        .collect();
    check_required_columns(&columns)?;

    let dates = date_values(df)?;
    let facility_ids = text_values(df, LoanColumn::FacilityId)?;
    let customer_names = text_values(df, LoanColumn::CustomerName)?;
    let franchises = text_values(df, LoanColumn::Franchise)?;
    let sectors = text_values(df, LoanColumn::Sector)?;
    let products = text_values(df, LoanColumn::Product)?;
    let ratings = text_values(df, LoanColumn::CreditRating)?;
    let balances = float_values(df, LoanColumn::Balance)?;
    let margins = float_values(df, LoanColumn::Margin)?;
    let rwas = float_values(df, LoanColumn::Rwa)?;
    let niis = float_values(df, LoanColumn::NetInterestIncome)?;
    let fees = float_values(df, LoanColumn::FeeIncome)?;
    let raroes = float_values(df, LoanColumn::Raroe)?;
    let pds = float_values(df, LoanColumn::Pd)?;
    let lgds = float_values(df, LoanColumn::Lgd)?;
    let eads = float_values(df, LoanColumn::Ead)?;
    let interest_incomes = float_values(df, LoanColumn::InterestIncome)?;
    let interest_costs = float_values(df, LoanColumn::InterestCosts)?;

    let mut records = Vec::with_capacity(df.height());
    for (i, date) in dates.into_iter().enumerate() {
        records.push(LoanRecord {
            date,
            facility_id: optional(&facility_ids, i),
            customer_name: optional(&customer_names, i),
            franchise: required(&franchises, LoanColumn::Franchise, i)?,
            sector: required(&sectors, LoanColumn::Sector, i)?,
            product: required(&products, LoanColumn::Product, i)?,
            credit_rating: required(&ratings, LoanColumn::CreditRating, i)?,
            balance: required(&balances, LoanColumn::Balance, i)?,
            margin: required(&margins, LoanColumn::Margin, i)?,
            rwa: required(&rwas, LoanColumn::Rwa, i)?,
            net_interest_income: required(&niis, LoanColumn::NetInterestIncome, i)?,
            fee_income: required(&fees, LoanColumn::FeeIncome, i)?,
            raroe: optional(&raroes, i),
            pd: optional(&pds, i),
            lgd: optional(&lgds, i),
            ead: optional(&eads, i),
            interest_income: optional(&interest_incomes, i),
            interest_costs: optional(&interest_costs, i),
        });
    }

    Ok(LoanBook::new(records, columns))
}

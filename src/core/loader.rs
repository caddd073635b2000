use crate::core::Storage;
use crate::domain::model::{LoanBook, LoanColumn, LoanRecord};
use crate::utils::error::{DashError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Parquet,
}

impl DataFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(DataFormat::Csv),
            "parquet" => Ok(DataFormat::Parquet),
            _ => Err(DashError::UnsupportedFormat {
                path: path.to_string(),
                extension,
            }),
        }
    }
}

pub(crate) fn check_required_columns(columns: &[LoanColumn]) -> Result<()> {
    match LoanColumn::required().find(|c| !columns.contains(c)) {
        Some(missing) => Err(DashError::MissingColumn {
            column: missing.header().to_string(),
        }),
        None => Ok(()),
    }
}

/// Load a loan book through `storage`, choosing the parser from the file extension.
pub async fn load_loan_book<S: Storage>(storage: &S, path: &str) -> Result<LoanBook> {
    let format = DataFormat::from_path(path)?;

    let bytes = storage.read_file(path).await.map_err(|e| match e {
        DashError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            DashError::DataFileNotFound {
                path: path.to_string(),
            }
        }
        other => other,
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path);

    let book = match format {
        DataFormat::Csv => parse_csv(&bytes)?,
        DataFormat::Parquet => parse_parquet_bytes(path, bytes)?,
    };

    tracing::info!(
        "Loaded {} facilities ({} columns) from {}",
        book.len(),
        book.columns.len(),
        path
    );
    Ok(book)
}

#[cfg(feature = "parquet")]
fn parse_parquet_bytes(_path: &str, bytes: Vec<u8>) -> Result<LoanBook> {
    crate::core::parquet::parse_parquet(bytes)
}

#[cfg(not(feature = "parquet"))]
fn parse_parquet_bytes(path: &str, _bytes: Vec<u8>) -> Result<LoanBook> {
    Err(DashError::UnsupportedFormat {
        path: path.to_string(),
        extension: "parquet (built without the `parquet` feature)".to_string(),
    })
}

/// Parse loan data from CSV bytes with a header row.
pub fn parse_csv(bytes: &[u8]) -> Result<LoanBook> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let columns: Vec<LoanColumn> = headers.iter().filter_map(LoanColumn::from_header).collect();
    check_required_columns(&columns)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let record: LoanRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| invalid_csv_value(e, &headers, &row, index + 1))?;
        records.push(record);
    }

    Ok(LoanBook::new(records, columns))
}

fn invalid_csv_value(
    error: csv::Error,
    headers: &csv::StringRecord,
    row: &csv::StringRecord,
    row_number: usize,
) -> DashError {
    if let csv::ErrorKind::Deserialize { err, .. } = error.kind() {
        let field = err.field().map(|f| f as usize);
        return DashError::InvalidValue {
            column: field
                .and_then(|f| headers.get(f))
                .unwrap_or("<unknown>")
                .to_string(),
            row: row_number,
            value: field.and_then(|f| row.get(f)).unwrap_or("").to_string(),
            reason: err.to_string(),
        };
    }
    DashError::CsvError(error)
}

/// Per-path memo of loaded books; a cached path never touches storage again
/// until it is invalidated.
#[derive(Debug, Default)]
pub struct LoanDataCache {
    entries: Mutex<HashMap<String, Arc<LoanBook>>>,
}

impl LoanDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<LoanBook>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(path).cloned()
    }

    pub async fn get_or_load<S: Storage>(&self, storage: &S, path: &str) -> Result<Arc<LoanBook>> {
        if let Some(book) = self.get(path) {
            tracing::debug!("Loan data cache hit for {}", path);
            return Ok(book);
        }

        let book = Arc::new(load_loan_book(storage, path).await?);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(path.to_string(), Arc::clone(&book));
        Ok(book)
    }

    pub fn invalidate(&self, path: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockStorage;

    const SAMPLE_CSV: &str = "\
Date,Facility ID,Customer Name,Franchise,Sector,Product,Balance,Margin,RWA,Net Interest Income,Fee Income,Credit Rating,PD
2025-03-31,F-0001,Acme Ltd,Corporate,Energy,Term Loan,1500000,0.021,900000,2625,500,AA,0.0012
2025-02-28 00:00:00,F-0002,Bolt plc,SME,Retail,RCF,250000.5,0.035,200000,729.2,0,BBB,
";

    #[test]
    fn test_data_format_from_extension() {
        assert_eq!(DataFormat::from_path("data/loan_data.parquet").unwrap(), DataFormat::Parquet);
        assert_eq!(DataFormat::from_path("loans.CSV").unwrap(), DataFormat::Csv);
        assert!(matches!(
            DataFormat::from_path("loans.xlsx"),
            Err(DashError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_parse_csv_records_and_columns() {
        let book = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(book.len(), 2);
        assert!(book.has_column(LoanColumn::FacilityId));
        assert!(book.has_column(LoanColumn::Pd));
        assert!(!book.has_column(LoanColumn::Lgd));

        let first = &book.records[0];
        assert_eq!(first.facility_id.as_deref(), Some("F-0001"));
        assert_eq!(first.balance, 1_500_000.0);
        assert_eq!(first.pd, Some(0.0012));

        let second = &book.records[1];
        assert_eq!(second.month().to_string(), "2025-02");
        assert_eq!(second.pd, None);
    }

    #[test]
    fn test_parse_csv_missing_required_column() {
        let csv = "Date,Franchise,Sector,Product,Balance\n2025-03-31,SME,Retail,RCF,1\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DashError::MissingColumn { ref column } if column == "Margin"));
    }

    #[test]
    fn test_parse_csv_invalid_value_reports_row_and_column() {
        let csv = "\
Date,Franchise,Sector,Product,Balance,Margin,RWA,Net Interest Income,Fee Income,Credit Rating
2025-03-31,SME,Retail,RCF,lots,0.02,1,1,1,A
";
        match parse_csv(csv.as_bytes()).unwrap_err() {
            DashError::InvalidValue { column, row, value, .. } => {
                assert_eq!(column, "Balance");
                assert_eq!(row, 1);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_maps_to_data_file_not_found() {
        let storage = MockStorage::new();
        let err = load_loan_book(&storage, "./data/loan_data.csv").await.unwrap_err();
        assert!(matches!(err, DashError::DataFileNotFound { ref path } if path == "./data/loan_data.csv"));
    }

    #[tokio::test]
    async fn test_cache_reads_storage_once() {
        let storage = MockStorage::new();
        storage.insert("loans.csv", SAMPLE_CSV.as_bytes()).await;
        let cache = LoanDataCache::new();

        let first = cache.get_or_load(&storage, "loans.csv").await.unwrap();
        let second = cache.get_or_load(&storage, "loans.csv").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(storage.read_count().await, 1);

        assert!(cache.invalidate("loans.csv"));
        cache.get_or_load(&storage, "loans.csv").await.unwrap();
        assert_eq!(storage.read_count().await, 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let storage = MockStorage::new();
        let cache = LoanDataCache::new();

        let err = cache.get_or_load(&storage, "loans.csv").await.unwrap_err();
        assert!(matches!(err, DashError::DataFileNotFound { .. }));
        assert!(cache.is_empty());
        assert_eq!(storage.read_count().await, 1);

        storage.insert("loans.csv", SAMPLE_CSV.as_bytes()).await;
        let book = cache.get_or_load(&storage, "loans.csv").await.unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(storage.read_count().await, 2);
    }
}

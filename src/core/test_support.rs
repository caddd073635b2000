use crate::core::Storage;
use crate::domain::model::{parse_loan_date, LoanRecord};
use crate::utils::error::{DashError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub(crate) fn record(
    date: &str,
    franchise: &str,
    sector: &str,
    rating: &str,
    product: &str,
    balance: f64,
    margin: f64,
) -> LoanRecord {
    LoanRecord {
        date: parse_loan_date(date).expect("test date"),
        facility_id: None,
        customer_name: None,
        franchise: franchise.to_string(),
        sector: sector.to_string(),
        product: product.to_string(),
        credit_rating: rating.to_string(),
        balance,
        margin,
        rwa: 0.0,
        net_interest_income: 0.0,
        fee_income: 0.0,
        raroe: None,
        pd: None,
        lgd: None,
        ead: None,
        interest_income: None,
        interest_costs: None,
    }
}

/// In-memory storage that counts reads and keeps every write.
#[derive(Clone, Default)]
pub(crate) struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    reads: Arc<Mutex<usize>>,
}

impl MockStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, path: &str, data: &[u8]) {
        self.files.lock().await.insert(path.to_string(), data.to_vec());
    }

    pub(crate) async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }

    pub(crate) async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub(crate) async fn read_count(&self) -> usize {
        *self.reads.lock().await
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        *self.reads.lock().await += 1;
        let files = self.files.lock().await;
        files.get(path).cloned().ok_or_else(|| {
            DashError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

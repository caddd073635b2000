use crate::core::filters::FilterRequest;
use crate::domain::model::{LoanBook, PortfolioReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn compress_output(&self) -> bool;
    fn filter_request(&self) -> &FilterRequest;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Arc<LoanBook>>;
    async fn transform(&self, book: &LoanBook) -> Result<PortfolioReport>;
    async fn load(&self, report: &PortfolioReport) -> Result<Option<String>>;
}

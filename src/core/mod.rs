pub mod breakdown;
pub mod engine;
pub mod export;
pub mod filters;
pub mod format;
pub mod ignore_policy;
pub mod loader;
pub mod months;
pub mod navigation;
#[cfg(feature = "parquet")]
pub mod parquet;
pub mod render;
pub mod report;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{LoanBook, LoanRecord, PortfolioReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

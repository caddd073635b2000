use crate::core::export::{render_files, zip_files};
use crate::core::loader::LoanDataCache;
use crate::core::report::build_report;
use crate::core::{ConfigProvider, LoanBook, Pipeline, PortfolioReport, Storage};
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Portfolio Management "Total Book" pipeline: load the loan book, build the
/// monthly report, write the requested exports.
pub struct PortfolioPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) cache: Arc<LoanDataCache>,
}

impl<S: Storage, C: ConfigProvider> PortfolioPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_cache(storage, config, Arc::new(LoanDataCache::new()))
    }

    pub fn with_cache(storage: S, config: C, cache: Arc<LoanDataCache>) -> Self {
        Self {
            storage,
            config,
            cache,
        }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PortfolioPipeline<S, C> {
    async fn extract(&self) -> Result<Arc<LoanBook>> {
        tracing::debug!("Loading loan data from: {}", self.config.data_path());
        self.cache
            .get_or_load(&self.storage, self.config.data_path())
            .await
    }

    async fn transform(&self, book: &LoanBook) -> Result<PortfolioReport> {
        build_report(book, self.config.filter_request())
    }

    async fn load(&self, report: &PortfolioReport) -> Result<Option<String>> {
        let formats = self.config.output_formats();
        if formats.is_empty() {
            tracing::debug!("No output formats configured, skipping export");
            return Ok(None);
        }

        let files = render_files(report, formats)?;

        if self.config.compress_output() {
            let month = report
                .month
                .map(|m| m.to_string())
                .unwrap_or_else(|| "empty".to_string());
            let zip_path = self.output_file(&format!("portfolio_{}.zip", month));

            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = zip_files(&files)?;
            tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), zip_path);
            self.storage.write_file(&zip_path, &zip_data).await?;
            return Ok(Some(zip_path));
        }

        for (name, data) in &files {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, data).await?;
        }
        Ok(Some(self.config.output_path().to_string()))
    }
}

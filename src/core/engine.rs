use crate::core::Pipeline;
use crate::domain::model::PortfolioReport;
use crate::utils::error::Result;
use std::time::Instant;

#[derive(Debug)]
pub struct RunOutcome {
    pub report: PortfolioReport,
    pub output: Option<String>,
}

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let started = Instant::now();
        tracing::info!("Starting portfolio report");

        // Extract
        let book = self.pipeline.extract().await?;
        tracing::info!("Extracted {} facilities", book.len());

        // Transform
        let report = self.pipeline.transform(&book).await?;
        tracing::info!(
            "Transformed report for {} ({} facilities after filters)",
            report
                .month
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
            report.filtered.len()
        );
        for notice in &report.notices {
            tracing::warn!("{}", notice);
        }

        // Load
        let output = self.pipeline.load(&report).await?;
        if let Some(path) = &output {
            tracing::info!("Report saved to: {}", path);
        }

        tracing::info!("Report finished in {:?}", started.elapsed());
        Ok(RunOutcome { report, output })
    }
}

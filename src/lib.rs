pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::PortfolioPipeline;
pub use config::{cli::LocalStorage, DashboardConfig, ReportOverrides, ReportSettings};
pub use core::{engine::ReportEngine, ignore_policy::IgnorePolicy};
pub use utils::error::{DashError, Result};

use crate::config::toml_config::DashboardConfig;
use crate::core::export::SUPPORTED_FORMATS;
use crate::core::filters::FilterRequest;
use crate::core::ConfigProvider;
use crate::domain::model::YearMonth;
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_values, validate_one_of, validate_ordered_bounds,
    validate_path, Validate,
};

pub const DEFAULT_DATA_PATH: &str = "./data/loan_data.parquet";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Values given on the command line. Unset fields fall back to the TOML file,
/// then to the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct ReportOverrides {
    pub data: Option<String>,
    pub month: Option<String>,
    pub franchises: Vec<String>,
    pub sectors: Vec<String>,
    pub ratings: Vec<String>,
    pub products: Vec<String>,
    pub min_balance: Option<i64>,
    pub max_balance: Option<i64>,
    pub output: Option<String>,
    pub formats: Vec<String>,
    pub zip: bool,
}

/// Fully resolved settings for one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub data_path: String,
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compress: bool,
    pub request: FilterRequest,
}

fn pick_list(cli: &[String], file: Option<&Vec<String>>) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    file.cloned().unwrap_or_default()
}

impl ReportSettings {
    pub fn resolve(overrides: &ReportOverrides, file: Option<&DashboardConfig>) -> Result<Self> {
        let filters = file.and_then(|f| f.filters.as_ref());

        let data_path = overrides
            .data
            .clone()
            .or_else(|| file.and_then(|f| f.data_path()).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

        let output_path = overrides
            .output
            .clone()
            .or_else(|| file.and_then(|f| f.output_path()).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        let output_formats = if overrides.formats.is_empty() {
            file.and_then(|f| f.output_formats())
                .map(|formats| formats.to_vec())
                .unwrap_or_default()
        } else {
            overrides.formats.clone()
        };

        let month = match overrides
            .month
            .as_deref()
            .or_else(|| filters.and_then(|f| f.month.as_deref()))
        {
            Some(raw) => Some(raw.parse::<YearMonth>().map_err(|reason| {
                DashError::InvalidConfigValueError {
                    field: "month".to_string(),
                    value: raw.to_string(),
                    reason,
                }
            })?),
            None => None,
        };

        let request = FilterRequest {
            month,
            franchises: pick_list(&overrides.franchises, filters.and_then(|f| f.franchises.as_ref())),
            sectors: pick_list(&overrides.sectors, filters.and_then(|f| f.sectors.as_ref())),
            ratings: pick_list(&overrides.ratings, filters.and_then(|f| f.ratings.as_ref())),
            products: pick_list(&overrides.products, filters.and_then(|f| f.products.as_ref())),
            min_balance: overrides
                .min_balance
                .or_else(|| filters.and_then(|f| f.min_balance)),
            max_balance: overrides
                .max_balance
                .or_else(|| filters.and_then(|f| f.max_balance)),
        };

        Ok(Self {
            data_path,
            output_path,
            output_formats,
            compress: overrides.zip || file.map(|f| f.compress()).unwrap_or(false),
            request,
        })
    }
}

impl Validate for ReportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("data_path", &self.data_path)?;
        validate_file_extension("data_path", &self.data_path, &["csv", "parquet"])?;
        validate_path("output_path", &self.output_path)?;
        validate_one_of("output_formats", &self.output_formats, &SUPPORTED_FORMATS)?;
        validate_non_empty_values("franchise", &self.request.franchises)?;
        validate_non_empty_values("sector", &self.request.sectors)?;
        validate_non_empty_values("rating", &self.request.ratings)?;
        validate_non_empty_values("product", &self.request.products)?;
        validate_ordered_bounds(
            "balance",
            self.request.min_balance,
            self.request.max_balance,
        )?;
        Ok(())
    }
}

impl ConfigProvider for ReportSettings {
    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn compress_output(&self) -> bool {
        self.compress
    }

    fn filter_request(&self) -> &FilterRequest {
        &self.request
    }
}

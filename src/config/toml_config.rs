use crate::core::export::SUPPORTED_FORMATS;
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_month, validate_non_empty_values, validate_one_of,
    validate_ordered_bounds, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub data: Option<DataConfig>,
    pub filters: Option<FiltersConfig>,
    pub report: Option<ReportConfig>,
    pub ignore: Option<IgnoreConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub month: Option<String>,
    pub franchises: Option<Vec<String>>,
    pub sectors: Option<Vec<String>>,
    pub ratings: Option<Vec<String>>,
    pub products: Option<Vec<String>>,
    pub min_balance: Option<i64>,
    pub max_balance: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
    pub compress: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreConfig {
    pub policy_file: Option<String>,
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(data) = &self.data {
            validate_path("data.path", &data.path)?;
            validate_file_extension("data.path", &data.path, &["csv", "parquet"])?;
        }

        if let Some(filters) = &self.filters {
            if let Some(month) = &filters.month {
                validate_month("filters.month", month)?;
            }
            validate_ordered_bounds("filters.balance", filters.min_balance, filters.max_balance)?;
            for (field, values) in [
                ("filters.franchises", &filters.franchises),
                ("filters.sectors", &filters.sectors),
                ("filters.ratings", &filters.ratings),
                ("filters.products", &filters.products),
            ] {
                if let Some(values) = values {
                    validate_non_empty_values(field, values)?;
                }
            }
        }

        if let Some(report) = &self.report {
            if let Some(output_path) = &report.output_path {
                validate_path("report.output_path", output_path)?;
            }
            if let Some(formats) = &report.output_formats {
                validate_one_of("report.output_formats", formats, &SUPPORTED_FORMATS)?;
            }
        }

        if let Some(policy_file) = self.ignore.as_ref().and_then(|i| i.policy_file.as_ref()) {
            validate_path("ignore.policy_file", policy_file)?;
        }

        Ok(())
    }

    pub fn data_path(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.path.as_str())
    }

    pub fn output_path(&self) -> Option<&str> {
        self.report.as_ref().and_then(|r| r.output_path.as_deref())
    }

    pub fn output_formats(&self) -> Option<&[String]> {
        self.report
            .as_ref()
            .and_then(|r| r.output_formats.as_deref())
    }

    pub fn compress(&self) -> bool {
        self.report
            .as_ref()
            .and_then(|r| r.compress)
            .unwrap_or(false)
    }

    pub fn policy_file(&self) -> Option<&str> {
        self.ignore.as_ref().and_then(|i| i.policy_file.as_deref())
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "parquet")]
    #[error("Parquet processing error: {0}")]
    ParquetError(#[from] polars::prelude::PolarsError),

    #[error("Data file not found at '{path}'")]
    DataFileNotFound { path: String },

    #[error("Unsupported data format '{extension}' for '{path}'")]
    UnsupportedFormat { path: String, extension: String },

    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Invalid ignore pattern '{pattern}' on line {line}: {reason}")]
    InvalidPattern {
        pattern: String,
        line: usize,
        reason: String,
    },

    #[error("Section '{section}' is not available yet")]
    SectionUnavailable { section: String },

    #[error("Invalid selection: {message}")]
    SelectionError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Selection,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::IoError(_) | DashError::ZipError(_) | DashError::DataFileNotFound { .. } => {
                ErrorCategory::Io
            }
            DashError::CsvError(_)
            | DashError::UnsupportedFormat { .. }
            | DashError::MissingColumn { .. }
            | DashError::InvalidValue { .. } => ErrorCategory::Data,
            #[cfg(feature = "parquet")]
            DashError::ParquetError(_) => ErrorCategory::Data,
            DashError::InvalidPattern { .. }
            | DashError::ConfigError { .. }
            | DashError::ConfigValidationError { .. }
            | DashError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DashError::SelectionError { .. } | DashError::SectionUnavailable { .. } => {
                ErrorCategory::Selection
            }
            DashError::SerializationError(_) | DashError::ProcessingError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DashError::SectionUnavailable { .. } => ErrorSeverity::Low,
            DashError::SelectionError { .. } | DashError::DataFileNotFound { .. } => {
                ErrorSeverity::Medium
            }
            DashError::IoError(_) | DashError::ProcessingError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DashError::DataFileNotFound { .. } => {
                "Ensure the 'data' folder exists in the app directory and contains 'loan_data.parquet'; you may need to run the `create_data.py` script first".to_string()
            }
            DashError::UnsupportedFormat { .. } => {
                "Use a .parquet or .csv loan data file".to_string()
            }
            #[cfg(feature = "parquet")]
            DashError::ParquetError(_) => {
                "Check that the file is a valid Parquet file written with the loan data schema".to_string()
            }
            DashError::MissingColumn { column } => {
                format!("Add the '{}' column to the loan data file", column)
            }
            DashError::InvalidValue { column, row, .. } => {
                format!("Fix the '{}' value at row {} of the loan data file", column, row)
            }
            DashError::CsvError(_) => "Check the CSV header and delimiter".to_string(),
            DashError::InvalidPattern { line, .. } => {
                format!("Fix or remove line {} of the ignore policy", line)
            }
            DashError::SectionUnavailable { .. } => {
                "Run `bsm home` to see which sections are available".to_string()
            }
            DashError::SelectionError { .. } => {
                "Run `bsm months` to list valid months, or drop the filter to select everything".to_string()
            }
            DashError::ConfigError { .. }
            | DashError::ConfigValidationError { .. }
            | DashError::InvalidConfigValueError { .. } => {
                "Check the TOML configuration file and command line arguments".to_string()
            }
            DashError::IoError(_) | DashError::ZipError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            DashError::SerializationError(_) | DashError::ProcessingError { .. } => {
                "Re-run with --verbose and report the log output".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashError::DataFileNotFound { path } => {
                format!("Error: Data file not found at '{}'", path)
            }
            #[cfg(feature = "parquet")]
            DashError::ParquetError(e) => {
                format!("An error occurred loading the data file: {}", e)
            }
            DashError::CsvError(e) => format!("An error occurred loading the data file: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;

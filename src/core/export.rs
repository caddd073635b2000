use crate::core::format::display_columns;
use crate::domain::model::{Cell, PortfolioReport};
use crate::utils::error::{DashError, Result};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SUPPORTED_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

fn raw_cell(cell: Cell<'_>) -> String {
    match cell {
        Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
        Cell::Text(text) => text.to_string(),
        Cell::Number(n) => n.to_string(),
        Cell::Empty => String::new(),
    }
}

/// Filtered facilities as delimited text with unformatted values, in display column order.
pub fn delimited(report: &PortfolioReport, delimiter: u8) -> Result<Vec<u8>> {
    let columns = display_columns(&report.columns);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.header()))?;
    for record in &report.filtered {
        writer.write_record(columns.iter().map(|&c| raw_cell(record.cell(c))))?;
    }

    writer
        .into_inner()
        .map_err(|e| DashError::ProcessingError {
            message: format!("failed to flush delimited export: {}", e),
        })
}

pub fn json(report: &PortfolioReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

/// Render every requested format as `(file name, bytes)`.
pub fn render_files(report: &PortfolioReport, formats: &[String]) -> Result<Vec<(String, Vec<u8>)>> {
    let stem = format!(
        "portfolio_{}",
        report
            .month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "empty".to_string())
    );

    formats
        .iter()
        .map(|format| {
            let data = match format.as_str() {
                "csv" => delimited(report, b',')?,
                "tsv" => delimited(report, b'\t')?,
                "json" => json(report)?,
                other => {
                    return Err(DashError::InvalidConfigValueError {
                        field: "report.output_formats".to_string(),
                        value: other.to_string(),
                        reason: format!("Valid formats: {}", SUPPORTED_FORMATS.join(", ")),
                    })
                }
            };
            Ok((format!("{}.{}", stem, format), data))
        })
        .collect()
}

pub fn zip_files(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }
    // 完成並取回底層 Vec<u8>
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

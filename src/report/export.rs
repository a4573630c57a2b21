//! Export of the derived tables to JSON or a zip of CSV files

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{
    CustomerRfm, DashboardConfig, DashboardTables, MonthBucketing, MonthlyOrderCount,
    MonthlySpend, ProductPopularity, TimestampPolicy,
};
use crate::report::DashboardMetrics;

/// Metadata about the run that produced the tables
#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    pub orderlens_version: String,
    pub input_file: String,
    /// RFM reference instant
    pub reference: String,
    pub bucketing: MonthBucketing,
    pub timestamp_policy: TimestampPolicy,
    /// Rows kept after loading
    pub rows: usize,
}

impl ExportMetadata {
    pub fn new(input_file: &Path, config: &DashboardConfig, rows: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            orderlens_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.display().to_string(),
            reference: config.rfm.reference.format("%Y-%m-%d %H:%M:%S").to_string(),
            bucketing: config.bucketing,
            timestamp_policy: config.timestamp_policy,
            rows,
        }
    }
}

/// Complete JSON export
#[derive(Serialize)]
pub struct DashboardExport<'a> {
    pub metadata: &'a ExportMetadata,
    pub metrics: DashboardMetrics,
    #[serde(flatten)]
    pub tables: &'a DashboardTables,
}

/// Write the tables to `output_path`; the format follows the extension
/// (`json` or `zip`).
pub fn export_tables(
    tables: &DashboardTables,
    metadata: &ExportMetadata,
    output_path: &Path,
) -> Result<()> {
    let extension = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => export_json(tables, metadata, output_path),
        "zip" => export_zip(tables, output_path),
        _ => anyhow::bail!(
            "Unsupported export format: {}. Supported formats: json, zip",
            extension
        ),
    }
}

/// Export tables, headline metrics and run metadata as pretty JSON
pub fn export_json(
    tables: &DashboardTables,
    metadata: &ExportMetadata,
    output_path: &Path,
) -> Result<()> {
    let export = DashboardExport {
        metadata,
        metrics: DashboardMetrics::from_tables(tables),
        tables,
    };

    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize tables to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write export to {}", output_path.display()))?;

    Ok(())
}

/// Package one CSV per table into a zip archive:
/// - monthly_orders.csv
/// - monthly_spend.csv
/// - product_popularity.csv
/// - customer_rfm.csv
pub fn export_zip(tables: &DashboardTables, zip_path: &Path) -> Result<()> {
    use ::zip::write::SimpleFileOptions;
    use ::zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(::zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let frames = [
        ("monthly_orders.csv", monthly_orders_frame(&tables.monthly_orders)?),
        ("monthly_spend.csv", monthly_spend_frame(&tables.monthly_spend)?),
        ("product_popularity.csv", products_frame(&tables.products)?),
        ("customer_rfm.csv", rfm_frame(&tables.rfm)?),
    ];

    for (filename, mut df) in frames {
        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;
        CsvWriter::new(&mut zip)
            .finish(&mut df)
            .with_context(|| format!("Failed to write {}", filename))?;
    }

    zip.flush()?;
    zip.finish().context("Failed to finalize zip file")?;

    Ok(())
}

fn monthly_orders_frame(rows: &[MonthlyOrderCount]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "month_name".into(),
            rows.iter().map(|r| r.month_name.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("month".into(), rows.iter().map(|r| r.month).collect::<Vec<u32>>()),
        Column::new(
            "year".into(),
            rows.iter().map(|r| r.year).collect::<Vec<Option<i32>>>(),
        ),
        Column::new(
            "order_count".into(),
            rows.iter().map(|r| r.order_count).collect::<Vec<u64>>(),
        ),
    ])
}

fn monthly_spend_frame(rows: &[MonthlySpend]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "month_name".into(),
            rows.iter().map(|r| r.month_name.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("month".into(), rows.iter().map(|r| r.month).collect::<Vec<u32>>()),
        Column::new(
            "year".into(),
            rows.iter().map(|r| r.year).collect::<Vec<Option<i32>>>(),
        ),
        Column::new(
            "total_spend".into(),
            rows.iter().map(|r| r.total_spend).collect::<Vec<f64>>(),
        ),
    ])
}

fn products_frame(rows: &[ProductPopularity]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "product_category".into(),
            rows.iter()
                .map(|r| r.product_category.as_str())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "product_count".into(),
            rows.iter().map(|r| r.product_count).collect::<Vec<u64>>(),
        ),
    ])
}

fn rfm_frame(rows: &[CustomerRfm]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "customer_id".into(),
            rows.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "recency_days".into(),
            rows.iter().map(|r| r.recency_days).collect::<Vec<u32>>(),
        ),
        Column::new(
            "frequency".into(),
            rows.iter().map(|r| r.frequency).collect::<Vec<u64>>(),
        ),
        Column::new(
            "monetary".into(),
            rows.iter().map(|r| r.monetary).collect::<Vec<f64>>(),
        ),
    ])
}

//! Command-line argument definitions using clap

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{DashboardConfig, MonthBucketing, RfmConfig, TimestampPolicy};
use crate::report::DEFAULT_TOP_N;

/// Orderlens - Monthly orders, spend, product popularity and RFM for e-commerce orders
#[derive(Parser, Debug)]
#[command(name = "orderlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long, default_value = "main_data.csv")]
    pub input: PathBuf,

    /// Reference date used as "now" for RFM recency (YYYY-MM-DD)
    #[arg(long, default_value = "2018-10-20", value_parser = parse_reference_date)]
    pub reference_date: NaiveDate,

    /// Monthly bucketing strategy.
    /// Options: "month-of-year" (merge years, default), "year-month" (keep years apart),
    /// "peak-month" (per year-month buckets, keep the largest per month name)
    #[arg(long, default_value = "month-of-year")]
    pub bucketing: MonthBucketing,

    /// Drop records with unparseable timestamps instead of failing the load
    #[arg(long, default_value = "false")]
    pub lenient: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Number of rows shown in each top/bottom ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N, value_parser = validate_top)]
    pub top: usize,

    /// Print the dashboard as tables instead of opening the interactive view
    #[arg(long, default_value = "false")]
    pub no_tui: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the derived tables to JSON or a zip of CSV files
    Export {
        /// Output file path (.json or .zip)
        output: PathBuf,
    },
}

impl Cli {
    /// Build the pipeline configuration from the parsed arguments.
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            rfm: RfmConfig::at_date(self.reference_date),
            bucketing: self.bucketing,
            timestamp_policy: if self.lenient {
                TimestampPolicy::Lenient
            } else {
                TimestampPolicy::Strict
            },
            infer_schema_length: self.infer_schema_length,
        }
    }
}

/// Parser for reference_date parameter
fn parse_reference_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a valid date, expected YYYY-MM-DD", s))
}

/// Validator for top parameter
fn validate_top(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value == 0 {
        Err("top must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

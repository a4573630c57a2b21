//! Dataset loader for the order table (CSV or Parquet)
//!
//! The loader keeps only the seven columns the dashboard needs, casts the
//! identifiers to strings and the price to `Float64`, and normalizes both
//! timestamp columns from text to `Datetime(Microseconds)`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use super::error::{LoadError, ParseError};

pub const ORDER_ID: &str = "order_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const ORDER_APPROVED_AT: &str = "order_approved_at";
pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const PRICE: &str = "price";
pub const PRODUCT_ID: &str = "product_id";
pub const PRODUCT_CATEGORY: &str = "product_category_name_english";

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    ORDER_ID,
    CUSTOMER_ID,
    ORDER_APPROVED_AT,
    ORDER_PURCHASE_TIMESTAMP,
    PRICE,
    PRODUCT_ID,
    PRODUCT_CATEGORY,
];

const TIMESTAMP_COLUMNS: [&str; 2] = [ORDER_APPROVED_AT, ORDER_PURCHASE_TIMESTAMP];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// What to do with a record whose timestamp cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Fail the whole load on the first bad value.
    #[default]
    Strict,
    /// Drop the record and report it in [`LoadReport::dropped`].
    Lenient,
}

/// One row of the raw order dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub order_approved_at: NaiveDateTime,
    pub order_purchase_timestamp: NaiveDateTime,
    pub price: f64,
    pub product_id: String,
    pub product_category_name_english: String,
}

/// What happened while normalizing the loaded rows.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Records dropped under [`TimestampPolicy::Lenient`]
    pub dropped: Vec<ParseError>,
}

/// The loaded, normalized order collection.
///
/// Immutable once built; aggregators only ever read from it.
#[derive(Debug, Clone)]
pub struct Orders {
    df: DataFrame,
}

impl Orders {
    /// Build the collection from in-memory records.
    pub fn from_records(records: &[OrderRecord]) -> Result<Self, LoadError> {
        let approved: Vec<Option<i64>> = records
            .iter()
            .map(|r| Some(to_micros(r.order_approved_at)))
            .collect();
        let purchased: Vec<Option<i64>> = records
            .iter()
            .map(|r| Some(to_micros(r.order_purchase_timestamp)))
            .collect();

        let columns = vec![
            Column::new(
                ORDER_ID.into(),
                records.iter().map(|r| r.order_id.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                CUSTOMER_ID.into(),
                records.iter().map(|r| r.customer_id.as_str()).collect::<Vec<_>>(),
            ),
            datetime_column(ORDER_APPROVED_AT, approved)?,
            datetime_column(ORDER_PURCHASE_TIMESTAMP, purchased)?,
            Column::new(
                PRICE.into(),
                records.iter().map(|r| r.price).collect::<Vec<f64>>(),
            ),
            Column::new(
                PRODUCT_ID.into(),
                records.iter().map(|r| r.product_id.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                PRODUCT_CATEGORY.into(),
                records
                    .iter()
                    .map(|r| r.product_category_name_english.as_str())
                    .collect::<Vec<_>>(),
            ),
        ];

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Validate and normalize a raw frame whose timestamps are still text.
    ///
    /// Columns beyond [`REQUIRED_COLUMNS`] are discarded.
    pub fn from_frame(df: DataFrame, policy: TimestampPolicy) -> Result<(Self, LoadReport), LoadError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !present.iter().any(|name| name.as_str() == **required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let mut df = df
            .lazy()
            .select([
                col(ORDER_ID).cast(DataType::String),
                col(CUSTOMER_ID).cast(DataType::String),
                col(ORDER_APPROVED_AT).cast(DataType::String),
                col(ORDER_PURCHASE_TIMESTAMP).cast(DataType::String),
                // A price that is present but not numeric fails the load
                col(PRICE).strict_cast(DataType::Float64),
                col(PRODUCT_ID).cast(DataType::String),
                col(PRODUCT_CATEGORY).cast(DataType::String),
            ])
            .collect()?;

        let rows_read = df.height();
        let mut keep = vec![true; rows_read];
        let mut dropped = Vec::new();

        for name in TIMESTAMP_COLUMNS {
            let raw = df.column(name)?.as_materialized_series().str()?.clone();
            let mut parsed: Vec<Option<i64>> = Vec::with_capacity(rows_read);

            for (row, value) in (&raw).into_iter().enumerate() {
                match value.and_then(parse_timestamp) {
                    Some(ts) => parsed.push(Some(to_micros(ts))),
                    None => {
                        let err = ParseError {
                            column: name.to_string(),
                            row,
                            value: value.unwrap_or_default().to_string(),
                        };
                        match policy {
                            TimestampPolicy::Strict => return Err(err.into()),
                            TimestampPolicy::Lenient => {
                                if keep[row] {
                                    keep[row] = false;
                                    dropped.push(err);
                                }
                                parsed.push(None);
                            }
                        }
                    }
                }
            }

            df.with_column(datetime_column(name, parsed)?)?;
        }

        if !dropped.is_empty() {
            let mask = BooleanChunked::new("keep".into(), keep);
            df = df.filter(&mask)?;
        }

        let report = LoadReport {
            rows_read,
            rows_kept: df.height(),
            dropped,
        };

        Ok((Self { df }, report))
    }

    /// The normalized frame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Lazy view for building aggregations.
    pub(crate) fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

/// Load the order dataset from a file (CSV or Parquet based on extension)
///
/// # Arguments
/// * `path` - Input file path
/// * `policy` - How to treat unparseable timestamps
/// * `infer_schema_length` - Rows used for CSV schema inference, 0 for a full scan
pub fn load_orders(
    path: &Path,
    policy: TimestampPolicy,
    infer_schema_length: usize,
) -> Result<(Orders, LoadReport), LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let df = scan_dataset(path, infer_schema_length)?.collect()?;
    Orders::from_frame(df, policy)
}

/// Get column names from a dataset file without loading any rows
pub fn get_column_names(path: &Path) -> Result<Vec<String>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let schema = scan_dataset(path, 100)?.collect_schema()?;
    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Parse a timestamp in one of the accepted layouts. A bare date maps to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub(crate) fn to_micros(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

fn datetime_column(name: &str, micros: Vec<Option<i64>>) -> PolarsResult<Column> {
    Column::new(name.into(), micros).cast(&DataType::Datetime(TimeUnit::Microseconds, None))
}

fn scan_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
        _ => return Err(LoadError::UnsupportedFormat(extension)),
    };

    Ok(lf)
}

//! Monthly order counts and monthly spend
//!
//! Both aggregations bucket rows by the calendar month of `order_approved_at`,
//! label each bucket, resolve duplicate labels by keeping the largest bucket,
//! and return rows in calendar order.

use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;

use super::calendar::{month_rank, MonthBucketing};
use super::error::AnalysisError;
use super::loader::{Orders, ORDER_APPROVED_AT, PRICE};

const MONTH: &str = "month";
const YEAR: &str = "year";
const VALUE: &str = "value";

/// Number of orders approved in a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyOrderCount {
    pub month_name: String,
    /// Calendar month number, 1..=12
    pub month: u32,
    /// Bucket year; `None` under month-of-year bucketing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub order_count: u64,
}

/// Sum of prices for orders approved in a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpend {
    pub month_name: String,
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub total_spend: f64,
}

#[derive(Debug, Clone, Copy)]
struct Bucket<V> {
    year: Option<i32>,
    month: u32,
    value: V,
}

/// Count orders per month, ordered by calendar month number.
pub fn monthly_order_counts(
    orders: &Orders,
    bucketing: MonthBucketing,
) -> Result<Vec<MonthlyOrderCount>, AnalysisError> {
    let df = aggregate_by_month(orders, bucketing, len())?;
    let values = df.column(VALUE)?.cast(&DataType::UInt64)?;
    let values: Vec<u64> = values
        .as_materialized_series()
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();

    let buckets = zip_buckets(&df, values)?;
    let mut rows: Vec<MonthlyOrderCount> = keep_largest_per_label(buckets, bucketing)
        .into_iter()
        .map(|(month_name, bucket)| MonthlyOrderCount {
            month_name,
            month: bucket.month,
            year: bucket.year,
            order_count: bucket.value,
        })
        .collect();

    // Numeric month key
    rows.sort_by_key(|row| (sort_year(bucketing, row.year), row.month));
    Ok(rows)
}

/// Sum `price` per month, ordered by the fixed January..December table.
pub fn monthly_spend(
    orders: &Orders,
    bucketing: MonthBucketing,
) -> Result<Vec<MonthlySpend>, AnalysisError> {
    let df = aggregate_by_month(orders, bucketing, col(PRICE).sum())?;
    let values = df.column(VALUE)?.cast(&DataType::Float64)?;
    let values: Vec<f64> = values
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let buckets = zip_buckets(&df, values)?;
    let mut rows: Vec<MonthlySpend> = keep_largest_per_label(buckets, bucketing)
        .into_iter()
        .map(|(month_name, bucket)| MonthlySpend {
            month_name,
            month: bucket.month,
            year: bucket.year,
            total_spend: bucket.value,
        })
        .collect();

    // Categorical ordering by label position
    rows.sort_by_key(|row| {
        (
            sort_year(bucketing, row.year),
            month_rank(&row.month_name).unwrap_or(usize::MAX),
        )
    });
    Ok(rows)
}

fn aggregate_by_month(
    orders: &Orders,
    bucketing: MonthBucketing,
    agg: Expr,
) -> Result<DataFrame, AnalysisError> {
    let mut keys = vec![col(ORDER_APPROVED_AT)
        .dt()
        .month()
        .cast(DataType::UInt32)
        .alias(MONTH)];
    if bucketing.keeps_year() {
        keys.push(
            col(ORDER_APPROVED_AT)
                .dt()
                .year()
                .cast(DataType::Int32)
                .alias(YEAR),
        );
    }

    let df = orders
        .lazy()
        .filter(col(ORDER_APPROVED_AT).is_not_null())
        .group_by(keys)
        .agg([agg.alias(VALUE)])
        .collect()?;

    Ok(df)
}

fn zip_buckets<V>(df: &DataFrame, values: Vec<V>) -> Result<Vec<Bucket<V>>, AnalysisError> {
    let months: Vec<u32> = df
        .column(MONTH)?
        .as_materialized_series()
        .u32()?
        .into_iter()
        .map(|m| m.unwrap_or(0))
        .collect();

    let years: Vec<Option<i32>> = match df.column(YEAR) {
        Ok(column) => column.as_materialized_series().i32()?.into_iter().collect(),
        Err(_) => vec![None; months.len()],
    };

    Ok(months
        .into_iter()
        .zip(years)
        .zip(values)
        .map(|((month, year), value)| Bucket { year, month, value })
        .collect())
}

/// Label every bucket and keep a single bucket per label: after sorting
/// ascending by value, the last one seen wins.
fn keep_largest_per_label<V: PartialOrd + Copy>(
    mut buckets: Vec<Bucket<V>>,
    bucketing: MonthBucketing,
) -> Vec<(String, Bucket<V>)> {
    buckets.sort_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut by_label: HashMap<String, Bucket<V>> = HashMap::new();
    for bucket in buckets {
        let label = bucketing.label(bucket.year.unwrap_or_default(), bucket.month);
        by_label.insert(label, bucket);
    }

    by_label.into_iter().collect()
}

fn sort_year(bucketing: MonthBucketing, year: Option<i32>) -> Option<i32> {
    match bucketing {
        MonthBucketing::YearMonth => year,
        MonthBucketing::MonthOfYear | MonthBucketing::PeakMonth => None,
    }
}

//! Product popularity by category

use polars::prelude::*;
use serde::Serialize;

use super::error::AnalysisError;
use super::loader::{Orders, PRODUCT_CATEGORY, PRODUCT_ID};

const PRODUCT_COUNT: &str = "product_count";

/// Number of product entries sold in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPopularity {
    pub product_category: String,
    pub product_count: u64,
}

/// Count product entries per category, most popular first.
///
/// Rows without a category are skipped. Equal counts are ordered by
/// category name so the result is deterministic.
pub fn product_popularity(orders: &Orders) -> Result<Vec<ProductPopularity>, AnalysisError> {
    let df = orders
        .lazy()
        .filter(col(PRODUCT_CATEGORY).is_not_null())
        .group_by([col(PRODUCT_CATEGORY)])
        .agg([col(PRODUCT_ID).count().alias(PRODUCT_COUNT)])
        .collect()?;

    let categories = df.column(PRODUCT_CATEGORY)?.as_materialized_series().str()?.clone();
    let counts = df.column(PRODUCT_COUNT)?.cast(&DataType::UInt64)?;
    let counts = counts.as_materialized_series().u64()?;

    let mut rows: Vec<ProductPopularity> = (&categories)
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(category, count)| {
            Some(ProductPopularity {
                product_category: category?.to_string(),
                product_count: count.unwrap_or(0),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.product_count
            .cmp(&a.product_count)
            .then_with(|| a.product_category.cmp(&b.product_category))
    });

    Ok(rows)
}

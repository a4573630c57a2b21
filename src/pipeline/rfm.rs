//! Recency / Frequency / Monetary segmentation per customer
//!
//! Each measure is computed by its own group-by and the three results are
//! joined on `customer_id`, so no positional alignment between groupings is
//! ever assumed.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use super::error::AnalysisError;
use super::loader::{from_micros, Orders, CUSTOMER_ID, ORDER_PURCHASE_TIMESTAMP, PRICE};

const LAST_PURCHASE: &str = "last_purchase";
const FREQUENCY: &str = "frequency";
const MONETARY: &str = "monetary";

/// Settings for the RFM aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfmConfig {
    /// Instant treated as "now" when measuring recency
    pub reference: NaiveDateTime,
}

impl RfmConfig {
    /// Use midnight of `date` as the reference instant.
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            reference: date.and_time(chrono::NaiveTime::MIN),
        }
    }
}

impl Default for RfmConfig {
    /// 2018-10-20, shortly after the last order in the public dataset.
    fn default() -> Self {
        let date = NaiveDate::from_ymd_opt(2018, 10, 20).unwrap_or_default();
        Self::at_date(date)
    }
}

/// RFM measures for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRfm {
    pub customer_id: String,
    /// Whole days between the last purchase and the reference instant
    pub recency_days: u32,
    /// Number of order rows
    pub frequency: u64,
    /// Sum of prices
    pub monetary: f64,
}

/// RFM rows for customers whose last purchase is on or before the reference
/// instant, plus the customers left out because it is not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RfmTable {
    pub rows: Vec<CustomerRfm>,
    pub after_reference: Vec<LateCustomer>,
}

/// A customer whose last purchase falls after the reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LateCustomer {
    pub customer_id: String,
    pub last_purchase: NaiveDateTime,
}

/// Compute one RFM row per distinct customer, ordered by `customer_id`.
///
/// Fails with [`AnalysisError::PurchaseAfterReference`] on the first customer
/// (by id) who purchased after the reference instant. Use [`rfm_table`] to
/// keep the other customers instead.
pub fn customer_rfm(orders: &Orders, config: &RfmConfig) -> Result<Vec<CustomerRfm>, AnalysisError> {
    let table = rfm_table(orders, config)?;
    if let Some(late) = table.after_reference.into_iter().next() {
        return Err(AnalysisError::PurchaseAfterReference {
            customer_id: late.customer_id,
            purchased_at: late.last_purchase,
            reference: config.reference,
        });
    }
    Ok(table.rows)
}

/// Compute the RFM rows, setting aside customers who purchased after the
/// reference instant. Both lists are ordered by `customer_id`.
pub fn rfm_table(orders: &Orders, config: &RfmConfig) -> Result<RfmTable, AnalysisError> {
    let customers = orders.lazy().filter(col(CUSTOMER_ID).is_not_null());

    let recency = customers
        .clone()
        .group_by([col(CUSTOMER_ID)])
        .agg([col(ORDER_PURCHASE_TIMESTAMP).max().alias(LAST_PURCHASE)]);
    let frequency = customers
        .clone()
        .group_by([col(CUSTOMER_ID)])
        .agg([len().alias(FREQUENCY)]);
    let monetary = customers
        .group_by([col(CUSTOMER_ID)])
        .agg([col(PRICE).sum().alias(MONETARY)]);

    let df = recency
        .join(
            frequency,
            [col(CUSTOMER_ID)],
            [col(CUSTOMER_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            monetary,
            [col(CUSTOMER_ID)],
            [col(CUSTOMER_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .select([
            col(CUSTOMER_ID),
            col(LAST_PURCHASE).cast(DataType::Int64),
            col(FREQUENCY).cast(DataType::UInt64),
            col(MONETARY).cast(DataType::Float64),
        ])
        .sort([CUSTOMER_ID], SortMultipleOptions::default())
        .collect()?;

    let ids = df.column(CUSTOMER_ID)?.as_materialized_series().str()?;
    let last = df.column(LAST_PURCHASE)?.as_materialized_series().i64()?;
    let freq = df.column(FREQUENCY)?.as_materialized_series().u64()?;
    let money = df.column(MONETARY)?.as_materialized_series().f64()?;

    let mut table = RfmTable {
        rows: Vec::with_capacity(df.height()),
        after_reference: Vec::new(),
    };
    for (((id, last), freq), money) in ids
        .into_iter()
        .zip(last.into_iter())
        .zip(freq.into_iter())
        .zip(money.into_iter())
    {
        let (Some(id), Some(last)) = (id, last.and_then(from_micros)) else {
            continue;
        };
        if last > config.reference {
            table.after_reference.push(LateCustomer {
                customer_id: id.to_string(),
                last_purchase: last,
            });
            continue;
        }
        table.rows.push(CustomerRfm {
            customer_id: id.to_string(),
            recency_days: recency_days(last, config.reference),
            frequency: freq.unwrap_or(0),
            monetary: money.unwrap_or(0.0),
        });
    }

    Ok(table)
}

/// Whole days from `last_purchase` to `reference`; 0 if the purchase is later.
fn recency_days(last_purchase: NaiveDateTime, reference: NaiveDateTime) -> u32 {
    let days = (reference - last_purchase).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

//! Top / bottom slices fed to the charts

use std::cmp::Ordering;
use std::fmt;

use crate::pipeline::{CustomerRfm, ProductPopularity};

/// Number of rows shown in each ranked chart.
pub const DEFAULT_TOP_N: usize = 5;

/// The `n` most popular categories. The input is already sorted descending.
pub fn top_products(rows: &[ProductPopularity], n: usize) -> Vec<ProductPopularity> {
    rows.iter().take(n).cloned().collect()
}

/// The `n` least popular categories, least popular first.
pub fn bottom_products(rows: &[ProductPopularity], n: usize) -> Vec<ProductPopularity> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|row| row.product_count);
    sorted.truncate(n);
    sorted
}

/// One of the three RFM dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfmMeasure {
    Recency,
    Frequency,
    Monetary,
}

impl RfmMeasure {
    pub const ALL: [RfmMeasure; 3] = [RfmMeasure::Recency, RfmMeasure::Frequency, RfmMeasure::Monetary];

    /// Chart title
    pub fn title(self) -> &'static str {
        match self {
            RfmMeasure::Recency => "Recency (days)",
            RfmMeasure::Frequency => "Frequency",
            RfmMeasure::Monetary => "Monetary",
        }
    }

    /// Recency ranks smallest first; the others rank largest first.
    pub fn ascending(self) -> bool {
        matches!(self, RfmMeasure::Recency)
    }

    pub fn value(self, row: &CustomerRfm) -> f64 {
        match self {
            RfmMeasure::Recency => row.recency_days as f64,
            RfmMeasure::Frequency => row.frequency as f64,
            RfmMeasure::Monetary => row.monetary,
        }
    }
}

impl fmt::Display for RfmMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RfmMeasure::Recency => "Recency",
            RfmMeasure::Frequency => "Frequency",
            RfmMeasure::Monetary => "Monetary",
        };
        write!(f, "{}", s)
    }
}

/// The `n` best customers on `measure`.
pub fn top_customers(rows: &[CustomerRfm], measure: RfmMeasure, n: usize) -> Vec<CustomerRfm> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ord = measure
            .value(a)
            .partial_cmp(&measure.value(b))
            .unwrap_or(Ordering::Equal);
        if measure.ascending() {
            ord
        } else {
            ord.reverse()
        }
    });
    sorted.truncate(n);
    sorted
}

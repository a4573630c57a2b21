//! Headline metrics computed from the derived tables
//!
//! Every reduction over a table returns `Option`, so an empty dataset shows
//! up as "n/a" instead of a NaN or a panic.

use serde::Serialize;

use crate::pipeline::{DashboardTables, MonthlyOrderCount};

/// min / max / sum / mean over a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
}

impl Summary {
    /// Summarize `values`; `None` when there are none.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;

        for v in values {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            count,
            min,
            max,
            sum,
            mean: sum / count as f64,
        })
    }
}

/// Which end of a column to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

/// First row attaining the maximum or minimum of `key`.
pub fn extreme_by<T, F>(rows: &[T], extreme: Extreme, key: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    let target = match extreme {
        Extreme::Max => rows.iter().map(&key).fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.max(v)))
        }),
        Extreme::Min => rows.iter().map(&key).fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.min(v)))
        }),
    }?;

    rows.iter().find(|row| key(row) == target)
}

/// A month label with its order count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthHighlight {
    pub month_name: String,
    pub order_count: u64,
}

impl From<&MonthlyOrderCount> for MonthHighlight {
    fn from(row: &MonthlyOrderCount) -> Self {
        Self {
            month_name: row.month_name.clone(),
            order_count: row.order_count,
        }
    }
}

/// The scalars shown next to each chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub busiest_month: Option<MonthHighlight>,
    pub quietest_month: Option<MonthHighlight>,
    pub spend: Option<Summary>,
    pub product_counts: Option<Summary>,
}

impl DashboardMetrics {
    pub fn from_tables(tables: &DashboardTables) -> Self {
        let order_count = |row: &MonthlyOrderCount| row.order_count as f64;

        Self {
            busiest_month: extreme_by(&tables.monthly_orders, Extreme::Max, order_count)
                .map(MonthHighlight::from),
            quietest_month: extreme_by(&tables.monthly_orders, Extreme::Min, order_count)
                .map(MonthHighlight::from),
            spend: Summary::of(tables.monthly_spend.iter().map(|row| row.total_spend)),
            product_counts: Summary::of(tables.products.iter().map(|row| row.product_count as f64)),
        }
    }
}

/// Format an optional scalar with two decimals, or "n/a".
pub fn format_amount(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_empty_is_none() {
        assert_eq!(Summary::of(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_summary_values() {
        let s = Summary::of([10.0, 20.0, 5.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 5.0);
        assert_eq!(s.max, 20.0);
        assert_eq!(s.sum, 35.0);
        assert!((s.mean - 35.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_by_returns_first_match() {
        let rows = [("a", 3.0), ("b", 7.0), ("c", 7.0), ("d", 1.0)];
        assert_eq!(extreme_by(&rows, Extreme::Max, |r| r.1).unwrap().0, "b");
        assert_eq!(extreme_by(&rows, Extreme::Min, |r| r.1).unwrap().0, "d");
        let empty: [(&str, f64); 0] = [];
        assert!(extreme_by(&empty, Extreme::Max, |r| r.1).is_none());
    }

    #[test]
    fn test_metrics_on_empty_tables() {
        let metrics = DashboardMetrics::from_tables(&DashboardTables::default());
        assert!(metrics.busiest_month.is_none());
        assert!(metrics.quietest_month.is_none());
        assert!(metrics.spend.is_none());
        assert!(metrics.product_counts.is_none());
        assert_eq!(format_amount(metrics.spend.map(|s| s.mean)), "n/a");
    }
}

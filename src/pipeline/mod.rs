//! Pipeline module - load the orders once and derive the dashboard tables

pub mod calendar;
pub mod error;
pub mod loader;
pub mod monthly;
pub mod products;
pub mod rfm;

use std::path::Path;

use serde::Serialize;

pub use calendar::*;
pub use error::*;
pub use loader::*;
pub use monthly::*;
pub use products::*;
pub use rfm::*;

/// Options controlling how the dashboard tables are derived.
#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub rfm: RfmConfig,
    pub bucketing: MonthBucketing,
    pub timestamp_policy: TimestampPolicy,
    /// Rows used for CSV schema inference, 0 for a full scan
    pub infer_schema_length: usize,
}

/// The four derived tables handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardTables {
    pub monthly_orders: Vec<MonthlyOrderCount>,
    pub monthly_spend: Vec<MonthlySpend>,
    pub products: Vec<ProductPopularity>,
    pub rfm: Vec<CustomerRfm>,
    /// Customers left out of `rfm` because they purchased after the reference
    pub rfm_excluded: Vec<LateCustomer>,
}

/// Explicit pipeline: dataset in, four tables out. Holds no global state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    orders: Orders,
    config: DashboardConfig,
}

impl Dashboard {
    /// Wrap an already-loaded collection.
    pub fn new(orders: Orders, config: DashboardConfig) -> Self {
        Self { orders, config }
    }

    /// Load the dataset at `path` using `config`.
    pub fn open(path: &Path, config: DashboardConfig) -> Result<(Self, LoadReport), LoadError> {
        let (orders, report) =
            load_orders(path, config.timestamp_policy, config.infer_schema_length)?;
        Ok((Self::new(orders, config), report))
    }

    pub fn orders(&self) -> &Orders {
        &self.orders
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Derive all four tables. The aggregations share nothing but the
    /// immutable input, so they run in parallel.
    ///
    /// Customers who purchased after the RFM reference are listed in
    /// [`DashboardTables::rfm_excluded`]; the other tables still cover them.
    pub fn compute(&self) -> Result<DashboardTables, AnalysisError> {
        let orders = &self.orders;
        let bucketing = self.config.bucketing;
        let rfm_config = &self.config.rfm;

        let ((monthly_orders, monthly_spend), (products, rfm)) = rayon::join(
            || {
                rayon::join(
                    || monthly_order_counts(orders, bucketing),
                    || monthly_spend(orders, bucketing),
                )
            },
            || {
                rayon::join(
                    || product_popularity(orders),
                    || rfm_table(orders, rfm_config),
                )
            },
        );

        let rfm = rfm?;
        Ok(DashboardTables {
            monthly_orders: monthly_orders?,
            monthly_spend: monthly_spend?,
            products: products?,
            rfm: rfm.rows,
            rfm_excluded: rfm.after_reference,
        })
    }
}

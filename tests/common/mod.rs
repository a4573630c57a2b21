//! Shared test utilities and fixture generators

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use orderlens::pipeline::{OrderRecord, Orders};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// CSV header with every required column plus one the loader should ignore
pub const CSV_HEADER: &str = "order_id,customer_id,order_status,order_approved_at,order_purchase_timestamp,price,product_id,product_category_name_english";

/// Midnight on the given date
pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A record approved and purchased on the same instant
pub fn order(
    order_id: &str,
    customer_id: &str,
    at: NaiveDateTime,
    price: f64,
    category: &str,
) -> OrderRecord {
    OrderRecord {
        order_id: order_id.to_string(),
        customer_id: customer_id.to_string(),
        order_approved_at: at,
        order_purchase_timestamp: at,
        price,
        product_id: format!("p-{}", order_id),
        product_category_name_english: category.to_string(),
    }
}

/// Build an `Orders` collection from records
pub fn orders(records: &[OrderRecord]) -> Orders {
    Orders::from_records(records).unwrap()
}

/// A small, mixed dataset spanning two years:
/// - c1: three orders (2018-01-01, 2018-02-15, 2018-03-01) priced 10, 20, 5
/// - c2: one order on 2017-03-10 priced 100
/// - c3: two orders in 2018-03 priced 7.5 and 2.5
pub fn create_sample_records() -> Vec<OrderRecord> {
    vec![
        order("o1", "c1", day(2018, 1, 1), 10.0, "bed_bath_table"),
        order("o2", "c1", day(2018, 2, 15), 20.0, "health_beauty"),
        order("o3", "c1", day(2018, 3, 1), 5.0, "bed_bath_table"),
        order("o4", "c2", day(2017, 3, 10), 100.0, "watches_gifts"),
        order("o5", "c3", day(2018, 3, 20), 7.5, "bed_bath_table"),
        order("o6", "c3", day(2018, 3, 28), 2.5, "health_beauty"),
    ]
}

/// Random records for larger property checks, all dated between
/// 2016-01-01 and 2018-09-28 so they precede the default RFM reference
pub fn create_random_records(n: usize, seed: u64) -> Vec<OrderRecord> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let categories = ["toys", "garden_tools", "auto", "perfumery", "telephony"];

    (0..n)
        .map(|i| {
            let year = rng.gen_range(2016..=2018);
            let month = if year == 2018 {
                rng.gen_range(1..=9)
            } else {
                rng.gen_range(1..=12)
            };
            let dom = rng.gen_range(1..=28);
            let at = day(year, month, dom);
            let price = (rng.gen::<f64>() * 500.0 * 100.0).round() / 100.0;
            order(
                &format!("o{}", i),
                &format!("c{}", rng.gen_range(0..(n / 3).max(1))),
                at,
                price,
                categories[rng.gen_range(0..categories.len())],
            )
        })
        .collect()
}

/// Write raw CSV lines (header included) to a temp file
pub fn write_csv(lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("orders.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    drop(file);

    (temp_dir, csv_path)
}

/// Write records as a CSV file in the source dataset's layout
pub fn write_orders_csv(records: &[OrderRecord]) -> (TempDir, PathBuf) {
    let mut lines = vec![CSV_HEADER.to_string()];
    for r in records {
        lines.push(format!(
            "{},{},delivered,{},{},{},{},{}",
            r.order_id,
            r.customer_id,
            r.order_approved_at.format("%Y-%m-%d %H:%M:%S"),
            r.order_purchase_timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.price,
            r.product_id,
            r.product_category_name_english
        ));
    }
    let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
    write_csv(&refs)
}

/// Assert two floats are equal within a small tolerance
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

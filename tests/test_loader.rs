//! Unit tests for the order dataset loader

use orderlens::pipeline::{
    get_column_names, load_orders, LoadError, Orders, TimestampPolicy, ORDER_APPROVED_AT,
    ORDER_PURCHASE_TIMESTAMP, REQUIRED_COLUMNS,
};
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_load_csv_file() {
    let (_temp_dir, csv_path) = write_orders_csv(&create_sample_records());

    let (orders, report) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();

    assert_eq!(orders.len(), 6, "Should have 6 data rows");
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.rows_kept, 6);
    assert!(report.dropped.is_empty());
}

#[test]
fn test_loader_keeps_only_required_columns() {
    let (_temp_dir, csv_path) = write_orders_csv(&create_sample_records());

    let (orders, _) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();

    let columns: Vec<String> = orders
        .frame()
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(columns, REQUIRED_COLUMNS.to_vec());
}

#[test]
fn test_timestamps_are_normalized_to_datetime() {
    let (_temp_dir, csv_path) = write_orders_csv(&create_sample_records());

    let (orders, _) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();
    let schema = orders.frame().schema();

    for name in [ORDER_APPROVED_AT, ORDER_PURCHASE_TIMESTAMP] {
        assert!(
            matches!(schema.get(name), Some(DataType::Datetime(_, _))),
            "{} should be a Datetime column, got {:?}",
            name,
            schema.get(name)
        );
    }
    assert_eq!(schema.get("price"), Some(&DataType::Float64));
}

#[test]
fn test_load_parquet_file() {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("orders.parquet");

    let mut df = df! {
        "order_id" => ["o1", "o2"],
        "customer_id" => ["c1", "c2"],
        "order_approved_at" => ["2018-01-01 10:00:00", "2018-02-01 11:30:00"],
        "order_purchase_timestamp" => ["2018-01-01 09:00:00", "2018-02-01 11:00:00"],
        "price" => [10.0f64, 20.0],
        "product_id" => ["p1", "p2"],
        "product_category_name_english" => ["toys", "auto"],
    }
    .unwrap();

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();

    let (orders, _) = load_orders(&parquet_path, TimestampPolicy::Strict, 100).unwrap();
    assert_eq!(orders.len(), 2);
}

#[test]
fn test_nonexistent_file() {
    let path = std::path::Path::new("/nonexistent/path/to/orders.csv");

    let result = load_orders(path, TimestampPolicy::Strict, 100);

    assert!(
        matches!(result, Err(LoadError::NotFound(_))),
        "Nonexistent file should return NotFound"
    );
}

#[test]
fn test_unsupported_format() {
    let temp_dir = TempDir::new().unwrap();
    let bad_path = temp_dir.path().join("orders.xlsx");
    std::fs::File::create(&bad_path).unwrap();

    let result = load_orders(&bad_path, TimestampPolicy::Strict, 100);

    assert!(result.is_err(), "Unsupported format should return error");
    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("Unsupported"),
        "Error message should mention unsupported format: {}",
        err_msg
    );
}

#[test]
fn test_missing_required_columns() {
    let (_temp_dir, csv_path) = write_csv(&[
        "order_id,customer_id,order_approved_at,price",
        "o1,c1,2018-01-01 00:00:00,10.0",
    ]);

    let result = load_orders(&csv_path, TimestampPolicy::Strict, 100);

    match result {
        Err(LoadError::MissingColumns(missing)) => {
            assert_eq!(
                missing,
                vec![
                    "order_purchase_timestamp".to_string(),
                    "product_id".to_string(),
                    "product_category_name_english".to_string(),
                ]
            );
        }
        other => panic!("Expected MissingColumns, got {:?}", other.map(|(o, _)| o.len())),
    }
}

#[test]
fn test_strict_policy_fails_on_bad_timestamp() {
    let (_temp_dir, csv_path) = write_csv(&[
        CSV_HEADER,
        "o1,c1,delivered,2018-01-01 10:00:00,2018-01-01 09:00:00,10.0,p1,toys",
        "o2,c2,delivered,yesterday,2018-01-02 09:00:00,20.0,p2,toys",
    ]);

    let result = load_orders(&csv_path, TimestampPolicy::Strict, 100);

    match result {
        Err(LoadError::Timestamp(err)) => {
            assert_eq!(err.column, "order_approved_at");
            assert_eq!(err.row, 1);
            assert_eq!(err.value, "yesterday");
        }
        other => panic!("Expected Timestamp error, got {:?}", other.map(|(o, _)| o.len())),
    }
}

#[test]
fn test_strict_policy_fails_on_missing_timestamp() {
    let (_temp_dir, csv_path) = write_csv(&[
        CSV_HEADER,
        "o1,c1,canceled,,2018-01-01 09:00:00,10.0,p1,toys",
    ]);

    let result = load_orders(&csv_path, TimestampPolicy::Strict, 100);

    assert!(matches!(result, Err(LoadError::Timestamp(_))));
}

#[test]
fn test_lenient_policy_drops_bad_records() {
    let (_temp_dir, csv_path) = write_csv(&[
        CSV_HEADER,
        "o1,c1,delivered,2018-01-01 10:00:00,2018-01-01 09:00:00,10.0,p1,toys",
        "o2,c2,canceled,,2018-01-02 09:00:00,20.0,p2,toys",
        "o3,c3,delivered,2018-01-03 10:00:00,garbage,30.0,p3,toys",
        "o4,c4,delivered,2018-01-04 10:00:00,2018-01-04 09:00:00,40.0,p4,toys",
    ]);

    let (orders, report) = load_orders(&csv_path, TimestampPolicy::Lenient, 100).unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(report.rows_read, 4);
    assert_eq!(report.rows_kept, 2);
    assert_eq!(report.dropped.len(), 2);
    assert_eq!(report.dropped[0].row, 1);
    assert_eq!(report.dropped[1].column, "order_purchase_timestamp");
}

#[test]
fn test_non_numeric_price_fails_load() {
    let (_temp_dir, csv_path) = write_csv(&[
        CSV_HEADER,
        "o1,c1,delivered,2018-03-01 10:00:00,2018-03-01 09:00:00,10.0,p1,toys",
        "o2,c2,delivered,2018-03-02 10:00:00,2018-03-02 09:00:00,abc,p2,toys",
    ]);

    let result = load_orders(&csv_path, TimestampPolicy::Strict, 100);

    assert!(
        matches!(result, Err(LoadError::Polars(_))),
        "Non-numeric price should fail the load"
    );
}

#[test]
fn test_missing_price_loads_as_null() {
    let (_temp_dir, csv_path) = write_csv(&[
        CSV_HEADER,
        "o1,c1,delivered,2018-03-01 10:00:00,2018-03-01 09:00:00,10.0,p1,toys",
        "o2,c2,delivered,2018-03-02 10:00:00,2018-03-02 09:00:00,,p2,toys",
    ]);

    let (orders, _) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders.frame().column("price").unwrap().null_count(), 1);
}

#[test]
fn test_header_only_file_loads_empty() {
    let (_temp_dir, csv_path) = write_csv(&[CSV_HEADER]);

    let (orders, report) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();

    assert!(orders.is_empty());
    assert_eq!(report.rows_read, 0);
}

#[test]
fn test_numeric_identifiers_are_read_as_text() {
    let (_temp_dir, csv_path) = write_csv(&[
        CSV_HEADER,
        "1,42,delivered,2018-01-01 10:00:00,2018-01-01 09:00:00,10,7,toys",
    ]);

    let (orders, _) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();
    let schema = orders.frame().schema();

    assert_eq!(schema.get("order_id"), Some(&DataType::String));
    assert_eq!(schema.get("customer_id"), Some(&DataType::String));
    assert_eq!(schema.get("price"), Some(&DataType::Float64));
}

#[test]
fn test_from_records_matches_loaded_file() {
    let records = create_sample_records();
    let (_temp_dir, csv_path) = write_orders_csv(&records);

    let (loaded, _) = load_orders(&csv_path, TimestampPolicy::Strict, 100).unwrap();
    let built = Orders::from_records(&records).unwrap();

    assert!(loaded.frame().equals(built.frame()));
}

#[test]
fn test_get_column_names_csv() {
    let (_temp_dir, csv_path) = write_orders_csv(&create_sample_records());

    let columns = get_column_names(&csv_path).unwrap();

    assert_eq!(columns.len(), 8);
    assert!(columns.contains(&"order_status".to_string()));
    assert!(columns.contains(&"product_category_name_english".to_string()));
}

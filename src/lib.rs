//! Orderlens: E-commerce Order Analytics Library
//!
//! Loads an order dataset once and derives the dashboard tables:
//! monthly order counts, monthly spend, product popularity by category,
//! and RFM (recency / frequency / monetary) values per customer.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;

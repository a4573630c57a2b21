//! Report module - headline metrics, ranked views, console output and export

pub mod export;
pub mod metrics;
pub mod summary;
pub mod views;

pub use export::*;
pub use metrics::*;
pub use summary::*;
pub use views::*;

//! Orderlens: E-commerce Order Dashboard
//!
//! Loads the order dataset, derives the four dashboard tables and shows
//! them in an interactive terminal view, as printed tables, or exports them.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use orderlens::cli::{run_dashboard, Cli, Commands};
use orderlens::pipeline::Dashboard;
use orderlens::report::{export_tables, print_dashboard, ExportMetadata};
use orderlens::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config, print_info,
    print_success, print_warning, warn_on_error,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.dashboard_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &config);

    // Step 1: Load dataset
    let step_start = Instant::now();
    let spinner = create_spinner("Loading orders...");
    let (dashboard, load_report) = warn_on_error(
        &spinner,
        Dashboard::open(&cli.input, config.clone()),
        "Failed to load orders",
    )
    .with_context(|| format!("Cannot load {}", cli.input.display()))?;
    finish_with_success(
        &spinner,
        &format!(
            "Loaded {} orders in {:.2?}",
            load_report.rows_kept,
            step_start.elapsed()
        ),
    );

    if !load_report.dropped.is_empty() {
        print_warning(&format!(
            "Dropped {} of {} record(s) with unparseable timestamps",
            load_report.dropped.len(),
            load_report.rows_read
        ));
        if let Some(first) = load_report.dropped.first() {
            println!("      {}", style(first).dim());
        }
    }
    if dashboard.orders().is_empty() {
        print_info("Dataset is empty; all tables will be empty");
    }

    // Step 2: Derive tables
    let step_start = Instant::now();
    let spinner = create_spinner("Deriving dashboard tables...");
    let tables = warn_on_error(
        &spinner,
        dashboard.compute(),
        "Failed to derive dashboard tables",
    )
    .context("Failed to derive dashboard tables")?;
    finish_with_success(
        &spinner,
        &format!(
            "{} months, {} categories, {} customers in {:.2?}",
            tables.monthly_orders.len(),
            tables.products.len(),
            tables.rfm.len(),
            step_start.elapsed()
        ),
    );

    if !tables.rfm_excluded.is_empty() {
        print_warning(&format!(
            "Left {} customer(s) out of RFM: last purchase after {}",
            tables.rfm_excluded.len(),
            config.rfm.reference.format("%Y-%m-%d")
        ));
    }

    // Step 3: Present
    match &cli.command {
        Some(Commands::Export { output }) => {
            let metadata = ExportMetadata::new(&cli.input, &config, dashboard.orders().len());
            export_tables(&tables, &metadata, output)?;
            print_success(&format!("Wrote 4 tables to {}", output.display()));
            print_completion("Orderlens export complete!");
        }
        None if cli.no_tui => {
            print_dashboard(&tables, cli.top);
            print_completion("Orderlens report complete!");
        }
        None => run_dashboard(&tables, cli.top)?,
    }

    Ok(())
}

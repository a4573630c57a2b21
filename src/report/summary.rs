//! Dashboard summary printed as tables for non-interactive runs

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::DashboardTables;
use crate::report::{
    bottom_products, format_amount, top_customers, top_products, DashboardMetrics, RfmMeasure,
};

/// Print every section of the dashboard as styled tables.
pub fn print_dashboard(tables: &DashboardTables, top_n: usize) {
    let metrics = DashboardMetrics::from_tables(tables);

    print_monthly_orders(tables, &metrics);
    print_monthly_spend(tables, &metrics);
    print_products(tables, &metrics, top_n);
    print_rfm(tables, top_n);
}

fn print_monthly_orders(tables: &DashboardTables, metrics: &DashboardMetrics) {
    print_section("📈", "MONTHLY ORDERS");

    let highlight = |h: &Option<crate::report::MonthHighlight>| match h {
        Some(h) => format!("{} : {}", h.month_name, style(h.order_count).yellow().bold()),
        None => "n/a".to_string(),
    };
    println!("      Busiest month:  {}", highlight(&metrics.busiest_month));
    println!("      Quietest month: {}", highlight(&metrics.quietest_month));
    println!();

    let mut table = new_table(&["Month", "Orders"]);
    for row in &tables.monthly_orders {
        table.add_row(vec![
            Cell::new(&row.month_name),
            Cell::new(row.order_count).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

fn print_monthly_spend(tables: &DashboardTables, metrics: &DashboardMetrics) {
    print_section("💰", "MONTHLY SPEND");

    let spend = metrics.spend;
    println!(
        "      Total spend: {}   Average spend: {}",
        style(format_amount(spend.map(|s| s.sum))).yellow().bold(),
        style(format_amount(spend.map(|s| s.mean))).yellow().bold()
    );
    println!();

    let mut table = new_table(&["Month", "Total spend"]);
    for row in &tables.monthly_spend {
        let color = match spend {
            Some(s) if row.total_spend == s.max => Color::Green,
            Some(s) if row.total_spend == s.min => Color::Red,
            _ => Color::White,
        };
        table.add_row(vec![
            Cell::new(&row.month_name),
            Cell::new(format!("{:.2}", row.total_spend))
                .fg(color)
                .set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

fn print_products(tables: &DashboardTables, metrics: &DashboardMetrics, top_n: usize) {
    print_section("🛒", "PRODUCT CATEGORIES");

    let counts = metrics.product_counts;
    println!(
        "      Most sold: {}   Least sold: {}",
        style(counts.map_or("n/a".to_string(), |s| format!("{}", s.max as u64))).yellow().bold(),
        style(counts.map_or("n/a".to_string(), |s| format!("{}", s.min as u64))).yellow().bold()
    );

    for (title, rows) in [
        ("Most purchased", top_products(&tables.products, top_n)),
        ("Least purchased", bottom_products(&tables.products, top_n)),
    ] {
        println!();
        println!("      {}", style(title).yellow());
        let mut table = new_table(&["Category", "Products"]);
        for row in &rows {
            table.add_row(vec![
                Cell::new(&row.product_category),
                Cell::new(row.product_count).set_alignment(CellAlignment::Right),
            ]);
        }
        print_indented(&table);
    }
}

fn print_rfm(tables: &DashboardTables, top_n: usize) {
    print_section("👥", "RFM");

    for measure in RfmMeasure::ALL {
        println!();
        println!("      {}", style(measure.title()).yellow());
        let mut table = new_table(&["Customer", "Recency", "Frequency", "Monetary"]);
        for row in top_customers(&tables.rfm, measure, top_n) {
            let cell = |m: RfmMeasure, text: String| {
                let c = Cell::new(text).set_alignment(CellAlignment::Right);
                if m == measure {
                    c.add_attribute(Attribute::Bold).fg(Color::Cyan)
                } else {
                    c
                }
            };
            table.add_row(vec![
                Cell::new(&row.customer_id),
                cell(RfmMeasure::Recency, row.recency_days.to_string()),
                cell(RfmMeasure::Frequency, row.frequency.to_string()),
                cell(RfmMeasure::Monetary, format!("{:.2}", row.monetary)),
            ]);
        }
        print_indented(&table);
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

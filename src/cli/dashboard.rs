//! Interactive terminal dashboard using ratatui
//!
//! Four tabs mirror the report sections: monthly orders (line chart),
//! monthly spend (bar chart with min/max markers), product categories
//! (most and least purchased) and RFM (one sub-tab per measure).

use std::io::{self, stdout};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs,
    },
};

use crate::pipeline::{DashboardTables, ProductPopularity};
use crate::report::{
    bottom_products, format_amount, top_customers, top_products, DashboardMetrics, RfmMeasure,
};

const HIGHLIGHT: Color = Color::Rgb(0xFF, 0x99, 0x99);
const MUTED: Color = Color::Rgb(0xB2, 0xB2, 0xB2);

/// Dashboard sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Orders,
    Spend,
    Products,
    Rfm,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Orders, Tab::Spend, Tab::Products, Tab::Rfm];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Orders => "Monthly Orders",
            Tab::Spend => "Monthly Spend",
            Tab::Products => "Products",
            Tab::Rfm => "RFM",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Navigation state of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardState {
    pub tab: Tab,
    pub measure: RfmMeasure,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            tab: Tab::Orders,
            measure: RfmMeasure::Recency,
        }
    }
}

impl DashboardState {
    /// Apply a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Left | KeyCode::BackTab => self.tab = self.tab.previous(),
            KeyCode::Char(c @ '1'..='3') => {
                self.tab = Tab::Rfm;
                self.measure = RfmMeasure::ALL[(c as u8 - b'1') as usize];
            }
            _ => {}
        }
        false
    }
}

/// Run the interactive dashboard until the user quits
pub fn run_dashboard(tables: &DashboardTables, top_n: usize) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_dashboard_loop(&mut terminal, tables, top_n);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_dashboard_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tables: &DashboardTables,
    top_n: usize,
) -> Result<()> {
    let metrics = DashboardMetrics::from_tables(tables);
    let mut state = DashboardState::default();

    loop {
        terminal.draw(|frame| draw_dashboard(frame, tables, &metrics, &state, top_n))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if state.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

/// Draw one frame of the dashboard
pub fn draw_dashboard(
    frame: &mut Frame,
    tables: &DashboardTables,
    metrics: &DashboardMetrics,
    state: &DashboardState,
    top_n: usize,
) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Orderlens ")
                .title_style(Style::default().fg(Color::Cyan).bold()),
        )
        .select(state.tab.index())
        .highlight_style(Style::default().fg(HIGHLIGHT).bold());
    frame.render_widget(tabs, chunks[0]);

    frame.render_widget(headline(tables, metrics, state), chunks[1]);

    match state.tab {
        Tab::Orders => draw_orders(frame, tables, chunks[2]),
        Tab::Spend => draw_spend(frame, tables, metrics, chunks[2]),
        Tab::Products => draw_products(frame, tables, top_n, chunks[2]),
        Tab::Rfm => draw_rfm(frame, tables, state.measure, top_n, chunks[2]),
    }

    let help = Paragraph::new(Line::from(vec![
        Span::styled(" ←/→ ", Style::default().fg(Color::Cyan)),
        Span::raw("switch tab  "),
        Span::styled("1-3 ", Style::default().fg(Color::Cyan)),
        Span::raw("RFM measure  "),
        Span::styled("q ", Style::default().fg(Color::Cyan)),
        Span::raw("quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}

fn headline<'a>(
    tables: &DashboardTables,
    metrics: &DashboardMetrics,
    state: &DashboardState,
) -> Paragraph<'a> {
    let value = |s: String| Span::styled(s, Style::default().fg(Color::Yellow).bold());

    let line = match state.tab {
        Tab::Orders => {
            let month = |h: &Option<crate::report::MonthHighlight>| {
                h.as_ref()
                    .map(|h| format!("{} : {}", h.month_name, h.order_count))
                    .unwrap_or_else(|| "n/a".to_string())
            };
            Line::from(vec![
                Span::raw("Highest orders in "),
                value(month(&metrics.busiest_month)),
                Span::raw("   Lowest orders in "),
                value(month(&metrics.quietest_month)),
            ])
        }
        Tab::Spend => Line::from(vec![
            Span::raw("Total spend: "),
            value(format_amount(metrics.spend.map(|s| s.sum))),
            Span::raw("   Average spend: "),
            value(format_amount(metrics.spend.map(|s| s.mean))),
            Span::raw("   Max: "),
            value(format_amount(metrics.spend.map(|s| s.max))),
            Span::raw("   Min: "),
            value(format_amount(metrics.spend.map(|s| s.min))),
        ]),
        Tab::Products => {
            let count = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{}", v as u64));
            Line::from(vec![
                Span::raw("Most sold: "),
                value(count(metrics.product_counts.map(|s| s.max))),
                Span::raw("   Least sold: "),
                value(count(metrics.product_counts.map(|s| s.min))),
            ])
        }
        Tab::Rfm => Line::from(
            RfmMeasure::ALL
                .iter()
                .enumerate()
                .flat_map(|(i, m)| {
                    let style = if *m == state.measure {
                        Style::default().fg(HIGHLIGHT).bold()
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    vec![
                        Span::styled(format!("[{}] {}", i + 1, m), style),
                        Span::raw("   "),
                    ]
                })
                .chain(std::iter::once(Span::raw(format!(
                    "{} customers",
                    tables.rfm.len()
                ))))
                .collect::<Vec<_>>(),
        ),
    };

    Paragraph::new(line).block(Block::default().borders(Borders::ALL))
}

fn section_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(Color::Cyan).bold())
}

fn draw_orders(frame: &mut Frame, tables: &DashboardTables, area: Rect) {
    let rows = &tables.monthly_orders;
    let points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.order_count as f64))
        .collect();
    let max_y = rows.iter().map(|r| r.order_count).max().unwrap_or(0) as f64;
    let max_x = rows.len().saturating_sub(1).max(1) as f64;

    let dataset = Dataset::default()
        .name("orders")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(HIGHLIGHT))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(section_block("Orders per month"))
        .x_axis(
            Axis::default()
                .bounds([0.0, max_x])
                .labels(
                    rows.iter()
                        .map(|r| Span::raw(short_month(&r.month_name)))
                        .collect::<Vec<_>>(),
                ),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, (max_y * 1.1).max(1.0)])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", max_y / 2.0)),
                    Span::raw(format!("{:.0}", max_y)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn draw_spend(frame: &mut Frame, tables: &DashboardTables, metrics: &DashboardMetrics, area: Rect) {
    let bars: Vec<Bar> = tables
        .monthly_spend
        .iter()
        .map(|row| {
            let color = match metrics.spend {
                Some(s) if row.total_spend == s.max => Color::Rgb(0xFF, 0xA5, 0x00),
                Some(s) if row.total_spend == s.min => Color::Blue,
                _ => HIGHLIGHT,
            };
            Bar::default()
                .value(row.total_spend.round().max(0.0) as u64)
                .text_value(format!("{:.0}", row.total_spend))
                .label(Line::from(short_month(&row.month_name)))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(section_block("Total spend per month (orange = max, blue = min)"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area.width, bars.len()))
        .bar_gap(1);

    frame.render_widget(chart, area);
}

fn draw_products(frame: &mut Frame, tables: &DashboardTables, top_n: usize, area: Rect) {
    let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let most = top_products(&tables.products, top_n);
    let least = bottom_products(&tables.products, top_n);

    frame.render_widget(product_chart("Most purchased", &most), halves[0]);
    frame.render_widget(product_chart("Least purchased", &least), halves[1]);
}

fn product_chart<'a>(title: &'a str, rows: &[ProductPopularity]) -> BarChart<'a> {
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Bar::default()
                .value(row.product_count)
                .label(Line::from(row.product_category.clone()))
                .style(Style::default().fg(if i == 0 { HIGHLIGHT } else { MUTED }))
        })
        .collect();

    BarChart::default()
        .block(section_block(title))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1)
}

fn draw_rfm(
    frame: &mut Frame,
    tables: &DashboardTables,
    measure: RfmMeasure,
    top_n: usize,
    area: Rect,
) {
    let bars: Vec<Bar> = top_customers(&tables.rfm, measure, top_n)
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let value = measure.value(row);
            let text = match measure {
                RfmMeasure::Monetary => format!("{:.2}", value),
                RfmMeasure::Recency | RfmMeasure::Frequency => format!("{:.0}", value),
            };
            Bar::default()
                .value(value.round().max(0.0) as u64)
                .text_value(text)
                .label(Line::from(short_id(&row.customer_id)))
                .style(Style::default().fg(if i == 0 { HIGHLIGHT } else { MUTED }))
        })
        .collect();

    let chart = BarChart::default()
        .block(section_block(measure.title()))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area.width, bars.len()))
        .bar_gap(2);

    frame.render_widget(chart, area);
}

fn bar_width(area_width: u16, bars: usize) -> u16 {
    if bars == 0 {
        return 1;
    }
    let per_bar = area_width.saturating_sub(2) / bars as u16;
    per_bar.saturating_sub(1).clamp(1, 12)
}

fn short_month(label: &str) -> String {
    let mut parts = label.split_whitespace();
    let month: String = parts.next().unwrap_or("").chars().take(3).collect();
    match parts.next() {
        Some(year) => format!("{} {}", month, &year[year.len().saturating_sub(2)..]),
        None => month,
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Rfm.next(), Tab::Orders);
        assert_eq!(Tab::Orders.previous(), Tab::Rfm);
        assert_eq!(Tab::Spend.next(), Tab::Products);
    }

    #[test]
    fn test_handle_key_navigation_and_quit() {
        let mut state = DashboardState::default();
        assert!(!state.handle_key(KeyCode::Right));
        assert_eq!(state.tab, Tab::Spend);
        assert!(!state.handle_key(KeyCode::Left));
        assert_eq!(state.tab, Tab::Orders);

        assert!(!state.handle_key(KeyCode::Char('3')));
        assert_eq!(state.tab, Tab::Rfm);
        assert_eq!(state.measure, RfmMeasure::Monetary);

        assert!(state.handle_key(KeyCode::Char('q')));
        assert!(state.handle_key(KeyCode::Esc));
    }

    #[test]
    fn test_short_labels() {
        assert_eq!(short_month("September"), "Sep");
        assert_eq!(short_month("March 2018"), "Mar 18");
        assert_eq!(short_id("0a1b2c3d4e5f"), "0a1b2c3d");
    }

    #[test]
    fn test_bar_width_bounds() {
        assert_eq!(bar_width(100, 0), 1);
        assert_eq!(bar_width(10, 12), 1);
        assert_eq!(bar_width(200, 5), 12);
    }
}

//! Chart inputs for dashboard front-ends
//!
//! Charts are described, not drawn: each [`ChartSpec`] carries the series a
//! plotting library needs. [`render_text`] draws bar-style charts for the
//! terminal report.

use serde::Serialize;

use crate::cost::{CostEfficiency, SavingsOpportunity};
use crate::inventory::ProductSummary;
use crate::metrics::{
    GroupSummary, MethodPerformance, MonthlyTrend, PartnerPerformance, StatusSummaryRow,
    WarehousePerformance,
};
use crate::risk::{RiskHeatmap, PARTNER_DELAY_TARGET};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Heatmap,
    Donut,
    Line,
    Bubble,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Point {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl Point {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Threshold {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
}

impl ChartSpec {
    fn new(id: &str, title: &str, kind: ChartKind, x_label: &str, y_label: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            threshold: None,
        }
    }

    fn with_series(mut self, name: &str, points: Vec<Point>) -> Self {
        self.series.push(Series {
            name: name.to_string(),
            points,
        });
        self
    }

    fn with_threshold(mut self, value: f64, label: &str) -> Self {
        self.threshold = Some(Threshold {
            value,
            label: label.to_string(),
        });
        self
    }
}

// ============================================================================
// Risk
// ============================================================================

fn partner_points(
    partners: &[PartnerPerformance],
    pick: impl Fn(&PartnerPerformance) -> f64,
) -> Vec<Point> {
    partners
        .iter()
        .map(|p| Point::new(p.partner.clone(), pick(p)))
        .collect()
}

pub fn partner_status_mix(partners: &[PartnerPerformance]) -> ChartSpec {
    ChartSpec::new(
        "partner_status_mix",
        "Logistics Partner Performance Comparison",
        ChartKind::StackedBar,
        "Logistics Partner",
        "Percentage of Orders",
    )
    .with_series("Delivered", partner_points(partners, |p| p.delivery_rate))
    .with_series("In Transit", partner_points(partners, |p| p.in_transit_rate))
    .with_series("Pending", partner_points(partners, |p| p.pending_rate))
    .with_series("Delayed", partner_points(partners, |p| p.delayed_status_rate))
}

pub fn partner_delay_rates(partners: &[PartnerPerformance]) -> ChartSpec {
    ChartSpec::new(
        "partner_delay_rates",
        "Logistics Partner Delay Rates",
        ChartKind::Bar,
        "Logistics Partner",
        "Delay Rate (%)",
    )
    .with_series("Delay Rate %", partner_points(partners, |p| p.delay_rate))
    .with_threshold(PARTNER_DELAY_TARGET, "Target: <20%")
}

/// One series per supplier row, one point per partner column
pub fn risk_heatmap(heatmap: &RiskHeatmap) -> ChartSpec {
    let mut chart = ChartSpec::new(
        "risk_heatmap",
        "Risk Heatmap: Delay Rate by Supplier-Logistics Partner",
        ChartKind::Heatmap,
        "Logistics Partner",
        "Supplier",
    );
    for (supplier, row) in heatmap.suppliers.iter().zip(&heatmap.cells) {
        let points = heatmap
            .partners
            .iter()
            .zip(row)
            .map(|(partner, cell)| Point::new(partner.clone(), cell.delay_rate))
            .collect();
        chart = chart.with_series(supplier, points);
    }
    chart
}

pub fn cost_by_status(rows: &[StatusSummaryRow]) -> ChartSpec {
    ChartSpec::new(
        "cost_by_status",
        "Cost Distribution by Delivery Status",
        ChartKind::Donut,
        "Delivery Status",
        "Total Cost ($)",
    )
    .with_series(
        "Total Cost",
        rows.iter()
            .map(|r| Point::new(r.label.clone(), r.total_cost))
            .collect(),
    )
}

// ============================================================================
// Performance
// ============================================================================

pub fn performance_over_time(trends: &[MonthlyTrend]) -> ChartSpec {
    ChartSpec::new(
        "performance_over_time",
        "Delivery Performance Over Time",
        ChartKind::Line,
        "Month",
        "Rate (%)",
    )
    .with_series(
        "Delivered %",
        trends
            .iter()
            .map(|t| Point::new(t.month.clone(), t.delivered_rate))
            .collect(),
    )
    .with_series(
        "Delayed %",
        trends
            .iter()
            .map(|t| Point::new(t.month.clone(), t.delay_rate))
            .collect(),
    )
}

pub fn delivery_volume(trends: &[MonthlyTrend]) -> ChartSpec {
    ChartSpec::new(
        "delivery_volume",
        "Delivery Volume Trends",
        ChartKind::Bar,
        "Month",
        "Orders",
    )
    .with_series(
        "Orders",
        trends
            .iter()
            .map(|t| Point::new(t.month.clone(), t.orders as f64))
            .collect(),
    )
}

pub fn shipping_methods(methods: &[MethodPerformance]) -> ChartSpec {
    ChartSpec::new(
        "shipping_methods",
        "Shipping Method Performance Analysis",
        ChartKind::Bar,
        "Shipping Method",
        "Delay Rate (%)",
    )
    .with_series(
        "Delay Rate %",
        methods
            .iter()
            .map(|m| Point::new(m.method.clone(), m.delay_rate))
            .collect(),
    )
    .with_series(
        "Avg Cost",
        methods
            .iter()
            .map(|m| Point::new(m.method.clone(), m.avg_cost))
            .collect(),
    )
}

/// Bubble size is total cost, value is order count
pub fn warehouses(warehouses: &[WarehousePerformance]) -> ChartSpec {
    ChartSpec::new(
        "warehouses",
        "Warehouse Performance Analysis",
        ChartKind::Bubble,
        "Warehouse Location",
        "Number of Orders",
    )
    .with_series(
        "Warehouses",
        warehouses
            .iter()
            .map(|w| Point {
                label: w.warehouse.clone(),
                value: w.orders as f64,
                size: Some(w.total_cost),
            })
            .collect(),
    )
    .with_series(
        "Delay Rate %",
        warehouses
            .iter()
            .map(|w| Point::new(w.warehouse.clone(), w.delay_rate))
            .collect(),
    )
}

// ============================================================================
// Inventory and cost
// ============================================================================

pub fn inventory_by_product(products: &[ProductSummary]) -> ChartSpec {
    ChartSpec::new(
        "inventory_by_product",
        "Inventory Value by Product",
        ChartKind::Bar,
        "Product",
        "Value ($)",
    )
    .with_series(
        "Value",
        products
            .iter()
            .map(|p| Point::new(p.product.clone(), p.total_value))
            .collect(),
    )
}

pub fn product_turnover(products: &[ProductSummary]) -> ChartSpec {
    ChartSpec::new(
        "product_turnover",
        "Inventory Turnover by Product",
        ChartKind::Bar,
        "Product",
        "Turnover (%)",
    )
    .with_series(
        "Turnover %",
        products
            .iter()
            .map(|p| Point::new(p.product.clone(), p.turnover_rate))
            .collect(),
    )
}

pub fn cost_breakdown(groups: &[GroupSummary], dimension: &str) -> ChartSpec {
    ChartSpec::new(
        "cost_breakdown",
        &format!("Cost Breakdown by {}", dimension),
        ChartKind::Donut,
        dimension,
        "Total Cost ($)",
    )
    .with_series(
        "Total Cost",
        groups
            .iter()
            .map(|g| Point::new(g.key.clone(), g.total_cost))
            .collect(),
    )
}

pub fn cost_efficiency(matrix: &[CostEfficiency]) -> ChartSpec {
    ChartSpec::new(
        "cost_efficiency",
        "Supplier Cost Efficiency Matrix",
        ChartKind::Bubble,
        "Average Unit Price ($)",
        "Delivery Rate (%)",
    )
    .with_series(
        "Suppliers",
        matrix
            .iter()
            .map(|c| Point {
                label: c.supplier.clone(),
                value: c.delivery_rate,
                size: Some(c.total_cost),
            })
            .collect(),
    )
}

pub fn savings(opportunities: &[SavingsOpportunity]) -> ChartSpec {
    ChartSpec::new(
        "savings",
        "Cost Savings Opportunities",
        ChartKind::Bar,
        "Product",
        "Potential Savings ($)",
    )
    .with_series(
        "Savings",
        opportunities
            .iter()
            .map(|o| Point::new(o.product.clone(), o.potential_savings))
            .collect(),
    )
}

pub fn partner_unit_cost(partners: &[PartnerPerformance]) -> ChartSpec {
    ChartSpec::new(
        "partner_unit_cost",
        "Logistics Cost Efficiency",
        ChartKind::Bar,
        "Logistics Partner",
        "Cost per Unit ($)",
    )
    .with_series("Cost per Unit", partner_points(partners, |p| p.cost_per_unit))
}

// ============================================================================
// Text rendering
// ============================================================================

const BAR_WIDTH: f64 = 40.0;

/// Draw every series as horizontal `#` bars scaled to the series maximum
pub fn render_text(chart: &ChartSpec) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n{}\n", chart.title, "-".repeat(chart.title.len())));

    let label_width = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.label.chars().count()))
        .max()
        .unwrap_or(0)
        .clamp(8, 28);

    for series in &chart.series {
        if chart.series.len() > 1 {
            out.push_str(&format!("  [{}]\n", series.name));
        }
        let max = series
            .points
            .iter()
            .map(|p| p.value.abs())
            .fold(0.0_f64, f64::max);
        for point in &series.points {
            let bar_len = if max > 0.0 {
                (point.value.abs() / max * BAR_WIDTH).round() as usize
            } else {
                0
            };
            let label: String = point.label.chars().take(label_width).collect();
            out.push_str(&format!(
                "  {:<width$} {:>12.1} {}\n",
                label,
                point.value,
                "#".repeat(bar_len),
                width = label_width
            ));
        }
    }

    if let Some(threshold) = &chart.threshold {
        out.push_str(&format!("  ({} at {:.1})\n", threshold.label, threshold.value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_scaled_bars_and_threshold() {
        let chart = ChartSpec::new("t", "Delays", ChartKind::Bar, "x", "y")
            .with_series(
                "Delay",
                vec![Point::new("Slow", 40.0), Point::new("Fast", 10.0)],
            )
            .with_threshold(20.0, "Target");
        let text = render_text(&chart);
        let slow = text.lines().find(|l| l.contains("Slow")).unwrap();
        let fast = text.lines().find(|l| l.contains("Fast")).unwrap();
        assert!(slow.ends_with(&format!(" {}", "#".repeat(40))));
        assert!(fast.ends_with(&format!(" {}", "#".repeat(10))));
        assert!(text.contains("(Target at 20.0)"));
    }

    #[test]
    fn empty_series_renders_title_only() {
        let chart = ChartSpec::new("t", "Nothing", ChartKind::Bar, "x", "y").with_series("s", vec![]);
        assert_eq!(render_text(&chart), "Nothing\n-------\n");
    }
}

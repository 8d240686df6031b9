//! Dashboard views assembled from one set of aggregates
//!
//! [`DashboardAggregates`] is computed once per dataset version; every view
//! is a cheap projection of it plus the charts that go with it.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::charts::{self, ChartSpec};
use crate::cost::{self, CostEfficiency, CostKpis, SavingsOpportunity};
use crate::insights::Narrative;
use crate::inventory::{self, AbcBreakdown, AbcPolicy, InventoryKpis, ProductSummary};
use crate::metrics::{
    self, GroupSummary, MethodPerformance, MonthlyTrend, OverviewMetrics, PartnerPerformance,
    StatusSummaryRow, SupplierPerformance, WarehousePerformance,
};
use crate::models::{Dataset, GroupKey};
use crate::risk::{self, RiskAssessment, RiskHeatmap};

/// Suppliers shown on the overview
const OVERVIEW_TOP_SUPPLIERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Overview,
    Risk,
    Performance,
    Inventory,
    Cost,
    AiInsights,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Overview,
        View::Risk,
        View::Performance,
        View::Inventory,
        View::Cost,
        View::AiInsights,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Risk => "Risk Analysis",
            View::Performance => "Performance Analytics",
            View::Inventory => "Inventory Management",
            View::Cost => "Cost Optimization",
            View::AiInsights => "AI Insights",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Risk => "risk",
            View::Performance => "performance",
            View::Inventory => "inventory",
            View::Cost => "cost",
            View::AiInsights => "ai_insights",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "overview" => Ok(View::Overview),
            "risk" => Ok(View::Risk),
            "performance" => Ok(View::Performance),
            "inventory" => Ok(View::Inventory),
            "cost" => Ok(View::Cost),
            "ai_insights" | "insights" | "ai" => Ok(View::AiInsights),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

// ============================================================================
// Aggregates
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardAggregates {
    pub overview: OverviewMetrics,
    pub suppliers: Vec<SupplierPerformance>,
    pub partners: Vec<PartnerPerformance>,
    pub risk: RiskAssessment,
    pub heatmap: RiskHeatmap,
    pub status_summary: Vec<StatusSummaryRow>,
    pub methods: Vec<MethodPerformance>,
    pub monthly: Vec<MonthlyTrend>,
    pub warehouses: Vec<WarehousePerformance>,
    pub orders_needing_attention: usize,
    pub products: Vec<ProductSummary>,
    pub abc: Vec<AbcBreakdown>,
    pub inventory: InventoryKpis,
    pub cost: CostKpis,
    pub supplier_costs: Vec<GroupSummary>,
    pub product_costs: Vec<GroupSummary>,
    pub efficiency: Vec<CostEfficiency>,
    pub savings: Vec<SavingsOpportunity>,
    pub cost_recommendations: Vec<String>,
}

impl DashboardAggregates {
    pub fn compute(dataset: &Dataset, as_of: NaiveDate, policy: &AbcPolicy) -> Self {
        let shipments = dataset.shipments();
        let products = inventory::abc_classification(shipments, policy);
        let abc = inventory::abc_breakdown(&products);

        Self {
            overview: metrics::overview(shipments, as_of),
            suppliers: metrics::supplier_performance(shipments),
            partners: metrics::partner_performance(shipments),
            risk: risk::assess(shipments),
            heatmap: risk::risk_heatmap(shipments),
            status_summary: metrics::delivery_status_summary(shipments),
            methods: metrics::shipping_method_analysis(shipments),
            monthly: metrics::monthly_trends(shipments),
            warehouses: metrics::warehouse_performance(shipments),
            orders_needing_attention: metrics::orders_needing_attention(shipments),
            products,
            abc,
            inventory: inventory::inventory_kpis(shipments),
            cost: cost::cost_kpis(shipments),
            supplier_costs: cost::cost_breakdown(shipments, GroupKey::Supplier),
            product_costs: cost::cost_breakdown(shipments, GroupKey::Product),
            efficiency: cost::cost_efficiency_matrix(shipments),
            savings: cost::savings_opportunities(shipments),
            cost_recommendations: cost::recommendations(shipments),
        }
    }
}

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverviewView {
    pub metrics: OverviewMetrics,
    pub top_suppliers: Vec<SupplierPerformance>,
    pub partners: Vec<PartnerPerformance>,
    pub findings: Vec<String>,
    pub charts: Vec<ChartSpec>,
}

impl OverviewView {
    pub fn from_aggregates(aggs: &DashboardAggregates) -> Self {
        Self {
            metrics: aggs.overview.clone(),
            top_suppliers: aggs
                .suppliers
                .iter()
                .take(OVERVIEW_TOP_SUPPLIERS)
                .cloned()
                .collect(),
            partners: aggs.partners.clone(),
            findings: aggs.risk.findings.clone(),
            charts: vec![
                charts::partner_status_mix(&aggs.partners),
                charts::cost_by_status(&aggs.status_summary),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskView {
    pub assessment: RiskAssessment,
    pub heatmap: RiskHeatmap,
    pub immediate_actions: Vec<String>,
    pub strategic_actions: Vec<String>,
    pub charts: Vec<ChartSpec>,
}

impl RiskView {
    pub fn from_aggregates(aggs: &DashboardAggregates) -> Self {
        let (immediate, strategic) = risk::recommended_actions();
        Self {
            assessment: aggs.risk.clone(),
            heatmap: aggs.heatmap.clone(),
            immediate_actions: immediate.into_iter().map(String::from).collect(),
            strategic_actions: strategic.into_iter().map(String::from).collect(),
            charts: vec![
                charts::partner_delay_rates(&aggs.partners),
                charts::risk_heatmap(&aggs.heatmap),
                charts::cost_by_status(&aggs.status_summary),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerformanceView {
    pub delivery_success_rate: f64,
    pub avg_order_cost: f64,
    pub best_shipping_method: Option<String>,
    pub orders_needing_attention: usize,
    pub total_orders: usize,
    pub status_summary: Vec<StatusSummaryRow>,
    pub shipping_methods: Vec<MethodPerformance>,
    pub warehouses: Vec<WarehousePerformance>,
    pub monthly: Vec<MonthlyTrend>,
    pub charts: Vec<ChartSpec>,
}

impl PerformanceView {
    pub fn from_aggregates(aggs: &DashboardAggregates) -> Self {
        let overview = &aggs.overview;
        Self {
            delivery_success_rate: overview.completed_delivery_rate,
            avg_order_cost: metrics::mean(overview.total_cost, overview.total_orders),
            best_shipping_method: metrics::best_shipping_method(&aggs.methods)
                .map(|m| m.method.clone()),
            orders_needing_attention: aggs.orders_needing_attention,
            total_orders: overview.total_orders,
            status_summary: aggs.status_summary.clone(),
            shipping_methods: aggs.methods.clone(),
            warehouses: aggs.warehouses.clone(),
            monthly: aggs.monthly.clone(),
            charts: vec![
                charts::performance_over_time(&aggs.monthly),
                charts::delivery_volume(&aggs.monthly),
                charts::shipping_methods(&aggs.methods),
                charts::warehouses(&aggs.warehouses),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryView {
    pub kpis: InventoryKpis,
    pub products: Vec<ProductSummary>,
    pub abc: Vec<AbcBreakdown>,
    pub insights: Vec<String>,
    pub charts: Vec<ChartSpec>,
}

impl InventoryView {
    pub fn from_aggregates(aggs: &DashboardAggregates) -> Self {
        let kpis = &aggs.inventory;
        let mut insights = vec![
            format!("Average unit price: ${:.2}", kpis.avg_unit_price),
            format!(
                "High-value orders: {}/{} ({:.0}%)",
                kpis.high_value_orders, kpis.total_orders, kpis.high_value_rate
            ),
        ];
        if kpis.unique_products > 0 {
            insights.push(format!(
                "Supplier diversity: {:.1} suppliers per product",
                kpis.suppliers_per_product
            ));
        }

        Self {
            kpis: kpis.clone(),
            products: aggs.products.clone(),
            abc: aggs.abc.clone(),
            insights,
            charts: vec![
                charts::inventory_by_product(&aggs.products),
                charts::product_turnover(&aggs.products),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostView {
    pub kpis: CostKpis,
    pub supplier_costs: Vec<GroupSummary>,
    pub product_costs: Vec<GroupSummary>,
    pub efficiency: Vec<CostEfficiency>,
    pub savings: Vec<SavingsOpportunity>,
    pub recommendations: Vec<String>,
    pub charts: Vec<ChartSpec>,
}

impl CostView {
    pub fn from_aggregates(aggs: &DashboardAggregates) -> Self {
        Self {
            kpis: aggs.cost.clone(),
            supplier_costs: aggs.supplier_costs.clone(),
            product_costs: aggs.product_costs.clone(),
            efficiency: aggs.efficiency.clone(),
            savings: aggs.savings.clone(),
            recommendations: aggs.cost_recommendations.clone(),
            charts: vec![
                charts::cost_breakdown(&aggs.supplier_costs, GroupKey::Supplier.label()),
                charts::cost_efficiency(&aggs.efficiency),
                charts::savings(&aggs.savings),
                charts::partner_unit_cost(&aggs.partners),
            ],
        }
    }
}

/// Numeric context shown beside the narrative; identical whether or not
/// the narrative is available
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AiInsightsView {
    pub question: String,
    pub metrics: OverviewMetrics,
    pub risk: RiskAssessment,
    pub cost: CostKpis,
    pub abc: Vec<AbcBreakdown>,
    pub narrative: Narrative,
}

impl AiInsightsView {
    pub fn new(aggs: &DashboardAggregates, question: &str, narrative: Narrative) -> Self {
        Self {
            question: question.to_string(),
            metrics: aggs.overview.clone(),
            risk: aggs.risk.clone(),
            cost: aggs.cost.clone(),
            abc: aggs.abc.clone(),
            narrative,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewPayload {
    Overview(OverviewView),
    Risk(RiskView),
    Performance(PerformanceView),
    Inventory(InventoryView),
    Cost(CostView),
    AiInsights(AiInsightsView),
}

impl ViewPayload {
    /// Every view except AI Insights, which needs a narrative
    pub fn assemble(view: View, aggs: &DashboardAggregates) -> Option<Self> {
        Some(match view {
            View::Overview => ViewPayload::Overview(OverviewView::from_aggregates(aggs)),
            View::Risk => ViewPayload::Risk(RiskView::from_aggregates(aggs)),
            View::Performance => ViewPayload::Performance(PerformanceView::from_aggregates(aggs)),
            View::Inventory => ViewPayload::Inventory(InventoryView::from_aggregates(aggs)),
            View::Cost => ViewPayload::Cost(CostView::from_aggregates(aggs)),
            View::AiInsights => return None,
        })
    }

    pub fn view(&self) -> View {
        match self {
            ViewPayload::Overview(_) => View::Overview,
            ViewPayload::Risk(_) => View::Risk,
            ViewPayload::Performance(_) => View::Performance,
            ViewPayload::Inventory(_) => View::Inventory,
            ViewPayload::Cost(_) => View::Cost,
            ViewPayload::AiInsights(_) => View::AiInsights,
        }
    }

    pub fn charts(&self) -> &[ChartSpec] {
        match self {
            ViewPayload::Overview(v) => &v.charts,
            ViewPayload::Risk(v) => &v.charts,
            ViewPayload::Performance(v) => &v.charts,
            ViewPayload::Inventory(v) => &v.charts,
            ViewPayload::Cost(v) => &v.charts,
            ViewPayload::AiInsights(_) => &[],
        }
    }
}

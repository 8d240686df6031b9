//! Prompt assembly for the narrative insight panel
//!
//! The user prompt carries a compact JSON digest of the dashboard aggregates
//! followed by the question, so the model only reasons over computed figures.

use serde_json::{json, Value};

use crate::metrics::round_to;
use crate::views::DashboardAggregates;

pub const DEFAULT_QUESTION: &str =
    "What are the most important operational risks and cost opportunities in this data, and what should the operations team do first?";

const SYSTEM_PROMPT: &str = "You are a supply-chain operations analyst. \
Use only the figures in the provided summary and do not invent numbers. \
Answer in at most five short bullet points; each names the supplier, \
logistics partner or product concerned and the metric behind it.";

/// Suppliers, partners and products listed in the digest
const DIGEST_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct InsightPrompt {
    pub system: String,
    pub user: String,
}

fn pct(value: f64) -> f64 {
    round_to(value, 1)
}

fn money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Figures the model sees; percentages are 0-100 with one decimal
pub fn digest(aggregates: &DashboardAggregates) -> Value {
    let overview = &aggregates.overview;
    let risk = &aggregates.risk;

    let partners: Vec<Value> = risk
        .partner_delays
        .iter()
        .map(|p| {
            json!({
                "partner": p.partner,
                "shipments": p.shipments,
                "delay_rate_pct": pct(p.delay_rate),
            })
        })
        .collect();

    let suppliers: Vec<Value> = aggregates
        .suppliers
        .iter()
        .take(DIGEST_TOP_N)
        .map(|s| {
            json!({
                "supplier": s.supplier,
                "total_cost": money(s.total_cost),
                "on_time_rate_pct": pct(s.on_time_delivery_rate),
                "performance_score": pct(s.performance_score),
            })
        })
        .collect();

    let supplier_cost_share: Vec<Value> = aggregates
        .supplier_costs
        .iter()
        .take(DIGEST_TOP_N)
        .map(|g| json!({ "supplier": g.key, "cost_share_pct": pct(g.cost_share) }))
        .collect();

    let abc: Vec<Value> = aggregates
        .abc
        .iter()
        .map(|b| {
            json!({
                "class": b.class.label(),
                "products": b.products,
                "value_share_pct": pct(b.value_share),
            })
        })
        .collect();

    let warehouses: Vec<Value> = aggregates
        .warehouses
        .iter()
        .map(|w| {
            json!({
                "warehouse": w.warehouse,
                "turnover_pct": pct(w.turnover_rate),
                "delay_rate_pct": pct(w.delay_rate),
            })
        })
        .collect();

    let savings: Vec<Value> = aggregates
        .savings
        .iter()
        .take(DIGEST_TOP_N)
        .map(|o| json!({ "product": o.product, "potential_savings": money(o.potential_savings) }))
        .collect();

    json!({
        "as_of": overview.as_of.to_string(),
        "orders": overview.total_orders,
        "total_cost": money(overview.total_cost),
        "delivered_pct": pct(overview.completed_delivery_rate),
        "on_track_pct": pct(overview.on_track_rate),
        "overdue_pct": pct(overview.overdue_rate),
        "delayed_pct": pct(risk.delayed_rate),
        "risk_tier": risk.tier.label(),
        "delayed_cost_share_pct": pct(risk.cost_impact),
        "partners": partners,
        "top_suppliers": suppliers,
        "supplier_cost_share": supplier_cost_share,
        "abc_classes": abc,
        "warehouses": warehouses,
        "savings_opportunities": savings,
        "potential_savings_pct": pct(aggregates.cost.savings_percentage),
    })
}

pub fn build_prompt(aggregates: &DashboardAggregates, question: &str) -> InsightPrompt {
    let question = match question.trim() {
        "" => DEFAULT_QUESTION,
        q => q,
    };
    InsightPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Supply-chain summary (JSON):\n{:#}\n\nQuestion: {}",
            digest(aggregates),
            question
        ),
    }
}

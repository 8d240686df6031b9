//! Delivery risk assessment
//!
//! Rule-based findings computed from delay rates. These are deterministic and
//! always available, independent of the narrative insight service.

use serde::Serialize;
use std::cmp::Ordering;

use crate::metrics::{self, group_by, partition, rate, share};
use crate::models::{GroupKey, Shipment};

/// Partner delay rate considered acceptable on the dashboard
pub const PARTNER_DELAY_TARGET: f64 = 20.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_delay_rate(delay_rate: f64) -> Self {
        if delay_rate > 25.0 {
            RiskTier::High
        } else if delay_rate > 15.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW RISK",
            RiskTier::Medium => "MEDIUM RISK",
            RiskTier::High => "HIGH RISK",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PartnerDelay {
    pub partner: String,
    pub shipments: usize,
    pub delayed: usize,
    pub delay_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskAssessment {
    pub total_orders: usize,
    pub delayed_orders: usize,
    pub delayed_rate: f64,
    pub tier: RiskTier,
    pub partner_delays: Vec<PartnerDelay>,
    pub worst_partner: Option<PartnerDelay>,
    pub best_partner: Option<PartnerDelay>,
    pub delayed_cost: f64,
    pub total_cost: f64,
    pub cost_impact: f64,
    pub findings: Vec<String>,
}

/// Partners ordered by delay rate, worst first; ties by name
pub fn partner_delays(shipments: &[Shipment]) -> Vec<PartnerDelay> {
    let mut delays: Vec<PartnerDelay> = group_by(shipments, GroupKey::LogisticsPartner)
        .into_iter()
        .map(|g| PartnerDelay {
            partner: g.key,
            shipments: g.shipments,
            delayed: g.delayed,
            delay_rate: g.delay_rate,
        })
        .collect();
    delays.sort_by(|a, b| {
        b.delay_rate
            .partial_cmp(&a.delay_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.partner.cmp(&b.partner))
    });
    delays
}

pub fn assess(shipments: &[Shipment]) -> RiskAssessment {
    let total_orders = shipments.len();
    let delayed_orders = shipments.iter().filter(|s| s.delayed).count();
    let delayed_rate = rate(delayed_orders, total_orders);
    let tier = RiskTier::from_delay_rate(delayed_rate);

    let partner_delays = partner_delays(shipments);
    let worst_partner = partner_delays.first().cloned();
    let best_partner = partner_delays.last().cloned();

    let delayed_cost: f64 = shipments
        .iter()
        .filter(|s| s.delayed)
        .map(|s| s.total_cost)
        .sum();
    let total_cost = metrics::total_cost(shipments);
    let cost_impact = share(delayed_cost, total_cost);

    let mut findings = Vec::new();
    match tier {
        RiskTier::High => {
            findings.push(format!(
                "{}: {:.1}% of orders are delayed ({} out of {} orders)",
                tier.label(),
                delayed_rate,
                delayed_orders,
                total_orders
            ));
            if let (Some(worst), Some(best)) = (&worst_partner, &best_partner) {
                if worst.partner != best.partner {
                    findings.push(format!(
                        "Root cause: {} has {:.1}% delay rate vs {} at {:.1}%",
                        worst.partner, worst.delay_rate, best.partner, best.delay_rate
                    ));
                    findings.push(format!(
                        "Recommendation: consider shifting volume from {} to {} to reduce delays",
                        worst.partner, best.partner
                    ));
                }
            }
        }
        RiskTier::Medium => findings.push(format!(
            "{}: {:.1}% delay rate requires monitoring",
            tier.label(),
            delayed_rate
        )),
        RiskTier::Low => findings.push(format!(
            "{}: {:.1}% delay rate is within acceptable range",
            tier.label(),
            delayed_rate
        )),
    }
    findings.push(format!(
        "Financial impact: ${:.0} in delayed shipments ({:.1}% of total cost)",
        delayed_cost, cost_impact
    ));

    RiskAssessment {
        total_orders,
        delayed_orders,
        delayed_rate,
        tier,
        partner_delays,
        worst_partner,
        best_partner,
        delayed_cost,
        total_cost,
        cost_impact,
        findings,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskCell {
    pub shipments: usize,
    pub delay_rate: f64,
    pub total_cost: f64,
}

/// Delay rate per supplier (rows) and partner (columns)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskHeatmap {
    pub suppliers: Vec<String>,
    pub partners: Vec<String>,
    pub cells: Vec<Vec<RiskCell>>,
}

pub fn risk_heatmap(shipments: &[Shipment]) -> RiskHeatmap {
    let by_supplier = partition(shipments, GroupKey::Supplier);
    let partners: Vec<String> = partition(shipments, GroupKey::LogisticsPartner)
        .keys()
        .map(|p| p.to_string())
        .collect();

    let mut suppliers = Vec::with_capacity(by_supplier.len());
    let mut cells = Vec::with_capacity(by_supplier.len());
    for (supplier, rows) in by_supplier {
        let row: Vec<RiskCell> = partners
            .iter()
            .map(|partner| {
                let pair: Vec<&&Shipment> = rows
                    .iter()
                    .filter(|s| s.logistics_partner == *partner)
                    .collect();
                RiskCell {
                    shipments: pair.len(),
                    delay_rate: rate(pair.iter().filter(|s| s.delayed).count(), pair.len()),
                    total_cost: pair.iter().map(|s| s.total_cost).sum(),
                }
            })
            .collect();
        suppliers.push(supplier.to_string());
        cells.push(row);
    }

    RiskHeatmap {
        suppliers,
        partners,
        cells,
    }
}

pub fn recommended_actions() -> (Vec<&'static str>, Vec<&'static str>) {
    (
        vec![
            "Review delayed shipments with logistics partners",
            "Implement performance monitoring alerts",
            "Consider backup logistics options",
        ],
        vec![
            "Renegotiate contracts with underperforming partners",
            "Diversify logistics partner portfolio",
            "Implement predictive delay alerts",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::shipment;
    use crate::models::DeliveryStatus;

    fn mixed() -> Vec<Shipment> {
        vec![
            shipment("1", "Acme", "Slow", DeliveryStatus::Delayed, 100.0, false),
            shipment("2", "Acme", "Slow", DeliveryStatus::Delayed, 100.0, false),
            shipment("3", "Acme", "Fast", DeliveryStatus::Delivered, 100.0, false),
            shipment("4", "Beta", "Fast", DeliveryStatus::Delivered, 100.0, false),
        ]
    }

    #[test]
    fn high_risk_names_worst_and_best_partner() {
        let assessment = assess(&mixed());
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(assessment.delayed_rate, 50.0);
        assert_eq!(assessment.worst_partner.as_ref().unwrap().partner, "Slow");
        assert_eq!(assessment.best_partner.as_ref().unwrap().partner, "Fast");
        assert!(assessment.findings[1].contains("Slow has 100.0% delay rate"));
        assert_eq!(assessment.cost_impact, 50.0);
    }

    #[test]
    fn empty_table_is_low_risk() {
        let assessment = assess(&[]);
        assert_eq!(assessment.tier, RiskTier::Low);
        assert_eq!(assessment.delayed_rate, 0.0);
        assert!(assessment.worst_partner.is_none());
    }

    #[test]
    fn heatmap_fills_missing_pairs_with_zero() {
        let heatmap = risk_heatmap(&mixed());
        assert_eq!(heatmap.suppliers, vec!["Acme", "Beta"]);
        assert_eq!(heatmap.partners, vec!["Fast", "Slow"]);
        let beta_slow = &heatmap.cells[1][1];
        assert_eq!(beta_slow.shipments, 0);
        assert_eq!(beta_slow.delay_rate, 0.0);
        assert_eq!(heatmap.cells[0][1].delay_rate, 100.0);
    }
}

//! Cost breakdowns and savings opportunities

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::metrics::{self, group_by, mean, share, GroupSummary};
use crate::models::{GroupKey, Shipment};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostKpis {
    pub total_cost: f64,
    pub avg_unit_cost: f64,
    /// Spend above the lowest unit price observed for each product
    pub potential_savings: f64,
    pub savings_percentage: f64,
    pub delayed_cost: f64,
    /// Share of spend tied up in delayed shipments
    pub delay_cost_impact: f64,
    pub total_cost_delta: f64,
}

fn lowest_unit_price_by_product(shipments: &[Shipment]) -> HashMap<&str, f64> {
    let mut lowest: HashMap<&str, f64> = HashMap::new();
    for s in shipments {
        let entry = lowest.entry(s.product.as_str()).or_insert(s.unit_cost);
        if s.unit_cost < *entry {
            *entry = s.unit_cost;
        }
    }
    lowest
}

pub fn potential_savings(shipments: &[Shipment]) -> f64 {
    let lowest = lowest_unit_price_by_product(shipments);
    shipments
        .iter()
        .map(|s| {
            let floor = lowest.get(s.product.as_str()).copied().unwrap_or(s.unit_cost);
            (s.unit_cost - floor) * s.quantity as f64
        })
        .sum()
}

pub fn cost_kpis(shipments: &[Shipment]) -> CostKpis {
    let total_cost = metrics::total_cost(shipments);
    let savings = potential_savings(shipments);
    let delayed_cost: f64 = shipments
        .iter()
        .filter(|s| s.delayed)
        .map(|s| s.total_cost)
        .sum();

    CostKpis {
        total_cost,
        avg_unit_cost: mean(shipments.iter().map(|s| s.unit_cost).sum(), shipments.len()),
        potential_savings: savings,
        savings_percentage: share(savings, total_cost),
        delayed_cost,
        delay_cost_impact: share(delayed_cost, total_cost),
        total_cost_delta: shipments.iter().map(|s| s.cost_delta).sum(),
    }
}

/// Cost per group, largest spend first
pub fn cost_breakdown(shipments: &[Shipment], key: GroupKey) -> Vec<GroupSummary> {
    let mut groups = group_by(shipments, key);
    groups.sort_by(|a, b| {
        b.total_cost
            .partial_cmp(&a.total_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostEfficiency {
    pub supplier: String,
    pub avg_unit_price: f64,
    pub delivery_rate: f64,
    pub total_cost: f64,
    pub quadrant: EfficiencyQuadrant,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum EfficiencyQuadrant {
    /// Cheaper than average and at least average delivery
    Preferred,
    /// Pricier than average but delivers at least as well
    Premium,
    /// Cheaper than average but delivers worse
    Risky,
    /// Pricier and worse than average
    Review,
}

/// Supplier unit price vs delivery rate, split around the averages
pub fn cost_efficiency_matrix(shipments: &[Shipment]) -> Vec<CostEfficiency> {
    let suppliers = metrics::supplier_performance(shipments);
    let avg_price = mean(
        suppliers.iter().map(|s| s.avg_unit_price).sum(),
        suppliers.len(),
    );
    let avg_delivery = mean(
        suppliers.iter().map(|s| s.on_time_delivery_rate).sum(),
        suppliers.len(),
    );

    let mut matrix: Vec<CostEfficiency> = suppliers
        .into_iter()
        .map(|s| {
            let cheap = s.avg_unit_price <= avg_price;
            let reliable = s.on_time_delivery_rate >= avg_delivery;
            let quadrant = match (cheap, reliable) {
                (true, true) => EfficiencyQuadrant::Preferred,
                (false, true) => EfficiencyQuadrant::Premium,
                (true, false) => EfficiencyQuadrant::Risky,
                (false, false) => EfficiencyQuadrant::Review,
            };
            CostEfficiency {
                supplier: s.supplier,
                avg_unit_price: s.avg_unit_price,
                delivery_rate: s.on_time_delivery_rate,
                total_cost: s.total_cost,
                quadrant,
            }
        })
        .collect();
    matrix.sort_by(|a, b| a.supplier.cmp(&b.supplier));
    matrix
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SavingsOpportunity {
    pub product: String,
    pub lowest_unit_price: f64,
    pub avg_unit_price: f64,
    pub potential_savings: f64,
}

/// Products ordered by how much price standardization would save
pub fn savings_opportunities(shipments: &[Shipment]) -> Vec<SavingsOpportunity> {
    let lowest = lowest_unit_price_by_product(shipments);
    let mut opportunities: Vec<SavingsOpportunity> =
        metrics::partition(shipments, GroupKey::Product)
            .into_iter()
            .map(|(product, rows)| {
                let floor = lowest.get(product).copied().unwrap_or(0.0);
                SavingsOpportunity {
                    product: product.to_string(),
                    lowest_unit_price: floor,
                    avg_unit_price: mean(rows.iter().map(|s| s.unit_cost).sum(), rows.len()),
                    potential_savings: rows
                        .iter()
                        .map(|s| (s.unit_cost - floor) * s.quantity as f64)
                        .sum(),
                }
            })
            .filter(|o| o.potential_savings > 0.0)
            .collect();

    opportunities.sort_by(|a, b| {
        b.potential_savings
            .partial_cmp(&a.potential_savings)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.product.cmp(&b.product))
    });
    opportunities
}

/// Plain-language recommendations derived from the cost figures
pub fn recommendations(shipments: &[Shipment]) -> Vec<String> {
    let mut recs = Vec::new();
    if shipments.is_empty() {
        return recs;
    }

    let kpis = cost_kpis(shipments);
    let suppliers = cost_breakdown(shipments, GroupKey::Supplier);

    if let Some(top) = suppliers.first() {
        if top.cost_share > 40.0 {
            recs.push(format!(
                "Supplier concentration: {} accounts for {:.1}% of spend; negotiate volume discounts or qualify a second source",
                top.key, top.cost_share
            ));
        }
    }

    if kpis.savings_percentage > 1.0 {
        recs.push(format!(
            "Price standardization: paying the lowest observed unit price per product would save ${:.0} ({:.1}% of spend)",
            kpis.potential_savings, kpis.savings_percentage
        ));
    }

    if kpis.delay_cost_impact > 10.0 {
        recs.push(format!(
            "Delay exposure: ${:.0} ({:.1}% of spend) sits in delayed shipments; add late-delivery penalties to partner contracts",
            kpis.delayed_cost, kpis.delay_cost_impact
        ));
    }

    let partners = metrics::partner_performance(shipments);
    let cheapest = partners.iter().filter(|p| p.cost_per_unit > 0.0).min_by(|a, b| {
        a.cost_per_unit
            .partial_cmp(&b.cost_per_unit)
            .unwrap_or(Ordering::Equal)
    });
    let priciest = partners.iter().max_by(|a, b| {
        a.cost_per_unit
            .partial_cmp(&b.cost_per_unit)
            .unwrap_or(Ordering::Equal)
    });
    if let (Some(low), Some(high)) = (cheapest, priciest) {
        if high.cost_per_unit > low.cost_per_unit * 1.2 {
            recs.push(format!(
                "Logistics optimization: {} costs ${:.2}/unit vs {} at ${:.2}/unit; review lane allocation",
                high.partner, high.cost_per_unit, low.partner, low.cost_per_unit
            ));
        }
    }

    if kpis.total_cost_delta.abs() > 0.01 * kpis.total_cost.max(1.0) {
        recs.push(format!(
            "Invoice variance: recorded totals differ from quantity x unit price by ${:.0}; audit billing",
            kpis.total_cost_delta
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::shipment;
    use crate::models::DeliveryStatus;

    #[test]
    fn savings_use_lowest_price_per_product() {
        let mut a = shipment("1", "Cheap", "UPS", DeliveryStatus::Delivered, 100.0, false);
        let mut b = shipment("2", "Pricey", "UPS", DeliveryStatus::Delivered, 150.0, false);
        a.product = "Bolt".into();
        b.product = "Bolt".into();
        // 10 units each at 10.0 and 15.0
        assert_eq!(potential_savings(&[a.clone(), b.clone()]), 50.0);

        let opps = savings_opportunities(&[a, b]);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].lowest_unit_price, 10.0);
    }

    #[test]
    fn delay_cost_impact_is_share_of_spend() {
        let rows = vec![
            shipment("1", "S", "P", DeliveryStatus::Delayed, 25.0, false),
            shipment("2", "S", "P", DeliveryStatus::Delivered, 75.0, false),
        ];
        let kpis = cost_kpis(&rows);
        assert_eq!(kpis.delay_cost_impact, 25.0);
    }

    #[test]
    fn breakdown_orders_by_spend_and_conserves_total() {
        let rows = vec![
            shipment("1", "Small", "P", DeliveryStatus::Delivered, 10_000.0, false),
            shipment("2", "Large", "P", DeliveryStatus::Delivered, 40_000.0, false),
        ];
        let breakdown = cost_breakdown(&rows, GroupKey::Supplier);
        assert_eq!(breakdown[0].key, "Large");
        assert_eq!(breakdown[1].cost_share, 20.0);
        let sum: f64 = breakdown.iter().map(|g| g.total_cost).sum();
        assert_eq!(sum, 50_000.0);
    }

    #[test]
    fn empty_table_has_no_recommendations() {
        assert!(recommendations(&[]).is_empty());
        assert_eq!(cost_kpis(&[]).delay_cost_impact, 0.0);
    }

    #[test]
    fn concentrated_spend_is_flagged() {
        let rows = vec![
            shipment("1", "Mega", "P", DeliveryStatus::Delivered, 900.0, false),
            shipment("2", "Tiny", "P", DeliveryStatus::Delivered, 100.0, false),
        ];
        let recs = recommendations(&rows);
        assert!(recs.iter().any(|r| r.starts_with("Supplier concentration: Mega")));
    }
}

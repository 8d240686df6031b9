//! Inventory KPIs and ABC classification
//!
//! Products are ranked by total value (descending, ties by product id) and
//! classified by the cumulative value share held by the products ranked
//! above them: under `a_cutoff` is class A, under `b_cutoff` is class B, the
//! rest is class C. The highest-value product is therefore always class A.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::metrics::{self, mean, rate, share};
use crate::models::{DeliveryStatus, GroupKey, Shipment};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub fn label(&self) -> &'static str {
        match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        }
    }
}

/// Cumulative-share cutoffs in percent (80/15/5 by default)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AbcPolicy {
    pub a_cutoff: f64,
    pub b_cutoff: f64,
}

impl Default for AbcPolicy {
    fn default() -> Self {
        Self {
            a_cutoff: 80.0,
            b_cutoff: 95.0,
        }
    }
}

impl AbcPolicy {
    pub fn classify(&self, preceding_share: f64) -> AbcClass {
        if preceding_share < self.a_cutoff {
            AbcClass::A
        } else if preceding_share < self.b_cutoff {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductSummary {
    pub product: String,
    pub orders: usize,
    pub quantity: u64,
    pub total_value: f64,
    pub avg_unit_price: f64,
    pub turnover_rate: f64,
    pub value_share: f64,
    pub cumulative_share: f64,
    pub class: AbcClass,
}

/// Rank products by value and assign exactly one ABC class to each.
/// When the table holds no value at all every product is class C.
pub fn abc_classification(shipments: &[Shipment], policy: &AbcPolicy) -> Vec<ProductSummary> {
    let grand_total = metrics::total_cost(shipments);

    let mut products: Vec<ProductSummary> = metrics::partition(shipments, GroupKey::Product)
        .into_iter()
        .map(|(name, rows)| {
            let quantity: u64 = rows.iter().map(|s| s.quantity).sum();
            let delivered: u64 = rows
                .iter()
                .filter(|s| s.status == DeliveryStatus::Delivered)
                .map(|s| s.quantity)
                .sum();
            let value: f64 = rows.iter().map(|s| s.total_cost).sum();
            ProductSummary {
                product: name.to_string(),
                orders: rows.len(),
                quantity,
                total_value: value,
                avg_unit_price: mean(rows.iter().map(|s| s.unit_cost).sum(), rows.len()),
                turnover_rate: share(delivered as f64, quantity as f64),
                value_share: share(value, grand_total),
                cumulative_share: 0.0,
                class: AbcClass::C,
            }
        })
        .collect();

    // partition() yields product order, so the stable sort keeps id order on ties
    products.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
    });

    let mut cumulative = 0.0;
    for product in &mut products {
        product.class = if grand_total > 0.0 {
            policy.classify(cumulative)
        } else {
            AbcClass::C
        };
        cumulative += product.value_share;
        product.cumulative_share = cumulative;
    }

    products
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AbcBreakdown {
    pub class: AbcClass,
    pub products: usize,
    pub total_value: f64,
    pub value_share: f64,
}

pub fn abc_breakdown(products: &[ProductSummary]) -> Vec<AbcBreakdown> {
    let total: f64 = products.iter().map(|p| p.total_value).sum();
    [AbcClass::A, AbcClass::B, AbcClass::C]
        .iter()
        .map(|class| {
            let members: Vec<&ProductSummary> =
                products.iter().filter(|p| p.class == *class).collect();
            let value: f64 = members.iter().map(|p| p.total_value).sum();
            AbcBreakdown {
                class: *class,
                products: members.len(),
                total_value: value,
                value_share: share(value, total),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryKpis {
    pub total_inventory_value: f64,
    pub total_quantity: u64,
    pub turnover_rate: f64,
    pub unique_products: usize,
    pub unique_suppliers: usize,
    pub avg_unit_price: f64,
    /// Orders whose total cost is above the mean order cost
    pub high_value_orders: usize,
    pub high_value_rate: f64,
    pub total_orders: usize,
    pub suppliers_per_product: f64,
}

pub fn inventory_kpis(shipments: &[Shipment]) -> InventoryKpis {
    let total_value = metrics::total_cost(shipments);
    let total_quantity = metrics::total_quantity(shipments);
    let delivered_quantity: u64 = shipments
        .iter()
        .filter(|s| s.status == DeliveryStatus::Delivered)
        .map(|s| s.quantity)
        .sum();

    let mean_order_cost = mean(total_value, shipments.len());
    let high_value_orders = shipments
        .iter()
        .filter(|s| s.total_cost > mean_order_cost)
        .count();

    let unique_products = shipments
        .iter()
        .map(|s| s.product.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let unique_suppliers = shipments
        .iter()
        .map(|s| s.supplier.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    InventoryKpis {
        total_inventory_value: total_value,
        total_quantity,
        turnover_rate: share(delivered_quantity as f64, total_quantity as f64),
        unique_products,
        unique_suppliers,
        avg_unit_price: mean(shipments.iter().map(|s| s.unit_cost).sum(), shipments.len()),
        high_value_orders,
        high_value_rate: rate(high_value_orders, shipments.len()),
        total_orders: shipments.len(),
        suppliers_per_product: mean(unique_suppliers as f64, unique_products),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests::shipment;

    fn product_row(id: &str, product: &str, value: f64) -> Shipment {
        let mut row = shipment(id, "Acme", "UPS", DeliveryStatus::Delivered, value, false);
        row.product = product.to_string();
        row
    }

    #[test]
    fn classic_pareto_split() {
        let rows = vec![
            product_row("1", "Engines", 700.0),
            product_row("2", "Brakes", 150.0),
            product_row("3", "Seats", 100.0),
            product_row("4", "Mats", 30.0),
            product_row("5", "Caps", 20.0),
        ];
        let products = abc_classification(&rows, &AbcPolicy::default());
        let classes: Vec<(&str, AbcClass)> = products
            .iter()
            .map(|p| (p.product.as_str(), p.class))
            .collect();
        assert_eq!(
            classes,
            vec![
                ("Engines", AbcClass::A),
                ("Brakes", AbcClass::A),
                ("Seats", AbcClass::B),
                ("Mats", AbcClass::C),
                ("Caps", AbcClass::C),
            ]
        );
        assert!((products.last().unwrap().cumulative_share - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_product_id_order() {
        let rows = vec![
            product_row("1", "Zeta", 50.0),
            product_row("2", "Alpha", 50.0),
        ];
        let products = abc_classification(&rows, &AbcPolicy::default());
        assert_eq!(products[0].product, "Alpha");
        assert_eq!(products[1].product, "Zeta");
    }

    #[test]
    fn every_product_gets_exactly_one_class() {
        let rows: Vec<Shipment> = (0..37)
            .map(|i| product_row(&i.to_string(), &format!("SKU-{:02}", i % 13), (i * 7 % 11) as f64 * 10.0))
            .collect();
        let products = abc_classification(&rows, &AbcPolicy::default());
        assert_eq!(products.len(), 13);
        let breakdown = abc_breakdown(&products);
        let classified: usize = breakdown.iter().map(|b| b.products).sum();
        assert_eq!(classified, 13);
    }

    #[test]
    fn zero_value_table_is_all_class_c() {
        let rows = vec![product_row("1", "Free", 0.0), product_row("2", "Gift", 0.0)];
        let products = abc_classification(&rows, &AbcPolicy::default());
        assert!(products.iter().all(|p| p.class == AbcClass::C));
    }

    #[test]
    fn kpis_count_high_value_orders() {
        let rows = vec![
            product_row("1", "A", 10.0),
            product_row("2", "B", 10.0),
            product_row("3", "C", 100.0),
        ];
        let kpis = inventory_kpis(&rows);
        assert_eq!(kpis.high_value_orders, 1);
        assert_eq!(kpis.unique_products, 3);
        assert_eq!(kpis.turnover_rate, 100.0);
    }
}

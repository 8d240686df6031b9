//! Pure aggregation over shipment tables
//!
//! Every function here is deterministic for a given input slice. Rates are
//! percentages in `0.0..=100.0`; a rate over an empty group is
//! [`NO_DATA_RATE`].

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{DeliveryStatus, GroupKey, PerformanceCategory, Shipment};

/// Reported for any rate whose denominator is zero
pub const NO_DATA_RATE: f64 = 0.0;

// ============================================================================
// Helpers
// ============================================================================

pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        NO_DATA_RATE
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

pub fn share(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        NO_DATA_RATE
    } else {
        part * 100.0 / whole
    }
}

pub fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn total_cost(shipments: &[Shipment]) -> f64 {
    shipments.iter().map(|s| s.total_cost).sum()
}

pub fn total_quantity(shipments: &[Shipment]) -> u64 {
    shipments.iter().map(|s| s.quantity).sum()
}

pub fn delay_rate(shipments: &[Shipment]) -> f64 {
    rate(shipments.iter().filter(|s| s.delayed).count(), shipments.len())
}

fn status_count(shipments: &[&Shipment], status: DeliveryStatus) -> usize {
    shipments.iter().filter(|s| s.status == status).count()
}

/// Most frequent value; ties resolve to the alphabetically first value
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Split shipments by a dimension; every shipment lands in exactly one group
pub fn partition(shipments: &[Shipment], key: GroupKey) -> BTreeMap<&str, Vec<&Shipment>> {
    let mut groups: BTreeMap<&str, Vec<&Shipment>> = BTreeMap::new();
    for shipment in shipments {
        groups.entry(shipment.key(key)).or_default().push(shipment);
    }
    groups
}

// ============================================================================
// Group summaries
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub shipments: usize,
    pub quantity: u64,
    pub delivered_quantity: u64,
    pub total_cost: f64,
    pub mean_cost: f64,
    pub delivered: usize,
    pub in_transit: usize,
    pub pending: usize,
    pub delayed: usize,
    pub delivery_rate: f64,
    pub delay_rate: f64,
    pub cost_share: f64,
}

/// Counts, sums and rates per group, ordered by group name
pub fn group_by(shipments: &[Shipment], key: GroupKey) -> Vec<GroupSummary> {
    let grand_total = total_cost(shipments);

    partition(shipments, key)
        .into_iter()
        .map(|(name, rows)| {
            let count = rows.len();
            let cost: f64 = rows.iter().map(|s| s.total_cost).sum();
            let delayed = rows.iter().filter(|s| s.delayed).count();
            let delivered = status_count(&rows, DeliveryStatus::Delivered);
            GroupSummary {
                key: name.to_string(),
                shipments: count,
                quantity: rows.iter().map(|s| s.quantity).sum(),
                delivered_quantity: rows
                    .iter()
                    .filter(|s| s.status == DeliveryStatus::Delivered)
                    .map(|s| s.quantity)
                    .sum(),
                total_cost: cost,
                mean_cost: mean(cost, count),
                delivered,
                in_transit: status_count(&rows, DeliveryStatus::InTransit),
                pending: status_count(&rows, DeliveryStatus::Pending),
                delayed,
                delivery_rate: rate(delivered, count),
                delay_rate: rate(delayed, count),
                cost_share: share(cost, grand_total),
            }
        })
        .collect()
}

/// Delay rate per group; groups listed in `expected` but absent from the data
/// are reported with [`NO_DATA_RATE`]
pub fn delay_rates(
    shipments: &[Shipment],
    key: GroupKey,
    expected: &[&str],
) -> BTreeMap<String, f64> {
    let mut rates: BTreeMap<String, f64> = expected
        .iter()
        .map(|name| (name.to_string(), NO_DATA_RATE))
        .collect();
    for group in group_by(shipments, key) {
        rates.insert(group.key, group.delay_rate);
    }
    rates
}

// ============================================================================
// Overview
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Dashboard risk from overdue + delayed percentage
    pub fn from_problem_rate(problem_rate: f64) -> Self {
        if problem_rate < 10.0 {
            RiskLevel::Low
        } else if problem_rate < 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum OverallStatus {
    Excellent,
    Good,
    NeedsAttention,
}

impl OverallStatus {
    pub fn from_performance_rate(performance_rate: f64) -> Self {
        if performance_rate > 80.0 {
            OverallStatus::Excellent
        } else if performance_rate > 60.0 {
            OverallStatus::Good
        } else {
            OverallStatus::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Excellent => "Excellent",
            OverallStatus::Good => "Good",
            OverallStatus::NeedsAttention => "Needs Attention",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryCounts {
    pub delivered: usize,
    pub on_track: usize,
    pub overdue: usize,
    pub delayed: usize,
}

impl CategoryCounts {
    pub fn count(&self, category: PerformanceCategory) -> usize {
        match category {
            PerformanceCategory::Delivered => self.delivered,
            PerformanceCategory::OnTrack => self.on_track,
            PerformanceCategory::Overdue => self.overdue,
            PerformanceCategory::Delayed => self.delayed,
        }
    }
}

pub fn categorize(shipments: &[Shipment], as_of: NaiveDate) -> CategoryCounts {
    let mut counts = CategoryCounts {
        delivered: 0,
        on_track: 0,
        overdue: 0,
        delayed: 0,
    };
    for shipment in shipments {
        match shipment.performance_category(as_of) {
            PerformanceCategory::Delivered => counts.delivered += 1,
            PerformanceCategory::OnTrack => counts.on_track += 1,
            PerformanceCategory::Overdue => counts.overdue += 1,
            PerformanceCategory::Delayed => counts.delayed += 1,
        }
    }
    counts
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverviewMetrics {
    pub as_of: NaiveDate,
    pub total_orders: usize,
    pub total_suppliers: usize,
    pub total_products: usize,
    pub total_warehouses: usize,
    pub total_logistics_partners: usize,
    pub total_quantity: u64,
    pub total_cost: f64,
    pub categories: CategoryCounts,
    pub completed_delivery_rate: f64,
    pub on_track_rate: f64,
    pub overdue_rate: f64,
    pub delayed_rate: f64,
    pub overall_performance_rate: f64,
    pub avg_delivery_slip_days: f64,
    pub overall_status: OverallStatus,
    pub risk_level: RiskLevel,
}

fn distinct(shipments: &[Shipment], key: GroupKey) -> usize {
    shipments
        .iter()
        .map(|s| s.key(key))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn overview(shipments: &[Shipment], as_of: NaiveDate) -> OverviewMetrics {
    let total = shipments.len();
    let categories = categorize(shipments, as_of);

    let completed_delivery_rate = rate(categories.delivered, total);
    let on_track_rate = rate(categories.on_track, total);
    let overdue_rate = rate(categories.overdue, total);
    let delayed_rate = rate(categories.delayed, total);
    let overall_performance_rate = rate(categories.delivered + categories.on_track, total);

    let slips: Vec<i64> = shipments.iter().filter_map(|s| s.slip_days()).collect();
    let avg_delivery_slip_days = mean(slips.iter().sum::<i64>() as f64, slips.len());

    OverviewMetrics {
        as_of,
        total_orders: total,
        total_suppliers: distinct(shipments, GroupKey::Supplier),
        total_products: distinct(shipments, GroupKey::Product),
        total_warehouses: distinct(shipments, GroupKey::Warehouse),
        total_logistics_partners: distinct(shipments, GroupKey::LogisticsPartner),
        total_quantity: total_quantity(shipments),
        total_cost: total_cost(shipments),
        categories,
        completed_delivery_rate,
        on_track_rate,
        overdue_rate,
        delayed_rate,
        overall_performance_rate,
        avg_delivery_slip_days,
        overall_status: OverallStatus::from_performance_rate(overall_performance_rate),
        risk_level: RiskLevel::from_problem_rate(overdue_rate + delayed_rate),
    }
}

// ============================================================================
// Supplier and partner performance
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SupplierPerformance {
    pub supplier: String,
    pub total_cost: f64,
    pub mean_cost: f64,
    pub total_quantity: u64,
    pub avg_unit_price: f64,
    pub on_time_delivery_rate: f64,
    pub partners_used: usize,
    pub primary_shipping_method: String,
    pub performance_score: f64,
}

/// Delivery weighs 60%, cost efficiency relative to the priciest supplier 40%
pub fn supplier_performance(shipments: &[Shipment]) -> Vec<SupplierPerformance> {
    let mut suppliers: Vec<SupplierPerformance> = partition(shipments, GroupKey::Supplier)
        .into_iter()
        .map(|(name, rows)| {
            let count = rows.len();
            let cost: f64 = rows.iter().map(|s| s.total_cost).sum();
            SupplierPerformance {
                supplier: name.to_string(),
                total_cost: cost,
                mean_cost: mean(cost, count),
                total_quantity: rows.iter().map(|s| s.quantity).sum(),
                avg_unit_price: mean(rows.iter().map(|s| s.unit_cost).sum(), count),
                on_time_delivery_rate: rate(status_count(&rows, DeliveryStatus::Delivered), count),
                partners_used: rows
                    .iter()
                    .map(|s| s.logistics_partner.as_str())
                    .collect::<BTreeSet<_>>()
                    .len(),
                primary_shipping_method: mode(rows.iter().map(|s| s.shipping_method.as_str())),
                performance_score: 0.0,
            }
        })
        .collect();

    let max_mean_cost = suppliers
        .iter()
        .map(|s| s.mean_cost)
        .fold(0.0_f64, f64::max);
    for supplier in &mut suppliers {
        let cost_efficiency = 100.0 - share(supplier.mean_cost, max_mean_cost);
        supplier.performance_score = supplier.on_time_delivery_rate * 0.6 + cost_efficiency * 0.4;
    }

    suppliers.sort_by(|a, b| {
        by_score_desc(a.performance_score, b.performance_score)
            .then_with(|| a.supplier.cmp(&b.supplier))
    });
    suppliers
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PartnerPerformance {
    pub partner: String,
    pub shipments: usize,
    pub delivery_rate: f64,
    pub in_transit_rate: f64,
    pub pending_rate: f64,
    /// Share of orders whose status is Delayed; with the three rates above
    /// this partitions the partner's orders
    pub delayed_status_rate: f64,
    /// Delivered on or before the promised date
    pub on_time_rate: f64,
    /// Share of orders flagged late by date or status
    pub delay_rate: f64,
    pub total_cost: f64,
    pub mean_cost: f64,
    pub cost_per_unit: f64,
    pub primary_method: String,
    pub suppliers_served: usize,
    pub reliability_score: f64,
}

pub fn partner_performance(shipments: &[Shipment]) -> Vec<PartnerPerformance> {
    let mut partners: Vec<PartnerPerformance> = partition(shipments, GroupKey::LogisticsPartner)
        .into_iter()
        .map(|(name, rows)| {
            let count = rows.len();
            let cost: f64 = rows.iter().map(|s| s.total_cost).sum();
            let units: u64 = rows.iter().map(|s| s.quantity).sum();
            let on_time = rows
                .iter()
                .filter(|s| s.status == DeliveryStatus::Delivered && !s.delayed)
                .count();
            let on_time_rate = rate(on_time, count);
            let delay_rate = rate(rows.iter().filter(|s| s.delayed).count(), count);
            PartnerPerformance {
                partner: name.to_string(),
                shipments: count,
                delivery_rate: rate(status_count(&rows, DeliveryStatus::Delivered), count),
                in_transit_rate: rate(status_count(&rows, DeliveryStatus::InTransit), count),
                pending_rate: rate(status_count(&rows, DeliveryStatus::Pending), count),
                delayed_status_rate: rate(status_count(&rows, DeliveryStatus::Delayed), count),
                on_time_rate,
                delay_rate,
                total_cost: cost,
                mean_cost: mean(cost, count),
                cost_per_unit: mean(cost, units as usize),
                primary_method: mode(rows.iter().map(|s| s.shipping_method.as_str())),
                suppliers_served: rows
                    .iter()
                    .map(|s| s.supplier.as_str())
                    .collect::<BTreeSet<_>>()
                    .len(),
                reliability_score: on_time_rate - delay_rate,
            }
        })
        .collect();

    partners.sort_by(|a, b| {
        by_score_desc(a.reliability_score, b.reliability_score)
            .then_with(|| a.partner.cmp(&b.partner))
    });
    partners
}

// ============================================================================
// Performance analytics
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MethodPerformance {
    pub method: String,
    pub orders: usize,
    pub delivered_rate: f64,
    pub delay_rate: f64,
    pub avg_cost: f64,
    pub total_cost: f64,
}

pub fn shipping_method_analysis(shipments: &[Shipment]) -> Vec<MethodPerformance> {
    group_by(shipments, GroupKey::ShippingMethod)
        .into_iter()
        .map(|g| MethodPerformance {
            method: g.key,
            orders: g.shipments,
            delivered_rate: g.delivery_rate,
            delay_rate: g.delay_rate,
            avg_cost: g.mean_cost,
            total_cost: g.total_cost,
        })
        .collect()
}

/// Method with the highest delivered rate; ties resolve by name
pub fn best_shipping_method(methods: &[MethodPerformance]) -> Option<&MethodPerformance> {
    methods.iter().min_by(|a, b| {
        by_score_desc(a.delivered_rate, b.delivered_rate).then_with(|| a.method.cmp(&b.method))
    })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusSummaryRow {
    pub status: DeliveryStatus,
    pub label: String,
    pub orders: usize,
    pub percentage: f64,
    pub total_cost: f64,
    pub avg_cost: f64,
    pub earliest_promised: Option<NaiveDate>,
    pub latest_promised: Option<NaiveDate>,
}

/// One row per delivery status present in the data
pub fn delivery_status_summary(shipments: &[Shipment]) -> Vec<StatusSummaryRow> {
    DeliveryStatus::ALL
        .iter()
        .filter_map(|status| {
            let rows: Vec<&Shipment> = shipments.iter().filter(|s| s.status == *status).collect();
            if rows.is_empty() {
                return None;
            }
            let cost: f64 = rows.iter().map(|s| s.total_cost).sum();
            Some(StatusSummaryRow {
                status: *status,
                label: status.label().to_string(),
                orders: rows.len(),
                percentage: rate(rows.len(), shipments.len()),
                total_cost: cost,
                avg_cost: mean(cost, rows.len()),
                earliest_promised: rows.iter().map(|s| s.promised_date).min(),
                latest_promised: rows.iter().map(|s| s.promised_date).max(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyTrend {
    pub month: String,
    pub orders: usize,
    pub delivered_rate: f64,
    pub delay_rate: f64,
    pub total_cost: f64,
}

/// Trend by promised-date month, chronological
pub fn monthly_trends(shipments: &[Shipment]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<(i32, u32), Vec<&Shipment>> = BTreeMap::new();
    for shipment in shipments {
        let date = shipment.promised_date;
        months
            .entry((date.year(), date.month()))
            .or_default()
            .push(shipment);
    }

    months
        .into_iter()
        .map(|((year, month), rows)| MonthlyTrend {
            month: format!("{:04}-{:02}", year, month),
            orders: rows.len(),
            delivered_rate: rate(status_count(&rows, DeliveryStatus::Delivered), rows.len()),
            delay_rate: rate(rows.iter().filter(|s| s.delayed).count(), rows.len()),
            total_cost: rows.iter().map(|s| s.total_cost).sum(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WarehousePerformance {
    pub warehouse: String,
    pub orders: usize,
    pub total_cost: f64,
    pub delay_rate: f64,
    pub quantity: u64,
    /// Share of units received that completed delivery
    pub turnover_rate: f64,
}

pub fn warehouse_performance(shipments: &[Shipment]) -> Vec<WarehousePerformance> {
    group_by(shipments, GroupKey::Warehouse)
        .into_iter()
        .map(|g| WarehousePerformance {
            turnover_rate: share(g.delivered_quantity as f64, g.quantity as f64),
            warehouse: g.key,
            orders: g.shipments,
            total_cost: g.total_cost,
            delay_rate: g.delay_rate,
            quantity: g.quantity,
        })
        .collect()
}

/// Delayed or pending orders
pub fn orders_needing_attention(shipments: &[Shipment]) -> usize {
    shipments
        .iter()
        .filter(|s| s.delayed || s.status == DeliveryStatus::Pending)
        .count()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::compute_delayed;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn shipment(
        id: &str,
        supplier: &str,
        partner: &str,
        status: DeliveryStatus,
        cost: f64,
        late: bool,
    ) -> Shipment {
        let promised = date(2024, 3, 10);
        let actual = match status {
            DeliveryStatus::Delivered if late => Some(date(2024, 3, 12)),
            DeliveryStatus::Delivered => Some(date(2024, 3, 9)),
            _ => None,
        };
        Shipment {
            order_id: id.to_string(),
            product: format!("P-{}", supplier),
            supplier: supplier.to_string(),
            warehouse: "Dallas".to_string(),
            logistics_partner: partner.to_string(),
            shipping_method: "Road".to_string(),
            quantity: 10,
            unit_cost: cost / 10.0,
            total_cost: cost,
            promised_date: promised,
            actual_date: actual,
            status,
            delayed: compute_delayed(promised, actual, status),
            cost_delta: 0.0,
        }
    }

    fn ten_with_three_delayed() -> Vec<Shipment> {
        (0..10)
            .map(|i| {
                let status = if i < 3 {
                    DeliveryStatus::Delayed
                } else {
                    DeliveryStatus::Delivered
                };
                shipment(&format!("O{}", i), "Acme", "FedEx", status, 100.0, false)
            })
            .collect()
    }

    #[test]
    fn three_of_ten_delayed_is_thirty_percent() {
        let rows = ten_with_three_delayed();
        assert_eq!(delay_rate(&rows), 30.0);
        let groups = group_by(&rows, GroupKey::LogisticsPartner);
        assert_eq!(groups[0].delay_rate, 30.0);
    }

    #[test]
    fn empty_input_yields_no_data_rate() {
        assert_eq!(delay_rate(&[]), NO_DATA_RATE);
        assert!(group_by(&[], GroupKey::Supplier).is_empty());
        let rates = delay_rates(&[], GroupKey::LogisticsPartner, &["Idle Freight"]);
        assert_eq!(rates["Idle Freight"], NO_DATA_RATE);
    }

    #[test]
    fn cost_share_matches_supplier_fraction() {
        let rows = vec![
            shipment("A", "Small", "UPS", DeliveryStatus::Delivered, 10_000.0, false),
            shipment("B", "Large", "UPS", DeliveryStatus::Delivered, 40_000.0, false),
        ];
        let groups = group_by(&rows, GroupKey::Supplier);
        let small = groups.iter().find(|g| g.key == "Small").unwrap();
        assert_eq!(small.cost_share, 20.0);
    }

    #[test]
    fn group_totals_are_conserved_for_every_key() {
        let mut rows = ten_with_three_delayed();
        rows.push(shipment("X", "(unassigned)", "UPS", DeliveryStatus::Pending, 333.33, false));
        rows.push(shipment("Y", "Beta", "DHL", DeliveryStatus::InTransit, 12.5, false));
        let expected_cost = total_cost(&rows);
        let expected_qty = total_quantity(&rows);

        for key in GroupKey::ALL {
            let groups = group_by(&rows, key);
            let cost: f64 = groups.iter().map(|g| g.total_cost).sum();
            let qty: u64 = groups.iter().map(|g| g.quantity).sum();
            let count: usize = groups.iter().map(|g| g.shipments).sum();
            assert!((cost - expected_cost).abs() < 1e-6, "{:?}", key);
            assert_eq!(qty, expected_qty);
            assert_eq!(count, rows.len());
        }
    }

    #[test]
    fn overview_rates_follow_categories() {
        let mut rows = ten_with_three_delayed();
        rows.push(shipment("T", "Beta", "DHL", DeliveryStatus::InTransit, 50.0, false));
        let on_time = overview(&rows, date(2024, 3, 1));
        assert_eq!(on_time.categories.on_track, 1);
        let overdue = overview(&rows, date(2024, 4, 1));
        assert_eq!(overdue.categories.overdue, 1);
        let counted: usize = PerformanceCategory::ALL
            .iter()
            .map(|c| overdue.categories.count(*c))
            .sum();
        assert_eq!(counted, rows.len());
        assert_eq!(overdue.total_suppliers, 2);
        assert_eq!(overdue.risk_level, RiskLevel::High);
    }

    #[test]
    fn supplier_score_rewards_delivery_and_cheapness() {
        let rows = vec![
            shipment("A", "Cheap", "UPS", DeliveryStatus::Delivered, 100.0, false),
            shipment("B", "Pricey", "UPS", DeliveryStatus::Delivered, 400.0, false),
        ];
        let suppliers = supplier_performance(&rows);
        assert_eq!(suppliers[0].supplier, "Cheap");
        assert_eq!(suppliers[0].performance_score, 60.0 + 75.0 * 0.4);
        assert_eq!(suppliers[1].performance_score, 60.0);
    }

    #[test]
    fn partner_reliability_is_on_time_minus_delay() {
        let rows = vec![
            shipment("A", "S", "Good", DeliveryStatus::Delivered, 10.0, false),
            shipment("B", "S", "Bad", DeliveryStatus::Delayed, 10.0, false),
            shipment("C", "S", "Bad", DeliveryStatus::Delivered, 10.0, false),
        ];
        let partners = partner_performance(&rows);
        assert_eq!(partners[0].partner, "Good");
        assert_eq!(partners[0].reliability_score, 100.0);
        assert_eq!(partners[1].reliability_score, 0.0);
    }

    #[test]
    fn late_delivery_counts_once_against_reliability() {
        let rows = vec![
            shipment("A", "S", "Late", DeliveryStatus::Delivered, 10.0, true),
            shipment("B", "S", "Late", DeliveryStatus::Delivered, 10.0, false),
        ];
        let late = &partner_performance(&rows)[0];
        assert_eq!(late.delivery_rate, 100.0);
        assert_eq!(late.on_time_rate, 50.0);
        assert_eq!(late.delay_rate, 50.0);
        assert_eq!(late.delayed_status_rate, 0.0);
        assert_eq!(late.reliability_score, 0.0);
    }

    #[test]
    fn mode_breaks_ties_alphabetically() {
        assert_eq!(mode(["Sea", "Air", "Sea", "Air"].into_iter()), "Air");
        assert_eq!(mode(std::iter::empty()), "Unknown");
    }

    #[test]
    fn warehouse_turnover_counts_delivered_units() {
        let rows = vec![
            shipment("A", "S", "P", DeliveryStatus::Delivered, 10.0, false),
            shipment("B", "S", "P", DeliveryStatus::Pending, 10.0, false),
        ];
        let warehouses = warehouse_performance(&rows);
        assert_eq!(warehouses[0].turnover_rate, 50.0);
    }
}

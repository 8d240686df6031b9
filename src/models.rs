use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ValidationError;

/// Group label used for shipments whose dimension value is empty
pub const UNASSIGNED: &str = "(unassigned)";

/// Raw record from CSV ingestion, one string per schema column
#[derive(Debug, Clone, Default)]
pub struct CsvRecord {
    pub line: u64,
    pub order_id: String,
    pub product: String,
    pub supplier: String,
    pub warehouse: String,
    pub logistics_partner: String,
    pub shipping_method: String,
    pub quantity: String,
    pub unit_price: String,
    pub total_cost: Option<String>,
    pub promised_date: String,
    pub actual_date: String,
    pub status: String,
}

/// Delivery status as recorded in the source file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeliveryStatus {
    Delivered,
    InTransit,
    Pending,
    Delayed,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 4] = [
        DeliveryStatus::Delivered,
        DeliveryStatus::InTransit,
        DeliveryStatus::Pending,
        DeliveryStatus::Delayed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::InTransit => "In Transit",
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Delayed => "Delayed",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, DeliveryStatus::InTransit | DeliveryStatus::Pending)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "delivered" => Ok(DeliveryStatus::Delivered),
            "intransit" => Ok(DeliveryStatus::InTransit),
            "pending" => Ok(DeliveryStatus::Pending),
            "delayed" => Ok(DeliveryStatus::Delayed),
            _ => Err(format!(
                "expected one of Delivered, In Transit, Pending, Delayed; got '{}'",
                s.trim()
            )),
        }
    }
}

/// Delivery performance bucket relative to an as-of date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PerformanceCategory {
    Delivered,
    OnTrack,
    Overdue,
    Delayed,
}

impl PerformanceCategory {
    pub const ALL: [PerformanceCategory; 4] = [
        PerformanceCategory::Delivered,
        PerformanceCategory::OnTrack,
        PerformanceCategory::Overdue,
        PerformanceCategory::Delayed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceCategory::Delivered => "Delivered",
            PerformanceCategory::OnTrack => "On-Track",
            PerformanceCategory::Overdue => "Overdue",
            PerformanceCategory::Delayed => "Delayed",
        }
    }
}

/// Dimension a shipment table can be grouped by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Supplier,
    Product,
    Warehouse,
    LogisticsPartner,
    ShippingMethod,
}

impl GroupKey {
    pub const ALL: [GroupKey; 5] = [
        GroupKey::Supplier,
        GroupKey::Product,
        GroupKey::Warehouse,
        GroupKey::LogisticsPartner,
        GroupKey::ShippingMethod,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::Supplier => "Supplier",
            GroupKey::Product => "Product",
            GroupKey::Warehouse => "Warehouse Location",
            GroupKey::LogisticsPartner => "Logistics Partner",
            GroupKey::ShippingMethod => "Shipping Method",
        }
    }
}

impl FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "supplier" | "suppliers" => Ok(GroupKey::Supplier),
            "product" | "products" => Ok(GroupKey::Product),
            "warehouse" | "warehouses" | "warehouse_location" => Ok(GroupKey::Warehouse),
            "partner" | "partners" | "logistics_partner" => Ok(GroupKey::LogisticsPartner),
            "method" | "shipping_method" => Ok(GroupKey::ShippingMethod),
            other => Err(format!("unknown grouping key '{}'", other)),
        }
    }
}

/// A single shipment with its derived columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub order_id: String,
    pub product: String,
    pub supplier: String,
    pub warehouse: String,
    pub logistics_partner: String,
    pub shipping_method: String,
    pub quantity: u64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub promised_date: NaiveDate,
    pub actual_date: Option<NaiveDate>,
    pub status: DeliveryStatus,
    /// Actual date after promised date, or flagged Delayed while undelivered
    pub delayed: bool,
    /// Recorded total cost minus quantity times unit cost
    pub cost_delta: f64,
}

impl Shipment {
    pub fn key(&self, key: GroupKey) -> &str {
        match key {
            GroupKey::Supplier => &self.supplier,
            GroupKey::Product => &self.product,
            GroupKey::Warehouse => &self.warehouse,
            GroupKey::LogisticsPartner => &self.logistics_partner,
            GroupKey::ShippingMethod => &self.shipping_method,
        }
    }

    pub fn performance_category(&self, as_of: NaiveDate) -> PerformanceCategory {
        if self.delayed {
            return PerformanceCategory::Delayed;
        }
        if self.status.is_in_progress() && self.actual_date.is_none() {
            return if self.promised_date >= as_of {
                PerformanceCategory::OnTrack
            } else {
                PerformanceCategory::Overdue
            };
        }
        PerformanceCategory::Delivered
    }

    /// Days between promised and actual delivery (positive = late)
    pub fn slip_days(&self) -> Option<i64> {
        self.actual_date
            .map(|actual| (actual - self.promised_date).num_days())
    }

    fn has_unassigned_dimension(&self) -> bool {
        GroupKey::ALL.iter().any(|k| self.key(*k) == UNASSIGNED)
    }
}

pub fn compute_delayed(
    promised: NaiveDate,
    actual: Option<NaiveDate>,
    status: DeliveryStatus,
) -> bool {
    match actual {
        Some(actual) => actual > promised,
        None => status == DeliveryStatus::Delayed,
    }
}

/// Immutable in-memory table loaded from one source file
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    shipments: Vec<Shipment>,
}

impl Dataset {
    pub fn new(source: impl AsRef<Path>, shipments: Vec<Shipment>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            shipments,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }

    pub fn unassigned_count(&self) -> usize {
        self.shipments
            .iter()
            .filter(|s| s.has_unassigned_dimension())
            .count()
    }
}

// ============================================================================
// Field parsing
// ============================================================================

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn invalid(line: u64, column: &str, value: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        line,
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn dimension(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNASSIGNED.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_money(line: u64, column: &str, value: &str) -> Result<f64, ValidationError> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| invalid(line, column, value, "not a number"))?;
    if !amount.is_finite() {
        return Err(invalid(line, column, value, "not a finite number"));
    }
    if amount < 0.0 {
        return Err(invalid(line, column, value, "must not be negative"));
    }
    Ok(amount)
}

impl CsvRecord {
    pub fn to_shipment(&self) -> Result<Shipment, ValidationError> {
        let line = self.line;

        let order_id = self.order_id.trim().to_string();
        if order_id.is_empty() {
            return Err(invalid(line, "Order ID", &self.order_id, "must not be empty"));
        }

        let quantity: u64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| invalid(line, "Quantity", &self.quantity, "not a whole number"))?;
        let unit_cost = parse_money(line, "Unit Price", &self.unit_price)?;
        let expected_total = quantity as f64 * unit_cost;
        let total_cost = match self.total_cost.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_money(line, "Total Cost", raw)?,
            _ => expected_total,
        };

        let promised_date = parse_date(&self.promised_date).ok_or_else(|| {
            invalid(line, "Promised Date", &self.promised_date, "unrecognized date")
        })?;
        let actual_date = if self.actual_date.trim().is_empty() {
            None
        } else {
            Some(parse_date(&self.actual_date).ok_or_else(|| {
                invalid(line, "Actual Delivery Date", &self.actual_date, "unrecognized date")
            })?)
        };

        let status: DeliveryStatus = self
            .status
            .parse()
            .map_err(|reason: String| invalid(line, "Delivery Status", &self.status, reason))?;

        Ok(Shipment {
            order_id,
            product: dimension(&self.product),
            supplier: dimension(&self.supplier),
            warehouse: dimension(&self.warehouse),
            logistics_partner: dimension(&self.logistics_partner),
            shipping_method: dimension(&self.shipping_method),
            quantity,
            unit_cost,
            total_cost,
            promised_date,
            actual_date,
            status,
            delayed: compute_delayed(promised_date, actual_date, status),
            cost_delta: total_cost - expected_total,
        })
    }
}

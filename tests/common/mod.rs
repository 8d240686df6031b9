// ==========================================
// Shared fixtures for integration tests
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

use supply_chain_ops::api::DashboardService;
use supply_chain_ops::insights::InsightProvider;
use supply_chain_ops::inventory::AbcPolicy;
use supply_chain_ops::logging;

pub const HEADER: &str = "Order ID,Product,Supplier,Warehouse Location,Logistics Partner,Shipping Method,Quantity,Unit Price,Total Cost,Promised Date,Actual Delivery Date,Delivery Status";

/// Ten orders on two partners. SlowCo carries all three delayed orders (two
/// late by date, one by status); FastShip never slips. Total cost is 3880.
pub const ROWS: [&str; 10] = [
    "ORD-001,Motor,Acme,Dallas,FastShip,Ground,2,500.00,1000.00,2024-03-01,2024-02-28,Delivered",
    "ORD-002,Motor,Beta,Dallas,SlowCo,Air,1,550.00,550.00,2024-03-02,2024-03-06,Delayed",
    "ORD-003,Bearing,Acme,Austin,FastShip,Ground,100,4.00,400.00,2024-03-03,2024-03-03,Delivered",
    "ORD-004,Bearing,Beta,Austin,SlowCo,Sea,50,5.00,250.00,2024-03-04,,Delayed",
    "ORD-005,Gasket,Cobalt,Dallas,FastShip,Ground,200,1.00,200.00,2024-03-20,,In Transit",
    "ORD-006,Gasket,Cobalt,Austin,SlowCo,Ground,100,1.20,120.00,2024-03-10,,Pending",
    "ORD-007,Valve,Acme,Dallas,FastShip,Air,10,30.00,300.00,2024-03-05,2024-03-05,Delivered",
    "ORD-008,Valve,Beta,Austin,SlowCo,Ground,10,32.00,320.00,2024-03-06,2024-03-09,Delivered",
    "ORD-009,Motor,Acme,Dallas,FastShip,Ground,1,500.00,500.00,2024-03-07,2024-03-07,Delivered",
    "ORD-010,Bearing,Cobalt,Dallas,FastShip,Sea,60,4.00,240.00,2024-03-08,2024-03-08,Delivered",
];

pub const TOTAL_COST: f64 = 3880.0;

pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn write_csv(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn sample_csv() -> NamedTempFile {
    write_csv(HEADER, &ROWS)
}

pub fn service(path: &Path, provider: Arc<dyn InsightProvider>) -> DashboardService {
    logging::init_test();
    DashboardService::new(path, as_of(), AbcPolicy::default(), provider)
}

//! Sample data generator for the supply-chain dashboard
//!
//! Writes a synthetic shipment CSV in the loader's schema. Partners and
//! suppliers get fixed reliability profiles so the dashboards show contrast.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --rows <N>           Number of orders (default: 300)
//!   --start <DATE>       First promised date (default: 2024-01-01)
//!   --days <N>           Spread of promised dates in days (default: 180)
//!   --as-of <DATE>       Orders promised after this date are still open (default: 2024-06-01)
//!   --seed <N>           Random seed for reproducibility (optional)
//!   --output <PATH>      Output CSV path (default: data/supply_chain_data.csv)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::PathBuf;

use supply_chain_ops::models::parse_date;

/// Sample shipment data generator
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate a synthetic supply-chain shipment CSV")]
struct Args {
    /// Number of orders to generate
    #[arg(long, default_value = "300")]
    rows: usize,

    /// First promised delivery date
    #[arg(long, default_value = "2024-01-01", value_parser = parse_cli_date)]
    start: NaiveDate,

    /// Spread of promised dates in days
    #[arg(long, default_value = "180")]
    days: i64,

    /// Orders promised after this date are left pending or in transit
    #[arg(long, default_value = "2024-06-01", value_parser = parse_cli_date)]
    as_of: NaiveDate,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/supply_chain_data.csv")]
    output: PathBuf,
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("unrecognized date '{}'", value))
}

// ============================================================================
// Catalog
// ============================================================================

/// (product, base unit price)
const PRODUCTS: [(&str, f64); 8] = [
    ("Industrial Motor", 840.0),
    ("Hydraulic Pump", 520.0),
    ("Control Panel", 310.0),
    ("Steel Bearing", 45.0),
    ("Copper Wire Spool", 120.0),
    ("Safety Valve", 85.0),
    ("Rubber Gasket", 6.5),
    ("Fastener Kit", 12.0),
];

/// (supplier, price multiplier)
const SUPPLIERS: [(&str, f64); 5] = [
    ("Apex Components", 1.00),
    ("Brightline Manufacturing", 0.92),
    ("Cobalt Industrial", 1.12),
    ("Delta Parts Co", 0.97),
    ("Evergreen Supply", 1.05),
];

/// (partner, probability a shipment slips)
const PARTNERS: [(&str, f64); 4] = [
    ("Swift Logistics", 0.12),
    ("Global Freight", 0.22),
    ("Coastal Carriers", 0.38),
    ("Prime Transport", 0.08),
];

const WAREHOUSES: [&str; 4] = ["Chicago", "Dallas", "Atlanta", "Los Angeles"];

const METHODS: [&str; 3] = ["Ground", "Air", "Sea"];

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Serialize)]
struct OutputRecord {
    #[serde(rename = "Order ID")]
    order_id: String,
    #[serde(rename = "Product")]
    product: &'static str,
    #[serde(rename = "Supplier")]
    supplier: &'static str,
    #[serde(rename = "Warehouse Location")]
    warehouse: &'static str,
    #[serde(rename = "Logistics Partner")]
    partner: &'static str,
    #[serde(rename = "Shipping Method")]
    method: &'static str,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Unit Price")]
    unit_price: String,
    #[serde(rename = "Total Cost")]
    total_cost: String,
    #[serde(rename = "Promised Date")]
    promised_date: String,
    #[serde(rename = "Actual Delivery Date")]
    actual_date: String,
    #[serde(rename = "Delivery Status")]
    status: &'static str,
}

fn generate_order(index: usize, args: &Args, rng: &mut impl Rng) -> OutputRecord {
    let (product, base_price) = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
    let (supplier, multiplier) = SUPPLIERS[rng.gen_range(0..SUPPLIERS.len())];
    let (partner, slip_probability) = PARTNERS[rng.gen_range(0..PARTNERS.len())];
    let warehouse = WAREHOUSES[rng.gen_range(0..WAREHOUSES.len())];
    let method = METHODS[rng.gen_range(0..METHODS.len())];

    let quantity: u32 = if base_price > 200.0 {
        rng.gen_range(1..=20)
    } else {
        rng.gen_range(20..=500)
    };
    // Price noise of ±5% around the supplier's list price
    let unit_price = base_price * multiplier * rng.gen_range(0.95..=1.05);
    let unit_price = (unit_price * 100.0).round() / 100.0;
    let total_cost = unit_price * quantity as f64;

    let promised = args.start + Duration::days(rng.gen_range(0..args.days.max(1)));
    let slips = rng.gen_bool(slip_probability);

    let (status, actual) = if promised > args.as_of {
        if rng.gen_bool(0.5) {
            ("In Transit", None)
        } else {
            ("Pending", None)
        }
    } else if slips {
        if rng.gen_bool(0.4) {
            // Still outstanding
            ("Delayed", None)
        } else {
            ("Delayed", Some(promised + Duration::days(rng.gen_range(1..=14))))
        }
    } else {
        ("Delivered", Some(promised - Duration::days(rng.gen_range(0..=3))))
    };

    OutputRecord {
        order_id: format!("ORD-{:05}", index + 1),
        product,
        supplier,
        warehouse,
        partner,
        method,
        quantity,
        unit_price: format!("{:.2}", unit_price),
        total_cost: format!("{:.2}", total_cost),
        promised_date: promised.format("%Y-%m-%d").to_string(),
        actual_date: actual
            .map(|d: NaiveDate| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        status,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Sample Data Generator");
    println!("{}", "=".repeat(60));
    println!("Output:           {}", args.output.display());
    println!("Orders:           {}", args.rows);
    println!(
        "Promised dates:   {} + {} days",
        args.start, args.days
    );
    println!("Open after:       {}", args.as_of);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    // Initialize RNG
    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    // Ensure output directory exists
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)
        .with_context(|| format!("opening {}", args.output.display()))?;

    let mut delayed = 0usize;
    for index in 0..args.rows {
        let record = generate_order(index, &args, &mut rng);
        if record.status == "Delayed" {
            delayed += 1;
        }
        writer.serialize(&record)?;
    }
    writer.flush()?;

    println!("Wrote {} orders ({} delayed)", args.rows, delayed);
    Ok(())
}

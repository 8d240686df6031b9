use anyhow::Result;
use clap::Parser;
use tracing::info;

use supply_chain_ops::config::DataArgs;
use supply_chain_ops::loader::load_dataset;
use supply_chain_ops::models::GroupKey;
use supply_chain_ops::{logging, metrics};

/// Load the shipment file and log headline figures
#[derive(Parser, Debug)]
#[command(name = "supply_chain_ops")]
struct Args {
    #[command(flatten)]
    data: DataArgs,
}

fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let dataset = load_dataset(&args.data.data_path)?;
    let shipments = dataset.shipments();

    let overview = metrics::overview(shipments, args.data.as_of());
    info!(
        "=== {} orders, ${:.0} total cost, {:.1}% delayed ===",
        overview.total_orders,
        overview.total_cost,
        metrics::delay_rate(shipments)
    );

    for key in [GroupKey::LogisticsPartner, GroupKey::Supplier] {
        for group in metrics::group_by(shipments, key) {
            info!(
                "{} {:24} orders={:<5} delay={:>5.1}% cost_share={:>5.1}%",
                key.label(),
                group.key,
                group.shipments,
                group.delay_rate,
                group.cost_share
            );
        }
    }

    info!(
        "Overall status: {} (risk {})",
        overview.overall_status.label(),
        overview.risk_level.label()
    );
    Ok(())
}

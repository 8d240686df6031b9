//! REST API server for the supply-chain dashboard
//!
//! Usage:
//!   ./target/release/api_server [options]
//!
//! Options:
//!   --port PORT                 Port to listen on (default: 8080, env PORT)
//!   --data-path PATH            Shipment CSV (env SUPPLY_DATA_PATH)
//!   --as-of DATE                Reference date for overdue orders (env SUPPLY_AS_OF)
//!   --insight-endpoint URL      Chat-completions endpoint (env INSIGHT_ENDPOINT)
//!
//! REST endpoints:
//!   GET /api/v1/health              - Health check
//!   GET /api/v1/views               - Available views
//!   GET /api/v1/views/:view         - View payload (overview, risk, performance, inventory, cost, ai_insights)
//!   GET /api/v1/charts/:view        - Chart specifications for a view
//!   GET /api/v1/insights?question=X - AI Insights with a custom question
//!   GET /api/v1/groups/:key         - Summary by supplier, product, warehouse, partner or method
//!   GET /api/v1/suppliers           - Supplier performance (with optional ?limit=N)
//!   GET /api/v1/partners            - Logistics partner performance
//!   GET /api/v1/products            - Products with ABC class (with optional ?limit=N)

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use supply_chain_ops::api::{create_rest_router, DashboardService};
use supply_chain_ops::config::{DataArgs, InsightArgs};
use supply_chain_ops::insights::build_provider;
use supply_chain_ops::logging;

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve the supply-chain dashboard views as JSON")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    insight: InsightArgs,
}

fn print_banner(args: &Args, insights_enabled: bool) {
    println!("============================================================");
    println!("         SUPPLY CHAIN DASHBOARD API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", args.port);
    println!("  REST:     http://localhost:{}/api/v1/", args.port);
    println!("  Data:     {}", args.data.data_path.display());
    println!("  As of:    {}", args.data.as_of());
    println!(
        "  Insights: {}",
        if insights_enabled {
            args.insight.endpoint.as_deref().unwrap_or_default()
        } else {
            "not configured"
        }
    );
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/views               Available views");
    println!("  GET /api/v1/views/:view         View payload");
    println!("  GET /api/v1/charts/:view        Chart specifications");
    println!("  GET /api/v1/insights            AI insights");
    println!("  GET /api/v1/groups/:key         Group summaries");
    println!("  GET /api/v1/suppliers           Supplier performance");
    println!("  GET /api/v1/partners            Partner performance");
    println!("  GET /api/v1/products            Products and ABC classes");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let policy = args.data.abc_policy()?;
    let insight_config = args.insight.to_config();
    let insights_enabled = insight_config.is_some();
    let provider = build_provider(insight_config)?;

    print_banner(&args, insights_enabled);

    // Create shared dashboard service
    let service = Arc::new(DashboardService::new(
        args.data.data_path.clone(),
        args.data.as_of(),
        policy,
        provider,
    ));

    // Surface schema problems at startup; requests retry the load anyway
    if let Err(e) = service.snapshot().await {
        tracing::warn!("Initial load failed: {}", e);
    }

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    let app = create_rest_router(service);
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

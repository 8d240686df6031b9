//! Terminal dashboard report
//! Run: ./target/release/report --view risk

use anyhow::Result;
use clap::Parser;

use supply_chain_ops::api::DashboardService;
use supply_chain_ops::charts::{render_text, ChartSpec};
use supply_chain_ops::config::{DataArgs, InsightArgs};
use supply_chain_ops::insights::{build_provider, Narrative};
use supply_chain_ops::logging;
use supply_chain_ops::models::PerformanceCategory;
use supply_chain_ops::risk::PARTNER_DELAY_TARGET;
use supply_chain_ops::views::{
    AiInsightsView, CostView, InventoryView, OverviewView, PerformanceView, RiskView, View,
    ViewPayload,
};

#[derive(Parser, Debug)]
#[command(name = "report")]
#[command(about = "Print dashboard views to the terminal")]
struct Args {
    /// View to print; all views when omitted
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Question for the AI Insights view
    #[arg(long)]
    question: Option<String>,

    /// Skip the text charts
    #[arg(long)]
    no_charts: bool,

    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    insight: InsightArgs,
}

fn header(title: &str) {
    println!("\n{}", "=".repeat(75));
    println!("  {}", title.to_uppercase());
    println!("{}\n", "=".repeat(75));
}

fn section(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(70));
}

fn money(value: f64) -> String {
    format!("${:.0}", value)
}

fn print_overview(view: &OverviewView) {
    let m = &view.metrics;
    section("KEY METRICS");
    println!("  As of:                 {}", m.as_of);
    println!("  Orders:                {}", m.total_orders);
    println!(
        "  Suppliers / Products:  {} / {}",
        m.total_suppliers, m.total_products
    );
    println!(
        "  Warehouses / Partners: {} / {}",
        m.total_warehouses, m.total_logistics_partners
    );
    println!("  Total cost:            {}", money(m.total_cost));
    println!(
        "  Delivered:             {:.1}% (avg slip {:+.1}d)",
        m.completed_delivery_rate, m.avg_delivery_slip_days
    );
    println!("  On-track:              {:.1}%", m.on_track_rate);
    println!("  Overdue:               {:.1}%", m.overdue_rate);
    println!("  Delayed:               {:.1}%", m.delayed_rate);
    println!(
        "  Performance:           {:.1}% ({})",
        m.overall_performance_rate,
        m.overall_status.label()
    );
    println!("  Risk level:            {}", m.risk_level.label());

    section("ORDERS BY CATEGORY");
    for category in PerformanceCategory::ALL {
        println!(
            "  {:12} {:>6}",
            category.label(),
            m.categories.count(category)
        );
    }

    section("TOP SUPPLIERS");
    println!(
        "  {:28} {:>12} {:>10} {:>8} {:>10}",
        "Supplier", "Spend", "On-Time%", "Score", "Method"
    );
    for s in &view.top_suppliers {
        println!(
            "  {:28} {:>12} {:>9.1}% {:>8.1} {:>10}",
            s.supplier,
            money(s.total_cost),
            s.on_time_delivery_rate,
            s.performance_score,
            s.primary_shipping_method
        );
    }

    section("LOGISTICS PARTNERS");
    println!(
        "  {:24} {:>8} {:>10} {:>9} {:>12}",
        "Partner", "Orders", "Delivered%", "Delayed%", "Reliability"
    );
    for p in &view.partners {
        println!(
            "  {:24} {:>8} {:>9.1}% {:>8.1}% {:>12.1}",
            p.partner, p.shipments, p.delivery_rate, p.delay_rate, p.reliability_score
        );
    }

    section("FINDINGS");
    for finding in &view.findings {
        println!("  - {}", finding);
    }
}

fn print_risk(view: &RiskView) {
    let a = &view.assessment;
    section("RISK ASSESSMENT");
    println!(
        "  {} ({} of {} orders delayed, {:.1}%)",
        a.tier.label(),
        a.delayed_orders,
        a.total_orders,
        a.delayed_rate
    );
    for finding in &a.findings {
        println!("  - {}", finding);
    }

    section("DELAY RATE BY PARTNER");
    for p in &a.partner_delays {
        let flag = if p.delay_rate > PARTNER_DELAY_TARGET { "ABOVE TARGET" } else { "" };
        println!(
            "  {:24} {:>6} {:>7.1}% {}",
            p.partner, p.shipments, p.delay_rate, flag
        );
    }

    section("RECOMMENDED ACTIONS");
    println!("  Immediate:");
    for action in &view.immediate_actions {
        println!("    - {}", action);
    }
    println!("  Strategic:");
    for action in &view.strategic_actions {
        println!("    - {}", action);
    }
}

fn print_performance(view: &PerformanceView) {
    section("KEY PERFORMANCE METRICS");
    println!("  Delivery success rate:    {:.1}%", view.delivery_success_rate);
    println!("  Average order cost:       {}", money(view.avg_order_cost));
    println!(
        "  Best shipping method:     {}",
        view.best_shipping_method.as_deref().unwrap_or("n/a")
    );
    println!(
        "  Orders needing attention: {}/{}",
        view.orders_needing_attention, view.total_orders
    );

    section("DELIVERY STATUS SUMMARY");
    println!(
        "  {:12} {:>8} {:>8} {:>12} {:>10} {:>12} {:>12}",
        "Status", "Orders", "%", "Total", "Avg", "Earliest", "Latest"
    );
    for row in &view.status_summary {
        println!(
            "  {:12} {:>8} {:>7.1}% {:>12} {:>10} {:>12} {:>12}",
            row.label,
            row.orders,
            row.percentage,
            money(row.total_cost),
            money(row.avg_cost),
            row.earliest_promised
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.latest_promised.map(|d| d.to_string()).unwrap_or_default()
        );
    }

    section("WAREHOUSES");
    println!(
        "  {:16} {:>8} {:>12} {:>9} {:>10}",
        "Warehouse", "Orders", "Cost", "Delayed%", "Turnover%"
    );
    for w in &view.warehouses {
        println!(
            "  {:16} {:>8} {:>12} {:>8.1}% {:>9.1}%",
            w.warehouse,
            w.orders,
            money(w.total_cost),
            w.delay_rate,
            w.turnover_rate
        );
    }
}

fn print_inventory(view: &InventoryView) {
    let k = &view.kpis;
    section("INVENTORY KPIS");
    println!("  Inventory value:  {}", money(k.total_inventory_value));
    println!("  Units:            {}", k.total_quantity);
    println!("  Turnover:         {:.1}%", k.turnover_rate);
    println!("  Products:         {}", k.unique_products);

    section("ABC CLASSIFICATION");
    println!(
        "  {:28} {:>12} {:>8} {:>10} {:>6}",
        "Product", "Value", "Share%", "Cumul%", "Class"
    );
    for p in &view.products {
        println!(
            "  {:28} {:>12} {:>7.1}% {:>9.1}% {:>6}",
            p.product,
            money(p.total_value),
            p.value_share,
            p.cumulative_share,
            p.class.label()
        );
    }
    for b in &view.abc {
        println!(
            "  Class {}: {} products, {:.1}% of value",
            b.class.label(),
            b.products,
            b.value_share
        );
    }

    section("KEY INSIGHTS");
    for insight in &view.insights {
        println!("  - {}", insight);
    }
}

fn print_cost(view: &CostView) {
    let k = &view.kpis;
    section("COST OVERVIEW");
    println!("  Total spend:        {}", money(k.total_cost));
    println!("  Avg unit cost:      ${:.2}", k.avg_unit_cost);
    println!(
        "  Potential savings:  {} ({:.1}%)",
        money(k.potential_savings),
        k.savings_percentage
    );
    println!(
        "  Delayed spend:      {} ({:.1}%)",
        money(k.delayed_cost),
        k.delay_cost_impact
    );

    section("SUPPLIER SPEND");
    for g in &view.supplier_costs {
        println!(
            "  {:28} {:>12} {:>7.1}%",
            g.key,
            money(g.total_cost),
            g.cost_share
        );
    }

    section("RECOMMENDATIONS");
    if view.recommendations.is_empty() {
        println!("  No cost issues detected");
    }
    for rec in &view.recommendations {
        println!("  - {}", rec);
    }
}

fn print_insights(view: &AiInsightsView) {
    section("QUESTION");
    println!("  {}", view.question);
    section("NARRATIVE");
    match &view.narrative {
        Narrative::Available { text } => {
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        Narrative::Unavailable { reason } => {
            println!("  Insights unavailable ({}); showing metrics only.", reason);
        }
    }
    section("METRICS");
    println!("  Orders:        {}", view.metrics.total_orders);
    println!("  Total cost:    {}", money(view.metrics.total_cost));
    println!(
        "  Delayed:       {:.1}% ({})",
        view.risk.delayed_rate,
        view.risk.tier.label()
    );
    println!(
        "  Savings:       {} ({:.1}%)",
        money(view.cost.potential_savings),
        view.cost.savings_percentage
    );
}

fn print_charts(charts: &[ChartSpec]) {
    for chart in charts {
        println!();
        for line in render_text(chart).lines() {
            println!("  {}", line);
        }
    }
}

fn print_view(payload: &ViewPayload, with_charts: bool) {
    header(payload.view().label());
    match payload {
        ViewPayload::Overview(v) => print_overview(v),
        ViewPayload::Risk(v) => print_risk(v),
        ViewPayload::Performance(v) => print_performance(v),
        ViewPayload::Inventory(v) => print_inventory(v),
        ViewPayload::Cost(v) => print_cost(v),
        ViewPayload::AiInsights(v) => print_insights(v),
    }
    if with_charts {
        print_charts(payload.charts());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let service = DashboardService::new(
        args.data.data_path.clone(),
        args.data.as_of(),
        args.data.abc_policy()?,
        build_provider(args.insight.to_config())?,
    );

    let views: Vec<View> = match args.view {
        Some(view) => vec![view],
        None => View::ALL.to_vec(),
    };

    for view in views {
        let payload = service.view(view, args.question.as_deref()).await?;
        print_view(&payload, !args.no_charts);
    }

    println!();
    Ok(())
}


use anyhow::{Context, Result};
use cafeteria::app::{handle_fatal_error, initialize_app, AppConfig};
use cafeteria::kitchen::{Cafeteria, OrderId, PoolMetrics};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info};

/// Cook hot dogs on a shared gas cooker
#[derive(Parser)]
#[command(name = "cafeteria")]
#[command(about = "Hot dog cafeteria - many orders, one gas cooker", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv adds line numbers)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a kitchen configuration file (defaults to ./cafeteria.toml if present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a batch of orders and wait for all of them (default command)
    Run {
        /// Number of hot dogs to order
        #[arg(short = 'n', long, default_value = "10")]
        orders: usize,

        /// Override the number of burners on the gas cooker
        #[arg(short, long)]
        burners: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective kitchen configuration as TOML
    Config,
}

#[derive(Debug, Serialize)]
struct OrderReport {
    order_id: OrderId,
    finished_ms: u64,
    bake_ms: Option<u64>,
    fry_ms: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    orders: Vec<OrderReport>,
    succeeded: usize,
    failed: usize,
    elapsed_ms: u64,
    gas_cooker: PoolMetrics,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app = AppConfig::new(cli.verbose).with_config_file(cli.config);

    let result = match cli.command {
        Some(Commands::Run {
            orders,
            burners,
            json,
        }) => run_orders(&app, orders, burners, json).await,
        Some(Commands::Config) => show_config(&app).await,
        None => run_orders(&app, 10, None, false).await,
    };

    if let Err(e) = result {
        handle_fatal_error(e, cli.verbose);
    }
}

async fn run_orders(
    app: &AppConfig,
    orders: usize,
    burners: Option<usize>,
    json: bool,
) -> Result<()> {
    let app = app.clone().with_burners(burners);
    let kitchen = initialize_app(&app).await?;

    let cafeteria = Cafeteria::new(Handle::current(), kitchen);
    let started = Instant::now();

    let pending: Vec<_> = (0..orders)
        .map(|_| {
            let (tx, rx) = oneshot::channel();
            let order_id = cafeteria.order_hot_dog(move |result| {
                let _ = tx.send((result, Instant::now()));
            });
            (order_id, rx)
        })
        .collect();
    info!(orders, "All orders placed");

    let mut reports = Vec::with_capacity(pending.len());
    for (order_id, rx) in pending {
        let (result, finished) = rx
            .await
            .with_context(|| format!("Order {order_id} dropped its handler"))?;
        let finished_ms = finished.duration_since(started).as_millis() as u64;
        let report = match result {
            Ok(hot_dog) => OrderReport {
                order_id,
                finished_ms,
                bake_ms: Some(hot_dog.bake_time().as_millis() as u64),
                fry_ms: Some(hot_dog.fry_time().as_millis() as u64),
                error: None,
            },
            Err(e) => OrderReport {
                order_id,
                finished_ms,
                bake_ms: None,
                fry_ms: None,
                error: Some(e.to_string()),
            },
        };
        debug!(?report, "Order resolved");
        reports.push(report);
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    let report = RunReport {
        succeeded: reports.len() - failed,
        failed,
        orders: reports,
        elapsed_ms: started.elapsed().as_millis() as u64,
        gas_cooker: cafeteria.gas_cooker().metrics(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for order in &report.orders {
        match &order.error {
            None => println!(
                "Order {:>4}: ready at {:>6}ms (bread {}ms, sausage {}ms)",
                order.order_id,
                order.finished_ms,
                order.bake_ms.unwrap_or_default(),
                order.fry_ms.unwrap_or_default()
            ),
            Some(error) => println!(
                "Order {:>4}: failed at {:>6}ms: {}",
                order.order_id, order.finished_ms, error
            ),
        }
    }
    println!();
    println!(
        "{} ready, {} failed in {}ms",
        report.succeeded, report.failed, report.elapsed_ms
    );
    println!(
        "Gas cooker: {} burners, peak {} in use, {} acquisitions ({} queued)",
        report.gas_cooker.capacity,
        report.gas_cooker.peak_in_use,
        report.gas_cooker.total_acquisitions,
        report.gas_cooker.queued_acquisitions
    );
}

async fn show_config(app: &AppConfig) -> Result<()> {
    let kitchen = initialize_app(app).await?;
    print!("{}", toml::to_string_pretty(&kitchen)?);
    Ok(())
}

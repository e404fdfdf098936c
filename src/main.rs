//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `route_scout` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use route_scout::config::{
    ProviderSettings, DB_PATH, DEFAULT_ATTOM_ENDPOINT, DEFAULT_ESTATED_ENDPOINT,
};
use route_scout::{
    build_providers, delete_route, enrich_all_routes, enrich_route, ingest_route,
    init_db_pool_with_path, list_for_route, list_routes, owner_stats, run_migrations, Config,
    EnrichmentReport, LogLevel, RouteSample,
};

#[derive(Parser)]
#[command(
    name = "route_scout",
    about = "Discovers real-estate listings along recorded GPS routes",
    version
)]
struct Cli {
    /// SQLite database path
    #[arg(long, default_value = DB_PATH, global = true)]
    db: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a route from a JSON file of GPS samples
    Ingest {
        /// JSON file containing an array of samples
        /// (timestamp, lat, lon, accuracy, speed)
        #[arg(long)]
        file: PathBuf,
        /// Owner reference the route belongs to
        #[arg(long)]
        owner: String,
        /// Date the route was driven (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Discover and associate properties along a route
    Enrich {
        /// Route to enrich
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        route_id: Option<i64>,
        /// Enrich every stored route
        #[arg(long)]
        all: bool,
        /// Override the search buffer in meters
        #[arg(long)]
        buffer_meters: Option<f64>,
        /// Override the property cache TTL in hours
        #[arg(long)]
        cache_ttl_hours: Option<i64>,
    },
    /// List properties discovered along a route
    Properties {
        #[arg(long)]
        route_id: i64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List recorded routes
    Routes {
        /// Only routes belonging to this owner
        #[arg(long)]
        owner: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Aggregate discovery statistics
    Stats {
        /// Only count routes belonging to this owner
        #[arg(long)]
        owner: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a route with its points and associations
    DeleteRoute {
        #[arg(long)]
        route_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists); provider
    // API keys are usually configured there.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let config = build_config(&cli);

    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    match cli.command {
        Command::Ingest { file, owner, date } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let samples: Vec<RouteSample> =
                serde_json::from_str(&raw).context("Failed to parse sample file")?;
            let report = ingest_route(&pool, &owner, date, &samples).await?;
            println!(
                "Stored route {} with {} points{}",
                report.route_id,
                report.point_count,
                match report.total_distance_meters {
                    Some(m) => format!(" ({:.2} km)", m / 1000.0),
                    None => " (no usable geometry)".to_string(),
                }
            );
        }
        Command::Enrich {
            route_id,
            all,
            buffer_meters,
            cache_ttl_hours,
        } => {
            let mut config = config;
            if let Some(buffer) = buffer_meters {
                config.buffer_meters = buffer;
            }
            if let Some(ttl) = cache_ttl_hours {
                config.cache_ttl_hours = ttl;
            }
            let providers = build_providers(&config).context("Failed to build providers")?;

            if all {
                let reports = enrich_all_routes(&pool, &providers, &config).await?;
                for report in &reports {
                    print_report(report);
                }
                let total: usize = reports.iter().map(|r| r.associated).sum();
                println!("Enriched {} routes: {} properties associated", reports.len(), total);
            } else {
                let route_id = route_id.expect("clap enforces route_id without --all");
                let report = enrich_route(&pool, &providers, &config, route_id).await?;
                print_report(&report);
            }
        }
        Command::Properties { route_id, json } => {
            let properties = list_for_route(&pool, route_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&properties)?);
            } else if properties.is_empty() {
                println!("No properties discovered for route {route_id}");
            } else {
                for p in &properties {
                    println!(
                        "{:>6.1} m  [{}]  {}  {}",
                        p.distance_meters,
                        p.rarity,
                        p.property
                            .price
                            .map(|v| format!("${v:.0}"))
                            .unwrap_or_else(|| "$?".to_string()),
                        p.property.address.as_deref().unwrap_or("(no address)"),
                    );
                }
                println!("{} properties for route {route_id}", properties.len());
            }
        }
        Command::Routes { owner, json } => {
            let routes = list_routes(&pool, owner.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&routes)?);
            } else if routes.is_empty() {
                println!("No routes stored");
            } else {
                for r in &routes {
                    println!(
                        "route {:>4}  {}  {}  {:>5} points  {:>7}  {} properties",
                        r.route.id,
                        r.route.recorded_date,
                        r.route.owner,
                        r.route.point_count,
                        r.route
                            .total_distance_meters
                            .map(|m| format!("{:.2} km", m / 1000.0))
                            .unwrap_or_else(|| "?".to_string()),
                        r.property_count,
                    );
                }
            }
        }
        Command::Stats { owner, json } => {
            let stats = owner_stats(&pool, owner.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "{} routes, {:.2} km driven, {} properties discovered",
                    stats.total_routes,
                    stats.total_distance_meters / 1000.0,
                    stats.total_properties
                );
                println!(
                    "rarity: {} legendary, {} epic, {} rare, {} common",
                    stats.rarity_breakdown.legendary,
                    stats.rarity_breakdown.epic,
                    stats.rarity_breakdown.rare,
                    stats.rarity_breakdown.common
                );
            }
        }
        Command::DeleteRoute { route_id } => {
            if delete_route(&pool, route_id).await? {
                println!("Deleted route {route_id}");
            } else {
                println!("Route {route_id} not found");
            }
        }
    }

    Ok(())
}

/// Maps CLI arguments and environment variables onto the library config.
fn build_config(cli: &Cli) -> Config {
    let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    Config {
        db_path: cli.db.clone(),
        primary: ProviderSettings {
            endpoint: env("ATTOM_ENDPOINT").or_else(|| Some(DEFAULT_ATTOM_ENDPOINT.to_string())),
            api_key: env("ATTOM_API_KEY"),
        },
        fallback: ProviderSettings {
            endpoint: env("ESTATED_ENDPOINT")
                .or_else(|| Some(DEFAULT_ESTATED_ENDPOINT.to_string())),
            api_key: env("ESTATED_API_KEY"),
        },
        ..Default::default()
    }
}

fn print_report(report: &EnrichmentReport) {
    println!(
        "Route {}: {} properties associated ({} new, {} updated), {} outside buffer, {} malformed skipped{}",
        report.route_id,
        report.associated,
        report.created,
        report.updated,
        report.outside_buffer,
        report.skipped_malformed,
        match report.provider {
            Some(name) => format!(" [provider: {name}]"),
            None => format!(" [{:?}]", report.outcome),
        }
    );
}

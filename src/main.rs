//! # Rahyab CLI
//!
//! Serves the city lookup and routing API, answers one-shot route queries,
//! and scans the city CSV for duplicate rows.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::error;

use rahyab::{
    run_server, AppState, CityDataset, Geocoder, RouterBackend, RouterConfig,
};

/// Command-line interface for rahyab
#[derive(Parser)]
#[command(name = "rahyab")]
#[command(about = "Iranian city lookup and driving-route web service")]
#[command(long_about = "Serves a JSON API over a city,lat,lng,province CSV file:
  rahyab serve ir.csv                      # Serve on port 3000 with live OSRM routing
  rahyab serve ir.csv --placeholder        # Serve without a routing integration
  rahyab route ir.csv --from Tehran --to Shiraz
  rahyab duplicates ir.csv                 # Report duplicate city rows")]
#[command(version = env!("RAHYAB_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server with OpenAPI docs
    Serve {
        /// City CSV file (city,lat,lng,province)
        csv: PathBuf,
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// Base URL of an OSRM-compatible routing service
        #[arg(long, conflicts_with = "placeholder")]
        osrm_url: Option<String>,
        /// Use the placeholder routing strategy (no external routing service)
        #[arg(long)]
        placeholder: bool,
        /// Fall back to Nominatim geocoding for cities missing from the CSV
        #[arg(long)]
        geocode: bool,
    },
    /// Compute one driving route and print it
    Route {
        /// City CSV file (city,lat,lng,province)
        csv: PathBuf,
        /// Origin city name
        #[arg(long)]
        from: String,
        /// Destination city name
        #[arg(long)]
        to: String,
        /// Base URL of an OSRM-compatible routing service
        #[arg(long, conflicts_with = "placeholder")]
        osrm_url: Option<String>,
        /// Use the placeholder routing strategy
        #[arg(long)]
        placeholder: bool,
    },
    /// Scan the CSV file for duplicate city names
    Duplicates {
        /// City CSV file (city,lat,lng,province)
        csv: PathBuf,
    },
}

/// Build the routing backend selected by the CLI flags
fn build_backend(osrm_url: Option<String>, placeholder: bool) -> RouterBackend {
    if placeholder {
        return RouterBackend::Placeholder;
    }
    let config = match osrm_url {
        Some(base_url) => RouterConfig {
            base_url,
            ..Default::default()
        },
        None => RouterConfig::default(),
    };
    RouterBackend::osrm(config)
}

#[tokio::main]
async fn main() {
    // Initialize logging to stderr
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            csv,
            port,
            osrm_url,
            placeholder,
            geocode,
        } => {
            let dataset = CityDataset::load_or_empty(&csv);
            eprintln!("🏙️  Loaded {} cities from {}", dataset.len(), csv.display());

            let backend = build_backend(osrm_url, placeholder);
            let geocoder = geocode.then(Geocoder::default);

            let state = Arc::new(AppState::new(dataset, csv, backend, geocoder));
            run_server(state, port).await?;
        }
        Commands::Route {
            csv,
            from,
            to,
            osrm_url,
            placeholder,
        } => {
            let dataset = CityDataset::load(&csv)?;

            let resolve = |name: &str| {
                dataset.coordinates(name).ok_or_else(|| {
                    rahyab::Error::CityNotFound {
                        name: name.to_string(),
                        suggestion: dataset.suggest(name),
                    }
                })
            };
            let origin = resolve(&from)?;
            let destination = resolve(&to)?;

            let backend = build_backend(osrm_url, placeholder);
            let summary = backend.route(origin, destination).await?;

            println!("🛣️  {} → {}", from, to);
            println!("   distance: {} km", summary.distance);
            println!("   duration: {} h", summary.duration);
            println!("   path points: {}", summary.coordinates.len());
        }
        Commands::Duplicates { csv } => {
            let duplicates = rahyab::scan_duplicates(&csv)?;
            if duplicates.is_empty() {
                println!("No duplicate cities found.");
            } else {
                println!("Duplicate cities found:");
                for city in duplicates {
                    println!("  {},{},{}", city.name, city.lat, city.lng);
                }
            }
        }
    }

    Ok(())
}

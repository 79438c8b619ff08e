//! # Rahyab
//!
//! Iranian city lookup and driving-route web service.
//!
//! Rahyab loads a `city,lat,lng,province` CSV into an in-memory dataset and
//! serves a small JSON API over it: substring search over city names,
//! coordinate lookup, driving routes between two cities via an
//! OSRM-compatible provider (or a placeholder strategy), and appending new
//! cities back to the CSV file.
//!
//! ## Example
//!
//! ```no_run
//! use rahyab::{CityDataset, RouterBackend};
//!
//! # async fn example() -> rahyab::Result<()> {
//! let dataset = CityDataset::load("ir.csv")?;
//! let backend = RouterBackend::Placeholder;
//!
//! let from = dataset.coordinates("Tehran").unwrap();
//! let to = dataset.coordinates("Shiraz").unwrap();
//! let route = backend.route(from, to).await?;
//! println!("{} km, {} h", route.distance, route.duration);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod server;

pub use crate::core::dataset::{append_row, scan_duplicates, City, CityDataset};
pub use crate::core::error::{Error, Result};
pub use crate::core::geocode::Geocoder;
pub use crate::core::router::{OsrmRouter, RouteSummary, RouterBackend, RouterConfig};
pub use crate::server::{build_router, run_server, AppState};

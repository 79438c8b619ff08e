//! Core library modules for rahyab
//!
//! This module contains the city dataset, the route providers, and the
//! geocoding fallback behind the HTTP surface.

pub mod dataset;
pub mod error;
pub mod geocode;
pub mod router;

// Re-export main types for internal use
pub use dataset::{City, CityDataset};
pub use geocode::Geocoder;
pub use router::{OsrmRouter, RouteSummary, RouterBackend, RouterConfig};

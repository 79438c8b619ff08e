//! City dataset backed by a CSV file
//!
//! Loads the `city,lat,lng,province` table once at startup into an
//! order-preserving in-memory map, answers substring search and exact
//! coordinate lookups, and appends new cities back to the file.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::error::{suggest_correction, Error, Result};

/// Maximum number of names returned by a search
pub const MAX_SEARCH_RESULTS: usize = 10;

/// A single city row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "city")]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
}

impl City {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            province: None,
        }
    }
}

/// In-memory city table, preserving file load order
///
/// `name` is the unique key: inserting an existing name overwrites its
/// coordinates in place without disturbing the original position.
#[derive(Debug, Default)]
pub struct CityDataset {
    cities: Vec<City>,
    index: HashMap<String, usize>,
}

impl CityDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the dataset from a CSV file
    ///
    /// The header must contain `city`, `lat` and `lng` columns; extra columns
    /// are tolerated. Rows with a missing name or unparsable coordinates are
    /// skipped with a warning rather than aborting the load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        for required in ["city", "lat", "lng"] {
            if !headers.iter().any(|h| h == required) {
                return Err(Error::Dataset(format!(
                    "{}: missing required column '{}'",
                    path.display(),
                    required
                )));
            }
        }

        let mut dataset = Self::new();
        for (line, result) in reader.deserialize::<City>().enumerate() {
            match result {
                Ok(city) if city.name.is_empty() => {
                    warn!("{}: skipping row {} with empty city name", path.display(), line + 2);
                }
                Ok(mut city) => {
                    if city.province.as_deref() == Some("") {
                        city.province = None;
                    }
                    dataset.add(city);
                }
                Err(e) => {
                    warn!("{}: skipping malformed row {}: {}", path.display(), line + 2, e);
                }
            }
        }

        Ok(dataset)
    }

    /// Load the dataset, falling back to an empty one if the file is missing
    /// or unreadable
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!("{}: starting with empty dataset: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Insert or overwrite a city (last write wins, load order preserved)
    pub fn add(&mut self, city: City) {
        match self.index.get(&city.name) {
            Some(&i) => self.cities[i] = city,
            None => {
                self.index.insert(city.name.clone(), self.cities.len());
                self.cities.push(city);
            }
        }
    }

    /// Case-insensitive substring search over city names
    ///
    /// Returns at most [`MAX_SEARCH_RESULTS`] names in load order. An empty
    /// query matches every city.
    pub fn search(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        self.cities
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&query))
            .take(MAX_SEARCH_RESULTS)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Exact-match coordinate lookup
    pub fn coordinates(&self, name: &str) -> Option<(f64, f64)> {
        self.index.get(name).map(|&i| {
            let c = &self.cities[i];
            (c.lat, c.lng)
        })
    }

    pub fn get(&self, name: &str) -> Option<&City> {
        self.index.get(name).map(|&i| &self.cities[i])
    }

    /// Nearest city name within a small edit distance, for "did you mean" errors
    pub fn suggest(&self, name: &str) -> Option<String> {
        suggest_correction(name, self.cities.iter().map(|c| c.name.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Append one city row to the backing CSV file
///
/// Writes the `city,lat,lng,province` header first when the file is empty or
/// absent. Callers that also update the in-memory dataset must append to the
/// file first and hold the dataset write lock across both steps.
pub fn append_row(path: impl AsRef<Path>, city: &City) -> Result<()> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path.as_ref())?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if is_empty {
        writer.write_record(["city", "lat", "lng", "province"])?;
    }
    writer.write_record([
        city.name.as_str(),
        &city.lat.to_string(),
        &city.lng.to_string(),
        city.province.as_deref().unwrap_or(""),
    ])?;
    writer.flush()?;

    Ok(())
}

/// Scan the backing file for duplicate city names
///
/// Returns every row whose name appears more than once, in file order.
/// Duplicates are not an error: the in-memory dataset resolves them
/// last-write-wins, and this scan exists to report the on-disk state.
pub fn scan_duplicates(path: impl AsRef<Path>) -> Result<Vec<City>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<City>() {
        match result {
            Ok(city) => rows.push(city),
            Err(e) => warn!("skipping malformed row during duplicate scan: {}", e),
        }
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for city in &rows {
        *counts.entry(city.name.as_str()).or_insert(0) += 1;
    }

    Ok(rows
        .iter()
        .filter(|c| counts[c.name.as_str()] > 1)
        .cloned()
        .collect())
}

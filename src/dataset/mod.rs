//! Merged place dataset
//!
//! Two CSV sources (tourist attractions, small businesses) are renamed onto the
//! shared `Place` schema and concatenated, attractions first. The result is
//! built once per process and only ever read afterwards.

use serde::Serialize;
use std::{collections::HashSet, path::PathBuf};

use crate::{config::Config, error::AppResult, models::Place};

pub mod cache;
pub mod loader;

pub use cache::DatasetCache;
pub use loader::{read_places, read_places_from_path, SourceSchema, BUSINESS_SCHEMA, TOURISM_SCHEMA};

/// Fixed locations of the two source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub tourism: PathBuf,
    pub business: PathBuf,
}

impl From<&Config> for DataSources {
    fn from(config: &Config) -> Self {
        Self {
            tourism: PathBuf::from(&config.tourism_data_path),
            business: PathBuf::from(&config.business_data_path),
        }
    }
}

/// Read-only concatenation of both sources
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedDataset {
    places: Vec<Place>,
}

impl MergedDataset {
    /// Concatenates attraction rows followed by business rows. No deduplication.
    pub fn merge(tourism: Vec<Place>, business: Vec<Place>) -> Self {
        let mut places = tourism;
        places.extend(business);
        Self { places }
    }

    /// Reads both sources fully. Either one failing fails the whole load.
    pub fn load(sources: &DataSources) -> AppResult<Self> {
        let tourism = read_places_from_path(&sources.tourism, &TOURISM_SCHEMA)?;
        let business = read_places_from_path(&sources.business, &BUSINESS_SCHEMA)?;

        tracing::info!(
            tourism_rows = tourism.len(),
            business_rows = business.len(),
            "Merged dataset loaded"
        );

        Ok(Self::merge(tourism, business))
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Distinct categories in first-appearance order, blanks skipped
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.places
            .iter()
            .filter_map(|place| place.category.as_deref())
            .filter(|category| seen.insert(*category))
            .map(str::to_string)
            .collect()
    }
}

impl FromIterator<Place> for MergedDataset {
    fn from_iter<I: IntoIterator<Item = Place>>(iter: I) -> Self {
        Self {
            places: iter.into_iter().collect(),
        }
    }
}

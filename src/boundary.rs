//! Region boundary geometry for map views.
//!
//! The core never looks at the geometry; it only needs to know which region
//! names have a boundary.

use crate::error::{DashboardError, Result};
use once_cell::unsync::OnceCell;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Region name to GeoJSON geometry.
pub type BoundaryMap = HashMap<String, Value>;

pub trait BoundaryProvider {
    fn fetch(&self) -> Result<BoundaryMap>;
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    // GeoJSON allows `"properties": null`
    #[serde(default)]
    properties: Option<HashMap<String, Value>>,
    #[serde(default)]
    geometry: Value,
}

/// Reads a GeoJSON FeatureCollection and keys features by `properties.name`.
#[derive(Debug, Clone)]
pub struct GeoJsonFileProvider {
    path: PathBuf,
}

impl GeoJsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GeoJsonFileProvider { path: path.into() }
    }
}

pub fn parse_feature_collection(text: &str) -> Result<BoundaryMap> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    Ok(collection
        .features
        .into_iter()
        .filter_map(|f| {
            let name = f.properties.as_ref()?.get("name")?.as_str()?.to_string();
            Some((name, f.geometry))
        })
        .collect())
}

impl BoundaryProvider for GeoJsonFileProvider {
    fn fetch(&self) -> Result<BoundaryMap> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            DashboardError::Boundary(format!("{}: {}", self.path.display(), e))
        })?;
        parse_feature_collection(&text)
    }
}

/// Fetches boundaries at most once. A failed fetch is remembered as
/// unavailable and not retried.
pub struct BoundaryCache {
    provider: Option<Box<dyn BoundaryProvider>>,
    cell: OnceCell<Option<BoundaryMap>>,
}

impl BoundaryCache {
    pub fn new(provider: Option<Box<dyn BoundaryProvider>>) -> Self {
        BoundaryCache { provider, cell: OnceCell::new() }
    }

    pub fn get(&self) -> Option<&BoundaryMap> {
        self.cell
            .get_or_init(|| {
                let provider = self.provider.as_ref()?;
                match provider.fetch() {
                    Ok(map) => {
                        tracing::info!(regions = map.len(), "Loaded region boundaries");
                        Some(map)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Region boundaries unavailable");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Of `regions`, the ones with no boundary. All of them when boundaries
    /// could not be loaded.
    pub fn missing<'a>(&self, regions: &[&'a str]) -> Vec<&'a str> {
        match self.get() {
            Some(map) => regions.iter().copied().filter(|r| !map.contains_key(*r)).collect(),
            None => regions.to_vec(),
        }
    }
}

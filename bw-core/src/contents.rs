use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalogue of selectable regions published by the analytics service.
///
/// Counties are keyed by country, regions by county.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contents {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub counties: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub regions: BTreeMap<String, Vec<String>>,
}

impl Contents {
    /// Counties listed for a country; empty when the country is unknown.
    pub fn counties_of(&self, country: &str) -> &[String] {
        self.counties.get(country).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Regions listed for a county; empty when the county is unknown.
    pub fn regions_of(&self, county: &str) -> &[String] {
        self.regions.get(county).map(Vec::as_slice).unwrap_or(&[])
    }
}

//! Upstream feature-data sources and the keys each one can fetch.
//!
//! The key set is fixed: every (source, key) pair listed here is seeded into
//! the fetch table up front so consumers can probe any key without existence
//! checks.

use serde::{Deserialize, Serialize};

/// External API a feature's data is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureDataSource {
    /// REST locations API (site hierarchies, towers).
    RestLocationsApi,
    /// Static GIS assets (boundaries, drainage lines, reaches...).
    ArcgisAssetsApi,
    /// GraphQL locations API, keyed by the minimum zoom of a location type.
    GraphqlLocationsApi,
}

const REST_LOCATIONS_KEYS: &[&str] = &["SITE_LOCATION_HIERARCHIES", "TOWERS"];

const ARCGIS_ASSETS_KEYS: &[&str] = &[
    "FLIGHT_BOX_BOUNDARIES",
    "WATERSHED_BOUNDARIES",
    "DRAINAGE_LINES",
    "POUR_POINTS",
    "SAMPLING_BOUNDARIES",
    "AQUATIC_REACHES",
    "TOWER_AIRSHEDS",
];

const GRAPHQL_LOCATIONS_KEYS: &[&str] = &["10", "11", "13", "14", "15", "16", "17"];

impl FeatureDataSource {
    pub const ALL: [FeatureDataSource; 3] = [
        FeatureDataSource::RestLocationsApi,
        FeatureDataSource::ArcgisAssetsApi,
        FeatureDataSource::GraphqlLocationsApi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureDataSource::RestLocationsApi => "REST_LOCATIONS_API",
            FeatureDataSource::ArcgisAssetsApi => "ARCGIS_ASSETS_API",
            FeatureDataSource::GraphqlLocationsApi => "GRAPHQL_LOCATIONS_API",
        }
    }

    pub fn fetchable_keys(&self) -> &'static [&'static str] {
        match self {
            FeatureDataSource::RestLocationsApi => REST_LOCATIONS_KEYS,
            FeatureDataSource::ArcgisAssetsApi => ARCGIS_ASSETS_KEYS,
            FeatureDataSource::GraphqlLocationsApi => GRAPHQL_LOCATIONS_KEYS,
        }
    }

    pub fn is_fetchable(&self, key: &str) -> bool {
        self.fetchable_keys().contains(&key)
    }
}

impl std::fmt::Display for FeatureDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeatureDataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureDataSource::ALL
            .into_iter()
            .find(|src| src.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown feature data source: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureDataSource;

    #[test]
    fn serializes_as_screaming_snake_case() {
        for src in FeatureDataSource::ALL {
            let json = serde_json::to_string(&src).unwrap();
            assert_eq!(json, format!("\"{}\"", src.as_str()));
            let back: FeatureDataSource = serde_json::from_str(&json).unwrap();
            assert_eq!(back, src);
        }
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(
            "arcgis_assets_api".parse::<FeatureDataSource>(),
            Ok(FeatureDataSource::ArcgisAssetsApi)
        );
        assert!("FTP".parse::<FeatureDataSource>().is_err());
    }

    #[test]
    fn key_membership() {
        assert!(FeatureDataSource::RestLocationsApi.is_fetchable("TOWERS"));
        assert!(FeatureDataSource::GraphqlLocationsApi.is_fetchable("13"));
        assert!(!FeatureDataSource::GraphqlLocationsApi.is_fetchable("12"));
        let total: usize = FeatureDataSource::ALL
            .iter()
            .map(|s| s.fetchable_keys().len())
            .sum();
        assert_eq!(total, 16);
    }
}

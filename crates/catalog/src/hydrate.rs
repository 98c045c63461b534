use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use streaming::FetchTable;
use tracing::{debug, info};

use crate::context::{ContextPayload, Region, Site, SiteCategory};

/// Which presentation of the site map is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Map,
    Table,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInitialized {
    #[serde(rename = "MAP")]
    pub map: bool,
    #[serde(rename = "TABLE")]
    pub table: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub current: Option<View>,
    pub initialized: ViewInitialized,
}

/// A state or domain record with the ids of the sites inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionFeature {
    #[serde(flatten)]
    pub record: Region,
    pub sites: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFeatures {
    #[serde(rename = "STATES")]
    pub states: BTreeMap<String, RegionFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainFeatures {
    #[serde(rename = "DOMAINS")]
    pub domains: BTreeMap<String, RegionFeature>,
}

/// Hydrated feature buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureData {
    #[serde(rename = "SITES")]
    pub sites: BTreeMap<SiteCategory, BTreeMap<String, Site>>,
    #[serde(rename = "STATES")]
    pub states: StateFeatures,
    #[serde(rename = "DOMAINS")]
    pub domains: DomainFeatures,
}

impl Default for FeatureData {
    /// All four site buckets present and empty.
    fn default() -> Self {
        Self {
            sites: SiteCategory::ALL
                .into_iter()
                .map(|c| (c, BTreeMap::new()))
                .collect(),
            states: StateFeatures::default(),
            domains: DomainFeatures::default(),
        }
    }
}

impl FeatureData {
    pub fn site_bucket(&self, category: SiteCategory) -> Option<&BTreeMap<String, Site>> {
        self.sites.get(&category)
    }
}

/// Site map state touched by hydration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMapState {
    pub neon_context_hydrated: bool,
    pub sites: BTreeMap<String, Site>,
    pub feature_data: FeatureData,
    pub feature_data_fetches: FetchTable,
    pub view: ViewState,
}

impl Default for SiteMapState {
    /// Unhydrated, with every fetchable key seeded as unset.
    fn default() -> Self {
        Self {
            neon_context_hydrated: false,
            sites: BTreeMap::new(),
            feature_data: FeatureData::default(),
            feature_data_fetches: FetchTable::seeded(),
            view: ViewState::default(),
        }
    }
}

/// Merges the context payload into a new state.
///
/// The feature-data subtree is rebuilt from the payload alone, so hydrating
/// twice with the same payload equals hydrating once. Sites whose terrain or
/// type is unrecognized stay in `sites` but land in no bucket. Fetch statuses
/// are kept; the table is only seeded when it was empty.
pub fn hydrate(state: &SiteMapState, payload: &ContextPayload) -> SiteMapState {
    let mut feature_data = FeatureData::default();
    let mut unbucketed = 0usize;
    for (id, site) in &payload.sites {
        match site.category() {
            Some(category) => {
                feature_data
                    .sites
                    .entry(category)
                    .or_default()
                    .insert(id.clone(), site.clone());
            }
            None => {
                debug!(
                    "site {id} has unrecognized terrain {:?} / type {:?}",
                    site.terrain, site.site_type
                );
                unbucketed += 1;
            }
        }
    }
    feature_data.states.states = region_features(&payload.states, &payload.state_sites);
    feature_data.domains.domains = region_features(&payload.domains, &payload.domain_sites);

    let feature_data_fetches = if state.feature_data_fetches.is_seeded() {
        state.feature_data_fetches.clone()
    } else {
        FetchTable::seeded()
    };

    info!(
        sites = payload.sites.len(),
        states = payload.states.len(),
        domains = payload.domains.len(),
        unbucketed,
        "hydrated site context"
    );

    SiteMapState {
        neon_context_hydrated: true,
        sites: payload.sites.clone(),
        feature_data,
        feature_data_fetches,
        view: state.view,
    }
}

fn region_features(
    records: &BTreeMap<String, Region>,
    index: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, RegionFeature> {
    records
        .iter()
        .map(|(code, record)| {
            let mut record = record.clone();
            // `sites` is always taken from the reverse index.
            record.extra.remove("sites");
            let sites = index.get(code).cloned().unwrap_or_default();
            (code.clone(), RegionFeature { record, sites })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{SiteMapState, View, hydrate};
    use crate::context::{ContextPayload, SiteCategory};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use streaming::{FeatureDataSource, FetchKey, FetchStatus, FetchTable};

    fn payload() -> ContextPayload {
        serde_json::from_value(json!({
            "sites": {
                "ABBY": {"type": "RELOCATABLE", "terrain": "TERRESTRIAL", "stateCode": "WA", "domainCode": "D16"},
                "CLBJ": {"type": "CORE", "terrain": "TERRESTRIAL", "stateCode": "TX", "domainCode": "D11"},
                "SUGG": {"type": "CORE", "terrain": "AQUATIC", "stateCode": "FL", "domainCode": "D03"},
                "WLOU": {"type": "RELOCATABLE", "terrain": "AQUATIC", "stateCode": "CO", "domainCode": "D13"},
            },
            "states": {
                "CO": {"name": "Colorado"},
                "FL": {"name": "Florida"},
                "TX": {"name": "Texas"},
                "WA": {"name": "Washington"},
            },
            "domains": {
                "D03": {"name": "Southeast"},
                "D11": {"name": "Southern Plains"},
                "D13": {"name": "Southern Rockies and Colorado Plateau"},
                "D16": {"name": "Pacific Northwest"},
            },
            "stateSites": {"CO": ["WLOU"], "FL": ["SUGG"], "TX": ["CLBJ"], "WA": ["ABBY"]},
            "domainSites": {"D03": ["SUGG"], "D11": ["CLBJ"], "D13": ["WLOU"], "D16": ["ABBY"]},
        }))
        .unwrap()
    }

    #[test]
    fn default_state_shape() {
        let state = serde_json::to_value(SiteMapState::default()).unwrap();
        assert_eq!(state["neonContextHydrated"], json!(false));
        assert_eq!(
            state["view"],
            json!({"current": null, "initialized": {"MAP": false, "TABLE": false}})
        );
        assert_eq!(
            state["featureData"],
            json!({
                "SITES": {
                    "TERRESTRIAL_CORE_SITES": {},
                    "AQUATIC_CORE_SITES": {},
                    "TERRESTRIAL_RELOCATABLE_SITES": {},
                    "AQUATIC_RELOCATABLE_SITES": {},
                },
                "STATES": {"STATES": {}},
                "DOMAINS": {"DOMAINS": {}},
            })
        );
        assert_eq!(state["featureDataFetches"]["REST_LOCATIONS_API"]["TOWERS"], json!({}));
    }

    #[test]
    fn buckets_sites_and_indexes_regions() {
        let payload = payload();
        let hydrated = hydrate(&SiteMapState::default(), &payload);
        let value = serde_json::to_value(&hydrated).unwrap();

        assert_eq!(value["neonContextHydrated"], json!(true));
        assert_eq!(value["sites"], serde_json::to_value(&payload.sites).unwrap());
        assert_eq!(
            value["featureData"],
            json!({
                "SITES": {
                    "TERRESTRIAL_CORE_SITES": {
                        "CLBJ": {"type": "CORE", "terrain": "TERRESTRIAL", "stateCode": "TX", "domainCode": "D11"},
                    },
                    "AQUATIC_CORE_SITES": {
                        "SUGG": {"type": "CORE", "terrain": "AQUATIC", "stateCode": "FL", "domainCode": "D03"},
                    },
                    "TERRESTRIAL_RELOCATABLE_SITES": {
                        "ABBY": {"type": "RELOCATABLE", "terrain": "TERRESTRIAL", "stateCode": "WA", "domainCode": "D16"},
                    },
                    "AQUATIC_RELOCATABLE_SITES": {
                        "WLOU": {"type": "RELOCATABLE", "terrain": "AQUATIC", "stateCode": "CO", "domainCode": "D13"},
                    },
                },
                "STATES": {
                    "STATES": {
                        "CO": {"name": "Colorado", "sites": ["WLOU"]},
                        "FL": {"name": "Florida", "sites": ["SUGG"]},
                        "TX": {"name": "Texas", "sites": ["CLBJ"]},
                        "WA": {"name": "Washington", "sites": ["ABBY"]},
                    },
                },
                "DOMAINS": {
                    "DOMAINS": {
                        "D03": {"name": "Southeast", "sites": ["SUGG"]},
                        "D11": {"name": "Southern Plains", "sites": ["CLBJ"]},
                        "D13": {"name": "Southern Rockies and Colorado Plateau", "sites": ["WLOU"]},
                        "D16": {"name": "Pacific Northwest", "sites": ["ABBY"]},
                    },
                },
            })
        );
    }

    #[test]
    fn hydrating_twice_equals_once() {
        let payload = payload();
        let once = hydrate(&SiteMapState::default(), &payload);
        let twice = hydrate(&once, &payload);
        assert_eq!(once, twice);
    }

    #[test]
    fn input_state_is_untouched() {
        let before = SiteMapState::default();
        let snapshot = before.clone();
        let _ = hydrate(&before, &payload());
        assert_eq!(before, snapshot);
    }

    #[test]
    fn unrecognized_sites_are_kept_but_not_bucketed() {
        let mut payload = payload();
        payload.sites.insert(
            "ODD".to_string(),
            crate::context::Site::new("GRADIENT", "TERRESTRIAL")
                .with_state("WA")
                .with_domain("D16"),
        );
        let hydrated = hydrate(&SiteMapState::default(), &payload);
        assert!(hydrated.sites.contains_key("ODD"));
        let bucketed: usize = hydrated.feature_data.sites.values().map(|b| b.len()).sum();
        assert_eq!(bucketed, 4);
        assert_eq!(
            hydrated
                .feature_data
                .site_bucket(SiteCategory::TerrestrialCore)
                .map(|b| b.len()),
            Some(1)
        );
    }

    #[test]
    fn missing_reverse_index_gives_empty_sites() {
        let mut payload = payload();
        payload.state_sites.clear();
        payload
            .states
            .insert("AK".to_string(), crate::context::Region::named("Alaska"));
        let hydrated = hydrate(&SiteMapState::default(), &payload);
        assert!(
            hydrated
                .feature_data
                .states
                .states
                .values()
                .all(|s| s.sites.is_empty())
        );
    }

    #[test]
    fn seeds_fetch_table_only_when_empty() {
        let unseeded = SiteMapState {
            feature_data_fetches: FetchTable::new(),
            ..SiteMapState::default()
        };
        let hydrated = hydrate(&unseeded, &payload());
        assert_eq!(hydrated.feature_data_fetches.len(), 16);

        let mut in_progress = SiteMapState::default();
        let towers = FetchKey::new(FeatureDataSource::RestLocationsApi, "TOWERS");
        in_progress.feature_data_fetches.request(&towers).unwrap();
        in_progress.view.current = Some(View::Map);
        let hydrated = hydrate(&in_progress, &payload());
        assert_eq!(
            hydrated.feature_data_fetches.status(&towers),
            Some(FetchStatus::AwaitingFetchCall)
        );
        assert_eq!(hydrated.view.current, Some(View::Map));
    }
}

//! Site, state and domain records from the one-shot context payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteType {
    Core,
    Relocatable,
}

impl SiteType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CORE" => Some(SiteType::Core),
            "RELOCATABLE" => Some(SiteType::Relocatable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Terrain {
    Terrestrial,
    Aquatic,
}

impl Terrain {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TERRESTRIAL" => Some(Terrain::Terrestrial),
            "AQUATIC" => Some(Terrain::Aquatic),
            _ => None,
        }
    }
}

/// Feature bucket a site is drawn in.
///
/// Ordering contract: variants sort in the order below, which is also the
/// serialized bucket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SiteCategory {
    #[serde(rename = "TERRESTRIAL_CORE_SITES")]
    TerrestrialCore,
    #[serde(rename = "AQUATIC_CORE_SITES")]
    AquaticCore,
    #[serde(rename = "TERRESTRIAL_RELOCATABLE_SITES")]
    TerrestrialRelocatable,
    #[serde(rename = "AQUATIC_RELOCATABLE_SITES")]
    AquaticRelocatable,
}

impl SiteCategory {
    pub const ALL: [SiteCategory; 4] = [
        SiteCategory::TerrestrialCore,
        SiteCategory::AquaticCore,
        SiteCategory::TerrestrialRelocatable,
        SiteCategory::AquaticRelocatable,
    ];

    /// Every (terrain, type) combination has exactly one bucket.
    pub fn classify(terrain: Terrain, site_type: SiteType) -> Self {
        match (terrain, site_type) {
            (Terrain::Terrestrial, SiteType::Core) => SiteCategory::TerrestrialCore,
            (Terrain::Aquatic, SiteType::Core) => SiteCategory::AquaticCore,
            (Terrain::Terrestrial, SiteType::Relocatable) => SiteCategory::TerrestrialRelocatable,
            (Terrain::Aquatic, SiteType::Relocatable) => SiteCategory::AquaticRelocatable,
        }
    }

    pub fn bucket_name(&self) -> &'static str {
        match self {
            SiteCategory::TerrestrialCore => "TERRESTRIAL_CORE_SITES",
            SiteCategory::AquaticCore => "AQUATIC_CORE_SITES",
            SiteCategory::TerrestrialRelocatable => "TERRESTRIAL_RELOCATABLE_SITES",
            SiteCategory::AquaticRelocatable => "AQUATIC_RELOCATABLE_SITES",
        }
    }
}

/// One field site. Fields other than the four below pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Site {
    pub fn new(site_type: &str, terrain: &str) -> Self {
        Self {
            site_type: Some(site_type.to_string()),
            terrain: Some(terrain.to_string()),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, code: &str) -> Self {
        self.state_code = Some(code.to_string());
        self
    }

    pub fn with_domain(mut self, code: &str) -> Self {
        self.domain_code = Some(code.to_string());
        self
    }

    /// `None` unless both terrain and type are recognized.
    pub fn category(&self) -> Option<SiteCategory> {
        let terrain = Terrain::parse(self.terrain.as_deref()?)?;
        let site_type = SiteType::parse(self.site_type.as_deref()?)?;
        Some(SiteCategory::classify(terrain, site_type))
    }
}

/// A state or domain record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Region {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            extra: Map::new(),
        }
    }
}

/// The context payload: sites, states, domains and their reverse indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPayload {
    #[serde(default)]
    pub sites: BTreeMap<String, Site>,
    #[serde(default)]
    pub states: BTreeMap<String, Region>,
    #[serde(default)]
    pub domains: BTreeMap<String, Region>,
    #[serde(default)]
    pub state_sites: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub domain_sites: BTreeMap<String, Vec<String>>,
}

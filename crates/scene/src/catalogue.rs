use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::geometry::FeatureGeometry;

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: FeatureGeometry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    NotAMapping(&'static str),
}

impl std::fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogueError::NotAMapping(found) => {
                write!(f, "feature catalogue must be an id -> descriptor mapping, found {found}")
            }
        }
    }
}

impl std::error::Error for CatalogueError {}

/// Ordered mapping from feature id to resolved geometry.
///
/// Ordering contract:
/// - Iteration yields features in insertion (document) order.
/// - Re-inserting an existing id replaces its geometry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCatalogue {
    features: Vec<Feature>,
    index: BTreeMap<String, usize>,
}

impl FeatureCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalogue from a decoded JSON object, resolving every
    /// descriptor once.
    pub fn from_json(value: &Value) -> Result<Self, CatalogueError> {
        let Some(map) = value.as_object() else {
            return Err(CatalogueError::NotAMapping(json_type_name(value)));
        };
        Ok(map
            .iter()
            .map(|(id, descriptor)| (id.clone(), FeatureGeometry::from_descriptor(descriptor)))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&FeatureGeometry> {
        let idx = *self.index.get(id)?;
        self.features.get(idx).map(|f| &f.geometry)
    }

    /// Returns the previous geometry when `id` was already present.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        geometry: FeatureGeometry,
    ) -> Option<FeatureGeometry> {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            let slot = &mut self.features[idx].geometry;
            return Some(std::mem::replace(slot, geometry));
        }
        self.index.insert(id.clone(), self.features.len());
        self.features.push(Feature { id, geometry });
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.features.iter().map(|f| f.id.clone()).collect()
    }
}

impl<S: Into<String>> FromIterator<(S, FeatureGeometry)> for FeatureCatalogue {
    fn from_iter<I: IntoIterator<Item = (S, FeatureGeometry)>>(iter: I) -> Self {
        let mut catalogue = FeatureCatalogue::new();
        for (id, geometry) in iter {
            catalogue.insert(id, geometry);
        }
        catalogue
    }
}

impl<'de> Deserialize<'de> for FeatureCatalogue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        FeatureCatalogue::from_json(&value).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use foundation::bounds::{Extension, LatLngBounds};
use serde_json::Value;

use crate::catalogue::FeatureCatalogue;
use crate::geometry::FeatureGeometry;

/// Bounds filter plus the extension applied before filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundsQuery {
    /// `None` means no filter: every feature is returned.
    pub bounds: Option<LatLngBounds>,
    pub extension: Extension,
}

impl BoundsQuery {
    pub fn within(bounds: LatLngBounds) -> Self {
        Self {
            bounds: Some(bounds),
            ..Default::default()
        }
    }

    pub fn with_map_extension(mut self, on: bool) -> Self {
        self.extension.map_extension = on;
        self
    }

    pub fn with_point_extension(mut self, distance: Option<f64>) -> Self {
        self.extension.point_extension_distance = distance;
        self
    }
}

/// Ids of every feature with at least one point inside the (extended)
/// bounds, in catalogue order.
///
/// Absent bounds return every id; present-but-invalid bounds return nothing.
pub fn query_locations(catalogue: &FeatureCatalogue, query: &BoundsQuery) -> Vec<String> {
    let Some(bounds) = query.bounds else {
        return catalogue.ids();
    };
    if !bounds.is_valid() {
        return Vec::new();
    }
    let effective = bounds.extend(query.extension);
    catalogue
        .iter()
        .filter(|f| f.geometry.intersects(&effective))
        .map(|f| f.id.clone())
        .collect()
}

pub fn calculate_locations_in_bounds(
    catalogue: &FeatureCatalogue,
    bounds: Option<&LatLngBounds>,
    map_extension: bool,
    point_extension_distance: Option<f64>,
) -> Vec<String> {
    let query = BoundsQuery {
        bounds: bounds.copied(),
        extension: Extension::new(map_extension, point_extension_distance),
    };
    query_locations(catalogue, &query)
}

/// Same query over decoded JSON inputs, for callers that hold raw payloads.
///
/// A `features` value that is not an object yields nothing, as does a
/// `bounds` value that is present (not null) but malformed.
pub fn calculate_locations_in_bounds_json(
    features: &Value,
    bounds: Option<&Value>,
    map_extension: bool,
    point_extension_distance: Option<f64>,
) -> Vec<String> {
    let Some(features) = features.as_object() else {
        return Vec::new();
    };
    let bounds = match bounds {
        None | Some(Value::Null) => return features.keys().cloned().collect(),
        Some(raw) => match bounds_from_value(raw) {
            Some(b) => b,
            None => return Vec::new(),
        },
    };
    let effective = bounds.extend(Extension::new(map_extension, point_extension_distance));
    features
        .iter()
        .filter(|(_, descriptor)| FeatureGeometry::from_descriptor(descriptor).intersects(&effective))
        .map(|(id, _)| id.clone())
        .collect()
}

/// Parses `{ lat: [min, max], lng: [min, max] }`; `None` unless the shape
/// is exact and both pairs are finite and ascending.
pub fn bounds_from_value(value: &Value) -> Option<LatLngBounds> {
    let obj = value.as_object()?;
    let lat = pair_from_value(obj.get("lat")?)?;
    let lng = pair_from_value(obj.get("lng")?)?;
    let bounds = LatLngBounds::new(lat, lng);
    bounds.is_valid().then_some(bounds)
}

pub fn bounds_are_valid(value: &Value) -> bool {
    bounds_from_value(value).is_some()
}

fn pair_from_value(value: &Value) -> Option<[f64; 2]> {
    let [a, b] = value.as_array()?.as_slice() else {
        return None;
    };
    Some([a.as_f64()?, b.as_f64()?])
}

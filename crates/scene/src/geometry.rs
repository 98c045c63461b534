use foundation::bounds::{LatLng, LatLngBounds};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw coordinate tree: leaves are points, everything else is a nested array.
///
/// Leaves are `[latitude, longitude]`, not the `[lon, lat]` order used by
/// GeoJSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    Point(LatLng),
    Nested(Vec<Coordinates>),
}

impl Coordinates {
    /// Parses any nesting depth. Malformed branches are dropped; returns
    /// `None` when no point survives.
    pub fn from_value(value: &Value) -> Option<Coordinates> {
        if let Some(p) = point_from_value(value) {
            return Some(Coordinates::Point(p));
        }
        let items = value.as_array()?;
        let children: Vec<Coordinates> = items.iter().filter_map(Coordinates::from_value).collect();
        if children.is_empty() {
            return None;
        }
        Some(Coordinates::Nested(children))
    }

    pub fn any_point_in(&self, bounds: &LatLngBounds) -> bool {
        match self {
            Coordinates::Point(p) => bounds.contains(*p),
            Coordinates::Nested(children) => children.iter().any(|c| c.any_point_in(bounds)),
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Coordinates::Point(_) => 1,
            Coordinates::Nested(children) => children.iter().map(Coordinates::point_count).sum(),
        }
    }

    fn as_point(&self) -> Option<LatLng> {
        match self {
            Coordinates::Point(p) => Some(*p),
            Coordinates::Nested(_) => None,
        }
    }

    fn as_line(&self) -> Option<Vec<LatLng>> {
        match self {
            Coordinates::Point(_) => None,
            Coordinates::Nested(children) => children.iter().map(Coordinates::as_point).collect(),
        }
    }

    fn as_rings(&self) -> Option<Vec<Vec<LatLng>>> {
        match self {
            Coordinates::Point(_) => None,
            Coordinates::Nested(children) => children.iter().map(Coordinates::as_line).collect(),
        }
    }

    fn as_polygons(&self) -> Option<Vec<Vec<Vec<LatLng>>>> {
        match self {
            Coordinates::Point(_) => None,
            Coordinates::Nested(children) => children.iter().map(Coordinates::as_rings).collect(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPolygon,
    Nested,
    Unresolved,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::Nested => "Nested",
            GeometryKind::Unresolved => "Unresolved",
        }
    }
}

/// A feature's geometry, resolved once when the feature enters the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(LatLng),
    LineString(Vec<LatLng>),
    Polygon(Vec<Vec<LatLng>>),
    MultiPolygon(Vec<Vec<Vec<LatLng>>>),
    /// Deeper or mixed nesting; scanned recursively.
    Nested(Coordinates),
    /// No usable point anywhere in the descriptor.
    Unresolved,
}

impl FeatureGeometry {
    pub fn point(lat: f64, lng: f64) -> Self {
        FeatureGeometry::Point(LatLng::new(lat, lng))
    }

    /// Resolves a decoded descriptor. Forms are tried in order:
    /// `{latitude, longitude}`, a bare `[lat, lon]` pair, then
    /// `{geometry: {coordinates}}`.
    pub fn from_descriptor(value: &Value) -> Self {
        if let Some(obj) = value.as_object() {
            let lat = obj.get("latitude").and_then(Value::as_f64);
            let lng = obj.get("longitude").and_then(Value::as_f64);
            if let (Some(lat), Some(lng)) = (lat, lng) {
                let p = LatLng::new(lat, lng);
                if p.is_finite() {
                    return FeatureGeometry::Point(p);
                }
            }
        }
        if let Some(p) = point_from_value(value) {
            return FeatureGeometry::Point(p);
        }
        value
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .and_then(Coordinates::from_value)
            .map(FeatureGeometry::from_coordinates)
            .unwrap_or(FeatureGeometry::Unresolved)
    }

    /// Picks the most specific variant the nesting allows.
    pub fn from_coordinates(coords: Coordinates) -> Self {
        if let Some(p) = coords.as_point() {
            return FeatureGeometry::Point(p);
        }
        if let Some(line) = coords.as_line() {
            return FeatureGeometry::LineString(line);
        }
        if let Some(rings) = coords.as_rings() {
            return FeatureGeometry::Polygon(rings);
        }
        if let Some(polygons) = coords.as_polygons() {
            return FeatureGeometry::MultiPolygon(polygons);
        }
        FeatureGeometry::Nested(coords)
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            FeatureGeometry::Point(_) => GeometryKind::Point,
            FeatureGeometry::LineString(_) => GeometryKind::LineString,
            FeatureGeometry::Polygon(_) => GeometryKind::Polygon,
            FeatureGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            FeatureGeometry::Nested(_) => GeometryKind::Nested,
            FeatureGeometry::Unresolved => GeometryKind::Unresolved,
        }
    }

    /// True on the first point (anywhere in the structure) inside `bounds`.
    pub fn intersects(&self, bounds: &LatLngBounds) -> bool {
        match self {
            FeatureGeometry::Point(p) => bounds.contains(*p),
            FeatureGeometry::LineString(points) => points.iter().any(|p| bounds.contains(*p)),
            FeatureGeometry::Polygon(rings) => rings.iter().flatten().any(|p| bounds.contains(*p)),
            FeatureGeometry::MultiPolygon(polygons) => polygons
                .iter()
                .flatten()
                .flatten()
                .any(|p| bounds.contains(*p)),
            FeatureGeometry::Nested(coords) => coords.any_point_in(bounds),
            FeatureGeometry::Unresolved => false,
        }
    }
}

impl<'de> Deserialize<'de> for FeatureGeometry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(FeatureGeometry::from_descriptor(&value))
    }
}

/// Whether a raw descriptor has any point inside `bounds`.
pub fn feature_matches(descriptor: &Value, bounds: &LatLngBounds) -> bool {
    FeatureGeometry::from_descriptor(descriptor).intersects(bounds)
}

fn point_from_value(value: &Value) -> Option<LatLng> {
    let [lat, lng] = value.as_array()?.as_slice() else {
        return None;
    };
    let p = LatLng::new(lat.as_f64()?, lng.as_f64()?);
    p.is_finite().then_some(p)
}

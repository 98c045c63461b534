/// Latitude/longitude pair in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Axis-aligned lat/lng rectangle. Both pairs are `[min, max]`.
///
/// A value built from untrusted input may be descending or non-finite; check
/// [`LatLngBounds::is_valid`] before filtering with it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLngBounds {
    pub lat: [f64; 2],
    pub lng: [f64; 2],
}

/// Enlargement applied to bounds before filtering.
///
/// The two modes are independent and compose additively: the proportional
/// widening is applied first, then the fixed distance on top of it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Extension {
    /// Widen each axis by half of its own span on each side.
    pub map_extension: bool,
    /// Fixed amount (degrees) added to both ends of both axes when positive.
    pub point_extension_distance: Option<f64>,
}

impl Extension {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(map_extension: bool, point_extension_distance: Option<f64>) -> Self {
        Extension {
            map_extension,
            point_extension_distance,
        }
    }

    fn point_distance(&self) -> Option<f64> {
        self.point_extension_distance
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn is_none(&self) -> bool {
        !self.map_extension && self.point_distance().is_none()
    }
}

impl LatLngBounds {
    pub fn new(lat: [f64; 2], lng: [f64; 2]) -> Self {
        LatLngBounds { lat, lng }
    }

    /// Finite values and ascending (or equal) pairs on both axes.
    pub fn is_valid(&self) -> bool {
        let finite = self
            .lat
            .iter()
            .chain(self.lng.iter())
            .all(|v| v.is_finite());
        finite && self.lat[0] <= self.lat[1] && self.lng[0] <= self.lng[1]
    }

    /// Inclusive on both ends; NaN coordinates never match.
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.lat[0]
            && point.lat <= self.lat[1]
            && point.lng >= self.lng[0]
            && point.lng <= self.lng[1]
    }

    pub fn lat_span(&self) -> f64 {
        self.lat[1] - self.lat[0]
    }

    pub fn lng_span(&self) -> f64 {
        self.lng[1] - self.lng[0]
    }

    /// Returns a new box enlarged by `ext`; `self` is left untouched.
    pub fn extend(&self, ext: Extension) -> LatLngBounds {
        let mut out = *self;
        if ext.map_extension {
            let half_lat = self.lat_span() / 2.0;
            let half_lng = self.lng_span() / 2.0;
            out.lat = [out.lat[0] - half_lat, out.lat[1] + half_lat];
            out.lng = [out.lng[0] - half_lng, out.lng[1] + half_lng];
        }
        if let Some(d) = ext.point_distance() {
            out.lat = [out.lat[0] - d, out.lat[1] + d];
            out.lng = [out.lng[0] - d, out.lng[1] + d];
        }
        out
    }
}

/// Free-function form of [`LatLngBounds::contains`].
pub fn point_in_bounds(point: LatLng, bounds: &LatLngBounds) -> bool {
    bounds.contains(point)
}

#[cfg(test)]
mod tests {
    use super::{Extension, LatLng, LatLngBounds, point_in_bounds};

    fn base() -> LatLngBounds {
        LatLngBounds::new([10.0, 20.0], [-30.0, 30.0])
    }

    #[test]
    fn ascending_pairs_are_valid() {
        assert!(LatLngBounds::new([10.0, 20.0], [10.0, 20.0]).is_valid());
        assert!(LatLngBounds::new([-10.0, 20.0], [-80.0, -30.0]).is_valid());
        assert!(LatLngBounds::new([5.0, 5.0], [1.0, 1.0]).is_valid());
    }

    #[test]
    fn descending_or_non_finite_pairs_are_invalid() {
        assert!(!LatLngBounds::new([20.0, 10.0], [10.0, 20.0]).is_valid());
        assert!(!LatLngBounds::new([10.0, 20.0], [20.0, 10.0]).is_valid());
        assert!(!LatLngBounds::new([f64::NAN, 20.0], [10.0, 20.0]).is_valid());
        assert!(!LatLngBounds::new([10.0, f64::INFINITY], [10.0, 20.0]).is_valid());
    }

    #[test]
    fn boundary_points_are_inside() {
        let b = base();
        assert!(point_in_bounds(LatLng::new(10.0, -30.0), &b));
        assert!(point_in_bounds(LatLng::new(20.0, 30.0), &b));
        assert!(!point_in_bounds(LatLng::new(20.000_1, 0.0), &b));
        assert!(!point_in_bounds(LatLng::new(f64::NAN, 0.0), &b));
    }

    #[test]
    fn no_extension_returns_equal_copy() {
        let b = base();
        assert_eq!(b.extend(Extension::none()), b);
        assert_eq!(b.extend(Extension::new(false, Some(0.0))), b);
        assert_eq!(b.extend(Extension::new(false, Some(-4.0))), b);
    }

    #[test]
    fn map_extension_triples_each_span() {
        let out = base().extend(Extension::new(true, None));
        assert_eq!(out.lat, [5.0, 25.0]);
        assert_eq!(out.lng, [-60.0, 60.0]);
    }

    #[test]
    fn point_extension_adds_fixed_distance() {
        let out = base().extend(Extension::new(false, Some(10.0)));
        assert_eq!(out.lat, [0.0, 30.0]);
        assert_eq!(out.lng, [-40.0, 40.0]);
    }

    #[test]
    fn extensions_compose_additively() {
        let out = base().extend(Extension::new(true, Some(10.0)));
        assert_eq!(out.lat, [-5.0, 35.0]);
        assert_eq!(out.lng, [-70.0, 70.0]);
    }
}

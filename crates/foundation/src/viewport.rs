//! Viewport-derived map parameters.
//!
//! Both lookups are fixed tables, not formulas.

/// Zoom used whenever the container is not measurable yet.
pub const FALLBACK_ZOOM: u8 = 2;

/// Ratio used when no window is available.
pub const FALLBACK_ASPECT_RATIO: f64 = 1.0;

/// Ascending container-height breakpoints (inclusive upper bound, zoom).
const ZOOM_BY_HEIGHT: [(f64, u8); 3] = [(300.0, 1), (700.0, 2), (1000.0, 3)];
const MAX_ZOOM_TIER: u8 = 4;

/// Ascending height/width breakpoints (exclusive upper bound, aspect ratio).
///
/// Tall windows land in the last rows, where the width decides between
/// `7/5`, `3/2`, `16/9` and `2/1`.
const ASPECT_RATIO_BREAKPOINTS: [(f64, f64); 11] = [
    (0.35, 1.0 / 3.0),
    (0.45, 1.0 / 2.5),
    (0.53, 9.0 / 16.0),
    (0.6, 2.0 / 3.0),
    (0.7, 5.0 / 7.0),
    (0.9, 4.0 / 5.0),
    (1.1, 1.0 / 1.0),
    (1.3, 5.0 / 4.0),
    (1.4, 7.0 / 5.0),
    (1.6, 3.0 / 2.0),
    (1.9, 16.0 / 9.0),
];
const MAX_ASPECT_RATIO: f64 = 2.0 / 1.0;

/// Client size of a DOM-like element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ElementSize {
    pub client_width: f64,
    pub client_height: f64,
}

impl ElementSize {
    pub fn new(client_width: f64, client_height: f64) -> Self {
        Self {
            client_width,
            client_height,
        }
    }

    fn is_measurable(&self) -> bool {
        self.client_width.is_finite()
            && self.client_height.is_finite()
            && self.client_width > 0.0
            && self.client_height > 0.0
    }
}

/// The map container; its parent element carries the usable size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MapContainer {
    pub parent: Option<ElementSize>,
}

impl MapContainer {
    pub fn with_parent(width: f64, height: f64) -> Self {
        Self {
            parent: Some(ElementSize::new(width, height)),
        }
    }
}

/// Inner size of the browser window (or any host surface).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WindowSize {
    pub inner_width: f64,
    pub inner_height: f64,
}

impl WindowSize {
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        Self {
            inner_width,
            inner_height,
        }
    }
}

/// Zoom level that shows the whole observatory inside the container.
///
/// Only the container height selects the tier.
pub fn derive_zoom_level(container: Option<&MapContainer>) -> u8 {
    let Some(size) = container.and_then(|c| c.parent) else {
        return FALLBACK_ZOOM;
    };
    if !size.is_measurable() {
        return FALLBACK_ZOOM;
    }
    ZOOM_BY_HEIGHT
        .iter()
        .find(|(max_height, _)| size.client_height <= *max_height)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(MAX_ZOOM_TIER)
}

/// Aspect ratio (height over width) for the map given the window size.
///
/// `buffer` is vertical space taken by surrounding UI and is subtracted from
/// the window height before the lookup.
pub fn dynamic_aspect_ratio(window: Option<WindowSize>, buffer: f64) -> f64 {
    let Some(window) = window else {
        return FALLBACK_ASPECT_RATIO;
    };
    let width = window.inner_width;
    if !width.is_finite() || width <= 0.0 || !window.inner_height.is_finite() {
        return FALLBACK_ASPECT_RATIO;
    }
    let buffer = if buffer.is_finite() { buffer } else { 0.0 };
    let height = window.inner_height - buffer;
    let ratio = height / width;
    ASPECT_RATIO_BREAKPOINTS
        .iter()
        .find(|(upper, _)| ratio < *upper)
        .map(|(_, ar)| *ar)
        .unwrap_or(MAX_ASPECT_RATIO)
}

#[cfg(test)]
mod tests {
    use super::{
        ElementSize, FALLBACK_ASPECT_RATIO, FALLBACK_ZOOM, MapContainer, WindowSize,
        derive_zoom_level, dynamic_aspect_ratio,
    };

    #[test]
    fn zoom_falls_back_without_container() {
        assert_eq!(derive_zoom_level(None), FALLBACK_ZOOM);
        assert_eq!(derive_zoom_level(Some(&MapContainer::default())), 2);
    }

    #[test]
    fn zoom_falls_back_for_zero_dimensions() {
        assert_eq!(derive_zoom_level(Some(&MapContainer::with_parent(10.0, 0.0))), 2);
        assert_eq!(derive_zoom_level(Some(&MapContainer::with_parent(0.0, 10.0))), 2);
        let nan = MapContainer {
            parent: Some(ElementSize::new(f64::NAN, 400.0)),
        };
        assert_eq!(derive_zoom_level(Some(&nan)), 2);
    }

    #[test]
    fn zoom_tiers_follow_container_height() {
        let cases = [
            (10.0, 10.0, 1),
            (300.0, 200.0, 1),
            (600.0, 400.0, 2),
            (800.0, 600.0, 2),
            (1000.0, 800.0, 3),
            (1400.0, 1200.0, 4),
            (1200.0, 200.0, 1),
            (1200.0, 600.0, 2),
        ];
        for (w, h, expected) in cases {
            let c = MapContainer::with_parent(w, h);
            assert_eq!(derive_zoom_level(Some(&c)), expected, "{w}x{h}");
        }
    }

    #[test]
    fn zoom_ignores_width() {
        for h in [10.0, 200.0, 400.0, 600.0, 800.0, 1200.0] {
            let narrow = derive_zoom_level(Some(&MapContainer::with_parent(50.0, h)));
            let wide = derive_zoom_level(Some(&MapContainer::with_parent(5000.0, h)));
            assert_eq!(narrow, wide);
        }
        let tiers: Vec<u8> = [10.0, 200.0, 400.0, 600.0, 800.0, 1200.0]
            .iter()
            .map(|h| derive_zoom_level(Some(&MapContainer::with_parent(640.0, *h))))
            .collect();
        assert_eq!(tiers, vec![1, 1, 2, 2, 3, 4]);
    }

    fn ratio_cases() -> Vec<(f64, f64, f64)> {
        vec![
            (800.0, 1.0, 1.0 / 3.0),
            (800.0, 100.0, 1.0 / 3.0),
            (800.0, 300.0, 1.0 / 2.5),
            (800.0, 400.0, 9.0 / 16.0),
            (800.0, 450.0, 2.0 / 3.0),
            (800.0, 520.0, 5.0 / 7.0),
            (800.0, 600.0, 4.0 / 5.0),
            (800.0, 800.0, 1.0 / 1.0),
            (800.0, 1000.0, 5.0 / 4.0),
            (750.0, 1000.0, 7.0 / 5.0),
            (700.0, 1000.0, 3.0 / 2.0),
            (600.0, 1000.0, 16.0 / 9.0),
            (500.0, 1000.0, 2.0 / 1.0),
            (100.0, 1000.0, 2.0 / 1.0),
            (1.0, 1000.0, 2.0 / 1.0),
        ]
    }

    #[test]
    fn aspect_ratio_without_buffer() {
        for (w, h, expected) in ratio_cases() {
            let got = dynamic_aspect_ratio(Some(WindowSize::new(w, h)), 0.0);
            assert_eq!(got, expected, "{w}x{h}");
        }
    }

    #[test]
    fn aspect_ratio_with_buffer() {
        for (w, h, expected) in ratio_cases() {
            let got = dynamic_aspect_ratio(Some(WindowSize::new(w, h + 300.0)), 300.0);
            assert_eq!(got, expected, "{w}x{h} + 300");
        }
        // A buffer taller than the window still lands in the smallest bucket.
        assert_eq!(
            dynamic_aspect_ratio(Some(WindowSize::new(800.0, 1.0)), 300.0),
            1.0 / 3.0
        );
    }

    #[test]
    fn aspect_ratio_falls_back_without_window() {
        assert_eq!(dynamic_aspect_ratio(None, 0.0), FALLBACK_ASPECT_RATIO);
        assert_eq!(
            dynamic_aspect_ratio(Some(WindowSize::new(0.0, 600.0)), 0.0),
            FALLBACK_ASPECT_RATIO
        );
    }
}

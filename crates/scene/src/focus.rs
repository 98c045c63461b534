use serde::{Deserialize, Serialize};

/// Snapshot of the map camera as reported by the map widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default)]
    pub center: Option<[f64; 2]>,
}

impl MapView {
    pub fn new(zoom: f64, center: [f64; 2]) -> Self {
        Self {
            zoom: Some(zoom),
            center: Some(center),
        }
    }
}

/// Target view for a named entity; `current: None` means no focus is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusLocation {
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub map: Option<MapView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMismatch {
    NoFocus,
    MissingFocusZoom,
    MissingFocusCenter,
    MissingViewZoom,
    MissingViewCenter,
    ZoomDiffers,
    CenterDiffers,
}

impl std::fmt::Display for FocusMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            FocusMismatch::NoFocus => "no focus location is set",
            FocusMismatch::MissingFocusZoom => "focus location has no zoom",
            FocusMismatch::MissingFocusCenter => "focus location has no center",
            FocusMismatch::MissingViewZoom => "map view has no zoom",
            FocusMismatch::MissingViewCenter => "map view has no center",
            FocusMismatch::ZoomDiffers => "map zoom differs from focus zoom",
            FocusMismatch::CenterDiffers => "map center differs from focus center",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for FocusMismatch {}

/// Explains why the map is not at the focus location.
///
/// Comparison is exact: both snapshots come from the same map library, so
/// an unchanged view reproduces the same floats.
pub fn focus_mismatch(view: &MapView, focus: &FocusLocation) -> Result<(), FocusMismatch> {
    if focus.current.is_none() {
        return Err(FocusMismatch::NoFocus);
    }
    let target = focus.map.unwrap_or_default();
    let focus_zoom = target.zoom.ok_or(FocusMismatch::MissingFocusZoom)?;
    let focus_center = target.center.ok_or(FocusMismatch::MissingFocusCenter)?;
    let zoom = view.zoom.ok_or(FocusMismatch::MissingViewZoom)?;
    let center = view.center.ok_or(FocusMismatch::MissingViewCenter)?;
    if zoom != focus_zoom {
        return Err(FocusMismatch::ZoomDiffers);
    }
    if center != focus_center {
        return Err(FocusMismatch::CenterDiffers);
    }
    Ok(())
}

pub fn is_at_focus_location(view: &MapView, focus: &FocusLocation) -> bool {
    focus_mismatch(view, focus).is_ok()
}

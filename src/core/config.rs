//! Map and host-surface configuration
//!
//! Options are plain serde structs so a host can load them from JSON, with
//! builder-style setters for code that assembles them by hand.

use crate::{
    core::geo::{LatLng, LatLngBounds, Point},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Interaction options passed through to the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Instant wheel zoom. Ignored while smooth wheel zoom is on.
    pub scroll_wheel_zoom: bool,
    /// Zoom step of the instant wheel handler
    pub zoom_delta: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0.0,
            max_zoom: 18.0,
            scroll_wheel_zoom: true,
            zoom_delta: 1.0,
        }
    }
}

/// How the smooth wheel handler anchors the zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SmoothWheelZoomRepr", into = "SmoothWheelZoomRepr")]
pub enum SmoothWheelZoomMode {
    #[default]
    Off,
    /// Keep the point under the pointer fixed
    Cursor,
    /// Keep the gesture-start center fixed
    Center,
}

impl SmoothWheelZoomMode {
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl From<bool> for SmoothWheelZoomMode {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Cursor
        } else {
            Self::Off
        }
    }
}

/// Wire form: `true`, `false` or `"center"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SmoothWheelZoomRepr {
    Flag(bool),
    Anchor(String),
}

impl TryFrom<SmoothWheelZoomRepr> for SmoothWheelZoomMode {
    type Error = String;

    fn try_from(repr: SmoothWheelZoomRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            SmoothWheelZoomRepr::Flag(enabled) => Ok(enabled.into()),
            SmoothWheelZoomRepr::Anchor(anchor) if anchor == "center" => Ok(Self::Center),
            SmoothWheelZoomRepr::Anchor(other) => Err(format!(
                "smoothWheelZoom must be a boolean or \"center\", got {other:?}"
            )),
        }
    }
}

impl From<SmoothWheelZoomMode> for SmoothWheelZoomRepr {
    fn from(mode: SmoothWheelZoomMode) -> Self {
        match mode {
            SmoothWheelZoomMode::Off => Self::Flag(false),
            SmoothWheelZoomMode::Cursor => Self::Flag(true),
            SmoothWheelZoomMode::Center => Self::Anchor("center".to_string()),
        }
    }
}

/// Options for fitting the initial view to bounds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FitBoundsOptions {
    /// Padding applied on every side of the container, in pixels
    pub padding: Point,
    pub max_zoom: Option<f64>,
}

/// Everything the host surface needs to mount a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapContainerOptions {
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    /// Used only when `center` or `zoom` is missing
    pub bounds: Option<LatLngBounds>,
    pub bounds_options: FitBoundsOptions,
    pub smooth_wheel_zoom: SmoothWheelZoomMode,
    pub smooth_sensitivity: f64,
    #[serde(flatten)]
    pub map: MapOptions,
}

impl Default for MapContainerOptions {
    fn default() -> Self {
        Self {
            id: None,
            class_name: None,
            center: None,
            zoom: None,
            bounds: None,
            bounds_options: FitBoundsOptions::default(),
            smooth_wheel_zoom: SmoothWheelZoomMode::Off,
            smooth_sensitivity: 1.0,
            map: MapOptions::default(),
        }
    }
}

impl MapContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_center_and_zoom(mut self, center: LatLng, zoom: f64) -> Self {
        self.center = Some(center);
        self.zoom = Some(zoom);
        self
    }

    pub fn with_bounds(mut self, bounds: LatLngBounds, options: FitBoundsOptions) -> Self {
        self.bounds = Some(bounds);
        self.bounds_options = options;
        self
    }

    pub fn with_smooth_wheel_zoom(mut self, mode: SmoothWheelZoomMode) -> Self {
        self.smooth_wheel_zoom = mode;
        self
    }

    pub fn with_smooth_sensitivity(mut self, sensitivity: f64) -> Self {
        self.smooth_sensitivity = sensitivity;
        self
    }

    pub fn with_scroll_wheel_zoom(mut self, enabled: bool) -> Self {
        self.map.scroll_wheel_zoom = enabled;
        self
    }

    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.map.min_zoom = min_zoom;
        self.map.max_zoom = max_zoom;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let MapOptions {
            min_zoom, max_zoom, ..
        } = self.map;

        if !min_zoom.is_finite() || !max_zoom.is_finite() {
            return Err(MapError::InvalidOptions(format!(
                "zoom limits must be finite, got [{min_zoom}, {max_zoom}]"
            )));
        }
        if min_zoom > max_zoom {
            return Err(MapError::InvalidOptions(format!(
                "minZoom {min_zoom} is greater than maxZoom {max_zoom}"
            )));
        }
        if !self.smooth_sensitivity.is_finite() || self.smooth_sensitivity < 0.0 {
            return Err(MapError::InvalidOptions(format!(
                "smoothSensitivity must be a non-negative number, got {}",
                self.smooth_sensitivity
            )));
        }
        if let Some(zoom) = self.zoom {
            if !zoom.is_finite() {
                return Err(MapError::InvalidOptions(format!("zoom must be finite, got {zoom}")));
            }
        }
        if let Some(center) = self.center {
            if !center.is_valid() {
                return Err(MapError::InvalidOptions(format!("invalid center {center:?}")));
            }
        }
        if let Some(bounds) = self.bounds {
            if !bounds.is_valid() {
                return Err(MapError::InvalidOptions(format!("invalid bounds {bounds:?}")));
            }
        }
        Ok(())
    }
}

//! Engine-wide magic numbers, mostly Leaflet defaults.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Zoom levels per pixel of vertical wheel delta, before sensitivity.
pub const WHEEL_ZOOM_PER_PIXEL: f64 = 0.003;

/// Fraction of the remaining zoom distance covered each animation frame.
pub const SMOOTH_ZOOM_EASING: f64 = 0.3;

/// Eased zoom levels are quantised to this many steps per zoom level.
pub const SMOOTH_ZOOM_QUANTUM: f64 = 100.0;

/// Quiet period after the last wheel event that ends a gesture, in milliseconds.
pub const WHEEL_DEBOUNCE_MS: u64 = 200;

/// Display frame interval of the cooperative event loop, in milliseconds (~60 fps).
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Pixels per line for wheel events reported in line mode.
pub const WHEEL_LINE_HEIGHT: f64 = 20.0;

/// Pixels per page for wheel events reported in page mode.
pub const WHEEL_PAGE_HEIGHT: f64 = 60.0;

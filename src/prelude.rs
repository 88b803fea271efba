//! Prelude module for common smoothmap types and traits
//!
//! Re-exports the types most hosts need, for `use smoothmap::prelude::*;`

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
pub use std::collections::VecDeque;
pub use std::time::Duration;

pub use crate::core::{
    config::{FitBoundsOptions, MapContainerOptions, MapOptions, SmoothWheelZoomMode},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use crate::input::{
    events::{EventHandled, InputEvent, MapEvent},
    handler::{Handler, ScrollWheelZoom},
    smooth_zoom::{SmoothWheelZoom, ZoomAnchor},
};

pub use crate::layers::{
    base::Overlay,
    tile::{TileLayer, TileLayerOptions},
};

pub use crate::runtime::{EventLoop, FrameHandle, Scheduler, TimerHandle, Wakeup};

pub use crate::ui::container::{ContainerElement, MapContainer};

pub use crate::{MapError, Result};

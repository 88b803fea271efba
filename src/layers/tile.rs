use crate::{
    core::{geo::TileCoord, map::Map, viewport::Viewport},
    input::MapEvent,
    layers::base::Overlay,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Configuration for a tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileLayerOptions {
    /// URL template, e.g. `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`
    pub url_template: String,
    /// Substituted for `{s}`, spread across tiles
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: "© OpenStreetMap contributors".to_string(),
            min_zoom: 0,
            max_zoom: 18,
        }
    }
}

/// Inclusive block of tiles at one zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    pub fn len(&self) -> usize {
        ((self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        coord.z == self.z
            && (self.min_x..=self.max_x).contains(&coord.x)
            && (self.min_y..=self.max_y).contains(&coord.y)
    }

    /// Row-major iteration over the block
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |y| (self.min_x..=self.max_x).map(move |x| TileCoord::new(x, y, self.z)))
    }
}

/// A raster tile layer.
///
/// Fetching and drawing belong to the renderer; the layer resolves tile URLs and
/// keeps the visible tile block in step with the map, recomputing it whenever
/// the view is reset or a zoom ends.
#[derive(Debug, Clone)]
pub struct TileLayer {
    id: String,
    options: TileLayerOptions,
    visible: Option<TileRange>,
    recomputes: usize,
}

impl TileLayer {
    pub fn new(id: impl Into<String>, options: TileLayerOptions) -> Self {
        Self {
            id: id.into(),
            options,
            visible: None,
            recomputes: 0,
        }
    }

    /// The standard OpenStreetMap layer
    pub fn openstreetmap(id: impl Into<String>) -> Self {
        Self::new(id, TileLayerOptions::default())
    }

    pub fn options(&self) -> &TileLayerOptions {
        &self.options
    }

    /// Visible tiles as of the last recompute
    pub fn visible_tiles(&self) -> Option<TileRange> {
        self.visible
    }

    /// How many times the visible block was recomputed
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    pub fn tile_url(&self, coord: TileCoord) -> String {
        let subdomains = &self.options.subdomains;
        let subdomain = match subdomains.len() {
            0 => "",
            n => subdomains[((coord.x as u64 + coord.y as u64) % n as u64) as usize].as_str(),
        };

        self.options
            .url_template
            .replace("{s}", subdomain)
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{r}", "")
    }

    /// Tile zoom for a view zoom, within the layer's limits
    pub fn tile_zoom(&self, zoom: f64) -> u8 {
        let min = self.options.min_zoom as f64;
        let max = self.options.max_zoom.max(self.options.min_zoom) as f64;
        zoom.floor().clamp(min, max) as u8
    }

    /// Tiles covering the viewport at the layer's tile zoom
    pub fn tiles_for(&self, viewport: &Viewport) -> TileRange {
        let z = self.tile_zoom(viewport.zoom);
        let bounds = viewport.bounds();
        let nw = TileCoord::from_lat_lng(&bounds.north_west(), z);
        let se = TileCoord::from_lat_lng(&bounds.south_east(), z);

        TileRange {
            z,
            min_x: nw.x.min(se.x),
            max_x: nw.x.max(se.x),
            min_y: nw.y.min(se.y),
            max_y: nw.y.max(se.y),
        }
    }

    fn recompute(&mut self, viewport: &Viewport) {
        let range = self.tiles_for(viewport);
        if self.visible != Some(range) {
            log::debug!("tile layer {}: {} tiles at z{}", self.id, range.len(), range.z);
        }
        self.visible = Some(range);
        self.recomputes += 1;
    }
}

impl Overlay for TileLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_add(&mut self, map: &mut Map) {
        map.add_attribution(&self.options.attribution);
        if map.is_loaded() {
            self.recompute(map.viewport());
        }
    }

    fn on_remove(&mut self, map: &mut Map) {
        map.remove_attribution(&self.options.attribution);
        self.visible = None;
    }

    fn on_map_event(&mut self, event: &MapEvent, viewport: &Viewport) {
        match event {
            MapEvent::Load { .. }
            | MapEvent::ViewReset { .. }
            | MapEvent::ZoomEnd { .. }
            | MapEvent::Resize { .. } => self.recompute(viewport),
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

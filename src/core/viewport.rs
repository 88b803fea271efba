use crate::core::{
    constants::TILE_SIZE,
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The map's current visible center and zoom over a container of fixed pixel size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level, always within `[min_zoom, max_zoom]`
    pub zoom: f64,
    /// The size of the container in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self::with_limits(center, zoom, size, 0.0, 18.0)
    }

    pub fn with_limits(
        center: LatLng,
        zoom: f64,
        size: Point,
        min_zoom: f64,
        max_zoom: f64,
    ) -> Self {
        Self {
            center: LatLng::new(LatLng::clamp_lat(center.lat), center.lng),
            zoom: if zoom.is_finite() { zoom.clamp(min_zoom, max_zoom) } else { min_zoom },
            size,
            min_zoom,
            max_zoom,
        }
    }

    /// Clamps a zoom level to the configured limits
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Non-finite coordinates are ignored
    pub fn set_center(&mut self, center: LatLng) {
        if center.is_finite() {
            self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
        }
    }

    /// Non-finite zoom levels are ignored
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = self.limit_zoom(zoom);
        }
    }

    /// Applies center and zoom together as a single view update
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.set_center(center);
        self.set_zoom(zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Container pixel position of the view center
    pub fn center_point(&self) -> Point {
        self.size.divide_by(2.0)
    }

    /// Size of the projected world in pixels at `zoom`
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    /// Projects a coordinate to world pixels (EPSG:3857) at `zoom`, or the current zoom
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let scale = Self::world_size(zoom.unwrap_or(self.zoom));
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();

        let x = (lat_lng.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (PI / 4.0 + lat_rad / 2.0).tan().ln() / PI) / 2.0 * scale;
        Point::new(x, y)
    }

    /// Inverse of [`Viewport::project`]
    pub fn unproject(&self, point: &Point, zoom: Option<f64>) -> LatLng {
        let scale = Self::world_size(zoom.unwrap_or(self.zoom));

        let lng = point.x / scale * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * point.y / scale);
        let lat = n.sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }

    /// World pixel position of the container's top-left corner
    pub fn pixel_origin(&self) -> Point {
        self.project(&self.center, None).subtract(&self.center_point())
    }

    pub fn container_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.unproject(&self.pixel_origin().add(point), None)
    }

    pub fn lat_lng_to_container_point(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None).subtract(&self.pixel_origin())
    }

    /// Geographic bounds currently visible in the container
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.container_point_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.container_point_to_lat_lng(&self.size);
        LatLngBounds::new(nw, se)
    }

    /// Largest whole zoom at which `bounds` fits the container minus `padding` on every side
    pub fn bounds_zoom(&self, bounds: &LatLngBounds, padding: Point) -> f64 {
        let available = self.size.subtract(&padding.multiply(2.0));
        let nw = self.project(&bounds.north_west(), None);
        let se = self.project(&bounds.south_east(), None);
        let span = se.subtract(&nw);

        let scale = (available.x / span.x).min(available.y / span.y);
        if scale.is_nan() || scale <= 0.0 {
            return self.min_zoom;
        }

        self.limit_zoom((self.zoom + scale.log2()).floor())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_clamps_zoom() {
        let mut viewport =
            Viewport::with_limits(LatLng::default(), 25.0, Point::new(512.0, 512.0), 2.0, 15.0);
        assert_eq!(viewport.zoom, 15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        assert_eq!(viewport.limit_zoom(12.5), 12.5);
        assert_eq!(viewport.limit_zoom(16.0), 15.0);
    }

    #[test]
    fn test_non_finite_view_is_ignored() {
        let mut viewport = Viewport::new(LatLng::new(43.3, 21.9), 13.0, Point::new(800.0, 600.0));

        viewport.set_view(LatLng::new(f64::NAN, 21.0), f64::NAN);
        assert_eq!(viewport.center, LatLng::new(43.3, 21.9));
        assert_eq!(viewport.zoom, 13.0);

        viewport.set_zoom(f64::INFINITY);
        viewport.set_center(LatLng::new(10.0, f64::NEG_INFINITY));
        assert_eq!((viewport.center, viewport.zoom), (LatLng::new(43.3, 21.9), 13.0));
    }

    #[test]
    fn test_project_unproject() {
        let viewport = Viewport::default();
        let nis = LatLng::new(43.322126, 21.895462);

        for zoom in [0.0, 7.5, 13.0, 18.0] {
            let back = viewport.unproject(&viewport.project(&nis, Some(zoom)), Some(zoom));
            assert!((back.lat - nis.lat).abs() < 1e-9);
            assert!((back.lng - nis.lng).abs() < 1e-9);
        }

        // Null island sits in the middle of the zoom-0 world
        let origin = viewport.project(&LatLng::default(), Some(0.0));
        assert!((origin.x - 128.0).abs() < 1e-9);
        assert!((origin.y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_point_conversion() {
        let viewport = Viewport::new(LatLng::new(10.0, 20.0), 5.0, Point::new(800.0, 600.0));

        let center = viewport.container_point_to_lat_lng(&Point::new(400.0, 300.0));
        assert!((center.lat - 10.0).abs() < 1e-9);
        assert!((center.lng - 20.0).abs() < 1e-9);

        let pointer = Point::new(123.0, 456.0);
        let lat_lng = viewport.container_point_to_lat_lng(&pointer);
        let round_trip = viewport.lat_lng_to_container_point(&lat_lng);
        assert!((round_trip.x - pointer.x).abs() < 1e-6);
        assert!((round_trip.y - pointer.y).abs() < 1e-6);
    }

    #[test]
    fn test_center_lat_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.set_center(LatLng::new(89.0, 0.0));
        assert_eq!(viewport.center.lat, crate::core::geo::MAX_LATITUDE);
    }

    #[test]
    fn test_bounds_zoom() {
        let viewport = Viewport::new(LatLng::default(), 0.0, Point::new(512.0, 512.0));
        // The whole world fits at zoom 1 in a 512px square
        let world = LatLngBounds::from_coords(-85.0, -180.0, 85.0, 180.0);
        assert_eq!(viewport.bounds_zoom(&world, Point::default()), 1.0);
        // Padding pushes it down a level
        assert_eq!(viewport.bounds_zoom(&world, Point::new(10.0, 10.0)), 0.0);

        // A single point zooms all the way in
        let point = LatLngBounds::from_coords(1.0, 1.0, 1.0, 1.0);
        assert_eq!(viewport.bounds_zoom(&point, Point::default()), 18.0);
    }
}

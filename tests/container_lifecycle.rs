use smoothmap::prelude::*;
use std::{cell::RefCell, rc::Rc};

/// Mounting, option handling and teardown of the host surface
#[cfg(test)]
mod container_lifecycle {
    use super::*;

    const POINTER: Point = Point { x: 900.0, y: 250.0 };

    fn element() -> ContainerElement {
        ContainerElement::new(Point::new(1200.0, 800.0)).with_id("map")
    }

    #[test]
    fn test_demo_options_from_json() {
        let options = MapContainerOptions::from_json(
            r#"{
                "center": {"lat": 43.322126, "lng": 21.895462},
                "zoom": 13,
                "scrollWheelZoom": false,
                "smoothWheelZoom": true,
                "smoothSensitivity": 1
            }"#,
        )
        .unwrap();

        let mut container =
            MapContainer::new().with_child(Box::new(TileLayer::openstreetmap("osm")));
        container.mount(element(), options).unwrap();

        let map = container.map().unwrap();
        assert!(map.has_handler(SmoothWheelZoom::NAME));
        assert!(!map.has_handler(ScrollWheelZoom::NAME));
        assert_eq!(map.attributions(), ["© OpenStreetMap contributors".to_string()]);

        // Wheel zoom works even though scrollWheelZoom is false
        assert!(container.dispatch(InputEvent::wheel(-100.0, POINTER)).is_handled());
        container.run_until_idle(Duration::from_secs(5));
        assert!((container.map().unwrap().zoom() - 13.3).abs() < 1e-9);
    }

    #[test]
    fn test_instant_wheel_zoom_without_smooth_mode() {
        let mut container = MapContainer::new();
        container
            .mount(
                element(),
                MapContainerOptions::new()
                    .with_center_and_zoom(LatLng::new(43.322126, 21.895462), 13.0),
            )
            .unwrap();

        assert!(container.dispatch(InputEvent::wheel(-3.0, POINTER)).is_handled());
        let events = container.process_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, MapEvent::ZoomEnd { zoom } if *zoom == 14.0)));
        assert!(container.event_loop().is_idle());
    }

    #[test]
    fn test_tile_layer_tracks_smooth_zoom() {
        let mut container =
            MapContainer::new().with_child(Box::new(TileLayer::openstreetmap("osm")));
        container
            .mount(
                element(),
                MapContainerOptions::new()
                    .with_center_and_zoom(LatLng::new(43.322126, 21.895462), 13.5)
                    .with_smooth_wheel_zoom(SmoothWheelZoomMode::Cursor),
            )
            .unwrap();
        let tile_zoom = |container: &MapContainer| {
            container
                .map()
                .and_then(|map| map.overlay_as::<TileLayer>("osm"))
                .and_then(|layer| layer.visible_tiles())
                .map(|range| range.z)
        };
        assert_eq!(tile_zoom(&container), Some(13));

        container.dispatch(InputEvent::wheel(-300.0, POINTER));
        container.run_until_idle(Duration::from_secs(5));
        assert_eq!(tile_zoom(&container), Some(14));
    }

    #[test]
    fn test_fit_bounds_on_mount() {
        let bounds = LatLngBounds::from_coords(43.25, 21.80, 43.40, 22.00);
        let mut container = MapContainer::new();
        container
            .mount(
                element(),
                MapContainerOptions::new().with_bounds(
                    bounds,
                    FitBoundsOptions {
                        padding: Point::new(20.0, 20.0),
                        max_zoom: None,
                    },
                ),
            )
            .unwrap();

        let map = container.map().unwrap();
        let visible = map.viewport().bounds();
        assert!(visible.contains(&bounds.south_west));
        assert!(visible.contains(&bounds.north_east));
        assert_eq!(map.zoom(), map.zoom().floor());
    }

    #[test]
    fn test_when_ready_receives_initial_view() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut container = MapContainer::new().when_ready(move |map| {
            sink.borrow_mut().push((map.center(), map.zoom()));
        });
        container
            .mount(
                element(),
                MapContainerOptions::new()
                    .with_center_and_zoom(LatLng::new(43.322126, 21.895462), 13.0),
            )
            .unwrap();

        assert_eq!(*seen.borrow(), vec![(LatLng::new(43.322126, 21.895462), 13.0)]);
    }

    #[test]
    fn test_unmount_mid_animation() {
        let mut container = MapContainer::new();
        container
            .mount(
                element(),
                MapContainerOptions::new()
                    .with_center_and_zoom(LatLng::new(43.322126, 21.895462), 13.0)
                    .with_smooth_wheel_zoom(SmoothWheelZoomMode::Cursor),
            )
            .unwrap();

        container.dispatch(InputEvent::wheel(-300.0, POINTER));
        container.advance(Duration::from_millis(50));
        assert!(!container.event_loop().is_idle());

        container.unmount();
        assert!(!container.is_mounted());
        assert!(container.event_loop().is_idle());
        assert!(container.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(
            container.dispatch(InputEvent::wheel(-300.0, POINTER)),
            EventHandled::NotHandled
        );
    }

    #[test]
    fn test_invalid_sensitivity_rejected() {
        let mut container = MapContainer::new();
        let result = container.mount(
            element(),
            MapContainerOptions::new()
                .with_smooth_wheel_zoom(SmoothWheelZoomMode::Cursor)
                .with_smooth_sensitivity(f64::NAN),
        );
        assert!(matches!(result, Err(MapError::InvalidOptions(_))));
        assert!(!container.is_mounted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_realtime_drives_animation() {
        let mut container = MapContainer::new();
        container
            .mount(
                element(),
                MapContainerOptions::new()
                    .with_center_and_zoom(LatLng::new(43.322126, 21.895462), 13.0)
                    .with_scroll_wheel_zoom(false)
                    .with_smooth_wheel_zoom(SmoothWheelZoomMode::Cursor),
            )
            .unwrap();

        let started = tokio::time::Instant::now();
        for _ in 0..3 {
            container.dispatch(InputEvent::wheel(-100.0, POINTER));
            container.run_realtime(Duration::from_millis(40)).await;
        }
        let events = container.run_realtime(Duration::from_secs(1)).await;

        assert!(started.elapsed() >= Duration::from_millis(1120));
        assert!(container.event_loop().is_idle());
        assert!((container.map().unwrap().zoom() - 13.9).abs() < 1e-9);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, MapEvent::ZoomEnd { .. }))
                .count(),
            1
        );
    }
}

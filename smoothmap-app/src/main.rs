use anyhow::Context;
use smoothmap::{
    ContainerElement, InputEvent, LatLng, MapContainer, MapContainerOptions, MapEvent, Point,
    SmoothWheelZoomMode, TileLayer,
};
use std::time::Duration;

/// Wheel deltas replayed by the demo, with the pause before each one
const GESTURE: [(f64, u64); 3] = [(-100.0, 0), (-100.0, 40), (-100.0, 40)];

/// Mounts the demo map, replays a short zoom-in gesture in real time and logs the view
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading map options from {path}"))?;
            MapContainerOptions::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => demo_options(),
    };

    let element = ContainerElement::new(Point::new(1200.0, 800.0)).with_id("map");
    let pointer = Point::new(900.0, 250.0);

    let mut container = MapContainer::new()
        .with_child(Box::new(TileLayer::openstreetmap("osm")))
        .when_ready(|map| {
            log::info!(
                "map ready at ({:.6}, {:.6}) z{:.2}",
                map.center().lat,
                map.center().lng,
                map.zoom()
            );
        });
    container.mount(element, options)?;

    container.with_map(|map| {
        map.on("viewreset", |event| {
            if let MapEvent::ViewReset { center, zoom } = event {
                log::info!("view ({:.6}, {:.6}) z{:.2}", center.lat, center.lng, zoom);
            }
        });
        map.on("zoomend", |event| {
            if let MapEvent::ZoomEnd { zoom } = event {
                log::info!("zoom end z{zoom:.2}");
            }
        });
    });

    tokio::select! {
        _ = replay(&mut container, pointer) => {}
        _ = tokio::signal::ctrl_c() => log::warn!("interrupted"),
    }

    if let Some(map) = container.map() {
        let tiles = map
            .overlay_as::<TileLayer>("osm")
            .and_then(|layer| layer.visible_tiles())
            .map(|range| range.len())
            .unwrap_or_default();
        log::info!(
            "final view ({:.6}, {:.6}) z{:.2}, {} tiles, {}",
            map.center().lat,
            map.center().lng,
            map.zoom(),
            tiles,
            map.attributions().join(", ")
        );
    }

    container.unmount();
    Ok(())
}

fn demo_options() -> MapContainerOptions {
    MapContainerOptions::new()
        .with_center_and_zoom(LatLng::new(43.322126, 21.895462), 13.0)
        .with_scroll_wheel_zoom(false)
        .with_smooth_wheel_zoom(SmoothWheelZoomMode::Cursor)
        .with_smooth_sensitivity(1.0)
}

async fn replay(container: &mut MapContainer, pointer: Point) {
    for (delta_y, pause_ms) in GESTURE {
        container.run_realtime(Duration::from_millis(pause_ms)).await;
        let handled = container.dispatch(InputEvent::wheel(delta_y, pointer));
        log::debug!("wheel {delta_y} -> {handled:?}");
    }

    // Debounce plus the animation tail
    container.run_realtime(Duration::from_secs(1)).await;
}
